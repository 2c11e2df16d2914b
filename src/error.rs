//! Structured error types for canvas-table.
//!
//! Errors never cross the public drawing or input API: callback faults are
//! routed to the log hook and protocol faults are dropped. These types are
//! what the log hook, the overlay teardown and the JSON helpers report.

/// All errors that can occur in the grid engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A caller-supplied style or formatter callback failed.
    #[error("Callback failed in {origin}: {message}")]
    Callback {
        origin: &'static str,
        message: String,
    },

    /// A message could not be routed or decoded.
    #[error("Protocol: {0}")]
    Protocol(String),

    /// JSON (de)serialization of configuration or messages.
    #[error("Serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Drawing surface failure.
    #[error("Render error: {0}")]
    Render(String),

    /// The edit overlay removal callback failed.
    #[error("Edit overlay: {0}")]
    Overlay(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

impl GridError {
    /// Build a callback fault tagged with where it happened.
    pub fn callback(origin: &'static str, message: impl Into<String>) -> Self {
        Self::Callback {
            origin,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridError>;

impl From<String> for GridError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridError> for wasm_bindgen::JsValue {
    fn from(e: GridError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn callback_error_names_its_origin() {
        let err = GridError::callback("row style", "boom");
        assert_eq!(err.to_string(), "Callback failed in row style: boom");
    }

    #[test]
    fn json_errors_convert() {
        let err: GridError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, GridError::Serialization(_)));
    }
}
