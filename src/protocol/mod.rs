//! Split between the context that owns input and the one that draws.
//!
//! The control side forwards every input event as one `ControlMessage`;
//! the render side answers with `RenderMessage` requests. The two share
//! nothing but the serialized envelopes.

mod channel;
mod control;
mod message;
mod overlay;
mod render;

pub use channel::{LocalChannel, MessageSink};
pub use control::{ControlEndpoint, ControlSurface, SharedControl};
pub use message::{ControlMessage, Envelope, GridId, RenderMessage};
pub use overlay::{edit_key_action, EditInput, EditSession, OverlayPlacement};
pub use render::{ChannelHost, RenderEndpoint};
