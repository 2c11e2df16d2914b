//! Floating text input placed over a cell while it is edited.

use crate::error::{GridError, Result};
use crate::grid::EditOutcome;
use crate::types::{CellRect, EditNavigation};

/// Width trimmed from the input so it stays inside the cell borders.
const INPUT_WIDTH_INSET: f64 = 7.0;

/// Page placement of the overlay input, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayPlacement {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// Part of the input hidden under the header
    pub clip_top: f64,
    /// Part of the input hidden past the left edge
    pub clip_left: f64,
}

impl OverlayPlacement {
    /// Place a cell rectangle relative to the surface origin on the page.
    pub fn from_rect(rect: &CellRect, origin: (f64, f64)) -> Self {
        Self {
            top: origin.1 + rect.y,
            left: origin.0 + rect.x,
            width: (rect.width - INPUT_WIDTH_INSET).max(0.0),
            height: rect.cell_height,
            clip_top: rect.clip_top.unwrap_or(0.0),
            clip_left: rect.clip_left.unwrap_or(0.0),
        }
    }
}

/// The widget behind an edit session.
pub trait EditInput {
    fn set_placement(&mut self, placement: &OverlayPlacement);

    /// Current text in the input.
    fn value(&self) -> String;

    /// Remove listeners and the element. Called exactly once.
    fn detach(&mut self) -> Result<()>;
}

/// What a key pressed inside the input asks for: `(cancel, action)`.
pub fn edit_key_action(code: &str, shift: bool) -> Option<(bool, EditNavigation)> {
    match code {
        "Escape" => Some((true, EditNavigation::None)),
        "Enter" | "NumpadEnter" => Some((false, EditNavigation::None)),
        "Tab" if shift => Some((false, EditNavigation::MovePrev)),
        "Tab" => Some((false, EditNavigation::MoveNext)),
        _ => None,
    }
}

type RemoveCallback = Box<dyn FnOnce(EditOutcome) -> Result<()>>;

/// One open edit overlay.
///
/// The removal callback fires exactly once, from the first `remove`. The
/// input is detached before the callback's error, if any, is returned.
pub struct EditSession<I: EditInput> {
    column: usize,
    field: String,
    row: usize,
    input: I,
    on_remove: Option<RemoveCallback>,
}

impl<I: EditInput> std::fmt::Debug for EditSession<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("column", &self.column)
            .field("field", &self.field)
            .field("row", &self.row)
            .field("removed", &self.on_remove.is_none())
            .finish()
    }
}

impl<I: EditInput> EditSession<I> {
    pub fn new(
        column: usize,
        field: impl Into<String>,
        row: usize,
        input: I,
        on_remove: impl FnOnce(EditOutcome) -> Result<()> + 'static,
    ) -> Self {
        Self {
            column,
            field: field.into(),
            row,
            input,
            on_remove: Some(Box::new(on_remove)),
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_removed(&self) -> bool {
        self.on_remove.is_none()
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn update_location(&mut self, placement: &OverlayPlacement) {
        if !self.is_removed() {
            self.input.set_placement(placement);
        }
    }

    /// Close the overlay and report the outcome. Later calls do nothing.
    pub fn remove(&mut self, cancel: bool, action: EditNavigation) -> Result<()> {
        let Some(on_remove) = self.on_remove.take() else {
            return Ok(());
        };
        let outcome = EditOutcome {
            cancel,
            new_value: self.input.value(),
            column: Some(self.column),
            field: Some(self.field.clone()),
            row: Some(self.row),
            action,
        };
        let notified = on_remove(outcome);
        let detached = self.input.detach();
        match (notified, detached) {
            (Err(err), _) => Err(GridError::Overlay(err.to_string())),
            (Ok(()), detached) => detached,
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeInput {
        text: String,
        detached: Rc<RefCell<usize>>,
        placement: Option<OverlayPlacement>,
    }

    impl EditInput for FakeInput {
        fn set_placement(&mut self, placement: &OverlayPlacement) {
            self.placement = Some(*placement);
        }

        fn value(&self) -> String {
            self.text.clone()
        }

        fn detach(&mut self) -> Result<()> {
            *self.detached.borrow_mut() += 1;
            Ok(())
        }
    }

    #[test]
    fn callback_fires_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let input = FakeInput {
            text: "new".into(),
            ..FakeInput::default()
        };
        let detached = Rc::clone(&input.detached);
        let mut session = EditSession::new(1, "name", 4, input, move |outcome| {
            sink.borrow_mut().push(outcome);
            Ok(())
        });

        session.remove(false, EditNavigation::MoveNext).unwrap();
        session.remove(true, EditNavigation::None).unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].new_value, "new");
        assert_eq!(calls[0].row, Some(4));
        assert_eq!(calls[0].action, EditNavigation::MoveNext);
        assert_eq!(*detached.borrow(), 1);
    }

    #[test]
    fn failing_callback_still_detaches() {
        let input = FakeInput::default();
        let detached = Rc::clone(&input.detached);
        let mut session =
            EditSession::new(0, "name", 0, input, |_| Err(GridError::from("listener gone")));

        let err = session.remove(false, EditNavigation::None).unwrap_err();
        assert!(matches!(err, GridError::Overlay(_)));
        assert_eq!(*detached.borrow(), 1);
        assert!(session.is_removed());
    }

    #[test]
    fn removed_session_ignores_moves() {
        let mut session = EditSession::new(0, "name", 0, FakeInput::default(), |_| Ok(()));
        session.remove(true, EditNavigation::None).unwrap();
        session.update_location(&OverlayPlacement::default());
        assert_eq!(session.input().placement, None);
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(edit_key_action("Escape", false), Some((true, EditNavigation::None)));
        assert_eq!(edit_key_action("Tab", true), Some((false, EditNavigation::MovePrev)));
        assert_eq!(edit_key_action("KeyA", false), None);
    }

    #[test]
    fn placement_offsets_by_surface_origin() {
        let rect = CellRect {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            cell_height: 36.0,
            clip_top: Some(4.0),
            ..CellRect::default()
        };
        let placement = OverlayPlacement::from_rect(&rect, (5.0, 50.0));
        assert_eq!(placement.left, 15.0);
        assert_eq!(placement.top, 70.0);
        assert_eq!(placement.width, 93.0);
        assert_eq!(placement.clip_top, 4.0);
    }
}
