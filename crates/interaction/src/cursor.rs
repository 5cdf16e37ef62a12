use crate::surface::{Cursor, MapSurface};

/// Pointer cursor while hovering an interactive feature.
///
/// Every enter/leave is forwarded to the surface as-is; there is no
/// debouncing. Without an attached surface (map not mounted yet) events are
/// dropped.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct HoverCursorController {
    current: Cursor,
}

impl HoverCursorController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Cursor {
        self.current
    }

    pub fn on_pointer_enter<S>(&mut self, over_interactive: bool, surface: Option<&mut S>) -> Cursor
    where
        S: MapSurface + ?Sized,
    {
        let cursor = if over_interactive {
            Cursor::Pointer
        } else {
            Cursor::Default
        };
        self.apply(cursor, surface)
    }

    pub fn on_pointer_leave<S>(&mut self, surface: Option<&mut S>) -> Cursor
    where
        S: MapSurface + ?Sized,
    {
        self.apply(Cursor::Default, surface)
    }

    /// Forgets the tracked state without touching any surface.
    pub fn reset(&mut self) {
        self.current = Cursor::Default;
    }

    fn apply<S>(&mut self, cursor: Cursor, surface: Option<&mut S>) -> Cursor
    where
        S: MapSurface + ?Sized,
    {
        if let Some(surface) = surface {
            self.current = cursor;
            surface.set_cursor(cursor);
        }
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::HoverCursorController;
    use crate::surface::{Cursor, RecordingSurface, SurfaceCall};

    #[test]
    fn enter_and_leave_toggle_cursor() {
        let mut surface = RecordingSurface::new();
        let mut cursor = HoverCursorController::new();

        assert_eq!(cursor.on_pointer_enter(true, Some(&mut surface)), Cursor::Pointer);
        assert_eq!(surface.cursor, Cursor::Pointer);
        assert_eq!(cursor.on_pointer_leave(Some(&mut surface)), Cursor::Default);
        assert_eq!(surface.cursor, Cursor::Default);
    }

    #[test]
    fn enter_without_interactive_hits_resets() {
        let mut surface = RecordingSurface::new();
        let mut cursor = HoverCursorController::new();
        cursor.on_pointer_enter(true, Some(&mut surface));
        cursor.on_pointer_enter(false, Some(&mut surface));
        assert_eq!(surface.cursor, Cursor::Default);
    }

    #[test]
    fn repeated_events_are_applied_each_time() {
        let mut surface = RecordingSurface::new();
        let mut cursor = HoverCursorController::new();
        cursor.on_pointer_enter(true, Some(&mut surface));
        cursor.on_pointer_enter(true, Some(&mut surface));
        cursor.on_pointer_leave(Some(&mut surface));
        cursor.on_pointer_leave(Some(&mut surface));
        assert_eq!(
            surface.calls,
            vec![
                SurfaceCall::Cursor(Cursor::Pointer),
                SurfaceCall::Cursor(Cursor::Pointer),
                SurfaceCall::Cursor(Cursor::Default),
                SurfaceCall::Cursor(Cursor::Default),
            ]
        );
    }

    #[test]
    fn no_surface_is_a_no_op() {
        let mut cursor = HoverCursorController::new();
        let cursor_state = cursor.on_pointer_enter::<RecordingSurface>(true, None);
        assert_eq!(cursor_state, Cursor::Default);
        assert_eq!(cursor.current(), Cursor::Default);
    }
}
