use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Rotate.
    Primary,
    /// Pan.
    Secondary,
    /// Dolly.
    Middle,
}

/// Pointer input consumed by the orbit controller.
///
/// Hosts translate their raw events into these; the controller never sees
/// platform types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down(PointerButton),
    Up(PointerButton),
    /// Cursor motion in logical pixels since the previous move.
    Moved(Vec2),
    /// Scroll amount; positive scrolls toward the scene.
    Wheel(f32),
    /// The pointer left the surface or focus was lost.
    Cancel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_comparable() {
        assert_eq!(
            PointerInput::Down(PointerButton::Primary),
            PointerInput::Down(PointerButton::Primary)
        );
        assert_ne!(
            PointerInput::Moved(Vec2::X),
            PointerInput::Moved(Vec2::Y)
        );
    }
}
