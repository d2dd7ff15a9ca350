use glam::Vec2;
use showroom_camera::{PointerButton, PointerInput};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixels of trackpad scroll per wheel notch.
const PIXELS_PER_LINE: f64 = 50.0;

/// Window pointer events, stripped of winit device ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Button { button: PointerButton, pressed: bool },
    Moved(PhysicalPosition<f64>),
    /// Cursor left the window or focus was lost.
    Left,
    Wheel(f32),
}

impl PointerEvent {
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return None,
                };
                Some(Self::Button {
                    button,
                    pressed: *state == ElementState::Pressed,
                })
            }
            WindowEvent::CursorMoved { position, .. } => Some(Self::Moved(*position)),
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => Some(Self::Left),
            WindowEvent::MouseWheel { delta, .. } => Some(Self::Wheel(match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
            })),
            _ => None,
        }
    }

    /// Whether the overlay may keep this event from the orbit controls.
    ///
    /// Only presses and wheel turns. Releases and motion always reach the
    /// controls so a drag that ends over the overlay still ends.
    pub fn overlay_may_claim(&self) -> bool {
        matches!(
            self,
            Self::Button { pressed: true, .. } | Self::Wheel(_)
        )
    }
}

/// Turns window pointer events into orbit-control input.
#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<PhysicalPosition<f64>>,
}

impl PointerTracker {
    /// `claimed` is whether the overlay consumed the event; motion deltas are
    /// reported in logical pixels.
    pub fn translate(
        &mut self,
        event: PointerEvent,
        scale_factor: f64,
        claimed: bool,
    ) -> Option<PointerInput> {
        if claimed && event.overlay_may_claim() {
            return None;
        }
        match event {
            PointerEvent::Button { button, pressed } => Some(if pressed {
                PointerInput::Down(button)
            } else {
                PointerInput::Up(button)
            }),
            PointerEvent::Moved(position) => {
                let previous = self.cursor.replace(position)?;
                let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
                Some(PointerInput::Moved(Vec2::new(
                    ((position.x - previous.x) / scale) as f32,
                    ((position.y - previous.y) / scale) as f32,
                )))
            }
            PointerEvent::Left => {
                self.cursor = None;
                Some(PointerInput::Cancel)
            }
            PointerEvent::Wheel(amount) => Some(PointerInput::Wheel(amount)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Moved(PhysicalPosition::new(x, y))
    }

    #[test]
    fn release_over_overlay_still_ends_drag() {
        let mut t = PointerTracker::default();
        let up = PointerEvent::Button {
            button: PointerButton::Primary,
            pressed: false,
        };
        assert_eq!(
            t.translate(up, 1.0, true),
            Some(PointerInput::Up(PointerButton::Primary))
        );
    }

    #[test]
    fn overlay_claims_presses_and_wheel() {
        let mut t = PointerTracker::default();
        let down = PointerEvent::Button {
            button: PointerButton::Primary,
            pressed: true,
        };
        assert_eq!(t.translate(down, 1.0, true), None);
        assert_eq!(t.translate(PointerEvent::Wheel(1.0), 1.0, true), None);
        assert_eq!(
            t.translate(down, 1.0, false),
            Some(PointerInput::Down(PointerButton::Primary))
        );
    }

    #[test]
    fn motion_over_overlay_keeps_cursor_current() {
        let mut t = PointerTracker::default();
        assert_eq!(t.translate(at(10.0, 10.0), 2.0, false), None);
        // Claimed motion is still tracked, so the next delta does not jump.
        assert_eq!(
            t.translate(at(30.0, 10.0), 2.0, true),
            Some(PointerInput::Moved(Vec2::new(10.0, 0.0)))
        );
        assert_eq!(
            t.translate(at(30.0, 14.0), 2.0, false),
            Some(PointerInput::Moved(Vec2::new(0.0, 2.0)))
        );
    }

    #[test]
    fn leaving_resets_cursor() {
        let mut t = PointerTracker::default();
        t.translate(at(5.0, 5.0), 1.0, false);
        assert_eq!(
            t.translate(PointerEvent::Left, 1.0, true),
            Some(PointerInput::Cancel)
        );
        assert_eq!(t.translate(at(50.0, 50.0), 1.0, false), None);
    }
}
