//! Input state machine for mouse/touch/keyboard events.

use crate::canvas::SketchCanvas;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Key that switches pointer gestures from drawing to panning while held.
pub const PAN_KEY: &str = "Space";

/// Pointer event type for unified mouse/touch handling.
///
/// Positions are in screen coordinates relative to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
    /// The gesture was interrupted (pointer left the surface, touch cancelled).
    Cancel,
}

/// Touch event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl PointerEvent {
    /// Map a touch event to a pointer event.
    ///
    /// Start and move only count with a single active touch, so pinch
    /// gestures never draw.
    pub fn from_touch(phase: TouchPhase, touches: &[Point]) -> Option<Self> {
        match (phase, touches) {
            (TouchPhase::Start, [position]) => Some(PointerEvent::Down { position: *position }),
            (TouchPhase::Move, [position]) => Some(PointerEvent::Move { position: *position }),
            (TouchPhase::End, _) => Some(PointerEvent::Up {
                position: touches.first().copied().unwrap_or(Point::ZERO),
            }),
            (TouchPhase::Cancel, _) => Some(PointerEvent::Cancel),
            _ => None,
        }
    }
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// What the pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputMode {
    #[default]
    Idle,
    Drawing,
    Panning {
        /// Last pointer position in screen coordinates.
        last: Point,
    },
}

/// Tracks pointer and keyboard state and drives a [`SketchCanvas`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    mode: InputMode,
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Currently pressed keys.
    pressed_keys: HashSet<String>,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Whether the next pointer-down starts a pan instead of a stroke.
    pub fn pan_mode(&self) -> bool {
        self.is_key_pressed(PAN_KEY)
    }

    /// Handle a pointer event, applying its effect to `canvas`.
    pub fn handle_pointer_event(&mut self, event: PointerEvent, canvas: &mut SketchCanvas) {
        match event {
            PointerEvent::Down { position } => {
                self.pointer_position = position;
                // A down without a matching up closes the previous gesture first
                self.finish(canvas);
                if self.pan_mode() {
                    self.mode = InputMode::Panning { last: position };
                } else {
                    canvas.begin_stroke(canvas.camera().screen_to_canvas(position));
                    self.mode = InputMode::Drawing;
                }
            }
            PointerEvent::Move { position } => {
                self.pointer_position = position;
                match self.mode {
                    InputMode::Idle => {}
                    InputMode::Drawing => {
                        canvas.extend_stroke(canvas.camera().screen_to_canvas(position));
                    }
                    InputMode::Panning { last } => {
                        canvas.pan_by(position - last);
                        self.mode = InputMode::Panning { last: position };
                    }
                }
            }
            PointerEvent::Up { position } => {
                self.pointer_position = position;
                self.finish(canvas);
            }
            PointerEvent::Cancel => self.finish(canvas),
        }
    }

    fn finish(&mut self, canvas: &mut SketchCanvas) {
        if self.mode == InputMode::Drawing {
            canvas.end_stroke();
        }
        self.mode = InputMode::Idle;
    }

    /// Handle a keyboard event.
    pub fn handle_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key);
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    /// Check if a key is currently pressed.
    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Pan delta since the gesture's previous sample, if panning.
    pub fn drag_delta(&self) -> Option<Vec2> {
        match self.mode {
            InputMode::Panning { last } => Some(self.pointer_position - last),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasConfig;
    use crate::theme::CanvasColors;

    fn canvas() -> SketchCanvas {
        let config = CanvasConfig {
            width: 100,
            height: 100,
            ..CanvasConfig::default()
        };
        SketchCanvas::new(&config, CanvasColors::default())
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down { position: Point::new(x, y) }
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move { position: Point::new(x, y) }
    }

    fn up(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Up { position: Point::new(x, y) }
    }

    #[test]
    fn test_draw_gesture() {
        let mut input = InputState::new();
        let mut canvas = canvas();

        input.handle_pointer_event(down(10.0, 10.0), &mut canvas);
        assert_eq!(input.mode(), InputMode::Drawing);
        assert!(canvas.is_drawing());

        input.handle_pointer_event(mv(40.0, 10.0), &mut canvas);
        input.handle_pointer_event(up(40.0, 10.0), &mut canvas);

        assert_eq!(input.mode(), InputMode::Idle);
        assert_eq!(canvas.undo_len(), 1);
        assert_eq!(canvas.spans()[0].end, Point::new(40.0, 10.0));
    }

    #[test]
    fn test_move_while_idle_does_nothing() {
        let mut input = InputState::new();
        let mut canvas = canvas();
        let before = canvas.pixels().clone();

        input.handle_pointer_event(mv(40.0, 40.0), &mut canvas);
        input.handle_pointer_event(up(40.0, 40.0), &mut canvas);

        assert_eq!(canvas.pixels(), &before);
        assert_eq!(canvas.undo_len(), 0);
    }

    #[test]
    fn test_space_pans_instead_of_drawing() {
        let mut input = InputState::new();
        let mut canvas = canvas();
        input.handle_key_event(KeyEvent::Pressed(PAN_KEY.to_string()));
        assert!(input.pan_mode());

        input.handle_pointer_event(down(10.0, 10.0), &mut canvas);
        assert_eq!(input.mode(), InputMode::Panning { last: Point::new(10.0, 10.0) });
        input.handle_pointer_event(mv(25.0, 5.0), &mut canvas);
        input.handle_pointer_event(mv(30.0, 15.0), &mut canvas);
        input.handle_pointer_event(up(30.0, 15.0), &mut canvas);

        assert_eq!(canvas.pan(), Vec2::new(20.0, 5.0));
        assert_eq!(canvas.undo_len(), 0);
        assert!(!canvas.has_content());
    }

    #[test]
    fn test_stroke_uses_canvas_coordinates() {
        let mut input = InputState::new();
        let mut canvas = canvas();
        canvas.pan_by(Vec2::new(5.0, 5.0));

        input.handle_pointer_event(down(15.0, 15.0), &mut canvas);
        input.handle_pointer_event(up(15.0, 15.0), &mut canvas);

        assert_eq!(canvas.spans()[0].start, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_pan_key_change_applies_to_next_gesture() {
        let mut input = InputState::new();
        let mut canvas = canvas();

        input.handle_pointer_event(down(10.0, 10.0), &mut canvas);
        input.handle_key_event(KeyEvent::Pressed(PAN_KEY.to_string()));
        input.handle_pointer_event(mv(30.0, 10.0), &mut canvas);
        assert_eq!(input.mode(), InputMode::Drawing);
        assert_eq!(canvas.pan(), Vec2::ZERO);
        input.handle_pointer_event(up(30.0, 10.0), &mut canvas);

        input.handle_key_event(KeyEvent::Released(PAN_KEY.to_string()));
        assert!(!input.pan_mode());
        input.handle_pointer_event(down(50.0, 50.0), &mut canvas);
        assert_eq!(input.mode(), InputMode::Drawing);
    }

    #[test]
    fn test_cancel_ends_stroke() {
        let mut input = InputState::new();
        let mut canvas = canvas();

        input.handle_pointer_event(down(10.0, 10.0), &mut canvas);
        input.handle_pointer_event(mv(20.0, 20.0), &mut canvas);
        input.handle_pointer_event(PointerEvent::Cancel, &mut canvas);

        assert_eq!(input.mode(), InputMode::Idle);
        assert_eq!(canvas.undo_len(), 1);
        assert!(!canvas.is_drawing());
    }

    #[test]
    fn test_touch_mapping() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(
            PointerEvent::from_touch(TouchPhase::Start, &[p]),
            Some(PointerEvent::Down { position: p })
        );
        assert_eq!(PointerEvent::from_touch(TouchPhase::Move, &[p, p]), None);
        assert_eq!(
            PointerEvent::from_touch(TouchPhase::End, &[]),
            Some(PointerEvent::Up { position: Point::ZERO })
        );
        assert_eq!(
            PointerEvent::from_touch(TouchPhase::Cancel, &[]),
            Some(PointerEvent::Cancel)
        );
    }

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed("a".to_string()));
        assert!(input.is_key_pressed("a"));
        input.handle_key_event(KeyEvent::Released("a".to_string()));
        assert!(!input.is_key_pressed("a"));
    }
}
