/// Physical key, independent of keyboard layout.
///
/// Only keys the demo can bind are named; everything else arrives as
/// `Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Left and right variants collapse into one key.
    Shift,
    Control,
    Alt,
    Meta,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown(u32),
}

/// Press or release of a key.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ButtonState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// One wheel step, either in lines (notched wheels) or logical pixels
/// (touchpads).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseWheelDelta {
    Line { x: f32, y: f32 },
    Pixel { x: f32, y: f32 },
}

impl MouseWheelDelta {
    /// Logical pixels treated as one wheel line.
    pub const PIXELS_PER_LINE: f32 = 20.0;

    /// Vertical component in lines, positive away from the user.
    pub fn lines_y(self) -> f32 {
        match self {
            MouseWheelDelta::Line { y, .. } => y,
            MouseWheelDelta::Pixel { y, .. } => y / Self::PIXELS_PER_LINE,
        }
    }
}

/// Input as the runtime reports it, stripped of winit types.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    ModifiersChanged(Modifiers),

    Key {
        key: Key,
        state: ButtonState,
        modifiers: Modifiers,
        /// Platform key code, also carried by `Key::Unknown`.
        code: u32,
        repeat: bool,
    },

    /// Raw, unaccelerated mouse motion in device units, +Y down.
    ///
    /// Keeps arriving while the cursor is captured.
    MouseMotion { dx: f32, dy: f32 },

    MouseWheel {
        delta: MouseWheelDelta,
        modifiers: Modifiers,
    },

    Focused(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_wheel_converts_to_lines() {
        assert_eq!(MouseWheelDelta::Line { x: 0.0, y: -2.0 }.lines_y(), -2.0);
        assert_eq!(MouseWheelDelta::Pixel { x: 5.0, y: 30.0 }.lines_y(), 1.5);
    }
}
