//! Input sampling
//!
//! Analog movement axes and the jump button's edge flags. Input only changes
//! between ticks; the tick consumes edges at most once.

/// Clamp an analog axis to [-1, 1]. NaN reads as neutral.
pub fn sanitize_axis(value: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) }
}

/// Last sampled movement axes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisInput {
    /// -1 = left, 1 = right
    pub horizontal: f32,
    /// -1 = down (fast fall), 1 = up
    pub vertical: f32,
}

impl AxisInput {
    pub fn new(horizontal: f32, vertical: f32) -> Self {
        Self {
            horizontal: sanitize_axis(horizontal),
            vertical: sanitize_axis(vertical),
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.horizontal == 0.0 && self.vertical == 0.0
    }
}

/// What a jump button edge asks of the timer bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpEdge {
    /// Pressed, nothing to do yet
    Pressed,
    /// Released while the press was still waiting: start the buffer window
    ReleasedUnconsumed,
    /// Released after the press was consumed (or never seen)
    Released,
}

/// Jump button flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JumpInput {
    /// Press edge, waiting to be consumed by a jump
    pressed: bool,
    /// Button is down
    held: bool,
    /// Release edge, waiting to be consumed by a short hop
    released: bool,
}

impl JumpInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a button edge.
    pub fn set_edge(&mut self, pressed: bool) -> JumpEdge {
        if pressed {
            self.pressed = true;
            self.held = true;
            self.released = false;
            JumpEdge::Pressed
        } else {
            let unconsumed = self.pressed;
            self.pressed = false;
            self.held = false;
            self.released = true;
            if unconsumed {
                JumpEdge::ReleasedUnconsumed
            } else {
                JumpEdge::Released
            }
        }
    }

    pub fn pressed(&self) -> bool {
        self.pressed
    }

    pub fn held(&self) -> bool {
        self.held
    }

    pub fn released(&self) -> bool {
        self.released
    }

    /// Take the press edge. Returns whether it was set.
    pub fn consume_press(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }

    /// Take the release edge. Returns whether it was set.
    pub fn consume_release(&mut self) -> bool {
        std::mem::take(&mut self.released)
    }
}
