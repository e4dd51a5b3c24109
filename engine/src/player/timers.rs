//! Timer Bank
//!
//! Count-up timers for every time-gated mechanic. Contact timers
//! (ground/walls) are either [`Contact::Touching`] this tick or hold the time
//! since contact was lost; event timers (jump, buffer, apex, wall jump) hold
//! the seconds since the event last happened.
//!
//! All timers saturate at [`TIMER_CEILING`] so an idle character never drifts
//! into float precision trouble.

/// Upper bound for every timer (one hour).
pub const TIMER_CEILING: f32 = 3600.0;

/// Contact timer: touching this tick, or seconds since contact ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Touching,
    Since(f32),
}

impl Default for Contact {
    fn default() -> Self {
        Contact::Since(TIMER_CEILING)
    }
}

impl Contact {
    /// Advance by one tick. Contact lost this tick reads `Since(dt)`.
    pub fn advance(self, dt: f32) -> Self {
        match self {
            Contact::Touching => Contact::Since(dt.min(TIMER_CEILING)),
            Contact::Since(t) => Contact::Since((t + dt).min(TIMER_CEILING)),
        }
    }

    /// Snap to `Touching` if the fresh query says so, else keep the
    /// advanced value.
    pub fn resnap(self, touching: bool) -> Self {
        if touching { Contact::Touching } else { self }
    }

    pub fn is_touching(self) -> bool {
        matches!(self, Contact::Touching)
    }

    /// Seconds since contact (0 while touching).
    pub fn seconds(self) -> f32 {
        match self {
            Contact::Touching => 0.0,
            Contact::Since(t) => t,
        }
    }
}

fn saturating_add(t: f32, dt: f32) -> f32 {
    (t + dt).min(TIMER_CEILING)
}

/// Every timer the movement core reads.
///
/// Readable from anywhere, only the controller can change it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerBank {
    since_grounded: Contact,
    since_left_wall: Contact,
    since_right_wall: Contact,
    since_jumped: f32,
    since_jump_buffered: f32,
    since_apex: f32,
    since_wall_jumped: f32,
}

impl Default for TimerBank {
    fn default() -> Self {
        // Everything happened "long ago": no spawn lockout, no phantom
        // buffered jump, no apex window.
        Self {
            since_grounded: Contact::default(),
            since_left_wall: Contact::default(),
            since_right_wall: Contact::default(),
            since_jumped: TIMER_CEILING,
            since_jump_buffered: TIMER_CEILING,
            since_apex: TIMER_CEILING,
            since_wall_jumped: TIMER_CEILING,
        }
    }
}

impl TimerBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since_grounded(&self) -> Contact {
        self.since_grounded
    }

    pub fn since_left_wall(&self) -> Contact {
        self.since_left_wall
    }

    pub fn since_right_wall(&self) -> Contact {
        self.since_right_wall
    }

    pub fn since_jumped(&self) -> f32 {
        self.since_jumped
    }

    pub fn since_jump_buffered(&self) -> f32 {
        self.since_jump_buffered
    }

    pub fn since_apex(&self) -> f32 {
        self.since_apex
    }

    pub fn since_wall_jumped(&self) -> f32 {
        self.since_wall_jumped
    }

    /// Advance every timer by `dt`.
    pub(crate) fn advance(&mut self, dt: f32) {
        self.since_grounded = self.since_grounded.advance(dt);
        self.since_left_wall = self.since_left_wall.advance(dt);
        self.since_right_wall = self.since_right_wall.advance(dt);
        self.since_jumped = saturating_add(self.since_jumped, dt);
        self.since_jump_buffered = saturating_add(self.since_jump_buffered, dt);
        self.since_apex = saturating_add(self.since_apex, dt);
        self.since_wall_jumped = saturating_add(self.since_wall_jumped, dt);
    }

    /// Re-snap the contact timers from this tick's queries. Must run after
    /// [`TimerBank::advance`].
    pub(crate) fn resnap_contacts(&mut self, grounded: bool, left_wall: bool, right_wall: bool) {
        self.since_grounded = self.since_grounded.resnap(grounded);
        self.since_left_wall = self.since_left_wall.resnap(left_wall);
        self.since_right_wall = self.since_right_wall.resnap(right_wall);
    }

    pub(crate) fn reset_jumped(&mut self) {
        self.since_jumped = 0.0;
    }

    /// Start the jump buffer window.
    pub(crate) fn start_jump_buffer(&mut self) {
        self.since_jump_buffered = 0.0;
    }

    /// Push the buffer past its window so a consumed press can't fire again.
    pub(crate) fn poison_jump_buffer(&mut self, jump_buffer_time: f32) {
        self.since_jump_buffered = (jump_buffer_time + 1.0).min(TIMER_CEILING);
    }

    pub(crate) fn reset_apex(&mut self) {
        self.since_apex = 0.0;
    }

    pub(crate) fn reset_wall_jumped(&mut self) {
        self.since_wall_jumped = 0.0;
    }

    /// Every timer is finite and non-negative.
    pub fn is_sane(&self) -> bool {
        [
            self.since_grounded.seconds(),
            self.since_left_wall.seconds(),
            self.since_right_wall.seconds(),
            self.since_jumped,
            self.since_jump_buffered,
            self.since_apex,
            self.since_wall_jumped,
        ]
        .iter()
        .all(|t| t.is_finite() && *t >= 0.0)
    }
}
