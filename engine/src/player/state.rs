//! Character State Machine
//!
//! The character is always in exactly one [`CharacterState`]. Each state has
//! `enter`/`update`/`exit` hooks; [`StateMachine::transition`] calls `exit` on
//! the old state and `enter` on the new one every time, even when the state
//! does not change, so hooks must be idempotent.
//!
//! Only Grounded and Airborne are reachable from the per-tick rule. Climb and
//! Dash are inert placeholders that future moves can hang behavior off.

use super::events::MovementEvent;

/// High-level movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharacterState {
    Grounded,
    #[default]
    Airborne,
    Climb,
    Dash,
}

impl CharacterState {
    /// Stable numeric code, used by tick snapshots.
    pub fn code(self) -> u32 {
        match self {
            CharacterState::Grounded => 0,
            CharacterState::Airborne => 1,
            CharacterState::Climb => 2,
            CharacterState::Dash => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(CharacterState::Grounded),
            1 => Some(CharacterState::Airborne),
            2 => Some(CharacterState::Climb),
            3 => Some(CharacterState::Dash),
            _ => None,
        }
    }

    fn hooks(self) -> &'static dyn StateHooks {
        match self {
            CharacterState::Grounded => &GroundedState,
            CharacterState::Airborne => &AirborneState,
            CharacterState::Climb => &ClimbState,
            CharacterState::Dash => &DashState,
        }
    }
}

/// What a hook can see and emit.
#[derive(Debug)]
pub struct HookContext<'a> {
    /// State before the transition (equal to the current state in `update`)
    pub from: CharacterState,
    /// Events produced by the hook
    pub events: &'a mut Vec<MovementEvent>,
}

/// Per-state lifecycle hooks.
pub trait StateHooks {
    fn enter(&self, _ctx: &mut HookContext<'_>) {}
    fn update(&self, _ctx: &mut HookContext<'_>) {}
    fn exit(&self, _ctx: &mut HookContext<'_>) {}
}

pub struct GroundedState;

impl StateHooks for GroundedState {
    fn enter(&self, ctx: &mut HookContext<'_>) {
        // Re-entering from Grounded is not a landing
        if ctx.from != CharacterState::Grounded {
            ctx.events.push(MovementEvent::Landed);
        }
    }
}

pub struct AirborneState;

impl StateHooks for AirborneState {}

pub struct ClimbState;

impl StateHooks for ClimbState {}

pub struct DashState;

impl StateHooks for DashState {}

/// Holds the current state and runs hooks on transitions.
#[derive(Debug, Clone, Default)]
pub struct StateMachine {
    current: CharacterState,
}

impl StateMachine {
    /// Starts Airborne.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CharacterState {
        self.current
    }

    /// The state the per-tick rule picks.
    ///
    /// Grounded contact this tick puts the character in Grounded unless it is
    /// climbing or dashing; anything else is Airborne. A jump less than 0.2 s
    /// old that is still rising stays Airborne, so the ground probe can't
    /// pull the character back down on the tick after takeoff.
    pub fn evaluate(&self, grounded: bool, since_jumped: f32, velocity_y: f32) -> CharacterState {
        let mut next = if grounded
            && !matches!(self.current, CharacterState::Dash | CharacterState::Climb)
        {
            CharacterState::Grounded
        } else {
            CharacterState::Airborne
        };
        if since_jumped < 0.2 && velocity_y > 0.0 {
            next = CharacterState::Airborne;
        }
        next
    }

    /// Exit the current state and enter `to`.
    pub fn transition(&mut self, to: CharacterState, events: &mut Vec<MovementEvent>) {
        let from = self.current;
        from.hooks().exit(&mut HookContext { from, events: &mut *events });
        self.current = to;
        to.hooks().enter(&mut HookContext { from, events: &mut *events });
    }

    /// Run the current state's per-tick hook.
    pub fn update(&self, events: &mut Vec<MovementEvent>) {
        let from = self.current;
        from.hooks().update(&mut HookContext { from, events: &mut *events });
    }
}
