use crate::math::{Rect, Vec2};
use crate::physics::{collision::SegmentId, PhysicsConfig};

/// A body is one dynamic entity moving through the level: a hitbox, a
/// velocity, and the grounded-state bookkeeping the resolver maintains.
///
/// Fields are public in the same spirit as the rest of the crate, but
/// `current_floor`, `can_jump` and `ticks_off_floor` are owned by the
/// resolver; outside code should treat them as read-only.
#[derive(Clone, Debug)]
pub struct Body {
    pub rect: Rect,
    /// Pixels per tick. Positive y falls, negative y rises.
    pub vel: Vec2,
    /// The segment currently supporting the body. Always a segment the
    /// resolver classified as walkable when it was assigned; re-derived
    /// every vertical pass.
    pub current_floor: Option<SegmentId>,
    /// True while grounded or within the coyote grace window, never
    /// while moving upward.
    pub can_jump: bool,
    /// Ticks since ground contact was lost; only used to delay clearing
    /// `can_jump`, because sliding down a slope can open single-tick
    /// gaps between floor segments.
    pub ticks_off_floor: u32,
    pub intent: Intent,
    pub facing: Facing,
    pub stats: Stats,
    /// Touching the player damages them (checked after the tick pass).
    pub hurts_player: bool,
}

impl Body {
    pub fn new(pos: Vec2, size: Vec2, intent: Intent) -> Self {
        Body {
            rect: Rect::new(pos.x, pos.y, size.x, size.y),
            vel: Vec2::new(0, 0),
            current_floor: None,
            can_jump: false,
            ticks_off_floor: 0,
            intent,
            facing: Facing::Right,
            stats: Stats::default(),
            hurts_player: false,
        }
    }

    /// A body with no self-driven velocity: no gravity, no input. It
    /// still collides, and still moves if given a velocity directly.
    pub fn new_inert(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, size, Intent::Inert)
    }

    /// A body that falls under gravity and rides floors, with no input.
    pub fn new_falling(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, size, Intent::Falling)
    }

    /// The player-controlled body.
    pub fn new_player(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, size, Intent::Player(PlayerInput::default()))
    }

    /// Set the starting velocity in a builder-like chain.
    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_hurts_player(mut self, hurts: bool) -> Self {
        self.hurts_player = hurts;
        self
    }

    #[inline]
    pub fn grounded(&self) -> bool {
        self.current_floor.is_some()
    }

    /// The player input surface, if this body is player-controlled.
    pub fn player_input_mut(&mut self) -> Option<&mut PlayerInput> {
        match &mut self.intent {
            Intent::Player(input) => Some(input),
            _ => None,
        }
    }

    /// Phase 0 of a tick: let the body's intent adjust its velocity.
    /// Position is never touched here; only the resolver moves bodies.
    pub(crate) fn update_velocities(&mut self, cfg: &PhysicsConfig) {
        match self.intent {
            Intent::Inert => return,
            Intent::Falling | Intent::Player(_) => {
                // Gravity is keyed off the floor reference rather than
                // `can_jump`: during the coyote window the body must
                // keep falling even though jumping is still allowed.
                if self.current_floor.is_none() {
                    self.vel.y = (self.vel.y + cfg.gravity).min(cfg.max_fall_speed);
                }
            }
        }

        let (dir, jump) = match &mut self.intent {
            Intent::Player(input) => (input.held_dir(), std::mem::take(&mut input.jump_queued)),
            _ => return,
        };

        self.vel.x = dir * cfg.walk_speed;
        if dir < 0 {
            self.facing = Facing::Left;
        } else if dir > 0 {
            self.facing = Facing::Right;
        }

        // A jump request is consumed whether or not it is granted.
        if jump {
            if self.can_jump {
                log::debug!("jumping");
                self.vel.y = cfg.jump_impulse;
            } else {
                log::debug!("jump requested while airborne, ignored");
            }
        }
    }
}

/// The per-tick velocity hook: what a body wants to do with itself
/// before collisions have their say.
#[derive(Clone, Debug, Default)]
pub enum Intent {
    /// No velocity changes at all.
    #[default]
    Inert,
    /// Gravity only.
    Falling,
    /// Gravity plus keyboard-driven walking and jumping.
    Player(PlayerInput),
}

/// Held-key state and the queued jump request for a player body.
///
/// The input layer writes this between ticks; `update_velocities` reads
/// it at the start of each tick. A queued jump survives until the next
/// tick consumes it, granted or not.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerInput {
    pub left: bool,
    pub right: bool,
    pub(crate) jump_queued: bool,
}

impl PlayerInput {
    /// Request a jump on the next tick.
    pub fn queue_jump(&mut self) {
        self.jump_queued = true;
    }

    /// -1, 0 or 1: opposing held keys cancel out.
    pub fn held_dir(&self) -> i32 {
        match (self.left, self.right) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

/// Which way the body is drawn facing. Driven by horizontal intent,
/// exposed for the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The gameplay fields entities actually carry, as concrete data
/// rather than a string-keyed property bag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub health: i32,
    pub score: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            health: 100,
            score: 0,
        }
    }
}

impl Stats {
    /// Reduce health, saturating at zero.
    pub fn damage(&mut self, amount: i32) {
        self.health = (self.health - amount).max(0);
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.health > 0
    }
}
