pub mod gameloop;
pub use gameloop::{FixedLoop, Stage};

pub mod math;
pub use math::{Angle, Rect, Vec2};

pub mod physics;
pub use physics::{
    body::{Body, Facing, Intent, PlayerInput, Stats},
    collision::{segments_intersect, Segment, SegmentId},
    solver, BodyKey, BodySnapshot, Contact, ContactEvent, Physics, PhysicsConfig,
};

pub mod recipe;
pub use recipe::{Recipe, RecipeBook, RecipeError, SpawnSpec};
