//! The simulation: a set of obstacle segments, an arena of bodies, and
//! the tick that advances them.
//!
//! Time is a fixed tick with whole-pixel movement; there is no `dt`
//! anywhere. Each tick every body resolves against the level geometry
//! independently (bodies never push each other), then queued spawns are
//! merged and player-overlap checks run. Everything noteworthy that
//! happened is published as [`ContactEvent`]s for the caller to drain.

use thunderdome::Arena;

use crate::math::{Angle, Rect, Vec2};

pub mod body;
pub use body::{Body, Facing, Intent, PlayerInput, Stats};

pub mod collision;
pub use collision::{Segment, SegmentId};

pub mod solver;

/// Handle to a body in the simulation. Stays valid until the body is
/// despawned; never dangles into a later body reusing the slot.
pub type BodyKey = thunderdome::Index;

/// Tuning constants for the resolver. The defaults are the classic
/// feel: 1 px/tick² gravity, a 15 px/tick jump, 45° walkable slopes.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PhysicsConfig {
    /// Downward acceleration in pixels per tick squared.
    pub gravity: i32,
    /// Terminal velocity; falling speed never exceeds this.
    pub max_fall_speed: i32,
    /// Horizontal speed while a direction key is held.
    pub walk_speed: i32,
    /// Vertical velocity applied on a granted jump. Negative is up.
    pub jump_impulse: i32,
    /// How many ticks after walking off a floor a jump is still granted.
    pub coyote_ticks: u32,
    /// Cap on every push-out loop; exceeding it logs an error and leaves
    /// the remaining overlap for the next tick.
    pub max_push_pixels: i32,
    /// Downward velocity applied when standing on a too-steep slope.
    pub slide_nudge: i32,
    /// Downward velocity applied after bumping a ceiling.
    pub ceiling_rebound: i32,
    /// Steepest slope a body can stand on, boundary inclusive.
    pub max_walkable: Angle,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: 1,
            max_fall_speed: 20,
            walk_speed: 4,
            jump_impulse: -15,
            coyote_ticks: 2,
            max_push_pixels: 20,
            slide_nudge: 2,
            ceiling_rebound: 1,
            max_walkable: Angle::Deg(45.0),
        }
    }
}

/// One collision reaction produced during a tick.
#[derive(Clone, Copy, Debug)]
pub enum Contact {
    /// The horizontal pass ran into this segment; the body was pushed
    /// back and its horizontal velocity zeroed.
    Wall { segment: SegmentId },
    /// The rising pass bumped this segment from below.
    Ceiling { segment: SegmentId },
    /// The falling pass landed on (or slid against) this segment.
    /// `swept` is the cleared sweep rectangle the body was placed by.
    Floor { segment: SegmentId, swept: Rect },
    /// A body flagged as hurting the player overlapped the player's
    /// hitbox after the movement pass.
    PlayerOverlap,
}

/// A [`Contact`] tagged with the body it happened to.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub body: BodyKey,
    pub contact: Contact,
}

/// The whole simulation state for one level.
pub struct Physics {
    pub config: PhysicsConfig,
    segments: Vec<Segment>,
    bodies: Arena<Body>,
    player: Option<BodyKey>,
    /// Bodies queued for insertion; merged after the movement pass so a
    /// spawn can be requested at any point without invalidating it.
    pending: parking_lot::Mutex<Vec<Body>>,
    contacts: Vec<ContactEvent>,
    tick_count: u64,
}

impl Default for Physics {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl Physics {
    pub fn new(config: PhysicsConfig) -> Self {
        Physics {
            config,
            segments: Vec::new(),
            bodies: Arena::new(),
            player: None,
            pending: parking_lot::Mutex::new(Vec::new()),
            contacts: Vec::new(),
            tick_count: 0,
        }
    }

    /// Replace the level geometry. Floor references held by bodies are
    /// indices into this list, so swapping geometry mid-level should go
    /// together with respawning the bodies.
    pub fn set_segments(&mut self, segments: Vec<Segment>) {
        self.segments = segments;
    }

    pub fn add_segment(&mut self, segment: Segment) -> SegmentId {
        self.segments.push(segment);
        self.segments.len() - 1
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Insert a body immediately and get its handle.
    pub fn spawn(&mut self, body: Body) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Insert a body and make it the player.
    pub fn spawn_player(&mut self, body: Body) -> BodyKey {
        let key = self.bodies.insert(body);
        self.player = Some(key);
        key
    }

    /// Queue a body for insertion after the current tick's movement
    /// pass. Takes `&self` so event handlers iterating the simulation
    /// can request spawns without aliasing trouble.
    pub fn queue_spawn(&self, body: Body) {
        self.pending.lock().push(body);
    }

    /// Remove a body. Returns it if the key was still live.
    pub fn despawn(&mut self, key: BodyKey) -> Option<Body> {
        if self.player == Some(key) {
            self.player = None;
        }
        self.bodies.remove(key)
    }

    pub fn player(&self) -> Option<BodyKey> {
        self.player
    }

    pub fn set_player(&mut self, key: BodyKey) {
        self.player = Some(key);
    }

    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    pub fn player_body(&self) -> Option<&Body> {
        self.bodies.get(self.player?)
    }

    pub fn player_body_mut(&mut self) -> Option<&mut Body> {
        self.bodies.get_mut(self.player?)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Advance the whole simulation by one tick.
    pub fn tick(&mut self) {
        self.tick_count += 1;

        // movement pass: each body against the static geometry,
        // independent of every other body
        #[cfg(not(feature = "parallel"))]
        {
            for (key, body) in self.bodies.iter_mut() {
                for contact in solver::advance(body, &self.segments, &self.config) {
                    self.contacts.push(ContactEvent { body: key, contact });
                }
            }
        }
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let segments = &self.segments;
            let config = &self.config;
            let per_body: Vec<(BodyKey, Vec<Contact>)> = self
                .bodies
                .iter_mut()
                .collect::<Vec<_>>()
                .into_par_iter()
                .map(|(key, body)| (key, solver::advance(body, segments, config)))
                .collect();
            for (key, contacts) in per_body {
                self.contacts
                    .extend(contacts.into_iter().map(|contact| ContactEvent {
                        body: key,
                        contact,
                    }));
            }
        }

        // merge spawns queued during (or before) the pass; they first
        // move on the next tick
        let pending = std::mem::take(&mut *self.pending.lock());
        for body in pending {
            self.bodies.insert(body);
        }

        // player overlap pass, after everything has settled into its
        // final position for the tick
        if let Some(player_key) = self.player {
            if let Some(player_rect) = self.bodies.get(player_key).map(|b| b.rect) {
                for (key, body) in self.bodies.iter() {
                    if key != player_key && body.hurts_player && body.rect.overlaps(&player_rect) {
                        self.contacts.push(ContactEvent {
                            body: key,
                            contact: Contact::PlayerOverlap,
                        });
                    }
                }
            }
        }
    }

    /// Drain every contact event raised since the last drain, oldest
    /// first.
    pub fn drain_contacts(&mut self) -> std::vec::Drain<'_, ContactEvent> {
        self.contacts.drain(..)
    }

    /// A copy of every body's presentable state, for rendering or
    /// serialization outside the simulation's borrow.
    pub fn snapshot(&self) -> Vec<BodySnapshot> {
        self.bodies
            .iter()
            .map(|(key, body)| BodySnapshot {
                key,
                rect: body.rect,
                vel: body.vel,
                facing: body.facing,
                grounded: body.grounded(),
                stats: body.stats,
                hurts_player: body.hurts_player,
                is_player: self.player == Some(key),
            })
            .collect()
    }
}

/// A body's state as seen from outside the simulation.
#[derive(Clone, Copy, Debug)]
pub struct BodySnapshot {
    pub key: BodyKey,
    pub rect: Rect,
    pub vel: Vec2,
    pub facing: Facing,
    pub grounded: bool,
    pub stats: Stats,
    pub hurts_player: bool,
    pub is_player: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_floor() -> Vec<Segment> {
        vec![Segment::new(0, 600, 1000, 600)]
    }

    #[test]
    fn bodies_settle_through_the_simulation_tick() {
        let mut sim = Physics::default();
        sim.set_segments(flat_floor());
        let key = sim.spawn(Body::new_falling(Vec2::new(100, 560), Vec2::new(10, 10)));

        for _ in 0..20 {
            sim.tick();
        }
        let body = sim.body(key).unwrap();
        assert!(body.grounded());
        assert_eq!(body.rect.bottom(), 599);
    }

    #[test]
    fn queued_spawn_joins_after_the_movement_pass() {
        let mut sim = Physics::default();
        sim.set_segments(flat_floor());
        sim.queue_spawn(Body::new_falling(Vec2::new(100, 100), Vec2::new(10, 10)));
        assert_eq!(sim.bodies().count(), 0);

        // merged at the end of this tick, unmoved
        sim.tick();
        assert_eq!(sim.bodies().count(), 1);
        let (_, body) = sim.bodies().next().unwrap();
        assert_eq!(body.rect.y, 100);

        // moves from the next tick on
        sim.tick();
        let (_, body) = sim.bodies().next().unwrap();
        assert_eq!(body.rect.y, 101);
    }

    #[test]
    fn despawn_removes_and_invalidates_the_key() {
        let mut sim = Physics::default();
        let key = sim.spawn(Body::new_inert(Vec2::new(0, 0), Vec2::new(10, 10)));
        assert!(sim.despawn(key).is_some());
        assert!(sim.body(key).is_none());
        assert!(sim.despawn(key).is_none());
    }

    #[test]
    fn despawning_the_player_clears_the_player_key() {
        let mut sim = Physics::default();
        let key = sim.spawn_player(Body::new_player(Vec2::new(0, 0), Vec2::new(10, 10)));
        assert_eq!(sim.player(), Some(key));
        sim.despawn(key);
        assert_eq!(sim.player(), None);
        assert!(sim.player_body().is_none());
    }

    #[test]
    fn contacts_drain_once() {
        let mut sim = Physics::default();
        sim.set_segments(flat_floor());
        let key = sim.spawn(Body::new_falling(Vec2::new(100, 589), Vec2::new(10, 10)));

        sim.tick();
        let events: Vec<ContactEvent> = sim.drain_contacts().collect();
        assert!(events
            .iter()
            .any(|e| e.body == key && matches!(e.contact, Contact::Floor { segment: 0, .. })));
        assert_eq!(sim.drain_contacts().count(), 0);
    }

    #[test]
    fn hazard_overlapping_player_raises_player_overlap() {
        let mut sim = Physics::default();
        sim.set_segments(flat_floor());
        let player = sim.spawn_player(Body::new_player(Vec2::new(100, 589), Vec2::new(10, 10)));
        let hazard = sim.spawn(
            Body::new_inert(Vec2::new(105, 589), Vec2::new(10, 10)).with_hurts_player(true),
        );
        // overlapping the player but harmless
        sim.spawn(Body::new_inert(Vec2::new(105, 589), Vec2::new(10, 10)));

        sim.tick();
        let overlaps: Vec<BodyKey> = sim
            .drain_contacts()
            .filter(|e| matches!(e.contact, Contact::PlayerOverlap))
            .map(|e| e.body)
            .collect();
        assert_eq!(overlaps, vec![hazard]);
        assert_ne!(overlaps[0], player);
    }

    #[test]
    fn snapshot_reflects_body_state() {
        let mut sim = Physics::default();
        sim.set_segments(flat_floor());
        let key = sim.spawn_player(Body::new_player(Vec2::new(100, 589), Vec2::new(10, 10)));
        sim.tick();

        let snap = sim.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].key, key);
        assert!(snap[0].is_player);
        assert!(snap[0].grounded);
        assert_eq!(snap[0].rect, sim.body(key).unwrap().rect);
    }

    #[test]
    fn random_soak_never_panics_or_corrupts_hitboxes() {
        use rand::{Rng, SeedableRng};
        let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);

        let mut sim = Physics::default();
        let mut segments = vec![Segment::new(-2000, 700, 2000, 700)];
        for _ in 0..20 {
            let x = rng.gen_range(-1500..1500);
            let y = rng.gen_range(0..700);
            let dx = rng.gen_range(-200..200);
            let dy = rng.gen_range(-200..200);
            segments.push(Segment::new(x, y, x + dx, y + dy));
        }
        sim.set_segments(segments);

        for _ in 0..30 {
            let pos = Vec2::new(rng.gen_range(-1000..1000), rng.gen_range(0..400));
            let size = Vec2::new(rng.gen_range(1..40), rng.gen_range(1..40));
            if rng.gen_bool(0.5) {
                sim.spawn(Body::new_falling(pos, size));
            } else {
                sim.queue_spawn(Body::new_inert(pos, size).with_velocity(Vec2::new(
                    rng.gen_range(-30..30),
                    rng.gen_range(-30..30),
                )));
            }
        }

        for _ in 0..200 {
            sim.tick();
            for (_, body) in sim.bodies() {
                assert!(body.rect.w >= 1 && body.rect.h >= 1);
            }
        }
        sim.drain_contacts();
        assert_eq!(sim.tick_count(), 200);
    }
}
