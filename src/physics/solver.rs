//! The per-tick collision resolver.
//!
//! Each body's tick runs in two ordered phases after its velocity
//! intent: horizontal movement against walls, then vertical movement
//! against floors and ceilings. The order is load-bearing: reacting to
//! walls first keeps an upward jump into a corner from being misread as
//! a landing on the far side of the wall.
//!
//! Every push-out loop in here is iteration-capped. On cap the loop
//! logs an error and bails, leaving a small penetration that the next
//! tick's pass corrects; nothing in this module can fail a tick.

use crate::math::Rect;
use crate::physics::{
    body::Body,
    collision::{Segment, SegmentId},
    Contact, PhysicsConfig,
};

/// Advance one body by one tick against the level's segments.
///
/// Bodies never read each other, so this is safe to run for every body
/// of a level concurrently as long as the segment list is shared
/// read-only. Contacts raised during the tick are returned for the
/// caller to route; they never feed back into this resolution.
pub fn advance(body: &mut Body, segments: &[Segment], cfg: &PhysicsConfig) -> Vec<Contact> {
    body.update_velocities(cfg);
    log::trace!(
        "tick start at {:?}, floor {:?}, vel {}/{}",
        body.rect,
        body.current_floor,
        body.vel.x,
        body.vel.y
    );

    let mut pass = TickPass {
        cfg,
        segments,
        contacts: Vec::new(),
        next: body.rect,
    };

    // Phase 1: horizontal movement and collision.
    pass.next.x = body.rect.x + body.vel.x;
    let mut hit_wall = false;
    if body.vel.x != 0 {
        hit_wall = pass.check_walls(body);
        // commit the x move before any vertical reasoning
        body.rect = pass.next;
    }

    // Phase 2: vertical movement and collision.
    //
    // Skipped when a wall was hit, except that an airborne, falling
    // body still falls; otherwise it would cling mid-air to the wall
    // it just touched.
    if !hit_wall || (body.current_floor.is_none() && body.vel.y > 0) {
        pass.next.y += body.vel.y;
        if body.vel.y >= 0 {
            pass.check_floors(body);
        } else {
            // Rising always forfeits jump eligibility until relanding.
            body.can_jump = false;
            body.ticks_off_floor = 0;

            // Jumping up into a ceiling can drop the body straight back
            // onto the floor it left without the floor scan ever
            // running. Remember the floor and re-test it alone after
            // the ceiling reaction.
            let prior_floor = body.current_floor;

            pass.check_ceilings(body);
            body.current_floor = None;

            if let Some(floor) = prior_floor {
                pass.react_to_floor(body, floor);
            }
        }
    }

    body.rect = pass.next;
    log::trace!("tick end at {:?}", body.rect);
    pass.contacts
}

/// Working state for one body's tick: the proposed rectangle and the
/// contacts accumulated so far.
struct TickPass<'a> {
    cfg: &'a PhysicsConfig,
    segments: &'a [Segment],
    contacts: Vec<Contact>,
    /// Where the body wants to be; adjusted by every reaction and
    /// committed by the caller.
    next: Rect,
}

impl TickPass<'_> {
    /// React to every segment the proposed x move runs into. The
    /// body's own floor is exempt so walking along it never reads as a
    /// wall hit. Returns whether anything was hit; `vel.x` is zeroed
    /// only after the whole scan because each push-out reads the
    /// incoming velocity for its direction.
    fn check_walls(&mut self, body: &mut Body) -> bool {
        let mut hit_any = false;
        for (id, seg) in self.segments.iter().enumerate() {
            if body.current_floor == Some(id) {
                continue;
            }
            if seg.intersects_rect(&self.next) {
                log::debug!("hit wall {id} at {:?}", self.next);
                self.push_out_horizontal(seg, body.vel.x);
                self.contacts.push(Contact::Wall { segment: id });
                hit_any = true;
            }
        }
        if hit_any {
            body.vel.x = 0;
        }
        hit_any
    }

    /// Translate the proposed rectangle one pixel at a time away from
    /// the direction of travel until it clears the wall.
    fn push_out_horizontal(&mut self, seg: &Segment, vx: i32) {
        let step = if vx > 0 { -1 } else { 1 };
        let mut moves = 0;
        while seg.intersects_rect(&self.next) {
            self.next.x += step;
            moves += 1;
            if moves > self.cfg.max_push_pixels {
                log::error!("wall push-out failed to clear {seg:?} within {moves} moves");
                break;
            }
        }
    }

    /// The resting-or-falling vertical pass: find a floor under the
    /// swept motion, or run down the coyote clock.
    fn check_floors(&mut self, body: &mut Body) {
        // Clearing can_jump is delayed a few ticks: descending a slope
        // produces single-tick gaps in floor contact that must not eat
        // the player's jump.
        if body.ticks_off_floor > self.cfg.coyote_ticks {
            log::debug!("coyote window over, jump disabled");
            body.can_jump = false;
        }

        body.current_floor = None;

        // No early exit: floors can meet in a V and the body must end
        // up on whichever one wins after all reactions.
        for id in 0..self.segments.len() {
            self.react_to_floor(body, id);
        }

        if body.current_floor.is_none() && body.can_jump {
            body.ticks_off_floor += 1;
            log::debug!("off floor for {} ticks", body.ticks_off_floor);
        }
    }

    /// Test one candidate floor against the swept motion and react on a
    /// hit. Also used to re-test a remembered floor after a ceiling
    /// bounce, which is why it re-checks the velocity sign itself.
    fn react_to_floor(&mut self, body: &mut Body, id: SegmentId) {
        let seg = self.segments[id];
        if body.vel.y < 0 || !seg.x_overlaps(&self.next) {
            return;
        }
        // Sweep from where the tick started to where it wants to end,
        // one pixel taller: a body resting flush on its floor must
        // still re-detect it every tick, and a body walking underneath
        // a floor must not be teleported on top of it.
        let mut swept = Rect::sweep_union(&body.rect, &self.next);
        swept.h += 1;
        if seg.intersects_rect(&swept) {
            self.hit_floor(body, id, swept);
        }
    }

    /// A floor (or something floor-positioned) is in the way: push the
    /// swept rectangle up until clear, classify the slope, and land the
    /// body on the cleared bottom edge.
    fn hit_floor(&mut self, body: &mut Body, id: SegmentId, mut swept: Rect) {
        let seg = self.segments[id];
        log::debug!("hit floor {id}, swept {swept:?}");

        let mut moves = 0;
        loop {
            swept.y -= 1;
            moves += 1;
            if moves > self.cfg.max_push_pixels {
                log::error!("floor push-out failed to clear {seg:?} within {moves} moves");
                break;
            }
            if !seg.intersects_rect(&swept) {
                break;
            }
        }

        if seg.is_walkable(self.cfg.max_walkable) {
            body.can_jump = true;
            body.ticks_off_floor = 0;
            body.current_floor = Some(id);
            body.vel.y = 0;
        } else {
            // Too steep to stand on: keep a little downward speed so
            // the body slides off instead of sticking.
            body.vel.y = self.cfg.slide_nudge;
        }

        // rest exactly on the cleared sweep's bottom edge
        self.next.y = swept.bottom() - self.next.h;
        self.contacts.push(Contact::Floor { segment: id, swept });
    }

    /// The rising vertical pass: first ceiling hit wins.
    fn check_ceilings(&mut self, body: &mut Body) {
        for (id, seg) in self.segments.iter().enumerate() {
            // the floor being jumped off can still overlap the body on
            // the launch tick; it is not a ceiling
            if body.current_floor == Some(id) {
                continue;
            }
            if seg.x_overlaps(&self.next) && seg.intersects_rect(&self.next) {
                self.hit_ceiling(body, id);
                return;
            }
        }
    }

    /// Push the proposed rectangle back down below the ceiling and
    /// flip the velocity to a slow fall.
    fn hit_ceiling(&mut self, body: &mut Body, id: SegmentId) {
        let seg = self.segments[id];
        log::debug!("hit ceiling {id} at {:?}", self.next);

        let mut moves = 0;
        while seg.intersects_rect(&self.next) {
            self.next.y += 1;
            moves += 1;
            if moves > self.cfg.max_push_pixels {
                log::error!("ceiling push-out failed to clear {seg:?} within {moves} moves");
                break;
            }
        }

        body.vel.y = self.cfg.ceiling_rebound;
        self.contacts.push(Contact::Ceiling { segment: id });
    }
}
