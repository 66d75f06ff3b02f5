//! A fixed-tick driver for the simulation.
//!
//! The simulation has no notion of delta time; a tick is a tick. This
//! loop turns wall-clock time into the right number of ticks per frame
//! and asks the caller to present in between.

use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

// time snapping technique from Tyler Glaiel's blog post
// https://medium.com/@tglaiel/how-to-make-your-game-run-at-60fps-24c61210fe75
const NANOS_120FPS: u128 = 1_000_000_000 / 120;
const NANOS_60FPS: u128 = 1_000_000_000 / 60;
const NANOS_30FPS: u128 = 1_000_000_000 / 30;
const NANOS_20FPS: u128 = 1_000_000_000 / 20;
const NANOS_15FPS: u128 = 1_000_000_000 / 15;
const SNAP_THRESHOLD: u128 = 200_000;

const MAX_ACC_VALUE: u128 = 1_000_000_000 / 8;

/// The caller's side of the loop: advance the game by one tick, and
/// present whatever there is to present between ticks.
pub trait Stage {
    /// Run one simulation tick. Return `ControlFlow::Break` to leave
    /// the loop.
    fn tick(&mut self) -> ControlFlow<()>;
    /// Called once per frame after the tick(s) for that frame.
    fn present(&mut self);
}

/// A lockstep loop running a fixed number of ticks per second.
pub struct FixedLoop {
    nanos_per_tick: u128,
}

impl FixedLoop {
    pub fn from_hz(hz: u32) -> Self {
        FixedLoop {
            nanos_per_tick: 1_000_000_000 / u128::from(hz),
        }
    }

    pub fn run(&self, stage: &mut impl Stage) {
        let mut acc = 0;
        let mut prev_time = Instant::now();
        'main: loop {
            // if vsynced, pretend frame timing is exact (see blog post
            // mentioned above)
            let mut dt = prev_time.elapsed().as_nanos();
            if should_snap(dt, NANOS_120FPS) {
                dt = NANOS_120FPS;
            } else if should_snap(dt, NANOS_60FPS) {
                dt = NANOS_60FPS;
            } else if should_snap(dt, NANOS_30FPS) {
                dt = NANOS_30FPS;
            } else if should_snap(dt, NANOS_20FPS) {
                dt = NANOS_20FPS;
            } else if should_snap(dt, NANOS_15FPS) {
                dt = NANOS_15FPS;
            }

            acc += dt;
            // limit acc to prevent spiral of death
            if acc > MAX_ACC_VALUE {
                acc = MAX_ACC_VALUE;
            }

            while acc >= self.nanos_per_tick {
                if let ControlFlow::Break(()) = stage.tick() {
                    break 'main;
                }
                acc -= self.nanos_per_tick;
            }

            stage.present();

            prev_time = Instant::now();

            thread::sleep(Duration::from_nanos((self.nanos_per_tick - acc) as u64));
        }
    }
}

fn should_snap(dt: u128, target: u128) -> bool {
    if dt < target {
        target - dt < SNAP_THRESHOLD
    } else {
        dt - target < SNAP_THRESHOLD
    }
}
