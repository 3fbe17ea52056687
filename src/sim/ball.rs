//! Ball state machine, flight and catch adjudication
//!
//! The ball is either held (snapped to its holder), in the air on a straight
//! ground track with a parabolic height, or dead. The holder is an explicit
//! variant so "held", "in the air" and "dead" can never overlap.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Defender, DefenderRole, Receiver};
use crate::consts::*;
use crate::is_in_bounds;

/// Arc heights above this are over everyone's hands
pub const CATCHABLE_HEIGHT: f32 = 2.6;
/// Overthrow allowance as a fraction of the intended distance
const OVERTHROW_FRACTION: f32 = 0.25;
const MIN_OVERTHROW: f32 = 2.0;
const MAX_OVERTHROW: f32 = 8.0;
/// Below this intended distance flight progress is treated as complete
const MIN_INTENDED_DISTANCE: f32 = 0.01;

/// Where the ball is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    HeldByQb,
    /// Index into the receiver list
    HeldByReceiver(usize),
    InAir,
    Dead,
}

/// Why a pass fell incomplete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncompleteReason {
    AirTime,
    OutOfBounds,
    Overthrown,
    Dropped,
}

/// Result of one ball update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallUpdate {
    Held,
    InFlight,
    /// Receiver index now holding the ball
    Caught(usize),
    Incomplete(IncompleteReason),
    /// Defender index that picked it off
    Intercepted(usize),
    Dead,
}

/// The football
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Current arc height
    pub height: f32,
    pub state: BallState,
    pub throw_start: Vec2,
    pub intended_distance: f32,
    pub max_distance: f32,
    pub apex_height: f32,
    pub air_time: f32,
    /// Intended receiver of the current pass
    pub target: Option<usize>,
    /// True for forward passes (completions are counted), false for pitches
    pub is_pass: bool,
}

impl Default for Ball {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            height: 0.0,
            state: BallState::HeldByQb,
            throw_start: pos,
            intended_distance: 0.0,
            max_distance: 0.0,
            apex_height: 0.0,
            air_time: 0.0,
            target: None,
            is_pass: false,
        }
    }

    pub fn is_in_air(&self) -> bool {
        self.state == BallState::InAir
    }

    /// Release toward `spot` at `speed` with the given arc apex
    pub fn throw(&mut self, from: Vec2, spot: Vec2, speed: f32, apex_height: f32, target: Option<usize>) {
        let to_spot = spot - from;
        let distance = to_spot.length();
        let allowance = (distance * OVERTHROW_FRACTION).clamp(MIN_OVERTHROW, MAX_OVERTHROW);

        self.pos = from;
        self.throw_start = from;
        self.vel = to_spot.normalize_or_zero() * speed;
        self.intended_distance = distance;
        self.max_distance = distance + allowance;
        self.apex_height = apex_height.max(0.0);
        self.height = 0.0;
        self.air_time = 0.0;
        self.target = target;
        self.is_pass = true;
        self.state = BallState::InAir;

        log::debug!(
            "Pass thrown {:.1} yds to {:?} (max {:.1})",
            distance,
            target,
            self.max_distance
        );
    }

    /// Hand the ball to a receiver (handoff, pitch, catch)
    pub fn give_to_receiver(&mut self, index: usize) {
        self.state = BallState::HeldByReceiver(index);
        self.vel = Vec2::ZERO;
        self.height = 0.0;
        self.air_time = 0.0;
    }

    fn kill(&mut self) {
        self.state = BallState::Dead;
        self.vel = Vec2::ZERO;
        self.height = 0.0;
    }

    /// Fraction of the intended throw already covered, in [0, 1]
    pub fn flight_progress(&self) -> f32 {
        if self.intended_distance <= MIN_INTENDED_DISTANCE {
            return 1.0;
        }
        (self.pos.distance(self.throw_start) / self.intended_distance).clamp(0.0, 1.0)
    }

    /// Parabolic arc height over flight progress
    pub fn arc_height(&self) -> f32 {
        let p = self.flight_progress();
        4.0 * self.apex_height * p * (1.0 - p)
    }

    /// Where the throw was aimed
    pub fn predicted_landing(&self) -> Vec2 {
        self.throw_start + self.vel.normalize_or_zero() * self.intended_distance
    }

    /// Advance one frame.
    ///
    /// Held balls snap to their holder. In the air the checks run in order:
    /// air time, bounds, overthrow distance, arc height, interception, then the
    /// catch once the ball reaches its closest approach to the nearest receiver.
    /// A catch is contested when a defender is near the catch point.
    pub fn update(
        &mut self,
        dt: f32,
        qb_pos: Vec2,
        receivers: &[Receiver],
        defenders: &[Defender],
        rng: &mut impl Rng,
    ) -> BallUpdate {
        match self.state {
            BallState::HeldByQb => {
                self.pos = qb_pos;
                BallUpdate::Held
            }
            BallState::HeldByReceiver(i) => {
                if let Some(r) = receivers.get(i) {
                    self.pos = r.pos;
                }
                BallUpdate::Held
            }
            BallState::Dead => BallUpdate::Dead,
            BallState::InAir => self.update_flight(dt, receivers, defenders, rng),
        }
    }

    fn update_flight(
        &mut self,
        dt: f32,
        receivers: &[Receiver],
        defenders: &[Defender],
        rng: &mut impl Rng,
    ) -> BallUpdate {
        self.air_time += dt;
        self.pos += self.vel * dt;
        self.height = self.arc_height();

        if self.air_time > BALL_MAX_AIR_TIME {
            return self.incomplete(IncompleteReason::AirTime);
        }
        if !is_in_bounds(self.pos) {
            return self.incomplete(IncompleteReason::OutOfBounds);
        }
        if self.pos.distance(self.throw_start) > self.max_distance {
            return self.incomplete(IncompleteReason::Overthrown);
        }
        if self.height > CATCHABLE_HEIGHT {
            return BallUpdate::InFlight;
        }

        let nearest_receiver = receivers
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_target())
            .map(|(i, r)| (i, r.pos.distance(self.pos), r))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let r_dist = nearest_receiver.map_or(f32::INFINITY, |(_, dist, _)| dist);

        // Interception does not wait for a receiver to be in catch range
        let nearest_defender = defenders
            .iter()
            .enumerate()
            .map(|(i, d)| (i, d.pos.distance(self.pos), d))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((di, d_dist, defender)) = nearest_defender {
            if d_dist < r_dist && d_dist <= interception_radius(defender) {
                self.kill();
                log::debug!("Intercepted by defender {} ({:.2} vs {:.2})", di, d_dist, r_dist);
                return BallUpdate::Intercepted(di);
            }
        }

        let Some((ri, r_dist, receiver)) = nearest_receiver
            .filter(|(_, dist, r)| *dist <= BASE_CATCH_RADIUS * r.catch_radius_multiplier)
        else {
            return BallUpdate::InFlight;
        };

        // Decided at the ball's closest approach to the receiver
        let next_dist = (self.pos + self.vel * dt).distance(receiver.pos);
        if next_dist < r_dist {
            return BallUpdate::InFlight;
        }

        let contested = defenders
            .iter()
            .any(|d| d.pos.distance(receiver.pos) <= CONTESTED_CATCH_RADIUS);
        if contested {
            let drop_chance = 1.0 - receiver.catching_ability;
            if rng.random::<f32>() < drop_chance {
                log::debug!("Contested catch dropped by receiver {}", ri);
                return self.incomplete(IncompleteReason::Dropped);
            }
        }

        self.give_to_receiver(ri);
        log::debug!("Caught by receiver {}", ri);
        BallUpdate::Caught(ri)
    }

    fn incomplete(&mut self, reason: IncompleteReason) -> BallUpdate {
        log::debug!("Incomplete: {:?}", reason);
        self.kill();
        BallUpdate::Incomplete(reason)
    }
}

/// Effective interception radius for a defender
pub fn interception_radius(defender: &Defender) -> f32 {
    let base = match defender.role {
        DefenderRole::DefensiveBack => 1.1,
        DefenderRole::Linebacker => 0.9,
        DefenderRole::DefensiveLine | DefenderRole::DefensiveEnd => 0.6,
    };
    base * defender.interception_radius_multiplier
}
