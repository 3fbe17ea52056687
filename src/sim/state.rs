//! Agent state and core simulation types
//!
//! Every agent is created fresh at the snap and discarded when the play ends.
//! Cross-agent links (man assignments, engaged defenders, ball holder) are plain
//! indices into the per-play agent vectors and are bounds-checked where used.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::routes::{BodyType, RouteType};
use super::zone::ZoneRole;
use crate::consts::*;

/// Attribute profile for one team, supplied by the roster layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamProfile {
    pub qb_speed: f32,
    pub qb_acceleration: f32,
    /// Velocity decay per second when the quarterback has no input
    pub qb_friction: f32,
    pub receiver_speed: f32,
    pub tight_end_speed: f32,
    pub back_speed: f32,
    pub lineman_speed: f32,
    pub defensive_line_speed: f32,
    pub linebacker_speed: f32,
    pub defensive_back_speed: f32,
    pub defender_acceleration: f32,
    /// Scales blocker push strength and engagement radius
    pub blocking_strength: f32,
    pub catch_radius_multiplier: f32,
    /// 0-1, chance to hold on to a contested catch
    pub catching_ability: f32,
    /// 0-1, chance a running back breaks a tackle attempt
    pub tackle_break_chance: f32,
    pub interception_radius_multiplier: f32,
    /// Higher values make a defender harder to move once blocked
    pub block_shed_multiplier: f32,
}

impl Default for TeamProfile {
    fn default() -> Self {
        Self {
            qb_speed: 7.0,
            qb_acceleration: 22.0,
            qb_friction: 9.0,
            receiver_speed: 8.6,
            tight_end_speed: 7.4,
            back_speed: 8.2,
            lineman_speed: 4.6,
            defensive_line_speed: 5.6,
            linebacker_speed: 7.2,
            defensive_back_speed: 8.4,
            defender_acceleration: 16.0,
            blocking_strength: 1.0,
            catch_radius_multiplier: 1.0,
            catching_ability: 0.75,
            tackle_break_chance: 0.15,
            interception_radius_multiplier: 1.0,
            block_shed_multiplier: 1.0,
        }
    }
}

/// Create the single seeded RNG a play draws every random number from
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// The quarterback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quarterback {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub has_ball: bool,
    pub speed: f32,
    pub acceleration: f32,
    pub friction: f32,
}

impl Quarterback {
    pub fn new(pos: Vec2, team: &TeamProfile) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: QB_RADIUS,
            has_ball: true,
            speed: team.qb_speed,
            acceleration: team.qb_acceleration,
            friction: team.qb_friction,
        }
    }

    /// Accelerate along the input direction, coast to a stop without input
    pub fn steer(&mut self, input: Vec2, dt: f32) {
        let dir = input.normalize_or_zero();
        if dir == Vec2::ZERO {
            let decay = (1.0 - self.friction * dt).max(0.0);
            self.vel *= decay;
        } else {
            self.vel += dir * self.acceleration * dt;
            self.vel = self.vel.clamp_length_max(self.speed);
        }
        self.pos += self.vel * dt;
    }
}

/// Skill-position receiver variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiverRole {
    WideReceiver,
    TightEnd,
    RunningBack,
}

impl ReceiverRole {
    pub fn body_type(self) -> BodyType {
        match self {
            ReceiverRole::WideReceiver => BodyType::Receiver,
            ReceiverRole::TightEnd => BodyType::TightEnd,
            ReceiverRole::RunningBack => BodyType::Back,
        }
    }
}

/// A receiver's route for the current play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub route: RouteType,
    /// Pre-snap position the route is measured from
    pub start: Vec2,
    /// +1 aligned right of center, -1 left
    pub side: f32,
    pub slant_inside: bool,
    /// Deepest Y-progress reached so far (never decreases)
    pub progress: f32,
}

impl RouteAssignment {
    pub fn new(route: RouteType, start: Vec2, side: f32) -> Self {
        Self {
            route,
            start,
            side,
            slant_inside: true,
            progress: 0.0,
        }
    }

    /// Displacement from the route start
    #[inline]
    pub fn offset(&self, pos: Vec2) -> Vec2 {
        pos - self.start
    }
}

/// A wide receiver, tight end or running back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receiver {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub role: ReceiverRole,
    pub speed: f32,
    pub route: RouteAssignment,
    pub eligible: bool,
    pub is_blocking: bool,
    pub has_ball: bool,
    pub catch_radius_multiplier: f32,
    pub catching_ability: f32,
    pub tackle_break_chance: f32,
    /// Defender index this receiver is blocking, when blocking
    #[serde(default)]
    pub engaged_with: Option<usize>,
}

impl Receiver {
    pub fn new(role: ReceiverRole, pos: Vec2, team: &TeamProfile) -> Self {
        let (radius, speed) = match role {
            ReceiverRole::WideReceiver => (RECEIVER_RADIUS, team.receiver_speed),
            ReceiverRole::TightEnd => (TIGHT_END_RADIUS, team.tight_end_speed),
            ReceiverRole::RunningBack => (BACK_RADIUS, team.back_speed),
        };
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            role,
            speed,
            route: RouteAssignment::new(RouteType::Go, pos, crate::side_of(pos.x)),
            eligible: true,
            is_blocking: false,
            has_ball: false,
            catch_radius_multiplier: team.catch_radius_multiplier,
            catching_ability: team.catching_ability,
            tackle_break_chance: team.tackle_break_chance,
            engaged_with: None,
        }
    }

    /// Eligible pass target that is running a route
    #[inline]
    pub fn is_target(&self) -> bool {
        self.eligible && !self.is_blocking
    }
}

/// Offensive line spots, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineSpot {
    LeftTackle,
    LeftGuard,
    Center,
    RightGuard,
    RightTackle,
}

impl LineSpot {
    pub const ALL: [LineSpot; 5] = [
        LineSpot::LeftTackle,
        LineSpot::LeftGuard,
        LineSpot::Center,
        LineSpot::RightGuard,
        LineSpot::RightTackle,
    ];

    pub fn is_tackle(self) -> bool {
        matches!(self, LineSpot::LeftTackle | LineSpot::RightTackle)
    }

    /// -1 for left-side spots, +1 right, 0 for the center
    pub fn side(self) -> f32 {
        match self {
            LineSpot::LeftTackle | LineSpot::LeftGuard => -1.0,
            LineSpot::Center => 0.0,
            LineSpot::RightGuard | LineSpot::RightTackle => 1.0,
        }
    }
}

/// An offensive lineman
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blocker {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Pre-snap position
    pub home: Vec2,
    pub spot: LineSpot,
    pub speed: f32,
    /// Team blocking-strength multiplier
    pub strength: f32,
    /// Defender index currently engaged
    #[serde(default)]
    pub engaged_with: Option<usize>,
}

impl Blocker {
    pub fn new(spot: LineSpot, pos: Vec2, team: &TeamProfile) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: LINEMAN_RADIUS,
            home: pos,
            spot,
            speed: team.lineman_speed,
            strength: team.blocking_strength,
            engaged_with: None,
        }
    }
}

/// Defensive position groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefenderRole {
    /// Interior lineman
    DefensiveLine,
    DefensiveEnd,
    Linebacker,
    DefensiveBack,
}

impl DefenderRole {
    pub fn is_front_seven(self) -> bool {
        !matches!(self, DefenderRole::DefensiveBack)
    }
}

/// A defender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defender {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub role: DefenderRole,
    pub speed: f32,
    pub acceleration: f32,
    pub is_rusher: bool,
    /// Man assignment (index into the receiver list)
    pub coverage_receiver: Option<usize>,
    pub zone_role: Option<ZoneRole>,
    pub is_press_coverage: bool,
    /// Lateral offset of the rush lane relative to the quarterback
    pub rush_lane_offset: f32,
    /// Small per-defender shift applied to the zone anchor
    pub zone_jitter: Vec2,
    pub is_being_blocked: bool,
    pub block_shed_multiplier: f32,
    pub interception_radius_multiplier: f32,
}

/// Speed multiplier while a blocker has hold of a defender
const BLOCKED_SPEED_FACTOR: f32 = 0.35;

impl Defender {
    pub fn new(role: DefenderRole, pos: Vec2, team: &TeamProfile) -> Self {
        let (radius, speed) = match role {
            DefenderRole::DefensiveLine => (LINEMAN_RADIUS, team.defensive_line_speed),
            DefenderRole::DefensiveEnd => (LINEMAN_RADIUS, team.defensive_line_speed * 1.1),
            DefenderRole::Linebacker => (LINEBACKER_RADIUS, team.linebacker_speed),
            DefenderRole::DefensiveBack => (DEFENSIVE_BACK_RADIUS, team.defensive_back_speed),
        };
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            role,
            speed,
            acceleration: team.defender_acceleration,
            is_rusher: false,
            coverage_receiver: None,
            zone_role: None,
            is_press_coverage: false,
            rush_lane_offset: 0.0,
            zone_jitter: Vec2::ZERO,
            is_being_blocked: false,
            block_shed_multiplier: team.block_shed_multiplier,
            interception_radius_multiplier: team.interception_radius_multiplier,
        }
    }

    /// Top speed this frame
    pub fn effective_speed(&self) -> f32 {
        if self.is_being_blocked {
            self.speed * BLOCKED_SPEED_FACTOR
        } else {
            self.speed
        }
    }

    /// Steer toward a target with limited acceleration and integrate position
    pub fn steer_toward(&mut self, target: Vec2, dt: f32) {
        let desired = (target - self.pos).normalize_or_zero() * self.effective_speed();
        let blend = (self.acceleration * dt).min(1.0);
        self.vel += (desired - self.vel) * blend;
        self.pos += self.vel * dt;
    }
}

/// Per-play counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayStats {
    pub pass_attempts: u32,
    pub completions: u32,
    pub interceptions: u32,
    pub broken_tackles: u32,
    pub elapsed: f32,
}
