//! Gridiron - single-down American football play simulation
//!
//! Core modules:
//! - `sim`: Deterministic per-frame agent simulation (routes, coverage, blocking, ball, tackles)
//! - `settings`: Data-driven team presets and simulation settings
//! - `error`: Error type for fallible boundaries (config, parsing)

pub mod error;
pub mod settings;
pub mod sim;

pub use error::SimError;
pub use settings::{Settings, TeamPreset};

use glam::Vec2;

/// Field configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Field dimensions (yards)
    pub const FIELD_WIDTH: f32 = 53.3;
    pub const FIELD_LENGTH: f32 = 100.0;
    pub const END_ZONE_DEPTH: f32 = 10.0;
    /// End line to end line
    pub const TOTAL_LENGTH: f32 = FIELD_LENGTH + 2.0 * END_ZONE_DEPTH;
    /// The goal line the offense is attacking
    pub const FAR_GOAL_LINE: f32 = END_ZONE_DEPTH + FIELD_LENGTH;
    /// Deepest point a defender will anchor toward
    pub const MAX_DEFENDER_DEPTH: f32 = END_ZONE_DEPTH + FIELD_LENGTH - 0.5;

    /// Collision radii
    pub const QB_RADIUS: f32 = 0.6;
    pub const RECEIVER_RADIUS: f32 = 0.55;
    pub const BACK_RADIUS: f32 = 0.6;
    pub const TIGHT_END_RADIUS: f32 = 0.7;
    pub const LINEMAN_RADIUS: f32 = 0.8;
    pub const LINEBACKER_RADIUS: f32 = 0.65;
    pub const DEFENSIVE_BACK_RADIUS: f32 = 0.55;

    /// Ball flight
    pub const BALL_MAX_AIR_TIME: f32 = 3.5;
    pub const BASE_CATCH_RADIUS: f32 = 1.5;
    pub const CONTESTED_CATCH_RADIUS: f32 = 1.2;
}

/// Field X coordinate of the middle of the field
#[inline]
pub fn field_center_x() -> f32 {
    consts::FIELD_WIDTH / 2.0
}

/// True if the point is inside the sidelines and end lines
#[inline]
pub fn is_in_bounds(pos: Vec2) -> bool {
    is_inside_sidelines(pos) && pos.y >= 0.0 && pos.y <= consts::TOTAL_LENGTH
}

/// True if the point is between the sidelines (end lines ignored)
#[inline]
pub fn is_inside_sidelines(pos: Vec2) -> bool {
    pos.x >= 0.0 && pos.x <= consts::FIELD_WIDTH
}

/// Clamp a position onto the playing surface
#[inline]
pub fn clamp_to_field(pos: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(0.0, consts::FIELD_WIDTH),
        pos.y.clamp(0.0, consts::TOTAL_LENGTH),
    )
}

/// Side sign of a field X position: -1 on the left half, +1 on the right half
#[inline]
pub fn side_of(x: f32) -> f32 {
    if x >= field_center_x() { 1.0 } else { -1.0 }
}

/// Map a field position to screen pixels.
///
/// The field is drawn landscape: field Y (end line to end line) runs left to right,
/// field X (sideline to sideline) runs top to bottom. `margin` is left on every edge.
pub fn field_to_screen(pos: Vec2, screen: Vec2, margin: f32) -> Vec2 {
    let usable = (screen - Vec2::splat(2.0 * margin)).max(Vec2::ONE);
    let scale = (usable.x / consts::TOTAL_LENGTH).min(usable.y / consts::FIELD_WIDTH);
    let drawn = Vec2::new(consts::TOTAL_LENGTH, consts::FIELD_WIDTH) * scale;
    let origin = (screen - drawn) / 2.0;
    Vec2::new(origin.x + pos.y * scale, origin.y + (consts::FIELD_WIDTH - pos.x) * scale)
}
