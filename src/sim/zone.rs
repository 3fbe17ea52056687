//! Zone coverage geometry
//!
//! Each zone role has a fixed anchor (field-width fraction plus depth past the
//! line of scrimmage) and a rectangular area of responsibility. A zone defender
//! holds the anchor unless a route runner enters its area, in which case it
//! matches that receiver.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Defender, DefenderRole, Receiver};
use crate::consts::*;

/// Extra depth kept over the deepest receiver in a deep zone
pub const DEEP_CUSHION: f32 = 3.0;
/// How far past the bottom of its area an underneath defender carries a receiver
pub const ZONE_CARRY: f32 = 3.0;
/// Match score for a receiver inside the primary depth band
const IN_BAND_SCORE: f32 = 1000.0;
/// Match score for a receiver in the carry extension
const CARRY_SCORE: f32 = 800.0;

/// Area-of-field responsibility in zone coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneRole {
    FlatLeft,
    FlatRight,
    HookLeft,
    HookMiddle,
    HookRight,
    DeepLeft,
    DeepRight,
    DeepMiddle,
    QuarterLeft,
    QuarterRight,
}

/// Field-relative zone area used for receiver matching and drawing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBounds {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl ZoneBounds {
    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x_min && x <= self.x_max
    }
}

impl ZoneRole {
    pub fn is_deep(self) -> bool {
        matches!(
            self,
            ZoneRole::DeepLeft
                | ZoneRole::DeepRight
                | ZoneRole::DeepMiddle
                | ZoneRole::QuarterLeft
                | ZoneRole::QuarterRight
        )
    }

    /// (field-width fraction, depth, defensive-back depth)
    fn anchor_params(self) -> (f32, f32, f32) {
        match self {
            ZoneRole::FlatLeft => (0.15, 5.0, 5.0),
            ZoneRole::FlatRight => (0.85, 5.0, 5.0),
            ZoneRole::HookLeft => (0.35, 8.0, 8.0),
            ZoneRole::HookMiddle => (0.5, 9.0, 9.0),
            ZoneRole::HookRight => (0.65, 8.0, 8.0),
            ZoneRole::DeepLeft => (0.2, 13.0, 16.0),
            ZoneRole::DeepRight => (0.8, 13.0, 16.0),
            ZoneRole::DeepMiddle => (0.5, 14.0, 18.0),
            ZoneRole::QuarterLeft => (0.4, 12.0, 15.0),
            ZoneRole::QuarterRight => (0.6, 12.0, 15.0),
        }
    }

    /// (center fraction, width, min depth, max depth)
    fn area_params(self) -> (f32, f32, f32, f32) {
        match self {
            ZoneRole::FlatLeft => (0.12, 14.0, 0.0, 9.0),
            ZoneRole::FlatRight => (0.88, 14.0, 0.0, 9.0),
            ZoneRole::HookLeft => (0.35, 12.0, 3.0, 14.0),
            ZoneRole::HookMiddle => (0.5, 12.0, 3.0, 14.0),
            ZoneRole::HookRight => (0.65, 12.0, 3.0, 14.0),
            ZoneRole::DeepLeft => (0.25, FIELD_WIDTH / 2.0, 10.0, TOTAL_LENGTH),
            ZoneRole::DeepRight => (0.75, FIELD_WIDTH / 2.0, 10.0, TOTAL_LENGTH),
            ZoneRole::DeepMiddle => (0.5, 24.0, 10.0, TOTAL_LENGTH),
            ZoneRole::QuarterLeft => (0.375, FIELD_WIDTH / 4.0, 10.0, TOTAL_LENGTH),
            ZoneRole::QuarterRight => (0.625, FIELD_WIDTH / 4.0, 10.0, TOTAL_LENGTH),
        }
    }
}

/// Area of responsibility for a zone role at the given line of scrimmage
pub fn zone_bounds(role: ZoneRole, line_of_scrimmage: f32) -> ZoneBounds {
    let (center, width, depth_min, depth_max) = role.area_params();
    let center_x = center * FIELD_WIDTH;
    ZoneBounds {
        x_min: (center_x - width / 2.0).max(0.0),
        x_max: (center_x + width / 2.0).min(FIELD_WIDTH),
        y_min: line_of_scrimmage + depth_min,
        y_max: (line_of_scrimmage + depth_max).min(TOTAL_LENGTH),
    }
}

/// Static anchor for a zone role, including the defender's jitter
pub fn zone_anchor(role: ZoneRole, is_db: bool, line_of_scrimmage: f32, jitter: Vec2) -> Vec2 {
    let (frac, depth, db_depth) = role.anchor_params();
    let depth = if is_db && role.is_deep() { db_depth } else { depth };
    let x = (frac * FIELD_WIDTH + jitter.x).clamp(0.0, FIELD_WIDTH);
    let y = (line_of_scrimmage + depth + jitter.y).min(MAX_DEFENDER_DEPTH);
    Vec2::new(x, y)
}

/// Deep-zone anchor pushed back to stay over the deepest receiver in the zone's band
pub fn deep_anchor(
    role: ZoneRole,
    is_db: bool,
    jitter: Vec2,
    receivers: &[Receiver],
    line_of_scrimmage: f32,
) -> Vec2 {
    let mut anchor = zone_anchor(role, is_db, line_of_scrimmage, jitter);
    let bounds = zone_bounds(role, line_of_scrimmage);

    let deepest = receivers
        .iter()
        .filter(|r| r.is_target() && bounds.contains_x(r.pos.x))
        .map(|r| r.pos.y)
        .max_by(f32::total_cmp);

    if let Some(deepest) = deepest {
        anchor.y = anchor.y.max(deepest + DEEP_CUSHION).min(MAX_DEFENDER_DEPTH);
    }
    anchor
}

/// Best receiver for a zone defender to match, if any is in its area
fn zone_match<'a>(
    defender_pos: Vec2,
    role: ZoneRole,
    bounds: &ZoneBounds,
    receivers: &'a [Receiver],
) -> Option<&'a Receiver> {
    let mut best: Option<(&Receiver, f32)> = None;

    for r in receivers.iter().filter(|r| r.is_target()) {
        if !bounds.contains_x(r.pos.x) {
            continue;
        }
        if r.pos.y < bounds.y_min || r.pos.y > bounds.y_max + ZONE_CARRY {
            continue;
        }

        let score = if role.is_deep() {
            r.pos.y
        } else {
            let band = if r.pos.y <= bounds.y_max {
                IN_BAND_SCORE
            } else {
                CARRY_SCORE
            };
            band - defender_pos.distance(r.pos)
        };

        if best.is_none_or(|(_, s)| score > s) {
            best = Some((r, score));
        }
    }

    best.map(|(r, _)| r)
}

/// Where a zone defender should be this frame
pub fn zone_target(
    defender: &Defender,
    role: ZoneRole,
    receivers: &[Receiver],
    line_of_scrimmage: f32,
) -> Vec2 {
    let is_db = defender.role == DefenderRole::DefensiveBack;
    let bounds = zone_bounds(role, line_of_scrimmage);
    let anchor = if role.is_deep() {
        deep_anchor(role, is_db, defender.zone_jitter, receivers, line_of_scrimmage)
    } else {
        zone_anchor(role, is_db, line_of_scrimmage, defender.zone_jitter)
    };

    match zone_match(defender.pos, role, &bounds, receivers) {
        Some(r) if role.is_deep() => Vec2::new(r.pos.x, anchor.y),
        Some(r) => r.pos,
        None => anchor,
    }
}
