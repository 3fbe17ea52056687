//! Coverage scheme selection and defensive configuration
//!
//! A scheme is drawn from situational weight tables, filtered by what the
//! season stage allows, then mapped onto defender groups (rushers, man
//! assignments, zone roles).

use std::str::FromStr;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{Defender, DefenderRole, Receiver};
use super::zone::ZoneRole;
use crate::consts::*;
use crate::error::SimError;
use crate::field_center_x;

/// The six defensive shells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverageScheme {
    /// Man everywhere, everyone else rushes
    Cover0,
    /// Man with a single deep-middle safety
    Cover1,
    Cover2Zone,
    Cover3Zone,
    Cover4Zone,
    /// Man underneath, two deep halves
    Cover2Man,
}

impl CoverageScheme {
    /// Fixed draw order
    pub const ALL: [CoverageScheme; 6] = [
        CoverageScheme::Cover0,
        CoverageScheme::Cover1,
        CoverageScheme::Cover2Zone,
        CoverageScheme::Cover3Zone,
        CoverageScheme::Cover4Zone,
        CoverageScheme::Cover2Man,
    ];

    pub fn index(self) -> usize {
        match self {
            CoverageScheme::Cover0 => 0,
            CoverageScheme::Cover1 => 1,
            CoverageScheme::Cover2Zone => 2,
            CoverageScheme::Cover3Zone => 3,
            CoverageScheme::Cover4Zone => 4,
            CoverageScheme::Cover2Man => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoverageScheme::Cover0 => "cover0",
            CoverageScheme::Cover1 => "cover1",
            CoverageScheme::Cover2Zone => "cover2",
            CoverageScheme::Cover3Zone => "cover3",
            CoverageScheme::Cover4Zone => "cover4",
            CoverageScheme::Cover2Man => "cover2man",
        }
    }

    /// True when some defenders play zone responsibilities
    pub fn uses_zone(self) -> bool {
        self != CoverageScheme::Cover0
    }
}

impl FromStr for CoverageScheme {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "cover0" => Ok(CoverageScheme::Cover0),
            "cover1" => Ok(CoverageScheme::Cover1),
            "cover2" | "cover2zone" => Ok(CoverageScheme::Cover2Zone),
            "cover3" | "cover3zone" => Ok(CoverageScheme::Cover3Zone),
            "cover4" | "cover4zone" => Ok(CoverageScheme::Cover4Zone),
            "cover2man" => Ok(CoverageScheme::Cover2Man),
            _ => Err(SimError::InvalidArgument(format!("unknown coverage scheme '{s}'"))),
        }
    }
}

/// Where in the season the game is played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeasonStage {
    #[default]
    RegularSeason,
    Playoffs,
    Championship,
}

impl SeasonStage {
    /// Schemes the defense has installed at this stage
    pub fn coverage_pool(self) -> &'static [CoverageScheme] {
        match self {
            SeasonStage::RegularSeason => &[CoverageScheme::Cover2Zone, CoverageScheme::Cover3Zone],
            SeasonStage::Playoffs => &[
                CoverageScheme::Cover1,
                CoverageScheme::Cover2Zone,
                CoverageScheme::Cover3Zone,
                CoverageScheme::Cover4Zone,
                CoverageScheme::Cover2Man,
            ],
            SeasonStage::Championship => &CoverageScheme::ALL,
        }
    }
}

/// Game situation the defense reads before the snap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefensiveContext {
    pub line_of_scrimmage: f32,
    /// Yards to a first down
    pub distance: f32,
    pub down: u8,
    /// Defending team's score
    pub score: u32,
    /// Opponent's score
    pub away_score: u32,
    pub season_stage: SeasonStage,
}

impl Default for DefensiveContext {
    fn default() -> Self {
        Self {
            line_of_scrimmage: END_ZONE_DEPTH + 25.0,
            distance: 10.0,
            down: 1,
            score: 0,
            away_score: 0,
            season_stage: SeasonStage::RegularSeason,
        }
    }
}

/// Situational bucket, checked in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    RedZone,
    LongYardage,
    ShortYardage,
    ProtectingLead,
    Trailing,
    Baseline,
}

const RED_ZONE_YARDS: f32 = 20.0;
const LONG_YARDAGE: f32 = 8.0;
const SHORT_YARDAGE: f32 = 2.0;
/// Red-zone short yardage leans aggressive too
const RED_ZONE_GOAL_TO_GO: f32 = 3.0;
const SCORE_MARGIN: i64 = 8;

const RED_ZONE_BLEND: f32 = 0.6;
const LONG_YARDAGE_BLEND: f32 = 0.55;
const SHORT_YARDAGE_BLEND: f32 = 0.6;
const LEAD_BLEND: f32 = 0.5;
const TRAILING_BLEND: f32 = 0.45;

/// Half-width of random zone anchor jitter
const ZONE_JITTER: f32 = 0.75;
/// Largest lateral rush-lane offset for interior rushers
const MAX_RUSH_LANE: f32 = 4.0;
const END_RUSH_LANE: f32 = 2.0;

/// Weight per scheme, in [`CoverageScheme::ALL`] order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchemeWeights(pub [f32; 6]);

impl SchemeWeights {
    pub const BASELINE: Self = Self([0.05, 0.20, 0.25, 0.30, 0.10, 0.10]);
    pub const AGGRESSIVE: Self = Self([0.25, 0.35, 0.10, 0.15, 0.05, 0.10]);
    pub const CONSERVATIVE: Self = Self([0.00, 0.10, 0.30, 0.30, 0.25, 0.05]);
    pub const SHORT_YARDAGE: Self = Self([0.30, 0.35, 0.05, 0.15, 0.00, 0.15]);
    pub const LONG_YARDAGE: Self = Self([0.00, 0.10, 0.25, 0.25, 0.35, 0.05]);
    pub const RED_ZONE: Self = Self([0.15, 0.30, 0.20, 0.10, 0.05, 0.20]);

    pub fn get(&self, scheme: CoverageScheme) -> f32 {
        self.0[scheme.index()]
    }

    /// Linear blend toward `other` by `t`
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        let mut out = [0.0; 6];
        for (i, w) in out.iter_mut().enumerate() {
            *w = self.0[i] + (other.0[i] - self.0[i]) * t;
        }
        Self(out)
    }

    pub fn total(&self) -> f32 {
        self.0.iter().map(|w| w.max(0.0)).sum()
    }

    /// Zero every scheme outside `pool`; falls back to an even two-zone split if nothing is left
    pub fn filtered(&self, pool: &[CoverageScheme]) -> Self {
        let mut out = [0.0; 6];
        for scheme in pool {
            out[scheme.index()] = self.get(*scheme).max(0.0);
        }
        let filtered = Self(out);
        if filtered.total() > 0.0 {
            filtered
        } else {
            log::debug!("coverage pool empty after filtering, using fallback");
            Self::fallback()
        }
    }

    pub fn fallback() -> Self {
        let mut out = [0.0; 6];
        out[CoverageScheme::Cover2Zone.index()] = 0.5;
        out[CoverageScheme::Cover3Zone.index()] = 0.5;
        Self(out)
    }
}

/// Classify the situation, highest priority first
pub fn classify(ctx: &DefensiveContext) -> Situation {
    let yards_to_goal = FAR_GOAL_LINE - ctx.line_of_scrimmage;
    let margin = ctx.score as i64 - ctx.away_score as i64;

    if yards_to_goal <= RED_ZONE_YARDS {
        Situation::RedZone
    } else if ctx.down >= 2 && ctx.distance >= LONG_YARDAGE {
        Situation::LongYardage
    } else if ctx.distance <= SHORT_YARDAGE {
        Situation::ShortYardage
    } else if margin >= SCORE_MARGIN {
        Situation::ProtectingLead
    } else if margin <= -SCORE_MARGIN {
        Situation::Trailing
    } else {
        Situation::Baseline
    }
}

/// Blended and stage-filtered weights for a situation
pub fn scheme_weights(ctx: &DefensiveContext) -> SchemeWeights {
    let base = SchemeWeights::BASELINE;
    let blended = match classify(ctx) {
        Situation::RedZone => {
            let target = if ctx.distance <= RED_ZONE_GOAL_TO_GO {
                SchemeWeights::RED_ZONE.lerp(&SchemeWeights::AGGRESSIVE, 0.5)
            } else {
                SchemeWeights::RED_ZONE
            };
            base.lerp(&target, RED_ZONE_BLEND)
        }
        Situation::LongYardage => base.lerp(&SchemeWeights::LONG_YARDAGE, LONG_YARDAGE_BLEND),
        Situation::ShortYardage => base.lerp(&SchemeWeights::SHORT_YARDAGE, SHORT_YARDAGE_BLEND),
        Situation::ProtectingLead => base.lerp(&SchemeWeights::CONSERVATIVE, LEAD_BLEND),
        Situation::Trailing => base.lerp(&SchemeWeights::AGGRESSIVE, TRAILING_BLEND),
        Situation::Baseline => base,
    };
    blended.filtered(ctx.season_stage.coverage_pool())
}

/// Weighted random draw over the fixed scheme order
pub fn draw_scheme(weights: &SchemeWeights, rng: &mut impl Rng) -> CoverageScheme {
    let total = weights.total();
    let mut roll = rng.random::<f32>() * total;
    let mut last = None;

    for scheme in CoverageScheme::ALL {
        let w = weights.get(scheme);
        if w <= 0.0 {
            continue;
        }
        last = Some(scheme);
        roll -= w;
        if roll <= 0.0 {
            return scheme;
        }
    }

    // Rounding can leave a sliver of roll; `filtered` guarantees a positive weight exists
    last.unwrap_or(CoverageScheme::Cover3Zone)
}

/// Pick the defensive shell for this snap
pub fn select_scheme(ctx: &DefensiveContext, rng: &mut impl Rng) -> CoverageScheme {
    let weights = scheme_weights(ctx);
    let scheme = draw_scheme(&weights, rng);
    log::info!(
        "Coverage {} ({:?}, {:?} & {:.0})",
        scheme.as_str(),
        classify(ctx),
        ctx.season_stage,
        ctx.distance
    );
    scheme
}

/// Zone roles handed out to each defender group, in left-to-right order
struct ShellRoles {
    corners: &'static [ZoneRole],
    safeties: &'static [ZoneRole],
    linebackers: &'static [ZoneRole],
    corners_press: bool,
}

fn shell_roles(scheme: CoverageScheme) -> ShellRoles {
    use ZoneRole::*;
    match scheme {
        CoverageScheme::Cover0 => ShellRoles {
            corners: &[],
            safeties: &[],
            linebackers: &[],
            corners_press: true,
        },
        CoverageScheme::Cover1 => ShellRoles {
            corners: &[],
            safeties: &[DeepMiddle],
            linebackers: &[],
            corners_press: true,
        },
        CoverageScheme::Cover2Zone => ShellRoles {
            corners: &[FlatLeft, FlatRight],
            safeties: &[DeepLeft, DeepRight],
            linebackers: &[HookLeft, HookMiddle, HookRight],
            corners_press: false,
        },
        CoverageScheme::Cover3Zone => ShellRoles {
            corners: &[DeepLeft, DeepRight],
            safeties: &[DeepMiddle, FlatRight],
            linebackers: &[FlatLeft, HookLeft, HookRight],
            corners_press: false,
        },
        CoverageScheme::Cover4Zone => ShellRoles {
            corners: &[DeepLeft, DeepRight],
            safeties: &[QuarterLeft, QuarterRight],
            linebackers: &[FlatLeft, HookMiddle, FlatRight],
            corners_press: false,
        },
        CoverageScheme::Cover2Man => ShellRoles {
            corners: &[],
            safeties: &[DeepLeft, DeepRight],
            linebackers: &[],
            corners_press: true,
        },
    }
}

/// Indices of defenders with `role`, sorted left to right
fn group_by_x(defenders: &[Defender], role: DefenderRole) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..defenders.len())
        .filter(|&i| defenders[i].role == role)
        .collect();
    idx.sort_by(|&a, &b| defenders[a].pos.x.total_cmp(&defenders[b].pos.x));
    idx
}

/// Nearest unassigned receiver to `pos`
fn take_nearest(pos: Vec2, open: &mut Vec<usize>, receivers: &[Receiver]) -> Option<usize> {
    let (slot, _) = open
        .iter()
        .enumerate()
        .min_by(|a, b| {
            pos.distance(receivers[*a.1].pos)
                .total_cmp(&pos.distance(receivers[*b.1].pos))
        })?;
    Some(open.remove(slot))
}

fn random_jitter(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.random_range(-ZONE_JITTER..=ZONE_JITTER),
        rng.random_range(-ZONE_JITTER..=ZONE_JITTER),
    )
}

/// Map a scheme onto the defense: rushers, man assignments, zone roles, press.
///
/// Defensive linemen always rush. Groups are handed zone roles left to right;
/// anyone left over takes the nearest open receiver in man, and front-seven
/// players with nothing to cover rush.
pub fn configure_coverage(
    scheme: CoverageScheme,
    defenders: &mut [Defender],
    receivers: &[Receiver],
    rng: &mut impl Rng,
) {
    let roles = shell_roles(scheme);
    let center = field_center_x();

    for d in defenders.iter_mut() {
        d.is_rusher = false;
        d.coverage_receiver = None;
        d.zone_role = None;
        d.is_press_coverage = false;
        d.is_being_blocked = false;
        d.zone_jitter = Vec2::ZERO;
        d.rush_lane_offset = 0.0;
    }

    // Route runners left to right
    let mut open: Vec<usize> = (0..receivers.len())
        .filter(|&i| receivers[i].is_target())
        .collect();
    open.sort_by(|&a, &b| receivers[a].pos.x.total_cmp(&receivers[b].pos.x));

    // Front four
    for d in defenders.iter_mut() {
        match d.role {
            DefenderRole::DefensiveEnd => {
                d.is_rusher = true;
                d.rush_lane_offset = crate::side_of(d.pos.x) * END_RUSH_LANE;
            }
            DefenderRole::DefensiveLine => {
                d.is_rusher = true;
                d.rush_lane_offset = (d.pos.x - center).clamp(-MAX_RUSH_LANE, MAX_RUSH_LANE);
            }
            _ => {}
        }
    }

    // Corners are the widest defensive backs; everyone else in the secondary is a safety
    let dbs = group_by_x(defenders, DefenderRole::DefensiveBack);
    let (corners, safeties): (Vec<usize>, Vec<usize>) = if dbs.len() >= 2 {
        let corners = vec![dbs[0], dbs[dbs.len() - 1]];
        let safeties = dbs[1..dbs.len() - 1].to_vec();
        (corners, safeties)
    } else {
        (dbs.clone(), Vec::new())
    };
    let linebackers = group_by_x(defenders, DefenderRole::Linebacker);

    // Zone roles first so man defenders only see receivers nobody is zoning
    let groups: [(&[usize], &[ZoneRole]); 3] = [
        (corners.as_slice(), roles.corners),
        (safeties.as_slice(), roles.safeties),
        (linebackers.as_slice(), roles.linebackers),
    ];
    let mut needs_man: Vec<usize> = Vec::new();
    for (members, zones) in groups {
        for (k, &i) in members.iter().enumerate() {
            match zones.get(k) {
                Some(&zone) => {
                    defenders[i].zone_role = Some(zone);
                    defenders[i].zone_jitter = random_jitter(rng);
                }
                None => needs_man.push(i),
            }
        }
    }

    // Corners lock on to the outside receivers first
    for &i in &corners {
        if defenders[i].zone_role.is_some() || open.is_empty() {
            continue;
        }
        let pick = if defenders[i].pos.x < center {
            open.remove(0)
        } else {
            open.remove(open.len() - 1)
        };
        defenders[i].coverage_receiver = Some(pick);
        defenders[i].is_press_coverage = roles.corners_press;
    }

    for &i in &needs_man {
        let d = &mut defenders[i];
        if d.coverage_receiver.is_some() {
            continue;
        }
        if let Some(pick) = take_nearest(d.pos, &mut open, receivers) {
            d.coverage_receiver = Some(pick);
        } else if d.role.is_front_seven() {
            d.is_rusher = true;
            d.rush_lane_offset = (d.pos.x - center).clamp(-MAX_RUSH_LANE, MAX_RUSH_LANE);
        }
    }

    log::debug!(
        "{}: {} rushers, {} in man, {} in zone",
        scheme.as_str(),
        defenders.iter().filter(|d| d.is_rusher).count(),
        defenders.iter().filter(|d| d.coverage_receiver.is_some()).count(),
        defenders.iter().filter(|d| d.zone_role.is_some()).count()
    );
}
