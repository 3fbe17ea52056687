//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - One seeded RNG threaded through every call that draws
//! - Stable iteration order (agent list order)
//! - No rendering or platform dependencies

pub mod assignment;
pub mod ball;
pub mod blocking;
pub mod collision;
pub mod formation;
pub mod routes;
pub mod scheme;
pub mod state;
pub mod targeting;
pub mod tick;
pub mod zone;

pub use assignment::{FieldSide, PlayDefinition, PlayFamily, assign_routes};
pub use ball::{Ball, BallState, BallUpdate, IncompleteReason};
pub use blocking::{BlockContext, update_blocking};
pub use collision::{Carrier, PlaySession, TackleResult, resolve_overlaps};
pub use routes::{BodyType, RouteType, route_direction, route_waypoints, update_route};
pub use scheme::{
    CoverageScheme, DefensiveContext, SeasonStage, configure_coverage, select_scheme,
};
pub use state::{
    Blocker, Defender, DefenderRole, LineSpot, PlayStats, Quarterback, Receiver, ReceiverRole,
    TeamProfile, seeded_rng,
};
pub use targeting::{TargetContext, defender_target, update_defender};
pub use tick::{PlayOutcome, PlayState, ThrowCommand, TickInput, tick};
pub use zone::{ZoneBounds, ZoneRole, zone_bounds, zone_target};
