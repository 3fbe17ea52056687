//! Route assignment at the snap
//!
//! Maps a play's per-slot route table onto the receiver list, decides route
//! sides from alignment, and turns backs/tight ends into blockers when the
//! play asks for it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::routes::RouteType;
use super::state::{Receiver, ReceiverRole, RouteAssignment};
use crate::side_of;

/// Pass or run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayFamily {
    Pass,
    Run,
}

/// Left or right half of the formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSide {
    Left,
    Right,
}

impl FieldSide {
    pub fn sign(self) -> f32 {
        match self {
            FieldSide::Left => -1.0,
            FieldSide::Right => 1.0,
        }
    }
}

/// A called play, supplied by the play-call layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayDefinition {
    pub name: String,
    pub family: PlayFamily,
    /// Route per receiver slot, indexed like the receiver list
    pub routes: Vec<RouteType>,
    /// Explicit slant direction per slot (`None` = inside)
    #[serde(default)]
    pub slant_inside: Vec<Option<bool>>,
    #[serde(default)]
    pub rb_blocks: bool,
    #[serde(default)]
    pub te_blocks: bool,
    /// Designed side for the running back (and the run on run plays)
    #[serde(default)]
    pub back_side: Option<FieldSide>,
}

impl PlayDefinition {
    pub fn is_run(&self) -> bool {
        self.family == PlayFamily::Run
    }

    /// Run direction sign; undesignated runs go right
    pub fn run_side(&self) -> f32 {
        self.back_side.map_or(1.0, FieldSide::sign)
    }
}

/// Indices of the outermost wide receiver on the left and right halves
fn outermost_receivers(receivers: &[Receiver]) -> (Option<usize>, Option<usize>) {
    let mut left: Option<usize> = None;
    let mut right: Option<usize> = None;

    for (i, r) in receivers.iter().enumerate() {
        if r.role != ReceiverRole::WideReceiver {
            continue;
        }
        if side_of(r.pos.x) < 0.0 {
            if left.is_none_or(|l| r.pos.x < receivers[l].pos.x) {
                left = Some(i);
            }
        } else if right.is_none_or(|j| r.pos.x > receivers[j].pos.x) {
            right = Some(i);
        }
    }

    (left, right)
}

/// Assign routes, sides and blocking roles for the snap.
///
/// Draws from `rng` only for a running back with no designed side on a pass play.
pub fn assign_routes(receivers: &mut [Receiver], play: &PlayDefinition, rng: &mut impl Rng) {
    let (outer_left, outer_right) = outermost_receivers(receivers);

    for (i, receiver) in receivers.iter_mut().enumerate() {
        let mut side = side_of(receiver.pos.x);
        if receiver.role == ReceiverRole::RunningBack {
            side = match play.back_side {
                Some(designed) => designed.sign(),
                None if !play.is_run() => {
                    if rng.random_bool(0.5) {
                        1.0
                    } else {
                        -1.0
                    }
                }
                None => side,
            };
        }

        let mut route = play.routes.get(i).copied().unwrap_or(RouteType::Go);
        let is_outermost = Some(i) == outer_left || Some(i) == outer_right;
        if is_outermost && route.is_out() {
            route = route.mirrored_inside();
        }

        let blocks = match receiver.role {
            ReceiverRole::RunningBack => play.rb_blocks,
            ReceiverRole::TightEnd => play.te_blocks,
            ReceiverRole::WideReceiver => play.is_run(),
        };

        let mut assignment = RouteAssignment::new(route, receiver.pos, side);
        assignment.slant_inside = play.slant_inside.get(i).copied().flatten().unwrap_or(true);

        receiver.has_ball = false;
        receiver.engaged_with = None;
        if blocks {
            assignment.route = RouteType::Flat;
            receiver.eligible = false;
            receiver.is_blocking = true;
        } else {
            receiver.eligible = true;
            receiver.is_blocking = false;
        }
        receiver.route = assignment;

        log::debug!(
            "slot {}: {:?} {:?} side {} blocking {}",
            i,
            receiver.role,
            receiver.route.route,
            side,
            blocks
        );
    }
}
