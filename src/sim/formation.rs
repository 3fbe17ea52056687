//! Pre-snap alignments and stock play calls

use glam::Vec2;

use super::assignment::{FieldSide, PlayDefinition, PlayFamily};
use super::routes::RouteType;
use super::state::{
    Blocker, Defender, DefenderRole, LineSpot, Quarterback, Receiver, ReceiverRole, TeamProfile,
};
use crate::field_center_x;

/// Shotgun depth behind the line
pub const SHOTGUN_DEPTH: f32 = 5.0;
/// Linemen set just behind the ball
const LINE_SET_DEPTH: f32 = 0.5;
const LINE_SPACING: f32 = 1.8;
const RECEIVER_SET_DEPTH: f32 = 1.0;

/// Shotgun, 3 wide with a tight end and a back beside the quarterback.
///
/// Receiver order: left wide, slot right, right wide, tight end, running back.
pub fn shotgun_formation(
    line_of_scrimmage: f32,
    team: &TeamProfile,
) -> (Quarterback, Vec<Receiver>, Vec<Blocker>) {
    let cx = field_center_x();
    let los = line_of_scrimmage;

    let qb = Quarterback::new(Vec2::new(cx, los - SHOTGUN_DEPTH), team);

    let receivers = vec![
        Receiver::new(ReceiverRole::WideReceiver, Vec2::new(4.0, los - RECEIVER_SET_DEPTH), team),
        Receiver::new(ReceiverRole::WideReceiver, Vec2::new(cx + 13.0, los - RECEIVER_SET_DEPTH), team),
        Receiver::new(ReceiverRole::WideReceiver, Vec2::new(49.0, los - RECEIVER_SET_DEPTH), team),
        Receiver::new(
            ReceiverRole::TightEnd,
            Vec2::new(cx + 3.0 * LINE_SPACING, los - LINE_SET_DEPTH),
            team,
        ),
        Receiver::new(ReceiverRole::RunningBack, Vec2::new(cx - 1.5, los - SHOTGUN_DEPTH), team),
    ];

    let blockers = LineSpot::ALL
        .iter()
        .enumerate()
        .map(|(i, &spot)| {
            let x = cx + (i as f32 - 2.0) * LINE_SPACING;
            Blocker::new(spot, Vec2::new(x, los - LINE_SET_DEPTH), team)
        })
        .collect();

    (qb, receivers, blockers)
}

/// 4-3 base: two ends, two tackles, three linebackers, two corners, two safeties
pub fn four_three_defense(line_of_scrimmage: f32, team: &TeamProfile) -> Vec<Defender> {
    let cx = field_center_x();
    let los = line_of_scrimmage;
    let spots = [
        (DefenderRole::DefensiveEnd, cx - 5.5, 1.0),
        (DefenderRole::DefensiveLine, cx - 1.5, 1.0),
        (DefenderRole::DefensiveLine, cx + 1.5, 1.0),
        (DefenderRole::DefensiveEnd, cx + 5.5, 1.0),
        (DefenderRole::Linebacker, cx - 5.0, 5.0),
        (DefenderRole::Linebacker, cx, 5.0),
        (DefenderRole::Linebacker, cx + 5.0, 5.0),
        (DefenderRole::DefensiveBack, 5.0, 7.0),
        (DefenderRole::DefensiveBack, cx - 8.0, 12.0),
        (DefenderRole::DefensiveBack, cx + 8.0, 12.0),
        (DefenderRole::DefensiveBack, 48.0, 7.0),
    ];

    spots
        .iter()
        .map(|&(role, x, depth)| Defender::new(role, Vec2::new(x, los + depth), team))
        .collect()
}

/// Four verticals with the back checking down to the flat
pub fn four_verticals() -> PlayDefinition {
    PlayDefinition {
        name: "Four Verticals".into(),
        family: PlayFamily::Pass,
        routes: vec![
            RouteType::Go,
            RouteType::Go,
            RouteType::Go,
            RouteType::Go,
            RouteType::Flat,
        ],
        slant_inside: Vec::new(),
        rb_blocks: false,
        te_blocks: false,
        back_side: None,
    }
}

/// Slants outside, flat from the back
pub fn slant_flat() -> PlayDefinition {
    PlayDefinition {
        name: "Slant Flat".into(),
        family: PlayFamily::Pass,
        routes: vec![
            RouteType::Slant,
            RouteType::OutShallow,
            RouteType::Slant,
            RouteType::InShallow,
            RouteType::Flat,
        ],
        slant_inside: Vec::new(),
        rb_blocks: false,
        te_blocks: false,
        back_side: Some(FieldSide::Left),
    }
}

/// Curls outside with a post from the slot; tight end stays in
pub fn curl_flat() -> PlayDefinition {
    PlayDefinition {
        name: "Curl Flat".into(),
        family: PlayFamily::Pass,
        routes: vec![
            RouteType::Curl,
            RouteType::PostDeep,
            RouteType::Curl,
            RouteType::Flat,
            RouteType::Flat,
        ],
        slant_inside: Vec::new(),
        rb_blocks: false,
        te_blocks: true,
        back_side: Some(FieldSide::Right),
    }
}

/// Handoff to the back, right side
pub fn inside_run() -> PlayDefinition {
    PlayDefinition {
        name: "Inside Run".into(),
        family: PlayFamily::Run,
        routes: vec![RouteType::Go; 5],
        slant_inside: Vec::new(),
        rb_blocks: false,
        te_blocks: true,
        back_side: Some(FieldSide::Right),
    }
}

/// Every stock play, in menu order
pub fn playbook() -> Vec<PlayDefinition> {
    vec![four_verticals(), slant_flat(), curl_flat(), inside_run()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shotgun_alignment() {
        let team = TeamProfile::default();
        let (qb, receivers, blockers) = shotgun_formation(35.0, &team);
        assert!(qb.pos.y < 35.0);
        assert_eq!(receivers.len(), 5);
        assert_eq!(blockers.len(), 5);
        assert!(receivers.iter().all(|r| r.pos.y < 35.0));
        assert!(blockers.windows(2).all(|w| w[0].pos.x < w[1].pos.x));
        assert_eq!(blockers[2].spot, LineSpot::Center);
    }

    #[test]
    fn test_defense_is_across_the_line() {
        let defenders = four_three_defense(35.0, &TeamProfile::default());
        assert_eq!(defenders.len(), 11);
        assert!(defenders.iter().all(|d| d.pos.y > 35.0));
        let count = |role| defenders.iter().filter(|d| d.role == role).count();
        assert_eq!(count(DefenderRole::DefensiveEnd), 2);
        assert_eq!(count(DefenderRole::DefensiveLine), 2);
        assert_eq!(count(DefenderRole::Linebacker), 3);
        assert_eq!(count(DefenderRole::DefensiveBack), 4);
    }

    #[test]
    fn test_playbook_routes_cover_every_slot() {
        for play in playbook() {
            assert_eq!(play.routes.len(), 5, "{}", play.name);
        }
        assert!(inside_run().is_run());
    }
}
