//! Route geometry and route running
//!
//! Routes are driven by distance travelled from the route start, never by
//! elapsed time, so a receiver that gets knocked off pace still breaks at the
//! right spot. All geometry functions are pure: same inputs, same vector.
//!
//! Conventions: `offset` is the receiver's displacement from its route start,
//! `progress` the deepest Y-offset reached so far, `side` is +1 for a receiver
//! aligned right of center and -1 left. "Outside" is `+side`, "inside" `-side`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Receiver, ReceiverRole, RouteAssignment};

/// Upfield distance run before a slant angles off
pub const SLANT_STEM: f32 = 1.5;
/// Total displacement of a slant before it is finished
pub const SLANT_LENGTH: f32 = 9.0;
/// Lateral weight of the slant angle (upfield weight is 1)
const SLANT_LATERAL: f32 = 0.85;
/// Slant counts as finished past this fraction of its length
const SLANT_END_FRACTION: f32 = 0.9;
/// Lateral run after an out/in break
pub const BREAK_RUN_LENGTH: f32 = 10.0;
/// Upfield run after a post break
pub const POST_RUN_LENGTH: f32 = 14.0;
const POST_LATERAL: f32 = 0.6;
/// Distance a curl comes back toward the quarterback
pub const CURL_RETURN: f32 = 1.5;
const CURL_LATERAL: f32 = 0.35;
/// Lateral run of a flat route
pub const FLAT_LENGTH: f32 = 8.0;
const FLAT_RISE: f32 = 0.3;
const FLAT_END_FRACTION: f32 = 0.9;
/// How close to the break-point X an out/in receiver must be to count as breaking
const BREAK_POINT_TOLERANCE: f32 = 1.0;
/// Drift for a wide receiver whose route has run out
pub const SCRAMBLE_DRIFT: Vec2 = Vec2::new(0.0, 0.45);
/// Targeted receivers come back to the ball inside this range of the landing spot
const BALL_ADJUST_RANGE: f32 = 6.0;
const BALL_ARRIVE_RADIUS: f32 = 0.2;

/// Body-type class that sets stem lengths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    Receiver,
    TightEnd,
    Back,
}

/// Straight-upfield distances before the break
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteStems {
    pub shallow: f32,
    pub deep: f32,
}

impl BodyType {
    pub fn stems(self) -> RouteStems {
        match self {
            BodyType::Receiver => RouteStems { shallow: 5.0, deep: 12.0 },
            BodyType::TightEnd => RouteStems { shallow: 4.0, deep: 10.0 },
            BodyType::Back => RouteStems { shallow: 3.0, deep: 8.0 },
        }
    }
}

/// Route types a receiver can be assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteType {
    Go,
    Slant,
    OutShallow,
    OutDeep,
    InShallow,
    InDeep,
    PostShallow,
    PostDeep,
    /// Stem then come back to the quarterback
    Curl,
    Flat,
    /// Runs as a deep in
    DoubleMove,
}

impl RouteType {
    /// Stem length for this route (zero for routes without a vertical stem)
    pub fn stem(self, stems: RouteStems) -> f32 {
        match self {
            RouteType::Go | RouteType::Curl => stems.deep,
            RouteType::Slant => SLANT_STEM,
            RouteType::OutShallow | RouteType::InShallow | RouteType::PostShallow => stems.shallow,
            RouteType::OutDeep | RouteType::InDeep | RouteType::PostDeep | RouteType::DoubleMove => {
                stems.deep
            }
            RouteType::Flat => 0.0,
        }
    }

    pub fn is_out(self) -> bool {
        matches!(self, RouteType::OutShallow | RouteType::OutDeep)
    }

    /// Out routes mirrored to the matching in route; everything else unchanged
    pub fn mirrored_inside(self) -> Self {
        match self {
            RouteType::OutShallow => RouteType::InShallow,
            RouteType::OutDeep => RouteType::InDeep,
            other => other,
        }
    }
}

fn slant_vector(side: f32, slant_inside: bool) -> Vec2 {
    let lateral = if slant_inside { -side } else { side };
    Vec2::new(lateral * SLANT_LATERAL, 1.0).normalize()
}

fn post_vector(side: f32) -> Vec2 {
    Vec2::new(-side * POST_LATERAL, 1.0).normalize()
}

fn curl_vector(side: f32) -> Vec2 {
    Vec2::new(-side * CURL_LATERAL, -1.0).normalize()
}

fn flat_vector(side: f32) -> Vec2 {
    Vec2::new(side, FLAT_RISE).normalize()
}

/// Break toward `lateral_sign` after `stem`, finished after the lateral run
fn break_direction(offset: Vec2, stem: f32, lateral_sign: f32) -> Vec2 {
    if offset.y < stem {
        Vec2::Y
    } else if offset.x * lateral_sign < BREAK_RUN_LENGTH {
        Vec2::new(lateral_sign, 0.0)
    } else {
        Vec2::ZERO
    }
}

/// Unit direction for this frame, or zero once the route has been run
pub fn route_direction(
    route: RouteType,
    offset: Vec2,
    progress: f32,
    stems: RouteStems,
    side: f32,
    slant_inside: bool,
) -> Vec2 {
    let stem = route.stem(stems);
    match route {
        RouteType::Go => Vec2::Y,
        RouteType::Slant => {
            if offset.y < SLANT_STEM {
                Vec2::Y
            } else if offset.length() < SLANT_LENGTH {
                slant_vector(side, slant_inside)
            } else {
                Vec2::ZERO
            }
        }
        RouteType::OutShallow | RouteType::OutDeep => break_direction(offset, stem, side),
        RouteType::InShallow | RouteType::InDeep | RouteType::DoubleMove => {
            break_direction(offset, stem, -side)
        }
        RouteType::PostShallow | RouteType::PostDeep => {
            if offset.y < stem {
                Vec2::Y
            } else if offset.y < stem + POST_RUN_LENGTH {
                post_vector(side)
            } else {
                Vec2::ZERO
            }
        }
        RouteType::Curl => {
            if progress < stem {
                Vec2::Y
            } else if offset.y > stem - CURL_RETURN {
                curl_vector(side)
            } else {
                Vec2::ZERO
            }
        }
        RouteType::Flat => {
            if offset.x * side < FLAT_LENGTH {
                flat_vector(side)
            } else {
                Vec2::ZERO
            }
        }
    }
}

/// True once a receiver has reached the decisive point of its route.
///
/// Defenders use this to time undercuts; thresholds share the constants used
/// by [`route_direction`].
pub fn is_near_route_end(
    route: RouteType,
    offset: Vec2,
    progress: f32,
    stems: RouteStems,
    side: f32,
) -> bool {
    let stem = route.stem(stems);
    match route {
        RouteType::Go => offset.y >= stems.deep,
        RouteType::Slant => offset.length() >= SLANT_LENGTH * SLANT_END_FRACTION,
        RouteType::OutShallow
        | RouteType::OutDeep
        | RouteType::InShallow
        | RouteType::InDeep
        | RouteType::DoubleMove
        | RouteType::PostShallow
        | RouteType::PostDeep => offset.y >= stem && offset.x.abs() <= BREAK_POINT_TOLERANCE,
        RouteType::Curl => progress >= stem,
        RouteType::Flat => offset.x * side >= FLAT_LENGTH * FLAT_END_FRACTION,
    }
}

/// Route-end test for a receiver's current state
pub fn receiver_near_route_end(receiver: &Receiver) -> bool {
    let route = &receiver.route;
    is_near_route_end(
        route.route,
        route.offset(receiver.pos),
        route.progress,
        receiver.role.body_type().stems(),
        route.side,
    )
}

/// Waypoints of an assigned route for drawing: start, break, end
pub fn route_waypoints(assignment: &RouteAssignment, body: BodyType) -> Vec<Vec2> {
    let stems = body.stems();
    let side = assignment.side;
    let start = assignment.start;
    let stem = assignment.route.stem(stems);
    let break_point = start + Vec2::new(0.0, stem);

    let end = match assignment.route {
        RouteType::Go => start + Vec2::new(0.0, stems.deep * 2.0),
        RouteType::Slant => {
            let dir = slant_vector(side, assignment.slant_inside);
            break_point + dir * (SLANT_LENGTH - SLANT_STEM)
        }
        RouteType::OutShallow | RouteType::OutDeep => {
            break_point + Vec2::new(side * BREAK_RUN_LENGTH, 0.0)
        }
        RouteType::InShallow | RouteType::InDeep | RouteType::DoubleMove => {
            break_point + Vec2::new(-side * BREAK_RUN_LENGTH, 0.0)
        }
        RouteType::PostShallow | RouteType::PostDeep => {
            let dir = post_vector(side);
            break_point + dir * (POST_RUN_LENGTH / dir.y)
        }
        RouteType::Curl => {
            let dir = curl_vector(side);
            break_point + dir * (CURL_RETURN / dir.y.abs())
        }
        RouteType::Flat => {
            let dir = flat_vector(side);
            return vec![start, start + dir * (FLAT_LENGTH / dir.x.abs())];
        }
    };

    vec![start, break_point, end]
}

/// Advance a route-running receiver by one frame.
///
/// `ball_spot` is the predicted landing point when this receiver is the target
/// of a pass in the air; inside a short range the receiver works back to it.
pub fn update_route(receiver: &mut Receiver, ball_spot: Option<Vec2>, dt: f32) {
    let assignment = receiver.route;
    let offset = assignment.offset(receiver.pos);
    let stems = receiver.role.body_type().stems();

    let mut dir = route_direction(
        assignment.route,
        offset,
        assignment.progress,
        stems,
        assignment.side,
        assignment.slant_inside,
    );

    if dir == Vec2::ZERO && receiver.role == ReceiverRole::WideReceiver {
        dir = SCRAMBLE_DRIFT;
    }

    if let Some(spot) = ball_spot {
        let to_spot = spot - receiver.pos;
        let dist = to_spot.length();
        if dist <= BALL_ADJUST_RANGE {
            dir = if dist <= BALL_ARRIVE_RADIUS {
                Vec2::ZERO
            } else {
                to_spot / dist
            };
        }
    }

    receiver.vel = dir * receiver.speed;
    receiver.pos += receiver.vel * dt;
    receiver.route.progress = receiver.route.progress.max(assignment.offset(receiver.pos).y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::state::TeamProfile;
    use proptest::prelude::*;

    const WR: RouteStems = RouteStems { shallow: 5.0, deep: 12.0 };

    fn run(receiver: &mut Receiver, frames: usize) {
        for _ in 0..frames {
            update_route(receiver, None, SIM_DT);
        }
    }

    fn receiver_on(route: RouteType, side: f32) -> Receiver {
        let pos = Vec2::new(if side > 0.0 { 40.0 } else { 13.0 }, 30.0);
        let mut r = Receiver::new(ReceiverRole::WideReceiver, pos, &TeamProfile::default());
        r.route = RouteAssignment::new(route, pos, side);
        r
    }

    #[test]
    fn test_out_breaks_toward_sideline_at_stem() {
        let before = route_direction(RouteType::OutShallow, Vec2::new(0.0, 4.9), 4.9, WR, 1.0, true);
        assert_eq!(before, Vec2::Y);
        let after = route_direction(RouteType::OutShallow, Vec2::new(0.0, 5.0), 5.0, WR, 1.0, true);
        assert_eq!(after, Vec2::X);
        let left = route_direction(RouteType::OutShallow, Vec2::new(0.0, 5.0), 5.0, WR, -1.0, true);
        assert_eq!(left, -Vec2::X);
    }

    #[test]
    fn test_in_finishes_after_lateral_run() {
        let done = route_direction(RouteType::InDeep, Vec2::new(-10.5, 12.0), 12.0, WR, 1.0, true);
        assert_eq!(done, Vec2::ZERO);
    }

    #[test]
    fn test_double_move_runs_as_deep_in() {
        for offset in [Vec2::new(0.0, 3.0), Vec2::new(0.0, 12.0), Vec2::new(-4.0, 12.0)] {
            assert_eq!(
                route_direction(RouteType::DoubleMove, offset, offset.y, WR, -1.0, true),
                route_direction(RouteType::InDeep, offset, offset.y, WR, -1.0, true)
            );
        }
    }

    #[test]
    fn test_slant_inside_and_outside() {
        let inside = route_direction(RouteType::Slant, Vec2::new(0.0, 2.0), 2.0, WR, 1.0, true);
        let outside = route_direction(RouteType::Slant, Vec2::new(0.0, 2.0), 2.0, WR, 1.0, false);
        assert!(inside.x < 0.0 && inside.y > 0.0);
        assert!(outside.x > 0.0 && outside.y > 0.0);
    }

    #[test]
    fn test_curl_comes_back() {
        let mut r = receiver_on(RouteType::Curl, 1.0);
        run(&mut r, 200);
        let offset = r.route.offset(r.pos);
        assert!(r.route.progress >= WR.deep);
        assert!(offset.y < r.route.progress);
        assert!(offset.y <= WR.deep - CURL_RETURN + 0.2);
    }

    #[test]
    fn test_finished_receiver_drifts_instead_of_freezing() {
        let mut r = receiver_on(RouteType::OutShallow, 1.0);
        run(&mut r, 300);
        assert_eq!(r.vel, SCRAMBLE_DRIFT * r.speed);
    }

    #[test]
    fn test_finished_back_stops() {
        let pos = Vec2::new(26.0, 25.0);
        let mut rb = Receiver::new(ReceiverRole::RunningBack, pos, &TeamProfile::default());
        rb.route = RouteAssignment::new(RouteType::Flat, pos, -1.0);
        run(&mut rb, 300);
        assert_eq!(rb.vel, Vec2::ZERO);
        assert!(rb.pos.x < pos.x - FLAT_LENGTH + 0.5);
    }

    #[test]
    fn test_shoved_receiver_still_breaks_at_stem() {
        let mut r = receiver_on(RouteType::OutDeep, 1.0);
        run(&mut r, 30);
        // Knocked two yards back: must re-run the stem before breaking
        r.pos.y -= 2.0;
        let offset = r.route.offset(r.pos);
        let dir = route_direction(r.route.route, offset, r.route.progress, WR, 1.0, true);
        assert_eq!(dir, Vec2::Y);
    }

    #[test]
    fn test_near_route_end_matches_break_geometry() {
        // Just past the out break: near the end
        assert!(is_near_route_end(RouteType::OutShallow, Vec2::new(0.5, 5.0), 5.0, WR, 1.0));
        // Two yards into the lateral run: past the break point
        assert!(!is_near_route_end(RouteType::OutShallow, Vec2::new(2.0, 5.0), 5.0, WR, 1.0));
        // Still on the stem
        assert!(!is_near_route_end(RouteType::OutShallow, Vec2::new(0.0, 4.0), 4.0, WR, 1.0));
        assert!(is_near_route_end(RouteType::Go, Vec2::new(0.0, 12.0), 12.0, WR, 1.0));
        assert!(!is_near_route_end(RouteType::Slant, Vec2::new(-3.0, 5.0), 5.0, WR, 1.0));
        assert!(is_near_route_end(RouteType::Slant, Vec2::new(-5.0, 7.0), 7.0, WR, 1.0));
    }

    #[test]
    fn test_out_waypoints() {
        let assignment = RouteAssignment::new(RouteType::OutShallow, Vec2::new(45.0, 30.0), 1.0);
        let points = route_waypoints(&assignment, BodyType::Receiver);
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Vec2::new(45.0, 35.0));
        assert_eq!(points[2], Vec2::new(55.0, 35.0));
    }

    /// Run `route` frame by frame, returning (direction, near end) as seen before each step
    fn trace(route: RouteType, role: ReceiverRole, side: f32) -> Vec<(Vec2, bool)> {
        let pos = Vec2::new(if side > 0.0 { 36.0 } else { 17.0 }, 30.0);
        let mut r = Receiver::new(role, pos, &TeamProfile::default());
        r.route = RouteAssignment::new(route, pos, side);
        let stems = role.body_type().stems();
        (0..400)
            .map(|_| {
                let a = r.route;
                let offset = a.offset(r.pos);
                let dir = route_direction(a.route, offset, a.progress, stems, side, a.slant_inside);
                let near = receiver_near_route_end(&r);
                update_route(&mut r, None, SIM_DT);
                (dir, near)
            })
            .collect()
    }

    const ROLES: [ReceiverRole; 3] =
        [ReceiverRole::WideReceiver, ReceiverRole::TightEnd, ReceiverRole::RunningBack];

    #[test]
    fn test_near_route_end_fires_on_the_break() {
        let routes = [
            RouteType::OutShallow,
            RouteType::OutDeep,
            RouteType::InShallow,
            RouteType::InDeep,
            RouteType::PostShallow,
            RouteType::PostDeep,
            RouteType::Curl,
            RouteType::DoubleMove,
        ];
        for route in routes {
            for role in ROLES {
                for side in [1.0, -1.0] {
                    let frames = trace(route, role, side);
                    let brk = frames
                        .iter()
                        .position(|(dir, _)| *dir != Vec2::Y)
                        .unwrap_or_else(|| panic!("{route:?} never broke"));
                    assert!(brk > 0, "{route:?} broke off the line");
                    assert!(
                        frames[..brk].iter().all(|(_, near)| !near),
                        "{route:?} {role:?} {side}: near end on the stem"
                    );
                    assert!(frames[brk].1, "{route:?} {role:?} {side}: missed the break");
                }
            }
        }
    }

    #[test]
    fn test_near_route_end_fires_before_slant_and_flat_finish() {
        for route in [RouteType::Slant, RouteType::Flat] {
            for role in ROLES {
                for side in [1.0, -1.0] {
                    let frames = trace(route, role, side);
                    let first_near = frames
                        .iter()
                        .position(|(_, near)| *near)
                        .unwrap_or_else(|| panic!("{route:?} never ended"));
                    let finished = frames
                        .iter()
                        .position(|(dir, _)| *dir == Vec2::ZERO)
                        .unwrap_or_else(|| panic!("{route:?} never finished"));
                    assert!(first_near < finished, "{route:?} {role:?} {side}");
                    assert!(frames[first_near].0 != Vec2::Y || route == RouteType::Flat);
                    assert!(frames[finished..].iter().all(|(_, near)| *near));
                }
            }
        }
    }

    #[test]
    fn test_go_ends_at_deep_stem() {
        let frames = trace(RouteType::Go, ReceiverRole::WideReceiver, 1.0);
        assert!(frames.iter().all(|(dir, _)| *dir == Vec2::Y));
        let first_near = frames.iter().position(|(_, near)| *near).unwrap();
        // 12 yards at receiver speed, not before
        assert!(first_near as f32 * SIM_DT * TeamProfile::default().receiver_speed >= WR.deep - 0.01);
    }

    fn assert_near(a: Vec2, b: Vec2) {
        assert!(a.distance(b) < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_slant_waypoints() {
        let mut assignment = RouteAssignment::new(RouteType::Slant, Vec2::new(40.0, 30.0), 1.0);
        let points = route_waypoints(&assignment, BodyType::Receiver);
        assert_eq!(points.len(), 3);
        assert_near(points[1], Vec2::new(40.0, 30.0 + SLANT_STEM));
        assert!(points[2].x < points[1].x && points[2].y > points[1].y);
        assert!((points[1].distance(points[2]) - (SLANT_LENGTH - SLANT_STEM)).abs() < 1e-3);

        assignment.slant_inside = false;
        let outside = route_waypoints(&assignment, BodyType::Receiver);
        assert!(outside[2].x > outside[1].x);
    }

    #[test]
    fn test_post_waypoints() {
        let assignment = RouteAssignment::new(RouteType::PostShallow, Vec2::new(13.0, 30.0), -1.0);
        let points = route_waypoints(&assignment, BodyType::Receiver);
        assert_near(points[1], Vec2::new(13.0, 35.0));
        // Angles inside toward the middle of the field
        assert_near(points[2], Vec2::new(13.0 + 0.6 * POST_RUN_LENGTH, 35.0 + POST_RUN_LENGTH));
    }

    #[test]
    fn test_curl_waypoints() {
        let assignment = RouteAssignment::new(RouteType::Curl, Vec2::new(40.0, 30.0), 1.0);
        let points = route_waypoints(&assignment, BodyType::TightEnd);
        assert_near(points[1], Vec2::new(40.0, 40.0));
        assert_near(points[2], Vec2::new(40.0 - 0.35 * CURL_RETURN, 40.0 - CURL_RETURN));
    }

    #[test]
    fn test_flat_waypoints() {
        let assignment = RouteAssignment::new(RouteType::Flat, Vec2::new(26.0, 25.0), -1.0);
        let points = route_waypoints(&assignment, BodyType::Back);
        assert_eq!(points.len(), 2);
        assert_near(points[1], Vec2::new(26.0 - FLAT_LENGTH, 25.0 + 0.3 * FLAT_LENGTH));
    }

    #[test]
    fn test_mirrored_inside() {
        assert_eq!(RouteType::OutShallow.mirrored_inside(), RouteType::InShallow);
        assert_eq!(RouteType::OutDeep.mirrored_inside(), RouteType::InDeep);
        assert_eq!(RouteType::Go.mirrored_inside(), RouteType::Go);
    }

    fn any_route() -> impl Strategy<Value = RouteType> {
        prop_oneof![
            Just(RouteType::Go),
            Just(RouteType::Slant),
            Just(RouteType::OutShallow),
            Just(RouteType::OutDeep),
            Just(RouteType::InShallow),
            Just(RouteType::InDeep),
            Just(RouteType::PostShallow),
            Just(RouteType::PostDeep),
            Just(RouteType::Curl),
            Just(RouteType::Flat),
            Just(RouteType::DoubleMove),
        ]
    }

    proptest! {
        #[test]
        fn prop_route_direction_is_deterministic(
            route in any_route(),
            x in -20.0f32..20.0,
            y in -5.0f32..30.0,
            extra in 0.0f32..5.0,
            right in any::<bool>(),
            inside in any::<bool>(),
        ) {
            let side = if right { 1.0 } else { -1.0 };
            let offset = Vec2::new(x, y);
            let a = route_direction(route, offset, y + extra, WR, side, inside);
            let b = route_direction(route, offset, y + extra, WR, side, inside);
            prop_assert_eq!(a.x.to_bits(), b.x.to_bits());
            prop_assert_eq!(a.y.to_bits(), b.y.to_bits());
            prop_assert!(a == Vec2::ZERO || (a.length() - 1.0).abs() < 1e-4);
        }
    }
}
