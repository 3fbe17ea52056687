//! Defender pursuit targets
//!
//! One target point per defender per frame, resolved in priority order:
//! scrambling quarterback, ball carrier, ball in the air, rush lane, coverage.

use glam::Vec2;

use super::ball::{Ball, BallState};
use super::routes::receiver_near_route_end;
use super::state::{Defender, DefenderRole, Receiver};
use super::zone::zone_target;
use crate::side_of;

/// Off-coverage cushion a defensive back keeps until the receiver closes
pub const OFF_CUSHION: f32 = 8.0;
const TRAIL_OFFSET: f32 = 0.8;
const UNDERCUT_LATERAL: f32 = 0.8;
const UNDERCUT_LEAD: f32 = 1.0;

const DB_MAX_BREAK_DISTANCE: f32 = 18.0;
const MAX_BREAK_DISTANCE: f32 = 14.0;
const DB_BREAK_PROGRESS: f32 = 0.36;
const BREAK_PROGRESS: f32 = 0.46;
const MIN_LOOKAHEAD: f32 = 0.35;

/// Defensive ends collapse straight onto the quarterback inside this range
pub const EDGE_CLOSE_RANGE: f32 = 3.5;
const EDGE_ARC_WINDOW: f32 = 16.0;
const EDGE_LATERAL_WIDE: f32 = 7.0;
const EDGE_LATERAL_TIGHT: f32 = 1.5;
const EDGE_Y_LEAD: f32 = 2.0;

const STUNT_BLEND_START: f32 = 1.0;
const STUNT_BLEND_END: f32 = 5.5;
const STUNT_TIGHT_FACTOR: f32 = 0.35;

/// Everything a defender looks at when picking a target
#[derive(Debug, Clone, Copy)]
pub struct TargetContext<'a> {
    pub qb_pos: Vec2,
    pub receivers: &'a [Receiver],
    pub ball: &'a Ball,
    pub qb_is_runner: bool,
    pub use_zone_coverage: bool,
    pub line_of_scrimmage: f32,
}

/// Pursuit target for a defender this frame
pub fn defender_target(defender: &Defender, ctx: &TargetContext) -> Vec2 {
    if ctx.qb_is_runner {
        return ctx.qb_pos;
    }

    match ctx.ball.state {
        BallState::HeldByReceiver(i) => {
            if let Some(carrier) = ctx.receivers.get(i) {
                return carrier.pos;
            }
        }
        BallState::InAir => {
            let base = assignment_target(defender, ctx);
            return ball_focus_target(defender, ctx.ball, base);
        }
        BallState::HeldByQb | BallState::Dead => {}
    }

    assignment_target(defender, ctx)
}

/// Steer a defender toward its target for one frame
pub fn update_defender(defender: &mut Defender, ctx: &TargetContext, dt: f32) {
    let target = defender_target(defender, ctx);
    defender.steer_toward(target, dt);
}

/// Rush lane or coverage target, ignoring the ball
fn assignment_target(defender: &Defender, ctx: &TargetContext) -> Vec2 {
    if defender.is_rusher {
        rush_target(defender, ctx.qb_pos, ctx.line_of_scrimmage)
    } else {
        coverage_target(defender, ctx)
    }
}

/// How hard a defender is committed to the ball, in [0, 1]
pub fn ball_focus(defender: &Defender, ball: &Ball) -> f32 {
    let (max_break, gate_start) = if defender.role == DefenderRole::DefensiveBack {
        (DB_MAX_BREAK_DISTANCE, DB_BREAK_PROGRESS)
    } else {
        (MAX_BREAK_DISTANCE, BREAK_PROGRESS)
    };

    let dist = defender.pos.distance(ball.pos);
    let distance_focus = (1.0 - dist / max_break).clamp(0.0, 1.0);
    let gate = ((ball.flight_progress() - gate_start) / (1.0 - gate_start)).clamp(0.0, 1.0);
    distance_focus * gate
}

fn ball_focus_target(defender: &Defender, ball: &Ball, base: Vec2) -> Vec2 {
    let focus = ball_focus(defender, ball);
    if focus <= 0.0 {
        return base;
    }

    let progress = ball.flight_progress();
    let lookahead = (MIN_LOOKAHEAD + progress * focus).clamp(MIN_LOOKAHEAD, 1.0);
    let lead = ball.pos + (ball.predicted_landing() - ball.pos) * lookahead;

    let commit = match defender.role {
        DefenderRole::DefensiveBack => 1.0,
        DefenderRole::Linebacker => 0.85,
        DefenderRole::DefensiveLine | DefenderRole::DefensiveEnd => 0.6,
    };
    base.lerp(lead, focus * commit)
}

/// Rush path toward the quarterback
pub fn rush_target(defender: &Defender, qb_pos: Vec2, line_of_scrimmage: f32) -> Vec2 {
    if defender.role == DefenderRole::DefensiveEnd {
        let dist = defender.pos.distance(qb_pos);
        if dist <= EDGE_CLOSE_RANGE {
            return qb_pos;
        }
        let t = (dist / EDGE_ARC_WINDOW).clamp(0.0, 1.0);
        let lateral = EDGE_LATERAL_TIGHT + (EDGE_LATERAL_WIDE - EDGE_LATERAL_TIGHT) * t;
        let outside = if defender.rush_lane_offset != 0.0 {
            defender.rush_lane_offset.signum()
        } else {
            side_of(defender.pos.x)
        };
        return qb_pos + Vec2::new(outside * lateral, EDGE_Y_LEAD * t);
    }

    // Stunt blend: wide lane off the snap, tight once across the line
    let past_line = line_of_scrimmage - defender.pos.y;
    let t = ((past_line - STUNT_BLEND_START) / (STUNT_BLEND_END - STUNT_BLEND_START)).clamp(0.0, 1.0);
    let lane = defender.rush_lane_offset * (1.0 + (STUNT_TIGHT_FACTOR - 1.0) * t);
    qb_pos + Vec2::new(lane, 0.0)
}

fn coverage_target(defender: &Defender, ctx: &TargetContext) -> Vec2 {
    if let Some(role) = defender.zone_role.filter(|_| ctx.use_zone_coverage) {
        return zone_target(defender, role, ctx.receivers, ctx.line_of_scrimmage);
    }

    // Out-of-range indices count as no assignment
    let Some(receiver) = defender.coverage_receiver.and_then(|i| ctx.receivers.get(i)) else {
        return ctx.qb_pos;
    };

    if defender.role == DefenderRole::DefensiveBack {
        man_db_target(defender, receiver)
    } else {
        receiver.pos
    }
}

/// Off cushion, undercut at the route end, otherwise trail
fn man_db_target(defender: &Defender, receiver: &Receiver) -> Vec2 {
    let receiver_passed = receiver.pos.y >= defender.pos.y;
    if !defender.is_press_coverage
        && !receiver_passed
        && defender.pos.distance(receiver.pos) > OFF_CUSHION
    {
        return Vec2::new(receiver.pos.x, receiver.pos.y + OFF_CUSHION);
    }

    if receiver_near_route_end(receiver) {
        let inside = -receiver.route.side;
        return receiver.pos + Vec2::new(inside * UNDERCUT_LATERAL, -UNDERCUT_LEAD);
    }

    receiver.pos - receiver.vel.normalize_or_zero() * TRAIL_OFFSET
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::routes::RouteType;
    use crate::sim::state::{ReceiverRole, RouteAssignment, TeamProfile};
    use crate::sim::zone::{ZoneRole, zone_anchor};

    const LOS: f32 = 30.0;
    const QB: Vec2 = Vec2::new(26.65, 25.0);

    fn defender(role: DefenderRole, pos: Vec2) -> Defender {
        Defender::new(role, pos, &TeamProfile::default())
    }

    fn receiver(pos: Vec2) -> Receiver {
        Receiver::new(ReceiverRole::WideReceiver, pos, &TeamProfile::default())
    }

    fn ctx<'a>(receivers: &'a [Receiver], ball: &'a Ball) -> TargetContext<'a> {
        TargetContext {
            qb_pos: QB,
            receivers,
            ball,
            qb_is_runner: false,
            use_zone_coverage: true,
            line_of_scrimmage: LOS,
        }
    }

    #[test]
    fn test_scrambling_qb_first() {
        let ball = Ball::new(QB);
        let receivers = vec![receiver(Vec2::new(10.0, 40.0))];
        let mut d = defender(DefenderRole::DefensiveBack, Vec2::new(10.0, 45.0));
        d.coverage_receiver = Some(0);
        let mut c = ctx(&receivers, &ball);
        c.qb_is_runner = true;
        assert_eq!(defender_target(&d, &c), QB);
    }

    #[test]
    fn test_chase_ball_carrier() {
        let mut ball = Ball::new(QB);
        ball.give_to_receiver(0);
        let receivers = vec![receiver(Vec2::new(10.0, 40.0))];
        let d = defender(DefenderRole::Linebacker, Vec2::new(30.0, 40.0));
        assert_eq!(defender_target(&d, &ctx(&receivers, &ball)), receivers[0].pos);
    }

    #[test]
    fn test_no_break_early_in_flight() {
        let mut ball = Ball::new(QB);
        ball.throw(QB, Vec2::new(20.0, 50.0), 20.0, 5.0, Some(0));
        let receivers = vec![receiver(Vec2::new(20.0, 48.0))];
        let mut d = defender(DefenderRole::DefensiveBack, Vec2::new(22.0, 52.0));
        d.coverage_receiver = Some(0);
        d.is_press_coverage = true;
        assert_eq!(ball_focus(&d, &ball), 0.0);
        let c = ctx(&receivers, &ball);
        assert_eq!(defender_target(&d, &c), assignment_target(&d, &c));
    }

    #[test]
    fn test_close_db_breaks_late_in_flight() {
        let spot = Vec2::new(20.0, 50.0);
        let mut ball = Ball::new(QB);
        ball.throw(QB, spot, 20.0, 5.0, Some(0));
        ball.pos = QB.lerp(spot, 0.95);
        let receivers = vec![receiver(Vec2::new(18.0, 47.0))];
        let mut d = defender(DefenderRole::DefensiveBack, spot + Vec2::new(2.0, 0.0));
        d.coverage_receiver = Some(0);
        d.is_press_coverage = true;

        let focus = ball_focus(&d, &ball);
        assert!(focus > 0.7);
        let target = defender_target(&d, &ctx(&receivers, &ball));
        assert!(target.distance(spot) < 3.0);
    }

    #[test]
    fn test_focus_follows_the_ball_not_the_spot() {
        let spot = Vec2::new(26.65, 55.0);
        let mut ball = Ball::new(QB);
        ball.throw(QB, spot, 20.0, 5.0, Some(0));
        // Sitting on the landing spot
        let d = defender(DefenderRole::DefensiveBack, spot);

        ball.pos = QB.lerp(spot, 0.5);
        let gate = (0.5 - DB_BREAK_PROGRESS) / (1.0 - DB_BREAK_PROGRESS);
        let mid = ball_focus(&d, &ball);
        assert!(mid > 0.0);
        assert!(mid < gate * 0.5);

        ball.pos = QB.lerp(spot, 0.9);
        let late = ball_focus(&d, &ball);
        assert!(late > 0.6);
        assert!(late > mid);
    }

    #[test]
    fn test_defensive_end_arc() {
        let ball = Ball::new(QB);
        let mut d = defender(DefenderRole::DefensiveEnd, Vec2::new(34.0, LOS + 1.0));
        d.is_rusher = true;
        d.rush_lane_offset = 2.0;
        let target = defender_target(&d, &ctx(&[], &ball));
        assert!(target.x > QB.x + EDGE_LATERAL_TIGHT);
        assert!(target.y >= QB.y);

        d.pos = QB + Vec2::new(2.0, 1.0);
        assert_eq!(defender_target(&d, &ctx(&[], &ball)), QB);
    }

    #[test]
    fn test_lineman_lane_tightens_past_line() {
        let mut d = defender(DefenderRole::DefensiveLine, Vec2::new(28.0, LOS + 1.0));
        d.is_rusher = true;
        d.rush_lane_offset = 4.0;
        let wide = rush_target(&d, QB, LOS);
        assert_eq!(wide, QB + Vec2::new(4.0, 0.0));

        d.pos.y = LOS - 6.0;
        let tight = rush_target(&d, QB, LOS);
        assert!((tight.x - (QB.x + 4.0 * STUNT_TIGHT_FACTOR)).abs() < 1e-4);
    }

    #[test]
    fn test_zone_defender_holds_anchor() {
        let ball = Ball::new(QB);
        let mut d = defender(DefenderRole::Linebacker, Vec2::new(26.0, LOS + 5.0));
        d.zone_role = Some(ZoneRole::HookMiddle);
        let target = defender_target(&d, &ctx(&[], &ball));
        assert_eq!(target, zone_anchor(ZoneRole::HookMiddle, false, LOS, Vec2::ZERO));
    }

    #[test]
    fn test_off_coverage_cushion() {
        let ball = Ball::new(QB);
        let receivers = vec![receiver(Vec2::new(5.0, LOS - 1.0))];
        let mut d = defender(DefenderRole::DefensiveBack, Vec2::new(5.0, LOS + 9.0));
        d.coverage_receiver = Some(0);
        let target = defender_target(&d, &ctx(&receivers, &ball));
        assert_eq!(target, Vec2::new(5.0, LOS - 1.0 + OFF_CUSHION));
    }

    #[test]
    fn test_undercut_at_route_end() {
        let ball = Ball::new(QB);
        let start = Vec2::new(45.0, LOS - 1.0);
        let mut r = receiver(start + Vec2::new(0.0, 12.5));
        r.route = RouteAssignment::new(RouteType::OutDeep, start, 1.0);
        let receivers = vec![r];
        let mut d = defender(DefenderRole::DefensiveBack, start + Vec2::new(0.0, 14.0));
        d.coverage_receiver = Some(0);
        d.is_press_coverage = true;
        let target = defender_target(&d, &ctx(&receivers, &ball));
        let expected = receivers[0].pos + Vec2::new(-UNDERCUT_LATERAL, -UNDERCUT_LEAD);
        assert_eq!(target, expected);
    }

    #[test]
    fn test_trail_behind_travel() {
        let ball = Ball::new(QB);
        let mut r = receiver(Vec2::new(10.0, LOS + 3.0));
        r.route = RouteAssignment::new(RouteType::Go, Vec2::new(10.0, LOS - 1.0), -1.0);
        r.vel = Vec2::new(0.0, 8.0);
        let receivers = vec![r];
        let mut d = defender(DefenderRole::DefensiveBack, Vec2::new(11.0, LOS + 4.0));
        d.coverage_receiver = Some(0);
        let target = defender_target(&d, &ctx(&receivers, &ball));
        assert_eq!(target, Vec2::new(10.0, LOS + 3.0 - TRAIL_OFFSET));
    }

    #[test]
    fn test_linebacker_man_and_fallbacks() {
        let ball = Ball::new(QB);
        let receivers = vec![receiver(Vec2::new(15.0, LOS + 2.0))];
        let mut d = defender(DefenderRole::Linebacker, Vec2::new(20.0, LOS + 5.0));
        d.coverage_receiver = Some(0);
        assert_eq!(defender_target(&d, &ctx(&receivers, &ball)), receivers[0].pos);

        d.coverage_receiver = Some(7);
        assert_eq!(defender_target(&d, &ctx(&receivers, &ball)), QB);

        d.coverage_receiver = None;
        assert_eq!(defender_target(&d, &ctx(&receivers, &ball)), QB);
    }

    #[test]
    fn test_zone_role_ignored_in_pure_man() {
        let ball = Ball::new(QB);
        let mut d = defender(DefenderRole::DefensiveBack, Vec2::new(26.0, LOS + 12.0));
        d.zone_role = Some(ZoneRole::DeepMiddle);
        let mut c = ctx(&[], &ball);
        c.use_zone_coverage = false;
        assert_eq!(defender_target(&d, &c), QB);
    }
}
