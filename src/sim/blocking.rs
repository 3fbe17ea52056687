//! Blocking contact model
//!
//! Offensive linemen and skill players assigned to block run the same unit
//! logic: pick an anchor, pick a defender, decide whether to engage, then push
//! and slow the defender on contact.

use glam::Vec2;

use super::state::{Blocker, Defender, DefenderRole, Receiver, ReceiverRole};
use crate::field_center_x;

/// Engagement radius at blocking strength 1.0
pub const BASE_ENGAGE_RADIUS: f32 = 3.0;
const TACKLE_RADIUS_FACTOR: f32 = 1.3;
/// Tackles pick up edge rushers from further out
pub const EDGE_EMERGENCY_RADIUS: f32 = 5.5;
/// A current engagement is kept while the defender stays this close
const STICK_RANGE: f32 = 3.5;

const PASS_DROP: f32 = 1.5;
const RUN_PUSH_LATERAL: f32 = 1.5;
const RUN_PUSH_DEPTH: f32 = 2.0;
const BACKSIDE_SEAL: f32 = 1.0;
const STALK_DEPTH: f32 = 4.0;

const ANCHOR_REACHED: f32 = 1.0;
const RUN_TARGET_NEAR_ANCHOR: f32 = 2.5;
const RUN_CLOSE_ENGAGE: f32 = 1.8;
const PASS_EMERGENCY_ENGAGE: f32 = 1.2;

const CONTACT_MARGIN: f32 = 0.3;
const HOLD_STRENGTH: f32 = 2.0;
const OVERLAP_PUSH: f32 = 0.5;
/// Defenders within this distance of the ball carrier start shedding blocks
pub const SHED_RANGE: f32 = 6.0;
const SHED_HOLD_REDUCTION: f32 = 0.65;
const SHED_SPEED_BONUS: f32 = 0.6;
const TACKLE_VS_END_BONUS: f32 = 1.35;
const POST_CONTACT_DAMPING: f32 = 0.25;

/// Play-level inputs to the blocking stage
#[derive(Debug, Clone, Copy)]
pub struct BlockContext {
    pub is_run: bool,
    /// +1 run to the right, -1 left
    pub run_side: f32,
    pub qb_pos: Vec2,
    /// Ball carrier position once someone other than a pocket passer has it
    pub carrier_pos: Option<Vec2>,
    /// Team blocking strength applied to skill-position blockers
    pub skill_strength: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnitKind {
    Tackle,
    Interior,
    Skill(ReceiverRole),
}

/// Working copy of a blocker or blocking receiver
#[derive(Debug, Clone, Copy)]
struct BlockUnit {
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    home: Vec2,
    speed: f32,
    strength: f32,
    kind: UnitKind,
    engaged_with: Option<usize>,
}

impl BlockUnit {
    fn from_blocker(b: &Blocker) -> Self {
        Self {
            pos: b.pos,
            vel: b.vel,
            radius: b.radius,
            home: b.home,
            speed: b.speed,
            strength: b.strength,
            kind: if b.spot.is_tackle() {
                UnitKind::Tackle
            } else {
                UnitKind::Interior
            },
            engaged_with: b.engaged_with,
        }
    }

    fn from_receiver(r: &Receiver, strength: f32) -> Self {
        Self {
            pos: r.pos,
            vel: r.vel,
            radius: r.radius,
            home: r.route.start,
            speed: r.speed,
            strength,
            kind: UnitKind::Skill(r.role),
            engaged_with: r.engaged_with,
        }
    }

    fn base_strength(&self) -> f32 {
        match self.kind {
            UnitKind::Tackle => 1.1,
            UnitKind::Interior => 1.0,
            UnitKind::Skill(ReceiverRole::TightEnd) => 0.85,
            UnitKind::Skill(ReceiverRole::RunningBack) => 0.75,
            UnitKind::Skill(ReceiverRole::WideReceiver) => 0.6,
        }
    }

    fn is_lineman(&self) -> bool {
        !matches!(self.kind, UnitKind::Skill(_))
    }
}

/// Run the blocking stage for every blocker and blocking receiver
pub fn update_blocking(
    blockers: &mut [Blocker],
    receivers: &mut [Receiver],
    defenders: &mut [Defender],
    ctx: &BlockContext,
    dt: f32,
) {
    for d in defenders.iter_mut() {
        d.is_being_blocked = false;
    }

    for b in blockers.iter_mut() {
        let mut unit = BlockUnit::from_blocker(b);
        step_unit(&mut unit, defenders, ctx, dt);
        b.pos = unit.pos;
        b.vel = unit.vel;
        b.engaged_with = unit.engaged_with;
    }

    for r in receivers.iter_mut().filter(|r| r.is_blocking && !r.has_ball) {
        let mut unit = BlockUnit::from_receiver(r, ctx.skill_strength);
        step_unit(&mut unit, defenders, ctx, dt);
        r.pos = unit.pos;
        r.vel = unit.vel;
        r.engaged_with = unit.engaged_with;
    }
}

/// Where a unit sets up when nobody needs blocking
fn target_anchor(unit: &BlockUnit, ctx: &BlockContext) -> Vec2 {
    if !ctx.is_run {
        return match unit.kind {
            UnitKind::Skill(ReceiverRole::WideReceiver) => unit.home,
            UnitKind::Skill(ReceiverRole::RunningBack) => {
                ctx.qb_pos + Vec2::new(crate::side_of(unit.home.x), 1.0)
            }
            _ => unit.home - Vec2::new(0.0, PASS_DROP),
        };
    }

    if unit.kind == UnitKind::Skill(ReceiverRole::WideReceiver) {
        return unit.home + Vec2::new(0.0, STALK_DEPTH);
    }

    let offset = unit.home.x - field_center_x();
    let play_side = offset * ctx.run_side >= 0.0;
    if play_side {
        unit.home + Vec2::new(ctx.run_side * RUN_PUSH_LATERAL, RUN_PUSH_DEPTH)
    } else {
        unit.home + Vec2::new(ctx.run_side * BACKSIDE_SEAL, RUN_PUSH_DEPTH * 0.25)
    }
}

fn engage_radius(unit: &BlockUnit, defender: &Defender) -> f32 {
    let mut radius = BASE_ENGAGE_RADIUS * unit.strength;
    if unit.kind == UnitKind::Tackle {
        radius *= TACKLE_RADIUS_FACTOR;
        if defender.role == DefenderRole::DefensiveEnd && defender.is_rusher {
            radius = radius.max(EDGE_EMERGENCY_RADIUS * unit.strength);
        }
    }
    radius
}

/// Defender to block this frame, keeping the current one while it stays close
fn pick_defender(unit: &BlockUnit, defenders: &[Defender]) -> Option<usize> {
    let current = unit
        .engaged_with
        .filter(|&i| defenders.get(i).is_some_and(|d| d.pos.distance(unit.pos) <= STICK_RANGE));
    if current.is_some() {
        return current;
    }

    defenders
        .iter()
        .enumerate()
        .filter(|(_, d)| !unit.is_lineman() || d.is_rusher || d.role.is_front_seven())
        .map(|(i, d)| (i, d.pos.distance(unit.pos), d))
        .filter(|(_, dist, d)| *dist <= engage_radius(unit, d))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _, _)| i)
}

fn should_engage(unit: &BlockUnit, anchor: Vec2, defender: &Defender, ctx: &BlockContext) -> bool {
    let near_anchor = unit.pos.distance(anchor) <= ANCHOR_REACHED;
    let dist = unit.pos.distance(defender.pos);
    if ctx.is_run {
        near_anchor
            || defender.pos.distance(anchor) <= RUN_TARGET_NEAR_ANCHOR
            || dist <= RUN_CLOSE_ENGAGE
    } else {
        near_anchor || dist <= PASS_EMERGENCY_ENGAGE
    }
}

/// Combined push multiplier for this blocker against this defender
fn block_multiplier(unit: &BlockUnit, defender: &Defender) -> f32 {
    let ease = match defender.role {
        DefenderRole::DefensiveLine => 0.9,
        DefenderRole::DefensiveEnd => 1.0,
        DefenderRole::Linebacker => 1.1,
        DefenderRole::DefensiveBack => 1.3,
    };
    let mut mult = unit.base_strength() * unit.strength * ease;
    if unit.kind == UnitKind::Tackle && defender.role == DefenderRole::DefensiveEnd {
        mult *= TACKLE_VS_END_BONUS;
    }
    mult / defender.block_shed_multiplier.max(0.01)
}

fn engage_boost(unit: &BlockUnit, defender: &Defender, ctx: &BlockContext) -> Vec2 {
    if ctx.is_run {
        Vec2::new(ctx.run_side * 0.6, 1.0)
    } else if unit.kind == UnitKind::Tackle && defender.role == DefenderRole::DefensiveEnd {
        Vec2::new(crate::side_of(unit.home.x) * 0.8, 0.0)
    } else {
        Vec2::ZERO
    }
}

fn step_unit(unit: &mut BlockUnit, defenders: &mut [Defender], ctx: &BlockContext, dt: f32) {
    let anchor = target_anchor(unit, ctx);

    // Once engaged, stay on the defender until it gets away
    let engaged = pick_defender(unit, defenders).filter(|&i| {
        unit.engaged_with == Some(i) || should_engage(unit, anchor, &defenders[i], ctx)
    });

    let Some(i) = engaged else {
        unit.engaged_with = None;
        let to_anchor = anchor - unit.pos;
        unit.vel = if to_anchor.length() > 0.1 {
            to_anchor.normalize() * unit.speed
        } else {
            Vec2::ZERO
        };
        unit.pos += unit.vel * dt;
        return;
    };

    if unit.engaged_with != Some(i) {
        log::debug!("{:?} engages defender {}", unit.kind, i);
    }
    unit.engaged_with = Some(i);

    let defender = &mut defenders[i];
    let dir = (defender.pos - unit.pos).normalize_or_zero();
    unit.vel = dir * unit.speed + engage_boost(unit, defender, ctx);
    unit.pos += unit.vel * dt;

    let contact = unit.radius + defender.radius + CONTACT_MARGIN;
    let dist = unit.pos.distance(defender.pos);
    if dist > contact {
        return;
    }

    let mult = block_multiplier(unit, defender);
    let shed = ctx.carrier_pos.map_or(0.0, |carrier| {
        (1.0 - defender.pos.distance(carrier) / SHED_RANGE).clamp(0.0, 1.0)
    });
    let overlap = (contact - dist).max(0.0);
    let hold = HOLD_STRENGTH * dt + overlap * OVERLAP_PUSH;

    defender.pos += dir * hold * mult * (1.0 - SHED_HOLD_REDUCTION * shed);
    let slowdown = (0.14 / mult).clamp(0.05, 0.22) + SHED_SPEED_BONUS * shed;
    defender.vel *= slowdown;
    defender.is_being_blocked = true;

    unit.vel *= POST_CONTACT_DAMPING;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::routes::RouteType;
    use crate::sim::state::{LineSpot, RouteAssignment, TeamProfile};

    fn ctx(is_run: bool) -> BlockContext {
        BlockContext {
            is_run,
            run_side: 1.0,
            qb_pos: Vec2::new(26.65, 25.0),
            carrier_pos: None,
            skill_strength: 1.0,
        }
    }

    fn lineman(spot: LineSpot, x: f32, strength: f32) -> Blocker {
        let team = TeamProfile {
            blocking_strength: strength,
            ..TeamProfile::default()
        };
        Blocker::new(spot, Vec2::new(x, 29.5), &team)
    }

    fn dl(x: f32, y: f32) -> Defender {
        let mut d = Defender::new(DefenderRole::DefensiveLine, Vec2::new(x, y), &TeamProfile::default());
        d.is_rusher = true;
        d
    }

    fn push_distance(strength: f32) -> f32 {
        let mut blockers = vec![lineman(LineSpot::Center, 26.0, strength)];
        let mut defenders = vec![dl(26.0, 30.9)];
        let start = defenders[0].pos.y;
        update_blocking(&mut blockers, &mut [], &mut defenders, &ctx(true), 1.0 / 60.0);
        assert!(defenders[0].is_being_blocked);
        defenders[0].pos.y - start
    }

    #[test]
    fn test_stronger_line_pushes_further() {
        let weak = push_distance(1.0);
        let strong = push_distance(2.0);
        assert!(weak > 0.0);
        assert!(strong > weak);
    }

    #[test]
    fn test_block_flags_reset_each_frame() {
        let mut blockers = vec![lineman(LineSpot::Center, 26.0, 1.0)];
        let mut far = dl(5.0, 60.0);
        far.is_being_blocked = true;
        let mut defenders = vec![far];
        update_blocking(&mut blockers, &mut [], &mut defenders, &ctx(false), 1.0 / 60.0);
        assert!(!defenders[0].is_being_blocked);
        assert_eq!(blockers[0].engaged_with, None);
    }

    #[test]
    fn test_pass_blocker_drops_before_engaging() {
        let mut blockers = vec![lineman(LineSpot::LeftGuard, 24.0, 1.0)];
        let mut defenders = vec![dl(24.0, 31.8)];
        update_blocking(&mut blockers, &mut [], &mut defenders, &ctx(false), 1.0 / 60.0);
        assert_eq!(blockers[0].engaged_with, None);
        assert!(blockers[0].pos.y < 29.5);
    }

    #[test]
    fn test_tackle_picks_up_edge_rusher() {
        let mut blockers = vec![lineman(LineSpot::RightTackle, 30.0, 1.0)];
        let mut de = Defender::new(DefenderRole::DefensiveEnd, Vec2::new(34.5, 31.0), &TeamProfile::default());
        de.is_rusher = true;
        let unit = BlockUnit::from_blocker(&blockers[0]);
        assert_eq!(pick_defender(&unit, std::slice::from_ref(&de)), Some(0));

        let guard = BlockUnit::from_blocker(&lineman(LineSpot::RightGuard, 30.0, 1.0));
        assert_eq!(pick_defender(&guard, std::slice::from_ref(&de)), None);

        let mut defenders = vec![de];
        // Walk the tackle back into its set; it engages once there
        for _ in 0..60 {
            update_blocking(&mut blockers, &mut [], &mut defenders, &ctx(false), 1.0 / 60.0);
        }
        assert_eq!(blockers[0].engaged_with, Some(0));
    }

    #[test]
    fn test_engagement_is_sticky() {
        let mut unit = BlockUnit::from_blocker(&lineman(LineSpot::Center, 26.0, 1.0));
        let defenders = vec![dl(26.0, 31.0), dl(27.0, 32.5)];
        unit.engaged_with = Some(1);
        assert_eq!(pick_defender(&unit, &defenders), Some(1));
        unit.engaged_with = None;
        assert_eq!(pick_defender(&unit, &defenders), Some(0));
    }

    #[test]
    fn test_shed_near_carrier_weakens_hold() {
        let run = |carrier: Option<Vec2>| {
            let mut blockers = vec![lineman(LineSpot::Center, 26.0, 1.0)];
            let mut defenders = vec![dl(26.0, 30.9)];
            let mut c = ctx(true);
            c.carrier_pos = carrier;
            update_blocking(&mut blockers, &mut [], &mut defenders, &c, 1.0 / 60.0);
            defenders[0].pos.y
        };
        let free = run(None);
        let shedding = run(Some(Vec2::new(26.0, 31.5)));
        assert!(shedding < free);
    }

    #[test]
    fn test_blocking_back_picks_up_linebacker() {
        let team = TeamProfile::default();
        let mut rb = Receiver::new(ReceiverRole::RunningBack, Vec2::new(25.0, 25.0), &team);
        rb.route = RouteAssignment::new(RouteType::Flat, rb.pos, -1.0);
        rb.is_blocking = true;
        rb.eligible = false;
        let mut lb = Defender::new(DefenderRole::Linebacker, Vec2::new(25.5, 25.8), &team);
        lb.is_rusher = true;
        let mut receivers = vec![rb];
        let mut defenders = vec![lb];
        update_blocking(&mut [], &mut receivers, &mut defenders, &ctx(false), 1.0 / 60.0);
        assert_eq!(receivers[0].engaged_with, Some(0));
        assert!(defenders[0].is_being_blocked);
    }
}
