//! Contact resolution: overlap separation, tackles and touchdowns
//!
//! Separation keeps agents from stacking on top of each other. The ball
//! carrier is exempt from separation against defenders so that contact can
//! turn into a tackle.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::Rng;

use super::state::{Blocker, Defender, Quarterback, Receiver, ReceiverRole};
use crate::consts::*;
use crate::is_inside_sidelines;

/// Extra spacing kept between any two agents
pub const OVERLAP_BUFFER: f32 = 0.1;
/// Carrier must get this far from the break point before a broken defender can tackle again
pub const REENGAGE_SEPARATION: f32 = 3.5;
/// Broken defenders are shoved out to this distance from the carrier
pub const BREAK_SEPARATION: f32 = 2.0;

/// Outcome of the end-of-frame tackle check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TackleResult {
    None,
    Tackle,
    Touchdown,
}

/// Who has the ball as a runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Quarterback,
    Receiver(usize),
}

/// Per-play contact bookkeeping, created at the snap and dropped with the play
#[derive(Debug, Clone, Default)]
pub struct PlaySession {
    /// Defender index -> carrier position when the tackle was broken
    broken: BTreeMap<usize, Vec2>,
    /// Defenders that already had their one break attempt
    break_used: BTreeSet<usize>,
    pub broken_tackles: u32,
}

impl PlaySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_broken(&self, defender: usize) -> bool {
        self.broken.contains_key(&defender)
    }

    /// True once the carrier has separated far enough from where `defender` was
    /// shed. Clears the broken mark when that happens.
    pub fn can_reengage_after_broken_tackle(&mut self, defender: usize, carrier_pos: Vec2) -> bool {
        match self.broken.get(&defender) {
            None => true,
            Some(point) if carrier_pos.distance(*point) >= REENGAGE_SEPARATION => {
                self.broken.remove(&defender);
                true
            }
            Some(_) => false,
        }
    }

    /// End-of-frame check: sideline, goal line, then defender contact.
    ///
    /// Only a running back can break a tackle, once per defender per play.
    pub fn check_tackle_or_score(
        &mut self,
        carrier_pos: Vec2,
        carrier_radius: f32,
        carrier_role: Option<ReceiverRole>,
        tackle_break_chance: f32,
        defenders: &mut [Defender],
        rng: &mut impl Rng,
    ) -> TackleResult {
        if !is_inside_sidelines(carrier_pos) {
            log::info!("Carrier out of bounds at {:.1}", carrier_pos.y);
            return TackleResult::Tackle;
        }
        if carrier_pos.y >= FAR_GOAL_LINE {
            log::info!("Touchdown");
            return TackleResult::Touchdown;
        }

        let can_break = carrier_role == Some(ReceiverRole::RunningBack);

        for (i, d) in defenders.iter_mut().enumerate() {
            let contact = carrier_radius + d.radius;
            if d.pos.distance(carrier_pos) > contact {
                continue;
            }
            if !self.can_reengage_after_broken_tackle(i, carrier_pos) {
                continue;
            }
            if !can_break || !self.break_used.insert(i) {
                log::info!("Tackled by defender {} at {:.1}", i, carrier_pos.y);
                return TackleResult::Tackle;
            }
            if rng.random::<f32>() < tackle_break_chance {
                let away = (d.pos - carrier_pos).try_normalize().unwrap_or(Vec2::Y);
                d.pos = carrier_pos + away * BREAK_SEPARATION;
                d.vel = Vec2::ZERO;
                self.broken.insert(i, carrier_pos);
                self.broken_tackles += 1;
                log::info!("Broken tackle on defender {}", i);
                continue;
            }
            log::info!("Tackled by defender {} at {:.1}", i, carrier_pos.y);
            return TackleResult::Tackle;
        }

        TackleResult::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyRef {
    Quarterback,
    Receiver(usize),
    Blocker(usize),
    Defender(usize),
}

/// Separate every overlapping pair of agents by half the overlap each.
///
/// Exempt pairs: the ball carrier against defenders, and a blocking running
/// back against the quarterback.
pub fn resolve_overlaps(
    qb: &mut Quarterback,
    receivers: &mut [Receiver],
    blockers: &mut [Blocker],
    defenders: &mut [Defender],
    carrier: Option<Carrier>,
) {
    let carrier_ref = carrier.map(|c| match c {
        Carrier::Quarterback => BodyRef::Quarterback,
        Carrier::Receiver(i) => BodyRef::Receiver(i),
    });

    let mut bodies: Vec<(BodyRef, Vec2, f32)> = Vec::with_capacity(1 + receivers.len() + blockers.len() + defenders.len());
    bodies.push((BodyRef::Quarterback, qb.pos, qb.radius));
    bodies.extend(receivers.iter().enumerate().map(|(i, r)| (BodyRef::Receiver(i), r.pos, r.radius)));
    bodies.extend(blockers.iter().enumerate().map(|(i, b)| (BodyRef::Blocker(i), b.pos, b.radius)));
    bodies.extend(defenders.iter().enumerate().map(|(i, d)| (BodyRef::Defender(i), d.pos, d.radius)));

    let exempt = |a: BodyRef, b: BodyRef| -> bool {
        let is_carrier = |x: BodyRef| Some(x) == carrier_ref;
        let is_defender = |x: BodyRef| matches!(x, BodyRef::Defender(_));
        let is_blocking_back = |x: BodyRef| match x {
            BodyRef::Receiver(i) => receivers
                .get(i)
                .is_some_and(|r| r.role == ReceiverRole::RunningBack && r.is_blocking),
            _ => false,
        };
        (is_carrier(a) && is_defender(b))
            || (is_carrier(b) && is_defender(a))
            || (a == BodyRef::Quarterback && is_blocking_back(b))
            || (b == BodyRef::Quarterback && is_blocking_back(a))
    };

    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let (a, pa, ra) = bodies[i];
            let (b, pb, rb) = bodies[j];
            if exempt(a, b) {
                continue;
            }
            let min_dist = ra + rb + OVERLAP_BUFFER;
            let delta = pb - pa;
            let dist = delta.length();
            if dist >= min_dist {
                continue;
            }
            // Coincident agents split along a fixed axis
            let axis = if dist > 1e-4 { delta / dist } else { Vec2::X };
            let push = axis * (min_dist - dist) * 0.5;
            bodies[i].1 -= push;
            bodies[j].1 += push;
        }
    }

    for (body, pos, _) in bodies {
        match body {
            BodyRef::Quarterback => qb.pos = pos,
            BodyRef::Receiver(i) => receivers[i].pos = pos,
            BodyRef::Blocker(i) => blockers[i].pos = pos,
            BodyRef::Defender(i) => defenders[i].pos = pos,
        }
    }
}
