//! Fixed timestep play tick
//!
//! Advances one play deterministically. Stages run in a fixed order every
//! frame: controlled player, routes, defenders, blocking, ball, overlap,
//! tackle/score.

use glam::Vec2;
use rand::Rng;

use super::assignment::{PlayDefinition, assign_routes};
use super::ball::{Ball, BallState, BallUpdate};
use super::blocking::{BlockContext, update_blocking};
use super::collision::{Carrier, PlaySession, TackleResult, resolve_overlaps};
use super::formation::{four_three_defense, shotgun_formation};
use super::routes::{route_waypoints, update_route};
use super::scheme::{CoverageScheme, DefensiveContext, configure_coverage, select_scheme};
use super::state::{Blocker, Defender, PlayStats, Quarterback, Receiver, ReceiverRole, TeamProfile};
use super::targeting::{TargetContext, update_defender};
use super::zone::{ZoneBounds, zone_bounds};

/// A pass release requested by the controlling player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowCommand {
    pub spot: Vec2,
    /// Intended receiver index, if aimed at someone
    pub target: Option<usize>,
    pub speed: f32,
    pub apex_height: f32,
}

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement for the controlled player (quarterback or carrier)
    pub move_dir: Vec2,
    /// Release a pass this frame
    pub throw_to: Option<ThrowCommand>,
    /// Tuck the ball and run
    pub scramble: bool,
}

/// How the play stands after a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayOutcome {
    InProgress,
    Incomplete,
    Intercepted,
    Tackled { spot: Vec2 },
    Touchdown,
}

impl PlayOutcome {
    pub fn is_over(&self) -> bool {
        !matches!(self, PlayOutcome::InProgress)
    }
}

/// Everything on the field for one down
#[derive(Debug, Clone)]
pub struct PlayState {
    pub qb: Quarterback,
    pub receivers: Vec<Receiver>,
    pub blockers: Vec<Blocker>,
    pub defenders: Vec<Defender>,
    pub ball: Ball,
    pub session: PlaySession,
    pub play: PlayDefinition,
    pub scheme: CoverageScheme,
    pub line_of_scrimmage: f32,
    pub qb_is_runner: bool,
    pub offense: TeamProfile,
    pub stats: PlayStats,
    pub outcome: PlayOutcome,
}

impl PlayState {
    /// Line up, call the coverage for the situation, and snap the ball
    pub fn snap(
        play: PlayDefinition,
        offense: &TeamProfile,
        defense: &TeamProfile,
        ctx: &DefensiveContext,
        rng: &mut impl Rng,
    ) -> Self {
        let scheme = select_scheme(ctx, rng);
        Self::snap_with_scheme(play, offense, defense, ctx.line_of_scrimmage, scheme, rng)
    }

    /// Snap against a fixed coverage
    pub fn snap_with_scheme(
        play: PlayDefinition,
        offense: &TeamProfile,
        defense: &TeamProfile,
        line_of_scrimmage: f32,
        scheme: CoverageScheme,
        rng: &mut impl Rng,
    ) -> Self {
        let (qb, receivers, blockers) = shotgun_formation(line_of_scrimmage, offense);
        let defenders = four_three_defense(line_of_scrimmage, defense);
        Self::from_agents(
            qb,
            receivers,
            blockers,
            defenders,
            play,
            scheme,
            line_of_scrimmage,
            offense,
            rng,
        )
    }

    /// Snap with caller-built agent lists
    #[allow(clippy::too_many_arguments)]
    pub fn from_agents(
        mut qb: Quarterback,
        mut receivers: Vec<Receiver>,
        blockers: Vec<Blocker>,
        mut defenders: Vec<Defender>,
        play: PlayDefinition,
        scheme: CoverageScheme,
        line_of_scrimmage: f32,
        offense: &TeamProfile,
        rng: &mut impl Rng,
    ) -> Self {
        assign_routes(&mut receivers, &play, rng);
        configure_coverage(scheme, &mut defenders, &receivers, rng);

        let mut ball = Ball::new(qb.pos);
        if play.is_run() {
            let back = receivers
                .iter()
                .position(|r| r.role == ReceiverRole::RunningBack && !r.is_blocking);
            if let Some(i) = back {
                ball.give_to_receiver(i);
                receivers[i].has_ball = true;
                qb.has_ball = false;
            }
        }

        log::info!(
            "Snap: {} vs {} at the {:.0}",
            play.name,
            scheme.as_str(),
            line_of_scrimmage
        );

        Self {
            qb,
            receivers,
            blockers,
            defenders,
            ball,
            session: PlaySession::new(),
            play,
            scheme,
            line_of_scrimmage,
            qb_is_runner: false,
            offense: *offense,
            stats: PlayStats::default(),
            outcome: PlayOutcome::InProgress,
        }
    }

    /// Who currently has the ball, if anyone
    pub fn carrier(&self) -> Option<Carrier> {
        match self.ball.state {
            BallState::HeldByQb => Some(Carrier::Quarterback),
            BallState::HeldByReceiver(i) if i < self.receivers.len() => Some(Carrier::Receiver(i)),
            _ => None,
        }
    }

    pub fn carrier_pos(&self) -> Option<Vec2> {
        self.carrier().map(|c| match c {
            Carrier::Quarterback => self.qb.pos,
            Carrier::Receiver(i) => self.receivers[i].pos,
        })
    }

    /// Route drawing paths per receiver (empty for blockers)
    pub fn route_paths(&self) -> Vec<Vec<Vec2>> {
        self.receivers
            .iter()
            .map(|r| {
                if r.is_target() {
                    route_waypoints(&r.route, r.role.body_type())
                } else {
                    Vec::new()
                }
            })
            .collect()
    }

    /// Zone areas to draw, one per zone defender
    pub fn zone_areas(&self) -> Vec<(usize, ZoneBounds)> {
        if !self.scheme.uses_zone() {
            return Vec::new();
        }
        self.defenders
            .iter()
            .enumerate()
            .filter_map(|(i, d)| d.zone_role.map(|role| (i, zone_bounds(role, self.line_of_scrimmage))))
            .collect()
    }
}

/// Advance the play by one fixed timestep
pub fn tick(state: &mut PlayState, input: &TickInput, dt: f32, rng: &mut impl Rng) -> PlayOutcome {
    if state.outcome.is_over() {
        return state.outcome;
    }
    state.stats.elapsed += dt;

    // Defenders steer off where the offense stood at the start of the frame
    let qb_start = state.qb.pos;
    let receivers_start = state.receivers.clone();

    move_controlled_player(state, input, dt);

    // Routes
    let target_spot = state.ball.is_in_air().then(|| state.ball.predicted_landing());
    for (i, r) in state.receivers.iter_mut().enumerate() {
        if r.is_blocking || r.has_ball {
            continue;
        }
        let spot = target_spot.filter(|_| state.ball.target == Some(i));
        update_route(r, spot, dt);
    }

    // Defenders
    let carrier = state.carrier();
    let target_ctx = TargetContext {
        qb_pos: qb_start,
        receivers: &receivers_start,
        ball: &state.ball,
        qb_is_runner: state.qb_is_runner,
        use_zone_coverage: state.scheme.uses_zone(),
        line_of_scrimmage: state.line_of_scrimmage,
    };
    for d in state.defenders.iter_mut() {
        update_defender(d, &target_ctx, dt);
    }

    // Blocking
    let runner_pos = match carrier {
        Some(Carrier::Quarterback) if !state.qb_is_runner => None,
        _ => state.carrier_pos(),
    };
    let block_ctx = BlockContext {
        is_run: state.play.is_run(),
        run_side: state.play.run_side(),
        qb_pos: state.qb.pos,
        carrier_pos: runner_pos,
        skill_strength: state.offense.blocking_strength,
    };
    update_blocking(
        &mut state.blockers,
        &mut state.receivers,
        &mut state.defenders,
        &block_ctx,
        dt,
    );

    // Ball
    match state
        .ball
        .update(dt, state.qb.pos, &state.receivers, &state.defenders, rng)
    {
        BallUpdate::Caught(i) => {
            state.receivers[i].has_ball = true;
            if state.ball.is_pass {
                state.stats.completions += 1;
            }
            log::info!("Pass complete to receiver {} at {:.1}", i, state.receivers[i].pos.y);
        }
        BallUpdate::Incomplete(reason) => {
            log::info!("Pass incomplete ({:?})", reason);
            state.outcome = PlayOutcome::Incomplete;
        }
        BallUpdate::Intercepted(d) => {
            log::info!("Intercepted by defender {}", d);
            state.stats.interceptions += 1;
            state.outcome = PlayOutcome::Intercepted;
        }
        BallUpdate::Held | BallUpdate::InFlight | BallUpdate::Dead => {}
    }

    // Overlap
    let carrier = state.carrier();
    resolve_overlaps(
        &mut state.qb,
        &mut state.receivers,
        &mut state.blockers,
        &mut state.defenders,
        carrier,
    );

    // Tackle / score
    if let Some(c) = carrier.filter(|_| !state.outcome.is_over()) {
        state.outcome = check_carrier(state, c, rng);
    }
    state.stats.broken_tackles = state.session.broken_tackles;

    state.outcome
}

/// Quarterback movement, scramble and pass release; a carrying receiver
/// takes the input once it has the ball
fn move_controlled_player(state: &mut PlayState, input: &TickInput, dt: f32) {
    match state.ball.state {
        BallState::HeldByQb => {
            if input.scramble && !state.qb_is_runner {
                log::debug!("Quarterback scrambles");
                state.qb_is_runner = true;
            }
            state.qb.steer(input.move_dir, dt);
            if state.qb.pos.y > state.line_of_scrimmage && !state.qb_is_runner {
                log::debug!("Quarterback crossed the line with the ball");
                state.qb_is_runner = true;
            }

            if let Some(throw) = input.throw_to.filter(|_| !state.qb_is_runner) {
                state
                    .ball
                    .throw(state.qb.pos, throw.spot, throw.speed, throw.apex_height, throw.target);
                state.qb.has_ball = false;
                state.stats.pass_attempts += 1;
            }
        }
        BallState::HeldByReceiver(i) => {
            state.qb.steer(Vec2::ZERO, dt);
            if let Some(r) = state.receivers.get_mut(i) {
                r.vel = input.move_dir.normalize_or_zero() * r.speed;
                r.pos += r.vel * dt;
            }
        }
        BallState::InAir | BallState::Dead => state.qb.steer(Vec2::ZERO, dt),
    }
}

fn check_carrier(state: &mut PlayState, carrier: Carrier, rng: &mut impl Rng) -> PlayOutcome {
    let (pos, radius, role, chance) = match carrier {
        Carrier::Quarterback => (state.qb.pos, state.qb.radius, None, 0.0),
        Carrier::Receiver(i) => {
            let r = &state.receivers[i];
            (r.pos, r.radius, Some(r.role), r.tackle_break_chance)
        }
    };

    match state
        .session
        .check_tackle_or_score(pos, radius, role, chance, &mut state.defenders, rng)
    {
        TackleResult::None => PlayOutcome::InProgress,
        TackleResult::Tackle => PlayOutcome::Tackled { spot: pos },
        TackleResult::Touchdown => PlayOutcome::Touchdown,
    }
}
