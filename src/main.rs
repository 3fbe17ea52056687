//! Gridiron entry point
//!
//! Runs one scripted down from a settings file and prints the result.
//! Usage: `gridiron [settings.json]`

use glam::Vec2;

use gridiron::error::SimResult;
use gridiron::sim::{
    BallState, PlayOutcome, PlayState, ThrowCommand, TickInput, seeded_rng, tick,
};
use gridiron::Settings;

/// Quarterback drops for this long before looking to throw
const DROP_SECONDS: f32 = 0.5;
const THROW_AT_SECONDS: f32 = 1.6;
const THROW_SPEED: f32 = 22.0;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> SimResult<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => {
            log::info!("No settings file given, using defaults");
            Settings::default()
        }
    };

    let mut rng = seeded_rng(settings.seed);
    let offense = settings.offense_profile();
    let defense = settings.defense_profile();
    let play = settings.play_definition()?;

    let mut state = match settings.forced_scheme()? {
        Some(scheme) => PlayState::snap_with_scheme(
            play,
            &offense,
            &defense,
            settings.situation.line_of_scrimmage,
            scheme,
            &mut rng,
        ),
        None => PlayState::snap(play, &offense, &defense, &settings.situation, &mut rng),
    };

    let mut outcome = PlayOutcome::InProgress;
    for _ in 0..settings.max_frames() {
        let input = scripted_input(&state);
        outcome = tick(&mut state, &input, settings.sim_dt, &mut rng);
        if outcome.is_over() {
            break;
        }
    }

    let los = state.line_of_scrimmage;
    println!("{} vs {}", state.play.name, state.scheme.as_str());
    match outcome {
        PlayOutcome::InProgress => {
            let spot = state.carrier_pos().map_or(los, |p| p.y);
            println!("Whistled dead at {:.1} ({:+.1} yds)", spot, spot - los);
        }
        PlayOutcome::Tackled { spot } => {
            println!("Tackled at {:.1} ({:+.1} yds)", spot.y, spot.y - los)
        }
        other => println!("{:?}", other),
    }
    println!(
        "{:.2}s, {} att, {} comp, {} int, {} broken tackles",
        state.stats.elapsed,
        state.stats.pass_attempts,
        state.stats.completions,
        state.stats.interceptions,
        state.stats.broken_tackles
    );

    Ok(())
}

/// Simple quarterback and carrier script: drop, throw to the most open
/// receiver, then run upfield away from the nearest defender
fn scripted_input(state: &PlayState) -> TickInput {
    let t = state.stats.elapsed;
    match state.ball.state {
        BallState::HeldByQb => {
            if t < DROP_SECONDS {
                return TickInput {
                    move_dir: Vec2::NEG_Y,
                    ..TickInput::default()
                };
            }
            if t < THROW_AT_SECONDS {
                return TickInput::default();
            }
            let throw_to = most_open_throw(state);
            TickInput {
                scramble: throw_to.is_none(),
                throw_to,
                move_dir: Vec2::Y,
            }
        }
        BallState::HeldByReceiver(i) => {
            let Some(carrier) = state.receivers.get(i) else {
                return TickInput::default();
            };
            let nearest = state
                .defenders
                .iter()
                .map(|d| d.pos)
                .min_by(|a, b| a.distance(carrier.pos).total_cmp(&b.distance(carrier.pos)));
            let dodge = nearest.map_or(0.0, |p| (carrier.pos.x - p.x).signum() * 0.5);
            TickInput {
                move_dir: Vec2::new(dodge, 1.0),
                ..TickInput::default()
            }
        }
        BallState::InAir | BallState::Dead => TickInput::default(),
    }
}

fn most_open_throw(state: &PlayState) -> Option<ThrowCommand> {
    let separation = |pos: Vec2| {
        state
            .defenders
            .iter()
            .map(|d| d.pos.distance(pos))
            .fold(f32::INFINITY, f32::min)
    };

    let (index, receiver) = state
        .receivers
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_target())
        .max_by(|a, b| separation(a.1.pos).total_cmp(&separation(b.1.pos)))?;

    let lead = state.qb.pos.distance(receiver.pos) / THROW_SPEED;
    let spot = receiver.pos + receiver.vel * lead;
    let distance = state.qb.pos.distance(spot);
    Some(ThrowCommand {
        spot,
        target: Some(index),
        speed: THROW_SPEED,
        apex_height: 1.5 + distance * 0.12,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron::sim::formation::four_verticals;
    use gridiron::sim::{CoverageScheme, TeamProfile};

    #[test]
    fn test_scripted_throw_or_scramble() {
        let mut rng = seeded_rng(3);
        let team = TeamProfile::default();
        let mut state = PlayState::snap_with_scheme(
            four_verticals(),
            &team,
            &team,
            35.0,
            CoverageScheme::Cover3Zone,
            &mut rng,
        );
        state.stats.elapsed = THROW_AT_SECONDS;

        let input = scripted_input(&state);
        assert_eq!(input.throw_to, most_open_throw(&state));
        assert!(input.throw_to.is_some());
        assert!(!input.scramble);

        // Nobody to throw to: take off
        for r in state.receivers.iter_mut() {
            r.eligible = false;
        }
        let input = scripted_input(&state);
        assert!(input.throw_to.is_none());
        assert!(input.scramble);
    }
}
