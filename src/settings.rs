//! Simulation settings and team presets
//!
//! Loaded from a JSON file; every field is optional and falls back to its default.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::error::{SimError, SimResult};
use crate::sim::assignment::PlayDefinition;
use crate::sim::formation::playbook;
use crate::sim::scheme::{CoverageScheme, DefensiveContext};
use crate::sim::state::TeamProfile;

/// Team quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TeamPreset {
    #[default]
    Balanced,
    Elite,
    Underdog,
}

impl TeamPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamPreset::Balanced => "Balanced",
            TeamPreset::Elite => "Elite",
            TeamPreset::Underdog => "Underdog",
        }
    }

    /// Attribute profile for this preset
    pub fn profile(&self) -> TeamProfile {
        let base = TeamProfile::default();
        let (speed, skill) = match self {
            TeamPreset::Balanced => return base,
            TeamPreset::Elite => (1.06, 1.15),
            TeamPreset::Underdog => (0.94, 0.88),
        };

        TeamProfile {
            qb_speed: base.qb_speed * speed,
            receiver_speed: base.receiver_speed * speed,
            tight_end_speed: base.tight_end_speed * speed,
            back_speed: base.back_speed * speed,
            lineman_speed: base.lineman_speed * speed,
            defensive_line_speed: base.defensive_line_speed * speed,
            linebacker_speed: base.linebacker_speed * speed,
            defensive_back_speed: base.defensive_back_speed * speed,
            blocking_strength: base.blocking_strength * skill,
            catch_radius_multiplier: base.catch_radius_multiplier * skill.sqrt(),
            catching_ability: (base.catching_ability * skill).min(0.95),
            tackle_break_chance: (base.tackle_break_chance * skill * skill).min(0.5),
            interception_radius_multiplier: base.interception_radius_multiplier * skill,
            block_shed_multiplier: base.block_shed_multiplier * skill,
            ..base
        }
    }
}

impl FromStr for TeamPreset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "balanced" | "average" => Ok(TeamPreset::Balanced),
            "elite" => Ok(TeamPreset::Elite),
            "underdog" => Ok(TeamPreset::Underdog),
            _ => Err(SimError::InvalidArgument(format!("unknown team preset '{s}'"))),
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Fixed timestep in seconds
    pub sim_dt: f32,
    /// Plays still running after this long are whistled dead
    pub max_play_seconds: f32,
    pub seed: u64,

    // === Teams ===
    pub offense: TeamPreset,
    pub defense: TeamPreset,
    /// Full profile replacing the offense preset
    pub offense_override: Option<TeamProfile>,
    /// Full profile replacing the defense preset
    pub defense_override: Option<TeamProfile>,

    // === Play ===
    pub situation: DefensiveContext,
    /// Play name from the stock playbook
    pub play: String,
    /// Skip the situational draw and use this coverage
    pub forced_scheme: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sim_dt: SIM_DT,
            max_play_seconds: 12.0,
            seed: 0x5EED,

            offense: TeamPreset::Balanced,
            defense: TeamPreset::Balanced,
            offense_override: None,
            defense_override: None,

            situation: DefensiveContext::default(),
            play: "Four Verticals".into(),
            forced_scheme: None,
        }
    }
}

impl Settings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> SimResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.sim_dt.is_finite() && self.sim_dt > 0.0) {
            return Err(SimError::InvalidArgument(format!("sim_dt must be positive, got {}", self.sim_dt)));
        }
        if !(self.max_play_seconds.is_finite() && self.max_play_seconds > 0.0) {
            return Err(SimError::InvalidArgument(format!(
                "max_play_seconds must be positive, got {}",
                self.max_play_seconds
            )));
        }
        self.play_definition()?;
        self.forced_scheme()?;
        Ok(())
    }

    pub fn offense_profile(&self) -> TeamProfile {
        self.offense_override.unwrap_or_else(|| self.offense.profile())
    }

    pub fn defense_profile(&self) -> TeamProfile {
        self.defense_override.unwrap_or_else(|| self.defense.profile())
    }

    /// The configured play from the stock playbook
    pub fn play_definition(&self) -> SimResult<PlayDefinition> {
        playbook()
            .into_iter()
            .find(|p| p.name.eq_ignore_ascii_case(&self.play))
            .ok_or_else(|| SimError::InvalidArgument(format!("unknown play '{}'", self.play)))
    }

    /// Parsed forced coverage, if one is set
    pub fn forced_scheme(&self) -> SimResult<Option<CoverageScheme>> {
        self.forced_scheme.as_deref().map(str::parse::<CoverageScheme>).transpose()
    }

    /// Frame cap for one play
    pub fn max_frames(&self) -> usize {
        (self.max_play_seconds / self.sim_dt).ceil() as usize
    }
}
