use crate::league::SeasonPhase;
use crate::{Money, TeamId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

/// League minimum salary by accrued seasons; index 10 covers 10+.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinimumSalaryTable([Money; 11]);

impl MinimumSalaryTable {
    pub fn new(tiers: [Money; 11]) -> Self {
        Self(tiers)
    }

    pub fn for_accrued_seasons(&self, accrued_seasons: u8) -> Money {
        self.0[usize::from(accrued_seasons.min(10))]
    }
}

impl Default for MinimumSalaryTable {
    fn default() -> Self {
        Self([
            750_000, 870_000, 940_000, 1_000_000, 1_092_500, 1_092_500, 1_092_500, 1_250_000,
            1_250_000, 1_250_000, 1_500_000,
        ])
    }
}

/// Knobs for the AI free-agent market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeAgencyConfig {
    /// Free agents below this rating draw no AI bids.
    pub rating_floor: u8,
    /// Most free agents considered per bidding pass.
    pub pool_size: usize,
    /// Pending offers examined per signing sweep.
    pub signing_sweep_size: usize,
    /// Chance the top AI bid on a player is raised each pass.
    pub escalation_chance: f64,
    /// Chance a qualifying AI offer is signed when examined.
    pub signing_chance: f64,
    /// Offered APY over demanded APY needed before an AI signing can happen.
    pub signing_apy_ratio: f64,
}

impl Default for FreeAgencyConfig {
    fn default() -> Self {
        Self {
            rating_floor: 70,
            pool_size: 100,
            signing_sweep_size: 20,
            escalation_chance: 0.3,
            signing_chance: 0.2,
            signing_apy_ratio: 0.95,
        }
    }
}

/// Draft sizing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Rounds per draft.
    pub rounds: u8,
    /// Picks per round.
    pub picks_per_round: u8,
    /// Prospects generated per class.
    pub class_size: usize,
    /// Prospects ranked on each AI team's board.
    pub board_size: usize,
    /// Top prospects by scouted rating considered per pick.
    pub prospect_pool: usize,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            rounds: crate::DRAFT_ROUNDS,
            picks_per_round: crate::PICKS_PER_ROUND,
            class_size: 280,
            board_size: 250,
            prospect_pool: 100,
        }
    }
}

/// League-wide rules and engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// League-wide salary cap.
    pub salary_cap: Money,
    /// Minimum team payroll.
    pub salary_floor: Money,
    /// League minimum salary by service time.
    pub minimum_salaries: MinimumSalaryTable,
    /// Cap hits counted during the offseason.
    pub offseason_cap_count: usize,
    /// Cap hits counted during the season.
    pub in_season_cap_count: usize,
    /// Team controlled by the human; AI sweeps stop when it is on the clock.
    pub user_team: TeamId,
    /// Seed for deterministic runs; `None` draws from entropy.
    pub rng_seed: Option<u64>,
    /// AI free-agent market settings.
    pub free_agency: FreeAgencyConfig,
    /// Draft sizing.
    pub draft: DraftConfig,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            salary_cap: 279_200_000,
            salary_floor: 248_248_000,
            minimum_salaries: MinimumSalaryTable::default(),
            offseason_cap_count: 51,
            in_season_cap_count: 53,
            user_team: TeamId(1),
            rng_seed: None,
            free_agency: FreeAgencyConfig::default(),
            draft: DraftConfig::default(),
        }
    }
}

impl LeagueConfig {
    /// Parse from YAML; omitted keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: LeagueConfig = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading league config");
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.salary_cap <= 0 || self.salary_floor < 0 || self.salary_floor > self.salary_cap {
            return Err(ConfigError::Invalid(
                "salary floor must be within [0, cap] and cap positive".into(),
            ));
        }
        if self.offseason_cap_count == 0 || self.in_season_cap_count == 0 {
            return Err(ConfigError::Invalid("cap counts must be > 0".into()));
        }
        if self.draft.rounds == 0 || self.draft.picks_per_round == 0 {
            return Err(ConfigError::Invalid("draft needs rounds and picks".into()));
        }
        let fa = &self.free_agency;
        for (name, p) in [
            ("escalation_chance", fa.escalation_chance),
            ("signing_chance", fa.signing_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0,1]")));
            }
        }
        if !(fa.signing_apy_ratio.is_finite() && fa.signing_apy_ratio > 0.0) {
            return Err(ConfigError::Invalid("signing_apy_ratio must be > 0".into()));
        }
        Ok(())
    }

    /// How many of a team's largest cap hits count in `phase`.
    pub fn cap_count(&self, phase: SeasonPhase) -> usize {
        if phase.is_offseason() {
            self.offseason_cap_count
        } else {
            self.in_season_cap_count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_salary_caps_at_ten_seasons() {
        let t = MinimumSalaryTable::default();
        assert_eq!(t.for_accrued_seasons(0), 750_000);
        assert_eq!(t.for_accrued_seasons(4), 1_092_500);
        assert_eq!(t.for_accrued_seasons(10), 1_500_000);
        assert_eq!(t.for_accrued_seasons(14), 1_500_000);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let cfg = LeagueConfig::from_yaml_str(
            "salary_cap: 300000000\nrng_seed: 42\nfree_agency:\n  rating_floor: 75\n",
        )
        .unwrap();
        assert_eq!(cfg.salary_cap, 300_000_000);
        assert_eq!(cfg.rng_seed, Some(42));
        assert_eq!(cfg.free_agency.rating_floor, 75);
        assert_eq!(cfg.free_agency.pool_size, 100);
        assert_eq!(cfg.offseason_cap_count, 51);
    }

    #[test]
    fn invalid_probability_rejected() {
        let err = LeagueConfig::from_yaml_str("free_agency:\n  signing_chance: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = LeagueConfig::from_yaml_str("salary_cap: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped = include_str!("../../../assets/config/league.yaml");
        assert_eq!(LeagueConfig::from_yaml_str(shipped).unwrap(), LeagueConfig::default());
    }

    #[test]
    fn cap_count_follows_phase() {
        let cfg = LeagueConfig::default();
        assert_eq!(cfg.cap_count(SeasonPhase::FreeAgency), 51);
        assert_eq!(cfg.cap_count(SeasonPhase::RegularSeason), 53);
    }
}
