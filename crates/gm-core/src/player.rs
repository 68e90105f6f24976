use crate::draft::DraftSlot;
use crate::error::ValidationError;
use crate::{Money, PlayerId, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// On-field positions recognised by the front office.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    OT,
    OG,
    C,
    EDGE,
    DT,
    LB,
    CB,
    S,
    K,
    P,
    LS,
}

impl Position {
    /// Every position, offense first.
    pub const ALL: [Position; 15] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::OT,
        Position::OG,
        Position::C,
        Position::EDGE,
        Position::DT,
        Position::LB,
        Position::CB,
        Position::S,
        Position::K,
        Position::P,
        Position::LS,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::OT => "OT",
            Position::OG => "OG",
            Position::C => "C",
            Position::EDGE => "EDGE",
            Position::DT => "DT",
            Position::LB => "LB",
            Position::CB => "CB",
            Position::S => "S",
            Position::K => "K",
            Position::P => "P",
            Position::LS => "LS",
        }
    }

    /// Kickers, punters and long snappers.
    pub fn is_special_teams(self) -> bool {
        matches!(self, Position::K | Position::P | Position::LS)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Position::ALL
            .into_iter()
            .find(|p| p.as_str() == upper)
            .ok_or_else(|| ValidationError::UnknownPosition(s.to_string()))
    }
}

/// Roster designation of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterStatus {
    /// On the active roster.
    Active,
    /// On the practice squad.
    PracticeSquad,
    /// On injured reserve.
    InjuredReserve,
    /// Unsigned.
    FreeAgent,
}

/// A professional player, rostered or unsigned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Primary position.
    pub position: Position,
    /// Age in whole years.
    pub age: u8,
    /// Overall rating on the 40..=99 scale.
    pub overall_rating: u8,
    /// Credited seasons of service; drives the minimum salary.
    pub accrued_seasons: u8,
    /// Team holding the player's rights; `None` for unsigned players.
    pub current_team: Option<TeamId>,
    /// Roster designation.
    pub roster_status: RosterStatus,
    /// Draft slot, for players who entered through the amateur draft.
    pub drafted: Option<DraftSlot>,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_free_agent(&self) -> bool {
        self.current_team.is_none() || self.roster_status == RosterStatus::FreeAgent
    }
}

/// What a player weighs most heavily when judging offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Highest APY.
    Money,
    /// Longest deal.
    Years,
    /// A contender.
    Winning,
    /// Staying with the current team.
    Hometown,
}

/// Contract demands derived from a player's position, rating and age.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDemands {
    /// Average per year.
    pub apy: Money,
    /// Contract length asked for, in seasons.
    pub years: u8,
    /// Total guaranteed money.
    pub guaranteed: Money,
    /// What the player weighs most when scoring offers.
    pub priority: Priority,
}

impl PlayerDemands {
    pub fn total_value(&self) -> Money {
        self.apy.saturating_mul(Money::from(self.years))
    }
}

/// Free-agent classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreeAgentKind {
    /// Unrestricted.
    UFA,
    /// Restricted.
    RFA,
    /// Exclusive rights.
    ERFA,
}

/// Market record for an unsigned player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreeAgent {
    /// Unsigned player.
    pub player: PlayerId,
    /// Free-agent classification.
    pub kind: FreeAgentKind,
    /// Cached demands; recomputed from the player when absent.
    pub demands: Option<PlayerDemands>,
    /// False once the player has signed.
    pub available: bool,
    /// Team the player signed with.
    pub signed_team: Option<TeamId>,
    /// League date of the signing.
    pub signed_date: Option<NaiveDate>,
}

impl FreeAgent {
    pub fn new(player: PlayerId, kind: FreeAgentKind) -> Self {
        Self {
            player,
            kind,
            demands: None,
            available: true,
            signed_team: None,
            signed_date: None,
        }
    }
}
