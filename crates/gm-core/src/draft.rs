use crate::error::ValidationError;
use crate::player::{Player, Position, RosterStatus};
use crate::{PlayerId, ProspectId, TeamId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rounds in a standard draft.
pub const DRAFT_ROUNDS: u8 = 7;
/// Picks per round before compensatory selections.
pub const PICKS_PER_ROUND: u8 = 32;

/// A prospect's true rating. Only readable when the prospect turns pro, so
/// scouting and AI logic can never peek at it.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenRating(u8);

impl HiddenRating {
    pub fn new(rating: u8) -> Self {
        Self(rating)
    }
}

impl fmt::Debug for HiddenRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HiddenRating(..)")
    }
}

/// Consensus draft grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftGrade {
    FirstRound,
    SecondThirdRound,
    FourthFifthRound,
    SixthSeventhRound,
    Undrafted,
}

impl DraftGrade {
    pub fn label(self) -> &'static str {
        match self {
            DraftGrade::FirstRound => "1st Round",
            DraftGrade::SecondThirdRound => "2nd-3rd Round",
            DraftGrade::FourthFifthRound => "4th-5th Round",
            DraftGrade::SixthSeventhRound => "6th-7th Round",
            DraftGrade::Undrafted => "UDFA",
        }
    }
}

/// Growth curve once in the league.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DevelopmentTrait {
    Slow,
    Normal,
    Quick,
    Elite,
    Star,
}

/// Combine measurables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombineMetrics {
    /// Seconds.
    pub forty_yard: f32,
    /// Reps at 225 lb.
    pub bench_press: u8,
    /// Inches.
    pub vertical_jump: f32,
    /// Inches.
    pub broad_jump: f32,
    /// Seconds.
    pub three_cone: f32,
    /// Seconds.
    pub shuttle: f32,
}

/// Off-field grades, each 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intangibles {
    pub work_ethic: u8,
    /// Higher is riskier.
    pub injury_risk: u8,
    pub character: u8,
    pub football_iq: u8,
}

/// Where a pick sits in a draft.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSlot {
    /// Draft year.
    pub year: u16,
    /// Round, starting at 1.
    pub round: u8,
    /// Pick within the round, starting at 1.
    pub pick: u8,
    /// Overall pick number, starting at 1.
    pub overall: u16,
}

/// Record of who took a prospect and where.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Team that made the pick.
    pub team: TeamId,
    /// Where the pick was made.
    pub slot: DraftSlot,
}

/// An amateur entering the draft.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftProspect {
    /// Prospect identifier.
    pub id: ProspectId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Projected position.
    pub position: Position,
    /// College program.
    pub college: String,
    /// Height in inches.
    pub height_inches: u8,
    /// Weight in pounds.
    pub weight: u16,
    /// Age on draft day.
    pub age: u8,
    true_rating: HiddenRating,
    /// Scouts' estimate; the only rating visible before the draft.
    pub scouted_rating: u8,
    /// Consensus grade from the true rating.
    pub draft_grade: DraftGrade,
    /// Round the prospect is expected to go in.
    pub projected_round: u8,
    /// Combine measurables.
    pub combine: CombineMetrics,
    /// Off-field grades.
    pub intangibles: Intangibles,
    /// Growth curve once in the league.
    pub development_trait: DevelopmentTrait,
    /// Style comparison to a known player, for the top of the class.
    pub comparison: Option<String>,
    /// Draft the prospect is eligible for.
    pub draft_year: u16,
    /// Set once a team spends a pick on the prospect.
    pub selection: Option<Selection>,
}

impl DraftProspect {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProspectId,
        first_name: String,
        last_name: String,
        position: Position,
        college: String,
        true_rating: HiddenRating,
        scouted_rating: u8,
        draft_year: u16,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            position,
            college,
            height_inches: 74,
            weight: 220,
            age: 21,
            true_rating,
            scouted_rating,
            draft_grade: DraftGrade::Undrafted,
            projected_round: DRAFT_ROUNDS,
            combine: CombineMetrics {
                forty_yard: 4.75,
                bench_press: 20,
                vertical_jump: 30.0,
                broad_jump: 115.0,
                three_cone: 7.2,
                shuttle: 4.4,
            },
            intangibles: Intangibles {
                work_ethic: 3,
                injury_risk: 3,
                character: 3,
                football_iq: 3,
            },
            development_trait: DevelopmentTrait::Normal,
            comparison: None,
            draft_year,
            selection: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_drafted(&self) -> bool {
        self.selection.is_some()
    }

    /// Mark the prospect drafted and create the rookie's player record.
    ///
    /// The prospect stays drafted permanently; a second call fails.
    pub fn draft(
        &mut self,
        team: TeamId,
        slot: DraftSlot,
        player_id: PlayerId,
    ) -> Result<Player, ValidationError> {
        if self.is_drafted() {
            return Err(ValidationError::AlreadyDrafted(self.id.0));
        }
        self.selection = Some(Selection { team, slot });
        Ok(Player {
            id: player_id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            position: self.position,
            age: self.age,
            overall_rating: self.true_rating.0,
            accrued_seasons: 0,
            current_team: Some(team),
            roster_status: RosterStatus::Active,
            drafted: Some(slot),
        })
    }
}

/// An owned selection in a draft.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Draft year.
    pub year: u16,
    /// Round, starting at 1.
    pub round: u8,
    /// Pick within the round, starting at 1.
    pub pick: u8,
    /// Overall pick number, starting at 1.
    pub overall: u16,
    /// Team the pick was awarded to.
    pub original_team: TeamId,
    /// Team that owns the pick now.
    pub current_team: TeamId,
    /// Prospect taken with the pick, once used.
    pub selection: Option<ProspectId>,
}

impl DraftPick {
    pub fn slot(&self) -> DraftSlot {
        DraftSlot {
            year: self.year,
            round: self.round,
            pick: self.pick,
            overall: self.overall,
        }
    }

    pub fn is_used(&self) -> bool {
        self.selection.is_some()
    }
}
