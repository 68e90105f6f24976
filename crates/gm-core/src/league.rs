use crate::config::LeagueConfig;
use crate::contract::{Contract, ContractOffer, FaOffer, OfferStatus};
use crate::draft::{DraftPick, DraftProspect};
use crate::error::ValidationError;
use crate::player::{FreeAgent, Player, Position, RosterStatus};
use crate::{ContractId, Money, OfferId, PlayerId, ProspectId, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A franchise and its running cap position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Full club name.
    pub name: String,
    /// Short code, e.g. "KC".
    pub abbreviation: String,
    /// Space left under the cap; never negative in a consistent save.
    pub current_cap_space: Money,
    /// Unused space carried over from last season.
    pub rollover_cap: Money,
    /// Dead money from released contracts charged this season.
    #[serde(default)]
    pub dead_money: Money,
    /// Dead money deferred to next season by post-June 1 releases.
    #[serde(default)]
    pub deferred_dead_money: Money,
}

/// Phase of the league calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeasonPhase {
    PostSeason,
    PreFreeAgency,
    FreeAgency,
    PreDraft,
    Draft,
    PostDraft,
    TrainingCamp,
    RegularSeason,
    Playoffs,
}

impl SeasonPhase {
    /// Offseason accounting counts only the top 51 cap hits.
    pub fn is_offseason(self) -> bool {
        !matches!(self, SeasonPhase::RegularSeason | SeasonPhase::Playoffs)
    }
}

/// Head count and average rating at one position on a roster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionDepth {
    /// Active players at the position.
    pub count: u32,
    /// `None` when nobody plays the position.
    pub avg_rating: Option<f64>,
}

/// Kind of roster move recorded in the transaction log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Free-agent signing.
    Signing,
    /// Contract terminated by the team.
    Release,
    /// Base salary converted into prorated bonus.
    Restructure,
    /// Rookie added through the draft.
    DraftSelection,
}

/// Entry in the league transaction log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// League date of the move.
    pub date: NaiveDate,
    /// Team making the move.
    pub team: TeamId,
    /// Player affected.
    pub player: PlayerId,
    /// Kind of move.
    pub kind: TransactionKind,
    /// Human-readable summary, e.g. "4 years, $80000000 total, $48000000 guaranteed".
    pub detail: String,
}

/// Complete persisted state of one save.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeagueState {
    /// League rules the save was created with.
    pub config: LeagueConfig,
    /// Current league year.
    pub season: u16,
    /// Current phase of the calendar.
    pub phase: SeasonPhase,
    /// Current league date.
    pub date: NaiveDate,
    /// Every franchise.
    pub teams: Vec<Team>,
    /// Every player, rostered or not.
    pub players: Vec<Player>,
    /// Active and historical contracts.
    pub contracts: Vec<Contract>,
    /// Market records, signed or still available.
    pub free_agents: Vec<FreeAgent>,
    /// Market offers in every status.
    pub offers: Vec<FaOffer>,
    /// Draft classes, drafted or not.
    pub prospects: Vec<DraftProspect>,
    /// Draft picks, used or not.
    pub picks: Vec<DraftPick>,
    /// Transaction log, oldest first.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

fn unique<I: IntoIterator<Item = u32>>(kind: &'static str, ids: I) -> Result<BTreeSet<u32>, ValidationError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId { kind, id });
        }
    }
    Ok(seen)
}

/// Validate a save, including cross-references between records.
pub fn validate_league(state: &LeagueState) -> Result<(), ValidationError> {
    let teams = unique("team", state.teams.iter().map(|t| t.id.0))?;
    let players = unique("player", state.players.iter().map(|p| p.id.0))?;
    unique("contract", state.contracts.iter().map(|c| c.id.0))?;
    unique("offer", state.offers.iter().map(|o| o.id.0))?;
    unique("prospect", state.prospects.iter().map(|p| p.id.0))?;

    for t in &state.teams {
        if t.current_cap_space < 0 {
            return Err(ValidationError::NegativeCapSpace(t.id.0));
        }
    }
    for p in &state.players {
        if let Some(team) = p.current_team {
            if !teams.contains(&team.0) {
                return Err(ValidationError::DanglingReference {
                    kind: "player",
                    id: p.id.0,
                    missing: "team",
                });
            }
        }
    }

    let mut active = BTreeSet::new();
    for c in &state.contracts {
        if !players.contains(&c.player.0) {
            return Err(ValidationError::DanglingReference {
                kind: "contract",
                id: c.id.0,
                missing: "player",
            });
        }
        if !teams.contains(&c.team.0) {
            return Err(ValidationError::DanglingReference {
                kind: "contract",
                id: c.id.0,
                missing: "team",
            });
        }
        if c.annual_breakdown.is_empty() {
            return Err(ValidationError::EmptyBreakdown(c.id.0));
        }
        if c.is_active && !active.insert(c.player.0) {
            return Err(ValidationError::MultipleActiveContracts(c.player.0));
        }
    }

    for fa in &state.free_agents {
        if !players.contains(&fa.player.0) {
            return Err(ValidationError::DanglingReference {
                kind: "free agent",
                id: fa.player.0,
                missing: "player",
            });
        }
    }
    for o in &state.offers {
        if !players.contains(&o.player.0) || !teams.contains(&o.team.0) {
            return Err(ValidationError::DanglingReference {
                kind: "offer",
                id: o.id.0,
                missing: "player or team",
            });
        }
    }

    let mut rookies_by_slot: BTreeMap<(u16, u16), usize> = BTreeMap::new();
    for slot in state.players.iter().filter_map(|p| p.drafted) {
        *rookies_by_slot.entry((slot.year, slot.overall)).or_default() += 1;
    }
    for p in &state.prospects {
        if let Some(selection) = p.selection {
            let key = (selection.slot.year, selection.slot.overall);
            let rookies = rookies_by_slot.get(&key).copied().unwrap_or(0);
            if rookies != 1 {
                return Err(ValidationError::RookieMismatch {
                    prospect: p.id.0,
                    rookies,
                });
            }
        }
    }
    Ok(())
}

/// A team's accepted terms with a player, ready to commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signing {
    /// Free agent being signed.
    pub player: PlayerId,
    /// Signing team.
    pub team: TeamId,
    /// Agreed terms.
    pub offer: ContractOffer,
    /// Market offer being accepted, if the terms came from one.
    pub offer_id: Option<OfferId>,
}

/// A draft pick being spent on a prospect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSelection {
    /// Draft year.
    pub year: u16,
    /// Overall number of the pick being spent.
    pub overall: u16,
    /// Team on the clock.
    pub team: TeamId,
    /// Prospect chosen.
    pub prospect: ProspectId,
}

/// A team's offer to a free agent produced by the AI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// Bidding team.
    pub team: TeamId,
    /// Free agent bid on.
    pub player: PlayerId,
    /// Proposed terms.
    pub offer: ContractOffer,
}

/// Read access to league data for the engines.
pub trait LeagueView {
    fn config(&self) -> &LeagueConfig;
    fn season(&self) -> u16;
    fn phase(&self) -> SeasonPhase;
    fn teams(&self) -> &[Team];
    fn player(&self, id: PlayerId) -> Option<&Player>;
    fn active_contracts(&self, team: TeamId) -> Vec<&Contract>;
    /// Roster depth at a position, counting active players only.
    fn position_depth(&self, team: TeamId, position: Position) -> PositionDepth;
    fn free_agents(&self) -> &[FreeAgent];
    fn offers(&self) -> &[FaOffer];
    fn prospects(&self) -> &[DraftProspect];
    fn picks(&self) -> &[DraftPick];

    fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams().iter().find(|t| t.id == id)
    }

    fn free_agent(&self, player: PlayerId) -> Option<&FreeAgent> {
        self.free_agents().iter().find(|fa| fa.player == player)
    }

    /// Pending market offers for one player.
    fn pending_offers(&self, player: PlayerId) -> Vec<&FaOffer> {
        self.offers()
            .iter()
            .filter(|o| o.player == player && o.status == OfferStatus::Pending)
            .collect()
    }
}

impl LeagueView for LeagueState {
    fn config(&self) -> &LeagueConfig {
        &self.config
    }

    fn season(&self) -> u16 {
        self.season
    }

    fn phase(&self) -> SeasonPhase {
        self.phase
    }

    fn teams(&self) -> &[Team] {
        &self.teams
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn active_contracts(&self, team: TeamId) -> Vec<&Contract> {
        self.contracts
            .iter()
            .filter(|c| c.team == team && c.is_active)
            .collect()
    }

    fn position_depth(&self, team: TeamId, position: Position) -> PositionDepth {
        LeagueState::position_depth(self, team, position)
    }

    fn free_agents(&self) -> &[FreeAgent] {
        &self.free_agents
    }

    fn offers(&self) -> &[FaOffer] {
        &self.offers
    }

    fn prospects(&self) -> &[DraftProspect] {
        &self.prospects
    }

    fn picks(&self) -> &[DraftPick] {
        &self.picks
    }
}

/// Persistence callbacks. Each commit is all-or-nothing and is only invoked
/// once a decision is final.
pub trait LeagueStore: LeagueView {
    type Error;

    /// Create the contract, charge the cap, roster the player, close the
    /// free-agent record and withdraw competing offers.
    fn commit_signing(&mut self, signing: Signing) -> Result<ContractId, Self::Error>;
    /// Spend the pick, mark the prospect drafted and create the rookie.
    fn commit_selection(&mut self, selection: DraftSelection) -> Result<PlayerId, Self::Error>;
    /// Record a pending market offer.
    fn record_offer(&mut self, bid: Bid, round: u8) -> Result<OfferId, Self::Error>;
    /// Replace the terms of a pending offer and bump its round.
    fn revise_offer(&mut self, id: OfferId, offer: ContractOffer) -> Result<(), Self::Error>;
}

/// Average rating helper for roster depth queries.
pub(crate) fn depth_of<'a, I>(players: I) -> PositionDepth
where
    I: IntoIterator<Item = &'a Player>,
{
    let mut count = 0u32;
    let mut sum = 0u64;
    for p in players {
        if p.roster_status == RosterStatus::Active {
            count += 1;
            sum += u64::from(p.overall_rating);
        }
    }
    PositionDepth {
        count,
        avg_rating: (count > 0).then(|| sum as f64 / f64::from(count)),
    }
}

impl LeagueState {
    /// Roster depth for `team` at `position`.
    pub fn position_depth(&self, team: TeamId, position: Position) -> PositionDepth {
        depth_of(
            self.players
                .iter()
                .filter(|p| p.current_team == Some(team) && p.position == position),
        )
    }
}
