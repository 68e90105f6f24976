#![deny(warnings)]

//! In-memory league runtime.
//!
//! [`League`] owns a [`LeagueState`], serves reads to the engines through
//! [`LeagueView`] and applies their decisions through [`LeagueStore`]. Every
//! commit checks all of its preconditions before touching the state, so a
//! refused commit leaves the league exactly as it was.

pub mod demo;
mod error;
mod store;

pub use error::StoreError;

use chrono::NaiveDate;
use gm_ai::{escalate_top_bid, next_pick, DraftRun, OfferRound, SigningSweep};
use gm_core::{
    validate_league, validate_offer, Contract, ContractId, ContractOffer, DraftSelection,
    FreeAgent, FreeAgentKind, LeagueState, LeagueStore, LeagueView, Money, OfferId, OfferStatus,
    PlayerDemands, PlayerId, ProspectId, RosterStatus, SeasonPhase, Signing, Team, TeamId,
    Transaction, TransactionKind,
};
use gm_econ::{
    advance_contract_year, apply_restructure, calculate_dead_money, calculate_player_value,
    calculate_team_cap_space, offer_cap_hit, CapError, CutTiming, DeadMoney, Negotiation,
    NegotiationState, OfferEvaluation, PlayerSummary, Restructure,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What came of an offer the user team put to a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferOutcome {
    pub evaluation: OfferEvaluation,
    /// Set when the player accepted and the contract was committed.
    pub contract: Option<ContractId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRollover {
    pub season: u16,
    pub expired_contracts: usize,
}

/// A league held in memory.
#[derive(Clone, Debug)]
pub struct League {
    state: LeagueState,
    next_contract: u32,
    next_offer: u32,
    next_player: u32,
}

fn next_id<I: IntoIterator<Item = u32>>(ids: I) -> u32 {
    ids.into_iter().max().map_or(1, |id| id + 1)
}

/// Space left for `team` if `contracts` were its active deals and
/// `dead_money` were charged this season.
fn cap_space<'a, I>(
    state: &LeagueState,
    team: &Team,
    contracts: I,
    dead_money: Money,
) -> Result<Money, CapError>
where
    I: IntoIterator<Item = &'a Contract>,
{
    let space = calculate_team_cap_space(
        contracts,
        state.season,
        state.config.salary_cap,
        state.config.cap_count(state.phase),
    )?;
    Ok(space.available_cap + team.rollover_cap - dead_money)
}

/// Recomputes every team's cap space from its active contracts.
fn refresh_cap_space(state: &mut LeagueState) -> Result<(), CapError> {
    let spaces = state
        .teams
        .iter()
        .map(|t| cap_space(state, t, state.active_contracts(t.id), t.dead_money))
        .collect::<Result<Vec<_>, _>>()?;
    for (team, space) in state.teams.iter_mut().zip(spaces) {
        team.current_cap_space = space;
    }
    Ok(())
}

/// Puts a player back on the market, reusing any old market record.
fn release_to_market(state: &mut LeagueState, player: PlayerId) {
    if let Some(p) = state.players.iter_mut().find(|p| p.id == player) {
        p.current_team = None;
        p.roster_status = RosterStatus::FreeAgent;
    }
    match state.free_agents.iter_mut().find(|fa| fa.player == player) {
        Some(fa) => *fa = FreeAgent::new(player, fa.kind),
        None => state
            .free_agents
            .push(FreeAgent::new(player, FreeAgentKind::UFA)),
    }
}

impl League {
    /// Wraps a validated league state.
    pub fn new(state: LeagueState) -> Result<Self, StoreError> {
        validate_league(&state)?;
        Ok(Self {
            next_contract: next_id(state.contracts.iter().map(|c| c.id.0)),
            next_offer: next_id(state.offers.iter().map(|o| o.id.0)),
            next_player: next_id(state.players.iter().map(|p| p.id.0)),
            state,
        })
    }

    pub fn state(&self) -> &LeagueState {
        &self.state
    }

    pub fn into_state(self) -> LeagueState {
        self.state
    }

    pub fn user_team(&self) -> TeamId {
        self.state.config.user_team
    }

    pub fn set_phase(&mut self, phase: SeasonPhase) -> Result<(), StoreError> {
        let mut next = self.state.clone();
        next.phase = phase;
        refresh_cap_space(&mut next)?;
        self.state = next;
        Ok(())
    }

    fn log(&mut self, team: TeamId, player: PlayerId, kind: TransactionKind, detail: String) {
        self.state.transactions.push(Transaction {
            date: self.state.date,
            team,
            player,
            kind,
            detail,
        });
    }

    fn team_index(&self, team: TeamId) -> Result<usize, StoreError> {
        self.state
            .teams
            .iter()
            .position(|t| t.id == team)
            .ok_or(StoreError::UnknownTeam(team))
    }

    fn active_contract_index(&self, player: PlayerId) -> Result<usize, StoreError> {
        self.state
            .contracts
            .iter()
            .position(|c| c.player == player && c.is_active)
            .ok_or(StoreError::NoActiveContract(player))
    }

    /// Demands of an available free agent. They are valued once and cached
    /// on the market record so every suitor sees the same asking price.
    pub fn player_demands<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<PlayerDemands, StoreError> {
        let LeagueState {
            players,
            free_agents,
            ..
        } = &mut self.state;
        let fa = free_agents
            .iter_mut()
            .find(|fa| fa.player == player && fa.available)
            .ok_or(StoreError::NotAvailable(player))?;
        if let Some(demands) = fa.demands {
            return Ok(demands);
        }
        let p = players
            .iter()
            .find(|p| p.id == player)
            .ok_or(StoreError::UnknownPlayer(player))?;
        let demands = calculate_player_value(p, rng);
        fa.demands = Some(demands);
        Ok(demands)
    }

    fn cache_market_demands<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let LeagueState {
            players,
            free_agents,
            ..
        } = &mut self.state;
        for fa in free_agents
            .iter_mut()
            .filter(|fa| fa.available && fa.demands.is_none())
        {
            if let Some(p) = players.iter().find(|p| p.id == fa.player) {
                fa.demands = Some(calculate_player_value(p, rng));
            }
        }
    }

    /// Starts talks between the user team and a free agent. Pending AI bids
    /// become the competing offers the player weighs.
    pub fn open_negotiation<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<Negotiation, StoreError> {
        let demands = self.player_demands(player, rng)?;
        let user = self.user_team();
        let p = self
            .state
            .player(player)
            .ok_or(StoreError::UnknownPlayer(player))?;
        let competing = self
            .state
            .pending_offers(player)
            .into_iter()
            .filter(|o| o.team != user)
            .map(|o| o.offer)
            .collect();
        Ok(Negotiation::new(PlayerSummary::from(p), demands, competing))
    }

    /// Submits the user team's offer. An accepted offer is signed on the spot.
    ///
    /// The offer must fit the team's cap space with its real first-year
    /// salary. When the signing cannot be committed the negotiation is left
    /// as it was before the offer.
    pub fn submit_user_offer<R: Rng + ?Sized>(
        &mut self,
        negotiation: &mut Negotiation,
        offer: ContractOffer,
        rng: &mut R,
    ) -> Result<OfferOutcome, StoreError> {
        let player = negotiation.context().player.id;
        let team = self.user_team();
        if !self.state.free_agent(player).is_some_and(|fa| fa.available) {
            return Err(StoreError::NotAvailable(player));
        }
        validate_offer(&offer)?;
        let available = self.state.teams[self.team_index(team)?].current_cap_space;
        let needed = offer_cap_hit(&offer);
        if needed > available {
            return Err(StoreError::CapExceeded {
                team,
                needed,
                available,
            });
        }

        let before = negotiation.clone();
        let evaluation = negotiation.submit(offer, rng)?;
        let contract = match negotiation.state() {
            NegotiationState::Accepted => {
                let signing = Signing {
                    player,
                    team,
                    offer,
                    offer_id: None,
                };
                match self.commit_signing(signing) {
                    Ok(id) => Some(id),
                    Err(e) => {
                        *negotiation = before;
                        return Err(e);
                    }
                }
            }
            _ => None,
        };
        Ok(OfferOutcome {
            evaluation,
            contract,
        })
    }

    pub fn generate_ai_offers<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<OfferRound, StoreError> {
        self.cache_market_demands(rng);
        gm_ai::generate_ai_offers(self, rng)
    }

    /// Gives the top AI bid on every contested free agent one chance to rise.
    /// Returns the offers that were raised.
    pub fn escalate_bids<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<OfferId>, StoreError> {
        let user = self.user_team();
        let mut players: Vec<PlayerId> = self
            .state
            .offers
            .iter()
            .filter(|o| o.status == OfferStatus::Pending && o.team != user)
            .map(|o| o.player)
            .collect();
        players.sort();
        players.dedup();

        let mut raised = Vec::new();
        for player in players {
            if let Some(id) = escalate_top_bid(self, player, rng)? {
                raised.push(id);
            }
        }
        Ok(raised)
    }

    pub fn process_ai_signings<R: Rng + ?Sized>(&mut self, rng: &mut R) -> SigningSweep {
        gm_ai::process_ai_signings(self, rng)
    }

    pub fn process_ai_picks<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<DraftRun, StoreError> {
        gm_ai::process_ai_picks(self, rng)
    }

    /// Makes the user team's selection while it is on the clock.
    pub fn make_user_pick(&mut self, prospect: ProspectId) -> Result<PlayerId, StoreError> {
        let year = self.state.season;
        let team = self.user_team();
        let overall = next_pick(self, year)
            .filter(|p| p.current_team == team)
            .map(|p| p.overall)
            .ok_or(StoreError::NotOnClock { team })?;
        self.commit_selection(DraftSelection {
            year,
            overall,
            team,
            prospect,
        })
    }

    /// Cuts a player. The remaining bonus and this year's guarantees
    /// accelerate as dead money; a post-June 1 cut pushes the rest of the
    /// bonus into next season.
    pub fn release_player(
        &mut self,
        player: PlayerId,
        timing: CutTiming,
    ) -> Result<DeadMoney, StoreError> {
        let idx = self.active_contract_index(player)?;
        let contract = &self.state.contracts[idx];
        let (contract_id, team) = (contract.id, contract.team);
        let dead = calculate_dead_money(contract, self.state.season, timing)?;
        let team_idx = self.team_index(team)?;
        let t = &self.state.teams[team_idx];
        let charged = t.dead_money + dead.current_year_dead_money;
        let space = cap_space(
            &self.state,
            t,
            self.state
                .active_contracts(team)
                .into_iter()
                .filter(|c| c.id != contract_id),
            charged,
        )?;
        if space < 0 {
            return Err(StoreError::CapExceeded {
                team,
                needed: dead.current_year_dead_money,
                available: space + dead.current_year_dead_money,
            });
        }

        self.state.contracts[idx].is_active = false;
        let t = &mut self.state.teams[team_idx];
        t.dead_money = charged;
        t.deferred_dead_money += dead.next_year_dead_money;
        t.current_cap_space = space;
        release_to_market(&mut self.state, player);
        let detail = format!(
            "{timing:?} release: ${} dead money now, ${} next season",
            dead.current_year_dead_money, dead.next_year_dead_money
        );
        self.log(team, player, TransactionKind::Release, detail);
        info!(player = %player, team = %team, ?dead, "player released");
        Ok(dead)
    }

    /// Converts `amount` of this season's base salary into prorated bonus.
    pub fn restructure_contract(
        &mut self,
        player: PlayerId,
        amount: Money,
    ) -> Result<Restructure, StoreError> {
        let season = self.state.season;
        let accrued = self
            .state
            .player(player)
            .ok_or(StoreError::UnknownPlayer(player))?
            .accrued_seasons;
        let minimum_salary = self
            .state
            .config
            .minimum_salaries
            .for_accrued_seasons(accrued);
        let idx = self.active_contract_index(player)?;
        let mut updated = self.state.contracts[idx].clone();
        let outcome = apply_restructure(&mut updated, season, amount, minimum_salary)?;
        let team = updated.team;
        let team_idx = self.team_index(team)?;
        let t = &self.state.teams[team_idx];
        let space = cap_space(
            &self.state,
            t,
            self.state
                .active_contracts(team)
                .into_iter()
                .map(|c| if c.id == updated.id { &updated } else { c }),
            t.dead_money,
        )?;

        self.state.contracts[idx] = updated;
        self.state.teams[team_idx].current_cap_space = space;
        let detail = format!(
            "converted ${amount} over {} years, cap hit now ${}",
            outcome.prorate_years, outcome.new_cap_hit
        );
        self.log(team, player, TransactionKind::Restructure, detail);
        info!(player = %player, team = %team, amount, "contract restructured");
        Ok(outcome)
    }

    /// Rolls the league into the next season: contracts advance a year,
    /// expired deals send their players to the market, unused cap space
    /// rolls over and deferred dead money comes due.
    pub fn advance_season(&mut self) -> Result<SeasonRollover, StoreError> {
        let mut next = self.state.clone();
        let mut expired = Vec::new();
        for contract in next.contracts.iter_mut().filter(|c| c.is_active) {
            advance_contract_year(contract);
            if !contract.is_active {
                expired.push(contract.player);
            }
        }

        next.season += 1;
        next.phase = SeasonPhase::PreFreeAgency;
        if let Some(date) = NaiveDate::from_ymd_opt(i32::from(next.season), 3, 1) {
            next.date = date;
        }
        for p in &mut next.players {
            p.age = p.age.saturating_add(1);
            if p.current_team.is_some() {
                p.accrued_seasons = p.accrued_seasons.saturating_add(1);
            }
        }
        for &player in &expired {
            release_to_market(&mut next, player);
        }
        for offer in next
            .offers
            .iter_mut()
            .filter(|o| o.status == OfferStatus::Pending)
        {
            offer.status = OfferStatus::Withdrawn;
        }
        for team in &mut next.teams {
            team.rollover_cap = team.current_cap_space.max(0);
            team.dead_money = std::mem::take(&mut team.deferred_dead_money);
        }
        refresh_cap_space(&mut next)?;

        self.state = next;
        let rollover = SeasonRollover {
            season: self.state.season,
            expired_contracts: expired.len(),
        };
        info!(season = rollover.season, expired = rollover.expired_contracts, "season advanced");
        Ok(rollover)
    }
}
