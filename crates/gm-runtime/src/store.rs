use std::iter;

use gm_ai::next_pick;
use gm_core::{
    validate_offer, Bid, Contract, ContractId, ContractOffer, DraftPick, DraftProspect,
    DraftSelection, FaOffer, FreeAgent, LeagueConfig, LeagueStore, LeagueView, OfferId,
    OfferStatus, Player, PlayerId, Position, PositionDepth, RosterStatus, SeasonPhase, Signing,
    Team, TeamId, TransactionKind,
};
use gm_draft::pick_description;
use gm_econ::{build_contract, calculate_cap_hit, NegotiationError};
use tracing::{debug, info};

use crate::{cap_space, League, StoreError};

impl LeagueView for League {
    fn config(&self) -> &LeagueConfig {
        self.state.config()
    }

    fn season(&self) -> u16 {
        self.state.season
    }

    fn phase(&self) -> SeasonPhase {
        self.state.phase
    }

    fn teams(&self) -> &[Team] {
        &self.state.teams
    }

    fn player(&self, id: PlayerId) -> Option<&Player> {
        self.state.player(id)
    }

    fn active_contracts(&self, team: TeamId) -> Vec<&Contract> {
        self.state.active_contracts(team)
    }

    fn position_depth(&self, team: TeamId, position: Position) -> PositionDepth {
        self.state.position_depth(team, position)
    }

    fn free_agents(&self) -> &[FreeAgent] {
        &self.state.free_agents
    }

    fn offers(&self) -> &[FaOffer] {
        &self.state.offers
    }

    fn prospects(&self) -> &[DraftProspect] {
        &self.state.prospects
    }

    fn picks(&self) -> &[DraftPick] {
        &self.state.picks
    }
}

impl LeagueStore for League {
    type Error = StoreError;

    fn commit_signing(&mut self, signing: Signing) -> Result<ContractId, StoreError> {
        let Signing {
            player,
            team,
            offer,
            offer_id,
        } = signing;
        let season = self.state.season;

        let fa_idx = self
            .state
            .free_agents
            .iter()
            .position(|fa| fa.player == player && fa.available)
            .ok_or(StoreError::NotAvailable(player))?;
        let player_idx = self
            .state
            .players
            .iter()
            .position(|p| p.id == player)
            .ok_or(StoreError::UnknownPlayer(player))?;
        if self
            .state
            .contracts
            .iter()
            .any(|c| c.player == player && c.is_active)
        {
            return Err(StoreError::AlreadyUnderContract(player));
        }
        let team_idx = self.team_index(team)?;
        if let Some(id) = offer_id {
            let pending = self.state.offers.iter().any(|o| {
                o.id == id && o.player == player && o.team == team && o.status == OfferStatus::Pending
            });
            if !pending {
                return Err(StoreError::NoPendingOffer(id));
            }
        }

        let contract = build_contract(ContractId(self.next_contract), player, team, &offer, season)?;
        let t = &self.state.teams[team_idx];
        let needed = calculate_cap_hit(&contract, season)?.total_cap_hit;
        if needed > t.current_cap_space {
            return Err(StoreError::CapExceeded {
                team,
                needed,
                available: t.current_cap_space,
            });
        }
        let space = cap_space(
            &self.state,
            t,
            self.state
                .active_contracts(team)
                .into_iter()
                .chain(iter::once(&contract)),
            t.dead_money,
        )?;

        let id = contract.id;
        self.next_contract += 1;
        self.state.contracts.push(contract);
        self.state.teams[team_idx].current_cap_space = space;
        let p = &mut self.state.players[player_idx];
        p.current_team = Some(team);
        p.roster_status = RosterStatus::Active;
        let date = self.state.date;
        let fa = &mut self.state.free_agents[fa_idx];
        fa.available = false;
        fa.signed_team = Some(team);
        fa.signed_date = Some(date);
        for o in self
            .state
            .offers
            .iter_mut()
            .filter(|o| o.player == player && o.status == OfferStatus::Pending)
        {
            o.status = if Some(o.id) == offer_id {
                OfferStatus::Accepted
            } else {
                OfferStatus::Withdrawn
            };
        }
        let detail = format!(
            "{} years, ${} total, ${} guaranteed",
            offer.years, offer.total_value, offer.guaranteed_money
        );
        self.log(team, player, TransactionKind::Signing, detail);
        info!(player = %player, team = %team, contract = %id, total = offer.total_value, "signed");
        Ok(id)
    }

    fn commit_selection(&mut self, selection: DraftSelection) -> Result<PlayerId, StoreError> {
        let DraftSelection {
            year,
            overall,
            team,
            prospect,
        } = selection;

        let on_clock = next_pick(self, year)
            .filter(|p| p.overall == overall)
            .ok_or(StoreError::PickNotOnClock { year, overall })?;
        if on_clock.current_team != team {
            return Err(StoreError::PickOwnedElsewhere {
                overall,
                owner: on_clock.current_team,
            });
        }
        let slot = on_clock.slot();
        let pick_idx = self
            .state
            .picks
            .iter()
            .position(|p| p.year == year && p.overall == overall)
            .ok_or(StoreError::PickNotOnClock { year, overall })?;
        let prospect_idx = self
            .state
            .prospects
            .iter()
            .position(|p| p.id == prospect && p.draft_year == year)
            .ok_or(StoreError::UnknownProspect(prospect))?;
        self.team_index(team)?;

        let player = PlayerId(self.next_player);
        let rookie = self.state.prospects[prospect_idx].draft(team, slot, player)?;
        self.next_player += 1;
        self.state.picks[pick_idx].selection = Some(prospect);
        let detail = format!("{}: {}", pick_description(overall), rookie.full_name());
        self.state.players.push(rookie);
        self.log(team, player, TransactionKind::DraftSelection, detail);
        Ok(player)
    }

    fn record_offer(&mut self, bid: Bid, round: u8) -> Result<OfferId, StoreError> {
        validate_offer(&bid.offer)?;
        if round == 0 {
            return Err(NegotiationError::InvalidRound.into());
        }
        if !self
            .state
            .free_agents
            .iter()
            .any(|fa| fa.player == bid.player && fa.available)
        {
            return Err(StoreError::NotAvailable(bid.player));
        }
        self.team_index(bid.team)?;

        let id = OfferId(self.next_offer);
        self.next_offer += 1;
        self.state.offers.push(FaOffer {
            id,
            player: bid.player,
            team: bid.team,
            offer: bid.offer,
            status: OfferStatus::Pending,
            round,
        });
        debug!(offer = %id, player = %bid.player, team = %bid.team, "offer recorded");
        Ok(id)
    }

    fn revise_offer(&mut self, id: OfferId, offer: ContractOffer) -> Result<(), StoreError> {
        validate_offer(&offer)?;
        let existing = self
            .state
            .offers
            .iter_mut()
            .find(|o| o.id == id && o.status == OfferStatus::Pending)
            .ok_or(StoreError::NoPendingOffer(id))?;
        existing.offer = offer;
        existing.round = existing.round.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::seed_league;
    use gm_core::{ContractStructure, ValidationError};
    use gm_econ::MAX_NEGOTIATION_ROUNDS;

    fn league(seed: u64) -> League {
        seed_league(LeagueConfig::default(), seed).unwrap()
    }

    fn offer(total: i64) -> ContractOffer {
        ContractOffer {
            years: 3,
            total_value: total,
            guaranteed_money: total / 2,
            signing_bonus: total / 5,
            structure: ContractStructure::Even,
        }
    }

    fn free_agent(league: &League) -> PlayerId {
        league
            .free_agents()
            .iter()
            .find(|fa| fa.available)
            .map(|fa| fa.player)
            .unwrap()
    }

    #[test]
    fn signing_updates_every_record_together() {
        let mut league = league(7);
        let player = free_agent(&league);
        let team = TeamId(5);
        let before = league.team(team).unwrap().current_cap_space;
        let bid = league.record_offer(Bid { team, player, offer: offer(9_000_000) }, 1).unwrap();
        let rival = league.record_offer(Bid { team: TeamId(6), player, offer: offer(8_000_000) }, 1).unwrap();

        let id = league
            .commit_signing(Signing { player, team, offer: offer(9_000_000), offer_id: Some(bid) })
            .unwrap();

        let contract = league.state().contracts.iter().find(|c| c.id == id).unwrap();
        assert!(contract.is_active);
        assert_eq!(league.player(player).unwrap().current_team, Some(team));
        assert!(!league.free_agent(player).unwrap().available);
        assert!(league.team(team).unwrap().current_cap_space < before);
        let status = |id| league.offers().iter().find(|o| o.id == id).unwrap().status;
        assert_eq!(status(bid), OfferStatus::Accepted);
        assert_eq!(status(rival), OfferStatus::Withdrawn);
        assert_eq!(league.state().transactions.last().unwrap().kind, TransactionKind::Signing);
    }

    #[test]
    fn second_signing_is_refused_without_changes() {
        let mut league = league(8);
        let player = free_agent(&league);
        let signing = Signing { player, team: TeamId(3), offer: offer(6_000_000), offer_id: None };
        league.commit_signing(signing).unwrap();
        let snapshot = league.state().clone();

        let again = Signing { team: TeamId(4), ..signing };
        assert_eq!(league.commit_signing(again), Err(StoreError::NotAvailable(player)));
        assert_eq!(league.state().contracts, snapshot.contracts);
        assert_eq!(league.state().teams, snapshot.teams);
    }

    #[test]
    fn over_the_cap_signing_is_refused() {
        let mut league = league(9);
        let player = free_agent(&league);
        let space = league.team(TeamId(2)).unwrap().current_cap_space;
        let huge = ContractOffer { years: 1, total_value: space + 1, guaranteed_money: 0, signing_bonus: 0, structure: ContractStructure::Even };
        let result = league.commit_signing(Signing { player, team: TeamId(2), offer: huge, offer_id: None });
        assert!(matches!(result, Err(StoreError::CapExceeded { .. })));
        assert!(league.free_agent(player).unwrap().available);
    }

    #[test]
    fn invalid_offers_are_not_recorded() {
        let mut league = league(10);
        let player = free_agent(&league);
        let bad = ContractOffer { guaranteed_money: 20_000_000, ..offer(9_000_000) };
        let result = league.record_offer(Bid { team: TeamId(2), player, offer: bad }, 1);
        assert!(matches!(result, Err(StoreError::Validation(ValidationError::InvalidOffer(_)))));
        assert!(league.offers().is_empty());
        assert_eq!(
            league.record_offer(Bid { team: TeamId(2), player, offer: offer(9_000_000) }, 0),
            Err(StoreError::Negotiation(NegotiationError::InvalidRound))
        );
    }

    #[test]
    fn revising_bumps_the_round() {
        let mut league = league(11);
        let player = free_agent(&league);
        let id = league.record_offer(Bid { team: TeamId(2), player, offer: offer(9_000_000) }, 1).unwrap();
        league.revise_offer(id, offer(9_900_000)).unwrap();
        let o = league.offers().iter().find(|o| o.id == id).unwrap();
        assert_eq!((o.round, o.offer.total_value), (2, 9_900_000));
        assert!(o.round <= MAX_NEGOTIATION_ROUNDS);
    }

    #[test]
    fn picks_must_be_made_in_order_by_their_owner() {
        let mut league = league(12);
        let year = league.season();
        let first = next_pick(&league, year).unwrap().clone();
        let prospect = league.prospects()[0].id;

        let out_of_order = DraftSelection { year, overall: first.overall + 1, team: first.current_team, prospect };
        assert!(matches!(
            league.commit_selection(out_of_order),
            Err(StoreError::PickNotOnClock { .. })
        ));
        let impostor = TeamId(if first.current_team == TeamId(1) { 2 } else { 1 });
        let wrong_team = DraftSelection { year, overall: first.overall, team: impostor, prospect };
        assert!(matches!(
            league.commit_selection(wrong_team),
            Err(StoreError::PickOwnedElsewhere { .. })
        ));

        let ok = DraftSelection { year, overall: first.overall, team: first.current_team, prospect };
        let rookie = league.commit_selection(ok).unwrap();
        assert_eq!(league.player(rookie).unwrap().current_team, Some(first.current_team));
        assert!(league.prospects()[0].is_drafted());

        let second = next_pick(&league, year).unwrap().clone();
        let repeat = DraftSelection { year, overall: second.overall, team: second.current_team, prospect };
        assert!(matches!(
            league.commit_selection(repeat),
            Err(StoreError::Validation(ValidationError::AlreadyDrafted(_)))
        ));
        assert!(!next_pick(&league, year).unwrap().is_used());
    }
}
