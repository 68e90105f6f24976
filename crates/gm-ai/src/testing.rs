//! Small in-memory league used by the unit tests.

use chrono::NaiveDate;
use gm_core::{
    Bid, Contract, ContractId, ContractOffer, DraftPick, DraftProspect, DraftSelection, FaOffer,
    FreeAgent, FreeAgentKind, HiddenRating, LeagueConfig, LeagueState, LeagueStore, LeagueView,
    OfferId, OfferStatus, Player, PlayerId, Position, PositionDepth, ProspectId, RosterStatus,
    SeasonPhase, Signing, Team, TeamId,
};
use gm_econ::offer_cap_hit;

pub struct TestLeague {
    pub state: LeagueState,
    next_id: u32,
}

pub fn league() -> TestLeague {
    let teams = (1..=4)
        .map(|id| Team {
            id: TeamId(id),
            name: format!("Team {id}"),
            abbreviation: format!("T{id}"),
            current_cap_space: 60_000_000,
            rollover_cap: 0,
            dead_money: 0,
            deferred_dead_money: 0,
        })
        .collect();
    TestLeague {
        state: LeagueState {
            config: LeagueConfig::default(),
            season: 2025,
            phase: SeasonPhase::FreeAgency,
            date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            teams,
            players: vec![],
            contracts: vec![],
            free_agents: vec![],
            offers: vec![],
            prospects: vec![],
            picks: vec![],
            transactions: vec![],
        },
        next_id: 1,
    }
}

pub fn rostered(id: u32, team: TeamId, position: Position, rating: u8) -> Player {
    Player {
        id: PlayerId(id),
        first_name: "Roster".into(),
        last_name: format!("Player{id}"),
        position,
        age: 27,
        overall_rating: rating,
        accrued_seasons: 4,
        current_team: Some(team),
        roster_status: RosterStatus::Active,
        drafted: None,
    }
}

impl TestLeague {
    pub fn add_free_agent(&mut self, id: u32, position: Position, rating: u8) {
        self.state.players.push(Player {
            current_team: None,
            roster_status: RosterStatus::FreeAgent,
            ..rostered(id, TeamId(0), position, rating)
        });
        self.state
            .free_agents
            .push(FreeAgent::new(PlayerId(id), FreeAgentKind::UFA));
    }

    pub fn add_prospect(&mut self, id: u32, position: Position, scouted: u8) -> &mut DraftProspect {
        self.state.prospects.push(DraftProspect::new(
            ProspectId(id),
            "Draft".into(),
            format!("Prospect{id}"),
            position,
            "State".into(),
            HiddenRating::new(scouted),
            scouted,
            self.state.season,
        ));
        self.state.prospects.last_mut().unwrap()
    }

    /// One round where pick `n` belongs to `order[n - 1]`.
    pub fn add_round(&mut self, order: &[TeamId]) {
        for (i, team) in order.iter().enumerate() {
            let pick = u8::try_from(i + 1).unwrap();
            self.state.picks.push(DraftPick {
                year: self.state.season,
                round: 1,
                pick,
                overall: u16::from(pick),
                original_team: *team,
                current_team: *team,
                selection: None,
            });
        }
    }
}

impl LeagueView for TestLeague {
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

impl LeagueStore for TestLeague {
    type Error = String;

    fn commit_signing(&mut self, signing: Signing) -> Result<ContractId, String> {
        let fa = self
            .state
            .free_agents
            .iter_mut()
            .find(|fa| fa.player == signing.player && fa.available)
            .ok_or("player already signed")?;
        fa.available = false;
        fa.signed_team = Some(signing.team);
        let offer = signing.offer;
        let team = self
            .state
            .teams
            .iter_mut()
            .find(|t| t.id == signing.team)
            .ok_or("unknown team")?;
        team.current_cap_space -= offer_cap_hit(&offer);
        if let Some(p) = self.state.players.iter_mut().find(|p| p.id == signing.player) {
            p.current_team = Some(signing.team);
            p.roster_status = RosterStatus::Active;
        }
        for o in self.state.offers.iter_mut().filter(|o| o.player == signing.player) {
            o.status = if Some(o.id) == signing.offer_id {
                OfferStatus::Accepted
            } else {
                OfferStatus::Withdrawn
            };
        }
        self.next_id += 1;
        Ok(ContractId(self.next_id))
    }

    fn commit_selection(&mut self, selection: DraftSelection) -> Result<PlayerId, String> {
        let pick = self
            .state
            .picks
            .iter_mut()
            .find(|p| p.year == selection.year && p.overall == selection.overall && !p.is_used())
            .ok_or("pick already used")?;
        let slot = pick.slot();
        let prospect = self
            .state
            .prospects
            .iter_mut()
            .find(|p| p.id == selection.prospect)
            .ok_or("unknown prospect")?;
        self.next_id += 1;
        let player = prospect
            .draft(selection.team, slot, PlayerId(10_000 + self.next_id))
            .map_err(|e| e.to_string())?;
        pick.selection = Some(selection.prospect);
        let id = player.id;
        self.state.players.push(player);
        Ok(id)
    }

    fn record_offer(&mut self, bid: Bid, round: u8) -> Result<OfferId, String> {
        self.next_id += 1;
        let id = OfferId(self.next_id);
        self.state.offers.push(FaOffer {
            id,
            player: bid.player,
            team: bid.team,
            offer: bid.offer,
            status: OfferStatus::Pending,
            round,
        });
        Ok(id)
    }

    fn revise_offer(&mut self, id: OfferId, offer: ContractOffer) -> Result<(), String> {
        let o = self
            .state
            .offers
            .iter_mut()
            .find(|o| o.id == id && o.status == OfferStatus::Pending)
            .ok_or("no pending offer")?;
        o.offer = offer;
        o.round += 1;
        Ok(())
    }
}
