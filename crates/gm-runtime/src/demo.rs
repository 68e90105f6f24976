//! Seeded sample league used by the CLI, the benches and the tests.

use chrono::NaiveDate;
use gm_core::{
    ContractId, ContractOffer, ContractStructure, DraftPick, FreeAgent, FreeAgentKind,
    LeagueConfig, LeagueState, Money, Player, PlayerId, Position, ProspectId, RosterStatus,
    SeasonPhase, Team, TeamId, MIN_CONTRACT_VALUE,
};
use gm_draft::generate_draft_class;
use gm_econ::{build_contract, calculate_player_value, offer_cap_hit};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{refresh_cap_space, League, StoreError};

pub const DEMO_SEASON: u16 = 2025;
const FREE_AGENT_POOL: usize = 160;
/// Share of the cap committed to seeded rosters, in percent.
const ROSTER_BUDGET_PCT: Money = 85;

const TEAMS: [(&str, &str); 32] = [
    ("Albany Anglers", "ALB"),
    ("Austin Armadillos", "AUS"),
    ("Boise Bison", "BOI"),
    ("Buffalo Blizzard", "BUF"),
    ("Charleston Pilots", "CHS"),
    ("Cincinnati Foundry", "CIN"),
    ("Columbus Cardinals", "COL"),
    ("Dallas Wranglers", "DAL"),
    ("Denver Peaks", "DEN"),
    ("Des Moines Harvest", "DSM"),
    ("El Paso Suns", "ELP"),
    ("Fresno Raisins", "FRE"),
    ("Hartford Whalers", "HFD"),
    ("Honolulu Waves", "HNL"),
    ("Indianapolis Racers", "IND"),
    ("Jacksonville Tides", "JAX"),
    ("Kansas City Monarchs", "KCM"),
    ("Las Vegas Aces", "LVA"),
    ("Louisville Sluggers", "LOU"),
    ("Memphis Blues", "MEM"),
    ("Milwaukee Brewers", "MIL"),
    ("Nashville Sound", "NSH"),
    ("Newark Ironmen", "NWK"),
    ("Oakland Redwoods", "OAK"),
    ("Oklahoma City Drillers", "OKC"),
    ("Omaha Stockmen", "OMA"),
    ("Portland Lumberjacks", "POR"),
    ("Raleigh Oaks", "RAL"),
    ("Sacramento Gold", "SAC"),
    ("San Antonio Missions", "SAT"),
    ("St. Louis Archers", "STL"),
    ("Tucson Scorpions", "TUC"),
];

/// Roster shape of every seeded team.
const DEPTH_CHART: [(Position, usize); 15] = [
    (Position::QB, 2),
    (Position::RB, 3),
    (Position::WR, 5),
    (Position::TE, 3),
    (Position::OT, 4),
    (Position::OG, 4),
    (Position::C, 2),
    (Position::EDGE, 4),
    (Position::DT, 4),
    (Position::LB, 5),
    (Position::CB, 5),
    (Position::S, 4),
    (Position::K, 1),
    (Position::P, 1),
    (Position::LS, 1),
];

const FIRST_NAMES: &[&str] = &[
    "Aaron", "Brandon", "Caleb", "Darius", "Elijah", "Franklin", "Garrett", "Hunter", "Isaiah",
    "Jalen", "Kendall", "Lamar", "Marcus", "Nolan", "Oscar", "Preston", "Quentin", "Reggie",
    "Sterling", "Tyrell", "Victor", "Wesley", "Xavier", "Zach",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Bennett", "Carter", "Dawson", "Ellis", "Foster", "Griffin", "Hayes", "Irving",
    "Jenkins", "Kelly", "Lawson", "Mitchell", "Nash", "Owens", "Parker", "Reed", "Sanders",
    "Thompson", "Underwood", "Vaughn", "Walker", "Young",
];

fn pick<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn random_player<R: Rng + ?Sized>(
    id: PlayerId,
    position: Position,
    team: Option<TeamId>,
    rng: &mut R,
) -> Player {
    // Average of two draws: most players land in the low 70s.
    let overall_rating = (rng.gen_range(50..=99u8) / 2) + (rng.gen_range(50..=99u8) / 2);
    let age = rng.gen_range(22..=34u8);
    Player {
        id,
        first_name: pick(FIRST_NAMES, rng).to_owned(),
        last_name: pick(LAST_NAMES, rng).to_owned(),
        position,
        age,
        overall_rating,
        accrued_seasons: age - 22,
        current_team: team,
        roster_status: if team.is_some() {
            RosterStatus::Active
        } else {
            RosterStatus::FreeAgent
        },
        drafted: None,
    }
}

/// Terms for a seeded roster player: the market ask, or a one-year minimum
/// deal when the ask would break the team's remaining budget.
fn roster_offer<R: Rng + ?Sized>(
    player: &Player,
    config: &LeagueConfig,
    budget_left: Money,
    rng: &mut R,
) -> ContractOffer {
    let demands = calculate_player_value(player, rng);
    let total_value = demands.total_value().max(MIN_CONTRACT_VALUE);
    let guaranteed_money = demands.guaranteed.min(total_value);
    let offer = ContractOffer {
        years: demands.years,
        total_value,
        guaranteed_money,
        signing_bonus: guaranteed_money * 2 / 5,
        structure: ContractStructure::Even,
    };
    if offer_cap_hit(&offer) <= budget_left {
        return offer;
    }
    let minimum = config
        .minimum_salaries
        .for_accrued_seasons(player.accrued_seasons)
        .max(MIN_CONTRACT_VALUE);
    ContractOffer {
        years: 1,
        total_value: minimum,
        guaranteed_money: 0,
        signing_bonus: 0,
        structure: ContractStructure::Even,
    }
}

fn free_agent_kind(accrued_seasons: u8) -> FreeAgentKind {
    match accrued_seasons {
        0..=2 => FreeAgentKind::ERFA,
        3 => FreeAgentKind::RFA,
        _ => FreeAgentKind::UFA,
    }
}

/// Builds a 32-team league in the free-agency phase: full rosters under
/// contract, an open market, a draft class and the draft order.
///
/// The same `seed` always yields the same league.
pub fn seed_league(config: LeagueConfig, seed: u64) -> Result<League, StoreError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let season = DEMO_SEASON;

    let teams: Vec<Team> = TEAMS
        .iter()
        .zip(1..)
        .map(|(&(name, abbreviation), id)| Team {
            id: TeamId(id),
            name: name.to_owned(),
            abbreviation: abbreviation.to_owned(),
            current_cap_space: config.salary_cap,
            rollover_cap: 0,
            dead_money: 0,
            deferred_dead_money: 0,
        })
        .collect();

    let roster_size: usize = DEPTH_CHART.iter().map(|&(_, count)| count).sum();
    let reserve = config
        .minimum_salaries
        .for_accrued_seasons(u8::MAX)
        .max(MIN_CONTRACT_VALUE);
    let budget = config.salary_cap / 100 * ROSTER_BUDGET_PCT;
    let mut players = Vec::new();
    let mut contracts = Vec::new();
    let mut next_player = 1u32;
    let mut next_contract = 1u32;

    for team in &teams {
        let mut committed: Money = 0;
        let slots = DEPTH_CHART
            .iter()
            .flat_map(|&(position, count)| std::iter::repeat(position).take(count));
        for (filled, position) in slots.enumerate() {
            let player = random_player(PlayerId(next_player), position, Some(team.id), &mut rng);
            next_player += 1;
            let open_after = (roster_size - filled - 1) as Money;
            let budget_left = budget - committed - open_after * reserve;
            let offer = roster_offer(&player, &config, budget_left, &mut rng);
            let contract_id = ContractId(next_contract);
            next_contract += 1;
            let contract = build_contract(contract_id, player.id, team.id, &offer, season)?;
            committed += offer_cap_hit(&offer);
            contracts.push(contract);
            players.push(player);
        }
    }

    let mut free_agents = Vec::with_capacity(FREE_AGENT_POOL);
    for _ in 0..FREE_AGENT_POOL {
        let position = Position::ALL[rng.gen_range(0..Position::ALL.len())];
        let player = random_player(PlayerId(next_player), position, None, &mut rng);
        next_player += 1;
        free_agents.push(FreeAgent::new(player.id, free_agent_kind(player.accrued_seasons)));
        players.push(player);
    }

    let prospects = generate_draft_class(season, config.draft.class_size, ProspectId(1), &mut rng);
    let mut order: Vec<TeamId> = teams.iter().map(|t| t.id).collect();
    order.shuffle(&mut rng);
    let mut picks = Vec::new();
    for round in 1..=config.draft.rounds {
        for (i, &team) in order
            .iter()
            .take(usize::from(config.draft.picks_per_round))
            .enumerate()
        {
            let pick = u8::try_from(i + 1).unwrap_or(u8::MAX);
            picks.push(DraftPick {
                year: season,
                round,
                pick,
                overall: u16::from(round - 1) * u16::from(config.draft.picks_per_round)
                    + u16::from(pick),
                original_team: team,
                current_team: team,
                selection: None,
            });
        }
    }

    let date = NaiveDate::from_ymd_opt(i32::from(season), 3, 12).unwrap_or_default();
    let mut state = LeagueState {
        config,
        season,
        phase: SeasonPhase::FreeAgency,
        date,
        teams,
        players,
        contracts,
        free_agents,
        offers: Vec::new(),
        prospects,
        picks,
        transactions: Vec::new(),
    };
    refresh_cap_space(&mut state)?;
    info!(
        seed,
        teams = state.teams.len(),
        players = state.players.len(),
        prospects = state.prospects.len(),
        "demo league seeded"
    );
    League::new(state)
}
