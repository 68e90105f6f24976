#![deny(warnings)]

//! Headless front-office driver: seeds or loads a league, runs a free-agency
//! period and the draft, and prints a summary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use gm_ai::{build_draft_board, DraftStop};
use gm_core::{
    rng_from_seed, ContractOffer, ContractStructure, LeagueConfig, LeagueView, PlayerId,
    SeasonPhase,
};
use gm_econ::{offer_cap_hit, Decision};
use gm_runtime::demo::seed_league;
use gm_runtime::League;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED: u64 = 2025;
const DEFAULT_PASSES: usize = 4;

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    passes: Option<usize>,
    load: Option<PathBuf>,
    save: Option<PathBuf>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            "--passes" => args.passes = it.next().and_then(|s| s.parse().ok()),
            "--load" => args.load = it.next().map(PathBuf::from),
            "--save" => args.save = it.next().map(PathBuf::from),
            "--json" => args.json = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    season: u16,
    offers_recorded: usize,
    bids_raised: usize,
    ai_signings: usize,
    user_signing: Option<PlayerId>,
    draft_selections: usize,
    user_cap_space: i64,
}

/// Opens talks with the best free agent the user team can fit and takes the
/// player's counter when one comes back.
fn sign_best_affordable(league: &mut League, rng: &mut ChaCha8Rng) -> Result<Option<PlayerId>> {
    let user = league.user_team();
    let space = league.team(user).map_or(0, |t| t.current_cap_space);
    let mut candidates: Vec<(u8, PlayerId)> = league
        .free_agents()
        .iter()
        .filter(|fa| fa.available)
        .filter_map(|fa| league.player(fa.player).map(|p| (p.overall_rating, p.id)))
        .collect();
    candidates.sort_by(|a, b| b.cmp(a));

    for (_, player) in candidates {
        let demands = league.player_demands(player, rng)?;
        let offer = ContractOffer {
            years: demands.years,
            total_value: demands.total_value(),
            guaranteed_money: demands.guaranteed,
            signing_bonus: demands.guaranteed / 2,
            structure: ContractStructure::Even,
        };
        if offer_cap_hit(&offer) > space {
            continue;
        }

        let mut negotiation = league.open_negotiation(player, rng)?;
        let mut next = Some(offer);
        while let Some(offer) = next.take() {
            let outcome = match league.submit_user_offer(&mut negotiation, offer, rng) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(player = %player, error = %e, "user offer refused");
                    break;
                }
            };
            info!(
                player = %player,
                round = negotiation.round(),
                score = outcome.evaluation.score,
                message = %outcome.evaluation.message,
                "negotiation"
            );
            match outcome.evaluation.decision {
                Decision::Accept => return Ok(Some(player)),
                Decision::Counter => next = outcome.evaluation.counter_offer,
                Decision::Decline => break,
            }
        }
    }
    Ok(None)
}

fn run_draft(league: &mut League, rng: &mut ChaCha8Rng) -> Result<usize> {
    league.set_phase(SeasonPhase::Draft)?;
    let user = league.user_team();
    let year = league.season();
    let mut selections = 0;
    loop {
        let run = league.process_ai_picks(rng)?;
        selections += run.selections.len();
        match run.stop {
            DraftStop::UserOnClock { overall } => {
                let board = build_draft_board(&*league, user, year, rng);
                let Some(top) = board.first() else { break };
                let rookie = league.make_user_pick(top.prospect)?;
                info!(overall, prospect = %top.prospect, rookie = %rookie, "user selection");
                selections += 1;
            }
            DraftStop::Complete | DraftStop::NoProspects => break,
        }
    }
    league.set_phase(SeasonPhase::PostDraft)?;
    Ok(selections)
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(
        git_sha = env!("GM_GIT_SHA"),
        built = env!("GM_BUILD_DATE"),
        ?args,
        "starting gm-cli"
    );

    let config = match &args.config {
        Some(path) => LeagueConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LeagueConfig::default(),
    };
    config.validate()?;
    let seed = args.seed.or(config.rng_seed);
    let mut rng = rng_from_seed(seed);

    let mut league = match &args.load {
        Some(path) => {
            let state = persistence::load(path)
                .with_context(|| format!("loading save {}", path.display()))?;
            League::new(state)?
        }
        None => seed_league(config, seed.unwrap_or(DEFAULT_SEED))?,
    };

    let mut summary = Summary {
        season: league.season(),
        ..Summary::default()
    };
    for pass in 1..=args.passes.unwrap_or(DEFAULT_PASSES) {
        let round = league.generate_ai_offers(&mut rng)?;
        let raised = league.escalate_bids(&mut rng)?;
        let sweep = league.process_ai_signings(&mut rng);
        info!(
            pass,
            offers = round.offers_recorded,
            raised = raised.len(),
            signed = sweep.signed.len(),
            "free agency pass"
        );
        summary.offers_recorded += round.offers_recorded;
        summary.bids_raised += raised.len();
        summary.ai_signings += sweep.signed.len();
        if pass == 1 {
            summary.user_signing = sign_best_affordable(&mut league, &mut rng)?;
        }
    }

    summary.draft_selections = run_draft(&mut league, &mut rng)?;
    summary.user_cap_space = league
        .team(league.user_team())
        .map_or(0, |t| t.current_cap_space);

    if let Some(path) = &args.save {
        persistence::save(path, league.state())
            .with_context(|| format!("saving to {}", path.display()))?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Season {} | offers: {} | raised: {} | AI signings: {} | user signing: {} | draft picks: {} | user cap space: ${}",
            summary.season,
            summary.offers_recorded,
            summary.bids_raised,
            summary.ai_signings,
            summary
                .user_signing
                .map_or_else(|| "none".to_owned(), |p| p.to_string()),
            summary.draft_selections,
            summary.user_cap_space
        );
    }
    Ok(())
}
