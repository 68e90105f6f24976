//! AI behaviour on the free-agent market: bidding, escalating and signing.

use std::fmt::Display;

use gm_core::{
    round_money, validate_offer, Bid, ContractOffer, ContractStructure, FreeAgent, LeagueStore,
    LeagueView, Money, OfferId, OfferStatus, Player, PlayerDemands, PlayerId, Signing, Team,
    TeamId,
};
use gm_econ::{calculate_player_value, offer_cap_hit};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::needs::free_agency_need;

/// How many AI teams chase a free agent of this rating.
pub fn number_of_bidders<R: Rng + ?Sized>(rating: u8, rng: &mut R) -> usize {
    match rating {
        90.. => rng.gen_range(5..=7),
        85..=89 => rng.gen_range(3..=5),
        80..=84 => rng.gen_range(2..=3),
        75..=79 => rng.gen_range(1..=2),
        _ => usize::from(rng.gen_bool(0.5)),
    }
}

/// Cached demands, or a fresh valuation when the market has none on file.
pub fn demands_for<R: Rng + ?Sized>(
    free_agent: &FreeAgent,
    player: &Player,
    rng: &mut R,
) -> PlayerDemands {
    free_agent
        .demands
        .unwrap_or_else(|| calculate_player_value(player, rng))
}

/// Picks up to `count` AI teams that want the player and can cover the asking APY.
///
/// Teams are visited in random order and join with probability
/// `need × 0.7 + U(0, 0.3)`. Any shortfall is filled from the remaining
/// affordable teams, so the result is bounded by how many teams can pay.
pub fn select_interested_teams<V, R>(
    view: &V,
    player: &Player,
    demands: &PlayerDemands,
    count: usize,
    rng: &mut R,
) -> Vec<TeamId>
where
    V: LeagueView + ?Sized,
    R: Rng + ?Sized,
{
    let user_team = view.config().user_team;
    let mut teams: Vec<&Team> = view.teams().iter().filter(|t| t.id != user_team).collect();
    teams.shuffle(rng);
    let affordable = |t: &Team| t.current_cap_space >= demands.apy;

    let mut interested = Vec::new();
    for team in teams.iter().filter(|t| affordable(t)) {
        if interested.len() >= count {
            break;
        }
        let need = free_agency_need(view, team.id, player.position);
        let interest = need * 0.7 + rng.gen::<f64>() * 0.3;
        if rng.gen::<f64>() < interest {
            interested.push(team.id);
        }
    }

    if interested.len() < count {
        let mut rest: Vec<TeamId> = teams
            .iter()
            .filter(|t| affordable(t) && !interested.contains(&t.id))
            .map(|t| t.id)
            .collect();
        rest.shuffle(rng);
        let missing = count - interested.len();
        interested.extend(rest.into_iter().take(missing));
    }
    interested
}

fn basis_points<R: Rng + ?Sized>(rng: &mut R, low: i64, high: i64) -> Decimal {
    Decimal::new(rng.gen_range(low..=high), 4)
}

fn select_structure<R: Rng + ?Sized>(rng: &mut R) -> ContractStructure {
    let roll = rng.gen::<f64>();
    if roll < 0.2 {
        ContractStructure::Frontloaded
    } else if roll < 0.4 {
        ContractStructure::Backloaded
    } else {
        ContractStructure::Even
    }
}

/// Offer an AI team would make, or `None` when the first-year cap hit would
/// not fit in `cap_space`.
///
/// Teams bid 85-105% of market value with 40-60% guaranteed, of which
/// 30-50% comes as signing bonus. The cap check uses the real first-year
/// salary of the chosen structure; a structure that does not fit falls back
/// to an even split, then to a backloaded one.
pub fn generate_team_offer<R: Rng + ?Sized>(
    cap_space: Money,
    demands: &PlayerDemands,
    rng: &mut R,
) -> Option<ContractOffer> {
    let years = demands.years;
    let market = Decimal::from(demands.total_value());
    let total_value = round_money(market * basis_points(rng, 8_500, 10_500));
    let guaranteed_money = round_money(Decimal::from(total_value) * basis_points(rng, 4_000, 6_000));
    let signing_bonus = round_money(Decimal::from(guaranteed_money) * basis_points(rng, 3_000, 5_000));

    let preferred = select_structure(rng);
    let offer = [preferred, ContractStructure::Even, ContractStructure::Backloaded]
        .into_iter()
        .map(|structure| ContractOffer {
            years,
            total_value,
            guaranteed_money,
            signing_bonus,
            structure,
        })
        .find(|o| offer_cap_hit(o) <= cap_space)?;
    validate_offer(&offer).ok()?;
    Some(offer)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRound {
    pub players_considered: usize,
    pub offers_recorded: usize,
}

/// Puts AI bids on the best available free agents.
///
/// A team never holds two pending offers for the same player, so repeated
/// rounds only top up bidders that are missing.
pub fn generate_ai_offers<S, R>(store: &mut S, rng: &mut R) -> Result<OfferRound, S::Error>
where
    S: LeagueStore + ?Sized,
    R: Rng + ?Sized,
{
    let config = store.config().free_agency.clone();
    let user_team = store.config().user_team;

    let mut pool: Vec<(&FreeAgent, &Player)> = store
        .free_agents()
        .iter()
        .filter(|fa| fa.available)
        .filter_map(|fa| store.player(fa.player).map(|p| (fa, p)))
        .filter(|(_, p)| p.overall_rating >= config.rating_floor)
        .collect();
    pool.sort_by(|a, b| {
        b.1.overall_rating
            .cmp(&a.1.overall_rating)
            .then(a.1.id.cmp(&b.1.id))
    });
    pool.truncate(config.pool_size);

    let mut bids = Vec::new();
    for (fa, player) in &pool {
        let demands = demands_for(fa, player, rng);
        let bidders = number_of_bidders(player.overall_rating, rng);
        let already: Vec<TeamId> = store
            .pending_offers(player.id)
            .iter()
            .filter(|o| o.team != user_team)
            .map(|o| o.team)
            .collect();
        let wanted = bidders.saturating_sub(already.len());
        if wanted == 0 {
            continue;
        }
        let teams = select_interested_teams(&*store, player, &demands, bidders, rng);
        for team in teams.into_iter().filter(|t| !already.contains(t)).take(wanted) {
            let cap_space = store.team(team).map_or(0, |t| t.current_cap_space);
            match generate_team_offer(cap_space, &demands, rng) {
                Some(offer) => bids.push(Bid {
                    team,
                    player: player.id,
                    offer,
                }),
                None => debug!(team = %team, player = %player.id, "cannot afford free agent"),
            }
        }
    }

    let round = OfferRound {
        players_considered: pool.len(),
        offers_recorded: bids.len(),
    };
    for bid in bids {
        store.record_offer(bid, 1)?;
    }
    info!(
        players = round.players_considered,
        offers = round.offers_recorded,
        "AI offers generated"
    );
    Ok(round)
}

/// Gives the highest AI bidder for `player` a chance to raise its offer by
/// 5-10%. The raise is dropped if the team can no longer fit the first-year
/// cap hit.
pub fn escalate_top_bid<S, R>(
    store: &mut S,
    player: PlayerId,
    rng: &mut R,
) -> Result<Option<OfferId>, S::Error>
where
    S: LeagueStore + ?Sized,
    R: Rng + ?Sized,
{
    let user_team = store.config().user_team;
    let chance = store.config().free_agency.escalation_chance;
    let Some(top) = store
        .pending_offers(player)
        .into_iter()
        .filter(|o| o.team != user_team)
        .max_by_key(|o| o.offer.total_value)
        .cloned()
    else {
        return Ok(None);
    };
    if !rng.gen_bool(chance) {
        return Ok(None);
    }

    let raise = basis_points(rng, 10_500, 11_000);
    let offer = ContractOffer {
        total_value: round_money(Decimal::from(top.offer.total_value) * raise),
        guaranteed_money: round_money(Decimal::from(top.offer.guaranteed_money) * raise),
        ..top.offer
    };
    let cap_space = store.team(top.team).map_or(0, |t| t.current_cap_space);
    if offer_cap_hit(&offer) > cap_space || validate_offer(&offer).is_err()
    {
        debug!(team = %top.team, player = %player, "escalation dropped");
        return Ok(None);
    }

    store.revise_offer(top.id, offer)?;
    info!(team = %top.team, player = %player, total = offer.total_value, "AI raised its offer");
    Ok(Some(top.id))
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningSweep {
    pub considered: usize,
    pub signed: Vec<(PlayerId, TeamId)>,
    /// Signings the store refused.
    pub skipped: usize,
}

/// Lets players accept AI offers close to their asking price.
///
/// A random sample of pending AI offers is examined; one at or above the
/// configured APY ratio is accepted with the configured probability. Offers
/// invalidated by an earlier signing in the same sweep are passed over.
pub fn process_ai_signings<S, R>(store: &mut S, rng: &mut R) -> SigningSweep
where
    S: LeagueStore + ?Sized,
    S::Error: Display,
    R: Rng + ?Sized,
{
    let config = store.config().free_agency.clone();
    let user_team = store.config().user_team;

    let mut candidates: Vec<(OfferId, PlayerId, TeamId, ContractOffer, Money)> = Vec::new();
    for offer in store.offers() {
        if offer.status != OfferStatus::Pending || offer.team == user_team {
            continue;
        }
        let Some(fa) = store.free_agent(offer.player).filter(|fa| fa.available) else {
            continue;
        };
        let Some(player) = store.player(offer.player) else {
            continue;
        };
        let demands = demands_for(fa, player, rng);
        candidates.push((offer.id, offer.player, offer.team, offer.offer, demands.apy));
    }
    candidates.shuffle(rng);
    candidates.truncate(config.signing_sweep_size);

    let mut sweep = SigningSweep {
        considered: candidates.len(),
        ..SigningSweep::default()
    };
    for (offer_id, player, team, offer, asking_apy) in candidates {
        let still_open = store.free_agent(player).is_some_and(|fa| fa.available)
            && store
                .offers()
                .iter()
                .any(|o| o.id == offer_id && o.status == OfferStatus::Pending);
        if !still_open {
            continue;
        }
        let ratio = offer.apy() as f64 / asking_apy.max(1) as f64;
        if ratio < config.signing_apy_ratio || !rng.gen_bool(config.signing_chance) {
            continue;
        }
        let signing = Signing {
            player,
            team,
            offer,
            offer_id: Some(offer_id),
        };
        match store.commit_signing(signing) {
            Ok(contract) => {
                info!(player = %player, team = %team, contract = %contract, "AI signing");
                sweep.signed.push((player, team));
            }
            Err(e) => {
                warn!(player = %player, team = %team, error = %e, "AI signing skipped");
                sweep.skipped += 1;
            }
        }
    }
    sweep
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{league, TestLeague};
    use gm_core::{ContractId, Position, Priority};
    use gm_econ::{build_contract, calculate_cap_hit};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn demands(apy: Money, years: u8) -> PlayerDemands {
        PlayerDemands {
            apy,
            years,
            guaranteed: apy * Money::from(years) / 2,
            priority: Priority::Money,
        }
    }

    fn market() -> TestLeague {
        let mut l = league();
        l.add_free_agent(1, Position::QB, 92);
        l.add_free_agent(2, Position::WR, 81);
        l.add_free_agent(3, Position::RB, 65);
        l
    }

    #[test]
    fn bidder_counts_by_tier() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            assert!((5..=7).contains(&number_of_bidders(95, &mut rng)));
            assert!((2..=3).contains(&number_of_bidders(80, &mut rng)));
            assert!(number_of_bidders(60, &mut rng) <= 1);
        }
    }

    #[test]
    fn offers_fall_in_market_band() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let d = demands(10_000_000, 4);
        for _ in 0..200 {
            let o = generate_team_offer(100_000_000, &d, &mut rng).unwrap();
            assert_eq!(o.years, 4);
            assert!((34_000_000..=42_000_000).contains(&o.total_value));
            assert!(o.guaranteed_money * 10 >= o.total_value * 4);
            assert!(o.guaranteed_money * 10 <= o.total_value * 6 + 10);
            assert!(o.signing_bonus <= o.guaranteed_money / 2 + 1);
        }
    }

    #[test]
    fn tight_cap_never_gets_an_oversized_first_year() {
        // An even split of any 4-year bid here costs at most 10.5M, so every
        // seed must still produce an offer after falling back.
        let d = demands(10_000_000, 4);
        let mut made = 0;
        for seed in 0..500 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let Some(o) = generate_team_offer(11_000_000, &d, &mut rng) else {
                continue;
            };
            made += 1;
            let contract = build_contract(ContractId(1), PlayerId(1), TeamId(2), &o, 2025).unwrap();
            let hit = calculate_cap_hit(&contract, 2025).unwrap().total_cap_hit;
            assert!(hit <= 11_000_000, "{o:?} costs {hit}");
        }
        assert_eq!(made, 500);
    }

    #[test]
    fn cannot_afford_means_no_offer() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(generate_team_offer(1_000_000, &demands(10_000_000, 4), &mut rng).is_none());
    }

    #[test]
    fn interested_teams_exclude_user_and_broke_teams() {
        let mut l = market();
        l.state.teams[2].current_cap_space = 0;
        let player = l.state.players[0].clone();
        let d = demands(40_000_000, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let teams = select_interested_teams(&l, &player, &d, 7, &mut rng);
        let mut sorted = teams.clone();
        sorted.sort();
        assert_eq!(sorted, vec![TeamId(2), TeamId(4)]);
    }

    #[test]
    fn offers_are_recorded_once_per_team() {
        let mut l = market();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let first = generate_ai_offers(&mut l, &mut rng).unwrap();
        assert_eq!(first.players_considered, 2);
        assert!(first.offers_recorded > 0);
        generate_ai_offers(&mut l, &mut rng).unwrap();

        let mut pairs: Vec<(PlayerId, TeamId)> = l.state.offers.iter().map(|o| (o.player, o.team)).collect();
        let total = pairs.len();
        pairs.sort();
        pairs.dedup();
        assert_eq!(pairs.len(), total);
        assert!(l.state.offers.iter().all(|o| o.team != TeamId(1) && o.round == 1));
        assert!(l.state.offers.iter().all(|o| o.player != PlayerId(3)));
    }

    #[test]
    fn escalation_raises_top_ai_bid() {
        let mut l = market();
        l.state.config.free_agency.escalation_chance = 1.0;
        let base = ContractOffer {
            years: 3,
            total_value: 30_000_000,
            guaranteed_money: 15_000_000,
            signing_bonus: 6_000_000,
            structure: ContractStructure::Even,
        };
        let low = l.record_offer(Bid { team: TeamId(2), player: PlayerId(2), offer: base }, 1).unwrap();
        let high_offer = ContractOffer { total_value: 36_000_000, ..base };
        let high = l.record_offer(Bid { team: TeamId(3), player: PlayerId(2), offer: high_offer }, 1).unwrap();
        let user_offer = ContractOffer { total_value: 45_000_000, ..base };
        l.record_offer(Bid { team: TeamId(1), player: PlayerId(2), offer: user_offer }, 1).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(6);
        assert_eq!(escalate_top_bid(&mut l, PlayerId(2), &mut rng).unwrap(), Some(high));
        let raised = l.state.offers.iter().find(|o| o.id == high).unwrap();
        assert!((37_800_000..=39_600_000).contains(&raised.offer.total_value));
        assert_eq!(raised.round, 2);
        let untouched = l.state.offers.iter().find(|o| o.id == low).unwrap();
        assert_eq!(untouched.offer, base);
    }

    #[test]
    fn escalation_dropped_when_it_no_longer_fits() {
        let mut l = market();
        l.state.config.free_agency.escalation_chance = 1.0;
        l.state.teams[1].current_cap_space = 11_000_000;
        let offer = ContractOffer {
            years: 3,
            total_value: 33_000_000,
            guaranteed_money: 15_000_000,
            signing_bonus: 6_000_000,
            structure: ContractStructure::Even,
        };
        let id = l.record_offer(Bid { team: TeamId(2), player: PlayerId(1), offer }, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(escalate_top_bid(&mut l, PlayerId(1), &mut rng).unwrap(), None);
        assert_eq!(l.state.offers.iter().find(|o| o.id == id).unwrap().offer, offer);
    }

    #[test]
    fn sweep_signs_each_player_at_most_once() {
        let mut l = market();
        l.state.config.free_agency.signing_chance = 1.0;
        l.state.free_agents[1].demands = Some(demands(10_000_000, 3));
        let offer = ContractOffer {
            years: 3,
            total_value: 30_000_000,
            guaranteed_money: 12_000_000,
            signing_bonus: 3_000_000,
            structure: ContractStructure::Even,
        };
        for team in [2, 3, 4] {
            l.record_offer(Bid { team: TeamId(team), player: PlayerId(2), offer }, 1).unwrap();
        }
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let sweep = process_ai_signings(&mut l, &mut rng);
        assert_eq!(sweep.considered, 3);
        assert_eq!(sweep.signed.len(), 1);
        assert_eq!(sweep.skipped, 0);
        let accepted = l.state.offers.iter().filter(|o| o.status == OfferStatus::Accepted).count();
        let withdrawn = l.state.offers.iter().filter(|o| o.status == OfferStatus::Withdrawn).count();
        assert_eq!((accepted, withdrawn), (1, 2));

        let again = process_ai_signings(&mut l, &mut rng);
        assert_eq!(again.considered, 0);
    }

    #[test]
    fn lowball_offers_never_sign() {
        let mut l = market();
        l.state.config.free_agency.signing_chance = 1.0;
        l.state.free_agents[1].demands = Some(demands(10_000_000, 3));
        let offer = ContractOffer {
            years: 3,
            total_value: 27_000_000,
            guaranteed_money: 12_000_000,
            signing_bonus: 3_000_000,
            structure: ContractStructure::Even,
        };
        l.record_offer(Bid { team: TeamId(2), player: PlayerId(2), offer }, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!(process_ai_signings(&mut l, &mut rng).signed.is_empty());
    }

    proptest! {
        #[test]
        fn generated_offers_fit_and_validate(
            apy in 1_000_000i64..60_000_000,
            years in 1u8..=5,
            cap in 0i64..120_000_000,
            seed in any::<u64>(),
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            if let Some(o) = generate_team_offer(cap, &demands(apy, years), &mut rng) {
                prop_assert!(validate_offer(&o).is_ok());
                let contract = build_contract(ContractId(1), PlayerId(1), TeamId(2), &o, 2025).unwrap();
                prop_assert!(calculate_cap_hit(&contract, 2025).unwrap().total_cap_hit <= cap);
            }
        }
    }
}
