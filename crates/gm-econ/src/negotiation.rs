//! Contract negotiation between a team and a free agent.
//!
//! A player scores each offer against their demands, weighted by what they
//! care about most, then accepts, counters or declines. Counters drift toward
//! the team's terms a little more every round and a negotiation never runs
//! past [`MAX_NEGOTIATION_ROUNDS`].

use std::fmt;

use gm_core::{
    round_money, validate_offer, ContractOffer, Money, Player, PlayerDemands, PlayerId, Position,
    Priority, ValidationError, MAX_CONTRACT_YEARS, MIN_CONTRACT_YEARS,
};
use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const MAX_NEGOTIATION_ROUNDS: u8 = 3;

const ACCEPT_THRESHOLD: f64 = 90.0;
const COUNTER_THRESHOLD: f64 = 70.0;

const ACCEPT_MESSAGES: [&str; 5] = [
    "We have a deal! I'm excited to join your team and help bring a championship to the city.",
    "This is exactly what I was looking for. Let's get to work!",
    "I'm ready to sign on the dotted line. Can't wait to get started.",
    "This offer shows you value what I bring to the table. I'm in.",
    "Perfect! Let's make this official and get to training camp.",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NegotiationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("negotiation rounds start at 1")]
    InvalidRound,
    #[error("negotiation is closed ({0:?})")]
    Closed(NegotiationState),
}

/// Player details carried through a negotiation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub overall_rating: u8,
    pub age: u8,
}

impl From<&Player> for PlayerSummary {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            name: p.full_name(),
            position: p.position,
            overall_rating: p.overall_rating,
            age: p.age,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationContext {
    pub player: PlayerSummary,
    pub demands: PlayerDemands,
    pub competing_offers: Vec<ContractOffer>,
    pub round: u8,
    pub previous_offers: Vec<ContractOffer>,
}

impl NegotiationContext {
    pub fn new(player: PlayerSummary, demands: PlayerDemands) -> Self {
        Self {
            player,
            demands,
            competing_offers: Vec::new(),
            round: 1,
            previous_offers: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accept,
    Counter,
    Decline,
}

/// The weakest part of a declined offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclineReason {
    ApyTooLow,
    NotEnoughGuaranteed,
    LengthMismatch,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeclineReason::ApyTooLow => "APY too low",
            DeclineReason::NotEnoughGuaranteed => "Not enough guaranteed money",
            DeclineReason::LengthMismatch => "Contract length doesn't match expectations",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub apy: f64,
    pub years: f64,
    pub guaranteed: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferEvaluation {
    pub score: f64,
    pub components: ComponentScores,
    pub decision: Decision,
    pub message: String,
    pub reason: Option<DeclineReason>,
    pub counter_offer: Option<ContractOffer>,
}

fn apy_score(offer: &ContractOffer, demands: &PlayerDemands) -> f64 {
    if demands.apy <= 0 {
        return 100.0;
    }
    let ratio = offer.apy() as f64 / demands.apy as f64;
    match ratio {
        r if r >= 1.1 => 100.0,
        r if r >= 1.0 => 95.0,
        r if r >= 0.95 => 85.0,
        r if r >= 0.9 => 75.0,
        r if r >= 0.85 => 65.0,
        r if r >= 0.8 => 50.0,
        r if r >= 0.75 => 35.0,
        r if r >= 0.7 => 20.0,
        _ => 10.0,
    }
}

fn years_score(offer: &ContractOffer, demands: &PlayerDemands) -> f64 {
    match offer.years.abs_diff(demands.years) {
        0 => 100.0,
        1 => 80.0,
        2 => 60.0,
        3 => 40.0,
        _ => 20.0,
    }
}

fn guaranteed_score(offer: &ContractOffer, demands: &PlayerDemands) -> f64 {
    if demands.guaranteed <= 0 {
        return 100.0;
    }
    let ratio = offer.guaranteed_money as f64 / demands.guaranteed as f64;
    match ratio {
        r if r >= 1.0 => 100.0,
        r if r >= 0.95 => 90.0,
        r if r >= 0.9 => 80.0,
        r if r >= 0.85 => 70.0,
        r if r >= 0.8 => 60.0,
        r if r >= 0.75 => 50.0,
        r if r >= 0.7 => 40.0,
        _ => 30.0,
    }
}

fn component_scores(offer: &ContractOffer, demands: &PlayerDemands) -> ComponentScores {
    ComponentScores {
        apy: apy_score(offer, demands),
        years: years_score(offer, demands),
        guaranteed: guaranteed_score(offer, demands),
    }
}

fn weighted_score(c: &ComponentScores, priority: Priority) -> f64 {
    match priority {
        Priority::Money => c.apy * 0.5 + c.guaranteed * 0.3 + c.years * 0.2,
        Priority::Years => c.years * 0.5 + c.apy * 0.3 + c.guaranteed * 0.2,
        Priority::Winning | Priority::Hometown => c.apy * 0.4 + c.guaranteed * 0.3 + c.years * 0.3,
    }
}

/// Best rival offer by APY (60%) and guaranteed money (40%). Earlier offers
/// win ties.
pub fn find_best_competing_offer<'a>(
    offers: &'a [ContractOffer],
    demands: &PlayerDemands,
) -> Option<&'a ContractOffer> {
    let mut best: Option<(&ContractOffer, f64)> = None;
    for offer in offers {
        let score = apy_score(offer, demands) * 0.6 + guaranteed_score(offer, demands) * 0.4;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((offer, score));
        }
    }
    best.map(|(o, _)| o)
}

/// Positive when `a` is the better offer.
pub fn compare_offers(a: &ContractOffer, b: &ContractOffer) -> f64 {
    let apy_diff = (a.apy() - b.apy()) as f64;
    let total_diff = (a.total_value - b.total_value) as f64;
    let guaranteed_diff = (a.guaranteed_money - b.guaranteed_money) as f64;
    apy_diff * 0.4 + total_diff * 0.000_000_3 + guaranteed_diff * 0.000_000_3
}

/// Lowest-scoring dimension; APY wins ties, then guaranteed money.
pub fn identify_main_issue(offer: &ContractOffer, demands: &PlayerDemands) -> DeclineReason {
    let c = component_scores(offer, demands);
    let lowest = c.apy.min(c.years).min(c.guaranteed);
    if c.apy == lowest {
        DeclineReason::ApyTooLow
    } else if c.guaranteed == lowest {
        DeclineReason::NotEnoughGuaranteed
    } else {
        DeclineReason::LengthMismatch
    }
}

fn counter_message(score: f64) -> &'static str {
    if score >= 80.0 {
        "We're getting close. I've put together a counter-offer that I think works for both sides."
    } else {
        "I appreciate the offer, but we need to bridge the gap a bit. Here's what I'm thinking..."
    }
}

fn decline_message(score: f64) -> &'static str {
    if score < 50.0 {
        "This offer doesn't reflect my value to the team. I think we're too far apart to continue negotiations."
    } else {
        "I appreciate your interest, but I've decided to explore other options. Good luck this season."
    }
}

/// Scores an offer and decides how the player responds.
pub fn evaluate_offer<R: Rng + ?Sized>(
    context: &NegotiationContext,
    offer: &ContractOffer,
    rng: &mut R,
) -> Result<OfferEvaluation, NegotiationError> {
    if context.round == 0 {
        return Err(NegotiationError::InvalidRound);
    }
    validate_offer(offer)?;

    let demands = &context.demands;
    let components = component_scores(offer, demands);
    let mut score = weighted_score(&components, demands.priority);

    if let Some(best) = find_best_competing_offer(&context.competing_offers, demands) {
        let diff = compare_offers(offer, best);
        if diff < -10.0 {
            score -= 15.0;
        } else if diff > 10.0 {
            score += 10.0;
        }
    }
    score += 5.0 * f64::from(context.round - 1);

    let evaluation = if score >= ACCEPT_THRESHOLD {
        let message = ACCEPT_MESSAGES.choose(rng).copied().unwrap_or(ACCEPT_MESSAGES[0]);
        OfferEvaluation {
            score,
            components,
            decision: Decision::Accept,
            message: message.to_owned(),
            reason: None,
            counter_offer: None,
        }
    } else if score >= COUNTER_THRESHOLD && context.round < MAX_NEGOTIATION_ROUNDS {
        OfferEvaluation {
            score,
            components,
            decision: Decision::Counter,
            message: counter_message(score).to_owned(),
            reason: None,
            counter_offer: Some(generate_counter_offer(context, offer, rng)),
        }
    } else {
        OfferEvaluation {
            score,
            components,
            decision: Decision::Decline,
            message: decline_message(score).to_owned(),
            reason: Some(identify_main_issue(offer, demands)),
            counter_offer: None,
        }
    };

    debug!(
        player = %context.player.id,
        round = context.round,
        score,
        decision = ?evaluation.decision,
        "evaluated offer"
    );
    Ok(evaluation)
}

fn ratio(numerator: Money, denominator: Money) -> Option<Decimal> {
    (denominator > 0).then(|| Decimal::from(numerator) / Decimal::from(denominator))
}

/// Moves from the player's demands toward the current offer by
/// `0.15 × round` on APY, length and guaranteed share.
pub fn generate_counter_offer<R: Rng + ?Sized>(
    context: &NegotiationContext,
    current: &ContractOffer,
    rng: &mut R,
) -> ContractOffer {
    let demands = &context.demands;
    let flexibility = (Decimal::new(15, 2) * Decimal::from(context.round)).min(Decimal::ONE);

    let demand_apy = Decimal::from(demands.apy);
    let target_apy = demand_apy - (demand_apy - Decimal::from(current.apy())) * flexibility;

    let demand_years = Decimal::from(demands.years);
    let years = round_money(demand_years - (demand_years - Decimal::from(current.years)) * flexibility)
        .clamp(i64::from(MIN_CONTRACT_YEARS), i64::from(MAX_CONTRACT_YEARS));
    let years = u8::try_from(years).unwrap_or(MAX_CONTRACT_YEARS);

    let total_value = round_money(target_apy * Decimal::from(years));

    let current_pct = ratio(current.guaranteed_money, current.total_value).unwrap_or(Decimal::ZERO);
    let target_pct =
        ratio(demands.guaranteed, demands.total_value()).unwrap_or(current_pct);
    let counter_pct = target_pct - (target_pct - current_pct) * flexibility;
    let guaranteed_money = round_money(Decimal::from(total_value) * counter_pct).clamp(0, total_value);

    let bonus_pct = Decimal::new(rng.gen_range(4_000..=5_000), 4);
    let signing_bonus = round_money(Decimal::from(guaranteed_money) * bonus_pct);

    ContractOffer {
        years,
        total_value,
        guaranteed_money,
        signing_bonus,
        structure: current.structure,
    }
}

/// Extra willingness to re-sign with the current team.
///
/// `team_success` runs 0-100 from recent playoff results.
pub fn loyalty_bonus<R: Rng + ?Sized>(accrued_seasons: u8, team_success: u8, rng: &mut R) -> u32 {
    let tenure = match accrued_seasons {
        8.. => 10,
        5..=7 => 5,
        _ => 0,
    };
    let success = match team_success {
        80.. => 10,
        60..=79 => 5,
        _ => 0,
    };
    tenure + success + rng.gen_range(0..=5)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NegotiationState {
    /// Waiting on the team's next offer.
    Offered,
    Countered,
    Accepted,
    Declined,
}

impl NegotiationState {
    pub fn is_terminal(self) -> bool {
        matches!(self, NegotiationState::Accepted | NegotiationState::Declined)
    }
}

/// A running negotiation with one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Negotiation {
    context: NegotiationContext,
    state: NegotiationState,
    last_counter: Option<ContractOffer>,
}

impl Negotiation {
    pub fn new(
        player: PlayerSummary,
        demands: PlayerDemands,
        competing_offers: Vec<ContractOffer>,
    ) -> Self {
        let mut context = NegotiationContext::new(player, demands);
        context.competing_offers = competing_offers;
        Self {
            context,
            state: NegotiationState::Offered,
            last_counter: None,
        }
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn round(&self) -> u8 {
        self.context.round
    }

    pub fn context(&self) -> &NegotiationContext {
        &self.context
    }

    /// The player's most recent counter, if any.
    pub fn last_counter(&self) -> Option<&ContractOffer> {
        self.last_counter.as_ref()
    }

    /// Puts an offer in front of the player. A counter opens the next round;
    /// accept and decline close the negotiation.
    pub fn submit<R: Rng + ?Sized>(
        &mut self,
        offer: ContractOffer,
        rng: &mut R,
    ) -> Result<OfferEvaluation, NegotiationError> {
        if self.state.is_terminal() {
            return Err(NegotiationError::Closed(self.state));
        }
        let evaluation = evaluate_offer(&self.context, &offer, rng)?;
        self.context.previous_offers.push(offer);
        self.state = match evaluation.decision {
            Decision::Accept => NegotiationState::Accepted,
            Decision::Decline => NegotiationState::Declined,
            Decision::Counter => {
                self.context.round += 1;
                self.last_counter = evaluation.counter_offer;
                NegotiationState::Countered
            }
        };
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gm_core::{ContractStructure, OfferViolation};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn summary() -> PlayerSummary {
        PlayerSummary {
            id: PlayerId(11),
            name: "Test Player".into(),
            position: Position::WR,
            overall_rating: 86,
            age: 27,
        }
    }

    fn demands(priority: Priority) -> PlayerDemands {
        PlayerDemands {
            apy: 20_000_000,
            years: 4,
            guaranteed: 48_000_000,
            priority,
        }
    }

    fn offer(years: u8, total: Money, guaranteed: Money, bonus: Money) -> ContractOffer {
        ContractOffer {
            years,
            total_value: total,
            guaranteed_money: guaranteed,
            signing_bonus: bonus,
            structure: ContractStructure::Even,
        }
    }

    #[test]
    fn meeting_demands_is_accepted() {
        let ctx = NegotiationContext::new(summary(), demands(Priority::Money));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let eval = evaluate_offer(&ctx, &offer(4, 80_000_000, 48_000_000, 20_000_000), &mut rng).unwrap();
        assert_eq!(eval.components.apy, 95.0);
        assert_eq!(eval.components.guaranteed, 100.0);
        assert_eq!(eval.components.years, 100.0);
        assert!((eval.score - 97.5).abs() < 1e-9);
        assert_eq!(eval.decision, Decision::Accept);
        assert!(ACCEPT_MESSAGES.contains(&eval.message.as_str()));
    }

    #[test]
    fn near_miss_gets_a_counter() {
        let ctx = NegotiationContext::new(summary(), demands(Priority::Money));
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        // 90% APY, 90% guaranteed, right length: 37.5 + 24 + 20
        let current = offer(4, 72_000_000, 43_200_000, 20_000_000);
        let eval = evaluate_offer(&ctx, &current, &mut rng).unwrap();
        assert!((eval.score - 81.5).abs() < 1e-9);
        assert_eq!(eval.decision, Decision::Counter);
        let counter = eval.counter_offer.unwrap();
        assert_eq!(counter.years, 4);
        assert_eq!(counter.total_value, 78_800_000);
        assert!(counter.signing_bonus * 10 >= counter.guaranteed_money * 4);
        assert!(counter.signing_bonus * 2 <= counter.guaranteed_money);
        assert!(validate_offer(&counter).is_ok());
    }

    #[test]
    fn lowball_is_declined_with_reason() {
        let ctx = NegotiationContext::new(summary(), demands(Priority::Money));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let eval = evaluate_offer(&ctx, &offer(4, 40_000_000, 40_000_000, 10_000_000), &mut rng).unwrap();
        assert_eq!(eval.decision, Decision::Decline);
        assert_eq!(eval.reason, Some(DeclineReason::ApyTooLow));
        assert_eq!(eval.reason.unwrap().to_string(), "APY too low");
    }

    #[test]
    fn length_is_the_issue_when_money_is_right() {
        let d = demands(Priority::Years);
        let o = offer(1, 22_000_000, 22_000_000, 0);
        assert_eq!(identify_main_issue(&o, &d), DeclineReason::NotEnoughGuaranteed);
        let d = PlayerDemands {
            guaranteed: 20_000_000,
            ..d
        };
        assert_eq!(identify_main_issue(&o, &d), DeclineReason::LengthMismatch);
    }

    #[test]
    fn stronger_rival_offer_costs_fifteen() {
        let mut ctx = NegotiationContext::new(summary(), demands(Priority::Money));
        let current = offer(4, 72_000_000, 43_200_000, 20_000_000);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let alone = evaluate_offer(&ctx, &current, &mut rng).unwrap().score;
        ctx.competing_offers = vec![offer(4, 84_000_000, 48_000_000, 20_000_000)];
        let contested = evaluate_offer(&ctx, &current, &mut rng).unwrap().score;
        assert!((alone - contested - 15.0).abs() < 1e-9);
    }

    #[test]
    fn best_rival_prefers_first_on_ties() {
        let d = demands(Priority::Money);
        let offers = [
            offer(4, 80_000_000, 48_000_000, 0),
            offer(4, 80_000_000, 48_000_000, 1_000_000),
        ];
        let best = find_best_competing_offer(&offers, &d).unwrap();
        assert_eq!(best.signing_bonus, 0);
        assert!(find_best_competing_offer(&[], &d).is_none());
    }

    #[test]
    fn invalid_offer_is_rejected_before_scoring() {
        let ctx = NegotiationContext::new(summary(), demands(Priority::Money));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let err = evaluate_offer(&ctx, &offer(8, 80_000_000, 48_000_000, 20_000_000), &mut rng).unwrap_err();
        assert_eq!(
            err,
            NegotiationError::Validation(ValidationError::InvalidOffer(vec![
                OfferViolation::YearsOutOfRange(8)
            ]))
        );
    }

    #[test]
    fn declined_negotiation_is_closed() {
        let mut negotiation = Negotiation::new(summary(), demands(Priority::Money), Vec::new());
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        // 85% APY, 85% guaranteed, one year short: 32.5 + 21 + 16 = 69.5
        let stubborn = offer(3, 51_000_000, 40_800_000, 10_000_000);

        let first = negotiation.submit(stubborn, &mut rng).unwrap();
        assert_eq!(first.decision, Decision::Decline);
        assert_eq!(negotiation.state(), NegotiationState::Declined);
        assert!(matches!(
            negotiation.submit(stubborn, &mut rng),
            Err(NegotiationError::Closed(NegotiationState::Declined))
        ));
    }

    #[test]
    fn negotiation_counters_then_closes_by_round_three() {
        let mut negotiation = Negotiation::new(summary(), demands(Priority::Money), Vec::new());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        // 75 apy, 70 guaranteed, 80 years = 37.5 + 21 + 16 = 74.5
        let steady = offer(3, 54_000_000, 40_800_000, 10_000_000);

        assert_eq!(negotiation.submit(steady, &mut rng).unwrap().decision, Decision::Counter);
        assert_eq!(negotiation.round(), 2);
        assert!(negotiation.last_counter().is_some());
        // +5 in round two
        assert_eq!(negotiation.submit(steady, &mut rng).unwrap().decision, Decision::Counter);
        assert_eq!(negotiation.round(), 3);
        // 84.5 in round three: below accept and counters are exhausted
        let last = negotiation.submit(steady, &mut rng).unwrap();
        assert_eq!(last.decision, Decision::Decline);
        assert!(last.counter_offer.is_none());
        assert_eq!(negotiation.context().previous_offers.len(), 3);
        assert!(negotiation.state().is_terminal());
    }

    #[test]
    fn loyalty_bonus_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        for _ in 0..50 {
            let b = loyalty_bonus(9, 85, &mut rng);
            assert!((20..=25).contains(&b));
            assert!(loyalty_bonus(1, 10, &mut rng) <= 5);
        }
    }

    proptest! {
        #[test]
        fn round_three_is_never_a_counter(
            years in 1u8..=7,
            total in 1_000_000i64..120_000_000,
            g_pct in 0u8..=100,
            seed in any::<u64>(),
        ) {
            let guaranteed = total * i64::from(g_pct) / 100;
            let mut ctx = NegotiationContext::new(summary(), demands(Priority::Money));
            ctx.round = MAX_NEGOTIATION_ROUNDS;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let eval = evaluate_offer(&ctx, &offer(years, total, guaranteed, 0), &mut rng).unwrap();
            prop_assert_ne!(eval.decision, Decision::Counter);
        }

        #[test]
        fn counters_are_valid_offers(
            years in 1u8..=7,
            total in 1_000_000i64..120_000_000,
            g_pct in 0u8..=100,
            round in 1u8..=2,
            seed in any::<u64>(),
        ) {
            let guaranteed = total * i64::from(g_pct) / 100;
            let mut ctx = NegotiationContext::new(summary(), demands(Priority::Years));
            ctx.round = round;
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let counter = generate_counter_offer(&ctx, &offer(years, total, guaranteed, 0), &mut rng);
            prop_assert!((1..=7).contains(&counter.years));
            prop_assert!(counter.guaranteed_money <= counter.total_value);
            prop_assert!(counter.signing_bonus <= counter.guaranteed_money);
        }
    }
}
