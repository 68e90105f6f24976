//! Draft pick trade values.
//!
//! Picks are identified by their overall number. Values follow the classic
//! points chart with the late rounds flattened for the modern game.

use gm_core::PICKS_PER_ROUND;
use serde::{Deserialize, Serialize};

/// Relative difference at which a trade still counts as fair.
pub const DEFAULT_TRADE_TOLERANCE: f64 = 0.15;

#[rustfmt::skip]
const PICK_VALUES: [f64; 263] = [
    // round 1
    3000.0, 2600.0, 2200.0, 1800.0, 1700.0, 1600.0, 1500.0, 1400.0, 1350.0, 1300.0,
    1250.0, 1200.0, 1150.0, 1100.0, 1050.0, 1000.0, 950.0, 900.0, 875.0, 850.0,
    800.0, 780.0, 760.0, 740.0, 720.0, 700.0, 680.0, 660.0, 640.0, 620.0,
    600.0, 590.0,
    // round 2
    580.0, 560.0, 550.0, 540.0, 530.0, 520.0, 510.0, 500.0, 490.0, 480.0,
    470.0, 460.0, 450.0, 440.0, 430.0, 420.0, 410.0, 400.0, 390.0, 380.0,
    370.0, 360.0, 350.0, 340.0, 330.0, 320.0, 310.0, 300.0, 292.0, 284.0,
    276.0, 270.0,
    // round 3
    265.0, 260.0, 255.0, 250.0, 245.0, 240.0, 235.0, 230.0, 225.0, 220.0,
    215.0, 210.0, 205.0, 200.0, 195.0, 190.0, 185.0, 180.0, 175.0, 170.0,
    165.0, 160.0, 155.0, 150.0, 145.0, 140.0, 136.0, 132.0, 128.0, 124.0,
    120.0, 116.0,
    // round 4
    112.0, 108.0, 104.0, 100.0, 96.0, 92.0, 88.0, 86.0, 84.0, 82.0,
    80.0, 78.0, 76.0, 74.0, 72.0, 70.0, 68.0, 66.0, 64.0, 62.0,
    60.0, 58.0, 56.0, 54.0, 52.0, 50.0, 49.0, 48.0, 47.0, 46.0,
    45.0, 44.0, 43.0, 42.0, 41.0, 40.0,
    // round 5
    39.0, 38.0, 37.0, 36.0, 35.0, 34.0, 33.0, 32.0, 31.0, 30.0,
    29.5, 29.0, 28.5, 28.0, 27.5, 27.0, 26.6, 26.2, 25.8, 25.4,
    25.0, 24.6, 24.2, 23.8, 23.4, 23.0, 22.6, 22.2, 21.8, 21.4,
    21.0, 20.8, 20.6, 20.4, 20.2, 20.0, 19.8, 19.6, 19.4, 19.2,
    19.0, 18.8, 18.6, 18.4,
    // round 6
    18.2, 18.0, 17.8, 17.6, 17.4, 17.2, 17.0, 16.8, 16.6, 16.4,
    16.2, 16.0, 15.8, 15.6, 15.4, 15.2, 15.0, 14.8, 14.6, 14.4,
    14.2, 14.0, 13.8, 13.6, 13.4, 13.2, 13.0, 12.8, 12.6, 12.4,
    12.2, 12.0, 11.8, 11.6, 11.4, 11.2, 11.0, 10.8, 10.6, 10.4,
    10.2, 10.0, 9.8, 9.6,
    // round 7
    9.4, 9.2, 9.0, 8.8, 8.6, 8.4, 8.2, 8.0, 7.8, 7.6,
    7.4, 7.2, 7.0, 6.8, 6.6, 6.4, 6.2, 6.0, 5.8, 5.6,
    5.4, 5.2, 5.0, 4.8, 4.6, 4.4, 4.2, 4.0, 3.8, 3.6,
    3.4, 3.2, 3.0, 2.8, 2.6, 2.4, 2.2, 2.0, 1.8, 1.6,
    1.4, 1.2, 1.0,
];

/// Chart value of a pick, zero outside the chart.
pub fn pick_value(overall: u16) -> f64 {
    usize::from(overall)
        .checked_sub(1)
        .and_then(|i| PICK_VALUES.get(i))
        .copied()
        .unwrap_or(0.0)
}

pub fn total_pick_value(picks: &[u16]) -> f64 {
    picks.iter().map(|&p| pick_value(p)).sum()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeWinner {
    Team1,
    Team2,
    Even,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeEvaluation {
    pub is_fair: bool,
    pub team1_value: f64,
    pub team2_value: f64,
    /// `team1_value - team2_value`.
    pub differential: f64,
    /// Differential relative to the larger side.
    pub percentage_diff: f64,
    pub winner: TradeWinner,
}

/// Compares what each side sends. `team1` receives the value of its own list.
pub fn evaluate_trade(team1_picks: &[u16], team2_picks: &[u16], tolerance: f64) -> TradeEvaluation {
    let team1_value = total_pick_value(team1_picks);
    let team2_value = total_pick_value(team2_picks);
    let differential = team1_value - team2_value;
    let higher = team1_value.max(team2_value);
    let percentage_diff = if higher > 0.0 {
        differential.abs() / higher
    } else {
        0.0
    };
    let winner = if differential > 0.0 {
        TradeWinner::Team1
    } else if differential < 0.0 {
        TradeWinner::Team2
    } else {
        TradeWinner::Even
    };
    TradeEvaluation {
        is_fair: percentage_diff <= tolerance,
        team1_value,
        team2_value,
        differential,
        percentage_diff,
        winner,
    }
}

/// Picks team 2 would add, most valuable first, to cover its deficit.
pub fn find_balancing_picks(team1_picks: &[u16], team2_picks: &[u16], available: &[u16]) -> Vec<u16> {
    let mut deficit = total_pick_value(team1_picks) - total_pick_value(team2_picks);
    if deficit <= 0.0 {
        return Vec::new();
    }
    let mut candidates: Vec<u16> = available
        .iter()
        .copied()
        .filter(|p| !team2_picks.contains(p))
        .collect();
    candidates.sort_by(|a, b| pick_value(*b).total_cmp(&pick_value(*a)));

    let mut picks = Vec::new();
    for pick in candidates {
        if deficit <= 0.0 {
            break;
        }
        deficit -= pick_value(pick);
        picks.push(pick);
    }
    picks
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CounterSuggestion {
    pub add_to_team1: Vec<u16>,
    pub add_to_team2: Vec<u16>,
    /// Differential once the suggested picks are included.
    pub resulting_differential: f64,
}

/// Suggests picks the short side should add. `None` when the trade is
/// already fair at the default tolerance.
pub fn suggest_counter_offer(
    team1_picks: &[u16],
    team2_picks: &[u16],
    all_team1_picks: &[u16],
    all_team2_picks: &[u16],
) -> Option<CounterSuggestion> {
    let evaluation = evaluate_trade(team1_picks, team2_picks, DEFAULT_TRADE_TOLERANCE);
    if evaluation.is_fair {
        return None;
    }
    let suggestion = if evaluation.winner == TradeWinner::Team1 {
        let available: Vec<u16> = all_team2_picks
            .iter()
            .copied()
            .filter(|p| !team2_picks.contains(p))
            .collect();
        let add = find_balancing_picks(team1_picks, team2_picks, &available);
        CounterSuggestion {
            resulting_differential: evaluation.differential - total_pick_value(&add),
            add_to_team1: Vec::new(),
            add_to_team2: add,
        }
    } else {
        let available: Vec<u16> = all_team1_picks
            .iter()
            .copied()
            .filter(|p| !team1_picks.contains(p))
            .collect();
        let add = find_balancing_picks(team2_picks, team1_picks, &available);
        CounterSuggestion {
            resulting_differential: evaluation.differential + total_pick_value(&add),
            add_to_team1: add,
            add_to_team2: Vec::new(),
        }
    };
    Some(suggestion)
}

/// `(round, pick)` for an overall pick number.
pub fn round_and_pick(overall: u16) -> (u8, u8) {
    if overall == 0 {
        return (0, 0);
    }
    let per_round = u16::from(PICKS_PER_ROUND);
    let round = u8::try_from(overall.div_ceil(per_round)).unwrap_or(u8::MAX);
    let pick = u8::try_from((overall - 1) % per_round + 1).unwrap_or(PICKS_PER_ROUND);
    (round, pick)
}

pub fn overall_pick(round: u8, pick: u8) -> u16 {
    u16::from(round.saturating_sub(1)) * u16::from(PICKS_PER_ROUND) + u16::from(pick)
}

/// Short form such as `1.05`.
pub fn format_pick(overall: u16) -> String {
    let (round, pick) = round_and_pick(overall);
    format!("{round}.{pick:02}")
}

fn ordinal_suffix(n: u16) -> &'static str {
    match (n % 10, n % 100) {
        (1, r) if r != 11 => "st",
        (2, r) if r != 12 => "nd",
        (3, r) if r != 13 => "rd",
        _ => "th",
    }
}

pub fn pick_description(overall: u16) -> String {
    let (round, pick) = round_and_pick(overall);
    format!(
        "Round {round}, Pick {pick} ({overall}{} overall)",
        ordinal_suffix(overall)
    )
}

/// Extra chart value needed to move from `from` up to `to`.
pub fn move_up_cost(from: u16, to: u16) -> f64 {
    if from <= to {
        return 0.0;
    }
    pick_value(to) - pick_value(from)
}

/// Picks to package with `from` to reach `to`, adding the cheapest picks
/// first. Empty when no move is needed or the available picks fall short.
pub fn picks_to_move_up(from: u16, to: u16, available: &[u16]) -> Vec<u16> {
    if move_up_cost(from, to) <= 0.0 {
        return Vec::new();
    }
    let target = pick_value(to);
    let mut value = pick_value(from);
    let mut package = vec![from];

    let mut candidates: Vec<u16> = available.iter().copied().filter(|&p| p != from).collect();
    candidates.sort_by(|a, b| pick_value(*a).total_cmp(&pick_value(*b)));
    for pick in candidates {
        if value >= target {
            break;
        }
        package.push(pick);
        value += pick_value(pick);
    }

    if value >= target {
        package
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn chart_endpoints() {
        assert_eq!(pick_value(1), 3000.0);
        assert_eq!(pick_value(32), 590.0);
        assert_eq!(pick_value(33), 580.0);
        assert_eq!(pick_value(143), 29.5);
        assert_eq!(pick_value(263), 1.0);
        assert_eq!(pick_value(0), 0.0);
        assert_eq!(pick_value(264), 0.0);
    }

    #[test]
    fn chart_never_increases() {
        assert!(PICK_VALUES.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn fair_trade_within_tolerance() {
        // 1700 vs 1000 + 700
        let eval = evaluate_trade(&[5], &[16, 26], DEFAULT_TRADE_TOLERANCE);
        assert!(eval.is_fair);
        assert_eq!(eval.winner, TradeWinner::Even);

        let eval = evaluate_trade(&[1], &[10], DEFAULT_TRADE_TOLERANCE);
        assert!(!eval.is_fair);
        assert_eq!(eval.winner, TradeWinner::Team1);
        assert!((eval.percentage_diff - 1700.0 / 3000.0).abs() < 1e-12);
    }

    #[test]
    fn empty_trade_is_even() {
        let eval = evaluate_trade(&[], &[], DEFAULT_TRADE_TOLERANCE);
        assert!(eval.is_fair);
        assert_eq!(eval.percentage_diff, 0.0);
    }

    #[test]
    fn balancing_takes_best_picks_first() {
        let picks = find_balancing_picks(&[1], &[10], &[10, 200, 40, 70]);
        // deficit 1700: 500 (40) + 240 (70) + 13.6 (200) still short
        assert_eq!(picks, vec![40, 70, 200]);
        assert!(find_balancing_picks(&[10], &[1], &[40]).is_empty());
    }

    #[test]
    fn counter_offer_targets_short_side() {
        let suggestion = suggest_counter_offer(&[1], &[10], &[1, 33], &[10, 42, 45]).unwrap();
        assert!(suggestion.add_to_team1.is_empty());
        assert_eq!(suggestion.add_to_team2, vec![42, 45]);
        assert!((suggestion.resulting_differential - (1700.0 - 480.0 - 450.0)).abs() < 1e-9);

        let suggestion = suggest_counter_offer(&[10], &[1], &[10, 42], &[1]).unwrap();
        assert_eq!(suggestion.add_to_team1, vec![42]);
        assert!(suggest_counter_offer(&[5], &[16, 26], &[], &[]).is_none());
    }

    #[test]
    fn pick_formatting() {
        assert_eq!(round_and_pick(1), (1, 1));
        assert_eq!(round_and_pick(32), (1, 32));
        assert_eq!(round_and_pick(33), (2, 1));
        assert_eq!(format_pick(5), "1.05");
        assert_eq!(format_pick(47), "2.15");
        assert_eq!(pick_description(15), "Round 1, Pick 15 (15th overall)");
        assert_eq!(pick_description(33), "Round 2, Pick 1 (33rd overall)");
        assert_eq!(pick_description(111), "Round 4, Pick 15 (111th overall)");
        assert_eq!(pick_description(101), "Round 4, Pick 5 (101st overall)");
    }

    #[test]
    fn moving_up_uses_cheapest_picks() {
        assert_eq!(move_up_cost(10, 20), 0.0);
        assert_eq!(move_up_cost(20, 10), 450.0);
        // need 450 on top of pick 20: 100 (100) + 240 (70) + 500 (40)
        assert_eq!(picks_to_move_up(20, 10, &[40, 70, 100]), vec![20, 100, 70, 40]);
        assert!(picks_to_move_up(20, 10, &[200]).is_empty());
        assert!(picks_to_move_up(10, 20, &[40]).is_empty());
    }

    proptest! {
        #[test]
        fn round_trip(p in 1u16..=256) {
            let (round, pick) = round_and_pick(p);
            prop_assert_eq!(overall_pick(round, pick), p);
        }

        #[test]
        fn trade_evaluation_is_antisymmetric(
            a in proptest::collection::vec(1u16..=263, 0..5),
            b in proptest::collection::vec(1u16..=263, 0..5),
        ) {
            let forward = evaluate_trade(&a, &b, DEFAULT_TRADE_TOLERANCE);
            let back = evaluate_trade(&b, &a, DEFAULT_TRADE_TOLERANCE);
            let mirrored = match forward.winner {
                TradeWinner::Team1 => TradeWinner::Team2,
                TradeWinner::Team2 => TradeWinner::Team1,
                TradeWinner::Even => TradeWinner::Even,
            };
            prop_assert_eq!(back.winner, mirrored);
            prop_assert_eq!(forward.is_fair, back.is_fair);
        }
    }
}
