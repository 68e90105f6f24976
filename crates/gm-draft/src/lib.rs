#![deny(warnings)]

//! Draft tooling: the pick trade-value chart and draft class generation.

pub mod prospects;
pub mod trade_value;

pub use prospects::{generate_draft_class, POSITION_DISTRIBUTION};
pub use trade_value::{
    evaluate_trade, find_balancing_picks, format_pick, move_up_cost, overall_pick,
    pick_description, pick_value, picks_to_move_up, round_and_pick, suggest_counter_offer,
    total_pick_value, CounterSuggestion, TradeEvaluation, TradeWinner, DEFAULT_TRADE_TOLERANCE,
};
