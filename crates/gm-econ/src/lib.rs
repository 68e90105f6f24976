#![deny(warnings)]

//! Front-office economics: valuation, salary cap and negotiation.
//!
//! This crate provides:
//! - Free-agent contract demands from position, rating and age
//! - Cap hits, dead money, restructures and top-N team cap space
//! - Offer scoring and the accept / counter / decline negotiation machine
//!
//! All money is whole dollars. Fractional factors are carried as
//! [`rust_decimal::Decimal`] and rounded once per amount, so schedules never
//! accumulate floating-point drift across years.

pub mod cap;
pub mod negotiation;
pub mod valuation;

pub use cap::{
    advance_contract_year, apply_restructure, build_contract, calculate_cap_hit,
    calculate_dead_money, calculate_restructure, calculate_team_cap_space, offer_cap_hit,
    team_cap_space, CapError, CapHit, CutTiming, DeadMoney, Restructure, TeamCapSpace,
};
pub use negotiation::{
    evaluate_offer, generate_counter_offer, loyalty_bonus, Decision, DeclineReason, Negotiation,
    NegotiationContext, NegotiationError, NegotiationState, OfferEvaluation, PlayerSummary,
    MAX_NEGOTIATION_ROUNDS,
};
pub use valuation::{calculate_player_value, contract_structure, year_one_cap_hit};
