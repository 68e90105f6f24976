#![deny(warnings)]

//! Core domain records and invariants for the Gridiron GM front office.
//!
//! This crate defines the serializable records shared by the valuation,
//! cap, negotiation, draft and AI engines, together with validation helpers
//! that guard the contract and roster invariants. Nothing here performs I/O:
//! engines reach league data through [`LeagueView`] and hand finalized
//! decisions back through [`LeagueStore`].

mod config;
mod contract;
mod draft;
mod error;
mod league;
mod player;

pub use config::{ConfigError, DraftConfig, FreeAgencyConfig, LeagueConfig, MinimumSalaryTable};
pub use contract::{
    offer_violations, validate_offer, BonusProration, Contract, ContractOffer, ContractStructure,
    ContractYear, FaOffer, OfferStatus, MAX_CONTRACT_YEARS, MAX_PRORATION_YEARS,
    MIN_CONTRACT_VALUE, MIN_CONTRACT_YEARS,
};
pub use draft::{
    CombineMetrics, DevelopmentTrait, DraftGrade, DraftPick, DraftProspect, DraftSlot,
    HiddenRating, Intangibles, Selection, DRAFT_ROUNDS, PICKS_PER_ROUND,
};
pub use error::{OfferViolation, ValidationError};
pub use league::{
    validate_league, Bid, DraftSelection, LeagueState, LeagueStore, LeagueView, PositionDepth,
    SeasonPhase, Signing, Team, Transaction, TransactionKind,
};
pub use player::{FreeAgent, FreeAgentKind, Player, PlayerDemands, Position, Priority, RosterStatus};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amounts in whole US dollars.
pub type Money = i64;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a rostered or free-agent player.
    PlayerId
);
id_type!(
    /// Identifier of a franchise.
    TeamId
);
id_type!(
    /// Identifier of an amateur draft prospect.
    ProspectId
);
id_type!(
    /// Identifier of a persisted contract.
    ContractId
);
id_type!(
    /// Identifier of a free-agent offer.
    OfferId
);

/// Round a fractional dollar amount half away from zero.
pub fn round_money(value: Decimal) -> Money {
    to_money(value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// Floor a fractional dollar amount. Proration always floors.
pub fn floor_money(value: Decimal) -> Money {
    to_money(value.floor())
}

fn to_money(whole: Decimal) -> Money {
    whole.to_i64().unwrap_or(if whole.is_sign_negative() {
        Money::MIN
    } else {
        Money::MAX
    })
}

/// Average per year of a contract, rounded to the dollar.
pub fn apy(total_value: Money, years: u8) -> Money {
    if years == 0 {
        return 0;
    }
    round_money(Decimal::from(total_value) / Decimal::from(years))
}

/// Seeded generator for reproducible runs; entropy-seeded when `seed` is `None`.
pub fn rng_from_seed(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_money(Decimal::new(25, 1)), 3);
        assert_eq!(round_money(Decimal::new(24, 1)), 2);
        assert_eq!(round_money(Decimal::new(-25, 1)), -3);
        assert_eq!(floor_money(Decimal::new(39, 1)), 3);
    }

    #[test]
    fn apy_rounds_and_guards_zero_years() {
        assert_eq!(apy(80_000_000, 4), 20_000_000);
        assert_eq!(apy(10_000_001, 2), 5_000_001);
        assert_eq!(apy(10_000_000, 0), 0);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = rng_from_seed(Some(7));
        let mut b = rng_from_seed(Some(7));
        let xs: Vec<u32> = (0..8).map(|_| a.gen()).collect();
        let ys: Vec<u32> = (0..8).map(|_| b.gen()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn ids_display_as_numbers() {
        assert_eq!(PlayerId(42).to_string(), "42");
        assert_eq!(TeamId(1).to_string(), "1");
    }
}
