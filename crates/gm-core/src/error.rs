use crate::Money;
use thiserror::Error;

/// A single broken rule in a contract offer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OfferViolation {
    #[error("contract must be between 1 and 7 years (got {0})")]
    YearsOutOfRange(u8),
    #[error("guaranteed money cannot exceed total value")]
    GuaranteedExceedsTotal,
    #[error("signing bonus cannot exceed total value")]
    BonusExceedsTotal,
    #[error("signing bonus cannot exceed guaranteed money")]
    BonusExceedsGuaranteed,
    #[error("total value must be at least $1,000,000 (got ${0})")]
    TotalBelowMinimum(Money),
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Offer breaks one or more contract rules; every violation is listed.
    #[error("invalid offer: {}", join_violations(.0))]
    InvalidOffer(Vec<OfferViolation>),
    #[error("unknown position: {0}")]
    UnknownPosition(String),
    #[error("duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: u32 },
    #[error("{kind} {id} references a missing {missing}")]
    DanglingReference {
        kind: &'static str,
        id: u32,
        missing: &'static str,
    },
    #[error("player {0} has more than one active contract")]
    MultipleActiveContracts(u32),
    #[error("team {0} has negative cap space")]
    NegativeCapSpace(u32),
    #[error("contract {0} has no annual breakdown")]
    EmptyBreakdown(u32),
    #[error("prospect {0} has already been drafted")]
    AlreadyDrafted(u32),
    #[error("drafted prospect {prospect} maps to {rookies} rookie players, expected exactly one")]
    RookieMismatch { prospect: u32, rookies: usize },
}

fn join_violations(violations: &[OfferViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
