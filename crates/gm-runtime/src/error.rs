use gm_core::{Money, OfferId, PlayerId, ProspectId, TeamId, ValidationError};
use gm_econ::{CapError, NegotiationError};
use thiserror::Error;

/// Reasons the league store refuses a commit. A refused commit leaves the
/// league untouched.
#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("unknown team {0}")]
    UnknownTeam(TeamId),
    #[error("unknown prospect {0}")]
    UnknownProspect(ProspectId),
    #[error("player {0} is not an available free agent")]
    NotAvailable(PlayerId),
    #[error("player {0} already has an active contract")]
    AlreadyUnderContract(PlayerId),
    #[error("player {0} has no active contract")]
    NoActiveContract(PlayerId),
    #[error("offer {0} is not pending for this player and team")]
    NoPendingOffer(OfferId),
    #[error("pick {overall} of the {year} draft is not on the clock")]
    PickNotOnClock { year: u16, overall: u16 },
    #[error("pick {overall} belongs to team {owner}")]
    PickOwnedElsewhere { overall: u16, owner: TeamId },
    #[error("team {team} is not on the clock")]
    NotOnClock { team: TeamId },
    #[error("team {team} needs ${needed} of cap space but has ${available}")]
    CapExceeded {
        team: TeamId,
        needed: Money,
        available: Money,
    },
    #[error(transparent)]
    Cap(#[from] CapError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),
}
