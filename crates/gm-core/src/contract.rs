use crate::error::{OfferViolation, ValidationError};
use crate::{ContractId, Money, OfferId, PlayerId, TeamId};
use serde::{Deserialize, Serialize};

/// Shortest contract a team may offer, in seasons.
pub const MIN_CONTRACT_YEARS: u8 = 1;
/// Longest contract a team may offer, in seasons.
pub const MAX_CONTRACT_YEARS: u8 = 7;
/// Smallest total value a team may offer.
pub const MIN_CONTRACT_VALUE: Money = 1_000_000;
/// Signing bonuses never prorate over more than this many seasons.
pub const MAX_PRORATION_YEARS: u8 = 5;

/// How non-bonus money is spread across contract years.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStructure {
    /// Same base salary every season.
    #[default]
    Even,
    /// Largest salaries early, weighted 1.5 down to 0.6.
    Frontloaded,
    /// Smallest salaries early, weighted 0.6 up to 1.5.
    Backloaded,
}

/// Terms proposed by a team or countered by a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractOffer {
    /// Contract length in seasons, 1..=7.
    pub years: u8,
    /// Total value over all seasons, signing bonus included.
    pub total_value: Money,
    /// Money owed whatever happens; at most `total_value`.
    pub guaranteed_money: Money,
    /// Paid up front and prorated on the cap; at most `guaranteed_money`.
    pub signing_bonus: Money,
    /// How the non-bonus money is spread across seasons.
    pub structure: ContractStructure,
}

impl ContractOffer {
    /// Average per year of the offer.
    pub fn apy(&self) -> Money {
        crate::apy(self.total_value, self.years)
    }
}

/// Every rule the offer breaks, in a stable order.
pub fn offer_violations(offer: &ContractOffer) -> Vec<OfferViolation> {
    let mut violations = Vec::new();
    if !(MIN_CONTRACT_YEARS..=MAX_CONTRACT_YEARS).contains(&offer.years) {
        violations.push(OfferViolation::YearsOutOfRange(offer.years));
    }
    if offer.guaranteed_money > offer.total_value {
        violations.push(OfferViolation::GuaranteedExceedsTotal);
    }
    if offer.signing_bonus > offer.total_value {
        violations.push(OfferViolation::BonusExceedsTotal);
    }
    if offer.signing_bonus > offer.guaranteed_money {
        violations.push(OfferViolation::BonusExceedsGuaranteed);
    }
    if offer.total_value < MIN_CONTRACT_VALUE {
        violations.push(OfferViolation::TotalBelowMinimum(offer.total_value));
    }
    violations
}

/// Validate an offer, reporting every violation at once.
pub fn validate_offer(offer: &ContractOffer) -> Result<(), ValidationError> {
    let violations = offer_violations(offer);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidOffer(violations))
    }
}

/// One season slice of a contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractYear {
    /// League season this slice covers.
    pub year: u16,
    /// Base salary paid this season.
    pub base_salary: Money,
    /// Bonus for being on the roster at the start of the league year.
    pub roster_bonus: Money,
    /// Bonus for offseason workout attendance.
    pub workout_bonus: Money,
    /// Portion of this season's pay that is guaranteed.
    pub guarantees: Money,
}

impl ContractYear {
    /// Cash owed this season before any bonus proration.
    pub fn cash(&self) -> Money {
        self.base_salary + self.roster_bonus + self.workout_bonus
    }
}

/// Bonus money created by a restructure, spread over a run of seasons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusProration {
    /// First season charged.
    pub first_year: u16,
    /// Last season charged, inclusive.
    pub last_year: u16,
    /// Cap charge in each covered season.
    pub per_year: Money,
}

impl BonusProration {
    pub fn covers(&self, year: u16) -> bool {
        (self.first_year..=self.last_year).contains(&year)
    }
}

/// A signed contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract identifier.
    pub id: ContractId,
    /// Player under contract.
    pub player: PlayerId,
    /// Team holding the contract.
    pub team: TeamId,
    /// Length at signing, in seasons.
    pub total_years: u8,
    /// Season the contract is currently in.
    pub current_year: u16,
    /// Seasons left including the current one.
    pub years_remaining: u8,
    /// Total value at signing, signing bonus included.
    pub total_value: Money,
    /// Signing bonus paid at signing.
    pub signing_bonus_total: Money,
    /// Signing bonus not yet charged to the cap; zeroed when the deal expires.
    pub signing_bonus_remaining: Money,
    /// One entry per season, in season order.
    pub annual_breakdown: Vec<ContractYear>,
    /// Prorations added by restructures, stacked on the signing bonus.
    #[serde(default)]
    pub restructure_proration: Vec<BonusProration>,
    /// Guaranteed base salary still owed.
    pub guaranteed_money_remaining: Money,
    /// False once expired or released.
    pub is_active: bool,
}

impl Contract {
    pub fn year(&self, year: u16) -> Option<&ContractYear> {
        self.annual_breakdown.iter().find(|y| y.year == year)
    }

    pub fn year_mut(&mut self, year: u16) -> Option<&mut ContractYear> {
        self.annual_breakdown.iter_mut().find(|y| y.year == year)
    }

    /// Last season covered by the breakdown.
    pub fn final_year(&self) -> Option<u16> {
        self.annual_breakdown.iter().map(|y| y.year).max()
    }
}

/// Lifecycle of a free-agent offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferStatus {
    /// Open and awaiting the player's decision.
    Pending,
    /// Signed.
    Accepted,
    /// Closed because the player signed elsewhere or the market reset.
    Withdrawn,
    /// Turned down by the player.
    Rejected,
}

/// An offer on the free-agent market.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaOffer {
    /// Offer identifier.
    pub id: OfferId,
    /// Free agent the offer is made to.
    pub player: PlayerId,
    /// Bidding team.
    pub team: TeamId,
    /// Current terms.
    pub offer: ContractOffer,
    /// Where the offer stands.
    pub status: OfferStatus,
    /// Negotiation round the offer was last revised in.
    pub round: u8,
}
