//! Salary cap accounting.

use gm_core::{
    floor_money, validate_offer, BonusProration, Contract, ContractId, ContractOffer,
    ContractYear, LeagueView, Money, PlayerId, TeamId, ValidationError, MAX_PRORATION_YEARS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::valuation::contract_structure;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CapError {
    #[error("contract {contract} has no data for year {year}")]
    YearNotFound { contract: ContractId, year: u16 },
    #[error("cannot restructure {requested}: at most {max} can be converted without dropping below the minimum salary")]
    RestructureExceedsLimit { requested: Money, max: Money },
    #[error("restructure amount must be positive, got {0}")]
    InvalidAmount(Money),
    #[error("contract {0} has no years remaining")]
    NoYearsRemaining(ContractId),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Cap charge of one contract in one league year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapHit {
    pub base_salary: Money,
    pub roster_bonus: Money,
    pub workout_bonus: Money,
    /// Signing bonus plus any restructure proration charged this year.
    pub prorated_bonus: Money,
    pub total_cap_hit: Money,
}

/// Designation of a release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutTiming {
    /// All remaining proration accelerates into the current year.
    #[default]
    PreJuneFirst,
    /// One year of proration now, the rest next year.
    PostJuneFirst,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadMoney {
    pub current_year_dead_money: Money,
    pub next_year_dead_money: Money,
    pub cap_savings: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restructure {
    pub new_cap_hit: Money,
    /// Cap hits of the following prorated years, in season order.
    pub future_cap_hits: Vec<(u16, Money)>,
    pub annual_proration: Money,
    pub prorate_years: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamCapSpace {
    pub total_cap: Money,
    pub used_cap: Money,
    pub available_cap: Money,
    pub counted_contracts: usize,
}

fn year_of(contract: &Contract, year: u16) -> Result<&ContractYear, CapError> {
    contract.year(year).ok_or(CapError::YearNotFound {
        contract: contract.id,
        year,
    })
}

/// Yearly signing bonus charge, spread over at most five years.
///
/// Applied to every covered year while the contract still reports bonus
/// remaining, so a deal longer than five years keeps charging it past the
/// point the bonus is fully amortized.
pub fn signing_bonus_proration(contract: &Contract) -> Money {
    if contract.signing_bonus_remaining <= 0 {
        return 0;
    }
    let divisor = contract.total_years.clamp(1, MAX_PRORATION_YEARS);
    contract.signing_bonus_total.div_euclid(i64::from(divisor))
}

fn restructure_proration_in(contract: &Contract, year: u16) -> Money {
    contract
        .restructure_proration
        .iter()
        .filter(|p| p.covers(year))
        .map(|p| p.per_year)
        .sum()
}

/// Restructure proration not yet charged, counting `from` onwards.
fn restructure_proration_from(contract: &Contract, from: u16) -> Money {
    contract
        .restructure_proration
        .iter()
        .filter(|p| p.last_year >= from)
        .map(|p| p.per_year * i64::from(p.last_year - p.first_year.max(from) + 1))
        .sum()
}

/// First-season cap hit of the contract [`build_contract`] would create from
/// `offer`, using the offer's real salary structure.
pub fn offer_cap_hit(offer: &ContractOffer) -> Money {
    let first_base = contract_structure(
        offer.total_value,
        offer.years,
        offer.signing_bonus,
        offer.structure,
    )
    .first()
    .copied()
    .unwrap_or(0);
    let proration = if offer.signing_bonus > 0 {
        offer
            .signing_bonus
            .div_euclid(i64::from(offer.years.clamp(1, MAX_PRORATION_YEARS)))
    } else {
        0
    };
    first_base + proration
}

pub fn calculate_cap_hit(contract: &Contract, year: u16) -> Result<CapHit, CapError> {
    let slice = year_of(contract, year)?;
    let prorated_bonus = signing_bonus_proration(contract) + restructure_proration_in(contract, year);
    Ok(CapHit {
        base_salary: slice.base_salary,
        roster_bonus: slice.roster_bonus,
        workout_bonus: slice.workout_bonus,
        prorated_bonus,
        total_cap_hit: slice.cash() + prorated_bonus,
    })
}

pub fn calculate_dead_money(
    contract: &Contract,
    current_year: u16,
    timing: CutTiming,
) -> Result<DeadMoney, CapError> {
    let slice = year_of(contract, current_year)?;
    let per_year = signing_bonus_proration(contract);
    let remaining_bonus = per_year * i64::from(contract.years_remaining)
        + restructure_proration_from(contract, current_year);
    let cap_savings = slice.cash() - slice.guarantees;

    let dead = match timing {
        CutTiming::PreJuneFirst => DeadMoney {
            current_year_dead_money: remaining_bonus + slice.guarantees,
            next_year_dead_money: 0,
            cap_savings,
        },
        CutTiming::PostJuneFirst => {
            let this_year = per_year + restructure_proration_in(contract, current_year);
            DeadMoney {
                current_year_dead_money: this_year + slice.guarantees,
                next_year_dead_money: remaining_bonus - this_year,
                cap_savings,
            }
        }
    };
    debug!(contract = %contract.id, ?timing, ?dead, "dead money");
    Ok(dead)
}

/// Converts part of this year's base salary into bonus prorated over up to
/// five of the remaining years.
pub fn calculate_restructure(
    contract: &Contract,
    current_year: u16,
    amount: Money,
    minimum_salary: Money,
) -> Result<Restructure, CapError> {
    let slice = year_of(contract, current_year)?;
    if amount <= 0 {
        return Err(CapError::InvalidAmount(amount));
    }
    let max = (slice.base_salary - minimum_salary).max(0);
    if amount > max {
        return Err(CapError::RestructureExceedsLimit {
            requested: amount,
            max,
        });
    }
    if contract.years_remaining == 0 {
        return Err(CapError::NoYearsRemaining(contract.id));
    }

    let prorate_years = contract.years_remaining.min(MAX_PRORATION_YEARS);
    let annual_proration = floor_money(Decimal::from(amount) / Decimal::from(prorate_years));
    let signing = signing_bonus_proration(contract);

    let new_cap_hit = slice.cash() - amount
        + signing
        + restructure_proration_in(contract, current_year)
        + annual_proration;

    let future_cap_hits = (1..u16::from(prorate_years))
        .filter_map(|offset| contract.year(current_year + offset))
        .map(|y| {
            let hit = y.cash() + signing + restructure_proration_in(contract, y.year) + annual_proration;
            (y.year, hit)
        })
        .collect();

    Ok(Restructure {
        new_cap_hit,
        future_cap_hits,
        annual_proration,
        prorate_years,
    })
}

/// Performs a restructure on the contract. Nothing is mutated unless the
/// calculation succeeds.
pub fn apply_restructure(
    contract: &mut Contract,
    current_year: u16,
    amount: Money,
    minimum_salary: Money,
) -> Result<Restructure, CapError> {
    let outcome = calculate_restructure(contract, current_year, amount, minimum_salary)?;
    let id = contract.id;
    let slice = contract
        .year_mut(current_year)
        .ok_or(CapError::YearNotFound {
            contract: id,
            year: current_year,
        })?;
    slice.base_salary -= amount;
    slice.guarantees = slice.guarantees.min(slice.base_salary);
    contract.restructure_proration.push(BonusProration {
        first_year: current_year,
        last_year: current_year + u16::from(outcome.prorate_years) - 1,
        per_year: outcome.annual_proration,
    });
    debug!(contract = %id, amount, ?outcome, "restructured");
    Ok(outcome)
}

/// Top-N rule: only the largest `cap_count` hits count against the cap.
pub fn calculate_team_cap_space<'a, I>(
    contracts: I,
    season: u16,
    total_cap: Money,
    cap_count: usize,
) -> Result<TeamCapSpace, CapError>
where
    I: IntoIterator<Item = &'a Contract>,
{
    let mut hits = contracts
        .into_iter()
        .filter(|c| c.is_active)
        .map(|c| calculate_cap_hit(c, season).map(|h| h.total_cap_hit))
        .collect::<Result<Vec<_>, _>>()?;
    hits.sort_unstable_by(|a, b| b.cmp(a));
    hits.truncate(cap_count);
    let used_cap: Money = hits.iter().sum();
    Ok(TeamCapSpace {
        total_cap,
        used_cap,
        available_cap: total_cap - used_cap,
        counted_contracts: hits.len(),
    })
}

pub fn team_cap_space<V: LeagueView + ?Sized>(
    view: &V,
    team: TeamId,
    season: u16,
) -> Result<TeamCapSpace, CapError> {
    let config = view.config();
    calculate_team_cap_space(
        view.active_contracts(team),
        season,
        config.salary_cap,
        config.cap_count(view.phase()),
    )
}

/// Turns accepted terms into a contract starting in `first_season`.
///
/// Guarantees beyond the signing bonus cover the earliest base salaries
/// first.
pub fn build_contract(
    id: ContractId,
    player: PlayerId,
    team: TeamId,
    offer: &ContractOffer,
    first_season: u16,
) -> Result<Contract, CapError> {
    validate_offer(offer)?;
    let salaries = contract_structure(
        offer.total_value,
        offer.years,
        offer.signing_bonus,
        offer.structure,
    );
    let mut guarantee_pool = offer.guaranteed_money - offer.signing_bonus;
    let annual_breakdown: Vec<ContractYear> = salaries
        .into_iter()
        .zip(first_season..)
        .map(|(base_salary, year)| {
            let guarantees = base_salary.min(guarantee_pool).max(0);
            guarantee_pool -= guarantees;
            ContractYear {
                year,
                base_salary,
                roster_bonus: 0,
                workout_bonus: 0,
                guarantees,
            }
        })
        .collect();
    let guaranteed_money_remaining = annual_breakdown.iter().map(|y| y.guarantees).sum();

    Ok(Contract {
        id,
        player,
        team,
        total_years: offer.years,
        current_year: first_season,
        years_remaining: offer.years,
        total_value: offer.total_value,
        signing_bonus_total: offer.signing_bonus,
        signing_bonus_remaining: offer.signing_bonus,
        annual_breakdown,
        restructure_proration: Vec::new(),
        guaranteed_money_remaining,
        is_active: true,
    })
}

/// Moves an active contract into its next season, deactivating it once the
/// final year has been played.
pub fn advance_contract_year(contract: &mut Contract) {
    if !contract.is_active {
        return;
    }
    let paid_guarantees = contract
        .year(contract.current_year)
        .map_or(0, |y| y.guarantees);
    contract.guaranteed_money_remaining = (contract.guaranteed_money_remaining - paid_guarantees).max(0);
    contract.years_remaining = contract.years_remaining.saturating_sub(1);
    if contract.years_remaining == 0 {
        contract.is_active = false;
        contract.signing_bonus_remaining = 0;
    } else {
        contract.current_year += 1;
    }
}
