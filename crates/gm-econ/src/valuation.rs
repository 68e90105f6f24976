//! Free-agent market valuation.

use gm_core::{
    round_money, ContractStructure, Money, Player, PlayerDemands, Position, Priority,
    MAX_CONTRACT_YEARS, MAX_PRORATION_YEARS,
};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::debug;

pub use gm_core::apy as calculate_apy;

/// Chance that a long-tenured incumbent cares most about staying put.
const HOMETOWN_CHANCE: f64 = 0.3;

/// Computes what a player asks for on the open market.
///
/// Only the hometown priority roll consumes randomness; everything else is a
/// pure function of the player record.
pub fn calculate_player_value<R: Rng + ?Sized>(player: &Player, rng: &mut R) -> PlayerDemands {
    let base = Decimal::from(rating_tier_salary(player.overall_rating))
        * position_multiplier(player.position);
    let apy = round_money(
        base * age_modifier(player.age, player.position)
            * performance_modifier(player)
            * market_modifier(player.position),
    );
    let years = contract_years(player.age, player.position);
    let guaranteed = round_money(
        Decimal::from(apy)
            * Decimal::from(years)
            * guaranteed_percentage(player.overall_rating, player.age),
    );
    let priority = determine_priority(player, rng);

    debug!(
        player = %player.id,
        position = %player.position,
        apy,
        years,
        guaranteed,
        ?priority,
        "valued player"
    );

    PlayerDemands {
        apy,
        years,
        guaranteed,
        priority,
    }
}

pub fn position_multiplier(position: Position) -> Decimal {
    use Position::*;
    match position {
        QB => Decimal::new(25, 1),
        EDGE => Decimal::new(18, 1),
        WR => Decimal::new(16, 1),
        CB | OT => Decimal::new(15, 1),
        DT => Decimal::new(13, 1),
        S | LB => Decimal::new(12, 1),
        OG | C | TE => Decimal::ONE,
        RB => Decimal::new(8, 1),
        K | P => Decimal::new(5, 1),
        LS => Decimal::new(4, 1),
    }
}

pub fn rating_tier_salary(rating: u8) -> Money {
    match rating {
        90.. => 25_000_000,
        85..=89 => 18_000_000,
        80..=84 => 12_000_000,
        75..=79 => 8_000_000,
        70..=74 => 5_000_000,
        65..=69 => 2_000_000,
        _ => 1_000_000,
    }
}

/// Inclusive age window in which a position is paid at full value.
pub fn peak_age_window(position: Position) -> (u8, u8) {
    use Position::*;
    match position {
        QB => (27, 33),
        RB => (23, 27),
        WR | S | EDGE | DT => (26, 30),
        TE => (26, 31),
        OT | OG | C => (27, 32),
        LB | CB => (25, 29),
        K | P | LS => (27, 35),
    }
}

/// Ramp up to the peak window, plateau inside it, decline after it.
pub fn age_modifier(age: u8, position: Position) -> Decimal {
    let (start, end) = peak_age_window(position);
    if age < start {
        Decimal::new(85, 2) + Decimal::from(i64::from(age) - 22) * Decimal::new(3, 2)
    } else if age <= end {
        Decimal::ONE
    } else {
        let decline = Decimal::new(8, 2) * Decimal::from(age - end);
        (Decimal::ONE - decline).max(Decimal::new(6, 1))
    }
}

fn performance_modifier(_player: &Player) -> Decimal {
    Decimal::ONE
}

/// Market adjustment per position. Flat until positional supply is modelled.
pub fn market_modifier(_position: Position) -> Decimal {
    Decimal::ONE
}

/// Quarterbacks under 30 get four years and running backs over 26 get two;
/// everyone else by age bracket.
#[allow(overlapping_range_endpoints)]
pub fn contract_years(age: u8, position: Position) -> u8 {
    match (position, age) {
        (Position::QB, ..=29) => 4,
        (Position::RB, 27..) => 2,
        (_, ..=25) => 4,
        (_, 26..=28) => 3,
        (_, 29..=31) => 2,
        _ => 1,
    }
}

/// Share of the total that the player wants guaranteed, in `[0.25, 0.75]`.
pub fn guaranteed_percentage(rating: u8, age: u8) -> Decimal {
    let mut pct = match rating {
        90.. => Decimal::new(70, 2),
        85..=89 => Decimal::new(60, 2),
        80..=84 => Decimal::new(50, 2),
        75..=79 => Decimal::new(45, 2),
        70..=74 => Decimal::new(40, 2),
        _ => Decimal::new(30, 2),
    };
    if age < 27 {
        pct += Decimal::new(5, 2);
    }
    if age > 30 {
        pct -= Decimal::new(10, 2);
    }
    if age > 32 {
        pct -= Decimal::new(15, 2);
    }
    pct.clamp(Decimal::new(25, 2), Decimal::new(75, 2))
}

pub fn determine_priority<R: Rng + ?Sized>(player: &Player, rng: &mut R) -> Priority {
    if player.age > 30 {
        Priority::Years
    } else if player.overall_rating >= 85 && (28..=31).contains(&player.age) {
        Priority::Winning
    } else if player.accrued_seasons >= 6
        && player.current_team.is_some()
        && rng.gen_bool(HOMETOWN_CHANCE)
    {
        Priority::Hometown
    } else {
        Priority::Money
    }
}

/// Cap charge of the first league year of a freshly structured deal, assuming
/// an even base salary split.
pub fn year_one_cap_hit(total_value: Money, years: u8, signing_bonus: Money) -> Money {
    if years == 0 {
        return 0;
    }
    let proration_years = years.min(MAX_PRORATION_YEARS);
    round_money(
        Decimal::from(signing_bonus) / Decimal::from(proration_years)
            + Decimal::from(total_value - signing_bonus) / Decimal::from(years),
    )
}

fn structure_weights(structure: ContractStructure, years: usize) -> Vec<Decimal> {
    const FRONT: [i64; MAX_CONTRACT_YEARS as usize] = [15, 13, 11, 9, 8, 7, 6];
    const BACK: [i64; MAX_CONTRACT_YEARS as usize] = [6, 7, 8, 9, 11, 13, 15];
    let tenths = |table: &[i64]| -> Vec<Decimal> {
        table[..years].iter().map(|w| Decimal::new(*w, 1)).collect()
    };
    match structure {
        ContractStructure::Even => vec![Decimal::ONE; years],
        ContractStructure::Frontloaded => tenths(&FRONT),
        ContractStructure::Backloaded => tenths(&BACK),
    }
}

/// Splits the non-bonus money of a deal into yearly base salaries.
///
/// Each year is rounded to the dollar and the last year absorbs the rounding
/// remainder, so the schedule always sums to `total_value - signing_bonus`.
pub fn contract_structure(
    total_value: Money,
    years: u8,
    signing_bonus: Money,
    structure: ContractStructure,
) -> Vec<Money> {
    let years = usize::from(years.clamp(1, MAX_CONTRACT_YEARS));
    let salary_pool = total_value - signing_bonus;
    let weights = structure_weights(structure, years);
    let weight_sum: Decimal = weights.iter().sum();

    let mut salaries: Vec<Money> = weights
        .iter()
        .map(|w| round_money(Decimal::from(salary_pool) * *w / weight_sum))
        .collect();
    let assigned: Money = salaries.iter().take(years - 1).sum();
    if let Some(last) = salaries.last_mut() {
        *last = salary_pool - assigned;
    }
    salaries
}
