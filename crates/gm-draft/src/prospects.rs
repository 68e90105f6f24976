//! Draft class generation.

use std::f64::consts::PI;

use gm_core::{
    CombineMetrics, DevelopmentTrait, DraftGrade, DraftProspect, HiddenRating, Intangibles,
    Position, ProspectId,
};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

const MIN_RATING: u8 = 54;
const MAX_RATING: u8 = 99;
const RATING_MEAN: f64 = 72.0;
const RATING_STD_DEV: f64 = 8.0;

/// Prospects per position in a standard class.
pub const POSITION_DISTRIBUTION: [(Position, usize); 15] = [
    (Position::QB, 15),
    (Position::RB, 20),
    (Position::WR, 35),
    (Position::TE, 15),
    (Position::OT, 25),
    (Position::OG, 20),
    (Position::C, 12),
    (Position::EDGE, 30),
    (Position::DT, 25),
    (Position::LB, 25),
    (Position::CB, 30),
    (Position::S, 20),
    (Position::K, 3),
    (Position::P, 3),
    (Position::LS, 2),
];

const COLLEGES: &[&str] = &[
    "Alabama", "Georgia", "Ohio State", "Michigan", "LSU", "Clemson", "Oklahoma", "Texas", "USC",
    "Penn State", "Florida", "Notre Dame", "Oregon", "Miami", "Auburn", "Florida State",
    "Texas A&M", "Tennessee", "Wisconsin", "Iowa", "Michigan State", "Stanford", "Washington",
    "Ole Miss", "Mississippi State", "Arkansas", "Kentucky", "South Carolina", "UCLA",
    "California", "Arizona State", "Utah", "Colorado", "TCU", "Baylor", "Oklahoma State",
    "Kansas State", "North Carolina", "NC State", "Virginia Tech", "Pittsburgh",
    "West Virginia", "Boston College", "Syracuse", "Louisville", "Purdue", "Minnesota",
    "Nebraska", "Northwestern", "Indiana", "Illinois", "Rutgers", "Maryland", "Duke",
    "Wake Forest",
];

const FIRST_NAMES: &[&str] = &[
    "James", "Michael", "Robert", "John", "David", "William", "Richard", "Joseph", "Thomas",
    "Christopher", "Charles", "Daniel", "Matthew", "Anthony", "Mark", "Donald", "Steven",
    "Andrew", "Kenneth", "Joshua", "Kevin", "Brian", "George", "Timothy", "Ronald", "Edward",
    "Jason", "Jeffrey", "Ryan", "Jacob", "Gary", "Nicholas", "Eric", "Jonathan", "Stephen",
    "Larry", "Justin", "Scott", "Brandon", "Benjamin", "Samuel", "Raymond", "Gregory", "Frank",
    "Alexander", "Patrick", "Jack", "Dennis", "Jerry", "Tyler", "Aaron", "Jose", "Adam",
    "Nathan", "Douglas", "Zachary", "Peter", "Kyle", "Walter", "Ethan", "Jeremy", "Keith",
    "Christian", "Roger", "Noah", "Carl", "Terry", "Sean", "Austin", "Arthur", "Jesse",
    "Dylan", "Bryan", "Jordan", "Bruce", "Albert", "Gabriel", "Logan", "Alan", "Juan", "Wayne",
    "Elijah", "Randy", "Roy", "Vincent", "Russell", "Bobby", "Mason", "Philip", "Louis",
    "Isaiah", "Jamal", "Darius", "Marcus", "Tyrone", "DeAndre", "Malik", "Terrell", "Trevon",
    "Jalen", "Devin", "Cordell",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young", "Allen", "King", "Wright",
    "Scott", "Torres", "Nguyen", "Hill", "Flores", "Green", "Adams", "Nelson", "Baker", "Hall",
    "Rivera", "Campbell", "Mitchell", "Carter", "Roberts", "Gomez", "Phillips", "Evans",
    "Turner", "Diaz", "Parker", "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris",
    "Morales", "Murphy", "Cook", "Rogers", "Gutierrez", "Ortiz", "Morgan", "Cooper",
    "Peterson", "Bailey", "Reed", "Kelly", "Howard", "Ramos", "Kim", "Cox", "Ward",
    "Richardson", "Watson", "Brooks", "Chavez", "Wood", "James", "Bennett", "Gray", "Mendoza",
    "Ruiz", "Hughes", "Price", "Alvarez", "Castillo", "Sanders", "Patel", "Myers", "Long",
    "Ross", "Foster", "Jimenez", "Washington", "Jenkins",
];

/// Generates a shuffled class of `class_size` prospects with sequential ids
/// starting at `first_id`.
///
/// Every position first gets its share of [`POSITION_DISTRIBUTION`]; any
/// remaining spots go to random positions. A class smaller than the
/// distribution is truncated after shuffling.
pub fn generate_draft_class<R: Rng + ?Sized>(
    year: u16,
    class_size: usize,
    first_id: ProspectId,
    rng: &mut R,
) -> Vec<DraftProspect> {
    let mut positions: Vec<Position> = POSITION_DISTRIBUTION
        .iter()
        .flat_map(|&(position, count)| std::iter::repeat(position).take(count))
        .collect();
    while positions.len() < class_size {
        let (position, _) = POSITION_DISTRIBUTION[rng.gen_range(0..POSITION_DISTRIBUTION.len())];
        positions.push(position);
    }
    positions.shuffle(rng);
    positions.truncate(class_size);

    let class: Vec<DraftProspect> = positions
        .into_iter()
        .zip(first_id.0..)
        .map(|(position, id)| generate_prospect(ProspectId(id), position, year, rng))
        .collect();
    info!(year, prospects = class.len(), "generated draft class");
    class
}

fn pick<'a, R: Rng + ?Sized>(pool: &[&'a str], rng: &mut R) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

fn clamp_rating(value: f64) -> u8 {
    value
        .round()
        .clamp(f64::from(MIN_RATING), f64::from(MAX_RATING)) as u8
}

fn generate_prospect<R: Rng + ?Sized>(
    id: ProspectId,
    position: Position,
    year: u16,
    rng: &mut R,
) -> DraftProspect {
    let true_rating = generate_overall_rating(rng);
    let scouting_error = (rng.gen::<f64>() - 0.5) * 6.0;
    let scouted_rating = clamp_rating(f64::from(true_rating) + scouting_error);

    let mut prospect = DraftProspect::new(
        id,
        pick(FIRST_NAMES, rng).to_owned(),
        pick(LAST_NAMES, rng).to_owned(),
        position,
        pick(COLLEGES, rng).to_owned(),
        HiddenRating::new(true_rating),
        scouted_rating,
        year,
    );
    prospect.height_inches = generate_height(position, rng);
    prospect.weight = generate_weight(position, rng);
    prospect.age = rng.gen_range(20..=23);
    prospect.draft_grade = draft_grade(true_rating);
    prospect.projected_round = projected_round(true_rating);
    prospect.combine = generate_combine(position, true_rating, rng);
    prospect.intangibles = Intangibles {
        work_ethic: rng.gen_range(1..=5),
        injury_risk: rng.gen_range(1..=5),
        character: rng.gen_range(1..=5),
        football_iq: rng.gen_range(1..=5),
    };
    prospect.development_trait = development_trait(true_rating, rng);
    prospect.comparison = comparison(position, true_rating, rng);
    prospect
}

/// Normal(72, 8) via Box-Muller, clamped to the draftable range.
fn generate_overall_rating<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    // (0, 1] keeps the log finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    clamp_rating(RATING_MEAN + z * RATING_STD_DEV)
}

pub fn draft_grade(rating: u8) -> DraftGrade {
    match rating {
        85.. => DraftGrade::FirstRound,
        78..=84 => DraftGrade::SecondThirdRound,
        70..=77 => DraftGrade::FourthFifthRound,
        65..=69 => DraftGrade::SixthSeventhRound,
        _ => DraftGrade::Undrafted,
    }
}

pub fn projected_round(rating: u8) -> u8 {
    match rating {
        85.. => 1,
        80..=84 => 2,
        75..=79 => 3,
        70..=74 => 4,
        67..=69 => 5,
        64..=66 => 6,
        _ => 7,
    }
}

fn generate_height<R: Rng + ?Sized>(position: Position, rng: &mut R) -> u8 {
    use Position::*;
    let (min, max) = match position {
        QB | OG | DT | LS => (73, 77),
        RB => (68, 73),
        WR => (70, 77),
        TE => (74, 79),
        OT => (76, 80),
        C | LB => (72, 76),
        EDGE => (74, 78),
        CB => (69, 74),
        S | K => (70, 75),
        P => (72, 77),
    };
    rng.gen_range(min..=max)
}

fn generate_weight<R: Rng + ?Sized>(position: Position, rng: &mut R) -> u16 {
    use Position::*;
    let (min, max) = match position {
        QB => (210, 240),
        RB => (200, 230),
        WR => (180, 220),
        TE => (240, 270),
        OT => (300, 340),
        OG => (300, 330),
        C => (290, 320),
        EDGE => (245, 275),
        DT => (285, 330),
        LB => (230, 260),
        CB => (180, 205),
        S => (195, 220),
        K => (180, 210),
        P => (190, 220),
        LS => (240, 260),
    };
    rng.gen_range(min..=max)
}

/// Per-position baselines: forty time, bench reps, vertical.
fn combine_baseline(position: Position) -> (f64, f64, f64) {
    use Position::*;
    match position {
        QB => (4.85, 15.0, 30.0),
        RB => (4.55, 20.0, 35.0),
        WR => (4.50, 16.0, 36.0),
        TE => (4.70, 22.0, 32.0),
        OT => (5.30, 28.0, 26.0),
        OG => (5.25, 30.0, 27.0),
        C => (5.20, 28.0, 28.0),
        EDGE => (4.75, 24.0, 32.0),
        DT => (5.00, 26.0, 28.0),
        LB => (4.70, 22.0, 32.0),
        CB => (4.48, 14.0, 37.0),
        S => (4.55, 16.0, 35.0),
        K => (4.80, 10.0, 28.0),
        P => (4.85, 12.0, 30.0),
        LS => (5.10, 20.0, 26.0),
    }
}

fn round_to(value: f64, places: i32) -> f32 {
    let scale = 10f64.powi(places);
    ((value * scale).round() / scale) as f32
}

/// Better prospects test better: every rating point above 70 shifts each
/// drill slightly in the right direction.
fn generate_combine<R: Rng + ?Sized>(position: Position, rating: u8, rng: &mut R) -> CombineMetrics {
    let bonus = (f64::from(rating) - 70.0) * 0.015;
    let (forty, bench, vertical) = combine_baseline(position);
    let mut jitter = |spread: f64| (rng.gen::<f64>() - 0.5) * spread;

    CombineMetrics {
        forty_yard: round_to(forty - bonus * 0.1 + jitter(0.15), 2),
        bench_press: (bench + bonus * 2.0 + jitter(5.0)).round().clamp(0.0, 255.0) as u8,
        vertical_jump: round_to(vertical + bonus * 1.5 + jitter(4.0), 1),
        broad_jump: round_to(115.0 + jitter(15.0) + bonus * 3.0, 1),
        three_cone: round_to(7.2 - jitter(0.4) - bonus * 0.1, 2),
        shuttle: round_to(4.4 - jitter(0.3) - bonus * 0.08, 2),
    }
}

fn development_trait<R: Rng + ?Sized>(rating: u8, rng: &mut R) -> DevelopmentTrait {
    use DevelopmentTrait::*;
    match rating {
        90.. => {
            if rng.gen_bool(0.4) {
                Star
            } else {
                Elite
            }
        }
        85..=89 => {
            if rng.gen_bool(0.3) {
                Elite
            } else {
                Quick
            }
        }
        75..=84 => {
            if rng.gen_bool(0.5) {
                Quick
            } else {
                Normal
            }
        }
        70..=74 => Normal,
        _ => {
            if rng.gen_bool(0.3) {
                Normal
            } else {
                Slow
            }
        }
    }
}

fn comparison<R: Rng + ?Sized>(position: Position, rating: u8, rng: &mut R) -> Option<String> {
    if rating < 75 {
        return None;
    }
    let pool: &[&str] = match position {
        Position::QB => &["Patrick Mahomes", "Josh Allen", "Joe Burrow", "Lamar Jackson", "Jalen Hurts"],
        Position::RB => &["Christian McCaffrey", "Derrick Henry", "Nick Chubb", "Jonathan Taylor"],
        Position::WR => &["Justin Jefferson", "Tyreek Hill", "Stefon Diggs", "Davante Adams"],
        Position::TE => &["Travis Kelce", "George Kittle", "Mark Andrews", "TJ Hockenson"],
        Position::EDGE => &["Micah Parsons", "Nick Bosa", "TJ Watt", "Myles Garrett"],
        Position::CB => &["Jalen Ramsey", "Patrick Surtain", "Sauce Gardner", "Denzel Ward"],
        _ => &["Solid NFL Starter"],
    };
    let name = pick(pool, rng);
    Some(match rating {
        85.. => name.to_owned(),
        80..=84 => format!("Poor man's {name}"),
        _ => format!("{name}-lite"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    #[test]
    fn distribution_fills_a_standard_class() {
        let total: usize = POSITION_DISTRIBUTION.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 280);
    }

    #[test]
    fn class_has_requested_size_and_ids() {
        let mut rng = ChaCha8Rng::seed_from_u64(2025);
        let class = generate_draft_class(2025, 300, ProspectId(1000), &mut rng);
        assert_eq!(class.len(), 300);
        assert_eq!(class[0].id, ProspectId(1000));
        assert_eq!(class[299].id, ProspectId(1299));
        assert!(class.iter().all(|p| p.draft_year == 2025 && !p.is_drafted()));

        let mut per_position: HashMap<Position, usize> = HashMap::new();
        for p in &class {
            *per_position.entry(p.position).or_default() += 1;
        }
        for (position, count) in POSITION_DISTRIBUTION {
            assert!(per_position[&position] >= count, "{position}");
        }
    }

    #[test]
    fn ratings_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let class = generate_draft_class(2025, 280, ProspectId(1), &mut rng);
        for p in &class {
            assert!((MIN_RATING..=MAX_RATING).contains(&p.scouted_rating));
            assert!((1..=7).contains(&p.projected_round));
            assert!((20..=23).contains(&p.age));
            let i = p.intangibles;
            for grade in [i.work_ethic, i.injury_risk, i.character, i.football_iq] {
                assert!((1..=5).contains(&grade));
            }
        }
        let mean = class.iter().map(|p| f64::from(p.scouted_rating)).sum::<f64>() / 280.0;
        assert!((68.0..76.0).contains(&mean), "{mean}");
    }

    #[test]
    fn same_seed_same_class() {
        let a = generate_draft_class(2025, 50, ProspectId(1), &mut ChaCha8Rng::seed_from_u64(5));
        let b = generate_draft_class(2025, 50, ProspectId(1), &mut ChaCha8Rng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn grades_and_rounds_follow_rating() {
        assert_eq!(draft_grade(85), DraftGrade::FirstRound);
        assert_eq!(draft_grade(78), DraftGrade::SecondThirdRound);
        assert_eq!(draft_grade(64), DraftGrade::Undrafted);
        assert_eq!(projected_round(80), 2);
        assert_eq!(projected_round(66), 6);
        assert_eq!(projected_round(54), 7);
    }

    #[test]
    fn only_good_prospects_get_comparisons() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(comparison(Position::QB, 74, &mut rng).is_none());
        let lite = comparison(Position::OG, 76, &mut rng).unwrap();
        assert_eq!(lite, "Solid NFL Starter-lite");
        assert!(comparison(Position::WR, 82, &mut rng).unwrap().starts_with("Poor man's "));
    }
}
