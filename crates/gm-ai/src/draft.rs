//! Draft day decisions for AI teams.
//!
//! Teams only ever see scouted ratings. Each team blends best player
//! available with positional need through a per-team `bpa_weight`, then
//! usually, but not always, takes the top prospect on its list.

use gm_core::{
    DevelopmentTrait, DraftPick, DraftProspect, DraftSelection, LeagueStore, LeagueView, Position,
    ProspectId, TeamId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::needs::draft_needs;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DraftStrategy {
    /// 0.35..=0.65; higher leans toward best player available.
    pub bpa_weight: f64,
    pub position_needs: Vec<Position>,
    pub preferred_traits: Vec<DevelopmentTrait>,
}

pub fn team_draft_strategy<V, R>(view: &V, team: TeamId, rng: &mut R) -> DraftStrategy
where
    V: LeagueView + ?Sized,
    R: Rng + ?Sized,
{
    DraftStrategy {
        bpa_weight: 0.5 + (rng.gen::<f64>() - 0.5) * 0.3,
        position_needs: draft_needs(view, team),
        preferred_traits: vec![
            DevelopmentTrait::Quick,
            DevelopmentTrait::Elite,
            DevelopmentTrait::Star,
        ],
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProspectEvaluation {
    pub prospect: ProspectId,
    pub position: Position,
    pub scouted_rating: u8,
    pub score: f64,
    /// Within three points of the best available scouted rating.
    pub is_bpa: bool,
    pub is_need: bool,
}

/// Undrafted prospects in `year`, best scouted rating first.
pub fn available_prospects<V: LeagueView + ?Sized>(
    view: &V,
    year: u16,
    limit: usize,
) -> Vec<&DraftProspect> {
    let mut prospects = class_by_rating(view, year);
    prospects.retain(|p| !p.is_drafted());
    prospects.truncate(limit);
    prospects
}

fn class_by_rating<V: LeagueView + ?Sized>(view: &V, year: u16) -> Vec<&DraftProspect> {
    let mut prospects: Vec<&DraftProspect> = view
        .prospects()
        .iter()
        .filter(|p| p.draft_year == year)
        .collect();
    prospects.sort_by(|a, b| {
        b.scouted_rating
            .cmp(&a.scouted_rating)
            .then(a.id.cmp(&b.id))
    });
    prospects
}

/// Scores prospects for one team, highest score first.
pub fn evaluate_prospects(
    prospects: &[&DraftProspect],
    strategy: &DraftStrategy,
) -> Vec<ProspectEvaluation> {
    let best = prospects.iter().map(|p| p.scouted_rating).max().unwrap_or(0);
    let mut evaluations: Vec<ProspectEvaluation> = prospects
        .iter()
        .map(|p| {
            let is_bpa = u16::from(p.scouted_rating) + 3 >= u16::from(best);
            let is_need = strategy.position_needs.contains(&p.position);
            let mut score = f64::from(p.scouted_rating);
            if is_bpa {
                score += 10.0 * strategy.bpa_weight;
            }
            if is_need {
                score += 15.0 * (1.0 - strategy.bpa_weight);
            }
            if strategy.preferred_traits.contains(&p.development_trait) {
                score += 5.0;
            }
            let i = p.intangibles;
            if i.work_ethic >= 4 {
                score += 3.0;
            }
            if i.character >= 4 {
                score += 2.0;
            }
            if i.football_iq >= 4 {
                score += 3.0;
            }
            if i.injury_risk >= 4 {
                score -= 5.0;
            }
            ProspectEvaluation {
                prospect: p.id,
                position: p.position,
                scouted_rating: p.scouted_rating,
                score,
                is_bpa,
                is_need,
            }
        })
        .collect();
    evaluations.sort_by(|a, b| b.score.total_cmp(&a.score));
    evaluations
}

/// Takes the top prospect 70% of the time, the second 20%, the third 10%.
pub fn select_prospect<'a, R: Rng + ?Sized>(
    evaluations: &'a [ProspectEvaluation],
    rng: &mut R,
) -> Option<&'a ProspectEvaluation> {
    if evaluations.is_empty() {
        return None;
    }
    let roll = rng.gen::<f64>();
    let index = if roll < 0.7 {
        0
    } else if roll < 0.9 && evaluations.len() > 1 {
        1
    } else if evaluations.len() > 2 {
        2
    } else {
        0
    };
    evaluations.get(index)
}

/// Chooses a prospect for `team` from the top of the available pool.
pub fn make_ai_pick<V, R>(view: &V, team: TeamId, year: u16, rng: &mut R) -> Option<ProspectId>
where
    V: LeagueView + ?Sized,
    R: Rng + ?Sized,
{
    let strategy = team_draft_strategy(view, team, rng);
    let available = available_prospects(view, year, view.config().draft.prospect_pool);
    let evaluations = evaluate_prospects(&available, &strategy);
    let choice = select_prospect(&evaluations, rng)?;
    debug!(
        team = %team,
        prospect = %choice.prospect,
        score = choice.score,
        need = choice.is_need,
        "AI draft choice"
    );
    Some(choice.prospect)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardEntry {
    pub rank: u16,
    pub prospect: ProspectId,
    pub score: f64,
    pub is_need: bool,
}

/// A team's ranked board for the whole class, capped at the configured size.
pub fn build_draft_board<V, R>(view: &V, team: TeamId, year: u16, rng: &mut R) -> Vec<BoardEntry>
where
    V: LeagueView + ?Sized,
    R: Rng + ?Sized,
{
    let strategy = team_draft_strategy(view, team, rng);
    let class = class_by_rating(view, year);
    evaluate_prospects(&class, &strategy)
        .into_iter()
        .take(view.config().draft.board_size)
        .zip(1..)
        .map(|(e, rank)| BoardEntry {
            rank,
            prospect: e.prospect,
            score: e.score,
            is_need: e.is_need,
        })
        .collect()
}

/// Lowest unused pick of the draft.
pub fn next_pick<V: LeagueView + ?Sized>(view: &V, year: u16) -> Option<&DraftPick> {
    view.picks()
        .iter()
        .filter(|p| p.year == year && !p.is_used())
        .min_by_key(|p| p.overall)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DraftStop {
    /// The user's team holds the next pick.
    UserOnClock { overall: u16 },
    Complete,
    NoProspects,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRun {
    pub selections: Vec<DraftSelection>,
    pub stop: DraftStop,
}

/// Makes AI selections in order until the user's team is on the clock, the
/// draft ends or the class runs dry. Picks already used are never revisited,
/// so a second call resumes where the first stopped.
pub fn process_ai_picks<S, R>(store: &mut S, rng: &mut R) -> Result<DraftRun, S::Error>
where
    S: LeagueStore + ?Sized,
    R: Rng + ?Sized,
{
    let year = store.season();
    let user_team = store.config().user_team;
    let mut selections = Vec::new();

    let stop = loop {
        let Some(pick) = next_pick(store, year) else {
            break DraftStop::Complete;
        };
        let (overall, team) = (pick.overall, pick.current_team);
        if team == user_team {
            break DraftStop::UserOnClock { overall };
        }
        let Some(prospect) = make_ai_pick(store, team, year, rng) else {
            break DraftStop::NoProspects;
        };
        let selection = DraftSelection {
            year,
            overall,
            team,
            prospect,
        };
        store.commit_selection(selection)?;
        info!(overall, team = %team, prospect = %prospect, "AI selection");
        selections.push(selection);
    };

    info!(year, made = selections.len(), ?stop, "AI picks paused");
    Ok(DraftRun { selections, stop })
}
