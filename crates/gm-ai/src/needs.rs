//! Roster needs by position.

use gm_core::{LeagueView, Position, TeamId};

/// Average rating assumed for an empty position group.
const EMPTY_GROUP_RATING: f64 = 60.0;
/// A group rated below this is a need even when fully staffed.
const NEED_RATING: f64 = 70.0;

/// Minimum active players a team wants at a position. Specialists have no
/// draft minimum.
pub fn position_minimum(position: Position) -> Option<u32> {
    use Position::*;
    match position {
        QB => Some(2),
        RB => Some(3),
        WR => Some(5),
        TE => Some(3),
        OT => Some(2),
        OG => Some(2),
        C => Some(1),
        EDGE => Some(3),
        DT => Some(3),
        LB => Some(4),
        CB => Some(4),
        S => Some(3),
        K | P | LS => None,
    }
}

/// Positions the team should target in the draft: short-handed or weak.
pub fn draft_needs<V: LeagueView + ?Sized>(view: &V, team: TeamId) -> Vec<Position> {
    Position::ALL
        .into_iter()
        .filter_map(|position| {
            let minimum = position_minimum(position)?;
            let depth = view.position_depth(team, position);
            let avg = depth.avg_rating.unwrap_or(EMPTY_GROUP_RATING);
            (depth.count < minimum || avg < NEED_RATING).then_some(position)
        })
        .collect()
}

/// How badly a team wants a free agent at `position`, from 0.3 to 0.9.
pub fn free_agency_need<V: LeagueView + ?Sized>(view: &V, team: TeamId, position: Position) -> f64 {
    let depth = view.position_depth(team, position);
    let minimum = position_minimum(position).unwrap_or(2);
    let avg = depth.avg_rating.unwrap_or(EMPTY_GROUP_RATING);
    if depth.count < minimum {
        0.9
    } else if avg < NEED_RATING {
        0.7
    } else if avg < 75.0 {
        0.5
    } else {
        0.3
    }
}
