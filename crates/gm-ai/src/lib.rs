#![deny(warnings)]

//! Decision making for computer-controlled front offices.
//!
//! The AI only reads the league through [`gm_core::LeagueView`] and only
//! changes it through [`gm_core::LeagueStore`] commits, so every sweep here
//! can be re-run without double-signing a free agent or double-spending a
//! pick.

pub mod draft;
pub mod free_agency;
pub mod needs;

pub use draft::{
    available_prospects, build_draft_board, evaluate_prospects, make_ai_pick, next_pick,
    process_ai_picks, select_prospect, team_draft_strategy, BoardEntry, DraftRun, DraftStop,
    DraftStrategy, ProspectEvaluation,
};
pub use free_agency::{
    demands_for, escalate_top_bid, generate_ai_offers, generate_team_offer, number_of_bidders,
    process_ai_signings, select_interested_teams, OfferRound, SigningSweep,
};
pub use needs::{draft_needs, free_agency_need, position_minimum};

#[cfg(test)]
pub(crate) mod testing;
