//! Domain Services
//!
//! The pure guess evaluator for both puzzle kinds, plus leaderboard
//! ranking. No side effects; the session engine applies the resulting
//! transitions.

use std::collections::HashSet;

use crate::domain::puzzle::{
    Cell, ConnectionsGroup, ConnectionsPuzzle, Grid, LeaderboardEntry, CONNECTIONS_GROUP_SIZE,
};

/// Outcome of evaluating a grouping guess against the answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupingOutcome {
    /// The guess exactly matches an unsolved group.
    Match(ConnectionsGroup),
    /// The guess re-submits a group already in `solved_groups`.
    AlreadySolved(ConnectionsGroup),
    /// Exactly three of the four words belong to one unsolved group.
    NearMiss,
    NoMatch,
}

/// Uppercase, trim and sort, so comparison is case- and
/// order-insensitive.
pub fn normalize_words(words: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = words.iter().map(|w| w.trim().to_uppercase()).collect();
    normalized.sort();
    normalized
}

/// Evaluate a four-word grouping guess.
///
/// Solved groups are excluded from matching: a duplicate of an
/// already-solved group reports [`GroupingOutcome::AlreadySolved`]
/// rather than a match or a mistake.
pub fn evaluate_grouping_guess(
    guess: &[String],
    solved: &[ConnectionsGroup],
    puzzle: &ConnectionsPuzzle,
) -> GroupingOutcome {
    let normalized_guess = normalize_words(guess);

    for group in solved {
        if normalize_words(&group.words) == normalized_guess {
            return GroupingOutcome::AlreadySolved(group.clone());
        }
    }

    let solved_labels: HashSet<&str> = solved.iter().map(|g| g.label.as_str()).collect();
    let guess_set: HashSet<&String> = normalized_guess.iter().collect();

    let mut best_overlap = 0usize;
    for group in &puzzle.groups {
        if solved_labels.contains(group.label.as_str()) {
            continue;
        }
        let group_words = normalize_words(&group.words);
        if group_words == normalized_guess {
            return GroupingOutcome::Match(group.clone());
        }
        let overlap = group_words.iter().filter(|w| guess_set.contains(w)).count();
        best_overlap = best_overlap.max(overlap);
    }

    if best_overlap == CONNECTIONS_GROUP_SIZE - 1 {
        GroupingOutcome::NearMiss
    } else {
        GroupingOutcome::NoMatch
    }
}

/// Per-submission crossword check: which non-block cells are right and
/// which are wrong. Cumulative cementing is the session engine's job,
/// not the evaluator's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridCheck {
    pub correct_cells: Vec<Cell>,
    pub wrong_cells: Vec<Cell>,
}

impl GridCheck {
    pub fn all_correct(&self) -> bool {
        self.wrong_cells.is_empty()
    }
}

/// Compare a submitted grid against the answer grid,
/// case-insensitively. Missing rows/cells and empty strings count as
/// wrong; block cells are skipped.
pub fn evaluate_crossword_grid(submitted: &Grid, answer: &Grid) -> GridCheck {
    let mut check = GridCheck::default();

    for (r, answer_row) in answer.iter().enumerate() {
        for (c, answer_cell) in answer_row.iter().enumerate() {
            let Some(answer_val) = answer_cell else {
                continue; // block cell
            };
            let submitted_val = submitted
                .get(r)
                .and_then(|row| row.get(c))
                .and_then(|cell| cell.as_ref())
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_default();

            if submitted_val == answer_val.trim().to_uppercase() && !submitted_val.is_empty() {
                check.correct_cells.push(Cell::new(r, c));
            } else {
                check.wrong_cells.push(Cell::new(r, c));
            }
        }
    }

    check
}

/// A finished session joined with its player's display fields.
#[derive(Debug, Clone)]
pub struct FinishedSession {
    pub name: String,
    pub region: String,
    pub handle: String,
    pub total_time_ms: i64,
}

/// Order finished sessions by total time ascending and assign ranks
/// 1..N. Ties keep their input order (stable sort).
pub fn rank_leaderboard(mut finishers: Vec<FinishedSession>) -> Vec<LeaderboardEntry> {
    finishers.sort_by_key(|f| f.total_time_ms);
    finishers
        .into_iter()
        .enumerate()
        .map(|(i, f)| LeaderboardEntry {
            rank: (i + 1) as u32,
            name: f.name,
            region: f.region,
            handle: f.handle,
            total_time_ms: f.total_time_ms,
        })
        .collect()
}
