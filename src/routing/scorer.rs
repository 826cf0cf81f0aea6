//! Specificity scoring.
//!
//! Every candidate in a bucket has the same length as the request path, so
//! scoring is a single walk over both sequences:
//!
//! ```text
//! literal == segment  → +LITERAL_WEIGHT
//! literal != segment  → disqualified
//! wildcard            → +WILDCARD_WEIGHT
//! ```
//!
//! The highest total wins. Ties go to the earliest declared candidate.

use crate::routing::definition::{RouteDefinition, Segment};

pub const LITERAL_WEIGHT: u32 = 2;
pub const WILDCARD_WEIGHT: u32 = 1;

/// Picks the best candidate for a request path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathScorer {
    case_insensitive: bool,
}

/// The winning candidate and how it won.
#[derive(Debug, Clone, Copy)]
pub struct Scored<'a> {
    pub route: &'a RouteDefinition,
    pub score: u32,
    /// Other candidates that reached the same score and lost the tie-break.
    pub tied: usize,
    /// Candidates that survived disqualification.
    pub survivors: usize,
}

impl PathScorer {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    fn literal_matches(&self, literal: &str, segment: &str) -> bool {
        if self.case_insensitive {
            literal.eq_ignore_ascii_case(segment)
        } else {
            literal == segment
        }
    }

    /// Score one candidate, or `None` if a literal disagrees with the path.
    pub fn score(&self, candidate: &RouteDefinition, segments: &[&str]) -> Option<u32> {
        if candidate.path_length() != segments.len() {
            return None;
        }

        candidate
            .pattern()
            .iter()
            .zip(segments)
            .try_fold(0u32, |total, (pattern, segment)| match pattern {
                Segment::Literal(literal) if self.literal_matches(literal, segment) => {
                    Some(total + LITERAL_WEIGHT)
                }
                Segment::Literal(_) => None,
                Segment::Wildcard => Some(total + WILDCARD_WEIGHT),
            })
    }

    /// Select the winner of a bucket.
    ///
    /// Candidates are walked in bucket order and only a strictly higher score
    /// replaces the current best, which keeps the earliest declaration on a tie.
    pub fn select<'a>(
        &self,
        candidates: &'a [RouteDefinition],
        segments: &[&str],
    ) -> Option<Scored<'a>> {
        let mut best: Option<Scored<'a>> = None;
        let mut survivors = 0;

        for candidate in candidates {
            let Some(score) = self.score(candidate, segments) else {
                continue;
            };
            survivors += 1;

            best = match best {
                Some(current) if score < current.score => Some(current),
                Some(current) if score == current.score => {
                    let keep_current = current.route.ordinal() <= candidate.ordinal();
                    let winner = if keep_current { current.route } else { candidate };
                    Some(Scored {
                        route: winner,
                        tied: current.tied + 1,
                        ..current
                    })
                }
                _ => Some(Scored {
                    route: candidate,
                    score,
                    tied: 0,
                    survivors: 0,
                }),
            };
        }

        best.map(|scored| Scored {
            survivors,
            ..scored
        })
    }
}
