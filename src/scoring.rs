use std::time::Duration;

/// Points awarded per character of slack below the cutoff.
pub const POINTS_PER_CHAR: u32 = 100;
/// Distance at which a round stops scoring.
pub const MAX_SCORED_DISTANCE: usize = 10;

/// Levenshtein distance between the trimmed input and the target text.
///
/// Operates on chars rather than bytes so a mistyped accented letter
/// counts as one edit.
pub fn distance(typed: &str, target: &str) -> usize {
    levenshtein(typed.trim(), target)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single row of the DP table, indexed by position in `b`.
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;

        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != cb);
            row[j + 1] = (diagonal + cost).min(above + 1).min(row[j] + 1);
            diagonal = above;
        }
    }

    row[b.len()]
}

/// `max(0, 10 - distance) * 100`
pub fn score_from_distance(distance: usize) -> u32 {
    MAX_SCORED_DISTANCE.saturating_sub(distance) as u32 * POINTS_PER_CHAR
}

/// Outcome of a single typed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub elapsed: Duration,
    pub distance: usize,
    pub score: u32,
}

impl RoundResult {
    pub fn new(elapsed: Duration, typed: &str, target: &str) -> Self {
        let distance = distance(typed, target);
        Self {
            elapsed,
            distance,
            score: score_from_distance(distance),
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.distance == 0
    }
}
