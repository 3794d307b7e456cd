//! Turn scoring. Pure and deterministic: rarity-weighted letter points,
//! a bonus for long words, and a penalty for slow answers.

/// Points per letter beyond the bonus threshold.
const LENGTH_BONUS: i64 = 3;
const LENGTH_BONUS_THRESHOLD: usize = 5;

/// One point lost per full ten seconds spent answering.
const SLOW_PENALTY_SECS: f64 = 10.0;

/// Fraction of the turn time charged for a timed-out turn.
const TIMEOUT_PENALTY_RATE: f64 = 0.25;

/// Score an accepted word.
pub fn calculate_score(word: &str, duration: f64) -> f64 {
    let letters: i64 = word.chars().map(letter_points).sum();
    let len = word.chars().count();
    let bonus = LENGTH_BONUS * len.saturating_sub(LENGTH_BONUS_THRESHOLD) as i64;
    let penalty = (duration / SLOW_PENALTY_SECS).floor();

    (letters + bonus) as f64 - penalty
}

/// Score a timed-out turn (no word submitted).
pub fn timeout_score(duration: f64) -> f64 {
    -TIMEOUT_PENALTY_RATE * duration
}

/// English letter rarity, scrabble-style.
fn letter_points(c: char) -> i64 {
    match c.to_ascii_lowercase() {
        'a' | 'e' | 'i' | 'o' | 'u' | 'l' | 'n' | 's' | 't' | 'r' => 1,
        'd' | 'g' => 2,
        'b' | 'c' | 'm' | 'p' => 3,
        'f' | 'h' | 'v' | 'w' | 'y' => 4,
        'k' => 5,
        'j' | 'x' => 8,
        'q' | 'z' => 10,
        _ => 0,
    }
}
