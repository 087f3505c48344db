//! Server-side outcome draw for chance games.
//!
//! Wheels pick a segment with probability proportional to its weight and win
//! when that segment is marked winning. Scratch cards, jackpots and dice win
//! with the configured probability. Skill games (quiz, memory, puzzle) and
//! forms are never drawn; their outcome comes from the client.

use rand::Rng;
use serde::Serialize;

use crate::campaign::{ChanceConfig, GameConfig, WheelConfig};
use crate::services::funnel::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Draw {
    pub outcome: Outcome,
    /// Index of the wheel segment landed on. `None` for non-wheel games.
    pub segment: Option<usize>,
}

/// Draw an outcome, or `None` when the game is not a chance game.
pub fn draw<R: Rng>(game: &GameConfig, rng: &mut R) -> Option<Draw> {
    match game {
        GameConfig::Wheel(wheel) => spin(wheel, rng),
        GameConfig::Scratch(chance) | GameConfig::Jackpot(chance) | GameConfig::Dice(chance) => {
            Some(Draw { outcome: roll(chance, rng), segment: None })
        }
        GameConfig::Quiz(_) | GameConfig::Memory(_) | GameConfig::Puzzle(_) | GameConfig::Form => None,
    }
}

fn spin<R: Rng>(wheel: &WheelConfig, rng: &mut R) -> Option<Draw> {
    if wheel.segments.is_empty() {
        return None;
    }
    let total: f64 = wheel.segments.iter().map(|s| s.weight).sum();

    let index = if total > 0.0 {
        let mut target = rng.random_range(0.0..total);
        // Float rounding can leave `target` past the end; land on the last live segment.
        let mut picked = wheel.segments.iter().rposition(|s| s.weight > 0.0).unwrap_or(0);
        for (i, segment) in wheel.segments.iter().enumerate() {
            if target < segment.weight {
                picked = i;
                break;
            }
            target -= segment.weight;
        }
        picked
    } else {
        // All weights zero: every segment is equally likely.
        rng.random_range(0..wheel.segments.len())
    };

    let outcome = if wheel.segments[index].winning { Outcome::Win } else { Outcome::Lose };
    Some(Draw { outcome, segment: Some(index) })
}

fn roll<R: Rng>(chance: &ChanceConfig, rng: &mut R) -> Outcome {
    if rng.random_bool(chance.win_probability.clamp(0.0, 1.0)) { Outcome::Win } else { Outcome::Lose }
}

#[cfg(test)]
#[path = "outcome_test.rs"]
mod tests;
