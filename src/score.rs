//! Overall swing score.
//!
//! Rule table (all contributions are added to [`BASE_SCORE`], the sum is
//! clamped to 0..=100):
//!
//! | Rule        | Condition                                   | Points |
//! |-------------|---------------------------------------------|--------|
//! | Tempo       | ratio in `[2.5, 3.5]`                       | +10    |
//! |             | ratio in `[2.0, 4.0]`, outside the above    | +5     |
//! |             | ratio outside `[2.0, 4.0]`                  | -5     |
//! |             | ratio absent                                | 0      |
//! | Consistency | per tracked angle with range < 15°          | +2     |
//! |             | per tracked angle with range > 30°          | -2     |
//! |             | net sum, capped above                       | ≤ +15  |
//! | Stability   | hip total movement < 0.05                   | +5     |
//! |             | hip total movement > 0.15                   | -10    |
//! |             | otherwise or absent                         | 0      |

use crate::metrics::SequenceMetrics;

pub const BASE_SCORE: i32 = 70;

pub const IDEAL_TEMPO: (f64, f64) = (2.5, 3.5);
pub const ACCEPTABLE_TEMPO: (f64, f64) = (2.0, 4.0);
pub const TEMPO_IDEAL_BONUS: i32 = 10;
pub const TEMPO_ACCEPTABLE_BONUS: i32 = 5;
pub const TEMPO_PENALTY: i32 = -5;

/// Angle range (degrees) under which an angle counts as consistent.
pub const CONSISTENT_RANGE: f64 = 15.0;
/// Angle range (degrees) over which an angle counts as erratic.
pub const ERRATIC_RANGE: f64 = 30.0;
pub const CONSISTENCY_STEP: i32 = 2;
pub const CONSISTENCY_CAP: i32 = 15;

pub const STABLE_HIP_MOVEMENT: f64 = 0.05;
pub const UNSTABLE_HIP_MOVEMENT: f64 = 0.15;
pub const STABILITY_BONUS: i32 = 5;
pub const STABILITY_PENALTY: i32 = -10;

/// How the score was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScoreBreakdown {
    pub base: i32,
    pub tempo: i32,
    pub consistency: i32,
    pub stability: i32,
    /// Clamped sum.
    pub total: u8,
}

pub fn tempo_points(tempo_ratio: Option<f64>) -> i32 {
    let Some(t) = tempo_ratio else {
        return 0;
    };
    let within = |(lo, hi): (f64, f64)| (lo..=hi).contains(&t);
    if within(IDEAL_TEMPO) {
        TEMPO_IDEAL_BONUS
    } else if within(ACCEPTABLE_TEMPO) {
        TEMPO_ACCEPTABLE_BONUS
    } else {
        TEMPO_PENALTY
    }
}

pub fn consistency_points(metrics: &SequenceMetrics) -> i32 {
    let net: i32 = metrics
        .angles
        .values()
        .map(|s| {
            if s.range < CONSISTENT_RANGE {
                CONSISTENCY_STEP
            } else if s.range > ERRATIC_RANGE {
                -CONSISTENCY_STEP
            } else {
                0
            }
        })
        .sum();
    net.min(CONSISTENCY_CAP)
}

pub fn stability_points(metrics: &SequenceMetrics) -> i32 {
    match metrics.hip_stability {
        Some(h) if h.total_movement < STABLE_HIP_MOVEMENT => STABILITY_BONUS,
        Some(h) if h.total_movement > UNSTABLE_HIP_MOVEMENT => STABILITY_PENALTY,
        _ => 0,
    }
}

pub fn breakdown(metrics: &SequenceMetrics) -> ScoreBreakdown {
    let tempo = tempo_points(metrics.tempo_ratio);
    let consistency = consistency_points(metrics);
    let stability = stability_points(metrics);
    let total = (BASE_SCORE + tempo + consistency + stability).clamp(0, 100) as u8;
    ScoreBreakdown {
        base: BASE_SCORE,
        tempo,
        consistency,
        stability,
        total,
    }
}

/// Overall score in 0..=100.
pub fn score(metrics: &SequenceMetrics) -> u8 {
    breakdown(metrics).total
}
