// Confidence normalization and labelling

use crate::model::{Confidence, Field, NOT_FOUND};
use tracing::warn;

/// Final confidence for one field.
///
/// Not-found values are N/A regardless of what the model reported. Otherwise
/// the model's number is rounded and clamped to 0-100; a missing number counts
/// as 0.
pub fn normalize_confidence(field: Field, value: &str, raw: Option<f64>) -> Confidence {
    if value == NOT_FOUND {
        return Confidence::NotApplicable;
    }

    match raw {
        Some(score) if score.is_finite() => {
            let rounded = score.round();
            if !(0.0..=100.0).contains(&rounded) {
                warn!(
                    "Confidence {} for {} is outside 0-100, clamping",
                    score,
                    field.key()
                );
            }
            Confidence::Score(rounded.clamp(0.0, 100.0) as u8)
        }
        _ => {
            warn!("No usable confidence for {}, using 0", field.key());
            Confidence::Score(0)
        }
    }
}

/// Rounded mean of the applicable scores, 0 when there are none.
pub fn overall_confidence(confidences: &[Confidence]) -> u8 {
    let scores: Vec<u32> = confidences
        .iter()
        .filter_map(|c| c.score())
        .map(u32::from)
        .collect();

    if scores.is_empty() {
        return 0;
    }

    let mean = scores.iter().sum::<u32>() as f64 / scores.len() as f64;
    mean.round() as u8
}

pub fn confidence_label(score: u8) -> &'static str {
    match score {
        90.. => "Very High",
        75.. => "High",
        60.. => "Medium",
        40.. => "Low",
        _ => "Very Low",
    }
}
