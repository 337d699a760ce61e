//! Dominant-expression selection.

use crate::types::{ExpressionScores, PersonaError};

/// Return the label with the highest score.
///
/// Equal maxima resolve to the label reported first. NaN scores never win;
/// if every score is NaN the first label is returned.
pub fn dominant_expression(scores: &ExpressionScores) -> Result<&str, PersonaError> {
    let (first, _) = scores
        .iter()
        .next()
        .ok_or_else(|| PersonaError::InvalidInput("expression scores are empty".into()))?;

    let mut best_label = first;
    let mut best_score = f32::NEG_INFINITY;

    // Strict `>` keeps the earliest label on ties.
    for (label, score) in scores.iter() {
        if score > best_score {
            best_score = score;
            best_label = label;
        }
    }

    Ok(best_label)
}
