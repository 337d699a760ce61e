use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersonaError {
    #[error("invalid analysis input: {0}")]
    InvalidInput(String),
    #[error("no analysis result available")]
    NoResult,
}

/// Binary gender label as reported by the age/gender model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expression probabilities in the order the detector reported them.
///
/// Order is part of the contract: the dominant-expression tie-break picks
/// the first label among equal maxima, so this is a list, never a map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionScores(Vec<(String, f32)>);

impl ExpressionScores {
    pub fn new(scores: Vec<(String, f32)>) -> Self {
        Self(scores)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Score for `label`, if the detector reported it.
    pub fn get(&self, label: &str) -> Option<f32> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, s)| *s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.0.iter().map(|(l, s)| (l.as_str(), *s))
    }
}

impl<S: Into<String>> FromIterator<(S, f32)> for ExpressionScores {
    fn from_iter<T: IntoIterator<Item = (S, f32)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(l, s)| (l.into(), s)).collect())
    }
}

/// Normalized output of one successful face analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRecord {
    age: f32,
    gender: Gender,
    expressions: ExpressionScores,
}

impl AnalysisRecord {
    /// Build a record, rejecting non-finite or negative ages and empty
    /// expression lists.
    pub fn new(age: f32, gender: Gender, expressions: ExpressionScores) -> Result<Self, PersonaError> {
        if !age.is_finite() || age < 0.0 {
            return Err(PersonaError::InvalidInput(format!("age must be a non-negative number, got {age}")));
        }
        if expressions.is_empty() {
            return Err(PersonaError::InvalidInput("expression scores are empty".into()));
        }
        Ok(Self { age, gender, expressions })
    }

    /// Raw age estimate as produced by the model.
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Age rounded to the nearest whole year, as displayed.
    pub fn rounded_age(&self) -> u32 {
        self.age.round() as u32
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn expressions(&self) -> &ExpressionScores {
        &self.expressions
    }

    /// Dominant expression label. Records always carry at least one score.
    pub fn dominant_expression(&self) -> &str {
        crate::expression::dominant_expression(&self.expressions).unwrap_or_default()
    }
}

/// Result of asking the detection capability about one image.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Detected(AnalysisRecord),
    /// No face in the image. Not an error: the caller shows a notice.
    NotDetected,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores() -> ExpressionScores {
        [("happy", 0.6), ("neutral", 0.6), ("sad", 0.1)].into_iter().collect()
    }

    #[test]
    fn test_record_rounds_age() {
        let record = AnalysisRecord::new(27.4, Gender::Male, scores()).unwrap();
        assert_eq!(record.rounded_age(), 27);
        assert_eq!(record.age(), 27.4);
        let record = AnalysisRecord::new(27.5, Gender::Male, scores()).unwrap();
        assert_eq!(record.rounded_age(), 28);
    }

    #[test]
    fn test_record_rejects_empty_expressions() {
        let err = AnalysisRecord::new(30.0, Gender::Female, ExpressionScores::default()).unwrap_err();
        assert!(matches!(err, PersonaError::InvalidInput(_)));
    }

    #[test]
    fn test_record_rejects_bad_age() {
        assert!(AnalysisRecord::new(-1.0, Gender::Male, scores()).is_err());
        assert!(AnalysisRecord::new(f32::NAN, Gender::Male, scores()).is_err());
        assert!(AnalysisRecord::new(0.0, Gender::Male, scores()).is_ok());
    }

    #[test]
    fn test_scores_preserve_order() {
        let s = scores();
        let labels: Vec<&str> = s.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, ["happy", "neutral", "sad"]);
        assert_eq!(s.get("sad"), Some(0.1));
        assert_eq!(s.get("angry"), None);
    }

    #[test]
    fn test_scores_serialize_as_ordered_pairs() {
        let json = serde_json::to_string(&scores()).unwrap();
        assert_eq!(json, r#"[["happy",0.6],["neutral",0.6],["sad",0.1]]"#);
    }

    #[test]
    fn test_gender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Female).unwrap(), r#""female""#);
    }
}
