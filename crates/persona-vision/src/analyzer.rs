//! ONNX-backed [`FaceAnalyzer`]: SCRFD detection, then age/gender and
//! expression heads on the most confident face.

use crate::attributes::{AgeGender, AttributeError, EmotionModel, GenderAgeModel};
use crate::detector::{DetectorError, DetectorOptions, DetectorVariant, FaceDetector};
use image::RgbImage;
use persona_core::{AnalysisRecord, DetectionOutcome, ExpressionScores, FaceAnalyzer, PersonaError};
use std::path::{Path, PathBuf};
use thiserror::Error;

const GENDERAGE_MODEL_FILE: &str = "genderage.onnx";
const EMOTION_MODEL_FILE: &str = "emotion-ferplus-8.onnx";

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("detector: {0}")]
    Detector(#[from] DetectorError),
    #[error("attributes: {0}")]
    Attributes(#[from] AttributeError),
    #[error("model output rejected: {0}")]
    Record(#[from] PersonaError),
}

/// Locations of the three ONNX models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub genderage: PathBuf,
    pub emotion: PathBuf,
}

impl ModelPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: &Path, variant: DetectorVariant) -> Self {
        Self {
            detector: dir.join(variant.model_file()),
            genderage: dir.join(GENDERAGE_MODEL_FILE),
            emotion: dir.join(EMOTION_MODEL_FILE),
        }
    }
}

/// `$XDG_DATA_HOME/persona/models`, falling back to `~/.local/share`.
pub fn default_model_dir() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local/share")
        })
        .join("persona")
        .join("models")
}

pub struct OnnxFaceAnalyzer {
    detector: FaceDetector,
    genderage: GenderAgeModel,
    emotion: EmotionModel,
}

impl OnnxFaceAnalyzer {
    /// Load all three models. Blocks for the duration of session creation.
    pub fn load(paths: &ModelPaths, options: DetectorOptions) -> Result<Self, AnalyzerError> {
        Ok(Self {
            detector: FaceDetector::load(&paths.detector, options)?,
            genderage: GenderAgeModel::load(&paths.genderage)?,
            emotion: EmotionModel::load(&paths.emotion)?,
        })
    }
}

impl FaceAnalyzer for OnnxFaceAnalyzer {
    type Error = AnalyzerError;

    fn analyze(&mut self, image: &RgbImage) -> Result<DetectionOutcome, AnalyzerError> {
        let Some(face) = self.detector.detect_primary(image)? else {
            return Ok(DetectionOutcome::NotDetected);
        };
        tracing::debug!(
            x = face.x,
            y = face.y,
            width = face.width,
            height = face.height,
            confidence = face.confidence,
            "primary face"
        );

        let age_gender = self.genderage.predict(image, &face)?;
        let expressions = self.emotion.predict(image, &face)?;
        tracing::debug!(
            age = age_gender.age,
            gender = %age_gender.gender,
            gender_confidence = age_gender.confidence,
            ?expressions,
            "face attributes"
        );

        Ok(DetectionOutcome::Detected(build_record(age_gender, expressions)?))
    }
}

/// Validate model output into a record. A rejection means the models
/// produced garbage, which is a logic error rather than a user mistake.
fn build_record(age_gender: AgeGender, expressions: ExpressionScores) -> Result<AnalysisRecord, AnalyzerError> {
    AnalysisRecord::new(age_gender.age, age_gender.gender, expressions).map_err(|e| {
        tracing::error!(error = %e, age = age_gender.age, "model output rejected");
        AnalyzerError::Record(e)
    })
}
