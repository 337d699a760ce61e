//! Age/gender and expression heads via ONNX Runtime.
//!
//! - `genderage.onnx` (InsightFace): 96×96 RGB crop of the face box expanded
//!   1.5×, raw pixel values. Output `[female, male, age / 100]`.
//! - `emotion-ferplus-8.onnx` (FER+): 64×64 grayscale crop of the face box,
//!   raw pixel values. Output: eight logits, softmaxed into scores.

use crate::detector::FaceBox;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use persona_core::{ExpressionScores, Gender};
use std::path::Path;
use thiserror::Error;

const GENDERAGE_INPUT_SIZE: u32 = 96;
const GENDERAGE_CROP_SCALE: f32 = 1.5;
const EMOTION_INPUT_SIZE: u32 = 64;
const EMOTION_CROP_SCALE: f32 = 1.0;

/// Expression labels in FER+ output order.
pub const EXPRESSION_LABELS: [&str; 8] = [
    "neutral",
    "happy",
    "surprised",
    "sad",
    "angry",
    "disgusted",
    "fearful",
    "contempt",
];

#[derive(Error, Debug)]
pub enum AttributeError {
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    #[error("face crop is empty")]
    EmptyCrop,
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Age/gender estimate for one face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeGender {
    pub age: f32,
    pub gender: Gender,
    /// Softmax probability of `gender`. Informational only.
    pub confidence: f32,
}

fn load_session(model_path: &Path, kind: &str) -> Result<Session, AttributeError> {
    if !model_path.exists() {
        return Err(AttributeError::ModelNotFound(model_path.display().to_string()));
    }
    let session = Session::builder()?
        .with_intra_threads(2)?
        .commit_from_file(model_path)?;
    tracing::info!(
        path = %model_path.display(),
        outputs = ?session.outputs().iter().map(|o| o.name()).collect::<Vec<_>>(),
        "loaded {kind} model"
    );
    Ok(session)
}

pub struct GenderAgeModel {
    session: Session,
}

impl GenderAgeModel {
    pub fn load(model_path: &Path) -> Result<Self, AttributeError> {
        Ok(Self {
            session: load_session(model_path, "genderage")?,
        })
    }

    pub fn predict(&mut self, image: &RgbImage, face: &FaceBox) -> Result<AgeGender, AttributeError> {
        let crop = crop_square(image, face, GENDERAGE_CROP_SCALE).ok_or(AttributeError::EmptyCrop)?;
        let resized = imageops::resize(&crop, GENDERAGE_INPUT_SIZE, GENDERAGE_INPUT_SIZE, FilterType::Triangle);
        let input = rgb_tensor(&resized);

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;
        let (_, raw) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AttributeError::InferenceFailed(format!("genderage output: {e}")))?;

        decode_age_gender(raw)
    }
}

pub struct EmotionModel {
    session: Session,
}

impl EmotionModel {
    pub fn load(model_path: &Path) -> Result<Self, AttributeError> {
        Ok(Self {
            session: load_session(model_path, "FER+ emotion")?,
        })
    }

    pub fn predict(&mut self, image: &RgbImage, face: &FaceBox) -> Result<ExpressionScores, AttributeError> {
        let crop = crop_square(image, face, EMOTION_CROP_SCALE).ok_or(AttributeError::EmptyCrop)?;
        let gray = imageops::grayscale(&crop);
        let resized = imageops::resize(&gray, EMOTION_INPUT_SIZE, EMOTION_INPUT_SIZE, FilterType::Triangle);

        let side = EMOTION_INPUT_SIZE as usize;
        let mut input = Array4::<f32>::zeros((1, 1, side, side));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32;
        }

        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;
        let (_, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AttributeError::InferenceFailed(format!("emotion output: {e}")))?;

        decode_expressions(logits)
    }
}

/// Square crop around the face center, `scale` times the longer box side,
/// clipped to the image. `None` if nothing of the face is inside the image.
fn crop_square(image: &RgbImage, face: &FaceBox, scale: f32) -> Option<RgbImage> {
    let (cx, cy) = face.center();
    let half = face.width.max(face.height) * scale / 2.0;
    if !(half > 0.0) {
        return None;
    }

    let (w, h) = (image.width() as f32, image.height() as f32);
    let x0 = (cx - half).floor().clamp(0.0, w);
    let y0 = (cy - half).floor().clamp(0.0, h);
    let x1 = (cx + half).ceil().clamp(0.0, w);
    let y1 = (cy + half).ceil().clamp(0.0, h);
    if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
        return None;
    }

    Some(imageops::crop_imm(image, x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32).to_image())
}

/// RGB crop → NCHW tensor of raw 0–255 values.
fn rgb_tensor(image: &RgbImage) -> Array4<f32> {
    let (w, h) = image.dimensions();
    let mut tensor = Array4::<f32>::zeros((1, 3, h as usize, w as usize));
    for (x, y, pixel) in image.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = pixel[c] as f32;
        }
    }
    tensor
}

fn decode_age_gender(raw: &[f32]) -> Result<AgeGender, AttributeError> {
    let [female, male, age_scale] = match raw {
        [f, m, a, ..] => [*f, *m, *a],
        _ => {
            return Err(AttributeError::InferenceFailed(format!(
                "genderage output has {} values, expected 3",
                raw.len()
            )))
        }
    };

    let probs = softmax(&[female, male]);
    let (gender, confidence) = if male > female {
        (Gender::Male, probs[1])
    } else {
        (Gender::Female, probs[0])
    };

    Ok(AgeGender {
        age: (age_scale * 100.0).max(0.0),
        gender,
        confidence,
    })
}

fn decode_expressions(logits: &[f32]) -> Result<ExpressionScores, AttributeError> {
    if logits.len() != EXPRESSION_LABELS.len() {
        return Err(AttributeError::InferenceFailed(format!(
            "emotion output has {} values, expected {}",
            logits.len(),
            EXPRESSION_LABELS.len()
        )));
    }
    Ok(EXPRESSION_LABELS.iter().copied().zip(softmax(logits)).collect())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}
