//! SCRFD face detector via ONNX Runtime.
//!
//! Letterboxes the photo to a square input, decodes the three stride levels
//! anchor-free, and suppresses overlaps with NMS. Only boxes are decoded;
//! the attribute heads work from the box alone.

use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const SCRFD_MEAN: f32 = 127.5;
const SCRFD_STD: f32 = 128.0;
const SCRFD_NMS_THRESHOLD: f32 = 0.4;
const SCRFD_STRIDES: [usize; 3] = [8, 16, 32];
const SCRFD_ANCHORS_PER_CELL: usize = 2;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("model file not found: {0} (download it from insightface into the model directory)")]
    ModelNotFound(String),
    #[error("invalid detector options: {0}")]
    InvalidOptions(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// Which SCRFD export to load from the model directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DetectorVariant {
    /// Full-size model; slower, better on small faces.
    #[default]
    #[serde(rename = "scrfd_10g", alias = "10g")]
    Scrfd10g,
    #[serde(rename = "scrfd_500m", alias = "500m")]
    Scrfd500m,
}

impl DetectorVariant {
    pub fn model_file(&self) -> &'static str {
        match self {
            DetectorVariant::Scrfd10g => "det_10g.onnx",
            DetectorVariant::Scrfd500m => "det_500m.onnx",
        }
    }
}

impl std::str::FromStr for DetectorVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scrfd_10g" | "10g" => Ok(DetectorVariant::Scrfd10g),
            "scrfd_500m" | "500m" => Ok(DetectorVariant::Scrfd500m),
            other => Err(format!("unknown detector variant: {other}")),
        }
    }
}

/// Detection tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectorOptions {
    /// Minimum face score in (0, 1).
    pub confidence_threshold: f32,
    /// Square network input side in pixels; a multiple of 32.
    pub input_size: usize,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            input_size: 640,
        }
    }
}

impl DetectorOptions {
    pub fn validate(&self) -> Result<(), DetectorError> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold < 1.0) {
            return Err(DetectorError::InvalidOptions(format!(
                "confidence threshold must be in (0, 1), got {}",
                self.confidence_threshold
            )));
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(DetectorError::InvalidOptions(format!(
                "input size must be a positive multiple of 32, got {}",
                self.input_size
            )));
        }
        Ok(())
    }
}

/// A detected face in original image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

impl FaceBox {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Mapping from letterboxed input space back to the photo.
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
}

impl Letterbox {
    fn to_image(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Output tensor indices for one stride: (score_idx, bbox_idx).
type StrideOutputs = (usize, usize);

pub struct FaceDetector {
    session: Session,
    options: DetectorOptions,
    /// Per-stride output indices for strides [8, 16, 32].
    stride_outputs: [StrideOutputs; 3],
}

impl FaceDetector {
    /// Load an SCRFD ONNX model.
    pub fn load(model_path: &Path, options: DetectorOptions) -> Result<Self, DetectorError> {
        options.validate()?;
        if !model_path.exists() {
            return Err(DetectorError::ModelNotFound(model_path.display().to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        let output_names: Vec<String> = session.outputs().iter().map(|o| o.name().to_string()).collect();
        tracing::info!(
            path = %model_path.display(),
            outputs = ?output_names,
            input_size = options.input_size,
            "loaded SCRFD model"
        );

        // 6 outputs without landmarks, 9 with; landmarks are ignored.
        if output_names.len() < 6 {
            return Err(DetectorError::InferenceFailed(format!(
                "SCRFD model requires at least 6 outputs (3 strides × score/bbox), got {}",
                output_names.len()
            )));
        }

        let stride_outputs = discover_output_indices(&output_names);
        tracing::debug!(?stride_outputs, "SCRFD output tensor mapping");

        Ok(Self {
            session,
            options,
            stride_outputs,
        })
    }

    /// Detect faces, most confident first.
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<FaceBox>, DetectorError> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        let input_size = self.options.input_size;
        let (input, letterbox) = preprocess(image, input_size);
        let outputs = self.session.run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let mut candidates = Vec::new();
        for (pos, &stride) in SCRFD_STRIDES.iter().enumerate() {
            let (score_idx, bbox_idx) = self.stride_outputs[pos];

            let (_, scores) = outputs[score_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("scores stride {stride}: {e}")))?;
            let (_, bboxes) = outputs[bbox_idx]
                .try_extract_tensor::<f32>()
                .map_err(|e| DetectorError::InferenceFailed(format!("bboxes stride {stride}: {e}")))?;

            candidates.extend(decode_stride(
                scores,
                bboxes,
                stride,
                input_size,
                &letterbox,
                self.options.confidence_threshold,
            ));
        }

        let faces = nms(candidates, SCRFD_NMS_THRESHOLD);
        tracing::debug!(count = faces.len(), "SCRFD detections");
        Ok(faces)
    }

    /// The single most confident face, if any.
    pub fn detect_primary(&mut self, image: &RgbImage) -> Result<Option<FaceBox>, DetectorError> {
        Ok(self.detect(image)?.into_iter().next())
    }
}

/// Letterbox an RGB photo into a normalized NCHW tensor.
///
/// Padding stays at zero, which is where the mean pixel value normalizes to.
fn preprocess(image: &RgbImage, input_size: usize) -> (Array4<f32>, Letterbox) {
    let (width, height) = image.dimensions();
    let side = input_size as u32;
    let scale = (input_size as f32 / width as f32).min(input_size as f32 / height as f32);

    let new_w = ((width as f32 * scale).round() as u32).clamp(1, side);
    let new_h = ((height as f32 * scale).round() as u32).clamp(1, side);
    let pad_x = (side - new_w) / 2;
    let pad_y = (side - new_h) / 2;

    let resized = imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let mut tensor = Array4::<f32>::zeros((1, 3, input_size, input_size));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let tx = (x + pad_x) as usize;
        let ty = (y + pad_y) as usize;
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = (pixel[c] as f32 - SCRFD_MEAN) / SCRFD_STD;
        }
    }

    let letterbox = Letterbox {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
    };
    (tensor, letterbox)
}

/// Map output tensors to stride slots.
///
/// Exports name them "score_8", "bbox_16", ... or use bare numbers; the
/// latter fall back to positional order [scores 8/16/32, bboxes 8/16/32, ...].
fn discover_output_indices(names: &[String]) -> [StrideOutputs; 3] {
    let find = |prefix: &str, stride: usize| -> Option<usize> {
        let target = format!("{prefix}_{stride}");
        names.iter().position(|n| *n == target)
    };

    let named: Option<Vec<StrideOutputs>> = SCRFD_STRIDES
        .iter()
        .map(|&stride| Some((find("score", stride)?, find("bbox", stride)?)))
        .collect();

    match named {
        Some(found) => [found[0], found[1], found[2]],
        None => {
            tracing::debug!(?names, "SCRFD output names not recognized, using positional mapping");
            [(0, 3), (1, 4), (2, 5)]
        }
    }
}

/// Decode one stride level's anchors above `threshold`.
fn decode_stride(
    scores: &[f32],
    bboxes: &[f32],
    stride: usize,
    input_size: usize,
    letterbox: &Letterbox,
    threshold: f32,
) -> Vec<FaceBox> {
    let grid = input_size / stride;
    let num_anchors = grid * grid * SCRFD_ANCHORS_PER_CELL;
    let step = stride as f32;

    (0..num_anchors)
        .filter_map(|idx| {
            let score = *scores.get(idx)?;
            if score <= threshold {
                return None;
            }
            let d = bboxes.get(idx * 4..idx * 4 + 4)?;

            let cell = idx / SCRFD_ANCHORS_PER_CELL;
            let cx = (cell % grid) as f32 * step;
            let cy = (cell / grid) as f32 * step;

            let (x1, y1) = letterbox.to_image(cx - d[0] * step, cy - d[1] * step);
            let (x2, y2) = letterbox.to_image(cx + d[2] * step, cy + d[3] * step);

            Some(FaceBox {
                x: x1,
                y: y1,
                width: x2 - x1,
                height: y2 - y1,
                confidence: score,
            })
        })
        .collect()
}

/// Greedy NMS; returns survivors sorted by descending confidence.
fn nms(mut boxes: Vec<FaceBox>, iou_threshold: f32) -> Vec<FaceBox> {
    boxes.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<FaceBox> = Vec::with_capacity(boxes.len());
    for candidate in boxes {
        if keep.iter().all(|k| iou(k, &candidate) <= iou_threshold) {
            keep.push(candidate);
        }
    }
    keep
}

fn iou(a: &FaceBox, b: &FaceBox) -> f32 {
    let inter_w = ((a.x + a.width).min(b.x + b.width) - a.x.max(b.x)).max(0.0);
    let inter_h = ((a.y + a.height).min(b.y + b.height) - a.y.max(b.y)).max(0.0);
    let inter = inter_w * inter_h;
    let union = a.width * a.height + b.width * b.height - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}
