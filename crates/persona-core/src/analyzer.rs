//! Detection capability boundary.

use crate::types::DetectionOutcome;
use image::RgbImage;

/// Face analysis backend: age, gender and expression scores for the most
/// prominent face in an image.
///
/// Implementations must report expression scores in the order the model
/// emits them and return [`DetectionOutcome::NotDetected`] (not an error)
/// when the image has no face.
pub trait FaceAnalyzer: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    fn analyze(&mut self, image: &RgbImage) -> Result<DetectionOutcome, Self::Error>;
}
