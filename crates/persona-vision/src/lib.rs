//! persona-vision — Face analysis backend.
//!
//! SCRFD for face detection, InsightFace genderage and FER+ for the face
//! attributes, all on ONNX Runtime (CPU). Models load on a background
//! engine thread behind a readiness gate.

pub mod analyzer;
pub mod attributes;
pub mod detector;
pub mod engine;

pub use analyzer::{default_model_dir, AnalyzerError, ModelPaths, OnnxFaceAnalyzer};
pub use detector::{DetectorOptions, DetectorVariant, FaceBox, FaceDetector};
pub use engine::{spawn_engine, spawn_onnx_engine, EngineError, EngineHandle, Readiness};
