//! Inference engine thread.
//!
//! Models load once on a dedicated OS thread while callers carry on.
//! Readiness is published on a `watch` channel; requests travel over `mpsc`
//! with `oneshot` replies. `analyze` waits for the models, `try_analyze`
//! refuses with [`EngineError::ModelsNotReady`] instead.

use image::RgbImage;
use persona_core::{DetectionOutcome, FaceAnalyzer};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

use crate::analyzer::{ModelPaths, OnnxFaceAnalyzer};
use crate::detector::DetectorOptions;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("face models are still loading")]
    ModelsNotReady,
    #[error("face models failed to load: {0}")]
    ModelLoad(String),
    #[error("face analysis failed: {0}")]
    Analysis(String),
    #[error("failed to start engine thread: {0}")]
    Spawn(String),
    #[error("engine thread exited")]
    ChannelClosed,
}

/// Model loading state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    Loading,
    Ready,
    Failed(String),
}

struct AnalyzeRequest {
    image: Arc<RgbImage>,
    reply: oneshot::Sender<Result<DetectionOutcome, EngineError>>,
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<AnalyzeRequest>,
    ready: watch::Receiver<Readiness>,
}

impl EngineHandle {
    pub fn readiness(&self) -> Readiness {
        self.ready.borrow().clone()
    }

    /// Wait until loading finishes; `ModelLoad` if it failed.
    pub async fn wait_ready(&self) -> Result<(), EngineError> {
        let mut ready = self.ready.clone();
        let state = ready
            .wait_for(|r| *r != Readiness::Loading)
            .await
            .map_err(|_| EngineError::ChannelClosed)?
            .clone();
        match state {
            Readiness::Failed(reason) => Err(EngineError::ModelLoad(reason)),
            _ => Ok(()),
        }
    }

    /// Analyze `image`, queueing behind model loading if necessary.
    pub async fn analyze(&self, image: Arc<RgbImage>) -> Result<DetectionOutcome, EngineError> {
        self.wait_ready().await?;
        self.submit(image).await
    }

    /// Analyze `image` only if the models are already loaded.
    pub async fn try_analyze(&self, image: Arc<RgbImage>) -> Result<DetectionOutcome, EngineError> {
        match self.readiness() {
            Readiness::Loading => Err(EngineError::ModelsNotReady),
            Readiness::Failed(reason) => Err(EngineError::ModelLoad(reason)),
            Readiness::Ready => self.submit(image).await,
        }
    }

    async fn submit(&self, image: Arc<RgbImage>) -> Result<DetectionOutcome, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(AnalyzeRequest {
                image,
                reply: reply_tx,
            })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }
}

/// Spawn the engine thread; `load` runs on it before any request is served.
pub fn spawn_engine<A, E, F>(load: F) -> Result<EngineHandle, EngineError>
where
    A: FaceAnalyzer + 'static,
    E: Display,
    F: FnOnce() -> Result<A, E> + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<AnalyzeRequest>(4);
    let (ready_tx, ready_rx) = watch::channel(Readiness::Loading);

    std::thread::Builder::new()
        .name("persona-engine".into())
        .spawn(move || {
            let started = Instant::now();
            let mut analyzer = match load() {
                Ok(analyzer) => {
                    tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "face models loaded");
                    ready_tx.send_replace(Readiness::Ready);
                    analyzer
                }
                Err(e) => {
                    let reason = e.to_string();
                    tracing::error!(error = %reason, "face models failed to load");
                    ready_tx.send_replace(Readiness::Failed(reason.clone()));
                    // Answer anything that raced the failure.
                    while let Some(req) = rx.blocking_recv() {
                        let _ = req.reply.send(Err(EngineError::ModelLoad(reason.clone())));
                    }
                    return;
                }
            };

            while let Some(AnalyzeRequest { image, reply }) = rx.blocking_recv() {
                let started = Instant::now();
                let result = analyzer
                    .analyze(&image)
                    .map_err(|e| EngineError::Analysis(e.to_string()));
                tracing::debug!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "analysis request served"
                );
                let _ = reply.send(result);
            }
            tracing::debug!("engine thread exiting");
        })
        .map_err(|e| EngineError::Spawn(e.to_string()))?;

    Ok(EngineHandle { tx, ready: ready_rx })
}

/// Spawn the engine with the ONNX models at `paths`.
pub fn spawn_onnx_engine(paths: ModelPaths, options: DetectorOptions) -> Result<EngineHandle, EngineError> {
    tracing::info!(detector = %paths.detector.display(), "loading face models in background");
    spawn_engine(move || OnnxFaceAnalyzer::load(&paths, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{AnalysisRecord, ExpressionScores, Gender};
    use std::sync::mpsc as std_mpsc;

    #[derive(Debug, thiserror::Error)]
    #[error("fake failure")]
    struct FakeError;

    /// Reports a face on images wider than 1 px, none otherwise.
    struct FakeAnalyzer;

    impl FaceAnalyzer for FakeAnalyzer {
        type Error = FakeError;

        fn analyze(&mut self, image: &RgbImage) -> Result<DetectionOutcome, FakeError> {
            match image.width() {
                0 => Err(FakeError),
                1 => Ok(DetectionOutcome::NotDetected),
                _ => {
                    let scores: ExpressionScores = [("happy", 0.9), ("sad", 0.1)].into_iter().collect();
                    Ok(DetectionOutcome::Detected(
                        AnalysisRecord::new(33.0, Gender::Female, scores).unwrap(),
                    ))
                }
            }
        }
    }

    fn image(width: u32) -> Arc<RgbImage> {
        Arc::new(RgbImage::new(width, 1))
    }

    #[tokio::test]
    async fn test_requests_before_load_are_gated() {
        let (gate_tx, gate_rx) = std_mpsc::channel::<()>();
        let engine = spawn_engine(move || {
            gate_rx.recv().map_err(|e| e.to_string())?;
            Ok::<_, String>(FakeAnalyzer)
        })
        .unwrap();

        assert_eq!(engine.readiness(), Readiness::Loading);
        assert_eq!(engine.try_analyze(image(8)).await, Err(EngineError::ModelsNotReady));

        let queued = tokio::spawn({
            let engine = engine.clone();
            async move { engine.analyze(image(8)).await }
        });

        gate_tx.send(()).unwrap();
        let outcome = queued.await.unwrap().unwrap();
        assert!(matches!(outcome, DetectionOutcome::Detected(_)));
        assert_eq!(engine.readiness(), Readiness::Ready);

        let outcome = engine.try_analyze(image(1)).await.unwrap();
        assert_eq!(outcome, DetectionOutcome::NotDetected);
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let engine = spawn_engine(|| Err::<FakeAnalyzer, _>("model file not found: det_10g.onnx")).unwrap();

        let err = engine.analyze(image(8)).await.unwrap_err();
        assert!(matches!(err, EngineError::ModelLoad(ref reason) if reason.contains("det_10g")));
        assert!(matches!(engine.readiness(), Readiness::Failed(_)));
        assert!(matches!(engine.try_analyze(image(8)).await, Err(EngineError::ModelLoad(_))));
    }

    #[tokio::test]
    async fn test_analysis_errors_are_mapped() {
        let engine = spawn_engine(|| Ok::<_, String>(FakeAnalyzer)).unwrap();
        let err = engine.analyze(image(0)).await.unwrap_err();
        assert_eq!(err, EngineError::Analysis("fake failure".into()));

        // The engine keeps serving after a failed request.
        assert!(engine.analyze(image(4)).await.is_ok());
    }
}
