//! Glue between the session, the inference engine and the card exporter.

use anyhow::{Context, Result};
use image::RgbImage;
use persona_card::{find_font, Card, CardExporter, CardRenderer, DirectorySink};
use persona_core::{
    AnalysisRecord, AnalysisTicket, Completion, DetectionOutcome, Locale, Persona, PersonaGenerator,
    RandomPicker, Session,
};
use persona_vision::{EngineError, EngineHandle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;

pub type Photo = Arc<RgbImage>;

/// Decode any supported image file into shared RGB pixels.
pub fn load_image(path: &Path) -> Result<Photo> {
    let image = image::open(path).with_context(|| format!("opening image {}", path.display()))?;
    tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "image decoded");
    Ok(Arc::new(image.to_rgb8()))
}

/// JSON shape of `persona analyze --json`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<&'a AnalysisRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dominant_expression: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<&'a Persona>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

pub struct App {
    engine: EngineHandle,
    session: Session<Photo>,
    exporter: CardExporter,
}

impl App {
    pub fn new(config: &Config, engine: EngineHandle) -> Self {
        let font = find_font(config.font.as_deref());
        Self {
            engine,
            session: Session::new(PersonaGenerator::new(config.locale), RandomPicker::new()),
            exporter: CardExporter::new(CardRenderer::new(font), DirectorySink::new(&config.output_dir)),
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn session(&self) -> &Session<Photo> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<Photo> {
        &mut self.session
    }

    pub fn locale(&self) -> Locale {
        self.session.generator().locale()
    }

    /// Whether exported cards carry text; `false` when no font could be loaded.
    pub fn card_has_text(&self) -> bool {
        self.exporter.renderer().has_font()
    }

    /// Apply an engine answer to the session. Backend failures restore the
    /// prior state; stale failures are dropped.
    pub fn finish(
        &mut self,
        ticket: &AnalysisTicket<Photo>,
        result: Result<DetectionOutcome, EngineError>,
    ) -> Result<Completion, EngineError> {
        match result {
            Ok(outcome) => Ok(self.session.complete_analysis(ticket, outcome)),
            Err(e) => {
                if self.session.abort_analysis(ticket) {
                    tracing::warn!(error = %e, "analysis failed");
                    Err(e)
                } else {
                    tracing::debug!(error = %e, "ignoring failure of stale analysis");
                    Ok(Completion::Stale)
                }
            }
        }
    }

    /// Select `photo` and analyze it, waiting for the models if needed.
    pub async fn analyze_photo(&mut self, photo: Photo) -> Result<Completion> {
        self.session.select_image(photo);
        let ticket = self.session.begin_analysis()?;
        let result = self.engine.analyze(Arc::clone(ticket.image())).await;
        Ok(self.finish(&ticket, result)?)
    }

    pub fn report(&self) -> AnalysisReport<'_> {
        let record = self.session.record();
        AnalysisReport {
            detected: record.is_some(),
            record,
            dominant_expression: record.map(AnalysisRecord::dominant_expression),
            persona: self.session.persona(),
            notice: record.is_none().then(|| self.locale().no_face_notice()),
        }
    }

    /// Export the current card, into `dir` if given. `Ok(None)` when there
    /// is nothing analyzed.
    pub fn export(&mut self, dir: Option<&Path>) -> Result<Option<PathBuf>> {
        let card = Card::from_session(&self.session);
        let saved = match dir {
            Some(dir) => {
                let default = std::mem::replace(self.exporter.sink_mut(), DirectorySink::new(dir));
                let saved = self.exporter.export(card.as_ref());
                *self.exporter.sink_mut() = default;
                saved
            }
            None => self.exporter.export(card.as_ref()),
        };
        let target = dir.unwrap_or(self.exporter.sink().dir());
        saved.with_context(|| format!("exporting card to {}", target.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{ExpressionScores, FaceAnalyzer, Gender, SessionState};
    use persona_vision::spawn_engine;

    #[derive(Debug, thiserror::Error)]
    #[error("decoder exploded")]
    struct Broken;

    /// Finds a face in any image taller than 1 px; fails on empty images.
    struct Scripted;

    impl FaceAnalyzer for Scripted {
        type Error = Broken;

        fn analyze(&mut self, image: &RgbImage) -> Result<DetectionOutcome, Broken> {
            match image.height() {
                0 => Err(Broken),
                1 => Ok(DetectionOutcome::NotDetected),
                _ => {
                    let scores: ExpressionScores =
                        [("happy", 0.6), ("neutral", 0.6), ("sad", 0.1)].into_iter().collect();
                    Ok(DetectionOutcome::Detected(AnalysisRecord::new(27.4, Gender::Male, scores).unwrap()))
                }
            }
        }
    }

    fn app(output_dir: &Path) -> App {
        let config = Config {
            output_dir: output_dir.to_path_buf(),
            font: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..Config::default()
        };
        let engine = spawn_engine(|| Ok::<_, String>(Scripted)).unwrap();
        App::new(&config, engine)
    }

    fn photo(height: u32) -> Photo {
        Arc::new(RgbImage::new(16, height))
    }

    #[tokio::test]
    async fn test_analyze_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        assert_eq!(app.analyze_photo(photo(16)).await.unwrap(), Completion::Analyzed);
        let report = app.report();
        assert!(report.detected);
        assert_eq!(report.dominant_expression, Some("happy"));
        assert!(report.persona.unwrap().text.starts_with("27 years old, a cheerful man"));

        let path = app.export(None).unwrap().unwrap();
        assert_eq!(path, dir.path().join("analysis-card.png"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_no_face_reports_notice_and_exports_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        assert_eq!(app.analyze_photo(photo(1)).await.unwrap(), Completion::NoFace);
        assert_eq!(app.session().state(), SessionState::ImageSelected);

        let json = serde_json::to_value(app.report()).unwrap();
        assert_eq!(json["detected"], false);
        assert_eq!(json["notice"], Locale::English.no_face_notice());
        assert!(json.get("persona").is_none());

        assert!(app.export(None).unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        let err = app.analyze_photo(photo(0)).await.unwrap_err();
        assert!(err.to_string().contains("decoder exploded"));
        assert_eq!(app.session().state(), SessionState::ImageSelected);
    }

    #[tokio::test]
    async fn test_stale_result_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(dir.path());

        app.session_mut().select_image(photo(16));
        let ticket = app.session_mut().begin_analysis().unwrap();
        let result = app.engine().analyze(Arc::clone(ticket.image())).await;

        app.session_mut().select_image(photo(16));
        assert_eq!(app.finish(&ticket, result).unwrap(), Completion::Stale);
        assert!(app.session().record().is_none());

        let failed = Err(EngineError::Analysis("late".into()));
        assert_eq!(app.finish(&ticket, failed).unwrap(), Completion::Stale);
    }

    #[tokio::test]
    async fn test_export_to_explicit_dir_keeps_default() {
        let default_dir = tempfile::tempdir().unwrap();
        let other_dir = tempfile::tempdir().unwrap();
        let mut app = app(default_dir.path());
        app.analyze_photo(photo(16)).await.unwrap();

        let path = app.export(Some(other_dir.path())).unwrap().unwrap();
        assert_eq!(path, other_dir.path().join("analysis-card.png"));

        let path = app.export(None).unwrap().unwrap();
        assert_eq!(path, default_dir.path().join("analysis-card.png"));
    }
}
