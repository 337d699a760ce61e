//! PNG export of rendered cards.

use crate::card::Card;
use crate::render::CardRenderer;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CARD_FILENAME: &str = "analysis-card.png";

#[derive(Error, Debug)]
pub enum CardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("unusable font {0}")]
    Font(String),
}

/// Destination for encoded cards.
pub trait ExportSink {
    /// Store `png` under `filename`, returning where it ended up.
    fn save(&mut self, filename: &str, png: &[u8]) -> Result<PathBuf, CardError>;
}

/// Writes cards into a directory. Files are written beside the target and
/// renamed into place, so a reader never sees a partial PNG.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ExportSink for DirectorySink {
    fn save(&mut self, filename: &str, png: &[u8]) -> Result<PathBuf, CardError> {
        std::fs::create_dir_all(&self.dir)?;
        let target = self.dir.join(filename);
        let partial = self.dir.join(format!(".{filename}.partial"));
        std::fs::write(&partial, png)?;
        if let Err(e) = std::fs::rename(&partial, &target) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.into());
        }
        Ok(target)
    }
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, CardError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

pub struct CardExporter<S = DirectorySink> {
    renderer: CardRenderer,
    sink: S,
}

impl<S: ExportSink> CardExporter<S> {
    pub fn new(renderer: CardRenderer, sink: S) -> Self {
        Self { renderer, sink }
    }

    pub fn renderer(&self) -> &CardRenderer {
        &self.renderer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Render and save `card` as [`CARD_FILENAME`].
    ///
    /// Without a card (nothing analyzed yet) this does nothing and returns
    /// `Ok(None)`.
    pub fn export(&mut self, card: Option<&Card>) -> Result<Option<PathBuf>, CardError> {
        let Some(card) = card else {
            tracing::debug!("export requested without an analysis; skipping");
            return Ok(None);
        };

        let image = self.renderer.render(card);
        let png = encode_png(&image)?;
        let path = self.sink.save(CARD_FILENAME, &png)?;
        tracing::info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            bytes = png.len(),
            "card exported"
        );
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{BACKGROUND, EXPORT_SCALE};
    use image::Rgb;
    use persona_core::{AnalysisRecord, ExpressionScores, Gender, Locale, PersonaGenerator, RandomPicker};
    use std::sync::Arc;

    #[derive(Default)]
    struct MemorySink {
        saved: Vec<(String, Vec<u8>)>,
    }

    impl ExportSink for MemorySink {
        fn save(&mut self, filename: &str, png: &[u8]) -> Result<PathBuf, CardError> {
            self.saved.push((filename.to_string(), png.to_vec()));
            Ok(PathBuf::from(filename))
        }
    }

    fn card() -> Card {
        let scores: ExpressionScores = [("angry", 0.6), ("neutral", 0.4)].into_iter().collect();
        let record = AnalysisRecord::new(35.0, Gender::Male, scores).unwrap();
        let persona = PersonaGenerator::new(Locale::English)
            .for_record(Some(&record), &mut RandomPicker::new())
            .unwrap();
        let photo = Arc::new(RgbImage::from_pixel(64, 80, Rgb([30, 120, 200])));
        Card::compose(photo, &record, &persona, Locale::English)
    }

    #[test]
    fn test_export_without_card_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = CardExporter::new(CardRenderer::new(None), DirectorySink::new(dir.path()));
        assert!(exporter.export(None).unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_writes_decodable_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("cards");
        let mut exporter = CardExporter::new(CardRenderer::new(None), DirectorySink::new(&out));
        let card = card();

        let path = exporter.export(Some(&card)).unwrap().unwrap();
        assert_eq!(path, out.join(CARD_FILENAME));

        let layout = exporter.renderer().layout(&card);
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(
            decoded.dimensions(),
            (layout.width * EXPORT_SCALE, layout.height * EXPORT_SCALE)
        );
        assert_eq!(*decoded.get_pixel(0, 0), BACKGROUND);

        let leftovers: Vec<_> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(CARD_FILENAME)]);
    }

    #[test]
    fn test_export_overwrites_previous_card() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CARD_FILENAME), b"stale").unwrap();
        let mut exporter = CardExporter::new(CardRenderer::new(None), DirectorySink::new(dir.path()));

        let path = exporter.export(Some(&card())).unwrap().unwrap();
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn test_export_to_custom_sink() {
        let mut exporter = CardExporter::new(CardRenderer::new(None), MemorySink::default());
        exporter.export(Some(&card())).unwrap();
        exporter.export(None).unwrap();

        let saved = &exporter.sink().saved;
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].0, CARD_FILENAME);
        assert!(saved[0].1.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_export_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let mut exporter = CardExporter::new(CardRenderer::new(None), DirectorySink::new(&blocker));
        assert!(matches!(exporter.export(Some(&card())), Err(CardError::Io(_))));
    }
}
