use anyhow::{Context, Result};
use persona_core::Locale;
use persona_vision::{DetectorOptions, DetectorVariant, ModelPaths};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// CLI configuration: defaults, then an optional TOML file, then
/// `PERSONA_*` environment variables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Language of persona text and card labels.
    pub locale: Locale,
    /// SCRFD variant used for face detection.
    pub detector: DetectorVariant,
    /// Minimum detector score for a face.
    pub confidence_threshold: f32,
    /// Detector input side in pixels.
    pub input_size: usize,
    /// Card font; system fonts are searched when unset.
    pub font: Option<PathBuf>,
    /// Where exported cards are written.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let detector = DetectorOptions::default();
        Self {
            model_dir: persona_vision::default_model_dir(),
            locale: Locale::default(),
            detector: DetectorVariant::default(),
            confidence_threshold: detector.confidence_threshold,
            input_size: detector.input_size,
            font: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load from `path` (if any) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay `PERSONA_*` variables looked up through `lookup`. Values that
    /// fail to parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("PERSONA_MODEL_DIR") {
            self.model_dir = PathBuf::from(dir);
        }
        if let Some(locale) = parse_var(&lookup, "PERSONA_LOCALE") {
            self.locale = locale;
        }
        if let Some(variant) = parse_var(&lookup, "PERSONA_DETECTOR") {
            self.detector = variant;
        }
        if let Some(threshold) = parse_var(&lookup, "PERSONA_CONFIDENCE_THRESHOLD") {
            self.confidence_threshold = threshold;
        }
        if let Some(size) = parse_var(&lookup, "PERSONA_INPUT_SIZE") {
            self.input_size = size;
        }
        if let Some(font) = lookup("PERSONA_FONT") {
            self.font = Some(PathBuf::from(font));
        }
        if let Some(dir) = lookup("PERSONA_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
    }

    pub fn detector_options(&self) -> DetectorOptions {
        DetectorOptions {
            confidence_threshold: self.confidence_threshold,
            input_size: self.input_size,
        }
    }

    pub fn model_paths(&self) -> ModelPaths {
        ModelPaths::in_dir(&self.model_dir, self.detector)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "ignoring invalid environment override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.detector, DetectorVariant::Scrfd10g);
        assert_eq!(config.detector_options(), DetectorOptions::default());
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.font.is_none());
    }

    #[test]
    fn test_toml_overlays_defaults() {
        let config = Config::from_toml(
            r#"
            model_dir = "/srv/models"
            locale = "tr"
            detector = "scrfd_500m"
            confidence_threshold = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(config.model_dir, PathBuf::from("/srv/models"));
        assert_eq!(config.locale, Locale::Turkish);
        assert_eq!(config.detector, DetectorVariant::Scrfd500m);
        assert_eq!(config.confidence_threshold, 0.6);
        assert_eq!(config.input_size, 640);
        assert_eq!(
            config.model_paths().detector,
            PathBuf::from("/srv/models/det_500m.onnx")
        );
    }

    #[test]
    fn test_toml_rejects_unknown_keys() {
        assert!(Config::from_toml("camera_device = \"/dev/video0\"").is_err());
    }

    #[test]
    fn test_env_overrides_toml() {
        let mut config = Config::from_toml("locale = \"english\"\ninput_size = 320").unwrap();
        config.apply_overrides(env(&[
            ("PERSONA_LOCALE", "turkish"),
            ("PERSONA_INPUT_SIZE", "480"),
            ("PERSONA_FONT", "/fonts/Inter.ttf"),
            ("PERSONA_OUTPUT_DIR", "/tmp/cards"),
            ("PERSONA_DETECTOR", "500m"),
        ]));
        assert_eq!(config.locale, Locale::Turkish);
        assert_eq!(config.input_size, 480);
        assert_eq!(config.font, Some(PathBuf::from("/fonts/Inter.ttf")));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/cards"));
        assert_eq!(config.detector, DetectorVariant::Scrfd500m);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("PERSONA_CONFIDENCE_THRESHOLD", "very"),
            ("PERSONA_LOCALE", "klingon"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_reports_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/persona.toml"))).unwrap_err();
        assert!(err.to_string().contains("persona.toml"));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.toml");
        std::fs::write(&path, "output_dir = \"/var/cards\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        // Environment may override; only assert when it does not.
        if std::env::var_os("PERSONA_OUTPUT_DIR").is_none() {
            assert_eq!(config.output_dir, PathBuf::from("/var/cards"));
        }
    }
}
