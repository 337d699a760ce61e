//! Card composition: the photo plus the analysis text that gets exported.

use image::RgbImage;
use persona_core::{AnalysisRecord, Locale, NicknamePicker, Persona, Session};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Card {
    photo: Arc<RgbImage>,
    title: String,
    result_heading: String,
    details: Vec<(String, String)>,
    persona_heading: String,
    persona: String,
    footer: String,
}

impl Card {
    /// Compose the card for one analysis.
    pub fn compose(photo: Arc<RgbImage>, record: &AnalysisRecord, persona: &Persona, locale: Locale) -> Self {
        let labels = locale.card_labels();
        Self {
            photo,
            title: labels.title.to_string(),
            result_heading: labels.result_heading.to_string(),
            details: vec![
                (labels.age.to_string(), record.rounded_age().to_string()),
                (labels.gender.to_string(), locale.gender_label(record.gender()).to_string()),
                (labels.expression.to_string(), record.dominant_expression().to_string()),
            ],
            persona_heading: labels.persona_heading.to_string(),
            persona: persona.text.clone(),
            footer: labels.footer.to_string(),
        }
    }

    /// The card for the session's current analysis; `None` until analyzed.
    pub fn from_session<P: NicknamePicker>(session: &Session<Arc<RgbImage>, P>) -> Option<Self> {
        let photo = session.image()?;
        let record = session.record()?;
        let persona = session.persona()?;
        Some(Self::compose(
            Arc::clone(photo),
            record,
            persona,
            session.generator().locale(),
        ))
    }

    pub fn photo(&self) -> &RgbImage {
        &self.photo
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn result_heading(&self) -> &str {
        &self.result_heading
    }

    /// (label, value) rows: age, gender, expression.
    pub fn details(&self) -> &[(String, String)] {
        &self.details
    }

    pub fn persona_heading(&self) -> &str {
        &self.persona_heading
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }
}
