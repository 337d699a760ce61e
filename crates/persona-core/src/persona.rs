//! Persona caption generation.
//!
//! A persona fills a four-slot template (rounded age, mood word, gender
//! noun, nickname) in the generator's locale. The nickname is drawn fresh
//! on every call through a [`NicknamePicker`], so two personas for the same
//! record may differ.

use crate::locale::Locale;
use crate::nicknames;
use crate::types::{AnalysisRecord, Gender, PersonaError};
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::Serialize;
use std::fmt;

/// Source of "pick one of N" choices for nickname draws.
pub trait NicknamePicker {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform picker backed by any [`rand::Rng`]; thread-local RNG by default.
pub struct RandomPicker<R = ThreadRng> {
    rng: R,
}

impl RandomPicker<ThreadRng> {
    pub fn new() -> Self {
        Self { rng: rand::thread_rng() }
    }
}

impl Default for RandomPicker<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> NicknamePicker for RandomPicker<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// A generated persona, keeping each template slot alongside the sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub age: u32,
    pub gender: Gender,
    pub mood: String,
    pub noun: String,
    pub nickname: String,
    pub text: String,
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PersonaGenerator {
    locale: Locale,
}

impl PersonaGenerator {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Compose a persona from already-resolved inputs.
    pub fn generate(
        &self,
        age: u32,
        gender: Gender,
        expression: &str,
        picker: &mut dyn NicknamePicker,
    ) -> Persona {
        let noun = self.locale.gender_noun(gender);
        let mood = self.locale.mood(expression);
        let pool = nicknames::pool(self.locale, gender);
        let nickname = pool[picker.pick(pool.len()) % pool.len()];

        let text = self.locale.compose(age, &mood, noun, nickname);
        tracing::debug!(age, %gender, expression, nickname, "persona generated");

        Persona {
            age,
            gender,
            mood: mood.into_owned(),
            noun: noun.to_string(),
            nickname: nickname.to_string(),
            text,
        }
    }

    /// Compose a persona for the current analysis, if there is one.
    pub fn for_record(
        &self,
        record: Option<&AnalysisRecord>,
        picker: &mut dyn NicknamePicker,
    ) -> Result<Persona, PersonaError> {
        let record = record.ok_or(PersonaError::NoResult)?;
        Ok(self.generate(
            record.rounded_age(),
            record.gender(),
            record.dominant_expression(),
            picker,
        ))
    }
}
