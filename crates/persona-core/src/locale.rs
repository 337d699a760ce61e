//! Locale tables: mood words, gender nouns, sentence template, card text.

use crate::types::Gender;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Presentation language for personas and cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    #[serde(alias = "en")]
    English,
    #[serde(alias = "tr")]
    Turkish,
}

/// Fixed headings printed on the exported card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLabels {
    pub title: &'static str,
    pub result_heading: &'static str,
    pub age: &'static str,
    pub gender: &'static str,
    pub expression: &'static str,
    pub persona_heading: &'static str,
    pub footer: &'static str,
}

const MOODS_EN: [(&str, &str); 5] = [
    ("happy", "cheerful"),
    ("sad", "sorrowful"),
    ("angry", "full of rage"),
    ("surprised", "startled"),
    ("neutral", "calm"),
];

const MOODS_TR: [(&str, &str); 5] = [
    ("happy", "neşeli"),
    ("sad", "hüzünlü"),
    ("angry", "öfke dolu"),
    ("surprised", "şaşkın"),
    ("neutral", "sakin"),
];

const LABELS_EN: CardLabels = CardLabels {
    title: "Character Analysis",
    result_heading: "Analysis Result",
    age: "Estimated age",
    gender: "Gender",
    expression: "Expression",
    persona_heading: "Your character:",
    footer: "karakteranalizi.site",
};

const LABELS_TR: CardLabels = CardLabels {
    title: "Karakter Analizi",
    result_heading: "Analiz Sonucu",
    age: "Yaş Tahmini",
    gender: "Cinsiyet",
    expression: "Duygu",
    persona_heading: "Karakterin:",
    footer: "karakteranalizi.site",
};

impl Locale {
    pub fn code(&self) -> &'static str {
        match self {
            Locale::English => "en",
            Locale::Turkish => "tr",
        }
    }

    /// Translate an expression label into a mood word.
    ///
    /// Labels missing from the table pass through unchanged.
    pub fn mood<'a>(&self, expression: &'a str) -> Cow<'a, str> {
        let table: &[(&str, &str)] = match self {
            Locale::English => &MOODS_EN,
            Locale::Turkish => &MOODS_TR,
        };
        table
            .iter()
            .find(|(label, _)| *label == expression)
            .map(|(_, mood)| Cow::Borrowed(*mood))
            .unwrap_or(Cow::Borrowed(expression))
    }

    /// Noun phrase describing the person in the persona sentence.
    pub fn gender_noun(&self, gender: Gender) -> &'static str {
        match (self, gender) {
            (Locale::English, Gender::Male) => "man",
            (Locale::English, Gender::Female) => "woman",
            (Locale::Turkish, Gender::Male) => "bir adam",
            (Locale::Turkish, Gender::Female) => "bir kadın",
        }
    }

    /// Gender as shown in the card's detail rows.
    pub fn gender_label(&self, gender: Gender) -> &'static str {
        match (self, gender) {
            (Locale::English, Gender::Male) => "Male",
            (Locale::English, Gender::Female) => "Female",
            (Locale::Turkish, Gender::Male) => "Erkek",
            (Locale::Turkish, Gender::Female) => "Kadın",
        }
    }

    /// Fill the four-slot persona template.
    pub fn compose(&self, age: u32, mood: &str, noun: &str, nickname: &str) -> String {
        match self {
            Locale::English => {
                let article = if starts_with_vowel(mood) { "an" } else { "a" };
                format!("{age} years old, {article} {mood} {noun}... Known in the scene as {nickname}!")
            }
            Locale::Turkish => {
                format!("{age} yaşında {mood} {noun}... Piyasada {nickname} olarak biliniyor! ⚡")
            }
        }
    }

    pub fn card_labels(&self) -> &'static CardLabels {
        match self {
            Locale::English => &LABELS_EN,
            Locale::Turkish => &LABELS_TR,
        }
    }

    /// Notice shown when the detector finds no face.
    pub fn no_face_notice(&self) -> &'static str {
        match self {
            Locale::English => "No face detected. Try uploading a clearer photo.",
            Locale::Turkish => "Yüz tespit edilemedi. Fotoğrafı daha net yüklemeyi deneyin 🙏",
        }
    }
}

fn starts_with_vowel(word: &str) -> bool {
    word.chars()
        .next()
        .map(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        .unwrap_or(false)
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown locale: {0} (expected \"en\" or \"tr\")")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "tr" | "turkish" => Ok(Locale::Turkish),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}
