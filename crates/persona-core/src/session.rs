//! Analysis session: the select → analyze → display state machine.
//!
//! ```text
//! NoImage ──select──▶ ImageSelected ──begin──▶ Analyzing ──Detected──▶ Analyzed
//!                          ▲                       │
//!                          └──────NotDetected──────┘
//! ```
//!
//! The session owns the current [`AnalysisRecord`] and the persona derived
//! from it and only ever replaces them as whole values. Every analysis is
//! issued as an [`AnalysisTicket`] bound to the image it was started for;
//! completions for a ticket that is no longer current are dropped, so a
//! slow result can never land on a newer image.

use crate::analyzer::FaceAnalyzer;
use crate::persona::{NicknamePicker, Persona, PersonaGenerator, RandomPicker};
use crate::types::{AnalysisRecord, DetectionOutcome, PersonaError};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no image selected")]
    NoImage,
    #[error("an analysis is already in progress for this image")]
    AnalysisInProgress,
}

/// Identity of one image selection. Re-selecting the same file yields a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(u64);

impl std::fmt::Display for ImageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoImage,
    ImageSelected,
    Analyzing,
    Analyzed,
}

/// Handle for one in-flight analysis.
#[derive(Debug, Clone)]
pub struct AnalysisTicket<I> {
    image_id: ImageId,
    seq: u64,
    image: I,
}

impl<I> AnalysisTicket<I> {
    pub fn image_id(&self) -> ImageId {
        self.image_id
    }

    /// The image this analysis was issued against.
    pub fn image(&self) -> &I {
        &self.image
    }
}

/// What a completed analysis did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// A new record and persona are in place.
    Analyzed,
    /// No face; the session is back where the analysis started.
    NoFace,
    /// The ticket was superseded; the result was discarded.
    Stale,
}

struct Selected<I> {
    id: ImageId,
    image: I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Analyzing { seq: u64 },
    Analyzed,
}

pub struct Session<I, P = RandomPicker> {
    generator: PersonaGenerator,
    picker: P,
    next_image: u64,
    next_seq: u64,
    image: Option<Selected<I>>,
    phase: Phase,
    record: Option<AnalysisRecord>,
    persona: Option<Persona>,
}

impl<I, P: NicknamePicker> Session<I, P> {
    pub fn new(generator: PersonaGenerator, picker: P) -> Self {
        Self {
            generator,
            picker,
            next_image: 0,
            next_seq: 0,
            image: None,
            phase: Phase::Idle,
            record: None,
            persona: None,
        }
    }

    pub fn state(&self) -> SessionState {
        match (&self.image, self.phase) {
            (None, _) => SessionState::NoImage,
            (Some(_), Phase::Idle) => SessionState::ImageSelected,
            (Some(_), Phase::Analyzing { .. }) => SessionState::Analyzing,
            (Some(_), Phase::Analyzed) => SessionState::Analyzed,
        }
    }

    pub fn generator(&self) -> &PersonaGenerator {
        &self.generator
    }

    pub fn image(&self) -> Option<&I> {
        self.image.as_ref().map(|s| &s.image)
    }

    pub fn image_id(&self) -> Option<ImageId> {
        self.image.as_ref().map(|s| s.id)
    }

    pub fn record(&self) -> Option<&AnalysisRecord> {
        self.record.as_ref()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }

    /// Select a new image, discarding any previous analysis.
    pub fn select_image(&mut self, image: I) -> ImageId {
        self.next_image += 1;
        let id = ImageId(self.next_image);
        if self.record.is_some() {
            tracing::debug!(?id, "new image selected; discarding previous analysis");
        }
        self.image = Some(Selected { id, image });
        self.phase = Phase::Idle;
        self.record = None;
        self.persona = None;
        id
    }

    /// Drop the image and any analysis.
    pub fn clear(&mut self) {
        self.image = None;
        self.phase = Phase::Idle;
        self.record = None;
        self.persona = None;
    }

    /// Start analyzing the selected image.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket<I>, SessionError>
    where
        I: Clone,
    {
        let selected = self.image.as_ref().ok_or(SessionError::NoImage)?;
        if matches!(self.phase, Phase::Analyzing { .. }) {
            return Err(SessionError::AnalysisInProgress);
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        self.phase = Phase::Analyzing { seq };
        tracing::debug!(image = ?selected.id, seq, "analysis started");

        Ok(AnalysisTicket {
            image_id: selected.id,
            seq,
            image: selected.image.clone(),
        })
    }

    fn is_current<T>(&self, ticket: &AnalysisTicket<T>) -> bool {
        self.image.as_ref().map(|s| s.id) == Some(ticket.image_id)
            && self.phase == Phase::Analyzing { seq: ticket.seq }
    }

    /// Return to the state the analysis started from.
    fn restore_phase(&mut self) {
        self.phase = if self.record.is_some() {
            Phase::Analyzed
        } else {
            Phase::Idle
        };
    }

    /// Apply the detector's answer for `ticket`.
    pub fn complete_analysis<T>(
        &mut self,
        ticket: &AnalysisTicket<T>,
        outcome: DetectionOutcome,
    ) -> Completion {
        if !self.is_current(ticket) {
            tracing::debug!(image = ?ticket.image_id, seq = ticket.seq, "discarding stale analysis result");
            return Completion::Stale;
        }

        match outcome {
            DetectionOutcome::Detected(record) => {
                let persona = self.generator.generate(
                    record.rounded_age(),
                    record.gender(),
                    record.dominant_expression(),
                    &mut self.picker,
                );
                tracing::info!(
                    age = record.rounded_age(),
                    gender = %record.gender(),
                    expression = record.dominant_expression(),
                    "analysis complete"
                );
                self.record = Some(record);
                self.persona = Some(persona);
                self.phase = Phase::Analyzed;
                Completion::Analyzed
            }
            DetectionOutcome::NotDetected => {
                tracing::info!(image = ?ticket.image_id, "no face detected");
                self.restore_phase();
                Completion::NoFace
            }
        }
    }

    /// Abandon `ticket` after a backend failure. Returns `false` if the
    /// ticket was already stale.
    pub fn abort_analysis<T>(&mut self, ticket: &AnalysisTicket<T>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.restore_phase();
        true
    }

    /// Draw a fresh persona for the current record.
    pub fn reroll_persona(&mut self) -> Result<&Persona, PersonaError> {
        let persona = self
            .generator
            .for_record(self.record.as_ref(), &mut self.picker)?;
        Ok(self.persona.insert(persona))
    }

    /// Run a complete analysis synchronously against `analyzer`.
    pub fn analyze_with<A>(&mut self, analyzer: &mut A) -> Result<Completion, AnalyzeError<A::Error>>
    where
        A: FaceAnalyzer,
        I: Clone + AsRef<RgbImage>,
    {
        let ticket = self.begin_analysis()?;
        match analyzer.analyze(ticket.image().as_ref()) {
            Ok(outcome) => Ok(self.complete_analysis(&ticket, outcome)),
            Err(e) => {
                self.abort_analysis(&ticket);
                Err(AnalyzeError::Backend(e))
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum AnalyzeError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("face analysis failed: {0}")]
    Backend(#[source] E),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locale;
    use crate::types::{ExpressionScores, Gender};
    use std::sync::Arc;

    /// Cycles through pool indices so consecutive draws differ.
    struct CountingPicker(usize);

    impl NicknamePicker for CountingPicker {
        fn pick(&mut self, len: usize) -> usize {
            let i = self.0 % len;
            self.0 += 1;
            i
        }
    }

    fn session() -> Session<&'static str, CountingPicker> {
        Session::new(PersonaGenerator::new(Locale::English), CountingPicker(0))
    }

    fn detected(age: f32) -> DetectionOutcome {
        let scores: ExpressionScores =
            [("happy", 0.6), ("neutral", 0.6), ("sad", 0.1)].into_iter().collect();
        DetectionOutcome::Detected(AnalysisRecord::new(age, Gender::Male, scores).unwrap())
    }

    #[test]
    fn test_starts_without_image() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::NoImage);
        assert_eq!(s.begin_analysis().unwrap_err(), SessionError::NoImage);
    }

    #[test]
    fn test_successful_analysis() {
        let mut s = session();
        s.select_image("face.jpg");
        assert_eq!(s.state(), SessionState::ImageSelected);

        let ticket = s.begin_analysis().unwrap();
        assert_eq!(s.state(), SessionState::Analyzing);
        assert_eq!(*ticket.image(), "face.jpg");

        assert_eq!(s.complete_analysis(&ticket, detected(27.4)), Completion::Analyzed);
        assert_eq!(s.state(), SessionState::Analyzed);
        assert_eq!(s.record().unwrap().rounded_age(), 27);

        let persona = s.persona().unwrap();
        assert_eq!(persona.age, 27);
        assert_eq!(persona.mood, "cheerful");
        assert_eq!(persona.noun, "man");
    }

    #[test]
    fn test_ticket_carries_selected_image_id() {
        let mut s = session();
        assert_eq!(s.image_id(), None);
        let first = s.select_image("a.jpg");
        let second = s.select_image("a.jpg");
        assert_ne!(first, second);
        assert_eq!(s.image_id(), Some(second));
        assert_eq!(second.to_string(), "#2");

        let ticket = s.begin_analysis().unwrap();
        assert_eq!(ticket.image_id(), second);
    }

    #[test]
    fn test_no_face_returns_to_image_selected() {
        let mut s = session();
        s.select_image("landscape.jpg");
        let ticket = s.begin_analysis().unwrap();

        assert_eq!(s.complete_analysis(&ticket, DetectionOutcome::NotDetected), Completion::NoFace);
        assert_eq!(s.state(), SessionState::ImageSelected);
        assert!(s.record().is_none());
        assert!(s.persona().is_none());
    }

    #[test]
    fn test_no_face_keeps_prior_record() {
        let mut s = session();
        s.select_image("face.jpg");
        let first = s.begin_analysis().unwrap();
        s.complete_analysis(&first, detected(30.0));
        let record = s.record().cloned();
        let persona = s.persona().cloned();

        let again = s.begin_analysis().unwrap();
        assert_eq!(s.complete_analysis(&again, DetectionOutcome::NotDetected), Completion::NoFace);
        assert_eq!(s.state(), SessionState::Analyzed);
        assert_eq!(s.record().cloned(), record);
        assert_eq!(s.persona().cloned(), persona);
    }

    #[test]
    fn test_reselect_clears_analysis() {
        let mut s = session();
        let first_id = s.select_image("a.jpg");
        let ticket = s.begin_analysis().unwrap();
        s.complete_analysis(&ticket, detected(40.0));
        assert_eq!(s.state(), SessionState::Analyzed);

        let second_id = s.select_image("b.jpg");
        assert_ne!(first_id, second_id);
        assert_eq!(s.state(), SessionState::ImageSelected);
        assert!(s.record().is_none());
        assert!(s.persona().is_none());
        assert_eq!(s.image(), Some(&"b.jpg"));
    }

    #[test]
    fn test_result_for_replaced_image_is_stale() {
        let mut s = session();
        s.select_image("a.jpg");
        let ticket = s.begin_analysis().unwrap();

        s.select_image("b.jpg");
        assert_eq!(s.complete_analysis(&ticket, detected(22.0)), Completion::Stale);
        assert_eq!(s.state(), SessionState::ImageSelected);
        assert!(s.record().is_none());
    }

    #[test]
    fn test_result_for_same_file_reselected_is_stale() {
        let mut s = session();
        s.select_image("a.jpg");
        let ticket = s.begin_analysis().unwrap();
        s.select_image("a.jpg");
        assert_eq!(s.complete_analysis(&ticket, detected(22.0)), Completion::Stale);
    }

    #[test]
    fn test_aborted_ticket_cannot_complete_later() {
        let mut s = session();
        s.select_image("a.jpg");
        let first = s.begin_analysis().unwrap();
        assert!(s.abort_analysis(&first));
        assert_eq!(s.state(), SessionState::ImageSelected);

        let second = s.begin_analysis().unwrap();
        assert_eq!(s.complete_analysis(&first, detected(50.0)), Completion::Stale);
        assert_eq!(s.complete_analysis(&second, detected(51.0)), Completion::Analyzed);
        assert_eq!(s.record().unwrap().rounded_age(), 51);
        assert!(!s.abort_analysis(&second));
    }

    #[test]
    fn test_second_begin_while_analyzing_is_rejected() {
        let mut s = session();
        s.select_image("a.jpg");
        let _ticket = s.begin_analysis().unwrap();
        assert_eq!(s.begin_analysis().unwrap_err(), SessionError::AnalysisInProgress);
    }

    #[test]
    fn test_reroll_draws_new_nickname() {
        let mut s = session();
        assert_eq!(s.reroll_persona().unwrap_err(), PersonaError::NoResult);

        s.select_image("a.jpg");
        let ticket = s.begin_analysis().unwrap();
        s.complete_analysis(&ticket, detected(33.0));
        let before = s.persona().unwrap().nickname.clone();
        let after = s.reroll_persona().unwrap().nickname.clone();
        assert_ne!(before, after);
        assert_eq!(s.persona().unwrap().nickname, after);
    }

    #[test]
    fn test_clear_returns_to_no_image() {
        let mut s = session();
        s.select_image("a.jpg");
        let ticket = s.begin_analysis().unwrap();
        s.clear();
        assert_eq!(s.state(), SessionState::NoImage);
        assert_eq!(s.complete_analysis(&ticket, detected(20.0)), Completion::Stale);
        assert!(s.record().is_none());
    }

    #[derive(Debug, thiserror::Error)]
    #[error("backend exploded")]
    struct Boom;

    struct FakeAnalyzer(Option<DetectionOutcome>);

    impl FaceAnalyzer for FakeAnalyzer {
        type Error = Boom;

        fn analyze(&mut self, image: &RgbImage) -> Result<DetectionOutcome, Boom> {
            assert_eq!(image.dimensions(), (4, 4));
            self.0.clone().ok_or(Boom)
        }
    }

    #[test]
    fn test_analyze_with_backend() {
        let mut s: Session<Arc<RgbImage>, _> =
            Session::new(PersonaGenerator::new(Locale::Turkish), CountingPicker(0));
        s.select_image(Arc::new(RgbImage::new(4, 4)));

        let mut analyzer = FakeAnalyzer(Some(detected(27.4)));
        assert_eq!(s.analyze_with(&mut analyzer).unwrap(), Completion::Analyzed);
        assert!(s.persona().unwrap().text.starts_with("27 yaşında neşeli bir adam"));
    }

    #[test]
    fn test_analyze_with_failing_backend_restores_state() {
        let mut s: Session<Arc<RgbImage>, _> =
            Session::new(PersonaGenerator::default(), CountingPicker(0));
        s.select_image(Arc::new(RgbImage::new(4, 4)));

        let err = s.analyze_with(&mut FakeAnalyzer(None)).unwrap_err();
        assert!(matches!(err, AnalyzeError::Backend(Boom)));
        assert_eq!(s.state(), SessionState::ImageSelected);

        // The session accepts a new analysis afterwards.
        let ticket = s.begin_analysis().unwrap();
        assert_eq!(s.complete_analysis(&ticket, DetectionOutcome::NotDetected), Completion::NoFace);
    }
}
