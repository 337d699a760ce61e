//! persona-card — Shareable analysis cards.
//!
//! A [`Card`] pairs the analyzed photo with its age, gender, expression and
//! persona text. [`CardRenderer`] lays it out and paints it at twice the
//! logical size; [`CardExporter`] encodes the result as PNG and hands it to
//! an [`ExportSink`].

pub mod card;
pub mod export;
pub mod render;

pub use card::Card;
pub use export::{encode_png, CardError, CardExporter, DirectorySink, ExportSink, CARD_FILENAME};
pub use render::{find_font, load_font, CardRenderer, Layout, BACKGROUND, EXPORT_SCALE};
