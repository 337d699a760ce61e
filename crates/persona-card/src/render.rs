//! Card rasterization.
//!
//! Layout is computed in logical pixels (two 320 px columns: photo on the
//! left, analysis text on the right) and painted at [`EXPORT_SCALE`] times
//! that size over a solid [`BACKGROUND`].

use crate::card::Card;
use crate::export::CardError;
use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

pub const EXPORT_SCALE: u32 = 2;
pub const BACKGROUND: Rgb<u8> = Rgb([0x1e, 0x1e, 0x1e]);

const TEXT_COLOR: Rgb<u8> = Rgb([0xf0, 0xf0, 0xf0]);
const MUTED_COLOR: Rgb<u8> = Rgb([0xaa, 0xaa, 0xaa]);

const PADDING: u32 = 20;
const GAP: u32 = 20;
const COLUMN_WIDTH: u32 = 320;
/// Tallest the photo may be drawn; extreme aspect ratios are letterboxed.
const MAX_PHOTO_HEIGHT: u32 = COLUMN_WIDTH * 2;
const LINE_SPACING: f32 = 1.4;

const TITLE_SIZE: f32 = 28.0;
const HEADING_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 16.0;
const PERSONA_SIZE: f32 = 18.0;
const FOOTER_SIZE: f32 = 12.0;

/// Average glyph advance as a fraction of the font size, used to wrap text
/// when no font is loaded.
const FALLBACK_ADVANCE: f32 = 0.55;

/// Fonts tried, in order, when none is configured.
pub const SYSTEM_FONT_CANDIDATES: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Load a TrueType/OpenType font from disk.
pub fn load_font(path: &Path) -> Result<FontArc, CardError> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes).map_err(|e| CardError::Font(format!("{}: {e}", path.display())))
}

/// First loadable font among `configured` and the system candidates.
pub fn find_font(configured: Option<&Path>) -> Option<FontArc> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_font(&path) {
            Ok(font) => {
                tracing::debug!(path = %path.display(), "card font loaded");
                return Some(font);
            }
            Err(e) => tracing::warn!(error = %e, "skipping unusable font"),
        }
    }
    None
}

/// Scale `(w, h)` to fit the photo column, at most [`MAX_PHOTO_HEIGHT`]
/// tall. Empty images place as `(0, 0)`.
fn fit_photo((w, h): (u32, u32)) -> (u32, u32) {
    if w == 0 || h == 0 {
        return (0, 0);
    }
    let scale = (COLUMN_WIDTH as f64 / w as f64).min(MAX_PHOTO_HEIGHT as f64 / h as f64);
    let width = ((w as f64 * scale).round() as u32).clamp(1, COLUMN_WIDTH);
    let height = ((h as f64 * scale).round() as u32).clamp(1, MAX_PHOTO_HEIGHT);
    (width, height)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub size: f32,
    pub color: Rgb<u8>,
}

/// Card geometry in logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub photo: Placement,
    pub lines: Vec<TextLine>,
}

pub struct CardRenderer {
    font: Option<FontArc>,
}

impl CardRenderer {
    pub fn new(font: Option<FontArc>) -> Self {
        if font.is_none() {
            tracing::warn!("no font available; cards will be exported without text");
        }
        Self { font }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Logical width of `text` at `size`.
    fn measure(&self, text: &str, size: f32) -> u32 {
        match &self.font {
            Some(font) => text_size(PxScale::from(size), font, text).0,
            None => (text.chars().count() as f32 * size * FALLBACK_ADVANCE).ceil() as u32,
        }
    }

    /// Greedy word wrap to `max_width`. Words wider than a line stay whole.
    fn wrap(&self, text: &str, size: f32, max_width: u32) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in text.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if !current.is_empty() && self.measure(&candidate, size) > max_width {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    pub fn layout(&self, card: &Card) -> Layout {
        let line_height = |size: f32| (size * LINE_SPACING).ceil() as u32;
        let mut lines = Vec::new();

        lines.push(TextLine {
            text: card.title().to_string(),
            x: PADDING,
            y: PADDING,
            size: TITLE_SIZE,
            color: TEXT_COLOR,
        });
        let body_top = PADDING + line_height(TITLE_SIZE) + GAP;

        let (width, height) = fit_photo(card.photo().dimensions());
        let photo = Placement {
            x: PADDING + (COLUMN_WIDTH - width) / 2,
            y: body_top,
            width,
            height,
        };

        let text_x = PADDING + COLUMN_WIDTH + GAP;
        let mut y = body_top;
        let mut push = |text: String, size: f32, color: Rgb<u8>, y: &mut u32| {
            lines.push(TextLine { text, x: text_x, y: *y, size, color });
            *y += line_height(size);
        };

        push(card.result_heading().to_string(), HEADING_SIZE, TEXT_COLOR, &mut y);
        for (label, value) in card.details() {
            push(format!("{label}: {value}"), BODY_SIZE, TEXT_COLOR, &mut y);
        }
        y += GAP;
        push(card.persona_heading().to_string(), HEADING_SIZE, TEXT_COLOR, &mut y);
        for line in self.wrap(card.persona(), PERSONA_SIZE, COLUMN_WIDTH) {
            push(line, PERSONA_SIZE, TEXT_COLOR, &mut y);
        }
        y += GAP;
        push(card.footer().to_string(), FOOTER_SIZE, MUTED_COLOR, &mut y);

        let body_bottom = y.max(photo.y + photo.height);
        Layout {
            width: PADDING * 2 + COLUMN_WIDTH * 2 + GAP,
            height: body_bottom + PADDING,
            photo,
            lines,
        }
    }

    /// Paint the card at [`EXPORT_SCALE`].
    pub fn render(&self, card: &Card) -> RgbImage {
        let layout = self.layout(card);
        let s = EXPORT_SCALE;
        let mut canvas = RgbImage::from_pixel(layout.width * s, layout.height * s, BACKGROUND);

        let p = layout.photo;
        if p.width > 0 && p.height > 0 {
            let photo = imageops::resize(card.photo(), p.width * s, p.height * s, FilterType::CatmullRom);
            imageops::overlay(&mut canvas, &photo, (p.x * s) as i64, (p.y * s) as i64);

            // Frame, one logical pixel outside the photo.
            for i in 0..s {
                let inset = (s + i) as i32;
                let rect = Rect::at((p.x * s) as i32 - inset, (p.y * s) as i32 - inset)
                    .of_size(p.width * s + 2 * inset as u32, p.height * s + 2 * inset as u32);
                draw_hollow_rect_mut(&mut canvas, rect, MUTED_COLOR);
            }
        }

        if let Some(font) = &self.font {
            for line in &layout.lines {
                draw_text_mut(
                    &mut canvas,
                    line.color,
                    (line.x * s) as i32,
                    (line.y * s) as i32,
                    PxScale::from(line.size * s as f32),
                    font,
                    &line.text,
                );
            }
        }

        tracing::debug!(width = canvas.width(), height = canvas.height(), "card rendered");
        canvas
    }
}
