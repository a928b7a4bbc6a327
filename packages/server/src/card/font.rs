use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::warn;

/// Vector font used for all card text.
#[derive(Clone)]
pub struct CardFont(FontArc);

impl CardFont {
    /// Load `path` when given, falling back to the embedded Noto Sans Bold
    /// when it is absent or unreadable.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            match std::fs::read(path).map(FontArc::try_from_vec) {
                Ok(Ok(font)) => return Ok(Self(font)),
                Ok(Err(e)) => {
                    warn!(path = %path.display(), error = %e, "Invalid card font, using embedded font")
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Card font unreadable, using embedded font")
                }
            }
        }
        Self::embedded()
    }

    pub fn embedded() -> Result<Self> {
        FontArc::try_from_slice(notosans::BOLD_TTF)
            .map(Self)
            .context("embedded card font")
    }

    /// Rendered width and height of `text` at `px` pixels tall.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        text_size(PxScale::from(px), &self.0, text)
    }

    pub fn draw(&self, canvas: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, px: f32, text: &str) {
        draw_text_mut(canvas, color, x, y, PxScale::from(px), &self.0, text);
    }
}
