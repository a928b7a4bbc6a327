//! Printable QR cards: a template-colored canvas with a header, the event
//! title, a QR code of the guest URL and a fixed footer.

pub mod font;
pub mod templates;

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use common::EventType;
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use qrcode::{Color, EcLevel, QrCode};

use self::font::CardFont;
use self::templates::{CardSize, FOOTER_LINES, Template};
use crate::entity::event;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const QR_DARK: Rgb<u8> = Rgb([0, 0, 0]);
const QR_QUIET_MODULES: u32 = 4;
const ELLIPSIS: &str = "...";

/// Everything that determines a card's pixels.
#[derive(Debug, Clone)]
pub struct CardRequest<'a> {
    pub event_type: EventType,
    pub template: Option<&'a str>,
    pub size: Option<&'a str>,
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub guest_url: &'a str,
}

/// Owned card inputs, for rendering on the blocking pool.
#[derive(Debug, Clone)]
pub struct CardJob {
    pub event_type: EventType,
    pub template: Option<String>,
    pub size: Option<String>,
    pub title: String,
    pub subtitle: Option<String>,
    pub guest_url: String,
}

impl CardJob {
    /// Card for `event` as submitted for payment. Explicit template and size
    /// win over the submitted ones, which win over the event's own template.
    pub fn for_event(
        event: &event::Model,
        template: Option<String>,
        size: Option<String>,
        fallback_url: String,
    ) -> Self {
        Self {
            event_type: event.event_type,
            template: template
                .or_else(|| event.qr_template.clone())
                .or_else(|| Some(event.template.clone())),
            size: size.or_else(|| event.qr_size.clone()),
            title: event.title.clone(),
            subtitle: event.subtitle.clone(),
            guest_url: event.guest_url.clone().unwrap_or(fallback_url),
        }
    }

    pub fn request(&self) -> CardRequest<'_> {
        CardRequest {
            event_type: self.event_type,
            template: self.template.as_deref(),
            size: self.size.as_deref(),
            title: &self.title,
            subtitle: self.subtitle.as_deref(),
            guest_url: &self.guest_url,
        }
    }
}

pub struct CardRenderer {
    font: CardFont,
}

impl CardRenderer {
    pub fn new(font_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            font: CardFont::load(font_path)?,
        })
    }

    pub fn with_font(font: CardFont) -> Self {
        Self { font }
    }

    pub fn render(&self, req: &CardRequest<'_>) -> Result<RgbImage> {
        let template = templates::resolve(req.event_type, req.template);
        let (w, h) = CardSize::resolve(req.size).dimensions();
        let mut canvas = RgbImage::from_pixel(w, h, template.background);

        self.draw_border(&mut canvas, template);

        let hf = h as f32;
        self.draw_centered(
            &mut canvas,
            templates::header_line(req.event_type),
            hf * 0.07,
            hf * 0.035,
            template.accent,
        );

        let title_px = hf * 0.07;
        let max_title_width = (w as f32 * 0.85) as u32;
        let title = fit_text(&self.font, req.title.trim(), title_px, max_title_width);
        self.draw_centered(&mut canvas, &title, hf * 0.13, title_px, template.text);

        if let Some(subtitle) = req.subtitle.map(str::trim).filter(|s| !s.is_empty()) {
            let sub_px = hf * 0.035;
            let subtitle = fit_text(&self.font, subtitle, sub_px, max_title_width);
            self.draw_centered(&mut canvas, &subtitle, hf * 0.22, sub_px, template.text);
        }

        let qr_side = (hf * 0.48) as u32;
        let qr_top = (hf * 0.29) as u32;
        draw_qr(&mut canvas, req.guest_url, (w - qr_side) / 2, qr_top, qr_side, template)?;

        let [scan, media, brand] = FOOTER_LINES;
        self.draw_centered(&mut canvas, scan, hf * 0.80, hf * 0.04, template.text);
        self.draw_centered(&mut canvas, media, hf * 0.86, hf * 0.03, template.accent);
        self.draw_centered(&mut canvas, brand, hf * 0.92, hf * 0.025, template.text);

        Ok(canvas)
    }

    /// Render and encode as PNG.
    pub fn render_png(&self, req: &CardRequest<'_>) -> Result<Vec<u8>> {
        let canvas = self.render(req)?;
        let mut buf = Vec::new();
        canvas
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .context("encode card PNG")?;
        Ok(buf)
    }

    /// [`render_png`](Self::render_png) on the blocking pool.
    pub async fn render_png_blocking(self: Arc<Self>, job: CardJob) -> Result<Vec<u8>> {
        tokio::task::spawn_blocking(move || self.render_png(&job.request()))
            .await
            .context("card render task panicked")?
    }

    /// Outer band in the border color, then a thin inner rule in the accent.
    fn draw_border(&self, canvas: &mut RgbImage, template: &Template) {
        let (w, h) = canvas.dimensions();
        let t = (w.max(h) / 100).max(1);
        for rect in frame_rects(0, 0, w, h, t) {
            draw_filled_rect_mut(canvas, rect, template.border);
        }
        let inset = t * 2;
        let rule = (t / 4).max(1);
        for rect in frame_rects(inset, inset, w - 2 * inset, h - 2 * inset, rule) {
            draw_filled_rect_mut(canvas, rect, template.accent);
        }
    }

    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, y: f32, px: f32, color: Rgb<u8>) {
        if text.is_empty() {
            return;
        }
        let (text_w, _) = self.font.measure(text, px);
        let x = (canvas.width() as i32 - text_w as i32) / 2;
        self.font.draw(canvas, color, x, y as i32, px, text);
    }
}

/// Four rectangles forming a frame of thickness `t` around the given box.
fn frame_rects(x: u32, y: u32, w: u32, h: u32, t: u32) -> [Rect; 4] {
    let (x, y) = (x as i32, y as i32);
    [
        Rect::at(x, y).of_size(w, t),
        Rect::at(x, y + h as i32 - t as i32).of_size(w, t),
        Rect::at(x, y).of_size(t, h),
        Rect::at(x + w as i32 - t as i32, y).of_size(t, h),
    ]
}

/// Drop trailing characters until `text` plus an ellipsis fits `max_width`.
/// Text that already fits is returned unchanged.
pub fn fit_text(font: &CardFont, text: &str, px: f32, max_width: u32) -> String {
    if font.measure(text, px).0 <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + ELLIPSIS;
        if font.measure(&candidate, px).0 <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

/// High error correction QR on a white pad with a thin border-colored outline.
fn draw_qr(
    canvas: &mut RgbImage,
    data: &str,
    x: u32,
    y: u32,
    side: u32,
    template: &Template,
) -> Result<()> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::H)
        .context("encode guest URL as QR code")?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let outline = (side / 120).max(1);
    draw_filled_rect_mut(
        canvas,
        Rect::at((x - outline) as i32, (y - outline) as i32)
            .of_size(side + 2 * outline, side + 2 * outline),
        template.border,
    );
    draw_filled_rect_mut(canvas, Rect::at(x as i32, y as i32).of_size(side, side), WHITE);

    let module_px = (side / (modules + 2 * QR_QUIET_MODULES)).max(1);
    let drawn = module_px * modules;
    let origin_x = x + (side - drawn) / 2;
    let origin_y = y + (side - drawn) / 2;

    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let col = i as u32 % modules;
        let row = i as u32 / modules;
        let rect = Rect::at(
            (origin_x + col * module_px) as i32,
            (origin_y + row * module_px) as i32,
        )
        .of_size(module_px, module_px);
        draw_filled_rect_mut(canvas, rect, QR_DARK);
    }
    Ok(())
}
