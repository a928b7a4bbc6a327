use common::EventType;
use image::Rgb;

/// Colors of one card template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub key: &'static str,
    pub event_type: EventType,
    pub background: Rgb<u8>,
    pub border: Rgb<u8>,
    pub text: Rgb<u8>,
    pub accent: Rgb<u8>,
}

const fn hex(rgb: u32) -> Rgb<u8> {
    Rgb([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8])
}

const fn template(
    key: &'static str,
    event_type: EventType,
    background: u32,
    border: u32,
    text: u32,
    accent: u32,
) -> Template {
    Template {
        key,
        event_type,
        background: hex(background),
        border: hex(border),
        text: hex(text),
        accent: hex(accent),
    }
}

/// All templates. The first entry of each event type is its default.
pub const TEMPLATES: &[Template] = &[
    template("elegant_frame", EventType::Wedding, 0xFDF8F3, 0xD4AF37, 0x2C1810, 0xD4AF37),
    template("romantic_floral", EventType::Wedding, 0xFFF5F7, 0xE8B4BC, 0x6B2D3D, 0xD4869C),
    template("modern_minimal", EventType::Wedding, 0xFFFFFF, 0x1A1A1A, 0x1A1A1A, 0x666666),
    template("rustic_kraft", EventType::Wedding, 0xF5E6D3, 0x8B7355, 0x4A3728, 0x6B8E23),
    template("golden_elegance", EventType::Wedding, 0xFFFBF0, 0xB8860B, 0x3D2B1F, 0xC9A227),
    template("botanical_garden", EventType::Wedding, 0xF4F8F1, 0x5F7F4F, 0x2F3E2A, 0x7A9E65),
    template("midnight_romance", EventType::Wedding, 0x1B1F3B, 0xC0A062, 0xF5F0E6, 0xC0A062),
    template("confetti_party", EventType::Birthday, 0xFFF9E6, 0xFF6B9D, 0x333333, 0xFF6B9D),
    template("balloon_fun", EventType::Birthday, 0xE8F4FD, 0x4ECDC4, 0x2C3E50, 0xFF6B6B),
    template("elegant_gold", EventType::Birthday, 0x1A1A2E, 0xFFD700, 0xFFFFFF, 0xFFD700),
    template("rainbow_bright", EventType::Birthday, 0xFFFFFF, 0xFF6B6B, 0x333333, 0x4ECDC4),
    template("professional_navy", EventType::Corporate, 0x0F2744, 0x3B82F6, 0xFFFFFF, 0x60A5FA),
    template("clean_white", EventType::Corporate, 0xFFFFFF, 0xE5E7EB, 0x111827, 0x6B7280),
    template("tech_modern", EventType::Corporate, 0x111827, 0x10B981, 0xFFFFFF, 0x10B981),
    template("executive_grey", EventType::Corporate, 0xF3F4F6, 0x374151, 0x1F2937, 0x4B5563),
];

/// Templates offered for one event type, default first.
pub fn for_event_type(event_type: EventType) -> impl Iterator<Item = &'static Template> {
    TEMPLATES.iter().filter(move |t| t.event_type == event_type)
}

/// Template looked up by (event type, key), or the event type's default.
pub fn resolve(event_type: EventType, key: Option<&str>) -> &'static Template {
    key.and_then(|k| for_event_type(event_type).find(|t| t.key == k))
        .unwrap_or_else(|| default_for(event_type))
}

pub fn default_for(event_type: EventType) -> &'static Template {
    for_event_type(event_type).next().unwrap_or(&TEMPLATES[0])
}

pub fn is_known_template(event_type: EventType, key: &str) -> bool {
    for_event_type(event_type).any(|t| t.key == key)
}

pub fn header_line(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Wedding => "SHARE YOUR MEMORIES",
        EventType::Birthday => "CAPTURE THE FUN!",
        EventType::Corporate => "EVENT PHOTOS",
    }
}

pub const FOOTER_LINES: [&str; 3] = ["Scan to Upload", "Photos & Videos", "SnapVault"];

/// Printable card size preset (300 dpi).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardSize {
    #[default]
    TenByEight,
    EightBySix,
}

impl CardSize {
    pub const ALL: &'static [CardSize] = &[Self::TenByEight, Self::EightBySix];

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "10x8" => Some(Self::TenByEight),
            "8x6" => Some(Self::EightBySix),
            _ => None,
        }
    }

    /// Lookup with fallback to `10x8`.
    pub fn resolve(key: Option<&str>) -> Self {
        key.and_then(Self::from_key).unwrap_or_default()
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::TenByEight => "10x8",
            Self::EightBySix => "8x6",
        }
    }

    /// Canvas size in pixels, landscape.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::TenByEight => (3000, 2400),
            Self::EightBySix => (2400, 1800),
        }
    }
}
