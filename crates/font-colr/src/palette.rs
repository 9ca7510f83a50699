//! Color palette shared by every fill in a compile.

use indexmap::IndexSet;

use crate::error::{Error, Result};

/// Highest number of entries a palette can hold; index `0xFFFF` is reserved
/// for the text foreground color.
pub const MAX_PALETTE_ENTRIES: usize = 0xFFFF;

/// An 8-bit RGBA palette entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ColorRecord {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl ColorRecord {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Distinct colors in first-seen order.
///
/// Colors are compared as literal strings, so `#fff` and `#ffffff` take two
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: IndexSet<String>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `color`, adding it if it has not been seen yet.
    pub fn index_of(&mut self, color: &str) -> Result<u16> {
        if let Some(idx) = self.colors.get_index_of(color) {
            return Ok(idx as u16);
        }
        if self.colors.len() >= MAX_PALETTE_ENTRIES {
            return Err(Error::PaletteFull {
                color: color.to_string(),
            });
        }
        let (idx, _) = self.colors.insert_full(color.to_string());
        Ok(idx as u16)
    }

    pub fn colors(&self) -> impl Iterator<Item = &str> + '_ {
        self.colors.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Every color as an RGBA record, in palette order.
    pub fn color_records(&self) -> Result<Vec<ColorRecord>> {
        self.colors.iter().map(|color| parse_color(color)).collect()
    }
}

/// Parse a CSS-style color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`,
/// `rgb(r, g, b)`, `rgba(r, g, b, a)` or one of a few basic names.
pub fn parse_color(color: &str) -> Result<ColorRecord> {
    let invalid = |message: &str| Error::InvalidColor {
        color: color.to_string(),
        message: message.to_string(),
    };
    let text = color.trim().to_ascii_lowercase();

    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| invalid("expected 3, 4, 6 or 8 hex digits"));
    }
    if let Some(args) = text
        .strip_prefix("rgba(")
        .or_else(|| text.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args).ok_or_else(|| invalid("expected 3 or 4 numeric components"));
    }
    named_color(&text).ok_or_else(|| invalid("unknown color syntax"))
}

fn parse_hex(hex: &str) -> Option<ColorRecord> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok().map(|v| v * 17);
    let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        3 => Some(ColorRecord::new(nibble(0)?, nibble(1)?, nibble(2)?, 255)),
        4 => Some(ColorRecord::new(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(ColorRecord::new(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(ColorRecord::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb_args(args: &str) -> Option<ColorRecord> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |part: &str| -> Option<u8> {
        let value = match part.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().ok()? * 2.55,
            None => part.parse::<f64>().ok()?,
        };
        Some(value.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(part) => {
            let value: f64 = part.parse().ok()?;
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };
    Some(ColorRecord::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

fn named_color(name: &str) -> Option<ColorRecord> {
    let record = match name {
        "black" => ColorRecord::new(0, 0, 0, 255),
        "white" => ColorRecord::new(255, 255, 255, 255),
        "red" => ColorRecord::new(255, 0, 0, 255),
        "green" => ColorRecord::new(0, 128, 0, 255),
        "blue" => ColorRecord::new(0, 0, 255, 255),
        "transparent" => ColorRecord::new(0, 0, 0, 0),
        _ => return None,
    };
    Some(record)
}
