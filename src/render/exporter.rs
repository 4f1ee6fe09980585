use std::io::Cursor;

use image::{ImageOutputFormat, RgbaImage};

use crate::core::error::{AppError, AppResult};

pub const FALLBACK_NAME: &str = "qrcode";

/// A rendered PNG ready to be offered for download.
#[derive(Debug, Clone)]
pub struct Export {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// File-name slug: runs of anything but ASCII letters and digits become one
/// underscore, edges are trimmed, the result is lowercased and cut to
/// `max_len` characters. Empty results fall back to `qrcode`.
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len().min(max_len));
    let mut pending_sep = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }

    slug.truncate(max_len);
    let slug = slug.trim_end_matches('_');
    if slug.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        slug.to_string()
    }
}

pub fn file_name_for(text: &str, max_len: usize) -> String {
    format!("{}.png", slugify(text, max_len))
}

pub fn encode_png(image: &RgbaImage) -> AppResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageOutputFormat::Png)
        .map_err(|e| AppError::Export(e.to_string()))?;
    Ok(out.into_inner())
}
