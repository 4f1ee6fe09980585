use image::{Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use crate::core::error::{AppError, AppResult};
use crate::core::models::{RenderParams, Rgb};

/// Everything the symbol encoder needs for one raster.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub value: String,
    pub size: u32,
    pub foreground: Rgb,
    pub background: Rgb,
    pub level: EcLevel,
    /// Pixels of background between the canvas edge and the symbol.
    pub padding: u32,
}

impl EncodeRequest {
    /// Logos cover part of the symbol, so the highest correction level is always used.
    pub fn from_params(params: &RenderParams) -> Self {
        Self {
            value: params.text.clone(),
            size: params.size,
            foreground: params.fg,
            background: params.bg,
            level: EcLevel::H,
            padding: params.border,
        }
    }
}

/// Turns text into a QR raster of exactly `size`×`size` pixels.
#[cfg_attr(test, mockall::automock)]
pub trait SymbolEncoder: Send + Sync {
    fn encode(&self, request: &EncodeRequest) -> AppResult<RgbaImage>;
}

/// [`SymbolEncoder`] backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl SymbolEncoder for QrEncoder {
    fn encode(&self, request: &EncodeRequest) -> AppResult<RgbaImage> {
        let code = QrCode::with_error_correction_level(request.value.as_bytes(), request.level)
            .map_err(|e| AppError::Encoder(e.to_string()))?;

        let modules = code.width() as u32;
        let colors = code.to_colors();
        let size = request.size;
        let fg = request.foreground.to_rgba();
        let bg = request.background.to_rgba();

        let inner = size.saturating_sub(request.padding.saturating_mul(2)).max(1);
        let module_px = inner / modules;

        debug!(
            size,
            modules,
            module_px,
            padding = request.padding,
            version = ?code.version(),
            "Rasterizing QR symbol"
        );

        let mut img = RgbaImage::from_pixel(size, size, bg);
        let is_dark = |mx: u32, my: u32| colors[(my * modules + mx) as usize] == Color::Dark;

        if module_px >= 1 {
            // Whole-pixel modules, centered inside the padded square.
            let drawn = modules * module_px;
            let offset = (size - drawn) / 2;
            for my in 0..modules {
                for mx in 0..modules {
                    if !is_dark(mx, my) {
                        continue;
                    }
                    fill(&mut img, offset + mx * module_px, offset + my * module_px, module_px, fg);
                }
            }
        } else {
            // Symbol larger than the area: sample the grid proportionally.
            let offset = (size - inner) / 2;
            for py in 0..inner {
                let my = py * modules / inner;
                for px in 0..inner {
                    let mx = px * modules / inner;
                    if is_dark(mx, my) {
                        img.put_pixel(offset + px, offset + py, fg);
                    }
                }
            }
        }

        Ok(img)
    }
}

fn fill(img: &mut RgbaImage, x: u32, y: u32, side: u32, color: Rgba<u8>) {
    for yy in y..y + side {
        for xx in x..x + side {
            img.put_pixel(xx, yy, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(value: &str, size: u32, padding: u32) -> EncodeRequest {
        EncodeRequest {
            value: value.to_string(),
            size,
            foreground: Rgb::BLACK,
            background: Rgb::WHITE,
            level: EcLevel::H,
            padding,
        }
    }

    #[test]
    fn test_exact_dimensions() {
        for size in [128, 333, 400, 1200] {
            let img = QrEncoder.encode(&request("https://example.com", size, 4)).unwrap();
            assert_eq!(img.dimensions(), (size, size));
        }
    }

    #[test]
    fn test_padding_is_background() {
        let img = QrEncoder.encode(&request("padding", 400, 20)).unwrap();
        let white = Rgba([255, 255, 255, 255]);
        for i in 0..400 {
            for d in 0..20 {
                assert_eq!(*img.get_pixel(i, d), white);
                assert_eq!(*img.get_pixel(d, i), white);
                assert_eq!(*img.get_pixel(i, 399 - d), white);
                assert_eq!(*img.get_pixel(399 - d, i), white);
            }
        }
    }

    #[test]
    fn test_uses_requested_colors() {
        let mut req = request("colors", 256, 0);
        req.foreground = Rgb::new(200, 0, 0);
        req.background = Rgb::new(0, 0, 200);
        let img = QrEncoder.encode(&req).unwrap();

        let mut seen_fg = false;
        for p in img.pixels() {
            assert!(*p == Rgba([200, 0, 0, 255]) || *p == Rgba([0, 0, 200, 255]));
            seen_fg |= *p == Rgba([200, 0, 0, 255]);
        }
        assert!(seen_fg);
    }

    #[test]
    fn test_oversized_payload_is_encoder_error() {
        let huge = "x".repeat(4000);
        let err = QrEncoder.encode(&request(&huge, 400, 4)).unwrap_err();
        assert!(matches!(err, AppError::Encoder(_)));
    }

    #[test]
    fn test_dense_symbol_on_small_canvas_still_fits() {
        // Version 40-ish symbols have more modules than a 128 px canvas has pixels.
        let long = "A".repeat(1200);
        let img = QrEncoder.encode(&request(&long, 128, 0)).unwrap();
        assert_eq!(img.dimensions(), (128, 128));
    }

    #[test]
    fn test_deterministic() {
        let a = QrEncoder.encode(&request("same", 300, 4)).unwrap();
        let b = QrEncoder.encode(&request("same", 300, 4)).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
