//! Logo overlay on top of the encoder's raster.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::core::config::{Backdrop, RenderDefaults};
use crate::core::models::{LogoAsset, RenderParams};

/// Pixel rectangle on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeStyle {
    pub backdrop: Backdrop,
    pub margin: u32,
}

impl From<&RenderDefaults> for CompositeStyle {
    fn from(defaults: &RenderDefaults) -> Self {
        Self {
            backdrop: defaults.backdrop,
            margin: defaults.backdrop_margin,
        }
    }
}

/// Where a `logo_w`×`logo_h` logo lands on a `canvas`-sized square.
///
/// The logo is fitted into a square of `canvas * scale` pixels keeping its
/// aspect ratio, then centered. `None` means no overlay.
pub fn logo_rect(canvas: u32, scale: f32, logo_w: u32, logo_h: u32) -> Option<Rect> {
    if !(scale > 0.0) || logo_w == 0 || logo_h == 0 || canvas == 0 {
        return None;
    }

    let target = f64::from(canvas) * f64::from(scale);
    let fit = (target / f64::from(logo_w)).min(target / f64::from(logo_h));
    let width = ((f64::from(logo_w) * fit).round() as u32).clamp(1, canvas);
    let height = ((f64::from(logo_h) * fit).round() as u32).clamp(1, canvas);

    Some(Rect {
        x: (canvas - width) / 2,
        y: (canvas - height) / 2,
        width,
        height,
    })
}

/// Draw `logo` centered on `base`. The base raster is consumed and returned.
pub fn compose(
    mut base: RgbaImage,
    logo: Option<&LogoAsset>,
    params: &RenderParams,
    style: CompositeStyle,
) -> RgbaImage {
    let Some(logo) = logo else {
        return base;
    };
    let canvas = base.width().min(base.height());
    let Some(rect) = logo_rect(canvas, params.logo_scale, logo.width, logo.height) else {
        debug!(scale = params.logo_scale, "Logo overlay skipped");
        return base;
    };

    debug!(
        x = rect.x,
        y = rect.y,
        width = rect.width,
        height = rect.height,
        backdrop = ?style.backdrop,
        "Compositing logo"
    );

    let bg = params.bg.to_rgba();
    match style.backdrop {
        Backdrop::None => {}
        Backdrop::Circle => paint_circle(&mut base, rect, style.margin, bg),
        Backdrop::Rounded => paint_rounded(&mut base, rect, style.margin, bg),
    }

    let resized = imageops::resize(&logo.image, rect.width, rect.height, FilterType::Lanczos3);
    imageops::overlay(&mut base, &resized, i64::from(rect.x), i64::from(rect.y));
    base
}

fn paint_circle(img: &mut RgbaImage, rect: Rect, margin: u32, color: Rgba<u8>) {
    let (cx, cy) = rect.center();
    let radius = f64::from(rect.width.max(rect.height)) / 2.0 + f64::from(margin);
    let r2 = radius * radius;

    let (x0, y0, x1, y1) = bounds(img, cx - radius, cy - radius, cx + radius, cy + radius);
    for y in y0..y1 {
        for x in x0..x1 {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn paint_rounded(img: &mut RgbaImage, rect: Rect, margin: u32, color: Rgba<u8>) {
    let left = f64::from(rect.x) - f64::from(margin);
    let top = f64::from(rect.y) - f64::from(margin);
    let right = f64::from(rect.x + rect.width) + f64::from(margin);
    let bottom = f64::from(rect.y + rect.height) + f64::from(margin);
    let radius = (f64::from(margin) * 1.5).min((right - left).min(bottom - top) / 2.0);

    let (x0, y0, x1, y1) = bounds(img, left, top, right, bottom);
    for y in y0..y1 {
        let py = f64::from(y) + 0.5;
        for x in x0..x1 {
            let px = f64::from(x) + 0.5;
            // Distance from the inner rectangle the corners are rounded around.
            let dx = (left + radius - px).max(px - (right - radius)).max(0.0);
            let dy = (top + radius - py).max(py - (bottom - radius)).max(0.0);
            if dx * dx + dy * dy <= radius * radius {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Clip a float box to the image, returning half-open pixel ranges.
fn bounds(img: &RgbaImage, left: f64, top: f64, right: f64, bottom: f64) -> (u32, u32, u32, u32) {
    let clip = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
    (
        clip(left.floor(), img.width()),
        clip(top.floor(), img.height()),
        clip(right.ceil(), img.width()),
        clip(bottom.ceil(), img.height()),
    )
}
