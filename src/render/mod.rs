//! The render pipeline: form → params → symbol raster → logo overlay → PNG.

pub mod compositor;
pub mod encoder;
pub mod exporter;
pub mod logo;
pub mod params;
pub mod scheduler;
pub mod session;

use image::RgbaImage;

use crate::core::error::AppResult;
use crate::core::models::{LogoAsset, RenderParams};
use compositor::{compose, CompositeStyle};
use encoder::{EncodeRequest, SymbolEncoder};

/// Encode `params` and overlay `logo`. Blocking; callers run it off the async threads.
pub fn render(
    encoder: &dyn SymbolEncoder,
    params: &RenderParams,
    logo: Option<&LogoAsset>,
    style: CompositeStyle,
) -> AppResult<RgbaImage> {
    let base = encoder.encode(&EncodeRequest::from_params(params))?;
    Ok(compose(base, logo, params, style))
}
