//! qrsmith - local web studio for styled QR codes
//!
//! Type text, tune size, border and colors, drop a logo in the middle and
//! export the result as PNG. The symbol itself comes from the `qrcode`
//! crate; this crate owns validation, logo compositing, debounced live
//! redraws and export.

pub mod core;
pub mod utils;
pub mod web;
pub mod render;
pub mod cli;

// Re-export commonly used types for convenience
pub use core::{
    config::{AppConfig, RenderDefaults},
    models::{FormInput, LogoAsset, RenderParams, Rgb},
    error::{AppError, AppResult},
};

pub use render::{
    encoder::{QrEncoder, SymbolEncoder},
    session::{RedrawOutcome, Session},
};

pub use web::{
    routes::create_routes,
    server::WebServer,
    state::AppState,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
