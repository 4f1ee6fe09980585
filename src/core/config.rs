use serde::{Deserialize, Serialize};
use anyhow::Result;

use crate::core::models::Rgb;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub render: RenderDefaults,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_long_poll_ms")]
    pub long_poll_ms: u64,
}

/// Defaults and limits applied to every render.
///
/// This is the single place where the documented defaults live; the form
/// reader, the logo loader, the compositor and the scheduler all read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderDefaults {
    #[serde(default = "default_size")]
    pub default_size: u32,
    #[serde(default = "default_border")]
    pub default_border: u32,
    #[serde(default = "default_fg")]
    pub default_fg: String,
    #[serde(default = "default_bg")]
    pub default_bg: String,
    #[serde(default = "default_logo_scale")]
    pub default_logo_scale: f32,
    #[serde(default = "default_max_logo_bytes")]
    pub max_logo_bytes: u64,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_slug_max_len")]
    pub slug_max_len: usize,
    #[serde(default)]
    pub backdrop: Backdrop,
    #[serde(default = "default_backdrop_margin")]
    pub backdrop_margin: u32,
}

/// Shape painted behind the logo to keep the scan contrast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backdrop {
    None,
    Circle,
    #[default]
    Rounded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub qr_code: bool,
    #[serde(default = "default_false")]
    pub open_browser: bool,
}

pub const MIN_SIZE: u32 = 128;
pub const MAX_SIZE: u32 = 1200;
pub const MAX_LOGO_SCALE: f32 = 0.5;

// Default value functions
fn default_port() -> u16 { 8080 }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_max_sessions() -> usize { 256 }
fn default_long_poll_ms() -> u64 { 10_000 }
fn default_size() -> u32 { 400 }
fn default_border() -> u32 { 4 }
fn default_fg() -> String { "#000000".to_string() }
fn default_bg() -> String { "#ffffff".to_string() }
fn default_logo_scale() -> f32 { 0.18 }
fn default_max_logo_bytes() -> u64 { 4 * 1024 * 1024 } // 4MB
fn default_debounce_ms() -> u64 { 400 }
fn default_slug_max_len() -> usize { 40 }
fn default_backdrop_margin() -> u32 { 8 }
fn default_true() -> bool { true }
fn default_false() -> bool { false }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_sessions: default_max_sessions(),
            long_poll_ms: default_long_poll_ms(),
        }
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            default_size: default_size(),
            default_border: default_border(),
            default_fg: default_fg(),
            default_bg: default_bg(),
            default_logo_scale: default_logo_scale(),
            max_logo_bytes: default_max_logo_bytes(),
            debounce_ms: default_debounce_ms(),
            slug_max_len: default_slug_max_len(),
            backdrop: Backdrop::default(),
            backdrop_margin: default_backdrop_margin(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            qr_code: default_true(),
            open_browser: default_false(),
        }
    }
}

impl RenderDefaults {
    /// Default foreground; falls back to black if the configured value is garbage.
    pub fn fg(&self) -> Rgb {
        Rgb::parse(&self.default_fg).unwrap_or(Rgb::BLACK)
    }

    pub fn bg(&self) -> Rgb {
        Rgb::parse(&self.default_bg).unwrap_or(Rgb::WHITE)
    }

    /// Size limit for the HTTP body: one logo plus room for the form fields.
    pub fn body_limit(&self) -> usize {
        self.max_logo_bytes as usize + 64 * 1024
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with(Self::environment())
    }

    /// `QRSMITH_<SECTION>__<KEY>`, e.g. `QRSMITH_SERVER__PORT=9000`.
    fn environment() -> config::Environment {
        config::Environment::with_prefix("QRSMITH")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn load_with(environment: config::Environment) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("qrsmith.toml").required(false))
            .add_source(environment);

        // Override with individual environment variables
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(limit) = std::env::var("MAX_LOGO_BYTES") {
            builder = builder.set_override("render.max_logo_bytes", limit)?;
        }

        let settings = builder.build()?;
        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn save_example() -> Result<()> {
        let example_config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&example_config)?;
        std::fs::write("qrsmith.example.toml", toml_string)?;
        Ok(())
    }

    pub fn from_toml(toml_content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_content)?;
        Ok(config)
    }
}
