use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque RGB color as entered in a color picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
    pub const WHITE: Rgb = Rgb([0xff, 0xff, 0xff]);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb([r, g, b])
    }

    /// Parse `#rgb` or `#rrggbb` (the `#` is optional, case-insensitive).
    pub fn parse(input: &str) -> Option<Self> {
        let hex = input.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16)? as u8;
                    *slot = v * 17;
                }
                Some(Rgb(out))
            }
            6 => {
                let mut out = [0u8; 3];
                for (i, slot) in out.iter_mut().enumerate() {
                    *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
                }
                Some(Rgb(out))
            }
            _ => None,
        }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        let [r, g, b] = self.0;
        image::Rgba([r, g, b, 0xff])
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Raw form values as submitted by the page or the command line.
///
/// Every field is an untrusted string; [`RenderParams::from_form`] turns it
/// into a validated record.
///
/// [`RenderParams::from_form`]: crate::core::models::RenderParams::from_form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub text: String,
    pub size: Option<String>,
    pub border: Option<String>,
    pub fg: Option<String>,
    pub bg: Option<String>,
    pub logo_scale: Option<String>,
}

impl FormInput {
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Validated parameters for one redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub text: String,
    pub size: u32,
    pub border: u32,
    pub fg: Rgb,
    pub bg: Rgb,
    pub logo_scale: f32,
}

/// A decoded logo ready for compositing.
#[derive(Debug, Clone)]
pub struct LogoAsset {
    pub image: RgbaImage,
    pub width: u32,
    pub height: u32,
    pub byte_len: u64,
}

impl LogoAsset {
    pub fn new(image: RgbaImage, byte_len: u64) -> Self {
        let (width, height) = image.dimensions();
        Self {
            image,
            width,
            height,
            byte_len,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// The committed canvas of a session.
#[derive(Debug, Clone)]
pub struct Frame {
    pub token: u64,
    pub params: RenderParams,
    pub image: RgbaImage,
}

/// The single user-visible status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum Status {
    #[default]
    Ready,
    Rendered,
    Error(String),
}

impl Status {
    pub fn message(&self) -> &str {
        match self {
            Status::Ready => "",
            Status::Rendered => "",
            Status::Error(msg) => msg,
        }
    }
}

/// Where the web UI can be reached; printed at startup.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HostInfo {
    pub name: String,
    pub ip: String,
    pub port: u16,
}

impl HostInfo {
    pub fn new(port: u16) -> Self {
        let name = hostname::get()
            .unwrap_or_else(|_| "unknown".into())
            .to_string_lossy()
            .to_string();

        let ip = local_ip_address::local_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| "127.0.0.1".to_string());

        Self { name, ip, port }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.ip, self.port)
    }
}
