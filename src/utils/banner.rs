use anyhow::Result;
use qrcode::render::unicode;
use qrcode::QrCode;

/// Terminal QR code pointing phones at the UI.
pub fn url_banner(url: &str) -> Result<String> {
    let code = QrCode::new(url.as_bytes())?;
    let qr = code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();

    Ok(format!("\nScan to open qrsmith:\n{}\nOr open: {}\n", qr, url))
}
