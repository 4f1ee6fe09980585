use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::core::app::App;
use crate::core::config::AppConfig;
use crate::core::models::FormInput;
use crate::render::encoder::QrEncoder;
use crate::render::session::Session;
use crate::utils::network::{parse_host, pick_port};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Port to listen on (will find next available port if this one is in use)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Disable QR code display
    #[arg(long)]
    no_qr: bool,

    /// Open web browser automatically
    #[arg(short, long)]
    open: bool,

    /// Generate example configuration file
    #[arg(long)]
    generate_config: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a QR code to a PNG file without starting the server
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Text or URL to encode
    text: String,

    /// Image size in pixels (128-1200)
    #[arg(long)]
    size: Option<String>,

    /// Padding around the symbol in pixels
    #[arg(long)]
    border: Option<String>,

    /// Foreground color, e.g. "#000000"
    #[arg(long)]
    fg: Option<String>,

    /// Background color, e.g. "#ffffff"
    #[arg(long)]
    bg: Option<String>,

    /// Logo image to place in the center
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Logo width as a fraction of the QR width (0.0-0.5)
    #[arg(long)]
    logo_scale: Option<String>,

    /// Output file; defaults to a name derived from the text
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        // Generate config file if requested
        if self.generate_config {
            AppConfig::save_example()?;
            println!("Generated example configuration file: qrsmith.example.toml");
            return Ok(());
        }

        // Load configuration
        let mut config = AppConfig::load().unwrap_or_else(|e| {
            info!("Using default configuration ({})", e);
            AppConfig::default()
        });

        if let Some(Command::Render(args)) = &self.command {
            return render_to_file(config, args).await;
        }

        // Override config with CLI arguments
        if let Some(ref host) = self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.no_qr {
            config.ui.qr_code = false;
        }
        if self.open {
            config.ui.open_browser = true;
        }

        config.server.port = pick_port(parse_host(&config.server.host), config.server.port);

        App::new(config).run().await
    }
}

async fn render_to_file(config: AppConfig, args: &RenderArgs) -> Result<()> {
    let session = Session::new(config.render, Arc::new(QrEncoder));

    if let Some(ref logo) = args.logo {
        session
            .load_logo_path(logo)
            .await
            .with_context(|| format!("failed to load logo {}", logo.display()))?;
    }

    let form = FormInput {
        text: args.text.clone(),
        size: args.size.clone(),
        border: args.border.clone(),
        fg: args.fg.clone(),
        bg: args.bg.clone(),
        logo_scale: args.logo_scale.clone(),
    };
    let export = session.export(&form).await?;

    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&export.file_name));
    tokio::fs::write(&path, &export.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    info!("Wrote {} ({} bytes)", path.display(), export.bytes.len());
    println!("{}", path.display());
    Ok(())
}
