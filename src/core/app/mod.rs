use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, error};

use crate::core::config::AppConfig;
use crate::core::models::HostInfo;
use crate::render::encoder::QrEncoder;
use crate::utils::banner::url_banner;
use crate::utils::network::parse_host;
use crate::web::server::WebServer;
use crate::web::state::AppState;

pub struct App {
    config: AppConfig,
    host_info: HostInfo,
}

impl App {
    /// `config.server.port` must already be the port to bind.
    pub fn new(config: AppConfig) -> Self {
        let host_info = HostInfo::new(config.server.port);
        Self { config, host_info }
    }

    pub async fn run(self) -> Result<()> {
        info!("Web interface available at: {}", self.host_info.url());
        info!(
            "Render defaults: {}px, border {}px, logo limit {} bytes",
            self.config.render.default_size,
            self.config.render.default_border,
            self.config.render.max_logo_bytes
        );

        // Display QR code if enabled
        if self.config.ui.qr_code {
            match url_banner(&self.host_info.url()) {
                Ok(banner) => println!("{}", banner),
                Err(e) => error!("Failed to generate QR code: {}", e),
            }
        }

        // Open browser if requested
        if self.config.ui.open_browser {
            if let Err(e) = open::that(self.host_info.url()) {
                error!("Failed to open browser: {}", e);
            }
        }

        let addr = SocketAddr::new(parse_host(&self.config.server.host), self.config.server.port);
        let state = AppState::new(self.config, Arc::new(QrEncoder));
        let server = WebServer::new(addr, state);

        // Setup graceful shutdown
        let shutdown_signal = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl+C, shutting down gracefully...");
        };

        tokio::select! {
            result = server.run() => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    return Err(e);
                }
            }
            _ = shutdown_signal => {
                info!("Shutdown signal received");
            }
        }

        info!("Shutdown complete");
        Ok(())
    }
}
