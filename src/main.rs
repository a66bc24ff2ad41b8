use clap::Parser;
use greengarden::core::config::{self, CliOverrides, GardenConfig};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "greengarden", about = "Terminal client for the Green Garden dating sim", version)]
struct Args {
    /// Game server base URL (overrides config and GREENGARDEN_SERVER_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Character preselected on the welcome screen, e.g. lin_yuhan
    #[arg(short, long)]
    role: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // The log file location comes from config, so a broken config file is
    // logged only once the logger is up.
    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (GardenConfig::default(), Some(e)),
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            server: args.server,
            role: args.role,
            log_level: args.log_level,
        },
    );

    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    if let Some(e) = config_error {
        eprintln!("greengarden: {e}; using defaults");
        log::warn!("Config unusable, using defaults: {}", e);
    }
    log::info!(
        "Green Garden starting up (server: {}, role: {})",
        resolved.server_url,
        resolved.default_role
    );

    greengarden::tui::run(resolved)
}
