mod api;
mod app;
mod config;
mod constants;
mod input;
mod session;
mod store;
mod sync;
mod transport;
mod ui;

use anyhow::Result;
use std::env;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::UserId;
use crate::app::App;
use crate::config::{Config, ServerConfig, SyncConfig, UiConfig};

fn setup_logging() {
    use std::fs::OpenOptions;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,atelier=debug"));

    // Try to create a log file in the config directory
    let log_file = Config::config_dir()
        .ok()
        .map(|dir| dir.join("atelier.log"))
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .ok()
        });

    if let Some(file) = log_file {
        // Log to file
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            )
            .init();
    } else {
        // Fallback to stderr if file logging fails
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_usage() {
    eprintln!(
        r#"atelier - Fast terminal dashboard for studio customer conversations

Usage: atelier [command]

Commands:
    (none)          Start the dashboard
    --user <id>     Start with a specific conversation focused
    setup           Configure the backend connection
    help            Show this help message

Configuration file: ~/.config/atelier/config.toml
"#
    );
}

async fn run_setup() -> Result<()> {
    use std::io::{self, Write};

    println!("Atelier Setup");
    println!("=============\n");

    let config_path = Config::config_path()?;
    if config_path.exists() {
        print!("Configuration already exists. Overwrite? [y/N]: ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    let base_url = loop {
        print!("Backend URL (e.g. https://studio.example.com): ");
        io::stdout().flush()?;
        let mut url = String::new();
        io::stdin().read_line(&mut url)?;
        let url = url.trim().to_string();

        if url.starts_with("http://") || url.starts_with("https://") {
            break url;
        }
        println!("The URL must start with http:// or https://");
    };

    print!("API token (optional): ");
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().read_line(&mut token)?;
    let token = token.trim();
    let api_token = if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    };

    let config = Config {
        server: ServerConfig {
            base_url,
            api_token,
        },
        ui: UiConfig::default(),
        sync: SyncConfig::default(),
    };

    config.ensure_dirs()?;
    config.save()?;
    println!("Configuration saved to {}", config_path.display());
    println!("\nSetup complete! Run 'atelier' to start.");
    Ok(())
}

async fn run_dashboard(deep_link: Option<UserId>) -> Result<()> {
    setup_logging();

    let config = Config::load()?;
    config.ensure_dirs()?;

    let mut app = App::new(&config, deep_link);
    app.run().await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("help") | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("setup") => run_setup().await,
        Some("--user") => {
            let user_id = args
                .get(2)
                .and_then(|raw| raw.parse::<UserId>().ok())
                .ok_or_else(|| anyhow::anyhow!("--user requires a numeric conversation id"))?;
            run_dashboard(Some(user_id)).await
        }
        Some(cmd) => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            std::process::exit(1);
        }
        None => run_dashboard(None).await,
    }
}
