//! SecureVPN: Demo VPN Client
//!
//! Terminal frontend for the demo client. Initializes the global
//! allocator, sets up logging, loads the catalog and settings, kicks
//! off the one-shot public-address lookup, and then runs a
//! line-oriented command loop over the session driver.
//!
//! Usage: `securevpn [servers.toml|servers.json]`
//! Settings are read from `securevpn.toml` in the working directory
//! when present.

use anyhow::Result;
use securevpn_core::{
    format_uptime, ConnectionController, ConnectionStatus, DriverConfig, RandomMaskedGenerator,
    ServerCatalog, SessionDriver, Settings, StatusSnapshot,
};
use securevpn_lookup::AddressLookup;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

// Use mimalloc as the global allocator for reduced memory fragmentation
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const SETTINGS_FILE: &str = "securevpn.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    info!("SecureVPN starting...");

    let catalog = match std::env::args().nth(1) {
        Some(path) => {
            let catalog = ServerCatalog::from_path(Path::new(&path))?;
            info!("Loaded {} servers from {}", catalog.servers.len(), path);
            catalog
        }
        None => ServerCatalog::default(),
    };

    let settings = load_settings();
    let controller = ConnectionController::new(catalog, Box::new(RandomMaskedGenerator))?;
    let driver = SessionDriver::new(controller, DriverConfig::default());

    // One-shot public address lookup, concurrent with the command
    // loop; each family fails independently into "unavailable"
    let controller = driver.controller();
    tokio::spawn(async move {
        let observed = AddressLookup::with_defaults().observed_address().await;
        info!("public address: {}", observed);
        controller.write().await.set_observed(observed);
    });

    if settings.auto_connect {
        info!("auto-connect is on");
        driver.toggle().await;
    }

    run_command_loop(driver, settings).await
}

fn load_settings() -> Settings {
    let path = Path::new(SETTINGS_FILE);
    if !path.exists() {
        return Settings::default();
    }

    match Settings::from_toml_file(path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring {}: {}", SETTINGS_FILE, e);
            Settings::default()
        }
    }
}

async fn run_command_loop(driver: SessionDriver, mut settings: Settings) -> Result<()> {
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(word) => word,
            None => continue,
        };

        match (command, parts.next()) {
            ("connect", _) | ("disconnect", _) | ("toggle", _) => {
                driver.toggle().await;
            }
            ("status", _) => {
                print_status(&driver.snapshot().await, &settings);
            }
            ("servers", _) => {
                print_servers(&driver).await;
            }
            ("select", Some(slug)) => match slug.parse() {
                Ok(id) => match driver.select_server(id).await {
                    Ok(()) => println!("Selected {}", driver.snapshot().await.server.name),
                    Err(e) => println!("{}", e),
                },
                Err(e) => println!("{}", e),
            },
            ("select", None) => println!("Usage: select <server-id>"),
            ("killswitch", Some(value)) => match parse_toggle(value) {
                Some(on) => {
                    settings.kill_switch = on;
                    println!("Kill switch {}", if on { "on" } else { "off" });
                }
                None => println!("Usage: killswitch on|off"),
            },
            ("autoconnect", Some(value)) => match parse_toggle(value) {
                Some(on) => {
                    settings.auto_connect = on;
                    println!("Auto connect {}", if on { "on" } else { "off" });
                }
                None => println!("Usage: autoconnect on|off"),
            },
            ("help", _) => print_help(),
            ("quit", _) | ("exit", _) => break,
            _ => println!("Unknown command: {} (try 'help')", command),
        }
    }

    info!("SecureVPN shutting down");
    Ok(())
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value {
        "on" => Some(true),
        "off" => Some(false),
        _ => None,
    }
}

fn print_help() {
    println!("Commands:");
    println!("  connect | disconnect   toggle the session");
    println!("  status                 show the dashboard");
    println!("  servers                list selectable servers");
    println!("  select <server-id>     switch server");
    println!("  killswitch on|off      flip the kill switch setting");
    println!("  autoconnect on|off     flip connect-on-startup");
    println!("  quit                   exit");
}

fn print_status(snapshot: &StatusSnapshot, settings: &Settings) {
    println!("Status: {}", snapshot.status);
    println!(
        "Server: {} {}, {} ({}ms)",
        snapshot.server.flag, snapshot.server.name, snapshot.server.country, snapshot.server.latency_ms
    );

    match snapshot.masked {
        Some(masked) if snapshot.status == ConnectionStatus::Connected => {
            println!("Protected IP: {}", masked);
            println!("Connected for {}", format_uptime(snapshot.uptime_secs));
        }
        _ => {
            println!(
                "Your IP: {} / {}",
                snapshot.observed.display_v4(),
                snapshot.observed.display_v6()
            );
        }
    }

    println!(
        "Kill switch: {} | Auto connect: {}",
        if settings.kill_switch { "on" } else { "off" },
        if settings.auto_connect { "on" } else { "off" }
    );
}

async fn print_servers(driver: &SessionDriver) {
    let snapshot = driver.snapshot().await;
    let controller = driver.controller();
    let guard = controller.read().await;

    for server in guard.catalog().enabled_servers() {
        let marker = if server.id == snapshot.server.id {
            "*"
        } else {
            " "
        };
        println!(
            " {} {:<12} {} {}, {} ({}ms)",
            marker, server.id, server.flag, server.name, server.country, server.latency_ms
        );
    }
}
