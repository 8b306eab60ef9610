use anyhow::{ Context, Result };
use clap::Parser;

use pooltracker::config::Config;
use pooltracker::database::Database;
use pooltracker::logger::{ self, Logger };
use pooltracker::monitor::PoolMonitor;
use pooltracker::pools::PoolInfo;

#[derive(Parser, Debug)]
#[command(name = "pooltracker", about = "Raydium liquidity pool discovery monitor")]
struct Args {
    /// Path to the JSON config file (created with defaults when missing)
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Show debug-level log output
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config).context("Failed to load configuration")?;
    logger::set_debug_mode(args.debug || config.debug_mode);

    print_banner(&config);

    let database = Database::open(&config.database.path).context("Failed to initialize database")?;

    let (mut monitor, mut discovered) = PoolMonitor::new(config, database);

    let shutdown = monitor.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            Logger::warn("Received termination signal, shutting down...");
            shutdown.stop();
        }
    });

    tokio::spawn(async move {
        while let Some(pool) = discovered.recv().await {
            print_pool_report(&pool);
        }
    });

    monitor.run().await.context("Monitor terminated abnormally")?;

    Ok(())
}

fn print_banner(config: &Config) {
    Logger::header("Raydium Pool Monitor");
    Logger::print_key_value("RPC Endpoints", &config.rpc_endpoints.len().to_string());
    Logger::print_key_value(
        "WebSocket Endpoints",
        &config.resolved_ws_endpoints().len().to_string()
    );
    Logger::print_key_value("Program ID", &config.program_id);
    Logger::print_key_value("Reconnect Interval", &format!("{}s", config.reconnect_interval_secs));
    Logger::print_key_value("Max Reconnect Attempts", &config.max_reconnect_attempts.to_string());
    Logger::print_key_value("Heartbeat Interval", &format!("{}s", config.heartbeat_interval_secs));
    Logger::print_key_value("Database", &config.database.path);
    Logger::separator();
}

fn print_pool_report(pool: &PoolInfo) {
    Logger::separator();
    Logger::pool("New Pool Found");
    Logger::print_key_value("Address", &pool.address);
    Logger::print_key_value("Transaction", &pool.signature);
    Logger::print_key_value("Coin Mint", &pool.coin_mint);
    Logger::print_key_value("Token Symbol", &pool.token_symbol);
    Logger::print_key_value("Slot", &pool.slot.to_string());
    Logger::print_key_value("Time", &pool.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    Logger::separator();
}
