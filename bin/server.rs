// Creature Viewer - Static Data Server
// Serves /pokemon.json and the JSON API with Axum

use anyhow::{Context, Result};
use clap::Parser;
use creature_viewer::server::{router, AppState};
use creature_viewer::DEFAULT_SOURCE;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "creature-server")]
#[command(about = "Serve the creature list and its JSON API")]
#[command(version)]
struct Args {
    /// Server bind address
    #[arg(long, env = "CREATURE_BIND", default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Creature data file
    #[arg(long, env = "CREATURE_DATA", default_value = DEFAULT_SOURCE)]
    data: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("🌐 Creature Viewer - Data Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if !args.data.exists() {
        eprintln!("❌ Data file not found at {:?}", args.data);
        eprintln!("   Pass --data <path> or set CREATURE_DATA.");
        std::process::exit(1);
    }
    println!("✓ Data file: {:?}", args.data);

    let app = router(AppState {
        data_path: args.data.clone(),
    });

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    println!("\n🚀 Server running on http://{}", args.bind);
    println!("   Data: http://{}/pokemon.json", args.bind);
    println!("   API:  http://{}/api/creatures?name=char", args.bind);
    println!("\n   Press Ctrl+C to stop\n");
    log::info!("listening on {}", args.bind);

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
