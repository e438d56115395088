// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::{Path, PathBuf};

use creature_viewer::{get_all, DataSource, Message, ViewState, DEFAULT_SOURCE};

#[derive(Parser)]
#[command(name = "creature-viewer")]
#[command(about = "Browse creatures by power score")]
#[command(version)]
struct Cli {
    /// Data file path or http(s) URL of the creature list
    #[arg(long, short, env = "CREATURE_SOURCE", default_value = DEFAULT_SOURCE, global = true)]
    source: DataSource,

    /// Write logs to this file (the TUI logs nothing otherwise)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive table (default)
    View,
    /// Print the filtered table and statistics
    Summary {
        /// Name pattern, case-insensitive
        #[arg(long, default_value = "")]
        search: String,

        /// Power threshold
        #[arg(long, default_value = "0")]
        threshold: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::View) {
        Command::Summary { search, threshold } => {
            init_logging(cli.log_file.as_deref(), false)?;
            run_summary(&cli.source, search, threshold)?;
        }
        Command::View => {
            init_logging(cli.log_file.as_deref(), true)?;
            run_ui_mode(cli.source)?;
        }
    }

    Ok(())
}

/// Logs go to stderr, or to `log_file` when given. The TUI owns the
/// terminal, so it only logs when a file is given.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None if interactive => return Ok(()),
        None => {}
    }

    builder.init();
    Ok(())
}

fn run_summary(source: &DataSource, search: String, threshold: String) -> Result<()> {
    println!("📊 Creature Power Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading {}...", source);
    let creatures =
        get_all(source).with_context(|| format!("Failed to load creatures from {}", source))?;
    println!("✓ Loaded {} creatures\n", creatures.len());

    let mut view = ViewState::new();
    view.update(Message::Loaded(Ok(creatures)));
    view.update(Message::SearchChanged(search));
    view.update(Message::ThresholdChanged(threshold));

    if view.literal_search() {
        println!("⚠️  Search is not a valid pattern, matching it literally\n");
    }

    let snapshot = view.snapshot();

    println!(
        "{:>5}  {:<20} {:<18} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>6}",
        "ID", "Name", "Type", "HP", "Atk", "Def", "SpA", "SpD", "Spe", "Power"
    );
    for d in &snapshot.rows {
        let c = &d.creature;
        println!(
            "{:>5}  {:<20} {:<18} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4} {:>6}",
            c.id,
            c.name,
            c.type_label(),
            c.hp,
            c.attack,
            c.defense,
            c.special_attack,
            c.special_defense,
            c.speed,
            d.power
        );
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✓ Rows: {}", snapshot.rows.len());
    println!("✓ Count over threshold ({}): {}", view.threshold(), snapshot.summary.count_above);
    println!("✓ Min: {}", snapshot.summary.display_min());
    println!("✓ Max: {}", snapshot.summary.display_max());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(source: DataSource) -> Result<()> {
    log::info!("starting viewer on {}", source);

    // Load runs in the background, the table starts empty
    let loader = creature_viewer::spawn_load(source.clone());
    let mut app = ui::App::new(source.to_string(), loader);
    ui::run_ui(&mut app)?;

    println!("\n✅ Viewer closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_source: DataSource) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print a summary: creature-viewer summary --search <name>");
    std::process::exit(1);
}
