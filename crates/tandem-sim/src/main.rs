// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TANDEM SIM - Provider/Consumer Reward Pipeline Simulator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

use tandem_sim::{SimConfig, SimResult, TwoChainNetwork};
use tandem_store::{KvStore, MemoryStore, SledStore};

#[derive(Parser)]
#[command(name = "tandem-sim")]
#[command(about = "Tandem - cross-chain reward pipeline simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print the final report as JSON
    Run {
        /// Scenario file (TOML). Defaults apply when omitted
        #[arg(short, long, env = "TANDEM_SIM_CONFIG")]
        config: Option<PathBuf>,

        /// Number of blocks to produce
        #[arg(short, long, default_value_t = 100)]
        blocks: u64,

        /// Reject this many transfer attempts before the channel recovers
        #[arg(long)]
        fail_transport_cycles: Option<u32>,

        /// Keep keeper state in sled databases under this directory
        #[arg(long, env = "TANDEM_STATE_DIR")]
        state_dir: Option<PathBuf>,

        /// Print Prometheus metrics after the report
        #[arg(long)]
        metrics: bool,
    },

    /// Write a default scenario file
    InitConfig {
        /// Output path
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            blocks,
            fail_transport_cycles,
            state_dir,
            metrics,
        } => {
            let mut sim_config = match config {
                Some(path) => SimConfig::load_from_file(&path)?,
                None => SimConfig::default(),
            };
            sim_config.apply_env()?;
            if let Some(cycles) = fail_transport_cycles {
                sim_config.scenario.fail_transport_cycles = cycles;
            }

            print_banner();
            match state_dir {
                Some(dir) => {
                    let consumer = SledStore::open(dir.join("consumer"))?;
                    let provider = SledStore::open(dir.join("provider"))?;
                    let net = run(&sim_config, consumer, provider, blocks, metrics)?;
                    net.consumer.keeper.store().flush()?;
                    net.provider.keeper.store().flush()?;
                    print_info(&format!("state written to {}", dir.display()));
                }
                None => {
                    run(&sim_config, MemoryStore::new(), MemoryStore::new(), blocks, metrics)?;
                }
            }
        }
        Commands::InitConfig { path } => {
            init_config(&path)?;
            print_success(&format!("scenario written to {}", path.display()));
        }
    }

    Ok(())
}

fn run<S: KvStore>(
    config: &SimConfig,
    consumer: S,
    provider: S,
    blocks: u64,
    with_metrics: bool,
) -> SimResult<TwoChainNetwork<S>> {
    let mut net = TwoChainNetwork::new(config, consumer, provider)?;
    let summaries = net.run(blocks)?;
    let failed = summaries
        .iter()
        .filter(|s| matches!(s.transmission, tandem_consumer::Transmission::Failed { .. }))
        .count();
    if failed > 0 {
        print_error(&format!("{} transmission cycle(s) failed", failed));
    }

    if config.scenario.withdraw_commission {
        let paid = net.withdraw_commissions()?;
        print_info(&format!("commission paid: {}", paid));
    }

    let report = net.report()?;
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("cannot render report: {}", e)),
    }
    if with_metrics {
        println!("{}", net.metrics.gather_text()?);
    }
    print_success(&format!("{} blocks produced", blocks));
    Ok(net)
}

fn init_config(path: &Path) -> SimResult<()> {
    SimConfig::default().save_to_file(path)
}

fn print_banner() {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║      TANDEM (XCR) - Reward Simulator          ║"
            .cyan()
            .bold()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════╝".cyan()
    );
    println!();
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────
