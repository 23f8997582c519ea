use clap::{Parser, Subcommand};

mod commands;
mod report;

#[derive(Parser)]
#[command(
    name = "waveplan",
    about = "waveplan: migration cohort packing, timing and wave planning",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a scaffold waveplan.toml
    Init {
        /// Target directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        path: String,
    },
    /// Score tenants and propose cohorts
    Pack {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Propose cohorts, then estimate migration days.
    ///
    /// Passing --bandwidth-mbps or --agents adds a what-if comparison
    /// against the configured baseline.
    Estimate {
        #[command(flatten)]
        input: InputArgs,
        /// Scenario bandwidth in Mbps
        #[arg(long)]
        bandwidth_mbps: Option<f64>,
        /// Scenario agent count
        #[arg(long)]
        agents: Option<u32>,
    },
    /// Split VMs into execution waves
    Waves {
        #[command(flatten)]
        input: InputArgs,
        /// Only build waves for VMs of this cohort
        #[arg(long)]
        cohort: Option<String>,
    },
}

#[derive(clap::Args)]
struct InputArgs {
    /// Plan configuration file
    #[arg(short, long, default_value = "waveplan.toml")]
    config: String,
    /// Inventory snapshot (JSON)
    #[arg(short, long)]
    inventory: String,
    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("waveplan=info".parse()?)
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => commands::init::init(&path),
        Commands::Pack { input } => {
            commands::pack::pack(&input.config, &input.inventory, &input.format)
        }
        Commands::Estimate { input, bandwidth_mbps, agents } => {
            let overrides = commands::estimate::Overrides { bandwidth_mbps, agents };
            commands::estimate::estimate(&input.config, &input.inventory, &input.format, &overrides)
        }
        Commands::Waves { input, cohort } => {
            commands::waves::waves(&input.config, &input.inventory, &input.format, cohort)
        }
    }
}
