mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_REGISTRY_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tagbook",
    version,
    about = "Image-catalog manifest generator for database container registries"
)]
struct Cli {
    /// Output the run report as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate catalog manifests and the kustomization index.
    Generate {
        /// Registry coordinate, host/repository. [default: ghcr.io/cloudnative-pg/postgresql]
        #[arg(long)]
        registry: Option<String>,

        /// Base tag pattern; the first capture group is the major version.
        #[arg(long)]
        pattern: Option<String>,

        /// Image type to catalog; repeatable. [default: minimal standard system]
        #[arg(long = "type", value_name = "TYPE")]
        image_types: Vec<String>,

        /// OS distribution to catalog; repeatable. [default: bullseye bookworm trixie]
        #[arg(long = "distribution", value_name = "DISTRIBUTION")]
        distributions: Vec<String>,

        /// Directory the YAML artifacts are written to. [default: .]
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Lowest supported major version. [default: 13]
        #[arg(long)]
        min_major: Option<u32>,

        /// Optional TOML config file; flags override file values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Alternative skopeo container image for tag listing.
        #[arg(long)]
        skopeo_image: Option<String>,
    },
    /// Generate shell completion scripts.
    Completions { shell: Shell },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TAGBOOK_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .init();

    let json_output = cli.json;
    let result = match cli.command {
        Commands::Generate {
            registry,
            pattern,
            image_types,
            distributions,
            output_dir,
            min_major,
            config,
            skopeo_image,
        } => commands::generate::run(
            &commands::generate::GenerateArgs {
                registry,
                pattern,
                image_types,
                distributions,
                output_dir,
                min_major,
                config,
                skopeo_image,
            },
            json_output,
        ),
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            let code = if msg.starts_with("failed to parse config file")
                || msg.starts_with("failed to read config file")
            {
                EXIT_CONFIG_ERROR
            } else if msg.starts_with("registry error:") {
                EXIT_REGISTRY_ERROR
            } else {
                EXIT_FAILURE
            };
            ExitCode::from(code)
        }
    }
}
