use clap::{Parser, Subcommand};
use cmdwatch_core::config::AppConfig;
use cmdwatch_watchman::{Command, FileOps, Watchman};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Command-file watcher: edit a file, get a file operation", long_about = None)]
struct Args {
    /// Explicit configuration file (defaults to ./cmdwatch.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that relative command paths are resolved against
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the command file and run every command written to it
    Watch {
        /// The command file to watch
        #[arg(long)]
        file: Option<PathBuf>,
        /// Run the content already in the file once at startup
        #[arg(long)]
        process_existing: bool,
    },
    /// Run one command right away, without watching
    Exec {
        /// Command text, e.g. "create a file foo.txt"
        #[arg(index = 1, num_args = 1.., required = true)]
        text: Vec<String>,
    },
    /// Show how a command text is parsed
    Parse {
        #[arg(index = 1, num_args = 1.., required = true)]
        text: Vec<String>,
    },
}

fn load_config(args: &Args) -> AppConfig {
    let loaded = match &args.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("❌ Error: Configuration invalid: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(base_dir) = &args.base_dir {
        config.base_dir = base_dir.clone();
    }
    if let Some(Commands::Watch { file, process_existing }) = &args.command {
        if let Some(file) = file {
            config.command_file = file.clone();
        }
        config.process_existing |= *process_existing;
    }

    config
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = load_config(&args);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Keep the guard alive so buffered lines are flushed on exit
    let _guard = match &config.log_file {
        Some(log_file) => {
            // Initialize logging to file (append mode)
            let file = match std::fs::OpenOptions::new().create(true).append(true).open(log_file) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("❌ Error: cannot open log file {:?}: {}", log_file, e);
                    std::process::exit(1);
                }
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(non_blocking)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .init();
            None
        }
    };

    cmdwatch_core::init();

    match args.command {
        Some(Commands::Watch { .. }) | None => {
            if let Err(e) = watch(&config).await {
                error!("Watch Error: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Exec { text }) => {
            let text = text.join(" ");
            match Command::parse(&text) {
                Ok(command) => {
                    let mut ops = FileOps::new(config.base_path());
                    let outcome = ops.apply(&command).await;
                    println!("{:?}", outcome);
                    if outcome.is_failure() {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("❌ {}", e);
                    std::process::exit(2);
                }
            }
        }
        Some(Commands::Parse { text }) => match Command::parse(&text.join(" ")) {
            Ok(command) => println!("{} => {:?}", command.kind(), command),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(2);
            }
        },
    }
}

async fn watch(config: &AppConfig) -> anyhow::Result<()> {
    let watchman = Arc::new(Watchman::new(config));
    let shutdown = CancellationToken::new();

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Shutting down");
                    shutdown.cancel();
                }
                Err(e) => error!("Cannot listen for Ctrl-C: {}", e),
            }
        }
    });

    watchman.start(shutdown).await
}
