use anyhow::Result;
use clap::{Parser, Subcommand};
use readscore_common::{logger, AppConfig};
use std::path::PathBuf;

/// Find project root by looking for .git directory
fn find_project_root() -> Option<PathBuf> {
    let mut current_dir = std::env::current_dir().ok()?;

    loop {
        if current_dir.join(".git").exists() {
            return Some(current_dir);
        }

        if !current_dir.pop() {
            break;
        }
    }

    None
}

/// Load .env from the project root, falling back to the working directory
fn load_dotenv() {
    match find_project_root().map(|root| root.join(".env")) {
        Some(env_path) if env_path.exists() => {
            dotenv::from_path(&env_path).ok();
        }
        _ => {
            dotenv::dotenv().ok();
        }
    }
}

#[derive(Parser)]
#[command(name = "readscore")]
#[command(about = "ReadScore - score spoken sentences against the expected text", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to (overrides SERVER_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides SERVER_PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Log directory (overrides LOG_DIR)
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },

    /// Print the accuracy of a recognized sentence
    Score {
        /// Expected sentence
        expected: String,

        /// Recognized sentence
        recognized: String,
    },
}

async fn serve(config: AppConfig) -> Result<()> {
    config.validate()?;
    logger::setup_logging(&config.log_dir, &config.log_level)?;

    tracing::info!("ReadScore starting...");
    tracing::info!("  Bind: {}", config.server_bind_address());
    tracing::info!("  Transcoder: {}", config.transcoder);
    tracing::info!("  Language: {}", config.speech_language);

    println!("Server listening on http://{}", config.server_bind_address());

    readscore_server::start_server(config).await?;

    Ok(())
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_dotenv();

    match cli.command {
        Some(Commands::Serve { host, port, log_dir }) => {
            let mut config = AppConfig::from_env()?;

            // CLI arguments win over the environment
            if let Some(host) = host {
                config.server_host = host;
            }
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(log_dir) = log_dir {
                config.log_dir = log_dir;
            }

            serve(config).await?;
        }
        Some(Commands::Score { expected, recognized }) => {
            logger::setup_console_logging("warn")?;

            let accuracy = readscore_scoring::score(&expected, &recognized)?;
            println!("{:.2}", accuracy);
        }
        None => {
            let config = AppConfig::from_env()?;
            serve(config).await?;
        }
    }

    Ok(())
}
