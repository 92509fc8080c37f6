use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

use endpoint_resolver::{DefaultResolver, Environment, HttpProbe, Probe, ResolverConfig, config};

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[derive(Parser)]
#[command(name = "endpoint-resolver", version)]
struct Cli {
    /// Path to a resolver YAML config (defaults are used when omitted)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Override the active environment
    #[arg(long, global = true, env = "ENDPOINT_RESOLVER_ENV")]
    env: Option<Environment>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resolved backend base URL
    Resolve,
    /// Print the endpoint map for the active environment
    Endpoints {
        /// Also print the image URL for this report
        #[arg(long)]
        report_id: Option<String>,
        /// Skip probing and use the static URL of the environment
        #[arg(long = "static")]
        no_probe: bool,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a single base URL's health endpoint (exit 1 when unreachable)
    Probe { url: String },
    /// List development candidates in probe order
    Candidates,
    /// Print the current network snapshot as JSON
    NetworkInfo,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

async fn load_config(cli: &Cli) -> Result<ResolverConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => config::load(path).await?,
        None => ResolverConfig::default(),
    };
    if let Some(env) = cli.env {
        config.environment = env;
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(&cli).await?;

    if let Command::Probe { url } = &cli.command {
        let probe = HttpProbe::new(&config.probe)?;
        let url = url.trim_end_matches('/');
        let reachable = probe.is_reachable(url).await;
        println!("{url}: {}", if reachable { "reachable" } else { "unreachable" });
        return Ok(if reachable {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let resolver = DefaultResolver::from_config(config)?;
    tracing::debug!(environment = %resolver.environment(), "resolver ready");

    match cli.command {
        Command::Resolve => println!("{}", resolver.base_url().await),
        Command::Endpoints {
            report_id,
            no_probe,
            json,
        } => {
            let map = if no_probe {
                resolver.static_endpoints()
            } else {
                resolver.endpoints().await
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                for (name, url) in map.entries() {
                    println!("{name:<22} {url}");
                }
            }
            if let Some(id) = report_id {
                println!("{:<22} {}", "GET_IMAGE(id)", map.get_image(&id));
            }
        }
        Command::Candidates => {
            for url in resolver.candidates().await {
                println!("{url}");
            }
        }
        Command::NetworkInfo => {
            let info = resolver.network_info().await;
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Command::Probe { .. } => {}
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
