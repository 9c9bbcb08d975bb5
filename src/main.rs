use clap::Parser;
use geotrim::{Geotrim, GeotrimConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Batch-geocode an `id,address` file, trimming unmatched addresses from the right.
#[derive(Parser, Debug)]
#[command(name = "geotrim", version, about)]
struct Cli {
    /// Input file with `id,address` lines
    #[arg(short, long, default_value = "addresses.csv")]
    input: PathBuf,

    /// Output file (`id,address,lat,lng`)
    #[arg(short, long, default_value = "addresses_geocoded.csv")]
    output: PathBuf,

    /// Pause between geocoded records, in milliseconds
    #[arg(long, default_value_t = 200, env = "GEOTRIM_DELAY_MS")]
    delay_ms: u64,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// File holding the API key when GOOGLE_API_KEY is unset
    #[arg(long, default_value = "google_api_key.txt")]
    key_file: PathBuf,

    /// Geocoding endpoint
    #[arg(long, env = "GEOTRIM_BASE_URL")]
    base_url: Option<String>,

    /// Verify TLS certificates of the geocoding endpoint
    #[arg(long)]
    verify_tls: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut builder = GeotrimConfig::builder()
        .input_path(cli.input)
        .output_path(cli.output)
        .api_key_file(cli.key_file)
        .request_delay(Duration::from_millis(cli.delay_ms))
        .timeout(Duration::from_secs(cli.timeout_secs))
        .accept_invalid_certs(!cli.verify_tls);
    if let Some(url) = cli.base_url {
        builder = builder.base_url(url);
    }

    let geotrim = match Geotrim::with_config(builder.build()) {
        Ok(geotrim) => geotrim,
        Err(err) => {
            tracing::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match geotrim.run().await {
        Ok(summary) => {
            tracing::info!(
                "done: {} records, {} resolved ({} via fallback), {} unresolved",
                summary.records,
                summary.resolved,
                summary.fallbacks,
                summary.unresolved
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
