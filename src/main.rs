use clap::Parser;
use std::time::Duration;
use weathervane::config::Config;
use weathervane::flags::{spawn_poller, FlagClient, FlagSource};
use weathervane::server::{self, AppState};
use weathervane::weather::WeatherClient;

/// Weathervane — weather lookup proxy with feature-flag driven units.
///
/// Requires OPENWEATHERMAP_API_KEY in the environment. Flag modes
/// additionally require FF_API_KEY and FF_BASE_URL.
///
/// Examples:
///   weathervane
///   weathervane --port 9090 --flag-mode off
///   weathervane --flag-mode poll --poll-interval 30
#[derive(Parser)]
#[command(name = "weathervane", version, about, long_about = None)]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on.
    #[arg(long, short = 'p', default_value_t = 8080)]
    port: u16,

    /// How flag decisions are obtained: "off" (no flag service),
    /// "per-request" (one evaluation per lookup), or "poll"
    /// (background refresh on a fixed interval).
    #[arg(long, default_value = "per-request", value_parser = parse_flag_mode)]
    flag_mode: FlagMode,

    /// Polling cadence in seconds (poll mode only).
    #[arg(long, default_value_t = 10)]
    poll_interval: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagMode {
    Off,
    PerRequest,
    Poll,
}

fn parse_flag_mode(s: &str) -> Result<FlagMode, String> {
    match s.to_lowercase().as_str() {
        "off" => Ok(FlagMode::Off),
        "per-request" | "per_request" => Ok(FlagMode::PerRequest),
        "poll" => Ok(FlagMode::Poll),
        _ => Err(format!(
            "Unknown flag mode '{}'. Use 'off', 'per-request', or 'poll'.",
            s
        )),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let flags = match cli.flag_mode {
        FlagMode::Off => FlagSource::Disabled,
        FlagMode::PerRequest => FlagSource::PerRequest(flag_client(&config)),
        FlagMode::Poll => {
            let rx = spawn_poller(
                flag_client(&config),
                Duration::from_secs(cli.poll_interval.max(1)),
            );
            FlagSource::Polled(rx)
        }
    };

    let state = AppState {
        weather: WeatherClient::new(&config.weather_base_url, &config.weather_api_key),
        flags,
    };

    server::start(&cli.host, cli.port, state).await;
}

fn flag_client(config: &Config) -> FlagClient {
    let (url, key) = config.flag_credentials().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    FlagClient::new(url, key)
}
