use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flood_relay::assessment::FloodAssessment;
use flood_relay::config::Config;
use flood_relay::dispatch::completion_queue;
use flood_relay::forecast::{build_forecast_summary, demo_forecast, ForecastItem};
use flood_relay::models::RasterImage;
use flood_relay::weather::OpenWeatherClient;
use flood_relay::{ContentGenerationRelay, RelayMode};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "flood-relay")]
#[command(about = "Ask a generative AI service about flood risk")]
struct CliArgs {
    /// Override RELAY_MODE (live or degraded).
    #[arg(long, global = true, value_parser = parse_mode_arg)]
    mode: Option<RelayMode>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Relay a forecast prompt. Uses OpenWeatherMap when OPENWEATHER_API_KEY
    /// is set, otherwise the demo forecast.
    Forecast {
        #[arg(long, default_value = DEMO_CITY)]
        city: String,

        /// Send this text instead of the forecast summary.
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Relay a photo for flood analysis.
    Analyze {
        #[arg(value_name = "IMAGE_PATH")]
        image: PathBuf,
    },
}

/// The only city the demo forecast describes.
const DEMO_CITY: &str = "Kuala Lumpur";

fn parse_mode_arg(input: &str) -> std::result::Result<RelayMode, String> {
    input.parse().map_err(|e: flood_relay::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flood_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    let credential = config.credential()?;

    info!("Starting flood-relay in {} mode", config.mode);

    // Completions are run on this task, the way a UI thread drains its queue.
    let (queue, mut driver) = completion_queue();
    let relay = ContentGenerationRelay::from_config(&config)?.with_completion_context(Arc::new(queue));

    let reply = Arc::new(Mutex::new(None::<String>));
    let store = {
        let reply = Arc::clone(&reply);
        move |text: String| {
            if let Ok(mut slot) = reply.lock() {
                *slot = Some(text);
            }
        }
    };

    let analyzing = matches!(args.command, Command::Analyze { .. });
    match args.command {
        Command::Forecast { city, prompt } => {
            let prompt = match prompt {
                Some(prompt) => prompt,
                None => {
                    let (label, items) = forecast_for(&config, &city).await?;
                    build_forecast_summary(&label, &items)
                }
            };
            info!("Requesting forecast analysis for {}", city);
            relay.generate_from_text(credential, prompt, store);
        }
        Command::Analyze { image } => {
            let raster = RasterImage::open(&image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            info!(
                "Requesting flood analysis for {} ({}x{})",
                image.display(),
                raster.width(),
                raster.height()
            );
            relay.analyze_image(credential, raster, store);
        }
    }

    driver.run_next().await;

    let text = reply
        .lock()
        .map_err(|_| anyhow::anyhow!("Completion handler panicked"))?
        .take()
        .unwrap_or_default();
    println!("{}", text);

    if analyzing {
        let assessment = FloodAssessment::parse(&text);
        if !assessment.is_error {
            println!();
            println!(
                "Flood detected: {} | Severity: {}",
                if assessment.flood_detected { "yes" } else { "no" },
                assessment.severity
            );
        }
    }

    Ok(())
}

/// Live intervals for `city` when a weather key is configured. Otherwise the
/// demo forecast, which is always labelled with the city it describes.
async fn forecast_for(config: &Config, city: &str) -> Result<(String, Vec<ForecastItem>)> {
    match &config.weather_api_key {
        Some(key) => {
            let client = OpenWeatherClient::new(key.clone())
                .with_base_url(config.weather_base_url.clone());
            let items = client
                .fetch_forecast(city)
                .await
                .with_context(|| format!("Failed to fetch forecast for {}", city))?;
            Ok((city.to_string(), items))
        }
        None => {
            if city != DEMO_CITY {
                warn!(
                    "OPENWEATHER_API_KEY not set; using demo forecast for {} instead of {}",
                    DEMO_CITY, city
                );
            }
            Ok((DEMO_CITY.to_string(), demo_forecast()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode_arg_valid() {
        assert_eq!(parse_mode_arg("live").unwrap(), RelayMode::Live);
    }

    #[test]
    fn test_parse_mode_arg_invalid() {
        let err = parse_mode_arg("sometimes").unwrap_err();
        assert!(err.contains("live"));
    }

    fn config_without_weather_key() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    #[tokio::test]
    async fn test_demo_forecast_keeps_its_own_label() {
        let config = config_without_weather_key();

        let (label, items) = forecast_for(&config, "Ipoh").await.unwrap();

        assert_eq!(label, "Kuala Lumpur");
        assert_eq!(items, demo_forecast());
    }

    #[tokio::test]
    async fn test_weather_key_fetches_requested_city() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "Ipoh,MY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "list": [{
                    "dt_txt": "2026-10-20 03:00:00",
                    "main": { "temp": 24.5, "humidity": 96 },
                    "wind": { "speed": 2.0, "gust": 3.5 },
                    "rain": { "3h": 41.0 },
                    "clouds": { "all": 100 },
                    "weather": [{ "description": "heavy intensity rain" }]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config_without_weather_key();
        config.weather_api_key = Some("owm".to_string());
        config.weather_base_url = server.uri();

        let (label, items) = forecast_for(&config, "Ipoh").await.unwrap();

        assert_eq!(label, "Ipoh");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].date_time, "Tue 03:00");
        assert_eq!(items[0].rainfall, 41.0);
    }

    #[test]
    fn test_cli_parses_analyze() {
        let args = CliArgs::try_parse_from(["flood-relay", "--mode", "degraded", "analyze", "x.jpg"])
            .unwrap();
        assert_eq!(args.mode, Some(RelayMode::Degraded));
        assert!(matches!(args.command, Command::Analyze { .. }));
    }
}
