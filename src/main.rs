use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use tagofy::{
    Config,
    assets::{HttpFetcher, OfflineClient},
    compositor::Renderer,
    geocode::{GeminiGeocoder, resolve_location},
    pipeline::tag_photo,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tag a photo with the geolocation overlay (default command)
    Tag {
        /// Photo to tag
        input: PathBuf,

        /// Directory the tagged JPEG is written to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Skip all network access (geocoding, icon, satellite tile)
        #[arg(long)]
        offline: bool,

        /// Override the configured capture latitude
        #[arg(long)]
        latitude: Option<f64>,

        /// Override the configured capture longitude
        #[arg(long)]
        longitude: Option<f64>,
    },

    /// Print the default configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Config) => {
            print!("{}", toml_edit::ser::to_string_pretty(&Config::default())?);
            Ok(())
        }
        Some(Commands::Tag {
            input,
            output,
            offline,
            latitude,
            longitude,
        }) => {
            let config = load_config(&cli.config)?;
            run_tag(config, input, output, offline, latitude, longitude).await
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        let config_content = std::fs::read_to_string(path)?;
        Ok(toml_edit::de::from_str::<Config>(&config_content)?)
    } else {
        warn!("config file {:?} not found, using defaults", path);
        Ok(Config::default())
    }
}

async fn run_tag(
    config: Config,
    input: PathBuf,
    output: PathBuf,
    offline: bool,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let lat = latitude.unwrap_or(config.capture.latitude);
    let lon = longitude.unwrap_or(config.capture.longitude);

    let geocoder = if offline {
        None
    } else {
        match GeminiGeocoder::new(config.geocode.api_key.clone(), config.geocode.model.clone()) {
            Ok(geocoder) => Some(geocoder),
            Err(e) => {
                warn!("geocoder unavailable, using fallback location: {}", e);
                None
            }
        }
    };

    let geo = resolve_location(
        geocoder.as_ref(),
        lat,
        lon,
        chrono::Local::now(),
        &config.capture.timezone,
    )
    .await;
    info!(
        city = %geo.city,
        address = %geo.address,
        "location resolved"
    );

    let renderer = Renderer::from_config(&config.overlay);

    // Offline runs use a client that fails every fetch, so the icon and map
    // fall through to their deterministic placeholders.
    let written = if offline {
        tag_photo(
            &OfflineClient,
            &renderer,
            &geo,
            &config.overlay.branding_icon_url,
            config.overlay.tile_zoom,
            &input,
            &output,
        )
        .await?
    } else {
        tag_photo(
            &HttpFetcher::new()?,
            &renderer,
            &geo,
            &config.overlay.branding_icon_url,
            config.overlay.tile_zoom,
            &input,
            &output,
        )
        .await?
    };

    println!("{}", written.display());
    Ok(())
}
