//! pinpix: pin map locations and browse nearby Flickr photos page by page.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pinpix_core::config::Config;
use pinpix_core::error::exit_codes;
use pinpix_flickr::{
    ClientConfig, ErrorKind, FlickrClient, JsonFileStore, PhotoAlbum, PhotoStore, SearchError,
};
use pinpix_geo::Coordinate;
use pinpix_telemetry::{TelemetryConfig, Timer};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod output;

use output::{format_count, format_duration, format_size, print_photos, spinner, Status};

#[derive(Parser)]
#[command(name = "pinpix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to pinpix.toml
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pin a location; re-pinning a name moves it and clears its photos
    Pin {
        /// Location name
        name: String,
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },

    /// Remove a pin and its photos
    Unpin {
        /// Location name
        name: String,
    },

    /// List pinned locations
    Pins {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch the next page of photos for a pin
    Photos {
        /// Location name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// One-off search around a coordinate, nothing is stored
    Search {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Page to fetch, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a photo's image
    Download {
        /// Image URL
        url: String,
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&format!("{e:#}"));
            ExitCode::from(u8::try_from(exit_code_for(&e)).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let mut telemetry = TelemetryConfig::from_logging(&config.schema.logging);
    if cli.verbose {
        telemetry = telemetry.verbose();
    }
    pinpix_telemetry::init_with_config(telemetry)?;
    tracing::debug!(config = ?config.path, session_id = pinpix_telemetry::session_id(), "Starting");

    match cli.command {
        Commands::Pin { name, lat, lon } => {
            let coordinate = Coordinate::new(lat, lon);
            open_store(&config)?.add_pin(&name, coordinate)?;
            Status::success(&format!("Pinned {name} at {coordinate}"));
        }

        Commands::Unpin { name } => {
            if open_store(&config)?.remove_pin(&name)? {
                Status::success(&format!("Removed {name}"));
            } else {
                Status::warning(&format!("No pin named {name}"));
            }
        }

        Commands::Pins { json } => list_pins(&open_store(&config)?, json)?,

        Commands::Photos { name, json } => {
            let album = PhotoAlbum::new(client(&config)?, Arc::new(open_store(&config)?));

            let progress = (!json).then(|| spinner(&format!("Searching around {name}...")));
            let timer = Timer::start("photos");
            let result = album.request_photos(&name).await;
            let elapsed = timer.stop();
            if let Some(pb) = progress {
                pb.finish_and_clear();
            }
            let update = result?;

            if json {
                let value = serde_json::json!({
                    "key": update.key,
                    "page": update.page,
                    "total_pages": update.state.total_pages,
                    "next_page": update.state.next_page,
                    "photos": update.photos,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                Status::header(&format!(
                    "{name}: page {} of {} ({})",
                    update.page,
                    update.state.total_pages,
                    format_count(update.photos.len(), "photo", "photos")
                ));
                if update.photos.is_empty() {
                    Status::warning("No photos found near this pin");
                } else {
                    print_photos(&update.photos);
                }
                println!();
                Status::info(&format!(
                    "Fetched in {}; next request loads page {}",
                    format_duration(elapsed),
                    update.state.next_page
                ));
            }
        }

        Commands::Search { lat, lon, page, json } => {
            let client = client(&config)?;
            let found = client.search(Coordinate::new(lat, lon), page).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                Status::header(&format!(
                    "Page {page} of {} ({})",
                    found.total_pages,
                    format_count(found.photos.len(), "photo", "photos")
                ));
                print_photos(&found.photos);
            }
        }

        Commands::Download { url, output } => {
            let client = client(&config)?;

            let progress = spinner("Downloading...");
            let result = client.download_image(&url).await;
            progress.finish_and_clear();
            let bytes = result?;

            std::fs::write(&output, &bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            Status::success(&format!(
                "Saved {} to {}",
                format_size(bytes.len() as u64),
                output.display()
            ));
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<JsonFileStore> {
    Ok(JsonFileStore::open(config.store_path()?)?)
}

fn client(config: &Config) -> anyhow::Result<FlickrClient> {
    let client_config = ClientConfig::from_section(&config.schema.flickr)?;
    Ok(FlickrClient::with_config(client_config)?)
}

fn list_pins(store: &JsonFileStore, json: bool) -> anyhow::Result<()> {
    let pins = store.locations()?;

    if json {
        let mut entries = Vec::with_capacity(pins.len());
        for (key, coordinate) in &pins {
            let page = store.load_page_state(key)?;
            entries.push(serde_json::json!({
                "key": key,
                "latitude": coordinate.latitude,
                "longitude": coordinate.longitude,
                "photos": store.photos(key)?.len(),
                "next_page": page.map(|p| p.next_page),
            }));
        }
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if pins.is_empty() {
        Status::info("No pins yet. Add one with `pinpix pin <name> --lat <lat> --lon <lon>`");
        return Ok(());
    }

    Status::header(&format_count(pins.len(), "pin", "pins"));
    for (key, coordinate) in &pins {
        let photos = store.photos(key)?.len();
        println!(
            "  {key:<20} {coordinate}  {}",
            format_count(photos, "photo", "photos")
        );
    }
    Ok(())
}

/// Map an error to the process exit code
fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<SearchError>() {
        return match e.kind() {
            ErrorKind::InvalidRequest => exit_codes::VALIDATION_ERROR,
            ErrorKind::Config => exit_codes::CONFIG_ERROR,
            ErrorKind::Store => exit_codes::STORE_ERROR,
            ErrorKind::Transport | ErrorKind::MalformedResponse | ErrorKind::Provider => {
                exit_codes::NETWORK_ERROR
            }
            ErrorKind::Superseded => exit_codes::FAILURE,
        };
    }

    if let Some(e) = err.downcast_ref::<pinpix_core::Error>() {
        return e.code.exit_code();
    }

    exit_codes::FAILURE
}
