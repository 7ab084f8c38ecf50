use anyhow::{Context, Result};
use clap::Parser;
use route_mapper::{
    sdk::config::MapboxConfig,
    sdk::display::MapView,
    sdk::routing::MapboxProvider,
    sdk::session::Session,
    sdk::util::log::init_logging,
};
use std::{fs::File, path::PathBuf};

/// Geocode a CSV of addresses and draw a driving route through them
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// CSV file with an `address` column
    #[arg(short, long)]
    csv: PathBuf,

    /// Where the route starts (e.g., "2788 San Tomas Expy, Santa Clara")
    #[arg(short, long)]
    reference: Option<String>,

    /// Extra destination appended after the CSV rows; repeatable
    #[arg(short, long = "destination")]
    destinations: Vec<String>,

    /// GeoJSON file to write
    #[arg(short, long, default_value = "map_view.geojson")]
    output: PathBuf,

    /// Routing profile, overriding MAPBOX_PROFILE
    #[arg(long)]
    profile: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = MapboxConfig::from_env()?;
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    let provider = MapboxProvider::new(&config).context("Failed to build Mapbox client")?;
    let mut session = Session::new(provider);

    let file = File::open(&cli.csv)
        .with_context(|| format!("Failed to open {}", cli.csv.display()))?;
    let added = session
        .upload_csv(file)
        .await
        .with_context(|| format!("Failed to read {}", cli.csv.display()))?;
    log::info!("{} destinations resolved from {}", added, cli.csv.display());

    for destination in &cli.destinations {
        session.add_destination(destination).await;
    }

    if let Some(reference) = &cli.reference {
        session.submit_reference(reference).await;
    }

    let state = session.into_state();
    match MapView::from_state(&state) {
        Some(view) => {
            view.write_geojson(&cli.output)
                .with_context(|| format!("Failed to write {}", cli.output.display()))?;
            log::info!(
                "Map view with {} markers{} written to {}",
                view.markers.len(),
                if view.route.is_some() { " and a route" } else { "" },
                cli.output.display()
            );
        }
        None => {
            log::warn!("No address could be resolved; nothing to display");
        }
    }

    Ok(())
}
