use anyhow::{bail, Context};
use clap::Parser;
use listmap::{
    core::config::MarkerConfig,
    prelude::{Interaction, LatLng, LayerOperations, LocationRecord, MapSession, Point},
    runtime::settle,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "listmap-app")]
#[command(about = "Load listing datasets and report marker rendering per zoom level", long_about = None)]
struct Cli {
    /// JSON files, each an array of listing records
    #[arg(required = true)]
    datasets: Vec<PathBuf>,

    /// Zoom levels to render at, in order
    #[arg(long = "zoom", default_values_t = [10.0, 13.0])]
    zooms: Vec<f64>,

    /// Hide pin labels
    #[arg(long = "no-labels", action = clap::ArgAction::SetTrue)]
    no_labels: bool,

    #[arg(long, default_value_t = 1024.0)]
    width: f64,

    #[arg(long, default_value_t = 768.0)]
    height: f64,

    /// Partial JSON marker configuration layered over the defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

fn load_records(path: &Path) -> anyhow::Result<Vec<LocationRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<MarkerConfig> {
    match path {
        None => Ok(MarkerConfig::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            MarkerConfig::from_json(&text).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
        }
    }
}

fn report(session: &MapSession) {
    let map = session.map();
    println!(
        "zoom {:.1}: {} layers, {} features",
        map.zoom(),
        map.layers().len(),
        map.layers().feature_count()
    );
    for dataset in session.datasets().datasets() {
        println!(
            "  {:<24} {:<9} {} groups",
            dataset.name,
            session.controller().state(&dataset.id).to_string(),
            session.controller().groups(&dataset.id).len()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    config.styling.show_labels = !cli.no_labels;
    let mut session = MapSession::new(
        config.clone(),
        LatLng::new(37.5665, 126.9780),
        listmap::constants::DEFAULT_ZOOM,
        Point::new(cli.width, cli.height),
    );

    for path in &cli.datasets {
        let records = load_records(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let id = session.datasets_mut().add_dataset(records, &name);
        if let Some(stats) = session.datasets().dataset_stats(&id) {
            log::info!(
                "{}: {} records, {} without coordinates",
                name,
                stats.total,
                stats.invalid_coordinates
            );
        }
    }

    settle(&mut session).await;
    let padding = config.interaction.fit_padding_px;
    if session.map_mut().fit_all(padding, config.interaction.fit_max_zoom).is_none() {
        bail!("no dataset contains a geocoded record");
    }
    settle(&mut session).await;

    for zoom in &cli.zooms {
        session.set_zoom(*zoom);
        settle(&mut session).await;
        report(&session);
    }

    let target = session
        .map()
        .layers()
        .layers()
        .into_iter()
        .flat_map(|layer| layer.features().first())
        .next()
        .map(|feature| session.map().feature_pixel(feature));
    if let Some(pixel) = target {
        // Pins are anchored at their tip; aim slightly above it
        let pixel = Point::new(pixel.x, pixel.y - 4.0);
        match session.click(pixel) {
            Interaction::Select(Some(group)) => {
                println!(
                    "clicked {} ({} units) at {}, {}",
                    group.name,
                    group.unit_count(),
                    group.lat,
                    group.lon
                )
            }
            Interaction::Select(None) => println!("click selected nothing"),
            Interaction::ZoomToExtent(request) => {
                settle(&mut session).await;
                println!("click zoomed into a cluster (max zoom {})", request.max_zoom);
                report(&session);
            }
            Interaction::Ignored => {}
        }
    }

    Ok(())
}
