use anyhow::{Context, Result};
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use std::path::PathBuf;
use sun_finder::core_modules::direction::spot_to_angles;
use sun_finder::core_modules::utils::image_helper::image_helper::{load_radiance, save_preview};
use sun_finder::pipeline::{FinderConfig, ProjectionKind, SunAngles, SunFinder};

#[derive(Parser, Debug)]
#[command(name = "probe_tester", about = "Locate the sun in a light probe or from coordinates")]
struct Args {
    /// YAML file with a `FinderConfig`; missing fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level specification, e.g. `info` or `sun_finder=debug`.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the sun in an HDR environment map.
    Image {
        path: PathBuf,

        #[arg(long, value_enum, default_value_t = ProjectionArg::Latlong)]
        projection: ProjectionArg,

        /// Overrides the detector percentile from the config.
        #[arg(long)]
        min_percentile: Option<f64>,

        /// Writes a tone-mapped PNG with the sun marked.
        #[arg(long)]
        preview: Option<PathBuf>,

        #[arg(long, default_value_t = 1.0)]
        exposure: f32,
    },
    /// Compute the sun position for a place and time.
    Coord {
        #[arg(long, allow_hyphen_values = true)]
        latitude: f64,

        #[arg(long, allow_hyphen_values = true)]
        longitude: f64,

        /// RFC 3339 timestamp with an explicit offset, e.g. 2024-06-21T13:00:00-04:00.
        #[arg(long)]
        time: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProjectionArg {
    Latlong,
    SkyLatlong,
    SkyAngular,
}

impl From<ProjectionArg> for ProjectionKind {
    fn from(arg: ProjectionArg) -> Self {
        match arg {
            ProjectionArg::Latlong => ProjectionKind::LatLong,
            ProjectionArg::SkyLatlong => ProjectionKind::SkyLatLong,
            ProjectionArg::SkyAngular => ProjectionKind::SkyAngular,
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<FinderConfig> {
    let Some(path) = path else {
        return Ok(FinderConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    serde_yml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

fn print_angles(angles: &SunAngles) {
    println!(
        "elevation: {:.6} rad ({:.3} deg from zenith)",
        angles.elevation,
        angles.elevation.to_degrees()
    );
    println!(
        "azimuth:   {:.6} rad ({:.3} deg)",
        angles.azimuth,
        angles.azimuth.to_degrees()
    );
}

fn main() -> Result<()> {
    // --- 1. Argument Parsing & Setup ---
    let args = Args::parse();
    let _logger = Logger::try_with_str(&args.log_level)?.start()?;
    let mut config = load_config(args.config.as_ref())?;

    match args.command {
        Command::Image {
            path,
            projection,
            min_percentile,
            preview,
            exposure,
        } => {
            // --- 2. Probe Loading ---
            if let Some(min_percentile) = min_percentile {
                config.detector.min_percentile = min_percentile;
            }
            let image = load_radiance(&path)
                .with_context(|| format!("loading light probe {}", path.display()))?;
            log::info!(
                "loaded {} ({}x{}, {} valid pixels)",
                path.display(),
                image.width(),
                image.height(),
                image.valid_pixel_count()
            );

            // --- 3. Detection ---
            let finder = SunFinder::new(config);
            let projection = ProjectionKind::from(projection);
            let spot = finder.find_spot(&image)?;
            println!(
                "spot: row {:.3}, col {:.3} ({} px above {:.4})",
                spot.row, spot.col, spot.area, spot.threshold
            );

            // --- 4. Visualization ---
            if let Some(preview) = preview {
                save_preview(&preview, &image, Some(&spot), exposure)
                    .with_context(|| format!("writing preview {}", preview.display()))?;
                log::info!("preview written to {}", preview.display());
            }

            let angles = spot_to_angles(&spot, image.width(), image.height(), &projection)?;
            print_angles(&angles);
        }
        Command::Coord {
            latitude,
            longitude,
            time,
        } => {
            let time = DateTime::parse_from_rfc3339(&time)
                .with_context(|| format!("'{time}' is not an RFC 3339 timestamp with offset"))?;
            let angles = SunFinder::new(config).from_coord(latitude, longitude, &time)?;
            print_angles(&angles);
        }
    }

    Ok(())
}
