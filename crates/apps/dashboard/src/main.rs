use std::fs;
use std::io;
use std::path::PathBuf;

use catalog::RegionCatalog;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use dashboard::{DashboardConfig, DashboardSession, RegionNavigation};
use dataset::{ExportFormat, FloatRecord, FloatSource, MockFloatSource, QcFlag, Variable};
use foundation::{GeoBox, InclusiveRange, LatLon, SpatialBound};
use layers::{FilterCriteria, QcPolicy};
use scene::{AoiMode, DashboardActions, LoggingActions};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use viewport::FlyTo;
use viewport::headless::HeadlessLoader;

#[derive(Parser, Debug)]
#[command(name = "float-atlas", version, about = "Browse simulated ARGO floats on a headless map")]
struct Args {
    /// JSON config file (defaults to $FLOAT_ATLAS_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated floats
    #[arg(long)]
    count: Option<usize>,

    /// Map access token (defaults to $FLOAT_ATLAS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the navigable regions
    Regions,

    /// Filter floats and export the visible set
    Filter {
        #[command(flatten)]
        filter: FilterArgs,

        /// Output format
        #[arg(long, default_value = "json")]
        format: ExportFormat,
    },

    /// Fly the camera to a region
    Fly { region: String },

    /// Visible floats nearest to a point
    Nearest {
        /// Point as lat,lon
        #[arg(allow_hyphen_values = true, value_parser = parse_point)]
        at: LatLon,

        #[arg(long, default_value_t = 5)]
        k: usize,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Click the map and print the selected float's popup
    Click {
        /// Point as lat,lon
        #[arg(allow_hyphen_values = true, value_parser = parse_point)]
        at: LatLon,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Draw an area of interest and export the floats inside it
    Aoi {
        #[arg(long, value_enum, default_value_t = Shape::Rectangle)]
        shape: Shape,

        /// Anchor (press) point as lat,lon
        #[arg(long, allow_hyphen_values = true, value_parser = parse_point)]
        from: LatLon,

        /// Release point as lat,lon
        #[arg(long, allow_hyphen_values = true, value_parser = parse_point)]
        to: LatLon,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(long, default_value = "json")]
        format: ExportFormat,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct FilterArgs {
    /// First profile date (YYYY-MM-DD)
    #[arg(long)]
    from_date: Option<NaiveDate>,

    /// Last profile date (YYYY-MM-DD)
    #[arg(long)]
    to_date: Option<NaiveDate>,

    #[arg(long)]
    min_depth: Option<u32>,

    #[arg(long)]
    max_depth: Option<u32>,

    #[arg(long, value_enum, default_value_t = QcArg::GoodOnly)]
    qc: QcArg,

    /// Restrict to a region's outline (e.g. arabian-sea)
    #[arg(long)]
    region: Option<String>,

    /// Restrict to a box: south,west,north,east
    #[arg(long, allow_hyphen_values = true, value_parser = parse_bbox)]
    bbox: Option<GeoBox>,

    /// Export columns, comma separated
    #[arg(long, value_delimiter = ',')]
    variables: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum QcArg {
    All,
    GoodOnly,
    BadOnly,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Shape {
    Rectangle,
    Circle,
}

fn parse_point(s: &str) -> Result<LatLon, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected lat,lon, got {s:?}"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("lat: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("lon: {e}"))?;
    let p = LatLon::new(lat, lon);
    if !p.is_valid() {
        return Err(format!("{lat},{lon} is not a valid position"));
    }
    Ok(p)
}

fn parse_bbox(s: &str) -> Result<GeoBox, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("{p:?}: {e}")))
        .collect::<Result<_, _>>()?;
    let [south, west, north, east] = parts[..] else {
        return Err(format!("expected south,west,north,east, got {s:?}"));
    };
    Ok(GeoBox::new(south, west, north, east))
}

type Session = DashboardSession<HeadlessLoader, Vec<FloatRecord>>;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = DashboardConfig::load(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(count) = args.count {
        config.float_count = count;
    }
    if let Some(token) = args.token {
        config.map_token = Some(token);
    }

    let catalog = match &config.regions_path {
        Some(path) => {
            let json = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
            RegionCatalog::with_overrides_json(&json)?
        }
        None => RegionCatalog::builtin(),
    };

    if let Command::Regions = args.command {
        let rows: Vec<_> = catalog.list().collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let dataset = pollster::block_on(MockFloatSource::new(config.generator_config()).load())?;
    let loader = match &config.map_token {
        Some(token) => HeadlessLoader::with_token(token.clone()),
        None => HeadlessLoader::without_token(),
    };
    let mut session: Session = DashboardSession::new(config, catalog, dataset, loader, Vec::new());

    if let Err(e) = pollster::block_on(session.mount()) {
        warn!("{e}");
        if let Some(placeholder) = session.viewport().placeholder() {
            eprintln!("{} (retry with --token or $FLOAT_ATLAS_TOKEN)", placeholder.message);
        }
    }

    let mut actions = LoggingActions;
    match args.command {
        Command::Regions => {}
        Command::Filter { filter, format } => {
            apply_filter(&mut session, &filter)?;
            let rows = session.export(format, io::stdout().lock())?;
            actions.export_requested(format, rows);
        }
        Command::Fly { region } => match session.select_region(&region) {
            RegionNavigation::Flying(FlyTo::Started(ticket)) => {
                // headless renderer: the animation ends immediately
                session.complete_flight(ticket);
                let camera = session.viewport().camera();
                let out = json!({
                    "region": region,
                    "center": camera.center,
                    "zoom": camera.zoom,
                    "duration_ms": session.config().fly_duration_ms,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            }
            RegionNavigation::Flying(FlyTo::Queued) => {
                info!("flight queued until the map is ready")
            }
            RegionNavigation::Custom => {
                println!("custom region: draw an AOI with `float-atlas aoi`")
            }
            RegionNavigation::Unknown(id) => return Err(format!("unknown region {id:?}").into()),
            RegionNavigation::MapUnavailable(e) => return Err(e.into()),
        },
        Command::Nearest { at, k, filter } => {
            apply_filter(&mut session, &filter)?;
            let rows: Vec<_> = session
                .nearest(at, k)
                .into_iter()
                .map(|(distance_m, r)| {
                    json!({
                        "id": r.id,
                        "platform_id": r.platform_id,
                        "distance_km": (distance_m / 100.0).round() / 10.0,
                        "qc_flag": r.qc_flag,
                        "depth_m": r.depth_m,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Click { at, filter } => {
            apply_filter(&mut session, &filter)?;
            if !session.viewport().is_ready() {
                return Err("map unavailable: cannot pick markers".into());
            }
            match session.click(at) {
                Some(id) => {
                    let popup = session.popup_text(&id).unwrap_or_default();
                    println!("{popup}");
                    actions.share_requested(&id);
                }
                None => match session.region_popup_at(at) {
                    Some(popup) => println!("{popup}"),
                    None => println!("no float at {},{}", at.lat, at.lon),
                },
            }
        }
        Command::Aoi {
            shape,
            from,
            to,
            filter,
            format,
        } => {
            apply_filter(&mut session, &filter)?;
            session.set_aoi_mode(match shape {
                Shape::Rectangle => AoiMode::Rectangle,
                Shape::Circle => AoiMode::Circle,
            });
            session.pointer_down(from);
            session.pointer_move(to);
            let bound = session
                .pointer_up(to)
                .ok_or("aoi gesture produced no geometry")?;
            info!(kind = ?bound.kind(), visible = session.visible().len(), "aoi applied");
            let rows = session.export(format, io::stdout().lock())?;
            actions.export_requested(format, rows);
        }
    }

    session.teardown();
    Ok(())
}

fn apply_filter(session: &mut Session, args: &FilterArgs) -> Result<(), String> {
    let defaults = FilterCriteria::default();
    let date_range = InclusiveRange::new(
        args.from_date.unwrap_or(defaults.date_range.start),
        args.to_date.unwrap_or(defaults.date_range.end),
    );
    let depth_range = InclusiveRange::new(
        args.min_depth.unwrap_or(defaults.depth_range.start),
        args.max_depth.unwrap_or(defaults.depth_range.end),
    );
    let qc_policy = match args.qc {
        QcArg::All => QcPolicy::All,
        QcArg::GoodOnly => QcPolicy::GoodOnly,
        QcArg::BadOnly => QcPolicy::Custom([QcFlag::Bad].into_iter().collect()),
    };
    let enabled_variables = if args.variables.is_empty() {
        defaults.enabled_variables.clone()
    } else {
        args.variables
            .iter()
            .map(|v| Variable::parse(v.trim()).ok_or_else(|| format!("unknown variable {v:?}")))
            .collect::<Result<_, _>>()?
    };
    let spatial_bound = match (&args.region, args.bbox) {
        (Some(_), Some(_)) => return Err("--region and --bbox are mutually exclusive".to_string()),
        (Some(id), None) => {
            let region = session
                .catalog()
                .resolve(id)
                .map_err(|e| e.to_string())?;
            let bounds = region
                .bounds
                .ok_or_else(|| format!("region {id:?} has no outline"))?;
            Some(SpatialBound::Rectangle(bounds))
        }
        (None, Some(b)) => Some(SpatialBound::Rectangle(b)),
        (None, None) => None,
    };

    session.set_criteria(FilterCriteria {
        date_range,
        depth_range,
        qc_policy,
        enabled_variables,
        spatial_bound,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_bbox, parse_point};
    use foundation::{GeoBox, LatLon};

    #[test]
    fn parses_points_and_boxes() {
        assert_eq!(parse_point("10, 75"), Ok(LatLon::new(10.0, 75.0)));
        assert!(parse_point("95,0").is_err());
        assert!(parse_point("10").is_err());
        assert_eq!(parse_bbox("5,50,30,80"), Ok(GeoBox::new(5.0, 50.0, 30.0, 80.0)));
        assert!(parse_bbox("5,50,30").is_err());
    }
}
