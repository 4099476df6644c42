use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use dotenvy::dotenv;
use tracing_subscriber::filter::EnvFilter;

mod classify;
mod config;
mod error;
mod locate;
mod models;
mod present;
mod reference;
mod report;
mod synth;

use models::{BuildingRequest, LoadProfile, Vintage, WeatherMatch};
use reference::{DirectoryLibrary, ReferenceTables};

#[derive(Parser)]
#[command(name = "load-profile")]
#[command(version, about = "Hourly electricity and gas load profile estimator for commercial buildings", long_about = None)]
struct Cli {
    /// Zip code of the building
    #[arg(short, long, default_value_t = 80016)]
    zip: u32,
    /// Building type code following the NAICS schema
    #[arg(short = 't', long = "type", default_value = "61")]
    naics_type: String,
    /// Year the building was constructed
    #[arg(short, long, default_value_t = 2000)]
    year: i32,
    /// Net building square footage
    #[arg(short, long, default_value_t = 20000.0)]
    sqft: f64,
    /// Write spreadsheet and HTML charts (true) or a single JSON document (false)
    #[arg(short, long, default_value_t = true, action = ArgAction::Set)]
    vis: bool,
    /// Overrides LOADSHAPE_OUTPUT_DIR
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let cfg = config::load_from_env()?;
    init_tracing(&cfg.log_level);
    cfg.log_config();

    let request = BuildingRequest::new(&cli.naics_type, cli.zip, cli.year, cli.sqft)?;
    let Estimate {
        profile,
        weather,
        vintage,
    } = estimate(&request, &cfg.data_dir, &cfg.profile_dir)?;

    let out_dir = cli.output_dir.unwrap_or(cfg.output_dir);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    if cli.vis {
        let sheet = report::write_spreadsheet(&profile, &out_dir)?;
        println!("Spreadsheet written to {}.", sheet.display());
        for chart in report::write_charts(&profile, &out_dir)? {
            println!("Chart written to {}.", chart.display());
        }
    } else {
        let summary = present::summarize(&profile, &request, &weather, vintage);
        let path = report::write_json(&summary, &out_dir)?;
        println!("Profile {} written to {}.", summary.profile_id, path.display());
    }

    Ok(())
}

struct Estimate {
    profile: LoadProfile,
    weather: WeatherMatch,
    vintage: Vintage,
}

/// Classify, locate and synthesize the hourly profile for one building.
fn estimate(
    request: &BuildingRequest,
    data_dir: &Path,
    profile_dir: &Path,
) -> anyhow::Result<Estimate> {
    let tables = ReferenceTables::load(data_dir)?;

    let classification = classify::classify(&request.naics_code, request.floor_area_sqft, &tables)?;
    let weather = locate::locate(request.zip, &tables)?;
    let vintage = Vintage::for_reference_profiles(request.year_built);
    tracing::info!(
        naics = %request.naics_code,
        ?classification,
        station = %weather.station_id,
        weather_file = %weather.representative_weather_file,
        "building resolved"
    );

    let library = DirectoryLibrary::new(profile_dir, data_dir);
    let profile = synth::synthesize(request, &classification, vintage, &weather, &tables, &library)?;

    Ok(Estimate {
        profile,
        weather,
        vintage,
    })
}

/// Log to stderr so stdout carries only the result summary. `RUST_LOG`
/// takes precedence over the configured level.
fn init_tracing(level: &str) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
