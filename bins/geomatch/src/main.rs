//! geomatch: match each point of one coordinate set to its nearest point in another.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use geomatch_cli::output::{format_count, render_match_table, Status};
use geomatch_geo::{
    haversine_distance, haversine_distance_meters, match_closest_points,
    match_closest_points_sequential, parse_coordinate, parse_pair, resolve, CityTable,
    Coordinate, MatchResult, PointSet,
};
use geomatch_telemetry::{TelemetryConfig, Timer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod cities;
mod config;
mod input;

use config::{Config, OutputFormat};

/// Nearest-neighbor matching between two sets of geographic coordinates
#[derive(Parser)]
#[command(name = "geomatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to .geomatch.toml or geomatch.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format, overrides the configuration file
    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every point of set A to its closest point in set B
    Match {
        /// File with set A, one "lat, lon" per line (prompts when omitted)
        #[arg(long)]
        set_a: Option<PathBuf>,

        /// File with set B, one "lat, lon" per line (prompts when omitted)
        #[arg(long)]
        set_b: Option<PathBuf>,

        /// City table CSV (path or http(s) URL) used to name matched points
        #[arg(long, env = "GEOMATCH_CITIES")]
        cities: Option<String>,

        /// Match on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Great-circle distance between two "lat, lon" points
    Distance {
        /// Starting point, e.g. "40.7128 N, 74.0060 W"
        #[arg(allow_hyphen_values = true)]
        from: String,

        /// End point, e.g. "34.0522, -118.2437"
        #[arg(allow_hyphen_values = true)]
        to: String,

        /// Report meters instead of kilometers
        #[arg(long)]
        meters: bool,
    },

    /// Convert coordinate text to decimal degrees
    Parse {
        /// Coordinate texts, e.g. "40.7128° N" or "-0.1278"
        #[arg(required = true, allow_hyphen_values = true)]
        texts: Vec<String>,
    },

    /// Look up the city at a "lat, lon" point
    Resolve {
        /// Point to resolve
        #[arg(allow_hyphen_values = true)]
        point: String,

        /// City table CSV (path or http(s) URL)
        #[arg(long, env = "GEOMATCH_CITIES")]
        cities: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let _telemetry = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            Status::error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    if let Some(path) = &config.path {
        tracing::debug!(path = %path.display(), "Loaded configuration");
    }

    let format = cli.format.unwrap_or(config.schema.output.format);

    let result = match cli.command {
        Commands::Match {
            set_a,
            set_b,
            cities,
            sequential,
        } => run_match(
            &config,
            format,
            set_a.as_deref(),
            set_b.as_deref(),
            cities.or_else(|| config.schema.cities.source.clone()),
            sequential,
        ),
        Commands::Distance { from, to, meters } => run_distance(format, &from, &to, meters),
        Commands::Parse { texts } => run_parse(format, &texts),
        Commands::Resolve { point, cities } => run_resolve(
            format,
            &point,
            cities.or_else(|| config.schema.cities.source.clone()),
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli, config: &Config) -> Result<geomatch_telemetry::TelemetryGuard> {
    let mut telemetry = TelemetryConfig {
        log_level: config.schema.logging.level.clone(),
        log_file: config.schema.logging.file.clone(),
        ..TelemetryConfig::default()
    };
    if cli.verbose {
        telemetry = telemetry.verbose();
    }
    geomatch_telemetry::init_with_config(&telemetry)
}

/// One row of JSON match output
#[derive(Serialize)]
struct MatchRow<'a> {
    #[serde(flatten)]
    result: &'a MatchResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matched_location: Option<String>,
}

fn run_match(
    config: &Config,
    format: OutputFormat,
    set_a_path: Option<&Path>,
    set_b_path: Option<&Path>,
    cities_source: Option<String>,
    sequential: bool,
) -> Result<()> {
    // Load the table first so a bad source fails before any prompting
    let cities = cities_source
        .as_deref()
        .map(cities::load_city_table)
        .transpose()?;

    let stdin = std::io::stdin();
    let mut stdin = stdin.lock();
    let set_a = acquire_points("Set 1", set_a_path, &mut stdin)?;
    let set_b = acquire_points("Set 2", set_b_path, &mut stdin)?;

    let timer = Timer::start("match");
    let results = if sequential || !config.schema.matching.parallel {
        match_closest_points_sequential(&set_a, &set_b)
    } else {
        match_closest_points(&set_a, &set_b)
    }
    .context("Matching failed")?;
    timer.stop();

    tracing::info!(
        sources = set_a.len(),
        candidates = set_b.len(),
        "Matching complete"
    );

    match format {
        OutputFormat::Json => {
            let rows: Vec<MatchRow<'_>> = results
                .iter()
                .map(|result| MatchRow {
                    result,
                    source_location: cities
                        .as_ref()
                        .map(|t| resolve(&result.source, t).to_string()),
                    matched_location: cities
                        .as_ref()
                        .map(|t| resolve(&result.matched, t).to_string()),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            Status::header("Closest Matches:");
            print!(
                "{}",
                render_match_table(&results, cities.as_ref(), config.schema.output.precision)
            );
            Status::success(&format_count(results.len(), "match", "matches"));
        }
    }

    Ok(())
}

fn acquire_points(
    set_name: &str,
    path: Option<&Path>,
    stdin: &mut impl std::io::BufRead,
) -> Result<PointSet> {
    match path {
        Some(path) => {
            let (points, rejected) = input::read_points_file(path)?;
            for line in &rejected {
                Status::warning(&format!(
                    "{}:{}: {}",
                    path.display(),
                    line.line_number,
                    line.error
                ));
            }
            Ok(points)
        }
        None => input::prompt_points(set_name, stdin, &mut std::io::stderr()),
    }
}

fn run_distance(format: OutputFormat, from: &str, to: &str, meters: bool) -> Result<()> {
    let from = parse_pair(from).with_context(|| format!("Invalid starting point '{}'", from))?;
    let to = parse_pair(to).with_context(|| format!("Invalid end point '{}'", to))?;

    let (distance, unit) = if meters {
        (haversine_distance_meters(&from, &to), "m")
    } else {
        (haversine_distance(&from, &to), "km")
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "from": from, "to": to, "distance": distance, "unit": unit })
        ),
        OutputFormat::Text => println!("{:.2} {}", distance, unit),
    }
    Ok(())
}

fn run_parse(format: OutputFormat, texts: &[String]) -> Result<()> {
    let parsed: Vec<_> = texts.iter().map(|t| (t, parse_coordinate(t))).collect();
    let failures = parsed.iter().filter(|(_, r)| r.is_err()).count();

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = parsed
                .iter()
                .map(|(text, result)| match result {
                    Ok(value) => serde_json::json!({ "input": text, "value": value }),
                    Err(e) => serde_json::json!({ "input": text, "error": e.to_string() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text => {
            for (text, result) in &parsed {
                match result {
                    Ok(value) => println!("{:<24} {}", text, value),
                    Err(e) => Status::error(&e.to_string()),
                }
            }
        }
    }

    if failures > 0 {
        bail!(
            "{} of {} could not be parsed",
            failures,
            format_count(texts.len(), "coordinate", "coordinates")
        );
    }
    Ok(())
}

fn run_resolve(format: OutputFormat, point: &str, cities_source: Option<String>) -> Result<()> {
    let Some(source) = cities_source else {
        bail!("No city table given; use --cities, GEOMATCH_CITIES or [cities] source in the config");
    };

    let coord: Coordinate = parse_pair(point).with_context(|| format!("Invalid point '{}'", point))?;
    let table: CityTable = cities::load_city_table(&source)?;
    let resolution = resolve(&coord, &table);

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "point": coord,
                "known": resolution.is_known(),
                "city": resolution.record(),
                "location": resolution.to_string(),
            })
        ),
        OutputFormat::Text => println!("{}", resolution),
    }
    Ok(())
}
