//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use geomatch_geo::{resolve, CityTable, MatchResult};
use owo_colors::OwoColorize;
use std::fmt::Write;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Render match results as a fixed-width table.
///
/// When a city table is given, the resolved names of both points are added as two extra
/// columns. `precision` controls the number of decimals printed for coordinates.
pub fn render_match_table(
    results: &[MatchResult],
    cities: Option<&CityTable>,
    precision: usize,
) -> String {
    // Wide enough for the "Closest Lat" label at low precision
    let width = (precision + 8).max(12);
    let mut out = String::new();

    let mut header = format!(
        "{:<width$}{:<width$}  ->  {:<width$}{:<width$}  {:>13}",
        "Lat1", "Lon1", "Closest Lat", "Closest Lon", "Distance (km)",
    );
    if cities.is_some() {
        let _ = write!(header, "  {:<28}{}", "Location", "Closest Location");
    }
    let rule = "-".repeat(header.len());

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "{}", header.trim_end());
    let _ = writeln!(out, "{}", rule);

    for result in results {
        let mut line = format!(
            "{:<width$.precision$}{:<width$.precision$}  ->  {:<width$.precision$}{:<width$.precision$}  {:>13.2}",
            result.source.latitude,
            result.source.longitude,
            result.matched.latitude,
            result.matched.longitude,
            result.distance_km,
        );
        if let Some(table) = cities {
            let _ = write!(
                line,
                "  {:<28}{}",
                resolve(&result.source, table).to_string(),
                resolve(&result.matched, table),
            );
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }

    out
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
