//! Point set acquisition from files and interactive prompts.

use anyhow::{Context, Result};
use geomatch_geo::{GeoError, PointSet};
use std::io::{BufRead, Write};
use std::path::Path;

/// A line that could not be turned into a coordinate.
#[derive(Debug)]
pub struct RejectedLine {
    pub line_number: usize,
    pub error: GeoError,
}

/// Reads one `lat, lon` pair per line, skipping blank lines and `#` comments.
///
/// Bad lines are logged and returned alongside the accepted points.
pub fn read_points_file(path: &Path) -> Result<(PointSet, Vec<RejectedLine>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read points file {}", path.display()))?;
    Ok(parse_points(&content))
}

pub fn parse_points(content: &str) -> (PointSet, Vec<RejectedLine>) {
    let mut points = PointSet::new();
    let mut rejected = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Err(error) = points.push_line(trimmed) {
            let line_number = index + 1;
            tracing::warn!(line = line_number, error = %error, "Skipping point");
            rejected.push(RejectedLine { line_number, error });
        }
    }

    (points, rejected)
}

/// Prompts for points until the user types `done` or input ends.
///
/// Invalid entries are reported and re-prompted without aborting the set.
pub fn prompt_points<R, W>(set_name: &str, reader: &mut R, prompt: &mut W) -> Result<PointSet>
where
    R: BufRead,
    W: Write,
{
    writeln!(prompt, "\nEnter {} locations (format: Latitude, Longitude)", set_name)?;
    writeln!(prompt, "Separate the latitude and longitude with a comma")?;
    writeln!(prompt, "Examples: 40.7128° N, 74.0060° W OR 51.5074, -0.1278")?;
    writeln!(prompt, "Type 'done' when finished.")?;

    let mut points = PointSet::new();
    let mut line = String::new();

    loop {
        write!(prompt, "> ")?;
        prompt.flush()?;

        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let entry = line.trim();
        if entry.eq_ignore_ascii_case("done") {
            break;
        }
        if entry.is_empty() {
            continue;
        }

        if let Err(e) = points.push_line(entry) {
            writeln!(prompt, "Invalid input: {}. Please try again.", e)?;
        }
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geomatch_geo::Coordinate;
    use std::io::Cursor;

    #[test]
    fn test_parse_points_skips_comments_and_bad_lines() {
        let content = "# US cities\n40.7128 N, 74.0060 W\n\nnot a point\n34.0522, -118.2437\n95, 0\n";
        let (points, rejected) = parse_points(content);

        assert_eq!(points.as_slice(), &[
            Coordinate::new(40.7128, -74.0060),
            Coordinate::new(34.0522, -118.2437),
        ]);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].line_number, 4);
        assert!(matches!(rejected[0].error, GeoError::InvalidPair(_)));
        assert!(matches!(rejected[1].error, GeoError::LatitudeOutOfRange(_)));
    }

    #[test]
    fn test_read_points_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.txt");
        std::fs::write(&path, "51.5074, -0.1278\n").unwrap();

        let (points, rejected) = read_points_file(&path).unwrap();
        assert_eq!(points.len(), 1);
        assert!(rejected.is_empty());
        assert!(read_points_file(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_prompt_until_done() {
        let mut input = Cursor::new("40.7128 N, 74.0060 W\ninvalid\n\n51.5074, -0.1278\nDONE\n48.8566, 2.3522\n");
        let mut prompt = Vec::new();

        let points = prompt_points("Set 1", &mut input, &mut prompt).unwrap();
        assert_eq!(points.len(), 2);

        let shown = String::from_utf8(prompt).unwrap();
        assert!(shown.contains("Enter Set 1 locations"));
        assert!(shown.contains("Invalid input:"));

        // The rest of the input is left for the next set
        let points = prompt_points("Set 2", &mut input, &mut Vec::new()).unwrap();
        assert_eq!(points.as_slice(), &[Coordinate::new(48.8566, 2.3522)]);
    }

    #[test]
    fn test_prompt_stops_at_eof() {
        let mut input = Cursor::new("10, 10");
        let points = prompt_points("Set 1", &mut input, &mut Vec::new()).unwrap();
        assert_eq!(points.len(), 1);
    }
}
