//! Coordinate text parsing.
//!
//! Accepts a hemisphere form (`40.7128° N`, `74.0060 w`, `12.5 degrees south`) and falls
//! back to a plain signed number (`-0.1278`, `1e-3`). The hemisphere form is read by a small
//! tokenizer: an optional sign, a numeral, an optional degree marker and an optional
//! hemisphere indicator, in that order. Whitespace may separate everything except the sign,
//! which has to sit directly in front of the digits.

use crate::{Coordinate, GeoError, Result};

/// Hemisphere indicator following a coordinate magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    /// `N` or `north`
    North,
    /// `S` or `south`
    South,
    /// `E` or `east`
    East,
    /// `W` or `west`
    West,
}

impl Hemisphere {
    /// Parses a single letter or full word, case-insensitively.
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "n" | "north" => Some(Self::North),
            "s" | "south" => Some(Self::South),
            "e" | "east" => Some(Self::East),
            "w" | "west" => Some(Self::West),
            _ => None,
        }
    }

    /// Sign applied to the magnitude: negative for south and west.
    pub fn sign(self) -> f64 {
        match self {
            Self::North | Self::East => 1.0,
            Self::South | Self::West => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Sign(f64),
    Numeral(&'a str),
    Degree,
    Hemisphere(Hemisphere),
    Other,
}

/// Splits normalized coordinate text into tokens, skipping whitespace.
fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if !(d.is_ascii_digit() || d == '.') {
                    break;
                }
                end = i + d.len_utf8();
                chars.next();
            }
            tokens.push(Token::Numeral(&input[start..end]));
        } else if c.is_alphabetic() {
            let mut end = start;
            while let Some(&(i, d)) = chars.peek() {
                if !d.is_alphabetic() {
                    break;
                }
                end = i + d.len_utf8();
                chars.next();
            }
            tokens.push(
                Hemisphere::from_word(&input[start..end])
                    .map_or(Token::Other, Token::Hemisphere),
            );
        } else {
            chars.next();
            // A sign only counts when it is attached to the numeral
            let attached = chars
                .peek()
                .is_some_and(|&(_, d)| d.is_ascii_digit() || d == '.');
            tokens.push(match c {
                '°' => Token::Degree,
                '-' if attached => Token::Sign(-1.0),
                '+' if attached => Token::Sign(1.0),
                _ => Token::Other,
            });
        }
    }

    tokens
}

/// Reads `[sign] numeral [degree] [hemisphere]` and nothing else.
///
/// The sign must touch the numeral and cannot be combined with a degree marker or a
/// hemisphere indicator.
fn parse_hemisphere_form(tokens: &[Token<'_>]) -> Option<f64> {
    let mut rest = tokens;

    let sign = match rest.first() {
        Some(Token::Sign(s)) => {
            rest = &rest[1..];
            Some(*s)
        }
        _ => None,
    };

    let magnitude: f64 = match rest.first() {
        Some(Token::Numeral(text)) => {
            rest = &rest[1..];
            text.parse().ok()?
        }
        _ => return None,
    };

    let degree = matches!(rest.first(), Some(Token::Degree));
    if degree {
        rest = &rest[1..];
    }

    let hemisphere = match rest.first() {
        Some(Token::Hemisphere(h)) => {
            rest = &rest[1..];
            Some(*h)
        }
        _ => None,
    };

    if !rest.is_empty() {
        return None;
    }

    match (sign, hemisphere) {
        // "-40 S" has no single meaning
        (Some(_), Some(_)) => None,
        // degree notation is unsigned
        (Some(_), None) if degree => None,
        (None, Some(h)) => Some(h.sign() * magnitude),
        (Some(s), None) => Some(s * magnitude),
        (None, None) => Some(magnitude),
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase().replace("degrees", "").trim().to_string()
}

/// Converts coordinate text to signed decimal degrees.
///
/// # Example
/// ```
/// use geomatch_geo::parse_coordinate;
///
/// assert_eq!(parse_coordinate("40.7128 N").unwrap(), 40.7128);
/// assert_eq!(parse_coordinate("74.0060° W").unwrap(), -74.0060);
/// assert_eq!(parse_coordinate("-0.1278").unwrap(), -0.1278);
/// assert!(parse_coordinate("invalid data").is_err());
/// ```
pub fn parse_coordinate(text: &str) -> Result<f64> {
    let normalized = normalize(text);

    if let Some(value) = parse_hemisphere_form(&tokenize(&normalized)) {
        return Ok(value);
    }

    normalized
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeoError::InvalidFormat(text.trim().to_string()))
}

/// Parses a `"<lat-text>, <lon-text>"` line into a validated coordinate.
///
/// # Example
/// ```
/// use geomatch_geo::{parse_pair, Coordinate};
///
/// let nyc = parse_pair("40.7128° N, 74.0060° W").unwrap();
/// assert_eq!(nyc, Coordinate::new(40.7128, -74.0060));
/// ```
pub fn parse_pair(line: &str) -> Result<Coordinate> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    let [lat_text, lon_text] = parts.as_slice() else {
        return Err(GeoError::InvalidPair(line.trim().to_string()));
    };

    let latitude = parse_coordinate(lat_text)?;
    let longitude = parse_coordinate(lon_text)?;
    Coordinate::validated(latitude, longitude)
}
