//! Degree-minute-second coordinate parsing

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{TrackError, TrackResult};

fn dms_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(\d+(?:\.\d+)?)\s*deg\s*(\d+(?:\.\d+)?)'\s*(\d+(?:\.\d+)?)"\s*([NSEWnsew])$"#)
            .unwrap_or_else(|e| unreachable!("invalid DMS pattern: {e}"))
    })
}

fn decimal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+-]?\d+(?:\.\d+)?)\s*([NSEWnsew])?$")
            .unwrap_or_else(|e| unreachable!("invalid decimal pattern: {e}"))
    })
}

/// +1 for north/east, -1 for south/west
pub fn hemisphere_sign(hemisphere: char) -> Option<f64> {
    match hemisphere.to_ascii_uppercase() {
        'N' | 'E' => Some(1.0),
        'S' | 'W' => Some(-1.0),
        _ => None,
    }
}

/// `sign(H) * (D + M/60 + S/3600)`
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64, hemisphere: char) -> Option<f64> {
    hemisphere_sign(hemisphere).map(|sign| sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}

/// Parse a coordinate token into signed decimal degrees.
///
/// Accepts the tool's `23 deg 59' 7.82" N` form, and plain decimals with an
/// optional hemisphere letter (`23.985506 N`, `-120.68`).
pub fn parse_coordinate(token: &str) -> TrackResult<f64> {
    let token = token.trim();

    if let Some(caps) = dms_pattern().captures(token) {
        let number = |i: usize| caps[i].parse::<f64>().unwrap_or(0.0);
        let hemisphere = caps[4].chars().next().unwrap_or('?');
        return dms_to_decimal(number(1), number(2), number(3), hemisphere)
            .ok_or_else(|| TrackError::malformed(format!("bad hemisphere in '{}'", token)));
    }

    if let Some(caps) = decimal_pattern().captures(token) {
        let value: f64 = caps[1]
            .parse()
            .map_err(|_| TrackError::malformed(format!("bad coordinate '{}'", token)))?;
        let sign = match caps.get(2).and_then(|m| m.as_str().chars().next()) {
            Some(hemisphere) => hemisphere_sign(hemisphere).unwrap_or(1.0),
            None => 1.0,
        };
        return Ok(sign * value);
    }

    Err(TrackError::malformed(format!(
        "unrecognized coordinate '{}'",
        token
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(d: f64, m: f64, s: f64, sign: f64) -> f64 {
        sign * (d + m / 60.0 + s / 3600.0)
    }

    #[test]
    fn test_parse_tool_latitude() {
        let lat = parse_coordinate(r#"23 deg 59' 7.82" N"#).unwrap();
        assert!((lat - 23.985505555555555).abs() < 1e-9);
    }

    #[test]
    fn test_southern_and_western_hemispheres_are_negative() {
        let lon = parse_coordinate(r#"120 deg 41' 3.25" W"#).unwrap();
        assert!((lon + 120.68423611111112).abs() < 1e-9);
        let lat = parse_coordinate(r#"33 deg 51' 54.00" S"#).unwrap();
        assert!(lat < 0.0);
    }

    #[test]
    fn test_dms_grid_matches_reference() {
        for d in [0.0, 1.0, 23.0, 89.0, 121.0, 179.0] {
            for m in [0.0, 7.0, 30.0, 59.0] {
                for s in [0.0, 0.01, 7.82, 59.99] {
                    for (h, sign) in [('N', 1.0), ('S', -1.0), ('E', 1.0), ('W', -1.0)] {
                        let token = format!("{} deg {}' {}\" {}", d, m, s, h);
                        let parsed = parse_coordinate(&token).unwrap();
                        assert!((parsed - reference(d, m, s, sign)).abs() < 1e-6, "{}", token);
                        if parsed != 0.0 {
                            assert_eq!(parsed.signum(), sign, "{}", token);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_plain_decimals() {
        assert_eq!(parse_coordinate("121.5").unwrap(), 121.5);
        assert_eq!(parse_coordinate("-33.5").unwrap(), -33.5);
        assert_eq!(parse_coordinate("23.985506 S").unwrap(), -23.985506);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_coordinate("north-ish").is_err());
        assert!(parse_coordinate(r#"23 deg 59' 7.82" Q"#).is_err());
        assert!(parse_coordinate("").is_err());
    }
}
