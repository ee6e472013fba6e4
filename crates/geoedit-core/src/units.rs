//! Units and numeric entry parsing
//!
//! Geometry is stored in document units; the measurement system only decides
//! labels and how typed values are read. Typed values accept decimals and,
//! for imperial documents, mixed fractions ("1 1/2").

use crate::error::{EditorError, EditorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Measurement system of the edited document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl MeasurementSystem {
    /// Unit label ("mm" or "in")
    pub fn label(&self) -> &'static str {
        match self {
            Self::Metric => "mm",
            Self::Imperial => "in",
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Format a length in document units with the given number of decimals.
pub fn format_length(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Parse a typed numeric entry.
///
/// Empty input, non-numeric text and non-finite values are rejected with
/// [`EditorError::InvalidParameter`] naming `param`.
pub fn parse_value(param: &str, input: &str, system: MeasurementSystem) -> EditorResult<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EditorError::invalid_parameter(param, "value is empty"));
    }

    let value = match system {
        MeasurementSystem::Metric => parse_decimal(param, input)?,
        MeasurementSystem::Imperial if input.contains('/') => {
            let mut total = 0.0;
            for part in input.split_whitespace() {
                total += if part.contains('/') {
                    parse_fraction(param, part)?
                } else {
                    parse_decimal(param, part)?
                };
            }
            total
        }
        MeasurementSystem::Imperial => parse_decimal(param, input)?,
    };

    if !value.is_finite() {
        return Err(EditorError::invalid_parameter(param, "value is not finite"));
    }
    Ok(value)
}

fn parse_decimal(param: &str, input: &str) -> EditorResult<f64> {
    input
        .parse::<f64>()
        .map_err(|_| EditorError::invalid_parameter(param, format!("'{}' is not a number", input)))
}

fn parse_fraction(param: &str, input: &str) -> EditorResult<f64> {
    let parts: Vec<&str> = input.split('/').collect();
    if parts.len() != 2 {
        return Err(EditorError::invalid_parameter(
            param,
            format!("'{}' is not a valid fraction", input),
        ));
    }
    let num = parse_decimal(param, parts[0])?;
    let den = parse_decimal(param, parts[1])?;
    if den == 0.0 {
        return Err(EditorError::invalid_parameter(param, "division by zero"));
    }
    Ok(num / den)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_values() {
        assert_eq!(parse_value("x", "10.5", MeasurementSystem::Metric).unwrap(), 10.5);
        assert_eq!(parse_value("x", "  -2  ", MeasurementSystem::Metric).unwrap(), -2.0);
        assert_eq!(format_length(10.5, 3), "10.500");
    }

    #[test]
    fn test_imperial_fraction() {
        assert_eq!(parse_value("x", "1 1/2", MeasurementSystem::Imperial).unwrap(), 1.5);
        assert_eq!(parse_value("x", "1/4", MeasurementSystem::Imperial).unwrap(), 0.25);
        assert_eq!(parse_value("x", "0.5", MeasurementSystem::Imperial).unwrap(), 0.5);
    }

    #[test]
    fn test_invalid_inputs() {
        let err = parse_value("angle", "abc", MeasurementSystem::Metric).unwrap_err();
        assert!(matches!(err, EditorError::InvalidParameter { ref param, .. } if param == "angle"));
        assert!(parse_value("x", "", MeasurementSystem::Metric).is_err());
        assert!(parse_value("x", "inf", MeasurementSystem::Metric).is_err());
        assert!(parse_value("x", "1/0", MeasurementSystem::Imperial).is_err());
        assert!(parse_value("x", "1/2/3", MeasurementSystem::Imperial).is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(MeasurementSystem::Metric.label(), "mm");
        assert_eq!("inch".parse::<MeasurementSystem>(), Ok(MeasurementSystem::Imperial));
    }
}
