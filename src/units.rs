//! Unit tags for spatial, temporal, angular and data values
//!
//! Objects store unit tags as text. Values are rescaled only when a caller asks
//! for them in a different unit.

use crate::error::{GeoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical dimension of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Length,
    Time,
    Angle,
    Velocity,
    Dimensionless,
}

/// Closed set of unit tags understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Meter,
    Centimeter,
    Millimeter,
    Kilometer,
    Foot,
    Second,
    Millisecond,
    Microsecond,
    Radian,
    Degree,
    MeterPerSecond,
    MillimeterPerSecond,
    KilometerPerSecond,
    FootPerSecond,
    Dimensionless,
}

impl Unit {
    pub fn dimension(&self) -> Dimension {
        match self {
            Unit::Meter | Unit::Centimeter | Unit::Millimeter | Unit::Kilometer | Unit::Foot => {
                Dimension::Length
            }
            Unit::Second | Unit::Millisecond | Unit::Microsecond => Dimension::Time,
            Unit::Radian | Unit::Degree => Dimension::Angle,
            Unit::MeterPerSecond
            | Unit::MillimeterPerSecond
            | Unit::KilometerPerSecond
            | Unit::FootPerSecond => Dimension::Velocity,
            Unit::Dimensionless => Dimension::Dimensionless,
        }
    }

    /// Multiplier taking a value in this unit to the SI base of its dimension
    fn si_factor(&self) -> f64 {
        match self {
            Unit::Meter => 1.0,
            Unit::Centimeter => 1e-2,
            Unit::Millimeter => 1e-3,
            Unit::Kilometer => 1e3,
            Unit::Foot => 0.3048,
            Unit::Second => 1.0,
            Unit::Millisecond => 1e-3,
            Unit::Microsecond => 1e-6,
            Unit::Radian => 1.0,
            Unit::Degree => std::f64::consts::PI / 180.0,
            Unit::MeterPerSecond => 1.0,
            Unit::MillimeterPerSecond => 1e-3,
            Unit::KilometerPerSecond => 1e3,
            Unit::FootPerSecond => 0.3048,
            Unit::Dimensionless => 1.0,
        }
    }

    /// Canonical spelling written to storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Meter => "meter",
            Unit::Centimeter => "centimeter",
            Unit::Millimeter => "millimeter",
            Unit::Kilometer => "kilometer",
            Unit::Foot => "foot",
            Unit::Second => "second",
            Unit::Millisecond => "millisecond",
            Unit::Microsecond => "microsecond",
            Unit::Radian => "radian",
            Unit::Degree => "degree",
            Unit::MeterPerSecond => "m/s",
            Unit::MillimeterPerSecond => "mm/s",
            Unit::KilometerPerSecond => "km/s",
            Unit::FootPerSecond => "ft/s",
            Unit::Dimensionless => "",
        }
    }

    /// Conversion coefficient `from -> to`, `None` when dimensions differ
    pub fn convert(from: Unit, to: Unit) -> Option<f64> {
        if from.dimension() != to.dimension() {
            return None;
        }
        Some(from.si_factor() / to.si_factor())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let unit = match lower.as_str() {
            "" | "unitless" | "dimensionless" => Unit::Dimensionless,
            "m" | "meter" | "meters" | "metre" | "metres" => Unit::Meter,
            "cm" | "centimeter" | "centimeters" => Unit::Centimeter,
            "mm" | "millimeter" | "millimeters" => Unit::Millimeter,
            "km" | "kilometer" | "kilometers" => Unit::Kilometer,
            "ft" | "foot" | "feet" => Unit::Foot,
            "s" | "sec" | "second" | "seconds" => Unit::Second,
            "ms" | "msec" | "millisecond" | "milliseconds" => Unit::Millisecond,
            "us" | "usec" | "microsecond" | "microseconds" => Unit::Microsecond,
            "rad" | "radian" | "radians" => Unit::Radian,
            "deg" | "degree" | "degrees" => Unit::Degree,
            "m/s" | "m/sec" | "meter/second" => Unit::MeterPerSecond,
            "mm/s" | "mm/sec" | "millimeter/second" => Unit::MillimeterPerSecond,
            "km/s" | "km/sec" => Unit::KilometerPerSecond,
            "ft/s" | "ft/sec" => Unit::FootPerSecond,
            _ => return Err(GeoError::InvalidUnit(s.to_string())),
        };
        Ok(unit)
    }
}

/// Coefficient between two stored unit tags given as text.
///
/// An empty target means "as stored" and yields 1.
pub fn conversion_factor(stored: &str, requested: &str) -> Result<f64> {
    if requested.trim().is_empty() {
        return Ok(1.0);
    }
    let from: Unit = stored.parse()?;
    let to: Unit = requested.parse()?;
    Unit::convert(from, to).ok_or_else(|| {
        GeoError::InvalidUnit(format!("cannot convert '{}' to '{}'", stored, requested))
    })
}

/// Coefficient taking values given in `given` units to `stored` units.
///
/// An empty `given` means the values are already in storage units.
pub fn to_stored_factor(given: &str, stored: &str) -> Result<f64> {
    if given.trim().is_empty() {
        return Ok(1.0);
    }
    conversion_factor(given, stored)
}

/// Angular unit flag used by the survey engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AngleUnit {
    Degree,
    Radian,
}

impl AngleUnit {
    pub fn to_radians(&self, v: f64) -> f64 {
        match self {
            AngleUnit::Degree => v.to_radians(),
            AngleUnit::Radian => v,
        }
    }
}

impl TryFrom<Unit> for AngleUnit {
    type Error = GeoError;

    fn try_from(unit: Unit) -> Result<Self> {
        match unit {
            Unit::Degree => Ok(AngleUnit::Degree),
            Unit::Radian => Ok(AngleUnit::Radian),
            other => Err(GeoError::InvalidUnit(format!("{} is not an angle", other))),
        }
    }
}
