//! Kitchen volume conversions.
//!
//! Every unit converts through milliliters using a fixed factor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Milliliters per teaspoon
pub const ML_PER_TSP: f64 = 4.92892;
/// Milliliters per tablespoon
pub const ML_PER_TBSP: f64 = 14.7868;
/// Milliliters per fluid ounce
pub const ML_PER_FL_OZ: f64 = 29.5735;
/// Milliliters per cup (US)
pub const ML_PER_CUP: f64 = 236.588;
/// Milliliters per liter
pub const ML_PER_LITER: f64 = 1000.0;

pub const INVALID_AMOUNT_MESSAGE: &str = "Please enter a valid amount.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    Ml,
    Tsp,
    Tbsp,
    FlOz,
    Cup,
    #[serde(rename = "l")]
    Liter,
}

impl VolumeUnit {
    pub const ALL: [VolumeUnit; 6] = [
        VolumeUnit::Ml,
        VolumeUnit::Tsp,
        VolumeUnit::Tbsp,
        VolumeUnit::FlOz,
        VolumeUnit::Cup,
        VolumeUnit::Liter,
    ];

    pub fn ml_per_unit(&self) -> f64 {
        match self {
            VolumeUnit::Ml => 1.0,
            VolumeUnit::Tsp => ML_PER_TSP,
            VolumeUnit::Tbsp => ML_PER_TBSP,
            VolumeUnit::FlOz => ML_PER_FL_OZ,
            VolumeUnit::Cup => ML_PER_CUP,
            VolumeUnit::Liter => ML_PER_LITER,
        }
    }

    /// Short key used on the command line and in stored data.
    pub fn key(&self) -> &'static str {
        match self {
            VolumeUnit::Ml => "ml",
            VolumeUnit::Tsp => "tsp",
            VolumeUnit::Tbsp => "tbsp",
            VolumeUnit::FlOz => "fl_oz",
            VolumeUnit::Cup => "cup",
            VolumeUnit::Liter => "l",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VolumeUnit::Ml => "Milliliters (ml)",
            VolumeUnit::Tsp => "Teaspoons (tsp)",
            VolumeUnit::Tbsp => "Tablespoons (tbsp)",
            VolumeUnit::FlOz => "Fluid Ounces (fl oz)",
            VolumeUnit::Cup => "Cups (US)",
            VolumeUnit::Liter => "Liters (l)",
        }
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for VolumeUnit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Ok(VolumeUnit::Ml),
            "tsp" | "teaspoon" | "teaspoons" => Ok(VolumeUnit::Tsp),
            "tbsp" | "tablespoon" | "tablespoons" => Ok(VolumeUnit::Tbsp),
            "fl_oz" | "fl oz" | "floz" | "fluid ounce" | "fluid ounces" | "fluid-ounce" => Ok(VolumeUnit::FlOz),
            "cup" | "cups" => Ok(VolumeUnit::Cup),
            "l" | "liter" | "liters" | "litre" | "litres" => Ok(VolumeUnit::Liter),
            _ => Err(ConversionError::UnknownUnit(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("{}", INVALID_AMOUNT_MESSAGE)]
    InvalidAmount(f64),
    #[error("Unknown volume unit: {0}")]
    UnknownUnit(String),
}

/// Converts `amount` of `from` into `to`. The amount must be a positive, finite number.
pub fn convert(amount: f64, from: VolumeUnit, to: VolumeUnit) -> Result<f64, ConversionError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ConversionError::InvalidAmount(amount));
    }
    let amount_ml = amount * from.ml_per_unit();
    Ok(amount_ml / to.ml_per_unit())
}

/// Display line for a conversion, e.g. `1.00 Cups (US) = 236.59 Milliliters (ml)`.
pub fn format_conversion(amount: f64, from: VolumeUnit, to: VolumeUnit) -> String {
    match convert(amount, from, to) {
        Ok(result) => format!("{:.2} {} = {:.2} {}", amount, from.label(), result, to.label()),
        Err(_) => INVALID_AMOUNT_MESSAGE.to_string(),
    }
}
