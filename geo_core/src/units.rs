//! # Unit Types
//!
//! Type-safe wrappers for the SI units used throughout the engine, plus
//! conversion of reported quantities into the MKS and imperial systems.
//!
//! All calculations run in SI:
//! - Length: metres (m)
//! - Pressure / stress: kilopascals (kPa = kN/m²)
//! - Unit weight: kilonewtons per cubic metre (kN/m³)
//! - Force: kilonewtons (kN)
//! - Angle: degrees at the API boundary, radians inside formulas
//!
//! ## Example
//!
//! ```rust
//! use geo_core::units::{Degrees, KiloPascals, Quantity, UnitSystem};
//!
//! let phi = Degrees(30.0);
//! assert!((phi.to_radians() - std::f64::consts::PI / 6.0).abs() < 1e-12);
//!
//! let q = KiloPascals(100.0);
//! let psi = UnitSystem::Imperial.convert(q.0, Quantity::Pressure);
//! assert!((psi - 14.5038).abs() < 1e-3);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

// ============================================================================
// SI newtypes
// ============================================================================

/// Length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Pressure or stress in kilopascals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloPascals(pub f64);

/// Unit weight in kN/m³
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KnPerM3(pub f64);

/// Force in kilonewtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KiloNewtons(pub f64);

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

impl Degrees {
    pub fn to_radians(self) -> f64 {
        self.0.to_radians()
    }
}

macro_rules! impl_arithmetic {
    ($($t:ty),*) => {
        $(
            impl Add for $t {
                type Output = Self;
                fn add(self, rhs: Self) -> Self {
                    Self(self.0 + rhs.0)
                }
            }

            impl Sub for $t {
                type Output = Self;
                fn sub(self, rhs: Self) -> Self {
                    Self(self.0 - rhs.0)
                }
            }

            impl Mul<f64> for $t {
                type Output = Self;
                fn mul(self, rhs: f64) -> Self {
                    Self(self.0 * rhs)
                }
            }
        )*
    };
}

impl_arithmetic!(Meters, KiloPascals, KnPerM3, KiloNewtons, Degrees);

impl KiloPascals {
    /// Resultant force of this pressure acting over an area (kPa × m² = kN)
    pub fn over_area(self, area_m2: f64) -> KiloNewtons {
        KiloNewtons(self.0 * area_m2)
    }
}

/// Unit weight of water (kN/m³)
pub const GAMMA_WATER: KnPerM3 = KnPerM3(9.81);

// ============================================================================
// Unit systems for reporting
// ============================================================================

/// Physical quantity kinds that reports convert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Force,
    Length,
    Pressure,
    UnitWeight,
}

/// Unit system used when presenting results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitSystem {
    /// kN, m, kPa, kN/m³
    #[default]
    #[serde(rename = "SI")]
    Si,
    /// tf, m, kgf/cm², tf/m³
    #[serde(rename = "MKS")]
    Mks,
    /// kip, ft, psi, pcf
    Imperial,
}

impl UnitSystem {
    /// All unit systems for UI selection
    pub const ALL: [UnitSystem; 3] = [UnitSystem::Si, UnitSystem::Mks, UnitSystem::Imperial];

    /// Multiplier taking an SI value into this system
    pub fn factor(&self, quantity: Quantity) -> f64 {
        match (self, quantity) {
            (UnitSystem::Si, _) => 1.0,
            (UnitSystem::Mks, Quantity::Force) => 0.101_971_621,
            (UnitSystem::Mks, Quantity::Length) => 1.0,
            (UnitSystem::Mks, Quantity::Pressure) => 0.010_197_2,
            (UnitSystem::Mks, Quantity::UnitWeight) => 0.101_971_621,
            (UnitSystem::Imperial, Quantity::Force) => 0.224_809,
            (UnitSystem::Imperial, Quantity::Length) => 3.280_84,
            (UnitSystem::Imperial, Quantity::Pressure) => 0.145_038,
            (UnitSystem::Imperial, Quantity::UnitWeight) => 6.365_88,
        }
    }

    /// Convert an SI value into this system
    pub fn convert(&self, si_value: f64, quantity: Quantity) -> f64 {
        si_value * self.factor(quantity)
    }

    /// Convert a value expressed in this system back to SI
    pub fn to_si(&self, value: f64, quantity: Quantity) -> f64 {
        value / self.factor(quantity)
    }

    /// Unit label for a quantity
    pub fn label(&self, quantity: Quantity) -> &'static str {
        match (self, quantity) {
            (UnitSystem::Si, Quantity::Force) => "kN",
            (UnitSystem::Si, Quantity::Length) => "m",
            (UnitSystem::Si, Quantity::Pressure) => "kPa",
            (UnitSystem::Si, Quantity::UnitWeight) => "kN/m³",
            (UnitSystem::Mks, Quantity::Force) => "tf",
            (UnitSystem::Mks, Quantity::Length) => "m",
            (UnitSystem::Mks, Quantity::Pressure) => "kgf/cm²",
            (UnitSystem::Mks, Quantity::UnitWeight) => "tf/m³",
            (UnitSystem::Imperial, Quantity::Force) => "kip",
            (UnitSystem::Imperial, Quantity::Length) => "ft",
            (UnitSystem::Imperial, Quantity::Pressure) => "psi",
            (UnitSystem::Imperial, Quantity::UnitWeight) => "pcf",
        }
    }

    /// Convert and format an SI value with its unit label
    pub fn format(&self, si_value: f64, quantity: Quantity) -> String {
        format!("{:.2} {}", self.convert(si_value, quantity), self.label(quantity))
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitSystem::Si => "SI",
            UnitSystem::Mks => "MKS",
            UnitSystem::Imperial => "Imperial",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newtype_arithmetic() {
        let a = Meters(1.5) + Meters(0.5);
        assert_eq!(a, Meters(2.0));
        assert_eq!(KiloPascals(100.0) * 0.5, KiloPascals(50.0));
        assert_eq!(KiloPascals(100.0).over_area(4.0), KiloNewtons(400.0));
    }

    #[test]
    fn test_si_is_identity() {
        for q in [Quantity::Force, Quantity::Length, Quantity::Pressure, Quantity::UnitWeight] {
            assert_eq!(UnitSystem::Si.convert(12.5, q), 12.5);
        }
    }

    #[test]
    fn test_conversion_roundtrip() {
        let psi = UnitSystem::Imperial.convert(200.0, Quantity::Pressure);
        let back = UnitSystem::Imperial.to_si(psi, Quantity::Pressure);
        assert!((back - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(UnitSystem::Si.format(100.0, Quantity::Pressure), "100.00 kPa");
        assert_eq!(UnitSystem::Mks.format(100.0, Quantity::Pressure), "1.02 kgf/cm²");
        assert_eq!(UnitSystem::Imperial.format(1.0, Quantity::Length), "3.28 ft");
    }

    #[test]
    fn test_unit_system_serialization() {
        let json = serde_json::to_string(&UnitSystem::Si).unwrap();
        assert_eq!(json, "\"SI\"");
        let parsed: UnitSystem = serde_json::from_str("\"MKS\"").unwrap();
        assert_eq!(parsed, UnitSystem::Mks);
    }
}
