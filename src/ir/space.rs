//! Length unit marker types.
//!
//! These are zero-sized types (ZSTs) used as type parameters to distinguish
//! between source units at compile time, so nanometer values from an NDPA
//! file can never be written out as if they were micrometers.

use std::fmt;

/// Number of nanometers in one micrometer.
pub const NANOMETERS_PER_MICROMETER: f64 = 1000.0;

/// A length unit a source format stores its coordinates in.
pub trait LengthUnit {
    /// Short unit label used in log messages.
    const LABEL: &'static str;

    /// Rescale a raw value in this unit to micrometers.
    fn to_micrometers(value: f64) -> f64;
}

/// Marker type for nanometer coordinates (NDP.view2 region files).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nanometer {}

/// Marker type for micrometer coordinates (CSV exports and LMD output).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Micrometer {}

impl LengthUnit for Nanometer {
    const LABEL: &'static str = "nm";

    #[inline]
    fn to_micrometers(value: f64) -> f64 {
        value / NANOMETERS_PER_MICROMETER
    }
}

impl LengthUnit for Micrometer {
    const LABEL: &'static str = "µm";

    #[inline]
    fn to_micrometers(value: f64) -> f64 {
        value
    }
}

impl fmt::Debug for Nanometer {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Nanometer has no variants
    }
}

impl fmt::Debug for Micrometer {
    fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {} // This is unreachable since Micrometer has no variants
    }
}
