//! Typed coordinate values using PhantomData for compile-time unit safety.

use serde::Serialize;
use std::marker::PhantomData;

use super::space::LengthUnit;

/// A 2D coordinate with a type-level marker for its length unit.
///
/// The `TUnit` parameter should be either [`Nanometer`](super::Nanometer) or
/// [`Micrometer`](super::Micrometer), ensuring that coordinates read from
/// different source formats cannot be accidentally mixed.
#[derive(Clone, Copy, PartialEq)]
pub struct Coord<TUnit> {
    pub x: f64,
    pub y: f64,
    _unit: PhantomData<TUnit>,
}

impl<TUnit> Coord<TUnit> {
    /// Creates a new coordinate with the given x and y values.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            _unit: PhantomData,
        }
    }
}

impl<TUnit: LengthUnit> Coord<TUnit> {
    /// Rescale to micrometers and round to the integer grid the LMD expects.
    ///
    /// Rounding is half-to-even, so `150.5` becomes `150` and `151.5` becomes
    /// `152`. Returns `None` when either axis falls outside the `i64` range.
    pub fn to_lmd_point(&self) -> Option<LmdPoint> {
        Some(LmdPoint {
            x: to_lmd_value::<TUnit>(self.x)?,
            y: to_lmd_value::<TUnit>(self.y)?,
        })
    }
}

/// Convert one axis value to the LMD grid.
///
/// `None` for non-finite values and for values that do not fit in an `i64`
/// after rounding.
pub fn to_lmd_value<TUnit: LengthUnit>(value: f64) -> Option<i64> {
    let rounded = TUnit::to_micrometers(value).round_ties_even();
    // i64::MIN is exactly -2^63; i64::MAX as f64 rounds up to 2^63.
    if rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
        Some(rounded as i64)
    } else {
        None
    }
}

impl<TUnit> std::fmt::Debug for Coord<TUnit> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coord")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<TUnit> Default for Coord<TUnit> {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// An integer micrometer position as written to the LMD file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LmdPoint {
    pub x: i64,
    pub y: i64,
}

impl LmdPoint {
    pub const ORIGIN: LmdPoint = LmdPoint { x: 0, y: 0 };

    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}
