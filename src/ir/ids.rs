//! Newtype indices for regions and shapes.
//!
//! A region's position in the source file and a shape's number in the LMD
//! output are both small integers, but they must never be confused: shape
//! numbers are assigned after filtering and restart at 1.

use serde::Serialize;
use std::fmt;

/// 0-based position of a region in source order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RegionIndex(pub usize);

impl RegionIndex {
    /// Creates a new RegionIndex.
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying 0-based value.
    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for RegionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionIndex({})", self.0)
    }
}

impl fmt::Display for RegionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based number of a shape in the LMD output (`Shape_N`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ShapeNumber(pub usize);

impl ShapeNumber {
    /// Creates a new ShapeNumber.
    #[inline]
    pub fn new(number: usize) -> Self {
        Self(number)
    }

    /// Returns the underlying 1-based value.
    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl fmt::Debug for ShapeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShapeNumber({})", self.0)
    }
}

impl fmt::Display for ShapeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
