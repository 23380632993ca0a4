//! Positional role assignment and shape filtering.
//!
//! The first three regions of a file are always the calibration points and
//! every later region is a shape candidate. Content never changes a region's
//! role: a file that keeps its calibration data elsewhere converts with wrong
//! calibration values and no error. Candidates without points (rulers, empty
//! regions) are dropped and the survivors are numbered from 1.

use crate::ir::{LmdPoint, Region, RegionIndex, Shape, ShapeNumber};

/// Number of calibration points every LMD file carries.
pub const CALIBRATION_POINTS: usize = 3;

/// Regions split by role.
#[derive(Debug)]
pub struct Classified<'a, P> {
    pub calibration: &'a [Region<P>; CALIBRATION_POINTS],
    pub shape_candidates: &'a [Region<P>],
}

/// Split regions into the calibration triplet and shape candidates.
///
/// Returns `None` when there are fewer than three regions.
pub fn classify<P>(regions: &[Region<P>]) -> Option<Classified<'_, P>> {
    let (calibration, shape_candidates) = regions.split_first_chunk::<CALIBRATION_POINTS>()?;
    Some(Classified {
        calibration,
        shape_candidates,
    })
}

/// A shape candidate with its converted points (possibly none).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeCandidate {
    pub source: RegionIndex,
    pub title: String,
    pub points: Vec<LmdPoint>,
}

/// Output of [`filter_shapes`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilteredShapes {
    /// Surviving shapes, numbered 1..=len in original order.
    pub shapes: Vec<Shape>,
    /// Candidates dropped for having no points.
    pub skipped: Vec<ShapeCandidate>,
}

/// Drop point-less candidates and number the rest contiguously from 1.
pub fn filter_shapes(candidates: impl IntoIterator<Item = ShapeCandidate>) -> FilteredShapes {
    let mut filtered = FilteredShapes::default();

    for candidate in candidates {
        if candidate.points.is_empty() {
            filtered.skipped.push(candidate);
            continue;
        }
        let number = ShapeNumber::new(filtered.shapes.len() + 1);
        filtered.shapes.push(Shape {
            number,
            source: candidate.source,
            title: candidate.title,
            points: candidate.points,
        });
    }

    filtered
}
