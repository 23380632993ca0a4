//! Region model and file formats for microbridge.
//!
//! Every supported input format is read into an ordered list of
//! [`Region`]s; the conversion pipeline resolves those into an
//! [`LmdDocument`], which is the single output format.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Coordinates carry their length unit as a marker type,
//!    so nanometer values cannot reach the writer without being rescaled.
//!
//! 2. **Raw Readers**: Readers keep coordinate text as found in the file.
//!    Deciding what is a usable number (and what to do when it is not)
//!    belongs to the pipeline, which knows each region's role.
//!
//! 3. **Deterministic Output**: The LMD writer produces byte-identical output
//!    for identical documents.
//!
//! # Example
//!
//! ```
//! use microbridge::ir::{Coord, LmdPoint, Nanometer};
//!
//! let coord: Coord<Nanometer> = Coord::new(100_000_000.0, 200_000_000.0);
//! assert_eq!(coord.to_lmd_point(), Some(LmdPoint::new(100_000, 200_000)));
//! ```

mod coord;
mod ids;
pub mod io_lmd_xml;
pub mod io_ndpa_xml;
pub mod io_region_csv;
mod model;
mod space;

// Re-export core types for convenient access
pub use coord::{to_lmd_value, Coord, LmdPoint};
pub use ids::{RegionIndex, ShapeNumber};
pub use model::{
    CalibrationPoint, CoordinatePair, CsvRow, LmdDocument, Provenance, RawPoint, Region, Shape,
    XmlRegion,
};
pub use space::{LengthUnit, Micrometer, Nanometer, NANOMETERS_PER_MICROMETER};
