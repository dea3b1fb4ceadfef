#![deny(missing_docs)]
//! Maps a rectangular source image onto an arbitrary quadrilateral region of
//! a destination image, using four corner correspondences, and composites
//! the warped result under a selectable blend mode.

#[doc(inline)]
pub use screenmap_image as image;

#[doc(inline)]
pub use screenmap_imgproc as imgproc;

/// the mapping and compositing pipeline.
pub mod mapper;

/// tolerant outcomes for operations that degrade instead of failing.
pub mod outcome;

/// point-set parsing, normalization and derived artifacts.
pub mod points;

pub use crate::mapper::{map_and_composite, MapperConfig, MapperOutput};
pub use crate::outcome::Outcome;
pub use crate::points::{BoundingBox, Point2D, PointSet};
