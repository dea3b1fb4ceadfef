//! Perspective transforms between a source rectangle and an arbitrary quad.

mod perspective;

pub use perspective::{get_perspective_transform, warp_perspective};
