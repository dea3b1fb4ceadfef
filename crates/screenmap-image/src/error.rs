/// An error type for image and image-processing operations.
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    /// Error when the pixel data length does not match the declared size.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidDataLength(usize, usize),

    /// Error when two images that must agree in size do not.
    #[error("Image size ({0}x{1}) does not match the expected size ({2}x{3})")]
    SizeMismatch(usize, usize, usize, usize),

    /// Error when a region does not fit inside the image it is taken from.
    #[error("Region at ({0}, {1}) of size {2}x{3} exceeds the image bounds")]
    RegionOutOfBounds(usize, usize, usize, usize),

    /// Error when the pixel data cannot be cast to the requested type.
    #[error("Failed to cast the pixel data")]
    CastError,

    /// Error when a projective transform is singular and cannot be
    /// applied or inverted.
    #[error("The transform matrix is degenerate")]
    DegenerateTransform,
}
