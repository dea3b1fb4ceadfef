use log::{debug, warn};

use screenmap_image::{Image, ImageError, ImageSize};
use screenmap_imgproc::blend::{composite, BlendMode};
use screenmap_imgproc::crop::crop_image;
use screenmap_imgproc::interpolation::InterpolationMode;
use screenmap_imgproc::warp::{get_perspective_transform, warp_perspective};

use crate::outcome::Outcome;
use crate::points::{BoundingBox, PointSet};

/// Options for [`map_and_composite`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapperConfig {
    /// How the warped source is combined with the background.
    pub blend_mode: BlendMode,
    /// Blend weight for the non-replace modes. Not clamped; values outside
    /// `[0, 1]` extrapolate.
    pub opacity: f32,
    /// Whether to also return the bounding-box crop of the mapped region.
    /// When disabled the crop output is the full mapped image.
    pub crop_to_region: bool,
    /// Resolution of the preview canvas the points were picked on, when it
    /// differs from the background resolution. Points are rescaled to the
    /// background before use.
    pub canvas_size: Option<ImageSize>,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::Replace,
            opacity: 1.0,
            crop_to_region: true,
            canvas_size: None,
        }
    }
}

/// Everything a mapping run produces.
#[derive(Clone, Debug, PartialEq)]
pub struct MapperOutput {
    /// The background with the warped source composited into the quad.
    pub mapped: Image<f32, 3>,
    /// The bounding-box crop of the mapped image, or the full mapped image
    /// when cropping is disabled or the box is degenerate.
    pub cropped: Image<f32, 3>,
    /// The quad region mask, `1.0` inside the quad.
    pub mask: Image<f32, 1>,
}

/// Maps a source image onto the quad described by `points` and composites
/// it into the background.
///
/// The quad correspondence pairs the source rectangle's corners (top-left,
/// top-right, bottom-right, bottom-left) with the first four points of the
/// set in order. Points are first rescaled from the preview canvas when
/// [`MapperConfig::canvas_size`] is set, then clamped to the background
/// bounds.
///
/// Incomplete or unusable geometry never fails: with fewer than four
/// points, or a quad whose transform is degenerate (for instance four
/// collinear points), the outcome degrades to the background unchanged as
/// both the mapped and cropped image, with an all-zero mask and the reason
/// recorded. Only allocation-level failures surface as errors.
pub fn map_and_composite(
    background: &Image<f32, 3>,
    source: &Image<f32, 3>,
    points: &PointSet,
    config: &MapperConfig,
) -> Result<Outcome<MapperOutput>, ImageError> {
    let bg_size = background.size();

    let points = match config.canvas_size {
        Some(canvas) => points.normalize(canvas, bg_size, true),
        None => points.clone(),
    };
    let points = points.clamp(bg_size.width, bg_size.height);

    let Some(quad) = points.quad() else {
        return degraded_no_op(
            background,
            format!("need 4 points to map, got {}", points.len()),
        );
    };

    let (src_w, src_h) = (source.width() as f64, source.height() as f64);
    let src_corners = [[0.0, 0.0], [src_w, 0.0], [src_w, src_h], [0.0, src_h]];
    let dst_corners = quad.map(|p| [p.x as f64, p.y as f64]);

    let m = match get_perspective_transform(&src_corners, &dst_corners) {
        Ok(m) => m,
        Err(ImageError::DegenerateTransform) => {
            return degraded_no_op(background, "quad does not admit a perspective transform".into())
        }
        Err(err) => return Err(err),
    };

    let mut warped = Image::from_size_val(bg_size, 0.0)?;
    match warp_perspective(source, &mut warped, &m, InterpolationMode::Bilinear) {
        Ok(()) => {}
        Err(ImageError::DegenerateTransform) => {
            return degraded_no_op(background, "quad does not admit a perspective transform".into())
        }
        Err(err) => return Err(err),
    }

    let mask = points.fill_mask(bg_size)?;

    let mut mapped = Image::from_size_val(bg_size, 0.0)?;
    composite(
        background,
        &warped,
        &mask,
        config.blend_mode,
        config.opacity,
        &mut mapped,
    )?;

    let cropped = if config.crop_to_region {
        crop_to_bounding_box(&mapped, points.bounding_box())?
    } else {
        mapped.clone()
    };

    debug!(
        "mapped {}x{} source onto quad {:?}",
        source.width(),
        source.height(),
        quad
    );

    Ok(Outcome::Full(MapperOutput {
        mapped,
        cropped,
        mask,
    }))
}

/// Crop out the clamped bounding box, falling back to the full image when
/// the box is missing or degenerate.
fn crop_to_bounding_box(
    image: &Image<f32, 3>,
    bbox: Option<BoundingBox>,
) -> Result<Image<f32, 3>, ImageError> {
    let Some(bbox) = bbox else {
        return Ok(image.clone());
    };

    let bbox = bbox.clamp(image.width(), image.height());
    if bbox.is_empty() {
        return Ok(image.clone());
    }

    let crop_size = ImageSize {
        width: bbox.width() as usize,
        height: bbox.height() as usize,
    };
    let mut cropped = Image::from_size_val(crop_size, 0.0)?;
    crop_image(image, &mut cropped, bbox.x_min as usize, bbox.y_min as usize)?;

    Ok(cropped)
}

fn degraded_no_op(
    background: &Image<f32, 3>,
    reason: String,
) -> Result<Outcome<MapperOutput>, ImageError> {
    warn!("{reason}; returning the background unchanged");

    let mask = Image::from_size_val(background.size(), 0.0)?;
    Ok(Outcome::Degraded {
        value: MapperOutput {
            mapped: background.clone(),
            cropped: background.clone(),
            mask,
        },
        reason,
    })
}
