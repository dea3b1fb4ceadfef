use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::{ParallelSlice, ParallelSliceMut},
};
use screenmap_image::{Image, ImageError};

/// Per-pixel blending strategy for [`composite`].
///
/// Unrecognized selector strings map to [`BlendMode::PassThrough`], which
/// takes the foreground value unmodified, so the fallback behavior is
/// visible in the type instead of hiding in a match arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Hard cutover to the foreground inside the mask; opacity has no
    /// effect in this mode.
    #[default]
    Replace,
    /// Contrast blend: dark foreground multiplies, bright foreground
    /// screens.
    Overlay,
    /// Darken by multiplication.
    Multiply,
    /// Lighten (inverse multiply).
    Screen,
    /// Take the foreground value as-is; the fallback for unknown selectors.
    PassThrough,
}

impl BlendMode {
    /// Resolve a blend-mode selector string.
    ///
    /// The four supported selectors are `replace`, `overlay`, `multiply`
    /// and `screen`; anything else resolves to [`BlendMode::PassThrough`].
    pub fn from_name(name: &str) -> BlendMode {
        match name {
            "replace" => BlendMode::Replace,
            "overlay" => BlendMode::Overlay,
            "multiply" => BlendMode::Multiply,
            "screen" => BlendMode::Screen,
            _ => BlendMode::PassThrough,
        }
    }
}

/// Blends a background and a foreground channel value.
///
/// Values are expected in the normalized `[0, 1]` domain.
#[inline]
pub fn blend_pixel(bg: f32, fg: f32, mode: BlendMode) -> f32 {
    match mode {
        BlendMode::Multiply => bg * fg,
        BlendMode::Screen => 1.0 - (1.0 - bg) * (1.0 - fg),
        BlendMode::Overlay => {
            if fg < 0.5 {
                2.0 * fg * bg
            } else {
                1.0 - 2.0 * (1.0 - fg) * (1.0 - bg)
            }
        }
        BlendMode::Replace | BlendMode::PassThrough => fg,
    }
}

/// Composites a foreground over a background through a mask.
///
/// Pixels where the mask is zero copy the background unchanged. Inside the
/// mask, [`BlendMode::Replace`] takes the foreground verbatim (opacity is
/// intentionally ignored); every other mode computes the blend and then
/// interpolates between background and blended value by `opacity`, clamping
/// the result to `[0, 1]`. `opacity` itself is not clamped, so out-of-range
/// values extrapolate.
///
/// # Arguments
///
/// * `bg` - The background image.
/// * `fg` - The foreground image, same size as the background.
/// * `mask` - Single-channel mask, same spatial size as the background.
/// * `mode` - The blend mode to apply inside the mask.
/// * `opacity` - Blend weight for the non-replace modes.
/// * `dst` - The output image, same size as the background.
///
/// # Errors
///
/// Returns [`ImageError::SizeMismatch`] when the foreground, mask or
/// destination size does not match the background.
pub fn composite<const C: usize>(
    bg: &Image<f32, C>,
    fg: &Image<f32, C>,
    mask: &Image<f32, 1>,
    mode: BlendMode,
    opacity: f32,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    for size in [fg.size(), mask.size(), dst.size()] {
        if size != bg.size() {
            return Err(ImageError::SizeMismatch(
                size.width,
                size.height,
                bg.width(),
                bg.height(),
            ));
        }
    }

    let cols = bg.cols();

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * cols)
        .zip(bg.as_slice().par_chunks_exact(C * cols))
        .zip(fg.as_slice().par_chunks_exact(C * cols))
        .zip(mask.as_slice().par_chunks_exact(cols))
        .for_each(|(((dst_row, bg_row), fg_row), mask_row)| {
            dst_row
                .chunks_exact_mut(C)
                .zip(bg_row.chunks_exact(C))
                .zip(fg_row.chunks_exact(C))
                .zip(mask_row.iter())
                .for_each(|(((dst_pixel, bg_pixel), fg_pixel), &m)| {
                    if m <= 0.0 {
                        dst_pixel.copy_from_slice(bg_pixel);
                    } else if mode == BlendMode::Replace {
                        dst_pixel.copy_from_slice(fg_pixel);
                    } else {
                        for k in 0..C {
                            let blended = blend_pixel(bg_pixel[k], fg_pixel[k], mode);
                            dst_pixel[k] = (bg_pixel[k] * (1.0 - opacity) + blended * opacity)
                                .clamp(0.0, 1.0);
                        }
                    }
                });
        });

    Ok(())
}
