use rayon::prelude::*;

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use screenmap_image::{Image, ImageError};

const SINGULARITY_EPS: f64 = 1e-10;

/// Compute the 3x3 perspective transform mapping four source points onto
/// four destination points.
///
/// The four correspondences determine the eight unknowns of the matrix
/// exactly (the last entry is fixed to 1), so the system is solved directly
/// by Gaussian elimination with partial pivoting rather than least squares.
/// Corners are expected in the same order on both sides, conventionally
/// top-left, top-right, bottom-right, bottom-left.
///
/// # Arguments
///
/// * `src` - The four source points as `[x, y]` pairs.
/// * `dst` - The four destination points as `[x, y]` pairs.
///
/// # Returns
///
/// The row-major 3x3 matrix `m` with `m[8] == 1`, such that
/// `m * [x, y, 1]^T ~ [x', y', 1]^T` for every correspondence.
///
/// # Errors
///
/// Returns [`ImageError::DegenerateTransform`] when the system is singular,
/// e.g. three or more collinear destination points or a zero-area source
/// rectangle.
///
/// # Example
///
/// ```
/// use screenmap_imgproc::warp::get_perspective_transform;
///
/// let src = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
/// let dst = [[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]];
///
/// let m = get_perspective_transform(&src, &dst).unwrap();
/// assert!((m[0] - 2.0).abs() < 1e-9);
/// assert!((m[4] - 2.0).abs() < 1e-9);
/// ```
pub fn get_perspective_transform(
    src: &[[f64; 2]; 4],
    dst: &[[f64; 2]; 4],
) -> Result<[f64; 9], ImageError> {
    // 8x8 system with the destination coordinates as the augmented column
    let mut a = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let [sx, sy] = src[i];
        let [dx, dy] = dst[i];

        a[2 * i][0] = sx;
        a[2 * i][1] = sy;
        a[2 * i][2] = 1.0;
        a[2 * i][6] = -sx * dx;
        a[2 * i][7] = -sy * dx;
        a[2 * i][8] = dx;

        a[2 * i + 1][3] = sx;
        a[2 * i + 1][4] = sy;
        a[2 * i + 1][5] = 1.0;
        a[2 * i + 1][6] = -sx * dy;
        a[2 * i + 1][7] = -sy * dy;
        a[2 * i + 1][8] = dy;
    }

    // forward elimination with partial pivoting
    for col in 0..8 {
        let mut max_row = col;
        let mut max_val = a[col][col].abs();
        for row in (col + 1)..8 {
            if a[row][col].abs() > max_val {
                max_val = a[row][col].abs();
                max_row = row;
            }
        }
        if max_val < SINGULARITY_EPS {
            return Err(ImageError::DegenerateTransform);
        }
        if max_row != col {
            a.swap(col, max_row);
        }

        let pivot = a[col][col];
        for row in (col + 1)..8 {
            let factor = a[row][col] / pivot;
            for k in col..9 {
                a[row][k] -= factor * a[col][k];
            }
        }
    }

    // back substitution, m[8] fixed to 1
    let mut m = [0.0f64; 9];
    m[8] = 1.0;
    for row in (0..8).rev() {
        let mut sum = a[row][8];
        for k in (row + 1)..8 {
            sum -= a[row][k] * m[k];
        }
        m[row] = sum / a[row][row];
    }

    Ok(m)
}

#[rustfmt::skip]
fn determinant3x3(m: &[f64; 9]) -> f64 {
    m[0] * (m[4] * m[8] - m[5] * m[7]) -
    m[1] * (m[3] * m[8] - m[5] * m[6]) +
    m[2] * (m[3] * m[7] - m[4] * m[6])
}

#[rustfmt::skip]
fn adjugate3x3(m: &[f64; 9]) -> [f64; 9] {
    [
        m[4] * m[8] - m[5] * m[7],  // [0, 0]
        m[2] * m[7] - m[1] * m[8],  // [0, 1]
        m[1] * m[5] - m[2] * m[4],  // [0, 2]
        m[5] * m[6] - m[3] * m[8],  // [1, 0]
        m[0] * m[8] - m[2] * m[6],  // [1, 1]
        m[2] * m[3] - m[0] * m[5],  // [1, 2]
        m[3] * m[7] - m[4] * m[6],  // [2, 0]
        m[1] * m[6] - m[0] * m[7],  // [2, 1]
        m[0] * m[4] - m[1] * m[3],  // [2, 2]
    ]
}

fn inverse_perspective_matrix(m: &[f64; 9]) -> Result<[f64; 9], ImageError> {
    let det = determinant3x3(m);

    if det.abs() < SINGULARITY_EPS {
        return Err(ImageError::DegenerateTransform);
    }

    let adj = adjugate3x3(m);
    let inv_det = 1.0 / det;

    let mut inv_m = [0.0; 9];
    for i in 0..9 {
        inv_m[i] = adj[i] * inv_det;
    }

    Ok(inv_m)
}

fn transform_point(x: f64, y: f64, m: &[f64; 9]) -> (f64, f64) {
    let w = m[6] * x + m[7] * y + m[8];
    let u = (m[0] * x + m[1] * y + m[2]) / w;
    let v = (m[3] * x + m[4] * y + m[5]) / w;
    (u, v)
}

/// Applies a perspective transformation to an image.
///
/// Every output pixel is mapped through the inverse of `m` to a source
/// coordinate, which is then sampled with the requested interpolation.
/// Output pixels whose source coordinate falls outside
/// `[0, src_width) x [0, src_height)` are left untouched, so a
/// zero-initialized destination keeps a transparent border that contributes
/// nothing when composited.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output canvas; its size defines the output resolution.
/// * `m` - The row-major 3x3 perspective matrix mapping src -> dst.
/// * `interpolation` - The interpolation mode to use.
///
/// # Errors
///
/// Returns [`ImageError::DegenerateTransform`] when `m` is not invertible.
///
/// # Example
///
/// ```
/// use screenmap_image::{Image, ImageSize};
/// use screenmap_imgproc::interpolation::InterpolationMode;
/// use screenmap_imgproc::warp::warp_perspective;
///
/// let src = Image::<f32, 1>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0.0f32; 4 * 5],
/// ).unwrap();
///
/// let m = [1.0, 0.0, -1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
///
/// let mut dst = Image::<f32, 1>::from_size_val(
///     ImageSize {
///         width: 2,
///         height: 3,
///     },
///     0.0,
/// ).unwrap();
///
/// warp_perspective(&src, &mut dst, &m, InterpolationMode::Bilinear).unwrap();
///
/// assert_eq!(dst.size().width, 2);
/// assert_eq!(dst.size().height, 3);
/// ```
pub fn warp_perspective<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f64; 9],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    let inv_m = inverse_perspective_matrix(m)?;

    let (src_cols, src_rows) = (src.cols() as f64, src.rows() as f64);
    let dst_cols = dst.cols();

    dst.as_slice_mut()
        .par_chunks_exact_mut(C * dst_cols)
        .enumerate()
        .for_each(|(v, dst_row)| {
            dst_row
                .chunks_exact_mut(C)
                .enumerate()
                .for_each(|(u, dst_pixel)| {
                    let (x, y) = transform_point(u as f64, v as f64, &inv_m);
                    if x >= 0.0 && x < src_cols && y >= 0.0 && y < src_rows {
                        dst_pixel.iter_mut().enumerate().for_each(|(k, pixel)| {
                            *pixel = interpolate_pixel(src, x as f32, y as f32, k, interpolation)
                        });
                    }
                });
        });

    Ok(())
}
