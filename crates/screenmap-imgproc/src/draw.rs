use screenmap_image::Image;

/// Helper function to set a pixel's color, handling bounds checking.
#[inline]
fn set_pixel<T: Copy, const C: usize>(img: &mut Image<T, C>, x: i64, y: i64, color: [T; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a line on an image inplace using Bresenham's line algorithm.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
pub fn draw_line<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [T; C],
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        set_pixel(img, x0, y0, color);

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Fills a polygon on an image inplace.
///
/// Interior pixels are found by an even-odd scanline walk over the polygon
/// edges; a Bresenham pass over the outline afterwards guarantees that
/// boundary pixels are always covered. Self-intersecting polygons get the
/// even-odd result, they are not rejected.
///
/// Polygons with fewer than 3 vertices leave the image unchanged.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `points` - The polygon vertices as (x, y) tuples, in order.
/// * `color` - The fill color as an array of `C` elements.
pub fn fill_polygon<T: Copy, const C: usize>(
    img: &mut Image<T, C>,
    points: &[(i64, i64)],
    color: [T; C],
) {
    let n = points.len();
    if n < 3 {
        return;
    }

    let y_start = points.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let y_end = points
        .iter()
        .map(|p| p.1)
        .max()
        .unwrap_or(-1)
        .min(img.rows() as i64 - 1);

    let mut intersections = Vec::with_capacity(n);
    for y in y_start..=y_end {
        intersections.clear();

        let yf = y as f64;
        for i in 0..n {
            let (x1, y1) = points[i];
            let (x2, y2) = points[(i + 1) % n];
            if y1 == y2 {
                continue;
            }
            // half-open vertical span so shared vertices count once
            let (y_lo, y_hi) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
            if yf < y_lo as f64 || yf >= y_hi as f64 {
                continue;
            }
            let t = (yf - y1 as f64) / (y2 - y1) as f64;
            intersections.push(x1 as f64 + t * (x2 - x1) as f64);
        }

        intersections.sort_by(f64::total_cmp);
        for pair in intersections.chunks_exact(2) {
            let x_lo = pair[0].round() as i64;
            let x_hi = pair[1].round() as i64;
            for x in x_lo..=x_hi {
                set_pixel(img, x, y, color);
            }
        }
    }

    for i in 0..n {
        draw_line(img, points[i], points[(i + 1) % n], color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screenmap_image::{Image, ImageError, ImageSize};

    #[rustfmt::skip]
    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::<_, 1>::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_line(&mut img, (0, 0), (4, 4), [255]);
        assert_eq!(
            img.as_slice(),
            &[
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_fill_polygon_covers_full_image() -> Result<(), ImageError> {
        let mut img = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0.0,
        )?;
        fill_polygon(&mut img, &[(0, 0), (4, 0), (4, 4), (0, 4)], [1.0]);
        assert_eq!(img.as_slice(), vec![1.0f32; 16]);
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_fill_polygon_includes_boundary() -> Result<(), ImageError> {
        let mut img = Image::<f32, 1>::from_size_val(
            ImageSize { width: 5, height: 5 }, 0.0,
        )?;
        fill_polygon(&mut img, &[(1, 1), (3, 1), (3, 3), (1, 3)], [1.0]);
        assert_eq!(
            img.as_slice(),
            &[
                0.0, 0.0, 0.0, 0.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 1.0, 1.0, 1.0, 0.0,
                0.0, 0.0, 0.0, 0.0, 0.0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_fill_polygon_too_few_points() -> Result<(), ImageError> {
        let mut img = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            0.0,
        )?;
        fill_polygon(&mut img, &[(0, 0), (3, 3)], [1.0]);
        assert_eq!(img.as_slice(), vec![0.0f32; 16]);
        Ok(())
    }

    #[test]
    fn test_fill_polygon_self_intersecting() -> Result<(), ImageError> {
        // bowtie: even-odd fills both lobes, the area above and below the
        // crossing stays empty
        let mut img = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 7,
                height: 5,
            },
            0.0,
        )?;
        fill_polygon(&mut img, &[(0, 0), (6, 4), (6, 0), (0, 4)], [1.0]);

        // left and right triangle interiors are filled
        assert_eq!(img.get(0, 2, 0), Some(&1.0));
        assert_eq!(img.get(6, 2, 0), Some(&1.0));
        // area above and below the crossing point stays empty
        assert_eq!(img.get(3, 0, 0), Some(&0.0));
        assert_eq!(img.get(3, 4, 0), Some(&0.0));
        Ok(())
    }
}
