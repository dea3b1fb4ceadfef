use serde::Deserialize;

use screenmap_image::{Image, ImageError, ImageSize};
use screenmap_imgproc::draw::fill_polygon;

use crate::outcome::Outcome;

/// Role labels for the first four points of a set, in pick order.
const QUAD_LABELS: [&str; 4] = ["top-left", "top-right", "bottom-right", "bottom-left"];

/// A 2D integer coordinate measured against an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point2D {
    /// The x coordinate in pixels.
    pub x: i64,
    /// The y coordinate in pixels.
    pub y: i64,
}

/// The smallest axis-aligned rectangle containing a quad.
///
/// Spans `[x_min, x_max) x [y_min, y_max)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    /// Left edge, inclusive.
    pub x_min: i64,
    /// Top edge, inclusive.
    pub y_min: i64,
    /// Right edge, exclusive.
    pub x_max: i64,
    /// Bottom edge, exclusive.
    pub y_max: i64,
}

impl BoundingBox {
    /// Clip the box to `[0, width] x [0, height]`.
    pub fn clamp(&self, width: usize, height: usize) -> BoundingBox {
        BoundingBox {
            x_min: self.x_min.clamp(0, width as i64),
            y_min: self.y_min.clamp(0, height as i64),
            x_max: self.x_max.clamp(0, width as i64),
            y_max: self.y_max.clamp(0, height as i64),
        }
    }

    /// Width of the box, zero when degenerate.
    pub fn width(&self) -> i64 {
        (self.x_max - self.x_min).max(0)
    }

    /// Height of the box, zero when degenerate.
    pub fn height(&self) -> i64 {
        (self.y_max - self.y_min).max(0)
    }

    /// Whether the box spans no pixels.
    pub fn is_empty(&self) -> bool {
        self.x_max <= self.x_min || self.y_max <= self.y_min
    }
}

/// Accepted boundary shapes for a single point entry.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Object {
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Pair(Vec<f64>),
}

/// An ordered sequence of picked points.
///
/// The set is an immutable value type: every transform returns a new set,
/// so sets shared across pipeline invocations cannot race or alias. The
/// set may hold any number of points; the quad-derived artifacts (bounding
/// box, fill mask, mapping correspondence) always use the first four, in
/// pick order top-left, top-right, bottom-right, bottom-left. Fewer than
/// four points is a valid but inactive state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointSet {
    points: Vec<Point2D>,
}

impl PointSet {
    /// Create a point set from already-validated points.
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// Parse a point list from its JSON boundary format.
    ///
    /// Every element is either an `{"x": .., "y": ..}` object (missing keys
    /// default to zero) or an array with at least two numeric entries;
    /// coordinates are rounded to the nearest integer. Any other element
    /// shape is skipped. Malformed input never fails: the outcome degrades
    /// to whatever could be recovered, down to an empty set, and the reason
    /// is logged.
    pub fn parse(raw: &str) -> Outcome<PointSet> {
        if raw.trim().is_empty() {
            return Outcome::Full(PointSet::default());
        }

        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(err) => {
                let reason = format!("invalid point JSON: {err}");
                log::warn!("{reason}");
                return Outcome::Degraded {
                    value: PointSet::default(),
                    reason,
                };
            }
        };

        let serde_json::Value::Array(entries) = value else {
            let reason = "point input is not a JSON array".to_string();
            log::warn!("{reason}");
            return Outcome::Degraded {
                value: PointSet::default(),
                reason,
            };
        };

        let total = entries.len();
        let points: Vec<Point2D> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<RawPoint>(entry) {
                Ok(RawPoint::Object { x, y }) => Some(Point2D {
                    x: x.round() as i64,
                    y: y.round() as i64,
                }),
                Ok(RawPoint::Pair(values)) if values.len() >= 2 => Some(Point2D {
                    x: values[0].round() as i64,
                    y: values[1].round() as i64,
                }),
                _ => None,
            })
            .collect();

        let skipped = total - points.len();
        let set = PointSet::new(points);
        if skipped > 0 {
            let reason = format!("skipped {skipped} malformed point entries");
            log::warn!("{reason}");
            Outcome::Degraded { value: set, reason }
        } else {
            Outcome::Full(set)
        }
    }

    /// Number of points in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points, in pick order.
    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Rescale every point from a preview-canvas resolution to the actual
    /// image resolution.
    ///
    /// Used when points were picked on a canvas of a different size than
    /// the image they address; each axis is scaled by
    /// `image_dim / canvas_dim`, truncating toward zero. A disabled flag or
    /// a zero-sized canvas passes the set through unchanged.
    pub fn normalize(&self, canvas: ImageSize, image: ImageSize, enabled: bool) -> PointSet {
        if !enabled || canvas.width == 0 || canvas.height == 0 {
            return self.clone();
        }

        let scale_x = image.width as f64 / canvas.width as f64;
        let scale_y = image.height as f64 / canvas.height as f64;

        PointSet::new(
            self.points
                .iter()
                .map(|p| Point2D {
                    x: (p.x as f64 * scale_x) as i64,
                    y: (p.y as f64 * scale_y) as i64,
                })
                .collect(),
        )
    }

    /// Clip every point to `[0, width] x [0, height]`.
    pub fn clamp(&self, width: usize, height: usize) -> PointSet {
        PointSet::new(
            self.points
                .iter()
                .map(|p| Point2D {
                    x: p.x.clamp(0, width as i64),
                    y: p.y.clamp(0, height as i64),
                })
                .collect(),
        )
    }

    /// The first four points as a quad, when present.
    pub fn quad(&self) -> Option<[Point2D; 4]> {
        if self.points.len() < 4 {
            return None;
        }
        Some([self.points[0], self.points[1], self.points[2], self.points[3]])
    }

    /// The axis-aligned bounding box of the quad.
    ///
    /// `None` while the set holds fewer than four points; an incomplete set
    /// is not an error, there is just nothing to bound yet.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let quad = self.quad()?;

        let xs = quad.map(|p| p.x);
        let ys = quad.map(|p| p.y);

        Some(BoundingBox {
            x_min: xs.into_iter().min().unwrap_or(0),
            y_min: ys.into_iter().min().unwrap_or(0),
            x_max: xs.into_iter().max().unwrap_or(0),
            y_max: ys.into_iter().max().unwrap_or(0),
        })
    }

    /// Rasterize the quad into a single-channel mask of the given size.
    ///
    /// Pixels inside the quad (boundary included) are `1.0`, everything
    /// else `0.0`. With fewer than four points the mask is all zero.
    pub fn fill_mask(&self, size: ImageSize) -> Result<Image<f32, 1>, ImageError> {
        let mut mask = Image::from_size_val(size, 0.0)?;

        if let Some(quad) = self.quad() {
            let vertices: Vec<(i64, i64)> = quad.iter().map(|p| (p.x, p.y)).collect();
            fill_polygon(&mut mask, &vertices, [1.0]);
        }

        Ok(mask)
    }

    /// Human-readable summary of the picked points.
    ///
    /// The first four points carry their corner role, later ones a plain
    /// positional number.
    pub fn info(&self) -> String {
        if self.points.is_empty() {
            return "no points selected".to_string();
        }

        self.points
            .iter()
            .enumerate()
            .map(|(i, p)| match QUAD_LABELS.get(i) {
                Some(label) => format!("{label}: ({}, {})", p.x, p.y),
                None => format!("point {}: ({}, {})", i + 1, p.x, p.y),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// The first four points in their JSON boundary format, an array of
    /// `[x, y]` pairs in pick order.
    pub fn to_json(&self) -> String {
        let pairs: Vec<[i64; 2]> = self.points.iter().take(4).map(|p| [p.x, p.y]).collect();
        serde_json::json!(pairs).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_malformed_entries() {
        let outcome = PointSet::parse(r#"[[1,2],[3,"bad"],{"x":5,"y":6}]"#);

        assert!(outcome.is_degraded());
        assert_eq!(outcome.reason(), Some("skipped 1 malformed point entries"));
        assert_eq!(
            outcome.value().points(),
            &[Point2D { x: 1, y: 2 }, Point2D { x: 5, y: 6 }]
        );
    }

    #[test]
    fn parse_empty_input() {
        let outcome = PointSet::parse("");
        assert!(!outcome.is_degraded());
        assert!(outcome.value().is_empty());

        let outcome = PointSet::parse("   ");
        assert!(!outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }

    #[test]
    fn parse_invalid_json_degrades_to_empty() {
        let outcome = PointSet::parse("not json");
        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
        assert!(outcome.reason().unwrap().starts_with("invalid point JSON"));
    }

    #[test]
    fn parse_non_array_degrades_to_empty() {
        let outcome = PointSet::parse(r#"{"x": 1, "y": 2}"#);
        assert!(outcome.is_degraded());
        assert!(outcome.value().is_empty());
    }

    #[test]
    fn parse_rounds_to_nearest_integer() {
        let outcome = PointSet::parse("[[1.4, 2.6]]");
        assert_eq!(outcome.value().points(), &[Point2D { x: 1, y: 3 }]);
    }

    #[test]
    fn parse_object_defaults_missing_keys_to_zero() {
        let outcome = PointSet::parse(r#"[{"y": 7}]"#);
        assert_eq!(outcome.value().points(), &[Point2D { x: 0, y: 7 }]);
    }

    #[test]
    fn parse_pair_with_extra_entries() {
        let outcome = PointSet::parse("[[1, 2, 99]]");
        assert_eq!(outcome.value().points(), &[Point2D { x: 1, y: 2 }]);
    }

    #[test]
    fn clamp_is_idempotent() {
        let set = PointSet::new(vec![
            Point2D { x: -5, y: 2 },
            Point2D { x: 11, y: 20 },
            Point2D { x: 3, y: -1 },
        ]);

        let clamped = set.clamp(10, 8);
        assert_eq!(
            clamped.points(),
            &[
                Point2D { x: 0, y: 2 },
                Point2D { x: 10, y: 8 },
                Point2D { x: 3, y: 0 },
            ]
        );
        assert_eq!(clamped.clamp(10, 8), clamped);
    }

    #[test]
    fn normalize_rescales_from_canvas_to_image() {
        let set = PointSet::new(vec![Point2D { x: 512, y: 256 }]);
        let canvas = ImageSize {
            width: 512,
            height: 512,
        };
        let image = ImageSize {
            width: 256,
            height: 256,
        };

        let scaled = set.normalize(canvas, image, true);
        assert_eq!(scaled.points(), &[Point2D { x: 256, y: 128 }]);

        let unscaled = set.normalize(canvas, image, false);
        assert_eq!(unscaled, set);
    }

    #[test]
    fn normalize_truncates_toward_zero() {
        let set = PointSet::new(vec![Point2D { x: 3, y: 3 }]);
        let canvas = ImageSize {
            width: 4,
            height: 4,
        };
        let image = ImageSize {
            width: 6,
            height: 6,
        };

        // 3 * 6 / 4 = 4.5, truncated toward zero
        let scaled = set.normalize(canvas, image, true);
        assert_eq!(scaled.points(), &[Point2D { x: 4, y: 4 }]);
    }

    #[test]
    fn bounding_box_requires_four_points() {
        let mut points = vec![
            Point2D { x: 4, y: 1 },
            Point2D { x: 9, y: 2 },
            Point2D { x: 8, y: 7 },
        ];
        assert_eq!(PointSet::new(points.clone()).bounding_box(), None);

        points.push(Point2D { x: 2, y: 6 });
        assert_eq!(
            PointSet::new(points).bounding_box(),
            Some(BoundingBox {
                x_min: 2,
                y_min: 1,
                x_max: 9,
                y_max: 7,
            })
        );
    }

    #[test]
    fn bounding_box_clamp_and_emptiness() {
        let bbox = BoundingBox {
            x_min: -3,
            y_min: 2,
            x_max: 15,
            y_max: 2,
        };

        let clamped = bbox.clamp(10, 10);
        assert_eq!(clamped.x_min, 0);
        assert_eq!(clamped.x_max, 10);
        assert_eq!(clamped.width(), 10);
        assert_eq!(clamped.height(), 0);
        assert!(clamped.is_empty());
    }

    #[test]
    fn fill_mask_without_quad_is_all_zero() -> Result<(), ImageError> {
        let set = PointSet::new(vec![Point2D { x: 1, y: 1 }, Point2D { x: 3, y: 1 }]);
        let mask = set.fill_mask(ImageSize {
            width: 6,
            height: 4,
        })?;
        assert_eq!(mask.as_slice(), vec![0.0f32; 24]);
        Ok(())
    }

    #[test]
    fn fill_mask_covers_quad() -> Result<(), ImageError> {
        let set = PointSet::new(vec![
            Point2D { x: 0, y: 0 },
            Point2D { x: 4, y: 0 },
            Point2D { x: 4, y: 4 },
            Point2D { x: 0, y: 4 },
        ]);
        let mask = set.fill_mask(ImageSize {
            width: 4,
            height: 4,
        })?;
        assert_eq!(mask.as_slice(), vec![1.0f32; 16]);
        Ok(())
    }

    #[test]
    fn info_labels_points() {
        assert_eq!(PointSet::default().info(), "no points selected");

        let set = PointSet::new(vec![
            Point2D { x: 1, y: 2 },
            Point2D { x: 3, y: 4 },
            Point2D { x: 5, y: 6 },
            Point2D { x: 7, y: 8 },
            Point2D { x: 9, y: 10 },
        ]);
        assert_eq!(
            set.info(),
            "top-left: (1, 2) | top-right: (3, 4) | bottom-right: (5, 6) \
             | bottom-left: (7, 8) | point 5: (9, 10)"
        );
    }

    #[test]
    fn to_json_truncates_to_four_points() {
        let set = PointSet::new(vec![
            Point2D { x: 1, y: 2 },
            Point2D { x: 3, y: 4 },
            Point2D { x: 5, y: 6 },
            Point2D { x: 7, y: 8 },
            Point2D { x: 9, y: 10 },
        ]);
        assert_eq!(set.to_json(), "[[1,2],[3,4],[5,6],[7,8]]");

        assert_eq!(PointSet::default().to_json(), "[]");
    }
}
