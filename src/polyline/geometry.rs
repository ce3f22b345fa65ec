/// Polyline vertex windows and their construction from point paths.
use glam::{DVec3, Vec4};

use super::order::Order;
use crate::error::{RenderError, Result};
use crate::precision::SplitCoordinate;
use crate::program::{AttributeRecord, AttributeType};

/// One duplicated polyline vertex: the point, its two neighbours and the
/// order tag.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PolylineVertexWindow {
    pub prev: SplitCoordinate,
    pub current: SplitCoordinate,
    pub next: SplitCoordinate,
    pub order: Order,
    pub color: Vec4,
}

impl AttributeRecord for PolylineVertexWindow {
    const ATTRIBUTES: &'static [(&'static str, AttributeType)] = &[
        ("prevHigh", AttributeType::Vec3),
        ("currentHigh", AttributeType::Vec3),
        ("nextHigh", AttributeType::Vec3),
        ("prevLow", AttributeType::Vec3),
        ("currentLow", AttributeType::Vec3),
        ("nextLow", AttributeType::Vec3),
        ("order", AttributeType::Float),
        ("color", AttributeType::Vec4),
    ];
}

/// Vertex windows plus the triangle list stitching them into ribbons.
#[derive(Clone, Debug, Default)]
pub struct PolylineGeometry {
    pub vertices: Vec<PolylineVertexWindow>,
    pub indices: Vec<u32>,
}

impl PolylineGeometry {
    pub fn segment_count(&self) -> usize {
        self.indices.len() / 6
    }
}

/// Expands paths of world-space points into [`PolylineGeometry`].
///
/// Every point yields four windows (orders `1, -1, 2, -2`); each segment
/// joins the `±2` duplicates of its first point to the `±1` duplicates of
/// its second. Open ends reuse the point itself as the missing neighbour.
#[derive(Clone, Debug)]
pub struct PolylineBuilder {
    rtc_center: DVec3,
    closed: bool,
    color: Vec4,
    geometry: PolylineGeometry,
}

impl Default for PolylineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PolylineBuilder {
    pub fn new() -> Self {
        Self {
            rtc_center: DVec3::ZERO,
            closed: false,
            color: Vec4::ONE,
            geometry: PolylineGeometry::default(),
        }
    }

    /// Split points relative to `rtc_center` (applies to later paths).
    pub fn with_rtc_center(mut self, rtc_center: DVec3) -> Self {
        self.rtc_center = rtc_center;
        self
    }

    /// Close later paths back onto their first point.
    pub fn closed(mut self, closed: bool) -> Self {
        self.closed = closed;
        self
    }

    /// Colour for paths pushed without per-point colours.
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn push_path(&mut self, points: &[DVec3]) -> Result<()> {
        let colors = vec![self.color; points.len()];
        self.push_colored_path(points, &colors)
    }

    pub fn push_colored_path(&mut self, points: &[DVec3], colors: &[Vec4]) -> Result<()> {
        if points.len() < 2 {
            return Err(RenderError::PolylineTooShort {
                points: points.len(),
            });
        }
        if colors.len() != points.len() {
            return Err(RenderError::ColorCountMismatch {
                points: points.len(),
                colors: colors.len(),
            });
        }

        let split: Vec<SplitCoordinate> = points
            .iter()
            .map(|&p| SplitCoordinate::from_dvec3_relative(p, self.rtc_center))
            .collect();
        let n = split.len();
        // A closed path repeats its first point at the end.
        let logical = if self.closed { n + 1 } else { n };

        let first = self.geometry.vertices.len() as u32;
        for i in 0..logical {
            let index = i % n;
            let current = split[index];
            let prev = match (i, self.closed) {
                (0, true) => split[n - 1],
                (0, false) => current,
                _ => split[i - 1],
            };
            let next = if i + 1 < n {
                split[i + 1]
            } else if self.closed {
                split[(i + 1) % n]
            } else {
                current
            };
            for order in Order::EMISSION {
                self.geometry.vertices.push(PolylineVertexWindow {
                    prev,
                    current,
                    next,
                    order,
                    color: colors[index],
                });
            }
        }

        for segment in 0..(logical as u32 - 1) {
            let start = first + segment * 4;
            let end = start + 4;
            // start +2, start -2, end +1, end -1
            let (a, b, c, d) = (start + 2, start + 3, end, end + 1);
            self.geometry.indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
        Ok(())
    }

    pub fn build(self) -> PolylineGeometry {
        log::trace!(
            "built polyline: {} windows, {} segments",
            self.geometry.vertices.len(),
            self.geometry.segment_count()
        );
        self.geometry
    }
}
