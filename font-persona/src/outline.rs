//! Flattened glyph outlines and scanline measurement.
//!
//! Outlines are recorded through [`OutlineRecorder`], which implements the
//! skrifa pen interface and flattens quadratic and cubic segments into
//! polylines. Measurements are taken by intersecting the polylines with
//! horizontal or vertical scanlines and collecting the intervals that lie
//! inside the glyph (ink runs) under the nonzero winding rule, so
//! overlapping contours, common in variable fonts, measure correctly.

use skrifa::outline::OutlinePen;

/// Number of line segments used to approximate a quadratic curve.
const QUAD_STEPS: usize = 8;
/// Number of line segments used to approximate a cubic curve.
const CUBIC_STEPS: usize = 12;

/// A point in font units.
pub type Point = (f32, f32);

/// Axis aligned bounding box in font units.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Bounds {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Point {
        (
            (self.x_min + self.x_max) * 0.5,
            (self.y_min + self.y_max) * 0.5,
        )
    }
}

/// An interval along a scanline that lies inside the outline.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Run {
    pub start: f32,
    pub end: f32,
}

impl Run {
    pub fn len(&self) -> f32 {
        self.end - self.start
    }
}

/// Direction of a scanline.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Scan {
    /// A horizontal line at the given y; runs are measured in x.
    Horizontal,
    /// A vertical line at the given x; runs are measured in y.
    Vertical,
}

/// A glyph outline flattened into closed polylines.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct GlyphOutline {
    contours: Vec<Vec<Point>>,
    line_segments: u32,
    curve_segments: u32,
}

impl GlyphOutline {
    /// Creates an outline from closed polygons made of straight segments.
    pub fn from_polygons(polygons: impl IntoIterator<Item = Vec<Point>>) -> Self {
        let mut recorder = OutlineRecorder::default();
        for polygon in polygons {
            let mut points = polygon.into_iter();
            let Some((x, y)) = points.next() else {
                continue;
            };
            recorder.move_to(x, y);
            for (x, y) in points {
                recorder.line_to(x, y);
            }
            recorder.close();
        }
        recorder.finish()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn contours(&self) -> &[Vec<Point>] {
        &self.contours
    }

    /// Number of source segments that were straight lines.
    pub fn line_segments(&self) -> u32 {
        self.line_segments
    }

    /// Number of source segments that were quadratic or cubic curves.
    pub fn curve_segments(&self) -> u32 {
        self.curve_segments
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.contours.iter().flatten();
        let &(x, y) = points.next()?;
        let mut bounds = Bounds {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        };
        for &(x, y) in points {
            bounds.x_min = bounds.x_min.min(x);
            bounds.y_min = bounds.y_min.min(y);
            bounds.x_max = bounds.x_max.max(x);
            bounds.y_max = bounds.y_max.max(y);
        }
        Some(bounds)
    }

    /// Returns the ink runs where the scanline at `at` crosses the outline,
    /// ordered by position.
    pub fn runs(&self, scan: Scan, at: f32) -> Vec<Run> {
        // (position, winding direction)
        let mut crossings: Vec<(f32, i32)> = vec![];
        for contour in &self.contours {
            let Some(&last) = contour.last() else {
                continue;
            };
            let mut prev = last;
            for &point in contour {
                let (p0, p1) = match scan {
                    Scan::Horizontal => (prev, point),
                    Scan::Vertical => ((prev.1, prev.0), (point.1, point.0)),
                };
                // p.1 is the coordinate tested against the scanline and p.0
                // is the position along it.
                if (p0.1 <= at) != (p1.1 <= at) {
                    let t = (at - p0.1) / (p1.1 - p0.1);
                    let pos = p0.0 + t * (p1.0 - p0.0);
                    let dir = if p1.1 > p0.1 { 1 } else { -1 };
                    crossings.push((pos, dir));
                }
                prev = point;
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut runs = vec![];
        let mut winding = 0;
        let mut start = 0.0;
        for (pos, dir) in crossings {
            let was_inside = winding != 0;
            winding += dir;
            match (was_inside, winding != 0) {
                (false, true) => start = pos,
                (true, false) if pos > start => runs.push(Run { start, end: pos }),
                _ => {}
            }
        }
        runs
    }
}

/// Pen that records a flattened [`GlyphOutline`].
#[derive(Default)]
pub struct OutlineRecorder {
    outline: GlyphOutline,
    current: Vec<Point>,
}

impl OutlineRecorder {
    pub fn finish(mut self) -> GlyphOutline {
        self.flush();
        self.outline
    }

    fn flush(&mut self) {
        if self.current.len() > 2 {
            self.outline.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }

    fn last_point(&self) -> Point {
        self.current.last().copied().unwrap_or_default()
    }
}

impl OutlinePen for OutlineRecorder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.flush();
        self.current.push((x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        if self.last_point() != (x, y) {
            self.current.push((x, y));
            self.outline.line_segments += 1;
        }
    }

    fn quad_to(&mut self, cx0: f32, cy0: f32, x: f32, y: f32) {
        let (x0, y0) = self.last_point();
        for i in 1..=QUAD_STEPS {
            let t = i as f32 / QUAD_STEPS as f32;
            let mt = 1.0 - t;
            let a = mt * mt;
            let b = 2.0 * mt * t;
            let c = t * t;
            self.current
                .push((a * x0 + b * cx0 + c * x, a * y0 + b * cy0 + c * y));
        }
        self.outline.curve_segments += 1;
    }

    fn curve_to(&mut self, cx0: f32, cy0: f32, cx1: f32, cy1: f32, x: f32, y: f32) {
        let (x0, y0) = self.last_point();
        for i in 1..=CUBIC_STEPS {
            let t = i as f32 / CUBIC_STEPS as f32;
            let mt = 1.0 - t;
            let a = mt * mt * mt;
            let b = 3.0 * mt * mt * t;
            let c = 3.0 * mt * t * t;
            let d = t * t * t;
            self.current.push((
                a * x0 + b * cx0 + c * cx1 + d * x,
                a * y0 + b * cy0 + c * cy1 + d * y,
            ));
        }
        self.outline.curve_segments += 1;
    }

    fn close(&mut self) {
        if let (Some(&first), Some(&last)) = (self.current.first(), self.current.last()) {
            if first != last {
                self.outline.line_segments += 1;
            } else if self.current.len() > 1 {
                // The polyline is implicitly closed during measurement.
                self.current.pop();
            }
        }
        self.flush();
    }
}


#[cfg(test)]
mod tests {
    use super::{shapes::*, *};

    #[test]
    fn rectangle_bounds_and_runs() {
        let outline = GlyphOutline::from_polygons([rect(10.0, 0.0, 90.0, 700.0)]);
        let bounds = outline.bounds().unwrap();
        assert_eq!((bounds.width(), bounds.height()), (80.0, 700.0));
        assert_eq!(
            outline.runs(Scan::Horizontal, 350.0),
            [Run {
                start: 10.0,
                end: 90.0
            }]
        );
        assert_eq!(
            outline.runs(Scan::Vertical, 50.0),
            [Run {
                start: 0.0,
                end: 700.0
            }]
        );
        assert!(outline.runs(Scan::Horizontal, 800.0).is_empty());
        assert_eq!(outline.line_segments(), 4);
        assert_eq!(outline.curve_segments(), 0);
    }

    #[test]
    fn counters_split_runs() {
        let outline = GlyphOutline::from_polygons(ring(0.0, 0.0, 500.0, 500.0, 90.0, 30.0));
        let lens: Vec<_> = outline
            .runs(Scan::Horizontal, 250.0)
            .iter()
            .map(Run::len)
            .collect();
        assert_eq!(lens, [90.0, 90.0]);
        let lens: Vec<_> = outline
            .runs(Scan::Vertical, 250.0)
            .iter()
            .map(Run::len)
            .collect();
        assert_eq!(lens, [30.0, 30.0]);
    }

    #[test]
    fn overlapping_contours_merge_under_nonzero() {
        let outline = GlyphOutline::from_polygons([
            rect(0.0, 0.0, 100.0, 100.0),
            rect(50.0, 0.0, 150.0, 100.0),
        ]);
        assert_eq!(
            outline.runs(Scan::Horizontal, 50.0),
            [Run {
                start: 0.0,
                end: 150.0
            }]
        );
    }

    #[test]
    fn curves_are_flattened_and_counted() {
        let mut pen = OutlineRecorder::default();
        pen.move_to(0.0, 0.0);
        pen.line_to(100.0, 0.0);
        pen.quad_to(100.0, 100.0, 0.0, 100.0);
        pen.curve_to(-50.0, 100.0, -50.0, 0.0, 0.0, 0.0);
        pen.close();
        let outline = pen.finish();
        assert_eq!(outline.contours().len(), 1);
        assert_eq!(outline.line_segments(), 1);
        assert_eq!(outline.curve_segments(), 2);
        let bounds = outline.bounds().unwrap();
        assert!(bounds.x_max <= 100.0 && bounds.x_max > 70.0);
        assert!(bounds.x_min < -30.0);
    }

    #[test]
    fn degenerate_contours_are_dropped() {
        let mut pen = OutlineRecorder::default();
        pen.move_to(0.0, 0.0);
        pen.line_to(10.0, 0.0);
        pen.close();
        assert!(pen.finish().is_empty());
    }
}
