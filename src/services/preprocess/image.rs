//! Chart-image line statistics.
//!
//! This is a heuristic, not pattern recognition: the image is reduced to an
//! edge map, straight segments are found with a probabilistic Hough
//! transform, and the mean segment angle decides between bullish, bearish
//! and neither. It says nothing reliable about actual chart patterns.

use image::GrayImage;
use imageproc::edges::canny;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::AnalysisError;
use crate::types::PatternFlags;

/// Canny hysteresis thresholds.
pub const CANNY_LOW: f32 = 50.0;
pub const CANNY_HIGH: f32 = 150.0;

/// Mean angle (degrees) beyond which lines count as trending.
pub const TREND_ANGLE_DEGREES: f64 = 10.0;

/// Fixed seed for the order edge points are visited in.
const HOUGH_SEED: u64 = 0x5ca1_7e55;

/// Straight segment between two pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LineSegment {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// `atan2(dy, dx)` in degrees, in image coordinates (y grows downward).
    pub fn angle_degrees(&self) -> f64 {
        f64::from(self.y2 - self.y1)
            .atan2(f64::from(self.x2 - self.x1))
            .to_degrees()
    }
}

/// Probabilistic Hough transform parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Angular resolution in degrees.
    pub theta_step_degrees: f64,
    /// Minimum accumulator votes for a line candidate.
    pub threshold: u32,
    /// Minimum extent along either axis for a segment to be kept.
    pub min_line_length: i32,
    /// Largest run of missing pixels bridged inside one segment.
    pub max_line_gap: i32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            theta_step_degrees: 1.0,
            threshold: 100,
            min_line_length: 100,
            max_line_gap: 10,
        }
    }
}

/// Hough accumulator with 1px rho resolution.
struct Accumulator {
    cos: Vec<f64>,
    sin: Vec<f64>,
    num_rho: usize,
    votes: Vec<u32>,
}

impl Accumulator {
    fn new(width: u32, height: u32, theta_step_degrees: f64) -> Self {
        let step = theta_step_degrees.max(f64::EPSILON).to_radians();
        let num_angles = (std::f64::consts::PI / step).round().max(1.0) as usize;
        let (sin, cos) = (0..num_angles)
            .map(|n| (n as f64 * step).sin_cos())
            .unzip();
        let num_rho = ((width + height) * 2 + 1) as usize;
        Self {
            cos,
            sin,
            num_rho,
            votes: vec![0; num_angles * num_rho],
        }
    }

    fn rho_index(&self, n: usize, x: i32, y: i32) -> usize {
        let rho = (f64::from(x) * self.cos[n] + f64::from(y) * self.sin[n]).round() as i64;
        (rho + (self.num_rho as i64 - 1) / 2) as usize
    }

    /// Add a point's votes; returns the strongest angle and its count.
    fn vote(&mut self, x: i32, y: i32) -> (usize, u32) {
        let mut best = (0, 0);
        for n in 0..self.cos.len() {
            let idx = n * self.num_rho + self.rho_index(n, x, y);
            self.votes[idx] += 1;
            if self.votes[idx] > best.1 {
                best = (n, self.votes[idx]);
            }
        }
        best
    }

    fn unvote(&mut self, x: i32, y: i32) {
        for n in 0..self.cos.len() {
            let idx = n * self.num_rho + self.rho_index(n, x, y);
            self.votes[idx] = self.votes[idx].saturating_sub(1);
        }
    }
}

/// Detect straight segments in a binary edge map (non-zero = edge).
///
/// Edge points are visited in a shuffled but fixed order. Each point votes in
/// the accumulator; once its strongest line passes the threshold, the line is
/// walked in both directions bridging gaps up to `max_line_gap`. Pixels on the
/// walked segment are consumed, and if the segment is long enough it is kept
/// and its votes withdrawn.
pub fn detect_segments(edges: &GrayImage, params: &HoughParams) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    let mut mask: Vec<bool> = edges.pixels().map(|p| p.0[0] > 0).collect();

    let mut points: Vec<(i32, i32)> = mask
        .iter()
        .enumerate()
        .filter(|(_, on)| **on)
        .map(|(i, _)| ((i as u32 % width) as i32, (i as u32 / width) as i32))
        .collect();
    points.shuffle(&mut StdRng::seed_from_u64(HOUGH_SEED));

    let mut acc = Accumulator::new(width, height, params.theta_step_degrees);
    let in_bounds = |x: i32, y: i32| x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height;
    let at = |x: i32, y: i32| (y as u32 * width + x as u32) as usize;

    let mut segments = Vec::new();

    for &(px, py) in &points {
        // Already consumed by an earlier segment
        if !mask[at(px, py)] {
            continue;
        }

        let (best_n, best_votes) = acc.vote(px, py);
        if best_votes < params.threshold {
            continue;
        }

        // Walk along the line direction, one pixel per step on the major axis
        let (a, b) = (-acc.sin[best_n], acc.cos[best_n]);
        let (dx, dy) = if a.abs() > b.abs() {
            (a.signum(), b / a.abs())
        } else {
            (a / b.abs(), b.signum())
        };
        let step_point = |sign: f64, i: i32| {
            let t = sign * f64::from(i);
            (
                (f64::from(px) + dx * t).round() as i32,
                (f64::from(py) + dy * t).round() as i32,
            )
        };

        // Last step index that hit an edge pixel, per direction
        let mut reach = [0i32; 2];
        for (k, sign) in [1.0, -1.0].into_iter().enumerate() {
            let mut gap = 0;
            let mut i = 0;
            loop {
                let (x, y) = step_point(sign, i);
                if !in_bounds(x, y) {
                    break;
                }
                if mask[at(x, y)] {
                    gap = 0;
                    reach[k] = i;
                } else {
                    gap += 1;
                    if gap > params.max_line_gap {
                        break;
                    }
                }
                i += 1;
            }
        }

        let start = step_point(1.0, reach[0]);
        let end = step_point(-1.0, reach[1]);
        let good_line = (end.0 - start.0).abs() >= params.min_line_length
            || (end.1 - start.1).abs() >= params.min_line_length;

        for (k, sign) in [1.0, -1.0].into_iter().enumerate() {
            for i in 0..=reach[k] {
                let (x, y) = step_point(sign, i);
                let idx = at(x, y);
                if mask[idx] {
                    if good_line {
                        acc.unvote(x, y);
                    }
                    mask[idx] = false;
                }
            }
        }

        if good_line {
            segments.push(LineSegment::new(start.0, start.1, end.0, end.1));
        }
    }

    segments
}

/// Classify segments by their mean angle.
pub fn classify_segments(segments: &[LineSegment]) -> PatternFlags {
    if segments.is_empty() {
        return PatternFlags::default();
    }

    let mean_angle =
        segments.iter().map(LineSegment::angle_degrees).sum::<f64>() / segments.len() as f64;

    PatternFlags {
        bullish: mean_angle > TREND_ANGLE_DEGREES,
        bearish: mean_angle < -TREND_ANGLE_DEGREES,
        line_count: segments.len(),
    }
}

/// Decode an image and extract its pattern flags.
pub fn extract_patterns(bytes: &[u8]) -> Result<PatternFlags, AnalysisError> {
    let gray = image::load_from_memory(bytes)?.to_luma8();
    let edges = canny(&gray, CANNY_LOW, CANNY_HIGH);
    let segments = detect_segments(&edges, &HoughParams::default());

    tracing::debug!(
        "Detected {} line segments in {}x{} image",
        segments.len(),
        gray.width(),
        gray.height()
    );

    Ok(classify_segments(&segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn blank(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([0u8]))
    }

    #[test]
    fn test_segment_angle() {
        assert_eq!(LineSegment::new(0, 0, 10, 0).angle_degrees(), 0.0);
        assert!((LineSegment::new(0, 0, 10, 10).angle_degrees() - 45.0).abs() < 1e-9);
        assert!((LineSegment::new(0, 10, 0, 0).angle_degrees() + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_edge_map_has_no_segments() {
        assert!(detect_segments(&blank(200, 200), &HoughParams::default()).is_empty());
    }

    #[test]
    fn test_detects_horizontal_line() {
        let mut edges = blank(300, 100);
        for x in 20..220 {
            edges.put_pixel(x, 50, Luma([255]));
        }

        let segments = detect_segments(&edges, &HoughParams::default());
        assert_eq!(segments.len(), 1);
        let segment = segments[0];
        assert_eq!(segment.y1, 50);
        assert_eq!(segment.y2, 50);
        assert!((segment.x2 - segment.x1).abs() >= 190);
        assert!(segment.angle_degrees().abs() < 1.0);
    }

    #[test]
    fn test_short_line_is_ignored() {
        let mut edges = blank(300, 100);
        for x in 0..60 {
            edges.put_pixel(x, 10, Luma([255]));
        }
        assert!(detect_segments(&edges, &HoughParams::default()).is_empty());
    }

    #[test]
    fn test_detects_vertical_line() {
        let mut edges = blank(100, 300);
        for y in 10..250 {
            edges.put_pixel(40, y, Luma([255]));
        }

        let segments = detect_segments(&edges, &HoughParams::default());
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].x1, 40);
        assert_eq!(segments[0].x2, 40);
        assert!((segments[0].angle_degrees().abs() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_detects_diagonal_line() {
        // About 15 degrees below horizontal in image coordinates
        let mut edges = blank(320, 120);
        for x in 20..300u32 {
            let y = 20 + (0.27 * f64::from(x - 20)).round() as u32;
            edges.put_pixel(x, y, Luma([255]));
        }

        let segments = detect_segments(&edges, &HoughParams::default());
        assert!(!segments.is_empty());

        let segment = segments[0];
        let (left, right) = if segment.x1 <= segment.x2 {
            ((segment.x1, segment.y1), (segment.x2, segment.y2))
        } else {
            ((segment.x2, segment.y2), (segment.x1, segment.y1))
        };
        assert!((left.0 - 20).abs() <= 2 && (left.1 - 20).abs() <= 2);
        assert!((right.0 - 299).abs() <= 2 && (right.1 - 95).abs() <= 2);

        for segment in &segments {
            let angle = segment.angle_degrees();
            assert!((13.0..17.0).contains(&angle), "angle {}", angle);
        }
        assert!(classify_segments(&segments).bullish);
    }

    #[test]
    fn test_classify_mean_angle() {
        // atan2(15, 56) and atan2(16, 60) are both about 15 degrees
        let rising = [LineSegment::new(0, 0, 56, 15), LineSegment::new(0, 0, 60, 16)];
        let flags = classify_segments(&rising);
        assert!(flags.bullish);
        assert!(!flags.bearish);
        assert_eq!(flags.line_count, 2);

        let falling = [LineSegment::new(0, 15, 56, 0)];
        let flags = classify_segments(&falling);
        assert!(flags.bearish);
        assert!(!flags.bullish);

        let mixed = [LineSegment::new(0, 0, 56, 15), LineSegment::new(0, 15, 56, 0)];
        assert_eq!(
            classify_segments(&mixed),
            PatternFlags {
                bullish: false,
                bearish: false,
                line_count: 2
            }
        );
    }

    #[test]
    fn test_no_segments_is_neutral() {
        assert_eq!(classify_segments(&[]), PatternFlags::default());
    }

    #[test]
    fn test_undecodable_bytes() {
        let err = extract_patterns(b"definitely not a png").unwrap_err();
        assert!(matches!(err, AnalysisError::UnreadableImage(_)));
    }
}
