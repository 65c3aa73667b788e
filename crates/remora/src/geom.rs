//! Geometry helpers: point distance, uniform sub-sampling and edge path correction.

use crate::model::{EDGE_WAYPOINTS_CAP, Point};

pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Selects at most `cap` evenly spaced points from `points`, always keeping the first and last,
/// so the overall path shape survives while the array length stays bounded.
pub fn uniform_sample(points: &[Point], cap: usize) -> Vec<Point> {
    if points.len() <= cap {
        return points.to_vec();
    }
    if cap == 0 {
        return Vec::new();
    }
    if cap == 1 {
        return vec![points[0]];
    }
    let last = (points.len() - 1) as f64;
    let step = last / (cap - 1) as f64;
    (0..cap)
        .map(|i| points[(i as f64 * step).round() as usize])
        .collect()
}

pub fn straight_path(source: Point, target: Point) -> Vec<Point> {
    vec![source, target]
}

/// Turns a raw engine waypoint sequence into a bounded, renderable path that terminates exactly
/// at the endpoint centers.
///
/// Non-loop paths always end with the engine's target-entrance point twice followed by the
/// target center. The duplication pins the last four points of the sequence regardless of how
/// many waypoints survive sampling, which the rendering layer relies on for fixed-offset
/// arrowhead placement.
pub fn correct_edge_path(raw: &[Point], source: Point, target: Point, is_loop: bool) -> Vec<Point> {
    if is_loop {
        let mut out = uniform_sample(raw, EDGE_WAYPOINTS_CAP);
        if out.len() < 2 {
            out = vec![source, source];
        }
        out[0] = source;
        let last = out.len() - 1;
        out[last] = source;
        return out;
    }

    let Some((&entrance, body)) = raw.split_last() else {
        return straight_path(source, target);
    };

    let mut out = Vec::with_capacity(EDGE_WAYPOINTS_CAP);
    out.push(source);
    out.extend(uniform_sample(body, EDGE_WAYPOINTS_CAP - 4));
    out.push(entrance);
    out.push(entrance);
    out.push(target);
    out
}

/// Minimum distance between any two centers, or `None` with fewer than two points.
pub fn min_pairwise_distance(centers: &[Point]) -> Option<f64> {
    if centers.len() < 2 {
        return None;
    }
    let mut min = f64::INFINITY;
    for (i, a) in centers.iter().enumerate() {
        for b in &centers[i + 1..] {
            let d = distance(*a, *b);
            if d < min {
                min = d;
            }
        }
    }
    Some(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::point;

    fn run(n: usize) -> Vec<Point> {
        (0..n).map(|i| point(i as f64, 0.0)).collect()
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(point(0.0, 0.0), point(3.0, 4.0)), 5.0);
    }

    #[test]
    fn uniform_sample_keeps_short_sequences_intact() {
        let pts = run(5);
        assert_eq!(uniform_sample(&pts, 8), pts);
    }

    #[test]
    fn uniform_sample_bounds_length_and_keeps_extremes() {
        let pts = run(100);
        let sampled = uniform_sample(&pts, 7);
        assert_eq!(sampled.len(), 7);
        assert_eq!(sampled[0], pts[0]);
        assert_eq!(sampled[6], pts[99]);
    }

    #[test]
    fn non_loop_correction_pins_the_four_point_tail() {
        let raw = run(40);
        let source = point(-1.0, -1.0);
        let target = point(50.0, 50.0);
        let out = correct_edge_path(&raw, source, target, false);

        assert!(out.len() <= EDGE_WAYPOINTS_CAP);
        assert_eq!(out[0], source);
        let entrance = raw[39];
        let n = out.len();
        assert_eq!(out[n - 3], entrance);
        assert_eq!(out[n - 2], entrance);
        assert_eq!(out[n - 1], target);
    }

    #[test]
    fn empty_raw_path_degrades_to_a_straight_segment() {
        let source = point(0.0, 0.0);
        let target = point(10.0, 0.0);
        assert_eq!(
            correct_edge_path(&[], source, target, false),
            vec![source, target]
        );
    }

    #[test]
    fn loop_correction_forces_both_ends_onto_the_node_center() {
        let raw = run(30);
        let center = point(5.0, 5.0);
        let out = correct_edge_path(&raw, center, center, true);

        assert!(out.len() <= EDGE_WAYPOINTS_CAP);
        assert_eq!(out[0], center);
        assert_eq!(*out.last().unwrap(), center);
    }

    #[test]
    fn min_pairwise_distance_finds_the_closest_pair() {
        let centers = vec![point(0.0, 0.0), point(100.0, 0.0), point(103.0, 4.0)];
        assert_eq!(min_pairwise_distance(&centers), Some(5.0));
        assert_eq!(min_pairwise_distance(&centers[..1]), None);
    }
}
