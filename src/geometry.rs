//! Euclidean distance and Frenet <-> Cartesian conversion against a
//! polyline map of waypoints.

use std::f64::consts::PI;

use itertools::Itertools;
use nalgebra::Point2;

/// A single map waypoint: global position, arclength along the reference
/// curve, and the unit normal pointing to the right of travel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Waypoint {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Waypoint {
    fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

pub fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    nalgebra::distance(&Point2::new(x1, y1), &Point2::new(x2, y2))
}

/// Index of the waypoint nearest to (x, y), by linear scan. Ties keep the
/// lowest index, matching the first `dist < closest_len` write in scan order.
pub fn closest_waypoint(x: f64, y: f64, waypoints: &[Waypoint]) -> usize {
    let mut closest_len = f64::MAX;
    let mut closest = 0;
    for (i, wp) in waypoints.iter().enumerate() {
        let dist = distance(x, y, wp.x, wp.y);
        if dist < closest_len {
            closest_len = dist;
            closest = i;
        }
    }
    closest
}

/// The waypoint just ahead of (x, y, yaw): the closest waypoint, advanced by
/// one if it is more than 45 degrees behind the heading.
pub fn next_waypoint(x: f64, y: f64, yaw: f64, waypoints: &[Waypoint]) -> usize {
    let closest = closest_waypoint(x, y, waypoints);

    let map_x = waypoints[closest].x;
    let map_y = waypoints[closest].y;

    let heading = (map_y - y).atan2(map_x - x);

    let angle = (yaw - heading).abs();
    let angle = (2.0 * PI - angle).min(angle);

    if angle > PI / 4.0 {
        (closest + 1) % waypoints.len()
    } else {
        closest
    }
}

/// Cartesian (x, y, yaw) -> Frenet (s, d) against the polyline map.
pub fn cartesian_to_frenet(x: f64, y: f64, yaw: f64, waypoints: &[Waypoint]) -> (f64, f64) {
    let n = waypoints.len();
    let next_wp = next_waypoint(x, y, yaw, waypoints);
    let prev_wp = if next_wp == 0 { n - 1 } else { next_wp - 1 };

    let n_x = waypoints[next_wp].x - waypoints[prev_wp].x;
    let n_y = waypoints[next_wp].y - waypoints[prev_wp].y;
    let x_x = x - waypoints[prev_wp].x;
    let x_y = y - waypoints[prev_wp].y;

    // project (x_x, x_y) onto (n_x, n_y)
    let proj_norm = (x_x * n_x + x_y * n_y) / (n_x * n_x + n_y * n_y);
    let proj_x = proj_norm * n_x;
    let proj_y = proj_norm * n_y;

    let mut frenet_d = distance(x_x, x_y, proj_x, proj_y);

    // sign d by comparing against a fixed interior point of the closed track
    let center_x = 1000.0 - waypoints[prev_wp].x;
    let center_y = 2000.0 - waypoints[prev_wp].y;
    let center_to_pos = distance(center_x, center_y, x_x, x_y);
    let center_to_ref = distance(center_x, center_y, proj_x, proj_y);

    if center_to_pos <= center_to_ref {
        frenet_d *= -1.0;
    }

    let frenet_s: f64 = waypoints[..=prev_wp]
        .iter()
        .tuple_windows()
        .map(|(a, b)| nalgebra::distance(&a.point(), &b.point()))
        .sum();
    let frenet_s = frenet_s + distance(0.0, 0.0, proj_x, proj_y);

    (frenet_s, frenet_d)
}

/// Frenet (s, d) -> Cartesian (x, y) against the polyline map. `s` is
/// expected to already be normalized into `[0, max_s)` by the caller when it
/// may have crossed the wrap point.
pub fn frenet_to_cartesian(s: f64, d: f64, waypoints: &[Waypoint]) -> (f64, f64) {
    let n = waypoints.len();

    let mut prev_wp: i64 = -1;
    while prev_wp < (n as i64 - 1) && s > waypoints[(prev_wp + 1) as usize].s {
        prev_wp += 1;
    }
    let prev_wp = prev_wp.max(0) as usize;
    let next_wp = (prev_wp + 1) % n;

    let heading = (waypoints[next_wp].y - waypoints[prev_wp].y)
        .atan2(waypoints[next_wp].x - waypoints[prev_wp].x);

    let seg_s = s - waypoints[prev_wp].s;

    let seg_x = waypoints[prev_wp].x + seg_s * heading.cos();
    let seg_y = waypoints[prev_wp].y + seg_s * heading.sin();

    let perp_heading = heading - PI / 2.0;

    let x = seg_x + d * perp_heading.cos();
    let y = seg_y + d * perp_heading.sin();

    (x, y)
}
