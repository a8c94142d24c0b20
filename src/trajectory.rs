//! Spline-smoothed, continuity-preserving generation of the 50-point output
//! path, per spec §4.3.

use crate::map::Map;
use crate::planner_state::{Lane, PATH_LEN, TICK_DT};
use crate::spline::NaturalCubicSpline;
use crate::vehicle::{EgoState, PreviousPath};

/// Minimum reference speed before the horizon-point extension loop is
/// entered; below this, `1 / (0.02 * ref_vel)` blows up, so we simply
/// re-emit the residual previous path unchanged (spec §4.3 edge case, §7).
const MIN_REF_VEL: f64 = 1e-3;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Build the new 50-point path: the residual previous path followed by
/// freshly generated points along a natural cubic spline fit through two
/// rearward anchors (for C¹ continuity) and three forward anchors 40/80/120m
/// ahead in the target lane.
pub fn generate(
    map: &Map,
    lane: Lane,
    ref_vel: f64,
    ego: &EgoState,
    previous_path: &PreviousPath,
) -> Path {
    let prev_size = previous_path.len();

    let mut anchors_x = Vec::with_capacity(5);
    let mut anchors_y = Vec::with_capacity(5);

    let (ref_x, ref_y, ref_yaw);

    if prev_size < 2 {
        let prev_car_x = ego.x - ego.yaw.cos();
        let prev_car_y = ego.y - ego.yaw.sin();
        anchors_x.push(prev_car_x);
        anchors_x.push(ego.x);
        anchors_y.push(prev_car_y);
        anchors_y.push(ego.y);

        ref_x = ego.x;
        ref_y = ego.y;
        ref_yaw = ego.yaw;
    } else {
        let last_x = previous_path.x[prev_size - 1];
        let last_y = previous_path.y[prev_size - 1];
        let prev_x = previous_path.x[prev_size - 2];
        let prev_y = previous_path.y[prev_size - 2];

        anchors_x.push(prev_x);
        anchors_x.push(last_x);
        anchors_y.push(prev_y);
        anchors_y.push(last_y);

        ref_x = last_x;
        ref_y = last_y;
        ref_yaw = (last_y - prev_y).atan2(last_x - prev_x);
    }

    let car_s = if prev_size > 0 { previous_path.end_s } else { ego.s };
    for delta in [40.0, 80.0, 120.0] {
        // car_s + delta may cross the track's wrap point (spec §4.1, §8 S6);
        // normalize before handing it to the Frenet -> Cartesian conversion,
        // which assumes an already-normalized s.
        let (x, y) = map.frenet_to_cartesian(map.normalize_s(car_s + delta), lane.center_d());
        anchors_x.push(x);
        anchors_y.push(y);
    }

    // transform anchors into the local frame: translate by -(ref_x, ref_y),
    // rotate by -ref_yaw
    let mut local_points = Vec::with_capacity(5);
    for i in 0..anchors_x.len() {
        let shift_x = anchors_x[i] - ref_x;
        let shift_y = anchors_y[i] - ref_y;
        let local_x = shift_x * (-ref_yaw).cos() - shift_y * (-ref_yaw).sin();
        let local_y = shift_x * (-ref_yaw).sin() + shift_y * (-ref_yaw).cos();
        local_points.push((local_x, local_y));
    }

    let mut out = Path {
        x: previous_path.x.clone(),
        y: previous_path.y.clone(),
    };

    if ref_vel < MIN_REF_VEL {
        // can't divide by ~0 to step along the spline; re-emit the residual
        // path unchanged, per spec §4.3/§7.
        return out;
    }

    let spline = match NaturalCubicSpline::fit(&local_points) {
        Ok(spline) => spline,
        // degenerate/non-monotone anchor set: guard, don't propagate.
        Err(_) => return out,
    };

    let target_x = 30.0;
    let target_y = spline.evaluate(target_x);
    let target_dist = (target_x * target_x + target_y * target_y).sqrt();

    let n_steps = target_dist / (TICK_DT * ref_vel);
    let mut x_add_on = 0.0;

    let remaining = PATH_LEN - prev_size;
    out.x.reserve(remaining);
    out.y.reserve(remaining);

    for _ in 0..remaining {
        let x_point_local = x_add_on + target_x / n_steps;
        let y_point_local = spline.evaluate(x_point_local);

        x_add_on = x_point_local;

        let x_global = x_point_local * ref_yaw.cos() - y_point_local * ref_yaw.sin() + ref_x;
        let y_global = x_point_local * ref_yaw.sin() + y_point_local * ref_yaw.cos() + ref_y;

        out.x.push(x_global);
        out.y.push(y_global);
    }

    out
}
