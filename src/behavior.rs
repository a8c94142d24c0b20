//! Lane selection and longitudinal target-speed selection, driven by
//! sensor-fusion data and the ego state.

use tracing::debug;

use crate::planner_state::{Lane, PlannerState, CRUISING_TARGET, SPEED_LIMIT, VEL_STEP};
use crate::vehicle::{EgoState, OtherVehicle, PreviousPath};

const LEAD_S_THRESHOLD: f64 = 30.0;
const LEAD_DIST_THRESHOLD: f64 = 50.0;
const SAFETY_DISTANCE: f64 = 2.0;
const LANE_HALF_WIDTH: f64 = 2.0;
const MINIMUM_GAP: f64 = 10.0;
const LANE_LOOK_AHEAD: f64 = 50.0;

/// A vehicle belongs to `lane` iff its Frenet `d` is within 2m of the lane
/// center.
fn in_lane(d: f64, lane: Lane) -> bool {
    (d - lane.center_d()).abs() < LANE_HALF_WIDTH
}

/// Outcome of one behavior-planning pass: everything the trajectory
/// generator and the orchestrator need to know about this tick's decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorOutput {
    pub lane: Lane,
    pub ref_vel: f64,
    pub lead_vehicle_id: Option<i64>,
}

/// Run the behavior layer for one tick, returning the updated lane, slewed
/// reference speed, and current lead vehicle.
pub fn plan(
    state: PlannerState,
    ego: &EgoState,
    previous_path: &PreviousPath,
    sensor_fusion: &[OtherVehicle],
) -> BehaviorOutput {
    let prev_size = previous_path.len();
    let instant_car_s = ego.s;
    let car_s = if prev_size > 0 { previous_path.end_s } else { ego.s };

    let observed_lane = Lane::from_d(ego.d);
    if observed_lane != state.lane {
        // expected during a lane change: the trajectory layer realizes the
        // commit over its ~1s horizon, so `ego.d` lags `state.lane` for a
        // few ticks.
        debug!(
            committed = state.lane.as_i32(),
            observed = observed_lane.as_i32(),
            d = ego.d,
            "ego d hasn't settled into the committed lane yet"
        );
    }

    let horizon = prev_size as f64 * 0.02;

    // Lead identification: scan fully, keep the nearest qualifying lead
    // rather than bailing on the first non-matching vehicle (spec.md §9
    // Open Questions: the naive per-iteration reset is a bug in the
    // original).
    let mut lead: Option<(&OtherVehicle, f64)> = None;
    for v in sensor_fusion {
        if !in_lane(v.d, state.lane) {
            continue;
        }
        let projected_s = v.s + horizon * v.speed();
        if projected_s > car_s && projected_s - car_s < LEAD_S_THRESHOLD {
            let gap = projected_s - car_s;
            if lead.map_or(true, |(_, best_gap)| gap < best_gap) {
                lead = Some((v, projected_s));
            }
        }
    }

    let mut lane_speed = [SPEED_LIMIT; 3];
    let mut lane_available = [true; 3];
    for lane in Lane::all() {
        for v in sensor_fusion {
            if !in_lane(v.d, lane) {
                continue;
            }
            if (v.s - instant_car_s).abs() < MINIMUM_GAP {
                lane_available[lane.index()] = false;
            } else if v.s > instant_car_s && (v.s - instant_car_s) < LANE_LOOK_AHEAD {
                // spec.md §9: min-reduce over qualifying vehicles rather than
                // overwriting with the last one seen in scan order.
                lane_speed[lane.index()] = lane_speed[lane.index()].min(v.speed());
            }
        }
    }

    let (target_vel, lead_vehicle_id) = match lead {
        None => (CRUISING_TARGET, None),
        Some((lead_vehicle, lead_s)) => {
            let lead_speed = lead_vehicle.speed();
            let dist_to_lead = lead_s - car_s;
            if dist_to_lead > LEAD_DIST_THRESHOLD {
                (SPEED_LIMIT, None)
            } else if dist_to_lead < SAFETY_DISTANCE {
                (lead_speed - 0.2, Some(lead_vehicle.id))
            } else {
                (lead_speed, Some(lead_vehicle.id))
            }
        }
    };

    debug!(
        ?lead_vehicle_id,
        ref_vel = state.ref_vel,
        target_vel,
        speed_limit = SPEED_LIMIT,
        "behavior target speed"
    );

    let ref_vel = if state.ref_vel > target_vel {
        (state.ref_vel - VEL_STEP).max(target_vel)
    } else if state.ref_vel < target_vel {
        (state.ref_vel + VEL_STEP).min(target_vel)
    } else {
        state.ref_vel
    };

    let mut lane = state.lane;
    if target_vel < CRUISING_TARGET {
        for candidate in Lane::all() {
            let is_adjacent = (state.lane.as_i32() - candidate.as_i32()).abs() == 1;
            if lane_available[candidate.index()]
                && is_adjacent
                && lane_speed[candidate.index()] > lane_speed[state.lane.index()]
            {
                debug!(from = state.lane.as_i32(), to = candidate.as_i32(), "lane change");
                lane = candidate;
                break;
            }
        }
    }

    BehaviorOutput { lane, ref_vel, lead_vehicle_id }
}
