//! The per-message driver: parse ego state and sensor fusion, invoke
//! behavior, invoke trajectory, and thread `PlannerState` across ticks.

use crate::behavior;
use crate::map::Map;
use crate::planner_state::PlannerState;
use crate::trajectory::{self, Path};
use crate::vehicle::{EgoState, OtherVehicle, PreviousPath};

/// Run one planning tick: update `state` in place and return the new path.
pub fn tick(
    state: &mut PlannerState,
    map: &Map,
    ego: &EgoState,
    previous_path: &PreviousPath,
    sensor_fusion: &[OtherVehicle],
) -> Path {
    let behavior::BehaviorOutput { lane, ref_vel, lead_vehicle_id } =
        behavior::plan(*state, ego, previous_path, sensor_fusion);

    state.lane = lane;
    state.ref_vel = ref_vel;
    state.lead_vehicle_id = lead_vehicle_id;

    trajectory::generate(map, state.lane, state.ref_vel, ego, previous_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Waypoint;
    use crate::planner_state::PATH_LEN;

    fn straight_map() -> Map {
        let mut wps = Vec::new();
        for i in 0..200 {
            let x = i as f64 * 10.0;
            wps.push(Waypoint { x, y: 0.0, s: x, dx: 0.0, dy: -1.0 });
        }
        Map::new(wps)
    }

    /// Drives several ticks end-to-end the way the transport layer would,
    /// feeding each tick's tail back in as the next tick's previous path.
    #[test]
    fn multi_tick_drive_stays_within_invariants() {
        let map = straight_map();
        let mut state = PlannerState::default();
        let mut previous = PreviousPath::default();
        let mut ego = EgoState { x: 0.0, y: 6.0, yaw: 0.0, speed: 0.0, s: 0.0, d: 6.0 };

        let mut prev_ref_vel = state.ref_vel;
        for _ in 0..20 {
            let path = tick(&mut state, &map, &ego, &previous, &[]);
            assert_eq!(path.x.len(), PATH_LEN);
            assert_eq!(path.y.len(), PATH_LEN);
            assert!((state.ref_vel - prev_ref_vel).abs() <= 0.3125 + 1e-9);
            prev_ref_vel = state.ref_vel;

            // simulate the car consuming half the path before the next tick
            let consumed = PATH_LEN / 2;
            let tail_x = path.x[consumed..].to_vec();
            let tail_y = path.y[consumed..].to_vec();
            let (end_s, end_d) = map.cartesian_to_frenet(
                *tail_x.last().unwrap(),
                *tail_y.last().unwrap(),
                ego.yaw,
            );
            previous = PreviousPath { x: tail_x, y: tail_y, end_s, end_d };

            // advance ego along what was actually driven
            ego.x = path.x[consumed - 1];
            ego.y = path.y[consumed - 1];
            let (s, d) = map.cartesian_to_frenet(ego.x, ego.y, ego.yaw);
            ego.s = s;
            ego.d = d;
        }

        // after enough ticks with an empty road, ref_vel should have slewed
        // up towards cruising speed
        assert!(state.ref_vel > 5.0);
    }
}
