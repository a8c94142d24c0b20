//! Cross-tick process state and the constants that govern it. spec.md §9
//! rules out polymorphism for the small, closed set of lanes; `Lane` is a
//! tagged newtype rather than a trait object.

/// Lane width, meters.
pub const LANE_WIDTH: f64 = 4.0;
/// Legal speed limit, 50 mph in m/s.
pub const SPEED_LIMIT: f64 = 22.352;
/// Cruising target when no lead vehicle constrains us.
pub const CRUISING_TARGET: f64 = SPEED_LIMIT - 0.5;
/// Per-tick accel/decel step, 0.7 mph in m/s (~15.6 m/s^2 at 50Hz).
pub const VEL_STEP: f64 = 0.3125;
/// Simulator tick period, seconds.
pub const TICK_DT: f64 = 0.02;
/// Output path length, points (1s horizon at 50Hz).
pub const PATH_LEN: usize = 50;

/// A lane index, 0 (leftmost) to 2 (rightmost).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Lane(u8);

impl Lane {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 2;

    /// Returns `None` if `i` is not in `{0, 1, 2}`.
    pub fn new(i: i32) -> Option<Self> {
        if (Self::MIN as i32..=Self::MAX as i32).contains(&i) {
            Some(Self(i as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_i32(self) -> i32 {
        self.0 as i32
    }

    /// Frenet `d` of this lane's center.
    pub fn center_d(self) -> f64 {
        2.0 + LANE_WIDTH * self.0 as f64
    }

    /// The lane whose center `d` is closest to the given Frenet `d`.
    pub fn from_d(d: f64) -> Self {
        let raw = ((d - 2.0) / LANE_WIDTH).round() as i32;
        Self::new(raw.clamp(Self::MIN as i32, Self::MAX as i32)).unwrap()
    }

    /// All three lanes, ascending.
    pub fn all() -> [Lane; 3] {
        [Lane(0), Lane(1), Lane(2)]
    }

    pub fn center() -> Lane {
        Lane(1)
    }
}

/// Process-wide, single-threaded planner state, persisted across ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannerState {
    pub lane: Lane,
    pub ref_vel: f64,
    pub lead_vehicle_id: Option<i64>,
}

impl Default for PlannerState {
    fn default() -> Self {
        Self {
            lane: Lane::center(),
            ref_vel: 0.0,
            lead_vehicle_id: None,
        }
    }
}
