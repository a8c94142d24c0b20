//! The ordered, cyclic sequence of waypoints the Frenet frame is built on,
//! and the startup loader that reads it from a CSV-ish text file.

use std::io::BufRead;
use std::path::Path;

use crate::geometry::{self, Waypoint};

/// The `s` value at which the track wraps back to zero.
pub const MAX_S: f64 = 6945.554;

#[derive(thiserror::Error, Debug)]
pub enum MapLoadError {
    #[error("could not open map file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("map file {path} line {line_no} is malformed: {text:?}")]
    MalformedLine {
        path: String,
        line_no: usize,
        text: String,
    },
    #[error("map file {path} has no waypoints")]
    Empty { path: String },
}

/// Ordered, cyclic sequence of waypoints. Immutable after load and shared
/// for the process lifetime.
#[derive(Clone, Debug)]
pub struct Map {
    waypoints: Vec<Waypoint>,
    pub max_s: f64,
}

impl Map {
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self { waypoints, max_s: MAX_S }
    }

    /// Read a whitespace-delimited text file, one waypoint per line:
    /// `x y s dx dy`. Ordering and `s` monotonicity are trusted, not
    /// validated, per spec.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapLoadError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.display().to_string();
        let file = std::fs::File::open(path_ref).map_err(|source| MapLoadError::Io {
            path: path_str.clone(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);

        let mut waypoints = Vec::new();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| MapLoadError::Io {
                path: path_str.clone(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 5 {
                return Err(MapLoadError::MalformedLine {
                    path: path_str.clone(),
                    line_no: line_no + 1,
                    text: line.to_string(),
                });
            }
            let parse = |s: &str| -> Option<f64> { s.parse().ok() };
            let (x, y, s, dx, dy) = match (
                parse(fields[0]),
                parse(fields[1]),
                parse(fields[2]),
                parse(fields[3]),
                parse(fields[4]),
            ) {
                (Some(x), Some(y), Some(s), Some(dx), Some(dy)) => (x, y, s, dx, dy),
                _ => {
                    return Err(MapLoadError::MalformedLine {
                        path: path_str.clone(),
                        line_no: line_no + 1,
                        text: line.to_string(),
                    })
                }
            };
            waypoints.push(Waypoint { x, y, s, dx, dy });
        }

        if waypoints.is_empty() {
            return Err(MapLoadError::Empty { path: path_str });
        }

        Ok(Self::new(waypoints))
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn cartesian_to_frenet(&self, x: f64, y: f64, yaw: f64) -> (f64, f64) {
        geometry::cartesian_to_frenet(x, y, yaw, &self.waypoints)
    }

    pub fn frenet_to_cartesian(&self, s: f64, d: f64) -> (f64, f64) {
        geometry::frenet_to_cartesian(s, d, &self.waypoints)
    }

    /// Wrap `s` into `[0, max_s)`. Frenet `s` accumulates monotonically
    /// within one loop of the track (spec §3) but callers computing a
    /// forward-projected `s` (e.g. anchors 40-120m ahead) must normalize
    /// before converting back to Cartesian once that projection crosses the
    /// track's wrap point (spec §4.1, §8 S6).
    pub fn normalize_s(&self, s: f64) -> f64 {
        let wrapped = s % self.max_s;
        if wrapped < 0.0 {
            wrapped + self.max_s
        } else {
            wrapped
        }
    }
}
