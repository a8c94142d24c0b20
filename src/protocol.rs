//! The Socket.IO-style framed text protocol described in spec §6: frame
//! parsing/encoding and the telemetry payload shape.

use serde::{Deserialize, Serialize};

use crate::vehicle::{EgoState, OtherVehicle, PreviousPath};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame too short or missing the '42' websocket-message marker")]
    NotAMessageFrame,
    #[error("no recognizable JSON payload delimiters in frame")]
    NoPayloadDelimiters,
    #[error("payload was not valid JSON: {0}")]
    InvalidJson(String),
    #[error("unknown event name {0:?}")]
    UnknownEvent(String),
}

/// What to do with a decoded inbound frame. `"telemetry"` is the only event
/// the simulator sends per spec §6; any other name is an error (§7: ignored
/// by the caller).
#[derive(Debug, PartialEq)]
pub enum InboundEvent {
    Telemetry(TelemetryPayload),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TelemetryPayload {
    pub x: f64,
    pub y: f64,
    pub s: f64,
    pub d: f64,
    pub yaw: f64,
    pub speed: f64,
    pub previous_path_x: Vec<f64>,
    pub previous_path_y: Vec<f64>,
    pub end_path_s: f64,
    pub end_path_d: f64,
    pub sensor_fusion: Vec<(i64, f64, f64, f64, f64, f64, f64)>,
}

impl TelemetryPayload {
    pub fn ego_state(&self) -> EgoState {
        EgoState { x: self.x, y: self.y, yaw: self.yaw, speed: self.speed, s: self.s, d: self.d }
    }

    pub fn previous_path(&self) -> PreviousPath {
        PreviousPath {
            x: self.previous_path_x.clone(),
            y: self.previous_path_y.clone(),
            end_s: self.end_path_s,
            end_d: self.end_path_d,
        }
    }

    pub fn sensor_fusion(&self) -> Vec<OtherVehicle> {
        self.sensor_fusion
            .iter()
            .map(|&(id, x, y, vx, vy, s, d)| OtherVehicle { id, x, y, vx, vy, s, d })
            .collect()
    }
}

/// Outbound response. `Control` carries a full 50-point path; `Manual`
/// surrenders control to the human driver when nothing decodable was
/// received.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundFrame {
    Control { next_x: Vec<f64>, next_y: Vec<f64> },
    Manual,
}

#[derive(Serialize)]
struct ControlPayload<'a> {
    next_x: &'a [f64],
    next_y: &'a [f64],
}

impl OutboundFrame {
    /// Render as the literal `42["control", {...}]` / `42["manual",{}]` wire
    /// format.
    pub fn encode(&self) -> String {
        match self {
            OutboundFrame::Control { next_x, next_y } => {
                let payload = ControlPayload { next_x, next_y };
                // unwrap: the payload is two Vec<f64>, always serializable
                format!("42[\"control\",{}]", serde_json::to_string(&payload).unwrap())
            }
            OutboundFrame::Manual => "42[\"manual\",{}]".to_string(),
        }
    }
}

/// Extract the JSON payload from a raw inbound frame, per spec §6: frames
/// beginning with ASCII `4`,`2` carry a payload starting at the first `[`
/// and ending at the first `}` inclusive plus one trailing character.
fn extract_payload(frame: &str) -> Result<&str, FrameError> {
    let bytes = frame.as_bytes();
    if bytes.len() <= 2 || bytes[0] != b'4' || bytes[1] != b'2' {
        return Err(FrameError::NotAMessageFrame);
    }

    let open = frame.find('[').ok_or(FrameError::NoPayloadDelimiters)?;
    let close = frame.find('}').ok_or(FrameError::NoPayloadDelimiters)?;
    if close < open {
        return Err(FrameError::NoPayloadDelimiters);
    }
    // end is first '}' inclusive, plus one trailing character
    let end = (close + 2).min(frame.len());
    Ok(&frame[open..end])
}

/// Decode one inbound frame into an event, or an error describing what went
/// wrong (§7 error taxonomy: malformed frames are ignored by the caller;
/// frames with no JSON delimiters should trigger a "manual" response).
pub fn decode_frame(frame: &str) -> Result<InboundEvent, FrameError> {
    let payload = extract_payload(frame)?;

    let parsed: serde_json::Value =
        serde_json::from_str(payload).map_err(|e| FrameError::InvalidJson(e.to_string()))?;

    let array = parsed.as_array().ok_or_else(|| FrameError::InvalidJson("not an array".into()))?;
    if array.len() != 2 {
        return Err(FrameError::InvalidJson("expected a 2-element [event, payload] array".into()));
    }

    let event = array[0].as_str().ok_or_else(|| FrameError::InvalidJson("event name not a string".into()))?;

    match event {
        "telemetry" => {
            let telemetry: TelemetryPayload = serde_json::from_value(array[1].clone())
                .map_err(|e| FrameError::InvalidJson(e.to_string()))?;
            Ok(InboundEvent::Telemetry(telemetry))
        }
        other => Err(FrameError::UnknownEvent(other.to_string())),
    }
}
