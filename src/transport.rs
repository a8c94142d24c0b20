//! The WebSocket endpoint: one simulator connection drives the planner one
//! synchronous tick per inbound telemetry frame.

use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::{info, warn};

use crate::map::Map;
use crate::orchestrator;
use crate::planner_state::PlannerState;
use crate::protocol::{decode_frame, FrameError, InboundEvent, OutboundFrame};

#[derive(Clone)]
pub struct AppState {
    pub map: Arc<Map>,
    pub planner_state: Arc<Mutex<PlannerState>>,
}

impl AppState {
    pub fn new(map: Map) -> Self {
        Self { map: Arc::new(map), planner_state: Arc::new(Mutex::new(PlannerState::default())) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(ws_upgrade)).with_state(state)
}

pub async fn serve(port: u16, state: AppState) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Waits for Ctrl+C so the simulator's socket closes cleanly on shutdown
/// instead of the process being killed mid-frame.
async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("failed to install ctrl-c handler");
    }
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    info!("simulator connected");

    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                warn!(%err, "websocket error, closing connection");
                break;
            }
        };

        let Message::Text(frame) = message else {
            // non-text frames (ping/pong/binary/close) carry no telemetry
            continue;
        };

        let outbound = handle_frame(&state, &frame);
        if let Some(outbound) = outbound {
            if socket.send(Message::Text(outbound.encode())).await.is_err() {
                break;
            }
        }
    }

    info!("simulator disconnected");
}

/// Decode one frame and drive a planning tick if it was telemetry. Returns
/// `None` for a malformed frame (§7: silently ignored, no response), and
/// `Some(Manual)` when the payload had no recognizable JSON delimiters.
fn handle_frame(state: &AppState, frame: &str) -> Option<OutboundFrame> {
    match decode_frame(frame) {
        Ok(InboundEvent::Telemetry(telemetry)) => {
            let ego = telemetry.ego_state();
            let previous_path = telemetry.previous_path();
            let sensor_fusion = telemetry.sensor_fusion();

            let mut planner_state = state.planner_state.lock().unwrap();
            let path = orchestrator::tick(&mut planner_state, &state.map, &ego, &previous_path, &sensor_fusion);

            Some(OutboundFrame::Control { next_x: path.x, next_y: path.y })
        }
        Err(FrameError::NotAMessageFrame) => None,
        Err(FrameError::UnknownEvent(event)) => {
            warn!(event, "ignoring unknown event");
            None
        }
        Err(FrameError::NoPayloadDelimiters) => Some(OutboundFrame::Manual),
        Err(FrameError::InvalidJson(err)) => {
            warn!(err, "malformed telemetry payload, ignoring frame");
            None
        }
    }
}
