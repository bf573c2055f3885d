//! Server-sent events for one execution's event stream.
//!
//! The bus is shared across every execution running in the process; per
//! the bus's own contract this handler filters to the one `execution_id`
//! in the URL and drops everything else.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use nebula_core::ExecutionId;
use tokio_stream::StreamExt;

use crate::error::ApiError;
use crate::executions;
use crate::state::AppState;
use crate::user::AuthenticatedUser;

pub async fn execution_events(
    State(state): State<Arc<AppState>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(execution_id): Path<ExecutionId>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let owns = match state.executions.get(execution_id) {
        Some(record) => record.owner_id == user_id,
        None => state
            .running
            .read()
            .await
            .get(&execution_id)
            .is_some_and(|running| running.owner_id == user_id),
    };
    if !owns {
        return Err(executions::not_found(execution_id));
    }

    let receiver = state.telemetry.event_bus().subscribe();
    let stream = receiver.filter_map(move |event| {
        if event.execution_id != execution_id {
            return None;
        }
        let payload = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
        Some(Ok(Event::default().event(event_name(&event)).data(payload)))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15))))
}

fn event_name(event: &nebula_telemetry::event::ExecutionEvent) -> &'static str {
    use nebula_telemetry::event::ExecutionEventType::*;
    match event.event_type {
        ExecutionStarted => "execution_started",
        NodeRunning => "node_running",
        NodeSuccess => "node_success",
        NodeError => "node_error",
        NodeSkipped => "node_skipped",
        ExecutionCompleted => "execution_completed",
        ExecutionFailed => "execution_failed",
        ExecutionCanceled => "execution_canceled",
        Waiting => "waiting",
        Resumed => "resumed",
        Log => "log",
    }
}
