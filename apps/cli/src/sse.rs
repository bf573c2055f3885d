//! Consumes the gateway's per-execution SSE stream and prints each event
//! as it arrives.

use anyhow::{Context, Result};
use eventsource_stream::Eventsource;
use futures::StreamExt;
use nebula_telemetry::event::ExecutionEvent;

use crate::client::GatewayClient;

/// Streams `/v1/executions/:id/events` until the connection closes
/// (the gateway closes it once a terminal event for this execution has
/// been observed downstream, or the process is interrupted).
pub async fn watch_execution(client: &GatewayClient, execution_id: nebula_core::ExecutionId) -> Result<()> {
    let response = client.events_request(execution_id).send().await.context("failed to open event stream")?;
    if !response.status().is_success() {
        anyhow::bail!("gateway returned {} opening the event stream", response.status());
    }

    let mut events = response.bytes_stream().eventsource();
    while let Some(frame) = events.next().await {
        let frame = frame.context("malformed SSE frame")?;
        if frame.data.is_empty() {
            continue;
        }
        match serde_json::from_str::<ExecutionEvent>(&frame.data) {
            Ok(event) => print_event(&event),
            Err(err) => tracing::warn!(%err, raw = %frame.data, "dropping unparseable event"),
        }
    }
    Ok(())
}

fn print_event(event: &ExecutionEvent) {
    let node = event.node_id.map(|id| id.to_string()).unwrap_or_default();
    let status = event.status.as_deref().unwrap_or("");
    println!("#{:<5} {:<20} {node:<38} {status}", event.sequence, format!("{:?}", event.event_type));
    if let Some(data) = &event.data {
        println!("        {data}");
    }
}
