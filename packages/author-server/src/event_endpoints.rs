//! Domain event stream
//!
//! `GET /api/events` streams every committed change as a server-sent event.
//! The SSE event name is the domain event type (`node:created`, `view:deleted`,
//! ...) and the data is the JSON-encoded event.
//!
//! ```javascript
//! const source = new EventSource("http://localhost:3001/api/events");
//! source.addEventListener("node:moved", (e) => console.log(JSON.parse(e.data)));
//! ```

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
    routing::get,
    Router,
};
use futures::stream::Stream;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use viewtree_core::DomainEvent;

use crate::AppState;

fn to_sse(event: &DomainEvent) -> Option<Event> {
    match serde_json::to_string(event) {
        Ok(json) => Some(Event::default().event(event.event_type()).data(json)),
        Err(e) => {
            tracing::error!("Failed to serialize domain event: {}", e);
            None
        }
    }
}

async fn sse_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Event stream client connected");
    let rx = state.site.pipeline().subscribe_to_events();

    // Lagging clients skip what they missed and keep streaming
    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => to_sse(&event).map(Ok::<Event, Infallible>),
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!("Event stream client lagged by {} events", n);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("keepalive"),
    )
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(sse_handler))
        .with_state(state)
}
