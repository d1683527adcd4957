//! In-process delivery of domain events to registered handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::{DomainEvent, EventKind};

/// Error returned by a single handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The handler was registered for a kind it cannot process.
    #[error("handler does not accept {0} events")]
    UnexpectedEvent(EventKind),

    #[error("{0}")]
    Failed(String),
}

/// A reaction to domain events of one kind.
///
/// Handlers run synchronously on the thread that calls
/// [`EventNotifier::notify`].
pub trait EventHandler: Send + Sync {
    /// Name used in logs and in [`HandlerFailure`].
    fn name(&self) -> &'static str;

    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError>;
}

impl<F> EventHandler for F
where
    F: Fn(&DomainEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        "closure"
    }

    fn handle(&self, event: &DomainEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// One handler that failed during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Position of the handler in the registration order.
    pub index: usize,
    pub handler: &'static str,
    pub error: HandlerError,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.index, self.handler, self.error)
    }
}

/// Every handler ran, and at least one of them failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} of {attempted} handler(s) failed for {kind}", .failures.len())]
pub struct DispatchError {
    pub kind: EventKind,
    pub attempted: usize,
    pub failures: Vec<HandlerFailure>,
}

/// Maps event kinds to ordered lists of handlers.
///
/// Registration needs `&mut self` and delivery `&self`, so the set of
/// handlers cannot change while an event is being delivered. Build the
/// notifier at startup and share it behind an `Arc`.
#[derive(Default, Clone)]
pub struct EventNotifier {
    handlers: HashMap<EventKind, Vec<Arc<dyn EventHandler>>>,
}

impl EventNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler for `kind`.
    ///
    /// Registering the same handler twice makes it run twice per event.
    pub fn register(&mut self, kind: EventKind, handler: Arc<dyn EventHandler>) {
        tracing::debug!(%kind, handler = handler.name(), "handler registered");
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Removes the first registration of `handler` (compared by pointer)
    /// for `kind`. Returns false if it was not registered.
    pub fn unregister(&mut self, kind: EventKind, handler: &Arc<dyn EventHandler>) -> bool {
        let Some(list) = self.handlers.get_mut(&kind) else {
            return false;
        };
        let Some(pos) = list.iter().position(|h| Arc::ptr_eq(h, handler)) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.handlers.remove(&kind);
        }
        true
    }

    pub fn unregister_all(&mut self) {
        self.handlers.clear();
    }

    /// Returns the handlers registered for `kind`, in registration order.
    pub fn handlers(&self, kind: EventKind) -> &[Arc<dyn EventHandler>] {
        self.handlers.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers(kind).len()
    }

    /// Delivers `event` to every handler registered for its kind, in
    /// registration order.
    ///
    /// A failing handler does not stop the others. If any failed, the
    /// failures are returned together once every handler has run. With no
    /// handlers this is a no-op.
    #[tracing::instrument(skip(self, event), fields(kind = %event.kind()))]
    pub fn notify(&self, event: &DomainEvent) -> Result<(), DispatchError> {
        let kind = event.kind();
        let handlers = self.handlers(kind);
        if handlers.is_empty() {
            tracing::trace!("no handlers registered");
            return Ok(());
        }

        let mut failures = Vec::new();
        for (index, handler) in handlers.iter().enumerate() {
            if let Err(error) = handler.handle(event) {
                tracing::warn!(handler = handler.name(), %error, "event handler failed");
                metrics::counter!("domain_event_handler_failures_total", "event" => kind.as_str())
                    .increment(1);
                failures.push(HandlerFailure {
                    index,
                    handler: handler.name(),
                    error,
                });
            }
        }
        metrics::counter!("domain_events_dispatched_total", "event" => kind.as_str()).increment(1);

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError {
                kind,
                attempted: handlers.len(),
                failures,
            })
        }
    }

    /// Delivers each event in turn, stopping at the first dispatch that
    /// reported failures.
    pub fn notify_all<'a>(
        &self,
        events: impl IntoIterator<Item = &'a DomainEvent>,
    ) -> Result<(), DispatchError> {
        for event in events {
            self.notify(event)?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (kind, handlers) in &self.handlers {
            let names: Vec<_> = handlers.iter().map(|h| h.name()).collect();
            map.entry(kind, &names);
        }
        map.finish()
    }
}
