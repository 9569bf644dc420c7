//! Page render scheduling
//!
//! Rasterization is the host's job. This module hands out per-page render
//! tickets, cancels a page's older ticket when a newer one is requested and
//! turns completion of a cancelled ticket into a benign outcome.

use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Rendering engine release the default worker URL is pinned to
pub const DEFAULT_ENGINE_VERSION: &str = "3.11.174";

/// Explicit rendering-engine configuration, threaded in at construction.
///
/// Worker resolution order: `worker_src` when set, else the CDN build
/// matching `engine_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub worker_src: Option<String>,
    pub engine_version: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            worker_src: None,
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
        }
    }
}

impl RenderConfig {
    pub fn with_worker(worker_src: impl Into<String>) -> Self {
        Self {
            worker_src: Some(worker_src.into()),
            ..Self::default()
        }
    }

    pub fn resolved_worker_src(&self) -> String {
        match self.worker_src.as_deref().map(str::trim) {
            Some(src) if !src.is_empty() => src.to_string(),
            _ => format!(
                "https://cdn.jsdelivr.net/npm/pdfjs-dist@{}/build/pdf.worker.min.js",
                self.engine_version
            ),
        }
    }
}

/// Cooperative cancellation flag shared between the scheduler and a render
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct RenderTicket {
    pub id: u64,
    pub page: usize,
    pub scale: f64,
    pub token: CancelToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderOutcome {
    Rendered,
    /// Superseded by a newer request for the same page
    Cancelled,
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    config: RenderConfig,
    next_id: u64,
    in_flight: BTreeMap<usize, RenderTicket>,
    cancelled: BTreeSet<u64>,
}

impl RenderScheduler {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn worker_src(&self) -> String {
        self.config.resolved_worker_src()
    }

    /// Issue a ticket for `page`, cancelling any render still in flight for it
    pub fn request(&mut self, page: usize, scale: f64) -> RenderTicket {
        self.next_id += 1;
        let ticket = RenderTicket {
            id: self.next_id,
            page,
            scale,
            token: CancelToken::new(),
        };
        if let Some(previous) = self.in_flight.insert(page, ticket.clone()) {
            debug!(page, ticket = previous.id, "cancelling superseded render");
            previous.token.cancel();
            self.cancelled.insert(previous.id);
        }
        ticket
    }

    /// Report the end of a render. Cancelled tickets resolve to
    /// `RenderOutcome::Cancelled` whatever the renderer reported.
    pub fn complete(
        &mut self,
        ticket_id: u64,
        result: Result<(), String>,
    ) -> Result<RenderOutcome, RenderError> {
        if self.cancelled.remove(&ticket_id) {
            return Ok(RenderOutcome::Cancelled);
        }
        let page = self
            .in_flight
            .iter()
            .find(|(_, t)| t.id == ticket_id)
            .map(|(page, _)| *page)
            .ok_or(RenderError::UnknownTicket(ticket_id))?;
        self.in_flight.remove(&page);
        match result {
            Ok(()) => Ok(RenderOutcome::Rendered),
            Err(message) => Err(RenderError::Failed { page, message }),
        }
    }

    /// Cancel everything, e.g. when a new document replaces the old one
    pub fn cancel_all(&mut self) {
        for (_, ticket) in std::mem::take(&mut self.in_flight) {
            ticket.token.cancel();
            self.cancelled.insert(ticket.id);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_explicit_worker_wins() {
        let config = RenderConfig::with_worker("/static/pdf.worker.js");
        assert_eq!(config.resolved_worker_src(), "/static/pdf.worker.js");
    }

    #[test]
    fn test_default_worker_matches_version() {
        let config = RenderConfig {
            worker_src: Some("  ".into()),
            engine_version: "4.0.1".into(),
        };
        assert_eq!(
            config.resolved_worker_src(),
            "https://cdn.jsdelivr.net/npm/pdfjs-dist@4.0.1/build/pdf.worker.min.js"
        );
    }

    #[test]
    fn test_newer_request_cancels_older() {
        let mut scheduler = RenderScheduler::default();
        let first = scheduler.request(0, 1.0);
        let other_page = scheduler.request(1, 1.0);
        let second = scheduler.request(0, 1.5);

        assert!(first.token.is_cancelled());
        assert!(!second.token.is_cancelled());
        assert!(!other_page.token.is_cancelled());
        assert_eq!(scheduler.in_flight(), 2);

        assert_eq!(
            scheduler.complete(first.id, Err("aborted".into())),
            Ok(RenderOutcome::Cancelled)
        );
        assert_eq!(
            scheduler.complete(second.id, Ok(())),
            Ok(RenderOutcome::Rendered)
        );
    }

    #[test]
    fn test_failure_is_reported_with_page() {
        let mut scheduler = RenderScheduler::default();
        let ticket = scheduler.request(3, 1.0);
        assert_eq!(
            scheduler.complete(ticket.id, Err("boom".into())),
            Err(RenderError::Failed {
                page: 3,
                message: "boom".into()
            })
        );
    }

    #[test]
    fn test_unknown_ticket() {
        let mut scheduler = RenderScheduler::default();
        assert_eq!(
            scheduler.complete(42, Ok(())),
            Err(RenderError::UnknownTicket(42))
        );
        let ticket = scheduler.request(0, 1.0);
        scheduler.complete(ticket.id, Ok(())).unwrap();
        assert_eq!(
            scheduler.complete(ticket.id, Ok(())),
            Err(RenderError::UnknownTicket(ticket.id))
        );
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = RenderScheduler::default();
        let a = scheduler.request(0, 1.0);
        let b = scheduler.request(1, 1.0);
        scheduler.cancel_all();
        assert!(a.token.is_cancelled() && b.token.is_cancelled());
        assert_eq!(scheduler.in_flight(), 0);
        assert_eq!(scheduler.complete(b.id, Ok(())), Ok(RenderOutcome::Cancelled));
    }
}
