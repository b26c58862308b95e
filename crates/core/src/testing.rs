//! In-memory transport and diagnostics doubles
//!
//! Available to this crate's tests and, through the `test-utils` feature,
//! to downstream crates.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::dispatch::ports::{
    DiagnosticsSink, OutboundRequest, Transport, TransportError, TransportResponse,
};

type Scripted = Result<TransportResponse, TransportError>;

/// Transport that replays scripted outcomes and records what it was sent.
///
/// Outcomes are consumed in order; the last one repeats once the script
/// runs out.
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Scripted>,
    requests: Mutex<Vec<OutboundRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn sequence(outcomes: Vec<Scripted>) -> Arc<Self> {
        let last = outcomes.last().cloned().unwrap_or_else(|| Ok(TransportResponse::ok("")));
        Arc::new(Self {
            script: Mutex::new(outcomes.into()),
            last: Mutex::new(last),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn always(outcome: Scripted) -> Arc<Self> {
        Self::sequence(vec![outcome])
    }

    /// Always answers 200 with an empty body.
    pub fn empty() -> Arc<Self> {
        Self::always(Ok(TransportResponse::ok("")))
    }

    /// Always fails at the transport level.
    pub fn failing(message: &str) -> Arc<Self> {
        Self::always(Err(TransportError::new(message)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self.script.lock().ok().and_then(|mut script| script.pop_front());
        match next {
            Some(outcome) => {
                if let Ok(mut last) = self.last.lock() {
                    *last = outcome.clone();
                }
                outcome
            }
            None => self
                .last
                .lock()
                .map(|last| last.clone())
                .unwrap_or_else(|_| Err(TransportError::new("script poisoned"))),
        }
    }
}

/// Diagnostics sink that keeps lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    path: Option<PathBuf>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sink that reports every record as written to `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self { lines: Mutex::new(Vec::new()), path: Some(path.into()) })
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, line: &str) -> Option<PathBuf> {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
        self.path.clone()
    }
}
