//! Per-call cancellation and deadline

use std::future::Future;
use std::time::Duration;

use sigil_domain::{Result, SigilError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token plus optional deadline, threaded through every attempt
/// of one call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose calls abort once `timeout` has elapsed from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { cancel: CancellationToken::new(), deadline: Some(Instant::now() + timeout) }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the call was cancelled or its deadline has passed.
    ///
    /// # Errors
    /// `SigilError::Cancelled` or `SigilError::DeadlineExceeded`.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(SigilError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(SigilError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `future` to completion unless the call is cancelled or times
    /// out first.
    ///
    /// # Errors
    /// `SigilError::Cancelled` or `SigilError::DeadlineExceeded`.
    pub async fn run<F: Future>(&self, future: F) -> Result<F::Output> {
        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(SigilError::Cancelled),
            () = deadline => Err(SigilError::DeadlineExceeded),
            output = future => Ok(output),
        }
    }
}
