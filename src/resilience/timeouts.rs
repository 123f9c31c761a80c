//! Run-level deadlines.
//!
//! # Responsibilities
//! - Bound every await of a long-running operation by one instant
//! - Observe an optional cancellation signal (server shutdown)
//! - Report which of the two interrupted the operation
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout and cancellation are distinct from the operation's own errors
//! - Once cancelled, a deadline stays cancelled

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{timeout_at, Instant};

/// Why a deadline-bounded operation did not finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    Elapsed,
    Cancelled,
}

/// A point in time plus an optional cancellation signal.
#[derive(Debug)]
pub struct Deadline {
    at: Instant,
    cancel: Option<broadcast::Receiver<()>>,
    cancelled: bool,
}

impl Deadline {
    pub fn at(at: Instant) -> Self {
        Self {
            at,
            cancel: None,
            cancelled: false,
        }
    }

    pub fn after(duration: Duration) -> Self {
        Self::at(Instant::now() + duration)
    }

    /// Also stop when `signal` fires. A closed channel never cancels.
    pub fn with_cancel(mut self, signal: broadcast::Receiver<()>) -> Self {
        self.cancel = Some(signal);
        self
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Drive `fut` until it completes, the deadline passes, or the
    /// cancellation signal fires. An expired deadline does not poll `fut`.
    pub async fn run<F: Future>(&mut self, fut: F) -> Result<F::Output, Interrupted> {
        if self.cancelled {
            return Err(Interrupted::Cancelled);
        }
        if self.is_expired() {
            return Err(Interrupted::Elapsed);
        }

        let at = self.at;
        let outcome = {
            let signal = cancelled(self.cancel.as_mut());
            tokio::select! {
                biased;
                _ = signal => None,
                result = timeout_at(at, fut) => Some(result),
            }
        };

        match outcome {
            None => {
                self.cancelled = true;
                Err(Interrupted::Cancelled)
            }
            Some(Ok(value)) => Ok(value),
            Some(Err(_)) => Err(Interrupted::Elapsed),
        }
    }

    /// Sleep for `duration`, interrupted by expiry or cancellation.
    pub async fn sleep(&mut self, duration: Duration) -> Result<(), Interrupted> {
        if duration.is_zero() {
            return if self.cancelled {
                Err(Interrupted::Cancelled)
            } else if self.is_expired() {
                Err(Interrupted::Elapsed)
            } else {
                Ok(())
            };
        }
        self.run(tokio::time::sleep(duration)).await
    }
}

async fn cancelled(signal: Option<&mut broadcast::Receiver<()>>) {
    match signal {
        Some(rx) => match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_before_deadline() {
        let mut deadline = Deadline::after(Duration::from_secs(5));
        assert_eq!(deadline.run(async { 7 }).await, Ok(7));
        assert!(!deadline.is_expired());
    }

    #[tokio::test]
    async fn test_elapsed() {
        let mut deadline = Deadline::after(Duration::from_millis(20));
        let result = deadline.run(std::future::pending::<()>()).await;
        assert_eq!(result, Err(Interrupted::Elapsed));
        assert!(deadline.is_expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_cancel_is_sticky() {
        let (tx, rx) = broadcast::channel(1);
        let mut deadline = Deadline::after(Duration::from_secs(30)).with_cancel(rx);
        tx.send(()).unwrap();

        let first = deadline.run(std::future::pending::<()>()).await;
        assert_eq!(first, Err(Interrupted::Cancelled));

        let second = deadline.run(async { 1 }).await;
        assert_eq!(second, Err(Interrupted::Cancelled));
    }

    #[tokio::test]
    async fn test_closed_channel_does_not_cancel() {
        let (tx, rx) = broadcast::channel::<()>(1);
        drop(tx);
        let mut deadline = Deadline::after(Duration::from_secs(5)).with_cancel(rx);
        assert_eq!(deadline.run(async { "done" }).await, Ok("done"));
    }

    #[tokio::test]
    async fn test_zero_sleep() {
        let mut deadline = Deadline::after(Duration::from_secs(5));
        assert_eq!(deadline.sleep(Duration::ZERO).await, Ok(()));

        let mut expired = Deadline::at(Instant::now());
        assert_eq!(expired.sleep(Duration::ZERO).await, Err(Interrupted::Elapsed));
    }
}
