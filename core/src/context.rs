//! Cancellation and deadline propagation for repository calls.
//!
//! Every [`crate::repository::TaskRepository`] operation receives a
//! [`Context`]. Implementations wrap their database future in
//! [`Context::run`], which drops the in-flight call as soon as the caller
//! cancels or the deadline passes.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{Result, TaskError};

/// Caller-supplied cancellation signal with an optional deadline.
///
/// Contexts derived with [`Context::with_timeout`] or
/// [`Context::with_deadline`] hold a child token: cancelling the parent
/// cancels them too, cancelling a child leaves the parent alone. A derived
/// deadline never extends the parent's.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use scheduler_core::context::Context;
///
/// let root = Context::background();
/// let ctx = root.with_timeout(Duration::from_secs(5));
/// assert!(ctx.deadline().is_some());
///
/// root.cancel();
/// assert!(ctx.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// Context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self::default()
    }

    /// Context driven by an externally owned token
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Derive a context that expires `timeout` from now
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this context and every context derived from it
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The token backing this context
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Fail fast if the context is already done
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Err(TaskError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Drive `operation` until it completes or the context is done.
    ///
    /// On cancellation the operation future is dropped, which abandons the
    /// database call it was awaiting.
    pub async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(TaskError::Cancelled),
            _ = expired => Err(TaskError::DeadlineExceeded),
            result = operation => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_completes_without_signal() {
        let ctx = Context::background();
        let value = ctx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_passes_operation_error_through() {
        let ctx = Context::background();
        let err = ctx
            .run(async { Err::<(), _>(TaskError::not_found_id(3)) })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let ctx = Context::background();
        ctx.cancel();
        let err = ctx.run(async { Ok(()) }).await.unwrap_err();
        assert_eq!(err, TaskError::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_abandons_pending_operation() {
        let ctx = Context::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = ctx
            .run(async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, TaskError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, TaskError::DeadlineExceeded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_fails_check() {
        let ctx = Context::background().with_timeout(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;
        assert_eq!(ctx.check().unwrap_err(), TaskError::DeadlineExceeded);
    }

    #[test]
    fn test_child_deadline_never_extends_parent() {
        let parent = Context::background().with_timeout(Duration::from_secs(1));
        let child = parent.with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        let tighter = parent.with_timeout(Duration::from_millis(1));
        assert!(tighter.deadline() < parent.deadline());
    }

    #[test]
    fn test_child_cancel_does_not_reach_parent() {
        let parent = Context::background();
        let child = parent.with_timeout(Duration::from_secs(1));
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let external = CancellationToken::new();
        let ctx = Context::with_cancellation(external.clone());
        external.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.token().is_cancelled());
    }
}
