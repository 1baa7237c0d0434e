use crate::error::FastqError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared abort flag, polled between batches by every streaming driver.
///
/// Hand a clone to whatever catches the interrupt and call [`cancel`]
/// there; the running pass stops at its next batch boundary with
/// [`FastqError::Cancelled`].
///
/// [`cancel`]: CancellationToken::cancel
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn check(&self) -> Result<(), FastqError> {
        if self.is_cancelled() {
            Err(FastqError::Cancelled)
        } else {
            Ok(())
        }
    }
}
