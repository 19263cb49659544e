use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::WorkbenchError;

/// Re-entrancy guard for workbench operations.
///
/// A second operation started while one is in flight is rejected with
/// `Busy` instead of racing the first. The flag is released on drop, so
/// the guard also clears on error paths.
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    pub fn acquire(flag: &'a AtomicBool) -> Result<Self, WorkbenchError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(WorkbenchError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
