use std::sync::{Mutex, PoisonError};

use futures_util::future::{AbortHandle, AbortRegistration};

/// Abort handle for the one request a lane may have in flight. Starting a
/// new request aborts the previous one.
#[derive(Default)]
pub struct InFlight {
    current: Mutex<Option<(u64, AbortHandle)>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `request_id`. An older id arriving after a newer one has
    /// registered comes back already aborted.
    pub fn begin(&self, request_id: u64) -> AbortRegistration {
        let (handle, registration) = AbortHandle::new_pair();
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some((held_id, _)) if *held_id > request_id => {
                log::debug!("Request {} already superseded by {}", request_id, held_id);
                handle.abort();
            }
            _ => {
                if let Some((prev_id, prev)) = current.replace((request_id, handle)) {
                    log::debug!("Aborting request {} in favour of {}", prev_id, request_id);
                    prev.abort();
                }
            }
        }
        registration
    }

    /// Forget the handle if it still belongs to `request_id`.
    pub fn finish(&self, request_id: u64) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(current.as_ref(), Some((id, _)) if *id == request_id) {
            current.take();
        }
    }

    pub fn abort(&self) {
        if let Some((_, handle)) = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.abort();
    }
}
