use std::sync::{Arc, Mutex, PoisonError};

/// Single-slot hand-off between a capture layer and the decode pipeline.
///
/// The capture side publishes immutable snapshots; readers always receive
/// their own copy, never a view into a buffer that is still being written.
/// Publishing replaces the previous snapshot.
///
/// # Examples
/// ```
/// use framelens_core::CaptureSlot;
///
/// let slot = CaptureSlot::default();
/// assert!(slot.snapshot().is_none());
/// slot.publish(&[0x01, 0x02]);
/// assert_eq!(slot.snapshot().as_deref(), Some(&[0x01, 0x02][..]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaptureSlot {
    latest: Arc<Mutex<Option<Arc<[u8]>>>>,
}

impl CaptureSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, bytes: &[u8]) {
        let snapshot: Arc<[u8]> = Arc::from(bytes);
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }

    /// Owned copy of the latest snapshot, if any was published.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        let latest = self
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        latest.map(|bytes| bytes.to_vec())
    }

    pub fn clear(&self) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
