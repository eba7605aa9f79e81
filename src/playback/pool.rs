/// Audio resource pool
///
/// Fixed set of reusable handles selected round-robin. Some platforms
/// throttle creating new audio outputs, so handles are rebound instead of
/// recreated; round-robin bounds how long a slot can be reused in a burst.
use super::{AudioBackend, AudioHandle, PlaybackToken};
use crate::error::PlaybackError;

pub const DEFAULT_POOL_SIZE: usize = 3;

pub struct AudioPool<H> {
    slots: Vec<H>,
    cursor: usize,
    generation: u64,
}

impl<H: AudioHandle> AudioPool<H> {
    /// Build a pool from ready handles
    pub fn new(slots: Vec<H>) -> Self {
        Self {
            slots,
            cursor: 0,
            generation: 0,
        }
    }

    /// Create `size` handles from a backend (at least one)
    pub fn from_backend<B>(backend: &mut B, size: usize) -> Result<Self, PlaybackError>
    where
        B: AudioBackend<Handle = H>,
    {
        let slots = (0..size.max(1))
            .map(|_| backend.create_handle())
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Audio pool ready with {} handles", slots.len());
        Ok(Self::new(slots))
    }

    /// Take the next slot, paused and ready for a new source
    pub fn next(&mut self) -> Option<(PlaybackToken, &mut H)> {
        if self.slots.is_empty() {
            return None;
        }

        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.slots.len();
        self.generation += 1;

        let token = PlaybackToken {
            slot,
            generation: self.generation,
        };
        let handle = &mut self.slots[slot];
        handle.pause();
        Some((token, handle))
    }

    /// Slot the next call to `next` will return
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn release_all(&mut self) {
        for handle in &mut self.slots {
            handle.release();
        }
    }
}
