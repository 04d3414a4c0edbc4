//! Reference-counted byte blocks used for response and streamed post data.
//!
//! A [`ServerBlock`] moves through three states:
//!
//! 1. **Open** -- writable, not readable.
//! 2. **Closed** -- frozen; readable any number of times, no more writes.
//! 3. **Discarded** -- contents dropped; neither readable nor writable.
//!
//! Blocks are shared as [`SharedBlock`] (`Arc<ServerBlock>`): the service writes
//! during the call and the transport reads after the call returns. The block is
//! freed when the last holder drops its handle.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

/// Shared handle to a [`ServerBlock`].
pub type SharedBlock = Arc<ServerBlock>;

/// Errors from reading or writing a [`ServerBlock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("block is closed for writing")]
    Closed,
    #[error("block contents were discarded")]
    Discarded,
    #[error("block must be closed before it can be read")]
    NotClosed,
}

#[derive(Debug)]
enum BlockState {
    Open(BytesMut),
    Closed(Bytes),
    Discarded,
}

/// Growable write-then-read byte buffer.
#[derive(Debug)]
pub struct ServerBlock {
    state: Mutex<BlockState>,
}

impl ServerBlock {
    /// Creates an empty, open block.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty, open block with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BlockState::Open(BytesMut::with_capacity(capacity))),
        }
    }

    /// Creates an empty, open block behind a shared handle.
    #[must_use]
    pub fn shared() -> SharedBlock {
        Arc::new(Self::new())
    }

    /// Creates a closed block holding `data`. Used for post bodies that were
    /// streamed in full before dispatch.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> SharedBlock {
        Arc::new(Self {
            state: Mutex::new(BlockState::Closed(data.into())),
        })
    }

    /// Appends `data` to an open block.
    ///
    /// # Errors
    ///
    /// `BlockError::Closed` once the block is closed, `BlockError::Discarded`
    /// after it was discarded.
    pub fn write(&self, data: &[u8]) -> Result<(), BlockError> {
        match &mut *self.state.lock() {
            BlockState::Open(buf) => {
                buf.extend_from_slice(data);
                Ok(())
            }
            BlockState::Closed(_) => Err(BlockError::Closed),
            BlockState::Discarded => Err(BlockError::Discarded),
        }
    }

    /// Number of bytes committed so far. Zero for a discarded block.
    #[must_use]
    pub fn len(&self) -> usize {
        match &*self.state.lock() {
            BlockState::Open(buf) => buf.len(),
            BlockState::Closed(bytes) => bytes.len(),
            BlockState::Discarded => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freezes the block and returns its final size. Closing a closed block is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// `BlockError::Discarded` if the block was discarded.
    pub fn close(&self) -> Result<usize, BlockError> {
        let mut state = self.state.lock();
        if let BlockState::Open(buf) = &mut *state {
            let frozen = std::mem::take(buf).freeze();
            *state = BlockState::Closed(frozen);
        }
        match &*state {
            BlockState::Closed(bytes) => Ok(bytes.len()),
            BlockState::Open(_) => Err(BlockError::NotClosed),
            BlockState::Discarded => Err(BlockError::Discarded),
        }
    }

    /// Drops the contents. Every later read or write fails with
    /// `BlockError::Discarded` until the block is reset.
    pub fn discard(&self) {
        *self.state.lock() = BlockState::Discarded;
    }

    /// Returns the block to the empty open state, dropping anything written
    /// before.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        match &mut *state {
            BlockState::Open(buf) => buf.clear(),
            _ => *state = BlockState::Open(BytesMut::new()),
        }
    }

    /// Returns the committed bytes of a closed block. The returned `Bytes`
    /// shares the block's storage.
    ///
    /// # Errors
    ///
    /// `BlockError::NotClosed` while still open, `BlockError::Discarded`
    /// after a discard.
    pub fn read(&self) -> Result<Bytes, BlockError> {
        match &*self.state.lock() {
            BlockState::Open(_) => Err(BlockError::NotClosed),
            BlockState::Closed(bytes) => Ok(bytes.clone()),
            BlockState::Discarded => Err(BlockError::Discarded),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(&*self.state.lock(), BlockState::Closed(_))
    }

    #[must_use]
    pub fn is_discarded(&self) -> bool {
        matches!(&*self.state.lock(), BlockState::Discarded)
    }
}

impl Default for ServerBlock {
    fn default() -> Self {
        Self::new()
    }
}
