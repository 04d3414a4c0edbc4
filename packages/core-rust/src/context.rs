//! Request and response envelopes passed across the service boundary.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::block::{BlockError, SharedBlock};
use crate::error::HeaderError;
use crate::format::DataFormat;

// ---------------------------------------------------------------------------
// PostData
// ---------------------------------------------------------------------------

/// Borrowed post body. Valid only for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct PostData<'a> {
    pub data: &'a [u8],
    pub format: DataFormat,
}

impl PostData<'_> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RequestContext
// ---------------------------------------------------------------------------

/// Everything a service sees for one request.
///
/// Built by the caller right before `handle_request` and dropped right after.
/// The lifetime ties the arguments and any post body to the caller, so a
/// service cannot keep them past the call.
#[derive(Debug)]
pub struct RequestContext<'a> {
    /// Request arguments. Services may rewrite them in place while parsing.
    pub arguments: &'a mut String,
    /// Post body sent with the request, if any.
    pub post_data: Option<PostData<'a>>,
    /// Block the response is written into. Empty on entry.
    pub response_block: SharedBlock,
    /// Format of the response. Must be `Text` or `Binary` after a successful
    /// call.
    pub response_data_format: DataFormat,
}

impl<'a> RequestContext<'a> {
    /// Creates a context with no post body and an unnegotiated response format.
    pub fn new(arguments: &'a mut String, response_block: SharedBlock) -> Self {
        Self {
            arguments,
            post_data: None,
            response_block,
            response_data_format: DataFormat::Unknown,
        }
    }

    /// Attaches a post body.
    #[must_use]
    pub fn with_post(mut self, data: &'a [u8], format: DataFormat) -> Self {
        self.post_data = Some(PostData { data, format });
        self
    }

    /// Size of the post body, zero when none was sent.
    #[must_use]
    pub fn post_data_size(&self) -> usize {
        self.post_data.as_ref().map_or(0, PostData::len)
    }

    /// Appends UTF-8 text to the response and marks it `Text`.
    ///
    /// # Errors
    ///
    /// Propagates the block's refusal to accept writes.
    pub fn write_text(&mut self, text: &str) -> Result<(), BlockError> {
        self.response_block.write(text.as_bytes())?;
        self.response_data_format = DataFormat::Text;
        Ok(())
    }

    /// Appends raw bytes to the response and marks it `Binary`.
    ///
    /// # Errors
    ///
    /// Propagates the block's refusal to accept writes.
    pub fn write_binary(&mut self, data: &[u8]) -> Result<(), BlockError> {
        self.response_block.write(data)?;
        self.response_data_format = DataFormat::Binary;
        Ok(())
    }

    /// Snapshot of the response half of this context.
    #[must_use]
    pub fn response_context(&self) -> ResponseContext {
        ResponseContext {
            response_block: self.response_block.clone(),
            response_data_format: self.response_data_format,
        }
    }
}

// ---------------------------------------------------------------------------
// PostContext
// ---------------------------------------------------------------------------

/// Request whose post body was streamed into a block before dispatch.
///
/// Unlike [`PostData`], the block handle is shared and may be kept past the
/// call.
#[derive(Debug, Clone)]
pub struct PostContext {
    pub arguments: String,
    pub post_block: SharedBlock,
    pub post_data_format: DataFormat,
}

impl PostContext {
    pub fn new(
        arguments: impl Into<String>,
        post_block: SharedBlock,
        post_data_format: DataFormat,
    ) -> Self {
        Self {
            arguments: arguments.into(),
            post_block,
            post_data_format,
        }
    }

    #[must_use]
    pub fn post_data_size(&self) -> usize {
        self.post_block.len()
    }

    /// Returns the streamed body.
    ///
    /// # Errors
    ///
    /// Fails if the post block is still open or was discarded.
    pub fn body(&self) -> Result<Bytes, BlockError> {
        self.post_block.read()
    }
}

// ---------------------------------------------------------------------------
// ResponseContext / ResponseHeader
// ---------------------------------------------------------------------------

/// Destination block plus the format chosen for it.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub response_block: SharedBlock,
    pub response_data_format: DataFormat,
}

impl ResponseContext {
    pub fn new(response_block: SharedBlock) -> Self {
        Self {
            response_block,
            response_data_format: DataFormat::Unknown,
        }
    }

    /// Closes the block and describes what was written.
    ///
    /// # Errors
    ///
    /// `HeaderError::UnknownFormat` when no format was chosen; the block is
    /// left untouched in that case. `HeaderError::Block` if the block was
    /// discarded.
    pub fn commit(self) -> Result<ResponseHeader, HeaderError> {
        if !self.response_data_format.is_negotiated() {
            return Err(HeaderError::UnknownFormat);
        }
        let size = self.response_block.close()?;
        Ok(ResponseHeader {
            size,
            format: self.response_data_format,
        })
    }
}

/// Describes a committed response: its size in bytes and its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub size: usize,
    pub format: DataFormat,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::block::ServerBlock;

    #[test]
    fn new_context_has_no_post_and_unknown_format() {
        let mut args = String::from("/status");
        let ctx = RequestContext::new(&mut args, ServerBlock::shared());
        assert!(ctx.post_data.is_none());
        assert_eq!(ctx.post_data_size(), 0);
        assert_eq!(ctx.response_data_format, DataFormat::Unknown);
    }

    #[test]
    fn with_post_exposes_body() {
        let mut args = String::new();
        let body = [7u8; 16];
        let ctx = RequestContext::new(&mut args, ServerBlock::shared())
            .with_post(&body, DataFormat::Binary);
        let post = ctx.post_data.unwrap();
        assert_eq!(post.len(), 16);
        assert_eq!(post.format, DataFormat::Binary);
    }

    #[test]
    fn arguments_can_be_rewritten_in_place() {
        let mut args = String::from("  trim me  ");
        {
            let ctx = RequestContext::new(&mut args, ServerBlock::shared());
            let trimmed = ctx.arguments.trim().to_string();
            *ctx.arguments = trimmed;
        }
        assert_eq!(args, "trim me");
    }

    #[test]
    fn binary_write_commits_matching_header() {
        let block = ServerBlock::shared();
        let mut args = String::new();
        let mut ctx = RequestContext::new(&mut args, block.clone());
        ctx.write_binary(&[0xAB; 8]).unwrap();

        let header = ctx.response_context().commit().unwrap();
        assert_eq!(
            header,
            ResponseHeader {
                size: 8,
                format: DataFormat::Binary
            }
        );
        assert_eq!(block.read().unwrap().len(), 8);
    }

    #[test]
    fn zero_byte_response_is_valid() {
        let mut response = ResponseContext::new(ServerBlock::shared());
        response.response_data_format = DataFormat::Text;
        let header = response.commit().unwrap();
        assert_eq!(header.size, 0);
        assert_eq!(header.format, DataFormat::Text);
    }

    #[test]
    fn unknown_format_cannot_commit() {
        let block = ServerBlock::shared();
        block.write(b"orphan").unwrap();
        let response = ResponseContext::new(block.clone());
        assert_eq!(response.commit(), Err(HeaderError::UnknownFormat));
        assert!(!block.is_closed());
    }

    #[test]
    fn discarded_block_cannot_commit() {
        let block = ServerBlock::shared();
        block.discard();
        let mut response = ResponseContext::new(block);
        response.response_data_format = DataFormat::Binary;
        assert_eq!(
            response.commit(),
            Err(HeaderError::Block(BlockError::Discarded))
        );
    }

    #[test]
    fn post_context_reads_streamed_body() {
        let post = PostContext::new(
            "/upload",
            ServerBlock::from_bytes(&b"payload"[..]),
            DataFormat::Text,
        );
        assert_eq!(post.post_data_size(), 7);
        assert_eq!(post.body().unwrap().as_ref(), b"payload");
    }

    #[test]
    fn post_context_with_open_block_is_not_readable() {
        let post = PostContext::new("", ServerBlock::shared(), DataFormat::Binary);
        assert_eq!(post.body(), Err(BlockError::NotClosed));
    }

    proptest! {
        #[test]
        fn header_size_equals_bytes_written(chunks in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..64),
            0..8,
        )) {
            let mut args = String::new();
            let mut ctx = RequestContext::new(&mut args, ServerBlock::shared());
            ctx.response_data_format = DataFormat::Binary;
            for chunk in &chunks {
                ctx.write_binary(chunk).unwrap();
            }
            let expected: usize = chunks.iter().map(Vec::len).sum();
            let header = ctx.response_context().commit().unwrap();
            prop_assert_eq!(header.size, expected);
            prop_assert_eq!(header.format, DataFormat::Binary);
        }
    }
}
