//! Boundary to the host outliner.
//!
//! [`HostApi`] is implemented by host glue over the outliner's document store
//! and command palette; [`HostAdapter`] is the narrow façade the rest of the
//! crate talks to.

pub mod adapter;
pub mod embed;
pub mod focus;

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use thiserror::Error;

pub use adapter::HostAdapter;
pub use embed::{BlockRenderer, EmbeddedContent, EmbeddedRoot, EmbeddedView, SubtreeWatch};
pub use focus::{locate_rendered_input_id, resolve_window_id, FocusDebug, FocusRetry};

/// One child block of the container page as the host reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildBlock {
    pub uid: String,
    /// Host sibling order; ascending is document order.
    pub order: i64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrder {
    Index(usize),
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOperation {
    CreatePage,
    CreateBlock,
    UpdateBlock,
    DeleteBlock,
    FocusBlock,
}

impl fmt::Display for HostOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HostOperation::CreatePage => "createPage",
            HostOperation::CreateBlock => "createBlock",
            HostOperation::UpdateBlock => "updateBlock",
            HostOperation::DeleteBlock => "deleteBlock",
            HostOperation::FocusBlock => "setBlockFocusAndSelection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host rejected {operation} for block {uid}: {reason}")]
    WriteRejected {
        operation: HostOperation,
        uid: String,
        reason: String,
    },
    #[error("host query failed: {0}")]
    Query(String),
    #[error("host command registration failed: {0}")]
    Command(String),
}

impl HostError {
    pub fn rejected(operation: HostOperation, uid: &str, reason: impl Into<String>) -> Self {
        HostError::WriteRejected {
            operation,
            uid: uid.to_string(),
            reason: reason.into(),
        }
    }
}

/// Capabilities the engine consumes from the host.
#[async_trait]
pub trait HostApi: Send + Sync {
    async fn find_page(&self, title: &str) -> Result<Option<String>, HostError>;

    async fn create_page(&self, title: &str) -> Result<String, HostError>;

    /// Direct children of `parent_uid`, in any order.
    async fn child_blocks(&self, parent_uid: &str) -> Result<Vec<ChildBlock>, HostError>;

    /// `None` when the block does not exist.
    async fn block_text(&self, uid: &str) -> Result<Option<String>, HostError>;

    async fn create_block(
        &self,
        parent_uid: &str,
        order: BlockOrder,
        text: &str,
    ) -> Result<String, HostError>;

    async fn update_block(&self, uid: &str, text: &str) -> Result<(), HostError>;

    async fn delete_block(&self, uid: &str) -> Result<(), HostError>;

    /// Moves the host's editing cursor into `uid` as rendered in `window_id`.
    async fn focus_block(&self, uid: &str, window_id: &str) -> Result<(), HostError>;

    async fn add_command(&self, label: &str) -> Result<(), HostError>;

    /// `None` until the host's block rendering UI has loaded.
    fn block_renderer(&self) -> Option<Arc<dyn BlockRenderer>>;
}
