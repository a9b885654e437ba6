use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;

use super::{
    embed::{EmbeddedRoot, EmbeddedView},
    BlockOrder, ChildBlock, HostApi, HostError, HostOperation,
};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// Session-scoped façade over [`HostApi`].
#[derive(Clone)]
pub struct HostAdapter {
    api: Arc<dyn HostApi>,
    page_title: Arc<str>,
    page_uid: Arc<OnceCell<String>>,
}

impl HostAdapter {
    pub fn new(api: Arc<dyn HostApi>, page_title: &str) -> Self {
        Self {
            api,
            page_title: Arc::from(page_title),
            page_uid: Arc::new(OnceCell::new()),
        }
    }

    pub fn api(&self) -> &Arc<dyn HostApi> {
        &self.api
    }

    /// Uid of the container page, creating the page on first use. Resolved
    /// once per adapter; concurrent callers wait on the same lookup.
    pub async fn ensure_container_page(&self) -> Result<String> {
        let uid = self
            .page_uid
            .get_or_try_init(|| async {
                if let Some(existing) = self.api.find_page(&self.page_title).await? {
                    return Ok::<_, HostError>(existing);
                }
                let created = self.api.create_page(&self.page_title).await?;
                log_info!("created container page '{}' ({created})", self.page_title);
                Ok(created)
            })
            .await
            .with_context(|| format!("failed to resolve page '{}'", self.page_title))?;
        Ok(uid.clone())
    }

    /// Children of `page_uid` sorted by host order.
    pub async fn list_child_notes(&self, page_uid: &str) -> Result<Vec<ChildBlock>> {
        let mut children = self
            .api
            .child_blocks(page_uid)
            .await
            .with_context(|| format!("failed to list children of {page_uid}"))?;
        children.sort_by_key(|child| child.order);
        Ok(children)
    }

    pub async fn list_child_note_ids(&self, page_uid: &str) -> Result<Vec<String>> {
        Ok(self
            .list_child_notes(page_uid)
            .await?
            .into_iter()
            .map(|child| child.uid)
            .collect())
    }

    /// Empty when the block has no text or cannot be read.
    pub async fn read_block_text(&self, uid: &str) -> String {
        match self.api.block_text(uid).await {
            Ok(text) => text.unwrap_or_default(),
            Err(err) => {
                log_debug!("could not read block {uid}: {err}");
                String::new()
            }
        }
    }

    pub async fn write_block_text(&self, uid: &str, text: &str) -> Result<(), HostError> {
        self.api
            .update_block(uid, text)
            .await
            .inspect_err(|err| log_host_error(HostOperation::UpdateBlock, uid, err))
    }

    pub async fn delete_block(&self, uid: &str) -> Result<(), HostError> {
        self.api
            .delete_block(uid)
            .await
            .inspect_err(|err| log_host_error(HostOperation::DeleteBlock, uid, err))
    }

    pub async fn create_block(
        &self,
        parent_uid: &str,
        order: BlockOrder,
        text: &str,
    ) -> Result<String, HostError> {
        self.api
            .create_block(parent_uid, order, text)
            .await
            .inspect_err(|err| log_host_error(HostOperation::CreateBlock, parent_uid, err))
    }

    pub async fn register_command(&self, label: &str) -> Result<(), HostError> {
        self.api.add_command(label).await
    }

    /// Renders the host's block view for `uid` into `root`. Without a loaded
    /// renderer nothing is drawn and the returned view unmounts as a no-op.
    pub fn mount_embedded_view(
        &self,
        uid: &str,
        root: Arc<dyn EmbeddedRoot>,
        open: bool,
    ) -> EmbeddedView {
        match self.api.block_renderer() {
            Some(renderer) => {
                renderer.render(uid, open, &root);
                EmbeddedView::mounted(renderer, root)
            }
            None => {
                log_debug!("block renderer unavailable, leaving {uid} empty");
                EmbeddedView::detached()
            }
        }
    }
}

pub(crate) fn log_host_error(operation: HostOperation, uid: &str, err: &HostError) {
    log_error!("Failed to {operation} for block {uid}: {err}");
}
