//! Seam between the transaction workflows and the transport

use async_trait::async_trait;
use xonweb_core::{ItemStatus, Transaction};

use crate::error::ClientResult;

/// Transaction operations the status sync and bulk delete depend on
#[async_trait]
pub trait TransactionBackend: Send + Sync {
    /// Full transaction list, newest first as the server orders it
    async fn list_transactions(&self) -> ClientResult<Vec<Transaction>>;

    async fn delete_transaction(&self, id: &str) -> ClientResult<()>;

    /// The server moves the item's quantity between the stock counters
    async fn update_item_status(
        &self,
        id: &str,
        item_index: usize,
        status: ItemStatus,
    ) -> ClientResult<()>;
}
