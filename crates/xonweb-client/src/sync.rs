//! Line item status changes against the system of record
//!
//! The local transaction list is only replaced by a fresh server copy after
//! the server accepted a change. A failed request leaves it untouched.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use xonweb_core::{ItemStatus, ItemStatusTracker, StatusTransition, Transaction};

use crate::backend::TransactionBackend;
use crate::error::ClientResult;

pub struct ItemStatusSync {
    backend: Arc<dyn TransactionBackend>,
    transactions: RwLock<Vec<Transaction>>,
    tracker: Mutex<ItemStatusTracker>,
}

impl ItemStatusSync {
    pub fn new(backend: Arc<dyn TransactionBackend>) -> Self {
        Self {
            backend,
            transactions: RwLock::new(vec![]),
            tracker: Mutex::new(ItemStatusTracker::new()),
        }
    }

    /// Replace the local list with the server's
    pub async fn reload(&self) -> ClientResult<Vec<Transaction>> {
        let fresh = self.backend.list_transactions().await?;
        *self.transactions.write().await = fresh.clone();
        self.tracker.lock().await.clear_settled();
        Ok(fresh)
    }

    /// Last loaded list
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.transactions.read().await.clone()
    }

    /// Status the row should show right now
    pub async fn displayed_status(&self, transaction_id: &str, item_index: usize) -> Option<ItemStatus> {
        let transactions = self.transactions.read().await;
        let transaction = transactions.iter().find(|tx| tx.id == transaction_id)?;
        self.tracker.lock().await.displayed(transaction, item_index)
    }

    pub async fn transition(&self, transaction_id: &str, item_index: usize) -> Option<StatusTransition> {
        self.tracker.lock().await.transition(transaction_id, item_index)
    }

    /// Ask the server to change one item's status, then reload the list
    pub async fn update_item_status(
        &self,
        transaction_id: &str,
        item_index: usize,
        new_status: ItemStatus,
    ) -> ClientResult<Vec<Transaction>> {
        let current = self
            .transactions
            .read()
            .await
            .iter()
            .find(|tx| tx.id == transaction_id)
            .and_then(|tx| tx.items().get(item_index).map(|item| item.status()))
            .unwrap_or_default();

        let started = self
            .tracker
            .lock()
            .await
            .begin(transaction_id, item_index, current, new_status);
        if !started {
            log::warn!(
                target: "xonweb::sync",
                "status change for {}[{}] already in flight, this one will not settle it",
                transaction_id,
                item_index
            );
        }

        match self
            .backend
            .update_item_status(transaction_id, item_index, new_status)
            .await
        {
            Ok(()) => {
                if started {
                    self.tracker.lock().await.confirm(transaction_id, item_index);
                }
                log::info!(
                    target: "xonweb::sync",
                    "item {}[{}] is now {}",
                    transaction_id,
                    item_index,
                    new_status
                );
                self.reload().await
            }
            Err(e) => {
                if started {
                    self.tracker.lock().await.revert(transaction_id, item_index);
                }
                log::warn!(target: "xonweb::sync", "status change for {}[{}] failed: {}", transaction_id, item_index, e);
                Err(e)
            }
        }
    }
}
