//! In-memory backend used by the unit tests

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use xonweb_core::{Category, ItemStatus, LineItem, Transaction};

use crate::backend::TransactionBackend;
use crate::error::{ClientError, ClientResult};

#[derive(Default)]
pub struct FakeBackend {
    transactions: Mutex<Vec<Transaction>>,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    fail_status: AtomicBool,
    failing_deletes: Mutex<HashSet<String>>,
}

impl FakeBackend {
    /// One materials transaction with a single cement row per id
    pub fn with_materials(ids: &[&str]) -> Self {
        let transactions = ids
            .iter()
            .map(|id| Transaction {
                id: id.to_string(),
                project_id: "p1".to_string(),
                category: Category::Bahan,
                description: "Semen".to_string(),
                amount: Decimal::new(650_000, 0),
                items: Some(vec![LineItem::new(
                    "Semen",
                    Decimal::new(65_000, 0),
                    Decimal::new(10, 0),
                    "sak",
                )]),
                quantity: None,
                unit: None,
                status: None,
                receipt: None,
                created_by: None,
                transaction_date: None,
            })
            .collect();
        Self {
            transactions: Mutex::new(transactions),
            ..Self::default()
        }
    }

    pub fn fail_status_updates(&self) {
        self.fail_status.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, id: &str) {
        self.failing_deletes.lock().unwrap().insert(id.to_string());
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> Vec<String> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .map(|tx| tx.id.clone())
            .collect()
    }
}

fn api_error(status: u16, detail: &str) -> ClientError {
    ClientError::Api {
        status,
        detail: detail.to_string(),
    }
}

#[async_trait]
impl TransactionBackend for FakeBackend {
    async fn list_transactions(&self) -> ClientResult<Vec<Transaction>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn delete_transaction(&self, id: &str) -> ClientResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_deletes.lock().unwrap().contains(id) {
            return Err(api_error(500, "Database unavailable"));
        }
        let mut transactions = self.transactions.lock().unwrap();
        let before = transactions.len();
        transactions.retain(|tx| tx.id != id);
        if transactions.len() == before {
            return Err(api_error(404, "Transaction not found"));
        }
        Ok(())
    }

    async fn update_item_status(
        &self,
        id: &str,
        item_index: usize,
        status: ItemStatus,
    ) -> ClientResult<()> {
        if self.fail_status.load(Ordering::SeqCst) {
            return Err(api_error(400, "Status update rejected"));
        }
        let mut transactions = self.transactions.lock().unwrap();
        let transaction = transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or_else(|| api_error(404, "Transaction not found"))?;
        let item = transaction
            .items
            .as_mut()
            .and_then(|items| items.get_mut(item_index))
            .ok_or_else(|| api_error(400, "Invalid item index"))?;
        item.status = Some(status);
        Ok(())
    }
}
