//! Display state of line item status changes
//!
//! A status change is only shown once the server has accepted it. While the
//! request is in flight the row keeps showing its old status.

use std::collections::HashMap;

use crate::models::Transaction;
use crate::types::ItemStatus;

/// Lifecycle of one requested status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTransition {
    /// Request sent, no answer yet
    Pending { from: ItemStatus, to: ItemStatus },
    /// Server accepted the change
    Confirmed(ItemStatus),
    /// Server rejected the change, or the request failed
    Reverted(ItemStatus),
}

impl StatusTransition {
    /// Status to render for the row
    pub fn displayed(&self) -> ItemStatus {
        match self {
            StatusTransition::Pending { from, .. } => *from,
            StatusTransition::Confirmed(status) | StatusTransition::Reverted(status) => *status,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, StatusTransition::Pending { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ItemKey {
    transaction_id: String,
    item_index: usize,
}

impl ItemKey {
    fn new(transaction_id: &str, item_index: usize) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            item_index,
        }
    }
}

/// Tracks in-flight and settled status changes per line item
#[derive(Debug, Default)]
pub struct ItemStatusTracker {
    entries: HashMap<ItemKey, StatusTransition>,
}

impl ItemStatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request; returns false if one is already pending for the row
    pub fn begin(
        &mut self,
        transaction_id: &str,
        item_index: usize,
        from: ItemStatus,
        to: ItemStatus,
    ) -> bool {
        let key = ItemKey::new(transaction_id, item_index);
        if self.entries.get(&key).is_some_and(StatusTransition::is_pending) {
            return false;
        }
        self.entries.insert(key, StatusTransition::Pending { from, to });
        true
    }

    /// Mark the pending change as accepted and return the new status
    pub fn confirm(&mut self, transaction_id: &str, item_index: usize) -> Option<ItemStatus> {
        self.settle(transaction_id, item_index, |_, to| StatusTransition::Confirmed(to))
    }

    /// Drop the pending change and return the status that stays
    pub fn revert(&mut self, transaction_id: &str, item_index: usize) -> Option<ItemStatus> {
        self.settle(transaction_id, item_index, |from, _| StatusTransition::Reverted(from))
    }

    fn settle<F>(&mut self, transaction_id: &str, item_index: usize, f: F) -> Option<ItemStatus>
    where
        F: FnOnce(ItemStatus, ItemStatus) -> StatusTransition,
    {
        let entry = self.entries.get_mut(&ItemKey::new(transaction_id, item_index))?;
        match *entry {
            StatusTransition::Pending { from, to } => {
                *entry = f(from, to);
                Some(entry.displayed())
            }
            _ => None,
        }
    }

    pub fn transition(&self, transaction_id: &str, item_index: usize) -> Option<StatusTransition> {
        self.entries
            .get(&ItemKey::new(transaction_id, item_index))
            .copied()
    }

    /// Status to render for an item of `transaction`
    pub fn displayed(&self, transaction: &Transaction, item_index: usize) -> Option<ItemStatus> {
        match self.transition(&transaction.id, item_index) {
            Some(transition) => Some(transition.displayed()),
            None => transaction.items().get(item_index).map(|item| item.status()),
        }
    }

    /// Forget settled entries once fresh data has been loaded
    pub fn clear_settled(&mut self) {
        self.entries.retain(|_, transition| transition.is_pending());
    }

    pub fn pending_count(&self) -> usize {
        self.entries.values().filter(|t| t.is_pending()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LineItem;
    use crate::types::Category;
    use rust_decimal::Decimal;

    fn transaction() -> Transaction {
        Transaction {
            id: "t1".to_string(),
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
        }
    }

    #[test]
    fn test_pending_shows_old_status() {
        let tx = transaction();
        let mut tracker = ItemStatusTracker::new();
        assert!(tracker.begin("t1", 0, ItemStatus::Receiving, ItemStatus::OutWarehouse));
        assert_eq!(tracker.displayed(&tx, 0), Some(ItemStatus::Receiving));
        assert_eq!(tracker.pending_count(), 1);
    }

    #[test]
    fn test_confirm_shows_new_status() {
        let tx = transaction();
        let mut tracker = ItemStatusTracker::new();
        tracker.begin("t1", 0, ItemStatus::Receiving, ItemStatus::OutWarehouse);
        assert_eq!(tracker.confirm("t1", 0), Some(ItemStatus::OutWarehouse));
        assert_eq!(tracker.displayed(&tx, 0), Some(ItemStatus::OutWarehouse));
        assert_eq!(
            tracker.transition("t1", 0),
            Some(StatusTransition::Confirmed(ItemStatus::OutWarehouse))
        );
    }

    #[test]
    fn test_revert_keeps_old_status() {
        let tx = transaction();
        let mut tracker = ItemStatusTracker::new();
        tracker.begin("t1", 0, ItemStatus::Receiving, ItemStatus::OutWarehouse);
        assert_eq!(tracker.revert("t1", 0), Some(ItemStatus::Receiving));
        assert_eq!(tracker.displayed(&tx, 0), Some(ItemStatus::Receiving));
        assert_eq!(tracker.confirm("t1", 0), None);
    }

    #[test]
    fn test_second_request_rejected_while_pending() {
        let mut tracker = ItemStatusTracker::new();
        assert!(tracker.begin("t1", 0, ItemStatus::Receiving, ItemStatus::OutWarehouse));
        assert!(!tracker.begin("t1", 0, ItemStatus::Receiving, ItemStatus::OutWarehouse));
        assert!(tracker.begin("t1", 1, ItemStatus::Receiving, ItemStatus::OutWarehouse));
    }

    #[test]
    fn test_untracked_item_uses_transaction() {
        let tracker = ItemStatusTracker::new();
        let tx = transaction();
        assert_eq!(tracker.displayed(&tx, 0), Some(ItemStatus::Receiving));
        assert_eq!(tracker.displayed(&tx, 3), None);
    }

    #[test]
    fn test_clear_settled_keeps_pending() {
        let mut tracker = ItemStatusTracker::new();
        tracker.begin("t1", 0, ItemStatus::Receiving, ItemStatus::OutWarehouse);
        tracker.begin("t2", 0, ItemStatus::OutWarehouse, ItemStatus::Receiving);
        tracker.confirm("t1", 0);
        tracker.clear_settled();
        assert_eq!(tracker.transition("t1", 0), None);
        assert!(tracker.transition("t2", 0).is_some_and(|t| t.is_pending()));
    }
}
