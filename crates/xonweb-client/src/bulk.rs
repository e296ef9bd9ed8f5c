//! Delete every transaction in one go
//!
//! Deletes are issued concurrently and awaited together. Failures are
//! counted but not attributed, and deletes that succeeded stay deleted.

use futures::future::join_all;
use xonweb_core::Transaction;

use crate::backend::TransactionBackend;
use crate::error::{ClientError, ClientResult};

/// Delete `transactions` and return the reloaded list
///
/// Any failed delete yields [`ClientError::PartialFailure`] and skips the
/// reload; the caller decides when to refresh.
pub async fn clear_all<B>(backend: &B, transactions: &[Transaction]) -> ClientResult<Vec<Transaction>>
where
    B: TransactionBackend + ?Sized,
{
    let total = transactions.len();
    if total == 0 {
        return backend.list_transactions().await;
    }
    log::info!(target: "xonweb::bulk", "deleting {} transactions", total);

    let results = join_all(
        transactions
            .iter()
            .map(|tx| backend.delete_transaction(&tx.id)),
    )
    .await;

    let failed = results.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        for error in results.iter().filter_map(|result| result.as_ref().err()) {
            log::debug!(target: "xonweb::bulk", "delete failed: {}", error);
        }
        log::warn!(target: "xonweb::bulk", "{} of {} deletes failed", failed, total);
        return Err(ClientError::PartialFailure { failed, total });
    }

    backend.list_transactions().await
}
