//! HTTP side of the XON client
//!
//! - api: typed REST client with bearer auth
//! - session: persisted session token
//! - auth: login, logout and session restore
//! - sync: line item status changes
//! - bulk: delete all transactions

pub mod api;
pub mod auth;
pub mod backend;
pub mod bulk;
pub mod error;
pub mod session;
pub mod sync;

#[cfg(test)]
mod testing;

pub use api::ApiClient;
pub use auth::AuthService;
pub use backend::TransactionBackend;
pub use bulk::clear_all;
pub use error::{ClientError, ClientResult};
pub use session::{SessionStore, SESSION_TOKEN_KEY};
pub use sync::ItemStatusSync;
