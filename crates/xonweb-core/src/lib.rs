//! Domain core of the XON client
//!
//! Holds the wire models, the role-aware navigation resolver, the
//! transaction draft and the display state of line item status changes.
//! Nothing in here performs I/O.

pub mod error;
pub mod form;
pub mod models;
pub mod navigation;
pub mod status;
pub mod types;

pub use error::{CoreError, CoreResult, ErrorSeverity, ValidationError};
pub use form::{suggestions, FormAction, FormMode, LineItemDraft, LineItemField, TransactionForm};
pub use models::{
    LineItem, LoginResponse, MessageResponse, Project, Task, Transaction, TransactionSubmission,
    User, WorkReportInput,
};
pub use navigation::{resolve, MenuEntry, NavContext, NavigationView};
pub use status::{ItemStatusTracker, StatusTransition};
pub use types::{Category, ItemStatus, Role, RoleSet, TaskPriority, TaskStatus};
