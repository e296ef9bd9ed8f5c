//! Wire models exchanged with the remote API

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::types::{Category, ItemStatus, RoleSet, TaskPriority, TaskStatus};

// ==================== Users & sessions ====================

/// Authenticated user as returned by `/auth/me` and `/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    /// Primary role; older accounts only carry this field
    #[serde(default)]
    pub role: Option<String>,
    /// Additional roles
    #[serde(default)]
    pub roles: Option<Vec<String>>,
}

impl User {
    /// Effective role set (primary role plus the role list)
    pub fn role_set(&self) -> RoleSet {
        let roles = self.roles.as_deref().unwrap_or_default();
        RoleSet::from_names(self.role.as_deref(), roles.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Email or username
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoogleAuthRequest {
    pub session_id: String,
}

/// Response of the login endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub session_token: String,
    pub user: User,
}

/// Generic `{ "message": ..., "id": ... }` acknowledgement
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub id: Option<String>,
}

// ==================== Projects ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// interior or arsitektur
    #[serde(rename = "type", default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub project_value: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
}

// ==================== Transactions ====================

/// One material/cost row of a multi-item transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit: String,
    pub unit_price: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub status: Option<ItemStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl LineItem {
    /// Build an item; the total is always derived from its factors
    pub fn new(description: &str, unit_price: Decimal, quantity: Decimal, unit: &str) -> Self {
        Self {
            description: description.to_string(),
            quantity,
            unit: unit.to_string(),
            unit_price,
            total: unit_price.checked_mul(quantity).unwrap_or(Decimal::ZERO),
            status: Some(ItemStatus::Receiving),
            supplier: None,
        }
    }

    /// Status with the server default applied
    pub fn status(&self) -> ItemStatus {
        self.status.unwrap_or_default()
    }
}

/// Transaction as held by the remote system of record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub project_id: String,
    pub category: Category,
    pub description: String,
    pub amount: Decimal,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub quantity: Option<Decimal>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Receipt image as a base64 data URL
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub transaction_date: Option<String>,
}

impl Transaction {
    pub fn items(&self) -> &[LineItem] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Amount with the sign of its category applied
    pub fn signed_amount(&self) -> Decimal {
        if self.category.is_income() {
            self.amount
        } else {
            -self.amount
        }
    }

    /// Wall-clock transaction time as recorded by the server
    ///
    /// Records carry either an offset (`2024-05-01T09:30:00+07:00`), a naive
    /// ISO timestamp (`2024-05-01T00:00:00`) or a bare date.
    pub fn transaction_time(&self) -> Option<NaiveDateTime> {
        let text = self.transaction_date.as_deref()?.trim();
        DateTime::parse_from_rfc3339(text)
            .map(|t| t.naive_local())
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

/// Body of `POST /transactions`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransactionSubmission {
    pub project_id: String,
    pub category: Category,
    pub description: String,
    pub amount: Decimal,
    pub items: Vec<LineItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemNamesResponse {
    #[serde(default)]
    pub item_names: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuppliersResponse {
    #[serde(default)]
    pub suppliers: Vec<String>,
}

// ==================== Tasks ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// Body of `PATCH /tasks/{id}` for a status change
#[derive(Debug, Clone, Serialize)]
pub struct TaskStatusUpdate {
    pub status: TaskStatus,
}

/// Body of `POST /tasks/{id}/report`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkReportInput {
    pub task_id: String,
    pub report: String,
    pub progress: u8,
    pub photos: Vec<String>,
}

impl WorkReportInput {
    /// Validate a report typed by the user; progress is a 0..=100 integer
    pub fn new(task_id: &str, report: &str, progress: &str) -> Result<Self, ValidationError> {
        if report.trim().is_empty() {
            return Err(ValidationError::missing("report"));
        }
        let progress = progress
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| ValidationError::ProgressOutOfRange {
                value: progress.to_string(),
            })?;

        Ok(Self {
            task_id: task_id.to_string(),
            report: report.trim().to_string(),
            progress,
            photos: vec![],
        })
    }
}
