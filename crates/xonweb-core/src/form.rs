//! Transaction draft held while the transaction dialog is open
//!
//! The draft is a plain value. Every edit produces a new draft through
//! [`TransactionForm::apply`], so callers can keep the previous value around
//! and tests can compare whole states.
//!
//! Materials (`bahan`) are entered as a list of line items whose totals are
//! derived from unit price and quantity; every other category takes a single
//! amount. Both sets of fields live side by side, which makes switching the
//! category back and forth lossless.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use xonweb_utils::{coerce_decimal, contains_ignore_case, parse_decimal};

use crate::error::ValidationError;
use crate::models::{LineItem, TransactionSubmission};
use crate::types::{Category, ItemStatus};

/// Editable column of a line item row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineItemField {
    Description,
    UnitPrice,
    Quantity,
    Unit,
    Supplier,
}

impl std::str::FromStr for LineItemField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "description" => Ok(LineItemField::Description),
            "unit_price" | "price" => Ok(LineItemField::UnitPrice),
            "quantity" | "qty" => Ok(LineItemField::Quantity),
            "unit" => Ok(LineItemField::Unit),
            "supplier" => Ok(LineItemField::Supplier),
            _ => Err(format!("Invalid line item field: {}", s)),
        }
    }
}

/// One row of the materials table, kept as the text the user typed
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineItemDraft {
    pub description: String,
    pub unit_price: String,
    pub quantity: String,
    pub unit: String,
    pub status: ItemStatus,
    pub supplier: String,
    total: Decimal,
}

impl LineItemDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// `unit_price * quantity`, non-numeric text counting as zero
    ///
    /// A product outside the decimal range also shows as zero;
    /// [`TransactionForm::build_submission`] rejects such a row.
    pub fn total(&self) -> Decimal {
        self.total
    }

    fn product(&self) -> Option<Decimal> {
        coerce_decimal(&self.unit_price).checked_mul(coerce_decimal(&self.quantity))
    }

    fn set(&mut self, field: LineItemField, value: &str) {
        match field {
            LineItemField::Description => self.description = value.to_string(),
            LineItemField::UnitPrice => self.unit_price = value.to_string(),
            LineItemField::Quantity => self.quantity = value.to_string(),
            LineItemField::Unit => self.unit = value.to_string(),
            LineItemField::Supplier => self.supplier = value.to_string(),
        }
        if matches!(field, LineItemField::UnitPrice | LineItemField::Quantity) {
            self.total = self.product().unwrap_or(Decimal::ZERO);
        }
    }

    /// Rows missing a description, unit price or quantity are not submitted
    pub fn is_complete(&self) -> bool {
        !self.description.trim().is_empty()
            && !self.unit_price.trim().is_empty()
            && !self.quantity.trim().is_empty()
    }

    fn to_line_item(&self, supplier: Option<&str>) -> Result<LineItem, ValidationError> {
        let total = self.product().ok_or_else(|| ValidationError::AmountOverflow {
            field: "items".to_string(),
        })?;
        let own_supplier = Some(self.supplier.trim()).filter(|s| !s.is_empty());
        Ok(LineItem {
            description: self.description.trim().to_string(),
            quantity: coerce_decimal(&self.quantity),
            unit: self.unit.trim().to_string(),
            unit_price: coerce_decimal(&self.unit_price),
            total,
            status: Some(self.status),
            supplier: supplier.or(own_supplier).map(str::to_string),
        })
    }
}

/// Fields used by every category except materials
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SingleAmountFields {
    pub amount: String,
    pub quantity: String,
    pub unit: String,
    /// Free-text condition, used by assets
    pub status: String,
}

/// Which half of the form is live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    SingleAmount,
    MultiItem,
}

/// Every edit the dialog can make
#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetProject(String),
    SetCategory(Category),
    SetDescription(String),
    SetAmount(String),
    SetQuantity(String),
    SetUnit(String),
    SetStatus(String),
    SetSupplier(String),
    SetDate(NaiveDate),
    SetLineItem {
        index: usize,
        field: LineItemField,
        value: String,
    },
    SetItemStatus {
        index: usize,
        status: ItemStatus,
    },
    AddLineItem,
    RemoveLineItem(usize),
    ClearReceipt,
}

/// Client-side draft of a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionForm {
    project_id: String,
    category: Category,
    description: String,
    single: SingleAmountFields,
    items: Vec<LineItemDraft>,
    supplier: String,
    transaction_date: NaiveDate,
    receipt: Option<String>,
}

impl Default for TransactionForm {
    fn default() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }
}

impl TransactionForm {
    /// Empty draft dated `today`, with one blank materials row
    pub fn new(today: NaiveDate) -> Self {
        Self {
            project_id: String::new(),
            category: Category::default(),
            description: String::new(),
            single: SingleAmountFields::default(),
            items: vec![LineItemDraft::new()],
            supplier: String::new(),
            transaction_date: today,
            receipt: None,
        }
    }

    // ==================== Reducer ====================

    /// Apply one edit and return the resulting draft
    pub fn apply(&self, action: FormAction) -> Self {
        let mut next = self.clone();
        match action {
            FormAction::SetProject(id) => next.project_id = id,
            FormAction::SetCategory(category) => next.category = category,
            FormAction::SetDescription(text) => next.description = text,
            FormAction::SetAmount(text) => next.single.amount = text,
            FormAction::SetQuantity(text) => next.single.quantity = text,
            FormAction::SetUnit(text) => next.single.unit = text,
            FormAction::SetStatus(text) => next.single.status = text,
            FormAction::SetSupplier(text) => next.supplier = text,
            FormAction::SetDate(date) => next.transaction_date = date,
            FormAction::SetLineItem { index, field, value } => match next.items.get_mut(index) {
                Some(item) => item.set(field, &value),
                None => log::debug!(target: "xonweb::form", "ignoring edit of missing row {}", index),
            },
            FormAction::SetItemStatus { index, status } => {
                if let Some(item) = next.items.get_mut(index) {
                    item.status = status;
                }
            }
            FormAction::AddLineItem => next.items.push(LineItemDraft::new()),
            FormAction::RemoveLineItem(index) => {
                if next.items.len() > 1 && index < next.items.len() {
                    next.items.remove(index);
                }
            }
            FormAction::ClearReceipt => next.receipt = None,
        }
        next
    }

    pub fn set_category(&self, category: Category) -> Self {
        self.apply(FormAction::SetCategory(category))
    }

    pub fn set_line_item(&self, index: usize, field: LineItemField, value: &str) -> Self {
        self.apply(FormAction::SetLineItem {
            index,
            field,
            value: value.to_string(),
        })
    }

    pub fn set_item_status(&self, index: usize, status: ItemStatus) -> Self {
        self.apply(FormAction::SetItemStatus { index, status })
    }

    pub fn add_line_item(&self) -> Self {
        self.apply(FormAction::AddLineItem)
    }

    /// Remove a row; the last remaining row stays
    pub fn remove_line_item(&self, index: usize) -> Self {
        self.apply(FormAction::RemoveLineItem(index))
    }

    /// Attach a receipt image as a base64 data URL
    pub fn attach_receipt(
        &self,
        bytes: &[u8],
        mime: &str,
        max_bytes: usize,
    ) -> Result<Self, ValidationError> {
        if bytes.len() > max_bytes {
            return Err(ValidationError::ReceiptTooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }
        let mut next = self.clone();
        next.receipt = Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)));
        Ok(next)
    }

    // ==================== Accessors ====================

    pub fn mode(&self) -> FormMode {
        if self.category.is_multi_item() {
            FormMode::MultiItem
        } else {
            FormMode::SingleAmount
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn single(&self) -> &SingleAmountFields {
        &self.single
    }

    pub fn items(&self) -> &[LineItemDraft] {
        &self.items
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn transaction_date(&self) -> NaiveDate {
        self.transaction_date
    }

    pub fn receipt(&self) -> Option<&str> {
        self.receipt.as_deref()
    }

    /// Sum of every row total, the amount of a materials transaction
    ///
    /// Saturates at the decimal range instead of overflowing.
    pub fn compute_total(&self) -> Decimal {
        self.items
            .iter()
            .fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.total()))
    }

    // ==================== Submission ====================

    /// Turn the draft into a request body, or report why it cannot be sent
    pub fn build_submission(&self) -> Result<TransactionSubmission, ValidationError> {
        let project_id = self.project_id.trim();
        if project_id.is_empty() {
            return Err(ValidationError::missing("project_id"));
        }

        match self.mode() {
            FormMode::MultiItem => self.build_multi_item(project_id),
            FormMode::SingleAmount => self.build_single_amount(project_id),
        }
    }

    fn build_multi_item(&self, project_id: &str) -> Result<TransactionSubmission, ValidationError> {
        let supplier = Some(self.supplier.trim()).filter(|s| !s.is_empty());
        let items: Vec<LineItem> = self
            .items
            .iter()
            .filter(|item| item.is_complete())
            .map(|item| item.to_line_item(supplier))
            .collect::<Result<_, _>>()?;

        if items.is_empty() {
            return Err(ValidationError::NoValidItems);
        }
        let dropped = self.items.len() - items.len();
        if dropped > 0 {
            log::debug!(target: "xonweb::form", "dropping {} incomplete rows", dropped);
        }

        let description = match self.description.trim() {
            "" => items
                .iter()
                .map(|item| item.description.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            text => text.to_string(),
        };

        let amount = items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.total))
            .ok_or_else(|| ValidationError::AmountOverflow {
                field: "amount".to_string(),
            })?;

        Ok(TransactionSubmission {
            project_id: project_id.to_string(),
            category: self.category.clone(),
            description,
            amount,
            items,
            quantity: None,
            unit: None,
            status: None,
            receipt: self.receipt.clone(),
            transaction_date: Some(self.transaction_date.format("%Y-%m-%d").to_string()),
        })
    }

    fn build_single_amount(&self, project_id: &str) -> Result<TransactionSubmission, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::missing("description"));
        }
        let amount = required_number("amount", &self.single.amount)?;
        let quantity = optional_number("quantity", &self.single.quantity)?;

        Ok(TransactionSubmission {
            project_id: project_id.to_string(),
            category: self.category.clone(),
            description: description.to_string(),
            amount,
            items: vec![],
            quantity,
            unit: non_empty(&self.single.unit),
            status: non_empty(&self.single.status),
            receipt: self.receipt.clone(),
            transaction_date: Some(self.transaction_date.format("%Y-%m-%d").to_string()),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim()).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required_number(field: &str, value: &str) -> Result<Decimal, ValidationError> {
    optional_number(field, value)?.ok_or_else(|| ValidationError::missing(field))
}

fn optional_number(field: &str, value: &str) -> Result<Option<Decimal>, ValidationError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_decimal(value)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Known names containing `input`, ignoring case
///
/// Nothing is suggested for empty input.
pub fn suggestions<'a>(known: &'a [String], input: &str) -> Vec<&'a str> {
    if input.is_empty() {
        return vec![];
    }
    known
        .iter()
        .filter(|name| contains_ignore_case(name, input))
        .map(String::as_str)
        .collect()
}
