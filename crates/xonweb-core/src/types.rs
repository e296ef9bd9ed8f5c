//! Enumerated values shared by the models, the navigation and the form

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CoreError, CoreResult};

// ==================== Roles ====================

/// Named capability grouping controlling navigation and data visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Accounting,
    ProjectPlanningTeam,
    SiteSupervisor,
    Inventory,
    Employee,
    Estimator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Accounting => "accounting",
            Role::ProjectPlanningTeam => "project_planning_team",
            Role::SiteSupervisor => "site_supervisor",
            Role::Inventory => "inventory",
            Role::Employee => "employee",
            Role::Estimator => "estimator",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "accounting" => Ok(Role::Accounting),
            "project_planning_team" => Ok(Role::ProjectPlanningTeam),
            "site_supervisor" => Ok(Role::SiteSupervisor),
            "inventory" => Ok(Role::Inventory),
            "employee" => Ok(Role::Employee),
            "estimator" => Ok(Role::Estimator),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Effective set of roles held by a user
///
/// Built from the multi-role list plus the primary role. Unknown role names
/// and an empty primary role contribute nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine a primary role field with a list of additional role names
    pub fn from_names<'a, I>(primary: Option<&'a str>, roles: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut set = BTreeSet::new();
        for name in primary.into_iter().chain(roles) {
            if name.trim().is_empty() {
                continue;
            }
            match name.parse::<Role>() {
                Ok(role) => {
                    set.insert(role);
                }
                Err(_) => log::debug!(target: "xonweb::roles", "ignoring unknown role {:?}", name),
            }
        }
        RoleSet(set)
    }

    /// Parse role names typed by a user; unknown names are rejected
    pub fn parse_list<'a, I>(names: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .map(|name| {
                name.parse::<Role>().map_err(|_| CoreError::InvalidValue {
                    kind: "role".to_string(),
                    value: name.to_string(),
                })
            })
            .collect()
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        RoleSet(iter.into_iter().collect())
    }
}

// ==================== Transaction categories ====================

/// Transaction classification; decides the form shape and the amount sign
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Cash in
    KasMasuk,
    /// Legacy spelling of cash in, still returned by older records
    UangMasuk,
    /// Materials, entered as line items
    Bahan,
    /// Wages
    Upah,
    /// Tools
    Alat,
    Vendor,
    Operasional,
    /// Assets, carry a free-text status
    Aset,
    /// Debt
    Hutang,
    /// Any category this client does not know about
    Other(String),
}

impl Category {
    /// Categories offered when creating a transaction
    pub const SELECTABLE: [Category; 8] = [
        Category::KasMasuk,
        Category::Bahan,
        Category::Upah,
        Category::Alat,
        Category::Vendor,
        Category::Operasional,
        Category::Aset,
        Category::Hutang,
    ];

    /// Parse a category a new transaction may be filed under
    pub fn parse_selectable(s: &str) -> CoreResult<Self> {
        let category = Category::from(s.trim().to_lowercase());
        if Category::SELECTABLE.contains(&category) {
            Ok(category)
        } else {
            Err(CoreError::InvalidValue {
                kind: "category".to_string(),
                value: s.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Category::KasMasuk => "kas_masuk",
            Category::UangMasuk => "uang_masuk",
            Category::Bahan => "bahan",
            Category::Upah => "upah",
            Category::Alat => "alat",
            Category::Vendor => "vendor",
            Category::Operasional => "operasional",
            Category::Aset => "aset",
            Category::Hutang => "hutang",
            Category::Other(name) => name,
        }
    }

    /// Display label
    pub fn label(&self) -> String {
        match self {
            Category::KasMasuk | Category::UangMasuk => "Kas Masuk".to_string(),
            other => {
                let name = other.as_str();
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Income categories add to the balance, everything else is an expense
    pub fn is_income(&self) -> bool {
        matches!(self, Category::KasMasuk | Category::UangMasuk)
    }

    /// Materials are entered as a list of line items
    pub fn is_multi_item(&self) -> bool {
        matches!(self, Category::Bahan)
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::KasMasuk
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "kas_masuk" => Category::KasMasuk,
            "uang_masuk" => Category::UangMasuk,
            "bahan" => Category::Bahan,
            "upah" => Category::Upah,
            "alat" => Category::Alat,
            "vendor" => Category::Vendor,
            "operasional" => Category::Operasional,
            "aset" => Category::Aset,
            "hutang" => Category::Hutang,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Category::from(s.trim().to_lowercase()) {
            Category::Other(name) => Err(format!("Invalid category: {}", name)),
            known => Ok(known),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==================== Line item status ====================

/// Where a purchased material currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Received into the warehouse
    Receiving,
    /// Bought but not in the warehouse
    OutWarehouse,
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Receiving
    }
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Receiving => "receiving",
            ItemStatus::OutWarehouse => "out_warehouse",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receiving" => Ok(ItemStatus::Receiving),
            "out_warehouse" | "out-warehouse" => Ok(ItemStatus::OutWarehouse),
            _ => Err(format!("Invalid item status: {}", s)),
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==================== Tasks ====================

/// Task progress state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "in-progress" => Ok(TaskStatus::InProgress),
            "completed" | "done" => Ok(TaskStatus::Completed),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Medium
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}
