//! Role-aware mobile navigation
//!
//! The menu is picked from an ordered rule table. Each rule pairs a
//! predicate over the user's roles and the current path context with a
//! fixed list of entries; the first matching rule wins and rules are never
//! combined. The last rule matches everything, so resolution is total.

use serde::Serialize;

use crate::types::{Role, RoleSet};

/// One navigation entry; order in a menu decides grid placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub icon_id: &'static str,
}

const fn entry(label: &'static str, path: &'static str, icon_id: &'static str) -> MenuEntry {
    MenuEntry {
        label,
        path,
        icon_id,
    }
}

impl MenuEntry {
    /// Whether this entry is highlighted for `current_path`
    ///
    /// The root entry only matches exactly, every other entry also matches
    /// any path it prefixes.
    pub fn is_active(&self, current_path: &str) -> bool {
        current_path == self.path || (self.path != "/" && current_path.starts_with(self.path))
    }
}

/// Section of the application a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavContext {
    Accounting,
    Planning,
    Supervisor,
    Inventory,
    None,
}

impl NavContext {
    pub fn classify(path: &str) -> Self {
        if path.starts_with("/accounting") {
            NavContext::Accounting
        } else if path.starts_with("/planning") && !path.starts_with("/planning-projects") {
            NavContext::Planning
        } else if path.starts_with("/supervisor") {
            NavContext::Supervisor
        } else if path.starts_with("/inventory") {
            NavContext::Inventory
        } else {
            NavContext::None
        }
    }
}

// ==================== Menus ====================

const SETTINGS: MenuEntry = entry("Settings", "/settings", "settings");
const ADMIN_HOME: MenuEntry = entry("Admin", "/admin", "home");

pub const ADMIN_ACCOUNTING_MENU: &[MenuEntry] = &[
    ADMIN_HOME,
    entry("Keuangan", "/accounting", "credit-card"),
    SETTINGS,
];

pub const ADMIN_PLANNING_MENU: &[MenuEntry] = &[
    ADMIN_HOME,
    entry("Perencanaan", "/planning", "folder-open"),
    entry("RAB", "/planning/rab", "file-text"),
    SETTINGS,
];

pub const ADMIN_SUPERVISOR_MENU: &[MenuEntry] = &[
    ADMIN_HOME,
    entry("Pengawas", "/supervisor", "check-square"),
    entry("Schedule", "/supervisor/schedule", "calendar"),
    SETTINGS,
];

pub const ADMIN_INVENTORY_MENU: &[MenuEntry] = &[
    ADMIN_HOME,
    entry("Inventory", "/inventory", "package"),
    SETTINGS,
];

pub const ADMIN_MENU: &[MenuEntry] = &[
    entry("Dashboard", "/admin", "home"),
    entry("Proyek", "/admin/planning-projects", "folder-open"),
    entry("Anggota", "/admin/members", "users"),
    entry("Inventory", "/admin/inventory", "package"),
    entry("Settings", "/admin/settings", "settings"),
];

pub const ACCOUNTING_MENU: &[MenuEntry] = &[
    entry("Dashboard", "/accounting", "home"),
    entry("Proyek", "/accounting/projects", "folder-open"),
    entry("Transaksi", "/accounting/transactions", "credit-card"),
    SETTINGS,
];

pub const PLANNING_MENU: &[MenuEntry] = &[
    entry("Dashboard", "/planning", "home"),
    entry("RAB", "/planning/rab", "file-text"),
    entry("Schedule", "/planning/schedule", "calendar"),
    SETTINGS,
];

pub const SUPERVISOR_MENU: &[MenuEntry] = &[
    entry("Dashboard", "/supervisor", "home"),
    entry("Schedule", "/supervisor/schedule", "calendar"),
    entry("Proyek", "/supervisor/projects", "folder-open"),
    SETTINGS,
];

pub const INVENTORY_MENU: &[MenuEntry] = &[
    entry("Dashboard", "/inventory", "home"),
    entry("Stok", "/inventory/stock", "package"),
    SETTINGS,
];

pub const FALLBACK_MENU: &[MenuEntry] = &[entry("Home", "/", "home"), SETTINGS];

// ==================== Rule table ====================

/// One row of the resolution table
pub struct MenuRule {
    pub name: &'static str,
    matches: fn(&RoleSet, NavContext) -> bool,
    pub entries: &'static [MenuEntry],
}

impl MenuRule {
    pub fn matches(&self, roles: &RoleSet, context: NavContext) -> bool {
        (self.matches)(roles, context)
    }
}

fn admin_in(roles: &RoleSet, context: NavContext, wanted: NavContext) -> bool {
    roles.contains(Role::Admin) && context == wanted
}

fn admin_accounting(roles: &RoleSet, context: NavContext) -> bool {
    admin_in(roles, context, NavContext::Accounting)
}

fn admin_planning(roles: &RoleSet, context: NavContext) -> bool {
    admin_in(roles, context, NavContext::Planning)
}

fn admin_supervisor(roles: &RoleSet, context: NavContext) -> bool {
    admin_in(roles, context, NavContext::Supervisor)
}

fn admin_inventory(roles: &RoleSet, context: NavContext) -> bool {
    admin_in(roles, context, NavContext::Inventory)
}

fn admin(roles: &RoleSet, _: NavContext) -> bool {
    roles.contains(Role::Admin)
}

fn accounting(roles: &RoleSet, _: NavContext) -> bool {
    roles.contains(Role::Accounting)
}

fn planning(roles: &RoleSet, _: NavContext) -> bool {
    roles.contains(Role::ProjectPlanningTeam)
}

fn supervisor(roles: &RoleSet, _: NavContext) -> bool {
    roles.contains(Role::SiteSupervisor)
}

fn inventory(roles: &RoleSet, _: NavContext) -> bool {
    roles.contains(Role::Inventory)
}

fn anyone(_: &RoleSet, _: NavContext) -> bool {
    true
}

/// Evaluated top to bottom, first match wins
pub static MENU_RULES: [MenuRule; 10] = [
    MenuRule { name: "admin-accounting", matches: admin_accounting, entries: ADMIN_ACCOUNTING_MENU },
    MenuRule { name: "admin-planning", matches: admin_planning, entries: ADMIN_PLANNING_MENU },
    MenuRule { name: "admin-supervisor", matches: admin_supervisor, entries: ADMIN_SUPERVISOR_MENU },
    MenuRule { name: "admin-inventory", matches: admin_inventory, entries: ADMIN_INVENTORY_MENU },
    MenuRule { name: "admin", matches: admin, entries: ADMIN_MENU },
    MenuRule { name: "accounting", matches: accounting, entries: ACCOUNTING_MENU },
    MenuRule { name: "planning", matches: planning, entries: PLANNING_MENU },
    MenuRule { name: "supervisor", matches: supervisor, entries: SUPERVISOR_MENU },
    MenuRule { name: "inventory", matches: inventory, entries: INVENTORY_MENU },
    MenuRule { name: "fallback", matches: anyone, entries: FALLBACK_MENU },
];

/// Resolve the navigation entries for a role set and the current path
pub fn resolve(roles: &RoleSet, current_path: &str) -> Vec<MenuEntry> {
    let context = NavContext::classify(current_path);
    MENU_RULES
        .iter()
        .find(|rule| rule.matches(roles, context))
        .map(|rule| {
            log::trace!(target: "xonweb::navigation", "path {} resolved by rule {}", current_path, rule.name);
            rule.entries.to_vec()
        })
        .unwrap_or_default()
}

// ==================== View model ====================

/// Entry paired with its highlight state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    #[serde(flatten)]
    pub entry: MenuEntry,
    pub active: bool,
}

/// Everything the bottom navigation bar needs to draw itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationView {
    pub items: Vec<NavItem>,
    /// Grid columns; zero means nothing is drawn
    pub columns: usize,
    /// Header title: label of the first active entry
    pub title: &'static str,
}

impl NavigationView {
    pub fn build(roles: &RoleSet, current_path: &str) -> Self {
        Self::from_entries(resolve(roles, current_path), current_path)
    }

    pub fn from_entries(entries: Vec<MenuEntry>, current_path: &str) -> Self {
        let items: Vec<NavItem> = entries
            .into_iter()
            .map(|entry| NavItem {
                active: entry.is_active(current_path),
                entry,
            })
            .collect();
        let title = items
            .iter()
            .find(|item| item.active)
            .map(|item| item.entry.label)
            .unwrap_or("Dashboard");

        Self {
            columns: items.len(),
            items,
            title,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
