//! Permission grants and single-label resolution
//!
//! This module implements the permission side of tables:
//! - Four grantable actions per table
//! - Grant seeding at table creation (creator + administrators principal)
//! - Collapsing a viewer's action set to the single highest-privilege label
//!
//! The grant storage itself sits behind [`PermissionStore`]; only its
//! read/write contract is used here.

use crate::store::error::StoreResult;
use crate::store::interface::PermissionStore;
use crate::types::{GroupId, TableId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Grantable actions on a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionAction {
    /// Read the table and its entries
    ViewTable,
    /// Edit the table schema
    ChangeTable,
    /// Delete the table
    DeleteTable,
    /// Create, edit, and delete entries
    UpdateContent,
}

impl PermissionAction {
    /// All grantable actions, in seeding order
    pub const ALL: [PermissionAction; 4] = [
        PermissionAction::ViewTable,
        PermissionAction::ChangeTable,
        PermissionAction::DeleteTable,
        PermissionAction::UpdateContent,
    ];

    /// Wire label for this action
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::ViewTable => "view_table",
            PermissionAction::ChangeTable => "change_table",
            PermissionAction::DeleteTable => "delete_table",
            PermissionAction::UpdateContent => "update_content",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A grantee: either a single user or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Principal {
    /// A single user
    User(UserId),
    /// A group of users
    Group(GroupId),
}

/// Priority-ordered effective privilege on a table
///
/// Derive order is the privilege order, lowest first, so the maximum of a
/// set is the effective level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PermissionLevel {
    /// No privilege
    None,
    /// May view
    View,
    /// May edit entries
    UpdateContent,
    /// May edit the schema
    Change,
}

impl PermissionLevel {
    /// External label; the empty string stands for no privilege
    pub fn label(&self) -> &'static str {
        match self {
            PermissionLevel::None => "",
            PermissionLevel::View => "view_table",
            PermissionLevel::UpdateContent => "update_content",
            PermissionLevel::Change => "change_table",
        }
    }

    fn from_action(action: PermissionAction) -> PermissionLevel {
        match action {
            PermissionAction::ChangeTable => PermissionLevel::Change,
            PermissionAction::UpdateContent => PermissionLevel::UpdateContent,
            PermissionAction::ViewTable => PermissionLevel::View,
            // delete_table grants no read-side label of its own
            PermissionAction::DeleteTable => PermissionLevel::None,
        }
    }
}

/// Seeds creation grants and resolves effective permission labels
#[derive(Clone)]
pub struct PermissionResolver {
    store: Arc<dyn PermissionStore>,
    admins_group: GroupId,
}

impl PermissionResolver {
    /// Create a resolver over a permission store
    ///
    /// `admins_group` is the injected administrators principal; every
    /// creation grant is mirrored to it.
    pub fn new(store: Arc<dyn PermissionStore>, admins_group: GroupId) -> Self {
        Self {
            store,
            admins_group,
        }
    }

    /// Seed the creation grants for a new table
    ///
    /// Exactly four actions, each assigned to the creator and to the
    /// administrators group. Invoked once, at table creation.
    pub fn seed_table_grants(&self, table_id: TableId, creator: UserId) -> StoreResult<()> {
        for action in PermissionAction::ALL {
            self.store
                .assign(action, Principal::User(creator), table_id)?;
            self.store
                .assign(action, Principal::Group(self.admins_group), table_id)?;
        }
        log::debug!(
            "seeded {} grants on table {} for user {}",
            PermissionAction::ALL.len() * 2,
            table_id,
            creator
        );
        Ok(())
    }

    /// Collapse a viewer's permission set to the single highest level
    ///
    /// Priority: change_table > update_content > view_table > none. A
    /// missing viewer resolves to `None` without consulting the store.
    pub fn effective_permission(
        &self,
        viewer: Option<UserId>,
        table_id: TableId,
    ) -> StoreResult<PermissionLevel> {
        let viewer = match viewer {
            Some(viewer) => viewer,
            None => return Ok(PermissionLevel::None),
        };

        let perms = self.store.check_perms(viewer, table_id)?;
        Ok(perms
            .into_iter()
            .map(PermissionLevel::from_action)
            .max()
            .unwrap_or(PermissionLevel::None))
    }

    /// External representation: a one-element list holding the label (or
    /// the empty string), for shape-uniformity with multi-permission
    /// variants
    pub fn permission_labels(
        &self,
        viewer: Option<UserId>,
        table_id: TableId,
    ) -> StoreResult<Vec<String>> {
        let level = self.effective_permission(viewer, table_id)?;
        Ok(vec![level.label().to_string()])
    }
}
