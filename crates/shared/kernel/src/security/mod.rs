//! Authorization checks consumed by the route handlers.
//!
//! Authentication is out of scope here: handlers receive an already identified caller and
//! only ask whether that user holds a permission or a role.

use fxhash::{FxHashMap, FxHashSet};
use std::collections::HashMap;
use std::fmt::Debug;
use stratus_domain::config::SecurityConfig;

pub trait AccessControl: Debug + Send + Sync {
    fn has_permission(&self, user_id: &str, permission: &str) -> bool;

    fn has_role(&self, user_id: &str, role: &str) -> bool;
}

/// Grants read from [`SecurityConfig`]: users hold roles, roles hold permissions.
#[derive(Debug, Clone, Default)]
pub struct StaticAccessControl {
    users: FxHashMap<String, FxHashSet<String>>,
    roles: FxHashMap<String, FxHashSet<String>>,
}

impl StaticAccessControl {
    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self { users: index(&config.users), roles: index(&config.roles) }
    }

    /// Adds `role` to `user_id`.
    #[must_use]
    pub fn grant_role(mut self, user_id: impl Into<String>, role: impl Into<String>) -> Self {
        self.users.entry(user_id.into()).or_default().insert(role.into());
        self
    }

    /// Adds `permission` to `role`.
    #[must_use]
    pub fn grant_permission(mut self, role: impl Into<String>, permission: impl Into<String>) -> Self {
        self.roles.entry(role.into()).or_default().insert(permission.into());
        self
    }
}

fn index(grants: &HashMap<String, Vec<String>>) -> FxHashMap<String, FxHashSet<String>> {
    grants.iter().map(|(key, values)| (key.clone(), values.iter().cloned().collect())).collect()
}

impl AccessControl for StaticAccessControl {
    fn has_permission(&self, user_id: &str, permission: &str) -> bool {
        self.users.get(user_id).is_some_and(|roles| {
            roles.iter().any(|role| {
                self.roles.get(role).is_some_and(|granted| granted.contains(permission))
            })
        })
    }

    fn has_role(&self, user_id: &str, role: &str) -> bool {
        self.users.get(user_id).is_some_and(|roles| roles.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stratus_domain::constants::{ADMIN_ROLE, MANAGE_CLOUD, REGISTER_ON_CLOUD};

    #[test]
    fn permissions_flow_through_roles() {
        let mut config = SecurityConfig::default();
        config.users.insert("alice".to_owned(), vec![ADMIN_ROLE.to_owned()]);
        config.users.insert("bob".to_owned(), vec!["operator".to_owned()]);
        config.roles.insert("operator".to_owned(), vec![MANAGE_CLOUD.to_owned()]);

        let access = StaticAccessControl::from_config(&config);

        assert!(access.has_permission("alice", REGISTER_ON_CLOUD));
        assert!(access.has_permission("alice", MANAGE_CLOUD));
        assert!(access.has_role("alice", ADMIN_ROLE));

        assert!(access.has_permission("bob", MANAGE_CLOUD));
        assert!(!access.has_permission("bob", REGISTER_ON_CLOUD));
        assert!(!access.has_role("bob", ADMIN_ROLE));
    }

    #[test]
    fn unknown_users_hold_nothing() {
        let access = StaticAccessControl::default().grant_permission(ADMIN_ROLE, MANAGE_CLOUD);

        assert!(!access.has_permission("mallory", MANAGE_CLOUD));
        assert!(!access.has_role("mallory", ADMIN_ROLE));

        let access = access.grant_role("mallory", ADMIN_ROLE);
        assert!(access.has_permission("mallory", MANAGE_CLOUD));
    }
}
