use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::debug;

use crate::flat::FlatRbac;

/// In-memory [`FlatRbac`] backed by hash maps.
///
/// Not synchronized; wrap it in a lock to share between threads.
#[derive(Debug, Clone)]
pub struct MemoryRbac<U, R, P> {
    roles: HashMap<U, HashSet<R>>,
    permissions: HashMap<R, HashSet<P>>,
}

impl<U, R, P> Default for MemoryRbac<U, R, P> {
    fn default() -> Self {
        Self {
            roles: HashMap::new(),
            permissions: HashMap::new(),
        }
    }
}

impl<U, R, P> MemoryRbac<U, R, P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users holding at least one role.
    pub fn user_count(&self) -> usize {
        self.roles.len()
    }
}

impl<U, R, P> FlatRbac<U, R, P> for MemoryRbac<U, R, P>
where
    U: Eq + Hash,
    R: Eq + Hash + Clone,
    P: Eq + Hash,
{
    fn assign(&mut self, user: U, role: R) {
        self.roles.entry(user).or_default().insert(role);
    }

    fn unassign(&mut self, user: &U, role: &R) {
        if let Some(roles) = self.roles.get_mut(user) {
            roles.remove(role);
            if roles.is_empty() {
                self.roles.remove(user);
            }
        }
    }

    fn permit(&mut self, role: R, permission: P) {
        self.permissions.entry(role).or_default().insert(permission);
    }

    fn revoke(&mut self, role: &R, permission: &P) {
        if let Some(perms) = self.permissions.get_mut(role) {
            perms.remove(permission);
            if perms.is_empty() {
                self.permissions.remove(role);
            }
        }
    }

    fn allows(&self, role: &R, permission: &P) -> bool {
        self.permissions
            .get(role)
            .is_some_and(|perms| perms.contains(permission))
    }

    fn assigned_roles(&self, user: &U) -> Vec<R> {
        self.roles
            .get(user)
            .map(|roles| roles.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn allowed(&self, user: &U, permission: &P) -> bool {
        let allowed = self
            .roles
            .get(user)
            .is_some_and(|roles| roles.iter().any(|role| self.allows(role, permission)));
        if !allowed {
            debug!("permission denied");
        }
        allowed
    }
}
