//! The flat RBAC interface.

/// Flat role-based access control.
///
/// Users hold roles, roles hold permissions, and a user is allowed a
/// permission when any of their roles holds it. There is no role hierarchy.
///
/// Removing an assignment or permission that does not exist is a no-op.
pub trait FlatRbac<U, R, P> {
    /// Gives `role` to `user`.
    fn assign(&mut self, user: U, role: R);

    /// Takes `role` away from `user`, leaving their other roles.
    fn unassign(&mut self, user: &U, role: &R);

    /// Grants `permission` to `role`.
    fn permit(&mut self, role: R, permission: P);

    /// Withdraws `permission` from `role`.
    fn revoke(&mut self, role: &R, permission: &P);

    /// Whether `role` holds `permission`.
    fn allows(&self, role: &R, permission: &P) -> bool;

    /// Roles currently assigned to `user`, in no particular order.
    fn assigned_roles(&self, user: &U) -> Vec<R>;

    /// Whether any role of `user` allows `permission`.
    fn allowed(&self, user: &U, permission: &P) -> bool {
        self.assigned_roles(user)
            .iter()
            .any(|role| self.allows(role, permission))
    }
}
