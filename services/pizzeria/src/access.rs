//! Role-based access control gate
//!
//! A pure table mapping (role, action) to allow/deny. The session
//! controller consults it on every dispatch with a freshly loaded role,
//! so a role change mid-session takes effect on the next action. Denied
//! actions never reach a repository.

use crate::models::Role;

/// Every action a session can request after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewProfile,
    UpdateProfile,
    ViewMenu,
    ViewStores,
    PlaceOrder,
    ViewOwnOrders,
    ViewAllOrders,
    ViewRecentOrders,
    ViewOrderDetail,
    UpdateOrderStatus,
    UpdateMenu,
    UpdateUser,
}

/// Decide whether `role` may perform `action`.
///
/// Customers may still request `ViewOrderDetail`; the order repository
/// narrows their view to their own orders.
pub fn is_allowed(role: Role, action: Action) -> bool {
    use Action::*;

    match action {
        ViewProfile | UpdateProfile | ViewMenu | ViewStores | PlaceOrder | ViewOwnOrders
        | ViewOrderDetail => true,
        ViewAllOrders | ViewRecentOrders | UpdateOrderStatus => {
            matches!(role, Role::Driver | Role::Manager)
        }
        UpdateMenu | UpdateUser => matches!(role, Role::Manager),
    }
}
