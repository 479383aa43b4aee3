/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// so access control is applied explicitly at the module level (via Axum
/// layers) rather than remembered per-handler. Each module maps to one tier of
/// the role hierarchy.

/// Routes accessible without a token: health, login, refresh.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware. The role policy
/// scopes what the caller can see; it never widens access.
pub mod authenticated;

/// Routes restricted to office admins and super-admins. The admin middleware
/// re-validates the caller against current account state.
pub mod admin;

/// Routes restricted exclusively to super-admins: account management.
pub mod super_admin;
