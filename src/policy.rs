use crate::{
    auth::Claims,
    error::ApiError,
    models::{AccountStatus, Role},
};

/// ScopedResource
///
/// The record families whose visibility depends on the caller's role. Airlines
/// are deliberately absent: they are global reference data, readable by every
/// authenticated caller and writable only through the admin router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopedResource {
    Sales,
    Payments,
    Suppliers,
}

/// ScopeFilter
///
/// The residual filter a role leaves behind after the allow/deny decision.
/// Out-of-scope records are never rejected with a 403 — they simply fall outside
/// the filter, so a by-id lookup on another office's record is observably
/// identical to a lookup on a record that does not exist (404). This avoids
/// leaking the existence of records the caller may not see.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeFilter {
    /// No restriction (super-admin).
    Unrestricted,
    /// Restricted to records whose `office_id` matches.
    Office(String),
    /// Restricted to records whose `created_by` matches.
    CreatedBy(String),
}

/// scope_for
///
/// The single decision function mapping (claims, resource) to a scope filter, as
/// an exhaustive match over the closed role enumeration.
///
/// The account-status gate comes first: a non-active status in the claims denies
/// everything regardless of role. Note that the decision is based on the claims
/// *as embedded in the token* — role or status changes after issuance are only
/// picked up by the admin/super-admin middlewares (which re-fetch the account)
/// and by the refresh flow, everywhere else the stale claims hold until expiry.
pub fn scope_for(claims: &Claims, resource: ScopedResource) -> Result<ScopeFilter, ApiError> {
    if claims.status != AccountStatus::Active {
        return Err(ApiError::AccountInactive);
    }

    match (claims.role, resource) {
        (Role::SuperAdmin, _) => Ok(ScopeFilter::Unrestricted),

        (Role::OfficeAdmin, _) => Ok(ScopeFilter::Office(claims.office_id.clone())),

        // Agents only ever reach sales they created themselves.
        (Role::Agent, ScopedResource::Sales) => Ok(ScopeFilter::CreatedBy(claims.email.clone())),
        // Payments are forbidden for agents outright; this is the one case where
        // the caller sees a 403 rather than an empty scope.
        (Role::Agent, ScopedResource::Payments) => Err(ApiError::Forbidden("NOT ADMIN")),
        // Suppliers are office-shared reference data.
        (Role::Agent, ScopedResource::Suppliers) => {
            Ok(ScopeFilter::Office(claims.office_id.clone()))
        }
    }
}
