//! The access scoping engine: pure functions from a verified identity (plus
//! the startup policy) to the predicate a store operation is allowed to run
//! under. Handlers never build their own row filters.

use crate::access::identity::{Identity, Role, ROOT_MASTER_ID};
use crate::config::PolicyConfig;

/// Which reservation rows an identity may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationScope {
    /// Every row.
    All,
    /// Rows created by the admin itself or by any user it parents.
    Subtree(i64),
    /// Rows created by the user itself or by its parent admin. The parent id
    /// is resolved against the account table at query time, not taken from
    /// the client.
    SelfAndParent(i64),
}

/// Which accounts an identity may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountListScope {
    /// All accounts of the requested role.
    ByRole(Role),
    /// Users parented to the given admin.
    UsersOf(i64),
}

/// Which accounts an identity may delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountDeleteScope {
    Any,
    UsersOf(i64),
}

/// Permission to provision one account: the role to create and the parent the
/// new account is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreationGrant {
    pub role: Role,
    pub parent_id: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("not permitted: {0}")]
    Forbidden(&'static str),
    #[error("an explicit role filter is required")]
    MissingRoleFilter,
}

fn require(identity: Option<&Identity>) -> Result<&Identity, AccessError> {
    identity.ok_or(AccessError::Unauthenticated)
}

pub fn reservation_read_scope(
    identity: Option<&Identity>,
) -> Result<ReservationScope, AccessError> {
    let identity = require(identity)?;
    Ok(match identity.role {
        Role::Master => ReservationScope::All,
        Role::Admin => ReservationScope::Subtree(identity.id),
        Role::User => ReservationScope::SelfAndParent(identity.id),
    })
}

pub fn reservation_write_scope(
    identity: Option<&Identity>,
    policy: &PolicyConfig,
) -> Result<ReservationScope, AccessError> {
    let identity = require(identity)?;
    match identity.role {
        Role::Master if policy.master_can_manage_reservations => Ok(ReservationScope::All),
        Role::Master => Err(AccessError::Forbidden(
            "master accounts are read-only for reservations",
        )),
        Role::Admin => Ok(ReservationScope::Subtree(identity.id)),
        Role::User => Err(AccessError::Forbidden(
            "user accounts are read-only for reservations",
        )),
    }
}

pub fn account_list_scope(
    identity: Option<&Identity>,
    role_filter: Option<Role>,
) -> Result<AccountListScope, AccessError> {
    let identity = require(identity)?;
    let role = role_filter.ok_or(AccessError::MissingRoleFilter)?;
    match identity.role {
        Role::Master => Ok(AccountListScope::ByRole(role)),
        Role::Admin if role == Role::User => Ok(AccountListScope::UsersOf(identity.id)),
        Role::Admin => Err(AccessError::Forbidden("admins may only list user accounts")),
        Role::User => Err(AccessError::Forbidden("users may not list accounts")),
    }
}

pub fn admin_creation_grant(
    identity: Option<&Identity>,
    policy: &PolicyConfig,
) -> Result<CreationGrant, AccessError> {
    let identity = require(identity)?;
    if !identity.role.may_create(Role::Admin) {
        return Err(AccessError::Forbidden("only master may create admins"));
    }
    let parent_id = if policy.admin_creation_restricted_to_root_master {
        ROOT_MASTER_ID
    } else {
        identity.id
    };
    Ok(CreationGrant {
        role: Role::Admin,
        parent_id,
    })
}

pub fn user_creation_grant(identity: Option<&Identity>) -> Result<CreationGrant, AccessError> {
    let identity = require(identity)?;
    if !identity.role.may_create(Role::User) {
        return Err(AccessError::Forbidden(
            "only master or admin may create users",
        ));
    }
    Ok(CreationGrant {
        role: Role::User,
        parent_id: identity.id,
    })
}

pub fn account_delete_scope(
    identity: Option<&Identity>,
) -> Result<AccountDeleteScope, AccessError> {
    let identity = require(identity)?;
    match identity.role {
        Role::Master => Ok(AccountDeleteScope::Any),
        Role::Admin => Ok(AccountDeleteScope::UsersOf(identity.id)),
        Role::User => Err(AccessError::Forbidden("users may not delete accounts")),
    }
}
