pub mod identity;
pub mod scope;

pub use identity::{Identity, Role, ROOT_MASTER_ID};
pub use scope::{
    AccessError, AccountDeleteScope, AccountListScope, CreationGrant, ReservationScope,
};
