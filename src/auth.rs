//! Auth-domain identifiers, secrets, access grants, permissions, and callback state.

pub mod callback;
pub mod grant;
pub mod id;
pub mod permission;
pub mod secret;

pub use callback::*;
pub use grant::*;
pub use id::*;
pub use permission::*;
pub use secret::*;
