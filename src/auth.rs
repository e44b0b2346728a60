//! Auth-domain identifiers, credentials, and the access-token model.

pub mod credentials;
pub mod id;
pub mod token;

pub use credentials::*;
pub use id::*;
pub use token::*;
