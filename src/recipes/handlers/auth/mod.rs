//! Authentication.
//!
//! Two channels that never mix:
//! - Sessions: `/signin` sets an opaque cookie whose SHA-256 is stored; the
//!   [`Session`] extractor resolves it for mutating routes.
//! - Bearer tokens: HS256 tokens renewed through `/refresh` when they are
//!   about to expire.

pub mod gate;
pub mod password;
pub mod refresh;
pub mod session;
mod state;
pub mod token;
pub mod types;
mod utils;

pub use gate::Session;
pub use state::{AuthConfig, AuthState};
pub use token::{AuthClaims, IssuedToken, RefreshError, TokenSigner};
pub use types::{MessageResponse, SignInRequest, TokenResponse};
