pub mod password;
pub mod policy;
pub mod token;

pub use password::{PasswordError, PasswordHasher};
pub use policy::{authorize, authorize_or_conceal, Action, Decision, Owned};
pub use token::{AuthError, Claims, TokenPair, TokenService, TokenType, VerificationError};
