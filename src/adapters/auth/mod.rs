//! Authentication adapters.
//!
//! Implementations of the `SessionValidator` port:
//!
//! - `jwt` - Production HS256 access-token validation
//! - `mock` - Test implementation that doesn't require signed tokens

mod jwt;
mod mock;

pub use jwt::{AccessClaims, JwtConfig, JwtSessionValidator, JWT_ALGORITHM};
pub use mock::MockSessionValidator;
