pub mod claims;
pub mod extractors;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod policy;

pub use claims::Claims;
pub use extractors::AuthUser;
pub use jwt::JwtKeys;
