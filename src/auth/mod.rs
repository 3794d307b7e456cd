// Session-cookie authentication: the server issues an opaque token on join
// and persists it on the player row.

mod extractors;

pub use extractors::SessionKey;

/// Cookie carrying the opaque server-issued session token.
pub const SESSION_COOKIE: &str = "session_key";
