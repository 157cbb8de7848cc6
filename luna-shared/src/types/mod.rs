pub mod identity;
pub mod user;

pub use identity::IdentityAssertion;
pub use user::{Gender, GeoPoint, User, UserPatch};

/// Current time as unix milliseconds, the timestamp representation every
/// persisted entity uses.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
