pub mod age_verification;
pub mod audit;
pub mod models;
pub mod premium;
pub mod report;
pub mod sanctions;
pub mod ticket;
pub mod unban;

use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::User;
use luna_store::Collection;

pub(crate) async fn require_user(users: &Collection<User>, user_id: i64) -> AppResult<User> {
    users.get(&user_id).await?.ok_or_else(|| {
        AppError::new(ErrorCode::UserNotFound, format!("user {user_id} not found"))
    })
}

#[cfg(test)]
pub(crate) mod testutil {
    use luna_shared::types::{Gender, User};
    use luna_store::Collection;

    use crate::models::{AgeVerificationRequest, PremiumRequest, Report, Ticket, UnbanRequest};

    pub struct Fixture {
        pub _dir: tempfile::TempDir,
        pub users: Collection<User>,
        pub premium_requests: Collection<PremiumRequest>,
        pub reports: Collection<Report>,
        pub age_requests: Collection<AgeVerificationRequest>,
        pub unban_requests: Collection<UnbanRequest>,
        pub tickets: Collection<Ticket>,
    }

    pub fn test_user(id: i64) -> User {
        User {
            id,
            username: format!("user{id}"),
            name: format!("User {id}"),
            email: format!("user{id}@example.com"),
            age: 25,
            gender: Gender::Female,
            bio: String::new(),
            photo_urls: vec![],
            is_verified: false,
            is_premium: false,
            is_blocked: false,
            ban_reason: None,
            is_age_verified: false,
            age_verification_request_id: None,
            last_login: 0,
            share_location: false,
            location: None,
            city: None,
        }
    }

    pub async fn fixture(user_ids: &[i64]) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let users = Collection::<User>::open(dir.path()).await.unwrap();
        for &id in user_ids {
            users.create(test_user(id)).await.unwrap();
        }

        Fixture {
            users,
            premium_requests: Collection::open(dir.path()).await.unwrap(),
            reports: Collection::open(dir.path()).await.unwrap(),
            age_requests: Collection::open(dir.path()).await.unwrap(),
            unban_requests: Collection::open(dir.path()).await.unwrap(),
            tickets: Collection::open(dir.path()).await.unwrap(),
            _dir: dir,
        }
    }
}
