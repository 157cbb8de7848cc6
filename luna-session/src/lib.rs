pub mod notifications;
pub mod registration;

use std::path::Path;

use luna_shared::errors::AppResult;
use luna_shared::types::User;
use luna_store::{Collection, StoreConfig};

use luna_matching::Rating;
use luna_moderation::models::{
    AgeVerificationRequest, PremiumRequest, Report, Ticket, UnbanRequest,
};

pub use notifications::{
    login_notifications, start_session, LoginNotification, NotificationAction, NotificationKind,
    SessionStart,
};
pub use registration::{register, RegistrationForm, MIN_AGE};

/// The facade the presentation layer links against: one durable collection
/// per entity type, all opened from the same data directory.
pub struct Core {
    pub users: Collection<User>,
    pub ratings: Collection<Rating>,
    pub tickets: Collection<Ticket>,
    pub premium_requests: Collection<PremiumRequest>,
    pub reports: Collection<Report>,
    pub age_verification_requests: Collection<AgeVerificationRequest>,
    pub unban_requests: Collection<UnbanRequest>,
}

impl Core {
    pub async fn open(config: &StoreConfig) -> AppResult<Self> {
        let dir = Path::new(&config.data_dir);

        let core = Self {
            users: Collection::open(dir).await?,
            ratings: Collection::open(dir).await?,
            tickets: Collection::open(dir).await?,
            premium_requests: Collection::open(dir).await?,
            reports: Collection::open(dir).await?,
            age_verification_requests: Collection::open(dir).await?,
            unban_requests: Collection::open(dir).await?,
        };

        tracing::info!(data_dir = %config.data_dir, "luna core opened");
        Ok(core)
    }
}
