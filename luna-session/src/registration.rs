use serde::Deserialize;
use validator::Validate;

use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{Gender, GeoPoint, IdentityAssertion, User};

use crate::Core;

/// Minimum age accepted at registration.
pub const MIN_AGE: i32 = 18;

/// The profile form collected at first launch. Identity (id, display name,
/// username) comes from the identity assertion, not from the form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationForm {
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub age: i32,
    pub gender: Gender,
    /// Opaque text, possibly machine-generated; only the length is checked.
    #[serde(default)]
    #[validate(length(max = 500, message = "bio is limited to 500 characters"))]
    pub bio: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub share_location: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Create the user record for a first-time visitor. All validation happens
/// before the write; re-registering an existing id fails.
pub async fn register(
    core: &Core,
    identity: &IdentityAssertion,
    form: RegistrationForm,
) -> AppResult<User> {
    form.validate()
        .map_err(|e| AppError::new(ErrorCode::ValidationError, e.to_string()))?;

    if form.age < MIN_AGE {
        return Err(AppError::new(
            ErrorCode::Underage,
            format!("you must be at least {MIN_AGE} to register"),
        ));
    }

    let username = identity
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            AppError::new(
                ErrorCode::ValidationError,
                "a public username is required to register",
            )
        })?;

    if core.users.get(&identity.id).await?.is_some() {
        return Err(AppError::new(
            ErrorCode::UserAlreadyRegistered,
            format!("user {} is already registered", identity.id),
        ));
    }

    let mut photo_urls = form.photo_urls;
    if photo_urls.is_empty() {
        photo_urls.extend(identity.avatar_url.clone());
    }

    let user = core
        .users
        .create(User {
            id: identity.id,
            username,
            name: identity.display_name.clone(),
            email: form.email,
            age: form.age,
            gender: form.gender,
            bio: form.bio,
            photo_urls,
            is_verified: false,
            is_premium: false,
            is_blocked: false,
            ban_reason: None,
            is_age_verified: false,
            age_verification_request_id: None,
            last_login: 0,
            share_location: form.share_location,
            location: form.location,
            city: form.city,
        })
        .await?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use luna_shared::errors::ErrorKind;
    use luna_store::StoreConfig;

    fn identity(id: i64) -> IdentityAssertion {
        IdentityAssertion {
            id,
            display_name: format!("User {id}"),
            username: Some(format!("user{id}")),
            avatar_url: Some(format!("https://cdn.example/{id}")),
        }
    }

    fn form(age: i32) -> RegistrationForm {
        RegistrationForm {
            email: "new@example.com".into(),
            age,
            gender: Gender::Male,
            bio: "Hello there".into(),
            photo_urls: vec![],
            share_location: false,
            location: None,
            city: None,
        }
    }

    async fn core(dir: &tempfile::TempDir) -> Core {
        let config = StoreConfig {
            data_dir: dir.path().display().to_string(),
        };
        Core::open(&config).await.unwrap()
    }

    #[tokio::test]
    async fn registration_creates_the_user_with_identity_fields() {
        let dir = tempfile::tempdir().unwrap();
        let core = core(&dir).await;

        let user = register(&core, &identity(7), form(25)).await.unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "user7");
        assert_eq!(user.last_login, 0);
        // Avatar falls back in when no photos were supplied.
        assert_eq!(user.photo_urls, vec!["https://cdn.example/7".to_string()]);
    }

    #[tokio::test]
    async fn underage_and_invalid_email_are_rejected_before_write() {
        let dir = tempfile::tempdir().unwrap();
        let core = core(&dir).await;

        let err = register(&core, &identity(7), form(17)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut bad = form(25);
        bad.email = "not-an-email".into();
        let err = register(&core, &identity(7), bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(core.users.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bio_over_the_cap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let core = core(&dir).await;

        let mut long = form(25);
        long.bio = "x".repeat(501);
        let err = register(&core, &identity(7), long).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn missing_username_and_duplicate_id_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let core = core(&dir).await;

        let mut anon = identity(7);
        anon.username = None;
        let err = register(&core, &anon, form(25)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        register(&core, &identity(7), form(25)).await.unwrap();
        let err = register(&core, &identity(7), form(30)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
