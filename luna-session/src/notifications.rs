use serde::Serialize;
use uuid::Uuid;

use luna_shared::errors::AppResult;
use luna_shared::types::{now_millis, IdentityAssertion, User, UserPatch};
use luna_store::Collection;

use luna_matching::{Rating, LIKE_THRESHOLD};

use crate::Core;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Info,
}

/// What the client should do when the user taps the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationAction {
    ShowLikers,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginNotification {
    pub id: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NotificationAction>,
}

/// Everything the client needs after a successful session start.
#[derive(Debug, Clone)]
pub struct SessionStart {
    pub user: User,
    pub notifications: Vec<LoginNotification>,
}

/// Likes received since the user's previous login, folded into a single
/// notification. Only ratings at or above the like threshold count.
pub async fn login_notifications(
    ratings: &Collection<Rating>,
    user: &User,
) -> AppResult<Vec<LoginNotification>> {
    let new_likes = ratings
        .all()
        .await?
        .iter()
        .filter(|r| {
            r.rated_id == user.id && r.timestamp > user.last_login && r.score >= LIKE_THRESHOLD
        })
        .count();

    if new_likes == 0 {
        return Ok(Vec::new());
    }

    let message = if new_likes == 1 {
        "You have 1 new like!".to_string()
    } else {
        format!("You have {new_likes} new likes!")
    };

    Ok(vec![LoginNotification {
        id: Uuid::new_v4().to_string(),
        message,
        kind: NotificationKind::Like,
        action: Some(NotificationAction::ShowLikers),
    }])
}

/// Start a session for an asserted identity. Returns `None` when the id is
/// unknown (the client should run registration). Notifications are computed
/// against the previous `last_login` before the new one is stamped.
pub async fn start_session(
    core: &Core,
    identity: &IdentityAssertion,
) -> AppResult<Option<SessionStart>> {
    let Some(user) = core.users.get(&identity.id).await? else {
        tracing::debug!(user_id = identity.id, "unknown identity, registration required");
        return Ok(None);
    };

    let notifications = login_notifications(&core.ratings, &user).await?;

    let stamped = core
        .users
        .update(
            &user.id,
            UserPatch {
                last_login: Some(now_millis()),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(
        user_id = stamped.id,
        notifications = notifications.len(),
        "session started"
    );
    Ok(Some(SessionStart {
        user: stamped,
        notifications,
    }))
}
