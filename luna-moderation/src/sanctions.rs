use luna_shared::errors::AppResult;
use luna_shared::types::{User, UserPatch};
use luna_store::Collection;

use crate::require_user;

/// Block a user with a reason. Idempotent: blocking an already-blocked user
/// is a no-op, not an error (the existing ban reason is kept).
pub async fn block_user(
    users: &Collection<User>,
    user_id: i64,
    reason: &str,
) -> AppResult<User> {
    let user = require_user(users, user_id).await?;
    if user.is_blocked {
        return Ok(user);
    }

    let blocked = users
        .update(
            &user_id,
            UserPatch {
                is_blocked: Some(true),
                ban_reason: Some(Some(reason.to_string())),
                ..Default::default()
            },
        )
        .await?;

    tracing::warn!(user_id, reason, "user blocked");
    Ok(blocked)
}

/// Lift a block directly (outside the unban-appeal workflow). Idempotent.
pub async fn unblock_user(users: &Collection<User>, user_id: i64) -> AppResult<User> {
    let user = require_user(users, user_id).await?;
    if !user.is_blocked {
        return Ok(user);
    }

    let unblocked = users
        .update(
            &user_id,
            UserPatch {
                is_blocked: Some(false),
                ban_reason: Some(None),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(user_id, "user unblocked");
    Ok(unblocked)
}

/// Grant or revoke the admin-granted verified badge.
pub async fn set_verified(
    users: &Collection<User>,
    user_id: i64,
    verified: bool,
) -> AppResult<User> {
    require_user(users, user_id).await?;
    let updated = users
        .update(
            &user_id,
            UserPatch {
                is_verified: Some(verified),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(user_id, verified, "verified badge updated");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;

    #[tokio::test]
    async fn blocking_is_idempotent_and_keeps_the_first_reason() {
        let fx = fixture(&[1]).await;

        let blocked = block_user(&fx.users, 1, "spam").await.unwrap();
        assert!(blocked.is_blocked);
        assert_eq!(blocked.ban_reason.as_deref(), Some("spam"));

        let again = block_user(&fx.users, 1, "different reason").await.unwrap();
        assert_eq!(again.ban_reason.as_deref(), Some("spam"));
    }

    #[tokio::test]
    async fn unblocking_clears_the_reason() {
        let fx = fixture(&[1]).await;
        block_user(&fx.users, 1, "spam").await.unwrap();

        let unblocked = unblock_user(&fx.users, 1).await.unwrap();
        assert!(!unblocked.is_blocked);
        assert_eq!(unblocked.ban_reason, None);

        // No-op on a user who is not blocked.
        let again = unblock_user(&fx.users, 1).await.unwrap();
        assert!(!again.is_blocked);
    }

    #[tokio::test]
    async fn verified_badge_toggles() {
        let fx = fixture(&[1]).await;
        assert!(set_verified(&fx.users, 1, true).await.unwrap().is_verified);
        assert!(!set_verified(&fx.users, 1, false).await.unwrap().is_verified);
    }
}
