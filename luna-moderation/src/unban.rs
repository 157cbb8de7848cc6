use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{now_millis, User, UserPatch};
use luna_store::Collection;

use crate::models::{ReviewStatus, UnbanRequest, UnbanRequestPatch};
use crate::require_user;

/// File an unban appeal. Only blocked users may appeal; while one appeal is
/// pending it is returned instead of creating a second.
pub async fn request_unban(
    requests: &Collection<UnbanRequest>,
    users: &Collection<User>,
    user_id: i64,
    reason: &str,
) -> AppResult<UnbanRequest> {
    let user = require_user(users, user_id).await?;

    if !user.is_blocked {
        return Err(AppError::new(
            ErrorCode::UserNotBlocked,
            format!("user {user_id} is not blocked"),
        ));
    }
    if reason.trim().is_empty() {
        return Err(AppError::Validation("appeal reason must not be empty".into()));
    }

    if let Some(existing) = requests
        .all()
        .await?
        .into_iter()
        .find(|r| r.user_id == user_id && r.status == ReviewStatus::Pending)
    {
        return Ok(existing);
    }

    let request = requests
        .create(UnbanRequest {
            id: String::new(),
            user_id,
            user_name: user.name,
            reason: reason.trim().to_string(),
            status: ReviewStatus::Pending,
            timestamp: now_millis(),
        })
        .await?;

    tracing::info!(user_id, request_id = %request.id, "unban appeal filed");
    Ok(request)
}

/// One-shot moderator decision. Approval lifts the block and clears the ban
/// reason; rejection leaves the user blocked. The request-status write comes
/// first; `audit::reconcile` catches a failed second step.
pub async fn decide_unban(
    requests: &Collection<UnbanRequest>,
    users: &Collection<User>,
    request_id: &str,
    approved: bool,
) -> AppResult<UnbanRequest> {
    let request = requests.get(&request_id.to_string()).await?.ok_or_else(|| {
        AppError::new(
            ErrorCode::RequestNotFound,
            format!("unban request {request_id} not found"),
        )
    })?;

    if request.status != ReviewStatus::Pending {
        return Err(AppError::new(
            ErrorCode::RequestAlreadyDecided,
            format!("unban request {request_id} has already been decided"),
        ));
    }

    let status = if approved {
        ReviewStatus::Approved
    } else {
        ReviewStatus::Rejected
    };
    let decided = requests
        .update(&request.id, UnbanRequestPatch { status: Some(status) })
        .await?;

    if approved {
        users
            .update(
                &request.user_id,
                UserPatch {
                    is_blocked: Some(false),
                    ban_reason: Some(None),
                    ..Default::default()
                },
            )
            .await?;
    }

    tracing::info!(
        user_id = request.user_id,
        request_id = %request.id,
        approved,
        "unban appeal decided"
    );
    Ok(decided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanctions::block_user;
    use crate::testutil::fixture;
    use luna_shared::errors::ErrorKind;

    #[tokio::test]
    async fn approval_lifts_the_block_and_clears_the_reason() {
        let fx = fixture(&[1]).await;
        block_user(&fx.users, 1, "spam").await.unwrap();

        let request = request_unban(&fx.unban_requests, &fx.users, 1, "I will behave").await.unwrap();
        decide_unban(&fx.unban_requests, &fx.users, &request.id, true).await.unwrap();

        let user = fx.users.get(&1).await.unwrap().unwrap();
        assert!(!user.is_blocked);
        assert_eq!(user.ban_reason, None);
    }

    #[tokio::test]
    async fn rejection_leaves_the_user_blocked() {
        let fx = fixture(&[1]).await;
        block_user(&fx.users, 1, "spam").await.unwrap();

        let request = request_unban(&fx.unban_requests, &fx.users, 1, "please").await.unwrap();
        let decided = decide_unban(&fx.unban_requests, &fx.users, &request.id, false).await.unwrap();
        assert_eq!(decided.status, ReviewStatus::Rejected);

        let user = fx.users.get(&1).await.unwrap().unwrap();
        assert!(user.is_blocked);
        assert_eq!(user.ban_reason.as_deref(), Some("spam"));
    }

    #[tokio::test]
    async fn only_blocked_users_may_appeal_and_appeals_dedupe() {
        let fx = fixture(&[1, 2]).await;

        let err = request_unban(&fx.unban_requests, &fx.users, 2, "unfair").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        block_user(&fx.users, 1, "spam").await.unwrap();
        let first = request_unban(&fx.unban_requests, &fx.users, 1, "sorry").await.unwrap();
        let second = request_unban(&fx.unban_requests, &fx.users, 1, "sorry again").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(fx.unban_requests.all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn decisions_are_one_shot() {
        let fx = fixture(&[1]).await;
        block_user(&fx.users, 1, "spam").await.unwrap();

        let request = request_unban(&fx.unban_requests, &fx.users, 1, "sorry").await.unwrap();
        decide_unban(&fx.unban_requests, &fx.users, &request.id, false).await.unwrap();

        let err = decide_unban(&fx.unban_requests, &fx.users, &request.id, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(fx.users.get(&1).await.unwrap().unwrap().is_blocked);
    }
}
