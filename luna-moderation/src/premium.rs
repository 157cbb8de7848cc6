use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{now_millis, User, UserPatch};
use luna_store::Collection;

use crate::models::{PremiumRequest, PremiumRequestPatch, PremiumStatus};
use crate::require_user;

/// Create a pending premium upgrade request. Idempotent: while one pending
/// request exists for the user, it is returned instead of creating a second.
pub async fn request_premium(
    requests: &Collection<PremiumRequest>,
    users: &Collection<User>,
    user_id: i64,
    contact: &str,
) -> AppResult<PremiumRequest> {
    let user = require_user(users, user_id).await?;

    if let Some(existing) = requests
        .all()
        .await?
        .into_iter()
        .find(|r| r.user_id == user_id && r.status == PremiumStatus::Pending)
    {
        return Ok(existing);
    }

    let request = requests
        .create(PremiumRequest {
            id: String::new(),
            user_id,
            user_name: user.name,
            contact: contact.to_string(),
            status: PremiumStatus::Pending,
            timestamp: now_millis(),
        })
        .await?;

    tracing::info!(user_id, request_id = %request.id, "premium upgrade requested");
    Ok(request)
}

/// One-shot approval: marks the request approved, then grants the user the
/// premium flag. The request-status write comes first; if the user update
/// fails the drift is visible to `audit::reconcile`.
pub async fn approve_premium(
    requests: &Collection<PremiumRequest>,
    users: &Collection<User>,
    request_id: &str,
) -> AppResult<PremiumRequest> {
    let request = requests.get(&request_id.to_string()).await?.ok_or_else(|| {
        AppError::new(
            ErrorCode::RequestNotFound,
            format!("premium request {request_id} not found"),
        )
    })?;

    if request.status != PremiumStatus::Pending {
        return Err(AppError::new(
            ErrorCode::RequestAlreadyDecided,
            format!("premium request {request_id} has already been decided"),
        ));
    }

    let approved = requests
        .update(
            &request.id,
            PremiumRequestPatch {
                status: Some(PremiumStatus::Approved),
            },
        )
        .await?;

    users
        .update(
            &request.user_id,
            UserPatch {
                is_premium: Some(true),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(user_id = request.user_id, request_id = %request.id, "premium approved");
    Ok(approved)
}
