use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{now_millis, User, UserPatch};
use luna_store::Collection;

use crate::models::{AgeVerificationRequest, AgeVerificationRequestPatch, ReviewStatus};
use crate::require_user;

/// Submit a document photo for age verification. Blocked while one request
/// is pending (the pending request is returned instead); rejected outright
/// once the user is verified. On success the user record is stamped with the
/// pending request id.
pub async fn request_age_verification(
    requests: &Collection<AgeVerificationRequest>,
    users: &Collection<User>,
    user_id: i64,
    document_photo_url: &str,
) -> AppResult<AgeVerificationRequest> {
    let user = require_user(users, user_id).await?;

    if user.is_age_verified {
        return Err(AppError::new(
            ErrorCode::AlreadyAgeVerified,
            format!("user {user_id} is already age-verified"),
        ));
    }

    // The collection is the source of truth for the pending check, not the
    // user's pointer: a failed pointer write must not let a retry create a
    // second pending request.
    if let Some(existing) = requests
        .all()
        .await?
        .into_iter()
        .find(|r| r.user_id == user_id && r.status == ReviewStatus::Pending)
    {
        if user.age_verification_request_id.as_deref() != Some(existing.id.as_str()) {
            users
                .update(
                    &user_id,
                    UserPatch {
                        age_verification_request_id: Some(Some(existing.id.clone())),
                        ..Default::default()
                    },
                )
                .await?;
        }
        return Ok(existing);
    }

    let request = requests
        .create(AgeVerificationRequest {
            id: String::new(),
            user_id,
            user_name: user.name,
            document_photo_url: document_photo_url.to_string(),
            status: ReviewStatus::Pending,
            timestamp: now_millis(),
        })
        .await?;

    users
        .update(
            &user_id,
            UserPatch {
                age_verification_request_id: Some(Some(request.id.clone())),
                ..Default::default()
            },
        )
        .await?;

    tracing::info!(user_id, request_id = %request.id, "age verification requested");
    Ok(request)
}

/// One-shot moderator decision. Approval sets the user's verified flag and
/// clears the pending pointer; rejection clears the pointer only. The
/// request-status write happens first, so a failed user update is visible to
/// `audit::reconcile` rather than leaving the request pending forever.
pub async fn decide_age_verification(
    requests: &Collection<AgeVerificationRequest>,
    users: &Collection<User>,
    request_id: &str,
    approved: bool,
) -> AppResult<AgeVerificationRequest> {
    let request = requests.get(&request_id.to_string()).await?.ok_or_else(|| {
        AppError::new(
            ErrorCode::RequestNotFound,
            format!("age verification request {request_id} not found"),
        )
    })?;

    if request.status != ReviewStatus::Pending {
        return Err(AppError::new(
            ErrorCode::RequestAlreadyDecided,
            format!("age verification request {request_id} has already been decided"),
        ));
    }

    let status = if approved {
        ReviewStatus::Approved
    } else {
        ReviewStatus::Rejected
    };
    let decided = requests
        .update(&request.id, AgeVerificationRequestPatch { status: Some(status) })
        .await?;

    let user_patch = if approved {
        UserPatch {
            is_age_verified: Some(true),
            age_verification_request_id: Some(None),
            ..Default::default()
        }
    } else {
        UserPatch {
            age_verification_request_id: Some(None),
            ..Default::default()
        }
    };
    users.update(&request.user_id, user_patch).await?;

    tracing::info!(
        user_id = request.user_id,
        request_id = %request.id,
        approved,
        "age verification decided"
    );
    Ok(decided)
}
