use std::collections::HashSet;

use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{now_millis, User};
use luna_store::Collection;

use crate::models::Rating;

/// Score at and above which a rating counts as a positive signal for
/// matching and notifications.
pub const LIKE_THRESHOLD: i32 = 6;

/// Score recorded for a super-like, above the regular 1..=10 scale.
pub const SUPER_LIKE_SCORE: i32 = 11;

/// How many likers a non-premium viewer may see un-obscured. Part of the
/// engine's public contract: it decides what identity data is safe to hand
/// to the client.
pub const LIKER_PREVIEW_LIMIT: usize = 1;

/// Append one rating to the log.
///
/// All validation happens before any write: the score must be in range (or
/// the super-like flag set), both users must exist, self-ratings are
/// rejected, super-likes require a premium rater, and rating the same target
/// twice is rejected outright.
pub async fn submit_rating(
    ratings: &Collection<Rating>,
    users: &Collection<User>,
    rater_id: i64,
    rated_id: i64,
    score: i32,
    is_super_like: bool,
) -> AppResult<Rating> {
    if rater_id == rated_id {
        return Err(AppError::new(
            ErrorCode::CannotRateSelf,
            "you cannot rate yourself",
        ));
    }

    let recorded_score = if is_super_like {
        SUPER_LIKE_SCORE
    } else {
        if !(1..=10).contains(&score) {
            return Err(AppError::new(
                ErrorCode::ScoreOutOfRange,
                format!("score must be between 1 and 10, got {score}"),
            ));
        }
        score
    };

    let rater = users
        .get(&rater_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, format!("user {rater_id} not found")))?;

    if users.get(&rated_id).await?.is_none() {
        return Err(AppError::new(
            ErrorCode::UserNotFound,
            format!("user {rated_id} not found"),
        ));
    }

    if is_super_like && !rater.is_premium {
        return Err(AppError::new(
            ErrorCode::PremiumRequired,
            "super-likes are available to premium members only",
        ));
    }

    let already = ratings
        .all()
        .await?
        .iter()
        .any(|r| r.rater_id == rater_id && r.rated_id == rated_id);
    if already {
        return Err(AppError::new(
            ErrorCode::AlreadyRated,
            format!("user {rater_id} has already rated user {rated_id}"),
        ));
    }

    let rating = ratings
        .create(Rating {
            id: String::new(),
            rater_id,
            rated_id,
            score: recorded_score,
            is_super_like,
            timestamp: now_millis(),
        })
        .await?;

    tracing::info!(
        rater_id,
        rated_id,
        score = rating.score,
        is_super_like,
        "rating submitted"
    );
    Ok(rating)
}

/// Whether the two users have rated each other at or above the like
/// threshold. Symmetric by construction and always computed from the live
/// rating log, never cached.
pub async fn is_match(ratings: &Collection<Rating>, user_a: i64, user_b: i64) -> AppResult<bool> {
    let log = ratings.all().await?;
    let likes = |rater: i64, rated: i64| {
        log.iter()
            .any(|r| r.rater_id == rater && r.rated_id == rated && r.score >= LIKE_THRESHOLD)
    };
    Ok(likes(user_a, user_b) && likes(user_b, user_a))
}

/// Everyone who rated `user_id` at or above the like threshold, in rating-log
/// insertion order (oldest first). Blocked likers are included: their likes
/// still count, discovery filters them out elsewhere.
pub async fn likers_of(
    ratings: &Collection<Rating>,
    users: &Collection<User>,
    user_id: i64,
) -> AppResult<Vec<User>> {
    let log = ratings.all().await?;
    let members = users.all().await?;

    let mut likers: Vec<User> = Vec::new();
    for rating in log
        .iter()
        .filter(|r| r.rated_id == user_id && r.score >= LIKE_THRESHOLD)
    {
        if likers.iter().any(|u| u.id == rating.rater_id) {
            continue;
        }
        if let Some(user) = members.iter().find(|u| u.id == rating.rater_id) {
            likers.push(user.clone());
        }
    }
    Ok(likers)
}

/// How many entries of a liker list the viewer may see un-obscured. Premium
/// viewers see everything; everyone else sees at most
/// [`LIKER_PREVIEW_LIMIT`].
pub fn visible_liker_count(viewer_is_premium: bool, total: usize) -> usize {
    if viewer_is_premium {
        total
    } else {
        total.min(LIKER_PREVIEW_LIMIT)
    }
}

/// The candidates `user_id` may still rate: every non-blocked user except
/// themselves and anyone they have already rated. Finite, recomputed fully on
/// each call; the consumer holds its own in-memory index into the result.
pub async fn discovery_queue(
    ratings: &Collection<Rating>,
    users: &Collection<User>,
    user_id: i64,
) -> AppResult<Vec<User>> {
    if users.get(&user_id).await?.is_none() {
        return Err(AppError::new(
            ErrorCode::UserNotFound,
            format!("user {user_id} not found"),
        ));
    }

    let rated: HashSet<i64> = ratings
        .all()
        .await?
        .iter()
        .filter(|r| r.rater_id == user_id)
        .map(|r| r.rated_id)
        .collect();

    Ok(users
        .all()
        .await?
        .into_iter()
        .filter(|u| u.id != user_id && !u.is_blocked && !rated.contains(&u.id))
        .collect())
}
