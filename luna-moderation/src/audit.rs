use serde::Serialize;

use luna_shared::errors::AppResult;
use luna_shared::types::User;
use luna_store::Collection;

use crate::models::{
    AgeVerificationRequest, PremiumRequest, PremiumStatus, Report, ReportStatus, ReviewStatus,
    Ticket, TicketStatus, UnbanRequest,
};

/// Moderator dashboard counters.
#[derive(Debug, Serialize)]
pub struct ModerationStats {
    pub pending_premium_requests: usize,
    pub open_reports: usize,
    pub pending_age_verifications: usize,
    pub pending_unban_requests: usize,
    pub open_tickets: usize,
}

pub async fn stats(
    premium_requests: &Collection<PremiumRequest>,
    reports: &Collection<Report>,
    age_requests: &Collection<AgeVerificationRequest>,
    unban_requests: &Collection<UnbanRequest>,
    tickets: &Collection<Ticket>,
) -> AppResult<ModerationStats> {
    Ok(ModerationStats {
        pending_premium_requests: premium_requests
            .all()
            .await?
            .iter()
            .filter(|r| r.status == PremiumStatus::Pending)
            .count(),
        open_reports: reports
            .all()
            .await?
            .iter()
            .filter(|r| r.status == ReportStatus::Open)
            .count(),
        pending_age_verifications: age_requests
            .all()
            .await?
            .iter()
            .filter(|r| r.status == ReviewStatus::Pending)
            .count(),
        pending_unban_requests: unban_requests
            .all()
            .await?
            .iter()
            .filter(|r| r.status == ReviewStatus::Pending)
            .count(),
        open_tickets: tickets
            .all()
            .await?
            .iter()
            .filter(|t| t.status == TicketStatus::Open)
            .count(),
    })
}

/// A cross-entity drift between a decided request and the user flags its
/// approval should have written. Arises when the second step of a two-step
/// update fails; there is no rollback, only detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Inconsistency {
    /// Approved premium request but the user lacks the premium flag.
    PremiumNotGranted { request_id: String, user_id: i64 },
    /// Approved age verification but the user lacks the verified flag.
    AgeVerificationNotGranted { request_id: String, user_id: i64 },
    /// A user's pending pointer names a request that is absent or decided.
    DanglingAgeVerificationPointer { request_id: String, user_id: i64 },
    /// Pending age verification but the user record was never stamped with it.
    MissingAgeVerificationPointer { request_id: String, user_id: i64 },
    /// Approved unban appeal but the user is still blocked.
    UnbanNotApplied { request_id: String, user_id: i64 },
}

/// Scan for drift left behind by failed second steps. Cheap enough to run on
/// every moderator dashboard load.
pub async fn reconcile(
    users: &Collection<User>,
    premium_requests: &Collection<PremiumRequest>,
    age_requests: &Collection<AgeVerificationRequest>,
    unban_requests: &Collection<UnbanRequest>,
) -> AppResult<Vec<Inconsistency>> {
    let members = users.all().await?;
    let find_user = |id: i64| members.iter().find(|u| u.id == id);

    let mut drift = Vec::new();

    for request in premium_requests.all().await? {
        if request.status == PremiumStatus::Approved {
            if let Some(user) = find_user(request.user_id) {
                if !user.is_premium {
                    drift.push(Inconsistency::PremiumNotGranted {
                        request_id: request.id,
                        user_id: request.user_id,
                    });
                }
            }
        }
    }

    let age_all = age_requests.all().await?;
    for request in &age_all {
        let Some(user) = find_user(request.user_id) else {
            continue;
        };
        match request.status {
            ReviewStatus::Approved if !user.is_age_verified => {
                drift.push(Inconsistency::AgeVerificationNotGranted {
                    request_id: request.id.clone(),
                    user_id: request.user_id,
                });
            }
            ReviewStatus::Pending
                if user.age_verification_request_id.as_deref() != Some(request.id.as_str()) =>
            {
                drift.push(Inconsistency::MissingAgeVerificationPointer {
                    request_id: request.id.clone(),
                    user_id: request.user_id,
                });
            }
            _ => {}
        }
    }
    for user in &members {
        if let Some(pointer) = &user.age_verification_request_id {
            let pending = age_all
                .iter()
                .any(|r| r.id == *pointer && r.status == ReviewStatus::Pending);
            if !pending {
                drift.push(Inconsistency::DanglingAgeVerificationPointer {
                    request_id: pointer.clone(),
                    user_id: user.id,
                });
            }
        }
    }

    for request in unban_requests.all().await? {
        if request.status == ReviewStatus::Approved {
            if let Some(user) = find_user(request.user_id) {
                if user.is_blocked {
                    drift.push(Inconsistency::UnbanNotApplied {
                        request_id: request.id,
                        user_id: request.user_id,
                    });
                }
            }
        }
    }

    if !drift.is_empty() {
        tracing::warn!(count = drift.len(), "cross-entity drift detected");
    }
    Ok(drift)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::age_verification::request_age_verification;
    use crate::premium::{approve_premium, request_premium};
    use crate::report::create_report;
    use crate::testutil::fixture;
    use crate::ticket::create_ticket;
    use luna_shared::types::UserPatch;

    #[tokio::test]
    async fn stats_count_only_undecided_work() {
        let fx = fixture(&[1, 2]).await;

        request_premium(&fx.premium_requests, &fx.users, 1, "@one").await.unwrap();
        create_report(&fx.reports, &fx.users, 1, 2, "rude").await.unwrap();
        create_ticket(&fx.tickets, &fx.users, 2, "Hello", "Question").await.unwrap();

        let counters = stats(
            &fx.premium_requests,
            &fx.reports,
            &fx.age_requests,
            &fx.unban_requests,
            &fx.tickets,
        )
        .await
        .unwrap();

        assert_eq!(counters.pending_premium_requests, 1);
        assert_eq!(counters.open_reports, 1);
        assert_eq!(counters.open_tickets, 1);
        assert_eq!(counters.pending_age_verifications, 0);
        assert_eq!(counters.pending_unban_requests, 0);
    }

    #[tokio::test]
    async fn a_healthy_store_reconciles_clean() {
        let fx = fixture(&[1]).await;
        let request = request_premium(&fx.premium_requests, &fx.users, 1, "@one").await.unwrap();
        approve_premium(&fx.premium_requests, &fx.users, &request.id).await.unwrap();

        let drift = reconcile(&fx.users, &fx.premium_requests, &fx.age_requests, &fx.unban_requests)
            .await
            .unwrap();
        assert!(drift.is_empty());
    }

    #[tokio::test]
    async fn a_missing_second_step_is_detected() {
        let fx = fixture(&[1]).await;
        let request = request_premium(&fx.premium_requests, &fx.users, 1, "@one").await.unwrap();
        approve_premium(&fx.premium_requests, &fx.users, &request.id).await.unwrap();

        // Simulate the lost second step: strip the flag the approval wrote.
        fx.users
            .update(
                &1,
                UserPatch {
                    is_premium: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let drift = reconcile(&fx.users, &fx.premium_requests, &fx.age_requests, &fx.unban_requests)
            .await
            .unwrap();
        assert_eq!(
            drift,
            vec![Inconsistency::PremiumNotGranted {
                request_id: request.id,
                user_id: 1
            }]
        );
    }

    #[tokio::test]
    async fn an_unstamped_pending_age_verification_is_detected() {
        let fx = fixture(&[1]).await;
        let request =
            request_age_verification(&fx.age_requests, &fx.users, 1, "doc://a").await.unwrap();

        // Simulate the lost second step: the pending request exists but the
        // user record was never stamped with its id.
        fx.users
            .update(
                &1,
                UserPatch {
                    age_verification_request_id: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let drift = reconcile(&fx.users, &fx.premium_requests, &fx.age_requests, &fx.unban_requests)
            .await
            .unwrap();
        assert_eq!(
            drift,
            vec![Inconsistency::MissingAgeVerificationPointer {
                request_id: request.id,
                user_id: 1
            }]
        );
    }

    #[tokio::test]
    async fn dangling_age_verification_pointer_is_detected() {
        let fx = fixture(&[1]).await;
        fx.users
            .update(
                &1,
                UserPatch {
                    age_verification_request_id: Some(Some("ghost".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let drift = reconcile(&fx.users, &fx.premium_requests, &fx.age_requests, &fx.unban_requests)
            .await
            .unwrap();
        assert_eq!(
            drift,
            vec![Inconsistency::DanglingAgeVerificationPointer {
                request_id: "ghost".into(),
                user_id: 1
            }]
        );
    }
}
