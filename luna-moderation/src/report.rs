use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{now_millis, User};
use luna_store::Collection;

use crate::models::{Report, ReportPatch, ReportStatus};
use crate::require_user;

/// File a report against another user. Self-reports and blank reasons are
/// rejected before any write.
pub async fn create_report(
    reports: &Collection<Report>,
    users: &Collection<User>,
    reporter_id: i64,
    reported_id: i64,
    reason: &str,
) -> AppResult<Report> {
    if reporter_id == reported_id {
        return Err(AppError::new(
            ErrorCode::CannotReportSelf,
            "you cannot report yourself",
        ));
    }
    if reason.trim().is_empty() {
        return Err(AppError::Validation("report reason must not be empty".into()));
    }

    require_user(users, reporter_id).await?;
    require_user(users, reported_id).await?;

    let report = reports
        .create(Report {
            id: String::new(),
            reporter_id,
            reported_id,
            reason: reason.trim().to_string(),
            status: ReportStatus::Open,
            timestamp: now_millis(),
        })
        .await?;

    tracing::info!(reporter_id, reported_id, report_id = %report.id, "report filed");
    Ok(report)
}

/// Mark a report resolved. One-shot: resolving a resolved report fails so a
/// moderator learns their decision was already taken.
pub async fn resolve_report(reports: &Collection<Report>, report_id: &str) -> AppResult<Report> {
    let report = reports.get(&report_id.to_string()).await?.ok_or_else(|| {
        AppError::new(
            ErrorCode::ReportNotFound,
            format!("report {report_id} not found"),
        )
    })?;

    if report.status != ReportStatus::Open {
        return Err(AppError::new(
            ErrorCode::ReportAlreadyResolved,
            format!("report {report_id} has already been resolved"),
        ));
    }

    let resolved = reports
        .update(
            &report.id,
            ReportPatch {
                status: Some(ReportStatus::Resolved),
            },
        )
        .await?;

    tracing::info!(report_id = %report.id, "report resolved");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use luna_shared::errors::ErrorKind;

    #[tokio::test]
    async fn filing_and_resolving_a_report() {
        let fx = fixture(&[1, 2]).await;

        let report = create_report(&fx.reports, &fx.users, 1, 2, "spam profile").await.unwrap();
        assert_eq!(report.status, ReportStatus::Open);

        let resolved = resolve_report(&fx.reports, &report.id).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Resolved);

        let err = resolve_report(&fx.reports, &report.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn self_reports_and_blank_reasons_are_rejected() {
        let fx = fixture(&[1, 2]).await;

        let err = create_report(&fx.reports, &fx.users, 1, 1, "bad").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = create_report(&fx.reports, &fx.users, 1, 2, "   ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert!(fx.reports.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reporting_an_unknown_user_fails() {
        let fx = fixture(&[1]).await;
        let err = create_report(&fx.reports, &fx.users, 1, 42, "ghost").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
