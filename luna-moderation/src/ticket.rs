use luna_shared::errors::{AppError, AppResult, ErrorCode};
use luna_shared::types::{now_millis, User};
use luna_store::Collection;

use crate::models::{Ticket, TicketPatch, TicketStatus};
use crate::require_user;

/// Open a support ticket on behalf of a user.
pub async fn create_ticket(
    tickets: &Collection<Ticket>,
    users: &Collection<User>,
    user_id: i64,
    subject: &str,
    message: &str,
) -> AppResult<Ticket> {
    if subject.trim().is_empty() || message.trim().is_empty() {
        return Err(AppError::Validation(
            "ticket subject and message must not be empty".into(),
        ));
    }
    let user = require_user(users, user_id).await?;

    let ticket = tickets
        .create(Ticket {
            id: String::new(),
            user_id,
            user_name: user.name,
            subject: subject.trim().to_string(),
            message: message.trim().to_string(),
            status: TicketStatus::Open,
            reply: None,
            timestamp: now_millis(),
        })
        .await?;

    tracing::info!(user_id, ticket_id = %ticket.id, "support ticket opened");
    Ok(ticket)
}

/// Close a ticket without replying.
pub async fn close_ticket(tickets: &Collection<Ticket>, ticket_id: &str) -> AppResult<Ticket> {
    let ticket = fetch_open(tickets, ticket_id).await?;
    let closed = tickets
        .update(
            &ticket.id,
            TicketPatch {
                status: Some(TicketStatus::Closed),
                reply: None,
            },
        )
        .await?;

    tracing::info!(ticket_id = %ticket.id, "ticket closed");
    Ok(closed)
}

/// Attach the single reply a ticket may receive; replying closes it.
pub async fn reply_to_ticket(
    tickets: &Collection<Ticket>,
    ticket_id: &str,
    reply: &str,
) -> AppResult<Ticket> {
    if reply.trim().is_empty() {
        return Err(AppError::Validation("reply must not be empty".into()));
    }

    let ticket = fetch_open(tickets, ticket_id).await?;
    let replied = tickets
        .update(
            &ticket.id,
            TicketPatch {
                status: Some(TicketStatus::Closed),
                reply: Some(reply.trim().to_string()),
            },
        )
        .await?;

    tracing::info!(ticket_id = %ticket.id, "ticket replied and closed");
    Ok(replied)
}

async fn fetch_open(tickets: &Collection<Ticket>, ticket_id: &str) -> AppResult<Ticket> {
    let ticket = tickets.get(&ticket_id.to_string()).await?.ok_or_else(|| {
        AppError::new(
            ErrorCode::TicketNotFound,
            format!("ticket {ticket_id} not found"),
        )
    })?;

    if ticket.status != TicketStatus::Open {
        return Err(AppError::new(
            ErrorCode::TicketAlreadyClosed,
            format!("ticket {ticket_id} is already closed"),
        ));
    }
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use luna_shared::errors::ErrorKind;

    #[tokio::test]
    async fn replying_attaches_the_reply_and_closes() {
        let fx = fixture(&[1]).await;

        let ticket =
            create_ticket(&fx.tickets, &fx.users, 1, "Feature idea", "Video profiles?").await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);

        let replied = reply_to_ticket(&fx.tickets, &ticket.id, "On the roadmap!").await.unwrap();
        assert_eq!(replied.status, TicketStatus::Closed);
        assert_eq!(replied.reply.as_deref(), Some("On the roadmap!"));
    }

    #[tokio::test]
    async fn closed_tickets_reject_further_transitions() {
        let fx = fixture(&[1]).await;

        let ticket = create_ticket(&fx.tickets, &fx.users, 1, "Hi", "Help please").await.unwrap();
        close_ticket(&fx.tickets, &ticket.id).await.unwrap();

        let err = close_ticket(&fx.tickets, &ticket.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = reply_to_ticket(&fx.tickets, &ticket.id, "too late").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn blank_fields_are_rejected() {
        let fx = fixture(&[1]).await;

        let err = create_ticket(&fx.tickets, &fx.users, 1, " ", "body").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let ticket = create_ticket(&fx.tickets, &fx.users, 1, "subject", "body").await.unwrap();
        let err = reply_to_ticket(&fx.tickets, &ticket.id, "  ").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
