use chrono::Utc;
use common::PaymentStatus;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entity::event;

/// Result of a conditional payment transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The row matched the expected prior state and was updated.
    Applied,
    /// The event exists (and is visible to the caller) but is already paid.
    AlreadyPaid,
    /// No such event, or not visible to the caller.
    NotFound,
}

/// Card details recorded when an organizer claims payment.
#[derive(Debug, Clone)]
pub struct PaymentSubmission {
    pub qr_template: String,
    pub qr_size: String,
    pub guest_url: String,
}

/// Payment state machine over the `event` table.
///
/// Every transition is a single `UPDATE ... WHERE is_paid = false`, so two
/// concurrent writers can never both observe the unpaid state.
pub struct PaymentService<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PaymentService<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Organizer claims payment: `unpaid | awaiting_approval` -> `awaiting_approval`.
    ///
    /// Scoped to `organizer_id`; other organizers' events look nonexistent.
    /// Never touches `is_paid`.
    pub async fn submit(
        &self,
        event_id: Uuid,
        organizer_id: i32,
        submission: PaymentSubmission,
    ) -> Result<TransitionOutcome, DbErr> {
        let now = Utc::now();
        let result = event::Entity::update_many()
            .col_expr(
                event::Column::PaymentStatus,
                Expr::value(PaymentStatus::AwaitingApproval),
            )
            .col_expr(
                event::Column::QrTemplate,
                Expr::value(Some(submission.qr_template)),
            )
            .col_expr(event::Column::QrSize, Expr::value(Some(submission.qr_size)))
            .col_expr(
                event::Column::GuestUrl,
                Expr::value(Some(submission.guest_url)),
            )
            .col_expr(event::Column::PaymentSubmittedAt, Expr::value(Some(now)))
            .col_expr(event::Column::UpdatedAt, Expr::value(now))
            .filter(event::Column::Id.eq(event_id))
            .filter(event::Column::OrganizerId.eq(organizer_id))
            .filter(event::Column::IsPaid.eq(false))
            .exec(self.conn)
            .await?;

        if result.rows_affected > 0 {
            return Ok(TransitionOutcome::Applied);
        }

        let exists = event::Entity::find_by_id(event_id)
            .filter(event::Column::OrganizerId.eq(organizer_id))
            .one(self.conn)
            .await?
            .is_some();

        Ok(if exists {
            TransitionOutcome::AlreadyPaid
        } else {
            TransitionOutcome::NotFound
        })
    }

    /// Admin approval: any unpaid event -> `approved`, `is_paid = true`.
    ///
    /// The caller must have checked the admin predicate already.
    pub async fn approve(&self, event_id: Uuid, admin_id: i32) -> Result<TransitionOutcome, DbErr> {
        let now = Utc::now();
        let result = event::Entity::update_many()
            .col_expr(event::Column::IsPaid, Expr::value(true))
            .col_expr(
                event::Column::PaymentStatus,
                Expr::value(PaymentStatus::Approved),
            )
            .col_expr(event::Column::PaymentApprovedAt, Expr::value(Some(now)))
            .col_expr(event::Column::ApprovedBy, Expr::value(Some(admin_id)))
            .col_expr(event::Column::UpdatedAt, Expr::value(now))
            .filter(event::Column::Id.eq(event_id))
            .filter(event::Column::IsPaid.eq(false))
            .exec(self.conn)
            .await?;

        if result.rows_affected > 0 {
            return Ok(TransitionOutcome::Applied);
        }

        let exists = event::Entity::find_by_id(event_id)
            .one(self.conn)
            .await?
            .is_some();

        Ok(if exists {
            TransitionOutcome::AlreadyPaid
        } else {
            TransitionOutcome::NotFound
        })
    }
}
