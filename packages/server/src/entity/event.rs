use common::{EventType, PaymentStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    /// UUIDv7 primary key. Also names the event's upload directory.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub organizer_id: i32,
    #[sea_orm(belongs_to, from = "organizer_id", to = "id")]
    pub organizer: HasOne<super::user::Entity>,

    pub title: String,
    pub subtitle: Option<String>,
    pub welcome_message: Option<String>,
    pub event_date: Option<Date>,
    pub event_type: EventType,
    /// Template chosen at creation; the card may use a different one.
    pub template: String,

    /// Public, unguessable token for guest URLs.
    #[sea_orm(unique)]
    pub slug: String,

    /// Always equal to `payment_status == Approved`.
    pub is_paid: bool,
    pub payment_status: PaymentStatus,
    pub qr_template: Option<String>,
    pub qr_size: Option<String>,
    pub guest_url: Option<String>,
    pub payment_submitted_at: Option<DateTimeUtc>,
    pub payment_approved_at: Option<DateTimeUtc>,
    /// Admin user who approved the payment.
    pub approved_by: Option<i32>,

    #[sea_orm(has_many)]
    pub media: HasMany<super::media::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
