use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::config::MailConfig;
use crate::entity::{mail_settings, media};

/// Create the SMTP settings row from config defaults if it does not exist.
/// An existing row is never overwritten.
pub async fn seed_mail_settings(db: &DatabaseConnection, defaults: &MailConfig) -> Result<(), DbErr> {
    let model = mail_settings::ActiveModel {
        id: Set(mail_settings::SINGLETON_ID),
        smtp_host: Set(defaults.smtp_host.clone()),
        smtp_port: Set(i32::from(defaults.smtp_port)),
        smtp_user: Set(defaults.smtp_user.clone()),
        smtp_password: Set(defaults.smtp_password.clone()),
        from_email: Set(defaults.from_email.clone()),
        updated_at: Set(chrono::Utc::now()),
    };

    let result = mail_settings::Entity::insert(model)
        .on_conflict(
            OnConflict::column(mail_settings::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => {
            info!("Ensured mail settings row exists");
            Ok(())
        }
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Gallery listing: SELECT ... FROM media WHERE event_id = ? ORDER BY created_at DESC
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_media_event_created")
        .table(media::Entity)
        .col(media::Column::EventId)
        .col(media::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_media_event_created exists"),
        Err(e) => tracing::warn!("Failed to create index idx_media_event_created: {}", e),
    }

    Ok(())
}
