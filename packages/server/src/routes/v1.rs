use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::health::health))
        .nest("/auth", auth_routes())
        .nest("/events", event_routes())
        .nest("/media", media_routes())
        .nest("/guest", guest_routes(config.storage.max_upload_size))
        .nest("/files", file_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::event::list_events,
            handlers::event::create_event
        ))
        .routes(routes!(
            handlers::event::get_event,
            handlers::event::update_event,
            handlers::event::delete_event
        ))
        .routes(routes!(handlers::event::preview_card))
        .routes(routes!(handlers::media::list_event_media))
        .routes(routes!(handlers::media::download_event_media))
        .routes(routes!(handlers::payment::submit_payment))
}

fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::media::delete_media))
}

fn guest_routes(max_upload_size: u64) -> OpenApiRouter<AppState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::guest::upload_media))
        .layer(handlers::guest::upload_body_limit(max_upload_size));

    OpenApiRouter::new()
        .routes(routes!(handlers::guest::get_guest_event))
        .merge(upload)
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::files::serve_file))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::admin::list_events))
        .routes(routes!(handlers::admin::list_users))
        .routes(routes!(handlers::admin::stats))
        .routes(routes!(
            handlers::admin::get_smtp_settings,
            handlers::admin::update_smtp_settings
        ))
        .routes(routes!(handlers::admin::test_smtp_settings))
        .routes(routes!(handlers::payment::approve_payment))
}
