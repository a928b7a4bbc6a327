use serde_json::json;

use crate::common::{TestApp, routes};

mod crud {
    use super::*;

    #[tokio::test]
    async fn create_event_fills_defaults() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;

        let res = app
            .post_with_token(
                routes::EVENTS,
                &json!({
                    "title": "Anna & Ben",
                    "event_type": "wedding",
                    "subtitle": "June 2026",
                    "event_date": "2026-06-20",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["title"], "Anna & Ben");
        assert_eq!(res.body["template"], "elegant_frame");
        assert_eq!(res.body["payment_status"], "unpaid");
        assert_eq!(res.body["is_paid"], false);
        assert_eq!(res.body["media_count"], 0);
        assert_eq!(res.body["event_date"], "2026-06-20");
        let slug = res.body["slug"].as_str().unwrap();
        assert_eq!(slug.len(), 12);
        assert!(slug.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn unknown_template_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;

        let res = app
            .post_with_token(
                routes::EVENTS,
                &json!({"title": "Party", "event_type": "birthday", "template": "neon_disco"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;

        let res = app
            .post_with_token(
                routes::EVENTS,
                &json!({"title": "   ", "event_type": "wedding"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn organizers_only_see_their_own_events() {
        let app = TestApp::spawn().await;
        let anna = app.register("anna@example.com", "Anna").await;
        let carl = app.register("carl@example.com", "Carl").await;
        let event = app.create_event(&anna, "Anna's wedding", "wedding").await;
        app.create_event(&carl, "Carl's birthday", "birthday").await;

        let res = app.get_with_token(routes::EVENTS, &anna).await;
        assert_eq!(res.status, 200);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["title"], "Anna's wedding");

        let res = app.get_with_token(&routes::event(event.id), &carl).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn patch_updates_and_clears_fields() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let res = app
            .post_with_token(
                routes::EVENTS,
                &json!({"title": "Old", "event_type": "corporate", "subtitle": "Q3"}),
                &token,
            )
            .await;
        let id = res.uuid();

        let res = app
            .patch_with_token(
                &routes::event(id),
                &json!({"title": "New", "subtitle": null, "template": "tech_modern"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "New");
        assert!(res.body["subtitle"].is_null());
        assert_eq!(res.body["template"], "tech_modern");
        assert_eq!(res.body["event_type"], "corporate");
    }

    #[tokio::test]
    async fn templates_of_another_event_type_are_rejected() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;

        let res = app
            .post_with_token(
                routes::EVENTS,
                &json!({"title": "Anna & Ben", "event_type": "wedding", "template": "tech_modern"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");

        let event = app.create_event(&token, "Anna & Ben", "wedding").await;
        let res = app
            .patch_with_token(&routes::event(event.id), &json!({"template": "balloon_fun"}), &token)
            .await;
        assert_eq!(res.status, 400);

        let res = app.get_with_token(&routes::event(event.id), &token).await;
        assert_eq!(res.body["template"], "elegant_frame");
    }

    #[tokio::test]
    async fn delete_removes_event_media_and_files() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;
        let up = app
            .upload(&event.slug, "a.jpg", "image/jpeg", vec![1u8; 100], None)
            .await;
        assert_eq!(up.status, 201, "{}", up.text);
        assert_eq!(app.stored_files(event.id).len(), 1);

        let res = app.delete_with_token(&routes::event(event.id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let res = app.get_with_token(&routes::event(event.id), &token).await;
        assert_eq!(res.status, 404);
        assert!(!app.upload_dir.join(event.id.to_string()).exists());
        let res = app.get_without_token(&routes::guest_event(&event.slug)).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn cannot_delete_someone_elses_event() {
        let app = TestApp::spawn().await;
        let anna = app.register("anna@example.com", "Anna").await;
        let carl = app.register("carl@example.com", "Carl").await;
        let event = app.create_event(&anna, "Wedding", "wedding").await;

        let res = app.delete_with_token(&routes::event(event.id), &carl).await;
        assert_eq!(res.status, 404);

        let res = app.get_with_token(&routes::event(event.id), &anna).await;
        assert_eq!(res.status, 200);
    }
}

mod guest {
    use super::*;

    #[tokio::test]
    async fn public_view_by_slug() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Anna & Ben", "wedding").await;

        let res = app.get_without_token(&routes::guest_event(&event.slug)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["title"], "Anna & Ben");
        assert_eq!(res.body["event_type"], "wedding");
        assert!(res.body.get("organizer_id").is_none());
        assert!(res.body.get("payment_status").is_none());
    }

    #[tokio::test]
    async fn unknown_or_malformed_slug_is_not_found() {
        let app = TestApp::spawn().await;

        for slug in ["0123456789ab", "not-a-slug"] {
            let res = app.get_without_token(&routes::guest_event(slug)).await;
            assert_eq!(res.status, 404, "{slug}");
        }
    }
}

mod card {
    use super::*;

    #[tokio::test]
    async fn owner_gets_png_preview() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Anna & Ben", "wedding").await;

        let res = app
            .get_raw(
                &format!("{}?template=romantic_floral&size=8x6", routes::event_card(event.id)),
                Some(&token),
            )
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "image/png");
        let bytes = res.bytes().await.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (2400, 1800));
    }

    #[tokio::test]
    async fn other_organizer_cannot_preview() {
        let app = TestApp::spawn().await;
        let anna = app.register("anna@example.com", "Anna").await;
        let carl = app.register("carl@example.com", "Carl").await;
        let event = app.create_event(&anna, "Wedding", "wedding").await;

        let res = app.get_raw(&routes::event_card(event.id), Some(&carl)).await;
        assert_eq!(res.status(), 404);
    }
}
