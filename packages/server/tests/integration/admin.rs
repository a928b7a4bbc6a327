use sea_orm::EntityTrait;
use serde_json::json;
use snapvault_server::entity::mail_settings;

use crate::common::{TestApp, routes};

mod overview {
    use super::*;

    #[tokio::test]
    async fn admin_routes_require_admin() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;

        for path in [
            routes::ADMIN_EVENTS,
            routes::ADMIN_USERS,
            routes::ADMIN_STATS,
            routes::ADMIN_SMTP,
        ] {
            let res = app.get_with_token(path, &token).await;
            assert_eq!(res.status, 403, "{path}");
            let res = app.get_without_token(path).await;
            assert_eq!(res.status, 401, "{path}");
        }
    }

    #[tokio::test]
    async fn event_list_includes_organizer_and_media_count() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let admin = app.admin_token().await;
        let event = app.create_event(&token, "Wedding", "wedding").await;
        app.upload(&event.slug, "a.jpg", "image/jpeg", vec![1u8; 10], None)
            .await;
        app.submit_payment(&token, &event).await;

        let res = app.get_with_token(routes::ADMIN_EVENTS, &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["organizer_email"], "anna@example.com");
        assert_eq!(list[0]["organizer_name"], "Anna");
        assert_eq!(list[0]["media_count"], 1);
        assert_eq!(list[0]["payment_status"], "awaiting_approval");
        assert_eq!(list[0]["qr_template"], "golden_elegance");
    }

    #[tokio::test]
    async fn user_list_shows_roles_and_event_counts() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let admin = app.admin_token().await;
        app.create_event(&token, "One", "wedding").await;
        app.create_event(&token, "Two", "birthday").await;

        let res = app.get_with_token(routes::ADMIN_USERS, &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        let users = res.body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        let anna = users
            .iter()
            .find(|u| u["email"] == "anna@example.com")
            .unwrap();
        assert_eq!(anna["role"], "organizer");
        assert_eq!(anna["event_count"], 2);
        let admin_row = users.iter().find(|u| u["role"] == "admin").unwrap();
        assert_eq!(admin_row["event_count"], 0);
    }

    #[tokio::test]
    async fn stats_count_everything() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let admin = app.admin_token().await;
        let paid = app.create_event(&token, "Paid", "wedding").await;
        let pending = app.create_event(&token, "Pending", "corporate").await;
        app.create_event(&token, "Fresh", "birthday").await;
        app.upload(&paid.slug, "a.jpg", "image/jpeg", vec![1u8; 100], None)
            .await;
        app.upload(&pending.slug, "b.jpg", "image/jpeg", vec![1u8; 250], None)
            .await;
        app.submit_payment(&token, &paid).await;
        app.submit_payment(&token, &pending).await;
        app.post_with_token(&routes::approve_payment(paid.id), &json!({}), &admin)
            .await;

        let res = app.get_with_token(routes::ADMIN_STATS, &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_users"], 2);
        assert_eq!(res.body["total_events"], 3);
        assert_eq!(res.body["paid_events"], 1);
        assert_eq!(res.body["awaiting_approval"], 1);
        assert_eq!(res.body["total_media"], 2);
        assert_eq!(res.body["storage_used"], 350);
    }

    #[tokio::test]
    async fn stats_on_empty_platform_are_zero() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.get_with_token(routes::ADMIN_STATS, &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total_media"], 0);
        assert_eq!(res.body["storage_used"], 0);
    }
}

mod smtp_settings {
    use super::*;

    #[tokio::test]
    async fn seeded_defaults_have_no_password() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.get_with_token(routes::ADMIN_SMTP, &admin).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["smtp_host"], "smtp.hostinger.com");
        assert_eq!(res.body["smtp_port"], 465);
        assert_eq!(res.body["smtp_password"], "");
    }

    #[tokio::test]
    async fn password_is_masked_and_kept_when_mask_is_sent_back() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .put_with_token(
                routes::ADMIN_SMTP,
                &json!({
                    "smtp_host": "smtp.example.com",
                    "smtp_port": 587,
                    "smtp_user": "mailer@example.com",
                    "smtp_password": "s3cret",
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["smtp_password"], "********");
        assert!(!res.text.contains("s3cret"));

        let res = app
            .put_with_token(
                routes::ADMIN_SMTP,
                &json!({
                    "smtp_host": "smtp2.example.com",
                    "smtp_port": 465,
                    "smtp_user": "mailer@example.com",
                    "smtp_password": "********",
                }),
                &admin,
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);

        let row = mail_settings::Entity::find_by_id(mail_settings::SINGLETON_ID)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.smtp_host, "smtp2.example.com");
        assert_eq!(row.smtp_password.as_deref(), Some("s3cret"));
    }

    #[tokio::test]
    async fn invalid_settings_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .put_with_token(
                routes::ADMIN_SMTP,
                &json!({"smtp_host": "", "smtp_port": 465, "smtp_user": "x"}),
                &admin,
            )
            .await;
        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn test_send_with_incomplete_settings_fails() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(routes::ADMIN_SMTP_TEST, &json!({}), &admin)
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}
