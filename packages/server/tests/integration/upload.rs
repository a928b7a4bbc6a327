use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use crate::common::{MAX_UPLOAD, TRANSCODE_THRESHOLD, TestApp, routes};

mod guest_upload {
    use super::*;

    #[tokio::test]
    async fn photo_is_stored_and_listed() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let res = app
            .upload(&event.slug, "IMG_0001.JPG", "image/jpeg", vec![7u8; 2048], Some("Aunt May"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["file_type"], "image");
        let media_id = res.uuid();

        let res = app.get_with_token(&routes::event_media(event.id), &token).await;
        assert_eq!(res.status, 200);
        let list = res.body.as_array().unwrap();
        assert_eq!(list.len(), 1);
        let item = &list[0];
        assert_eq!(item["id"], media_id.to_string());
        assert_eq!(item["original_name"], "IMG_0001.JPG");
        assert_eq!(item["uploader_name"], "Aunt May");
        assert_eq!(item["file_size"], 2048);
        let filename = item["filename"].as_str().unwrap();
        assert!(filename.ends_with(".jpg"), "{filename}");
        assert_ne!(filename, "IMG_0001.JPG");

        let file = app.get_raw(item["url"].as_str().unwrap(), None).await;
        assert_eq!(file.status(), 200);
        assert_eq!(file.headers()["content-type"], "image/jpeg");
        assert_eq!(file.bytes().await.unwrap().as_ref(), &[7u8; 2048][..]);

        let res = app.get_with_token(&routes::event(event.id), &token).await;
        assert_eq!(res.body["media_count"], 1);
    }

    #[tokio::test]
    async fn blank_uploader_defaults_to_guest() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Party", "birthday").await;

        let res = app
            .upload(&event.slug, "song.mp3", "audio/mpeg", vec![1u8; 10], Some("   "))
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["file_type"], "audio");

        let res = app.get_with_token(&routes::event_media(event.id), &token).await;
        assert_eq!(res.body[0]["uploader_name"], "Guest");
    }

    #[tokio::test]
    async fn unsupported_type_is_rejected_without_side_effects() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let res = app
            .upload(&event.slug, "notes.txt", "text/plain", b"hello".to_vec(), None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.stored_files(event.id).is_empty());
        let res = app.get_with_token(&routes::event_media(event.id), &token).await;
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn oversized_file_is_rejected_without_side_effects() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let too_big = usize::try_from(MAX_UPLOAD).unwrap() + 1;
        let res = app
            .upload(&event.slug, "big.jpg", "image/jpeg", vec![0u8; too_big], None)
            .await;

        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert!(app.stored_files(event.id).is_empty());
        let res = app.get_with_token(&routes::event_media(event.id), &token).await;
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn file_at_the_ceiling_is_accepted() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let exact = usize::try_from(MAX_UPLOAD).unwrap();
        let res = app
            .upload(&event.slug, "big.png", "image/png", vec![0u8; exact], None)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
    }

    #[tokio::test]
    async fn unknown_slug_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .upload("0123456789ab", "a.jpg", "image/jpeg", vec![1u8; 10], None)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn large_video_is_replaced_by_transcoded_copy() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let len = usize::try_from(TRANSCODE_THRESHOLD).unwrap() + 1;
        let res = app
            .upload(&event.slug, "dance.mov", "video/quicktime", vec![9u8; len], None)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["file_type"], "video");

        let files = app.stored_files(event.id);
        assert_eq!(files.len(), 1, "{files:?}");
        assert!(files[0].starts_with("c_"), "{files:?}");

        let res = app.get_with_token(&routes::event_media(event.id), &token).await;
        assert_eq!(res.body[0]["file_size"], 3);
        assert_eq!(res.body[0]["filename"], files[0].as_str());
        assert_eq!(res.body[0]["original_name"], "dance.mov");
    }

    #[tokio::test]
    async fn video_at_threshold_is_kept_as_is() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let len = usize::try_from(TRANSCODE_THRESHOLD).unwrap();
        let res = app
            .upload(&event.slug, "clip.mp4", "video/mp4", vec![9u8; len], None)
            .await;
        assert_eq!(res.status, 201, "{}", res.text);

        let files = app.stored_files(event.id);
        assert_eq!(files.len(), 1);
        assert!(!files[0].starts_with("c_"), "{files:?}");
        let res = app.get_with_token(&routes::event_media(event.id), &token).await;
        assert_eq!(res.body[0]["file_size"], TRANSCODE_THRESHOLD);
    }
}

mod files {
    use super::*;

    #[tokio::test]
    async fn traversal_and_unknown_names_are_not_found() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        for path in [
            format!("/api/v1/files/{}/missing.jpg", event.id),
            format!("/api/v1/files/{}/..%2Fsecret", event.id),
            "/api/v1/files/not-a-uuid/a.jpg".to_string(),
        ] {
            let res = app.get_raw(&path, None).await;
            assert_eq!(res.status(), 404, "{path}");
        }
    }
}

mod media_management {
    use super::*;

    #[tokio::test]
    async fn owner_can_delete_media() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;
        let id = app
            .upload(&event.slug, "a.jpg", "image/jpeg", vec![1u8; 10], None)
            .await
            .uuid();

        let res = app.delete_with_token(&routes::media(id), &token).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(app.stored_files(event.id).is_empty());

        let res = app.delete_with_token(&routes::media(id), &token).await;
        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn other_organizer_cannot_delete_media() {
        let app = TestApp::spawn().await;
        let anna = app.register("anna@example.com", "Anna").await;
        let carl = app.register("carl@example.com", "Carl").await;
        let event = app.create_event(&anna, "Wedding", "wedding").await;
        let id = app
            .upload(&event.slug, "a.jpg", "image/jpeg", vec![1u8; 10], None)
            .await
            .uuid();

        let res = app.delete_with_token(&routes::media(id), &carl).await;
        assert_eq!(res.status, 403);
        assert_eq!(app.stored_files(event.id).len(), 1);
    }

    #[tokio::test]
    async fn other_organizer_cannot_list_media() {
        let app = TestApp::spawn().await;
        let anna = app.register("anna@example.com", "Anna").await;
        let carl = app.register("carl@example.com", "Carl").await;
        let event = app.create_event(&anna, "Wedding", "wedding").await;

        let res = app.get_with_token(&routes::event_media(event.id), &carl).await;
        assert_eq!(res.status, 404);
    }
}

mod download {
    use super::*;

    #[tokio::test]
    async fn zip_contains_original_names_with_collision_suffixes() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Anna & Ben", "wedding").await;

        for (name, byte) in [("photo.jpg", 1u8), ("photo.jpg", 2u8), ("song.mp3", 3u8)] {
            let mime = if name.ends_with(".mp3") { "audio/mpeg" } else { "image/jpeg" };
            let res = app.upload(&event.slug, name, mime, vec![byte; 16], None).await;
            assert_eq!(res.status, 201, "{}", res.text);
        }

        let res = app.get_raw(&routes::event_download(event.id), Some(&token)).await;
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "application/zip");
        let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
        assert!(disposition.contains("Anna___Ben_media.zip"), "{disposition}");

        let bytes = res.bytes().await.unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        let mut contents = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut data = Vec::new();
            entry.read_to_end(&mut data).unwrap();
            contents.insert(entry.name().to_string(), data);
        }

        assert_eq!(contents.len(), 3, "{:?}", contents.keys());
        assert_eq!(contents["photo.jpg"], vec![1u8; 16]);
        assert_eq!(contents["photo (1).jpg"], vec![2u8; 16]);
        assert_eq!(contents["song.mp3"], vec![3u8; 16]);
    }

    #[tokio::test]
    async fn empty_event_has_nothing_to_download() {
        let app = TestApp::spawn().await;
        let token = app.register("anna@example.com", "Anna").await;
        let event = app.create_event(&token, "Wedding", "wedding").await;

        let res = app.get_raw(&routes::event_download(event.id), Some(&token)).await;
        assert_eq!(res.status(), 404);
    }
}
