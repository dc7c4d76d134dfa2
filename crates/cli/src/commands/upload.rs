//! Upload handlers
//!
//! Generated payloads (text or a 1x1 PNG) are written to the scratch
//! directory, uploaded, and deleted again whatever the outcome. Custom
//! uploads read an existing local file.

use std::path::Path;
use std::time::Instant;

use sdiag_core::mime::content_type_for;
use sdiag_core::{ObjectPath, UploadOptions, join_key};

use super::{check_public_url, format_size, report_error};
use crate::outcome::Outcome;
use crate::session::Session;
use crate::workspace::{PNG_1X1, generated_name, text_payload};

/// Default folder for generated payloads
const DEFAULT_FOLDER: &str = "test-uploads";

pub async fn generated_text(session: &mut Session) -> anyhow::Result<Outcome> {
    let now = jiff::Timestamp::now();
    let body = text_payload(session.config.base_url(), now).into_bytes();
    upload_generated(session, &generated_name("txt", now), body, "text/plain").await
}

pub async fn generated_image(session: &mut Session) -> anyhow::Result<Outcome> {
    let now = jiff::Timestamp::now();
    upload_generated(session, &generated_name("png", now), PNG_1X1.to_vec(), "image/png").await
}

async fn upload_generated(
    session: &mut Session,
    name: &str,
    body: Vec<u8>,
    content_type: &str,
) -> anyhow::Result<Outcome> {
    let Some(bucket) = session.ask_required("Bucket name", "Bucket name").await? else {
        return Ok(Outcome::InputError);
    };
    let folder = session.ask_or("Destination folder", DEFAULT_FOLDER).await?;
    let path = match ObjectPath::new(&bucket, &join_key(&folder, name)) {
        Ok(path) => path,
        Err(e) => {
            session.out.error(&e.to_string());
            return Ok(Outcome::InputError);
        }
    };

    let local = session.workspace.write(name, &body)?;
    session
        .out
        .info(&format!("Generated {} ({})", local.display(), format_size(body.len() as u64)));

    let outcome = upload_bytes(session, &path, body, content_type).await;

    if let Err(e) = session.workspace.discard(&local) {
        session
            .out
            .warning(&format!("Could not delete {}: {e}", local.display()));
    }
    Ok(outcome)
}

pub async fn custom_file(session: &mut Session) -> anyhow::Result<Outcome> {
    let Some(local) = session.ask_required("Local file path", "File path").await? else {
        return Ok(Outcome::InputError);
    };
    let local = Path::new(&local);
    if !local.is_file() {
        session
            .out
            .error(&format!("Not a readable file: {}", local.display()));
        return Ok(Outcome::InputError);
    }
    let file_name = local
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(bucket) = session.ask_required("Bucket name", "Bucket name").await? else {
        return Ok(Outcome::InputError);
    };
    let destination = session.ask_or("Destination path", &file_name).await?;
    let content_type = session.ask("Content type (blank to infer)").await?;
    let content_type = if content_type.is_empty() {
        content_type_for(local).to_string()
    } else {
        content_type
    };

    let path = match ObjectPath::new(&bucket, &destination) {
        Ok(path) => path,
        Err(e) => {
            session.out.error(&e.to_string());
            return Ok(Outcome::InputError);
        }
    };

    let body = std::fs::read(local)?;
    Ok(upload_bytes(session, &path, body, &content_type).await)
}

/// Upload with overwrite, report timing, then probe the public URL
pub(crate) async fn upload_bytes(
    session: &Session,
    path: &ObjectPath,
    body: Vec<u8>,
    content_type: &str,
) -> Outcome {
    session.out.header("Upload");
    session.out.field("Destination", &path.to_string());
    session.out.field("Content type", content_type);
    session.out.field("Size", &format_size(body.len() as u64));

    let options = UploadOptions {
        content_type: content_type.to_string(),
        cache_control: session.settings.defaults.cache_control.clone(),
        upsert: true,
    };

    let spinner = session.out.spinner("Uploading...");
    let started = Instant::now();
    let result = session.store.upload(path, body, options).await;
    let elapsed = started.elapsed();
    spinner.finish_and_clear();

    match result {
        Ok(receipt) => {
            session
                .out
                .success(&format!("Uploaded in {} ms", elapsed.as_millis()));
            session.out.field("Stored path", &receipt.path);
            if let Some(id) = &receipt.id {
                session.out.field("Object ID", id);
            }
            let reachable = check_public_url(session, path).await;
            Outcome::Success.warn_if(!reachable)
        }
        Err(e) => {
            report_error(&session.out, "Upload failed", &e);
            Outcome::RemoteError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProber, MockStore, TestSession, public_url_for};
    use sdiag_core::{Error, Reachability, UploadReceipt};

    fn receipt_for(path: &ObjectPath) -> UploadReceipt {
        UploadReceipt {
            path: path.key.clone(),
            full_path: path.to_string(),
            id: Some("obj-1".into()),
        }
    }

    fn reachable_prober() -> MockProber {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .times(1)
            .returning(|_| Reachability::from_status(200));
        prober
    }

    #[tokio::test]
    async fn test_generated_text_upload() {
        let mut store = MockStore::new();
        store
            .expect_upload()
            .withf(|path, body, options| {
                path.bucket == "media"
                    && path.key.starts_with("test-uploads/test-")
                    && path.key.ends_with(".txt")
                    && String::from_utf8_lossy(body).contains("abc.supabase.co")
                    && options.content_type == "text/plain"
                    && options.cache_control == "3600"
                    && options.upsert
            })
            .times(1)
            .returning(|path, _, _| Ok(receipt_for(path)));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));

        let mut test = TestSession::new(store, reachable_prober(), &["media", ""]);
        let outcome = generated_text(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        assert!(test.recorder.contains("✓ Uploaded in"));
        assert!(test.recorder.contains("✓ Public URL is reachable (HTTP 200)"));
        let leftovers = std::fs::read_dir(test.session.workspace.root()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_generated_image_deleted_after_failed_upload() {
        let mut store = MockStore::new();
        store
            .expect_upload()
            .withf(|_, body, options| body.as_slice() == PNG_1X1 && options.content_type == "image/png")
            .returning(|_, _, _| {
                Err(Error::Api {
                    status: 413,
                    message: "The object exceeded the maximum allowed size limit".into(),
                })
            });

        let mut test = TestSession::new(store, MockProber::new(), &["media", "images"]);
        let outcome = generated_image(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::RemoteError);
        assert!(test.recorder.contains("✗ Upload failed"));
        assert!(test.recorder.contains("💡 Limit reached"));
        let leftovers = std::fs::read_dir(test.session.workspace.root()).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_stored_path_equals_requested_path() {
        let mut store = MockStore::new();
        store
            .expect_upload()
            .returning(|path, _, _| Ok(receipt_for(path)));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .returning(|_| Reachability::from_status(400));

        let test = TestSession::new(store, prober, &[]);
        let path = ObjectPath::new("media", "reports/2024/q1.pdf").unwrap();
        let outcome = upload_bytes(&test.session, &path, b"%PDF".to_vec(), "application/pdf").await;

        assert_eq!(outcome, Outcome::Warning);
        assert!(test.recorder.contains("  Stored path:     reports/2024/q1.pdf"));
        assert!(test.recorder.contains("⚠ Public URL returned HTTP 400"));
    }

    #[tokio::test]
    async fn test_custom_file_infers_content_type() {
        let dir = tempfile::TempDir::new().unwrap();
        let local = dir.path().join("photo.JPG");
        std::fs::write(&local, b"jpeg bytes").unwrap();
        let local = local.to_string_lossy().into_owned();

        let mut store = MockStore::new();
        store
            .expect_upload()
            .withf(|path, body, options| {
                path.key == "photo.JPG"
                    && body.as_slice() == b"jpeg bytes"
                    && options.content_type == "image/jpeg"
            })
            .times(1)
            .returning(|path, _, _| Ok(receipt_for(path)));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));

        let mut test = TestSession::new(store, reachable_prober(), &[&local, "media", "", ""]);
        let outcome = custom_file(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_custom_file_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let local = dir.path().join("data.bin");
        std::fs::write(&local, b"{}").unwrap();
        let local = local.to_string_lossy().into_owned();

        let mut store = MockStore::new();
        store
            .expect_upload()
            .withf(|path, _, options| {
                path.key == "configs/app.json" && options.content_type == "application/json"
            })
            .times(1)
            .returning(|path, _, _| Ok(receipt_for(path)));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));

        let mut test = TestSession::new(
            store,
            reachable_prober(),
            &[&local, "media", "/configs//app.json", "application/json"],
        );
        let outcome = custom_file(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_custom_file_missing() {
        let mut test = TestSession::new(
            MockStore::new(),
            MockProber::new(),
            &["/definitely/not/here.txt"],
        );
        let outcome = custom_file(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::InputError);
        assert!(test.recorder.contains("✗ Not a readable file"));
    }

    #[tokio::test]
    async fn test_bucket_required() {
        let mut test = TestSession::new(MockStore::new(), MockProber::new(), &[""]);
        let outcome = generated_text(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::InputError);
        assert!(test.recorder.contains("✗ Bucket name is required"));
    }
}
