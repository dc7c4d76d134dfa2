//! List files in a bucket
//!
//! Shows the first page of entries under a prefix. Files get their public
//! URL printed (not probed); folders are only named.

use sdiag_core::{EntryKind, ListOptions, ObjectPath, join_key};

use super::{format_size, report_error};
use crate::outcome::Outcome;
use crate::session::Session;

pub async fn list(session: &mut Session) -> anyhow::Result<Outcome> {
    let Some(bucket) = session.ask_required("Bucket name", "Bucket name").await? else {
        return Ok(Outcome::InputError);
    };
    let prefix = session.ask("Folder path (blank for root)").await?;

    let options = ListOptions {
        prefix: prefix.clone(),
        ..Default::default()
    };
    let limit = options.limit as usize;
    let location = join_key(&bucket, &prefix);
    session.out.header(&format!("Files in {location}"));

    let spinner = session.out.spinner("Listing files...");
    let result = session.store.list_objects(&bucket, options).await;
    spinner.finish_and_clear();

    let entries = match result {
        Ok(entries) => entries,
        Err(e) => {
            report_error(&session.out, &format!("Failed to list {location}"), &e);
            return Ok(Outcome::RemoteError);
        }
    };

    if entries.is_empty() {
        session.out.warning(&format!("No files found in {location}"));
        return Ok(Outcome::Warning);
    }

    let mut files = 0;
    let mut folders = 0;
    for entry in &entries {
        match entry.kind() {
            EntryKind::Directory => {
                folders += 1;
                session.out.println(&format!("📁 {}/", entry.name));
            }
            EntryKind::File => {
                files += 1;
                session.out.println(&format!(
                    "📄 {} ({}, {})",
                    entry.name,
                    format_size(entry.size_bytes()),
                    entry.mime_type()
                ));
                let url = ObjectPath::new(&bucket, &join_key(&prefix, &entry.name))
                    .and_then(|path| session.store.public_url(&path));
                match url {
                    Ok(url) => session.out.field("Public URL", &url),
                    Err(e) => session.out.warning(&format!("No public URL: {e}")),
                }
            }
        }
    }

    session
        .out
        .success(&format!("{files} file(s), {folders} folder(s)"));
    if entries.len() >= limit {
        session
            .out
            .info(&format!("Showing the first {limit} entries; more may exist"));
    }
    Ok(Outcome::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProber, MockStore, TestSession, public_url_for};
    use mockall::predicate::eq;
    use sdiag_core::{ObjectMetadata, StorageEntry};

    #[tokio::test]
    async fn test_bucket_name_required() {
        let mut test = TestSession::new(MockStore::new(), MockProber::new(), &[""]);
        let outcome = list(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::InputError);
        assert!(test.recorder.contains("✗ Bucket name is required"));
    }

    #[tokio::test]
    async fn test_directories_never_get_public_urls() {
        let mut store = MockStore::new();
        store
            .expect_list_objects()
            .withf(|bucket, options| bucket == "media" && options.prefix == "2024" && options.limit == 100)
            .times(1)
            .returning(|_, _| {
                let mut photo = StorageEntry::file("photo.png", "0b1c");
                photo.metadata = Some(ObjectMetadata {
                    size: Some(2048),
                    mimetype: Some("image/png".into()),
                });
                Ok(vec![
                    StorageEntry::dir("thumbnails"),
                    photo,
                    StorageEntry::file("notes", "9f2e"),
                ])
            });
        store
            .expect_public_url()
            .with(eq(ObjectPath::new("media", "2024/photo.png").unwrap()))
            .times(1)
            .returning(|p| Ok(public_url_for(p)));
        store
            .expect_public_url()
            .with(eq(ObjectPath::new("media", "2024/notes").unwrap()))
            .times(1)
            .returning(|p| Ok(public_url_for(p)));

        // No probe expectations: listing must not probe
        let mut test = TestSession::new(store, MockProber::new(), &["media", "2024"]);
        let outcome = list(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::Success);
        let text = test.recorder.text();
        assert!(text.contains("📁 thumbnails/"));
        assert!(text.contains("📄 photo.png (2 KiB, image/png)"));
        assert!(text.contains("📄 notes (0 B, N/A)"));
        assert!(text.contains("/storage/v1/object/public/media/2024/photo.png"));
        assert!(text.contains("2 file(s), 1 folder(s)"));
        assert!(!text.contains("more may exist"));
    }

    #[tokio::test]
    async fn test_empty_listing_is_a_warning() {
        let mut store = MockStore::new();
        store.expect_list_objects().returning(|_, _| Ok(vec![]));

        let mut test = TestSession::new(store, MockProber::new(), &["media", ""]);
        let outcome = list(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::Warning);
        assert!(test.recorder.contains("⚠ No files found in media"));
    }

    #[tokio::test]
    async fn test_full_page_notes_more_entries() {
        let mut store = MockStore::new();
        store.expect_list_objects().returning(|_, _| {
            Ok((0..100).map(|i| StorageEntry::dir(format!("d{i}"))).collect())
        });

        let mut test = TestSession::new(store, MockProber::new(), &["media", ""]);
        list(&mut test.session).await.unwrap();

        assert!(test.recorder.contains("Showing the first 100 entries; more may exist"));
    }

    #[tokio::test]
    async fn test_missing_bucket_prints_hint() {
        let mut store = MockStore::new();
        store
            .expect_list_objects()
            .returning(|_, _| Err(sdiag_core::Error::NotFound("Bucket not found".into())));

        let mut test = TestSession::new(store, MockProber::new(), &["nope", ""]);
        let outcome = list(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::RemoteError);
        assert!(test.recorder.contains("💡 Resource not found"));
    }
}
