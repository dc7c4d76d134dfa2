//! Full diagnostics
//!
//! Runs every check in sequence: environment, bucket enumeration with a
//! shallow listing per bucket, an upload/download/delete round-trip on the
//! first bucket, and a public URL probe for an object that does not exist.
//! Ends with a summary table.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use sdiag_core::{Bucket, CheckStatus, ListOptions, ObjectPath, UploadOptions};

use super::{now_millis, report_error};
use crate::outcome::Outcome;
use crate::session::Session;
use crate::workspace::text_payload;

/// Fixed object path used for the round-trip
pub const ROUNDTRIP_KEY: &str = "diagnostics/sdiag-roundtrip.txt";

/// Bucket name used for the missing-object probe when the project has none
const FALLBACK_BUCKET: &str = "sdiag-missing-bucket";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Ok,
    Warn,
    Fail,
    Skipped,
}

impl Status {
    fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Fail => "FAIL",
            Status::Skipped => "SKIPPED",
        }
    }
}

/// One row of the summary table
struct Step {
    name: String,
    status: Status,
    detail: String,
}

#[derive(Default)]
struct Report {
    steps: Vec<Step>,
}

impl Report {
    fn record(&mut self, name: impl Into<String>, status: Status, detail: impl Into<String>) {
        self.steps.push(Step {
            name: name.into(),
            status,
            detail: detail.into(),
        });
    }

    fn outcome(&self) -> Outcome {
        if self.steps.iter().any(|s| s.status == Status::Fail) {
            Outcome::RemoteError
        } else {
            Outcome::Success.warn_if(self.steps.iter().any(|s| s.status == Status::Warn))
        }
    }

    fn render(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Check", "Status", "Detail"]);
        for step in &self.steps {
            table.add_row(vec![
                step.name.as_str(),
                step.status.label(),
                step.detail.as_str(),
            ]);
        }
        table.to_string()
    }
}

pub async fn run(session: &mut Session) -> anyhow::Result<Outcome> {
    let mut report = Report::default();
    session.out.header("Full Diagnostics");

    check_environment(session, &mut report);
    let buckets = check_buckets(session, &mut report).await;
    let first = buckets.as_ref().and_then(|b| b.first()).map(|b| b.name.clone());
    check_roundtrip(session, first.as_deref(), &mut report).await;
    check_missing_object(session, first.as_deref(), &mut report).await;

    session.out.println("");
    session.out.section("Summary");
    session.out.println(&report.render());

    let outcome = report.outcome();
    match outcome {
        Outcome::Success => session.out.success("All diagnostics passed"),
        Outcome::Warning => session.out.warning("Diagnostics finished with warnings"),
        _ => session.out.error("Diagnostics finished with failures"),
    }
    Ok(outcome)
}

fn check_environment(session: &Session, report: &mut Report) {
    session.out.section("Environment");
    for check in &session.checks {
        match check.status {
            CheckStatus::Pass => session.out.success(&check.message),
            CheckStatus::Warn => session.out.warning(&check.message),
            CheckStatus::Fail => session.out.error(&check.message),
        }
    }
    session
        .out
        .field("Active key", &session.config.key_kind.to_string());

    let warned = session.checks.iter().any(|c| c.status != CheckStatus::Pass);
    report.record(
        "Environment",
        if warned { Status::Warn } else { Status::Ok },
        format!("{} key", session.config.key_kind),
    );
}

async fn check_buckets(session: &Session, report: &mut Report) -> Option<Vec<Bucket>> {
    session.out.section("Buckets");
    let buckets = match session.store.list_buckets().await {
        Ok(buckets) => buckets,
        Err(e) => {
            report_error(&session.out, "Failed to list buckets", &e);
            report.record("List buckets", Status::Fail, e.to_string());
            return None;
        }
    };

    if buckets.is_empty() {
        session.out.warning("No buckets found");
        report.record("List buckets", Status::Warn, "no buckets");
        return Some(buckets);
    }
    session.out.success(&format!("Found {} bucket(s)", buckets.len()));
    report.record("List buckets", Status::Ok, format!("{} bucket(s)", buckets.len()));

    // One at a time, so output order follows bucket order
    for bucket in &buckets {
        let visibility = if bucket.public { "public" } else { "private" };
        match session
            .store
            .list_objects(&bucket.name, ListOptions::default())
            .await
        {
            Ok(entries) => {
                session.out.success(&format!(
                    "{} ({visibility}): {} entr{} at root",
                    bucket.name,
                    entries.len(),
                    if entries.len() == 1 { "y" } else { "ies" }
                ));
                report.record(
                    format!("List {}", bucket.name),
                    Status::Ok,
                    format!("{} entries", entries.len()),
                );
            }
            Err(e) => {
                report_error(&session.out, &format!("{} ({visibility})", bucket.name), &e);
                report.record(format!("List {}", bucket.name), Status::Fail, e.to_string());
            }
        }
    }
    Some(buckets)
}

async fn check_roundtrip(session: &Session, bucket: Option<&str>, report: &mut Report) {
    session.out.section("Upload / download / delete");
    let Some(bucket) = bucket else {
        session
            .out
            .warning("No bucket available; skipping the round-trip test");
        for step in ["Upload", "Download", "Delete"] {
            report.record(step, Status::Skipped, "no bucket");
        }
        return;
    };

    let path = match ObjectPath::new(bucket, ROUNDTRIP_KEY) {
        Ok(path) => path,
        Err(e) => {
            session.out.error(&e.to_string());
            report.record("Upload", Status::Fail, e.to_string());
            return;
        }
    };
    let body = text_payload(session.config.base_url(), jiff::Timestamp::now()).into_bytes();

    let options = UploadOptions {
        content_type: "text/plain".into(),
        cache_control: session.settings.defaults.cache_control.clone(),
        upsert: true,
    };
    match session.store.upload(&path, body.clone(), options).await {
        Ok(_) => {
            session.out.success(&format!("Upload OK ({path})"));
            report.record("Upload", Status::Ok, path.to_string());
        }
        Err(e) => {
            report_error(&session.out, "Upload FAILED", &e);
            report.record("Upload", Status::Fail, e.to_string());
            report.record("Download", Status::Skipped, "upload failed");
            report.record("Delete", Status::Skipped, "upload failed");
            return;
        }
    }

    match session.store.download(&path).await {
        Ok(download) if download.bytes == body => {
            session
                .out
                .success(&format!("Download OK ({} bytes)", download.bytes.len()));
            report.record("Download", Status::Ok, "content matches");
        }
        Ok(download) => {
            session.out.success("Download OK");
            session.out.warning(&format!(
                "Downloaded content differs from the upload ({} vs {} bytes)",
                download.bytes.len(),
                body.len()
            ));
            report.record("Download", Status::Warn, "content differs");
        }
        Err(e) => {
            report_error(&session.out, "Download FAILED", &e);
            report.record("Download", Status::Fail, e.to_string());
        }
    }

    delete_roundtrip_object(session, &path, report).await;
}

/// Remove the round-trip object; failures are warnings
async fn delete_roundtrip_object(session: &Session, path: &ObjectPath, report: &mut Report) {
    let out = &session.out;
    let keys = [path.key.clone()];
    match session.store.remove(&path.bucket, &keys).await {
        Ok(removed) if !removed.is_empty() => {
            out.success("Delete OK");
            report.record("Delete", Status::Ok, "removed");
        }
        Ok(_) => {
            out.warning(&format!(
                "Delete reported nothing removed; check {path} and remove it manually"
            ));
            report.record("Delete", Status::Warn, "nothing removed");
        }
        Err(e) => {
            out.warning(&format!("Delete failed: {e}; remove {path} manually"));
            out.hint(&e.hint());
            report.record("Delete", Status::Warn, e.to_string());
        }
    }
}

async fn check_missing_object(session: &Session, bucket: Option<&str>, report: &mut Report) {
    session.out.section("Missing object probe");
    let key = format!("sdiag-missing-{}.txt", now_millis());
    let path = match ObjectPath::new(bucket.unwrap_or(FALLBACK_BUCKET), &key) {
        Ok(path) => path,
        Err(e) => {
            session.out.error(&e.to_string());
            report.record("Missing object", Status::Fail, e.to_string());
            return;
        }
    };
    let url = match session.store.public_url(&path) {
        Ok(url) => url,
        Err(e) => {
            session.out.warning(&format!("Could not build public URL: {e}"));
            report.record("Missing object", Status::Warn, e.to_string());
            return;
        }
    };
    session.out.field("Probing", &url);

    // 404 is the healthy answer for an object that was never uploaded
    let probe = session.prober.probe(&url).await;
    match (probe.status_code, &probe.error) {
        (404, _) => {
            session
                .out
                .success("Nonexistent object returns HTTP 404 as expected");
            report.record("Missing object", Status::Ok, "HTTP 404");
        }
        (_, Some(error)) => {
            session
                .out
                .warning(&format!("Public endpoint unreachable: {error}"));
            report.record("Missing object", Status::Warn, error.clone());
        }
        (status, None) if probe.accessible => {
            session.out.warning(&format!(
                "Nonexistent object reported as accessible (HTTP {status})"
            ));
            report.record("Missing object", Status::Warn, format!("HTTP {status}"));
        }
        (status, None) => {
            session.out.warning(&format!(
                "Expected HTTP 404 for a nonexistent object, got HTTP {status}"
            ));
            report.record("Missing object", Status::Warn, format!("HTTP {status}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockProber, MockStore, TestSession, public_url_for};
    use sdiag_core::{Download, Error, Reachability, UploadReceipt};
    use std::sync::{Arc, Mutex};

    /// Store holding one empty bucket that behaves like a real one
    fn one_empty_bucket() -> MockStore {
        let stored: Arc<Mutex<Option<Vec<u8>>>> = Arc::default();
        let mut store = MockStore::new();
        store
            .expect_list_buckets()
            .times(1)
            .returning(|| Ok(vec![Bucket::new("media", "media", true)]));
        store
            .expect_list_objects()
            .withf(|bucket, options| bucket == "media" && options.prefix.is_empty())
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let upload_slot = Arc::clone(&stored);
        store
            .expect_upload()
            .withf(|path, _, options| {
                path.bucket == "media" && path.key == ROUNDTRIP_KEY && options.upsert
            })
            .times(1)
            .returning(move |path, body, _| {
                *upload_slot.lock().unwrap() = Some(body);
                Ok(UploadReceipt {
                    path: path.key.clone(),
                    full_path: path.to_string(),
                    id: None,
                })
            });

        let download_slot = Arc::clone(&stored);
        store.expect_download().times(1).returning(move |_| {
            Ok(Download {
                bytes: download_slot.lock().unwrap().clone().unwrap_or_default(),
                content_type: Some("text/plain".into()),
            })
        });
        store
            .expect_remove()
            .withf(|bucket, keys| bucket == "media" && keys == [ROUNDTRIP_KEY.to_string()])
            .times(1)
            .returning(|_, keys| Ok(keys.to_vec()));
        store
            .expect_public_url()
            .returning(|p| Ok(public_url_for(p)));
        store
    }

    fn prober_returning(status: u16) -> MockProber {
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .withf(|url| url.contains("/media/sdiag-missing-"))
            .times(1)
            .returning(move |_| Reachability::from_status(status));
        prober
    }

    #[tokio::test]
    async fn test_one_empty_bucket_round_trip_ok() {
        let mut test = TestSession::new(one_empty_bucket(), prober_returning(404), &[]);
        let outcome = run(&mut test.session).await.unwrap();

        let text = test.recorder.text();
        assert!(text.contains("✓ media (public): 0 entries at root"));
        assert!(text.contains("✓ Upload OK (media/diagnostics/sdiag-roundtrip.txt)"));
        assert!(text.contains("✓ Download OK"));
        assert!(text.contains("✓ Delete OK"));
        assert!(text.contains("✓ Nonexistent object returns HTTP 404 as expected"));
        assert!(!text.contains("✗"));
        // The anon key is unset in the test session, which is a warning
        assert_eq!(outcome, Outcome::Warning);
    }

    #[tokio::test]
    async fn test_unexpected_missing_object_status_is_a_warning() {
        let mut test = TestSession::new(one_empty_bucket(), prober_returning(400), &[]);
        run(&mut test.session).await.unwrap();

        assert!(test
            .recorder
            .contains("⚠ Expected HTTP 404 for a nonexistent object, got HTTP 400"));
    }

    #[tokio::test]
    async fn test_failed_delete_is_a_warning() {
        let mut store = MockStore::new();
        store
            .expect_list_buckets()
            .returning(|| Ok(vec![Bucket::new("media", "media", false)]));
        store.expect_list_objects().returning(|_, _| Ok(vec![]));
        store.expect_upload().returning(|path, _, _| {
            Ok(UploadReceipt {
                path: path.key.clone(),
                full_path: path.to_string(),
                id: None,
            })
        });
        store
            .expect_download()
            .returning(|_| Err(Error::Auth("new row violates row-level security policy".into())));
        store
            .expect_remove()
            .returning(|_, _| Err(Error::Api {
                status: 500,
                message: "internal".into(),
            }));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));

        let mut test = TestSession::new(store, prober_returning(404), &[]);
        let outcome = run(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::RemoteError);
        assert!(test.recorder.contains("✗ Download FAILED"));
        assert!(test.recorder.contains("⚠ Delete failed"));
        assert!(test.recorder.contains("remove media/diagnostics/sdiag-roundtrip.txt manually"));
    }

    #[tokio::test]
    async fn test_per_bucket_failure_does_not_stop_enumeration() {
        let mut store = MockStore::new();
        store.expect_list_buckets().returning(|| {
            Ok(vec![
                Bucket::new("broken", "broken", false),
                Bucket::new("media", "media", true),
            ])
        });
        store
            .expect_list_objects()
            .withf(|bucket, _| bucket == "broken")
            .times(1)
            .returning(|_, _| Err(Error::Auth("permission denied".into())));
        store
            .expect_list_objects()
            .withf(|bucket, _| bucket == "media")
            .times(1)
            .returning(|_, _| Ok(vec![sdiag_core::StorageEntry::dir("a")]));
        store.expect_upload().returning(|path, _, _| {
            Ok(UploadReceipt {
                path: path.key.clone(),
                full_path: path.to_string(),
                id: None,
            })
        });
        store.expect_download().returning(|_| {
            Ok(Download {
                bytes: vec![],
                content_type: None,
            })
        });
        store.expect_remove().returning(|_, _| Ok(vec![]));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .withf(|url| url.contains("/broken/sdiag-missing-"))
            .returning(|_| Reachability::from_status(404));

        let mut test = TestSession::new(store, prober, &[]);
        run(&mut test.session).await.unwrap();

        let text = test.recorder.text();
        assert!(text.contains("✗ broken (private): Unauthorized: permission denied"));
        assert!(text.contains("✓ media (public): 1 entry at root"));
        assert!(text.contains("⚠ Downloaded content differs"));
        assert!(text.contains("⚠ Delete reported nothing removed"));
    }

    #[tokio::test]
    async fn test_no_buckets_skips_round_trip() {
        let mut store = MockStore::new();
        store.expect_list_buckets().returning(|| Ok(vec![]));
        store.expect_public_url().returning(|p| Ok(public_url_for(p)));
        let mut prober = MockProber::new();
        prober
            .expect_probe()
            .withf(|url| url.contains("/sdiag-missing-bucket/sdiag-missing-"))
            .times(1)
            .returning(|_| Reachability::from_status(404));

        let mut test = TestSession::new(store, prober, &[]);
        let outcome = run(&mut test.session).await.unwrap();

        assert_eq!(outcome, Outcome::Warning);
        assert!(test.recorder.contains("skipping the round-trip test"));
        assert!(test.recorder.contains("SKIPPED"));
    }
}
