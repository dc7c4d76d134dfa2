//! Download a file
//!
//! The downloaded copy is kept in the scratch directory for inspection. The
//! public URL is probed whether or not the download worked.

use std::time::Instant;

use sdiag_core::ObjectPath;

use super::{check_public_url, format_size, report_error};
use crate::outcome::Outcome;
use crate::session::Session;

pub async fn download(session: &mut Session) -> anyhow::Result<Outcome> {
    let Some(bucket) = session.ask_required("Bucket name", "Bucket name").await? else {
        return Ok(Outcome::InputError);
    };
    let Some(key) = session.ask_required("File path in bucket", "File path").await? else {
        return Ok(Outcome::InputError);
    };
    let path = match ObjectPath::new(&bucket, &key) {
        Ok(path) => path,
        Err(e) => {
            session.out.error(&e.to_string());
            return Ok(Outcome::InputError);
        }
    };

    session.out.header(&format!("Download {path}"));

    let spinner = session.out.spinner("Downloading...");
    let started = Instant::now();
    let result = session.store.download(&path).await;
    let elapsed = started.elapsed();
    spinner.finish_and_clear();

    let downloaded = match result {
        Ok(download) => {
            session.out.success(&format!(
                "Downloaded {} in {} ms",
                format_size(download.bytes.len() as u64),
                elapsed.as_millis()
            ));
            session.out.field(
                "Content type",
                download.content_type.as_deref().unwrap_or("unknown"),
            );

            let name = format!("downloaded-{}", path.file_name());
            match session.workspace.write(&name, &download.bytes) {
                Ok(saved) => session.out.field("Saved to", &saved.display().to_string()),
                Err(e) => session.out.warning(&format!("Could not save a local copy: {e}")),
            }
            true
        }
        Err(e) => {
            report_error(&session.out, "Download failed", &e);
            false
        }
    };

    session.out.section("Public access");
    let reachable = check_public_url(session, &path).await;

    Ok(if downloaded {
        Outcome::Success.warn_if(!reachable)
    } else {
        Outcome::RemoteError
    })
}
