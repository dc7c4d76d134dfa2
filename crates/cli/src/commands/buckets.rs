//! List buckets
//!
//! Prints one block per bucket. An empty project is a warning, not an error.

use sdiag_core::Bucket;

use super::{format_size, format_timestamp, report_error};
use crate::outcome::Outcome;
use crate::output::Formatter;
use crate::session::Session;

pub async fn list(session: &mut Session) -> anyhow::Result<Outcome> {
    session.out.header("Buckets");

    let spinner = session.out.spinner("Listing buckets...");
    let result = session.store.list_buckets().await;
    spinner.finish_and_clear();

    let buckets = match result {
        Ok(buckets) => buckets,
        Err(e) => {
            report_error(&session.out, "Failed to list buckets", &e);
            return Ok(Outcome::RemoteError);
        }
    };

    if buckets.is_empty() {
        session.out.warning(
            "No buckets found. Create one in the dashboard, or check that the key can see them.",
        );
        return Ok(Outcome::Warning);
    }

    session.out.success(&format!("Found {} bucket(s)", buckets.len()));
    for bucket in &buckets {
        print_bucket(&session.out, bucket);
    }
    Ok(Outcome::Success)
}

fn print_bucket(out: &Formatter, bucket: &Bucket) {
    out.println("");
    out.section(&bucket.name);
    out.field("ID", &bucket.id);
    out.field("Public", if bucket.public { "Yes" } else { "No" });
    out.field(
        "Created",
        &bucket
            .created_at
            .as_deref()
            .map(format_timestamp)
            .unwrap_or_else(|| "N/A".to_string()),
    );
    if let Some(limit) = bucket.file_size_limit {
        out.field("Size limit", &format_size(limit));
    }
    out.field(
        "Allowed types",
        &bucket
            .mime_restriction()
            .map(|types| types.join(", "))
            .unwrap_or_else(|| "Any".to_string()),
    );
}
