//! Connectivity test
//!
//! Checks, in order: the client handle, the auth session, bucket listing,
//! and the public object endpoint.

use sdiag_core::Error;

use super::report_error;
use crate::outcome::Outcome;
use crate::session::Session;

pub async fn run(session: &mut Session) -> anyhow::Result<Outcome> {
    let out = &session.out;
    out.header("Connectivity Test");
    let mut failures = 0;
    let mut warnings = 0;

    out.success(&format!(
        "Client ready for {} ({} key)",
        session.config.base_url(),
        session.config.key_kind
    ));

    match session.store.current_session().await {
        Ok(auth) => out.success(&format!(
            "Auth session active for {}",
            auth.email.as_deref().unwrap_or(&auth.user_id)
        )),
        Err(Error::SessionMissing) => {
            out.success("No auth session (expected when using an API key)")
        }
        Err(e) => {
            failures += 1;
            report_error(out, "Auth session check failed", &e);
        }
    }

    match session.store.list_buckets().await {
        Ok(buckets) => out.success(&format!(
            "Storage API reachable ({} bucket(s) visible)",
            buckets.len()
        )),
        Err(e) => {
            failures += 1;
            report_error(out, "Storage API check failed", &e);
        }
    }

    // 400 here means the endpoint exists but refuses to list the path
    let base = session.store.public_base_url();
    let probe = session.prober.probe(&base).await;
    if probe.accessible || probe.status_code == 400 {
        out.success(&format!(
            "Public object endpoint reachable (HTTP {})",
            probe.status_code
        ));
    } else {
        warnings += 1;
        match &probe.error {
            Some(error) => out.warning(&format!("Public object endpoint unreachable: {error}")),
            None => out.warning(&format!(
                "Public object endpoint returned HTTP {}",
                probe.status_code
            )),
        }
    }

    Ok(if failures > 0 {
        out.error(&format!("Connectivity test finished with {failures} failure(s)"));
        Outcome::RemoteError
    } else {
        out.success("Connectivity test passed");
        Outcome::Success.warn_if(warnings > 0)
    })
}
