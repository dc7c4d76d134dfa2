//! Test doubles for handler tests

use async_trait::async_trait;
use mockall::mock;
use sdiag_core::{
    AuthSession, Bucket, Credentials, Download, ListOptions, ObjectPath, Reachability,
    ReachabilityProbe, Result, Settings, StorageApi, StorageEntry, UploadOptions, UploadReceipt,
};
use tempfile::TempDir;

use crate::input::ScriptedInput;
use crate::output::{Formatter, Recorder};
use crate::session::Session;
use crate::workspace::TempWorkspace;

mock! {
    pub Store {}

    #[async_trait]
    impl StorageApi for Store {
        async fn list_buckets(&self) -> Result<Vec<Bucket>>;
        async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<Vec<StorageEntry>>;
        async fn upload(
            &self,
            path: &ObjectPath,
            body: Vec<u8>,
            options: UploadOptions,
        ) -> Result<UploadReceipt>;
        async fn download(&self, path: &ObjectPath) -> Result<Download>;
        async fn remove(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>>;
        fn public_url(&self, path: &ObjectPath) -> Result<String>;
        fn public_base_url(&self) -> String;
        async fn current_session(&self) -> Result<AuthSession>;
    }
}

mock! {
    pub Prober {}

    #[async_trait]
    impl ReachabilityProbe for Prober {
        async fn probe(&self, url: &str) -> Reachability;
    }
}

pub const TEST_URL: &str = "https://abc.supabase.co";

/// A session wired to mocks, scripted input, and a recording formatter
pub struct TestSession {
    pub session: Session,
    pub recorder: Recorder,
    _dir: TempDir,
}

impl TestSession {
    pub fn new(store: MockStore, prober: MockProber, answers: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let validation =
            Credentials::new(Some(TEST_URL.into()), Some("service-key".into()), None).validate();
        let (out, recorder) = Formatter::recording();

        let session = Session {
            config: validation.config.clone().unwrap(),
            checks: validation.checks,
            settings: Settings::default(),
            store: Box::new(store),
            prober: Box::new(prober),
            input: Box::new(ScriptedInput::new(answers)),
            out,
            workspace: TempWorkspace::new(dir.path().join("temp-storage-test")),
        };

        Self {
            session,
            recorder,
            _dir: dir,
        }
    }
}

/// Public URL the way the REST client builds it
pub fn public_url_for(path: &ObjectPath) -> String {
    format!("{TEST_URL}/storage/v1/object/public/{path}")
}
