//! The Witsync handle: collaborators plus configuration.

use std::sync::Arc;
use tokio::task::JoinSet;

use witsync_core::{IndexCursor, ObjectRef};
use witsync_engine::{
    DataClient, MetadataClient, QueryExecutor, Reporter, Sink, SyncConfig, SyncRequest,
    SyncResult, SyncSession, TracingReporter, WitsmlClient,
};

use crate::error::{Result, WitsyncError};

type DynSession =
    SyncSession<Arc<dyn MetadataClient>, Arc<dyn DataClient>, Arc<dyn Sink>, Arc<dyn Reporter>>;

/// The main Witsync struct.
///
/// Owns the remote store clients, the sink, the reporter and a default
/// [`SyncConfig`]. Each call runs an independent session; nothing is carried
/// between calls except what the caller passes back in.
#[derive(Clone)]
pub struct Witsync {
    metadata: Arc<dyn MetadataClient>,
    data: Arc<dyn DataClient>,
    sink: Arc<dyn Sink>,
    reporter: Arc<dyn Reporter>,
    config: SyncConfig,
}

impl Witsync {
    /// Create a handle over a client serving both metadata and data.
    pub fn new<C, S>(client: Arc<C>, sink: Arc<S>) -> Self
    where
        C: MetadataClient + DataClient + 'static,
        S: Sink + 'static,
    {
        Self {
            metadata: client.clone(),
            data: client,
            sink,
            reporter: Arc::new(TracingReporter),
            config: SyncConfig::default(),
        }
    }

    /// Create a handle that speaks WITSML through `executor`.
    pub fn over_executor<E, S>(executor: E, sink: Arc<S>) -> Self
    where
        E: QueryExecutor + 'static,
        S: Sink + 'static,
    {
        Self::new(Arc::new(WitsmlClient::new(executor)), sink)
    }

    pub fn with_reporter<R: Reporter + 'static>(mut self, reporter: Arc<R>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Synchronization
    // ─────────────────────────────────────────────────────────────────────────

    /// Retrieve what is new for `object` since `last_cursor`.
    pub async fn synchronize(
        &self,
        object: ObjectRef,
        last_cursor: Option<IndexCursor>,
    ) -> Result<SyncResult> {
        self.synchronize_request(SyncRequest::new(object).with_cursor(last_cursor))
            .await
    }

    /// Run one session for `request` with the handle's configuration.
    pub async fn synchronize_request(&self, request: SyncRequest) -> Result<SyncResult> {
        self.synchronize_with(request, self.config.clone()).await
    }

    /// Run one session for `request` with an explicit configuration.
    pub async fn synchronize_with(
        &self,
        request: SyncRequest,
        config: SyncConfig,
    ) -> Result<SyncResult> {
        Ok(self.session(config).run(request).await?)
    }

    /// Run one session per request concurrently.
    ///
    /// Results come back in request order. A fatal error in one session does
    /// not affect the others.
    pub async fn synchronize_all(
        &self,
        requests: impl IntoIterator<Item = SyncRequest>,
    ) -> Vec<Result<SyncResult>> {
        let mut tasks = JoinSet::new();
        let mut count = 0;
        for (idx, request) in requests.into_iter().enumerate() {
            let session = self.session(self.config.clone());
            tasks.spawn(async move { (idx, session.run(request).await) });
            count += 1;
        }
        tracing::debug!(sessions = count, "synchronizing objects");

        let mut results: Vec<Option<Result<SyncResult>>> = (0..count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => results[idx] = Some(result.map_err(WitsyncError::from)),
                Err(e) => tracing::warn!(error = %e, "sync task did not complete"),
            }
        }

        results
            .into_iter()
            .map(|r| {
                r.unwrap_or_else(|| {
                    Err(WitsyncError::Task("session panicked or was cancelled".into()))
                })
            })
            .collect()
    }

    fn session(&self, config: SyncConfig) -> DynSession {
        SyncSession::new(
            self.metadata.clone(),
            self.data.clone(),
            self.sink.clone(),
            self.reporter.clone(),
            config,
        )
    }
}
