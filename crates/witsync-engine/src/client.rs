//! Client abstraction for the remote WITSML store.
//!
//! The session talks to two narrow interfaces: one for object metadata and
//! one for data pages. [`WitsmlClient`] builds both out of a raw
//! [`QueryExecutor`], which is the only piece that touches the network.

use async_trait::async_trait;
use std::sync::Arc;

use witsync_core::{LogMetadata, ObjectRef, ObjectType, QueryRange};
use witsync_wire::{QueryBuilder, RawPayload, SchemaNormalizer, SchemaVersion};

use crate::error::{Result, SyncError};

/// Source of object metadata, already normalized.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Fetch the header of `object`.
    async fn fetch(&self, object: &ObjectRef) -> Result<LogMetadata>;
}

/// Source of raw data pages.
///
/// Pages come back unparsed so the session can tell transport failures from
/// schema failures.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Query `range` of `object` speaking schema `version`.
    async fn query(
        &self,
        object: &ObjectRef,
        range: &QueryRange,
        version: SchemaVersion,
    ) -> Result<RawPayload>;

    /// The schema version the server speaks.
    fn version(&self) -> SchemaVersion {
        SchemaVersion::V2
    }
}

/// Executes a query document against the server.
///
/// Implementations map transport failures to [`SyncError::QueryFailed`].
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run `query` for objects of `object_type`, returning the raw response.
    async fn execute(&self, object_type: ObjectType, query: &str) -> Result<String>;

    /// The schema version the server speaks.
    fn version(&self) -> SchemaVersion;
}

#[async_trait]
impl<T: MetadataClient + ?Sized> MetadataClient for Arc<T> {
    async fn fetch(&self, object: &ObjectRef) -> Result<LogMetadata> {
        (**self).fetch(object).await
    }
}

#[async_trait]
impl<T: DataClient + ?Sized> DataClient for Arc<T> {
    async fn query(
        &self,
        object: &ObjectRef,
        range: &QueryRange,
        version: SchemaVersion,
    ) -> Result<RawPayload> {
        (**self).query(object, range, version).await
    }

    fn version(&self) -> SchemaVersion {
        (**self).version()
    }
}

#[async_trait]
impl<T: QueryExecutor + ?Sized> QueryExecutor for Arc<T> {
    async fn execute(&self, object_type: ObjectType, query: &str) -> Result<String> {
        (**self).execute(object_type, query).await
    }

    fn version(&self) -> SchemaVersion {
        (**self).version()
    }
}

/// Metadata and data client over a [`QueryExecutor`].
///
/// Metadata responses are normalized before they are returned; data
/// responses are tagged with the executor's version and returned raw.
pub struct WitsmlClient<E> {
    executor: E,
    normalizer: SchemaNormalizer,
}

impl<E: QueryExecutor> WitsmlClient<E> {
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            normalizer: SchemaNormalizer::new(),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

#[async_trait]
impl<E: QueryExecutor> MetadataClient for WitsmlClient<E> {
    async fn fetch(&self, object: &ObjectRef) -> Result<LogMetadata> {
        let version = self.executor.version();
        let query = QueryBuilder::new(version).metadata_query(object)?;

        let body = self
            .executor
            .execute(object.object_type(), &query)
            .await
            .map_err(|e| SyncError::MetadataUnavailable(e.to_string()))?;

        let metadata = self
            .normalizer
            .metadata(object, &RawPayload::new(version, body))?;
        tracing::debug!(
            object = %object,
            kind = ?metadata.index_kind(),
            start = %metadata.start_index(),
            end = %metadata.end_index(),
            growing = metadata.is_growing(),
            "fetched metadata"
        );
        Ok(metadata)
    }
}

#[async_trait]
impl<E: QueryExecutor> DataClient for WitsmlClient<E> {
    async fn query(
        &self,
        object: &ObjectRef,
        range: &QueryRange,
        version: SchemaVersion,
    ) -> Result<RawPayload> {
        let query = QueryBuilder::new(version).data_query(object, range)?;
        let body = self.executor.execute(object.object_type(), &query).await?;
        Ok(RawPayload::new(version, body))
    }

    fn version(&self) -> SchemaVersion {
        self.executor.version()
    }
}

/// Scripted in-memory clients for tests and dry runs.
pub mod memory {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::sync::Mutex;
    use witsync_core::IndexCursor;
    use witsync_wire::NAMESPACE_V2;

    /// One scripted server reply.
    #[derive(Debug, Clone)]
    pub enum Reply {
        /// A response body.
        Body(String),
        /// A transport failure.
        Failure(String),
    }

    /// A metadata and data client that replays scripted responses.
    ///
    /// Each data query consumes the next reply; once the script runs out the
    /// last reply repeats. Every query waits `latency` first, which tests run
    /// against a paused clock.
    pub struct ScriptedClient {
        metadata: std::result::Result<LogMetadata, String>,
        version: SchemaVersion,
        latency: Duration,
        script: Mutex<Script>,
        queries: Mutex<Vec<QueryRange>>,
    }

    #[derive(Default)]
    struct Script {
        replies: VecDeque<Reply>,
        last: Option<Reply>,
    }

    impl Script {
        fn next(&mut self) -> Option<Reply> {
            if let Some(reply) = self.replies.pop_front() {
                self.last = Some(reply);
            }
            self.last.clone()
        }
    }

    impl ScriptedClient {
        pub fn new(metadata: LogMetadata) -> Self {
            Self::with_metadata(Ok(metadata))
        }

        /// A client whose metadata fetch fails with `message`.
        pub fn unavailable(message: impl Into<String>) -> Self {
            Self::with_metadata(Err(message.into()))
        }

        fn with_metadata(metadata: std::result::Result<LogMetadata, String>) -> Self {
            Self {
                metadata,
                version: SchemaVersion::V2,
                latency: Duration::ZERO,
                script: Mutex::new(Script::default()),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn with_version(mut self, version: SchemaVersion) -> Self {
            self.version = version;
            self
        }

        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        /// Append a response body to the script.
        pub fn reply(mut self, body: impl Into<String>) -> Self {
            self.script
                .get_mut()
                .replies
                .push_back(Reply::Body(body.into()));
            self
        }

        /// Append a transport failure to the script.
        pub fn fail(mut self, message: impl Into<String>) -> Self {
            self.script
                .get_mut()
                .replies
                .push_back(Reply::Failure(message.into()));
            self
        }

        /// Ranges of all data queries issued so far.
        pub async fn queries(&self) -> Vec<QueryRange> {
            self.queries.lock().await.clone()
        }
    }

    #[async_trait]
    impl MetadataClient for ScriptedClient {
        async fn fetch(&self, _object: &ObjectRef) -> Result<LogMetadata> {
            self.metadata
                .clone()
                .map_err(SyncError::MetadataUnavailable)
        }
    }

    #[async_trait]
    impl DataClient for ScriptedClient {
        async fn query(
            &self,
            _object: &ObjectRef,
            range: &QueryRange,
            _version: SchemaVersion,
        ) -> Result<RawPayload> {
            self.queries.lock().await.push(range.clone());
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let reply = self
                .script
                .lock()
                .await
                .next()
                .ok_or_else(|| SyncError::QueryFailed("script is empty".into()))?;

            match reply {
                Reply::Body(body) => Ok(RawPayload::new(self.version, body)),
                Reply::Failure(message) => Err(SyncError::QueryFailed(message)),
            }
        }

        fn version(&self) -> SchemaVersion {
            self.version
        }
    }

    /// A log held in memory that answers data queries by range.
    ///
    /// Rows are CSV lines in curve order, index first. A query returns the
    /// rows whose index lies inside the range, both bounds included, as a
    /// 1.4.1.1 document addressed to the requested object.
    pub struct LogStore {
        metadata: LogMetadata,
        rows: Vec<String>,
        queries: Mutex<Vec<QueryRange>>,
    }

    impl LogStore {
        pub fn new(
            metadata: LogMetadata,
            rows: impl IntoIterator<Item = impl Into<String>>,
        ) -> Self {
            Self {
                metadata,
                rows: rows.into_iter().map(Into::into).collect(),
                queries: Mutex::new(Vec::new()),
            }
        }

        /// Ranges of all data queries issued so far.
        pub async fn queries(&self) -> Vec<QueryRange> {
            self.queries.lock().await.clone()
        }

        fn rows_in(&self, range: &QueryRange) -> Result<Vec<&str>> {
            let mut selected = Vec::new();
            for line in &self.rows {
                let raw = line.split(',').next().unwrap_or_default();
                let index = IndexCursor::parse(range.kind(), raw)?;
                let above = index.compare(range.start())? != Ordering::Less;
                let below = match range.end() {
                    Some(end) => index.compare(end)? != Ordering::Greater,
                    None => true,
                };
                if above && below {
                    selected.push(line.as_str());
                }
            }
            Ok(selected)
        }
    }

    #[async_trait]
    impl MetadataClient for LogStore {
        async fn fetch(&self, _object: &ObjectRef) -> Result<LogMetadata> {
            Ok(self.metadata.clone())
        }
    }

    #[async_trait]
    impl DataClient for LogStore {
        async fn query(
            &self,
            object: &ObjectRef,
            range: &QueryRange,
            _version: SchemaVersion,
        ) -> Result<RawPayload> {
            self.queries.lock().await.push(range.clone());

            let curves = self.metadata.curves();
            let mnemonics: Vec<&str> = curves.iter().map(|c| c.mnemonic.as_str()).collect();
            let units: Vec<&str> = curves.iter().map(|c| c.unit.as_str()).collect();
            let data: String = self
                .rows_in(range)?
                .into_iter()
                .map(|row| format!("<data>{row}</data>"))
                .collect();

            let body = format!(
                r#"<logs xmlns="{NAMESPACE_V2}" version="1.4.1.1"><log uidWell="{}" uidWellbore="{}" uid="{}"><objectGrowing>{}</objectGrowing><logData><mnemonicList>{}</mnemonicList><unitList>{}</unitList>{data}</logData></log></logs>"#,
                object.well_id(),
                object.wellbore_id(),
                object.object_id(),
                self.metadata.is_growing(),
                mnemonics.join(","),
                units.join(","),
            );
            Ok(RawPayload::new(SchemaVersion::V2, body))
        }
    }

    /// A query executor that replays scripted bodies and records queries.
    pub struct RecordingExecutor {
        version: SchemaVersion,
        replies: Mutex<VecDeque<Reply>>,
        executed: Mutex<Vec<(ObjectType, String)>>,
    }

    impl RecordingExecutor {
        pub fn new(version: SchemaVersion, replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                version,
                replies: Mutex::new(replies.into_iter().collect()),
                executed: Mutex::new(Vec::new()),
            }
        }

        /// Every query document executed so far.
        pub async fn executed(&self) -> Vec<(ObjectType, String)> {
            self.executed.lock().await.clone()
        }
    }

    #[async_trait]
    impl QueryExecutor for RecordingExecutor {
        async fn execute(&self, object_type: ObjectType, query: &str) -> Result<String> {
            self.executed
                .lock()
                .await
                .push((object_type, query.to_string()));
            match self.replies.lock().await.pop_front() {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Failure(message)) => Err(SyncError::QueryFailed(message)),
                None => Err(SyncError::QueryFailed("no scripted reply".into())),
            }
        }

        fn version(&self) -> SchemaVersion {
            self.version
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::{RecordingExecutor, Reply};
    use super::*;
    use witsync_core::{IndexCursor, IndexKind};

    const V1_META: &str = r#"<logs xmlns="http://www.witsml.org/schemas/131" version="1.3.1.1">
  <log uidWell="W1" uidWellbore="B1" uid="L1">
    <objectGrowing>true</objectGrowing>
    <indexType>measured depth</indexType>
    <startIndex uom="m">100</startIndex>
    <endIndex uom="m">250</endIndex>
    <indexCurve columnIndex="1">DEPT</indexCurve>
    <logCurveInfo uid="GR"><mnemonic>GR</mnemonic><unit>gAPI</unit><columnIndex>2</columnIndex></logCurveInfo>
    <logCurveInfo uid="DEPT"><mnemonic>DEPT</mnemonic><unit>m</unit><columnIndex>1</columnIndex></logCurveInfo>
  </log>
</logs>"#;

    fn log_ref() -> ObjectRef {
        ObjectRef::new("W1", "B1", "L1", ObjectType::Log).unwrap()
    }

    #[tokio::test]
    async fn test_metadata_through_v1_executor() {
        let executor = Arc::new(RecordingExecutor::new(
            SchemaVersion::V1,
            [Reply::Body(V1_META.to_string())],
        ));
        let client = WitsmlClient::new(executor.clone());

        let meta = client.fetch(&log_ref()).await.unwrap();
        assert_eq!(meta.index_kind(), IndexKind::Depth);
        assert_eq!(meta.curves()[0].mnemonic, "DEPT");
        assert_eq!(*meta.end_index(), IndexCursor::depth(250.0).unwrap());

        let executed = executor.executed().await;
        assert_eq!(executed.len(), 1);
        assert!(executed[0].1.contains("<columnIndex/>"));
    }

    #[tokio::test]
    async fn test_transport_failure_during_metadata() {
        let refused = Reply::Failure("refused".into());
        let executor = RecordingExecutor::new(SchemaVersion::V2, [refused]);
        let err = WitsmlClient::new(executor).fetch(&log_ref()).await.unwrap_err();
        assert!(matches!(err, SyncError::MetadataUnavailable(_)));
    }

    #[tokio::test]
    async fn test_data_query_returns_raw_body() {
        let executor = RecordingExecutor::new(SchemaVersion::V2, [Reply::Body("<logs/>".into())]);
        let client = WitsmlClient::new(executor);
        let range = QueryRange::OpenEnded {
            start: IndexCursor::depth(251.0).unwrap(),
        };

        let raw = client.query(&log_ref(), &range, client.version()).await.unwrap();
        assert_eq!(raw.version, SchemaVersion::V2);
        assert_eq!(raw.body, "<logs/>");

        let executed = client.executor().executed().await;
        assert!(executed[0].1.contains("<startIndex>251.0</startIndex>"));
    }
}
