//! Output and instrumentation seams.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use witsync_core::{IndexCursor, ObjectRef};
use witsync_render::RenderedPayload;

/// Key/value annotations attached to an emitted payload.
pub type Attributes = BTreeMap<String, String>;

/// Attribute keys set on every emission.
pub mod attr {
    pub const WELL_ID: &str = "well.id";
    pub const WELLBORE_ID: &str = "wellbore.id";
    pub const OBJECT_ID: &str = "object.id";
    pub const OBJECT_KIND: &str = "object.kind";
    pub const OBJECT_TYPE: &str = "object.type";
    pub const NAME_WELL: &str = "name.well";
    pub const NEXT_QUERY_DEPTH: &str = "next.query.depth";
    pub const NEXT_QUERY_TIME: &str = "next.query.time";
    pub const BATCH_ID: &str = "batch.id";
    pub const MIME_TYPE: &str = "mime.type";
    pub const CONTENT_HASH: &str = "content.hash";
    pub const SCHEMA_VERSION: &str = "schema.version";
}

/// Receives rendered, deduplicated payloads.
///
/// Emission is infallible from the session's point of view: a sink that can
/// fail owns its own buffering and retry.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn emit(&self, object: &ObjectRef, payload: &RenderedPayload, attributes: &Attributes);
}

#[async_trait]
impl<T: Sink + ?Sized> Sink for Arc<T> {
    async fn emit(&self, object: &ObjectRef, payload: &RenderedPayload, attributes: &Attributes) {
        (**self).emit(object, payload, attributes).await
    }
}

/// Per-query measurements. Every method defaults to a no-op.
pub trait Reporter: Send + Sync {
    fn record_query_duration(&self, _object: &ObjectRef, _duration: Duration) {}

    fn record_points_received(&self, _object: &ObjectRef, _points: usize) {}

    fn increment_query_counter(&self, _object: &ObjectRef) {}

    /// Index span covered by one query, in index units (metres or seconds).
    fn record_time_span_per_query(&self, _object: &ObjectRef, _span: f64) {}

    /// Progress through the object's known range, `0.0..=100.0`.
    fn record_percent_to_done(&self, _object: &ObjectRef, _percent: f64) {}

    fn record_last_time_processed(&self, _object: &ObjectRef, _cursor: &IndexCursor) {}
}

impl<T: Reporter + ?Sized> Reporter for Arc<T> {
    fn record_query_duration(&self, object: &ObjectRef, duration: Duration) {
        (**self).record_query_duration(object, duration)
    }

    fn record_points_received(&self, object: &ObjectRef, points: usize) {
        (**self).record_points_received(object, points)
    }

    fn increment_query_counter(&self, object: &ObjectRef) {
        (**self).increment_query_counter(object)
    }

    fn record_time_span_per_query(&self, object: &ObjectRef, span: f64) {
        (**self).record_time_span_per_query(object, span)
    }

    fn record_percent_to_done(&self, object: &ObjectRef, percent: f64) {
        (**self).record_percent_to_done(object, percent)
    }

    fn record_last_time_processed(&self, object: &ObjectRef, cursor: &IndexCursor) {
        (**self).record_last_time_processed(object, cursor)
    }
}

/// Discards all measurements.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {}

/// Writes measurements as `tracing` events at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn record_query_duration(&self, object: &ObjectRef, duration: Duration) {
        tracing::debug!(object = %object, millis = duration.as_millis() as u64, "query duration");
    }

    fn record_points_received(&self, object: &ObjectRef, points: usize) {
        tracing::debug!(object = %object, points, "points received");
    }

    fn increment_query_counter(&self, object: &ObjectRef) {
        tracing::debug!(object = %object, "query issued");
    }

    fn record_time_span_per_query(&self, object: &ObjectRef, span: f64) {
        tracing::debug!(object = %object, span, "span per query");
    }

    fn record_percent_to_done(&self, object: &ObjectRef, percent: f64) {
        tracing::debug!(object = %object, percent, "percent to done");
    }

    fn record_last_time_processed(&self, object: &ObjectRef, cursor: &IndexCursor) {
        tracing::debug!(object = %object, cursor = %cursor, "last index processed");
    }
}

/// In-memory sink and reporter for tests.
pub mod memory {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Mutex;

    /// One captured emission.
    #[derive(Debug, Clone)]
    pub struct Emitted {
        pub object: ObjectRef,
        pub payload: RenderedPayload,
        pub attributes: Attributes,
    }

    /// Sink that keeps every emission.
    #[derive(Default)]
    pub struct MemorySink {
        emitted: Mutex<Vec<Emitted>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn emitted(&self) -> Vec<Emitted> {
            self.emitted.lock().await.clone()
        }

        pub async fn len(&self) -> usize {
            self.emitted.lock().await.len()
        }
    }

    #[async_trait]
    impl Sink for MemorySink {
        async fn emit(
            &self,
            object: &ObjectRef,
            payload: &RenderedPayload,
            attributes: &Attributes,
        ) {
            self.emitted.lock().await.push(Emitted {
                object: object.clone(),
                payload: payload.clone(),
                attributes: attributes.clone(),
            });
        }
    }

    /// A single captured measurement.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Measurement {
        QueryDuration(Duration),
        PointsReceived(usize),
        QueryCounter,
        TimeSpanPerQuery(f64),
        PercentToDone(f64),
        LastTimeProcessed(IndexCursor),
    }

    /// Reporter that keeps every measurement in call order.
    ///
    /// Reporter methods are synchronous, so this uses a std mutex.
    #[derive(Default)]
    pub struct RecordingReporter {
        measurements: StdMutex<Vec<Measurement>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn measurements(&self) -> Vec<Measurement> {
            match self.measurements.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            }
        }

        pub fn query_count(&self) -> usize {
            self.measurements()
                .iter()
                .filter(|m| matches!(m, Measurement::QueryCounter))
                .count()
        }

        fn push(&self, measurement: Measurement) {
            match self.measurements.lock() {
                Ok(mut guard) => guard.push(measurement),
                Err(poisoned) => poisoned.into_inner().push(measurement),
            }
        }
    }

    impl Reporter for RecordingReporter {
        fn record_query_duration(&self, _object: &ObjectRef, duration: Duration) {
            self.push(Measurement::QueryDuration(duration));
        }

        fn record_points_received(&self, _object: &ObjectRef, points: usize) {
            self.push(Measurement::PointsReceived(points));
        }

        fn increment_query_counter(&self, _object: &ObjectRef) {
            self.push(Measurement::QueryCounter);
        }

        fn record_time_span_per_query(&self, _object: &ObjectRef, span: f64) {
            self.push(Measurement::TimeSpanPerQuery(span));
        }

        fn record_percent_to_done(&self, _object: &ObjectRef, percent: f64) {
            self.push(Measurement::PercentToDone(percent));
        }

        fn record_last_time_processed(&self, _object: &ObjectRef, cursor: &IndexCursor) {
            self.push(Measurement::LastTimeProcessed(*cursor));
        }
    }
}
