//! Sync session state machine.
//!
//! One session retrieves whatever is new for one object in one invocation:
//!
//! ```text
//! Initializing -> FetchingMetadata -> Planning -> Querying -> Evaluating
//!                                                    ^            |
//!                                                    +------------+--> Completed | Failed
//! ```
//!
//! The session owns its [`SessionState`] exclusively. Nothing is shared
//! between sessions, so many may run concurrently on independent tasks.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tokio::time::Instant;

use witsync_core::{
    BatchWindowPlanner, Continuation, CoreError, GrowingObjectPolicy, IndexCursor, LogDataPage,
    LogMetadata, ObjectRef, PolicyInput, QueryRange, QueryWindow, WHOLE_BATCH_ID,
};
use witsync_render::{ContentHash, Deduplicator, Emission, RenderedPayload, RowFormatter};
use witsync_wire::{SchemaNormalizer, SchemaVersion};

use crate::client::{DataClient, MetadataClient};
use crate::config::SyncConfig;
use crate::error::{FailureKind, Result, SyncError};
use crate::sink::{attr, Attributes, Reporter, Sink};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Initializing,
    FetchingMetadata,
    Planning,
    Querying,
    Evaluating,
    Completed,
    Failed,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Initializing => "initializing",
            SessionPhase::FetchingMetadata => "fetching_metadata",
            SessionPhase::Planning => "planning",
            SessionPhase::Querying => "querying",
            SessionPhase::Evaluating => "evaluating",
            SessionPhase::Completed => "completed",
            SessionPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the caller knows about an object from its previous invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncRequest {
    pub object: ObjectRef,
    /// Last delivered position; `None` on the first run.
    pub last_cursor: Option<IndexCursor>,
    /// Hash of the last emitted payload, for suppression across invocations.
    pub last_payload_hash: Option<ContentHash>,
}

impl SyncRequest {
    pub fn new(object: ObjectRef) -> Self {
        Self {
            object,
            last_cursor: None,
            last_payload_hash: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<IndexCursor>) -> Self {
        self.last_cursor = cursor;
        self
    }

    pub fn with_last_payload_hash(mut self, hash: Option<ContentHash>) -> Self {
        self.last_payload_hash = hash;
        self
    }
}

/// A failure reported inside a [`SyncResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&SyncError> for Failure {
    fn from(err: &SyncError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub object: ObjectRef,
    /// Cursor to persist: the end of the last page with rows, or the
    /// caller's cursor when no rows arrived.
    pub final_cursor: Option<IndexCursor>,
    /// Whether the object should be queried again soon.
    pub requires_requery: bool,
    /// Pages with rows evaluated.
    pub pages: usize,
    /// Payloads handed to the sink.
    pub emitted: usize,
    /// Payloads dropped as duplicates.
    pub suppressed: usize,
    /// Data queries issued.
    pub queries: usize,
    /// Hash to hand back with `final_cursor` on the next invocation.
    pub last_payload_hash: Option<ContentHash>,
    pub phase: SessionPhase,
    pub failure: Option<Failure>,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Mutable state of one running session.
#[derive(Debug)]
pub struct SessionState {
    object: ObjectRef,
    phase: SessionPhase,
    cursor: Option<IndexCursor>,
    dedup: Deduplicator,
    started: Instant,
    pages: usize,
    emitted: usize,
    suppressed: usize,
    queries: usize,
}

impl SessionState {
    fn new(request: SyncRequest) -> Self {
        Self {
            object: request.object,
            phase: SessionPhase::Initializing,
            cursor: request.last_cursor,
            dedup: Deduplicator::new(request.last_payload_hash),
            started: Instant::now(),
            pages: 0,
            emitted: 0,
            suppressed: 0,
            queries: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn cursor(&self) -> Option<&IndexCursor> {
        self.cursor.as_ref()
    }

    pub fn last_payload_hash(&self) -> Option<ContentHash> {
        self.dedup.last_hash()
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }

    fn enter(&mut self, phase: SessionPhase) {
        tracing::debug!(
            object = %self.object,
            from = %self.phase,
            to = %phase,
            "session transition"
        );
        self.phase = phase;
    }

    fn finish(self, requires_requery: bool, failure: Option<Failure>) -> SyncResult {
        SyncResult {
            object: self.object,
            final_cursor: self.cursor,
            requires_requery,
            pages: self.pages,
            emitted: self.emitted,
            suppressed: self.suppressed,
            queries: self.queries,
            last_payload_hash: self.dedup.last_hash(),
            phase: self.phase,
            failure,
        }
    }
}

/// What to do after a page has been evaluated.
enum Next {
    /// Query again from the given lower bound, in the same window if any.
    Requery(IndexCursor),
    /// Move to the following window (or the open-ended tail).
    Advance,
    /// Stop; `true` when more data is expected.
    Complete(bool),
}

/// Everything fixed for the duration of one session.
struct Plan {
    metadata: LogMetadata,
    version: SchemaVersion,
    windows: Vec<QueryWindow>,
    end_bound: Option<IndexCursor>,
    policy: GrowingObjectPolicy,
    formatter: RowFormatter,
}

/// Runs sessions against injected collaborators.
pub struct SyncSession<M, D, S, R> {
    metadata: M,
    data: D,
    sink: S,
    reporter: R,
    config: SyncConfig,
    normalizer: SchemaNormalizer,
}

impl<M, D, S, R> SyncSession<M, D, S, R>
where
    M: MetadataClient,
    D: DataClient,
    S: Sink,
    R: Reporter,
{
    pub fn new(metadata: M, data: D, sink: S, reporter: R, config: SyncConfig) -> Self {
        Self {
            metadata,
            data,
            sink,
            reporter,
            config,
            normalizer: SchemaNormalizer::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one invocation.
    ///
    /// Programming and protocol errors (see [`FailureKind::is_fatal`]) are
    /// returned as `Err`. Every other failure ends the invocation with
    /// `Ok`, a tagged [`Failure`], and the cursor of the last good page.
    pub async fn run(&self, request: SyncRequest) -> Result<SyncResult> {
        let mut state = SessionState::new(request);

        match self.drive(&mut state).await {
            Ok(requires_requery) => {
                state.enter(SessionPhase::Completed);
                tracing::info!(
                    object = %state.object,
                    queries = state.queries,
                    pages = state.pages,
                    emitted = state.emitted,
                    suppressed = state.suppressed,
                    requires_requery,
                    cursor = ?state.cursor,
                    "sync completed"
                );
                Ok(state.finish(requires_requery, None))
            }
            Err(err) if err.is_fatal() => {
                state.enter(SessionPhase::Failed);
                tracing::warn!(object = %state.object, error = %err, "sync aborted");
                Err(err)
            }
            Err(err) => {
                state.enter(SessionPhase::Failed);
                tracing::warn!(
                    object = %state.object,
                    kind = %err.kind(),
                    error = %err,
                    cursor = ?state.cursor,
                    "sync failed"
                );
                let failure = Failure::from(&err);
                Ok(state.finish(true, Some(failure)))
            }
        }
    }

    /// Drive the session to completion, returning `requires_requery`.
    async fn drive(&self, state: &mut SessionState) -> Result<bool> {
        // Phase 1: Initializing
        self.config.validate()?;

        // Phase 2: Fetching metadata
        state.enter(SessionPhase::FetchingMetadata);
        let metadata = self
            .metadata
            .fetch(&state.object)
            .await
            .map_err(metadata_unavailable)?;

        if let Some(cursor) = &state.cursor {
            if cursor.kind() != metadata.index_kind() {
                return Err(CoreError::KindMismatch {
                    left: cursor.kind(),
                    right: metadata.index_kind(),
                }
                .into());
            }
        }

        // Phase 3: Planning
        state.enter(SessionPhase::Planning);
        let policy = self.config.growing_policy();
        let mut start = match &state.cursor {
            Some(cursor) => policy.bounds().next_start(cursor)?,
            None => *metadata.start_index(),
        };
        let plan = self.plan(&metadata, state.cursor.is_some(), &start)?;

        if let Some(end) = &plan.end_bound {
            if start.compare(end)? == Ordering::Greater {
                tracing::debug!(
                    object = %state.object,
                    start = %start,
                    end = %end,
                    "nothing left below end index"
                );
                return Ok(false);
            }
        }

        // Phase 4/5: Query and evaluate until the policy or deadline stops us
        let mut window_idx = 0;
        loop {
            let window = plan.windows.get(window_idx);
            let range = match window {
                Some(w) => {
                    let lower = start.max(w.start)?;
                    if lower.compare(&w.end)? == Ordering::Greater {
                        window_idx += 1;
                        continue;
                    }
                    QueryRange::Bounded {
                        start: lower,
                        end: w.end,
                    }
                }
                None => match &plan.end_bound {
                    Some(end) if start.compare(end)? == Ordering::Greater => return Ok(false),
                    Some(end) => QueryRange::Bounded { start, end: *end },
                    None => QueryRange::OpenEnded { start },
                },
            };
            let batch_id = window.map_or(WHOLE_BATCH_ID, |w| w.batch_id.as_str());

            state.enter(SessionPhase::Querying);
            let page = self.query(state, &plan, &range).await?;

            state.enter(SessionPhase::Evaluating);
            let next = self
                .evaluate(state, &plan, &range, window, batch_id, page)
                .await?;

            match next {
                Next::Complete(requires_requery) => return Ok(requires_requery),
                Next::Requery(lower) => start = lower,
                Next::Advance => {
                    window_idx += 1;
                    if let Some(cursor) = &state.cursor {
                        start = policy.bounds().next_start(cursor)?;
                    }
                }
            }

            if state.elapsed() >= self.config.deadline() {
                tracing::debug!(
                    object = %state.object,
                    elapsed_ms = state.elapsed().as_millis() as u64,
                    queries = state.queries,
                    "deadline reached"
                );
                return Ok(true);
            }
        }
    }

    fn plan(
        &self,
        metadata: &LogMetadata,
        has_cursor: bool,
        start: &IndexCursor,
    ) -> Result<Plan> {
        let kind = metadata.index_kind();
        let end_bound = self.config.end_index(kind)?;
        let version = self
            .config
            .schema_version
            .unwrap_or_else(|| self.data.version());

        let mut windows = Vec::new();
        if self.config.plans_windows(kind, has_cursor) {
            let upper = end_bound.unwrap_or(*metadata.end_index());
            let timezone = self.config.timezone_for(metadata);
            let planner = BatchWindowPlanner::new(self.config.granularity, timezone)
                .with_day_edges(self.config.day_edges);
            windows = planner.plan(metadata.start_index(), &upper)?;

            let mut skipped = 0;
            windows.retain(|w| match w.end.compare(start) {
                Ok(Ordering::Less) => {
                    skipped += 1;
                    false
                }
                _ => true,
            });
            tracing::debug!(
                object = %metadata.object(),
                windows = windows.len(),
                skipped,
                "planned query windows"
            );
        }

        Ok(Plan {
            metadata: metadata.clone(),
            version,
            windows,
            end_bound,
            policy: self.config.growing_policy(),
            formatter: self.config.formatter(),
        })
    }

    async fn query(
        &self,
        state: &mut SessionState,
        plan: &Plan,
        range: &QueryRange,
    ) -> Result<LogDataPage> {
        tracing::debug!(
            object = %state.object,
            start = %range.start(),
            end = ?range.end().map(|e| e.to_string()),
            version = %plan.version,
            "querying"
        );

        self.reporter.increment_query_counter(&state.object);
        let began = Instant::now();
        let raw = self.data.query(&state.object, range, plan.version).await?;
        state.queries += 1;
        self.reporter.record_query_duration(&state.object, began.elapsed());

        let page = self.normalizer.page(&state.object, range, &raw)?;
        self.reporter
            .record_points_received(&state.object, page.point_count());
        Ok(page)
    }

    async fn evaluate(
        &self,
        state: &mut SessionState,
        plan: &Plan,
        range: &QueryRange,
        window: Option<&QueryWindow>,
        batch_id: &str,
        mut page: LogDataPage,
    ) -> Result<Next> {
        let bound = window.map(|w| &w.end).or(plan.end_bound.as_ref());
        let decision = plan.policy.evaluate(&PolicyInput {
            metadata: &plan.metadata,
            page: &page,
            bound,
        })?;
        let reported = page.reported_end;

        // Rows at or below the cursor were delivered already.
        if let Some(cursor) = state.cursor {
            if !page.is_empty() && reported.compare(&cursor)? == Ordering::Less {
                return Err(SyncError::CursorRegression { cursor, reported });
            }
            let redelivered = page.retain_after(&cursor)?;
            if redelivered > 0 {
                tracing::debug!(
                    object = %state.object,
                    rows = redelivered,
                    cursor = %cursor,
                    "dropped rows already delivered"
                );
                if page.is_empty() {
                    state.suppressed += 1;
                }
            }
        }

        if !page.is_empty() {
            let payload = plan.formatter.render(&state.object, &page)?;
            match state.dedup.offer(&payload) {
                Emission::Emit => {
                    let next_query = plan.policy.bounds().next_start(&reported)?;
                    let attributes = self.attributes(plan, &next_query, batch_id, &payload);
                    self.sink.emit(&state.object, &payload, &attributes).await;
                    state.emitted += 1;
                }
                Emission::Suppressed => {
                    tracing::debug!(
                        object = %state.object,
                        hash = %payload.content_hash,
                        "duplicate payload suppressed"
                    );
                    state.suppressed += 1;
                }
            }

            state.cursor = Some(reported);
            state.pages += 1;
            self.report_progress(state, plan, range, &reported);
        }

        let next_start = match decision {
            Continuation::Done => None,
            Continuation::Continue { next_start } => Some(next_start),
        };
        let progressed = match &next_start {
            Some(next) if !page.is_empty() => next.compare(range.start())? == Ordering::Greater,
            _ => false,
        };

        let next = match window {
            Some(w) => {
                let last = plan.windows.last().map_or(true, |l| l == w);
                let reached_end = !page.is_empty() && reported.compare(&w.end)? != Ordering::Less;
                match next_start {
                    None if last => Next::Complete(false),
                    Some(next) if progressed && !reached_end => Next::Requery(next),
                    _ => Next::Advance,
                }
            }
            None => match next_start {
                _ if page.is_empty() => {
                    tracing::debug!(object = %state.object, start = %range.start(), "no new data");
                    Next::Complete(false)
                }
                Some(next) if progressed => Next::Requery(next),
                _ => Next::Complete(false),
            },
        };
        Ok(next)
    }

    fn attributes(
        &self,
        plan: &Plan,
        next_query: &IndexCursor,
        batch_id: &str,
        payload: &RenderedPayload,
    ) -> Attributes {
        let object = plan.metadata.object();
        let mut attributes = Attributes::new();
        attributes.insert(attr::WELL_ID.into(), object.well_id().into());
        attributes.insert(attr::WELLBORE_ID.into(), object.wellbore_id().into());
        attributes.insert(attr::OBJECT_ID.into(), object.object_id().into());
        attributes.insert(attr::OBJECT_KIND.into(), object.object_type().as_str().into());
        attributes.insert(attr::OBJECT_TYPE.into(), plan.metadata.index_kind().label().into());
        if let Some(name) = plan.metadata.name_well() {
            attributes.insert(attr::NAME_WELL.into(), name.into());
        }
        let next_key = match next_query {
            IndexCursor::Depth(_) => attr::NEXT_QUERY_DEPTH,
            IndexCursor::Time(_) => attr::NEXT_QUERY_TIME,
        };
        attributes.insert(next_key.into(), next_query.format());
        attributes.insert(attr::BATCH_ID.into(), batch_id.into());
        attributes.insert(attr::MIME_TYPE.into(), payload.mime_type().into());
        attributes.insert(attr::CONTENT_HASH.into(), payload.content_hash.to_hex());
        attributes.insert(attr::SCHEMA_VERSION.into(), plan.version.as_str().into());
        attributes
    }

    fn report_progress(
        &self,
        state: &SessionState,
        plan: &Plan,
        range: &QueryRange,
        reported: &IndexCursor,
    ) {
        let object = &state.object;
        self.reporter.record_last_time_processed(object, reported);
        if let Some(span) = span(range.start(), reported) {
            self.reporter.record_time_span_per_query(object, span);
        }
        let start = plan.metadata.start_index();
        let end = plan.end_bound.as_ref().unwrap_or(plan.metadata.end_index());
        if let (Some(done), Some(total)) = (span(start, reported), span(start, end)) {
            let percent = if total > 0.0 { done / total * 100.0 } else { 100.0 };
            self.reporter
                .record_percent_to_done(object, percent.clamp(0.0, 100.0));
        }
    }
}

/// Non-fatal metadata errors all surface as `MetadataUnavailable`.
fn metadata_unavailable(err: SyncError) -> SyncError {
    match err {
        SyncError::MetadataUnavailable(_) => err,
        err if err.is_fatal() => err,
        err => SyncError::MetadataUnavailable(err.to_string()),
    }
}

/// Distance from `from` to `to` in metres or seconds.
fn span(from: &IndexCursor, to: &IndexCursor) -> Option<f64> {
    match (from, to) {
        (IndexCursor::Depth(a), IndexCursor::Depth(b)) => Some(b - a),
        (IndexCursor::Time(a), IndexCursor::Time(b)) => {
            Some((*b - *a).num_milliseconds() as f64 / 1000.0)
        }
        _ => None,
    }
}
