//! Growing-object continuation policies.
//!
//! After every query the session asks the policy whether the object still has
//! data to deliver and, if so, where the next query starts.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::cursor::{IndexCursor, IndexStep};
use crate::error::Result;
use crate::model::{LogDataPage, LogMetadata};

/// Which signal decides that an object has stopped growing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowingObjectPolicyKind {
    /// Trust the server's `objectGrowing` flag.
    #[default]
    ObjectGrowingFlag,
    /// Continue while the reported end is below the metadata's end index.
    MaxIndexComparison,
    /// Continue while the reported end is below a caller-supplied bound.
    FixedBatchBound,
}

/// How far past the reported end the next query starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContinuationBounds {
    pub depth_step: f64,
    pub time_step: Duration,
}

impl Default for ContinuationBounds {
    fn default() -> Self {
        Self {
            depth_step: 1.0,
            time_step: Duration::zero(),
        }
    }
}

impl ContinuationBounds {
    /// Lower bound of the query following one that reported `reported_end`.
    pub fn next_start(&self, reported_end: &IndexCursor) -> Result<IndexCursor> {
        let step = match reported_end {
            IndexCursor::Depth(_) => IndexStep::Depth(self.depth_step),
            IndexCursor::Time(_) => IndexStep::Time(self.time_step),
        };
        reported_end.advance(step)
    }
}

/// Everything a policy looks at after one query.
#[derive(Debug, Clone, Copy)]
pub struct PolicyInput<'a> {
    pub metadata: &'a LogMetadata,
    pub page: &'a LogDataPage,
    /// Upper bound for [`GrowingObjectPolicyKind::FixedBatchBound`]: the
    /// current window's end or a configured end index.
    pub bound: Option<&'a IndexCursor>,
}

/// A policy decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    Done,
    Continue { next_start: IndexCursor },
}

impl Continuation {
    pub fn is_done(&self) -> bool {
        matches!(self, Continuation::Done)
    }
}

/// A configured growing-object policy.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GrowingObjectPolicy {
    kind: GrowingObjectPolicyKind,
    bounds: ContinuationBounds,
}

impl GrowingObjectPolicy {
    pub fn new(kind: GrowingObjectPolicyKind, bounds: ContinuationBounds) -> Self {
        Self { kind, bounds }
    }

    pub fn kind(&self) -> GrowingObjectPolicyKind {
        self.kind
    }

    pub fn bounds(&self) -> &ContinuationBounds {
        &self.bounds
    }

    /// Decide whether to continue after a page.
    ///
    /// Fails with `KindMismatch` when the page's index kind differs from the
    /// metadata's or the bound's.
    pub fn evaluate(&self, input: &PolicyInput<'_>) -> Result<Continuation> {
        let reported = &input.page.reported_end;

        let more = match self.kind {
            GrowingObjectPolicyKind::ObjectGrowingFlag => input
                .page
                .object_growing
                .unwrap_or_else(|| input.metadata.is_growing()),
            GrowingObjectPolicyKind::MaxIndexComparison => {
                reported.compare(input.metadata.end_index())? == Ordering::Less
            }
            GrowingObjectPolicyKind::FixedBatchBound => {
                let bound = input.bound.unwrap_or_else(|| input.metadata.end_index());
                reported.compare(bound)? == Ordering::Less
            }
        };

        if !more {
            return Ok(Continuation::Done);
        }
        Ok(Continuation::Continue {
            next_start: self.bounds.next_start(reported)?,
        })
    }
}
