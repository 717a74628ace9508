//! Session configuration.

use chrono::{Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use witsync_core::{
    offset_or_utc, ContinuationBounds, DayEdges, Granularity, GrowingObjectPolicy,
    GrowingObjectPolicyKind, IndexCursor, IndexKind, LogMetadata,
};
use witsync_render::{OutputFormat, RowFormatter};
use witsync_wire::SchemaVersion;

use crate::error::{Result, SyncError};

/// When a session splits its range into planned windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchPlanning {
    /// Only without a cursor, and only for time-indexed objects.
    #[default]
    FirstRun,
    /// Always plan; depth-indexed objects are rejected.
    Always,
    /// Never plan; query open-ended from the cursor.
    Never,
}

/// Configuration for one sync session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Which signal ends a growing object.
    pub policy: GrowingObjectPolicyKind,
    /// Output encoding handed to the sink.
    pub format: OutputFormat,
    /// Window granularity used when planning applies.
    pub granularity: Granularity,
    /// Wall-clock budget of one invocation.
    pub deadline_seconds: u64,
    /// UTC offset for day boundaries. Falls back to the object's offset,
    /// then UTC.
    pub timezone: Option<String>,
    pub planning: BatchPlanning,
    pub day_edges: DayEdges,
    /// Overrides the version reported by the data client.
    pub schema_version: Option<SchemaVersion>,
    /// Added to a depth end to get the next query's start.
    pub depth_step: f64,
    /// Added to a time end to get the next query's start.
    pub time_step_millis: i64,
    /// Upper bound of the sync, parsed in the object's index kind.
    pub end_index: Option<String>,
    /// Emit a units line in delimited output.
    pub include_units_row: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            policy: GrowingObjectPolicyKind::default(),
            format: OutputFormat::default(),
            granularity: Granularity::default(),
            deadline_seconds: 60,
            timezone: None,
            planning: BatchPlanning::default(),
            day_edges: DayEdges::default(),
            schema_version: None,
            depth_step: 1.0,
            time_step_millis: 0,
            end_index: None,
            include_units_row: false,
        }
    }
}

impl SyncConfig {
    /// Parse a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SyncError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.deadline_seconds == 0 {
            return Err(SyncError::InvalidConfig("deadline_seconds must be positive".into()));
        }
        if !self.depth_step.is_finite() || self.depth_step < 0.0 {
            return Err(SyncError::InvalidConfig(format!(
                "depth_step must be a non-negative number, got {}",
                self.depth_step
            )));
        }
        if self.time_step_millis < 0 {
            return Err(SyncError::InvalidConfig(format!(
                "time_step_millis must be non-negative, got {}",
                self.time_step_millis
            )));
        }
        Ok(())
    }

    pub fn deadline(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.deadline_seconds)
    }

    pub fn continuation_bounds(&self) -> ContinuationBounds {
        ContinuationBounds {
            depth_step: self.depth_step,
            time_step: Duration::milliseconds(self.time_step_millis),
        }
    }

    pub fn growing_policy(&self) -> GrowingObjectPolicy {
        GrowingObjectPolicy::new(self.policy, self.continuation_bounds())
    }

    pub fn formatter(&self) -> RowFormatter {
        RowFormatter::new(self.format).with_units_row(self.include_units_row)
    }

    /// Offset for day boundaries of `metadata`.
    pub fn timezone_for(&self, metadata: &LogMetadata) -> FixedOffset {
        match (&self.timezone, metadata.time_zone()) {
            (Some(tz), _) => offset_or_utc(Some(tz)),
            (None, Some(offset)) => offset,
            (None, None) => offset_or_utc(None),
        }
    }

    /// The configured end index in `kind`, if any.
    pub fn end_index(&self, kind: IndexKind) -> Result<Option<IndexCursor>> {
        self.end_index
            .as_deref()
            .map(|raw| {
                IndexCursor::parse(kind, raw)
                    .map_err(|e| SyncError::InvalidConfig(format!("end_index: {e}")))
            })
            .transpose()
    }

    /// Whether windows are planned for `kind` given the caller's cursor.
    pub fn plans_windows(&self, kind: IndexKind, has_cursor: bool) -> bool {
        match self.planning {
            BatchPlanning::FirstRun => !has_cursor && kind == IndexKind::Time,
            BatchPlanning::Always => true,
            BatchPlanning::Never => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.policy, GrowingObjectPolicyKind::ObjectGrowingFlag);
        assert_eq!(config.deadline(), std::time::Duration::from_secs(60));
        assert_eq!(config.continuation_bounds(), ContinuationBounds::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SyncConfig::from_json(
            r#"{"policy":"max_index_comparison","granularity":"per_calendar_day",
                "timezone":"-06:00","schema_version":"1.3.1.1","deadline_seconds":5}"#,
        )
        .unwrap();
        assert_eq!(config.policy, GrowingObjectPolicyKind::MaxIndexComparison);
        assert_eq!(config.granularity, Granularity::PerCalendarDay);
        assert_eq!(config.schema_version, Some(SchemaVersion::V1));
        assert_eq!(config.format, OutputFormat::Delimited);
        assert_eq!(config.deadline_seconds, 5);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        let err = SyncConfig::from_json(r#"{"deadline_seconds":0}"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
        let err = SyncConfig::from_json(r#"{"policy":"sometimes"}"#).unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
        let err = SyncConfig::from_json(r#"{"time_step_millis":-1}"#).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_end_index_parsing() {
        let config = SyncConfig {
            end_index: Some("2500".into()),
            ..Default::default()
        };
        assert_eq!(
            config.end_index(IndexKind::Depth).unwrap(),
            Some(IndexCursor::depth(2500.0).unwrap())
        );
        assert!(config.end_index(IndexKind::Time).is_err());
    }

    #[test]
    fn test_planning_modes() {
        let mut config = SyncConfig::default();
        assert!(config.plans_windows(IndexKind::Time, false));
        assert!(!config.plans_windows(IndexKind::Time, true));
        assert!(!config.plans_windows(IndexKind::Depth, false));
        config.planning = BatchPlanning::Always;
        assert!(config.plans_windows(IndexKind::Depth, true));
        config.planning = BatchPlanning::Never;
        assert!(!config.plans_windows(IndexKind::Time, false));
    }

    proptest::proptest! {
        #[test]
        fn test_validate_accepts_any_positive_step(
            step in 0.001f64..10_000.0,
            deadline in 1u64..3600,
        ) {
            let config = SyncConfig {
                depth_step: step,
                deadline_seconds: deadline,
                ..Default::default()
            };
            proptest::prop_assert!(config.validate().is_ok());
            proptest::prop_assert_eq!(config.continuation_bounds().depth_step, step);
        }
    }
}
