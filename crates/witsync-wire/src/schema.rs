//! Serde shapes of WITSML 1.4.1.1 log and trajectory documents.
//!
//! Only the elements the engine reads are modelled; everything else is
//! ignored by the deserializer.

use serde::Deserialize;

/// Text content of an element that may also carry attributes.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Text {
    #[serde(rename = "$text", default)]
    pub value: String,
}

/// A measure with its unit of measure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Measure {
    #[serde(rename = "@uom", default)]
    pub uom: Option<String>,

    #[serde(rename = "$text", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogsDoc {
    #[serde(rename = "log", default)]
    pub logs: Vec<LogXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogXml {
    #[serde(rename = "@uid", default)]
    pub uid: Option<String>,

    #[serde(rename = "nameWell", default)]
    pub name_well: Option<String>,

    #[serde(rename = "objectGrowing", default)]
    pub object_growing: Option<String>,

    #[serde(rename = "indexType", default)]
    pub index_type: Option<String>,

    #[serde(rename = "startIndex", default)]
    pub start_index: Option<Measure>,

    #[serde(rename = "endIndex", default)]
    pub end_index: Option<Measure>,

    #[serde(rename = "startDateTimeIndex", default)]
    pub start_date_time_index: Option<String>,

    #[serde(rename = "endDateTimeIndex", default)]
    pub end_date_time_index: Option<String>,

    #[serde(rename = "indexCurve", default)]
    pub index_curve: Option<Text>,

    #[serde(rename = "logCurveInfo", default)]
    pub curves: Vec<LogCurveInfoXml>,

    #[serde(rename = "logData", default)]
    pub log_data: Vec<LogDataXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogCurveInfoXml {
    #[serde(default)]
    pub mnemonic: Option<Text>,

    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogDataXml {
    #[serde(rename = "mnemonicList", default)]
    pub mnemonic_list: Option<String>,

    #[serde(rename = "unitList", default)]
    pub unit_list: Option<String>,

    #[serde(rename = "data", default)]
    pub data: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrajectorysDoc {
    #[serde(rename = "trajectory", default)]
    pub trajectories: Vec<TrajectoryXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrajectoryXml {
    #[serde(rename = "@uid", default)]
    pub uid: Option<String>,

    #[serde(rename = "nameWell", default)]
    pub name_well: Option<String>,

    #[serde(rename = "objectGrowing", default)]
    pub object_growing: Option<String>,

    #[serde(rename = "mdMn", default)]
    pub md_min: Option<Measure>,

    #[serde(rename = "mdMx", default)]
    pub md_max: Option<Measure>,

    #[serde(rename = "trajectoryStation", default)]
    pub stations: Vec<StationXml>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StationXml {
    #[serde(default)]
    pub md: Option<Measure>,
    #[serde(default)]
    pub tvd: Option<Measure>,
    #[serde(default)]
    pub incl: Option<Measure>,
    #[serde(default)]
    pub azi: Option<Measure>,
    #[serde(rename = "dispNs", default)]
    pub disp_ns: Option<Measure>,
    #[serde(rename = "dispEw", default)]
    pub disp_ew: Option<Measure>,
    #[serde(rename = "vertSect", default)]
    pub vert_sect: Option<Measure>,
    #[serde(default)]
    pub dls: Option<Measure>,
}

/// Trajectory station columns in output order. The measured depth is the index.
pub(crate) const STATION_COLUMNS: [&str; 8] =
    ["MD", "TVD", "INCL", "AZI", "DISPNS", "DISPEW", "VERTSECT", "DLS"];

impl StationXml {
    pub fn columns(&self) -> [Option<&Measure>; 8] {
        [
            self.md.as_ref(),
            self.tvd.as_ref(),
            self.incl.as_ref(),
            self.azi.as_ref(),
            self.disp_ns.as_ref(),
            self.disp_ew.as_ref(),
            self.vert_sect.as_ref(),
            self.dls.as_ref(),
        ]
    }
}

/// Read a WITSML boolean (`true`/`false`/`1`/`0`).
pub(crate) fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
