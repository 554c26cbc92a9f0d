use serde::{Deserialize, Serialize};

use crate::types::{AlertRecord, DaemonStatus, ModuleData, ReportSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DaemonResponse {
    Status(DaemonStatus),
    ModuleKeys(Vec<String>),
    ModuleData(Option<ModuleData>),
    AllData(Vec<ModuleData>),
    Report(Option<ReportSnapshot>),
    Alerts(Vec<AlertRecord>),
    UnlockRecorded { total: u64 },
    Ok,
    Error(String),
}

impl DaemonResponse {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
