mod request;
mod response;
mod types;
mod version;

pub use request::DaemonRequest;
pub use response::DaemonResponse;
pub use types::{
    AlertRecord, DaemonStatus, DataPoint, ModuleData, ModuleInfo, ReportSnapshot,
    MAX_RECENT_ALERTS,
};
pub use version::{MIN_SUPPORTED_VERSION, PROTOCOL_VERSION};
