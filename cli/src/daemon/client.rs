use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use ebox_protocol::{
    AlertRecord, DaemonRequest, DaemonResponse, DaemonStatus, ModuleData, ReportSnapshot,
    MIN_SUPPORTED_VERSION, PROTOCOL_VERSION,
};

use crate::daemon::socket_path;

const IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MismatchKind {
    /// The daemon no longer accepts this client's protocol.
    ClientTooOld,
    /// This client no longer understands the daemon's protocol.
    DaemonTooOld,
}

#[derive(Debug, Clone)]
pub struct VersionMismatch {
    pub kind: MismatchKind,
    pub daemon_protocol_version: u32,
    pub daemon_min_supported: u32,
    pub daemon_version: String,
}

impl fmt::Display for VersionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MismatchKind::ClientTooOld => write!(
                f,
                "Protocol version mismatch: ebox uses protocol v{}, but the daemon (v{}) requires v{}+.\n\
                 Update ebox and try again.",
                PROTOCOL_VERSION, self.daemon_version, self.daemon_min_supported
            ),
            MismatchKind::DaemonTooOld => write!(
                f,
                "Protocol version mismatch: the daemon (v{}) uses protocol v{}, but ebox requires v{}+.\n\
                 Restart the daemon: ebox daemon stop && ebox daemon start",
                self.daemon_version, self.daemon_protocol_version, MIN_SUPPORTED_VERSION
            ),
        }
    }
}

impl std::error::Error for VersionMismatch {}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Daemon error: {0}")]
    Daemon(String),

    #[error(transparent)]
    VersionMismatch(#[from] VersionMismatch),
}

pub type Result<T> = std::result::Result<T, ClientError>;

pub fn check_version_compatibility(status: &DaemonStatus) -> Result<()> {
    let kind = if PROTOCOL_VERSION < status.min_supported_version {
        MismatchKind::ClientTooOld
    } else if status.protocol_version < MIN_SUPPORTED_VERSION {
        MismatchKind::DaemonTooOld
    } else {
        return Ok(());
    };

    Err(VersionMismatch {
        kind,
        daemon_protocol_version: status.protocol_version,
        daemon_min_supported: status.min_supported_version,
        daemon_version: status.version.clone(),
    }
    .into())
}

/// Blocking request/response client for the daemon socket.
pub struct DaemonClient {
    reader: BufReader<UnixStream>,
    writer: UnixStream,
}

impl DaemonClient {
    pub fn connect() -> Result<Self> {
        let stream = UnixStream::connect(socket_path())?;
        stream.set_read_timeout(Some(IO_TIMEOUT))?;
        stream.set_write_timeout(Some(IO_TIMEOUT))?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
        })
    }

    /// Connects and rejects daemons speaking an incompatible protocol.
    pub fn connect_checked() -> Result<Self> {
        let mut client = Self::connect()?;
        let status = client.get_status()?;
        check_version_compatibility(&status)?;
        Ok(client)
    }

    fn send_request(&mut self, request: DaemonRequest) -> Result<DaemonResponse> {
        let json = request
            .to_json()
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ClientError::Protocol("Connection closed".into()));
        }
        tracing::debug!(line_len = line.len(), "Read daemon response");

        match DaemonResponse::from_json(line.trim()) {
            Ok(DaemonResponse::Error(e)) => Err(ClientError::Daemon(e)),
            Ok(response) => Ok(response),
            Err(e) => Err(ClientError::Protocol(e.to_string())),
        }
    }

    pub fn get_status(&mut self) -> Result<DaemonStatus> {
        match self.send_request(DaemonRequest::GetStatus)? {
            DaemonResponse::Status(status) => Ok(status),
            other => Err(unexpected(other)),
        }
    }

    pub fn get_module_keys(&mut self) -> Result<Vec<String>> {
        match self.send_request(DaemonRequest::GetModuleKeys)? {
            DaemonResponse::ModuleKeys(keys) => Ok(keys),
            other => Err(unexpected(other)),
        }
    }

    pub fn get_module_data(&mut self, key: &str) -> Result<Option<ModuleData>> {
        match self.send_request(DaemonRequest::GetModuleData {
            key: key.to_string(),
        })? {
            DaemonResponse::ModuleData(data) => Ok(data),
            other => Err(unexpected(other)),
        }
    }

    pub fn get_all_data(&mut self) -> Result<Vec<ModuleData>> {
        match self.send_request(DaemonRequest::GetAllData)? {
            DaemonResponse::AllData(data) => Ok(data),
            other => Err(unexpected(other)),
        }
    }

    pub fn get_report(&mut self) -> Result<Option<ReportSnapshot>> {
        match self.send_request(DaemonRequest::GetReport)? {
            DaemonResponse::Report(report) => Ok(report),
            other => Err(unexpected(other)),
        }
    }

    pub fn get_alerts(&mut self) -> Result<Vec<AlertRecord>> {
        match self.send_request(DaemonRequest::GetAlerts)? {
            DaemonResponse::Alerts(alerts) => Ok(alerts),
            other => Err(unexpected(other)),
        }
    }

    /// Returns the session unlock total after recording.
    pub fn record_unlock(&mut self) -> Result<u64> {
        match self.send_request(DaemonRequest::RecordUnlock)? {
            DaemonResponse::UnlockRecorded { total } => Ok(total),
            other => Err(unexpected(other)),
        }
    }

    pub fn shutdown(&mut self) -> Result<()> {
        match self.send_request(DaemonRequest::Shutdown)? {
            DaemonResponse::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: DaemonResponse) -> ClientError {
    ClientError::Protocol(format!("Unexpected response: {:?}", response))
}
