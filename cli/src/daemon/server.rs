use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ebox_platform::{HostSystem, SystemAccess};
use ebox_protocol::{
    DaemonRequest, DaemonResponse, DaemonStatus, DataPoint, ModuleData, ModuleInfo,
    MIN_SUPPORTED_VERSION, PROTOCOL_VERSION,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::{runtime_dir, LogLevel};
use crate::daemon::socket_path;
use crate::logging::{self, LogMode};
use crate::monitor::registry::RegistryError;
use crate::monitor::{
    AggregationStore, Configuration, DataPoints, ModuleContext, MonotonicClock, Notifier,
    Registry, StatusBoard, TickScheduler,
};
use crate::prefs::Prefs;

/// Time given to client writer tasks to flush the final response.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Module registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Already running")]
    AlreadyRunning,

    #[error("Failed to daemonize: {0}")]
    Daemonize(String),
}

pub type Result<T> = std::result::Result<T, DaemonError>;

type ClientId = u64;

enum ClientMessage {
    Request { request: DaemonRequest },
    Invalid { error: String },
    Disconnect,
}

/// Queues `response` for a client without waiting. A client whose queue is
/// full or closed is dropped; its writer task ends once the sender is gone.
fn respond(
    clients: &mut HashMap<ClientId, mpsc::Sender<DaemonResponse>>,
    client_id: ClientId,
    response: DaemonResponse,
) {
    let Some(client) = clients.get(&client_id) else {
        return;
    };
    match client.try_send(response) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!(client_id, "Client not reading responses, dropping it");
            clients.remove(&client_id);
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            clients.remove(&client_id);
        }
    }
}

/// Wires the built-in modules to `prefs`, `board` and `system`.
pub fn build_scheduler(
    prefs: Arc<Prefs>,
    board: Arc<StatusBoard>,
    system: Arc<dyn SystemAccess>,
) -> Result<TickScheduler> {
    let ctx = ModuleContext::new(
        prefs as Arc<dyn Configuration>,
        board as Arc<dyn Notifier>,
        Arc::new(MonotonicClock::new()),
    );
    Ok(TickScheduler::new(
        Registry::builtin()?,
        ctx,
        system,
        Arc::new(AggregationStore::new()),
    ))
}

pub(crate) fn to_module_data(key: &str, points: &DataPoints) -> ModuleData {
    ModuleData {
        key: key.to_string(),
        points: points
            .iter()
            .map(|(name, value)| DataPoint {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

struct DaemonState {
    prefs: Arc<Prefs>,
    scheduler: TickScheduler,
    board: Arc<StatusBoard>,
    system: Arc<HostSystem>,
    start_time: Instant,
}

impl DaemonState {
    fn new(prefs: Arc<Prefs>, echo: bool) -> Result<Self> {
        let board = Arc::new(StatusBoard::new().with_echo(echo));
        let system = Arc::new(HostSystem::new());
        let scheduler = build_scheduler(
            Arc::clone(&prefs),
            Arc::clone(&board),
            Arc::clone(&system) as Arc<dyn SystemAccess>,
        )?;

        Ok(Self {
            prefs,
            scheduler,
            board,
            system,
            start_time: Instant::now(),
        })
    }

    fn get_status(&self) -> DaemonStatus {
        let modules = self
            .scheduler
            .registry()
            .iter()
            .map(|m| ModuleInfo {
                key: m.key().to_string(),
                name: m.name().to_string(),
                description: m.description().to_string(),
                alive: m.alive(),
                interval_ms: m.tick_interval_ms(),
            })
            .collect();

        DaemonStatus {
            running: self.prefs.is_running(),
            uptime_secs: self.start_time.elapsed().as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cycle_count: self.scheduler.cycle_count(),
            last_cycle_time: self.scheduler.last_cycle_at(),
            modules,
            protocol_version: PROTOCOL_VERSION,
            min_supported_version: MIN_SUPPORTED_VERSION,
        }
    }

    fn module_data(&self, key: &str) -> Option<ModuleData> {
        self.scheduler
            .store()
            .get(key)
            .map(|points| to_module_data(key, &points))
    }

    fn handle_request(&self, request: &DaemonRequest) -> DaemonResponse {
        match request {
            DaemonRequest::GetStatus => DaemonResponse::Status(self.get_status()),
            DaemonRequest::GetModuleKeys => {
                DaemonResponse::ModuleKeys(self.scheduler.store().keys())
            }
            DaemonRequest::GetModuleData { key } => {
                DaemonResponse::ModuleData(self.module_data(key))
            }
            DaemonRequest::GetAllData => DaemonResponse::AllData(
                self.scheduler
                    .store()
                    .keys()
                    .iter()
                    .filter_map(|key| self.module_data(key))
                    .collect(),
            ),
            DaemonRequest::GetReport => DaemonResponse::Report(self.board.latest_report()),
            DaemonRequest::GetAlerts => DaemonResponse::Alerts(self.board.recent_alerts()),
            DaemonRequest::RecordUnlock => {
                let total = self.system.unlocks().record();
                debug!(total, "Unlock recorded");
                DaemonResponse::UnlockRecorded { total }
            }
            DaemonRequest::Shutdown => DaemonResponse::Ok,
        }
    }
}

async fn client_reader_task(
    mut reader: BufReader<tokio::net::unix::OwnedReadHalf>,
    msg_tx: mpsc::Sender<(ClientId, ClientMessage)>,
    client_id: ClientId,
) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                let _ = msg_tx.send((client_id, ClientMessage::Disconnect)).await;
                break;
            }
            Ok(_) => match DaemonRequest::from_json(line.trim()) {
                Ok(request) => {
                    if msg_tx
                        .send((client_id, ClientMessage::Request { request }))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    warn!(client_id, error = %e, "Invalid request from client");
                    let error = e.to_string();
                    if msg_tx
                        .send((client_id, ClientMessage::Invalid { error }))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            },
            Err(e) => {
                debug!(client_id, error = %e, "Client read error");
                let _ = msg_tx.send((client_id, ClientMessage::Disconnect)).await;
                break;
            }
        }
    }
}

async fn client_writer_task(
    mut writer: tokio::net::unix::OwnedWriteHalf,
    mut response_rx: mpsc::Receiver<DaemonResponse>,
) {
    while let Some(response) = response_rx.recv().await {
        let json = match response.to_json() {
            Ok(j) => j,
            Err(e) => {
                error!(error = %e, "Failed to encode response");
                continue;
            }
        };
        if writer
            .write_all(format!("{}\n", json).as_bytes())
            .await
            .is_err()
        {
            break;
        }
    }
}

pub fn run_daemon(
    foreground: bool,
    log_level: LogLevel,
    log_level_override: Option<LogLevel>,
) -> Result<()> {
    let socket = socket_path();

    if socket.exists() {
        if crate::daemon::is_daemon_running() {
            return Err(DaemonError::AlreadyRunning);
        }
        fs::remove_file(&socket)?;
    }

    fs::create_dir_all(runtime_dir())?;

    if !foreground {
        daemonize::Daemonize::new()
            .working_directory(runtime_dir())
            .start()
            .map_err(|e| DaemonError::Daemonize(e.to_string()))?;
        let guard = logging::init(log_level, LogMode::File, log_level_override);
        std::mem::forget(guard);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "Daemon starting");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run_daemon_async(socket, foreground))
}

async fn run_daemon_async(socket: PathBuf, echo: bool) -> Result<()> {
    let prefs = Arc::new(Prefs::load_default());
    let mut state = DaemonState::new(prefs, echo)?;

    let listener = UnixListener::bind(&socket)?;
    info!(socket = ?socket, "Listening for connections");

    let mut terminate = signal(SignalKind::terminate())?;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let (msg_tx, mut msg_rx) = mpsc::channel::<(ClientId, ClientMessage)>(256);
    let mut clients: HashMap<ClientId, mpsc::Sender<DaemonResponse>> = HashMap::new();
    let mut next_client_id: ClientId = 1;

    state.scheduler.start();

    loop {
        let wake = state
            .scheduler
            .next_wake()
            .unwrap_or_else(|| tokio::time::Instant::now() + state.scheduler.next_delay());

        tokio::select! {
            _ = tokio::time::sleep_until(wake) => {
                state.scheduler.fire();
            }
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let client_id = next_client_id;
                        next_client_id += 1;
                        debug!(client_id, "Client connected");

                        let (reader, writer) = stream.into_split();
                        let (response_tx, response_rx) = mpsc::channel::<DaemonResponse>(16);
                        clients.insert(client_id, response_tx);

                        tokio::task::spawn_local(client_reader_task(
                            BufReader::new(reader),
                            msg_tx.clone(),
                            client_id,
                        ));
                        tokio::task::spawn_local(client_writer_task(writer, response_rx));
                    }
                    Err(e) => {
                        error!(error = %e, "Socket accept error");
                    }
                }
            }
            Some((client_id, msg)) = msg_rx.recv() => {
                match msg {
                    ClientMessage::Invalid { error } => {
                        let message = format!("Invalid request: {}", error);
                        respond(&mut clients, client_id, DaemonResponse::Error(message));
                    }
                    ClientMessage::Disconnect => {
                        if clients.remove(&client_id).is_some() {
                            debug!(client_id, count = clients.len(), "Client disconnected");
                        }
                    }
                    ClientMessage::Request { request } => {
                        debug!(client_id, request = ?request, "Handling request");
                        let response = state.handle_request(&request);
                        respond(&mut clients, client_id, response);

                        if request == DaemonRequest::Shutdown {
                            info!("Shutdown requested by client");
                            tokio::time::sleep(SHUTDOWN_GRACE).await;
                            break;
                        }
                    }
                }
            }
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break;
            }
            _ = terminate.recv() => {
                info!("Terminated");
                break;
            }
        }
    }

    info!("Daemon shutting down");
    state.scheduler.stop();
    state.board.clear();
    fs::remove_file(&socket).ok();

    Ok(())
}
