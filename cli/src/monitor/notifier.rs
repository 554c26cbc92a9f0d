//! Where reports and alerts go.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Mutex, PoisonError, RwLock};

use ebox_protocol::{AlertRecord, ReportSnapshot, MAX_RECENT_ALERTS};
use tracing::warn;

use crate::monitor::report::Report;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The external status surface.
pub trait Notifier: Send + Sync {
    /// Replaces the persistent status with `report`.
    fn publish(&self, report: &Report) -> Result<(), NotifyError>;

    /// Raises an out-of-band alert for one module.
    fn publish_alert(&self, module_key: &str, message: &str) -> Result<(), NotifyError>;
}

/// Status surface backing the daemon: keeps the latest report and a bounded
/// list of recent alerts for IPC clients, optionally echoing to stdout.
#[derive(Debug, Default)]
pub struct StatusBoard {
    report: RwLock<Option<ReportSnapshot>>,
    alerts: Mutex<VecDeque<AlertRecord>>,
    echo: bool,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print every report and alert to stdout (foreground mode).
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn latest_report(&self) -> Option<ReportSnapshot> {
        self.report
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Oldest first.
    pub fn recent_alerts(&self) -> Vec<AlertRecord> {
        self.alerts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        *self.report.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl Notifier for StatusBoard {
    fn publish(&self, report: &Report) -> Result<(), NotifyError> {
        let snapshot = ReportSnapshot {
            title: report.title.clone(),
            compact: report.compact.clone(),
            expanded: report.expanded.clone(),
            published_at: chrono::Utc::now().timestamp(),
        };
        *self.report.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);

        if self.echo {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{} | {}", report.title, report.compact)?;
        }
        Ok(())
    }

    fn publish_alert(&self, module_key: &str, message: &str) -> Result<(), NotifyError> {
        warn!(module = module_key, alert = message, "Module alert");

        {
            let mut alerts = self.alerts.lock().unwrap_or_else(PoisonError::into_inner);
            if alerts.len() >= MAX_RECENT_ALERTS {
                alerts.pop_front();
            }
            alerts.push_back(AlertRecord {
                module_key: module_key.to_string(),
                message: message.to_string(),
                timestamp: chrono::Utc::now().timestamp(),
            });
        }

        if self.echo {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "[{}] {}", module_key, message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(compact: &str) -> Report {
        Report {
            title: "Extension Box".to_string(),
            compact: compact.to_string(),
            expanded: format!("{} detail", compact),
        }
    }

    #[test]
    fn test_latest_report_replaced() {
        let board = StatusBoard::new();
        assert!(board.latest_report().is_none());

        board.publish(&report("one")).unwrap();
        board.publish(&report("two")).unwrap();

        let latest = board.latest_report().unwrap();
        assert_eq!(latest.compact, "two");
        assert_eq!(latest.expanded, "two detail");

        board.clear();
        assert!(board.latest_report().is_none());
    }

    #[test]
    fn test_alerts_are_bounded_oldest_dropped() {
        let board = StatusBoard::new();
        for i in 0..MAX_RECENT_ALERTS + 3 {
            board
                .publish_alert("battery", &format!("alert {}", i))
                .unwrap();
        }

        let alerts = board.recent_alerts();
        assert_eq!(alerts.len(), MAX_RECENT_ALERTS);
        assert_eq!(alerts[0].message, "alert 3");
        assert_eq!(
            alerts.last().unwrap().message,
            format!("alert {}", MAX_RECENT_ALERTS + 2)
        );
        assert!(alerts.iter().all(|a| a.module_key == "battery"));
    }
}
