use std::process::Command;
use tracing::{info, warn};

use crate::error::NotifyError;
use crate::types::NotificationMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifierKind {
    Stdout,
    Log,
}

/// Surface that shows a transient message to the user.
pub trait Notifier: Send + Sync {
    fn kind(&self) -> NotifierKind;
    fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError>;
}

/// Surface that opens a URL for the user.
pub trait Navigator: Send + Sync {
    fn open_link(&self, url: &str) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn kind(&self) -> NotifierKind {
        (**self).kind()
    }

    fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        (**self).send(message)
    }
}

impl<T: Navigator + ?Sized> Navigator for &T {
    fn open_link(&self, url: &str) -> Result<(), NotifyError> {
        (**self).open_link(url)
    }
}

/// Deliver without letting a failing surface affect the caller.
pub fn notify_best_effort(notifier: &dyn Notifier, message: &NotificationMessage) {
    if let Err(err) = notifier.send(message) {
        warn!(kind = ?notifier.kind(), error = %err, "notification not delivered");
    }
}

pub fn open_best_effort(navigator: &dyn Navigator, url: &str) {
    if let Err(err) = navigator.open_link(url) {
        warn!(url, error = %err, "could not open link");
    }
}

#[derive(Debug, Clone, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn kind(&self) -> NotifierKind {
        NotifierKind::Stdout
    }

    fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        match &message.call_to_action {
            Some(action) => println!(
                "[{:?}] {} | {}: {}",
                message.severity, message.message, action.label, action.url
            ),
            None => println!("[{:?}] {}", message.severity, message.message),
        }
        Ok(())
    }
}

/// Routes notifications into the tracing subscriber instead of stdout.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn kind(&self) -> NotifierKind {
        NotifierKind::Log
    }

    fn send(&self, message: &NotificationMessage) -> Result<(), NotifyError> {
        info!(
            topic = ?message.topic,
            work_item = %message.work_item_id,
            "{}",
            message.message
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StdoutNavigator;

impl Navigator for StdoutNavigator {
    fn open_link(&self, url: &str) -> Result<(), NotifyError> {
        println!("{url}");
        Ok(())
    }
}

/// Logs the link instead of printing it, for machine-readable output.
#[derive(Debug, Clone, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn open_link(&self, url: &str) -> Result<(), NotifyError> {
        info!(url, "branch link");
        Ok(())
    }
}

/// Opens links by running `program [args..] <url>`, e.g. `xdg-open`.
#[derive(Debug, Clone)]
pub struct CommandNavigator {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandNavigator {
    /// Split a shell-style command line on whitespace. `None` for blank input.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Navigator for CommandNavigator {
    fn open_link(&self, url: &str) -> Result<(), NotifyError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(url)
            .status()
            .map_err(|source| NotifyError::OpenerSpawn {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            return Ok(());
        }

        Err(NotifyError::OpenerExit {
            program: self.program.clone(),
            status: status.code(),
        })
    }
}
