//! Trigger events and the sources that deliver them
//!
//! The host UI owns button presses, thumbnail notifications and locale
//! changes. Sources push those events into a [`TriggerSink`]; the application
//! consumes them one at a time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;
use tokio::sync::mpsc;

use super::error::{AppError, Result};

/// Event delivered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// The user pressed the invoke button
    PrimaryAction,
    /// The app was minimized to a thumbnail
    Thumbnailed,
    /// The app returned to full screen
    Restored,
    /// The system language changed to the given locale
    LocaleChanged(String),
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerEvent::PrimaryAction => f.write_str("click"),
            TriggerEvent::Thumbnailed => f.write_str("thumbnail"),
            TriggerEvent::Restored => f.write_str("restore"),
            TriggerEvent::LocaleChanged(locale) => write!(f, "locale {}", locale),
        }
    }
}

impl FromStr for TriggerEvent {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let event = match (words.next(), words.next(), words.next()) {
            (Some("click"), None, _) => TriggerEvent::PrimaryAction,
            (Some("thumbnail"), None, _) => TriggerEvent::Thumbnailed,
            (Some("restore"), None, _) => TriggerEvent::Restored,
            (Some("locale"), Some(locale), None) => {
                TriggerEvent::LocaleChanged(locale.to_string())
            }
            _ => return Err(AppError::UnknownTrigger(line.trim().to_string())),
        };
        Ok(event)
    }
}

/// Sending half handed to a [`TriggerSource`]
#[derive(Debug, Clone)]
pub struct TriggerSink {
    tx: mpsc::UnboundedSender<TriggerEvent>,
}

impl TriggerSink {
    /// Create a sink and the receiver the application reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TriggerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver an event; returns false once the application stopped listening
    pub fn emit(&self, event: TriggerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Something that delivers trigger events into the application
///
/// Implementations run on their own task or thread and drop the sink when
/// they have no more events.
pub trait TriggerSource: Send + 'static {
    /// Start delivering events into `sink`
    fn attach(self: Box<Self>, sink: TriggerSink) -> tokio::task::JoinHandle<Result<()>>;
}

/// Delivers a fixed list of events in order
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    events: Vec<TriggerEvent>,
}

impl ScriptedSource {
    /// Create a source for `events`
    pub fn new(events: impl IntoIterator<Item = TriggerEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl TriggerSource for ScriptedSource {
    fn attach(self: Box<Self>, sink: TriggerSink) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move {
            for event in self.events {
                if !sink.emit(event) {
                    break;
                }
            }
            Ok(())
        })
    }
}

/// Parses one event per line: `click`, `thumbnail`, `restore`, `locale <id>`
///
/// Blank lines and `#` comments are skipped; unrecognized lines are logged.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead + Send + 'static> LineSource<R> {
    /// Create a source reading from `reader`
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead + Send + 'static> TriggerSource for LineSource<R> {
    fn attach(self: Box<Self>, sink: TriggerSink) -> tokio::task::JoinHandle<Result<()>> {
        tokio::task::spawn_blocking(move || -> Result<()> {
            for line in self.reader.lines() {
                let line = line?;
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    continue;
                }

                match trimmed.parse::<TriggerEvent>() {
                    Ok(event) => {
                        if !sink.emit(event) {
                            break;
                        }
                    }
                    Err(err) => tracing::warn!("skipping line: {}", err),
                }
            }
            Ok(())
        })
    }
}
