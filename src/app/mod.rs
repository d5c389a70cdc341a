//! Application orchestrator and public API
//!
//! This module provides the `Application` struct that wires the dispatcher,
//! the deferred invoker and the locale handler together and routes trigger
//! events between them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

// Submodules
pub mod dispatcher;
pub mod error;
pub mod invocation;
pub mod locale;
pub mod registry;
pub mod scheduler;
pub mod storage;
pub mod trigger;

use dispatcher::InvocationDispatcher;
use error::{ConfigError, ConfigResult, Result};
use invocation::{Disposition, InvocationService};
use locale::{CatalogTranslator, LocaleHandler, Translations, Translator, system_locale};
use registry::{TargetEntry, TargetRegistry};
use scheduler::{DeferredHandle, DeferredInvoker, ReschedulePolicy};
use trigger::{TriggerEvent, TriggerSink, TriggerSource};

/// Clock app target identifier
pub const DEFAULT_TARGET: &str = "bb.clock.launcher";

/// Action asking the target to open
pub const DEFAULT_ACTION: &str = "bb.action.OPEN";

/// Delay between a thumbnail notification and the invocation
pub const DEFAULT_THUMBNAIL_DELAY_MS: u64 = 2000;

/// Configuration for the application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix of translation catalog names
    pub app_name: String,

    /// Directory holding translation catalogs
    pub translations_dir: PathBuf,

    /// Locale to load at startup instead of the process locale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    /// Target invoked by both trigger paths
    pub target: String,

    /// Action invoked by both trigger paths
    pub action: String,

    /// Delay before the deferred invocation fires
    pub thumbnail_delay_ms: u64,

    /// What a new thumbnail does to a still-pending invocation
    pub reschedule: ReschedulePolicy,

    /// Cancel pending invocations when the app is restored
    pub cancel_on_restore: bool,

    /// Targets known to the off-device invocation service
    pub targets: Vec<TargetEntry>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "InvokeItself".to_string(),
            translations_dir: PathBuf::from("app/native/qm"),
            locale: None,
            target: DEFAULT_TARGET.to_string(),
            action: DEFAULT_ACTION.to_string(),
            thumbnail_delay_ms: DEFAULT_THUMBNAIL_DELAY_MS,
            reschedule: ReschedulePolicy::Replace,
            cancel_on_restore: true,
            targets: vec![TargetEntry::new(DEFAULT_TARGET, [DEFAULT_ACTION])],
        }
    }
}

impl AppConfig {
    /// Delay before the deferred invocation fires
    pub fn thumbnail_delay(&self) -> Duration {
        Duration::from_millis(self.thumbnail_delay_ms)
    }

    /// Check values the application cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        let non_empty = [
            ("app_name", &self.app_name),
            ("target", &self.target),
            ("action", &self.action),
        ];
        for (field, value) in non_empty {
            if value.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field,
                    detail: "must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// What handling a single trigger event did
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// An invocation ran immediately
    Dispatched(Disposition),
    /// An invocation was scheduled
    Scheduled(DeferredHandle),
    /// Pending invocations were cancelled
    Cancelled(usize),
    /// Translations were reloaded
    LocaleChanged {
        /// New locale
        locale: String,
        /// Whether a catalog was installed
        installed: bool,
    },
}

/// Result of [`Application::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of events handled
    pub events: usize,
    /// Dispositions of immediate invocations, in order
    pub immediate: Vec<Disposition>,
    /// Dispositions of deferred invocations that fired
    pub deferred: Vec<Disposition>,
}

/// The application core
pub struct Application {
    config: AppConfig,
    dispatcher: InvocationDispatcher,
    deferred: DeferredInvoker,
    locale: LocaleHandler,
}

impl Application {
    /// Create an application over the given invocation service and translator
    ///
    /// Loads translations for the configured (or process) locale.
    pub fn new(
        config: AppConfig,
        service: Arc<dyn InvocationService>,
        translator: Box<dyn Translator>,
    ) -> Result<Self> {
        config.validate()?;

        let dispatcher =
            InvocationDispatcher::new(service, config.target.clone(), config.action.clone());
        let deferred = DeferredInvoker::new(dispatcher.clone(), config.reschedule);
        let mut locale = LocaleHandler::new(
            config.app_name.clone(),
            config.translations_dir.clone(),
            translator,
        );

        let initial = config.locale.clone().unwrap_or_else(system_locale);
        locale.on_system_language_changed(&initial);

        Ok(Self {
            config,
            dispatcher,
            deferred,
            locale,
        })
    }

    /// Create an application backed by the configured target registry
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let registry = TargetRegistry::new(config.targets.clone());
        Self::new(config, Arc::new(registry), Box::new(CatalogTranslator::new()))
    }

    /// Get the current configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the dispatcher
    pub fn dispatcher(&self) -> &InvocationDispatcher {
        &self.dispatcher
    }

    /// Get the deferred invoker
    pub fn deferred(&self) -> &DeferredInvoker {
        &self.deferred
    }

    /// Get the locale handler
    pub fn locale(&self) -> &LocaleHandler {
        &self.locale
    }

    /// Handle for translating UI strings
    pub fn translations(&self) -> Translations {
        self.locale.translations()
    }

    /// The invoke button was pressed
    pub fn click(&self) -> Disposition {
        self.dispatcher.dispatch_default()
    }

    /// The app was thumbnailed; invoke after the configured delay
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_thumbnail(&self) -> DeferredHandle {
        tracing::debug!(delay_ms = self.config.thumbnail_delay_ms, "thumbnailed");
        self.deferred.schedule(self.config.thumbnail_delay())
    }

    /// Route a single trigger event
    ///
    /// Must be called from within a tokio runtime.
    pub fn handle(&mut self, event: TriggerEvent) -> EventOutcome {
        match event {
            TriggerEvent::PrimaryAction => EventOutcome::Dispatched(self.click()),
            TriggerEvent::Thumbnailed => EventOutcome::Scheduled(self.on_thumbnail()),
            TriggerEvent::Restored => {
                let cancelled = if self.config.cancel_on_restore {
                    self.deferred.cancel_pending()
                } else {
                    0
                };
                tracing::debug!(cancelled, "restored");
                EventOutcome::Cancelled(cancelled)
            }
            TriggerEvent::LocaleChanged(locale) => {
                let installed = self.locale.on_system_language_changed(&locale);
                EventOutcome::LocaleChanged { locale, installed }
            }
        }
    }

    /// Consume events from `source` until it closes, then wait for deferred invocations
    pub async fn run(&mut self, source: Box<dyn TriggerSource>) -> Result<RunSummary> {
        let (sink, mut events) = TriggerSink::channel();
        let feeder = source.attach(sink);
        let mut summary = RunSummary::default();

        while let Some(event) = events.recv().await {
            summary.events += 1;
            if let EventOutcome::Dispatched(disposition) = self.handle(event) {
                summary.immediate.push(disposition);
            }
        }

        feeder.await??;
        summary.deferred = self.deferred.drain().await?;
        Ok(summary)
    }
}
