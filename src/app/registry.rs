//! Configurable invocation service
//!
//! Stands in for the platform's invocation framework when running off-device:
//! targets and their supported actions come from configuration, and a target
//! may name a command that is spawned when it is invoked.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::process::{Child, Command, Stdio};
use std::thread;

use super::invocation::{InvocationService, InvokeReplyError, InvokeRequest, InvokeTargetReply};

/// A registered invocation target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Target identifier, e.g. `bb.clock.launcher`
    pub name: String,

    /// Actions the target accepts
    pub actions: Vec<String>,

    /// Program and arguments to spawn on invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

impl TargetEntry {
    /// Target accepting `actions`, with nothing to spawn
    pub fn new(
        name: impl Into<String>,
        actions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            actions: actions.into_iter().map(Into::into).collect(),
            command: None,
        }
    }

    /// Attach a command line to spawn on invocation
    pub fn with_command(mut self, command: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.command = Some(command.into_iter().map(Into::into).collect());
        self
    }
}

/// Invocation service resolving requests against registered targets
#[derive(Debug, Clone, Default)]
pub struct TargetRegistry {
    targets: HashMap<String, TargetEntry>,
}

impl TargetRegistry {
    /// Create a registry from target entries; later duplicates win
    pub fn new(entries: impl IntoIterator<Item = TargetEntry>) -> Self {
        let mut registry = Self::default();
        for entry in entries {
            registry.register(entry);
        }
        registry
    }

    /// Register or replace a target
    pub fn register(&mut self, entry: TargetEntry) {
        self.targets.insert(entry.name.clone(), entry);
    }

    /// Look up a target by name
    pub fn get(&self, name: &str) -> Option<&TargetEntry> {
        self.targets.get(name)
    }

    /// Number of registered targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether no targets are registered
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn launch(entry: &TargetEntry, request: &InvokeRequest) -> InvokeReplyError {
        let Some(argv) = entry.command.as_deref() else {
            return InvokeReplyError::None;
        };
        let Some((program, args)) = argv.split_first() else {
            tracing::error!(target_id = %entry.name, "empty command line");
            return InvokeReplyError::Internal;
        };

        let spawned = Command::new(program)
            .args(args)
            .env("INVOKE_TARGET", request.target())
            .env("INVOKE_ACTION", request.action())
            .stdin(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                tracing::debug!(target_id = %entry.name, pid = child.id(), "handler spawned");
                Self::reap(entry.name.clone(), child);
                InvokeReplyError::None
            }
            Err(err) => {
                tracing::error!(
                    target_id = %entry.name,
                    program = %program,
                    "spawn failed: {}",
                    err
                );
                InvokeReplyError::Internal
            }
        }
    }

    /// Wait for a detached handler on its own thread
    fn reap(name: String, mut child: Child) {
        let pid = child.id();
        let spawned = thread::Builder::new()
            .name(format!("reap-{}", pid))
            .spawn(move || match child.wait() {
                Ok(status) => tracing::debug!(target_id = %name, pid, %status, "handler exited"),
                Err(err) => tracing::warn!(target_id = %name, pid, "wait failed: {}", err),
            });

        if let Err(err) = spawned {
            tracing::warn!(pid, "could not start reaper thread: {}", err);
        }
    }
}

impl InvocationService for TargetRegistry {
    fn invoke(&self, request: &InvokeRequest) -> Option<InvokeTargetReply> {
        let error = match self.targets.get(request.target()) {
            None => InvokeReplyError::NoTarget,
            Some(entry) if !entry.actions.iter().any(|a| a == request.action()) => {
                InvokeReplyError::BadRequest
            }
            Some(entry) => Self::launch(entry, request),
        };
        Some(InvokeTargetReply::new(error))
    }
}
