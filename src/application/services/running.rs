//! Running-application state
//!
//! Intersects the identities of all command nodes with the identities a
//! probe reports as running. Purely a read of the forest.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::RunningConfig;
use crate::domain::tree::iter;
use crate::domain::{CommandId, CommandNode, NodeKind};
use crate::infrastructure::traits::CommandRunner;

/// Running flag per command node id.
pub type RunningState = BTreeMap<CommandId, bool>;

fn identity_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?i)"?\b(?:bundleID|BundleIdentifier|LSBundleID)"?\s*=\s*"([^"]+)""#)
            .expect("bundle id pattern is valid")
    })
}

/// Identities listed in probe output (`bundleID="com.example"` and variants).
pub fn parse_identities(stdout: &str) -> HashSet<String> {
    identity_pattern()
        .captures_iter(stdout)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Running flag for every command node; groups are left out.
pub fn running_state(forest: &[CommandNode], running: &HashSet<String>) -> RunningState {
    iter(forest)
        .filter(|node| node.kind == NodeKind::Command)
        .map(|node| {
            let is_running = node
                .identity
                .as_ref()
                .map(|identity| running.contains(identity))
                .unwrap_or(false);
            (node.id.clone(), is_running)
        })
        .collect()
}

/// Runs the configured probe and computes running state.
pub struct RunningAppsService {
    cmd: Arc<dyn CommandRunner>,
    config: RunningConfig,
}

impl RunningAppsService {
    pub fn new(cmd: Arc<dyn CommandRunner>, config: RunningConfig) -> Self {
        Self { cmd, config }
    }

    pub fn config(&self) -> &RunningConfig {
        &self.config
    }

    /// Identities currently reported as running.
    #[instrument(level = "debug", skip(self))]
    pub fn probe(&self) -> ApplicationResult<HashSet<String>> {
        let args: Vec<&str> = self.config.probe_args.iter().map(String::as_str).collect();
        let output = self
            .cmd
            .run(&self.config.probe_bin, &args)
            .with_context(format!("run {}", self.config.probe_bin))?;

        if !output.status.success() {
            return Err(ApplicationError::OperationFailed {
                context: format!("{} exited with {}", self.config.probe_bin, output.status),
                source: String::from_utf8_lossy(&output.stderr).trim().to_string().into(),
            });
        }

        let running = parse_identities(&String::from_utf8_lossy(&output.stdout));
        debug!("probe reported {} running identities", running.len());
        Ok(running)
    }

    pub fn snapshot(&self, forest: &[CommandNode]) -> ApplicationResult<RunningState> {
        Ok(running_state(forest, &self.probe()?))
    }
}

/// Change detector for periodic polling.
///
/// Only hands out a state when it differs from the previously emitted one.
#[derive(Debug, Default)]
pub struct RunningAppsWatcher {
    last: Option<RunningState>,
}

impl RunningAppsWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// One poll. Probe failures are logged and produce no update.
    pub fn poll(
        &mut self,
        service: &RunningAppsService,
        forest: &[CommandNode],
    ) -> Option<RunningState> {
        match service.snapshot(forest) {
            Ok(state) => self.observe(state),
            Err(e) => {
                warn!("failed to inspect running applications: {}", e);
                None
            }
        }
    }

    pub fn observe(&mut self, state: RunningState) -> Option<RunningState> {
        if self.last.as_ref() == Some(&state) {
            return None;
        }
        self.last = Some(state.clone());
        Some(state)
    }
}
