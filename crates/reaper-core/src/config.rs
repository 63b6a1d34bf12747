use crate::error::{ReaperError, Result};
use crate::policy::RetentionPolicy;
use crate::schedule::{parse_weekday, Schedule};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Polling less often than once a week would skip weekly triggers.
pub const MAX_INTERVAL_SECS: u64 = 7 * 24 * 3600;

// ---------------------------------------------------------------------------
// ReaperConfig
// ---------------------------------------------------------------------------

/// Raw configuration as read from a YAML file or assembled from CLI flags.
///
/// Every field is optional here; [`ReaperConfig::validate`] decides what is
/// actually required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaperConfig {
    /// Weekday name, e.g. `friday` or `fri`.
    pub day: Option<String>,
    /// Hour of the day in UTC, 0-23.
    pub hour: Option<u32>,
    /// Extra namespaces to keep on top of the platform set.
    pub retain: Vec<String>,
    /// Actually delete. Dry-run otherwise.
    pub execute: bool,
    pub one_shot: bool,
    pub interval_secs: Option<u64>,
    pub kubeconfig: Option<PathBuf>,
}

impl ReaperConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let cfg: ReaperConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Scalars set in `overrides` win, flags are OR-ed and retain lists are
    /// unioned.
    pub fn merge(mut self, overrides: ReaperConfig) -> Self {
        if overrides.day.is_some() {
            self.day = overrides.day;
        }
        if overrides.hour.is_some() {
            self.hour = overrides.hour;
        }
        if overrides.interval_secs.is_some() {
            self.interval_secs = overrides.interval_secs;
        }
        if overrides.kubeconfig.is_some() {
            self.kubeconfig = overrides.kubeconfig;
        }
        self.execute |= overrides.execute;
        self.one_shot |= overrides.one_shot;
        for ns in overrides.retain {
            if !self.retain.contains(&ns) {
                self.retain.push(ns);
            }
        }
        self
    }

    /// Check everything the control loop needs and build its configuration.
    pub fn validate(&self) -> Result<LoopConfig> {
        let day = self
            .day
            .as_deref()
            .ok_or_else(|| ReaperError::config("missing required weekday (--day)"))?;
        let hour = self
            .hour
            .ok_or_else(|| ReaperError::config("missing required hour (--time)"))?;
        let schedule = Schedule::new(parse_weekday(day)?, hour)?;

        let interval_secs = self.interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS);
        if interval_secs == 0 {
            return Err(ReaperError::config("poll interval must be at least 1 second"));
        }
        if interval_secs > MAX_INTERVAL_SECS {
            return Err(ReaperError::config(format!(
                "poll interval must be at most {MAX_INTERVAL_SECS} seconds, got {interval_secs}"
            )));
        }

        for ns in &self.retain {
            validate_namespace_name(ns)?;
        }

        Ok(LoopConfig {
            schedule,
            policy: RetentionPolicy::platform_default(self.retain.iter().cloned()),
            dry_run: !self.execute,
            one_shot: self.one_shot,
            interval: Duration::from_secs(interval_secs),
        })
    }
}

// ---------------------------------------------------------------------------
// LoopConfig
// ---------------------------------------------------------------------------

/// Validated inputs for [`crate::control::ControlLoop`].
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub schedule: Schedule,
    pub policy: RetentionPolicy,
    pub dry_run: bool,
    pub one_shot: bool,
    pub interval: Duration,
}

// ---------------------------------------------------------------------------
// Namespace name validation
// ---------------------------------------------------------------------------

static NAMESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn namespace_re() -> &'static Regex {
    NAMESPACE_RE.get_or_init(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap())
}

/// Namespace names are RFC 1123 labels: at most 63 lowercase alphanumerics
/// or '-', starting and ending with an alphanumeric.
pub fn validate_namespace_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 63 || !namespace_re().is_match(name) {
        return Err(ReaperError::config(format!(
            "invalid namespace name '{name}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
