//! Recovery coordinator (§4.G): owns the credential-invalidation protocol
//! and the two independent recovery triggers (auth failure, error burst),
//! plus the 403-count threshold refresh that bounds retry amplification.

use crate::libs::credentials::CredentialStore;
use crate::libs::messages::Message;
use crate::{msg_info, msg_warning};
use anyhow::{bail, Result};
use std::time::{Duration, Instant};

const BURST_CONSECUTIVE_THRESHOLD: u32 = 10;
const BURST_WINDOW_THRESHOLD: u32 = 50;
const BURST_WINDOW: Duration = Duration::from_secs(30 * 60);
const FORBIDDEN_THRESHOLD: u32 = 5;
const AUTH_RECOVERY_INITIAL_TIMEOUT: Duration = Duration::from_secs(3600);
const AUTH_RECOVERY_SUBSEQUENT_TIMEOUT: Duration = Duration::from_secs(30);
const BURST_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryState {
    Steady,
    AuthRecovering,
    BurstRecovering,
    Terminated,
}

impl std::fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecoveryState::Steady => "steady",
            RecoveryState::AuthRecovering => "auth_recovering",
            RecoveryState::BurstRecovering => "burst_recovering",
            RecoveryState::Terminated => "terminated",
        };
        write!(f, "{}", s)
    }
}

pub struct RecoveryCoordinator {
    state: RecoveryState,
    auth_recoveries: u32,
    max_auth_recoveries: u32,
    consecutive_errors: u32,
    windowed_errors: Vec<Instant>,
    forbidden_count: u32,
}

impl RecoveryCoordinator {
    pub fn new(max_auth_recoveries: u32) -> Self {
        Self {
            state: RecoveryState::Steady,
            auth_recoveries: 0,
            max_auth_recoveries,
            consecutive_errors: 0,
            windowed_errors: Vec::new(),
            forbidden_count: 0,
        }
    }

    pub fn state(&self) -> RecoveryState {
        self.state
    }

    fn transition(&mut self, to: RecoveryState) {
        if self.state != to {
            msg_info!(Message::RecoveryStateChanged(self.state.to_string(), to.to_string()));
            self.state = to;
        }
    }

    /// Resets both burst counters; called on any successful attempt.
    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
        self.windowed_errors.clear();
    }

    /// Records a 403 response of any kind toward the threshold-refresh trigger.
    pub fn record_forbidden(&mut self, credentials: &mut CredentialStore) {
        self.forbidden_count += 1;
        if self.forbidden_count >= FORBIDDEN_THRESHOLD {
            msg_info!(Message::ThresholdRefreshTriggered(self.forbidden_count));
            credentials.invalidate();
            std::thread::sleep(Duration::from_secs(2));
            self.forbidden_count = 0;
        }
    }

    /// Records an error toward the burst triggers; returns `true` if burst
    /// recovery should run now.
    pub fn record_error_for_burst(&mut self) -> bool {
        self.consecutive_errors += 1;
        let now = Instant::now();
        self.windowed_errors.push(now);
        self.windowed_errors.retain(|t| now.duration_since(*t) <= BURST_WINDOW);

        self.consecutive_errors >= BURST_CONSECUTIVE_THRESHOLD || self.windowed_errors.len() as u32 >= BURST_WINDOW_THRESHOLD
    }

    /// Runs the lighter burst recovery: invalidate, wait briefly, sleep,
    /// reset counters.
    pub fn run_burst_recovery(&mut self, credentials: &mut CredentialStore) -> Result<()> {
        msg_warning!(Message::BurstRecoveryTriggered(self.consecutive_errors, self.windowed_errors.len() as u32));
        self.transition(RecoveryState::BurstRecovering);

        credentials.invalidate();
        let _ = credentials.wait_for_refresh(BURST_REFRESH_TIMEOUT);
        std::thread::sleep(Duration::from_secs(10));

        self.consecutive_errors = 0;
        self.windowed_errors.clear();
        self.transition(RecoveryState::Steady);
        Ok(())
    }

    /// Runs full authentication recovery. Returns `Ok(())` on success.
    /// Bails with a terminal diagnostic once the recovery budget is spent.
    pub fn run_auth_recovery(&mut self, credentials: &mut CredentialStore) -> Result<()> {
        if self.auth_recoveries >= self.max_auth_recoveries {
            self.transition(RecoveryState::Terminated);
            bail!("{}", Message::CredentialsUnrecoverable(credentials.path().display().to_string()));
        }

        self.auth_recoveries += 1;
        self.transition(RecoveryState::AuthRecovering);
        msg_info!(Message::AuthRecoveryStarted(self.auth_recoveries));

        credentials.invalidate();

        let timeout = if self.auth_recoveries == 1 { AUTH_RECOVERY_INITIAL_TIMEOUT } else { AUTH_RECOVERY_SUBSEQUENT_TIMEOUT };
        let refreshed = credentials.wait_for_refresh(timeout)?;

        if refreshed {
            msg_info!(Message::AuthRecoverySucceeded);
            self.transition(RecoveryState::Steady);
            Ok(())
        } else {
            msg_warning!(Message::AuthRecoveryAborted);
            self.transition(RecoveryState::Terminated);
            bail!("{}", Message::CredentialsUnrecoverable(credentials.path().display().to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn credential_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"[{"name":"auth_token","value":"a","domain":".x.com"}]"#).unwrap();
        file
    }

    #[test]
    fn burst_trigger_fires_at_consecutive_threshold() {
        let mut coordinator = RecoveryCoordinator::new(10);
        let mut fired = false;
        for _ in 0..BURST_CONSECUTIVE_THRESHOLD {
            fired = coordinator.record_error_for_burst();
        }
        assert!(fired);
    }

    #[test]
    fn success_resets_burst_counters() {
        let mut coordinator = RecoveryCoordinator::new(10);
        for _ in 0..5 {
            coordinator.record_error_for_burst();
        }
        coordinator.record_success();
        assert_eq!(coordinator.consecutive_errors, 0);
        assert!(coordinator.windowed_errors.is_empty());
    }

    #[test]
    fn auth_recovery_fails_terminally_after_budget_exhausted() {
        let file = credential_file();
        let mut credentials = CredentialStore::new(file.path(), Duration::from_secs(30));
        let mut coordinator = RecoveryCoordinator::new(0);

        let err = coordinator.run_auth_recovery(&mut credentials).unwrap_err();
        assert!(err.to_string().contains("could not be recovered"));
        assert_eq!(coordinator.state(), RecoveryState::Terminated);
    }

    #[test]
    fn threshold_refresh_invalidates_after_five_forbidden() {
        let file = credential_file();
        let mut credentials = CredentialStore::new(file.path(), Duration::from_secs(30));
        credentials.load().unwrap();

        let mut coordinator = RecoveryCoordinator::new(10);
        for _ in 0..FORBIDDEN_THRESHOLD {
            coordinator.record_forbidden(&mut credentials);
        }
        assert_eq!(coordinator.forbidden_count, 0);
    }
}
