//! Processing engine (§4.H): drives a single run over a set of targets,
//! single-threaded by design so the decision ladder and classifier state
//! stay totally ordered within the run.

use crate::api::remote::{BlockOutcome, LookupResult, LookupStatus, RemoteClient};
use crate::db::history::{HistoryStore, Outcome};
use crate::libs::cache::IdentifierCache;
use crate::libs::credentials::{CredentialStore, Mapping};
use crate::libs::messages::Message;
use crate::libs::recovery::RecoveryCoordinator;
use crate::libs::retry_policy::{SuccessRateTracker, MAX_RETRIES};
use crate::model::{Availability, ErrorKind, FullUser, HistoryStatus, Priority, SessionCounters, Target, TargetFormat};
use crate::{msg_info, msg_print, msg_warning};
use anyhow::{bail, Result};
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// On-disk shape of the targets file: `{format, users}`.
#[derive(Debug, Deserialize)]
pub struct TargetsFile {
    pub format: TargetFormat,
    pub users: Vec<String>,
}

impl TargetsFile {
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| anyhow::anyhow!("{}", Message::FileReadError(path.display().to_string(), e.to_string())))?;
        let parsed: TargetsFile = serde_json::from_str(&contents).map_err(|e| anyhow::anyhow!("{}", Message::InvalidTargetsFile(e.to_string())))?;
        if parsed.users.is_empty() {
            bail!("{}", Message::InvalidTargetsFile("users list is empty".to_string()));
        }
        Ok(parsed)
    }

    /// Targets in input order, with in-memory duplicates dropped.
    pub fn targets(&self) -> Vec<Target> {
        let mut seen = HashSet::new();
        self.users
            .iter()
            .filter(|u| seen.insert((*u).clone()))
            .map(|u| Target::new(u.clone(), self.format))
            .collect()
    }
}

pub struct EngineConfig {
    pub batch_size: usize,
    pub inter_slice_delay: u64,
    pub max_auth_recoveries: u32,
}

/// Owns the components one processing run needs: connection, remote
/// client, caches and recovery state. Constructed fresh per run.
pub struct Engine<'a> {
    conn: &'a Connection,
    client: RemoteClient,
    credentials: CredentialStore,
    cache_root: std::path::PathBuf,
    recovery: RecoveryCoordinator,
    tracker: SuccessRateTracker,
    config: EngineConfig,
    interrupted: Arc<AtomicBool>,
}

impl<'a> Engine<'a> {
    pub fn new(
        conn: &'a Connection,
        client: RemoteClient,
        credentials: CredentialStore,
        cache_root: std::path::PathBuf,
        config: EngineConfig,
        interrupted: Arc<AtomicBool>,
    ) -> Self {
        let max_auth_recoveries = config.max_auth_recoveries;
        Self { conn, client, credentials, cache_root, recovery: RecoveryCoordinator::new(max_auth_recoveries), tracker: SuccessRateTracker::new(), config, interrupted }
    }

    fn owner_cache(&self, credentials: &Mapping) -> IdentifierCache {
        let owner = crate::libs::cache::owner_id_from(credentials);
        IdentifierCache::new(self.cache_root.clone(), owner)
    }

    /// Runs a normal processing pass over `targets`, capped at
    /// `max_users` when given.
    pub async fn run(&mut self, targets: Vec<Target>, max_users: Option<usize>) -> Result<SessionCounters> {
        let history = HistoryStore::new(self.conn);

        let remaining = self.compute_remaining(&history, targets)?;
        let remaining = match max_users {
            Some(n) => remaining.into_iter().take(n).collect::<Vec<_>>(),
            None => remaining,
        };

        let session_id = history.start_session(remaining.len())?;
        msg_info!(Message::SessionStarted(session_id, remaining.len()));

        let mut counters = SessionCounters::default();

        for slice in remaining.chunks(self.config.batch_size) {
            if self.interrupted.load(Ordering::SeqCst) {
                msg_warning!(Message::RunInterrupted);
                break;
            }

            self.process_slice(slice, &history, &mut counters, 0).await?;
            history.update_session(session_id, counters.processed, counters.blocked, counters.skipped, counters.errored)?;
            msg_print!(Message::SliceProgress(counters.processed, counters.blocked, counters.skipped, counters.errored));

            if !self.interrupted.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_secs(self.config.inter_slice_delay)).await;
            }
        }

        history.complete_session(session_id)?;
        msg_info!(Message::SessionCompleted(session_id, counters.processed, counters.blocked, counters.errored));
        Ok(counters)
    }

    /// Retry pass: re-resolves every due candidate and re-applies the
    /// decision ladder with its retry count incremented.
    pub async fn run_retry_pass(&mut self) -> Result<SessionCounters> {
        let history = HistoryStore::new(self.conn);
        let candidates = history.retry_candidates()?;
        let due: Vec<Target> = candidates
            .iter()
            .filter(|c| HistoryStore::is_due(c, &self.tracker))
            .map(|c| Target::new(c.identifier.clone(), c.format))
            .collect();

        let retry_counts: std::collections::HashMap<String, u32> = candidates.into_iter().map(|c| (c.identifier, c.retry_count + 1)).collect();

        let session_id = history.start_session(due.len())?;
        msg_info!(Message::SessionStarted(session_id, due.len()));

        let mut counters = SessionCounters::default();
        for slice in due.chunks(self.config.batch_size) {
            if self.interrupted.load(Ordering::SeqCst) {
                msg_warning!(Message::RunInterrupted);
                break;
            }
            for target in slice {
                let retry_count = *retry_counts.get(&target.value).unwrap_or(&1);
                self.process_one(target, &history, &mut counters, retry_count).await?;
            }
            history.update_session(session_id, counters.processed, counters.blocked, counters.skipped, counters.errored)?;
            if !self.interrupted.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_secs(self.config.inter_slice_delay)).await;
            }
        }

        history.complete_session(session_id)?;
        msg_info!(Message::SessionCompleted(session_id, counters.processed, counters.blocked, counters.errored));
        Ok(counters)
    }

    fn compute_remaining(&self, history: &HistoryStore, targets: Vec<Target>) -> Result<Vec<Target>> {
        let not_blocked: Vec<Target> = targets.into_iter().filter(|t| !history.is_blocked(t).unwrap_or(false)).collect();

        if not_blocked.is_empty() {
            return Ok(not_blocked);
        }
        let format = not_blocked[0].format;
        let permanent = history.batch_permanent_failures(&not_blocked, format)?;
        Ok(not_blocked.into_iter().filter(|t| !permanent.contains(&t.value)).collect())
    }

    async fn process_slice(&mut self, slice: &[Target], history: &HistoryStore<'_>, counters: &mut SessionCounters, retry_count: u32) -> Result<()> {
        for target in slice {
            if self.interrupted.load(Ordering::SeqCst) {
                break;
            }
            self.process_one(target, history, counters, retry_count).await?;
        }
        Ok(())
    }

    async fn process_one(&mut self, target: &Target, history: &HistoryStore<'_>, counters: &mut SessionCounters, retry_count: u32) -> Result<()> {
        let credentials = self.credentials.load()?;

        let (lookup, status) = self.resolve(target, &credentials).await?;

        if let Some(LookupStatus::Failed { kind, priority, status: code }) = status {
            self.observe_failure_kind(kind, priority, code)?;
            self.record_error(target, history, counters, retry_count, kind, priority, code, None, None)?;
            return Ok(());
        }

        let full_user = match lookup {
            Some(u) => u,
            None => {
                self.record_error(
                    target,
                    history,
                    counters,
                    retry_count,
                    ErrorKind::ServerError,
                    Priority::Correctable,
                    None,
                    Some("record missing".to_string()),
                    None,
                )?;
                return Ok(());
            }
        };

        self.apply_decision_ladder(target, full_user, history, counters, retry_count).await
    }

    /// Resolves a target to its full record, preferring cache, falling
    /// back to the client and populating the cache on success.
    async fn resolve(&mut self, target: &Target, credentials: &Mapping) -> Result<(LookupResult, Option<LookupStatus>)> {
        let cache = self.owner_cache(credentials);
        match target.format {
            TargetFormat::Handle => {
                if let Some(id) = cache.lookup_handle(&target.value) {
                    if let Some((profile, relationship)) = cache.full_user(&id) {
                        return Ok((Some(FullUser { profile, relationship }), None));
                    }
                }
                let (result, status) = self.client.resolve_handle(&target.value, credentials).await?;
                if let Some(user) = &result {
                    let _ = cache.write_lookup(&target.value, &user.profile.id);
                    let _ = cache.write_profile(&user.profile);
                    let _ = cache.write_relationship(&user.profile.id, &user.relationship);
                }
                Ok((result, Some(status)))
            }
            TargetFormat::Id => {
                if let Some((profile, relationship)) = cache.full_user(&target.value) {
                    return Ok((Some(FullUser { profile, relationship }), None));
                }
                let (results, status) = self.client.lookup_batch(std::slice::from_ref(&target.value), credentials).await?;
                let (_, result) = results.into_iter().next().unwrap_or((target.value.clone(), None));
                if let Some(user) = &result {
                    let _ = cache.write_profile(&user.profile);
                    let _ = cache.write_relationship(&user.profile.id, &user.relationship);
                }
                let status = match status {
                    LookupStatus::Ok => None,
                    failed => Some(failed),
                };
                Ok((result, status))
            }
        }
    }

    async fn apply_decision_ladder(
        &mut self,
        target: &Target,
        user: FullUser,
        history: &HistoryStore<'_>,
        counters: &mut SessionCounters,
        retry_count: u32,
    ) -> Result<()> {
        let profile = user.profile;
        let relationship = user.relationship;

        if profile.availability.is_permanent() {
            self.record_skip(&profile, history, counters, HistoryStatus::Failed, None, "permanent availability".to_string())?;
            return Ok(());
        }

        if profile.availability == Availability::Unavailable {
            self.record_error(
                &Target::new(profile.id.clone(), TargetFormat::Id),
                history,
                counters,
                retry_count,
                ErrorKind::ServerError,
                Priority::Correctable,
                None,
                Some("unavailable".to_string()),
                Some(profile.availability),
            )?;
            return Ok(());
        }

        if relationship.following || relationship.followed_by {
            self.record_terminal(&profile, history, counters, ErrorKind::FollowConflict, "follow_conflict".to_string())?;
            return Ok(());
        }

        if relationship.blocking {
            self.record_success(&profile, history, counters)?;
            return Ok(());
        }

        let credentials = self.credentials.load()?;
        match self.client.block(&profile.id, &credentials).await? {
            BlockOutcome::Blocked => {
                self.recovery.record_success();
                self.tracker.record(ErrorKind::None, true);
                self.record_success(&profile, history, counters)?;
            }
            BlockOutcome::Failed { kind, priority, status, message } => {
                self.observe_failure_kind(kind, priority, status)?;
                self.tracker.record(kind, false);
                let outcome = Outcome {
                    screen_name: Some(profile.handle.clone()),
                    user_id: Some(profile.id.clone()),
                    display_name: Some(profile.display_name.clone()),
                    status: HistoryStatus::Failed,
                    response_code: status,
                    error_message: Some(message),
                    error_kind: Some(kind),
                    retry_count,
                    user_status: Some(profile.availability.to_string()),
                };
                history.record(&outcome)?;
                counters.errored += 1;
                msg_print!(Message::TargetOutcome(profile.id.clone(), format!("err:{}", kind)));
            }
        }
        Ok(())
    }

    fn observe_failure_kind(&mut self, kind: ErrorKind, _priority: Priority, status: Option<u16>) -> Result<()> {
        if kind == ErrorKind::AuthRequired {
            self.recovery.run_auth_recovery(&mut self.credentials)?;
        }
        if status == Some(403) {
            self.recovery.record_forbidden(&mut self.credentials);
        }
        if self.recovery.record_error_for_burst() {
            self.recovery.run_burst_recovery(&mut self.credentials)?;
        }
        Ok(())
    }

    fn record_success(&self, profile: &crate::model::Profile, history: &HistoryStore<'_>, counters: &mut SessionCounters) -> Result<()> {
        let outcome = Outcome {
            screen_name: Some(profile.handle.clone()),
            user_id: Some(profile.id.clone()),
            display_name: Some(profile.display_name.clone()),
            status: HistoryStatus::Blocked,
            response_code: Some(200),
            error_message: None,
            error_kind: Some(ErrorKind::None),
            retry_count: 0,
            user_status: Some(profile.availability.to_string()),
        };
        history.record(&outcome)?;
        counters.blocked += 1;
        counters.processed += 1;
        msg_print!(Message::TargetOutcome(profile.id.clone(), "ok".to_string()));
        Ok(())
    }

    fn record_terminal(
        &self,
        profile: &crate::model::Profile,
        history: &HistoryStore<'_>,
        counters: &mut SessionCounters,
        kind: ErrorKind,
        reason: String,
    ) -> Result<()> {
        let outcome = Outcome {
            screen_name: Some(profile.handle.clone()),
            user_id: Some(profile.id.clone()),
            display_name: Some(profile.display_name.clone()),
            status: HistoryStatus::Failed,
            response_code: None,
            error_message: Some(reason.clone()),
            error_kind: Some(kind),
            retry_count: MAX_RETRIES,
            user_status: Some(profile.availability.to_string()),
        };
        history.record(&outcome)?;
        counters.skipped += 1;
        counters.processed += 1;
        msg_print!(Message::TargetOutcome(profile.id.clone(), format!("skip:{}", reason)));
        Ok(())
    }

    fn record_skip(
        &self,
        profile: &crate::model::Profile,
        history: &HistoryStore<'_>,
        counters: &mut SessionCounters,
        status: HistoryStatus,
        response_code: Option<u16>,
        reason: String,
    ) -> Result<()> {
        let outcome = Outcome {
            screen_name: Some(profile.handle.clone()),
            user_id: Some(profile.id.clone()),
            display_name: Some(profile.display_name.clone()),
            status,
            response_code,
            error_message: Some(reason.clone()),
            error_kind: Some(ErrorKind::NotFound),
            retry_count: 0,
            user_status: Some(profile.availability.to_string()),
        };
        history.record(&outcome)?;
        counters.skipped += 1;
        counters.processed += 1;
        msg_print!(Message::TargetOutcome(profile.id.clone(), format!("skip:{}", reason)));
        Ok(())
    }

    fn record_error(
        &self,
        target: &Target,
        history: &HistoryStore<'_>,
        counters: &mut SessionCounters,
        retry_count: u32,
        kind: ErrorKind,
        _priority: Priority,
        status: Option<u16>,
        message: Option<String>,
        availability: Option<Availability>,
    ) -> Result<()> {
        let (screen_name, user_id) = match target.format {
            TargetFormat::Handle => (Some(target.value.clone()), None),
            TargetFormat::Id => (None, Some(target.value.clone())),
        };
        let outcome = Outcome {
            screen_name,
            user_id,
            display_name: None,
            status: HistoryStatus::Failed,
            response_code: status,
            error_message: message,
            error_kind: Some(kind),
            retry_count,
            user_status: availability.map(|a| a.to_string()),
        };
        history.record(&outcome)?;
        counters.errored += 1;
        counters.processed += 1;
        msg_print!(Message::TargetOutcome(target.value.clone(), format!("err:{}", kind)));
        Ok(())
    }
}
