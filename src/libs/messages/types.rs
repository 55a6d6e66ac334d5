use std::fmt;

/// Centralized catalog of every user-facing string the engine can emit.
///
/// Grouped to mirror the component boundaries in the engine (credentials,
/// history, classifier, retry, cache, remote client, recovery, processing).
#[derive(Debug, Clone)]
pub enum Message {
    // === CREDENTIAL STORE ===
    CredentialsMissing(String),    // path
    CredentialsLoaded(usize),      // count of name/value pairs kept
    CredentialsInvalidated,
    CredentialsRefreshed,
    CredentialsWaitTimedOut(u64),  // seconds waited
    CredentialsUnrecoverable(String), // path

    // === HISTORY STORE ===
    HistoryRecorded(String, String), // identifier, status
    HistoryMigrationsApplied(usize),
    SessionStarted(i64, usize), // session id, total targets
    SessionCompleted(i64, usize, usize, usize), // id, processed, blocked, errored

    // === CLASSIFIER / RETRY ===
    ClassifierResult(String, String), // kind, priority
    RetryScheduled(String, f64), // identifier, delay seconds
    RetryExhausted(String, u32), // identifier, attempt count

    // === IDENTIFIER CACHE ===
    CacheHit(String),
    CacheMiss(String),
    CacheExpired(String),
    CacheWriteFailed(String, String), // path, error

    // === REMOTE CLIENT ===
    RateLimitWait(u64, String), // seconds, reset time
    AuthRequiredDetected,
    RequestFailed(String, u16), // operation, status

    // === RECOVERY COORDINATOR ===
    AuthRecoveryStarted(u32), // attempt number
    AuthRecoverySucceeded,
    AuthRecoveryAborted,
    BurstRecoveryTriggered(u32, u32), // consecutive, windowed
    ThresholdRefreshTriggered(u32), // accumulated 403 count
    RecoveryStateChanged(String, String), // from, to

    // === PROCESSING ENGINE ===
    TargetOutcome(String, String), // identifier, "ok" | "skip:<reason>" | "err:<kind>"
    SliceProgress(usize, usize, usize, usize), // processed, blocked, skipped, errored
    InputRejected(String),
    RunInterrupted,
    ProcessingComplete(usize, usize, usize, usize),

    // === CONFIG / CLI ===
    ConfigLoaded(String),       // path
    ConfigDefaultsUsed,
    InvalidTargetsFile(String), // reason
    UnknownFlagCombination,

    // === GENERAL ===
    OperationCompleted,
    OperationCancelled,
    FileNotFound(String),
    FileReadError(String, String), // path, error
    FileWriteError(String, String),
    DbConnectionFailed(String),
    DbMigrationFailed(u32, String), // version, error
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::CredentialsMissing(path) => write!(f, "Credentials file not found at {}", path),
            Message::CredentialsLoaded(n) => write!(f, "Loaded {} credential values", n),
            Message::CredentialsInvalidated => write!(f, "Credential cache invalidated"),
            Message::CredentialsRefreshed => write!(f, "Credentials refreshed"),
            Message::CredentialsWaitTimedOut(secs) => write!(f, "Timed out after {}s waiting for credential refresh", secs),
            Message::CredentialsUnrecoverable(path) => write!(
                f,
                "Credentials could not be recovered.\nThe file at {} was not refreshed in time.\nAll pending recoveries have been exhausted.\nUpdate the credentials file and run again.",
                path
            ),
            Message::HistoryRecorded(id, status) => write!(f, "Recorded {} as {}", id, status),
            Message::HistoryMigrationsApplied(n) => write!(f, "Applied {} migration(s)", n),
            Message::SessionStarted(id, total) => write!(f, "Session {} started with {} target(s)", id, total),
            Message::SessionCompleted(id, p, b, e) => {
                write!(f, "Session {} complete: processed={} blocked={} errored={}", id, p, b, e)
            }
            Message::ClassifierResult(kind, priority) => write!(f, "Classified as {} (priority {})", kind, priority),
            Message::RetryScheduled(id, delay) => write!(f, "Retrying {} in {:.1}s", id, delay),
            Message::RetryExhausted(id, attempts) => write!(f, "{} exhausted after {} attempt(s)", id, attempts),
            Message::CacheHit(id) => write!(f, "Cache hit for {}", id),
            Message::CacheMiss(id) => write!(f, "Cache miss for {}", id),
            Message::CacheExpired(id) => write!(f, "Cache entry for {} expired", id),
            Message::CacheWriteFailed(path, err) => write!(f, "Failed to write cache file {}: {}", path, err),
            Message::RateLimitWait(secs, reset) => write!(f, "Rate limited, waiting {}s (resets at {})", secs, reset),
            Message::AuthRequiredDetected => write!(f, "Server reported authentication required"),
            Message::RequestFailed(op, status) => write!(f, "{} failed with status {}", op, status),
            Message::AuthRecoveryStarted(attempt) => write!(f, "Starting authentication recovery (attempt {})", attempt),
            Message::AuthRecoverySucceeded => write!(f, "Authentication recovered"),
            Message::AuthRecoveryAborted => write!(f, "Authentication recovery aborted"),
            Message::BurstRecoveryTriggered(c, w) => {
                write!(f, "Burst recovery triggered (consecutive={}, windowed={})", c, w)
            }
            Message::ThresholdRefreshTriggered(n) => write!(f, "Forbidden-response threshold reached ({}), refreshing credentials", n),
            Message::RecoveryStateChanged(from, to) => write!(f, "Recovery state: {} -> {}", from, to),
            Message::TargetOutcome(id, outcome) => write!(f, "{} {}", id, outcome),
            Message::SliceProgress(p, b, s, e) => write!(f, "processed={} blocked={} skipped={} errored={}", p, b, s, e),
            Message::InputRejected(reason) => write!(f, "Input rejected: {}", reason),
            Message::RunInterrupted => write!(f, "Run interrupted, finishing in-flight target"),
            Message::ProcessingComplete(p, b, s, e) => {
                write!(f, "Done: processed={} blocked={} skipped={} errored={}", p, b, s, e)
            }
            Message::ConfigLoaded(path) => write!(f, "Loaded configuration from {}", path),
            Message::ConfigDefaultsUsed => write!(f, "Using default configuration"),
            Message::InvalidTargetsFile(reason) => write!(f, "Targets file is invalid: {}", reason),
            Message::UnknownFlagCombination => write!(f, "Action flags are mutually exclusive"),
            Message::OperationCompleted => write!(f, "Operation completed successfully"),
            Message::OperationCancelled => write!(f, "Operation cancelled"),
            Message::FileNotFound(path) => write!(f, "File not found: {}", path),
            Message::FileReadError(path, err) => write!(f, "Failed to read {}: {}", path, err),
            Message::FileWriteError(path, err) => write!(f, "Failed to write {}: {}", path, err),
            Message::DbConnectionFailed(err) => write!(f, "Failed to open history database: {}", err),
            Message::DbMigrationFailed(version, err) => write!(f, "Migration {} failed: {}", version, err),
        }
    }
}
