//! HTTP client for the platform's handle-lookup, batch-lookup and block
//! endpoints (§4.F). Every call passes through the same pipeline: build
//! headers, issue the request, handle rate limiting and auth escalation
//! in-band, and leave classification of anything else to the caller.

use crate::libs::classifier::classify;
use crate::libs::credentials::Mapping;
use crate::libs::messages::Message;
use crate::{msg_info, msg_warning};
use crate::model::{Availability, ErrorKind, FullUser, Priority, Profile, Relationship};
use anyhow::Result;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

// Exact endpoint shapes are an implementation detail; these stand in for
// the handle-lookup GraphQL query, the id-batch GraphQL query and the
// block form-POST.
const LOOKUP_HANDLE_URL: &str = "https://x.com/i/api/graphql/lookup/UserByScreenName";
const LOOKUP_BATCH_URL: &str = "https://x.com/i/api/graphql/lookup/UsersByRestIds";
const BLOCK_URL: &str = "https://x.com/i/api/1.1/blocks/create.json";

const BEARER_TOKEN: &str = "AAAAAAAAAAAAAAAAAAAAANRILgAAAAAAnNwIzUejRCOuH5E6I8xnZz4puTs%3D1Zv7ttfk8LF81IUq16cHjhLTvJu4FA33AGWWjCpTnA";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const MAX_IDS_PER_BATCH: usize = 50;
const TELEMETRY_WINDOW: usize = 200;

/// One parsed result from a lookup call; a `None` body means the id/handle
/// was not found at all (distinct from an availability of `not_found`,
/// which means the platform returned a tombstone record for it).
pub type LookupResult = Option<FullUser>;

pub enum BlockOutcome {
    Blocked,
    Failed { kind: ErrorKind, priority: Priority, status: Option<u16>, message: String },
}

struct RawResponse {
    status: Option<u16>,
    body: String,
    headers: HashMap<String, String>,
}

/// Tracks recent outcomes split by whether enhanced headers were attached,
/// to compare success rates and recommend whether enhancement is worth it.
#[derive(Default)]
struct HeaderTelemetry {
    outcomes: VecDeque<(bool, bool)>, // (enhanced, success)
}

impl HeaderTelemetry {
    fn record(&mut self, enhanced: bool, success: bool) {
        self.outcomes.push_back((enhanced, success));
        while self.outcomes.len() > TELEMETRY_WINDOW {
            self.outcomes.pop_front();
        }
    }

    /// `(enhanced success rate, baseline success rate, recommend enhancement)`.
    /// Either rate is `None` until at least one outcome of that kind exists.
    fn recommendation(&self) -> (Option<f64>, Option<f64>, bool) {
        let rate = |enhanced: bool| -> Option<f64> {
            let relevant: Vec<bool> = self.outcomes.iter().filter(|(e, _)| *e == enhanced).map(|(_, s)| *s).collect();
            if relevant.is_empty() {
                return None;
            }
            Some(relevant.iter().filter(|s| **s).count() as f64 / relevant.len() as f64)
        };
        let enhanced_rate = rate(true);
        let baseline_rate = rate(false);
        let recommend = match (enhanced_rate, baseline_rate) {
            (Some(e), Some(b)) => e >= b,
            (Some(_), None) => true,
            _ => true,
        };
        (enhanced_rate, baseline_rate, recommend)
    }
}

/// Per-process identity used to build enhanced headers: a stable UUID plus
/// a monotonic transaction counter.
struct SessionIdentity {
    session_uuid: String,
    forwarded_for: Option<String>,
    tx_counter: std::sync::atomic::AtomicU64,
}

impl SessionIdentity {
    fn new(forwarded_for: Option<String>) -> Self {
        Self { session_uuid: synthetic_uuid(), forwarded_for, tx_counter: std::sync::atomic::AtomicU64::new(0) }
    }

    fn next_transaction_id(&self) -> u64 {
        self.tx_counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
    }
}

fn synthetic_uuid() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15]
    )
}

fn synthetic_forwarded_for(ranges: &[String]) -> Option<String> {
    if ranges.is_empty() {
        return None;
    }
    let mut rng = rand::thread_rng();
    let range = &ranges[rng.gen_range(0..ranges.len())];
    let base: Vec<u8> = range
        .split('/')
        .next()?
        .split('.')
        .filter_map(|octet| octet.parse::<u8>().ok())
        .collect();
    if base.len() != 4 {
        return None;
    }
    Some(format!("{}.{}.{}.{}", base[0], base[1], base[2], rng.gen_range(1..254)))
}

pub struct RemoteClient {
    http: reqwest::Client,
    identity: SessionIdentity,
    header_enhancement: bool,
    telemetry: HeaderTelemetry,
}

impl RemoteClient {
    pub fn new(header_enhancement: bool, forwarded_for_enabled: bool, forwarded_for_ranges: &[String]) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        let forwarded_for = if forwarded_for_enabled { synthetic_forwarded_for(forwarded_for_ranges) } else { None };
        Ok(Self { http, identity: SessionIdentity::new(forwarded_for), header_enhancement, telemetry: HeaderTelemetry::default() })
    }

    fn build_headers(&self, credentials: &Mapping) -> reqwest::header::HeaderMap {
        use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

        let mut headers = HeaderMap::new();
        headers.insert(reqwest::header::AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", BEARER_TOKEN)).unwrap());
        headers.insert(reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT));

        if let Some(csrf) = credentials.get("ct0") {
            if let Ok(value) = HeaderValue::from_str(csrf) {
                headers.insert(HeaderName::from_static("x-csrf-token"), value);
            }
        }

        let cookie_header = credentials.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("; ");
        if let Ok(value) = HeaderValue::from_str(&cookie_header) {
            headers.insert(reqwest::header::COOKIE, value);
        }

        if self.header_enhancement {
            let tx_id = self.identity.next_transaction_id();
            if let Ok(value) = HeaderValue::from_str(&tx_id.to_string()) {
                headers.insert(HeaderName::from_static("x-client-transaction-id"), value);
            }
            if let Ok(value) = HeaderValue::from_str(&self.identity.session_uuid) {
                headers.insert(HeaderName::from_static("x-client-uuid"), value);
            }
            let request_id = format!("{}-{}", chrono::Utc::now().timestamp_millis(), tx_id);
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(HeaderName::from_static("x-request-id"), value);
            }
            if let Some(ff) = &self.identity.forwarded_for {
                if let Ok(value) = HeaderValue::from_str(ff) {
                    headers.insert(HeaderName::from_static("x-forwarded-for"), value);
                }
            }
        }

        headers
    }

    async fn send_once(&self, request: reqwest::RequestBuilder, credentials: &Mapping) -> RawResponse {
        let headers = self.build_headers(credentials);
        match request.headers(headers).send().await {
            Ok(resp) => {
                let status = Some(resp.status().as_u16());
                let resp_headers: HashMap<String, String> =
                    resp.headers().iter().filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_lowercase(), v.to_string()))).collect();
                let body = resp.text().await.unwrap_or_default();
                RawResponse { status, body, headers: resp_headers }
            }
            Err(_) => RawResponse { status: None, body: String::new(), headers: HashMap::new() },
        }
    }

    /// Runs the uniform request pipeline: build headers, issue the
    /// request, handle a single in-band 429 retry, surface 401 for the
    /// caller to escalate to the recovery coordinator. `rebuild` constructs
    /// a fresh, unsent request for both the initial attempt and the retry.
    async fn execute(&mut self, rebuild: impl Fn(&reqwest::Client) -> reqwest::RequestBuilder, credentials: &Mapping) -> Result<(RawResponse, bool)> {
        let enhanced = self.header_enhancement;
        let raw = self.send_once(rebuild(&self.http), credentials).await;

        if raw.status == Some(429) {
            let reset_in = raw
                .headers
                .get("x-rate-limit-reset")
                .and_then(|v| v.parse::<i64>().ok())
                .map(|reset_at| reset_at - chrono::Utc::now().timestamp())
                .unwrap_or(60);
            let delay = (reset_in + 10).max(60).min(900) as u64;
            msg_info!(Message::RateLimitWait(delay, raw.headers.get("x-rate-limit-reset").cloned().unwrap_or_default()));
            tokio::time::sleep(Duration::from_secs(delay)).await;

            let raw = self.send_once(rebuild(&self.http), credentials).await;
            return Ok((raw, enhanced));
        }

        if raw.status == Some(401) {
            msg_warning!(Message::AuthRequiredDetected);
        }

        Ok((raw, enhanced))
    }

    /// Resolves a single handle into its full record, populating all three
    /// cache layers is the caller's responsibility (the client only parses).
    pub async fn resolve_handle(&mut self, handle: &str, credentials: &Mapping) -> Result<(LookupResult, LookupStatus)> {
        let handle = handle.to_string();
        let (raw, enhanced) = self.execute(|http| http.get(LOOKUP_HANDLE_URL).query(&[("screen_name", &handle)]), credentials).await?;
        let outcome = self.interpret_lookup(&raw, enhanced, "resolve_handle", None, Some(&handle));
        Ok(outcome)
    }

    /// Looks up a batch of ids (at most `MAX_IDS_PER_BATCH` per call,
    /// chunked by the caller otherwise). The returned `LookupStatus`
    /// describes the batch request as a whole; a `Failed` status means
    /// every id in `ids` comes back with a `None` record.
    pub async fn lookup_batch(&mut self, ids: &[String], credentials: &Mapping) -> Result<(Vec<(String, LookupResult)>, LookupStatus)> {
        let chunk: Vec<&String> = ids.iter().take(MAX_IDS_PER_BATCH).collect();
        let joined = chunk.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(",");
        let (raw, enhanced) = self.execute(|http| http.get(LOOKUP_BATCH_URL).query(&[("user_ids", &joined)]), credentials).await?;

        if raw.status != Some(200) {
            let (kind, priority) = classify(raw.status, &raw.body, &raw.headers);
            self.telemetry.record(enhanced, false);
            msg_warning!(Message::RequestFailed("lookup_batch".to_string(), raw.status.unwrap_or(0)));
            let status = raw.status;
            return Ok((ids.iter().map(|id| (id.clone(), None)).collect(), LookupStatus::Failed { kind, priority, status }));
        }
        self.telemetry.record(enhanced, true);

        let parsed: HashMap<String, Option<UserEnvelope>> = serde_json::from_str(&raw.body).unwrap_or_default();
        let results = ids
            .iter()
            .map(|id| {
                let record = parsed.get(id).and_then(|v| v.as_ref()).and_then(|e| envelope_to_full_user(e, Some(id), None));
                (id.clone(), record)
            })
            .collect();
        Ok((results, LookupStatus::Ok))
    }

    /// Submits the block. Parses only success/failure, per §4.F.
    pub async fn block(&mut self, id: &str, credentials: &Mapping) -> Result<BlockOutcome> {
        let id_owned = id.to_string();
        let (raw, enhanced) = self.execute(|http| http.post(BLOCK_URL).form(&[("user_id", &id_owned)]), credentials).await?;

        if raw.status == Some(200) {
            self.telemetry.record(enhanced, true);
            return Ok(BlockOutcome::Blocked);
        }

        self.telemetry.record(enhanced, false);
        let (kind, priority) = classify(raw.status, &raw.body, &raw.headers);
        Ok(BlockOutcome::Failed { kind, priority, status: raw.status, message: raw.body })
    }

    /// Exposes the header-enhancement effectiveness telemetry: enhanced
    /// success rate, baseline success rate, and whether enhancement is
    /// currently recommended.
    pub fn header_enhancement_report(&self) -> (Option<f64>, Option<f64>, bool) {
        self.telemetry.recommendation()
    }

    fn interpret_lookup(
        &mut self,
        raw: &RawResponse,
        enhanced: bool,
        operation: &str,
        fallback_id: Option<&str>,
        fallback_screen_name: Option<&str>,
    ) -> (LookupResult, LookupStatus) {
        if raw.status == Some(200) {
            self.telemetry.record(enhanced, true);
            let envelope: Option<UserEnvelope> = serde_json::from_str(&raw.body).ok();
            let record = envelope.and_then(|e| envelope_to_full_user(&e, fallback_id, fallback_screen_name));
            return (record, LookupStatus::Ok);
        }

        self.telemetry.record(enhanced, false);
        let (kind, priority) = classify(raw.status, &raw.body, &raw.headers);
        msg_warning!(Message::RequestFailed(operation.to_string(), raw.status.unwrap_or(0)));
        (None, LookupStatus::Failed { kind, priority, status: raw.status })
    }
}

pub enum LookupStatus {
    Ok,
    Failed { kind: ErrorKind, priority: Priority, status: Option<u16> },
}

/// Wire envelope for a single looked-up user: a GraphQL `data.user.result`
/// nesting either a tombstone (`__typename: "UserUnavailable"`, with
/// `reason` driving which `Availability` it maps to) or a live user under
/// `legacy`, plus the top-level `errors` array the platform uses to signal
/// "no such user" outright.
#[derive(Debug, Clone, Default, serde::Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    data: Option<EnvelopeData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct EnvelopeData {
    user: Option<UserResultWrapper>,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct UserResultWrapper {
    result: UserResult,
}

#[derive(Debug, Clone, serde::Deserialize)]
struct UserResult {
    #[serde(rename = "__typename", default)]
    typename: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    rest_id: Option<String>,
    #[serde(default)]
    legacy: Option<LegacyUser>,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct LegacyUser {
    #[serde(default)]
    id_str: Option<String>,
    #[serde(default)]
    screen_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    following: bool,
    #[serde(default)]
    followed_by: bool,
    #[serde(default)]
    blocking: bool,
    #[serde(default)]
    blocked_by: bool,
    #[serde(default)]
    protected: bool,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct GraphqlError {
    #[serde(default)]
    message: String,
}

/// Availability a tombstone's lowercased `reason` maps to. An absent or
/// unrecognized reason still means the account is gone, just not how.
fn availability_from_reason(reason: Option<&str>) -> Availability {
    match reason.map(|r| r.to_lowercase()) {
        Some(r) if r == "suspended" => Availability::Suspended,
        Some(r) if r == "deactivated" => Availability::Deactivated,
        _ => Availability::Unavailable,
    }
}

/// Decodes one GraphQL user envelope into the closed model. `fallback_id`
/// and `fallback_screen_name` backfill whichever identifier the caller
/// already knows and the wire payload omits (tombstones carry neither
/// consistently, and batch lookups key by id rather than returning it).
fn envelope_to_full_user(envelope: &UserEnvelope, fallback_id: Option<&str>, fallback_screen_name: Option<&str>) -> LookupResult {
    if let Some(result) = envelope.data.as_ref().and_then(|d| d.user.as_ref()).map(|w| &w.result) {
        if result.typename == "UserUnavailable" {
            let availability = availability_from_reason(result.reason.as_deref());
            let id = result.rest_id.clone().or_else(|| fallback_id.map(String::from)).unwrap_or_default();
            return Some(FullUser {
                profile: Profile { id, handle: fallback_screen_name.unwrap_or_default().to_string(), display_name: String::new(), availability },
                relationship: Relationship::default(),
            });
        }

        if let Some(legacy) = &result.legacy {
            let id = legacy.id_str.clone().or_else(|| result.rest_id.clone()).or_else(|| fallback_id.map(String::from)).unwrap_or_default();
            return Some(FullUser {
                profile: Profile {
                    id,
                    handle: legacy.screen_name.clone().or_else(|| fallback_screen_name.map(String::from)).unwrap_or_default(),
                    display_name: legacy.name.clone().unwrap_or_default(),
                    availability: Availability::Active,
                },
                relationship: Relationship {
                    following: legacy.following,
                    followed_by: legacy.followed_by,
                    blocking: legacy.blocking,
                    blocked_by: legacy.blocked_by,
                    protected: legacy.protected,
                },
            });
        }
    }

    if envelope.errors.iter().any(|e| e.message.contains("User not found")) {
        return Some(FullUser {
            profile: Profile {
                id: fallback_id.map(String::from).unwrap_or_default(),
                handle: fallback_screen_name.unwrap_or_default().to_string(),
                display_name: String::new(),
                availability: Availability::NotFound,
            },
            relationship: Relationship::default(),
        });
    }

    None
}
