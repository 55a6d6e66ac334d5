//! Response classifier (§4.C). Pure function mapping a remote response to a
//! closed `ErrorKind` with a priority. The 403 body/header rules are
//! deliberately shallow substring matches, kept as an ordered, first-match
//! table; append new rules to the tail, never reorder existing ones.

use crate::model::{ErrorKind, Priority};
use std::collections::HashMap;

/// Classifies a response by status code, body text, and headers.
pub fn classify(status: Option<u16>, body: &str, headers: &HashMap<String, String>) -> (ErrorKind, Priority) {
    match status {
        None => (ErrorKind::Timeout, Priority::Correctable),
        Some(429) => (ErrorKind::RateLimit, Priority::Correctable),
        Some(401) => (ErrorKind::AuthRequired, Priority::PolicyChange),
        Some(404) => (ErrorKind::NotFound, Priority::Severe),
        Some(403) => classify_forbidden(body, headers),
        Some(s) if (500..600).contains(&s) => (ErrorKind::ServerError, Priority::Correctable),
        Some(200) => (ErrorKind::None, Priority::Correctable),
        _ => (ErrorKind::UnknownForbidden, Priority::PolicyChange),
    }
}

fn classify_forbidden(body: &str, headers: &HashMap<String, String>) -> (ErrorKind, Priority) {
    let body_lower = body.to_lowercase();
    let remaining = headers.get("x-rate-limit-remaining").map(|s| s.as_str());

    if body_lower.contains("rate limit") || body_lower.contains("too many") || remaining == Some("0") {
        return (ErrorKind::RateLimit, Priority::Correctable);
    }

    if body_lower.contains("authoriz") || body_lower.contains("invalid token") || body_lower.contains("credential") {
        return (ErrorKind::AuthRequired, Priority::PolicyChange);
    }

    if body_lower.contains("account")
        && (body_lower.contains("restricted") || body_lower.contains("suspended") || body_lower.contains("locked"))
    {
        return (ErrorKind::AccountRestricted, Priority::Severe);
    }

    if body_lower.contains("ip") && (body_lower.contains("blocked") || body_lower.contains("restricted")) {
        return (ErrorKind::IpBlocked, Priority::Severe);
    }

    if body_lower.contains("bot") || body_lower.contains("automated") || body_lower.contains("suspicious") || body_lower.contains("verification") {
        return (ErrorKind::AntiBot, Priority::PolicyChange);
    }

    if body_lower.contains("header") || body_lower.contains("user-agent") || body_lower.contains("missing required") {
        return (ErrorKind::HeaderIssue, Priority::Correctable);
    }

    if body_lower.contains("permission") || body_lower.contains("access denied") || body_lower.contains("forbidden") {
        return (ErrorKind::PermissionDenied, Priority::PolicyChange);
    }

    (ErrorKind::UnknownForbidden, Priority::PolicyChange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn maps_direct_status_codes() {
        assert_eq!(classify(Some(429), "", &headers()).0, ErrorKind::RateLimit);
        assert_eq!(classify(Some(401), "", &headers()).0, ErrorKind::AuthRequired);
        assert_eq!(classify(Some(404), "", &headers()).0, ErrorKind::NotFound);
        assert_eq!(classify(Some(503), "", &headers()).0, ErrorKind::ServerError);
        assert_eq!(classify(Some(200), "", &headers()).0, ErrorKind::None);
        assert_eq!(classify(None, "connection refused", &headers()).0, ErrorKind::Timeout);
    }

    #[test]
    fn classifies_forbidden_rate_limit_first() {
        let (kind, prio) = classify(Some(403), "Rate limit exceeded, try later", &headers());
        assert_eq!(kind, ErrorKind::RateLimit);
        assert_eq!(prio, Priority::Correctable);
    }

    #[test]
    fn classifies_forbidden_by_rate_limit_header_even_with_unrelated_body() {
        let mut h = headers();
        h.insert("x-rate-limit-remaining".to_string(), "0".to_string());
        let (kind, _) = classify(Some(403), "some other message", &h);
        assert_eq!(kind, ErrorKind::RateLimit);
    }

    #[test]
    fn classifies_account_restricted_requires_both_terms() {
        let (kind, prio) = classify(Some(403), "Your account has been suspended", &headers());
        assert_eq!(kind, ErrorKind::AccountRestricted);
        assert_eq!(prio, Priority::Severe);

        // "account" alone, without a restriction term, falls through to a
        // later rule rather than matching account_restricted.
        let (kind, _) = classify(Some(403), "account lookup failed: forbidden", &headers());
        assert_ne!(kind, ErrorKind::AccountRestricted);
    }

    #[test]
    fn classifies_ip_blocked() {
        let (kind, prio) = classify(Some(403), "Your IP has been blocked", &headers());
        assert_eq!(kind, ErrorKind::IpBlocked);
        assert_eq!(prio, Priority::Severe);
    }

    #[test]
    fn classifies_anti_bot() {
        let (kind, _) = classify(Some(403), "Suspicious activity detected, please complete verification", &headers());
        assert_eq!(kind, ErrorKind::AntiBot);
    }

    #[test]
    fn classifies_header_issue() {
        let (kind, _) = classify(Some(403), "Missing required header: User-Agent", &headers());
        assert_eq!(kind, ErrorKind::HeaderIssue);
    }

    #[test]
    fn unmatched_403_falls_back_to_unknown_forbidden() {
        let (kind, prio) = classify(Some(403), "something entirely unexpected", &headers());
        assert_eq!(kind, ErrorKind::UnknownForbidden);
        assert_eq!(prio, Priority::PolicyChange);
    }

    #[test]
    fn rule_order_prefers_rate_limit_over_auth_when_both_present() {
        let (kind, _) = classify(Some(403), "rate limit: invalid token also present", &headers());
        assert_eq!(kind, ErrorKind::RateLimit);
    }
}
