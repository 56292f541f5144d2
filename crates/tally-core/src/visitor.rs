use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use url::{Host, Url};

/// Compute the pseudonymous visitor hash for a hit.
///
/// Formula: sha256(ip + day)[0..16] encoded as 32 hex chars, where `day` is
/// the ISO calendar date of the hit. The same IP hashes differently on every
/// day, so repeat hits are deduplicated within a day but cannot be linked
/// across days. The raw IP is never stored.
pub fn anonymize(ip: &str, day: NaiveDate) -> String {
    let input = format!("{}{}", ip, day.format("%Y-%m-%d"));
    let hash = Sha256::digest(input.as_bytes());
    // First 16 bytes → 32 hex characters.
    hex::encode(&hash[..16])
}

/// Extract the bare referrer domain from a full referrer URL.
///
/// A leading `www.` is stripped. Returns an empty string if the referrer is
/// empty, cannot be parsed, or has no host.
pub fn normalize_referrer(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let Ok(parsed) = Url::parse(raw) else {
        return String::new();
    };
    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        // Ipv6Addr's Display has no brackets.
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return String::new(),
    };
    match host.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => host,
    }
}
