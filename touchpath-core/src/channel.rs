//! Channel labels for touchpoints.
//!
//! Sessions are labelled from their traffic source and medium, impressions
//! from their campaign type and creative format.

/// Label for sessions without a medium
pub const DIRECT: &str = "direct";

/// Label for referral sessions, regardless of referring site
pub const REFERRAL: &str = "referral";

/// Label for email sessions, regardless of sender
pub const EMAIL: &str = "email";

/// Stand-in when a medium needs a source and none was recorded
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Medium values that mean "no medium"
const NONE_MEDIUMS: &[&str] = &["", "(none)", "none"];

/// Channel for a web session.
///
/// | medium            | channel               |
/// |-------------------|-----------------------|
/// | none / empty      | `direct`              |
/// | `organic`         | `<source>_organic`    |
/// | `social`          | `social_<source>`     |
/// | `referral`        | `referral`            |
/// | `email`           | `email`               |
/// | anything else     | `<medium>_<source>`   |
pub fn session_channel(source: Option<&str>, medium: Option<&str>) -> String {
    let medium = medium.map(str::trim).unwrap_or("");
    let source = source
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_SOURCE);

    if NONE_MEDIUMS.contains(&medium) {
        return DIRECT.to_string();
    }

    match medium {
        "organic" => format!("{source}_organic"),
        "social" => format!("social_{source}"),
        "referral" => REFERRAL.to_string(),
        "email" => EMAIL.to_string(),
        other => format!("{other}_{source}"),
    }
}

/// Channel for an ad impression: `<campaign_type>_<creative_format>`, lower-cased.
pub fn impression_channel(campaign_type: &str, creative_format: &str) -> String {
    format!(
        "{}_{}",
        campaign_type.trim().to_lowercase(),
        creative_format.trim().to_lowercase()
    )
}
