//! Utility functions

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::constants::{API_KEY_PREFIX, API_KEY_RANDOM_LEN};

const SECONDS_PER_DAY: i64 = 86_400;

/// Masks all but the last 4 characters; keys of 4 characters or fewer are returned as-is.
pub fn mask_license_key(key: &str) -> String {
    let len = key.chars().count();
    if len <= 4 {
        return key.to_string();
    }
    let tail: String = key.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), tail)
}

/// Whole days between `now` and `until`, rounded toward negative infinity.
pub fn days_until(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (until - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Generates a tenant API key of the form `bb_` followed by 20 characters.
pub fn generate_api_key() -> String {
    let random: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(API_KEY_RANDOM_LEN)
        .collect();
    format!("{}{}", API_KEY_PREFIX, random)
}

/// Pluralizes `noun` with a trailing `s` unless `count` is 1.
pub fn pluralize(count: i64, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_mask_license_key() {
        assert_eq!(mask_license_key("tenant-abcdefgh"), "***********efgh");
        assert_eq!(mask_license_key("abcd"), "abcd");
        assert_eq!(mask_license_key("abcde"), "*bcde");
        assert_eq!(mask_license_key(""), "");
    }

    #[test]
    fn test_days_until_floors() {
        let now = Utc::now();
        assert_eq!(days_until(now + Duration::days(90), now), 90);
        assert_eq!(days_until(now + Duration::hours(47), now), 1);
        assert_eq!(days_until(now - Duration::hours(12), now), -1);
        assert_eq!(days_until(now, now), 0);
    }

    #[test]
    fn test_generate_api_key() {
        let key = generate_api_key();
        assert!(key.starts_with("bb_"));
        assert_eq!(key.len(), 23);
        assert_ne!(key, generate_api_key());
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(1, "camera"), "1 camera");
        assert_eq!(pluralize(3, "camera"), "3 cameras");
    }
}
