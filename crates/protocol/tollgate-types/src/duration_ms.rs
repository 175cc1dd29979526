//! Serde helper for `Duration` stored as integer milliseconds.
//!
//! ```ignore
//! #[serde(with = "tollgate_types::duration_ms")]
//! pub request_timeout: Duration,
//! ```

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "super")]
        timeout: Duration,
    }

    #[test]
    fn test_millis() {
        let parsed: Wrapper = serde_json::from_str(r#"{"timeout":1500}"#).unwrap();
        assert_eq!(parsed.timeout, Duration::from_millis(1500));
        assert_eq!(
            serde_json::to_string(&parsed).unwrap(),
            r#"{"timeout":1500}"#
        );
    }
}
