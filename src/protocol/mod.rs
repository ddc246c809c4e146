pub mod error;

use serde::{Deserialize, Serialize};

/// Daemon status overview, served as JSON by the status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MintStatus {
    pub version: String,
    pub platform: String,
    pub uptime_secs: u64,
    /// Codes consumed so far — issued to callers or spent on filter
    /// rejections.
    pub used: u64,
    /// Codes still available in the 32-bit space.
    pub remaining: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_json() {
        let status = MintStatus {
            version: "0.1.0".into(),
            platform: "linux".into(),
            uptime_secs: 7,
            used: 12,
            remaining: 4294967284,
        };
        let json = serde_json::to_string(&status).unwrap();
        let back: MintStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn status_uses_plain_field_names() {
        let status = MintStatus {
            version: "0.1.0".into(),
            platform: "linux".into(),
            uptime_secs: 0,
            used: 1,
            remaining: 2,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("used").is_some());
        assert!(json.get("remaining").is_some());
        assert!(json.get("uptime_secs").is_some());
    }
}
