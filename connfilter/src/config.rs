use connfilter_common::Verdict;
use serde::{Deserialize, Serialize};

/// Runtime settings of a [`Filter`](crate::Filter).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Verdict for connections no rule matches. `None` leaves them unmatched.
    #[serde(default)]
    pub default_verdict: Option<Verdict>,
    /// Log every evaluated connection, not only `AllowWithLogging` ones.
    #[serde(default)]
    pub log_connections: bool,
}

#[cfg(test)]
mod test {
    use super::FilterConfig;
    use connfilter_common::Verdict;

    #[test]
    fn defaults_when_missing() {
        let config: FilterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, FilterConfig::default());
        assert_eq!(config.default_verdict, None);
        assert!(!config.log_connections);
    }

    #[test]
    fn from_json() {
        let config: FilterConfig =
            serde_json::from_str(r#"{"default_verdict": "Reject", "log_connections": true}"#)
                .unwrap();
        assert_eq!(config.default_verdict, Some(Verdict::Reject));
        assert!(config.log_connections);
    }
}
