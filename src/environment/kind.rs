use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// What kind of application is starting
///
/// Deciding the kind (for example by checking which server stack is linked
/// in) happens before a run begins; the lifecycle only carries the result.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ApplicationKind {
    /// No embedded server
    #[default]
    Standalone,
    /// A blocking, thread-per-request web server
    Servlet,
    /// A non-blocking web server
    Reactive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(ApplicationKind::from_str("reactive").unwrap(), ApplicationKind::Reactive);
        assert_eq!(ApplicationKind::Servlet.to_string(), "servlet");
        assert!(ApplicationKind::from_str("desktop").is_err());
    }

    #[test]
    fn test_serde_names() {
        let kind: ApplicationKind = serde_json::from_str("\"standalone\"").unwrap();
        assert_eq!(kind, ApplicationKind::Standalone);
        assert_eq!(serde_json::to_string(&ApplicationKind::Reactive).unwrap(), "\"reactive\"");
    }
}
