//! Best-effort user-agent classification for click analytics.
//!
//! Classification never fails: unparsable strings fall back to "desktop",
//! and crawler traffic is labelled "bot". Accuracy is explicitly best
//! effort.

use woothee::parser::Parser;

/// Device / browser / OS families extracted from a user-agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaInfo {
    /// One of: `desktop`, `mobile`, `tablet`, `bot`.
    pub device_type: String,
    pub browser: Option<String>,
    pub os: Option<String>,
}

impl Default for UaInfo {
    fn default() -> Self {
        Self {
            device_type: "desktop".to_string(),
            browser: None,
            os: None,
        }
    }
}

/// Classifies a user-agent string into device/browser/OS families.
pub fn classify(user_agent: Option<&str>) -> UaInfo {
    let Some(ua) = user_agent else {
        return UaInfo::default();
    };

    let parser = Parser::new();
    let Some(result) = parser.parse(ua) else {
        return UaInfo::default();
    };

    let device_type = match result.category {
        "pc" => "desktop",
        "smartphone" | "mobilephone" => "mobile",
        "appliance" => "tablet",
        "crawler" => "bot",
        _ => "desktop",
    }
    .to_string();

    let browser = match result.name {
        "" | "UNKNOWN" => None,
        name => Some(name.to_string()),
    };

    let os = match result.os {
        "" | "UNKNOWN" => None,
        os => Some(os.to_string()),
    };

    UaInfo {
        device_type,
        browser,
        os,
    }
}
