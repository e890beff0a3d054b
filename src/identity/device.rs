//! Hand-rolled user-agent parsing.
//!
//! No user-agent-parsing crate appears anywhere in the dependency graph this
//! repository draws from, so this is a small heuristic classifier rather than
//! a fabricated dependency. It only needs to produce advisory display text —
//! nothing downstream routes on its output.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub os_name: Option<String>,
    pub device_model: Option<String>,
    pub device_type: Option<String>,
    pub browser_name: Option<String>,
}

impl DeviceDescriptor {
    /// `deviceName` per the join-time derivation rule: `os.name` (with "Mac
    /// OS X" normalized to "Mac") followed by the device model, falling back
    /// to the browser name, falling back to "Unknown Device".
    pub fn device_name(&self) -> String {
        let os = self.os_name.as_deref().map(|os| os.replace("Mac OS", "Mac"));
        let tail = self.device_model.as_deref().or(self.browser_name.as_deref());

        match (os, tail) {
            (Some(os), Some(tail)) => format!("{os} {tail}"),
            (Some(os), None) => os,
            (None, Some(tail)) => tail.to_string(),
            (None, None) => "Unknown Device".to_string(),
        }
    }

    /// The device `type` field, defaulting to `desktop` when the user agent
    /// carried no recognizable signal.
    pub fn device_type_or_default(&self) -> String {
        self.device_type.clone().unwrap_or_else(|| "desktop".to_string())
    }
}

pub fn parse_user_agent(ua: &str) -> DeviceDescriptor {
    let os_name = parse_os(ua);
    let device_type = parse_device_type(ua, os_name.is_some());
    let browser_name = parse_browser(ua);
    let device_model = parse_android_model(ua);

    DeviceDescriptor {
        os_name,
        device_model,
        device_type,
        browser_name,
    }
}

fn parse_os(ua: &str) -> Option<String> {
    // iPhone/iPad user agents carry a "like Mac OS X" compatibility suffix of
    // their own, so the iOS tokens must be checked before "Mac OS X" or every
    // iOS device would be misclassified as a Mac.
    const OS_TOKENS: [(&str, &str); 6] = [
        ("Windows", "Windows"),
        ("iPhone OS", "iOS"),
        ("iPad", "iOS"),
        ("Mac OS X", "Mac OS"),
        ("Android", "Android"),
        ("CrOS", "Chrome OS"),
    ];
    for (token, name) in OS_TOKENS {
        if ua.contains(token) {
            return Some(name.to_string());
        }
    }
    if ua.contains("Linux") {
        return Some("Linux".to_string());
    }
    None
}

fn parse_device_type(ua: &str, has_os: bool) -> Option<String> {
    if ua.contains("Mobi") || ua.contains("iPhone") {
        Some("mobile".to_string())
    } else if ua.contains("iPad") || ua.contains("Tablet") {
        Some("tablet".to_string())
    } else if has_os {
        Some("desktop".to_string())
    } else {
        None
    }
}

fn parse_browser(ua: &str) -> Option<String> {
    // Edge and Opera both include "Chrome" in their UA string, so they must
    // be checked first to avoid misclassifying them as Chrome.
    const BROWSER_TOKENS: [(&str, &str); 5] = [
        ("Edg/", "Edge"),
        ("OPR/", "Opera"),
        ("Chrome/", "Chrome"),
        ("CriOS", "Chrome"),
        ("Firefox/", "Firefox"),
    ];
    for (token, name) in BROWSER_TOKENS {
        if ua.contains(token) {
            return Some(name.to_string());
        }
    }
    if ua.contains("Safari/") && !ua.contains("Chrome") {
        return Some("Safari".to_string());
    }
    None
}

fn parse_android_model(ua: &str) -> Option<String> {
    if !ua.contains("Android") {
        return None;
    }
    let comment_start = ua.find('(')?;
    let comment_end = ua.find(')').unwrap_or(ua.len());
    let comment = &ua[comment_start..comment_end];
    let after_semicolons: Vec<&str> = comment.split("; ").collect();
    for segment in after_semicolons {
        if let Some(model) = segment.strip_suffix(" Build").or_else(|| {
            segment.split(" Build/").next().filter(|s| *s != segment)
        }) {
            let model = model.trim();
            if !model.is_empty() && !model.contains("Android") && !model.contains("Linux") {
                return Some(model.to_string());
            }
        }
    }
    None
}
