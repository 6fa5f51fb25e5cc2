//! Minimal User-Agent inspection for the login activity log. Produces the
//! "Browser/version" and "Device/Platform-version" strings stored on each
//! activity row.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub browser: String,
    pub browser_version: String,
    pub device: String,
    pub platform: String,
    pub platform_version: String,
}

impl Agent {
    pub fn parse(user_agent: &str) -> Self {
        let (browser, browser_version) = detect_browser(user_agent);
        let (platform, platform_version) = detect_platform(user_agent);
        let device = detect_device(user_agent);
        Self {
            browser: browser.to_string(),
            browser_version,
            device: device.to_string(),
            platform: platform.to_string(),
            platform_version,
        }
    }

    /// "Chrome/120" style label.
    pub fn browser_label(&self) -> String {
        format!("{}/{}", self.browser, self.browser_version)
    }

    /// "Desktop/Windows-10" style label.
    pub fn device_label(&self) -> String {
        format!("{}/{}-{}", self.device, self.platform, self.platform_version)
    }
}

fn version_after(ua: &str, marker: &str) -> String {
    ua.find(marker)
        .map(|idx| {
            ua[idx + marker.len()..]
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '_')
                .collect::<String>()
                .replace('_', ".")
        })
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn detect_browser(ua: &str) -> (&'static str, String) {
    // Order matters: Edge and Opera embed "Chrome", Chrome embeds "Safari".
    if ua.contains("Edg/") {
        ("Edge", version_after(ua, "Edg/"))
    } else if ua.contains("OPR/") {
        ("Opera", version_after(ua, "OPR/"))
    } else if ua.contains("Firefox/") {
        ("Firefox", version_after(ua, "Firefox/"))
    } else if ua.contains("Chrome/") {
        ("Chrome", version_after(ua, "Chrome/"))
    } else if ua.contains("Safari/") {
        ("Safari", version_after(ua, "Version/"))
    } else {
        ("Unknown", "unknown".to_string())
    }
}

fn detect_platform(ua: &str) -> (&'static str, String) {
    if ua.contains("Windows NT") {
        ("Windows", version_after(ua, "Windows NT "))
    } else if ua.contains("Android") {
        ("Android", version_after(ua, "Android "))
    } else if ua.contains("iPhone OS") || ua.contains("CPU OS") {
        ("iOS", version_after(ua, "OS "))
    } else if ua.contains("Mac OS X") {
        ("MacOS", version_after(ua, "Mac OS X "))
    } else if ua.contains("Linux") {
        ("Linux", "unknown".to_string())
    } else {
        ("Unknown", "unknown".to_string())
    }
}

fn detect_device(ua: &str) -> &'static str {
    if ua.contains("iPad") || ua.contains("Tablet") {
        "Tablet"
    } else if ua.contains("Mobile") || ua.contains("iPhone") || ua.contains("Android") {
        "Mobile"
    } else {
        "Desktop"
    }
}
