use std::fmt;
use std::str::FromStr;

use crate::keyboard::layout::KeyboardLayout;

/// Operating system the user is typing on. Drives the default keyboard layout
/// and the modifier name shown in shortcut hints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Mac,
    Windows,
    Linux,
    ChromeOS,
    Android,
    IOS,
}

impl Platform {
    /// Classify a browser-style `(platform, user agent)` pair.
    ///
    /// Apple devices win over everything else; unknown strings fall back to
    /// Windows.
    pub fn from_user_agent(platform: &str, user_agent: &str) -> Self {
        let platform = platform.to_ascii_lowercase();
        let ua = user_agent.to_ascii_lowercase();
        let any = |haystack: &str, needles: &[&str]| needles.iter().any(|n| haystack.contains(n));

        const APPLE: &[&str] = &["mac", "iphone", "ipad", "ipod"];
        const IOS: &[&str] = &["iphone", "ipad", "ipod"];

        if any(&ua, IOS) {
            Platform::IOS
        } else if any(&platform, APPLE) || any(&ua, APPLE) {
            Platform::Mac
        } else if platform.contains("win") || ua.contains("windows") {
            Platform::Windows
        } else if platform.contains("linux") && !ua.contains("android") {
            Platform::Linux
        } else if ua.contains("cros") {
            Platform::ChromeOS
        } else if ua.contains("android") {
            Platform::Android
        } else {
            Platform::Windows
        }
    }

    /// Map a Rust target OS name (`std::env::consts::OS`).
    pub fn from_target_os(os: &str) -> Self {
        match os {
            "macos" => Platform::Mac,
            "ios" => Platform::IOS,
            "windows" => Platform::Windows,
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Linux,
            "android" => Platform::Android,
            _ => Platform::Windows,
        }
    }

    pub fn is_apple(self) -> bool {
        matches!(self, Platform::Mac | Platform::IOS)
    }

    pub fn default_layout(self) -> KeyboardLayout {
        if self.is_apple() {
            KeyboardLayout::Mac
        } else {
            KeyboardLayout::Windows
        }
    }

    /// Name of the Alt key as printed on this platform's keyboards.
    pub fn modifier_name(self) -> &'static str {
        if self.is_apple() { "option" } else { "Alt" }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Mac | Platform::IOS => "Mac",
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::ChromeOS => "Chrome OS",
            Platform::Android => "Android",
        }
    }

    pub fn close_shortcut(self) -> String {
        format!("{}+\\", self.modifier_name())
    }

    pub fn theme_shortcut(self) -> String {
        format!("{}+T", self.modifier_name())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mac" | "macos" => Ok(Platform::Mac),
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "chromeos" => Ok(Platform::ChromeOS),
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::IOS),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// The platform this binary was built for.
pub fn detect_platform() -> Platform {
    Platform::from_target_os(std::env::consts::OS)
}
