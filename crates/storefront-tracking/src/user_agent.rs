use woothee::parser::{Parser, WootheeResult};

/// Browser, OS and device class resolved from a user agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDevice {
    pub browser: String,
    pub os: String,
    pub device: String,
}

const UNKNOWN: &str = "Unknown";

impl Default for ClientDevice {
    fn default() -> Self {
        Self {
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
            device: "Other".to_string(),
        }
    }
}

impl ClientDevice {
    /// Never fails; unrecognised agents map to `Unknown`/`Other` so the daily
    /// device counter always has a complete key.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.trim().is_empty() {
            return Self::default();
        }

        match Parser::new().parse(user_agent) {
            Some(result) => Self::from_woothee_result(&result),
            None => Self::default(),
        }
    }

    fn from_woothee_result(result: &WootheeResult) -> Self {
        Self {
            browser: clean_name(result.name),
            os: clean_name(result.os),
            device: device_class(result.category).to_string(),
        }
    }
}

fn clean_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() || name == "UNKNOWN" {
        UNKNOWN.to_string()
    } else {
        name.to_string()
    }
}

fn device_class(category: &str) -> &'static str {
    match category {
        "pc" => "Desktop",
        "smartphone" | "mobilephone" => "Mobile",
        "tablet" => "Tablet",
        "appliance" => "Smart TV",
        "crawler" => "Bot",
        _ => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_desktop() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";
        let device = ClientDevice::from_user_agent(ua);

        assert_eq!(device.browser, "Chrome");
        assert_eq!(device.os, "Windows 10");
        assert_eq!(device.device, "Desktop");
    }

    #[test]
    fn test_safari_iphone() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Mobile/15E148 Safari/604.1";
        let device = ClientDevice::from_user_agent(ua);

        assert_eq!(device.browser, "Safari");
        assert_eq!(device.os, "iPhone");
        assert_eq!(device.device, "Mobile");
    }

    #[test]
    fn test_bot() {
        let device = ClientDevice::from_user_agent("Googlebot/2.1 (+http://www.google.com/bot.html)");
        assert_eq!(device.device, "Bot");
    }

    #[test]
    fn test_empty_and_garbage() {
        assert_eq!(ClientDevice::from_user_agent(""), ClientDevice::default());

        let device = ClientDevice::from_user_agent("definitely-not-a-browser");
        assert_eq!(device.browser, "Unknown");
    }
}
