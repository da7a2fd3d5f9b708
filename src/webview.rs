//! Host surface contract and consent-UI URL construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::BridgeHandle;
use crate::error::SdkResult;

/// Production consent-UI endpoint.
pub(crate) const DEFAULT_CONSENT_UI_URL: &str =
    "https://cdn.consentkit.io/static/consent_app.html";

/// Vertical placement of a non-fullscreen web surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    Top,
    Center,
    Bottom,
}

/// Layout of the windowed web-content surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebViewLayout {
    /// CSS color behind the page; `None` means transparent.
    #[serde(default)]
    pub background_color: Option<String>,
    /// Surface width in points; `None` means full width.
    #[serde(default)]
    pub width: Option<u32>,
    /// Surface height in points; `None` means full height.
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default = "Gravity::center")]
    pub gravity: Gravity,
}

impl Gravity {
    fn center() -> Gravity {
        Gravity::Center
    }
}

impl Default for WebViewLayout {
    fn default() -> Self {
        Self {
            background_color: None,
            width: None,
            height: None,
            gravity: Gravity::Center,
        }
    }
}

/// The windowed web-content surface the host renders the consent UI in.
///
/// The SDK never draws anything itself; it hands the host a URL plus a
/// [`BridgeHandle`] and expects every message posted by the embedded page to
/// be pumped into that handle.
pub trait DialogSurface: Send + Sync {
    /// Presents web content at `url` and begins routing its messages into
    /// `bridge`. Failing to present is a presentation error; the flow is
    /// aborted.
    fn open(&self, url: &str, layout: &WebViewLayout, bridge: BridgeHandle) -> SdkResult<()>;

    /// Host→UI read callback: `onRead(key, value|null)`.
    fn notify_read(&self, key: &str, value: Option<&Value>);

    /// Tears the surface down after a session completes.
    fn close(&self);
}

/// Builds `<base>?sid=<siteId>[&lang=<code>][&mode=denyAll]`.
pub(crate) fn consent_dialog_url(
    base: &str,
    site_id: &str,
    language: Option<&str>,
    deny_all: bool,
) -> String {
    let mut url = format!("{base}?sid={}", urlencoding::encode(site_id));
    if let Some(language) = language.filter(|language| !language.is_empty()) {
        url.push_str("&lang=");
        url.push_str(&urlencoding::encode(language));
    }
    if deny_all {
        url.push_str("&mode=denyAll");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_with_site_id_only() {
        let url = consent_dialog_url("https://example.com/app.html", "241131", None, false);
        assert_eq!(url, "https://example.com/app.html?sid=241131");
    }

    #[test]
    fn url_carries_language_when_set() {
        let url = consent_dialog_url("https://example.com/app.html", "241131", Some("de"), false);
        assert_eq!(url, "https://example.com/app.html?sid=241131&lang=de");
    }

    #[test]
    fn deny_all_url_carries_mode() {
        let url = consent_dialog_url("https://example.com/app.html", "241131", Some("en"), true);
        assert_eq!(
            url,
            "https://example.com/app.html?sid=241131&lang=en&mode=denyAll"
        );
    }

    #[test]
    fn empty_language_is_omitted() {
        let url = consent_dialog_url("https://example.com/app.html", "241131", Some(""), false);
        assert_eq!(url, "https://example.com/app.html?sid=241131");
    }

    #[test]
    fn layout_defaults_to_fullscreen_center() {
        let layout = WebViewLayout::default();
        assert!(layout.width.is_none());
        assert!(layout.height.is_none());
        assert_eq!(layout.gravity, Gravity::Center);
    }
}
