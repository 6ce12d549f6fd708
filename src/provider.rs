//! The two supported chat platforms, as a strategy value.
//!
//! Each webhook route is parameterized by a provider path segment; everything
//! provider-specific (push url and auth parameters, payload shape, rich
//! content support) hangs off this enum instead of duplicated handler code.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::{
    alert::AlertStatus,
    alert_renderer::RenderedMessage,
    credentials::Credentials,
    settings::Settings,
    sign,
};

/// banner images shown above DingTalk alert lists
const FIRING_BANNER: &str = "https://teamo-md.oss-cn-shanghai.aliyuncs.com/alert/warn-r.png";
const RESOLVED_BANNER: &str = "https://teamo-md.oss-cn-shanghai.aliyuncs.com/alert/resolved-r.png";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Dingtalk,
    Wechat,
}

impl Provider {
    /// lowercase name as used in webhook paths and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Dingtalk => "dingtalk",
            Provider::Wechat => "wechat",
        }
    }

    /// name as shown in status responses
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Dingtalk => "DingTalk",
            Provider::Wechat => "WeChat",
        }
    }

    /// Build the push url for this provider. DingTalk urls carry the access
    /// token plus a timestamped HMAC signature, WeChat urls the static key.
    /// The query serializer percent-encodes the signature.
    pub fn push_url(
        &self,
        settings: &Settings,
        credentials: &Credentials,
        timestamp_ms: i64,
    ) -> Url {
        let mut url = match self {
            Provider::Dingtalk => settings.dingtalk_api.clone(),
            Provider::Wechat => settings.wechat_api.clone(),
        };

        match credentials {
            Credentials::Signed { token, secret } => {
                let signature = sign::make_sign(timestamp_ms, secret);
                url.query_pairs_mut()
                    .append_pair("access_token", token)
                    .append_pair("timestamp", &timestamp_ms.to_string())
                    .append_pair("sign", &signature);
            }
            Credentials::Keyed { key } => {
                url.query_pairs_mut().append_pair("key", key);
            }
        }

        url
    }

    /// current millisecond timestamp used for signed push urls
    pub fn now_ms() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// provider-specific message payload
    pub fn payload(&self, message: &RenderedMessage) -> serde_json::Value {
        match self {
            Provider::Dingtalk => json!({
                "msgtype": "markdown",
                "markdown": {
                    "title": message.title,
                    "text": message.text,
                },
            }),
            Provider::Wechat => json!({
                "msgtype": "markdown",
                "markdown": {
                    "content": message.text,
                },
            }),
        }
    }

    /// banner image for providers whose markdown supports inline images
    pub fn banner_url(&self, status: AlertStatus) -> Option<&'static str> {
        match self {
            Provider::Dingtalk => Some(match status {
                AlertStatus::Firing => FIRING_BANNER,
                AlertStatus::Resolved => RESOLVED_BANNER,
            }),
            Provider::Wechat => None,
        }
    }
}
