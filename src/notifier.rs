//! Builds provider payloads and pushes them to the chat webhook endpoints.
//!
//! Delivery is fire-and-forget: configuration gaps, transport failures and
//! provider rejections are logged and counted but never surfaced to the
//! alertmanager caller, which must not be blocked by a broken chat channel.

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    alert::AlertBatch,
    alert_renderer::{self, RenderedMessage},
    credentials::{CredentialStore, Credentials},
    metrics,
    provider::Provider,
    settings::Settings,
};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider rejected message: errcode {errcode} ({errmsg})")]
    Provider { errcode: i64, errmsg: String },
}

/// response body of both robot APIs
#[derive(Debug, Deserialize)]
struct PushResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

pub struct Notifier {
    client: reqwest::Client,
    settings: Settings,
    credentials: CredentialStore,
}

impl Notifier {
    pub fn new(settings: Settings, credentials: CredentialStore) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("failed to construct http client")?;

        Ok(Self {
            client,
            settings,
            credentials,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_configured(&self, provider: Provider, env: &str) -> bool {
        self.credentials.is_configured(provider, env)
    }

    /// Dispatch one batch: one message per alert-name group, pushed
    /// sequentially. Never fails; see the module docs for the error policy.
    pub async fn dispatch(&self, provider: Provider, env: &str, batch: &AlertBatch) {
        let Some(credentials) = self.credentials.get(provider, env) else {
            tracing::error!(
                provider = provider.as_str(),
                env,
                "no robot credentials configured for environment"
            );
            return;
        };

        // prefer the configured default link, fall back to the batch's own
        let link = self
            .settings
            .external_url
            .as_deref()
            .or(batch.external_url.as_deref());
        let banner = provider.banner_url(batch.status);

        for (name, alerts) in alert_renderer::group_by_name(&batch.alerts) {
            let message =
                alert_renderer::render_group(batch.status, name, &alerts, link, banner);

            match self.push(provider, &credentials, &message).await {
                Ok(()) => {
                    metrics::SENT_MESSAGES
                        .with_label_values(&[provider.as_str(), env])
                        .inc();
                    tracing::debug!(
                        provider = provider.as_str(),
                        env,
                        alertname = name,
                        "pushed alert message"
                    );
                }
                Err(err) => {
                    metrics::DELIVERY_ERRORS
                        .with_label_values(&[provider.as_str(), env])
                        .inc();
                    tracing::error!(
                        provider = provider.as_str(),
                        env,
                        alertname = name,
                        "failed to push alert message: {err}"
                    );
                }
            }
        }
    }

    async fn push(
        &self,
        provider: Provider,
        credentials: &Credentials,
        message: &RenderedMessage,
    ) -> Result<(), NotifyError> {
        let url = provider.push_url(&self.settings, credentials, Provider::now_ms());

        let response: PushResponse = self
            .client
            .post(url)
            .json(&provider.payload(message))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response.errcode != 0 {
            return Err(NotifyError::Provider {
                errcode: response.errcode,
                errmsg: response.errmsg,
            });
        }

        Ok(())
    }
}
