//! robot credentials resolved per deployment environment
//!
//! Credentials are read from the process environment once at startup and are
//! immutable afterwards. The naming convention follows the robot setup docs:
//!
//! - `ROBOT_TOKEN_<ENV>` and `ROBOT_SECRET_<ENV>` for DingTalk robots
//! - `ROBOT_KEY_<ENV>` for WeChat Work robots
//!
//! where `<ENV>` is the uppercased environment path segment of the webhook
//! URL, e.g. `ROBOT_TOKEN_PRO` for `/dingtalk/hook/pro`.

use std::collections::HashMap;

use crate::provider::Provider;

const TOKEN_PREFIX: &str = "ROBOT_TOKEN_";
const SECRET_PREFIX: &str = "ROBOT_SECRET_";
const KEY_PREFIX: &str = "ROBOT_KEY_";

/// credentials for a single (provider, environment) pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    /// DingTalk access token plus the shared secret used for request signing
    Signed { token: String, secret: String },
    /// static WeChat Work webhook key, no signature
    Keyed { key: String },
}

/// immutable snapshot of all configured robot credentials
#[derive(Clone, Debug, Default)]
pub struct CredentialStore {
    tokens: HashMap<String, String>,
    secrets: HashMap<String, String>,
    keys: HashMap<String, String>,
}

impl CredentialStore {
    /// snapshot the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// build a store from explicit variables, used by tests to stay off the
    /// process environment
    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut store = Self::default();

        for (name, value) in vars {
            if value.is_empty() {
                continue;
            }

            if let Some(env) = name.strip_prefix(TOKEN_PREFIX) {
                store.tokens.insert(env.to_uppercase(), value);
            } else if let Some(env) = name.strip_prefix(SECRET_PREFIX) {
                store.secrets.insert(env.to_uppercase(), value);
            } else if let Some(env) = name.strip_prefix(KEY_PREFIX) {
                store.keys.insert(env.to_uppercase(), value);
            }
        }

        store
    }

    /// look up the credentials for an environment. DingTalk needs both the
    /// token and the signing secret; either half missing counts as not
    /// configured.
    pub fn get(&self, provider: Provider, env: &str) -> Option<Credentials> {
        let env = env.to_uppercase();

        match provider {
            Provider::Dingtalk => {
                let token = self.tokens.get(&env)?;
                let secret = self.secrets.get(&env)?;
                Some(Credentials::Signed {
                    token: token.clone(),
                    secret: secret.clone(),
                })
            }
            Provider::Wechat => self.keys.get(&env).map(|key| Credentials::Keyed {
                key: key.clone(),
            }),
        }
    }

    pub fn is_configured(&self, provider: Provider, env: &str) -> bool {
        self.get(provider, env).is_some()
    }
}
