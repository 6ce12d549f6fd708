use std::sync::Arc;

use anyhow::{Context, Result};
use gong::{
    credentials::CredentialStore,
    log,
    settings::Settings,
    webhook_receiver::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings =
        Settings::load().context("failed to load config and command line arguments")?;

    log::setup_logging(&settings.log).context("could not setup logging")?;

    let credentials = CredentialStore::from_env();
    let state = Arc::new(
        AppState::new(settings, credentials).context("failed to construct webhook state")?,
    );

    webhook_receiver::run(state).await
}
