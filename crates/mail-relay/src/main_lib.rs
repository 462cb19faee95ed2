use std::sync::Arc;

use anyhow::Context;
use investor_tracker_core::mail::sendgrid::SendGridProvider;
use investor_tracker_core::mail::traits::{MailProvider, Mailbox};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub mailer: Arc<dyn MailProvider>,
}

impl AppState {
    pub fn new(mailer: Arc<dyn MailProvider>) -> Arc<Self> {
        Arc::new(Self { mailer })
    }
}

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Wire the SendGrid provider from configuration.
pub fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let api_key = config
        .sendgrid_api_key
        .clone()
        .context("SENDGRID_API_KEY is not set")?;
    let from_address = config
        .from_address
        .clone()
        .context("MAIL_FROM_ADDRESS is not set")?;

    let from = Mailbox::new(from_address, Some(config.from_name.clone()));
    let provider = SendGridProvider::new(api_key, from);
    tracing::info!(
        from = %provider.from_address().email,
        "Using mail provider {}",
        provider.name()
    );
    Ok(AppState::new(Arc::new(provider)))
}
