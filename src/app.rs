/*
 * Responsibility
 * - Tracing + panic hook setup
 * - Config loading → AppState → Router assembly
 * - axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::Config;
use crate::middleware;
use crate::services::provider::ServiceProvider;
use crate::services::random::OsRandom;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,saml_session=debug,tower_http=debug
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    // try_init: the embedding binary may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Precondition violations end up here; they must not get lost on stderr.
        tracing::error!(?info, "panic");

        // Default: only the current request dies; the catch-panic layer answers 500.
        // ABORT_ON_PANIC=true takes the whole process down instead.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

/// Serve the SAML session layer in front of the application built by `protected`.
///
/// `protected` receives the state so it can wrap its routes with
/// `middleware::auth::require_account::apply`.
pub async fn run<F>(provider: Arc<dyn ServiceProvider>, protected: F) -> Result<()>
where
    F: FnOnce(AppState) -> Router,
{
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(config.abort_on_panic);

    tracing::info!(
        abort_on_panic = config.abort_on_panic,
        "starting SAML session layer in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config, provider)?;
    let app = build_router(state.clone(), protected(state), &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_state(config: &Config, provider: Arc<dyn ServiceProvider>) -> Result<AppState> {
    // The SP private key signs correlation and session tokens as well.
    let state = AppState::new(config, provider, Arc::new(OsRandom))
        .context("building token codec from SAML_SP_PRIVATE_KEY_PEM")?;

    tracing::info!(
        metadata_path = %state.metadata_path,
        acs_path = %state.acs_path,
        allow_idp_initiated = config.allow_idp_initiated,
        "SAML endpoints configured"
    );

    Ok(state)
}

pub fn build_router(state: AppState, protected: Router, config: &Config) -> Router {
    let router = api::saml::router(state, protected);
    middleware::http::apply(router, config)
}
