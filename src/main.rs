mod catalog;
mod config;
mod error;
mod http;
mod jotform;
mod movie;
mod omdb;
mod tg;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use dotenvy::dotenv;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kinoclub_relay=info,tower_http=info".into()),
        )
        .init();

    let cfg = match config::Config::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    // один HTTP-клиент на все внешние API
    let client = reqwest::Client::new();
    let catalog = catalog::Catalog::new(
        jotform::JotformClient::new(
            &cfg.jotform_url,
            &cfg.jotform_form_id,
            &cfg.jotform_api_key,
            client.clone(),
        ),
        omdb::OmdbClient::new(&cfg.omdb_url, &cfg.omdb_api_key, client.clone()),
        Arc::new(catalog::Picker::from_entropy()),
    );
    let notifier = tg::TelegramNotifier::new(&cfg.telegram_url, &cfg.telegram_token, client);
    let app = http::router(http::AppState { catalog, notifier });

    match &cfg.tls {
        Some(tls) => {
            let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
                .await
                .with_context(|| {
                    format!("loading TLS pair {} / {}", tls.cert.display(), tls.key.display())
                })?;
            tracing::info!(addr = %cfg.bind_addr, "relay started (https)");
            axum_server::bind_rustls(cfg.bind_addr, rustls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
                .await
                .with_context(|| format!("binding {}", cfg.bind_addr))?;
            tracing::info!(addr = %cfg.bind_addr, "relay started (plain http)");
            axum::serve(listener, app).await?;
        }
    }
    Ok(())
}
