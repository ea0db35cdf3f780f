//! HTTP server: middleware, binding and shutdown

use std::future::Future;
use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::routes::create_router;
use crate::AppState;

/// Router with request tracing and permissive CORS for browser wallets
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    tracing::info!(
        addr = %listener.local_addr()?,
        network = %state.network(),
        "Serving Bucket API"
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(state: AppState) -> io::Result<()> {
    let addr = state
        .config()
        .bind_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bucket::BucketClient;
    use bucket_core::{AppConfig, Network};
    use serde_json::Value;
    use sui_rpc_client::fake::FakeChain;
    use tokio::sync::oneshot;

    use super::*;

    fn state(config: AppConfig) -> AppState {
        let client = BucketClient::new(Arc::new(FakeChain::new()), Network::Mainnet).unwrap();
        AppState::new(config, client)
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = match TcpListener::bind("127.0.0.1:0").await {
            Ok(listener) => listener,
            Err(_) => return,
        };
        let addr = listener.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state(AppConfig::default()), async {
            stopped.await.ok();
        }));

        let body: Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["network"], "mainnet");

        stop.send(()).unwrap();
        server.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_invalid_bind_host() {
        let config = AppConfig {
            api_host: "not-an-ip".to_string(),
            ..AppConfig::default()
        };
        let err = start_server(state(config)).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
