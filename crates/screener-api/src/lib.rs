#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/td-screener/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! HTTP endpoint for TD screener reports.
//!
//! [`router`] builds the axum application around a shared [`Screener`];
//! [`serve`] binds it and runs until the shutdown token is cancelled.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use screener::{Report, Screener, ScreenerError, Symbol};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Greeting returned by `GET /`.
pub const WELCOME_MESSAGE: &str = "Welcome to TD Checklist API";

#[derive(Debug, Serialize)]
struct Welcome {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct ScoreParams {
    ticker: Option<String>,
}

/// Errors surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request did not name a ticker.
    MissingTicker,
    /// Fundamentals or price history could not be fetched.
    Upstream(ScreenerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::MissingTicker => (
                StatusCode::BAD_REQUEST,
                "Missing required query parameter: ticker".to_string(),
            ),
            Self::Upstream(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

async fn root() -> Json<Welcome> {
    Json(Welcome {
        message: WELCOME_MESSAGE,
    })
}

async fn score(
    State(screener): State<Arc<Screener>>,
    Query(params): Query<ScoreParams>,
) -> Result<Json<Report>, ApiError> {
    let ticker = params
        .ticker
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::MissingTicker)?;

    let symbol = Symbol::new(ticker);
    match screener.score_ticker(&symbol).await {
        Ok(report) => Ok(Json(report)),
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "Failed to score ticker");
            Err(ApiError::Upstream(e))
        }
    }
}

/// Build the application router.
pub fn router(screener: Arc<Screener>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/score", get(score))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(screener)
}

/// Bind `addr` and serve until `shutdown` is cancelled.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    addr: SocketAddr,
    screener: Arc<Screener>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, router(screener))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("API server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use chrono::NaiveDate;
    use polars::prelude::*;
    use screener::{
        DataProvider, FundamentalSnapshot, FundamentalsProvider, PriceHistoryProvider,
        ScreenerConfig,
    };
    use tower::ServiceExt;

    /// Knows one ticker.
    #[derive(Debug)]
    struct OneTicker;

    impl DataProvider for OneTicker {
        fn name(&self) -> &str {
            "one"
        }

        fn description(&self) -> &str {
            "Serves TCS.NS only"
        }
    }

    #[async_trait]
    impl FundamentalsProvider for OneTicker {
        async fn fetch_snapshot(&self, symbol: &Symbol) -> screener::Result<FundamentalSnapshot> {
            if symbol.as_str() != "TCS.NS" {
                return Err(ScreenerError::SymbolNotFound(symbol.to_string()));
            }
            Ok(FundamentalSnapshot {
                short_name: Some("Tata Consultancy Services".to_string()),
                long_business_summary: Some("IT services.".to_string()),
                ..FundamentalSnapshot::new(symbol)
            })
        }
    }

    #[async_trait]
    impl PriceHistoryProvider for OneTicker {
        async fn fetch_ohlcv(
            &self,
            symbol: &Symbol,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> screener::Result<DataFrame> {
            if symbol.as_str() != "TCS.NS" {
                return Err(ScreenerError::SymbolNotFound(symbol.to_string()));
            }
            DataFrame::new(vec![Column::new("close".into(), vec![100.0; 3])])
                .map_err(|e| ScreenerError::Other(e.to_string()))
        }
    }

    fn app() -> Router {
        let provider = Arc::new(OneTicker);
        let mut screener = Screener::new(ScreenerConfig::immediate());
        screener.register_fundamentals(provider.clone());
        screener.register_prices(provider);
        router(Arc::new(screener))
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_root_returns_welcome() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], WELCOME_MESSAGE);
    }

    #[tokio::test]
    async fn test_score_returns_report() {
        let (status, body) = get_json("/score?ticker=tcs.ns").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "TCS.NS");
        assert_eq!(body["name"], "Tata Consultancy Services");
        assert_eq!(body["total_score"], 15);
        assert_eq!(body["score_percentage"], 18.75);
        assert_eq!(body["breakdown"]["Business Quality & Moat"], 10);
        assert_eq!(body["forensic_red_flag"], false);
    }

    #[tokio::test]
    async fn test_score_requires_ticker() {
        let (status, body) = get_json("/score").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("ticker"));

        let (status, _) = get_json("/score?ticker=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (status, body) = get_json("/score?ticker=NOPE.NS").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("NOPE.NS"));
    }
}
