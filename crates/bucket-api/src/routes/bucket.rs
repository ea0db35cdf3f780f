//! Bucket protocol endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use bucket::{
    BucketConstants, BucketInfo, PaginatedBottleSummary, TankInfo, TokenApys, TokenPrices,
    UserBottleInfo, UserTankList,
};
use bucket_core::ProtocolError;

use crate::dto::{ApiError, BottlesQuery};
use crate::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Create Bucket routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/constants", get(get_constants))
        .route("/buckets", get(get_buckets))
        .route("/tanks", get(get_tanks))
        .route("/bottles", get(get_bottles))
        .route("/bottles/destroyed", get(get_destroyed_bottles))
        .route("/prices", get(get_prices))
        .route("/apys", get(get_apys))
        .route("/users/:address/bottles", get(get_user_bottles))
        .route("/users/:address/tanks", get(get_user_tanks))
}

fn protocol_error(e: ProtocolError) -> (StatusCode, Json<ApiError>) {
    tracing::warn!(code = e.error_code(), error = %e, "Bucket request failed");
    (
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ApiError::from(&e)),
    )
}

/// GET /bucket/constants
pub async fn get_constants(State(state): State<AppState>) -> ApiResult<BucketConstants> {
    let constants = state
        .client()
        .get_bucket_constants()
        .await
        .map_err(protocol_error)?;
    Ok(Json(constants))
}

/// GET /bucket/buckets
pub async fn get_buckets(State(state): State<AppState>) -> ApiResult<Vec<BucketInfo>> {
    let buckets = state.client().get_all_buckets().await.map_err(protocol_error)?;
    Ok(Json(buckets))
}

/// GET /bucket/tanks
pub async fn get_tanks(State(state): State<AppState>) -> ApiResult<Vec<TankInfo>> {
    let tanks = state.client().get_all_tanks().await.map_err(protocol_error)?;
    Ok(Json(tanks))
}

/// GET /bucket/bottles?txDigest=..&eventSeq=..
pub async fn get_bottles(
    State(state): State<AppState>,
    Query(query): Query<BottlesQuery>,
) -> ApiResult<PaginatedBottleSummary> {
    let page = state
        .client()
        .get_all_bottles(query.cursor())
        .await
        .map_err(protocol_error)?;
    Ok(Json(page))
}

/// GET /bucket/bottles/destroyed?txDigest=..&eventSeq=..
pub async fn get_destroyed_bottles(
    State(state): State<AppState>,
    Query(query): Query<BottlesQuery>,
) -> ApiResult<PaginatedBottleSummary> {
    let page = state
        .client()
        .get_destroyed_bottles(query.cursor())
        .await
        .map_err(protocol_error)?;
    Ok(Json(page))
}

/// GET /bucket/prices
pub async fn get_prices(State(state): State<AppState>) -> ApiResult<TokenPrices> {
    let prices = state.client().get_prices().await.map_err(protocol_error)?;
    Ok(Json(prices))
}

/// GET /bucket/apys
pub async fn get_apys(State(state): State<AppState>) -> Json<TokenApys> {
    Json(state.client().get_apys().await)
}

/// GET /bucket/users/:address/bottles
pub async fn get_user_bottles(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Vec<UserBottleInfo>> {
    let bottles = state
        .client()
        .get_user_bottles(&address)
        .await
        .map_err(protocol_error)?;
    Ok(Json(bottles))
}

/// GET /bucket/users/:address/tanks
pub async fn get_user_tanks(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<UserTankList> {
    let tanks = state
        .client()
        .get_user_tanks(&address)
        .await
        .map_err(protocol_error)?;
    Ok(Json(tanks))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use bucket::BucketClient;
    use bucket_core::{AppConfig, Network, ObjectId};
    use serde_json::{json, Value};
    use sui_rpc_client::fake::FakeChain;
    use tower::ServiceExt;

    use crate::routes::create_router;
    use crate::AppState;

    fn app(chain: Arc<FakeChain>) -> axum::Router {
        let client = BucketClient::new(chain, Network::Mainnet).unwrap();
        create_router(AppState::new(AppConfig::default(), client))
    }

    async fn get(app: axum::Router, uri: &str) -> (u16, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let chain = Arc::new(FakeChain::new());
        let (status, body) = get(app(chain.clone()), "/health").await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["protocolReachable"], false);
        assert_eq!(body["error"]["code"], "state_unavailable");

        let ids = BucketClient::new(chain.clone(), Network::Mainnet).unwrap().ids().clone();
        chain.insert_object(&ids.protocol_id, "0x1::buck::BucketProtocol", json!({}));
        let (_, body) = get(app(chain), "/health").await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["network"], "mainnet");
    }

    #[tokio::test]
    async fn test_prices_without_feeds() {
        let (status, body) = get(app(Arc::new(FakeChain::new())), "/bucket/prices").await;
        assert_eq!(status, 503);
        assert_eq!(body["code"], "state_unavailable");
    }

    #[tokio::test]
    async fn test_tanks_route() {
        let chain = Arc::new(FakeChain::new());
        let client = BucketClient::new(chain.clone(), Network::Mainnet).unwrap();
        let ids = client.ids().clone();
        chain.insert_dynamic_field(
            &ids.protocol_id,
            &ObjectId::new("0xc1"),
            &format!("{}::tank::Tank<{}, 0x2::sui::SUI>", ids.package_id, ids.buck_type()),
            json!({ "reserve": "10" }),
        );

        let (status, body) = get(app(chain), "/bucket/tanks").await;
        assert_eq!(status, 200);
        assert_eq!(body[0]["token"], "SUI");
        assert_eq!(body[0]["buckReserve"], "10");
        assert_eq!(body[0]["currentP"], "1");
    }

    #[tokio::test]
    async fn test_bottles_route_with_cursor() {
        let chain = Arc::new(FakeChain::new());
        let client = BucketClient::new(chain.clone(), Network::Mainnet).unwrap();
        let event = format!("{}::bucket_events::BottleCreated", client.ids().package_id);
        chain.insert_event(&event, json!({ "bottle_id": "0xa" }));
        chain.insert_event(&event, json!({ "bottle_id": "0xb" }));

        let (status, body) = get(app(chain.clone()), "/bucket/bottles").await;
        assert_eq!(status, 200);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
        assert_eq!(body["hasNextPage"], false);

        let (_, body) = get(app(chain), "/bucket/bottles?txDigest=tx0&eventSeq=1").await;
        assert_eq!(body["data"][0]["bottleId"], "0xb");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, body) = get(app(Arc::new(FakeChain::new())), "/nope").await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["message"], "No route for /nope");
    }

    #[tokio::test]
    async fn test_missing_protocol_object() {
        let (status, body) = get(app(Arc::new(FakeChain::new())), "/bucket/buckets").await;
        assert_eq!(status, 503);
        assert_eq!(body["code"], "state_unavailable");
    }

    #[tokio::test]
    async fn test_user_routes() {
        let chain = Arc::new(FakeChain::new());
        chain.fail("suix_getDynamicFields");

        let (status, body) = get(app(chain.clone()), "/bucket/users/0xzz/bottles").await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "invalid_address");

        let (status, body) = get(app(chain), "/bucket/users/0x77/tanks").await;
        assert_eq!(status, 502);
        assert_eq!(body["code"], "upstream_failed");
    }
}
