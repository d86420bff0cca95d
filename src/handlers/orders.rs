//! Order listing, lookup and statistics endpoints.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use super::error::{ApiError, ApiQuery};
use super::AppState;
use crate::model::Order;
use crate::query::{
    DateStats, FilterParams, NearbyParams, OrderPage, OrderStats, PageParams, RestaurantStats,
    StatsParams,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Routes mounted under `/orders`.
///
/// Literal segments are registered alongside `/:order_key`; axum prefers
/// static matches so `stats/...` and `nearby/...` never reach the key lookup.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/stats/summary", get(summary))
        .route("/stats/by-restaurant", get(by_restaurant))
        .route("/stats/by-date", get(by_date))
        .route("/nearby/orders", get(nearby))
        .route("/user/:user_id", get(orders_by_user))
        .route("/store/:store_name", get(orders_by_store))
        .route("/:order_key", get(order_by_key))
}

async fn list_orders(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<FilterParams>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<OrderPage> {
    Ok(Json(state.queries.list(&filter, &page).await?))
}

async fn order_by_key(
    State(state): State<AppState>,
    Path(order_key): Path<String>,
) -> ApiResult<Order> {
    Ok(Json(state.queries.get_by_key(&order_key).await?))
}

async fn orders_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<OrderPage> {
    Ok(Json(state.queries.by_user(&user_id, &page).await?))
}

async fn orders_by_store(
    State(state): State<AppState>,
    Path(store_name): Path<String>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<OrderPage> {
    Ok(Json(state.queries.by_store(&store_name, &page).await?))
}

async fn summary(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<FilterParams>,
) -> ApiResult<OrderStats> {
    Ok(Json(state.queries.summary(&filter).await?))
}

async fn by_restaurant(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<FilterParams>,
    ApiQuery(params): ApiQuery<StatsParams>,
) -> ApiResult<Vec<RestaurantStats>> {
    Ok(Json(state.queries.by_restaurant(&filter, &params).await?))
}

async fn by_date(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<FilterParams>,
    ApiQuery(params): ApiQuery<StatsParams>,
) -> ApiResult<Vec<DateStats>> {
    Ok(Json(state.queries.by_date(&filter, &params).await?))
}

async fn nearby(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<NearbyParams>,
    ApiQuery(page): ApiQuery<PageParams>,
) -> ApiResult<OrderPage> {
    Ok(Json(state.queries.nearby(&params, &page).await?))
}
