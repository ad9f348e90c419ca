//! HTTP Handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequestParts, Path, Query, State,
    },
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use papertrade_core::{
    errors::{CoreError, ErrorKind},
    models::{
        analytics::{StatsWindow, SymbolActivity, TradeStats},
        favorite::{FavoriteRequest, FavoriteView},
        portfolio::Account,
        quote::{MarketMover, Quote},
        trade::{Trade, TradeRequest},
        valuation::PortfolioValuation,
    },
    validation,
};

use crate::state::AppState;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Default number of symbols for `/api/trading/top-symbols`.
const DEFAULT_TOP_SYMBOLS: usize = 10;

// ============================================================================
// Envelope
// ============================================================================

/// Body of every API response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            code: None,
            data: Some(data),
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            code: None,
            data: Some(data),
        })
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// ============================================================================
// Errors
// ============================================================================

/// Anything a handler can fail with.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    Unauthorized(String),
    BadRequest(String),
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::Core(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

/// Status code for a core error.
pub fn status_for(error: &CoreError) -> StatusCode {
    match error.kind() {
        ErrorKind::Input => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Business => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Core(e) => {
                let status = status_for(&e);
                if status.is_server_error() {
                    tracing::error!(code = e.code(), error = %e, "Request failed");
                }
                let message = match e.kind() {
                    // Storage details stay in the log.
                    ErrorKind::Persistence => "Internal storage error".to_string(),
                    _ => e.to_string(),
                };
                (status, e.code(), message)
            }
            ApiError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", message),
        };

        let body = ApiResponse::<()> {
            success: false,
            message: Some(message),
            code: Some(code.to_string()),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Identity
// ============================================================================

/// The authenticated caller, taken from the `x-user-id` header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::Unauthorized("Missing user identity".into()))?;
        let id = raw
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| ApiError::Unauthorized("Invalid user identity".into()))?;
        Ok(CurrentUser(id))
    }
}

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub providers: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<Quote>,
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub timeframe: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TopSymbolsQuery {
    pub limit: Option<usize>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        providers: state.trader.quote_service().provider_names(),
    })
}

/// Provision an account for the caller
pub async fn create_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let account = state.trader.create_account(user_id).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(account, "Account created"),
    ))
}

/// Execute a market order
pub async fn execute_trade(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<TradeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Trade>>), ApiError> {
    let Json(request) = payload?;
    let trade = state.trader.execute_trade(user_id, &request).await?;
    let message = format!(
        "{} order for {} shares of {} executed successfully",
        trade.action, trade.quantity, trade.symbol
    );
    Ok((StatusCode::CREATED, ApiResponse::with_message(trade, message)))
}

/// Trade history, newest first
pub async fn trade_history(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Vec<Trade>> {
    let Query(query) = query?;
    let trades = state
        .trader
        .trade_history(user_id, query.limit, query.offset)
        .await?;
    Ok(ApiResponse::ok(trades))
}

/// Current quote for one symbol
pub async fn get_quote(
    State(state): State<AppState>,
    Query(query): Query<SymbolQuery>,
) -> ApiResult<Quote> {
    let symbol = validation::validate_symbol(query.symbol.as_deref()).map_err(CoreError::from)?;
    let quote = state.trader.quote(&symbol).await?;
    Ok(ApiResponse::ok(quote))
}

/// Search quotes by symbol
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchResponse> {
    let q = query.q.unwrap_or_default();
    let results = state.trader.search(&q).await?;
    Ok(ApiResponse::ok(SearchResponse {
        query: q.trim().to_uppercase(),
        count: results.len(),
        results,
    }))
}

/// Trading statistics over a timeframe (1d, 7d, 30d, 1y; default 30d)
pub async fn trade_stats(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<StatsQuery>,
) -> ApiResult<TradeStats> {
    let window = query
        .timeframe
        .as_deref()
        .map(StatsWindow::from_timeframe)
        .unwrap_or_default();
    let stats = state.trader.trade_stats(user_id, window).await?;
    Ok(ApiResponse::ok(stats))
}

/// Most traded symbols
pub async fn top_symbols(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    query: Result<Query<TopSymbolsQuery>, QueryRejection>,
) -> ApiResult<Vec<SymbolActivity>> {
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TOP_SYMBOLS)
        .clamp(1, validation::MAX_HISTORY_LIMIT);
    let symbols = state.trader.most_traded_symbols(user_id, limit).await?;
    Ok(ApiResponse::ok(symbols))
}

/// Portfolio valued at current quotes
pub async fn portfolio(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<PortfolioValuation> {
    let valuation = state.trader.portfolio_summary(user_id).await?;
    Ok(ApiResponse::ok(valuation))
}

/// Popular symbols with their latest move
pub async fn market_summary(State(state): State<AppState>) -> ApiResult<Vec<MarketMover>> {
    Ok(ApiResponse::ok(state.trader.market_summary().await))
}

/// Watchlist with refreshed quotes
pub async fn list_favorites(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> ApiResult<Vec<FavoriteView>> {
    let favorites = state.trader.favorites(user_id).await?;
    Ok(ApiResponse::ok(favorites))
}

/// Add a symbol to the watchlist
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<FavoriteView>>), ApiError> {
    let Json(request) = payload?;
    let favorite = state.trader.add_favorite(user_id, &request).await?;
    let message = format!("{} added to favorites", favorite.symbol);
    Ok((StatusCode::CREATED, ApiResponse::with_message(favorite, message)))
}

/// Remove a symbol from the watchlist
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(symbol): Path<String>,
) -> ApiResult<()> {
    state.trader.remove_favorite(user_id, &symbol).await?;
    Ok(Json(ApiResponse {
        success: true,
        message: Some(format!("{} removed from favorites", symbol.trim().to_uppercase())),
        code: None,
        data: None,
    }))
}
