//! 路由配置模块
//!
//! `/` 与 `/config` 是保留路径，其余任意路径的 POST 都进入消息接收接口。

use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sink_shared::observability::middleware as obs_middleware;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;

/// 构建 mock 服务路由
pub fn mock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::health).post(handlers::handle_message))
        .route(
            "/config",
            get(handlers::get_config).post(handlers::update_config),
        )
        .route("/{*path}", post(handlers::handle_message))
}

/// 构建完整应用：路由 + 请求 ID + 追踪指标 + panic 兜底
///
/// 请求体不设大小上限，批量写入的连接器可能一次发送数 MB。
pub fn build_app(state: AppState) -> Router {
    mock_routes()
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(middleware::from_fn(obs_middleware::request_id))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// handler panic 时返回 500，只带 panic 消息本身
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected panic".to_string()
    };

    ApiError::Internal(message).into_response()
}
