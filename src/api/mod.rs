pub mod error;
pub mod handlers;
pub mod middleware;
pub mod payload;

pub use error::ApiError;
pub use handlers::*;

use crate::config::AuditConfig;
use crate::service::AuditEvaluator;
use crate::store::FeeScheduleStore;
use axum::routing::{get, post};
use axum::Router;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tower::ServiceBuilder;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<AuditEvaluator>,
    request_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(store: Arc<FeeScheduleStore>, config: &AuditConfig) -> Self {
        Self {
            evaluator: Arc::new(AuditEvaluator::new(store, config)),
            request_seq: Arc::new(AtomicU64::new(1)),
        }
    }

    pub(crate) fn next_request_id(&self) -> String {
        let id = self.request_seq.fetch_add(1, Ordering::Relaxed);
        format!("req-{id:016x}")
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/v1/audit", post(handlers::audit))
        .route("/api/v1/audit/batch", post(handlers::audit_batch))
        .route("/api/v1/schedule", get(handlers::list_schedule))
        .route("/api/v1/schedule/:code", get(handlers::get_schedule_entry))
        // 现有表单客户端使用的路径
        .route("/webhook/audit-estimate", post(handlers::audit))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::request_tracing,
        )))
        .with_state(state)
}
