use crate::api::error::ApiError;
use crate::api::payload::{
    AuditPayload, AuditResponse, BatchPayload, BatchResponse, ScheduleEntryBody, ScheduleResponse,
};
use crate::api::AppState;
use crate::models::ProcedureCode;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 单项审核 (v1，旧 webhook 路径同样指向这里)
pub async fn audit(
    State(state): State<AppState>,
    payload: Result<Json<AuditPayload>, JsonRejection>,
) -> Result<Json<AuditResponse>, ApiError> {
    let Json(payload) = payload?;
    let request = payload.into_request()?;
    let verdict = state.evaluator.evaluate(&request)?;
    Ok(Json(AuditResponse::from(&verdict)))
}

/// 整张估价单审核，在阻塞线程池上并行评估
pub async fn audit_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchPayload>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(payload) = payload?;
    let lines: Vec<_> = payload
        .items
        .into_iter()
        .map(AuditPayload::into_request)
        .collect();

    let evaluator = state.evaluator.clone();
    let audit = tokio::task::spawn_blocking(move || evaluator.evaluate_batch(lines))
        .await
        .map_err(|e| ApiError::Internal(format!("batch evaluation aborted: {e}")))??;

    Ok(Json(BatchResponse::from(&audit)))
}

/// 费率表列表 (按数据文件顺序)
pub async fn list_schedule(State(state): State<AppState>) -> Json<ScheduleResponse> {
    let store = state.evaluator.store();
    Json(ScheduleResponse {
        reference: store.reference(),
        effective_date: store.version().effective,
        entries: store.entries().map(ScheduleEntryBody::from).collect(),
    })
}

/// 查询单个编码，编码按审核同样规则规范化
pub async fn get_schedule_entry(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ScheduleEntryBody>, ApiError> {
    let code = ProcedureCode::parse(&code)?;
    let entry = state.evaluator.store().lookup(&code)?;
    Ok(Json(ScheduleEntryBody::from(entry)))
}
