use crate::error::AuditError;
use crate::models::{
    AuditRequest, AuditStatus, AuditVerdict, BatchAudit, BatchSummary, FeeScheduleEntry,
    StatusCounts,
};
use crate::service::pricing;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::str::FromStr;

/// 金额在线上以 JSON number 传输
fn as_number<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    let number = value
        .to_string()
        .parse::<f64>()
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_f64(number)
}

/// 金额按分取整后输出
fn as_money<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    as_number(&pricing::round_money(value), serializer)
}

fn as_optional_number<S: Serializer>(
    value: &Option<BigDecimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(value) => as_number(value, serializer),
        None => serializer.serialize_none(),
    }
}

/// 报价可为 JSON number 或数字字符串
pub fn parse_price(value: &Value) -> Result<BigDecimal, AuditError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => return Err(AuditError::InvalidPrice(other.to_string())),
    };
    BigDecimal::from_str(&text).map_err(|_| AuditError::InvalidPrice(text.clone()))
}

/// 邮编可为字符串或 JSON number，格式在评估时校验
pub fn parse_zip(value: &Value) -> Result<String, AuditError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(AuditError::InvalidZip(other.to_string())),
    }
}

/// 请求体: { "code", "price", "zip" }
#[derive(Debug, Clone, Deserialize)]
pub struct AuditPayload {
    pub code: String,
    pub price: Value,
    pub zip: Value,
}

impl AuditPayload {
    pub fn into_request(self) -> Result<AuditRequest, AuditError> {
        let price = parse_price(&self.price)?;
        let zip = parse_zip(&self.zip)?;
        AuditRequest::new(&self.code, price, &zip)
    }
}

/// 批量请求体: { "items": [...] }
#[derive(Debug, Deserialize)]
pub struct BatchPayload {
    pub items: Vec<AuditPayload>,
}

#[derive(Debug, Serialize)]
pub struct PricingBody {
    #[serde(serialize_with = "as_number")]
    pub quoted_price: BigDecimal,
    #[serde(serialize_with = "as_money")]
    pub fair_ceiling: BigDecimal,
    #[serde(serialize_with = "as_number")]
    pub markup_percentage: BigDecimal,
}

#[derive(Debug, Serialize)]
pub struct LocationBody {
    pub zip_code: String,
    pub area_type: String,
    pub urban_adjustment_applied: bool,
}

/// v1 响应体
#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub status: AuditStatus,
    pub procedure: String,
    pub pricing: PricingBody,
    pub location: LocationBody,
    pub analysis: String,
    pub reference: String,
}

impl From<&AuditVerdict> for AuditResponse {
    fn from(verdict: &AuditVerdict) -> Self {
        Self {
            status: verdict.status,
            procedure: verdict.procedure_label(),
            pricing: PricingBody {
                quoted_price: verdict.quoted_price.clone(),
                fair_ceiling: verdict.ceiling.clone(),
                markup_percentage: verdict.markup_percentage.clone(),
            },
            location: LocationBody {
                zip_code: verdict.zip_code.clone(),
                area_type: verdict.area_type.as_str().to_string(),
                urban_adjustment_applied: verdict.urban_adjustment_applied,
            },
            analysis: verdict.analysis_text.clone(),
            reference: verdict.reference.clone(),
        }
    }
}

/// 错误体: { "error": { "code", "message" } }
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct BatchLineBody {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<AuditResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Serialize)]
pub struct BatchSummaryBody {
    pub total: usize,
    pub evaluated: usize,
    pub rejected: usize,
    #[serde(serialize_with = "as_money")]
    pub quoted_total: BigDecimal,
    #[serde(serialize_with = "as_money")]
    pub ceiling_total: BigDecimal,
    #[serde(serialize_with = "as_optional_number")]
    pub overall_markup_percentage: Option<BigDecimal>,
    pub overall_status: Option<AuditStatus>,
    pub counts: StatusCounts,
}

impl From<&BatchSummary> for BatchSummaryBody {
    fn from(summary: &BatchSummary) -> Self {
        Self {
            total: summary.total,
            evaluated: summary.evaluated,
            rejected: summary.rejected,
            quoted_total: summary.quoted_total.clone(),
            ceiling_total: summary.ceiling_total.clone(),
            overall_markup_percentage: summary.overall_markup_percentage.clone(),
            overall_status: summary.overall_status,
            counts: summary.counts.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchLineBody>,
    pub summary: BatchSummaryBody,
    pub reference: String,
}

impl From<&BatchAudit> for BatchResponse {
    fn from(audit: &BatchAudit) -> Self {
        let results = audit
            .lines
            .iter()
            .map(|line| match &line.outcome {
                Ok(verdict) => BatchLineBody {
                    index: line.index,
                    verdict: Some(AuditResponse::from(verdict)),
                    error: None,
                },
                Err(err) => BatchLineBody {
                    index: line.index,
                    verdict: None,
                    error: Some(ErrorDetail {
                        code: err.code(),
                        message: err.to_string(),
                    }),
                },
            })
            .collect();

        Self {
            results,
            summary: BatchSummaryBody::from(&audit.summary),
            reference: audit.reference.clone(),
        }
    }
}

/// 费率表条目，附带城市区域上限
#[derive(Debug, Serialize)]
pub struct ScheduleEntryBody {
    pub code: String,
    pub description: String,
    #[serde(serialize_with = "as_number")]
    pub base_amount: BigDecimal,
    #[serde(serialize_with = "as_number")]
    pub urban_multiplier: BigDecimal,
    #[serde(serialize_with = "as_money")]
    pub urban_ceiling: BigDecimal,
}

impl From<&FeeScheduleEntry> for ScheduleEntryBody {
    fn from(entry: &FeeScheduleEntry) -> Self {
        Self {
            code: entry.code.to_string(),
            description: entry.description.clone(),
            base_amount: entry.base_amount.clone(),
            urban_multiplier: entry.urban_multiplier.clone(),
            urban_ceiling: pricing::fair_ceiling(&entry.base_amount, &entry.urban_multiplier, true),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub reference: String,
    pub effective_date: NaiveDate,
    pub entries: Vec<ScheduleEntryBody>,
}
