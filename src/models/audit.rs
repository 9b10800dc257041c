use crate::error::AuditError;
use crate::models::{AreaType, ProcedureCode};
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use std::fmt;

/// 报价小数位上限 (指数形式的输入同样受限)
pub const MAX_PRICE_SCALE: i64 = 10;

/// 报价上限 (美元)
pub const MAX_QUOTED_PRICE: u32 = 1_000_000;

/// 单次估价审核请求
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRequest {
    pub code: ProcedureCode,
    pub quoted_price: BigDecimal,
    pub zip_code: String,
}

impl AuditRequest {
    /// 规范化编码并校验报价；邮编在评估时才校验
    pub fn new(code: &str, quoted_price: BigDecimal, zip_code: &str) -> Result<Self, AuditError> {
        let code = ProcedureCode::parse(code)?;
        // 先查指数，再做任何比较或运算；超限时不展开完整数值
        let (digits, scale) = quoted_price.as_bigint_and_exponent();
        if !(-MAX_PRICE_SCALE..=MAX_PRICE_SCALE).contains(&scale) {
            return Err(AuditError::InvalidPrice(format!("{digits}e{}", -scale)));
        }
        if quoted_price < BigDecimal::zero() || quoted_price > BigDecimal::from(MAX_QUOTED_PRICE) {
            return Err(AuditError::InvalidPrice(quoted_price.to_string()));
        }
        Ok(Self {
            code,
            quoted_price,
            zip_code: zip_code.to_string(),
        })
    }
}

/// 审核结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    BelowCeiling,
    Fair,
    High,
    RedFlag,
}

impl AuditStatus {
    /// 按加价百分比分档: <0 | [0,10] | (10,30] | >30
    pub fn classify(markup_percentage: &BigDecimal) -> Self {
        let fair_limit = BigDecimal::from(10);
        let high_limit = BigDecimal::from(30);

        if *markup_percentage < BigDecimal::zero() {
            Self::BelowCeiling
        } else if *markup_percentage <= fair_limit {
            Self::Fair
        } else if *markup_percentage <= high_limit {
            Self::High
        } else {
            Self::RedFlag
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelowCeiling => "BELOW_CEILING",
            Self::Fair => "FAIR",
            Self::High => "HIGH",
            Self::RedFlag => "RED_FLAG",
        }
    }
}

impl fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 审核结果 (不持久化)
#[derive(Debug, Clone, PartialEq)]
pub struct AuditVerdict {
    pub status: AuditStatus,
    pub code: ProcedureCode,
    pub description: String,
    pub quoted_price: BigDecimal,
    pub ceiling: BigDecimal,
    pub markup_percentage: BigDecimal,
    pub zip_code: String,
    pub area_type: AreaType,
    pub urban_adjustment_applied: bool,
    pub analysis_text: String,
    pub reference: String,
}

impl AuditVerdict {
    /// 展示用: `D0120 - Periodic oral evaluation`
    pub fn procedure_label(&self) -> String {
        format!("{} - {}", self.code, self.description)
    }
}

/// 估价单中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct BatchLine {
    pub index: usize,
    pub outcome: Result<AuditVerdict, AuditError>,
}

/// 各档位计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub below_ceiling: usize,
    pub fair: usize,
    pub high: usize,
    pub red_flag: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: AuditStatus) {
        match status {
            AuditStatus::BelowCeiling => self.below_ceiling += 1,
            AuditStatus::Fair => self.fair += 1,
            AuditStatus::High => self.high += 1,
            AuditStatus::RedFlag => self.red_flag += 1,
        }
    }
}

/// 整张估价单的汇总，只统计评估成功的行
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub evaluated: usize,
    pub rejected: usize,
    pub quoted_total: BigDecimal,
    pub ceiling_total: BigDecimal,
    pub overall_markup_percentage: Option<BigDecimal>,
    pub overall_status: Option<AuditStatus>,
    pub counts: StatusCounts,
}

/// 批量审核结果
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAudit {
    pub lines: Vec<BatchLine>,
    pub summary: BatchSummary,
    pub reference: String,
}
