use crate::error::{AuditError, ScheduleError};
use crate::models::ProcedureCode;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 费率表条目 (加载后不可变)
#[derive(Debug, Clone, PartialEq)]
pub struct FeeScheduleEntry {
    pub code: ProcedureCode,
    pub description: String,
    pub base_amount: BigDecimal,
    pub urban_multiplier: BigDecimal,
}

/// 区域类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaType {
    Urban,
    Rural,
}

impl AreaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urban => "URBAN",
            Self::Rural => "RURAL",
        }
    }

    /// 用于说明文字的小写形式
    pub fn label(&self) -> &'static str {
        match self {
            Self::Urban => "urban",
            Self::Rural => "rural",
        }
    }
}

impl fmt::Display for AreaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AreaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "URBAN" => Ok(Self::Urban),
            "RURAL" => Ok(Self::Rural),
            _ => Err(s.to_string()),
        }
    }
}

/// 邮编表条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipArea {
    pub area_type: AreaType,
    pub locality: Option<String>,
}

/// 解析后的地理位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub zip_code: String,
    pub area_type: AreaType,
    pub locality: Option<String>,
}

/// 校验并规范化 5 位数字邮编
pub fn normalize_zip(raw: &str) -> Result<String, AuditError> {
    let zip = raw.trim();
    if zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()) {
        Ok(zip.to_string())
    } else {
        Err(AuditError::InvalidZip(zip.to_string()))
    }
}

/// 费率表版本，以生效日期标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleVersion {
    pub source: String,
    pub effective: NaiveDate,
}

impl ScheduleVersion {
    /// `effective_date` 格式为 `YYYY-MM-DD`
    pub fn parse(source: &str, effective_date: &str) -> Result<Self, ScheduleError> {
        let effective = NaiveDate::parse_from_str(effective_date.trim(), "%Y-%m-%d").map_err(
            |err| ScheduleError::InvalidEffectiveDate {
                value: effective_date.to_string(),
                source: err,
            },
        )?;
        Ok(Self {
            source: source.to_string(),
            effective,
        })
    }

    /// 例: `NC Medicaid Dental Fee Schedule (Effective February 10, 2022)`
    pub fn reference(&self) -> String {
        format!(
            "{} (Effective {})",
            self.source,
            self.effective.format("%B %-d, %Y")
        )
    }
}
