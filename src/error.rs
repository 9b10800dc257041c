use thiserror::Error;

/// 单次评估的校验错误，均可由用户修正
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditError {
    #[error("procedure code '{0}' is not recognized")]
    UnknownProcedureCode(String),

    #[error("zip code '{0}' is not a 5-digit number")]
    InvalidZip(String),

    #[error("quoted price '{0}' must be a non-negative number")]
    InvalidPrice(String),

    #[error("estimate has no line items")]
    EmptyBatch,

    #[error("estimate has {count} line items, at most {max} are allowed")]
    BatchTooLarge { count: usize, max: usize },
}

impl AuditError {
    /// 稳定的机器可读错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownProcedureCode(_) => "UNKNOWN_PROCEDURE_CODE",
            Self::InvalidZip(_) => "INVALID_ZIP",
            Self::InvalidPrice(_) => "INVALID_PRICE",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
        }
    }
}

/// 费率表加载错误 (启动阶段致命)
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: invalid procedure code '{code}'")]
    InvalidCode { line: u64, code: String },

    #[error("line {line}: duplicate procedure code {code}")]
    DuplicateCode { line: u64, code: String },

    #[error("line {line}: invalid base amount '{value}' for {code}")]
    InvalidAmount { line: u64, code: String, value: String },

    #[error("line {line}: urban multiplier for {code} must be at least 1.0, got '{value}'")]
    InvalidMultiplier { line: u64, code: String, value: String },

    #[error("line {line}: invalid zip code '{zip}'")]
    InvalidZip { line: u64, zip: String },

    #[error("line {line}: duplicate zip code {zip}")]
    DuplicateZip { line: u64, zip: String },

    #[error("line {line}: unknown area type '{value}'")]
    InvalidAreaType { line: u64, value: String },

    #[error("invalid effective date '{value}': {source}")]
    InvalidEffectiveDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("fee schedule has no entries")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            AuditError::UnknownProcedureCode("D9999".into()).code(),
            "UNKNOWN_PROCEDURE_CODE"
        );
        assert_eq!(AuditError::InvalidZip("ABCDE".into()).code(), "INVALID_ZIP");
        assert_eq!(AuditError::InvalidPrice("-1".into()).code(), "INVALID_PRICE");
        assert_eq!(
            AuditError::BatchTooLarge { count: 51, max: 50 }.to_string(),
            "estimate has 51 line items, at most 50 are allowed"
        );
    }
}
