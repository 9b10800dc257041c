use crate::error::AuditError;
use serde::Serialize;
use std::fmt;

/// CDT 编码前缀
pub const CODE_PREFIX: char = 'D';

/// 前缀后的数字位数
const CODE_DIGITS: usize = 4;

/// 规范化后的 CDT 牙科操作编码，形如 `D0120`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProcedureCode(String);

impl ProcedureCode {
    /// 规范化用户输入：去空白、转大写、缺前缀时补 `D`。
    ///
    /// 表单提示使用 `D00120` 这种五位写法，首位为 0 的五位数字折叠为四位规范形式。
    /// 规范化后仍不是 `D` + 4 位数字的输入不可能出现在费率表中。
    pub fn parse(raw: &str) -> Result<Self, AuditError> {
        let trimmed = raw.trim();
        let upper = trimmed.to_ascii_uppercase();
        let digits = upper.strip_prefix(CODE_PREFIX).unwrap_or(&upper);
        let digits = match digits.len() {
            5 if digits.starts_with('0') => &digits[1..],
            _ => digits,
        };

        if digits.len() != CODE_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuditError::UnknownProcedureCode(trimmed.to_string()));
        }

        Ok(Self(format!("{CODE_PREFIX}{digits}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcedureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
