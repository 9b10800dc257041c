use crate::models::{AreaType, AuditStatus};
use crate::service::pricing::{format_magnitude, format_money};
use bigdecimal::BigDecimal;

/// 生成说明文字所需的参数
pub struct AnalysisContext<'a> {
    pub status: AuditStatus,
    pub description: &'a str,
    pub markup_percentage: &'a BigDecimal,
    pub ceiling: &'a BigDecimal,
    pub area_type: AreaType,
}

/// 每个档位一套固定模板，相同输入得到相同文本
pub fn render(ctx: &AnalysisContext<'_>) -> String {
    let magnitude = format_magnitude(ctx.markup_percentage);
    let ceiling = format_money(ctx.ceiling);
    let area = ctx.area_type.label();
    let procedure = ctx.description;

    match ctx.status {
        AuditStatus::BelowCeiling => format!(
            "Your quote for {procedure} is {magnitude}% below the {area} fair ceiling of ${ceiling}. \
             This is an excellent value compared to NC Medicaid reimbursement rates."
        ),
        AuditStatus::Fair => format!(
            "Your quote for {procedure} is {magnitude}% above the {area} fair ceiling of ${ceiling}, \
             within the normal 10% range. This estimate looks fair."
        ),
        AuditStatus::High => format!(
            "Your quote for {procedure} is {magnitude}% above the {area} fair ceiling of ${ceiling}. \
             Ask the office for an itemized estimate and whether a discount is available before you commit."
        ),
        AuditStatus::RedFlag => format!(
            "Your quote for {procedure} is {magnitude}% above the {area} fair ceiling of ${ceiling}, \
             a significant markup. Get a second opinion or compare estimates from other providers before proceeding."
        ),
    }
}
