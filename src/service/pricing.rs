use bigdecimal::{BigDecimal, One, Zero};

/// 四舍五入到 `places` 位小数，.5 远离零进位
pub fn round_half_away_from_zero(value: &BigDecimal, places: u32) -> BigDecimal {
    let shift = BigDecimal::from(10u64.pow(places));
    let half = BigDecimal::one() / BigDecimal::from(2);

    let scaled = value * &shift;
    let adjusted = if scaled < BigDecimal::zero() {
        scaled - half
    } else {
        scaled + half
    };

    // with_scale 向零截断
    let truncated = adjusted.with_scale(0);
    (truncated / shift).with_scale(i64::from(places))
}

/// 分位金额
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    round_half_away_from_zero(value, 2)
}

/// ceiling = base * (urban ? multiplier : 1)，保留精确乘积，只在展示时取整
pub fn fair_ceiling(base_amount: &BigDecimal, urban_multiplier: &BigDecimal, urban: bool) -> BigDecimal {
    if urban {
        base_amount * urban_multiplier
    } else {
        base_amount.clone()
    }
}

/// (quoted - ceiling) / ceiling * 100，保留一位小数；ceiling 必须大于 0
pub fn markup_percentage(quoted_price: &BigDecimal, ceiling: &BigDecimal) -> BigDecimal {
    let raw = (quoted_price - ceiling) * BigDecimal::from(100) / ceiling.clone();
    round_half_away_from_zero(&raw, 1)
}

/// 金额展示: 两位小数
pub fn format_money(value: &BigDecimal) -> String {
    round_money(value).to_string()
}

/// 百分比展示: 一位小数，取绝对值
pub fn format_magnitude(percentage: &BigDecimal) -> String {
    round_half_away_from_zero(&percentage.abs(), 1).to_string()
}
