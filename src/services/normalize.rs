//! 数值规范化
//!
//! 把价格、涨跌幅等字符串单元格转换为数值或展示字符串
//! 所有公开函数都是全函数：任何输入都不会报错，无法解析时返回零值

/// 解析失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    /// 单元格缺失
    Missing,
    /// 文本无法解析为数字
    Unparseable,
}

/// 解析结果：成功的数值，或退回默认值的原因
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed {
    Value(f64),
    Default(DefaultReason),
}

impl Parsed {
    /// 折叠为数值，失败时使用给定默认值
    pub fn or(self, default: f64) -> f64 {
        match self {
            Parsed::Value(v) => v,
            Parsed::Default(_) => default,
        }
    }
}

fn parse_number(cleaned: &str) -> Parsed {
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Parsed::Value(v),
        _ => Parsed::Default(DefaultReason::Unparseable),
    }
}

/// 解析价格，如 "355.22"、"$355.22"、"1,017.78"
pub fn parse_currency(raw: Option<&str>) -> Parsed {
    match raw {
        None => Parsed::Default(DefaultReason::Missing),
        Some(s) => parse_number(&s.replace(['$', ','], "")),
    }
}

/// 解析涨跌幅，如 "53.22%"、"53.22"、"0.5322"
///
/// 绝对值不超过 1 的数视为小数比例并乘以 100。
/// 注意 "1" 会被当作 100%，而不是 1%
pub fn parse_percent(raw: Option<&str>) -> Parsed {
    let parsed = match raw {
        None => return Parsed::Default(DefaultReason::Missing),
        Some(s) => parse_number(&s.replace('%', "")),
    };

    match parsed {
        Parsed::Value(v) if v.abs() <= 1.0 => Parsed::Value(v * 100.0),
        other => other,
    }
}

/// 价格转为数值，无法解析返回 0.0
pub fn normalize_currency(raw: Option<&str>) -> f64 {
    parse_currency(raw).or(0.0)
}

/// 涨跌幅转为两位小数的百分比字符串，无法解析返回 "0.00%"
pub fn normalize_percent(raw: Option<&str>) -> String {
    match parse_percent(raw) {
        Parsed::Value(v) => format!("{:.2}%", v),
        Parsed::Default(_) => "0.00%".to_string(),
    }
}

/// 价格展示格式：美元符号加两位小数，不加千分位
pub fn format_currency(value: f64) -> String {
    format!("${:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 测试价格解析
    #[test]
    fn test_normalize_currency() {
        let test_cases = vec![
            (Some("$1,017.78"), 1017.78),
            (Some("355.22"), 355.22),
            (Some(" $355.22 "), 355.22),
            (Some("-12.5"), -12.5),
            (Some(""), 0.0),
            (Some("N/A"), 0.0),
            (Some("NaN"), 0.0),
            (None, 0.0),
        ];

        for (input, expected) in &test_cases {
            let result = normalize_currency(*input);
            assert!(
                (result - expected).abs() < 1e-9,
                "{:?} -> {} (期望: {})",
                input,
                result,
                expected
            );
        }
    }

    /// 测试涨跌幅格式化
    #[test]
    fn test_normalize_percent() {
        let test_cases = vec![
            (Some("53.22%"), "53.22%"),
            (Some("53.22"), "53.22%"),
            (Some("0.5322"), "53.22%"),
            (Some(" 12.3 % "), "12.30%"),
            (Some("-0.05"), "-5.00%"),
            (Some("-53.22%"), "-53.22%"),
            (Some("-1.5"), "-1.50%"),
            (Some("garbage"), "0.00%"),
            (Some("%"), "0.00%"),
            (None, "0.00%"),
        ];

        for (input, expected) in &test_cases {
            assert_eq!(normalize_percent(*input), *expected, "输入: {:?}", input);
        }
    }

    /// 1 被当作小数比例处理（已知歧义）
    #[test]
    fn test_percent_threshold_ambiguity() {
        assert_eq!(normalize_percent(Some("1")), "100.00%");
        assert_eq!(normalize_percent(Some("1.0%")), "100.00%");
        assert_eq!(normalize_percent(Some("1.01")), "1.01%");
    }

    /// 重新格式化不改变结果
    #[test]
    fn test_percent_idempotent_for_large_values() {
        for input in ["53.22", "-53.22%", "-0.05"] {
            let once = normalize_percent(Some(input));
            assert_eq!(normalize_percent(Some(&once)), once, "输入: {}", input);
        }
    }

    /// 默认原因可区分
    #[test]
    fn test_default_reasons() {
        assert_eq!(parse_currency(None), Parsed::Default(DefaultReason::Missing));
        assert_eq!(
            parse_currency(Some("abc")),
            Parsed::Default(DefaultReason::Unparseable)
        );
        assert_eq!(parse_percent(Some("0.25")), Parsed::Value(25.0));
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1017.78), "$1017.78");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(normalize_currency(Some("150"))), "$150.00");
    }
}
