//! HTML 表格渲染
//!
//! - 固定四列：价格和涨跌幅经过规范化，无数据时输出一行提示
//! - 通用表格：原样输出 CSV 表头和单元格，页脚附带生成时间
//!
//! 模板中的插值全部经过 HTML 转义

use anyhow::Result;
use askama::Template;
use chrono::{DateTime, TimeZone};
use std::fmt::Display;

use crate::config::{AppConfig, RenderMode};
use crate::models::{Dataset, FIXED_COLUMNS, LAST_PRICE, PREV_YEAR_CLOSE, YTD_PERCENT};
use crate::services::normalize::{format_currency, normalize_currency, normalize_percent};

/// 页面标题
pub const WIDGET_TITLE: &str = "Top 10 by YTD Performance";

/// 固定四列的一行展示数据
struct FixedRow {
    ticker: String,
    last_price: String,
    prev_year_close: String,
    ytd: String,
}

#[derive(Template)]
#[template(path = "widget.html")]
struct FixedTableTemplate<'a> {
    title: &'a str,
    columns: &'a [&'a str],
    rows: Vec<FixedRow>,
}

#[derive(Template)]
#[template(path = "generic.html")]
struct GenericTableTemplate<'a> {
    title: &'a str,
    headers: &'a [String],
    rows: Vec<Vec<&'a str>>,
    generated_at: String,
}

/// 渲染固定四列表格
pub fn render_fixed(dataset: &Dataset) -> Result<String> {
    let rows = dataset
        .rows
        .iter()
        .map(|row| FixedRow {
            ticker: row.ticker().unwrap_or("").to_string(),
            last_price: format_currency(normalize_currency(row.get(LAST_PRICE))),
            prev_year_close: format_currency(normalize_currency(row.get(PREV_YEAR_CLOSE))),
            ytd: normalize_percent(row.get(YTD_PERCENT)),
        })
        .collect();

    let template = FixedTableTemplate {
        title: WIDGET_TITLE,
        columns: &FIXED_COLUMNS,
        rows,
    };
    Ok(template.render()?)
}

/// 渲染通用表格，跳过全空行
pub fn render_generic<Tz>(dataset: &Dataset, generated_at: DateTime<Tz>) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rows = dataset
        .rows
        .iter()
        .filter(|row| !row.is_blank())
        .map(|row| dataset.cells(row))
        .collect();

    let template = GenericTableTemplate {
        title: WIDGET_TITLE,
        headers: &dataset.headers,
        rows,
        generated_at: generated_at.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
    };
    Ok(template.render()?)
}

/// 按配置的渲染模式输出 HTML
pub fn render_widget(dataset: &Dataset, config: &AppConfig) -> Result<String> {
    match config.render.mode {
        RenderMode::Fixed => render_fixed(dataset),
        RenderMode::Generic => {
            let now = chrono::Utc::now().with_timezone(&config.display_timezone());
            render_generic(dataset, now)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RowRecord, TICKER};
    use chrono::Utc;
    use scraper::{Html, Selector};

    fn select_texts(html: &str, selector: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let selector = Selector::parse(selector).unwrap();
        document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    }

    fn fixed_dataset(rows: Vec<RowRecord>) -> Dataset {
        Dataset {
            headers: FIXED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    /// 测试空数据时输出提示行
    #[test]
    fn test_fixed_empty_has_single_colspan_row() {
        let html = render_fixed(&Dataset::default()).unwrap();

        let document = Html::parse_document(&html);
        let rows = Selector::parse("tbody tr").unwrap();
        let cells = Selector::parse("tbody td").unwrap();
        assert_eq!(document.select(&rows).count(), 1);

        let cell = document.select(&cells).next().unwrap();
        assert_eq!(cell.value().attr("colspan"), Some("4"));
        assert!(cell.text().collect::<String>().contains("No data available"));
    }

    /// 测试数值规范化后输出
    #[test]
    fn test_fixed_normalizes_values() {
        let row: RowRecord = [
            (TICKER, "NVDA"),
            (LAST_PRICE, "$1,017.78"),
            (PREV_YEAR_CLOSE, "garbage"),
            (YTD_PERCENT, "0.5322"),
        ]
        .into_iter()
        .collect();
        let html = render_fixed(&fixed_dataset(vec![row])).unwrap();

        assert_eq!(
            select_texts(&html, "thead th"),
            vec!["Ticker", "Last Price", "Prev Year Close", "YTD %"]
        );
        assert_eq!(
            select_texts(&html, "tbody td"),
            vec!["NVDA", "$1017.78", "$0.00", "53.22%"]
        );
        assert!(html.contains("<style>"));
    }

    /// 测试单元格内容被转义
    #[test]
    fn test_fixed_escapes_cells() {
        let row: RowRecord = [(TICKER, "<script>alert(1)</script>")].into_iter().collect();
        let html = render_fixed(&fixed_dataset(vec![row])).unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert_eq!(select_texts(&html, "tbody td")[0], "<script>alert(1)</script>");
    }

    /// 测试通用表格原样输出并跳过空行
    #[test]
    fn test_generic_renders_raw_cells() {
        let dataset = Dataset {
            headers: vec!["Symbol".to_string(), "Change".to_string()],
            rows: vec![
                [("Symbol", "MSFT"), ("Change", "0.5322")].into_iter().collect(),
                [("Symbol", ""), ("Change", " ")].into_iter().collect(),
                [("Symbol", "A&B")].into_iter().collect(),
            ],
        };
        let at = Utc.with_ymd_and_hms(2024, 6, 30, 15, 4, 5).unwrap();
        let html = render_generic(&dataset, at).unwrap();

        assert_eq!(select_texts(&html, "thead th"), vec!["Symbol", "Change"]);
        assert_eq!(select_texts(&html, "tbody tr").len(), 2);
        assert_eq!(select_texts(&html, "tbody td"), vec!["MSFT", "0.5322", "A&B", ""]);
        assert!(html.contains("A&amp;B"));
        assert_eq!(
            select_texts(&html, ".updated"),
            vec!["Last updated: 2024-06-30 15:04:05 UTC"]
        );
    }

    #[test]
    fn test_generic_footer_uses_timezone() {
        let at = Utc
            .with_ymd_and_hms(2024, 1, 2, 12, 0, 0)
            .unwrap()
            .with_timezone(&chrono_tz::America::New_York);
        let html = render_generic(&Dataset::default(), at).unwrap();
        assert!(html.contains("Last updated: 2024-01-02 07:00:00 EST"));
    }

    #[test]
    fn test_render_widget_dispatch() {
        let mut config = AppConfig::default();
        let fixed = render_widget(&Dataset::default(), &config).unwrap();
        assert!(fixed.contains("No data available"));

        config.render.mode = RenderMode::Generic;
        let generic = render_widget(&Dataset::default(), &config).unwrap();
        assert!(generic.contains("Last updated:"));
        assert!(!generic.contains("No data available"));
    }
}
