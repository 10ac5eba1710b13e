//! 行记录数据模型
//!
//! CSV 每一行转换为一个 RowRecord，按列名保存原始字符串

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 代码列
pub const TICKER: &str = "Ticker";
/// 最新价列
pub const LAST_PRICE: &str = "Last Price";
/// 上年收盘价列
pub const PREV_YEAR_CLOSE: &str = "Prev Year Close";
/// 年初至今涨跌幅列
pub const YTD_PERCENT: &str = "YTD %";

/// 固定四列，顺序即渲染顺序
pub const FIXED_COLUMNS: [&str; 4] = [TICKER, LAST_PRICE, PREV_YEAR_CLOSE, YTD_PERCENT];

/// 单行记录
///
/// 序列化为以列名为键的 JSON 对象（键按字典序输出）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowRecord(BTreeMap<String, String>);

impl RowRecord {
    /// 获取列值，列不存在时返回 None
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn ticker(&self) -> Option<&str> {
        self.get(TICKER)
    }

    /// 是否所有单元格都为空
    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.trim().is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for RowRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// 一次读取得到的完整数据集
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    /// 表头，保持源文件顺序
    pub headers: Vec<String>,
    /// 数据行，保持源文件顺序
    pub rows: Vec<RowRecord>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 按表头顺序取出一行的单元格，缺失列为空字符串
    pub fn cells<'a>(&'a self, row: &'a RowRecord) -> Vec<&'a str> {
        self.headers
            .iter()
            .map(|h| row.get(h).unwrap_or(""))
            .collect()
    }
}
