//! CSV 表格加载
//!
//! 将 CSV 文本解析为有序的 [`Dataset`]，支持两种模式：
//! - strict：第一行是表头，其后每个非空行按位置映射到表头
//! - tolerant：跳过导出文件开头的标题行、说明行、空行，直到首列为 `Ticker` 的表头行
//!
//! 单元格保持原始文本（不去除首尾空白），只有表头和判断用的首列会 trim。
//! 单行格式错误直接跳过，不报告错误

use anyhow::Result;
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::{Encoding, UTF_8};
use std::io::ErrorKind;
use std::path::Path;

use crate::config::{ParseMode, RenderMode};
use crate::models::{Dataset, RowRecord, FIXED_COLUMNS, TICKER};

/// tolerant 模式下数据行至少需要的列数
const MIN_TOLERANT_CELLS: usize = 4;

/// strict 模式下数据行的保留规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    /// 需要非空的 `Ticker`；表头没有 `Ticker` 列时退化为 AnyCell
    RequireTicker,
    /// 至少一个单元格非空
    AnyCell,
}

impl RowFilter {
    /// 通用表格保留任何非空行，固定四列表格要求有代码
    pub fn for_render_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Fixed => RowFilter::RequireTicker,
            RenderMode::Generic => RowFilter::AnyCell,
        }
    }
}

/// 按模式解析 CSV 文本
///
/// tolerant 模式始终要求首列非空，`filter` 只作用于 strict 模式
pub fn parse(text: &str, mode: ParseMode, filter: RowFilter) -> Dataset {
    match mode {
        ParseMode::Strict => parse_strict(text, filter),
        ParseMode::Tolerant => parse_tolerant(text),
    }
}

/// 逐条读取 CSV 记录，解析失败的记录被跳过
fn records(text: &str) -> impl Iterator<Item = StringRecord> + '_ {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(text.as_bytes())
        .into_records()
        .enumerate()
        .filter_map(|(idx, result)| match result {
            Ok(record) => Some(record),
            Err(e) => {
                log::debug!("跳过第 {} 条无法解析的记录: {}", idx + 1, e);
                None
            }
        })
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// strict 模式：第一行即表头
///
/// 缺少的尾部单元格记为空字符串，多出的单元格忽略，表头去除首尾空白。
/// 行的保留规则由 `filter` 决定
pub fn parse_strict(text: &str, filter: RowFilter) -> Dataset {
    let mut iter = records(text);

    let headers: Vec<String> = match iter.next() {
        Some(record) => record.iter().map(|h| h.trim().to_string()).collect(),
        None => return Dataset::default(),
    };
    let require_ticker =
        filter == RowFilter::RequireTicker && headers.iter().any(|h| h == TICKER);

    let mut rows = Vec::new();
    for record in iter {
        let row: RowRecord = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), record.get(i).unwrap_or("")))
            .collect();

        let keep = if require_ticker {
            row.ticker().is_some_and(|t| !t.trim().is_empty())
        } else {
            !row.is_blank()
        };

        if keep {
            rows.push(row);
        } else {
            log::debug!("跳过数据行: {:?}", record);
        }
    }

    Dataset { headers, rows }
}

/// tolerant 模式：扫描到首列为 `ticker`（忽略大小写）的表头后开始取数据
///
/// 数据行需至少 4 列且首列非空，按位置 0..3 映射为固定四列。
/// 找不到表头时返回空数据集
pub fn parse_tolerant(text: &str) -> Dataset {
    let mut iter = records(text);

    let header_found = iter.by_ref().any(|record| {
        record
            .get(0)
            .is_some_and(|first| first.trim().eq_ignore_ascii_case("ticker"))
    });
    if !header_found {
        log::warn!("CSV 中未找到 Ticker 表头行");
        return Dataset::default();
    }

    let mut rows = Vec::new();
    for record in iter {
        if is_blank(&record) {
            continue;
        }
        if record.len() < MIN_TOLERANT_CELLS || record.get(0).unwrap_or("").trim().is_empty() {
            log::debug!("跳过不完整的数据行: {:?}", record);
            continue;
        }

        let row: RowRecord = FIXED_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| (*column, record.get(i).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Dataset {
        headers: FIXED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// 按编码标签解码字节，自动识别并去掉 BOM；未知标签按 UTF-8 处理
pub fn decode_bytes(bytes: &[u8], label: &str) -> String {
    let encoding = Encoding::for_label(label.as_bytes()).unwrap_or_else(|| {
        log::warn!("未知编码 {}，按 UTF-8 解码", label);
        UTF_8
    });
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("CSV 中存在无法按 {} 解码的字节，已替换", encoding.name());
    }
    text.into_owned()
}

/// 读取本地 CSV 文件
///
/// 文件不存在时返回空数据集，其他 I/O 错误向上传递
pub async fn load_local(
    path: &Path,
    mode: ParseMode,
    filter: RowFilter,
    encoding: &str,
) -> Result<Dataset> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("数据文件 {} 不存在，返回空数据", path.display());
            return Ok(Dataset::default());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(parse(&decode_bytes(&bytes, encoding), mode, filter))
}
