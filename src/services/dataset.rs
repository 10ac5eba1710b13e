//! 数据集来源
//!
//! 根据配置从本地文件或 Graph 远端读取 CSV，每次请求重新读取，不做缓存

use anyhow::Result;

use crate::config::{AppConfig, DataSource};
use crate::models::Dataset;
use crate::services::graph::GraphClient;
use crate::services::loader::{self, RowFilter};

/// 读取当前数据集
///
/// 本地文件缺失返回空数据集；远端拉取失败直接返回错误
pub async fn load_dataset(config: &AppConfig) -> Result<Dataset> {
    let data = &config.data;
    let filter = RowFilter::for_render_mode(config.render.mode);

    let dataset = match data.source {
        DataSource::Local => {
            loader::load_local(&data.csv_path, data.parse_mode, filter, &data.encoding).await?
        }
        DataSource::Graph => {
            let client = GraphClient::new(&config.graph)?;
            let bytes = client.fetch_csv_bytes().await?;
            let text = loader::decode_bytes(&bytes, &data.encoding);
            loader::parse(&text, data.parse_mode, filter)
        }
    };

    if dataset.is_empty() {
        log::debug!("数据集为空");
    } else {
        log::debug!("读取到 {} 行数据", dataset.len());
    }
    Ok(dataset)
}
