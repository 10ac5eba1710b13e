//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，并由环境变量覆盖
//! 进程启动时构建一次，通过 `web::Data<AppConfig>` 传给各处理器

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// 本地 CSV 文件
    Local,
    /// 通过 Microsoft Graph 拉取远端 CSV
    Graph,
}

/// CSV 解析模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// 第一行即表头
    Strict,
    /// 跳过标题行，直到遇到 Ticker 表头
    Tolerant,
}

/// 表格渲染模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// 固定四列，数值经过规范化
    Fixed,
    /// 原样输出 CSV 表头和单元格
    Generic,
}

/// 数据配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_source")]
    pub source: DataSource,
    /// 本地 CSV 路径（更新接口也写入这里）
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
    #[serde(default = "default_parse_mode")]
    pub parse_mode: ParseMode,
    /// 字符编码标签，例如 utf-8、gbk
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

/// 更新接口配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// 共享密钥（为空则不启用认证）
    #[serde(default)]
    pub key: String,
}

/// Microsoft Graph 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub drive_id: String,
    /// 文件在驱动器中的路径
    #[serde(default = "default_graph_csv_path")]
    pub csv_path: String,
    /// OAuth 令牌服务地址
    #[serde(default = "default_authority")]
    pub authority: String,
    /// Graph API 根地址
    #[serde(default = "default_graph_base")]
    pub graph_base: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 渲染配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_mode")]
    pub mode: RenderMode,
    /// 页脚时间所用时区（IANA 名称）
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub update: UpdateConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_source() -> DataSource { DataSource::Local }
fn default_csv_path() -> PathBuf { PathBuf::from("top10.csv") }
fn default_parse_mode() -> ParseMode { ParseMode::Strict }
fn default_encoding() -> String { "utf-8".to_string() }
fn default_graph_csv_path() -> String { "Top10/top10.csv".to_string() }
fn default_authority() -> String { "https://login.microsoftonline.com".to_string() }
fn default_graph_base() -> String { "https://graph.microsoft.com/v1.0".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_render_mode() -> RenderMode { RenderMode::Fixed }
fn default_timezone() -> String { "UTC".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            csv_path: default_csv_path(),
            parse_mode: default_parse_mode(),
            encoding: default_encoding(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            site_id: String::new(),
            drive_id: String::new(),
            csv_path: default_graph_csv_path(),
            authority: default_authority(),
            graph_base: default_graph_base(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: default_render_mode(),
            timezone: default_timezone(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值，最后叠加环境变量
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_overrides(|name| env::var(name).ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    /// 用环境变量覆盖配置项
    ///
    /// `lookup` 返回 None 表示变量未设置；UPDATE_KEY 设置为空字符串时会关闭认证
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("UPDATE_KEY") {
            self.update.key = key;
        }

        if let Some(port) = lookup("PORT") {
            match port.trim().parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => log::warn!("忽略无效的 PORT: {}", port),
            }
        }

        if let Some(path) = lookup("CSV_PATH").filter(|v| !v.is_empty()) {
            self.data.csv_path = PathBuf::from(path);
        }

        if let Some(source) = lookup("DATA_SOURCE") {
            match source.trim().to_ascii_lowercase().as_str() {
                "local" => self.data.source = DataSource::Local,
                "graph" => self.data.source = DataSource::Graph,
                other => log::warn!("忽略无效的 DATA_SOURCE: {}", other),
            }
        }

        let graph_fields: [(&str, &mut String); 6] = [
            ("GRAPH_TENANT_ID", &mut self.graph.tenant_id),
            ("GRAPH_CLIENT_ID", &mut self.graph.client_id),
            ("GRAPH_CLIENT_SECRET", &mut self.graph.client_secret),
            ("GRAPH_SITE_ID", &mut self.graph.site_id),
            ("GRAPH_DRIVE_ID", &mut self.graph.drive_id),
            ("GRAPH_CSV_PATH", &mut self.graph.csv_path),
        ];
        for (name, field) in graph_fields {
            if let Some(value) = lookup(name).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否启用更新接口认证
    pub fn update_auth_enabled(&self) -> bool {
        !self.update.key.is_empty()
    }

    /// 解析显示时区，无效时退回 UTC
    pub fn display_timezone(&self) -> chrono_tz::Tz {
        self.render.timezone.parse().unwrap_or_else(|_| {
            log::warn!("无效的时区 {}，使用 UTC", self.render.timezone);
            chrono_tz::UTC
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    /// 测试空 JSON 得到全部默认值
    #[test]
    fn test_defaults_from_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.data.source, DataSource::Local);
        assert_eq!(config.data.parse_mode, ParseMode::Strict);
        assert_eq!(config.data.csv_path, PathBuf::from("top10.csv"));
        assert_eq!(config.render.mode, RenderMode::Fixed);
        assert_eq!(config.graph.csv_path, "Top10/top10.csv");
        assert!(!config.update_auth_enabled());
    }

    /// 测试部分 JSON 配置
    #[test]
    fn test_partial_json() {
        let json = r#"{
            "data": { "source": "graph", "parse_mode": "tolerant" },
            "render": { "mode": "generic", "timezone": "America/New_York" }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.data.source, DataSource::Graph);
        assert_eq!(config.data.parse_mode, ParseMode::Tolerant);
        assert_eq!(config.data.encoding, "utf-8");
        assert_eq!(config.render.mode, RenderMode::Generic);
        assert_eq!(config.display_timezone(), chrono_tz::America::New_York);
    }

    /// 测试环境变量覆盖
    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(lookup_from(&[
            ("UPDATE_KEY", "s3cret"),
            ("PORT", "9001"),
            ("DATA_SOURCE", "Graph"),
            ("GRAPH_TENANT_ID", "tenant"),
            ("GRAPH_CSV_PATH", ""),
        ]));
        assert_eq!(config.update.key, "s3cret");
        assert!(config.update_auth_enabled());
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.data.source, DataSource::Graph);
        assert_eq!(config.graph.tenant_id, "tenant");
        // 空值不覆盖默认路径
        assert_eq!(config.graph.csv_path, "Top10/top10.csv");
    }

    /// 测试 UPDATE_KEY 为空时关闭认证
    #[test]
    fn test_empty_update_key_disables_auth() {
        let mut config = AppConfig::default();
        config.update.key = "from-file".to_string();
        config.apply_overrides(lookup_from(&[("UPDATE_KEY", ""), ("PORT", "abc")]));
        assert!(!config.update_auth_enabled());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_invalid_timezone_falls_back_to_utc() {
        let mut config = AppConfig::default();
        config.render.timezone = "Mars/Olympus".to_string();
        assert_eq!(config.display_timezone(), chrono_tz::UTC);
    }
}
