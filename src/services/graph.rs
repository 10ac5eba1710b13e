//! Microsoft Graph 远端 CSV 拉取
//!
//! 1. 客户端凭据模式换取 access token
//! 2. 带 Bearer token 下载驱动器中的 CSV 文件
//!
//! 任一步骤返回非 2xx 即失败，不重试

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::GraphConfig;
use crate::error::FetchError;

/// Graph API 授权范围
const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Graph 文件客户端
pub struct GraphClient {
    client: Client,
    token_url: String,
    content_url: Url,
    client_id: String,
    client_secret: String,
}

fn required<'a>(value: &'a str, name: &'static str) -> Result<&'a str, FetchError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FetchError::MissingConfig(name))
    } else {
        Ok(value)
    }
}

/// 令牌地址: {authority}/{tenant}/oauth2/v2.0/token
pub fn token_url(config: &GraphConfig) -> Result<String, FetchError> {
    let tenant = required(&config.tenant_id, "GRAPH_TENANT_ID")?;
    Ok(format!(
        "{}/{}/oauth2/v2.0/token",
        config.authority.trim_end_matches('/'),
        tenant
    ))
}

/// 文件内容地址: {graph_base}/sites/{site}/drives/{drive}/root:/{path}:/content
pub fn content_url(config: &GraphConfig) -> Result<Url, FetchError> {
    let site = required(&config.site_id, "GRAPH_SITE_ID")?;
    let drive = required(&config.drive_id, "GRAPH_DRIVE_ID")?;

    let parts: Vec<&str> = config.csv_path.split('/').filter(|p| !p.is_empty()).collect();
    let (last, dirs) = parts
        .split_last()
        .ok_or(FetchError::MissingConfig("GRAPH_CSV_PATH"))?;

    let mut url = Url::parse(config.graph_base.trim_end_matches('/'))
        .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", config.graph_base, e)))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(config.graph_base.clone()))?;
        segments.pop_if_empty();
        segments.extend(["sites", site, "drives", drive, "root:"]);
        segments.extend(dirs.iter().copied());
        segments.push(&format!("{}:", last));
        segments.push("content");
    }
    Ok(url)
}

impl GraphClient {
    /// 校验配置并创建客户端，配置缺失时不会发起任何网络请求
    pub fn new(config: &GraphConfig) -> Result<Self, FetchError> {
        let client_id = required(&config.client_id, "GRAPH_CLIENT_ID")?.to_string();
        let client_secret = required(&config.client_secret, "GRAPH_CLIENT_SECRET")?.to_string();
        let token_url = token_url(config)?;
        let content_url = content_url(config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            token_url,
            content_url,
            client_id,
            client_secret,
        })
    }

    /// 客户端凭据模式获取 access token
    async fn acquire_token(&self) -> Result<String, FetchError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
            ("grant_type", "client_credentials"),
        ];

        let response = self.client.post(&self.token_url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { stage: "token", status, body });
        }

        let token: TokenResponse = response.json().await?;
        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FetchError::Token("access_token 缺失".to_string()))
    }

    /// 下载远端 CSV 原始字节
    pub async fn fetch_csv_bytes(&self) -> Result<Vec<u8>, FetchError> {
        let token = self.acquire_token().await?;

        log::debug!("下载远端 CSV: {}", self.content_url);
        let response = self
            .client
            .get(self.content_url.clone())
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { stage: "content", status, body });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
