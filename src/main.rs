//! Top 10 年初至今表现小部件服务
//!
//! 读取 CSV（本地文件或 Microsoft Graph 驱动器），以 JSON 和可嵌入 HTML 表格形式提供数据，
//! 并提供带共享密钥的 CSV 覆盖接口

mod config;     // 配置
mod error;      // 错误类型
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::{AppConfig, DataSource};

/// 应用程序入口
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 初始化日志系统，默认日志级别为 info，可通过 RUST_LOG 调整
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::load();

    if !config.update_auth_enabled() {
        log::warn!("未设置 UPDATE_KEY，更新接口不做认证");
    }
    match config.data.source {
        DataSource::Local => log::info!("数据来源: 本地文件 {}", config.data.csv_path.display()),
        DataSource::Graph => log::info!("数据来源: Graph {}", config.graph.csv_path),
    }

    let bind_addr = config.bind_addr();
    let workers = config.server.workers;
    log::info!("启动 Top 10 小部件服务: {}", bind_addr);

    let data = web::Data::new(config);
    let mut server = HttpServer::new(move || {
        let app_config = data.clone();
        App::new()
            .wrap(Logger::default())  // 请求日志
            .app_data(app_config.clone())
            .configure(|cfg| handlers::config(cfg, &app_config))
    });
    if workers > 0 {
        server = server.workers(workers);
    }

    server.bind(bind_addr)?.run().await
}
