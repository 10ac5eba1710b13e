//! Top 10 数据接口
//!
//! - GET /top10  - 以 JSON 数组返回所有行
//! - GET /widget - 返回可嵌入的 HTML 表格

use actix_web::{http::header::ContentType, web, HttpResponse, Result};

use crate::config::AppConfig;
use crate::models::{ApiResponse, RowRecord};
use crate::services::dataset::load_dataset;
use crate::services::render::render_widget;

/// 以 JSON 返回数据集
///
/// GET /top10
pub async fn top10_json(config: web::Data<AppConfig>) -> Result<HttpResponse> {
    match load_dataset(&config).await {
        Ok(dataset) => Ok(HttpResponse::Ok().json(dataset.rows)),
        Err(e) => {
            log::error!("读取数据失败: {:#}", e);
            let response = ApiResponse::<Vec<RowRecord>>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

/// 返回 HTML 表格
///
/// GET /widget（通用渲染模式下也挂载在 GET /）
pub async fn widget(config: web::Data<AppConfig>) -> Result<HttpResponse> {
    let html = load_dataset(&config)
        .await
        .and_then(|dataset| render_widget(&dataset, &config));

    match html {
        Ok(html) => Ok(HttpResponse::Ok().content_type(ContentType::html()).body(html)),
        Err(e) => {
            log::error!("生成表格失败: {:#}", e);
            let response = ApiResponse::<String>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/top10", web::get().to(top10_json))
        .route("/widget", web::get().to(widget));
}
