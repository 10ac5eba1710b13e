//! CSV 更新接口
//!
//! POST /update_top10?key=<secret>，请求体为完整的 CSV 文本。
//! 认证由 UpdateKeyMiddleware 处理

use actix_web::{web, HttpResponse, Result};

use crate::config::AppConfig;
use crate::services::store::write_csv;

/// 用请求体覆盖本地 CSV
pub async fn update_top10(config: web::Data<AppConfig>, body: String) -> Result<HttpResponse> {
    if body.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().body("Empty body"));
    }

    match write_csv(&config.data.csv_path, body).await {
        Ok(()) => Ok(HttpResponse::Ok().body("OK")),
        Err(e) => {
            log::error!("写入 CSV 失败: {:#}", e);
            Ok(HttpResponse::InternalServerError().body("Failed to write CSV"))
        }
    }
}
