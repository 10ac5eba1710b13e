pub mod health;
pub mod top10;
pub mod update;

use actix_web::web;

use crate::config::{AppConfig, RenderMode};
use crate::middleware::UpdateKeyMiddleware;

pub fn config(cfg: &mut web::ServiceConfig, app: &AppConfig) {
    cfg.configure(health::config).configure(top10::config);

    if app.render.mode == RenderMode::Generic {
        cfg.route("/", web::get().to(top10::widget));
    }

    cfg.service(
        web::resource("/update_top10")
            .wrap(UpdateKeyMiddleware::new(app.update.key.clone()))
            .route(web::post().to(update::update_top10)),
    );
}
