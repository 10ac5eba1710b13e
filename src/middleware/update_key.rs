//! 更新接口共享密钥认证中间件
//!
//! 通过查询参数 `?key=<secret>` 进行认证，密钥为空时不做校验

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

/// 共享密钥中间件
pub struct UpdateKeyMiddleware {
    secret: Rc<String>,
}

impl UpdateKeyMiddleware {
    pub fn new(secret: String) -> Self {
        Self {
            secret: Rc::new(secret),
        }
    }
}

/// 从查询字符串中取出 key 参数
fn query_key(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
}

impl<S, B> Transform<S, ServiceRequest> for UpdateKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = UpdateKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(UpdateKeyMiddlewareService {
            service: Rc::new(service),
            secret: self.secret.clone(),
        })
    }
}

pub struct UpdateKeyMiddlewareService<S> {
    service: Rc<S>,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for UpdateKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let secret = self.secret.clone();

        Box::pin(async move {
            // 未配置密钥时跳过认证
            if secret.is_empty() {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            match query_key(req.query_string()) {
                Some(key) if key == secret.as_str() => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                _ => {
                    log::warn!(
                        "更新接口认证失败: {}",
                        req.connection_info().realip_remote_addr().unwrap_or("unknown")
                    );
                    let response = HttpResponse::Unauthorized()
                        .content_type("text/plain; charset=utf-8")
                        .body("Unauthorized");
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_key() {
        assert_eq!(query_key("key=abc"), Some("abc".to_string()));
        assert_eq!(query_key("x=1&key=a%20b%26c"), Some("a b&c".to_string()));
        assert_eq!(query_key("x=1"), None);
        assert_eq!(query_key(""), None);
    }
}
