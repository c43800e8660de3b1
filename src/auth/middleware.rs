use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderMap},
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::token::TokenService;
use crate::error::AppError;
use crate::store::Store;

/// Rejects requests without a valid bearer token and records the caller's
/// user id in the request extensions.
///
/// The [`TokenService`] is read from application data, so it must be
/// registered with `App::app_data` before any wrapped scope is served.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verified = match req.app_data::<web::Data<TokenService>>() {
            Some(tokens) => bearer_token(req.headers()).and_then(|token| tokens.verify(token)),
            None => Err(AppError::Internal("token service is not configured".into())),
        };

        match verified {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUserId(user_id));
                Box::pin(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("rejected {} {}: {}", req.method(), req.path(), app_err);
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}

/// Rejects callers whose account no longer exists with `Forbidden`.
///
/// Must sit inside [`AuthMiddleware`] (wrapped before it), so the caller id
/// is already in the request extensions. Runs before any extractor, so a
/// stale token is refused whatever the body or path look like.
pub struct ActiveUserGuard;

impl<S, B> Transform<S, ServiceRequest> for ActiveUserGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ActiveUserGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ActiveUserGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct ActiveUserGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ActiveUserGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let caller = req.extensions().get::<AuthenticatedUserId>().copied();
        let store = req.app_data::<web::Data<dyn Store>>().cloned();

        Box::pin(async move {
            let caller = caller.ok_or_else(|| {
                AppError::Forbidden("no authenticated user for this request".into())
            })?;
            let store =
                store.ok_or_else(|| AppError::Internal("store is not configured".into()))?;

            if !store.check_user_id_exists(caller.0).await? {
                log::debug!("rejected {} {}: user {} is gone", req.method(), req.path(), caller.0);
                return Err(AppError::Forbidden(format!("user {} no longer exists", caller.0)).into());
            }
            service.call(req).await
        })
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing token".into()))?;

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| AppError::Unauthorized("Malformed authorization header".into()))
}
