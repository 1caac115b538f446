//! Bearer-token middleware for the loyalty routes.
//!
//! It reads the `Authorization` header, validates the token, and stashes the authenticated user id in the
//! request extensions, where the [`AuthenticatedUser`] extractor picks it up. Requests without a valid token
//! are rejected with 401 before they reach a handler.

use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ok, ready, Ready};
use log::debug;

use crate::auth::{TokenIssuer, BEARER_PREFIX};

/// The identity the middleware resolved from the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(req.extensions().get::<AuthenticatedUser>().copied().ok_or_else(|| ErrorUnauthorized("unauthorized")))
    }
}

pub struct AuthMiddlewareFactory {
    issuer: TokenIssuer,
}

impl AuthMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService { issuer: self.issuer.clone(), service: Rc::new(service) })
    }
}

pub struct AuthMiddlewareService<S> {
    issuer: TokenIssuer,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let user_id = bearer_token(&req).and_then(|token| self.issuer.verify(&token).ok());
        Box::pin(async move {
            let Some(user_id) = user_id else {
                debug!("🔑️ Rejecting request without a valid bearer token");
                return Err(ErrorUnauthorized("unauthorized"));
            };
            req.extensions_mut().insert(AuthenticatedUser { user_id });
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX.trim()) {
        return None;
    }
    Some(token.trim().to_string())
}
