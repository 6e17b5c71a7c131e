//! The route table: every endpoint is declared once, with its permitted
//! roles, and lands in both the axum router and the policy registry.

use axum::{
    Router,
    handler::Handler,
    http::Method,
    routing::{MethodFilter, on},
};
use thiserror::Error;

use innkeep_auth::{BypassPaths, PolicyError, Role, RoutePolicyRegistry, RoutePolicyRegistryBuilder};

pub mod auth;
pub mod common;
pub mod hotels;
pub mod rooms;
pub mod system;

pub const LOGIN_PATH: &str = "/api/v1/auth/login";
pub const REGISTER_PATH: &str = "/api/v1/auth/register";
pub const ROUTES_PATH: &str = "/api/v1/routes";

/// Paths that never require identity, whatever their policy says.
pub fn bypass_paths() -> BypassPaths {
    BypassPaths::new([LOGIN_PATH, REGISTER_PATH, ROUTES_PATH])
}

#[derive(Debug, Error)]
pub enum RouteTableError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("method {0} cannot be routed")]
    UnsupportedMethod(Method),
}

/// Router and policy registry under construction.
#[derive(Default)]
pub struct RouteTable {
    router: Router,
    policies: RoutePolicyRegistryBuilder,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<H, T>(
        mut self,
        method: Method,
        path: &str,
        roles: impl IntoIterator<Item = Role>,
        handler: H,
    ) -> Result<Self, RouteTableError>
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let filter = MethodFilter::try_from(method.clone())
            .map_err(|_| RouteTableError::UnsupportedMethod(method.clone()))?;
        self.policies.register(method, path, roles)?;
        self.router = self.router.route(path, on(filter, handler));
        Ok(self)
    }

    pub fn finish(self) -> (Router, RoutePolicyRegistry) {
        (self.router, self.policies.build())
    }
}

/// Every endpoint the API serves.
pub fn route_table() -> Result<RouteTable, RouteTableError> {
    let table = system::routes(RouteTable::new())?;
    let table = auth::routes(table)?;
    let table = hotels::routes(table)?;
    rooms::routes(table)
}

#[cfg(test)]
mod tests {
    use innkeep_auth::RoleSet;

    use super::*;

    fn registry() -> RoutePolicyRegistry {
        route_table().unwrap().finish().1
    }

    #[test]
    fn every_endpoint_has_a_policy() {
        let registry = registry();
        let cases = [
            (Method::POST, "/api/v1/auth/login", [Role::Anyone].as_slice()),
            (Method::GET, "/api/v1/hotels", &[Role::Anyone]),
            (Method::GET, "/api/v1/hotels/3", &[Role::User, Role::Manager, Role::Admin]),
            (Method::POST, "/api/v1/hotels", &[Role::Manager, Role::Admin]),
            (Method::DELETE, "/api/v1/hotels/3", &[Role::Manager, Role::Admin]),
            (Method::POST, "/api/v1/rooms/hotel/3", &[Role::Manager, Role::Admin]),
            (Method::GET, "/api/v1/rooms", &[Role::Anyone]),
            (Method::GET, "/api/v1/rooms/3", &[Role::Manager, Role::Admin]),
            (Method::GET, "/api/v1/whoami", &[Role::User, Role::Manager, Role::Admin]),
            (Method::GET, "/health", &[Role::Anyone]),
        ];

        for (method, path, roles) in cases {
            let resolved = registry
                .resolve(&method, path)
                .unwrap_or_else(|| panic!("{method} {path} has no policy"));
            assert_eq!(resolved, &roles.iter().copied().collect::<RoleSet>(), "{method} {path}");
        }
    }

    #[test]
    fn unknown_routes_resolve_to_nothing() {
        let registry = registry();
        assert!(registry.resolve(&Method::PATCH, "/api/v1/hotels/1").is_none());
        assert!(registry.resolve(&Method::GET, "/api/v1/bookings").is_none());
    }

    #[test]
    fn declaring_a_route_twice_fails() {
        let table = RouteTable::new()
            .route(Method::GET, "/a/{id}", [Role::User], system::health)
            .unwrap();
        let err = table
            .route(Method::GET, "/a/{other}", [Role::Admin], system::health)
            .err()
            .unwrap();
        assert!(matches!(err, RouteTableError::Policy(PolicyError::DuplicateRoute { .. })));
    }

    #[test]
    fn bypass_list_is_literal() {
        let bypass = bypass_paths();
        assert!(bypass.contains("/api/v1/auth/login"));
        assert!(bypass.contains("/api/v1/routes/"));
        assert!(!bypass.contains("/api/v1/auth/login/extra"));
        assert!(!bypass.contains("/api/v1/hotels"));
    }
}
