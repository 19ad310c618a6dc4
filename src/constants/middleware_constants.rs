use actix_web::http::Method;
use once_cell::sync::Lazy;
use std::collections::HashSet;

// Routes (path + method) reachable without a session
pub static PUBLIC_ROUTES: Lazy<HashSet<(&'static str, Method)>> = Lazy::new(|| {
    let mut set = HashSet::new();

    set.insert(("/health", Method::GET));
    set.insert(("/api/auth/login", Method::POST));

    set
});

pub fn is_public(path: &str, method: &Method) -> bool {
    PUBLIC_ROUTES.iter().any(|(p, m)| *p == path && m == method)
}
