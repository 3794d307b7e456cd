use tower_http::cors::{Any, CorsLayer};

/// Permissive CORS for the browser clients; the session cookie is scoped
/// per-game so cross-origin reads leak nothing actionable.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
