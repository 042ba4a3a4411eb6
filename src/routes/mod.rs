/// Router Module Index
///
/// Splits the HTTP surface by access level so the authentication layer is
/// applied per module, never per handler.

/// Routes open to any client: health and the route service itself.
pub mod public;

/// Routes behind the `AuthUser` extractor middleware.
pub mod authenticated;
