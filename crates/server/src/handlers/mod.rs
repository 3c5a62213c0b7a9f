/// Administrative panel routes.
pub(crate) mod admin;

/// Authentication-related routes.
pub(crate) mod auth;

/// Direction listing routes.
pub(crate) mod directions;

/// Employee management routes.
pub(crate) mod employees;

/// Uploaded attachment routes.
pub(crate) mod media;

/// Problem and solution routes.
pub(crate) mod problems;
