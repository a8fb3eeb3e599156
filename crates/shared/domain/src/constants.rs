//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Minimum login length requirement
pub const MIN_LOGIN_LENGTH: usize = 1;

/// Maximum login length (matches the `auto_user.login` column)
pub const MAX_LOGIN_LENGTH: usize = 255;

/// Maximum post description length
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;
