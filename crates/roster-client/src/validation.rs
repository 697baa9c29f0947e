use crate::error::ApiError;

/// Validate a user name and return it trimmed.
///
/// # Examples
/// ```
/// use roster_client::validation::validate_name;
///
/// assert_eq!(validate_name("  Ada ").unwrap(), "Ada");
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ApiError::InvalidName("name cannot be empty".to_string()));
    }

    Ok(trimmed)
}
