use super::ApiError;

/// Presence checks only. Length limits and credential checks belong to the
/// auth service so they apply to every caller.
pub fn validate_login(username: &str, password: &str) -> Result<(), ApiError> {
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_login() {
        assert!(validate_login("admin", "pw").is_ok());
        assert!(validate_login("", "pw").is_err());
        assert!(validate_login("admin", "").is_err());
    }
}
