use bcrypt::{hash, verify, DEFAULT_COST};
use suzstar_common::AppError;

pub struct PasswordService;

impl PasswordService {
    pub fn hash_password(password: &str) -> Result<String, AppError> {
        hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
        verify(password, hash)
            .map_err(|e| AppError::Authentication(format!("Failed to verify password: {}", e)))
    }

    /// Staff passwords: at least 10 characters with a letter and a digit.
    pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
        if password.chars().count() < 10 {
            return Err(AppError::Validation("Password must be at least 10 characters long".to_string()));
        }

        let has_letter = password.chars().any(|c| c.is_alphabetic());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());

        if !has_letter || !has_digit {
            return Err(AppError::Validation("Password must contain both letters and digits".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hashed = PasswordService::hash_password("counsel2024!").unwrap();
        assert!(PasswordService::verify_password("counsel2024!", &hashed).unwrap());
        assert!(!PasswordService::verify_password("counsel2025!", &hashed).unwrap());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        assert!(PasswordService::validate_password_strength("short1").is_err());
        assert!(PasswordService::validate_password_strength("onlyletterslong").is_err());
        assert!(PasswordService::validate_password_strength("wellness2024").is_ok());
    }
}
