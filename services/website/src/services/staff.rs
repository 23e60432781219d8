use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use suzstar_auth::{Claims, JwtService, PasswordService};
use suzstar_common::{AppError, JwtConfig};
use suzstar_database::StaffUser;

use super::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub staff: StaffUser,
}

pub struct StaffService {
    db_pool: PgPool,
    jwt_service: JwtService,
    jwt_config: JwtConfig,
}

impl StaffService {
    pub fn new(state: &AppState) -> Self {
        Self {
            db_pool: state.db_pool.clone(),
            jwt_service: state.jwt_service.clone(),
            jwt_config: state.config.jwt.clone(),
        }
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, StaffUser>("SELECT * FROM staff_users WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(&self.db_pool)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !PasswordService::verify_password(&request.password, &user.hashed_password)? {
            tracing::info!(username = %user.username, "Staff login failed");
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }
        if !user.is_active {
            return Err(AppError::Authorization("This staff account is disabled".to_string()));
        }

        let claims = Claims::new(
            user.user_id,
            user.username.clone(),
            user.email.clone(),
            user.display_name().to_string(),
            &self.jwt_config,
        );
        let token = self.jwt_service.generate_token(&claims)?;

        let user = sqlx::query_as::<_, StaffUser>(
            "UPDATE staff_users SET last_login = NOW() WHERE user_id = $1 RETURNING *",
        )
        .bind(user.user_id)
        .fetch_one(&self.db_pool)
        .await?;

        tracing::info!(username = %user.username, "Staff login");
        Ok(LoginResponse {
            token,
            expires_in: self.jwt_config.expiration_hours as i64 * 3600,
            staff: user,
        })
    }

    /// Whether the account behind a token still exists and is active.
    pub async fn is_active(&self, user_id: Uuid) -> Result<bool, AppError> {
        let active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM staff_users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db_pool)
                .await?;
        Ok(active.unwrap_or(false))
    }
}
