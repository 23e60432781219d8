use serde::{Deserialize, Serialize};
use suzstar_common::{DatabaseConfig, JwtConfig, ServerConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub email: EmailConfig,
    pub storage: StorageConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: String,
    pub smtp_encryption: SmtpEncryption,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpEncryption {
    None,
    Tls,
    Starttls,
}

impl SmtpEncryption {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => SmtpEncryption::None,
            "tls" | "ssl" => SmtpEncryption::Tls,
            _ => SmtpEncryption::Starttls,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory uploaded files live in.
    pub media_root: String,
    /// URL prefix the media directory is served under.
    pub media_url: String,
    pub static_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Admin recipient when no site settings row exists.
    pub contact_email: String,
    pub site_url: String,
}

impl WebsiteConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            email: EmailConfig {
                enabled: std::env::var("EMAIL_ENABLED")
                    .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
                smtp_host: std::env::var("SMTP_HOST")
                    .unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                smtp_port: std::env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .unwrap_or(587),
                smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
                smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
                smtp_encryption: SmtpEncryption::parse(
                    &std::env::var("SMTP_ENCRYPTION").unwrap_or_else(|_| "starttls".to_string()),
                ),
                from_email: std::env::var("FROM_EMAIL")
                    .unwrap_or_else(|_| "noreply@suzstarcounseling.co.ke".to_string()),
                from_name: std::env::var("FROM_NAME")
                    .unwrap_or_else(|_| "Suzstar Counseling".to_string()),
            },
            storage: StorageConfig {
                media_root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()),
                media_url: std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media".to_string()),
                static_root: std::env::var("STATIC_ROOT").unwrap_or_else(|_| "static".to_string()),
            },
            site: SiteConfig {
                contact_email: std::env::var("CONTACT_EMAIL")
                    .unwrap_or_else(|_| "info@suzstarcounseling.co.ke".to_string()),
                site_url: std::env::var("SITE_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            },
        }
    }
}
