// Authentication configuration loaded from environment variables
// Decision: AUTH_ prefix for all auth config
// Decision: Default to "none" mode for local development

use std::time::Duration;

/// Authentication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No authentication required; every caller acts as admin
    #[default]
    None,
    /// Password accounts with JWT access tokens
    Full,
}

impl AuthMode {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "full" => AuthMode::Full,
            _ => AuthMode::None,
        }
    }
}

/// Admin account created at startup when missing
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub jwt: JwtConfig,
    pub admin: Option<AdminConfig>,
    pub disable_signup: bool,
}

fn random_secret() -> String {
    use rand::Rng;
    let bytes: [u8; 32] = rand::thread_rng().gen();
    hex::encode(bytes)
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let mode = std::env::var("AUTH_MODE")
            .map(|s| AuthMode::parse(&s))
            .unwrap_or_default();

        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                if mode == AuthMode::Full {
                    tracing::warn!("AUTH_JWT_SECRET not set, tokens will not survive a restart");
                }
                random_secret()
            });

        let access_token_lifetime = std::env::var("AUTH_JWT_ACCESS_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60 * 60));

        let admin = match (
            std::env::var("AUTH_ADMIN_EMAIL"),
            std::env::var("AUTH_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminConfig { email, password })
            }
            _ => None,
        };

        let disable_signup = std::env::var("AUTH_DISABLE_SIGNUP")
            .map(|s| s.eq_ignore_ascii_case("true") || s == "1")
            .unwrap_or(false);

        Self {
            mode,
            jwt: JwtConfig {
                secret,
                access_token_lifetime,
            },
            admin,
            disable_signup,
        }
    }

    /// Config with a random secret, for tests and dev mode
    pub fn with_mode(mode: AuthMode) -> Self {
        Self {
            mode,
            jwt: JwtConfig {
                secret: random_secret(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mode != AuthMode::None
    }

    pub fn signup_enabled(&self) -> bool {
        !self.disable_signup
    }
}
