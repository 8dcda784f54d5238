use core_config::{ConfigError, FromEnv, env_parse_or, env_required};

const MIN_SECRET_LEN: usize = 32;

/// Signing settings for access tokens.
///
/// Loaded from `JWT_SECRET` (required, 32+ characters) and `JWT_EXPIRY_SECS`
/// (default one hour).
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_secs: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least {MIN_SECRET_LEN} characters (got {})",
                    secret.len()
                ),
            });
        }

        Ok(Self {
            secret,
            expiry_secs: 3600,
        })
    }

    pub fn with_expiry_secs(mut self, expiry_secs: i64) -> Self {
        self.expiry_secs = expiry_secs;
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self::new(env_required("JWT_SECRET")?)?;
        let expiry_secs = env_parse_or("JWT_EXPIRY_SECS", config.expiry_secs)?;
        Ok(config.with_expiry_secs(expiry_secs))
    }
}
