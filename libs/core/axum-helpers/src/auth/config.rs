use core_config::{ConfigError, FromEnv, env_required};

/// JWT verification configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HS256 signing secret shared with the token issuer
    pub secret: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl FromEnv for JwtConfig {
    /// Requires JWT_SECRET to be set (no default).
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            secret: env_required("JWT_SECRET")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwt_config_from_env_missing() {
        temp_env::with_var_unset("JWT_SECRET", || {
            let err = JwtConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("JWT_SECRET"));
        });
    }

    #[test]
    fn test_jwt_config_from_env_success() {
        temp_env::with_var("JWT_SECRET", Some("s3cret"), || {
            let config = JwtConfig::from_env().unwrap();
            assert_eq!(config.secret, "s3cret");
        });
    }
}
