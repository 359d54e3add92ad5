use pkgdoc_core::AppError;

/// Configuration for the cache connection pool.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Read configuration from environment variables.
    ///
    /// - `DATABASE_URL` (required)
    /// - `DATABASE_MAX_CONNECTIONS` (optional, defaults to 5)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_env_optional()?.ok_or_else(|| {
            AppError::ConfigError("DATABASE_URL not set. Required for the package cache.".into())
        })
    }

    /// Like [`from_env`](Self::from_env), but an unset `DATABASE_URL` means
    /// "no cache" rather than an error.
    pub fn from_env_optional() -> Result<Option<Self>, AppError> {
        let Some(url) = std::env::var("DATABASE_URL").ok().filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        let max_connections = parse_max_connections(std::env::var("DATABASE_MAX_CONNECTIONS").ok())?;

        Ok(Some(Self {
            url,
            max_connections,
        }))
    }
}

fn parse_max_connections(raw: Option<String>) -> Result<u32, AppError> {
    let Some(raw) = raw else {
        return Ok(5);
    };
    let parsed: u32 = raw.trim().parse().map_err(|_| {
        AppError::ConfigError(format!(
            "Invalid DATABASE_MAX_CONNECTIONS '{raw}': must be a positive integer"
        ))
    })?;
    if parsed == 0 {
        return Err(AppError::ConfigError(
            "DATABASE_MAX_CONNECTIONS must be at least 1".into(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_connections_defaults_to_five() {
        assert_eq!(parse_max_connections(None).unwrap(), 5);
    }

    #[test]
    fn max_connections_parses_value() {
        assert_eq!(parse_max_connections(Some(" 12 ".into())).unwrap(), 12);
    }

    #[test]
    fn max_connections_rejects_zero_and_garbage() {
        assert!(matches!(
            parse_max_connections(Some("0".into())),
            Err(AppError::ConfigError(_))
        ));
        let err = parse_max_connections(Some("many".into())).unwrap_err();
        assert!(err.to_string().contains("many"));
    }
}
