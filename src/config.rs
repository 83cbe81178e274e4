use crate::error::ConfigError;

pub const DEFAULT_ENDPOINT: &str =
    "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_INITIAL_BACKOFF_SECS: u64 = 60;
pub const DEFAULT_MAX_BACKOFF_SECS: u64 = 600;

/// Process configuration, read once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub endpoint: String,
    pub poll_interval_secs: u64,
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup so tests never
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            match lookup(name).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    tracing::error!("required environment variable {name} is not set");
                    missing.push(name);
                    String::new()
                }
            }
        };

        let practicum_token = required("PRACTICUM_TOKEN");
        let telegram_token = required("TELEGRAM_TOKEN");
        let telegram_chat_id = required("TELEGRAM_CHAT_ID");

        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing));
        }

        let endpoint = lookup("STATUSWATCH_ENDPOINT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let poll_interval_secs = parse_secs(
            &lookup,
            "STATUSWATCH_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        let initial_backoff_secs = parse_secs(
            &lookup,
            "STATUSWATCH_INITIAL_BACKOFF_SECS",
            DEFAULT_INITIAL_BACKOFF_SECS,
        )?;
        let max_backoff_secs = parse_secs(
            &lookup,
            "STATUSWATCH_MAX_BACKOFF_SECS",
            DEFAULT_MAX_BACKOFF_SECS,
        )?;

        if max_backoff_secs < initial_backoff_secs {
            return Err(ConfigError::Invalid(format!(
                "STATUSWATCH_MAX_BACKOFF_SECS ({max_backoff_secs}) is below the \
                 initial backoff ({initial_backoff_secs})"
            )));
        }

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            poll_interval_secs,
            initial_backoff_secs,
            max_backoff_secs,
        })
    }
}

fn parse_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name).filter(|v| !v.is_empty()) else {
        return Ok(default);
    };
    let secs: u64 = raw
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be an integer, got {raw:?}")))?;
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be positive")));
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn base_env() -> HashMap<String, String> {
        env(&[
            ("PRACTICUM_TOKEN", "p-token"),
            ("TELEGRAM_TOKEN", "t-token"),
            ("TELEGRAM_CHAT_ID", "12345"),
        ])
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_applied_with_only_required_secrets() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.poll_interval_secs, 600);
        assert_eq!(config.initial_backoff_secs, 60);
        assert_eq!(config.max_backoff_secs, 600);
    }

    #[test]
    fn all_missing_secrets_reported_together() {
        let err = load(&HashMap::new()).unwrap_err();
        let ConfigError::MissingEnv(names) = err else {
            panic!("expected MissingEnv");
        };
        assert_eq!(
            names,
            vec!["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"]
        );
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = base_env();
        vars.insert("TELEGRAM_CHAT_ID".into(), String::new());
        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv(names) if names == ["TELEGRAM_CHAT_ID"]));
    }

    #[test]
    fn interval_override_parses() {
        let mut vars = base_env();
        vars.insert("STATUSWATCH_POLL_INTERVAL_SECS".into(), "30".into());
        assert_eq!(load(&vars).unwrap().poll_interval_secs, 30);
    }

    #[test]
    fn non_numeric_interval_rejected() {
        let mut vars = base_env();
        vars.insert("STATUSWATCH_POLL_INTERVAL_SECS".into(), "soon".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_interval_rejected() {
        let mut vars = base_env();
        vars.insert("STATUSWATCH_POLL_INTERVAL_SECS".into(), "0".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn cap_below_base_rejected() {
        let mut vars = base_env();
        vars.insert("STATUSWATCH_MAX_BACKOFF_SECS".into(), "10".into());
        assert!(matches!(load(&vars), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn endpoint_override_applies() {
        let mut vars = base_env();
        vars.insert(
            "STATUSWATCH_ENDPOINT".into(),
            "https://example.com/statuses/".into(),
        );
        assert_eq!(load(&vars).unwrap().endpoint, "https://example.com/statuses/");
    }
}
