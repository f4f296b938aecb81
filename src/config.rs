//! Runtime configuration, read from the environment (and an optional `.env` file).
//!
//! | Variable             | Default    |
//! |----------------------|------------|
//! | `HOST`               | `0.0.0.0`  |
//! | `PORT`               | `8080`     |
//! | `ADMIN_TOKEN`        | unset      |
//! | `LEAGUE_DRAW_POLICY` | `reject`   |
//! | `MAX_PARTICIPANTS`   | `32`       |

use crate::logic::{EngineSettings, LeagueDrawPolicy, DEFAULT_MAX_PARTICIPANTS, MIN_PARTICIPANTS};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Shared admin secret; mutations are refused while unset.
    pub admin_token: Option<String>,
    pub engine: EngineSettings,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment, or a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: v })?,
            None => 8080,
        };
        let admin_token = lookup("ADMIN_TOKEN").filter(|t| !t.trim().is_empty());
        let league_draw_policy = match lookup("LEAGUE_DRAW_POLICY") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "LEAGUE_DRAW_POLICY",
                value: v,
            })?,
            None => LeagueDrawPolicy::default(),
        };
        let max_participants = match lookup("MAX_PARTICIPANTS") {
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n >= MIN_PARTICIPANTS => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "MAX_PARTICIPANTS",
                        value: v,
                    })
                }
            },
            None => DEFAULT_MAX_PARTICIPANTS,
        };
        Ok(Self {
            host,
            port,
            admin_token,
            engine: EngineSettings {
                league_draw_policy,
                max_participants,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let c = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.port, 8080);
        assert_eq!(c.admin_token, None);
        assert_eq!(c.engine.league_draw_policy, LeagueDrawPolicy::Reject);
        assert_eq!(c.engine.max_participants, 32);
    }

    #[test]
    fn overrides() {
        let c = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("ADMIN_TOKEN", "s3cret"),
            ("LEAGUE_DRAW_POLICY", "participant2_wins"),
            ("MAX_PARTICIPANTS", "16"),
        ]))
        .unwrap();
        assert_eq!(c.port, 9000);
        assert_eq!(c.admin_token.as_deref(), Some("s3cret"));
        assert_eq!(c.engine.league_draw_policy, LeagueDrawPolicy::Participant2Wins);
        assert_eq!(c.engine.max_participants, 16);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(Config::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("LEAGUE_DRAW_POLICY", "coin_flip")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MAX_PARTICIPANTS", "3")])).is_err());
    }
}
