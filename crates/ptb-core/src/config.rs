use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::{AdminIdentity, UserId},
    errors::Error,
    Result,
};

const DEFAULT_CATALOG_FILE: &str = "catalog.json";
const DEFAULT_CLIENTS_FILE: &str = "clients.csv";
const DEFAULT_ADMIN_NAME: &str = "Админ";

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Identity
    pub admin_id: i64,
    pub admin_username: String,
    pub admin_name: String,

    // Persistence
    pub catalog_file: PathBuf,
    pub clients_file: PathBuf,
}

impl Config {
    /// Load from the process environment, reading `.env` first when present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_bot_token = lookup("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let admin_id = match lookup("ADMIN_ID").and_then(non_empty) {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("ADMIN_ID must be a numeric user id, got {raw:?}"))
            })?,
            None => {
                return Err(Error::Config(
                    "ADMIN_ID environment variable is required".to_string(),
                ))
            }
        };

        let admin_username = lookup("ADMIN_USERNAME")
            .and_then(non_empty)
            .ok_or_else(|| {
                Error::Config("ADMIN_USERNAME environment variable is required".to_string())
            })?
            .trim()
            .to_string();

        let admin_name = lookup("ADMIN_NAME")
            .and_then(non_empty)
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());

        let catalog_file = lookup("CATALOG_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE));
        let clients_file = lookup("CLIENTS_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CLIENTS_FILE));

        Ok(Self {
            telegram_bot_token,
            admin_id,
            admin_username,
            admin_name,
            catalog_file,
            clients_file,
        })
    }

    pub fn admin_identity(&self) -> AdminIdentity {
        AdminIdentity {
            user_id: UserId(self.admin_id),
            username: self.admin_username.clone(),
            display_name: self.admin_name.clone(),
        }
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        env::set_var(key, unquote(v.trim()));
    }
}

fn unquote(val: &str) -> &str {
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        &val[1..val.len() - 1]
    } else {
        val
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ADMIN_ID", " 42 "),
            ("ADMIN_USERNAME", "@matvey"),
        ]))
        .unwrap();

        assert_eq!(cfg.admin_id, 42);
        assert_eq!(cfg.admin_username, "@matvey");
        assert_eq!(cfg.admin_name, DEFAULT_ADMIN_NAME);
        assert_eq!(cfg.catalog_file, PathBuf::from("catalog.json"));
        assert_eq!(cfg.clients_file, PathBuf::from("clients.csv"));
        assert_eq!(cfg.admin_identity().contact_link(), "https://t.me/matvey");
    }

    #[test]
    fn overrides_paths_and_name() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("ADMIN_ID", "1"),
            ("ADMIN_USERNAME", "m"),
            ("ADMIN_NAME", "Матвей"),
            ("CATALOG_FILE", "/data/items.json"),
            ("CLIENTS_FILE", "/data/users.csv"),
        ]))
        .unwrap();

        assert_eq!(cfg.admin_name, "Матвей");
        assert_eq!(cfg.catalog_file, PathBuf::from("/data/items.json"));
        assert_eq!(cfg.clients_file, PathBuf::from("/data/users.csv"));
    }

    #[test]
    fn missing_or_invalid_required_values_are_config_errors() {
        let no_token = Config::from_lookup(lookup_from(&[("ADMIN_ID", "1")]));
        assert!(matches!(no_token, Err(Error::Config(_))));

        let bad_id = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("ADMIN_ID", "matvey"),
            ("ADMIN_USERNAME", "m"),
        ]));
        assert!(matches!(bad_id, Err(Error::Config(_))));

        let no_username = Config::from_lookup(lookup_from(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("ADMIN_ID", "1"),
        ]));
        assert!(matches!(no_username, Err(Error::Config(_))));
    }

    #[test]
    fn unquote_strips_matching_quotes_only() {
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("'abc'"), "abc");
        assert_eq!(unquote("\"abc'"), "\"abc'");
        assert_eq!(unquote("x"), "x");
    }
}
