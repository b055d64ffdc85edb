//! Environment-derived configuration.
//!
//! Each job builds the structs it needs once at startup and passes them by
//! reference into the clients. Validation happens here, before any request
//! is issued, so a missing variable fails the process without side effects.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::table::{TableName, DEFAULT_TABLES};

/// Default Notion REST base URL.
pub const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Default output root for backup exports.
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Connection settings for the Supabase REST (PostgREST) endpoint.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL without a trailing slash, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service-role key, sent both as `apikey` and as the bearer token.
    pub service_key: String,
}

/// Credentials and target database for the Notion API.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub token: String,
    /// Notion database that receives one page per payout.
    pub database_id: String,
    /// REST base URL without a trailing slash (default: [`DEFAULT_NOTION_API_URL`]).
    pub api_url: String,
}

/// Settings for the backup export job.
#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory under which the dated export folder is created.
    pub output_root: PathBuf,
    /// Tables to export, in order.
    pub tables: Vec<TableName>,
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Per-request timeout. `None` keeps the client default.
    pub request_timeout: Option<Duration>,
}

impl SupabaseConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                     | Required |
    /// |-----------------------------|----------|
    /// | `SUPABASE_URL`              | yes      |
    /// | `SUPABASE_SERVICE_ROLE_KEY` | yes      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, "SUPABASE_URL")?;
        let service_key = required(&lookup, "SUPABASE_SERVICE_ROLE_KEY")?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            service_key,
        })
    }
}

impl NotionConfig {
    /// Load from the process environment.
    ///
    /// | Env Var              | Required | Default                     |
    /// |----------------------|----------|-----------------------------|
    /// | `NOTION_TOKEN`       | yes      | --                          |
    /// | `NOTION_DATABASE_ID` | yes      | --                          |
    /// | `NOTION_API_URL`     | no       | `https://api.notion.com/v1` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = required(&lookup, "NOTION_TOKEN")?;
        let database_id = required(&lookup, "NOTION_DATABASE_ID")?;
        let api_url = optional(&lookup, "NOTION_API_URL")
            .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string());

        Ok(Self {
            token,
            database_id,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

impl BackupConfig {
    /// Load from the process environment.
    ///
    /// | Env Var         | Default                                             |
    /// |-----------------|-----------------------------------------------------|
    /// | `BACKUP_DIR`    | `backups`                                           |
    /// | `BACKUP_TABLES` | `configs,offers,royalties_metadata,sales,payouts`   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_root = optional(&lookup, "BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));

        let tables = match optional(&lookup, "BACKUP_TABLES") {
            Some(raw) => parse_table_list(&raw)?,
            None => DEFAULT_TABLES
                .iter()
                .map(|t| TableName::new(*t))
                .collect::<Result<_, _>>()
                .map_err(|e| ConfigError::Invalid {
                    var: "BACKUP_TABLES",
                    reason: e.to_string(),
                })?,
        };

        Ok(Self {
            output_root,
            tables,
        })
    }
}

impl HttpConfig {
    /// Load from the process environment.
    ///
    /// `HTTP_TIMEOUT_SECS` is optional; when set it must be a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout = match optional(&lookup, "HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    var: "HTTP_TIMEOUT_SECS",
                    reason: format!("{raw:?} is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        var: "HTTP_TIMEOUT_SECS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self { request_timeout })
    }
}

fn parse_table_list(raw: &str) -> Result<Vec<TableName>, ConfigError> {
    let tables: Vec<TableName> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(TableName::new)
        .collect::<Result<_, _>>()
        .map_err(|e| ConfigError::Invalid {
            var: "BACKUP_TABLES",
            reason: e.to_string(),
        })?;

    if tables.is_empty() {
        return Err(ConfigError::Invalid {
            var: "BACKUP_TABLES",
            reason: "no table names given".into(),
        });
    }
    Ok(tables)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Blank values count as missing.
fn required<F>(lookup: &F, var: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, var).ok_or(ConfigError::Missing(var))
}

fn optional<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn supabase_requires_url_and_key() {
        let err = SupabaseConfig::from_lookup(vars(&[("SUPABASE_URL", "https://x.supabase.co")]))
            .unwrap_err();
        assert_matches!(err, ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"));

        let err = SupabaseConfig::from_lookup(vars(&[("SUPABASE_SERVICE_ROLE_KEY", "k")]))
            .unwrap_err();
        assert_matches!(err, ConfigError::Missing("SUPABASE_URL"));
    }

    #[test]
    fn supabase_strips_trailing_slash() {
        let cfg = SupabaseConfig::from_lookup(vars(&[
            ("SUPABASE_URL", "https://x.supabase.co/"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.url, "https://x.supabase.co");
        assert_eq!(cfg.service_key, "secret");
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let err = NotionConfig::from_lookup(vars(&[
            ("NOTION_TOKEN", "   "),
            ("NOTION_DATABASE_ID", "db"),
        ]))
        .unwrap_err();
        assert_matches!(err, ConfigError::Missing("NOTION_TOKEN"));
    }

    #[test]
    fn notion_defaults_api_url() {
        let cfg = NotionConfig::from_lookup(vars(&[
            ("NOTION_TOKEN", "tok"),
            ("NOTION_DATABASE_ID", "db"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url, DEFAULT_NOTION_API_URL);
    }

    #[test]
    fn backup_defaults() {
        let cfg = BackupConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(cfg.output_root, PathBuf::from("backups"));
        let names: Vec<&str> = cfg.tables.iter().map(TableName::as_str).collect();
        assert_eq!(
            names,
            ["configs", "offers", "royalties_metadata", "sales", "payouts"]
        );
    }

    #[test]
    fn backup_table_override() {
        let cfg = BackupConfig::from_lookup(vars(&[
            ("BACKUP_TABLES", " offers , sales,"),
            ("BACKUP_DIR", "/var/backups"),
        ]))
        .unwrap();
        let names: Vec<&str> = cfg.tables.iter().map(TableName::as_str).collect();
        assert_eq!(names, ["offers", "sales"]);
        assert_eq!(cfg.output_root, PathBuf::from("/var/backups"));
    }

    #[test]
    fn backup_rejects_unsafe_table_name() {
        let err = BackupConfig::from_lookup(vars(&[("BACKUP_TABLES", "offers,../etc")]))
            .unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "BACKUP_TABLES", .. });
    }

    #[test]
    fn http_timeout_parsing() {
        assert!(HttpConfig::from_lookup(vars(&[]))
            .unwrap()
            .request_timeout
            .is_none());
        assert_eq!(
            HttpConfig::from_lookup(vars(&[("HTTP_TIMEOUT_SECS", "30")]))
                .unwrap()
                .request_timeout,
            Some(Duration::from_secs(30))
        );
        assert_matches!(
            HttpConfig::from_lookup(vars(&[("HTTP_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::Invalid { var: "HTTP_TIMEOUT_SECS", .. })
        );
        assert_matches!(
            HttpConfig::from_lookup(vars(&[("HTTP_TIMEOUT_SECS", "0")])),
            Err(ConfigError::Invalid { var: "HTTP_TIMEOUT_SECS", .. })
        );
    }
}
