// Live PostgreSQL runtime settings
//
// Opens one short-lived connection, reads `pg_settings`, and closes it.
// Values come back fully materialized: formulas that RDS parameter groups
// only declare (e.g. `{DBInstanceClassMemory/32768}`) are already
// evaluated by the server.

use secrecy::{ExposeSecret, SecretString};
use sqlx::{Connection, PgConnection, Row};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;

const SELECT_ALL_SETTINGS: &str = r"
    SELECT name, setting, unit, vartype, min_val, max_val, source
    FROM pg_settings
    ORDER BY name
";

const SELECT_NAMED_SETTINGS: &str = r"
    SELECT name, setting, unit, vartype, min_val, max_val, source
    FROM pg_settings
    WHERE name = ANY($1)
    ORDER BY name
";

/// One row of `pg_settings`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgSettingRow {
    pub name: String,
    pub setting: Option<String>,
    pub unit: Option<String>,
    pub vartype: Option<String>,
    pub min_val: Option<String>,
    pub max_val: Option<String>,
    pub source: Option<String>,
}

/// A scoped connection to a live database.
///
/// Use [`fetch_runtime_settings`] unless several queries must share one
/// connection; it guarantees the connection is closed on every path.
pub struct LiveConnection {
    conn: PgConnection,
    display_url: String,
}

impl LiveConnection {
    /// Connect and authenticate.
    pub async fn open(url: &SecretString) -> Result<Self, Error> {
        let display_url = redact_url(url.expose_secret());
        debug!(url = %display_url, "opening live connection");
        let conn = PgConnection::connect(url.expose_secret())
            .await
            .map_err(|source| Error::Connect {
                url: display_url.clone(),
                source,
            })?;
        Ok(Self { conn, display_url })
    }

    /// The connection URL with its password masked.
    pub fn display_url(&self) -> &str {
        &self.display_url
    }

    /// Query `pg_settings`, optionally restricted to the given names.
    pub async fn runtime_settings(
        &mut self,
        names: Option<&[String]>,
    ) -> Result<Vec<PgSettingRow>, Error> {
        let rows = match names {
            Some(names) => {
                sqlx::query(SELECT_NAMED_SETTINGS)
                    .bind(names)
                    .fetch_all(&mut self.conn)
                    .await
            }
            None => sqlx::query(SELECT_ALL_SETTINGS).fetch_all(&mut self.conn).await,
        }
        .map_err(Error::Query)?;

        rows.iter()
            .map(|row| {
                Ok(PgSettingRow {
                    name: row.try_get("name")?,
                    setting: row.try_get("setting")?,
                    unit: row.try_get("unit")?,
                    vartype: row.try_get("vartype")?,
                    min_val: row.try_get("min_val")?,
                    max_val: row.try_get("max_val")?,
                    source: row.try_get("source")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Error::Query)
    }

    /// Close the connection, logging (not returning) a failed goodbye.
    pub async fn release(self) {
        let url = self.display_url;
        if let Err(e) = self.conn.close().await {
            warn!(url = %url, error = %e, "failed to close live connection cleanly");
        } else {
            debug!(url = %url, "live connection closed");
        }
    }
}

/// Connect, read `pg_settings`, disconnect.
///
/// The connection is released whether the query succeeded or not.
pub async fn fetch_runtime_settings(
    url: &SecretString,
    names: Option<&[String]>,
) -> Result<Vec<PgSettingRow>, Error> {
    let mut conn = LiveConnection::open(url).await?;
    let result = conn.runtime_settings(names).await;
    conn.release().await;
    result
}

const MASK: &str = "****";

/// Mask every secret in a connection string for display and logging.
///
/// URLs lose their userinfo password and any `password`-like query pair.
/// Key/value DSNs (`host=db dbname=app password=...`) keep their
/// non-secret pairs. Anything unparseable is replaced wholesale.
pub fn redact_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some(MASK));
            }
            if url.query_pairs().any(|(key, _)| is_secret_key(&key)) {
                let pairs: Vec<(String, String)> = url
                    .query_pairs()
                    .map(|(key, value)| {
                        let value = if is_secret_key(&key) { MASK.to_owned() } else { value.into_owned() };
                        (key.into_owned(), value)
                    })
                    .collect();
                url.query_pairs_mut().clear().extend_pairs(pairs);
            }
            url.to_string()
        }
        Err(_) => redact_dsn(raw).unwrap_or_else(|| "<connection string>".into()),
    }
}

/// `password`, `sslpassword` and friends.
fn is_secret_key(key: &str) -> bool {
    key.to_ascii_lowercase().contains("password")
}

/// Rewrite a libpq keyword/value string with secret values masked.
///
/// `None` when the string is not well formed, so the caller can hide it.
fn redact_dsn(raw: &str) -> Option<String> {
    let mut pairs = Vec::new();
    let mut rest = raw.trim_start();
    while !rest.is_empty() {
        let (key, after) = rest.split_once('=')?;
        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return None;
        }
        let after = after.trim_start();
        let (value, tail) = match after.strip_prefix('\'') {
            Some(quoted) => {
                let mut value = String::new();
                let mut chars = quoted.char_indices();
                let mut end = None;
                while let Some((i, c)) = chars.next() {
                    match c {
                        '\\' => value.push(chars.next()?.1),
                        '\'' => {
                            end = Some(i + 1);
                            break;
                        }
                        _ => value.push(c),
                    }
                }
                (value, &quoted[end?..])
            }
            None => {
                let end = after.find(char::is_whitespace).unwrap_or(after.len());
                (after[..end].to_owned(), &after[end..])
            }
        };

        pairs.push(if is_secret_key(key) {
            format!("{key}={MASK}")
        } else if value.is_empty() || value.contains(char::is_whitespace) {
            format!("{key}='{value}'")
        } else {
            format!("{key}={value}")
        });
        rest = tail.trim_start();
    }
    Some(pairs.join(" ")).filter(|s| !s.is_empty())
}

/// Return `raw` with its password replaced by `password`.
pub fn with_password(raw: &str, password: &str) -> Result<String, Error> {
    let mut url = Url::parse(raw)?;
    url.set_password(Some(password))
        .map_err(|()| Error::InvalidUrl(url::ParseError::EmptyHost))?;
    Ok(url.to_string())
}
