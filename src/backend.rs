//! Backend descriptors.
//!
//! A [`Backend`] value selects both the SQL dialect used by the query
//! builders and the driver used by the connection layer.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported relational engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    MySql,
    Sqlite,
}

impl Backend {
    /// All supported backends, in a fixed order.
    pub const ALL: [Backend; 3] = [Backend::Postgres, Backend::MySql, Backend::Sqlite];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Postgres => "postgres",
            Backend::MySql => "mysql",
            Backend::Sqlite => "sqlite",
        }
    }

    /// Parameter placeholder for the 1-based `position`.
    ///
    /// PostgreSQL numbers its placeholders (`$1`, `$2`, ...); MySQL and
    /// SQLite use the positional `?`.
    pub fn placeholder(&self, position: usize) -> String {
        match self {
            Backend::Postgres => format!("${}", position),
            Backend::MySql | Backend::Sqlite => "?".to_string(),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Backend::Postgres),
            "mysql" | "mariadb" => Ok(Backend::MySql),
            "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
            other => Err(Error::unsupported_backend(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("postgresql".parse::<Backend>().unwrap(), Backend::Postgres);
        assert_eq!("PG".parse::<Backend>().unwrap(), Backend::Postgres);
        assert_eq!("mariadb".parse::<Backend>().unwrap(), Backend::MySql);
        assert_eq!("sqlite3".parse::<Backend>().unwrap(), Backend::Sqlite);
    }

    #[test]
    fn test_parse_unknown_backend() {
        let err = "oracle".parse::<Backend>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedBackend { name } if name == "oracle"));
    }

    #[test]
    fn test_display_round_trip() {
        for backend in Backend::ALL {
            assert_eq!(backend.to_string().parse::<Backend>().unwrap(), backend);
        }
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Backend::Postgres.placeholder(1), "$1");
        assert_eq!(Backend::Postgres.placeholder(7), "$7");
        assert_eq!(Backend::MySql.placeholder(3), "?");
        assert_eq!(Backend::Sqlite.placeholder(3), "?");
    }
}
