//! Datastore capability interfaces.
//!
//! Deployment-provided connection settings a service may request through
//! [`HostContext::datastores`](crate::host::HostContext::datastores).
//! These are pass-through descriptions only: the catalog never opens
//! connections, pools them, or checks reachability. A service brings its
//! own driver and feeds it these settings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One `host:port` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Connection settings for a relational (SQL) datastore.
#[derive(Clone, Serialize, Deserialize)]
pub struct RelationalSettings {
    pub endpoint: Endpoint,
    pub database: String,
    pub username: String,
    pub password: String,
    /// Driver options appended to the DSN query string, in order.
    #[serde(default)]
    pub options: Vec<(String, String)>,
}

impl RelationalSettings {
    /// Renders a `scheme://host:port/database?k=v&...` connection string.
    pub fn dsn(&self, scheme: &str) -> String {
        let mut dsn = format!("{}://{}/{}", scheme, self.endpoint, self.database);
        let mut separator = '?';
        for (key, value) in &self.options {
            dsn.push(separator);
            dsn.push_str(key);
            dsn.push('=');
            dsn.push_str(value);
            separator = '&';
        }
        dsn
    }
}

impl fmt::Debug for RelationalSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationalSettings")
            .field("endpoint", &self.endpoint)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Connection settings for a key-value datastore.
///
/// A single node addresses one instance; more than one describes a
/// cluster.
#[derive(Clone, Serialize, Deserialize)]
pub struct KeyValueSettings {
    pub nodes: Vec<Endpoint>,
    #[serde(default)]
    pub password: Option<String>,
}

impl KeyValueSettings {
    pub fn is_cluster(&self) -> bool {
        self.nodes.len() > 1
    }
}

impl fmt::Debug for KeyValueSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValueSettings")
            .field("nodes", &self.nodes)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Connection settings for a wide-column datastore.
#[derive(Clone, Serialize, Deserialize)]
pub struct WideColumnSettings {
    pub contact_point: Endpoint,
    pub datacenter: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for WideColumnSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WideColumnSettings")
            .field("contact_point", &self.contact_point)
            .field("datacenter", &self.datacenter)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Every datastore endpoint the deployment offers to services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatastoreCatalog {
    #[serde(default)]
    pub relational: Option<RelationalSettings>,
    #[serde(default)]
    pub key_value: Option<KeyValueSettings>,
    #[serde(default)]
    pub wide_column: Option<WideColumnSettings>,
}

static EMPTY: DatastoreCatalog = DatastoreCatalog {
    relational: None,
    key_value: None,
    wide_column: None,
};

impl DatastoreCatalog {
    /// A catalog with nothing configured, the default for hosts that do
    /// not override [`HostContext::datastores`](crate::host::HostContext::datastores).
    pub fn empty() -> &'static DatastoreCatalog {
        &EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsn_rendering() {
        let settings = RelationalSettings {
            endpoint: Endpoint::new("db.internal", 3306),
            database: "services".to_string(),
            username: "svc".to_string(),
            password: "hunter2".to_string(),
            options: vec![
                ("cachePrepStmts".to_string(), "true".to_string()),
                ("useSSL".to_string(), "false".to_string()),
            ],
        };
        assert_eq!(
            settings.dsn("mysql"),
            "mysql://db.internal:3306/services?cachePrepStmts=true&useSSL=false"
        );
    }

    #[test]
    fn test_dsn_without_options() {
        let settings = RelationalSettings {
            endpoint: Endpoint::new("localhost", 5432),
            database: "app".to_string(),
            username: "app".to_string(),
            password: "s3cret".to_string(),
            options: Vec::new(),
        };
        assert_eq!(settings.dsn("postgres"), "postgres://localhost:5432/app");
    }

    #[test]
    fn test_cluster_detection() {
        let single = KeyValueSettings {
            nodes: vec![Endpoint::new("cache-0", 6379)],
            password: None,
        };
        assert!(!single.is_cluster());

        let cluster = KeyValueSettings {
            nodes: vec![
                Endpoint::new("cache-0", 6379),
                Endpoint::new("cache-1", 6379),
                Endpoint::new("cache-2", 6379),
            ],
            password: Some("hunter2".to_string()),
        };
        assert!(cluster.is_cluster());
    }

    #[test]
    fn test_passwords_redacted_from_debug() {
        let settings = WideColumnSettings {
            contact_point: Endpoint::new("cass-0", 9042),
            datacenter: "dc1".to_string(),
            username: "svc".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_catalog_from_config() {
        let catalog: DatastoreCatalog = serde_json::from_str(
            r#"{"key_value": {"nodes": [{"host": "cache-0", "port": 6379}]}}"#,
        )
        .unwrap();
        assert!(catalog.relational.is_none());
        assert!(catalog.key_value.is_some());
        assert!(DatastoreCatalog::empty().key_value.is_none());
    }
}
