//! Environment Module
//!
//! The property store prepared for each run and handed to listeners with the
//! `EnvironmentPrepared` event.
//!
//! # Property sources
//!
//! ```text
//! 1. Application default properties      (lowest precedence)
//!    ↓
//! 2. Process environment variables       (unless disabled)
//!    ↓
//! 3. APPLICATION_JSON, flattened to dotted keys
//!    ↓
//! 4. --key=value command-line arguments  (highest precedence)
//! ```

mod binder;
mod kind;
mod settings;

pub use kind::ApplicationKind;
pub use settings::MainSettings;

use crate::error::{BootcastError, Result};
use dashmap::DashMap;
use binder::{Node, NodeDeserializer};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::sync::Arc;

/// Name of the variable holding inline JSON properties
pub const APPLICATION_JSON: &str = "APPLICATION_JSON";

/// Property holding the comma separated active profiles
pub const ACTIVE_PROFILES: &str = "profiles.active";

/// Concurrent property store
///
/// Clones share the same properties, so listeners handling
/// `EnvironmentPrepared` can contribute properties that later phases see.
#[derive(Clone, Default)]
pub struct Environment {
    properties: Arc<DashMap<String, String>>,
    non_option_args: Arc<[String]>,
}

impl Environment {
    /// An environment with no properties
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the environment for one run
    ///
    /// # Errors
    ///
    /// Fails if `APPLICATION_JSON` is present but not a JSON object.
    pub fn prepare<K, V>(
        defaults: impl IntoIterator<Item = (K, V)>,
        include_system_environment: bool,
        args: &[String],
    ) -> Result<Self>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut environment = Self::new();
        for (key, value) in defaults {
            environment.set(key, value);
        }
        if include_system_environment {
            for (key, value) in env::vars() {
                environment.set(key, value);
            }
        }
        if let Some(json) = environment.get(APPLICATION_JSON) {
            environment.load_json(APPLICATION_JSON, &json)?;
        }
        environment.non_option_args = environment.apply_command_line(args).into();

        tracing::debug!(
            "Prepared environment with {} properties, profiles {:?}",
            environment.properties.len(),
            environment.active_profiles()
        );
        Ok(environment)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(|v| v.clone())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Profiles listed in `profiles.active`
    pub fn active_profiles(&self) -> Vec<String> {
        self.get(ACTIVE_PROFILES)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Command-line arguments that were not `--key[=value]` options
    pub fn non_option_args(&self) -> &[String] {
        &self.non_option_args
    }

    /// A sorted copy of every property
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Merge a JSON object into the properties, flattened to dotted keys
    ///
    /// Nested objects become `a.b`, arrays become `a[0]`, `null` is skipped.
    pub fn load_json(&self, source_name: &str, json: &str) -> Result<()> {
        let invalid = |message: String| BootcastError::InvalidPropertySource {
            source_name: source_name.to_string(),
            message,
        };
        match serde_json::from_str::<Value>(json).map_err(|e| invalid(e.to_string()))? {
            Value::Object(map) => {
                for (key, value) in map {
                    self.flatten_into(key, value);
                }
                Ok(())
            }
            other => Err(invalid(format!("expected an object, found {other}"))),
        }
    }

    fn flatten_into(&self, key: String, value: Value) {
        match value {
            Value::Null => {}
            Value::String(s) => self.set(key, s),
            Value::Object(map) => {
                for (child, value) in map {
                    self.flatten_into(format!("{key}.{child}"), value);
                }
            }
            Value::Array(items) => {
                for (index, value) in items.into_iter().enumerate() {
                    self.flatten_into(format!("{key}[{index}]"), value);
                }
            }
            scalar => self.set(key, scalar.to_string()),
        }
    }

    /// Apply `--key=value` options and return the remaining arguments
    fn apply_command_line(&self, args: &[String]) -> Vec<String> {
        let mut non_options = Vec::new();
        for arg in args {
            match arg.strip_prefix("--").filter(|opt| !opt.is_empty()) {
                Some(option) => match option.split_once('=') {
                    Some((key, value)) => self.set(key, value),
                    None => self.set(option, ""),
                },
                None => non_options.push(arg.clone()),
            }
        }
        non_options
    }

    /// Deserialize the properties under `prefix` into `T`
    ///
    /// `main.log-startup-info=false` binds to the field `log-startup-info` of
    /// the struct bound with prefix `main`. Deeper keys become nested objects.
    /// Values are parsed only as far as the target field asks: `1234` binds to
    /// a `u16` and to a `String` alike.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// #[derive(Deserialize)]
    /// #[serde(rename_all = "kebab-case")]
    /// struct ServerSettings { port: u16, bind_address: String }
    ///
    /// let settings: ServerSettings = environment.bind("server")?;
    /// ```
    pub fn bind<T: DeserializeOwned>(&self, prefix: &str) -> Result<T> {
        let mut root = Node::group();
        let lead = format!("{prefix}.");
        for (key, raw) in self.snapshot() {
            let Some(path) = key.strip_prefix(&lead) else {
                continue;
            };
            root.insert(path, raw)
                .map_err(|message| BootcastError::binding_failed(prefix, message))?;
        }
        T::deserialize(NodeDeserializer(&root))
            .map_err(|e| BootcastError::binding_failed(prefix, e))
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("properties", &self.properties.len())
            .field("profiles", &self.active_profiles())
            .field("non_option_args", &self.non_option_args)
            .finish()
    }
}
