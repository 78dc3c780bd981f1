//! Board descriptors and the debug tool entries stored inside them.
//!
//! A board manifest is kept as a JSON object so sections this crate does not
//! model survive untouched. Debug tools live under `debug.tools.<name>` with
//! the shape `{"server": {"package"?, "executable", "arguments"}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::template::CommandTemplate;
use crate::{Error, Result};

/// Server half of a debug tool entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugServer {
    /// Package that provides the executable, for locally installed tools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Argument list in positional order.
    pub arguments: CommandTemplate,
    /// Executable to launch.
    pub executable: String,
    /// Server fields this crate does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A debug tool entry in a board manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugTool {
    /// How to start the debug server.
    pub server: DebugServer,
    /// Tool fields next to `server` (e.g. `port`, `init_cmds`), kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DebugTool {
    /// Tool launched from an installed package.
    #[must_use]
    pub fn packaged(
        package: impl Into<String>,
        executable: impl Into<String>,
        arguments: CommandTemplate,
    ) -> Self {
        Self {
            server: DebugServer {
                package: Some(package.into()),
                arguments,
                executable: executable.into(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Tool launched from an executable already on `PATH` (e.g. a container runtime).
    #[must_use]
    pub fn external(executable: impl Into<String>, arguments: CommandTemplate) -> Self {
        Self {
            server: DebugServer {
                package: None,
                arguments,
                executable: executable.into(),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

/// Metadata for one supported board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDescriptor {
    id: String,
    manifest: Map<String, Value>,
}

impl BoardDescriptor {
    /// Create a descriptor from a manifest object.
    #[must_use]
    pub fn new(id: impl Into<String>, manifest: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            manifest,
        }
    }

    /// Create a descriptor from any JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if `value` is not a JSON object.
    pub fn from_value(id: impl Into<String>, value: Value) -> Result<Self> {
        let id = id.into();
        match value {
            Value::Object(manifest) => Ok(Self { id, manifest }),
            other => Err(Error::invalid_manifest(
                id,
                format!("expected a JSON object, found {}", kind(&other)),
            )),
        }
    }

    /// Board id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw manifest.
    #[must_use]
    pub fn manifest(&self) -> &Map<String, Value> {
        &self.manifest
    }

    /// Look up a dotted path such as `build.mabi`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = self.manifest.get(parts.next()?)?;
        parts.try_fold(first, |value, key| value.as_object()?.get(key))
    }

    /// Look up a dotted path that must hold a string, if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if the value is not a string.
    pub fn get_str(&self, path: &str) -> Result<Option<&str>> {
        match self.get(path) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.wrong_type(path, "a string", other)),
        }
    }

    /// Look up a dotted path that must hold a list of strings, if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if the value is not a list of strings.
    pub fn get_str_list(&self, path: &str) -> Result<Option<Vec<String>>> {
        let items = match self.get(path) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => return Err(self.wrong_type(path, "a list of strings", other)),
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.wrong_type(path, "a list of strings", other)),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Names of the debug tools currently configured, in manifest order.
    #[must_use]
    pub fn debug_tool_names(&self) -> Vec<String> {
        self.get("debug.tools")
            .and_then(Value::as_object)
            .map(|tools| tools.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Parse the debug tool called `name`, if configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if the entry does not have the
    /// debug tool shape.
    pub fn debug_tool(&self, name: &str) -> Result<Option<DebugTool>> {
        let Some(value) = self.get("debug.tools").and_then(|t| t.get(name)) else {
            return Ok(None);
        };
        DebugTool::deserialize(value).map(Some).map_err(|e| {
            Error::invalid_manifest(&self.id, format!("debug tool '{name}': {e}"))
        })
    }

    /// Insert or replace the debug tool called `name`.
    ///
    /// Creates the `debug` and `debug.tools` sections when missing. Other tools
    /// are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if `debug` or `debug.tools` exists
    /// but is not an object.
    pub fn set_debug_tool(&mut self, name: &str, tool: &DebugTool) -> Result<()> {
        let value = serde_json::to_value(tool)?;
        self.debug_tools_mut()?.insert(name.to_string(), value);
        Ok(())
    }

    /// The `debug.tools` object, created on demand.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidManifest`] if `debug` or `debug.tools` exists
    /// but is not an object.
    pub fn debug_tools_mut(&mut self) -> Result<&mut Map<String, Value>> {
        let debug = object_entry(&mut self.manifest, "debug")
            .ok_or_else(|| Error::invalid_manifest(&self.id, "'debug' is not an object"))?;
        object_entry(debug, "tools")
            .ok_or_else(|| Error::invalid_manifest(&self.id, "'debug.tools' is not an object"))
    }

    /// Consume the descriptor, returning the manifest as a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.manifest)
    }

    fn wrong_type(&self, path: &str, expected: &str, found: &Value) -> Error {
        Error::invalid_manifest(
            &self.id,
            format!("'{path}' must be {expected}, found {}", kind(found)),
        )
    }
}

/// Get `map[key]` as an object, inserting an empty one when absent.
///
/// Returns `None` when the existing value is not an object.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    map.entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
