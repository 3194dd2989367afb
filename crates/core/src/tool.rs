//! Tool trait and registry — the agent's capabilities.
//!
//! Tools are registered once at process start into a typed registration
//! table keyed by name. Each tool declares a `ToolSpec` (name, description,
//! typed parameter list) that is validated at registration time, so the
//! dispatcher can bind arguments against the spec instead of reflecting
//! over handler signatures at call time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use crate::error::ToolError;

/// The accepted type of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamKind {
    /// JSON-schema type name for this kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    /// Does a JSON value satisfy this kind?
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
        }
    }
}

/// One declared tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
}

impl ParamSpec {
    pub fn required(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(name: &str, kind: ParamKind, description: &str) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
        }
    }
}

/// A tool's declared interface: unique name, description, typed parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

impl ToolSpec {
    pub fn new(name: &str, description: &str, params: Vec<ParamSpec>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params,
        }
    }

    /// Registration-time validation: non-empty name, unique parameter names.
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.name.trim().is_empty() {
            return Err(ToolError::Registration("tool name must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for p in &self.params {
            if !seen.insert(p.name.as_str()) {
                return Err(ToolError::Registration(format!(
                    "tool '{}' declares parameter '{}' twice",
                    self.name, p.name
                )));
            }
        }
        Ok(())
    }

    /// Render this spec as a JSON-schema-shaped object for the backend prompt.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.params {
            properties.insert(
                p.name.clone(),
                json!({ "type": p.kind.type_name(), "description": p.description }),
            );
            if p.required {
                required.push(Value::String(p.name.clone()));
            }
        }
        json!({
            "name": self.name,
            "description": self.description,
            "parameters": {
                "type": "object",
                "properties": properties,
                "required": required,
            }
        })
    }

    /// Bind raw JSON arguments against this spec.
    ///
    /// Checks that every required parameter is present and every supplied
    /// known parameter has the declared type. Unknown extra arguments are
    /// dropped rather than rejected. Returns the bound argument object.
    pub fn bind(&self, arguments: &Value) -> Result<Value, ToolError> {
        let empty = Map::new();
        let supplied = match arguments {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(ToolError::InvalidArguments {
                    tool_name: self.name.clone(),
                    reason: format!("expected an argument object, got {other}"),
                });
            }
        };

        let mut bound = Map::new();
        for p in &self.params {
            match supplied.get(&p.name) {
                Some(value) => {
                    if !p.kind.accepts(value) {
                        return Err(ToolError::InvalidArguments {
                            tool_name: self.name.clone(),
                            reason: format!(
                                "parameter '{}' must be a {}",
                                p.name,
                                p.kind.type_name()
                            ),
                        });
                    }
                    bound.insert(p.name.clone(), value.clone());
                }
                None if p.required => {
                    return Err(ToolError::InvalidArguments {
                        tool_name: self.name.clone(),
                        reason: format!("missing required parameter '{}'", p.name),
                    });
                }
                None => {}
            }
        }
        Ok(Value::Object(bound))
    }
}

/// The core Tool trait.
///
/// Handlers are pure functions of their bound arguments: they return a
/// text result or fail with a `ToolError`, and must not assume they run
/// on any particular thread.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The declared interface of this tool.
    fn spec(&self) -> ToolSpec;

    /// Execute with arguments already bound against `spec()`.
    async fn call(&self, arguments: Value) -> Result<String, ToolError>;
}

/// A typed registration table of tools, keyed by unique name.
///
/// Append-only: registration happens at startup and the table is immutable
/// during normal operation.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Duplicate names and malformed specs are rejected.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let spec = tool.spec();
        spec.validate()?;
        if self.tools.contains_key(&spec.name) {
            return Err(ToolError::Registration(format!(
                "tool '{}' is already registered",
                spec.name
            )));
        }
        self.tools.insert(spec.name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All tool schemas, for serializing into the backend prompt.
    /// Sorted by name so the prompt is deterministic.
    pub fn schemas(&self) -> Vec<Value> {
        let mut specs: Vec<ToolSpec> = self.tools.values().map(|t| t.spec()).collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs.iter().map(ToolSpec::schema).collect()
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
