//! Typed descriptions of host-facing nodes.

use serde::Serialize;
use serde_json::Value;

/// Category every node is listed under.
pub const NODE_CATEGORY: &str = "WorldLabs";

/// Value type accepted by a node input or produced by an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueKind {
    Image,
    String,
    Int,
    Boolean,
    /// One of a fixed set of strings.
    Choice,
    /// A generated world payload.
    WorldlabsWorld,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInput {
    pub name: &'static str,
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
    pub multiline: bool,
    pub optional: bool,
}

impl NodeInput {
    pub fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            min: None,
            max: None,
            step: None,
            choices: Vec::new(),
            multiline: false,
            optional: false,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn range(mut self, min: i64, max: i64, step: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn choices(mut self, choices: impl IntoIterator<Item = &'static str>) -> Self {
        self.choices = choices.into_iter().collect();
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOutput {
    pub name: &'static str,
    pub kind: ValueKind,
}

impl NodeOutput {
    pub fn new(name: &'static str, kind: ValueKind) -> Self {
        Self { name, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub inputs: Vec<NodeInput>,
    pub outputs: Vec<NodeOutput>,
    /// Produces side effects (files) rather than only values.
    pub output_node: bool,
}

impl NodeDescriptor {
    pub fn input(&self, name: &str) -> Option<&NodeInput> {
        self.inputs.iter().find(|i| i.name == name)
    }
}
