use crate::codegen::names::NameAllocator;
use crate::ir::IRValue;
use serde::Serialize;

/// Target sub-language of the generated output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum TargetFormat {
    #[default]
    TypeScript,
    JavaScript,
}

impl TargetFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::TypeScript => "ts",
            TargetFormat::JavaScript => "js",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum QuoteStyle {
    #[default]
    Double,
    Single,
}

/// Optional output layers beyond the main implementation file.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FeatureFlags {
    pub include_tests: bool,
    pub include_docs: bool,
    pub include_observability: bool,
}

/// Per-run configuration for code generation.
///
/// A value object, not global state: it is passed by reference into every
/// converter call, and converters must be pure functions of
/// `(node, context)` with no hidden shared mutable state.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationContext {
    pub target: TargetFormat,
    pub indent_size: usize,
    pub quotes: QuoteStyle,
    pub trailing_commas: bool,
    /// Name of the exported entry-point function wired to the terminal node.
    pub entry_name: String,
    pub flags: FeatureFlags,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self {
            target: TargetFormat::default(),
            indent_size: 2,
            quotes: QuoteStyle::default(),
            trailing_commas: true,
            entry_name: "run".to_string(),
            flags: FeatureFlags::default(),
        }
    }
}

impl GenerationContext {
    pub fn indent(&self, level: usize) -> String {
        " ".repeat(self.indent_size * level)
    }

    /// Renders a string literal in the configured quote style.
    pub fn quote(&self, text: &str) -> String {
        let (quote, escaped) = match self.quotes {
            QuoteStyle::Double => ('"', text.replace('\\', "\\\\").replace('"', "\\\"")),
            QuoteStyle::Single => ('\'', text.replace('\\', "\\\\").replace('\'', "\\'")),
        };
        format!("{quote}{}{quote}", escaped.replace('\n', "\\n"))
    }
}

/// Everything a converter may consult while emitting fragments: the run
/// configuration plus read access to the pre-populated name allocator.
///
/// Names for every node are allocated before dispatch starts, so converters
/// can reference their dependencies' variables without mutating anything.
pub struct EmitContext<'a> {
    pub context: &'a GenerationContext,
    names: &'a NameAllocator,
}

impl<'a> EmitContext<'a> {
    pub fn new(context: &'a GenerationContext, names: &'a NameAllocator) -> Self {
        Self { context, names }
    }

    /// The generated variable name for a node.
    pub fn var_name<'b>(&'b self, node_id: &'b str) -> &'b str {
        self.names.get(node_id)
    }

    /// Renders a resolved input as a target-language expression: port
    /// references become the referenced node's variable, literals become
    /// style-respecting literals.
    pub fn value_expr(&self, value: &IRValue) -> String {
        match value {
            IRValue::PortRef { node_id, .. } => self.var_name(node_id).to_string(),
            IRValue::Literal(json) => self.literal_expr(json),
        }
    }

    fn literal_expr(&self, json: &serde_json::Value) -> String {
        match json {
            serde_json::Value::String(s) => self.context.quote(s),
            serde_json::Value::Null => "null".to_string(),
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|i| self.literal_expr(i)).collect();
                format!("[{}]", rendered.join(", "))
            }
            serde_json::Value::Object(map) => {
                let rendered: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", object_key(k), self.literal_expr(v)))
                    .collect();
                format!("{{ {} }}", rendered.join(", "))
            }
        }
    }

    /// Renders `new Class({ field: value, ... })`-style argument objects,
    /// multiline with the configured indent and trailing-comma setting.
    /// Field order follows the caller, which follows input insertion order.
    pub fn object_literal(&self, fields: &[(String, String)]) -> String {
        if fields.is_empty() {
            return "{}".to_string();
        }
        let indent = self.context.indent(1);
        let mut out = String::from("{\n");
        for (i, (key, value)) in fields.iter().enumerate() {
            out.push_str(&indent);
            out.push_str(&object_key(key));
            out.push_str(": ");
            out.push_str(value);
            if i + 1 < fields.len() || self.context.trailing_commas {
                out.push(',');
            }
            out.push('\n');
        }
        out.push('}');
        out
    }
}

/// Object keys that are not plain identifiers must be quoted.
fn object_key(key: &str) -> String {
    let plain = !key.is_empty()
        && key
            .chars()
            .enumerate()
            .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if plain {
        key.to_string()
    } else {
        format!("\"{}\"", key.replace('"', "\\\""))
    }
}
