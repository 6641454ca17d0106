use serde::Serialize;

/// A structured import payload.
///
/// Imports carry their module and symbols as data rather than rendered text
/// so the assembler can merge them without re-parsing strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSpec {
    pub module: String,
    pub symbols: Vec<String>,
    pub default_symbol: Option<String>,
}

impl ImportSpec {
    pub fn named(module: impl Into<String>, symbols: &[&str]) -> Self {
        Self {
            module: module.into(),
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            default_symbol: None,
        }
    }

    pub fn default_import(module: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
            default_symbol: Some(symbol.into()),
        }
    }
}

/// What a fragment contributes to the assembled file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FragmentKind {
    Import(ImportSpec),
    Declaration,
    Initialization,
    Export,
}

/// A unit of generated code attributable to one node.
///
/// Emitted once per node and never mutated; the assembler only reads and
/// concatenates. `ordering_key` breaks ties deterministically and defaults
/// to the owning node's id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeFragment {
    pub kind: FragmentKind,
    pub content: String,
    pub owner_node_id: String,
    pub ordering_key: String,
}

impl CodeFragment {
    pub fn import(owner: impl Into<String>, spec: ImportSpec) -> Self {
        let owner = owner.into();
        Self {
            kind: FragmentKind::Import(spec),
            content: String::new(),
            ordering_key: owner.clone(),
            owner_node_id: owner,
        }
    }

    pub fn declaration(owner: impl Into<String>, content: impl Into<String>) -> Self {
        let owner = owner.into();
        Self {
            kind: FragmentKind::Declaration,
            content: content.into(),
            ordering_key: owner.clone(),
            owner_node_id: owner,
        }
    }

    pub fn initialization(owner: impl Into<String>, content: impl Into<String>) -> Self {
        let owner = owner.into();
        Self {
            kind: FragmentKind::Initialization,
            content: content.into(),
            ordering_key: owner.clone(),
            owner_node_id: owner,
        }
    }

    pub fn export(owner: impl Into<String>, content: impl Into<String>) -> Self {
        let owner = owner.into();
        Self {
            kind: FragmentKind::Export,
            content: content.into(),
            ordering_key: owner.clone(),
            owner_node_id: owner,
        }
    }
}

/// Which logical output a generated file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FileKind {
    Implementation,
    Types,
    Tests,
    Docs,
}

/// One logical file of the in-memory output set. Writing to disk belongs to
/// external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFile {
    pub path: String,
    pub content: String,
    pub kind: FileKind,
}
