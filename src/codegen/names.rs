use ahash::{AHashMap, AHashSet};

/// Words that cannot be used as generated identifiers in the target
/// language.
const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "let", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Assigns a unique, language-valid identifier to every node for the
/// duration of one run.
///
/// Names derive from the node's label (falling back to its type key), are
/// lower-camel-cased, and collide into a numeric suffix. The same node id
/// always maps to the same name within a run; allocation happens once in
/// topological order before dispatch so converter calls stay pure.
#[derive(Debug, Default)]
pub struct NameAllocator {
    assigned: AHashMap<String, String>,
    taken: AHashSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates (or returns the existing) identifier for `node_id`.
    pub fn allocate(&mut self, node_id: &str, hint: &str) -> &str {
        if !self.assigned.contains_key(node_id) {
            let base = sanitize(hint);
            let name = self.disambiguate(base);
            self.taken.insert(name.clone());
            self.assigned.insert(node_id.to_string(), name);
        }
        &self.assigned[node_id]
    }

    /// The identifier previously allocated for `node_id`, or the raw id as a
    /// last resort. Lookups only miss for nodes that never went through
    /// allocation, which dispatch guarantees against.
    pub fn get<'a>(&'a self, node_id: &'a str) -> &'a str {
        self.assigned.get(node_id).map(String::as_str).unwrap_or(node_id)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    fn disambiguate(&self, base: String) -> String {
        if !self.taken.contains(&base) {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{}{}", base, counter);
            if !self.taken.contains(&candidate) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Reduces an arbitrary label to a lower-camel-case identifier. Empty or
/// fully invalid hints become `node`; a leading digit gets an underscore
/// prefix; reserved words get a trailing underscore.
fn sanitize(hint: &str) -> String {
    let mut out = String::with_capacity(hint.len());
    let mut upper_next = false;
    for ch in hint.chars() {
        if ch.is_alphanumeric() {
            if upper_next && !out.is_empty() {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }

    if out.is_empty() {
        return "node".to_string();
    }
    let mut name: String = {
        let mut chars = out.chars();
        let first = chars.next().unwrap_or('n');
        first.to_lowercase().chain(chars).collect()
    };
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if RESERVED.contains(&name.as_str()) {
        name.push('_');
    }
    name
}
