//! Lexically scoped registry of common-table-expression definitions.
//!
//! A registry lives for exactly one extraction. Scopes form a tree that
//! mirrors the nesting of query blocks; lookups walk from the current scope
//! towards the root, so an inner definition shadows an outer one with the
//! same name only inside the block that introduces it.

use indexmap::IndexMap;

/// Text of a `CTE_DEF` list whose definitions may refer to themselves
/// (`WITH RECURSIVE`)
pub const RECURSIVE_MARKER: &str = "RECURSIVE";

/// Handle to a scope inside one [`CteRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope<'a, N> {
    parent: Option<ScopeId>,
    definitions: IndexMap<String, &'a N>,
}

/// CTE definitions seen so far in one traversal.
#[derive(Debug)]
pub struct CteRegistry<'a, N> {
    scopes: Vec<Scope<'a, N>>,
}

impl<'a, N> CteRegistry<'a, N> {
    /// Create a registry holding only the root scope
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                parent: None,
                definitions: IndexMap::new(),
            }],
        }
    }

    /// The outermost scope
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Open a scope nested inside `parent`
    pub fn open_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope {
            parent: Some(parent),
            definitions: IndexMap::new(),
        });
        ScopeId(self.scopes.len() - 1)
    }

    /// Bind `name` to `subtree` in `scope`, replacing an earlier binding of
    /// the same name in that scope.
    pub fn define(&mut self, name: &str, subtree: &'a N, scope: ScopeId) {
        self.scopes[scope.0]
            .definitions
            .insert(normalize(name), subtree);
    }

    /// Innermost definition of `name` visible from `scope`
    pub fn resolve(&self, name: &str, scope: ScopeId) -> Option<&'a N> {
        let key = normalize(name);
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = &self.scopes[id.0];
            if let Some(subtree) = frame.definitions.get(&key) {
                return Some(*subtree);
            }
            current = frame.parent;
        }
        None
    }

    /// True when `name` resolves from `scope`
    pub fn is_defined(&self, name: &str, scope: ScopeId) -> bool {
        self.resolve(name, scope).is_some()
    }

    /// Scope that `scope` was opened in; `None` for the root
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }
}

impl<N> Default for CteRegistry<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

// Hive and Spark resolve CTE names without regard to ASCII case.
fn normalize(name: &str) -> String {
    name.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_in_defining_scope() {
        let body = "body";
        let mut registry = CteRegistry::new();
        let root = registry.root();
        registry.define("cte", &body, root);
        assert_eq!(registry.resolve("cte", root), Some(&body));
        assert!(registry.resolve("other", root).is_none());
    }

    #[test]
    fn test_inner_scope_sees_outer_definition() {
        let body = "outer";
        let mut registry = CteRegistry::new();
        let root = registry.root();
        registry.define("cte", &body, root);
        let inner = registry.open_scope(root);
        assert_eq!(registry.resolve("cte", inner), Some(&body));
    }

    #[test]
    fn test_inner_definition_shadows_outer() {
        let outer_body = "outer";
        let inner_body = "inner";
        let mut registry = CteRegistry::new();
        let root = registry.root();
        registry.define("cte", &outer_body, root);
        let inner = registry.open_scope(root);
        registry.define("cte", &inner_body, inner);
        let sibling = registry.open_scope(root);

        assert_eq!(registry.resolve("cte", inner), Some(&inner_body));
        assert_eq!(registry.resolve("cte", sibling), Some(&outer_body));
        assert_eq!(registry.resolve("cte", root), Some(&outer_body));
    }

    #[test]
    fn test_outer_scope_does_not_see_inner_definition() {
        let body = "inner";
        let mut registry = CteRegistry::new();
        let root = registry.root();
        let inner = registry.open_scope(root);
        registry.define("cte", &body, inner);
        assert!(!registry.is_defined("cte", root));
        assert!(registry.is_defined("cte", inner));
    }

    #[test]
    fn test_lookup_ignores_ascii_case() {
        let body = "body";
        let mut registry = CteRegistry::new();
        let root = registry.root();
        registry.define("Recent_Orders", &body, root);
        assert!(registry.is_defined("recent_orders", root));
        assert!(registry.is_defined("RECENT_ORDERS", root));
    }

    #[test]
    fn test_redefinition_in_same_scope_replaces() {
        let first = "first";
        let second = "second";
        let mut registry = CteRegistry::new();
        let root = registry.root();
        registry.define("cte", &first, root);
        registry.define("cte", &second, root);
        assert_eq!(registry.resolve("cte", root), Some(&second));
    }

    #[test]
    fn test_parent_links() {
        let mut registry: CteRegistry<'_, ()> = CteRegistry::default();
        let root = registry.root();
        let inner = registry.open_scope(root);
        let innermost = registry.open_scope(inner);
        assert_eq!(registry.parent(innermost), Some(inner));
        assert_eq!(registry.parent(inner), Some(root));
        assert_eq!(registry.parent(root), None);
    }
}
