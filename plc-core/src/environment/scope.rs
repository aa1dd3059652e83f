use std::collections::HashMap;

/// Index of a scope inside a [`Scopes`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug, Clone)]
struct Scope<V, F> {
    variables: HashMap<String, V>,
    functions: HashMap<(String, usize), F>,
    parent: Option<ScopeId>,
}

impl<V, F> Scope<V, F> {
    fn new(parent: Option<ScopeId>) -> Self {
        Self {
            variables: HashMap::new(),
            functions: HashMap::new(),
            parent,
        }
    }
}

/// Arena of lexical scopes addressed by index, with parent links instead of
/// parent pointers. The analyzer and the interpreter each own one instance,
/// instantiated with their own payloads (static bindings vs. runtime values).
///
/// Variables are keyed by name, functions by name and arity. Definition
/// overwrites an existing entry of the same key in the current scope; lookup
/// walks the parent chain outward to the root.
#[derive(Debug, Clone)]
pub struct Scopes<V, F> {
    scopes: Vec<Scope<V, F>>,
}

impl<V, F> Scopes<V, F> {
    pub fn new() -> (Self, ScopeId) {
        let scopes = Self {
            scopes: vec![Scope::new(None)],
        };

        (scopes, ScopeId(0))
    }

    pub fn child(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope::new(Some(parent)));

        ScopeId(self.scopes.len() - 1)
    }

    pub fn define_variable(&mut self, scope: ScopeId, name: String, variable: V) {
        self.scopes[scope.0].variables.insert(name, variable);
    }

    pub fn define_function(&mut self, scope: ScopeId, name: String, arity: usize, function: F) {
        self.scopes[scope.0].functions.insert((name, arity), function);
    }

    pub fn lookup_variable(&self, scope: ScopeId, name: &str) -> Option<&V> {
        let scope = self.resolve_variable(scope, name)?;

        self.scopes[scope.0].variables.get(name)
    }

    pub fn lookup_variable_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut V> {
        let scope = self.resolve_variable(scope, name)?;

        self.scopes[scope.0].variables.get_mut(name)
    }

    pub fn lookup_function(&self, scope: ScopeId, name: &str, arity: usize) -> Option<&F> {
        let mut current = Some(scope);

        while let Some(scope) = current {
            let scope = &self.scopes[scope.0];

            if let Some(function) = scope.functions.get(&(name.to_string(), arity)) {
                return Some(function);
            }

            current = scope.parent;
        }

        None
    }

    /// Finds the innermost scope on the chain that defines `name`.
    fn resolve_variable(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut current = Some(scope);

        while let Some(id) = current {
            let scope = &self.scopes[id.0];

            if scope.variables.contains_key(name) {
                return Some(id);
            }

            current = scope.parent;
        }

        None
    }
}
