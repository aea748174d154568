//! Named catalog of validated expressions.
//!
//! Entries are immutable once registered and shared as `Arc<Expression>`, so an
//! instance that is queued or playing can never observe its definition change.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::debug;

use crate::builtins;
use crate::data::Expression;
use crate::definition::parse_library_json;
use crate::error::{FaceError, FaceResult};

#[derive(Debug, Default, Clone)]
pub struct ExpressionLibrary {
    items: HashMap<String, Arc<Expression>>,
}

impl ExpressionLibrary {
    /// Library pre-populated with the built-in expressions.
    pub fn new() -> Self {
        let mut lib = Self::empty();
        for expression in builtins::all() {
            let name = expression.name.clone();
            lib.items.insert(name, Arc::new(expression));
        }
        lib
    }

    /// Library with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and add an expression. Names are never overwritten.
    pub fn register(&mut self, expression: Expression) -> FaceResult<Arc<Expression>> {
        expression.validate()?;
        if self.items.contains_key(&expression.name) {
            return Err(FaceError::DuplicateName {
                name: expression.name,
            });
        }
        debug!(name = %expression.name, keyframes = expression.keyframes.len(), "expression registered");
        let shared = Arc::new(expression);
        self.items.insert(shared.name.clone(), Arc::clone(&shared));
        Ok(shared)
    }

    pub fn get(&self, name: &str) -> FaceResult<Arc<Expression>> {
        self.items
            .get(name)
            .cloned()
            .ok_or_else(|| FaceError::not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.items.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Register every expression of a library document, in document order.
    ///
    /// Stops at the first failure; expressions registered before it are kept.
    pub fn load_json(&mut self, json: &str) -> FaceResult<Vec<String>> {
        let mut loaded = Vec::new();
        for expression in parse_library_json(json)? {
            loaded.push(self.register(expression)?.name.clone());
        }
        Ok(loaded)
    }
}
