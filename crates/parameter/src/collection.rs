//! An ordered, named collection of parameter schemas.

use nebula_schema::ParameterSchema;
use serde::{Deserialize, Serialize};

/// The full set of parameters a node type declares, in the order they
/// should be presented in a node's configuration UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterCollection {
    schemas: Vec<ParameterSchema>,
}

impl ParameterCollection {
    /// An empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection from a list of schemas.
    #[must_use]
    pub fn from_schemas(schemas: Vec<ParameterSchema>) -> Self {
        Self { schemas }
    }

    /// Append a schema.
    pub fn push(&mut self, schema: ParameterSchema) {
        self.schemas.push(schema);
    }

    /// Look up a schema by parameter name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    /// All schemas, in declaration order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSchema> {
        self.schemas.iter()
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the collection declares no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nebula_schema::ParameterType;

    #[test]
    fn get_by_name() {
        let mut c = ParameterCollection::new();
        c.push(ParameterSchema::new("channel", ParameterType::String));
        assert!(c.get("channel").is_some());
        assert!(c.get("missing").is_none());
    }

    #[test]
    fn len_and_empty() {
        let c = ParameterCollection::new();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
    }
}
