use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{RecError, RecResult};

/// A kind of record held by the record store: the rater kind or a ratable class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKind {
    /// Segment used in store keys for class-scoped sets (e.g. "Movie")
    pub name: String,
    /// Backing table, optionally schema-qualified
    pub table: String,
    /// Primary key column
    pub id_column: String,
}

impl EntityKind {
    /// Creates a kind whose records live in `table` keyed by `id`
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> RecResult<Self> {
        let kind = Self {
            name: name.into(),
            table: table.into(),
            id_column: "id".to_string(),
        };
        kind.validate()?;
        Ok(kind)
    }

    /// Overrides the primary key column
    pub fn with_id_column(mut self, column: impl Into<String>) -> RecResult<Self> {
        self.id_column = column.into();
        self.validate()?;
        Ok(self)
    }

    /// Parses a `Name` or `Name=table` descriptor
    ///
    /// A bare name uses itself as the table.
    pub fn parse(descriptor: &str) -> RecResult<Self> {
        let descriptor = descriptor.trim();
        match descriptor.split_once('=') {
            Some((name, table)) => Self::new(name.trim(), table.trim()),
            None => Self::new(descriptor, descriptor),
        }
    }

    fn validate(&self) -> RecResult<()> {
        if !is_identifier(&self.name) {
            return Err(RecError::InvalidInput(format!(
                "entity name '{}' must be an identifier",
                self.name
            )));
        }
        if !self.table.split('.').all(is_identifier) || self.table.matches('.').count() > 1 {
            return Err(RecError::InvalidInput(format!(
                "table '{}' must be an identifier or schema.table",
                self.table
            )));
        }
        if !is_identifier(&self.id_column) {
            return Err(RecError::InvalidInput(format!(
                "id column '{}' must be an identifier",
                self.id_column
            )));
        }
        Ok(())
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// The host-registered ratable classes, in registration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassRegistry {
    classes: Vec<EntityKind>,
}

impl ClassRegistry {
    /// Builds a registry, dropping later duplicates of the same class name
    pub fn new(classes: impl IntoIterator<Item = EntityKind>) -> Self {
        let mut registry = Self::default();
        for class in classes {
            registry.register(class);
        }
        registry
    }

    /// Adds a class unless one with the same name is already registered
    pub fn register(&mut self, class: EntityKind) {
        if !self.classes.iter().any(|c| c.name == class.name) {
            self.classes.push(class);
        }
    }

    /// Looks up a class by its name
    pub fn get(&self, name: &str) -> RecResult<&EntityKind> {
        self.classes
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| RecError::UnknownClass(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityKind> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Window applied to a ranked sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// First `limit` entries only
    pub fn first(limit: usize) -> Self {
        Self::new(limit, 0)
    }

    /// Applies the window; running past the end yields a short or empty result
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}
