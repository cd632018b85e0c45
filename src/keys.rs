use std::fmt::Display;

use crate::{
    entity::EntityKind,
    error::{RecError, RecResult},
};

/// Sets scoped to a ratable class, keyed `{kind}:{class}:{owner}`
///
/// The similarity set is the one set without a class; it has its own key
/// function so a class can never be attached to it or dropped from these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassSet {
    Liked,
    Disliked,
    Hidden,
    Bookmarked,
    LikedBy,
    DislikedBy,
    Recommended,
}

/// How a set is stored, which decides the command used to count or trim it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetShape {
    /// Sorted set (member -> score)
    Ranked,
    /// Plain set of ids
    Plain,
}

impl ClassSet {
    /// Every per-class set a rater owns
    pub const OWNED_BY_RATER: [ClassSet; 5] = [
        ClassSet::Liked,
        ClassSet::Disliked,
        ClassSet::Hidden,
        ClassSet::Bookmarked,
        ClassSet::Recommended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassSet::Liked => "liked",
            ClassSet::Disliked => "disliked",
            ClassSet::Hidden => "hidden",
            ClassSet::Bookmarked => "bookmarked",
            ClassSet::LikedBy => "liked_by",
            ClassSet::DislikedBy => "disliked_by",
            ClassSet::Recommended => "recommended",
        }
    }

    pub fn shape(&self) -> SetShape {
        match self {
            ClassSet::Recommended => SetShape::Ranked,
            _ => SetShape::Plain,
        }
    }
}

impl Display for ClassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Owner segment of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner<'a> {
    Id(&'a str),
    /// Matches every owner when used as a key pattern
    Any,
}

impl Display for Owner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::Id(id) => write!(f, "{}", id),
            Owner::Any => write!(f, "*"),
        }
    }
}

const SIMILARITY: &str = "similarity";

/// Characters the store treats specially in key patterns
const GLOB_CHARS: [char; 5] = ['*', '?', '[', ']', '\\'];

/// Maps (set kind, class, owner) to store keys
///
/// Layout, before the optional namespace prefix:
/// - `similarity:{rater}`
/// - `{liked|disliked|hidden|bookmarked|recommended}:{class}:{rater}`
/// - `{liked_by|disliked_by}:{class}:{item}`
///
/// The kind segment never contains `:` and class names are identifiers, so the
/// owner is always everything after the class segment and distinct triples never
/// collide, whatever the owner id holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySchema {
    namespace: Option<String>,
}

impl KeySchema {
    /// Prefixes every key with `{namespace}:`; an empty namespace means no prefix
    ///
    /// Glob characters are rejected since they would widen teardown patterns to
    /// keys outside the namespace.
    pub fn new(namespace: impl Into<String>) -> RecResult<Self> {
        let namespace = namespace.into();
        if namespace.contains(&GLOB_CHARS[..]) || namespace.chars().any(char::is_whitespace) {
            return Err(RecError::InvalidInput(format!(
                "namespace '{}' must not contain glob characters or whitespace",
                namespace
            )));
        }
        Ok(Self {
            namespace: (!namespace.is_empty()).then_some(namespace),
        })
    }

    fn prefixed(&self, body: String) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, body),
            None => body,
        }
    }

    /// `similarity:{owner}`
    pub fn similarity_key(&self, owner: Owner<'_>) -> String {
        self.prefixed(format!("{}:{}", SIMILARITY, owner))
    }

    /// `{kind}:{class}:{owner}`
    pub fn class_key(&self, kind: ClassSet, class: &EntityKind, owner: Owner<'_>) -> String {
        self.prefixed(format!("{}:{}:{}", kind, class.name, owner))
    }

    pub fn similarity_set(&self, rater_id: &str) -> String {
        self.similarity_key(Owner::Id(rater_id))
    }

    pub fn recommended_set(&self, class: &EntityKind, rater_id: &str) -> String {
        self.class_key(ClassSet::Recommended, class, Owner::Id(rater_id))
    }

    pub fn liked_set(&self, class: &EntityKind, rater_id: &str) -> String {
        self.class_key(ClassSet::Liked, class, Owner::Id(rater_id))
    }

    pub fn disliked_set(&self, class: &EntityKind, rater_id: &str) -> String {
        self.class_key(ClassSet::Disliked, class, Owner::Id(rater_id))
    }

    pub fn liked_by_set(&self, class: &EntityKind, item_id: &str) -> String {
        self.class_key(ClassSet::LikedBy, class, Owner::Id(item_id))
    }

    pub fn disliked_by_set(&self, class: &EntityKind, item_id: &str) -> String {
        self.class_key(ClassSet::DislikedBy, class, Owner::Id(item_id))
    }

    /// Pattern matching every rater's similarity set
    pub fn similarity_pattern(&self) -> String {
        self.similarity_key(Owner::Any)
    }

    /// Pattern matching every item's liked-by set in `class`
    pub fn liked_by_pattern(&self, class: &EntityKind) -> String {
        self.class_key(ClassSet::LikedBy, class, Owner::Any)
    }

    /// Pattern matching every item's disliked-by set in `class`
    pub fn disliked_by_pattern(&self, class: &EntityKind) -> String {
        self.class_key(ClassSet::DislikedBy, class, Owner::Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie() -> EntityKind {
        EntityKind::new("Movie", "movies").unwrap()
    }

    fn book() -> EntityKind {
        EntityKind::new("Book", "books").unwrap()
    }

    #[test]
    fn test_key_layout_without_namespace() {
        let keys = KeySchema::default();
        assert_eq!(keys.similarity_set("1"), "similarity:1");
        assert_eq!(keys.liked_set(&movie(), "1"), "liked:Movie:1");
        assert_eq!(keys.disliked_set(&movie(), "1"), "disliked:Movie:1");
        assert_eq!(keys.liked_by_set(&movie(), "10"), "liked_by:Movie:10");
        assert_eq!(keys.disliked_by_set(&movie(), "10"), "disliked_by:Movie:10");
        assert_eq!(keys.recommended_set(&movie(), "5"), "recommended:Movie:5");
        assert_eq!(
            keys.class_key(ClassSet::Hidden, &book(), Owner::Id("7")),
            "hidden:Book:7"
        );
        assert_eq!(
            keys.class_key(ClassSet::Bookmarked, &book(), Owner::Id("7")),
            "bookmarked:Book:7"
        );
    }

    #[test]
    fn test_namespace_prefix() {
        let keys = KeySchema::new("recommendable").unwrap();
        assert_eq!(keys.similarity_set("1"), "recommendable:similarity:1");
        assert_eq!(keys.similarity_pattern(), "recommendable:similarity:*");
        assert_eq!(KeySchema::new("").unwrap(), KeySchema::default());
        assert_eq!(
            KeySchema::new("app:recs").unwrap().liked_set(&movie(), "1"),
            "app:recs:liked:Movie:1"
        );
    }

    #[test]
    fn test_namespace_rejects_glob_characters() {
        for namespace in ["*", "rec*", "re?", "[ab]", "a\\b", "two words"] {
            assert!(
                matches!(KeySchema::new(namespace), Err(RecError::InvalidInput(_))),
                "{} should be rejected",
                namespace
            );
        }
    }

    #[test]
    fn test_wildcard_patterns() {
        let keys = KeySchema::default();
        assert_eq!(keys.similarity_pattern(), "similarity:*");
        assert_eq!(keys.liked_by_pattern(&movie()), "liked_by:Movie:*");
        assert_eq!(keys.disliked_by_pattern(&movie()), "disliked_by:Movie:*");
    }

    #[test]
    fn test_owner_with_colon_does_not_collide() {
        let keys = KeySchema::default();
        let a = EntityKind::new("a", "a").unwrap();
        let a_b = EntityKind::new("a_b", "a_b").unwrap();

        assert_ne!(
            keys.class_key(ClassSet::Liked, &a, Owner::Id("b:1")),
            keys.class_key(ClassSet::Liked, &a_b, Owner::Id("1"))
        );
        // a class set never shares a key with a similarity set
        assert_ne!(
            keys.class_key(ClassSet::Liked, &movie(), Owner::Id("1")),
            keys.similarity_set("liked:Movie:1")
        );
        assert_eq!(keys.similarity_set("Movie:1"), "similarity:Movie:1");
    }

    #[test]
    fn test_distinct_triples_do_not_collide() {
        let keys = KeySchema::default();
        let kinds = [
            ClassSet::Liked,
            ClassSet::Disliked,
            ClassSet::Hidden,
            ClassSet::Bookmarked,
            ClassSet::LikedBy,
            ClassSet::DislikedBy,
            ClassSet::Recommended,
        ];
        let owners = ["1", "2", "Movie:1", "1:Movie", ""];
        let mut seen = std::collections::HashSet::new();
        let mut total = 0;

        for owner in owners {
            seen.insert(keys.similarity_set(owner));
            total += 1;
            for kind in kinds {
                for class in [movie(), book()] {
                    seen.insert(keys.class_key(kind, &class, Owner::Id(owner)));
                    total += 1;
                }
            }
        }
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn test_shapes() {
        assert_eq!(ClassSet::Recommended.shape(), SetShape::Ranked);
        assert_eq!(ClassSet::LikedBy.shape(), SetShape::Plain);
        assert_eq!(ClassSet::Liked.shape(), SetShape::Plain);
    }
}
