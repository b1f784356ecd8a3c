//! Element tree abstraction
//!
//! The motion core never owns the document. It reads a minimal description
//! of elements (tag, role, classes, cursor attributes, bounds, parent link)
//! through the [`ElementTree`] trait. Elements can disappear at any time;
//! every lookup returns `Option` and callers treat a missing element as a
//! no-op.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque element handle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub u32);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element tag, reduced to the set the classifier cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElementTag {
    /// `<a>`
    #[serde(rename = "a")]
    Anchor,
    /// `<button>`
    Button,
    /// `<input>`
    Input,
    /// `<textarea>`
    Textarea,
    /// `<select>`
    Select,
    /// `<img>`
    #[serde(rename = "img")]
    Image,
    /// `<video>`
    Video,
    /// Anything else
    #[default]
    #[serde(other)]
    Other,
}

impl std::str::FromStr for ElementTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "a" => Self::Anchor,
            "button" => Self::Button,
            "input" => Self::Input,
            "textarea" => Self::Textarea,
            "select" => Self::Select,
            "img" => Self::Image,
            "video" => Self::Video,
            _ => Self::Other,
        })
    }
}

/// What the core knows about an element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementDescriptor {
    /// Element tag
    #[serde(default)]
    pub tag: ElementTag,

    /// ARIA role attribute
    #[serde(default)]
    pub role: Option<String>,

    /// Class list
    #[serde(default)]
    pub classes: Vec<String>,

    /// Explicit cursor mode attribute (`data-cursor`)
    #[serde(default)]
    pub cursor: Option<String>,

    /// Caption attribute (`data-cursor-text`)
    #[serde(default)]
    pub cursor_text: Option<String>,

    /// Bounding rectangle in viewport coordinates
    #[serde(default)]
    pub bounds: Option<Rect>,

    /// Parent element
    #[serde(default)]
    pub parent: Option<ElementId>,
}

impl ElementDescriptor {
    /// Descriptor with just a tag
    pub fn with_tag(tag: ElementTag) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    /// Builder: set parent
    pub fn parent(mut self, parent: ElementId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Builder: add a class
    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Builder: set the cursor attribute
    pub fn cursor(mut self, mode: &str) -> Self {
        self.cursor = Some(mode.to_string());
        self
    }

    /// Builder: set the caption attribute
    pub fn cursor_text(mut self, text: &str) -> Self {
        self.cursor_text = Some(text.to_string());
        self
    }

    /// Builder: set the role attribute
    pub fn role(mut self, role: &str) -> Self {
        self.role = Some(role.to_string());
        self
    }

    /// Builder: set bounds
    pub fn bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Check for a class
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Read access to the document structure
pub trait ElementTree {
    /// Look up an element; `None` once it has been removed
    fn element(&self, id: ElementId) -> Option<&ElementDescriptor>;

    /// All currently attached elements
    fn element_ids(&self) -> Vec<ElementId>;

    /// Parent of an element
    fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.element(id).and_then(|e| e.parent)
    }
}

/// In-memory element tree
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ElementFixture>", into = "Vec<ElementFixture>")]
pub struct DocumentTree {
    elements: BTreeMap<ElementId, ElementDescriptor>,
}

/// Serialized element entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementFixture {
    /// Element handle
    pub id: ElementId,
    /// Element description
    #[serde(flatten)]
    pub element: ElementDescriptor,
}

impl From<Vec<ElementFixture>> for DocumentTree {
    fn from(fixtures: Vec<ElementFixture>) -> Self {
        Self {
            elements: fixtures.into_iter().map(|f| (f.id, f.element)).collect(),
        }
    }
}

impl From<DocumentTree> for Vec<ElementFixture> {
    fn from(tree: DocumentTree) -> Self {
        tree.elements
            .into_iter()
            .map(|(id, element)| ElementFixture { id, element })
            .collect()
    }
}

impl DocumentTree {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an element
    pub fn insert(&mut self, id: ElementId, element: ElementDescriptor) {
        self.elements.insert(id, element);
    }

    /// Detach an element
    pub fn remove(&mut self, id: ElementId) -> Option<ElementDescriptor> {
        self.elements.remove(&id)
    }

    /// Number of attached elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Tree has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementTree for DocumentTree {
    fn element(&self, id: ElementId) -> Option<&ElementDescriptor> {
        self.elements.get(&id)
    }

    fn element_ids(&self) -> Vec<ElementId> {
        self.elements.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_from_str() {
        assert_eq!("BUTTON".parse::<ElementTag>().unwrap(), ElementTag::Button);
        assert_eq!("a".parse::<ElementTag>().unwrap(), ElementTag::Anchor);
        assert_eq!("span".parse::<ElementTag>().unwrap(), ElementTag::Other);
    }

    #[test]
    fn test_parent_lookup() {
        let mut tree = DocumentTree::new();
        tree.insert(ElementId(1), ElementDescriptor::default());
        tree.insert(
            ElementId(2),
            ElementDescriptor::with_tag(ElementTag::Button).parent(ElementId(1)),
        );
        assert_eq!(tree.parent(ElementId(2)), Some(ElementId(1)));
        assert_eq!(tree.parent(ElementId(1)), None);
    }

    #[test]
    fn test_removed_element_is_none() {
        let mut tree = DocumentTree::new();
        tree.insert(ElementId(7), ElementDescriptor::default());
        tree.remove(ElementId(7));
        assert!(tree.element(ElementId(7)).is_none());
        assert!(tree.parent(ElementId(7)).is_none());
    }

    #[test]
    fn test_fixture_deserialize() {
        let json = r#"[
            {"id": 1, "tag": "section"},
            {"id": 2, "tag": "a", "parent": 1, "cursor_text": "Open"}
        ]"#;
        let tree: DocumentTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.len(), 2);
        let link = tree.element(ElementId(2)).unwrap();
        assert_eq!(link.tag, ElementTag::Anchor);
        assert_eq!(link.cursor_text.as_deref(), Some("Open"));
        assert_eq!(tree.element(ElementId(1)).unwrap().tag, ElementTag::Other);
    }
}
