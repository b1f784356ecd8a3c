//! Interaction Classifier
//!
//! Decides which [`CursorMode`] applies to the element under the pointer.
//!
//! # Resolution order
//!
//! For each element, first match wins:
//!
//! 1. explicit `data-cursor` attribute, parsed into a [`CursorMode`]
//! 2. tag heuristics (`button`, `a`, `input`/`textarea`, `select`)
//! 3. ARIA role (`button`, `link`, `textbox`, `slider`)
//! 4. known interactive classes (built-in table plus configured rules)
//!
//! # Registry and rescan
//!
//! Only elements found by the last scan take part in hover classification.
//! Scans run at mount and then on a bounded interval, so elements inserted
//! after a scan stay `default` until the next one. A missed element only
//! costs a visual affordance.
//!
//! # Transitions
//!
//! The state machine advances only on pointer-over events. Hovering the
//! element that is already hovered produces no transition.

use crate::cursor::preset::CursorMode;
use crate::dom::{ElementDescriptor, ElementId, ElementTag, ElementTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Built-in class lookup table
const CLASS_MODES: &[(&str, CursorMode)] = &[
    ("magnetic", CursorMode::Magnetic),
    ("cursor-magnetic", CursorMode::Magnetic),
    ("cursor-view", CursorMode::View),
    ("gallery-item", CursorMode::View),
    ("video-thumb", CursorMode::View),
    ("draggable", CursorMode::Drag),
    ("carousel", CursorMode::Drag),
    ("swiper", CursorMode::Drag),
    ("btn", CursorMode::Button),
    ("cta", CursorMode::Button),
    ("card", CursorMode::Hover),
    ("nav-link", CursorMode::Hover),
];

/// Extra class → mode rule supplied through configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRule {
    /// Class name to match
    pub class: String,
    /// Mode applied on match
    pub mode: CursorMode,
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Maximum number of ancestors examined per hover
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Interval between registry rescans (ms)
    #[serde(default = "default_rescan_interval_ms")]
    pub rescan_interval_ms: u64,

    /// Additional class rules, checked before the built-in table
    #[serde(default)]
    pub class_rules: Vec<ClassRule>,
}

fn default_max_depth() -> usize {
    8
}
fn default_rescan_interval_ms() -> u64 {
    3000
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            rescan_interval_ms: default_rescan_interval_ms(),
            class_rules: Vec::new(),
        }
    }
}

/// Mode plus optional caption for one element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    /// Cursor mode
    pub mode: CursorMode,
    /// Caption text
    pub caption: Option<String>,
}

/// Emitted when the active classification changes
#[derive(Debug, Clone, PartialEq)]
pub struct ModeTransition {
    /// Previous mode
    pub from: CursorMode,
    /// New mode
    pub to: CursorMode,
    /// New caption
    pub caption: Option<String>,
    /// Element that caused the transition
    pub element: Option<ElementId>,
}

/// Result of a registry scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Interactive elements registered
    pub registered: usize,
    /// Newly registered since the previous scan
    pub added: usize,
    /// Dropped since the previous scan
    pub removed: usize,
}

/// Classify a single element, ignoring its ancestors
pub fn classify_element(
    element: &ElementDescriptor,
    class_rules: &[ClassRule],
) -> Option<Classification> {
    let caption = element.cursor_text.clone();

    if let Some(attr) = &element.cursor {
        match attr.parse::<CursorMode>() {
            Ok(mode) => return Some(Classification { mode, caption }),
            Err(e) => trace!("Ignoring cursor attribute: {}", e),
        }
    }

    let by_tag = match element.tag {
        ElementTag::Button => Some(CursorMode::Button),
        ElementTag::Anchor | ElementTag::Select => Some(CursorMode::Hover),
        ElementTag::Input | ElementTag::Textarea => Some(CursorMode::Text),
        ElementTag::Image | ElementTag::Video | ElementTag::Other => None,
    };
    if let Some(mode) = by_tag {
        return Some(Classification { mode, caption });
    }

    let by_role = element.role.as_deref().and_then(|role| match role {
        "button" => Some(CursorMode::Button),
        "link" | "tab" | "menuitem" => Some(CursorMode::Hover),
        "textbox" | "searchbox" => Some(CursorMode::Text),
        "slider" => Some(CursorMode::Drag),
        _ => None,
    });
    if let Some(mode) = by_role {
        return Some(Classification { mode, caption });
    }

    let by_class = class_rules
        .iter()
        .find(|rule| element.has_class(&rule.class))
        .map(|rule| rule.mode)
        .or_else(|| {
            CLASS_MODES
                .iter()
                .find(|(class, _)| element.has_class(class))
                .map(|(_, mode)| *mode)
        });

    by_class.map(|mode| Classification { mode, caption })
}

/// Interaction classifier
pub struct InteractionClassifier {
    config: ClassifierConfig,

    /// Interactive elements found by the last scan
    registry: HashMap<ElementId, Classification>,

    /// Registered element currently under the pointer
    hovered: Option<ElementId>,

    /// Active classification
    current: Classification,

    /// Time of the last scan (ms)
    last_scan_ms: Option<f64>,

    transitions: u64,
    scans: u64,
}

impl InteractionClassifier {
    /// Create a classifier with an empty registry
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            registry: HashMap::new(),
            hovered: None,
            current: Classification::default(),
            last_scan_ms: None,
            transitions: 0,
            scans: 0,
        }
    }

    /// Rebuild the registry from the document
    ///
    /// If the hovered element disappeared, the mode falls back to default
    /// and the transition is returned.
    pub fn scan(
        &mut self,
        tree: &dyn ElementTree,
        now_ms: f64,
    ) -> (ScanReport, Option<ModeTransition>) {
        let mut registry = HashMap::new();
        for id in tree.element_ids() {
            if let Some(classification) = tree
                .element(id)
                .and_then(|e| classify_element(e, &self.config.class_rules))
            {
                registry.insert(id, classification);
            }
        }

        let added = registry
            .keys()
            .filter(|id| !self.registry.contains_key(id))
            .count();
        let removed = self
            .registry
            .keys()
            .filter(|id| !registry.contains_key(id))
            .count();

        self.registry = registry;
        self.last_scan_ms = Some(now_ms);
        self.scans += 1;

        let report = ScanReport {
            registered: self.registry.len(),
            added,
            removed,
        };
        debug!(
            "Classifier scan: {} registered (+{}, -{})",
            report.registered, report.added, report.removed
        );

        let transition = match self.hovered {
            Some(id) if !self.registry.contains_key(&id) => {
                self.hovered = None;
                self.apply(Classification::default(), None)
            }
            _ => None,
        };

        (report, transition)
    }

    /// Is a rescan due at `now_ms`
    pub fn rescan_due(&self, now_ms: f64) -> bool {
        match self.last_scan_ms {
            None => true,
            Some(last) => now_ms - last >= self.config.rescan_interval_ms as f64,
        }
    }

    /// Scan only if the rescan interval elapsed
    pub fn poll_rescan(
        &mut self,
        tree: &dyn ElementTree,
        now_ms: f64,
    ) -> Option<(ScanReport, Option<ModeTransition>)> {
        if self.rescan_due(now_ms) {
            Some(self.scan(tree, now_ms))
        } else {
            None
        }
    }

    /// Pointer entered `target`
    pub fn pointer_over(
        &mut self,
        target: ElementId,
        tree: &dyn ElementTree,
    ) -> Option<ModeTransition> {
        // Target removed between the event and now
        tree.element(target)?;

        let hovered = self.find_registered_ancestor(target, tree);
        if hovered == self.hovered {
            return None;
        }
        self.hovered = hovered;

        let classification = hovered
            .and_then(|id| self.registry.get(&id).cloned())
            .unwrap_or_default();
        self.apply(classification, hovered)
    }

    /// Pointer left the viewport
    pub fn pointer_left_viewport(&mut self) -> Option<ModeTransition> {
        self.hovered = None;
        self.apply(Classification::default(), None)
    }

    fn find_registered_ancestor(
        &self,
        target: ElementId,
        tree: &dyn ElementTree,
    ) -> Option<ElementId> {
        let mut current = Some(target);
        for _ in 0..=self.config.max_depth {
            let id = current?;
            if self.registry.contains_key(&id) {
                return Some(id);
            }
            current = tree.parent(id);
        }
        None
    }

    fn apply(
        &mut self,
        classification: Classification,
        element: Option<ElementId>,
    ) -> Option<ModeTransition> {
        if classification == self.current {
            return None;
        }

        let transition = ModeTransition {
            from: self.current.mode,
            to: classification.mode,
            caption: classification.caption.clone(),
            element,
        };
        debug!(
            "Cursor mode changed: {:?} -> {:?} (element={:?})",
            transition.from, transition.to, element
        );

        self.current = classification;
        self.transitions += 1;
        Some(transition)
    }

    /// Active mode
    pub fn mode(&self) -> CursorMode {
        self.current.mode
    }

    /// Active caption
    pub fn caption(&self) -> Option<&str> {
        self.current.caption.as_deref()
    }

    /// Registered element under the pointer
    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Number of registered elements
    pub fn registered(&self) -> usize {
        self.registry.len()
    }

    /// Number of transitions so far
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Number of scans so far
    pub fn scans(&self) -> u64 {
        self.scans
    }

    /// Configured rescan interval (ms)
    pub fn rescan_interval_ms(&self) -> u64 {
        self.config.rescan_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentTree;

    fn page() -> DocumentTree {
        let mut tree = DocumentTree::new();
        tree.insert(ElementId(1), ElementDescriptor::default());
        tree.insert(
            ElementId(2),
            ElementDescriptor::with_tag(ElementTag::Button).parent(ElementId(1)),
        );
        // Span inside the button
        tree.insert(ElementId(3), ElementDescriptor::default().parent(ElementId(2)));
        tree.insert(
            ElementId(4),
            ElementDescriptor::default()
                .parent(ElementId(1))
                .cursor("view")
                .cursor_text("Open"),
        );
        tree.insert(
            ElementId(5),
            ElementDescriptor::with_tag(ElementTag::Textarea).parent(ElementId(1)),
        );
        tree
    }

    fn classifier(tree: &DocumentTree) -> InteractionClassifier {
        let mut classifier = InteractionClassifier::new(ClassifierConfig::default());
        classifier.scan(tree, 0.0);
        classifier
    }

    #[test]
    fn test_attribute_wins_over_tag() {
        let el = ElementDescriptor::with_tag(ElementTag::Button).cursor("drag");
        let c = classify_element(&el, &[]).unwrap();
        assert_eq!(c.mode, CursorMode::Drag);
    }

    #[test]
    fn test_unknown_attribute_falls_back_to_tag() {
        let el = ElementDescriptor::with_tag(ElementTag::Anchor).cursor("sparkle");
        assert_eq!(classify_element(&el, &[]).unwrap().mode, CursorMode::Hover);
    }

    #[test]
    fn test_role_and_class_heuristics() {
        let role = ElementDescriptor::default().role("button");
        assert_eq!(classify_element(&role, &[]).unwrap().mode, CursorMode::Button);

        let class = ElementDescriptor::default().class("carousel");
        assert_eq!(classify_element(&class, &[]).unwrap().mode, CursorMode::Drag);

        let plain = ElementDescriptor::default().class("hero");
        assert!(classify_element(&plain, &[]).is_none());
    }

    #[test]
    fn test_configured_rule_checked_first() {
        let rules = vec![ClassRule {
            class: "card".to_string(),
            mode: CursorMode::View,
        }];
        let el = ElementDescriptor::default().class("card");
        assert_eq!(classify_element(&el, &rules).unwrap().mode, CursorMode::View);
    }

    #[test]
    fn test_hover_walks_ancestors() {
        let tree = page();
        let mut classifier = classifier(&tree);
        let transition = classifier.pointer_over(ElementId(3), &tree).unwrap();
        assert_eq!(transition.to, CursorMode::Button);
        assert_eq!(transition.element, Some(ElementId(2)));
    }

    #[test]
    fn test_hovering_same_element_is_idempotent() {
        let tree = page();
        let mut classifier = classifier(&tree);
        assert!(classifier.pointer_over(ElementId(4), &tree).is_some());
        assert!(classifier.pointer_over(ElementId(4), &tree).is_none());
        assert_eq!(classifier.mode(), CursorMode::View);
        assert_eq!(classifier.caption(), Some("Open"));
        assert_eq!(classifier.transitions(), 1);
    }

    #[test]
    fn test_leave_and_reenter_is_deterministic() {
        let tree = page();
        let mut classifier = classifier(&tree);
        let first = classifier.pointer_over(ElementId(5), &tree).unwrap();
        let leave = classifier.pointer_over(ElementId(1), &tree).unwrap();
        assert_eq!(leave.to, CursorMode::Default);
        let second = classifier.pointer_over(ElementId(5), &tree).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_removed_target_is_noop() {
        let mut tree = page();
        let mut classifier = classifier(&tree);
        tree.remove(ElementId(4));
        assert!(classifier.pointer_over(ElementId(4), &tree).is_none());
        assert_eq!(classifier.mode(), CursorMode::Default);
    }

    #[test]
    fn test_unscanned_element_stays_default_until_rescan() {
        let mut tree = page();
        let mut classifier = classifier(&tree);
        tree.insert(
            ElementId(9),
            ElementDescriptor::with_tag(ElementTag::Button).parent(ElementId(1)),
        );
        assert!(classifier.pointer_over(ElementId(9), &tree).is_none());
        assert_eq!(classifier.mode(), CursorMode::Default);

        assert!(!classifier.rescan_due(1000.0));
        let (report, _) = classifier.poll_rescan(&tree, 3000.0).unwrap();
        assert_eq!(report.added, 1);

        classifier.pointer_over(ElementId(1), &tree);
        let transition = classifier.pointer_over(ElementId(9), &tree).unwrap();
        assert_eq!(transition.to, CursorMode::Button);
    }

    #[test]
    fn test_rescan_drops_detached_hovered_element() {
        let mut tree = page();
        let mut classifier = classifier(&tree);
        classifier.pointer_over(ElementId(2), &tree);
        tree.remove(ElementId(2));
        let (report, transition) = classifier.scan(&tree, 5000.0);
        assert_eq!(report.removed, 1);
        assert_eq!(transition.unwrap().to, CursorMode::Default);
        assert!(classifier.hovered().is_none());
    }

    #[test]
    fn test_depth_bound() {
        let mut tree = DocumentTree::new();
        tree.insert(ElementId(0), ElementDescriptor::with_tag(ElementTag::Button));
        for i in 1..20 {
            tree.insert(ElementId(i), ElementDescriptor::default().parent(ElementId(i - 1)));
        }
        let mut classifier = InteractionClassifier::new(ClassifierConfig {
            max_depth: 4,
            ..Default::default()
        });
        classifier.scan(&tree, 0.0);
        assert!(classifier.pointer_over(ElementId(19), &tree).is_none());
        assert!(classifier.pointer_over(ElementId(3), &tree).is_some());
    }
}
