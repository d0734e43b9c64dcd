// services/infra-dash/src/selection.rs
//
// Row selection state: multi-select for bulk actions, single detail modal

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the id is selected after the call.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }
}

/// At most one detail view open, keyed by entity id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailModal {
    open: Option<String>,
}

impl DetailModal {
    pub fn open(&mut self, id: &str) {
        self.open = Some(id.to_string());
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    pub fn current(&self) -> Option<&str> {
        self.open.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut sel = Selection::new();
        assert!(sel.toggle("disc-001"));
        assert!(sel.contains("disc-001"));
        assert!(!sel.toggle("disc-001"));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_clear_empties_selection() {
        let mut sel = Selection::new();
        sel.toggle("a");
        sel.toggle("b");
        assert_eq!(sel.len(), 2);
        sel.clear();
        assert!(sel.is_empty());
    }

    #[test]
    fn test_opening_second_detail_replaces_first() {
        let mut modal = DetailModal::default();
        modal.open("1");
        modal.open("2");
        assert_eq!(modal.current(), Some("2"));
        modal.close();
        assert!(!modal.is_open());
    }
}
