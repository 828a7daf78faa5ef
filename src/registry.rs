//! Entity registry.
//!
//! At most one widget per [`EntityKey`] for the lifetime of the dashboard.
//! Entries are never expired; an entity missing from later snapshots is
//! treated as temporarily silent and keeps its widget until [`Registry::clear`].

use std::collections::HashMap;

use crate::metrics::{EntityKey, EntityKind, Resolution};
use crate::surface::Surface;
use crate::widget::{EntityWidget, Widget};

#[derive(Debug, Default)]
pub struct Registry {
    widgets: HashMap<EntityKey, EntityWidget>,
    circuit_order: Vec<EntityKey>,
    thread_pool_order: Vec<EntityKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the widget for `resolution.key`, building it with `make` if
    /// the key is new. The flag is `true` when a widget was created.
    pub fn get_or_create(
        &mut self,
        resolution: Resolution,
        make: impl FnOnce(Resolution) -> EntityWidget,
    ) -> (&mut EntityWidget, bool) {
        let key = resolution.key.clone();
        let created = !self.widgets.contains_key(&key);
        if created {
            self.order_mut(key.kind).push(key.clone());
        }
        let widget = self.widgets.entry(key).or_insert_with(|| make(resolution));
        (widget, created)
    }

    pub fn contains(&self, key: &EntityKey) -> bool {
        self.widgets.contains_key(key)
    }

    pub fn get(&self, key: &EntityKey) -> Option<&EntityWidget> {
        self.widgets.get(key)
    }

    pub fn get_mut(&mut self, key: &EntityKey) -> Option<&mut EntityWidget> {
        self.widgets.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Number of widgets of one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.order(kind).len()
    }

    /// Keys of one kind in display order.
    pub fn order(&self, kind: EntityKind) -> &[EntityKey] {
        match kind {
            EntityKind::Circuit => &self.circuit_order,
            EntityKind::ThreadPool => &self.thread_pool_order,
        }
    }

    fn order_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityKey> {
        match kind {
            EntityKind::Circuit => &mut self.circuit_order,
            EntityKind::ThreadPool => &mut self.thread_pool_order,
        }
    }

    /// Widgets of one kind in display order.
    pub fn widgets(&self, kind: EntityKind) -> Vec<&EntityWidget> {
        self.order(kind)
            .iter()
            .filter_map(|key| self.widgets.get(key))
            .collect()
    }

    /// Every registered widget, in no particular order.
    pub fn widgets_mut(&mut self) -> impl Iterator<Item = &mut EntityWidget> {
        self.widgets.values_mut()
    }

    /// Replace the display order of one kind. Keys not registered are
    /// skipped and registered keys missing from `order` are appended.
    pub fn set_order(&mut self, kind: EntityKind, order: Vec<EntityKey>) {
        let mut next: Vec<EntityKey> = order
            .into_iter()
            .filter(|k| k.kind == kind && self.widgets.contains_key(k))
            .collect();
        for key in self.order(kind) {
            if !next.contains(key) {
                next.push(key.clone());
            }
        }
        *self.order_mut(kind) = next;
    }

    /// Destroy every widget and empty the registry. Returns how many
    /// widgets were removed.
    pub fn clear(&mut self, surface: &mut dyn Surface) -> usize {
        let removed = self.widgets.len();
        for widget in self.widgets.values_mut() {
            widget.clear(surface);
        }
        self.widgets.clear();
        self.circuit_order.clear();
        self.thread_pool_order.clear();
        removed
    }
}
