//! In-memory retained surface.

use serde::Serialize;

use super::{Circle, DataTable, Surface};
use crate::metrics::{EntityKey, EntityKind, SparklinePath};

/// Everything drawn for one widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    pub key: EntityKey,
    pub title: String,
    pub circle: Option<Circle>,
    pub table: DataTable,
    pub sparkline: Option<SparklinePath>,
}

impl Tile {
    fn new(key: EntityKey, title: String) -> Self {
        Self {
            key,
            title,
            circle: None,
            table: DataTable::default(),
            sparkline: None,
        }
    }
}

/// Keeps the latest drawing state of every tile, one ordered region per
/// entity kind. The terminal UI reads it on every frame.
#[derive(Debug, Clone, Default)]
pub struct TileBoard {
    container: Option<String>,
    circuits: Vec<Tile>,
    thread_pools: Vec<Tile>,
}

impl TileBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The container the root was created in, if any.
    pub fn container(&self) -> Option<&str> {
        self.container.as_deref()
    }

    /// Tiles of one region in display order.
    pub fn tiles(&self, kind: EntityKind) -> &[Tile] {
        match kind {
            EntityKind::Circuit => &self.circuits,
            EntityKind::ThreadPool => &self.thread_pools,
        }
    }

    pub fn tile(&self, key: &EntityKey) -> Option<&Tile> {
        self.tiles(key.kind).iter().find(|t| &t.key == key)
    }

    /// Total number of tiles across regions.
    pub fn len(&self) -> usize {
        self.circuits.len() + self.thread_pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn region_mut(&mut self, kind: EntityKind) -> &mut Vec<Tile> {
        match kind {
            EntityKind::Circuit => &mut self.circuits,
            EntityKind::ThreadPool => &mut self.thread_pools,
        }
    }

    fn tile_mut(&mut self, key: &EntityKey) -> Option<&mut Tile> {
        self.region_mut(key.kind).iter_mut().find(|t| &t.key == key)
    }
}

impl Surface for TileBoard {
    fn create_root(&mut self, container: &str) {
        self.container = Some(container.to_string());
        self.circuits.clear();
        self.thread_pools.clear();
    }

    fn create_tile(&mut self, key: &EntityKey, title: &str) {
        if self.tile(key).is_some() {
            return;
        }
        self.region_mut(key.kind)
            .push(Tile::new(key.clone(), title.to_string()));
    }

    fn update_circle(&mut self, key: &EntityKey, circle: Circle) {
        if let Some(tile) = self.tile_mut(key) {
            tile.circle = Some(circle);
        }
    }

    fn update_table(&mut self, key: &EntityKey, table: DataTable) {
        if let Some(tile) = self.tile_mut(key) {
            tile.table = table;
        }
    }

    fn update_sparkline(&mut self, key: &EntityKey, path: Option<SparklinePath>) {
        if let Some(tile) = self.tile_mut(key) {
            tile.sparkline = path;
        }
    }

    fn reorder(&mut self, kind: EntityKind, order: &[EntityKey]) {
        let region = self.region_mut(kind);
        // tiles missing from `order` keep their relative order at the end
        region.sort_by_key(|tile| {
            order
                .iter()
                .position(|k| k == &tile.key)
                .unwrap_or(usize::MAX)
        });
    }

    fn remove_tile(&mut self, key: &EntityKey) {
        self.region_mut(key.kind).retain(|t| &t.key != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Rate;
    use crate::surface::TableCell;

    #[test]
    fn test_create_and_update() {
        let mut board = TileBoard::new();
        board.create_root("main");
        let key = EntityKey::circuit("svc", "m");
        board.create_tile(&key, "svc.m");
        board.update_circle(&key, Circle::for_rate(Rate::Defined(0.0), 400.0, 0.0));
        board.update_table(&key, DataTable::new().row(vec![TableCell::new("Hosts", "1")]));

        let tile = board.tile(&key).unwrap();
        assert_eq!(tile.title, "svc.m");
        assert_eq!(tile.circle.map(|c| c.radius), Some(5.0));
        assert_eq!(tile.table.rows.len(), 1);
        assert_eq!(board.container(), Some("main"));
    }

    #[test]
    fn test_create_tile_twice_is_noop() {
        let mut board = TileBoard::new();
        let key = EntityKey::thread_pool("svc");
        board.create_tile(&key, "svc");
        board.create_tile(&key, "other");
        assert_eq!(board.tiles(EntityKind::ThreadPool).len(), 1);
        assert_eq!(board.tile(&key).unwrap().title, "svc");
    }

    #[test]
    fn test_updates_to_unknown_tiles_are_ignored() {
        let mut board = TileBoard::new();
        board.update_sparkline(&EntityKey::circuit("a", "b"), None);
        assert!(board.is_empty());
    }

    #[test]
    fn test_reorder() {
        let mut board = TileBoard::new();
        let a = EntityKey::circuit("s", "a");
        let b = EntityKey::circuit("s", "b");
        let c = EntityKey::circuit("s", "c");
        for key in [&a, &b, &c] {
            board.create_tile(key, &key.display_name());
        }

        board.reorder(EntityKind::Circuit, &[c.clone(), a.clone()]);
        let order: Vec<_> = board
            .tiles(EntityKind::Circuit)
            .iter()
            .map(|t| t.key.clone())
            .collect();
        assert_eq!(order, vec![c, a, b]);
    }

    #[test]
    fn test_remove_tile() {
        let mut board = TileBoard::new();
        let key = EntityKey::circuit("s", "a");
        board.create_tile(&key, "s.a");
        board.create_tile(&EntityKey::thread_pool("s"), "s");
        board.remove_tile(&key);
        assert!(board.tile(&key).is_none());
        assert_eq!(board.len(), 1);
    }
}
