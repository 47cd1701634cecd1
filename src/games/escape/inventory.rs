//! Player inventory: set membership plus a single selected slot.

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemId {
    Towel,
    Wrench,
    PuzzlePiece,
    IdCard,
}

impl ItemId {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemId::Towel => "towel",
            ItemId::Wrench => "wrench",
            ItemId::PuzzlePiece => "puzzle_piece",
            ItemId::IdCard => "id_card",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: &'static str,
    pub description: &'static str,
    /// Art reference shown under the item list while selected.
    pub image: &'static str,
    pub selected: bool,
}

impl InventoryItem {
    /// Catalog entry for `id`.
    pub fn of(id: ItemId) -> Self {
        let (name, description, image) = match id {
            ItemId::Towel => (
                "Towel",
                "A dry hand towel fished out of the trash.",
                "item_towel",
            ),
            ItemId::Wrench => (
                "Wrench",
                "A small adjustable wrench from the desk drawer.",
                "item_wrench",
            ),
            ItemId::PuzzlePiece => (
                "Cat puzzle piece",
                "A jigsaw piece with half a cat printed on it.",
                "item_cat_puzzle",
            ),
            ItemId::IdCard => (
                "Bloody ID card",
                "The name is scratched off. Initials 'M.S.'. '0525' is written on the back.",
                "item_id_card",
            ),
        };
        Self {
            id,
            name,
            description,
            image,
            selected: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Inventory {
    items: Vec<InventoryItem>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, id: ItemId) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// Add an item. Returns false (and changes nothing) if the id is already held.
    pub fn add(&mut self, item: InventoryItem) -> bool {
        if self.has(item.id) {
            debug!(item = item.id.as_str(), "duplicate pickup ignored");
            return false;
        }
        info!(item = item.id.as_str(), "item acquired");
        self.items.push(InventoryItem {
            selected: false,
            ..item
        });
        true
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Toggle selection of the item at `index`; at most one item is selected.
    pub fn toggle_select(&mut self, index: usize) -> Option<&InventoryItem> {
        let was_selected = self.items.get(index)?.selected;
        for item in &mut self.items {
            item.selected = false;
        }
        self.items[index].selected = !was_selected;
        Some(&self.items[index])
    }

    pub fn selected(&self) -> Option<&InventoryItem> {
        self.items.iter().find(|i| i.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn add_then_has() {
        let mut inv = Inventory::new();
        assert!(!inv.has(ItemId::Towel));
        assert!(inv.add(InventoryItem::of(ItemId::Towel)));
        assert!(inv.has(ItemId::Towel));
        assert!(!inv.has(ItemId::Wrench));
    }

    #[test]
    fn duplicate_add_is_noop() {
        let mut inv = Inventory::new();
        assert!(inv.add(InventoryItem::of(ItemId::Wrench)));
        assert!(!inv.add(InventoryItem::of(ItemId::Wrench)));
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn duplicate_add_keeps_selection_of_original() {
        let mut inv = Inventory::new();
        inv.add(InventoryItem::of(ItemId::Towel));
        inv.toggle_select(0);
        let mut again = InventoryItem::of(ItemId::Towel);
        again.selected = false;
        inv.add(again);
        assert!(inv.items()[0].selected);
    }

    #[test]
    fn selection_is_exclusive_and_toggles() {
        let mut inv = Inventory::new();
        inv.add(InventoryItem::of(ItemId::Towel));
        inv.add(InventoryItem::of(ItemId::Wrench));

        inv.toggle_select(0);
        assert_eq!(inv.selected().map(|i| i.id), Some(ItemId::Towel));
        inv.toggle_select(1);
        assert_eq!(inv.selected().map(|i| i.id), Some(ItemId::Wrench));
        assert!(!inv.items()[0].selected);
        inv.toggle_select(1);
        assert!(inv.selected().is_none());
        assert!(inv.toggle_select(5).is_none());
    }

    fn item_strategy() -> impl Strategy<Value = ItemId> {
        prop_oneof![
            Just(ItemId::Towel),
            Just(ItemId::Wrench),
            Just(ItemId::PuzzlePiece),
            Just(ItemId::IdCard),
        ]
    }

    proptest! {
        #[test]
        fn each_id_stored_at_most_once(ids in proptest::collection::vec(item_strategy(), 0..40)) {
            let mut inv = Inventory::new();
            for id in &ids {
                inv.add(InventoryItem::of(*id));
            }
            let mut distinct = ids.clone();
            distinct.sort_by_key(|id| id.as_str());
            distinct.dedup();
            prop_assert_eq!(inv.len(), distinct.len());
            for id in distinct {
                prop_assert_eq!(inv.items().iter().filter(|i| i.id == id).count(), 1);
            }
        }
    }
}
