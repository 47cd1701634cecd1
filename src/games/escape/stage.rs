//! Retained scene graph that rooms build and the renderer reads.
//!
//! Rooms own what they mount: `render()` fills the background and hotspot
//! regions, `cleanup()` empties them. The per-frame draw never mutates it.

use std::collections::HashMap;

use thiserror::Error;

use super::minigame::MinigameKey;
use super::room::RoomId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
    Background,
    Hotspots,
    Minigame,
}

impl RegionId {
    pub const ALL: [RegionId; 3] = [RegionId::Background, RegionId::Hotspots, RegionId::Minigame];
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("mount region {0:?} is missing")]
    MissingMount(RegionId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Background(RoomId),
    Hotspot {
        point_id: &'static str,
        label: &'static str,
        /// Position as percentages of the room view, `(left, top)`.
        pos: (u16, u16),
        /// Required item is not held yet.
        locked: bool,
    },
    Minigame(MinigameKey),
}

#[derive(Debug, Default)]
pub struct Region {
    nodes: Vec<Node>,
}

impl Region {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct Stage {
    regions: HashMap<RegionId, Region>,
}

impl Stage {
    /// A stage with every mount region present.
    pub fn new() -> Self {
        Self {
            regions: RegionId::ALL
                .iter()
                .map(|id| (*id, Region::default()))
                .collect(),
        }
    }

    /// A stage lacking `missing`, for exercising degraded mounts.
    #[cfg(test)]
    pub fn without(missing: RegionId) -> Self {
        let mut stage = Self::new();
        stage.regions.remove(&missing);
        stage
    }

    pub fn region(&self, id: RegionId) -> Result<&Region, StageError> {
        self.regions.get(&id).ok_or(StageError::MissingMount(id))
    }

    pub fn region_mut(&mut self, id: RegionId) -> Result<&mut Region, StageError> {
        self.regions
            .get_mut(&id)
            .ok_or(StageError::MissingMount(id))
    }

    /// Hotspot point ids currently mounted, in mount order.
    pub fn hotspot_ids(&self) -> Vec<&'static str> {
        self.region(RegionId::Hotspots)
            .map(|r| {
                r.nodes()
                    .iter()
                    .filter_map(|n| match n {
                        Node::Hotspot { point_id, .. } => Some(*point_id),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn background(&self) -> Option<RoomId> {
        self.region(RegionId::Background).ok()?.nodes().iter().find_map(|n| match n {
            Node::Background(room) => Some(*room),
            _ => None,
        })
    }

    pub fn mounted_minigame(&self) -> Option<MinigameKey> {
        self.region(RegionId::Minigame).ok()?.nodes().iter().find_map(|n| match n {
            Node::Minigame(key) => Some(*key),
            _ => None,
        })
    }
}
