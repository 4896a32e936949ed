use std::collections::HashMap;

use slotmap::{SlotMap, new_key_type};
use web_time::Duration;

use crate::geometry::Bounds;
use crate::visual::ElementId;

new_key_type! {
    pub struct RegionId;
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegionKind {
    Plain,
    /// A grid whose children reveal one after another, `stagger` apart.
    Grouped {
        children: Vec<ElementId>,
        stagger: Duration,
    },
}

/// What the runner knows about an element when registering it.
#[derive(Clone, Debug)]
pub struct RegionSpec {
    pub element: ElementId,
    pub bounds: Bounds,
    pub kind: RegionKind,
}

#[derive(Clone, Debug)]
pub struct Region {
    pub element: ElementId,
    pub bounds: Bounds,
    pub kind: RegionKind,
    /// Position in document order.
    pub ordinal: usize,
    revealed: bool,
}

impl Region {
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Regions tracked for reveal, in document order. Regions are never removed.
#[derive(Default)]
pub struct RegionRegistry {
    regions: SlotMap<RegionId, Region>,
    order: Vec<RegionId>,
    by_element: HashMap<ElementId, RegionId>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering an element twice returns the existing region, with its
    /// bounds and kind refreshed and its reveal flag untouched.
    pub fn register(&mut self, spec: RegionSpec) -> RegionId {
        if let Some(&id) = self.by_element.get(&spec.element) {
            let region = &mut self.regions[id];
            region.bounds = spec.bounds;
            region.kind = spec.kind;
            return id;
        }
        let ordinal = self.order.len();
        let id = self.regions.insert(Region {
            element: spec.element,
            bounds: spec.bounds,
            kind: spec.kind,
            ordinal,
            revealed: false,
        });
        self.order.push(id);
        self.by_element.insert(spec.element, id);
        id
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    pub fn by_element(&self, el: ElementId) -> Option<RegionId> {
        self.by_element.get(&el).copied()
    }

    pub fn set_bounds(&mut self, id: RegionId, bounds: Bounds) {
        if let Some(r) = self.regions.get_mut(id) {
            r.bounds = bounds;
        }
    }

    /// Marks the region revealed. Returns false if it already was.
    pub(crate) fn mark_revealed(&mut self, id: RegionId) -> bool {
        match self.regions.get_mut(id) {
            Some(r) if !r.revealed => {
                r.revealed = true;
                true
            }
            _ => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegionId, &Region)> {
        self.order.iter().map(|&id| (id, &self.regions[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
