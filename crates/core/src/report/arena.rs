//! Arena-based layer tree walk.
//!
//! The manifest delivers layers as a nested object graph. Flattening into an
//! arena with index-based children keeps the walk iterative (bounded stack
//! depth for adversarial nesting) and makes synthetic trees easy to build in
//! tests.

use crate::manifest::LayerNode;

/// Classification of a manifest layer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Group/artboard-like container (`layerSection`). The manifest does not
    /// distinguish artboards from plain groups, so they are conflated here.
    Container,
    /// Leaf raster layer (`layer`, `backgroundLayer`).
    Raster,
    /// Embedded non-rasterized document reference.
    SmartObject,
    /// Text layer.
    Text,
    /// Anything else (adjustment layers, unknown future kinds).
    Other,
}

impl LayerKind {
    fn classify(kind: Option<&str>) -> Self {
        match kind {
            Some("layerSection") => LayerKind::Container,
            Some("layer") | Some("backgroundLayer") => LayerKind::Raster,
            Some("smartObject") => LayerKind::SmartObject,
            Some("textLayer") => LayerKind::Text,
            _ => LayerKind::Other,
        }
    }
}

/// One flattened node.
#[derive(Debug)]
pub struct ArenaNode {
    pub kind: LayerKind,
    pub children: Vec<usize>,
}

/// Flat arena of layer nodes with index-based children lists.
#[derive(Debug, Default)]
pub struct LayerArena {
    nodes: Vec<ArenaNode>,
    roots: Vec<usize>,
}

/// Structural counts produced by walking an arena.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerCounts {
    pub artboards: u64,
    pub raster_layers: u64,
    pub smart_objects: u64,
    pub text_layers: u64,
}

impl LayerArena {
    /// Flatten a manifest layer forest. Iterative with an explicit work
    /// stack; node order is not significant for counting.
    pub fn from_layers(layers: &[LayerNode]) -> Self {
        let mut arena = LayerArena::default();
        for layer in layers {
            let idx = arena.push_subtree(layer);
            arena.roots.push(idx);
        }
        arena
    }

    fn push_subtree(&mut self, root: &LayerNode) -> usize {
        let root_idx = self.push_node(root);

        // (arena index, source node) pairs still needing their children linked
        let mut work: Vec<(usize, &LayerNode)> = vec![(root_idx, root)];
        while let Some((parent_idx, node)) = work.pop() {
            for child in &node.children {
                let child_idx = self.push_node(child);
                self.nodes[parent_idx].children.push(child_idx);
                work.push((child_idx, child));
            }
        }

        root_idx
    }

    fn push_node(&mut self, node: &LayerNode) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(ArenaNode {
            kind: LayerKind::classify(node.kind.as_deref()),
            children: Vec::new(),
        });
        idx
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn node(&self, idx: usize) -> &ArenaNode {
        &self.nodes[idx]
    }

    /// Count every node by classification.
    pub fn counts(&self) -> LayerCounts {
        let mut counts = LayerCounts::default();
        for node in &self.nodes {
            match node.kind {
                LayerKind::Container => counts.artboards += 1,
                LayerKind::Raster => counts.raster_layers += 1,
                LayerKind::SmartObject => counts.smart_objects += 1,
                LayerKind::Text => counts.text_layers += 1,
                LayerKind::Other => {}
            }
        }
        counts
    }
}
