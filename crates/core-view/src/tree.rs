//! Binary split tree of panes.
//!
//! Nodes live in an arena with explicit parent ids; a node is either a
//! leaf owning one view, a vertical split (left/right, one column reserved
//! for the splitter glyph) or a horizontal split (top/bottom, the views'
//! own status bars act as the divider). Exactly one of the three shapes is
//! populated per node; hitting anything else is a programming bug and
//! panics.

use crate::view::View;
use core_buffer::Buffer;
use core_render::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

enum NodeKind {
    Leaf(View),
    /// Side-by-side panes separated by a splitter column.
    VSplit { left: NodeId, right: NodeId },
    /// Stacked panes.
    HSplit { top: NodeId, bottom: NodeId },
}

struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
    rect: Rect,
    split: f32,
}

pub struct ViewTree {
    nodes: Vec<Option<Node>>,
    free: Vec<u32>,
    root: NodeId,
}

impl ViewTree {
    pub fn new(view: View) -> ViewTree {
        let mut tree = ViewTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.alloc(Node {
            parent: None,
            kind: NodeKind::Leaf(view),
            rect: Rect::default(),
            split: 0.0,
        });
        tree
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(i) => {
                self.nodes[i as usize] = Some(node);
                NodeId(i)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId((self.nodes.len() - 1) as u32)
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id.index()] = None;
        self.free.push(id.0);
    }

    fn node(&self, id: NodeId) -> &Node {
        match &self.nodes[id.index()] {
            Some(n) => n,
            None => panic!("view tree: dangling node id"),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.nodes[id.index()] {
            Some(n) => n,
            None => panic!("view tree: dangling node id"),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn rect(&self, id: NodeId) -> Rect {
        self.node(id).rect
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Leaf(_))
    }

    pub fn view(&self, id: NodeId) -> &View {
        match &self.node(id).kind {
            NodeKind::Leaf(v) => v,
            _ => panic!("view tree: node is not a leaf"),
        }
    }

    pub fn view_mut(&mut self, id: NodeId) -> &mut View {
        match &mut self.node_mut(id).kind {
            NodeKind::Leaf(v) => v,
            _ => panic!("view tree: node is not a leaf"),
        }
    }

    /// Ids of every leaf, in first-leaf order.
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_leaves(self.root, &mut out);
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        match &self.node(id).kind {
            NodeKind::Leaf(_) => out.push(id),
            NodeKind::VSplit { left, right } => {
                self.collect_leaves(*left, out);
                self.collect_leaves(*right, out);
            }
            NodeKind::HSplit { top, bottom } => {
                self.collect_leaves(*top, out);
                self.collect_leaves(*bottom, out);
            }
        }
    }

    pub fn first_leaf(&self, mut id: NodeId) -> NodeId {
        loop {
            match &self.node(id).kind {
                NodeKind::Leaf(_) => return id,
                NodeKind::VSplit { left, .. } => id = *left,
                NodeKind::HSplit { top, .. } => id = *top,
            }
        }
    }

    /// Split a leaf side by side. The old view stays in the left pane, the
    /// fresh `new_view` goes right; returns the old view's new node id.
    pub fn split_vertically(&mut self, id: NodeId, new_view: View) -> NodeId {
        self.split(id, new_view, true)
    }

    /// Split a leaf into stacked panes. The old view stays on top; returns
    /// the old view's new node id.
    pub fn split_horizontally(&mut self, id: NodeId, new_view: View) -> NodeId {
        self.split(id, new_view, false)
    }

    fn split(&mut self, id: NodeId, new_view: View, vertical: bool) -> NodeId {
        let rect = self.node(id).rect;
        let old_kind = std::mem::replace(
            &mut self.node_mut(id).kind,
            NodeKind::VSplit {
                left: NodeId(0),
                right: NodeId(0),
            },
        );
        let NodeKind::Leaf(old_view) = old_kind else {
            panic!("view tree: splitting a non-leaf");
        };
        let first = self.alloc(Node {
            parent: Some(id),
            kind: NodeKind::Leaf(old_view),
            rect,
            split: 0.0,
        });
        let second = self.alloc(Node {
            parent: Some(id),
            kind: NodeKind::Leaf(new_view),
            rect,
            split: 0.0,
        });
        let node = self.node_mut(id);
        node.kind = if vertical {
            NodeKind::VSplit {
                left: first,
                right: second,
            }
        } else {
            NodeKind::HSplit {
                top: first,
                bottom: second,
            }
        };
        node.split = 0.5;
        first
    }

    /// Remove a leaf, promoting its sibling subtree into the parent slot.
    /// Returns the detached view and the leaf to activate next, or `None`
    /// for the root (the last pane cannot be killed).
    pub fn kill(&mut self, id: NodeId, buffers: &[Buffer]) -> Option<(View, NodeId)> {
        let parent = self.node(id).parent?;
        let sibling = self.sibling(id)?;

        let NodeKind::Leaf(view) = std::mem::replace(
            &mut self.node_mut(id).kind,
            NodeKind::VSplit {
                left: NodeId(0),
                right: NodeId(0),
            },
        ) else {
            panic!("view tree: killing a non-leaf");
        };

        // Promote the sibling subtree into the parent node.
        let sib_node = self.nodes[sibling.index()]
            .take()
            .unwrap_or_else(|| panic!("view tree: dangling sibling"));
        self.free.push(sibling.0);
        let parent_rect = self.node(parent).rect;
        {
            let p = self.node_mut(parent);
            p.kind = sib_node.kind;
            p.split = sib_node.split;
        }
        self.reparent_children(parent);
        self.release(id);

        self.resize(parent, parent_rect, buffers);
        let active = self.first_leaf(parent);
        Some((view, active))
    }

    fn reparent_children(&mut self, id: NodeId) {
        let (a, b) = match &self.node(id).kind {
            NodeKind::Leaf(_) => return,
            NodeKind::VSplit { left, right } => (*left, *right),
            NodeKind::HSplit { top, bottom } => (*top, *bottom),
        };
        self.node_mut(a).parent = Some(id);
        self.node_mut(b).parent = Some(id);
    }

    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.node(id).parent?;
        match &self.node(parent).kind {
            NodeKind::VSplit { left, right } => {
                Some(if *left == id { *right } else { *left })
            }
            NodeKind::HSplit { top, bottom } => {
                Some(if *top == id { *bottom } else { *top })
            }
            NodeKind::Leaf(_) => panic!("view tree: leaf with children"),
        }
    }

    /// Lay out the subtree under `id` into `rect`. Vertical splits reserve
    /// one column for the splitter glyph; horizontal splits don't, their
    /// status bars divide the panes.
    pub fn resize(&mut self, id: NodeId, rect: Rect, buffers: &[Buffer]) {
        self.node_mut(id).rect = rect;
        match &self.node(id).kind {
            NodeKind::Leaf(_) => {
                let buf = &buffers[self.view(id).buffer];
                self.view_mut(id).resize(buf, rect.width, rect.height);
            }
            NodeKind::VSplit { left, right } => {
                let (left, right) = (*left, *right);
                let w = rect.width.saturating_sub(1);
                let lw = (w as f32 * self.node(id).split) as usize;
                let rw = w - lw;
                self.resize(left, Rect::new(rect.x, rect.y, lw, rect.height), buffers);
                self.resize(
                    right,
                    Rect::new(rect.x + lw + 1, rect.y, rw, rect.height),
                    buffers,
                );
            }
            NodeKind::HSplit { top, bottom } => {
                let (top, bottom) = (*top, *bottom);
                let th = (rect.height as f32 * self.node(id).split) as usize;
                let bh = rect.height - th;
                self.resize(top, Rect::new(rect.x, rect.y, rect.width, th), buffers);
                self.resize(
                    bottom,
                    Rect::new(rect.x, rect.y + th, rect.width, bh),
                    buffers,
                );
            }
        }
    }

    /// First leaf of the nearest horizontally split neighbour: above for
    /// `dir < 0`, below for `dir > 0`.
    pub fn nearest_h_split(&self, id: NodeId, dir: i32) -> Option<NodeId> {
        let mut v = id;
        let mut w = self.node(v).parent;
        while let Some(p) = w {
            if let NodeKind::HSplit { top, bottom } = &self.node(p).kind {
                if dir < 0 && v == *bottom {
                    return Some(self.first_leaf(*top));
                }
                if dir > 0 && v == *top {
                    return Some(self.first_leaf(*bottom));
                }
            }
            v = p;
            w = self.node(p).parent;
        }
        None
    }

    /// First leaf of the nearest vertically split neighbour: left for
    /// `dir < 0`, right for `dir > 0`.
    pub fn nearest_v_split(&self, id: NodeId, dir: i32) -> Option<NodeId> {
        let mut v = id;
        let mut w = self.node(v).parent;
        while let Some(p) = w {
            if let NodeKind::VSplit { left, right } = &self.node(p).kind {
                if dir < 0 && v == *right {
                    return Some(self.first_leaf(*left));
                }
                if dir > 0 && v == *left {
                    return Some(self.first_leaf(*right));
                }
            }
            v = p;
            w = self.node(p).parent;
        }
        None
    }

    /// One layout cell as a fraction of the split axis.
    fn one_step(&self, id: NodeId) -> f32 {
        let node = self.node(id);
        match node.kind {
            NodeKind::HSplit { .. } if node.rect.height > 0 => 1.0 / node.rect.height as f32,
            NodeKind::VSplit { .. } if node.rect.width > 1 => 1.0 / (node.rect.width - 1) as f32,
            _ => 0.0,
        }
    }

    fn normalize_split(&mut self, id: NodeId) {
        let node = self.node(id);
        let off = match node.kind {
            NodeKind::HSplit { .. } => (node.rect.height as f32 * node.split) as usize,
            NodeKind::VSplit { .. } => ((node.rect.width.saturating_sub(1)) as f32 * node.split) as usize,
            NodeKind::Leaf(_) => return,
        };
        let one = self.one_step(id);
        self.node_mut(id).split = off as f32 * one;
    }

    /// Nudge a split point by `n` layout cells and re-lay out the subtree.
    pub fn step_resize(&mut self, id: NodeId, n: i32, buffers: &[Buffer]) {
        let rect = self.node(id).rect;
        if rect.width <= 1 || rect.height == 0 {
            return;
        }
        let one = self.one_step(id);
        self.normalize_split(id);
        let split = (self.node(id).split + one * n as f32 + one * 0.5).clamp(0.0, 1.0);
        self.node_mut(id).split = split;
        self.resize(id, rect, buffers);
    }

    /// Composite geometry of the splitter column owned by a vertical
    /// split: the column just left of its right child.
    pub fn splitter_column(&self, id: NodeId) -> Option<Rect> {
        match &self.node(id).kind {
            NodeKind::VSplit { right, .. } => {
                let r = self.node(*right).rect;
                Some(Rect::new(r.x.saturating_sub(1), r.y, 1, r.height))
            }
            _ => None,
        }
    }

    /// Internal (non-leaf) node ids, for splitter compositing.
    pub fn internal_nodes(&self) -> Vec<NodeId> {
        (0..self.nodes.len() as u32)
            .map(NodeId)
            .filter(|id| self.nodes[id.index()].is_some() && !self.is_leaf(*id))
            .collect()
    }
}
