//! Linked undo history.
//!
//! Groups form a doubly linked timeline held in an arena. A permanent
//! sentinel group sits at the head: `current` pointing at the sentinel
//! means "nothing to undo". Behind `current` every group is applied; the
//! group after it, when present and empty, is the open group new edits
//! accumulate into. Any non-empty chain after `current` is redo territory
//! and is truncated by the next fresh edit.

use crate::action::{Action, ActionKind};
use core_text::LineArena;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupId(u32);

impl GroupId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Default)]
struct ActionGroup {
    actions: Vec<Action>,
    prev: Option<GroupId>,
    next: Option<GroupId>,
}

#[derive(Debug)]
pub(crate) struct History {
    groups: Vec<ActionGroup>,
    free: Vec<u32>,
    current: GroupId,
    /// Group that matched the on-disk contents at the last save; `None`
    /// when that state is unreachable (never saved, or truncated away).
    on_disk: Option<GroupId>,
}

impl History {
    pub fn new() -> Self {
        let mut h = History {
            groups: Vec::new(),
            free: Vec::new(),
            current: GroupId(0),
            on_disk: None,
        };
        let sentinel = h.alloc();
        let first = h.alloc();
        h.groups[sentinel.index()].next = Some(first);
        h.groups[first.index()].prev = Some(sentinel);
        h.current = sentinel;
        h.on_disk = Some(sentinel);
        h
    }

    fn alloc(&mut self) -> GroupId {
        match self.free.pop() {
            Some(i) => {
                self.groups[i as usize] = ActionGroup::default();
                GroupId(i)
            }
            None => {
                self.groups.push(ActionGroup::default());
                GroupId((self.groups.len() - 1) as u32)
            }
        }
    }

    fn release(&mut self, g: GroupId, arena: &mut LineArena) {
        // Reverting an insert detached its lines; nothing else can splice
        // them back once the group is unreachable. Delete-action lines are
        // back in the chain and stay allocated.
        for a in &self.groups[g.index()].actions {
            if a.kind == ActionKind::Insert {
                for &l in &a.lines {
                    arena.release(l);
                }
            }
        }
        if self.on_disk == Some(g) {
            self.on_disk = None;
        }
        self.groups[g.index()] = ActionGroup::default();
        self.free.push(g.0);
    }

    pub fn current(&self) -> GroupId {
        self.current
    }

    pub fn can_undo(&self) -> bool {
        self.groups[self.current.index()].prev.is_some()
    }

    /// The group `redo` would move into, when it holds anything to apply.
    pub fn redo_target(&self) -> Option<GroupId> {
        let next = self.groups[self.current.index()].next?;
        if self.groups[next.index()].actions.is_empty() {
            None
        } else {
            Some(next)
        }
    }

    /// Prepare the open group for a fresh edit: step into it and drop any
    /// redo chain beyond, releasing unreachable groups and the line slots
    /// their insert actions still pin.
    pub fn begin_edit(&mut self, arena: &mut LineArena) {
        let Some(open) = self.groups[self.current.index()].next else {
            return;
        };
        let mut walk = self.groups[open.index()].next;
        while let Some(g) = walk {
            walk = self.groups[g.index()].next;
            self.release(g, arena);
        }
        if !self.groups[open.index()].actions.is_empty() {
            trace!(target: "buffer.history", dropped = self.groups[open.index()].actions.len(),
                "redo_chain_truncated");
        }
        // Reuse the node as the fresh open group.
        for a in std::mem::take(&mut self.groups[open.index()].actions) {
            if a.kind == ActionKind::Insert {
                for l in a.lines {
                    arena.release(l);
                }
            }
        }
        if self.on_disk == Some(open) {
            self.on_disk = None;
        }
        self.groups[open.index()].next = None;
        self.groups[open.index()].prev = Some(self.current);
        self.current = open;
    }

    /// Close the tip: give it an empty successor unless one already exists.
    pub fn finalize(&mut self) {
        if self.groups[self.current.index()].next.is_none() {
            let g = self.alloc();
            self.groups[g.index()].prev = Some(self.current);
            self.groups[self.current.index()].next = Some(g);
        }
    }

    /// Append an action to the tip group, merging with its last action when
    /// the two are contiguous.
    pub fn append(&mut self, a: Action) {
        let group = &mut self.groups[self.current.index()];
        if let Some(last) = group.actions.last_mut() {
            if last.try_merge(&a) {
                return;
            }
        }
        group.actions.push(a);
    }

    pub fn actions_cloned(&self, g: GroupId) -> Vec<Action> {
        self.groups[g.index()].actions.clone()
    }

    pub fn last_action(&self) -> Option<&Action> {
        self.groups[self.current.index()].actions.last()
    }

    pub fn retreat(&mut self) {
        if let Some(prev) = self.groups[self.current.index()].prev {
            self.current = prev;
        }
    }

    pub fn advance(&mut self) {
        if let Some(next) = self.groups[self.current.index()].next {
            self.current = next;
        }
    }

    pub fn mark_on_disk(&mut self) {
        self.on_disk = Some(self.current);
    }

    pub fn synced(&self) -> bool {
        self.on_disk == Some(self.current)
    }
}
