//! Inheritance Linearizer
//!
//! Computes each declaration's lookup order: the nearest-first sequence of
//! declarations consulted by member lookup. One walk covers every
//! composition strategy:
//!
//! ```text
//! [D]
//!   + modules included by D        (most recent first, expanded recursively)
//!   + superclass chain             (each superclass followed by its includes)
//!   + interfaces of D and of each superclass, in declared order,
//!     each followed depth-first by the interfaces it extends
//!   + extensions of every entry so far, then the conformances they add
//! ```
//!
//! A declaration reached a second time is never re-inserted, so a module
//! included along two paths or an interface inherited twice appears once,
//! at its first (nearest) position. Cycles are rejected up front by
//! [`check_acyclic`], which reports the cycle path, so every walk ends at a
//! declaration without bases however long the chain is.

use crate::arena::{DeclId, Declaration};
use crate::error::CatalogError;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use smallvec::SmallVec;
use symcat_loader::BaseRelation;
use tracing::trace;

/// How an entry entered a lookup order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    Own,
    Include,
    Superclass,
    Interface,
    Extension,
}

impl Via {
    pub fn as_str(self) -> &'static str {
        match self {
            Via::Own => "own",
            Via::Include => "include",
            Via::Superclass => "superclass",
            Via::Interface => "interface",
            Via::Extension => "extension",
        }
    }
}

/// One position of a lookup order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinearEntry {
    pub decl: DeclId,
    /// Number of inheritance edges between the queried declaration and this
    /// entry. Extensions share the distance of the entry they extend.
    pub distance: u32,
    pub via: Via,
}

pub(crate) type ExtensionMap = FxHashMap<DeclId, SmallVec<[DeclId; 2]>>;

fn extensions_of(extensions: &ExtensionMap, id: DeclId) -> &[DeclId] {
    extensions.get(&id).map(|e| e.as_slice()).unwrap_or(&[])
}

// =============================================================================
// Cycle detection
// =============================================================================

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// Reject inheritance cycles.
///
/// Edges run from a declaration to each of its bases and to each base added
/// by one of its extensions. On failure, the error names the declarations
/// along the cycle, starting and ending with the same one.
pub(crate) fn check_acyclic(
    decls: &[Declaration],
    extensions: &ExtensionMap,
    display: impl Fn(DeclId) -> String,
) -> Result<(), CatalogError> {
    // Successors in reverse, so popping yields them in declared order.
    let successors = |id: DeclId| -> SmallVec<[DeclId; 4]> {
        let own = decls[id.index()].bases.iter();
        let attached = extensions_of(extensions, id)
            .iter()
            .flat_map(|&ext| decls[ext.index()].bases.iter());
        let mut targets: SmallVec<[DeclId; 4]> = own.chain(attached).map(|b| b.target).collect();
        targets.reverse();
        targets
    };

    let mut marks = vec![Mark::Unvisited; decls.len()];
    let mut stack: Vec<(DeclId, SmallVec<[DeclId; 4]>)> = Vec::new();
    for decl in decls.iter().filter(|d| d.is_type_like()) {
        if marks[decl.id.index()] != Mark::Unvisited {
            continue;
        }
        marks[decl.id.index()] = Mark::OnPath;
        stack.push((decl.id, successors(decl.id)));

        while let Some(frame) = stack.last_mut() {
            let Some(target) = frame.1.pop() else {
                marks[frame.0.index()] = Mark::Done;
                stack.pop();
                continue;
            };
            match marks[target.index()] {
                Mark::Done => {}
                Mark::OnPath => {
                    let start = stack.iter().position(|(id, _)| *id == target).unwrap_or(0);
                    let cycle = stack[start..]
                        .iter()
                        .map(|(id, _)| *id)
                        .chain(std::iter::once(target))
                        .map(&display)
                        .collect();
                    return Err(CatalogError::CyclicInheritance { cycle });
                }
                Mark::Unvisited => {
                    marks[target.index()] = Mark::OnPath;
                    stack.push((target, successors(target)));
                }
            }
        }
    }
    Ok(())
}

// =============================================================================
// Linearization
// =============================================================================

#[derive(Default)]
struct Order {
    entries: Vec<LinearEntry>,
    seen: FxHashSet<DeclId>,
}

impl Order {
    /// Append unless already present. Returns whether the entry was added.
    fn push(&mut self, decl: DeclId, distance: u32, via: Via) -> bool {
        if !self.seen.insert(decl) {
            return false;
        }
        self.entries.push(LinearEntry {
            decl,
            distance,
            via,
        });
        true
    }
}

pub(crate) struct Linearizer<'a> {
    decls: &'a [Declaration],
    extensions: &'a ExtensionMap,
}

impl<'a> Linearizer<'a> {
    pub(crate) fn new(decls: &'a [Declaration], extensions: &'a ExtensionMap) -> Self {
        Linearizer { decls, extensions }
    }

    fn decl(&self, id: DeclId) -> &'a Declaration {
        &self.decls[id.index()]
    }

    /// Lookup order for `id`. The inheritance graph must be acyclic.
    pub(crate) fn linearize(&self, id: DeclId) -> Vec<LinearEntry> {
        let mut order = Order::default();
        order.push(id, 0, Via::Own);
        self.push_includes(&mut order, id, 1);

        let mut chain: SmallVec<[(DeclId, u32); 8]> = SmallVec::new();
        chain.push((id, 0));
        let mut current = id;
        let mut distance = 0;
        while let Some(base) = self.decl(current).superclass() {
            distance += 1;
            current = base.target;
            if !order.push(current, distance, Via::Superclass) {
                break;
            }
            self.push_includes(&mut order, current, distance + 1);
            chain.push((current, distance));
        }

        for &(decl, distance) in &chain {
            for base in self.decl(decl).bases_of(BaseRelation::Interface) {
                self.push_interface(&mut order, base.target, distance + 1);
            }
        }

        // Extensions of every entry, including entries that extensions add.
        let mut cursor = 0;
        while cursor < order.entries.len() {
            let entry = order.entries[cursor];
            cursor += 1;
            if entry.via == Via::Extension {
                continue;
            }
            for &ext in extensions_of(self.extensions, entry.decl) {
                if !order.push(ext, entry.distance, Via::Extension) {
                    continue;
                }
                for base in &self.decl(ext).bases {
                    match base.relation {
                        BaseRelation::Include => {
                            if order.push(base.target, entry.distance + 1, Via::Include) {
                                self.push_includes(&mut order, base.target, entry.distance + 2);
                            }
                        }
                        _ => self.push_interface(&mut order, base.target, entry.distance + 1),
                    }
                }
            }
        }

        trace!(decl = id.0, entries = order.entries.len(), "linearized");
        order.entries
    }

    /// Modules included by `id`, most recent first, each followed by the
    /// modules it includes.
    fn push_includes(&self, order: &mut Order, id: DeclId, distance: u32) {
        let mut stack: SmallVec<[(DeclId, u32); 8]> = self
            .decl(id)
            .bases_of(BaseRelation::Include)
            .map(|base| (base.target, distance))
            .collect();
        while let Some((module, distance)) = stack.pop() {
            if order.push(module, distance, Via::Include) {
                stack.extend(
                    self.decl(module)
                        .bases_of(BaseRelation::Include)
                        .map(|base| (base.target, distance + 1)),
                );
            }
        }
    }

    /// `id` followed depth-first by the interfaces it extends, in declared
    /// order.
    fn push_interface(&self, order: &mut Order, id: DeclId, distance: u32) {
        let mut stack: SmallVec<[(DeclId, u32); 8]> = SmallVec::new();
        stack.push((id, distance));
        while let Some((iface, distance)) = stack.pop() {
            if order.push(iface, distance, Via::Interface) {
                stack.extend(
                    self.decl(iface)
                        .bases
                        .iter()
                        .rev()
                        .map(|base| (base.target, distance + 1)),
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/linearize_tests.rs"]
mod tests;
