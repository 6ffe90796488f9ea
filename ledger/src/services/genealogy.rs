//! Genealogy resolver: ancestry chains and descendant trees of a lot
//!
//! Lineage is followed by id lookups through the store. Generation ranks
//! strictly increase from parent to child, so a healthy store has no cycles
//! and no chain longer than the number of levels; both are still checked so
//! a corrupted store yields `BrokenLineage` instead of looping.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::Serialize;
use shared::{is_valid_derivation, Lot, LotFilter, LotId, GENERATION_COUNT};

use crate::error::{LedgerError, LedgerResult};
use crate::store::LotStore;

/// Read-only lineage queries
#[derive(Clone)]
pub struct GenealogyService {
    store: Arc<dyn LotStore>,
}

/// A lot and everything derived from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotTree {
    pub lot: Lot,
    pub children: Vec<LotTree>,
}

impl LotTree {
    /// Number of lots in the tree, root included
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(LotTree::size).sum::<usize>()
    }

    /// Generations below the root (0 for a leaf)
    pub fn depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Pre-order listing of every lot in the tree
    pub fn flatten(&self) -> Vec<&Lot> {
        let mut lots = vec![&self.lot];
        for child in &self.children {
            lots.extend(child.flatten());
        }
        lots
    }

    pub fn find(&self, lot_id: &LotId) -> Option<&LotTree> {
        if &self.lot.id == lot_id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(lot_id))
    }
}

/// Full lineage view of one lot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Genealogy {
    pub lot: Lot,
    /// Root-first chain of ancestors, excluding the lot itself
    pub ancestors: Vec<Lot>,
    /// The lot with all of its descendants
    pub descendants: LotTree,
}

/// A descendant yielded by [`Descendants`]
#[derive(Debug, Clone, PartialEq)]
pub struct Descendant {
    /// 1 for direct children, 2 for grandchildren, ...
    pub depth: usize,
    pub lot: Lot,
}

/// Breadth-first, on-demand walk over a lot's descendants.
///
/// Each call to `next` issues at most one children query. After the first
/// error the iterator is exhausted.
pub struct Descendants<'a> {
    store: &'a dyn LotStore,
    queue: VecDeque<Descendant>,
    failed: bool,
}

impl<'a> Descendants<'a> {
    fn children_of(&self, parent: &Lot, depth: usize) -> LedgerResult<Vec<Descendant>> {
        let children = self.store.query(&LotFilter::children_of(&parent.id))?;
        if !children.is_empty() && depth >= GENERATION_COUNT {
            return Err(LedgerError::BrokenLineage {
                lot_id: parent.id.clone(),
                reason: format!("descendants deeper than {} generations", GENERATION_COUNT),
            });
        }
        children
            .into_iter()
            .map(|lot| {
                check_link(parent, &lot)?;
                Ok(Descendant { depth, lot })
            })
            .collect()
    }
}

impl<'a> Iterator for Descendants<'a> {
    type Item = LedgerResult<Descendant>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let current = self.queue.pop_front()?;
        match self.children_of(&current.lot, current.depth + 1) {
            Ok(children) => {
                self.queue.extend(children);
                Some(Ok(current))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl GenealogyService {
    /// Create a new GenealogyService instance
    pub fn new(store: Arc<dyn LotStore>) -> Self {
        Self { store }
    }

    /// Ancestors of a lot, root first, excluding the lot itself
    pub fn ancestors_of(&self, lot_id: &LotId) -> LedgerResult<Vec<Lot>> {
        let start = self.load(lot_id)?;
        self.ancestors_from(&start)
    }

    fn ancestors_from(&self, start: &Lot) -> LedgerResult<Vec<Lot>> {
        let mut chain: Vec<Lot> = Vec::new();
        let mut current = start.clone();

        while let Some(parent_id) = current.parent_lot_id.clone() {
            if chain.len() + 1 >= GENERATION_COUNT {
                return Err(LedgerError::BrokenLineage {
                    lot_id: start.id.clone(),
                    reason: format!("ancestry longer than {} generations", GENERATION_COUNT),
                });
            }
            let parent = self
                .store
                .get(&parent_id)?
                .ok_or_else(|| LedgerError::BrokenLineage {
                    lot_id: current.id.clone(),
                    reason: format!("parent {} does not exist", parent_id),
                })?;
            check_link(&parent, &current)?;

            tracing::debug!(lot_id = %current.id, parent_lot_id = %parent.id, "Followed lineage link");
            chain.push(parent.clone());
            current = parent;
        }

        if !current.level.is_root() {
            return Err(LedgerError::BrokenLineage {
                lot_id: current.id.clone(),
                reason: format!("{} lot has no parent", current.level),
            });
        }

        chain.reverse();
        Ok(chain)
    }

    /// Lazily walk the descendants of a lot, breadth first
    pub fn descendants(&self, lot_id: &LotId) -> LedgerResult<Descendants<'_>> {
        let root = self.load(lot_id)?;
        let mut walk = Descendants {
            store: self.store.as_ref(),
            queue: VecDeque::new(),
            failed: false,
        };
        let first = walk.children_of(&root, 1)?;
        walk.queue.extend(first);
        Ok(walk)
    }

    /// Materialize the descendant tree rooted at a lot
    pub fn descendants_of(&self, lot_id: &LotId) -> LedgerResult<LotTree> {
        let root = self.load(lot_id)?;
        self.build_tree(root, 0)
    }

    fn build_tree(&self, lot: Lot, depth: usize) -> LedgerResult<LotTree> {
        let children = self.store.query(&LotFilter::children_of(&lot.id))?;
        if !children.is_empty() && depth + 1 >= GENERATION_COUNT {
            return Err(LedgerError::BrokenLineage {
                lot_id: lot.id.clone(),
                reason: format!("descendants deeper than {} generations", GENERATION_COUNT),
            });
        }

        let mut subtrees = Vec::with_capacity(children.len());
        for child in children {
            check_link(&lot, &child)?;
            subtrees.push(self.build_tree(child, depth + 1)?);
        }
        tracing::debug!(lot_id = %lot.id, children = subtrees.len(), "Resolved descendants");

        Ok(LotTree {
            lot,
            children: subtrees,
        })
    }

    /// Ancestors and descendants of a lot in one view
    pub fn genealogy_of(&self, lot_id: &LotId) -> LedgerResult<Genealogy> {
        let lot = self.load(lot_id)?;
        let ancestors = self.ancestors_from(&lot)?;
        let descendants = self.build_tree(lot.clone(), 0)?;
        Ok(Genealogy {
            lot,
            ancestors,
            descendants,
        })
    }

    fn load(&self, lot_id: &LotId) -> LedgerResult<Lot> {
        self.store
            .get(lot_id)?
            .ok_or_else(|| LedgerError::LotNotFound(lot_id.clone()))
    }
}

/// A stored parent/child pair must be exactly one generation apart
fn check_link(parent: &Lot, child: &Lot) -> LedgerResult<()> {
    if !is_valid_derivation(parent.level, child.level) {
        return Err(LedgerError::BrokenLineage {
            lot_id: child.id.clone(),
            reason: format!(
                "{} lot recorded as child of {} lot {}",
                child.level, parent.level, parent.id
            ),
        });
    }
    Ok(())
}
