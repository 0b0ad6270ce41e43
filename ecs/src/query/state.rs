//! Per-query result-set maintenance.
//!
//! Each registered query owns four bitsets indexed by entity id: `current`,
//! `added`, `removed`, and `changed`. They are recomputed in a single prepare
//! pass at the start of every tick; between prepares they are frozen, so every
//! system in a tick observes the same sets.
//!
//! Preparation is incremental: only entities whose bitmask or liveness changed
//! since the last prepare (the structural worklist) are re-examined, and
//! `current` is adjusted in place. The result is equivalent to rebuilding
//! `current` from a full scan, which the first prepare after registration
//! actually performs to seed membership.

use fixedbitset::FixedBitSet;

use crate::mask::Mask;

/// The compiled form of a query plus its four result sets.
#[derive(Debug)]
pub(crate) struct QueryState {
    /// Bits that must all be set for an entity to match.
    required: Mask,

    /// Bits that must all be clear for an entity to match.
    excluded: Mask,

    /// Components whose writes feed the `changed` set.
    tracked: Mask,

    /// All matching entities, persisted across ticks.
    current: FixedBitSet,

    /// Matched this tick but not last.
    added: FixedBitSet,

    /// Matched last tick but not this.
    removed: FixedBitSet,

    /// Matching entities with a tracked write since last tick.
    changed: FixedBitSet,

    /// Set until the first prepare, which seeds `current` with a full scan.
    fresh: bool,
}

impl QueryState {
    /// Build a query state sized for `capacity` entity slots.
    pub fn new(required: Mask, excluded: Mask, tracked: Mask, capacity: usize) -> Self {
        Self {
            required,
            excluded,
            tracked,
            current: FixedBitSet::with_capacity(capacity),
            added: FixedBitSet::with_capacity(capacity),
            removed: FixedBitSet::with_capacity(capacity),
            changed: FixedBitSet::with_capacity(capacity),
            fresh: true,
        }
    }

    /// Whether an entity bitmask satisfies this query's predicate.
    #[inline]
    pub fn matches(&self, mask: Mask) -> bool {
        mask.contains_all(self.required) && !mask.intersects(self.excluded)
    }

    /// Grow the result sets to cover `capacity` entity slots.
    pub fn grow(&mut self, capacity: usize) {
        self.current.grow(capacity);
        self.added.grow(capacity);
        self.removed.grow(capacity);
        self.changed.grow(capacity);
    }

    /// Recompute the result sets for a new tick.
    ///
    /// `masks` and `live` describe every entity slot; `structural` lists the
    /// slots whose mask or liveness changed since the last prepare; `reborn`
    /// lists the slots freed and reallocated to a new entity since the last
    /// prepare; `dirty` holds the per-component write sets; `id_bound` is the
    /// upper bound of ever-minted ids.
    pub fn prepare(
        &mut self,
        masks: &[Mask],
        live: &FixedBitSet,
        structural: &FixedBitSet,
        reborn: &FixedBitSet,
        dirty: &[FixedBitSet],
        id_bound: usize,
    ) {
        self.added.clear();
        self.removed.clear();
        self.changed.clear();

        if self.fresh {
            // First prepare after registration: membership starts from a full
            // scan, and everything matching counts as newly added.
            for index in 0..id_bound {
                if live.contains(index) && self.matches(masks[index]) {
                    self.current.insert(index);
                    self.added.insert(index);
                }
            }
            self.fresh = false;
        } else {
            for index in structural.ones() {
                let now = live.contains(index) && self.matches(masks[index]);
                let was = self.current.contains(index);
                if now && !was {
                    self.current.insert(index);
                    self.added.insert(index);
                } else if !now && was {
                    self.current.set(index, false);
                    self.removed.insert(index);
                } else if now && was && reborn.contains(index) {
                    // The slot changed occupants between prepares: the old
                    // entity matched and is gone, the new one matches for
                    // the first time. Membership is steady but both deltas
                    // must record the handover.
                    self.removed.insert(index);
                    self.added.insert(index);
                }
            }
        }

        // Writes coalesce through set semantics: an entity dirtied K times
        // appears in `changed` exactly once.
        for bit in self.tracked.ones() {
            let Some(dirty_set) = dirty.get(bit as usize) else {
                continue;
            };
            for index in dirty_set.ones() {
                if self.current.contains(index) {
                    self.changed.insert(index);
                }
            }
        }
    }

    #[inline]
    pub fn current(&self) -> &FixedBitSet {
        &self.current
    }

    #[inline]
    pub fn added(&self) -> &FixedBitSet {
        &self.added
    }

    #[inline]
    pub fn removed(&self) -> &FixedBitSet {
        &self.removed
    }

    #[inline]
    pub fn changed(&self) -> &FixedBitSet {
        &self.changed
    }

    /// Number of entities currently matching.
    #[inline]
    pub fn len(&self) -> usize {
        self.current.count_ones(..)
    }
}
