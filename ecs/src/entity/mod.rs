//! Entity identity and allocation.
//!
//! Entities are dense, reusable 32-bit identifiers with no data of their own;
//! all component data lives in columns keyed by the entity id. Because ids are
//! recycled, a bare id cannot distinguish the current occupant of a slot from
//! a destroyed predecessor, so every handle also carries a [`Generation`].
//!
//! # Architecture
//!
//! - **[`Entity`]**: an [`Id`] plus the [`Generation`] the slot had when the
//!   handle was issued. A handle whose generation no longer matches the slot
//!   is stale and every world operation rejects it.
//! - **[`Allocator`]**: hands out ids from a free list before minting fresh
//!   ones, bumping the slot generation on free so stale handles are detected
//!   rather than silently aliasing reused ids.
//!
//! Reusing ids keeps the id space compact, which matters here because ids
//! index directly into flat storage columns.

use fixedbitset::FixedBitSet;

/// The generation of an entity slot. Starts at `FIRST` and increments each
/// time the slot's id is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of a slot.
    pub(crate) const FIRST: Self = Self(0);

    /// The generation after this one.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// A dense entity identifier, used directly as a storage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// The index this id occupies in flat storage.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A handle to an entity: its id plus the generation the slot had when this
/// handle was issued.
///
/// A world holds at most one live entity per id. After that entity is
/// destroyed and its id reused, handles to the old occupant carry a stale
/// generation and fail with `InvalidEntity` instead of touching the new
/// occupant's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    /// The slot identifier.
    id: Id,

    /// The slot generation at issue time.
    generation: Generation,
}

impl Entity {
    /// Construct a first-generation entity for an id. Test helper.
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn new(id: impl Into<Id>) -> Self {
        Self::new_with_generation(id.into(), Generation::FIRST)
    }

    /// Construct an entity from parts.
    #[inline]
    pub(crate) const fn new_with_generation(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// The entity's id.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The entity's generation.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// The index of this entity in flat storage.
    #[inline]
    pub fn index(&self) -> usize {
        self.id.index()
    }
}

/// Order entities by id, then generation.
impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Order entities by id, then generation.
impl Ord for Entity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.id.cmp(&other.id) {
            std::cmp::Ordering::Equal => self.generation.cmp(&other.generation),
            ord => ord,
        }
    }
}

/// Allocates entity ids and recycles freed ones.
///
/// Freed ids go to a free list and are handed out again before any fresh id
/// is minted, keeping the id space dense. The slot generation is bumped on
/// free, so handles issued before the free no longer validate.
///
/// The allocator requires `&mut self` for mutation and is owned by the world,
/// which is single-threaded by contract; the world performs capacity checks
/// and storage growth before asking for a fresh id.
#[derive(Debug)]
pub(crate) struct Allocator {
    /// Current generation per id slot, indexed by id.
    generations: Vec<Generation>,

    /// Liveness per id slot. Shared with query preparation.
    alive: FixedBitSet,

    /// Ids available for reuse.
    free: Vec<Id>,

    /// Next fresh id to mint.
    next_id: u32,
}

impl Allocator {
    /// Construct an allocator whose liveness set covers `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            generations: Vec::new(),
            alive: FixedBitSet::with_capacity(capacity),
            free: Vec::new(),
            next_id: 0,
        }
    }

    /// Allocate an entity, reusing a freed id when one is available.
    ///
    /// The caller must have ensured storage capacity covers the returned
    /// index.
    pub fn alloc(&mut self) -> Entity {
        if let Some(id) = self.free.pop() {
            self.alive.insert(id.index());
            return Entity::new_with_generation(id, self.generations[id.index()]);
        }

        let id = Id(self.next_id);
        self.next_id += 1;
        self.generations.push(Generation::FIRST);
        self.alive.insert(id.index());
        Entity::new_with_generation(id, Generation::FIRST)
    }

    /// Free a live entity's id for reuse, bumping the slot generation.
    ///
    /// The caller validates the handle with [`Allocator::contains`] first.
    pub fn free(&mut self, entity: Entity) {
        let index = entity.index();
        self.generations[index] = self.generations[index].next();
        self.alive.set(index, false);
        self.free.push(entity.id());
    }

    /// Whether this handle refers to a currently live entity.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        let index = entity.index();
        index < self.generations.len()
            && self.alive.contains(index)
            && self.generations[index] == entity.generation
    }

    /// Current generation of a slot, for re-deriving handles from raw ids.
    #[inline]
    pub fn generation_of(&self, id: Id) -> Generation {
        self.generations
            .get(id.index())
            .copied()
            .unwrap_or(Generation::FIRST)
    }

    /// Liveness bitset, indexed by entity id.
    #[inline]
    pub fn live(&self) -> &FixedBitSet {
        &self.alive
    }

    /// Number of live entities.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.alive.count_ones(..)
    }

    /// Upper bound of ever-minted ids; iteration over slots stops here.
    #[inline]
    pub fn id_bound(&self) -> usize {
        self.next_id as usize
    }

    /// Whether the next allocation can be served from the free list.
    #[inline]
    pub fn has_recyclable(&self) -> bool {
        !self.free.is_empty()
    }

    /// Grow the liveness set to cover `capacity` slots.
    pub fn reserve(&mut self, capacity: usize) {
        self.alive.grow(capacity);
    }
}

#[test]
fn allocator_uniqueness() {
    // Given
    let mut allocator = Allocator::with_capacity(256);

    // When
    let mut entities = Vec::new();
    for _ in 0..200 {
        entities.push(allocator.alloc());
    }

    // Then - no dupes minted
    let pre_len = entities.len();
    entities.sort();
    entities.dedup();
    assert_eq!(pre_len, entities.len());
}

#[test]
fn allocator_reuse_bumps_generation() {
    // Given
    let mut allocator = Allocator::with_capacity(16);
    let mut entities = Vec::new();
    for _ in 0..10 {
        entities.push(allocator.alloc());
    }

    // When
    for e in entities.drain(..) {
        allocator.free(e);
    }
    let mut reused = Vec::new();
    for _ in 0..10 {
        reused.push(allocator.alloc());
    }

    // Then - ids come back from the free list with bumped generations
    reused.sort();
    for e in &reused {
        assert!(e.id.0 < 10);
        assert_eq!(e.generation.0, 1);
    }
}

#[test]
fn allocator_free_and_reuse_cycle() {
    // Given
    let mut allocator = Allocator::with_capacity(16);
    let mut entities = Vec::new();
    for _ in 0..5 {
        entities.push(allocator.alloc());
    }
    assert!(!allocator.has_recyclable());

    // When - free all, then allocate one more than was freed
    for e in entities.drain(..) {
        allocator.free(e);
    }
    assert!(allocator.has_recyclable());
    let mut round_two = Vec::new();
    for _ in 0..6 {
        round_two.push(allocator.alloc());
    }

    // Then - five reused (gen 1) plus one fresh (gen 0)
    assert!(!allocator.has_recyclable());
    let fresh = round_two.iter().filter(|e| e.generation.0 == 0).count();
    let reused = round_two.iter().filter(|e| e.generation.0 == 1).count();
    assert_eq!(fresh, 1);
    assert_eq!(reused, 5);
    assert_eq!(allocator.id_bound(), 6);
}

#[test]
fn allocator_stale_handle_not_contained() {
    // Given
    let mut allocator = Allocator::with_capacity(4);
    let original = allocator.alloc();

    // When
    allocator.free(original);
    let replacement = allocator.alloc();

    // Then - same slot, but only the new handle validates
    assert_eq!(original.id, replacement.id);
    assert!(!allocator.contains(original));
    assert!(allocator.contains(replacement));
}

#[test]
fn allocator_freed_id_not_contained() {
    // Given
    let mut allocator = Allocator::with_capacity(4);
    let entity = allocator.alloc();

    // When
    allocator.free(entity);

    // Then - even the issued handle no longer validates
    assert!(!allocator.contains(entity));
    assert_eq!(allocator.live_count(), 0);
}

#[test]
fn allocator_multiple_generations() {
    // Given
    let mut allocator = Allocator::with_capacity(4);
    let entity = allocator.alloc();
    let original_id = entity.id;

    // When - free and reallocate repeatedly
    allocator.free(entity);
    let gen1 = allocator.alloc();
    allocator.free(gen1);
    let gen2 = allocator.alloc();
    allocator.free(gen2);
    let gen3 = allocator.alloc();

    // Then - same id, increasing generations
    assert_eq!(gen1.id, original_id);
    assert_eq!(gen1.generation.0, 1);
    assert_eq!(gen2.id, original_id);
    assert_eq!(gen2.generation.0, 2);
    assert_eq!(gen3.id, original_id);
    assert_eq!(gen3.generation.0, 3);
}

#[test]
fn allocator_live_tracks_allocation() {
    // Given
    let mut allocator = Allocator::with_capacity(8);
    let a = allocator.alloc();
    let b = allocator.alloc();
    let c = allocator.alloc();

    // When
    allocator.free(b);

    // Then
    assert_eq!(allocator.live_count(), 2);
    assert!(allocator.live().contains(a.index()));
    assert!(!allocator.live().contains(b.index()));
    assert!(allocator.live().contains(c.index()));
}

#[test]
fn entity_ordering() {
    // Given
    let e1 = Entity::new(Id(1));
    let e2 = Entity::new(Id(2));
    let e1_gen1 = Entity::new_with_generation(Id(1), Generation(1));

    // Then - ordered by id first, then generation
    assert!(e1 < e2);
    assert!(e1 < e1_gen1);
    assert!(e1_gen1 < e2);
}

#[test]
fn entity_equality() {
    // Given
    let e1 = Entity::new(Id(42));
    let e2 = Entity::new(Id(42));
    let e3 = Entity::new(Id(43));
    let e1_gen1 = Entity::new_with_generation(Id(42), Generation(1));

    // Then
    assert_eq!(e1, e2);
    assert_ne!(e1, e3);
    assert_ne!(e1, e1_gen1);
}

#[test]
fn entity_index() {
    // Given
    let e1 = Entity::new(Id(0));
    let e2 = Entity::new(Id(42));
    let e3 = Entity::new(Id(1000));

    // Then
    assert_eq!(e1.index(), 0);
    assert_eq!(e2.index(), 42);
    assert_eq!(e3.index(), 1000);
}

#[test]
fn generation_next() {
    // Given
    let gen0 = Generation::FIRST;

    // When
    let gen1 = gen0.next();
    let gen2 = gen1.next();

    // Then
    assert_eq!(gen0.0, 0);
    assert_eq!(gen1.0, 1);
    assert_eq!(gen2.0, 2);
}

#[test]
fn id_from_u32() {
    // Given
    let id1 = Id::from(42);
    let id2 = Id::from(1000);

    // Then
    assert_eq!(id1.0, 42);
    assert_eq!(id2.0, 1000);
}
