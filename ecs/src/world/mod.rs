//! The world: owning authority for all entities, components, and queries.
//!
//! A [`World`] owns the entity allocator, every component's column storage,
//! the per-entity bitmask table, all registered query states, and the tick
//! counter. Everything else in the crate is a view or handle into
//! world-owned storage; dispose of the world and they mean nothing.
//!
//! # Tick discipline
//!
//! Query matching is lazy and batched: structural mutations (`create`,
//! `destroy`, `attach`, `detach`) and tracked writes accumulate in
//! worklists, and a single [`World::tick`] call folds them into every
//! query's `current`/`added`/`removed`/`changed` sets. Between ticks the
//! sets are frozen, so every system in a tick observes the same membership
//! regardless of what earlier systems mutated. Mid-tick mutations become
//! visible at the next tick's prepare.
//!
//! # Threading
//!
//! The world is single-threaded by contract and carries a `!Send` marker.
//! Worker systems never touch it directly; they exchange owned messages
//! through the scheduler (see the `system` module).

use std::marker::PhantomData;

use fixedbitset::FixedBitSet;
use log::{debug, trace};

use crate::component::{BytesField, Component, Entry, EntryMut, Field, Schema, Store, StrField};
use crate::config::WorldConfig;
use crate::entity::{Allocator, Entity, Id};
use crate::error::{EcsError, Result};
use crate::field::{FieldKind, Scalar};
use crate::mask::Mask;
use crate::query::state::QueryState;
use crate::query::{Query, QueryHandle, QueryView};

/// The single owning authority for entity ids, component buffers, bitmasks,
/// and query result sets.
///
/// Constructed through [`WorldConfig::build`].
pub struct World {
    /// Entity id lifecycle: free list, generations, liveness.
    allocator: Allocator,

    /// Per-entity component bitmask, indexed by id. The sole source of truth
    /// queries consult.
    masks: Vec<Mask>,

    /// Column storage per registered component, in registration order.
    stores: Vec<Store>,

    /// Per-component write sets for the current tick, indexed like `stores`.
    dirty: Vec<FixedBitSet>,

    /// Result-set state per registered query.
    queries: Vec<QueryState>,

    /// Entities whose bitmask or liveness changed since the last prepare.
    structural: FixedBitSet,

    /// Slots destroyed since the last prepare.
    vacated: FixedBitSet,

    /// Slots destroyed and reallocated to a new entity since the last
    /// prepare. Queries must treat such a slot as removed-then-added even
    /// when it matches across the handover.
    reborn: FixedBitSet,

    /// Current slot capacity of every column, mask table, and bitset.
    capacity: usize,

    /// Hard cap growth clamps to.
    max_entities: usize,

    /// Whether exhausting capacity doubles it instead of failing.
    growable: bool,

    /// Completed tick count.
    tick: u64,

    /// Number of lockstep growth passes performed.
    growth_count: usize,

    /// The world is not `Send`: all access happens on the constructing
    /// thread.
    _single_thread: PhantomData<*mut ()>,
}

impl World {
    pub(crate) fn from_config(config: WorldConfig) -> Self {
        let capacity = config.initial();
        Self {
            allocator: Allocator::with_capacity(capacity),
            masks: vec![Mask::EMPTY; capacity],
            stores: Vec::new(),
            dirty: Vec::new(),
            queries: Vec::new(),
            structural: FixedBitSet::with_capacity(capacity),
            vacated: FixedBitSet::with_capacity(capacity),
            reborn: FixedBitSet::with_capacity(capacity),
            capacity,
            max_entities: config.max(),
            growable: config.growable(),
            tick: 0,
            growth_count: 0,
            _single_thread: PhantomData,
        }
    }

    // ------------------------------------------------------------------
    // Component registration and field resolution
    // ------------------------------------------------------------------

    /// Register a component schema, allocating one column per field at the
    /// current capacity.
    ///
    /// Identity is by registration: registering the same schema twice yields
    /// two distinct components. Fails with `InvalidFieldConfiguration` on a
    /// malformed schema and `CapacityExceeded` past [`Mask::BITS`]
    /// components.
    pub fn register_component(&mut self, schema: Schema) -> Result<Component> {
        schema.validate()?;
        if self.stores.len() >= Mask::BITS {
            return Err(EcsError::CapacityExceeded {
                requested: self.stores.len() + 1,
                limit: Mask::BITS,
            });
        }
        let component = Component::new(self.stores.len() as u8);
        debug!(
            "registered component `{}` (bit {}) with {} fields",
            schema.name(),
            component.index(),
            schema.fields().len()
        );
        self.stores.push(Store::new(schema, self.capacity));
        self.dirty.push(FixedBitSet::with_capacity(self.capacity));
        Ok(component)
    }

    /// Resolve a scalar field by name to a typed key.
    ///
    /// Resolution checks the declared kind against `T` once, at setup; after
    /// that every access through the key is an indexed load with no name
    /// lookup. Unknown names and kind mismatches are
    /// `InvalidFieldConfiguration`.
    pub fn field<T: Scalar>(&self, component: Component, name: &str) -> Result<Field<T>> {
        let (position, kind) = self.resolve(component, name)?;
        if kind != T::KIND {
            return Err(self.kind_mismatch(component, name, kind, T::KIND));
        }
        Ok(Field::new(component, position))
    }

    /// Resolve a string field by name.
    pub fn str_field(&self, component: Component, name: &str) -> Result<StrField> {
        let (position, kind) = self.resolve(component, name)?;
        if !matches!(kind, FieldKind::Str { .. }) {
            return Err(self.kind_mismatch(component, name, kind, FieldKind::Str { max_len: 0 }));
        }
        Ok(StrField::new(component, position))
    }

    /// Resolve a binary field by name.
    pub fn bytes_field(&self, component: Component, name: &str) -> Result<BytesField> {
        let (position, kind) = self.resolve(component, name)?;
        if !matches!(kind, FieldKind::Bytes { .. }) {
            return Err(self.kind_mismatch(component, name, kind, FieldKind::Bytes { len: 0 }));
        }
        Ok(BytesField::new(component, position))
    }

    fn resolve(&self, component: Component, name: &str) -> Result<(usize, FieldKind)> {
        let store = self.stores.get(component.index()).ok_or_else(|| {
            EcsError::InvalidFieldConfiguration {
                reason: format!("component handle {component:?} was not issued by this world"),
            }
        })?;
        store
            .find_field(name)
            .ok_or_else(|| EcsError::InvalidFieldConfiguration {
                reason: format!("component `{}` has no field `{name}`", store.name()),
            })
    }

    fn kind_mismatch(
        &self,
        component: Component,
        name: &str,
        declared: FieldKind,
        requested: FieldKind,
    ) -> EcsError {
        EcsError::InvalidFieldConfiguration {
            reason: format!(
                "field `{name}` of `{}` is declared {}, resolved as {}",
                self.stores[component.index()].name(),
                declared.label(),
                requested.label(),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    /// Create an entity with an empty bitmask.
    ///
    /// Reuses a freed id when one is available; otherwise mints the next
    /// dense id, growing all storage in lockstep if the id would exceed
    /// capacity. Fails only with `CapacityExceeded` against the configured
    /// limit.
    pub fn create(&mut self) -> Result<Entity> {
        if !self.allocator.has_recyclable() && self.allocator.id_bound() == self.capacity {
            self.grow()?;
        }
        let entity = self.allocator.alloc();
        let index = entity.index();
        self.masks[index] = Mask::EMPTY;
        self.structural.insert(index);
        if self.vacated.contains(index) {
            self.reborn.insert(index);
        }
        Ok(entity)
    }

    /// Destroy a live entity: reset its attached component slots to field
    /// defaults, clear its bitmask, and return the id to the free list.
    ///
    /// Destroying a dead or stale handle is `InvalidEntity`; the strict
    /// check surfaces double-free bugs in the host immediately.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        self.check_alive(entity)?;
        let index = entity.index();
        for bit in self.masks[index].ones() {
            self.stores[bit as usize].clear_slot(index);
        }
        self.masks[index] = Mask::EMPTY;
        self.allocator.free(entity);
        self.structural.insert(index);
        self.vacated.insert(index);
        Ok(())
    }

    /// Whether this handle refers to a live entity.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.contains(entity)
    }

    // ------------------------------------------------------------------
    // Component attachment
    // ------------------------------------------------------------------

    /// Attach a component with all fields at their defaults.
    pub fn attach(&mut self, entity: Entity, component: Component) -> Result<()> {
        self.attach_with(entity, component, |_| {})
    }

    /// Attach a component, initializing its slot through `init` over field
    /// defaults.
    ///
    /// Attaching an already-present component re-initializes the slot;
    /// membership is unchanged, but the entity is marked dirty for the
    /// component so tracked queries observe the data change.
    pub fn attach_with(
        &mut self,
        entity: Entity,
        component: Component,
        init: impl FnOnce(&mut EntryMut<'_>),
    ) -> Result<()> {
        self.check_alive(entity)?;
        let index = entity.index();
        let was_present = self.masks[index].contains(component.bit());
        self.masks[index].insert(component.bit());
        if was_present {
            self.dirty[component.index()].insert(index);
        } else {
            self.structural.insert(index);
        }
        let store = &mut self.stores[component.index()];
        store.clear_slot(index);
        let mut entry = EntryMut::new(store, component, index);
        init(&mut entry);
        Ok(())
    }

    /// Detach a component, clearing its bitmask bit.
    ///
    /// Storage is cleared lazily: the slot keeps its bytes until the entity
    /// is destroyed or the component re-attached. Detaching an absent
    /// component is a no-op.
    pub fn detach(&mut self, entity: Entity, component: Component) -> Result<()> {
        self.check_alive(entity)?;
        let index = entity.index();
        if self.masks[index].contains(component.bit()) {
            self.masks[index].remove(component.bit());
            self.structural.insert(index);
        }
        Ok(())
    }

    /// O(1) bitmask test. `false` for dead or stale handles.
    #[inline]
    pub fn has(&self, entity: Entity, component: Component) -> bool {
        self.allocator.contains(entity) && self.masks[entity.index()].contains(component.bit())
    }

    // ------------------------------------------------------------------
    // Component access
    // ------------------------------------------------------------------

    /// A read-only view of one component on one entity.
    pub fn entry(&self, entity: Entity, component: Component) -> Result<Entry<'_>> {
        self.check_present(entity, component)?;
        Ok(Entry::new(
            &self.stores[component.index()],
            component,
            entity.index(),
        ))
    }

    /// A mutable view of one component on one entity.
    ///
    /// Acquisition marks the entity dirty for this component in the current
    /// tick (write-intent semantics), feeding any query that tracks it.
    pub fn entry_mut(&mut self, entity: Entity, component: Component) -> Result<EntryMut<'_>> {
        self.check_present(entity, component)?;
        self.dirty[component.index()].insert(entity.index());
        Ok(EntryMut::new(
            &mut self.stores[component.index()],
            component,
            entity.index(),
        ))
    }

    /// Read a single scalar field.
    pub fn get<T: Scalar>(&self, entity: Entity, field: Field<T>) -> Result<T> {
        Ok(self.entry(entity, field.component())?.get(field))
    }

    /// Write a single scalar field, marking the entity dirty for the field's
    /// component.
    pub fn set<T: Scalar>(&mut self, entity: Entity, field: Field<T>, value: T) -> Result<()> {
        self.entry_mut(entity, field.component())?.set(field, value);
        Ok(())
    }

    /// Read a single string field.
    pub fn get_str(&self, entity: Entity, field: StrField) -> Result<&str> {
        self.check_present(entity, field.component())?;
        Ok(self.stores[field.component().index()]
            .column(field.column())
            .str_at(entity.index()))
    }

    /// Write a single string field.
    pub fn set_str(&mut self, entity: Entity, field: StrField, value: &str) -> Result<()> {
        self.entry_mut(entity, field.component())?.set_str(field, value);
        Ok(())
    }

    /// Read a single binary field.
    pub fn get_bytes(&self, entity: Entity, field: BytesField) -> Result<&[u8]> {
        self.check_present(entity, field.component())?;
        Ok(self.stores[field.component().index()]
            .column(field.column())
            .bytes_at(entity.index()))
    }

    /// Write a single binary field.
    pub fn set_bytes(&mut self, entity: Entity, field: BytesField, value: &[u8]) -> Result<()> {
        self.entry_mut(entity, field.component())?
            .set_bytes(field, value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries and ticking
    // ------------------------------------------------------------------

    /// Register a query, compiling its description to masks and allocating
    /// its result sets.
    ///
    /// Fails with `CapacityExceeded` once the handle space is exhausted.
    pub fn register_query(&mut self, query: Query) -> Result<QueryHandle> {
        if self.queries.len() >= QueryHandle::MAX {
            return Err(EcsError::CapacityExceeded {
                requested: self.queries.len() + 1,
                limit: QueryHandle::MAX,
            });
        }
        let (required, excluded, tracked) = query.compile();
        let handle = QueryHandle::new(self.queries.len());
        debug!(
            "registered query #{} ({} clauses)",
            self.queries.len(),
            query.clause_count()
        );
        self.queries
            .push(QueryState::new(required, excluded, tracked, self.capacity));
        Ok(handle)
    }

    /// Open a view over a query's prepared result sets.
    pub fn query(&self, handle: QueryHandle) -> QueryView<'_> {
        QueryView::new(&self.queries[handle.index()], &self.allocator)
    }

    /// Advance one tick: recompute every query's result sets from the
    /// accumulated structural worklist and write sets, then clear both.
    ///
    /// Returns the new tick number. Deltas observed after this call are
    /// frozen until the next `tick`.
    pub fn tick(&mut self) -> u64 {
        self.tick += 1;
        let id_bound = self.allocator.id_bound();
        for state in &mut self.queries {
            state.prepare(
                &self.masks,
                self.allocator.live(),
                &self.structural,
                &self.reborn,
                &self.dirty,
                id_bound,
            );
        }
        self.structural.clear();
        self.vacated.clear();
        self.reborn.clear();
        for writes in &mut self.dirty {
            writes.clear();
        }
        self.tick
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Completed tick count.
    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.allocator.live_count()
    }

    /// Whether no entity is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current entity slot capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of registered components.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.stores.len()
    }

    /// Number of lockstep storage growth passes performed so far.
    #[inline]
    pub fn growth_count(&self) -> usize {
        self.growth_count
    }

    /// Live entities currently carrying `component`, in id order. Immediate
    /// (bitmask-level) view, independent of any query's tick discipline.
    pub(crate) fn live_with(&self, component: Component) -> impl Iterator<Item = Entity> + '_ {
        let bit = component.bit();
        (0..self.allocator.id_bound())
            .filter(move |&index| {
                self.allocator.live().contains(index) && self.masks[index].contains(bit)
            })
            .map(|index| {
                let id = Id::from(index as u32);
                Entity::new_with_generation(id, self.allocator.generation_of(id))
            })
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_alive(&self, entity: Entity) -> Result<()> {
        if self.allocator.contains(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity { entity })
        }
    }

    fn check_present(&self, entity: Entity, component: Component) -> Result<()> {
        self.check_alive(entity)?;
        if self.masks[entity.index()].contains(component.bit()) {
            Ok(())
        } else {
            Err(EcsError::ComponentNotPresent { entity, component })
        }
    }

    /// Double capacity (clamped to the maximum), growing every column, the
    /// mask table, and every bitset in lockstep.
    fn grow(&mut self) -> Result<()> {
        let limit = if self.growable {
            self.max_entities
        } else {
            self.capacity
        };
        if self.capacity >= limit {
            return Err(EcsError::CapacityExceeded {
                requested: self.capacity + 1,
                limit,
            });
        }
        let new_capacity = (self.capacity * 2).min(self.max_entities);
        trace!(
            "growing storage from {} to {new_capacity} slots ({} components)",
            self.capacity,
            self.stores.len()
        );
        for store in &mut self.stores {
            store.grow(new_capacity);
        }
        self.masks.resize(new_capacity, Mask::EMPTY);
        self.allocator.reserve(new_capacity);
        self.structural.grow(new_capacity);
        self.vacated.grow(new_capacity);
        self.reborn.grow(new_capacity);
        for writes in &mut self.dirty {
            writes.grow(new_capacity);
        }
        for state in &mut self.queries {
            state.grow(new_capacity);
        }
        self.capacity = new_capacity;
        self.growth_count += 1;
        Ok(())
    }
}
