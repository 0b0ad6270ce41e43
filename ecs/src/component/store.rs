//! Per-component column storage and entry views.
//!
//! A [`Store`] owns one [`Column`] per schema field, all sized to the world's
//! entity capacity and grown in lockstep. [`Entry`] and [`EntryMut`] are
//! short-lived views binding a store to one entity slot: `Entry` exposes only
//! getters, `EntryMut` adds setters, so read-only capability is enforced by
//! the type system rather than a runtime guard.

use crate::component::{BytesField, Component, Field, Schema, StrField};
use crate::field::column::Column;
use crate::field::{FieldKind, Scalar};

/// Storage for one registered component: a column per field.
#[derive(Debug)]
pub(crate) struct Store {
    /// The validated schema this store was built from.
    schema: Schema,

    /// One column per schema field, in declaration order.
    columns: Vec<Column>,
}

impl Store {
    /// Build a store for a validated schema at the given capacity.
    pub fn new(schema: Schema, capacity: usize) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|field| Column::new(field.kind(), capacity))
            .collect();
        Self { schema, columns }
    }

    /// Grow every column to `new_capacity` slots.
    pub fn grow(&mut self, new_capacity: usize) {
        for column in &mut self.columns {
            column.grow(new_capacity);
        }
    }

    /// Reset the slot at `index` to field defaults across all columns.
    pub fn clear_slot(&mut self, index: usize) {
        for column in &mut self.columns {
            column.clear_at(index);
        }
    }

    /// The component name.
    #[inline]
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Number of fields (and columns).
    #[inline]
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// Look a field up by name, returning its column position and kind.
    pub fn find_field(&self, name: &str) -> Option<(usize, FieldKind)> {
        self.schema
            .fields()
            .iter()
            .position(|field| field.name() == name)
            .map(|position| (position, self.schema.fields()[position].kind()))
    }

    #[inline]
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    #[inline]
    pub fn column_mut(&mut self, index: usize) -> &mut Column {
        &mut self.columns[index]
    }
}

/// A read-only view of one component on one entity.
///
/// Obtained through the world's `entry`; lives only as long as the borrow of
/// the world that produced it.
pub struct Entry<'w> {
    store: &'w Store,
    component: Component,
    index: usize,
}

impl<'w> Entry<'w> {
    #[inline]
    pub(crate) fn new(store: &'w Store, component: Component, index: usize) -> Self {
        Self {
            store,
            component,
            index,
        }
    }

    /// Read a scalar field.
    #[inline]
    pub fn get<T: Scalar>(&self, field: Field<T>) -> T {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        T::load(self.store.column(field.column()), self.index)
    }

    /// Read a string field.
    #[inline]
    pub fn str(&self, field: StrField) -> &str {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        self.store.column(field.column()).str_at(self.index)
    }

    /// Read a binary field.
    #[inline]
    pub fn bytes(&self, field: BytesField) -> &[u8] {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        self.store.column(field.column()).bytes_at(self.index)
    }
}

/// A mutable view of one component on one entity.
///
/// Obtained through the world's `entry_mut`, which also marks the entity
/// dirty for change tracking.
pub struct EntryMut<'w> {
    store: &'w mut Store,
    component: Component,
    index: usize,
}

impl<'w> EntryMut<'w> {
    #[inline]
    pub(crate) fn new(store: &'w mut Store, component: Component, index: usize) -> Self {
        Self {
            store,
            component,
            index,
        }
    }

    /// Read a scalar field.
    #[inline]
    pub fn get<T: Scalar>(&self, field: Field<T>) -> T {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        T::load(self.store.column(field.column()), self.index)
    }

    /// Write a scalar field.
    #[inline]
    pub fn set<T: Scalar>(&mut self, field: Field<T>, value: T) {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        T::store(self.store.column_mut(field.column()), self.index, value);
    }

    /// Read a string field.
    #[inline]
    pub fn str(&self, field: StrField) -> &str {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        self.store.column(field.column()).str_at(self.index)
    }

    /// Write a string field, truncating at a character boundary on overflow.
    #[inline]
    pub fn set_str(&mut self, field: StrField, value: &str) {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        self.store
            .column_mut(field.column())
            .set_str(self.index, value);
    }

    /// Read a binary field.
    #[inline]
    pub fn bytes(&self, field: BytesField) -> &[u8] {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        self.store.column(field.column()).bytes_at(self.index)
    }

    /// Write a binary field, zero-padding short input and truncating long
    /// input.
    #[inline]
    pub fn set_bytes(&mut self, field: BytesField, value: &[u8]) {
        debug_assert_eq!(
            field.component(),
            self.component,
            "field key belongs to a different component"
        );
        self.store
            .column_mut(field.column())
            .set_bytes(self.index, value);
    }
}
