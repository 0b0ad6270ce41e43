//! Component schemas and typed field handles.
//!
//! Components are described by plain [`Schema`] values passed to the world's
//! `register_component`; there is no derive surface and no inheritance. A
//! registered component is addressed through an opaque [`Component`] handle,
//! and its fields through typed keys ([`Field`], [`StrField`], [`BytesField`])
//! resolved once at setup. After resolution, every read and write is an
//! indexed access into a column with the field position baked into the key, so
//! no string lookup happens per tick and a mistyped field name fails at setup
//! rather than at use.
//!
//! ## Identity
//!
//! Component identity is by registration, not by shape: two schemas with
//! identical field layouts registered separately are distinct components and
//! never alias each other's storage.
//!
//! ## Usage
//!
//! ```ignore
//! let position = world.register_component(
//!     Schema::new("Position").f32("x").f32("y"),
//! )?;
//! let x = world.field::<f32>(position, "x")?;
//! let y = world.field::<f32>(position, "y")?;
//!
//! world.attach(entity, position)?;
//! world.set(entity, x, 4.0)?;
//! ```

mod store;

use std::collections::HashSet;
use std::marker::PhantomData;

use crate::error::{EcsError, Result};
use crate::field::{FieldDef, FieldKind, Scalar};

pub use store::{Entry, EntryMut};
pub(crate) use store::Store;

/// A component schema: a named, ordered set of typed fields.
///
/// Built with the fluent methods below and consumed by component
/// registration, which validates it and allocates one storage column per
/// field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Component name, used in logs and registration diagnostics.
    name: String,

    /// Ordered field definitions.
    fields: Vec<FieldDef>,
}

impl Schema {
    /// Start a schema with the given component name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field of an explicit kind.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef::new(name, kind));
        self
    }

    /// Append a signed 8-bit field.
    pub fn i8(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::I8)
    }

    /// Append a signed 16-bit field.
    pub fn i16(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::I16)
    }

    /// Append a signed 32-bit field.
    pub fn i32(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::I32)
    }

    /// Append an unsigned 8-bit field.
    pub fn u8(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::U8)
    }

    /// Append an unsigned 16-bit field.
    pub fn u16(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::U16)
    }

    /// Append an unsigned 32-bit field.
    pub fn u32(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::U32)
    }

    /// Append a 32-bit float field.
    pub fn f32(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::F32)
    }

    /// Append a 64-bit float field.
    pub fn f64(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::F64)
    }

    /// Append a boolean field.
    pub fn bool(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Bool)
    }

    /// Append a fixed-capacity UTF-8 string field.
    pub fn str(self, name: impl Into<String>, max_len: usize) -> Self {
        self.field(name, FieldKind::Str { max_len })
    }

    /// Append a fixed-length binary field.
    pub fn bytes(self, name: impl Into<String>, len: usize) -> Self {
        self.field(name, FieldKind::Bytes { len })
    }

    /// The component name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered field definitions.
    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Validate the schema ahead of registration.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(EcsError::InvalidFieldConfiguration {
                reason: "component name is empty".into(),
            });
        }
        if self.fields.is_empty() {
            return Err(EcsError::InvalidFieldConfiguration {
                reason: format!("component `{}` declares no fields", self.name),
            });
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name().is_empty() {
                return Err(EcsError::InvalidFieldConfiguration {
                    reason: format!("component `{}` has an unnamed field", self.name),
                });
            }
            if !seen.insert(field.name()) {
                return Err(EcsError::InvalidFieldConfiguration {
                    reason: format!(
                        "component `{}` declares field `{}` twice",
                        self.name,
                        field.name()
                    ),
                });
            }
            field.kind().validate(field.name())?;
        }
        Ok(())
    }
}

/// An opaque handle to a registered component.
///
/// Handles are issued by registration and are only meaningful against the
/// world that issued them. The handle's index doubles as the component's bit
/// position in entity masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Component(u8);

impl Component {
    /// Construct a handle from a registration index.
    #[inline]
    pub(crate) const fn new(index: u8) -> Self {
        Self(index)
    }

    /// The index of this component in registration order.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// The bit this component occupies in entity masks.
    #[inline]
    pub(crate) fn bit(&self) -> u8 {
        self.0
    }
}

/// A typed key to one scalar field of a registered component.
///
/// Resolved once via the world's `field` and then used for all per-tick
/// access. Carries the owning component and the column position, so reads
/// and writes are plain indexed loads with no name lookup.
#[derive(Debug, Clone, Copy)]
pub struct Field<T: Scalar> {
    /// The component this key belongs to.
    component: Component,

    /// Column position within the component's store.
    column: u16,

    /// Marker for the scalar type.
    _marker: PhantomData<T>,
}

impl<T: Scalar> Field<T> {
    #[inline]
    pub(crate) fn new(component: Component, column: usize) -> Self {
        Self {
            component,
            column: column as u16,
            _marker: PhantomData,
        }
    }

    /// The component this key belongs to.
    #[inline]
    pub fn component(&self) -> Component {
        self.component
    }

    #[inline]
    pub(crate) fn column(&self) -> usize {
        self.column as usize
    }
}

impl<T: Scalar> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.component == other.component && self.column == other.column
    }
}

/// A typed key to a fixed-capacity string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrField {
    component: Component,
    column: u16,
}

impl StrField {
    #[inline]
    pub(crate) fn new(component: Component, column: usize) -> Self {
        Self {
            component,
            column: column as u16,
        }
    }

    /// The component this key belongs to.
    #[inline]
    pub fn component(&self) -> Component {
        self.component
    }

    #[inline]
    pub(crate) fn column(&self) -> usize {
        self.column as usize
    }
}

/// A typed key to a fixed-length binary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytesField {
    component: Component,
    column: u16,
}

impl BytesField {
    #[inline]
    pub(crate) fn new(component: Component, column: usize) -> Self {
        Self {
            component,
            column: column as u16,
        }
    }

    /// The component this key belongs to.
    #[inline]
    pub fn component(&self) -> Component {
        self.component
    }

    #[inline]
    pub(crate) fn column(&self) -> usize {
        self.column as usize
    }
}
