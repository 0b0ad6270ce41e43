//! Stable persistent identity for entities.
//!
//! Entity handles are dense and recycled, so they cannot name an entity
//! across sessions or in saved data. [`Storable`] layers a 128-bit UUID on
//! top: a regular component holding one 16-byte field, plus helpers to mint,
//! attach, and look up by id. Anything that needs to survive serialization
//! carries it; transient entities skip the cost.
//!
//! Lookup is a linear scan over live carriers. Hosts that resolve UUIDs in
//! bulk should keep their own map; this is the fallback for one-off
//! resolution at load time.

use log::trace;
use uuid::Uuid;

use crate::component::{BytesField, Component, Schema};
use crate::entity::Entity;
use crate::error::Result;
use crate::world::World;

/// The UUID identity component and its field key, resolved once at setup.
#[derive(Debug, Clone, Copy)]
pub struct Storable {
    component: Component,
    uuid: BytesField,
}

impl Storable {
    /// Register the identity component with `world`.
    pub fn register(world: &mut World) -> Result<Self> {
        let component = world.register_component(Schema::new("Storable").bytes("uuid", 16))?;
        let uuid = world.bytes_field(component, "uuid")?;
        Ok(Self { component, uuid })
    }

    /// The underlying component, for queries over identified entities.
    #[inline]
    pub fn component(&self) -> Component {
        self.component
    }

    /// Attach a freshly minted v4 UUID to `entity` and return it.
    pub fn attach(&self, world: &mut World, entity: Entity) -> Result<Uuid> {
        let id = Uuid::new_v4();
        self.attach_existing(world, entity, id)?;
        Ok(id)
    }

    /// Attach a known UUID, as when restoring saved entities.
    pub fn attach_existing(&self, world: &mut World, entity: Entity, id: Uuid) -> Result<()> {
        let field = self.uuid;
        world.attach_with(entity, self.component, |entry| {
            entry.set_bytes(field, id.as_bytes());
        })?;
        trace!("entity {entity:?} identified as {id}");
        Ok(())
    }

    /// The UUID carried by `entity`, or an error if it carries none.
    pub fn uuid_of(&self, world: &World, entity: Entity) -> Result<Uuid> {
        let bytes = world.get_bytes(entity, self.uuid)?;
        let mut raw = [0u8; 16];
        raw.copy_from_slice(bytes);
        Ok(Uuid::from_bytes(raw))
    }

    /// Find the live entity carrying `id`, if any. Linear in the number of
    /// carriers.
    pub fn find(&self, world: &World, id: Uuid) -> Option<Entity> {
        world.live_with(self.component).find(|&entity| {
            world
                .get_bytes(entity, self.uuid)
                .is_ok_and(|bytes| bytes == id.as_bytes())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn fixture() -> (World, Storable) {
        let mut world = WorldConfig::new().build().unwrap();
        let storable = Storable::register(&mut world).unwrap();
        (world, storable)
    }

    #[test]
    fn attach_mints_distinct_uuids() {
        // Given
        let (mut world, storable) = fixture();
        let a = world.create().unwrap();
        let b = world.create().unwrap();

        // When
        let id_a = storable.attach(&mut world, a).unwrap();
        let id_b = storable.attach(&mut world, b).unwrap();

        // Then
        assert_ne!(id_a, id_b);
        assert_eq!(storable.uuid_of(&world, a).unwrap(), id_a);
        assert_eq!(storable.uuid_of(&world, b).unwrap(), id_b);
    }

    #[test]
    fn attach_existing_restores_a_known_id() {
        // Given
        let (mut world, storable) = fixture();
        let entity = world.create().unwrap();
        let id = Uuid::new_v4();

        // When
        storable.attach_existing(&mut world, entity, id).unwrap();

        // Then
        assert_eq!(storable.uuid_of(&world, entity).unwrap(), id);
    }

    #[test]
    fn find_resolves_only_live_carriers() {
        // Given
        let (mut world, storable) = fixture();
        let kept = world.create().unwrap();
        let dropped = world.create().unwrap();
        let kept_id = storable.attach(&mut world, kept).unwrap();
        let dropped_id = storable.attach(&mut world, dropped).unwrap();

        // When
        world.destroy(dropped).unwrap();

        // Then
        assert_eq!(storable.find(&world, kept_id), Some(kept));
        assert_eq!(storable.find(&world, dropped_id), None);
        assert_eq!(storable.find(&world, Uuid::new_v4()), None);
    }

    #[test]
    fn unidentified_entity_has_no_uuid() {
        // Given
        let (mut world, storable) = fixture();
        let plain = world.create().unwrap();

        // Then
        assert!(storable.uuid_of(&world, plain).is_err());
    }

    #[test]
    fn identity_survives_other_component_churn() {
        // Given
        let (mut world, storable) = fixture();
        let tag = world
            .register_component(Schema::new("Tag").bool("on"))
            .unwrap();
        let entity = world.create().unwrap();
        let id = storable.attach(&mut world, entity).unwrap();

        // When - unrelated attach/detach cycles
        world.attach(entity, tag).unwrap();
        world.detach(entity, tag).unwrap();

        // Then
        assert_eq!(storable.uuid_of(&world, entity).unwrap(), id);
        assert_eq!(storable.find(&world, id), Some(entity));
    }
}
