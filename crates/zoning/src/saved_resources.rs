//! Zoning resources carried in a save file's extension map.
//!
//! Each resource is stored bitcode-encoded under a stable key and left out of
//! the map while it holds its default value. On load, keys nothing registered
//! are ignored and bytes that fail to decode fall back to the default.

use std::collections::BTreeMap;

use bevy::prelude::*;

pub trait SavedResource:
    Resource + Default + PartialEq + bitcode::Encode + bitcode::DecodeOwned
{
    /// Extension map key. Must never change once files exist.
    const SAVE_KEY: &'static str;

    fn to_save_bytes(&self) -> Option<Vec<u8>> {
        (*self != Self::default()).then(|| bitcode::encode(self))
    }

    fn from_save_bytes(bytes: &[u8]) -> Self {
        bitcode::decode(bytes).unwrap_or_else(|err| {
            warn!(
                "Saved resource '{}': {} bytes did not decode ({}), using defaults",
                Self::SAVE_KEY,
                bytes.len(),
                err
            );
            Self::default()
        })
    }
}

#[derive(Clone, Copy)]
struct ResourceCodec {
    key: &'static str,
    encode: fn(&World) -> Option<Vec<u8>>,
    decode: fn(&mut World, &[u8]),
}

fn encode_resource<T: SavedResource>(world: &World) -> Option<Vec<u8>> {
    world.get_resource::<T>()?.to_save_bytes()
}

fn decode_resource<T: SavedResource>(world: &mut World, bytes: &[u8]) {
    world.insert_resource(T::from_save_bytes(bytes));
}

/// Every [`SavedResource`] the zoning plugins registered.
#[derive(Resource, Default)]
pub struct SavedResources {
    codecs: Vec<ResourceCodec>,
}

impl SavedResources {
    /// A second registration under the same key is ignored.
    pub fn register<T: SavedResource>(&mut self) {
        if self.codecs.iter().any(|c| c.key == T::SAVE_KEY) {
            warn!("Saved resource '{}' registered twice", T::SAVE_KEY);
            return;
        }
        self.codecs.push(ResourceCodec {
            key: T::SAVE_KEY,
            encode: encode_resource::<T>,
            decode: decode_resource::<T>,
        });
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codecs.iter().map(|c| c.key)
    }

    pub fn encode_all(&self, world: &World) -> BTreeMap<String, Vec<u8>> {
        self.codecs
            .iter()
            .filter_map(|c| Some((c.key.to_string(), (c.encode)(world)?)))
            .collect()
    }

    /// Restore every registered resource present in `extensions`. Resources
    /// missing from the map keep their current value. Returns how many were
    /// restored.
    pub fn decode_all(&self, world: &mut World, extensions: &BTreeMap<String, Vec<u8>>) -> usize {
        let mut restored = 0;
        for codec in &self.codecs {
            if let Some(bytes) = extensions.get(codec.key) {
                (codec.decode)(world, bytes);
                restored += 1;
            }
        }
        restored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcode::{Decode, Encode};

    #[derive(Resource, Default, Debug, Clone, PartialEq, Encode, Decode)]
    struct PaintCount {
        strokes: u32,
    }

    impl SavedResource for PaintCount {
        const SAVE_KEY: &'static str = "paint_count";
    }

    fn registry() -> SavedResources {
        let mut registry = SavedResources::default();
        registry.register::<PaintCount>();
        registry
    }

    #[test]
    fn test_default_value_is_left_out() {
        let mut world = World::new();
        world.init_resource::<PaintCount>();
        assert!(registry().encode_all(&world).is_empty());
    }

    #[test]
    fn test_changed_value_survives_a_round_trip() {
        let mut world = World::new();
        world.insert_resource(PaintCount { strokes: 12 });
        let registry = registry();
        let extensions = registry.encode_all(&world);

        let mut fresh = World::new();
        fresh.init_resource::<PaintCount>();
        assert_eq!(registry.decode_all(&mut fresh, &extensions), 1);
        assert_eq!(fresh.resource::<PaintCount>().strokes, 12);
    }

    #[test]
    fn test_missing_key_keeps_current_value() {
        let mut world = World::new();
        world.insert_resource(PaintCount { strokes: 3 });
        let mut extensions = BTreeMap::new();
        extensions.insert("some_other_mod".to_string(), vec![1, 2, 3]);

        assert_eq!(registry().decode_all(&mut world, &extensions), 0);
        assert_eq!(world.resource::<PaintCount>().strokes, 3);
    }

    #[test]
    fn test_garbage_bytes_restore_default() {
        let mut world = World::new();
        world.insert_resource(PaintCount { strokes: 3 });
        let mut extensions = BTreeMap::new();
        extensions.insert(PaintCount::SAVE_KEY.to_string(), vec![0xFF]);

        registry().decode_all(&mut world, &extensions);
        assert_eq!(*world.resource::<PaintCount>(), PaintCount::default());
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut registry = registry();
        registry.register::<PaintCount>();
        assert_eq!(registry.keys().count(), 1);
    }
}
