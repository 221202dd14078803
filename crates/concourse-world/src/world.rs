//! The bounded grid holding every placed entity.

use slotmap::{SlotMap, new_key_type};
use tracing::trace;

use crate::entity::{Entity, Position};
use crate::error::WorldError;

new_key_type! {
    /// Identifies an entity placed in a [`World`].
    pub struct EntityId;
}

/// A `width` by `height` grid of entities. Positions range over
/// `[0, width) x [0, height)`.
#[derive(Debug, Clone)]
pub struct World {
    width: i32,
    height: i32,
    entities: SlotMap<EntityId, Entity>,
}

impl World {
    pub fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        if width <= 0 || height <= 0 {
            return Err(WorldError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            entities: SlotMap::with_key(),
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    /// Every entity, in slot order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Place `entity`; fails if its position is off the grid.
    pub fn add(&mut self, entity: impl Into<Entity>) -> Result<EntityId, WorldError> {
        let entity = entity.into();
        self.check_bounds(&entity)?;
        trace!(entity_id = entity.entity_id(), position = %entity.position(), "adding entity");
        Ok(self.entities.insert(entity))
    }

    /// Place every entity, or none of them if any is off the grid.
    pub fn add_all<I>(&mut self, entities: I) -> Result<Vec<EntityId>, WorldError>
    where
        I: IntoIterator,
        I::Item: Into<Entity>,
    {
        let entities: Vec<Entity> = entities.into_iter().map(Into::into).collect();
        for entity in &entities {
            self.check_bounds(entity)?;
        }
        Ok(entities
            .into_iter()
            .map(|entity| self.entities.insert(entity))
            .collect())
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(id)
    }

    fn check_bounds(&self, entity: &Entity) -> Result<(), WorldError> {
        let position = entity.position();
        if self.contains(position) {
            Ok(())
        } else {
            Err(WorldError::OutOfBounds {
                position,
                width: self.width,
                height: self.height,
            })
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
