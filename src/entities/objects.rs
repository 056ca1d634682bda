//! Objects lying on the dungeon floor
//!
//! Whether the player has found an object is tracked on the object itself,
//! independent of whether the floor beneath it is memorized.

use hecs::{Entity, World};

use crate::world::{Map, Position};

/// Floor object component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorObject {
    pub name: String,
    /// The player knows this object is here
    pub found: bool,
}

impl FloorObject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            found: false,
        }
    }
}

/// Drop an object on a cell; it goes on top of the pile
pub fn drop_object(world: &mut World, map: &mut Map, pos: Position, object: FloorObject) -> Option<Entity> {
    map.tile(pos)?;
    let entity = world.spawn((pos, object));
    if let Some(tile) = map.tile_mut(pos) {
        tile.objects.insert(0, entity);
    }
    Some(entity)
}

/// Take an object off the floor, removing it from the world
pub fn pick_up(world: &mut World, map: &mut Map, entity: Entity) -> Option<FloorObject> {
    let pos = world.get::<&Position>(entity).ok().map(|p| *p)?;
    if let Some(tile) = map.tile_mut(pos) {
        tile.objects.retain(|&e| e != entity);
    }
    let (_, object) = world.remove::<(Position, FloorObject)>(entity).ok()?;
    let _ = world.despawn(entity);
    Some(object)
}

/// Mark every object on a cell as found
pub fn mark_found(world: &World, map: &Map, pos: Position) {
    let Some(tile) = map.tile(pos) else {
        return;
    };
    for &entity in &tile.objects {
        if let Ok(mut object) = world.get::<&mut FloorObject>(entity) {
            object.found = true;
        }
    }
}

/// Object detection: mark every object within `radius` (Chebyshev) as found
/// without memorizing the cells they lie on. Returns how many were found.
pub fn detect_objects(world: &mut World, center: Position, radius: i32) -> usize {
    let mut count = 0;
    for (_, (pos, object)) in world.query_mut::<(&Position, &mut FloorObject)>() {
        if pos.chebyshev_distance(&center) <= radius {
            object.found = true;
            count += 1;
        }
    }
    count
}

/// Forget every object the player had found
pub fn forget_objects(world: &mut World) {
    for (_, object) in world.query_mut::<&mut FloorObject>() {
        object.found = false;
    }
}

/// Mark every object on the level as found
pub fn find_all_objects(world: &mut World) {
    for (_, object) in world.query_mut::<&mut FloorObject>() {
        object.found = true;
    }
}
