//! Monsters as seen by the vision engine
//!
//! Monsters live in the ECS world as `(Position, Monster)`; the map only
//! keeps a weak handle in `Tile::monster`.

use bitflags::bitflags;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::world::{Map, Position};

bitflags! {
    /// Light and darkness auras. `HAS_*` auras go out while the monster
    /// sleeps; `SELF_*` auras are innate and always shine.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AuraFlags: u8 {
        const HAS_LITE_1 = 1 << 0;
        const HAS_LITE_2 = 1 << 1;
        const SELF_LITE_1 = 1 << 2;
        const SELF_LITE_2 = 1 << 3;
        const HAS_DARK_1 = 1 << 4;
        const HAS_DARK_2 = 1 << 5;
        const SELF_DARK_1 = 1 << 6;
        const SELF_DARK_2 = 1 << 7;
    }
}

impl AuraFlags {
    /// Signed aura radius: positive lights, negative darkens
    pub fn radius(self) -> i32 {
        let mut rad = 0;
        if self.intersects(AuraFlags::HAS_LITE_1 | AuraFlags::SELF_LITE_1) {
            rad += 1;
        }
        if self.intersects(AuraFlags::HAS_LITE_2 | AuraFlags::SELF_LITE_2) {
            rad += 2;
        }
        if self.intersects(AuraFlags::HAS_DARK_1 | AuraFlags::SELF_DARK_1) {
            rad -= 1;
        }
        if self.intersects(AuraFlags::HAS_DARK_2 | AuraFlags::SELF_DARK_2) {
            rad -= 2;
        }
        rad
    }

    pub fn self_luminous(self) -> bool {
        self.intersects(AuraFlags::SELF_LITE_1 | AuraFlags::SELF_LITE_2)
    }

    pub fn self_darkening(self) -> bool {
        self.intersects(AuraFlags::SELF_DARK_1 | AuraFlags::SELF_DARK_2)
    }
}

/// Monster component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    pub name: String,
    pub aura: AuraFlags,
    pub asleep: bool,
}

impl Monster {
    pub fn new(name: &str, aura: AuraFlags) -> Self {
        Self {
            name: name.to_string(),
            aura,
            asleep: false,
        }
    }

    pub fn sleeping(mut self) -> Self {
        self.asleep = true;
        self
    }
}

/// Spawn a monster. Fails if the cell is off the map or already occupied.
pub fn spawn_monster(world: &mut World, map: &mut Map, pos: Position, monster: Monster) -> Option<Entity> {
    let tile = map.tile(pos)?;
    if tile.monster.is_some() {
        return None;
    }
    let entity = world.spawn((pos, monster));
    if let Some(tile) = map.tile_mut(pos) {
        tile.monster = Some(entity);
    }
    Some(entity)
}

/// Move a monster to an empty cell
pub fn move_monster(world: &mut World, map: &mut Map, entity: Entity, to: Position) -> bool {
    if map.tile(to).map_or(true, |t| t.monster.is_some()) {
        return false;
    }
    let Ok(mut pos) = world.get::<&mut Position>(entity) else {
        return false;
    };
    let from = *pos;
    *pos = to;
    drop(pos);

    if let Some(tile) = map.tile_mut(from) {
        if tile.monster == Some(entity) {
            tile.monster = None;
        }
    }
    if let Some(tile) = map.tile_mut(to) {
        tile.monster = Some(entity);
    }
    true
}

/// Remove a monster from the world and the map
pub fn remove_monster(world: &mut World, map: &mut Map, entity: Entity) -> Option<Monster> {
    let pos = world.get::<&Position>(entity).ok().map(|p| *p)?;
    if let Some(tile) = map.tile_mut(pos) {
        if tile.monster == Some(entity) {
            tile.monster = None;
        }
    }
    let (_, monster) = world.remove::<(Position, Monster)>(entity).ok()?;
    let _ = world.despawn(entity);
    Some(monster)
}
