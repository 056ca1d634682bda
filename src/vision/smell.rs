//! Scent field
//!
//! Each player turn stamps the current scent epoch, plus a small bonus
//! near the player, on passable cells around them that they can see.

use super::context::VisionContext;
use crate::data::VisionConfig;
use crate::entities::PlayerState;
use crate::world::{CellFlags, Map};

/// Stamp offsets around the player; `-1` cells are never stamped
pub const SCENT_KERNEL: [[i8; 5]; 5] = [
    [-1, 0, 0, 0, -1],
    [0, 1, 1, 1, 0],
    [0, 1, 2, 1, 0],
    [0, 1, 1, 1, 0],
    [-1, 0, 0, 0, -1],
];

/// Advance the scent epoch and lay down fresh scent.
///
/// When the epoch reaches `config.scent_wrap` every stamp on the map is
/// halved and the epoch drops to half the wrap value, which keeps older
/// trails older than newer ones.
pub fn update_smell(ctx: &mut VisionContext, map: &mut Map, player: &PlayerState, config: &VisionConfig) {
    ctx.scent_epoch = ctx.scent_epoch.saturating_add(1);
    if ctx.scent_epoch >= config.scent_wrap {
        for tile in &mut map.tiles {
            tile.when /= 2;
        }
        ctx.scent_epoch = config.scent_wrap / 2;
        log::trace!("scent epoch wrapped, rebased to {}", ctx.scent_epoch);
    }

    for (i, row) in SCENT_KERNEL.iter().enumerate() {
        for (j, &bonus) in row.iter().enumerate() {
            if bonus < 0 {
                continue;
            }
            let pos = player.pos.offset(j as i32 - 2, i as i32 - 2);
            if !map.is_passable(pos) || !map.has_info(pos, CellFlags::VIEW) {
                continue;
            }
            if let Some(tile) = map.tile_mut(pos) {
                tile.when = ctx.scent_epoch + bonus as u16;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::view::update_view;
    use crate::world::Position;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn when(map: &Map, pos: Position) -> u16 {
        map.tile(pos).unwrap().when
    }

    #[test]
    fn test_kernel_stamp() {
        let mut map = Map::open(9, 9);
        let mut ctx = VisionContext::new(9, 9);
        let player = PlayerState::new(p(4, 4));
        let config = VisionConfig::default();
        update_view(&mut ctx, &mut map, &player, &config);
        update_smell(&mut ctx, &mut map, &player, &config);

        assert_eq!(ctx.scent_epoch(), 1);
        assert_eq!(when(&map, p(4, 4)), 3);
        assert_eq!(when(&map, p(5, 3)), 2);
        assert_eq!(when(&map, p(6, 4)), 1);
        assert_eq!(when(&map, p(3, 2)), 1);
        // Corners of the kernel and anything further out
        assert_eq!(when(&map, p(6, 6)), 0);
        assert_eq!(when(&map, p(2, 2)), 0);
        assert_eq!(when(&map, p(7, 4)), 0);
    }

    #[test]
    fn test_walls_and_hidden_cells_hold_no_scent() {
        let mut map = Map::from_ascii(&[
            ".....",
            ".....",
            "..@#.",
            ".....",
            ".....",
        ]);
        let mut ctx = VisionContext::new(5, 5);
        let player = PlayerState::new(p(2, 2));
        let config = VisionConfig::default();
        update_view(&mut ctx, &mut map, &player, &config);
        update_smell(&mut ctx, &mut map, &player, &config);

        assert_eq!(when(&map, p(3, 2)), 0);
        // Behind the wall, out of view
        assert!(!map.has_info(p(4, 2), CellFlags::VIEW));
        assert_eq!(when(&map, p(4, 2)), 0);
        assert!(!map.has_info(p(4, 1), CellFlags::VIEW));
        assert_eq!(when(&map, p(4, 1)), 0);
        assert_eq!(when(&map, p(3, 1)), 2);
        assert_eq!(when(&map, p(4, 3)), 0);
        assert_eq!(when(&map, p(0, 2)), 1);
    }

    #[test]
    fn test_unseen_player_leaves_no_scent() {
        let mut map = Map::open(5, 5);
        let mut ctx = VisionContext::new(5, 5);
        update_smell(&mut ctx, &mut map, &PlayerState::new(p(2, 2)), &VisionConfig::default());
        assert!(map.tiles.iter().all(|t| t.when == 0));
    }

    #[test]
    fn test_wrap_halves_and_keeps_order() {
        let mut map = Map::open(20, 5);
        let mut ctx = VisionContext::new(20, 5);
        let config = VisionConfig {
            scent_wrap: 10,
            ..Default::default()
        };
        let older = p(1, 1);
        let newer = p(18, 3);
        map.tile_mut(older).unwrap().when = 4;
        map.tile_mut(newer).unwrap().when = 9;
        ctx.scent_epoch = 9;

        update_smell(&mut ctx, &mut map, &PlayerState::new(p(10, 2)), &config);
        assert_eq!(ctx.scent_epoch(), 5);
        assert_eq!(when(&map, older), 2);
        assert_eq!(when(&map, newer), 4);
        assert!(when(&map, older) < when(&map, newer));
    }

    #[test]
    fn test_trail_ages_across_wrap() {
        let mut map = Map::open(30, 3);
        let mut ctx = VisionContext::new(30, 3);
        let config = VisionConfig {
            scent_wrap: 4,
            ..Default::default()
        };
        let mut player = PlayerState::new(p(2, 1));

        for x in (2..28).step_by(5) {
            player.pos = p(x, 1);
            update_view(&mut ctx, &mut map, &player, &config);
            update_smell(&mut ctx, &mut map, &player, &config);
        }

        // Cells stepped on later always smell fresher
        let trail: Vec<u16> = (2..28).step_by(5).map(|x| when(&map, p(x, 1))).collect();
        assert!(trail.windows(2).all(|w| w[0] <= w[1]), "{:?}", trail);
        assert!(trail.iter().all(|&w| w <= config.scent_wrap + 2));
        assert_eq!(ctx.scent_epoch(), 2);
    }
}
