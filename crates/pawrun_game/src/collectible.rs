//! One-shot pickups: touching an item marks it taken and awards score once.

use crate::world::{Collectible, Player};

/// Pick up every untaken collectible the player overlaps. `taken` only ever
/// goes false -> true, so a pickup is awarded once. Returns the pickup count.
pub fn collect(collectibles: &mut [Collectible], player: &mut Player, score_each: u32) -> u32 {
    let mut picked = 0;
    for item in collectibles.iter_mut().filter(|c| !c.taken) {
        if item.bounds.overlaps(&player.hitbox) {
            item.taken = true;
            player.score += score_each;
            picked += 1;
            log::debug!("Collected pickup at ({:.1}, {:.1})", item.position.x, item.position.y);
        }
    }
    picked
}
