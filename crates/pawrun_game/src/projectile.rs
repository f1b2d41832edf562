//! Player projectiles: straight-line shots that expire after a fixed range
//! and kill at most one enemy each.

use pawrun_core::geometry::Rect;

use crate::config::CombatConfig;
use crate::controller::Shot;
use crate::pool::FixedPool;
use crate::world::{Enemy, Projectile, MAX_PROJECTILES};

pub const PROJECTILE_WIDTH: f32 = 10.0;
pub const PROJECTILE_HEIGHT: f32 = 4.0;

/// Activate the first free slot for `shot`. Returns false when every slot
/// is in flight and the shot was dropped.
pub fn spawn_projectile(
    pool: &mut FixedPool<Projectile, MAX_PROJECTILES>,
    shot: Shot,
    combat: &CombatConfig,
) -> bool {
    match pool.claim(|p| !p.active) {
        Some(slot) => {
            *slot = Projectile {
                bounds: Rect::from_center(shot.origin, PROJECTILE_WIDTH, PROJECTILE_HEIGHT),
                velocity_x: combat.projectile_speed * shot.direction,
                distance_travelled: 0.0,
                active: true,
            };
            true
        }
        None => {
            log::debug!("Projectile pool full, shot dropped");
            false
        }
    }
}

/// Move every active projectile, retire the ones past their range and
/// resolve hits. Awards `shot_score` per kill; returns the number of kills.
pub fn update_projectiles(
    projectiles: &mut [Projectile],
    enemies: &mut [Enemy],
    score: &mut u32,
    combat: &CombatConfig,
    dt: f32,
) -> u32 {
    let mut kills = 0;
    for projectile in projectiles.iter_mut().filter(|p| p.active) {
        let dx = projectile.velocity_x * dt;
        projectile.bounds.x += dx;
        projectile.distance_travelled += dx.abs();
        if projectile.distance_travelled >= combat.projectile_range {
            projectile.active = false;
            continue;
        }

        if let Some(enemy) = enemies
            .iter_mut()
            .find(|e| e.active && e.hitbox.overlaps(&projectile.bounds))
        {
            enemy.active = false;
            projectile.active = false;
            *score += combat.shot_score;
            kills += 1;
            log::debug!(
                "Projectile hit enemy at ({:.1}, {:.1})",
                enemy.position.x,
                enemy.position.y
            );
        }
    }
    kills
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn enemy_at(x: f32) -> Enemy {
        Enemy::new(Vec2::new(x, 340.0), 60.0, 1.0, Vec2::new(20.0, 24.0))
    }

    fn shot_at(x: f32, direction: f32) -> Shot {
        Shot {
            origin: Vec2::new(x, 328.0),
            direction,
        }
    }

    #[test]
    fn one_projectile_kills_only_the_first_overlapping_enemy() {
        let combat = CombatConfig::default();
        let mut pool = FixedPool::new();
        assert!(spawn_projectile(&mut pool, shot_at(190.0, 1.0), &combat));
        let mut enemies = [enemy_at(200.0), enemy_at(205.0)];
        let mut score = 0;

        let kills = update_projectiles(pool.as_mut_slice(), &mut enemies, &mut score, &combat, DT);
        assert_eq!(kills, 1);
        assert!(!enemies[0].active);
        assert!(enemies[1].active);
        assert!(!pool[0].active);
        assert_eq!(score, 50);
    }

    #[test]
    fn projectile_expires_after_range() {
        let combat = CombatConfig::default();
        let mut pool = FixedPool::new();
        spawn_projectile(&mut pool, shot_at(0.0, -1.0), &combat);
        let mut score = 0;

        let mut frames = 0;
        while pool[0].active {
            update_projectiles(pool.as_mut_slice(), &mut [], &mut score, &combat, DT);
            frames += 1;
            assert!(frames < 1000, "projectile never expired");
        }
        // 900 px at 520 px/s is a little over 1.7 s.
        assert!((100..=105).contains(&frames), "expired after {frames} frames");
        assert!(pool[0].bounds.x < -800.0);
    }

    #[test]
    fn spawn_reuses_inactive_slots_and_drops_when_full() {
        let combat = CombatConfig::default();
        let mut pool = FixedPool::new();
        for i in 0..MAX_PROJECTILES {
            assert!(spawn_projectile(&mut pool, shot_at(i as f32, 1.0), &combat));
        }
        assert!(!spawn_projectile(&mut pool, shot_at(0.0, 1.0), &combat));

        pool[7].active = false;
        assert!(spawn_projectile(&mut pool, shot_at(999.0, 1.0), &combat));
        assert!(pool[7].active);
        assert_eq!(pool[7].bounds.center().x, 999.0);
        assert_eq!(pool.len(), MAX_PROJECTILES);
    }
}
