//! Contact detection
//!
//! Every collider is a circle. Detection only reports who touched whom;
//! damage and its consequences are resolved by the world, in the order the
//! contacts are returned.

use glam::Vec2;

use super::entity::{Behavior, Entity, EntityId, Target};
use super::player::Player;
use super::pool::{PoolKind, Pools};

/// A pair that touched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// A projectile reached something it may damage
    Projectile { projectile: EntityId, victim: Target },
    /// The ship touched a rock or an enemy
    Ram { hazard: EntityId },
}

/// Overlap test between two circles (touching counts)
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a_pos.distance_squared(b_pos) <= reach * reach
}

fn touches(a: &Entity, b_pos: Vec2, b_radius: f32) -> bool {
    circles_overlap(a.body.pos, a.body.radius, b_pos, b_radius)
}

/// Collect this tick's contacts: projectile hits first (projectile slot
/// order), then the ship ramming hazards (kind then slot order).
///
/// A projectile never hits its own shooter; projectiles only damage things
/// that carry a hit model.
pub fn find_contacts(player: &Player, pools: &Pools) -> Vec<Contact> {
    let mut contacts = Vec::new();

    let victims: Vec<&Entity> = [PoolKind::Rocks, PoolKind::Enemies]
        .into_iter()
        .filter_map(|kind| pools.pool(kind).ok())
        .flat_map(|pool| pool.iter())
        .filter(|e| e.collidable() && e.hit.is_some())
        .collect();

    if let Ok(projectiles) = pools.pool(PoolKind::Projectiles) {
        for shot in projectiles.iter().filter(|e| e.collidable()) {
            let Behavior::Projectile { owner, .. } = shot.behavior else {
                continue;
            };

            if owner != Target::Player
                && player.collidable()
                && touches(shot, player.body.pos, player.body.radius)
            {
                contacts.push(Contact::Projectile {
                    projectile: shot.id,
                    victim: Target::Player,
                });
                continue;
            }

            let hit = victims
                .iter()
                .find(|v| owner != v.target() && touches(shot, v.body.pos, v.body.radius));
            if let Some(victim) = hit {
                contacts.push(Contact::Projectile {
                    projectile: shot.id,
                    victim: victim.target(),
                });
            }
        }
    }

    if player.collidable() {
        for hazard in &victims {
            if touches(hazard, player.body.pos, player.body.radius) {
                contacts.push(Contact::Ram { hazard: hazard.id });
            }
        }
    }

    contacts
}
