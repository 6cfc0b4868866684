//! Object pools
//!
//! One pool per entity kind. Instances are created lazily when every existing
//! one is busy and are never dropped: "death" is deactivation, and the next
//! acquisition restores the transform from the prefab.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId};
use crate::error::{ConfigError, ConfigResult};
use crate::tuning::GameConfig;

/// Typed pool key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoolKind {
    Rocks,
    Enemies,
    PowerUps,
    Projectiles,
    RockExplosions,
    EnemyExplosions,
    PlayerExplosions,
}

impl PoolKind {
    pub const ALL: [PoolKind; 7] = [
        PoolKind::Rocks,
        PoolKind::Enemies,
        PoolKind::PowerUps,
        PoolKind::Projectiles,
        PoolKind::RockExplosions,
        PoolKind::EnemyExplosions,
        PoolKind::PlayerExplosions,
    ];
}

/// Growable pool of one kind
#[derive(Debug, Clone)]
pub struct Pool {
    kind: PoolKind,
    prefab: Entity,
    instances: Vec<Entity>,
    /// Every slot below this index is active
    first_free: usize,
}

impl Pool {
    pub fn new(kind: PoolKind, config: &GameConfig, initial_size: usize) -> Self {
        let prefab = Entity::prefab(EntityId::new(kind, 0), config);
        let mut pool = Self {
            kind,
            prefab,
            instances: Vec::with_capacity(initial_size),
            first_free: 0,
        };
        for _ in 0..initial_size {
            pool.instantiate();
        }
        pool
    }

    fn instantiate(&mut self) -> usize {
        let slot = self.instances.len();
        let mut instance = self.prefab.clone();
        instance.id = EntityId::new(self.kind, slot);
        instance.active = false;
        self.instances.push(instance);
        slot
    }

    /// Activate the first inactive instance, growing the pool if none is free
    pub fn acquire(&mut self) -> EntityId {
        let free = self.instances[self.first_free..]
            .iter()
            .position(|e| !e.active)
            .map(|i| i + self.first_free);

        let slot = match free {
            Some(slot) => slot,
            None => {
                let slot = self.instantiate();
                log::info!("Pool {:?} grew to {}", self.kind, self.instances.len());
                slot
            }
        };

        let instance = &mut self.instances[slot];
        instance.id.generation = instance.id.generation.wrapping_add(1);
        instance.body = self.prefab.body.clone();
        if let Some(movable) = instance.movable.as_mut() {
            movable.immune = false;
        }
        instance.active = true;
        self.first_free = slot + 1;
        instance.id
    }

    pub fn release(&mut self, slot: usize) {
        if let Some(instance) = self.instances.get_mut(slot) {
            instance.active = false;
            self.first_free = self.first_free.min(slot);
        }
    }

    pub fn release_all(&mut self) {
        for instance in &mut self.instances {
            instance.active = false;
        }
        self.first_free = 0;
    }

    pub fn get(&self, slot: usize) -> Option<&Entity> {
        self.instances.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Entity> {
        self.instances.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.instances.iter()
    }

    /// Historical high-water mark
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.instances.iter().filter(|e| e.active).count()
    }
}

/// Registry of pools keyed by kind
#[derive(Debug, Clone, Default)]
pub struct Pools {
    pools: BTreeMap<PoolKind, Pool>,
}

impl Pools {
    /// Register the pools listed in the config
    pub fn from_config(config: &GameConfig) -> Self {
        let mut pools = BTreeMap::new();
        for pc in &config.pools {
            pools
                .entry(pc.kind)
                .or_insert_with(|| Pool::new(pc.kind, config, pc.initial_size));
        }
        log::info!("Registered {} pools", pools.len());
        Self { pools }
    }

    pub fn pool(&self, kind: PoolKind) -> ConfigResult<&Pool> {
        self.pools.get(&kind).ok_or(ConfigError::MissingPool(kind))
    }

    pub fn pool_mut(&mut self, kind: PoolKind) -> ConfigResult<&mut Pool> {
        self.pools.get_mut(&kind).ok_or(ConfigError::MissingPool(kind))
    }

    pub fn acquire(&mut self, kind: PoolKind) -> ConfigResult<EntityId> {
        Ok(self.pool_mut(kind)?.acquire())
    }

    /// The instance `id` names, unless its slot has been reacquired since
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.pools
            .get(&id.kind)?
            .get(id.slot)
            .filter(|e| e.id.generation == id.generation)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.pools
            .get_mut(&id.kind)?
            .get_mut(id.slot)
            .filter(|e| e.id.generation == id.generation)
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.get(id).is_some_and(|e| e.active)
    }

    pub fn release(&mut self, id: EntityId) {
        if self.get(id).is_none() {
            return;
        }
        if let Some(pool) = self.pools.get_mut(&id.kind) {
            pool.release(id.slot);
        }
    }

    /// Deactivate every instance of every pool
    pub fn release_all(&mut self) {
        for pool in self.pools.values_mut() {
            pool.release_all();
        }
    }

    /// Active instances, ordered by kind then slot
    pub fn active_ids(&self) -> Vec<EntityId> {
        self.pools
            .values()
            .flat_map(|p| p.iter().filter(|e| e.active).map(|e| e.id))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.pools.values().map(Pool::active_count).sum()
    }

    /// Active instances that are not visual effects or projectiles
    pub fn active_hazards(&self) -> usize {
        self.pools
            .iter()
            .filter(|(k, _)| matches!(k, PoolKind::Rocks | PoolKind::Enemies | PoolKind::PowerUps))
            .map(|(_, p)| p.active_count())
            .sum()
    }
}
