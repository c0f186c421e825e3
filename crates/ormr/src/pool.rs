//! Fixed-capacity object pools.
//!
//! A [`Pool`] is a dense array of slots plus a [`BitSet`] marking which slots
//! are in use. Spawning takes the first free slot, releasing clears the bit
//! and resets the slot, so no per-object heap allocation ever happens after
//! construction. Enemy lists and similar bounded entity sets use this.

use std::fmt;

use crate::bitset::BitSet;

/// Errors that can occur when spawning into a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every slot is in use; the spawn request was dropped.
    Full {
        /// Pool capacity.
        capacity: usize,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Full { capacity } => write!(f, "pool is full ({capacity} slots in use)"),
        }
    }
}

impl std::error::Error for PoolError {}

/// A bounded set of `T` addressed by slot index.
pub struct Pool<T> {
    slots: Vec<T>,
    activity: BitSet,
}

impl<T: Default> Pool<T> {
    /// Create a pool with `capacity` free slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
            activity: BitSet::new(capacity),
        }
    }

    /// Place `value` in the first free slot and return its index.
    pub fn spawn(&mut self, value: T) -> Result<usize, PoolError> {
        let Some(index) = self.activity.first_inactive() else {
            log::warn!("Failed to spawn into pool: all {} slots in use", self.capacity());
            return Err(PoolError::Full {
                capacity: self.capacity(),
            });
        };

        self.slots[index] = value;
        self.activity.activate(index);
        Ok(index)
    }

    /// Free the slot at `index` and reset it to `T::default()`.
    pub fn release(&mut self, index: usize) {
        assert!(self.activity.is_active(index), "release of inactive pool slot {index}");

        self.activity.deactivate(index);
        self.slots[index] = T::default();
    }

    /// Release every slot matching `predicate`. Returns how many were released.
    pub fn release_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let doomed: Vec<usize> = self
            .activity
            .iter_active()
            .filter(|&i| predicate(&self.slots[i]))
            .collect();

        for &i in &doomed {
            self.release(i);
        }
        doomed.len()
    }
}

impl<T> Pool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.activity.count_active()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.activity.is_active(index)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.activity.is_active(index).then(|| &self.slots[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if self.activity.is_active(index) {
            Some(&mut self.slots[index])
        } else {
            None
        }
    }

    /// Iterate live slots as `(index, &T)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.activity.iter_active().map(move |i| (i, &self.slots[i]))
    }

    /// Iterate live slots mutably as `(index, &mut T)`.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        let activity = &self.activity;
        self.slots
            .iter_mut()
            .enumerate()
            .filter(move |(i, _)| activity.is_active(*i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Enemy {
        hp: i32,
    }

    #[test]
    fn spawn_takes_first_free_slot() {
        let mut pool = Pool::new(4);
        assert_eq!(pool.spawn(Enemy { hp: 1 }), Ok(0));
        assert_eq!(pool.spawn(Enemy { hp: 2 }), Ok(1));
        assert_eq!(pool.spawn(Enemy { hp: 3 }), Ok(2));

        pool.release(1);
        assert_eq!(pool.get(1), None);
        assert_eq!(pool.spawn(Enemy { hp: 4 }), Ok(1), "freed slot should be reused");
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn full_pool_drops_spawn() {
        let mut pool = Pool::new(2);
        pool.spawn(Enemy { hp: 1 }).unwrap();
        pool.spawn(Enemy { hp: 1 }).unwrap();
        assert_eq!(pool.spawn(Enemy { hp: 9 }), Err(PoolError::Full { capacity: 2 }));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn release_resets_slot() {
        let mut pool = Pool::new(2);
        let i = pool.spawn(Enemy { hp: 50 }).unwrap();
        pool.release(i);
        let j = pool.spawn(Enemy::default()).unwrap();
        assert_eq!(i, j);
        assert_eq!(pool.get(j), Some(&Enemy { hp: 0 }));
    }

    #[test]
    fn iteration_skips_inactive() {
        let mut pool = Pool::new(8);
        for hp in 0..5 {
            pool.spawn(Enemy { hp }).unwrap();
        }
        let released = pool.release_where(|e| e.hp % 2 == 1);
        assert_eq!(released, 2);

        let live: Vec<usize> = pool.iter().map(|(i, _)| i).collect();
        assert_eq!(live, vec![0, 2, 4]);

        for (_, enemy) in pool.iter_mut() {
            enemy.hp += 10;
        }
        assert_eq!(pool.get(4), Some(&Enemy { hp: 14 }));
    }
}
