//! Reuse-first object pools
//!
//! A pool never drops members: deactivated entities stay in the backing
//! vector and are handed out again before anything new is allocated, so
//! steady-state play does not allocate.

use serde::{Deserialize, Serialize};

use super::entities::{Entity, WorldView};

/// An entity that can live in a [`Pool`]
pub trait Poolable: Entity {
    /// What a step may ask the driver to do (e.g. fire a bullet)
    type Output;

    /// Factory for a fresh, inactive instance
    fn create() -> Self;

    /// Advance this entity by `dt` seconds
    fn step(&mut self, dt: f32, world: &WorldView) -> Option<Self::Output>;
}

/// A growable set of reusable entities of one kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool<T> {
    items: Vec<T>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Poolable> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out an inactive member, growing the pool only when none is free
    ///
    /// The returned entity is still inactive; the caller activates it.
    pub fn acquire(&mut self) -> (usize, &mut T) {
        let index = match self.items.iter().position(|item| !item.is_active()) {
            Some(index) => index,
            None => {
                self.items.push(T::create());
                self.items.len() - 1
            }
        };
        (index, &mut self.items[index])
    }

    /// Step every active member, forwarding whatever they emit
    pub fn step_all(&mut self, dt: f32, world: &WorldView, mut emit: impl FnMut(T::Output)) {
        for item in self.items.iter_mut().filter(|item| item.is_active()) {
            if let Some(output) = item.step(dt, world) {
                emit(output);
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Indices of active members, in pool order
    pub fn active_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_active())
            .map(|(index, _)| index)
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| item.is_active())
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut().filter(|item| item.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.iter_active().count()
    }

    /// Number of members ever allocated
    pub fn capacity(&self) -> usize {
        self.items.len()
    }
}
