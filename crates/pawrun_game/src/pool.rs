//! Fixed-capacity entity storage: a flat array of `N` slots plus a count.
//!
//! Nothing here allocates after construction. Slots are never removed;
//! entities carry their own `active` flag and a level reset clears the pool.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone)]
pub struct FixedPool<T: Copy + Default, const N: usize> {
    slots: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> FixedPool<T, N> {
    pub fn new() -> Self {
        Self {
            slots: [T::default(); N],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub fn push(&mut self, item: T) -> Result<usize, String> {
        if self.is_full() {
            return Err(format!("pool is full (capacity {N})"));
        }
        self.slots[self.len] = item;
        self.len += 1;
        Ok(self.len - 1)
    }

    /// First slot (in storage order) matching `free`, growing into unused
    /// capacity when every used slot is taken.
    pub fn claim(&mut self, free: impl Fn(&T) -> bool) -> Option<&mut T> {
        if let Some(i) = self.slots[..self.len].iter().position(|s| free(s)) {
            return Some(&mut self.slots[i]);
        }
        if !self.is_full() {
            self.len += 1;
            self.slots[self.len - 1] = T::default();
            return Some(&mut self.slots[self.len - 1]);
        }
        None
    }

    pub fn clear(&mut self) {
        self.slots = [T::default(); N];
        self.len = 0;
    }

    pub fn as_slice(&self) -> &[T] {
        &self.slots[..self.len]
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.slots[..self.len]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy + Default, const N: usize> Default for FixedPool<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> Index<usize> for FixedPool<T, N> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T: Copy + Default, const N: usize> IndexMut<usize> for FixedPool<T, N> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}
