//! Amortized-doubling array used for both halves of a problem.
//!
//! Capacity starts at one element and doubles whenever an append finds the
//! array full. Every allocation goes through `try_reserve_exact`, so running
//! out of memory is reported as `PluginError::Allocation` instead of aborting
//! the host process.

use std::mem::{self, ManuallyDrop};

use crate::common::error::{PluginError, PluginResult};

#[derive(Debug)]
pub struct GrowableArray<T> {
    items: Vec<T>,
    what: &'static str,
}

impl<T> GrowableArray<T> {
    /// Allocate an array with room for exactly one element. `what` names the
    /// array in allocation errors.
    pub fn try_new(what: &'static str) -> PluginResult<Self> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(1)
            .map_err(PluginError::allocation(what))?;
        Ok(Self { items, what })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.items.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Make room for one more element, doubling capacity if full.
    pub fn ensure_spare(&mut self) -> PluginResult<()> {
        if self.is_full() {
            let extra = self.items.capacity().max(1);
            self.items
                .try_reserve_exact(extra)
                .map_err(PluginError::allocation(self.what))?;
        }
        Ok(())
    }

    pub fn append(&mut self, element: T) -> PluginResult<()> {
        self.ensure_spare()?;
        self.items.push(element);
        Ok(())
    }

    /// Reallocate to exactly `len()` elements.
    pub fn shrink_to_fit(&mut self) -> PluginResult<()> {
        if self.items.capacity() == self.items.len() {
            return Ok(());
        }
        let mut exact = Vec::new();
        exact
            .try_reserve_exact(self.items.len())
            .map_err(PluginError::allocation(self.what))?;
        exact.append(&mut self.items);
        self.items = exact;
        Ok(())
    }

    /// Hand off the storage, trimmed to exactly `len()` elements.
    pub fn into_boxed_slice(mut self) -> PluginResult<Box<[T]>> {
        self.shrink_to_fit()?;
        Ok(self.items.into_boxed_slice())
    }
}

/// Fallible `Box::new`. On failure `value` is dropped before returning.
pub fn try_box<T>(value: T, what: &'static str) -> PluginResult<Box<T>> {
    if mem::size_of::<T>() == 0 {
        return Ok(Box::new(value));
    }
    let mut slot = Vec::new();
    slot.try_reserve_exact(1)
        .map_err(PluginError::allocation(what))?;
    slot.push(value);
    let mut slot = ManuallyDrop::new(slot);
    // SAFETY: a one-element Vec<T> owns a Global allocation with the layout
    // of `[T; 1]`, which equals `Layout::new::<T>()`, and holds one
    // initialised T. Ownership of both moves into the Box.
    Ok(unsafe { Box::from_raw(slot.as_mut_ptr()) })
}
