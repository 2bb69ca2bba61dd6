//! Selector-keyed handler tables.
//!
//! A table is assembled once through [`SelectorTableBuilder`] and is read-only
//! afterward, so it can be shared between threads once built. Registering two
//! handlers under the same selector is a construction error; the table does not
//! try to tell whether two signatures were meant to be the same function.

use crate::error::DispatchError;
use alloy_primitives::Selector;
use std::collections::{hash_map::Entry, HashMap};

/// Length of a function selector.
pub const SELECTOR_SIZE: usize = 4;

/// Reads the selector from the first four bytes of a call payload.
pub fn payload_selector(payload: &[u8]) -> Option<Selector> {
    payload.get(..SELECTOR_SIZE).map(Selector::from_slice)
}

/// Immutable mapping from selector to handler.
#[derive(Debug, Clone)]
pub struct SelectorTable<H> {
    handlers: HashMap<Selector, H>,
}

impl<H> SelectorTable<H> {
    /// Starts an empty table.
    pub fn builder() -> SelectorTableBuilder<H> {
        SelectorTableBuilder { handlers: HashMap::new() }
    }

    /// Handler registered for `selector`.
    pub fn lookup(&self, selector: &Selector) -> Option<&H> {
        self.handlers.get(selector)
    }

    /// Handler for the selector at the start of `payload`.
    pub fn lookup_payload(&self, payload: &[u8]) -> Option<&H> {
        payload_selector(payload).and_then(|selector| self.lookup(&selector))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Collects handlers before a [`SelectorTable`] is frozen.
#[derive(Debug)]
pub struct SelectorTableBuilder<H> {
    handlers: HashMap<Selector, H>,
}

impl<H> SelectorTableBuilder<H> {
    /// Registers `handler` under `selector`.
    pub fn register(mut self, selector: Selector, handler: H) -> Result<Self, DispatchError> {
        match self.handlers.entry(selector) {
            Entry::Occupied(_) => return Err(DispatchError::DuplicateSelector(selector)),
            Entry::Vacant(slot) => {
                slot.insert(handler);
            }
        }
        Ok(self)
    }

    /// Freezes the table.
    pub fn build(self) -> SelectorTable<H> {
        SelectorTable { handlers: self.handlers }
    }
}
