//! Fixed-size integer register file.

use lockstep_core::{Error, ItemId, Result};

/// Fixed-size addressable array of integer slots.
///
/// Sized once at construction; items are plain indices into it. Reads and
/// writes are bounds-checked but otherwise unguarded — lock discipline lives
/// entirely in the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    slots: Vec<i64>,
}

impl Store {
    /// A store of `len` slots, all zero.
    pub fn zeroed(len: usize) -> Self {
        Store {
            slots: vec![0; len],
        }
    }

    /// A store of `len` slots where slot `i` holds `i + 1`.
    ///
    /// Handy for demos and tests where reads need distinguishable values.
    pub fn numbered(len: usize) -> Self {
        Store {
            slots: (1..=len as i64).collect(),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the store has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read one slot.
    pub fn read(&self, item: ItemId) -> Result<i64> {
        self.slots
            .get(item.index())
            .copied()
            .ok_or(Error::ItemOutOfBounds {
                item,
                len: self.slots.len(),
            })
    }

    /// Overwrite one slot. No side effects beyond the slot itself.
    pub fn write(&mut self, item: ItemId, value: i64) -> Result<()> {
        let len = self.slots.len();
        match self.slots.get_mut(item.index()) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::ItemOutOfBounds { item, len }),
        }
    }

    /// The current contents, in slot order.
    pub fn snapshot(&self) -> &[i64] {
        &self.slots
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}
