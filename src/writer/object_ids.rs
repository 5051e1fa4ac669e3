//! Object number allocation.

/// Hands out PDF object numbers.
///
/// Takes `&mut self`, so a single allocator cannot be shared by two writers
/// at once.
pub trait ObjectIdAllocator {
    /// Allocate the next free object number.
    fn allocate(&mut self) -> u32;
}

/// Monotonic allocator starting at a caller-chosen number.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u32,
}

impl SequentialIds {
    /// Start allocating at `first` (object 0 is reserved, so 0 becomes 1).
    pub fn new(first: u32) -> Self {
        Self { next: first.max(1) }
    }

    /// Number the next call to `allocate` returns.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ObjectIdAllocator for SequentialIds {
    fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}
