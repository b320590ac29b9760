use crate::{
    StackError, STACK_GROWTH_FACTOR, STACK_MIN_CAPACITY, STACK_SHRINK_FACTOR,
    STACK_SHRINK_THRESHOLD,
};

/// A growable last-in/first-out stack of fixed-size slots.
///
/// Both the operand stack and the frame stack of the VM are instances of
/// this type. Besides push/pop it supports the bulk operations and the
/// absolute indexed access the locals-window addressing requires.
///
/// Capacity management is explicit: the stack starts at
/// `STACK_MIN_CAPACITY`, doubles when full, and is halved once the live
/// size drops to an eighth of the capacity (but never below the minimum).
#[derive(Debug)]
pub struct SlotStack<T> {
    data: Vec<T>,
}

impl<T: Copy> SlotStack<T> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self::with_capacity(STACK_MIN_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.max(STACK_MIN_CAPACITY)),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    fn grow_for(&mut self, additional: usize) {
        let required = self.data.len() + additional;
        if required <= self.data.capacity() {
            return;
        }

        let mut new_capacity = self.data.capacity().max(STACK_MIN_CAPACITY);
        while new_capacity < required {
            new_capacity *= STACK_GROWTH_FACTOR;
        }
        self.data.reserve_exact(new_capacity - self.data.len());
    }

    fn shrink_if_sparse(&mut self) {
        let size = self.data.len();
        if size == 0 {
            return;
        }

        if self.data.capacity() >= size * STACK_SHRINK_THRESHOLD {
            let new_capacity = size * STACK_SHRINK_FACTOR;
            if new_capacity < STACK_MIN_CAPACITY {
                return;
            }
            self.data.shrink_to(new_capacity);
        }
    }

    pub fn push(&mut self, value: T) {
        self.grow_for(1);
        self.data.push(value);
    }

    /// Pushes `count` copies of `value`.
    ///
    /// `call_func` uses this to fill the callee's extra local slots
    /// with `none`.
    pub fn push_n(&mut self, value: T, count: usize) {
        self.grow_for(count);
        for _ in 0..count {
            self.data.push(value);
        }
    }

    pub fn pop(&mut self) -> Result<T, StackError> {
        let value = self.data.pop().ok_or(StackError::Underflow)?;
        self.shrink_if_sparse();
        Ok(value)
    }

    /// Discards the `count` topmost slots.
    pub fn pop_n(&mut self, count: usize) -> Result<(), StackError> {
        if count > self.data.len() {
            return Err(StackError::Underflow);
        }
        self.data.truncate(self.data.len() - count);
        self.shrink_if_sparse();
        Ok(())
    }

    /// Cuts the stack down to `size` slots. A no-op when the stack is
    /// already smaller. The return cleanup truncates to the saved
    /// `stack_base` this way.
    pub fn truncate(&mut self, size: usize) {
        self.data.truncate(size);
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.data.last_mut()
    }

    /// A view of the `count` topmost slots, bottom-to-top. This is the
    /// argument window of `call_c_func`.
    pub fn top_slice(&self, count: usize) -> Option<&[T]> {
        let size = self.data.len();
        if count > size {
            return None;
        }
        Some(&self.data[size - count..])
    }

    /// Clears all slots and resets nothing else; the capacity is kept so a
    /// VM can run several programs without reallocating.
    pub fn reset(&mut self) {
        self.data.clear();
    }
}
