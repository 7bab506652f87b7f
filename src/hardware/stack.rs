use crate::hardware::{CALL_STACK_DEPTH, PC_MASK};
use std::fmt::{Debug, Formatter};

/// Error of a stack operation that would break the stack discipline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackError {
    Overflow,
    Underflow,
}

/// The 8 level hardware stack holding 13-bit return addresses.
///
/// Unlike the silicon, which wraps around after eight pushes, this stack refuses a push when
/// full and a pop when empty.
pub struct CallStack {
    entries: [u16; CALL_STACK_DEPTH],
    depth: usize,
}

impl Debug for CallStack {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.as_slice().iter().map(|a| format!("{a:#06X}")))
            .finish()
    }
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [0; CALL_STACK_DEPTH],
            depth: 0,
        }
    }
    pub const fn initialize(&mut self) {
        self.depth = 0;
    }
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.depth == CALL_STACK_DEPTH
    }
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.depth == 0
    }
    /// The address the next pop returns.
    #[must_use]
    pub fn top(&self) -> Option<u16> {
        self.as_slice().last().copied()
    }
    /// Saved return addresses, oldest first.
    #[must_use]
    pub fn as_slice(&self) -> &[u16] {
        &self.entries[..self.depth]
    }

    /// # Errors
    /// - [`StackError::Overflow`] if all levels are in use, the stack is unchanged then.
    pub fn push(&mut self, address: u16) -> Result<(), StackError> {
        if self.is_full() {
            return Err(StackError::Overflow);
        }
        self.entries[self.depth] = address & PC_MASK;
        self.depth += 1;
        Ok(())
    }

    /// # Errors
    /// - [`StackError::Underflow`] if the stack is empty.
    pub fn pop(&mut self) -> Result<u16, StackError> {
        if self.is_empty() {
            return Err(StackError::Underflow);
        }
        self.depth -= 1;
        Ok(self.entries[self.depth])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    pub fn test_push_pop_lifo() {
        let mut stack = CallStack::new();
        stack.push(0x0010).unwrap();
        stack.push(0x0234).unwrap();
        expect_that!(stack.depth(), eq(2));
        expect_that!(stack.top(), eq(Some(0x0234)));
        expect_that!(stack.pop(), eq(Ok(0x0234)));
        expect_that!(stack.pop(), eq(Ok(0x0010)));
        expect_that!(stack.is_empty(), eq(true));
    }
    #[gtest]
    pub fn test_push_masks_to_13_bits() {
        let mut stack = CallStack::new();
        stack.push(0xFFFF).unwrap();
        expect_that!(stack.pop(), eq(Ok(0x1FFF)));
    }
    #[gtest]
    pub fn test_overflow_is_refused() {
        let mut stack = CallStack::new();
        for address in 0..8 {
            stack.push(address).unwrap();
        }
        expect_that!(stack.is_full(), eq(true));
        expect_that!(stack.push(0x100), eq(Err(StackError::Overflow)));
        expect_that!(stack.depth(), eq(8));
        expect_that!(stack.top(), eq(Some(7)));
    }
    #[gtest]
    pub fn test_underflow_is_refused() {
        let mut stack = CallStack::new();
        expect_that!(stack.pop(), eq(Err(StackError::Underflow)));
        expect_that!(stack.top(), eq(None));
    }
    #[gtest]
    pub fn test_initialize_empties() {
        let mut stack = CallStack::new();
        stack.push(0x42).unwrap();
        stack.initialize();
        expect_that!(stack.is_empty(), eq(true));
        expect_that!(format!("{stack:?}"), eq("[]"));
    }
}
