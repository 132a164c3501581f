/// Container-kind stack with one bit per open container: `true` for an
/// object, `false` for an array.
///
/// The first 64 levels live inline in a `u64`; deeper nesting spills to a
/// heap vector, so the common case never allocates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BitStack {
    inline: u64,
    depth: usize,
    spill: Vec<u64>,
}

const WORD_BITS: usize = u64::BITS as usize;

impl BitStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub(crate) fn push(&mut self, is_object: bool) {
        let bit = u64::from(is_object);
        if self.depth < WORD_BITS {
            self.inline |= bit << self.depth;
        } else {
            let word = (self.depth - WORD_BITS) / WORD_BITS;
            let shift = (self.depth - WORD_BITS) % WORD_BITS;
            if word == self.spill.len() {
                self.spill.push(0);
            }
            self.spill[word] &= !(1 << shift);
            self.spill[word] |= bit << shift;
        }
        self.depth += 1;
    }

    pub(crate) fn peek(&self) -> Option<bool> {
        if self.depth == 0 {
            return None;
        }
        let top = self.depth - 1;
        let bit = if top < WORD_BITS {
            self.inline >> top
        } else {
            self.spill[(top - WORD_BITS) / WORD_BITS] >> ((top - WORD_BITS) % WORD_BITS)
        };
        Some(bit & 1 == 1)
    }

    pub(crate) fn pop(&mut self) -> Option<bool> {
        let top = self.peek()?;
        self.depth -= 1;
        if self.depth < WORD_BITS {
            // Keep bits above the cursor cleared so push can OR blindly.
            self.inline &= !(1 << self.depth);
        }
        Some(top)
    }
}

#[cfg(test)]
mod tests {
    use super::BitStack;

    #[test]
    fn push_pop_inline() {
        let mut stack = BitStack::new();
        assert_eq!(stack.peek(), None);
        stack.push(true);
        stack.push(false);
        stack.push(true);
        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.peek(), Some(true));
        assert_eq!(stack.pop(), Some(true));
        assert_eq!(stack.pop(), Some(false));
        assert_eq!(stack.pop(), Some(true));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn spills_past_sixty_four_levels() {
        let mut stack = BitStack::new();
        for i in 0..200 {
            stack.push(i % 3 == 0);
        }
        assert_eq!(stack.depth(), 200);
        for i in (0..200).rev() {
            assert_eq!(stack.pop(), Some(i % 3 == 0), "level {i}");
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn reuse_after_pop_does_not_leak_old_bits() {
        let mut stack = BitStack::new();
        stack.push(true);
        assert_eq!(stack.pop(), Some(true));
        stack.push(false);
        assert_eq!(stack.peek(), Some(false));
    }
}
