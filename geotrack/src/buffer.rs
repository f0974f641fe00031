/// Storage behind the [LineParser](crate::LineParser). We provide implementations for
/// `Vec<u8>` and for the owned [FixedBuffer], if you want to bound memory differently you
/// can implement this trait for your own type.
pub trait UnderlyingBuffer {
    /// Removes all bytes from the buffer.
    fn clear(&mut self);

    /// Returns the number of bytes currently stored in the buffer.
    fn len(&self) -> usize;

    /// Returns the maximum number of bytes this buffer can hold.
    ///
    /// The Vec implementation returns `usize::MAX`; the line parser applies its own
    /// line length limit on top of this.
    fn max_capacity(&self) -> usize;

    /// Appends bytes, returning the number of bytes not copied due to capacity.
    fn extend_from_slice(&mut self, other: &[u8]) -> usize;

    /// The stored bytes.
    fn as_slice(&self) -> &[u8];

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UnderlyingBuffer for Vec<u8> {
    fn clear(&mut self) {
        self.clear();
    }

    fn len(&self) -> usize {
        self.len()
    }

    fn max_capacity(&self) -> usize {
        usize::MAX
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        self.extend_from_slice(other);
        0
    }

    fn as_slice(&self) -> &[u8] {
        self
    }
}

/// Line storage with a capacity known at compile time. The [Tracker](crate::Tracker)
/// keeps its partial serial line in one of these, so a stream without newlines never
/// grows memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedBuffer<const N: usize> {
    bytes: [u8; N],
    filled: usize,
}

impl<const N: usize> FixedBuffer<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            filled: 0,
        }
    }

    /// Bytes that can still be appended.
    pub fn remaining(&self) -> usize {
        N - self.filled
    }
}

impl<const N: usize> Default for FixedBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> UnderlyingBuffer for FixedBuffer<N> {
    fn clear(&mut self) {
        self.filled = 0;
    }

    fn len(&self) -> usize {
        self.filled
    }

    fn max_capacity(&self) -> usize {
        N
    }

    fn extend_from_slice(&mut self, other: &[u8]) -> usize {
        let (kept, rejected) = other.split_at(other.len().min(self.remaining()));
        self.bytes[self.filled..][..kept.len()].copy_from_slice(kept);
        self.filled += kept.len();
        rejected.len()
    }

    fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.filled]
    }
}
