/// Bounded byte queue between the producer and the render thread.
///
/// Not synchronized on its own: share it as
/// `Arc<parking_lot::Mutex<RingBuffer>>` so every `write`/`read_into` is a
/// single critical section.
///
/// One byte of capacity is reserved to tell full from empty, so at most
/// `capacity - 1` bytes are ever queued. A zero-capacity buffer is the
/// closed state: it accepts and yields nothing.
///
/// Overflow behavior: new data is refused (partial accept), queued data is
/// never overwritten.
#[derive(Debug, Default)]
pub struct RingBuffer {
    buffer: Vec<u8>,
    read_index: usize,
    write_index: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            read_index: 0,
            write_index: 0,
        }
    }

    /// Closed buffer with no storage.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy as much of `data` as fits. Returns the number of bytes accepted.
    ///
    /// Never blocks and never grows; the caller redelivers any unaccepted
    /// suffix if it wants lossless playback.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let to_write = data.len().min(self.free());
        if to_write == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let first = to_write.min(capacity - self.write_index);
        self.buffer[self.write_index..self.write_index + first].copy_from_slice(&data[..first]);
        if to_write > first {
            self.buffer[..to_write - first].copy_from_slice(&data[first..to_write]);
        }
        self.write_index = (self.write_index + to_write) % capacity;
        to_write
    }

    /// Move up to `out.len()` queued bytes into `out`. Returns the count.
    ///
    /// A short count means starvation; bytes of `out` past the count are
    /// left untouched for the caller to pad.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let to_read = out.len().min(self.available());
        if to_read == 0 {
            return 0;
        }

        let capacity = self.capacity();
        let first = to_read.min(capacity - self.read_index);
        out[..first].copy_from_slice(&self.buffer[self.read_index..self.read_index + first]);
        if to_read > first {
            out[first..to_read].copy_from_slice(&self.buffer[..to_read - first]);
        }
        self.read_index = (self.read_index + to_read) % capacity;
        to_read
    }

    /// Bytes queued for reading.
    pub fn available(&self) -> usize {
        if self.buffer.is_empty() {
            return 0;
        }
        (self.write_index + self.capacity() - self.read_index) % self.capacity()
    }

    /// Bytes that `write` would accept right now.
    pub fn free(&self) -> usize {
        self.capacity().saturating_sub(1) - self.available()
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Reset both cursors. Only call while no reader is running.
    pub fn reset(&mut self) {
        self.read_index = 0;
        self.write_index = 0;
    }

    /// Total storage in bytes, including the reserved byte.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(buf: &RingBuffer) {
        assert_eq!(buf.available() + buf.free(), buf.capacity() - 1);
    }

    #[test]
    fn basic_write_read() {
        let mut buf = RingBuffer::new(10);
        assert_eq!(buf.write(&[1, 2, 3]), 3);
        assert_eq!(buf.available(), 3);

        let mut out = [0u8; 3];
        assert_eq!(buf.read_into(&mut out), 3);
        assert_eq!(out, [1, 2, 3]);
        assert!(buf.is_empty());
    }

    #[test]
    fn reserves_one_byte() {
        let mut buf = RingBuffer::new(4);
        assert_eq!(buf.free(), 3);
        assert_eq!(buf.write(&[1, 2, 3, 4, 5]), 3);
        assert_eq!(buf.free(), 0);
        assert_eq!(buf.write(&[6]), 0);
        assert_invariant(&buf);
    }

    #[test]
    fn overflow_accepts_exactly_free() {
        let mut buf = RingBuffer::new(16);
        buf.write(&[0xAA; 5]);
        let free = buf.free();
        assert_eq!(free, 10);
        assert_eq!(buf.write(&[0xBB; 64]), free);
        assert_eq!(buf.available(), 15);

        // Earlier data was not overwritten.
        let mut out = [0u8; 15];
        buf.read_into(&mut out);
        assert_eq!(&out[..5], &[0xAA; 5]);
        assert_eq!(&out[5..], &[0xBB; 10]);
    }

    #[test]
    fn starved_read_leaves_tail_for_padding() {
        let mut buf = RingBuffer::new(8);
        buf.write(&[7, 8]);

        let mut out = [0xFFu8; 6];
        let taken = buf.read_into(&mut out);
        assert_eq!(taken, 2);
        out[taken..].fill(0);
        assert_eq!(out, [7, 8, 0, 0, 0, 0]);
    }

    #[test]
    fn wraparound() {
        let mut buf = RingBuffer::new(5);
        buf.write(&[1, 2, 3]);
        let mut skip = [0u8; 2];
        buf.read_into(&mut skip);

        // write cursor at 3, read cursor at 2: next write wraps
        assert_eq!(buf.write(&[4, 5, 6]), 3);
        assert_invariant(&buf);

        let mut out = [0u8; 4];
        assert_eq!(buf.read_into(&mut out), 4);
        assert_eq!(out, [3, 4, 5, 6]);
        assert_invariant(&buf);
    }

    #[test]
    fn invariant_holds_for_interleaved_ops() {
        let mut buf = RingBuffer::new(13);
        let mut next = 0u8;
        let mut expected = 0u8;
        for step in 0..200usize {
            let chunk: Vec<u8> = (0..(step % 7) + 1)
                .map(|_| {
                    let b = next;
                    next = next.wrapping_add(1);
                    b
                })
                .collect();
            let accepted = buf.write(&chunk);
            // Rewind the generator for anything refused.
            next = next.wrapping_sub((chunk.len() - accepted) as u8);
            assert_invariant(&buf);

            let mut out = vec![0u8; step % 5];
            let taken = buf.read_into(&mut out);
            for b in &out[..taken] {
                assert_eq!(*b, expected);
                expected = expected.wrapping_add(1);
            }
            assert_invariant(&buf);
        }
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buf = RingBuffer::new(10);
        buf.write(&[1, 2, 3]);
        buf.reset();

        assert!(buf.is_empty());
        assert_eq!(buf.free(), 9);
        let mut out = [0u8; 4];
        assert_eq!(buf.read_into(&mut out), 0);
    }

    #[test]
    fn empty_buffer_is_inert() {
        let mut buf = RingBuffer::empty();
        assert_eq!(buf.capacity(), 0);
        assert_eq!(buf.free(), 0);
        assert_eq!(buf.write(&[1, 2, 3]), 0);
        let mut out = [0u8; 2];
        assert_eq!(buf.read_into(&mut out), 0);
    }

    #[test]
    fn empty_operations() {
        let mut buf = RingBuffer::new(10);
        assert_eq!(buf.write(&[]), 0);
        assert_eq!(buf.read_into(&mut []), 0);
        assert!(buf.is_empty());
    }
}
