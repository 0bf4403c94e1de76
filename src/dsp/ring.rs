//! Multichannel capture ring buffer.

/// Fixed-capacity circular history, one lane per channel.
///
/// Storage is planar (`channel * capacity + index`) and allocated once. Writes
/// take interleaved frames straight from the host block and wrap at capacity,
/// overwriting the oldest history.
pub struct RingBuffer {
    data: Box<[f32]>,
    channels: usize,
    capacity: usize,
    write_pos: usize,
}

impl RingBuffer {
    pub fn new(channels: usize, capacity: usize) -> Self {
        let channels = channels.max(1);
        let capacity = capacity.max(1);
        Self {
            data: vec![0.0; channels * capacity].into_boxed_slice(),
            channels,
            capacity,
            write_pos: 0,
        }
    }

    /// Append interleaved frames. A trailing partial frame is ignored.
    pub fn write_interleaved(&mut self, frames: &[f32]) {
        let frame_count = frames.len() / self.channels;

        for (ch, lane) in self.data.chunks_exact_mut(self.capacity).enumerate() {
            let mut w = self.write_pos;
            for frame in frames.chunks_exact(self.channels) {
                lane[w] = frame[ch];
                w += 1;
                if w == self.capacity {
                    w = 0;
                }
            }
        }

        self.write_pos = (self.write_pos + frame_count) % self.capacity;
    }

    /// Fill `dest` with the newest `dest.len()` samples of `channel`, oldest first.
    ///
    /// Walks backward from the write cursor, so `dest[dest.len() - 1]` is the
    /// most recently written sample. `dest` longer than the capacity wraps
    /// around into older laps.
    pub fn copy_latest(&self, channel: usize, dest: &mut [f32]) {
        self.copy_ending(channel, 0, dest);
    }

    /// Like `copy_latest`, but the copy ends `skip` samples before the newest.
    pub fn copy_ending(&self, channel: usize, skip: usize, dest: &mut [f32]) {
        let lane = self.lane(channel);
        let mut r = (self.write_pos + self.capacity - skip % self.capacity) % self.capacity;
        for slot in dest.iter_mut().rev() {
            r = if r == 0 { self.capacity - 1 } else { r - 1 };
            *slot = lane[r];
        }
    }

    /// Sample written `age` writes ago (`age = 0` is the newest).
    pub fn sample_ago(&self, channel: usize, age: usize) -> f32 {
        let age = age % self.capacity;
        let idx = (self.write_pos + self.capacity - 1 - age) % self.capacity;
        self.lane(channel)[idx]
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.write_pos = 0;
    }

    #[inline]
    pub fn write_position(&self) -> usize {
        self.write_pos
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    #[inline]
    fn lane(&self, channel: usize) -> &[f32] {
        let start = channel * self.capacity;
        &self.data[start..start + self.capacity]
    }
}
