//! Delta / d-gap transforms for sorted integer sequences.
//!
//! A strictly ascending id list compresses far better as gaps: each value
//! (except the first) is replaced by its difference from the predecessor.
//! The forward transform additionally bumps the first element by one, so
//! every transformed value of an ascending list is ≥ 1 — a requirement of
//! codes like Elias-gamma that cannot represent zero.
//!
//! Both directions use wrapping arithmetic, which makes [`atled`] the exact
//! inverse of [`delta`] over any window, ascending or not.

/// In-place forward transform over one window.
///
/// `values[i] -= values[i-1]` from the back, then `values[0] += 1`.
/// Window-scoped: apply to a subslice to transform only that window.
/// No-op on the empty slice.
pub fn delta(values: &mut [u32]) {
    if values.is_empty() {
        return;
    }
    for i in (1..values.len()).rev() {
        values[i] = values[i].wrapping_sub(values[i - 1]);
    }
    values[0] = values[0].wrapping_add(1);
}

/// In-place inverse of [`delta`] over the same window.
///
/// `values[0] -= 1`, then a forward prefix sum.
pub fn atled(values: &mut [u32]) {
    if values.is_empty() {
        return;
    }
    values[0] = values[0].wrapping_sub(1);
    for i in 1..values.len() {
        values[i] = values[i].wrapping_add(values[i - 1]);
    }
}

/// Streaming forward transform for values arriving one at a time.
///
/// Unlike [`delta`], the streaming form carries no +1 bump: it returns
/// plain `current - previous` gaps. Starts from an implicit previous of 0.
#[derive(Debug, Default, Clone)]
pub struct DeltaEncoder {
    prev: u32,
}

impl DeltaEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gap from the previously encoded value; remembers `value`.
    #[inline]
    pub fn encode(&mut self, value: u32) -> u32 {
        let gap = value.wrapping_sub(self.prev);
        self.prev = value;
        gap
    }
}

/// Streaming inverse of [`DeltaEncoder`]: accumulates gaps back into values.
#[derive(Debug, Default, Clone)]
pub struct DeltaDecoder {
    sum: u32,
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Running sum plus `gap`; remembers the new sum.
    #[inline]
    pub fn decode(&mut self, gap: u32) -> u32 {
        self.sum = self.sum.wrapping_add(gap);
        self.sum
    }
}
