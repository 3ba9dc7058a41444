use crate::record::MarketRecord;

/// Split `records` into consecutive chunks of at most `batch_size`.
///
/// # Panics
///
/// Panics if `batch_size` is zero; the configuration rejects that value.
pub fn batches(
    records: &[MarketRecord],
    batch_size: usize,
) -> impl ExactSizeIterator<Item = &[MarketRecord]> {
    records.chunks(batch_size)
}

/// Number of batches [`batches`] will yield.
pub fn batch_count(len: usize, batch_size: usize) -> usize {
    len.div_ceil(batch_size)
}
