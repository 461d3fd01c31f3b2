//! Splitting bulk writes into commit-sized chunks.

use crate::database::types::WriteOp;

/// Split `writes` into consecutive chunks of at most `batch_size` writes.
///
/// Order is preserved. A `batch_size` of 0 is treated as 1.
pub fn chunk_writes(writes: &[WriteOp], batch_size: usize) -> std::slice::Chunks<'_, WriteOp> {
    writes.chunks(batch_size.max(1))
}
