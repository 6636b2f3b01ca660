const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Partition `0..ntot` into contiguous `(lb, ub)` intervals for
/// block-parallel processing
/// * `ntot` - number of total elements
/// * `block_size` - elements per block (`0` falls back to the default)
pub fn create_jobs(ntot: usize, block_size: usize) -> Vec<(usize, usize)> {
    let block_size = if block_size == 0 {
        DEFAULT_BLOCK_SIZE
    } else {
        block_size
    };

    let nblock = ntot.div_ceil(block_size);
    (0..nblock)
        .map(|block| {
            let lb = block * block_size;
            let ub = ((block + 1) * block_size).min(ntot);
            (lb, ub)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jobs_cover_the_range() {
        assert_eq!(create_jobs(10, 3), vec![(0, 3), (3, 6), (6, 9), (9, 10)]);
        assert_eq!(create_jobs(6, 3), vec![(0, 3), (3, 6)]);
        assert_eq!(create_jobs(1, 100), vec![(0, 1)]);
        assert_eq!(create_jobs(0, 10), vec![]);
    }

    #[test]
    fn zero_block_size_uses_default() {
        assert_eq!(create_jobs(5, 0), vec![(0, 5)]);
    }
}
