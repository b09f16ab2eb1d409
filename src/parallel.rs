//! Order-preserving fan-out over slices.
//!
//! With the `parallel` feature the map runs on the rayon thread pool;
//! without it, sequentially. Results always come back in input order, so
//! sums folded over them are identical either way.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Map `f` over `slice`, preserving order.
#[inline]
pub fn map_slice<T, F, R>(slice: &[T], f: F) -> Vec<R>
where
    T: Sync,
    F: Fn(&T) -> R + Sync + Send,
    R: Send,
{
    #[cfg(feature = "parallel")]
    {
        slice.par_iter().map(f).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        slice.iter().map(f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_slice_preserves_order() {
        let values: Vec<u64> = (0..1000).collect();
        let squares = map_slice(&values, |v| v * v);
        assert_eq!(squares.len(), 1000);
        assert!(squares.iter().enumerate().all(|(i, s)| *s == (i as u64) * (i as u64)));
    }
}
