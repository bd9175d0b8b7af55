//! Loop helpers that fan out over rayon when the `parallel` feature is on.
//!
//! Every helper visits items independently; callers only write the item
//! they are handed.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run `f` on every element with its index.
pub(crate) fn for_each_mut<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Send + Sync,
{
    #[cfg(feature = "parallel")]
    items.par_iter_mut().enumerate().for_each(|(i, item)| f(i, item));

    #[cfg(not(feature = "parallel"))]
    items.iter_mut().enumerate().for_each(|(i, item)| f(i, item));
}

/// Run a fallible `f` on every element, stopping at the first error.
pub(crate) fn try_for_each_mut<T, E, F>(items: &mut [T], f: F) -> Result<(), E>
where
    T: Send,
    E: Send,
    F: Fn(usize, &mut T) -> Result<(), E> + Send + Sync,
{
    #[cfg(feature = "parallel")]
    return items
        .par_iter_mut()
        .enumerate()
        .try_for_each(|(i, item)| f(i, item));

    #[cfg(not(feature = "parallel"))]
    items
        .iter_mut()
        .enumerate()
        .try_for_each(|(i, item)| f(i, item))
}

/// Map every element with its index into a new vector, order preserved.
pub(crate) fn map_collect<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Send + Sync,
{
    #[cfg(feature = "parallel")]
    return items.par_iter().enumerate().map(|(i, item)| f(i, item)).collect();

    #[cfg(not(feature = "parallel"))]
    items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
}

/// Smallest value of `f` over all elements, `f64::INFINITY` when empty.
pub(crate) fn min_by<T, F>(items: &[T], f: F) -> f64
where
    T: Sync,
    F: Fn(&T) -> f64 + Send + Sync,
{
    #[cfg(feature = "parallel")]
    return items.par_iter().map(f).reduce(|| f64::INFINITY, f64::min);

    #[cfg(not(feature = "parallel"))]
    items.iter().map(f).fold(f64::INFINITY, f64::min)
}
