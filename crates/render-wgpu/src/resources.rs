//! Bookkeeping for GPU resources that does not need a device.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Number of texels in a `width` x `height` image, or `None` on overflow.
pub(crate) fn texel_count(width: u32, height: u32) -> Option<usize> {
    (width as usize).checked_mul(height as usize)
}

/// Byte length of a tightly packed RGBA8 image, or `None` on overflow.
pub(crate) fn rgba8_len(width: u32, height: u32) -> Option<usize> {
    texel_count(width, height)?.checked_mul(4)
}

/// Drop every cache entry whose key is not in `live`. Returns how many were dropped.
pub(crate) fn prune_unreferenced<K: Eq + Hash, V>(
    cache: &mut HashMap<K, V>,
    live: &HashSet<K>,
) -> usize {
    let before = cache.len();
    cache.retain(|key, _| live.contains(key));
    before - cache.len()
}
