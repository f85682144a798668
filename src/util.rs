use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let unit = |bits: u64| (bits as f64 / u32::MAX as f64) as f32 * 2.0 - 1.0;
    (unit(hash & 0xffff_ffff), unit(hash >> 32))
}
