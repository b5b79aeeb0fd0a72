use std::hash::Hasher;

// An f32 that supports Hash and Eq. Generally this is dangerous, but pipeline and
// sampler state blobs need to key hash maps and the values in them are plain
// constants (bias values, lod clamps). NaN never appears in well-formed state.
#[derive(Debug, Copy, Clone, Default)]
pub struct DecimalF32(pub f32);

impl Into<f32> for DecimalF32 {
    fn into(self) -> f32 {
        self.0
    }
}

impl PartialEq for DecimalF32 {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.0 == other.0
    }
}

impl Eq for DecimalF32 {}

impl std::hash::Hash for DecimalF32 {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        let bits: u32 = self.0.to_bits();
        bits.hash(state);
    }
}

// An f64 that supports Hash and Eq, same rules as DecimalF32.
#[derive(Debug, Copy, Clone, Default)]
pub struct DecimalF64(pub f64);

impl Into<f64> for DecimalF64 {
    fn into(self) -> f64 {
        self.0
    }
}

impl PartialEq for DecimalF64 {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.0 == other.0
    }
}

impl Eq for DecimalF64 {}

impl std::hash::Hash for DecimalF64 {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        let bits: u64 = self.0.to_bits();
        bits.hash(state);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_values_hash_equal() {
        assert_eq!(hash_of(&DecimalF32(1.5)), hash_of(&DecimalF32(1.5)));
        assert_ne!(hash_of(&DecimalF32(1.5)), hash_of(&DecimalF32(2.5)));
        assert_eq!(DecimalF32(0.25), DecimalF32(0.25));
    }
}
