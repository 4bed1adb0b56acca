use crate::Generator;
use rand::Rng;
use tunnel_core::base62::ShortCodeBase62;
use typed_builder::TypedBuilder;

const RANDOM_BITS: u32 = 48;

/// Generates codes from 48 random bits rendered in base62.
///
/// The encoding is left-padded with `'0'` to `length` characters, or cut to
/// its first `length` characters when longer.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGenerator {
    #[builder(default = 8)]
    length: usize,
}

impl RandomGenerator {
    pub fn with_length(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Generator for RandomGenerator {
    type Output = ShortCodeBase62;

    fn generate(&self) -> Self::Output {
        let value = rand::thread_rng().gen::<u64>() >> (u64::BITS - RANDOM_BITS);
        ShortCodeBase62::encode_fixed(value, self.length)
    }
}
