use sha2::Digest;

const HASH_BLOCK_U64_COUNT: usize = 4;

/// A 256-bit digest, used as a configuration/parameter identifier.
pub type HashBlock = [u64; HASH_BLOCK_U64_COUNT];

pub const HASH_ZERO_BLOCK: HashBlock = [0; HASH_BLOCK_U64_COUNT];

/// SHA-256 of a u64 slice (little-endian), packed back into u64 words.
pub fn hash(input: &[u64], destination: &mut HashBlock) {
    let mut hasher = sha2::Sha256::new();
    for word in input {
        hasher.update(word.to_le_bytes());
    }
    let digest = hasher.finalize();
    for (i, chunk) in digest.chunks_exact(8).enumerate().take(HASH_BLOCK_U64_COUNT) {
        destination[i] = u64::from_le_bytes(chunk.try_into().unwrap());
    }
}

/// A single deterministic bit from a byte string, via blake3.
///
/// This replaces cryptographic-hash-of-formatted-string tricks for
/// pseudo-randomness: same input, same bit, nothing else mixed in.
pub fn derive_bit(input: &[u8]) -> u8 {
    blake3::hash(input).as_bytes()[0] & 1
}

/// A deterministic bit keyed by a configuration id and a name.
pub fn derive_bit_keyed(key: &HashBlock, name: &str) -> u8 {
    let mut hasher = blake3::Hasher::new();
    for word in key {
        hasher.update(&word.to_le_bytes());
    }
    hasher.update(name.as_bytes());
    hasher.finalize().as_bytes()[0] & 1
}
