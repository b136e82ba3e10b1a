//! A mock, NON-SECURE stand-in for the BFV oracle.
//!
//! The AUX-QHE core only needs a black-box integer-coefficient
//! encrypt/decrypt/add/multiply oracle for single bits; this module provides
//! one with the exact interface shape of a real BFV library (context,
//! key generator, encoder, encryptor, decryptor, evaluator) but no lattice
//! underneath: ciphertexts carry their coefficients in the clear, tagged
//! with the id of the key that made them. Decrypting under the wrong key is
//! caught; eavesdropping is not. Do not use this for anything but
//! experiments with the surrounding protocol.

use std::sync::Arc;

use rand::RngCore;

use crate::hashing::{self, HashBlock, HASH_ZERO_BLOCK};

/// Parameters of the mock scheme: coefficient vector length and the
/// plaintext coefficient modulus.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BfvParams {
    poly_degree: usize,
    plain_modulus: u64,
}

impl Default for BfvParams {
    fn default() -> Self {
        Self {
            poly_degree: 1024,
            plain_modulus: 65537,
        }
    }
}

impl BfvParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_poly_degree(mut self, poly_degree: usize) -> Self {
        if poly_degree == 0 {
            panic!("[Invalid argument] Polynomial degree must be positive.");
        }
        self.poly_degree = poly_degree;
        self
    }

    pub fn set_plain_modulus(mut self, plain_modulus: u64) -> Self {
        if plain_modulus < 2 {
            panic!("[Invalid argument] Plain modulus must be at least 2.");
        }
        self.plain_modulus = plain_modulus;
        self
    }

    pub fn poly_degree(&self) -> usize {
        self.poly_degree
    }

    pub fn plain_modulus(&self) -> u64 {
        self.plain_modulus
    }
}

/// Shared context holding the parameters and their digest id.
///
/// Like a real HE context this is created once and passed around in an
/// [Arc]; every object derived from it checks ids so that material from
/// different parameterizations cannot be mixed up silently.
#[derive(Debug)]
pub struct BfvContext {
    parms: BfvParams,
    parms_id: HashBlock,
}

impl BfvContext {
    pub fn new(parms: BfvParams) -> Arc<Self> {
        let mut parms_id = HASH_ZERO_BLOCK;
        hashing::hash(&[parms.poly_degree as u64, parms.plain_modulus], &mut parms_id);
        Arc::new(Self { parms, parms_id })
    }

    pub fn parms(&self) -> &BfvParams {
        &self.parms
    }

    pub fn parms_id(&self) -> &HashBlock {
        &self.parms_id
    }
}

/// A plaintext: `poly_degree` coefficients mod the plain modulus.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Plaintext {
    data: Vec<u64>,
}

impl Plaintext {
    pub fn data(&self) -> &[u64] {
        &self.data
    }
}

/// A mock ciphertext: the coefficients plus the id of the encrypting key.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Ciphertext {
    data: Vec<u64>,
    key_id: u64,
    parms_id: HashBlock,
}

impl Ciphertext {
    pub fn parms_id(&self) -> &HashBlock {
        &self.parms_id
    }
}

/// The mock secret key: a random identifier, nothing more.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BfvSecretKey {
    key_id: u64,
}

impl BfvSecretKey {
    pub fn key_id(&self) -> u64 {
        self.key_id
    }
}

/// Generates (mock) key material for a context.
pub struct BfvKeyGenerator {
    context: Arc<BfvContext>,
    secret_key: BfvSecretKey,
}

impl BfvKeyGenerator {
    pub fn new(context: Arc<BfvContext>) -> Self {
        let mut rng = rand::thread_rng();
        let secret_key = BfvSecretKey {
            key_id: rng.next_u64(),
        };
        Self {
            context,
            secret_key,
        }
    }

    pub fn context(&self) -> &Arc<BfvContext> {
        &self.context
    }

    pub fn secret_key(&self) -> &BfvSecretKey {
        &self.secret_key
    }
}

/// Encodes integer vectors into [Plaintext]s by padding or truncating to the
/// polynomial degree and reducing mod the plain modulus.
pub struct BfvEncoder {
    context: Arc<BfvContext>,
}

impl BfvEncoder {
    pub fn new(context: Arc<BfvContext>) -> Self {
        Self { context }
    }

    pub fn encode(&self, values: &[u64]) -> Plaintext {
        let parms = self.context.parms();
        let mut data = vec![0u64; parms.poly_degree()];
        for (slot, value) in data.iter_mut().zip(values.iter()) {
            *slot = value % parms.plain_modulus();
        }
        Plaintext { data }
    }

    pub fn decode(&self, plain: &Plaintext) -> Vec<u64> {
        plain.data.clone()
    }

    /// Encode a single bit into slot 0.
    pub fn encode_bit(&self, bit: u8) -> Plaintext {
        self.encode(&[bit as u64])
    }

    /// Read slot 0 back out of a decoded plaintext.
    pub fn decode_bit_raw(&self, plain: &Plaintext) -> u64 {
        plain.data.first().copied().unwrap_or(0)
    }
}

/// Encrypts plaintexts under a secret key (mock: tags them with the key id).
pub struct BfvEncryptor {
    context: Arc<BfvContext>,
    secret_key: BfvSecretKey,
}

impl BfvEncryptor {
    pub fn new(context: Arc<BfvContext>, secret_key: BfvSecretKey) -> Self {
        Self {
            context,
            secret_key,
        }
    }

    pub fn encrypt(&self, plain: &Plaintext) -> Ciphertext {
        if plain.data.len() != self.context.parms().poly_degree() {
            panic!("[Invalid argument] Plaintext was not encoded for these parameters.");
        }
        Ciphertext {
            data: plain.data.clone(),
            key_id: self.secret_key.key_id,
            parms_id: *self.context.parms_id(),
        }
    }
}

/// Decrypts ciphertexts; panics when the ciphertext was made under a
/// different key or parameters.
pub struct BfvDecryptor {
    context: Arc<BfvContext>,
    secret_key: BfvSecretKey,
}

impl BfvDecryptor {
    pub fn new(context: Arc<BfvContext>, secret_key: BfvSecretKey) -> Self {
        Self {
            context,
            secret_key,
        }
    }

    pub fn decrypt(&self, cipher: &Ciphertext) -> Plaintext {
        if cipher.parms_id != *self.context.parms_id() {
            panic!("[Invalid argument] Ciphertext is not valid for these parameters.");
        }
        if cipher.key_id != self.secret_key.key_id {
            panic!("[Invalid argument] Ciphertext was not encrypted under this key.");
        }
        Plaintext {
            data: cipher.data.clone(),
        }
    }
}

/// Homomorphic operations on mock ciphertexts.
///
/// Addition is coefficient-wise; multiplication is the negacyclic
/// convolution mod (X^N + 1), matching what decrypting and multiplying the
/// underlying plaintext polynomials would give. Neither is used by the core
/// polynomial evaluator; they exist so the oracle is a complete collaborator
/// and can self-test.
pub struct BfvEvaluator {
    context: Arc<BfvContext>,
}

impl BfvEvaluator {
    pub fn new(context: Arc<BfvContext>) -> Self {
        Self { context }
    }

    fn check_pair(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) {
        if cipher1.parms_id != *self.context.parms_id() || cipher2.parms_id != *self.context.parms_id() {
            panic!("[Invalid argument] Ciphertext is not valid for these parameters.");
        }
        if cipher1.key_id != cipher2.key_id {
            panic!("[Invalid argument] Ciphertexts were encrypted under different keys.");
        }
    }

    pub fn add(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) -> Ciphertext {
        self.check_pair(cipher1, cipher2);
        let t = self.context.parms().plain_modulus();
        let data = cipher1
            .data
            .iter()
            .zip(cipher2.data.iter())
            .map(|(x, y)| (x + y) % t)
            .collect();
        Ciphertext {
            data,
            key_id: cipher1.key_id,
            parms_id: cipher1.parms_id,
        }
    }

    pub fn multiply(&self, cipher1: &Ciphertext, cipher2: &Ciphertext) -> Ciphertext {
        self.check_pair(cipher1, cipher2);
        let t = self.context.parms().plain_modulus();
        let n = self.context.parms().poly_degree();
        let mut data = vec![0u64; n];
        for (i, x) in cipher1.data.iter().enumerate() {
            if *x == 0 {
                continue;
            }
            for (j, y) in cipher2.data.iter().enumerate() {
                if *y == 0 {
                    continue;
                }
                let product = (x * y) % t;
                let k = i + j;
                if k < n {
                    data[k] = (data[k] + product) % t;
                } else {
                    // X^N ≡ -1
                    data[k - n] = (data[k - n] + t - product) % t;
                }
            }
        }
        Ciphertext {
            data,
            key_id: cipher1.key_id,
            parms_id: cipher1.parms_id,
        }
    }
}
