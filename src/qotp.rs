use crate::bfv::{BfvDecryptor, BfvEncoder, BfvEncryptor, Ciphertext};
use crate::circuit::{Gate, QuantumCircuit};
use crate::diagnostics::{Diagnostics, Warning};

/// Applies the quantum one-time pad around a circuit.
///
/// Per qubit `i` of the input circuit, `Z^{b[i]}` then `X^{a[i]}` are placed
/// on wire `offset + i` *before* the circuit's own gates (the pad has to be
/// conjugated through the circuit, so it must act first), and the key bits
/// are encrypted through the oracle. Returns the padded circuit over a
/// `max_qubits`-wide register, the next free offset, and the encrypted key
/// bit vectors — or `None` when the circuit does not fit at the requested
/// offset (a configuration error the caller must check for, not a panic).
pub fn qotp_encrypt(
    circuit: &QuantumCircuit,
    a: &[u8],
    b: &[u8],
    offset: usize,
    max_qubits: usize,
    encoder: &BfvEncoder,
    encryptor: &BfvEncryptor,
) -> Option<(QuantumCircuit, usize, Vec<Ciphertext>, Vec<Ciphertext>)> {
    let num_qubits = circuit.num_qubits();
    if a.len() != num_qubits || b.len() != num_qubits {
        panic!(
            "[Invalid argument] Key vectors must have one bit per circuit qubit ({}).",
            num_qubits
        );
    }
    if offset + num_qubits > max_qubits {
        return None;
    }

    let mut encrypted = QuantumCircuit::new(max_qubits);
    for i in 0..num_qubits {
        if b[i] & 1 == 1 {
            encrypted.add_gate(Gate::Z(offset + i));
        }
        if a[i] & 1 == 1 {
            encrypted.add_gate(Gate::X(offset + i));
        }
    }
    for gate in circuit.gates() {
        encrypted.add_gate(gate.shifted(offset));
    }

    let enc_a = a
        .iter()
        .map(|bit| encryptor.encrypt(&encoder.encode_bit(bit & 1)))
        .collect();
    let enc_b = b
        .iter()
        .map(|bit| encryptor.encrypt(&encoder.encode_bit(bit & 1)))
        .collect();

    Some((encrypted, offset + num_qubits, enc_a, enc_b))
}

/// Removes the (evolved) one-time pad from an evaluated circuit.
///
/// Each final key bit is decrypted and sanitized to {0, 1} — a decoded value
/// outside {0, 1} is reduced mod 2 with a [Warning::NonBinaryKeyBit] rather
/// than trusted — then `Z^{b}` followed by `X^{a}` is appended per qubit.
/// X and Z are self-inverse, so appending the same pad undoes the encryption
/// up to a global phase (this deliberately sidesteps full conjugation
/// bookkeeping; the polynomial evaluation already folded the circuit's
/// action into the final key bits).
pub fn qotp_decrypt(
    circuit: &QuantumCircuit,
    final_enc_a: &[Ciphertext],
    final_enc_b: &[Ciphertext],
    encoder: &BfvEncoder,
    decryptor: &BfvDecryptor,
    diagnostics: &mut Diagnostics,
) -> QuantumCircuit {
    if final_enc_a.len() != final_enc_b.len() {
        panic!("[Invalid argument] Mismatched encrypted key vectors.");
    }
    if final_enc_a.len() > circuit.num_qubits() {
        panic!("[Invalid argument] More key bits than circuit qubits.");
    }

    let mut decrypt_bit = |cipher: &Ciphertext, wire: usize| -> u8 {
        let value = encoder.decode_bit_raw(&decryptor.decrypt(cipher));
        if value > 1 {
            diagnostics.push(Warning::NonBinaryKeyBit { wire, value });
        }
        (value % 2) as u8
    };

    let mut decrypted = circuit.clone();
    for wire in 0..final_enc_a.len() {
        let a_bit = decrypt_bit(&final_enc_a[wire], wire);
        let b_bit = decrypt_bit(&final_enc_b[wire], wire);
        if b_bit == 1 {
            decrypted.add_gate(Gate::Z(wire));
        }
        if a_bit == 1 {
            decrypted.add_gate(Gate::X(wire));
        }
    }
    decrypted
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bfv::{BfvContext, BfvKeyGenerator, BfvParams};

    fn oracle() -> (BfvEncoder, BfvEncryptor, BfvDecryptor) {
        let context = BfvContext::new(BfvParams::new().set_poly_degree(8).set_plain_modulus(17));
        let keygen = BfvKeyGenerator::new(Arc::clone(&context));
        (
            BfvEncoder::new(Arc::clone(&context)),
            BfvEncryptor::new(Arc::clone(&context), keygen.secret_key().clone()),
            BfvDecryptor::new(context, keygen.secret_key().clone()),
        )
    }

    #[test]
    fn test_encrypt_prepends_pad_before_circuit() {
        let (encoder, encryptor, _) = oracle();
        let mut circuit = QuantumCircuit::new(2);
        circuit.h(0).cnot(0, 1);
        let (encrypted, next_offset, enc_a, enc_b) =
            qotp_encrypt(&circuit, &[1, 0], &[0, 1], 0, 2, &encoder, &encryptor).unwrap();
        assert_eq!(
            encrypted.gates(),
            &[Gate::X(0), Gate::Z(1), Gate::H(0), Gate::Cnot(0, 1)]
        );
        assert_eq!(next_offset, 2);
        assert_eq!(enc_a.len(), 2);
        assert_eq!(enc_b.len(), 2);
    }

    #[test]
    fn test_encrypt_respects_offset() {
        let (encoder, encryptor, _) = oracle();
        let mut circuit = QuantumCircuit::new(1);
        circuit.h(0);
        let (encrypted, next_offset, _, _) =
            qotp_encrypt(&circuit, &[1], &[1], 2, 4, &encoder, &encryptor).unwrap();
        assert_eq!(encrypted.num_qubits(), 4);
        assert_eq!(encrypted.gates(), &[Gate::Z(2), Gate::X(2), Gate::H(2)]);
        assert_eq!(next_offset, 3);
    }

    #[test]
    fn test_encrypt_bound_check_returns_none() {
        let (encoder, encryptor, _) = oracle();
        let circuit = QuantumCircuit::new(3);
        assert!(qotp_encrypt(&circuit, &[0, 0, 0], &[0, 0, 0], 1, 3, &encoder, &encryptor).is_none());
    }

    #[test]
    fn test_key_bits_round_trip_through_oracle() {
        let (encoder, encryptor, decryptor) = oracle();
        let circuit = QuantumCircuit::new(2);
        let (encrypted, _, enc_a, enc_b) =
            qotp_encrypt(&circuit, &[1, 0], &[0, 1], 0, 2, &encoder, &encryptor).unwrap();
        let mut diagnostics = Diagnostics::new();
        let decrypted = qotp_decrypt(&encrypted, &enc_a, &enc_b, &encoder, &decryptor, &mut diagnostics);
        assert!(diagnostics.is_clean());
        // Empty circuit: pad on, pad off (decryption walks wires in order).
        assert_eq!(
            decrypted.gates(),
            &[Gate::X(0), Gate::Z(1), Gate::X(0), Gate::Z(1)]
        );
    }

    #[test]
    fn test_decrypt_sanitizes_non_binary_bits() {
        let (encoder, encryptor, decryptor) = oracle();
        let circuit = QuantumCircuit::new(1);
        // A "key bit" of 3 can only come from a drifted oracle; it must be
        // reduced, not trusted.
        let bad = encryptor.encrypt(&encoder.encode(&[3]));
        let zero = encryptor.encrypt(&encoder.encode_bit(0));
        let mut diagnostics = Diagnostics::new();
        let decrypted = qotp_decrypt(&circuit, &[bad], &[zero], &encoder, &decryptor, &mut diagnostics);
        assert_eq!(decrypted.gates(), &[Gate::X(0)]);
        assert_eq!(
            diagnostics.warnings(),
            &[Warning::NonBinaryKeyBit { wire: 0, value: 3 }]
        );
    }
}
