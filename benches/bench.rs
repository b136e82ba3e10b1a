use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use auxqhe::{
    aux_eval, aux_keygen, build_term_sets, qotp_encrypt, BfvContext, BfvEncoder, BfvEncryptor,
    BfvKeyGenerator, BfvParams, QuantumCircuit,
};

fn term_set_benchmark(c: &mut Criterion) {
    for (qubits, depth) in [(2usize, 2usize), (2, 3), (4, 2)] {
        c.bench_function(&format!("BuildTermSets(n={},L={})", qubits, depth), |b| {
            b.iter(|| build_term_sets(black_box(qubits), black_box(depth)))
        });
    }
}

fn keygen_benchmark(c: &mut Criterion) {
    for (qubits, depth) in [(2usize, 2usize), (2, 3)] {
        let a = vec![1u8; qubits];
        let b_bits = vec![0u8; qubits];
        c.bench_function(&format!("AuxKeygen(n={},L={})", qubits, depth), |b| {
            b.iter(|| {
                aux_keygen(
                    black_box(qubits),
                    black_box(depth),
                    Some(a.clone()),
                    Some(b_bits.clone()),
                )
            })
        });
    }
}

fn evaluation_benchmark(c: &mut Criterion) {
    let qubits = 2;
    let depth = 2;
    let keys = aux_keygen(qubits, depth, Some(vec![1, 0]), Some(vec![0, 1]));

    let context = BfvContext::new(BfvParams::new().set_poly_degree(64).set_plain_modulus(257));
    let oracle_keys = BfvKeyGenerator::new(Arc::clone(&context));
    let encoder = BfvEncoder::new(Arc::clone(&context));
    let encryptor = BfvEncryptor::new(Arc::clone(&context), oracle_keys.secret_key().clone());

    let mut circuit = QuantumCircuit::new(qubits);
    circuit.h(0).cnot(0, 1).t(1).h(1).t(1);
    let (encrypted, _, enc_a, enc_b) = qotp_encrypt(
        &circuit,
        keys.secret_key.a(),
        keys.secret_key.b(),
        0,
        qubits,
        &encoder,
        &encryptor,
    )
    .unwrap();

    c.bench_function("AuxEval(2 qubits, 2 T-gates)", |b| {
        b.iter(|| {
            aux_eval(
                black_box(&encrypted),
                &enc_a,
                &enc_b,
                &keys.eval_key,
                &encoder,
                &encryptor,
            )
            .unwrap()
        })
    });
}

fn oracle_benchmark(c: &mut Criterion) {
    let context = BfvContext::new(BfvParams::new());
    let oracle_keys = BfvKeyGenerator::new(Arc::clone(&context));
    let encoder = BfvEncoder::new(Arc::clone(&context));
    let encryptor = BfvEncryptor::new(Arc::clone(&context), oracle_keys.secret_key().clone());
    let plain = encoder.encode_bit(1);
    c.bench_function("OracleEncryptBit", |b| {
        b.iter(|| encryptor.encrypt(black_box(&plain)))
    });
}

criterion_group!(
    benches,
    term_set_benchmark,
    keygen_benchmark,
    evaluation_benchmark,
    oracle_benchmark
);
criterion_main!(benches);
