use std::sync::Arc;

use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use auxqhe::{
    aux_eval, aux_keygen, build_term_sets, qotp_decrypt, qotp_encrypt, total_aux_states,
    BfvContext, BfvDecryptor, BfvEncoder, BfvEncryptor, BfvKeyGenerator, BfvParams, Diagnostics,
    QuantumCircuit, Statevector,
};

/// Run the AUX-QHE pipeline end to end on a demo circuit and report sizes.
#[derive(Parser)]
#[command(name = "auxqhe", about = "Auxiliary-based QHE pipeline demo")]
struct Args {
    /// Number of qubits.
    #[arg(long, default_value_t = 2)]
    qubits: usize,

    /// Provisioned T-depth (per-qubit T-gate budget).
    #[arg(long, default_value_t = 1)]
    t_depth: usize,

    /// Demo circuit: bell | phase | teleport-t | t-ladder.
    #[arg(long, default_value = "bell")]
    preset: String,

    /// Seed for the QOTP key bits (random when absent).
    #[arg(long)]
    seed: Option<u64>,

    /// Only print the projected auxiliary-state counts, then exit.
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

fn build_preset(name: &str, qubits: usize) -> QuantumCircuit {
    let mut circuit = QuantumCircuit::new(qubits);
    match name {
        "bell" => {
            circuit.h(0);
            for q in 1..qubits {
                circuit.cnot(q - 1, q);
            }
        }
        "phase" => {
            for q in 0..qubits {
                circuit.h(q).p(q).h(q);
            }
        }
        "teleport-t" => {
            circuit.h(0);
            for q in 1..qubits {
                circuit.cnot(q - 1, q);
            }
            circuit.t(qubits - 1);
        }
        "t-ladder" => {
            for q in 0..qubits {
                circuit.h(q).t(q);
            }
        }
        other => panic!("[Invalid argument] Unknown preset '{}'.", other),
    }
    circuit
}

fn main() {
    let args = Args::parse();

    let sets = build_term_sets(args.qubits, args.t_depth);
    println!("configuration: {} qubits, T-depth {}", args.qubits, args.t_depth);
    for (i, set) in sets.iter().enumerate() {
        println!("  |T[{}]| = {}", i + 1, set.len());
    }
    println!("  auxiliary states: {}", total_aux_states(args.qubits, &sets));
    if args.dry_run {
        return;
    }

    let circuit = build_preset(&args.preset, args.qubits);
    println!("preset '{}': {} gates", args.preset, circuit.len());
    if circuit.required_t_depth() > args.t_depth {
        panic!(
            "[Invalid argument] Preset needs T-depth {} but only {} was provisioned.",
            circuit.required_t_depth(),
            args.t_depth
        );
    }

    let (a, b) = match args.seed {
        Some(seed) => {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let a = (0..args.qubits).map(|_| rng.gen_range(0..=1u8)).collect::<Vec<_>>();
            let b = (0..args.qubits).map(|_| rng.gen_range(0..=1u8)).collect::<Vec<_>>();
            (Some(a), Some(b))
        }
        None => (None, None),
    };

    let keys = aux_keygen(args.qubits, args.t_depth, a, b);
    println!(
        "keygen: {} auxiliary states in {:?}",
        keys.total_aux_states, keys.prep_time
    );

    let context = BfvContext::new(BfvParams::new());
    let oracle_keys = BfvKeyGenerator::new(Arc::clone(&context));
    let encoder = BfvEncoder::new(Arc::clone(&context));
    let encryptor = BfvEncryptor::new(Arc::clone(&context), oracle_keys.secret_key().clone());
    let decryptor = BfvDecryptor::new(Arc::clone(&context), oracle_keys.secret_key().clone());

    let (encrypted, _, enc_a, enc_b) = qotp_encrypt(
        &circuit,
        keys.secret_key.a(),
        keys.secret_key.b(),
        0,
        args.qubits,
        &encoder,
        &encryptor,
    )
    .expect("circuit fits the register at offset 0");
    println!("encrypted circuit: {} gates", encrypted.len());

    let evaluated = aux_eval(&encrypted, &enc_a, &enc_b, &keys.eval_key, &encoder, &encryptor)
        .unwrap_or_else(|error| panic!("evaluation failed: {}", error));
    println!(
        "evaluation: {} gates emitted, {} warnings",
        evaluated.circuit.len(),
        evaluated.diagnostics.len()
    );

    let mut diagnostics = Diagnostics::new();
    let decrypted = qotp_decrypt(
        &evaluated.circuit,
        &evaluated.final_enc_a,
        &evaluated.final_enc_b,
        &encoder,
        &decryptor,
        &mut diagnostics,
    );
    println!("decrypted circuit: {} gates", decrypted.len());

    // The c := k gadget simplification makes T-circuits diverge from a real
    // execution, so only report fidelity for Clifford presets.
    if circuit.required_t_depth() == 0 {
        let fidelity = Statevector::run(&circuit).fidelity(&Statevector::run(&decrypted));
        println!("round-trip fidelity: {:.6}", fidelity);
    }
}
