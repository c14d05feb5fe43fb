use num_complex::Complex64 as C64;
use qubit_sim::{ gate::Gate, Density, Qubit, Result };
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let payload = Qubit::from_amplitudes([C64::new(0.6, 0.0), C64::new(0.0, 0.8)])?;
    let mut pair = Qubit::zero(2);
    pair.apply_circuit(&[Gate::H(0), Gate::CX(0, 1)])?;

    // qubit 0: payload, qubits 1, 2: shared pair
    let mut q = payload.clone();
    q.tensor_product(&pair);
    q.apply_circuit(&[Gate::CX(0, 1), Gate::H(0)])?;
    let m0 = q.measure(0)?;
    let m1 = q.measure(1)?;
    info!(%m0, %m1, "sent classical bits");

    if m1.is_one() { q.apply_gate(&Gate::X(2))?; }
    if m0.is_one() { q.apply_gate(&Gate::Z(2))?; }

    let received = Density::from_qubit(&q).partial_trace(&[0, 1])?;
    let fidelity = received.probability(&payload)?;
    for state in q.state(&[&[0, 1], &[2]])?.iter() {
        println!("{}", state);
    }
    println!("fidelity: {:.6}", fidelity);
    Ok(())
}
