use qubit_sim::{ gate::Gate, Qubit, Result };
use tracing::info;
use tracing_subscriber::EnvFilter;

// marks ∣11⟩
fn oracle() -> Vec<Gate> { vec![Gate::CZ(0, 1)] }

fn diffusion() -> Vec<Gate> {
    vec![
        Gate::H(0), Gate::H(1),
        Gate::X(0), Gate::X(1),
        Gate::CZ(0, 1),
        Gate::X(0), Gate::X(1),
        Gate::H(0), Gate::H(1),
    ]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut q = Qubit::zero(2);
    q.apply_circuit(&[Gate::H(0), Gate::H(1)])?
        .apply_circuit(&oracle())?
        .apply_circuit(&diffusion())?;
    for state in q.state(&[&[0], &[1]])?.iter() {
        println!("{}", state);
    }
    let found: Vec<String>
        = q.measure_all()?
        .into_iter()
        .map(|m| m.to_string())
        .collect();
    info!(result = found.concat(), "search finished");
    println!("found ∣{}⟩", found.concat());
    Ok(())
}
