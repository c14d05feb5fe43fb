use itertools::Itertools;
use qubit_sim::{ gate::Gate, Qubit, Result };
use rand::{ rngs::StdRng, SeedableRng };
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHOTS: usize = 1000;

fn bell_pair() -> Result<Qubit> {
    let mut q = Qubit::zero(2);
    q.apply_circuit(&[Gate::H(0), Gate::CX(0, 1)])?;
    Ok(q)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let q = bell_pair()?;
    for state in q.state(&[])?.iter() {
        println!("{}", state);
    }

    let mut rng = StdRng::seed_from_u64(10546);
    let mut records: Vec<String> = Vec::with_capacity(SHOTS);
    for _ in 0..SHOTS {
        let mut shot = q.clone();
        let m0 = shot.measure_with(0, &mut rng)?;
        let m1 = shot.measure_with(1, &mut rng)?;
        records.push(format!("{}{}", m0, m1));
    }
    let counts = records.into_iter().counts();
    info!(shots = SHOTS, distinct = counts.len(), "sampled bell pair");
    counts.iter()
        .sorted()
        .for_each(|(outcome, count)| println!("{}: {}", outcome, count));
    Ok(())
}
