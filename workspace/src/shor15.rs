use qubit_sim::{
    gate::{ self, Gate, Operator },
    number,
    Qubit,
    Result,
};
use tracing::{ info, warn };
use tracing_subscriber::EnvFilter;

const N: u64 = 15;
const A: u64 = 7;
const COUNT: usize = 3;
const TARGETS: [usize; 4] = [3, 4, 5, 6];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let n = COUNT + TARGETS.len();
    let mut q = Qubit::zero(n);
    q.apply_gate(&Gate::X(n - 1))?;
    for c in 0..COUNT { q.apply_gate(&Gate::H(c))?; }

    // counting qubit c holds the 2^c place; the swap-free inverse QFT below
    // expects exactly this reversed order
    for c in 0..COUNT {
        q.apply(&gate::controlled_mod_exp2(n, A, c as u32, N, c, &TARGETS)?)?;
    }
    let iqft = gate::iqft(COUNT)?.kron(&Operator::identity(TARGETS.len()));
    q.apply(&iqft)?;

    for state in q.state(&[&[0, 1, 2], &TARGETS])?.iter() {
        println!("{}", state);
    }

    let y: u64
        = (0..COUNT)
        .map(|c| q.measure(c).map(|m| u64::from(m.bit())))
        .collect::<Result<Vec<u64>>>()?
        .into_iter()
        .fold(0, |acc, b| (acc << 1) | b);
    let m = 1_u64 << COUNT;
    info!(y, "measured counting register");
    if y == 0 {
        warn!("trivial phase; no information about the order");
        return Ok(());
    }
    let r = m / number::gcd(y, m);
    println!("phase {}/{} suggests order {}", y, m, r);
    if r % 2 != 0 || number::mod_exp(A, r, N) != 1 {
        warn!(r, "candidate order rejected");
        return Ok(());
    }
    let half = number::mod_exp(A, r / 2, N);
    let f0 = number::gcd(half + 1, N);
    let f1 = number::gcd(half + N - 1, N);
    println!("{} = {} × {}", N, f0, f1);
    Ok(())
}
