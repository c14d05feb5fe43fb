//! Small integer helpers for modular-exponentiation operators.

/// Greatest common divisor.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Compute `a^e mod m` by binary exponentiation.
///
/// Returns `0` if `m == 1`.
pub fn mod_exp(a: u64, mut e: u64, m: u64) -> u64 {
    if m == 1 { return 0; }
    let m = u128::from(m);
    let mut base = u128::from(a) % m;
    let mut acc: u128 = 1;
    while e > 0 {
        if e & 1 == 1 { acc = acc * base % m; }
        base = base * base % m;
        e >>= 1;
    }
    acc as u64
}

/// Compute `a^(2^j) mod m` by `j` repeated squarings.
pub fn mod_exp2(a: u64, j: u32, m: u64) -> u64 {
    if m == 1 { return 0; }
    let m = u128::from(m);
    (0..j).fold(u128::from(a) % m, |acc, _| acc * acc % m) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gcd_small() {
        assert_eq!(gcd(15, 7), 1);
        assert_eq!(gcd(21, 15), 3);
        assert_eq!(gcd(0, 9), 9);
    }

    #[test]
    fn mod_exp2_agrees_with_mod_exp() {
        for j in 0..6 {
            assert_eq!(mod_exp2(7, j, 15), mod_exp(7, 1 << j, 15));
            assert_eq!(mod_exp2(11, j, 21), mod_exp(11, 1 << j, 21));
        }
        assert_eq!(mod_exp2(7, 0, 15), 7);
        assert_eq!(mod_exp2(7, 1, 15), 4);
        assert_eq!(mod_exp2(7, 2, 15), 1);
    }
}
