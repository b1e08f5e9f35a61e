use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::BTreeSet;

/// Mersenne prime 2^61 - 1, used as the MinHash field modulus.
pub const P: u64 = 2_305_843_009_213_693_951;

/// The `(a, b)` coefficient vectors for `num_perm` independent hash
/// functions of the form `h(x) = (a*x + b) mod P`, drawn from a stream
/// seeded with a fixed constant so the same shingle set always yields the
/// same signature.
pub struct MinHashParams {
    pub a: Vec<u64>,
    pub b: Vec<u64>,
}

/// Builds `num_perm` hash function coefficients from a fixed seed. Uses
/// this workspace's seeded PRNG (`rand`'s `StdRng`), so signatures are
/// deterministic within this codebase's own runs -- only determinism and
/// the published statistical properties of MinHash are load-bearing, not
/// byte-for-byte reproduction of any other implementation's output.
pub fn minhash_params(num_perm: usize, seed: u64) -> MinHashParams {
    let mut rng = StdRng::seed_from_u64(seed);
    let a = (0..num_perm)
        .map(|_| 1 + rng.next_u64() % (P - 2))
        .collect();
    let b = (0..num_perm).map(|_| rng.next_u64() % (P - 1)).collect();
    MinHashParams { a, b }
}

/// Computes the MinHash signature of `tokens` under `params`: the
/// per-function minimum of `(a*x + b) mod P` over the token set. An empty
/// token set signs as all `P - 1`.
pub fn minhash_signature(tokens: &BTreeSet<u64>, params: &MinHashParams) -> Vec<u64> {
    let n = params.a.len();
    if tokens.is_empty() {
        return vec![P - 1; n];
    }

    let mut sig = vec![P - 1; n];
    for &x in tokens {
        for i in 0..n {
            let val = ((params.a[i] as u128 * x as u128 + params.b[i] as u128) % P as u128) as u64;
            if val < sig[i] {
                sig[i] = val;
            }
        }
    }
    sig
}

/// Fraction of positions at which two equal-length signatures agree; `0.0`
/// for empty or mismatched-length signatures.
pub fn signature_similarity(a: &[u64], b: &[u64]) -> f64 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let equal = a.iter().zip(b.iter()).filter(|(x, y)| x == y).count();
    equal as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tokens_sign_as_all_p_minus_one() {
        let params = minhash_params(8, 42);
        let sig = minhash_signature(&BTreeSet::new(), &params);
        assert_eq!(sig, vec![P - 1; 8]);
    }

    #[test]
    fn identical_token_sets_have_identical_signatures() {
        let params = minhash_params(16, 42);
        let tokens: BTreeSet<u64> = [1, 2, 3, 4].into_iter().collect();
        let sig1 = minhash_signature(&tokens, &params);
        let sig2 = minhash_signature(&tokens, &params);
        assert_eq!(sig1, sig2);
        assert_eq!(signature_similarity(&sig1, &sig2), 1.0);
    }

    #[test]
    fn params_are_deterministic_for_same_seed() {
        let p1 = minhash_params(32, 42);
        let p2 = minhash_params(32, 42);
        assert_eq!(p1.a, p2.a);
        assert_eq!(p1.b, p2.b);
    }

    #[test]
    fn disjoint_token_sets_usually_disagree_on_most_positions() {
        let params = minhash_params(64, 42);
        let t1: BTreeSet<u64> = (0..50).collect();
        let t2: BTreeSet<u64> = (1_000_000..1_000_050).collect();
        let sig1 = minhash_signature(&t1, &params);
        let sig2 = minhash_signature(&t2, &params);
        assert!(signature_similarity(&sig1, &sig2) < 0.5);
    }
}
