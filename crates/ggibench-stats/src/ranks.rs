//! Rank transforms used by the rank-based tests.

/// Ranks of `values` (1-indexed, ascending) with ties sharing their average
/// rank, in input order.
///
/// Also returns the tie term `Σ(t³ − t)` over tie groups of size `t`, which
/// the normal approximation of rank statistics needs. Ties are exact
/// equality; expression values are not rounded.
pub fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let n = values.len();
    if n == 0 {
        return (vec![], 0.0);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0f64; n];
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Average rank for ties
        let avg_rank = (i + 1 + j + 1) as f64 / 2.0;
        for &k in &order[i..=j] {
            ranks[k] = avg_rank;
        }
        let t = (j - i + 1) as f64;
        tie_term += t * t * t - t;
        i = j + 1;
    }

    (ranks, tie_term)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_ranks_without_ties() {
        let (ranks, ties) = average_ranks(&[30.0, 10.0, 20.0]);
        assert_eq!(ranks, vec![3.0, 1.0, 2.0]);
        assert_eq!(ties, 0.0);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        // 2.0 appears three times at positions 2..=4 → rank 3
        let (ranks, ties) = average_ranks(&[2.0, 1.0, 2.0, 5.0, 2.0]);
        assert_eq!(ranks, vec![3.0, 1.0, 3.0, 5.0, 3.0]);
        assert_eq!(ties, 24.0); // 3³ − 3
    }

    #[test]
    fn test_empty() {
        let (ranks, ties) = average_ranks(&[]);
        assert!(ranks.is_empty());
        assert_eq!(ties, 0.0);
    }
}
