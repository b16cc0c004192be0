//! Small utilities: index combinations and exact rational linear algebra.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

pub(crate) type Q = BigRational;

/// k-combinations of `0..n` in lexicographic order. `k == 0` yields one empty
/// combination.
pub(crate) fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut idxs: Vec<usize> = (0..k).collect();
    let mut out = Vec::new();
    loop {
        out.push(idxs.clone());
        // rightmost index that can still advance
        let Some(i) = (0..k).rev().find(|&i| idxs[i] != i + n - k) else {
            break;
        };
        idxs[i] += 1;
        for j in i + 1..k {
            idxs[j] = idxs[j - 1] + 1;
        }
    }
    out
}

/// Exact rational for `x` rounded to `digits` decimals. `None` if not finite.
pub(crate) fn to_rational(x: f64, digits: u32) -> Option<Q> {
    if !x.is_finite() {
        return None;
    }
    let scaled = (x * 10f64.powi(digits as i32)).round();
    let num = BigInt::from_f64(scaled)?;
    let den = num_traits::pow(BigInt::from(10u32), digits as usize);
    Some(Q::new(num, den))
}

#[inline]
pub(crate) fn to_f64(q: &Q) -> f64 {
    q.to_f64().unwrap_or(f64::NAN)
}

pub(crate) fn dot(a: &[Q], b: &[Q]) -> Q {
    a.iter().zip(b).fold(Q::zero(), |acc, (x, y)| acc + x * y)
}

/// Reduce `m` to row echelon form in place (over its first `ncols` columns,
/// applying row operations to every column). Returns the pivot columns.
pub(crate) fn rref(m: &mut [Vec<Q>], ncols: usize) -> Vec<usize> {
    let mut pivots = Vec::new();
    let mut r = 0;
    for c in 0..ncols {
        if r == m.len() {
            break;
        }
        let Some(p) = (r..m.len()).find(|&i| !m[i][c].is_zero()) else {
            continue;
        };
        m.swap(r, p);
        let inv = m[r][c].recip();
        let width = m[r].len();
        for j in 0..width {
            let v = &m[r][j] * &inv;
            m[r][j] = v;
        }
        for i in 0..m.len() {
            if i == r || m[i][c].is_zero() {
                continue;
            }
            let f = m[i][c].clone();
            for j in 0..width {
                let v = &m[r][j] * &f;
                m[i][j] -= v;
            }
        }
        pivots.push(c);
        r += 1;
    }
    pivots
}

pub(crate) fn rank(rows: &[Vec<Q>], ncols: usize) -> usize {
    let mut m = rows.to_vec();
    rref(&mut m, ncols).len()
}

/// Basis of `{x : rows · x = 0}`.
pub(crate) fn nullspace(rows: &[Vec<Q>], ncols: usize) -> Vec<Vec<Q>> {
    let mut m = rows.to_vec();
    let pivots = rref(&mut m, ncols);
    let mut basis = Vec::new();
    for f in (0..ncols).filter(|c| !pivots.contains(c)) {
        let mut v = vec![Q::zero(); ncols];
        v[f] = Q::one();
        for (r, &pc) in pivots.iter().enumerate() {
            v[pc] = -m[r][f].clone();
        }
        basis.push(v);
    }
    basis
}

/// Unique solution of `rows · x = rhs`, if the system is consistent and has
/// full column rank.
pub(crate) fn solve_unique(rows: &[Vec<Q>], rhs: &[Q], ncols: usize) -> Option<Vec<Q>> {
    let mut m: Vec<Vec<Q>> = rows
        .iter()
        .zip(rhs)
        .map(|(r, b)| {
            let mut row = r.clone();
            row.push(b.clone());
            row
        })
        .collect();
    let pivots = rref(&mut m, ncols);
    if pivots.len() < ncols {
        return None;
    }
    // rows past the pivots have zero coefficients; their rhs must vanish
    if m[pivots.len()..].iter().any(|row| !row[ncols].is_zero()) {
        return None;
    }
    let mut x = vec![Q::zero(); ncols];
    for (r, &pc) in pivots.iter().enumerate() {
        x[pc] = m[r][ncols].clone();
    }
    Some(x)
}

/// Scale so the first nonzero entry has magnitude one (sign preserved).
pub(crate) fn normalize(v: &mut [Q]) {
    if let Some(s) = v.iter().find(|x| !x.is_zero()).map(|x| x.abs()) {
        for x in v.iter_mut() {
            *x = &*x / &s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(n: i64) -> Q {
        Q::from_integer(n.into())
    }

    #[test]
    fn combinations_count_and_order() {
        let c = combinations(4, 2);
        assert_eq!(c.len(), 6);
        assert_eq!(c[0], vec![0, 1]);
        assert_eq!(c[5], vec![2, 3]);
        assert_eq!(combinations(3, 0), vec![Vec::<usize>::new()]);
        assert!(combinations(2, 3).is_empty());
        assert_eq!(combinations(3, 3), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn rational_rounding() {
        let r = to_rational(0.1234567, 6).unwrap();
        assert_eq!(r, Q::new(123457.into(), 1_000_000.into()));
        assert!(to_rational(f64::INFINITY, 6).is_none());
        assert!((to_f64(&r) - 0.123457).abs() < 1e-15);
    }

    #[test]
    fn nullspace_and_solve() {
        // x + y = 0 → null space spanned by (-1, 1)
        let ns = nullspace(&[vec![q(1), q(1)]], 2);
        assert_eq!(ns, vec![vec![q(-1), q(1)]]);
        // x + y = 3, x - y = 1 → (2, 1)
        let x = solve_unique(&[vec![q(1), q(1)], vec![q(1), q(-1)]], &[q(3), q(1)], 2).unwrap();
        assert_eq!(x, vec![q(2), q(1)]);
        // inconsistent
        assert!(solve_unique(&[vec![q(1)], vec![q(1)]], &[q(0), q(1)], 1).is_none());
        assert_eq!(rank(&[vec![q(1), q(2)], vec![q(2), q(4)]], 2), 1);
    }
}
