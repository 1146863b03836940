//! Chi-square test of independence on a 2×2 contingency table.
//!
//! p-values come from the chi-square survival function, evaluated as the
//! regularized upper incomplete gamma Q(dof/2, x/2): series expansion
//! below a+1, Lentz continued fraction above.

use serde::Serialize;

const MAX_ITERATIONS: usize = 500;
const EPSILON: f64 = 1e-15;
const TINY: f64 = 1e-300;

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Observed counts, rows × columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContingencyTable {
    pub cells: [[u64; 2]; 2],
}

impl ContingencyTable {
    pub fn row_totals(&self) -> [u64; 2] {
        self.cells.map(|row| row[0] + row[1])
    }

    pub fn col_totals(&self) -> [u64; 2] {
        [
            self.cells[0][0] + self.cells[1][0],
            self.cells[0][1] + self.cells[1][1],
        ]
    }

    pub fn total(&self) -> u64 {
        self.row_totals().iter().sum()
    }

    /// Expected counts under independence.
    pub fn expected(&self) -> [[f64; 2]; 2] {
        let rows = self.row_totals();
        let cols = self.col_totals();
        let n = self.total().max(1) as f64;
        [0usize, 1].map(|r| [0usize, 1].map(|c| rows[r] as f64 * cols[c] as f64 / n))
    }

    /// A zero row or column leaves fewer than one degree of freedom.
    pub fn is_degenerate(&self) -> bool {
        self.row_totals().contains(&0) || self.col_totals().contains(&0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChiSquareResult {
    pub statistic: f64,
    pub dof: u32,
    pub p_value: f64,
    pub expected: [[f64; 2]; 2],
}

/// Pearson chi-square with Yates continuity correction.
///
/// A degenerate table (empty row or column) yields statistic 0, dof 0,
/// p-value 1.
pub fn chi_square_independence(table: &ContingencyTable) -> ChiSquareResult {
    let expected = table.expected();
    if table.is_degenerate() {
        return ChiSquareResult { statistic: 0.0, dof: 0, p_value: 1.0, expected };
    }

    let mut statistic = 0.0;
    for r in 0..2 {
        for c in 0..2 {
            let diff = (table.cells[r][c] as f64 - expected[r][c]).abs();
            let corrected = diff - diff.min(0.5);
            statistic += corrected * corrected / expected[r][c];
        }
    }

    ChiSquareResult {
        statistic,
        dof: 1,
        p_value: chi_square_sf(statistic, 1),
        expected,
    }
}

/// P(X > x) for X ~ chi-square(dof).
pub fn chi_square_sf(x: f64, dof: u32) -> f64 {
    if dof == 0 || x <= 0.0 {
        return 1.0;
    }
    regularized_gamma_q(dof as f64 / 2.0, x / 2.0)
}

/// Q(a, x) = Γ(a, x) / Γ(a).
pub fn regularized_gamma_q(a: f64, x: f64) -> f64 {
    if a <= 0.0 || x < 0.0 || a.is_nan() || x.is_nan() {
        return f64::NAN;
    }
    if x == 0.0 {
        return 1.0;
    }
    if x.is_infinite() {
        return 0.0;
    }
    if x < a + 1.0 {
        (1.0 - gamma_p_series(a, x)).clamp(0.0, 1.0)
    } else {
        gamma_q_continued_fraction(a, x).clamp(0.0, 1.0)
    }
}

/// ln Γ(x), Lanczos approximation with reflection below 0.5.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        let pi = std::f64::consts::PI;
        return (pi / (pi * x).sin()).abs().ln() - ln_gamma(1.0 - x);
    }
    let x = x - 1.0;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.0));
    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

fn prefactor(a: f64, x: f64) -> f64 {
    (-x + a * x.ln() - ln_gamma(a)).exp()
}

fn gamma_p_series(a: f64, x: f64) -> f64 {
    let mut ap = a;
    let mut term = 1.0 / a;
    let mut sum = term;
    for _ in 0..MAX_ITERATIONS {
        ap += 1.0;
        term *= x / ap;
        sum += term;
        if term.abs() < sum.abs() * EPSILON {
            break;
        }
    }
    sum * prefactor(a, x)
}

fn gamma_q_continued_fraction(a: f64, x: f64) -> f64 {
    let mut b = x + 1.0 - a;
    let mut c = 1.0 / TINY;
    let mut d = 1.0 / b;
    let mut h = d;
    for i in 1..=MAX_ITERATIONS {
        let an = -(i as f64) * (i as f64 - a);
        b += 2.0;
        d = an * d + b;
        if d.abs() < TINY {
            d = TINY;
        }
        c = b + an / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPSILON {
            break;
        }
    }
    prefactor(a, x) * h
}
