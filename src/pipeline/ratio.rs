//! Derived ratio columns (e.g. success rate) and the trend line fitted over them.

use crate::pipeline::table::Table;
use crate::utils::error::Result;

/// `a / (a + b)`. Undefined (NaN) when both are zero, absent when either side
/// has no observation.
///
/// Evaluated as `1 / (1 + b / a)` so `a + b` never overflows for large counts.
pub fn ratio(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    let (a, b) = (a?, b?);
    Some(if a == 0.0 && b == 0.0 {
        f64::NAN
    } else if a == 0.0 {
        0.0
    } else {
        1.0 / (1.0 + b / a)
    })
}

/// Appends `name` = `ratio(a_col, b_col)` row-wise. Returns `false` (and adds
/// nothing) when either input column is missing.
pub fn ratio_column(table: &mut Table, a_col: &str, b_col: &str, name: &str) -> Result<bool> {
    let values = match (table.numeric(a_col), table.numeric(b_col)) {
        (Some(a), Some(b)) => a.into_iter().zip(b).map(|(a, b)| ratio(a, b)).collect(),
        _ => return Ok(false),
    };
    table.push_numeric(name, values)?;
    Ok(true)
}

/// Points usable for fitting: absent and NaN cells removed.
pub fn finite_points(table: &Table, col: &str) -> Vec<(f64, f64)> {
    table.points(col)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub slope: f64,
    pub intercept: f64,
}

impl Trend {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Ordinary least-squares line. `None` with fewer than two distinct x values
/// or any non-finite input.
pub fn linear_trend(points: &[(f64, f64)]) -> Option<Trend> {
    if points.len() < 2 || points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (x, y) in points {
        sxx += (x - mean_x) * (x - mean_x);
        sxy += (x - mean_x) * (y - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(Trend {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_rate_scenario() {
        let mut t = Table::new("SimulationTime", vec![0.0, 1.0]);
        t.push_numeric("ok", vec![Some(10.0), Some(10.0)]).unwrap();
        t.push_numeric("failed", vec![Some(5.0), Some(0.0)]).unwrap();

        assert!(ratio_column(&mut t, "ok", "failed", "SuccessRate").unwrap());
        let rate = t.numeric("SuccessRate").unwrap();
        assert!((rate[0].unwrap() - 10.0 / 15.0).abs() < 1e-12);
        assert_eq!(rate[1], Some(1.0));
    }

    #[test]
    fn zero_over_zero_is_nan_and_filtered() {
        assert!(ratio(Some(0.0), Some(0.0)).unwrap().is_nan());
        assert_eq!(ratio(None, Some(1.0)), None);

        let mut t = Table::new("t", vec![0.0, 1.0, 2.0]);
        t.push_numeric("a", vec![Some(0.0), Some(1.0), None]).unwrap();
        t.push_numeric("b", vec![Some(0.0), Some(3.0), Some(1.0)]).unwrap();
        ratio_column(&mut t, "a", "b", "r").unwrap();

        assert_eq!(finite_points(&t, "r"), vec![(1.0, 0.25)]);
        assert_eq!(t.numeric("r").unwrap()[2], None);
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        assert_eq!(ratio(Some(1e308), Some(1e308)), Some(0.5));
        assert_eq!(ratio(Some(f64::MAX), Some(0.0)), Some(1.0));
        assert_eq!(ratio(Some(0.0), Some(f64::MAX)), Some(0.0));
        assert_eq!(ratio(Some(1e-300), Some(1e300)), Some(0.0));
        assert!(!ratio(Some(f64::INFINITY), Some(0.0)).unwrap().is_nan());
    }

    #[test]
    fn missing_column_adds_nothing() {
        let mut t = Table::new("t", vec![0.0]);
        t.push_numeric("a", vec![Some(1.0)]).unwrap();
        assert!(!ratio_column(&mut t, "a", "b", "r").unwrap());
        assert!(t.numeric("r").is_none());
    }

    #[test]
    fn trend_fits_a_line() {
        let trend = linear_trend(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-12);
        assert!((trend.intercept - 1.0).abs() < 1e-12);
        assert!((trend.at(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn trend_needs_two_distinct_x() {
        assert!(linear_trend(&[(1.0, 1.0)]).is_none());
        assert!(linear_trend(&[(1.0, 1.0), (1.0, 2.0)]).is_none());
        assert!(linear_trend(&[(0.0, f64::NAN), (1.0, 2.0)]).is_none());
    }
}
