//! Turning the global count into a printed estimate.
use crate::Result;
use std::f64::consts::PI;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PiEstimate {
    /// Samples that landed inside the unit circle, over all ranks.
    pub inside: u64,
    /// Samples drawn over all ranks.
    pub samples: u64,
    pub value: f64,
}

impl PiEstimate {
    /// `4 * inside / samples`, or NaN when nothing was sampled.
    pub fn new(inside: u64, samples: u64) -> Self {
        // Counts stay exact in an f64 up to 2^53.
        let value = if samples == 0 {
            f64::NAN
        } else {
            4.0 * inside as f64 / samples as f64
        };
        PiEstimate {
            inside,
            samples,
            value,
        }
    }

    /// True when the budget was too small for any rank to sample.
    pub fn is_degenerate(&self) -> bool {
        self.samples == 0
    }

    /// Distance from the true value of pi.
    pub fn abs_error(&self) -> f64 {
        (self.value - PI).abs()
    }
}

/// Estimate from the global sum when every rank drew `per_process_iterations`.
pub fn estimate_pi(global_sum: u64, per_process_iterations: u64, world_size: u32) -> f64 {
    let samples = per_process_iterations.saturating_mul(u64::from(world_size));
    PiEstimate::new(global_sum, samples).value
}

/// Format like C++ streams with `setprecision(digits)`: `digits`
/// significant digits, trailing zeros dropped, scientific notation for
/// very large or very small magnitudes.
pub fn format_significant(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let digits = digits.max(1);
    // Rounding to `digits` may carry into the next power of ten, so take
    // the exponent from the rounded scientific form.
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent >= -4 && exponent < digits as i32 {
        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Write the estimate as a single line.
pub fn report<W: Write>(out: &mut W, estimate: &PiEstimate, digits: usize) -> Result<()> {
    writeln!(out, "{}", format_significant(estimate.value, digits))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_from_counts() {
        assert_eq!(estimate_pi(3, 1, 4), 3.0);
        assert_eq!(PiEstimate::new(785, 1000).value, 3.14);
        assert!(!PiEstimate::new(785, 1000).is_degenerate());
    }

    #[test]
    fn zero_samples_is_nan() {
        let estimate = PiEstimate::new(0, 0);
        assert!(estimate.is_degenerate());
        assert!(estimate.value.is_nan());
        assert!(estimate_pi(0, 0, 4).is_nan());
    }

    #[test]
    fn eight_significant_digits() {
        assert_eq!(format_significant(PI, 8), "3.1415927");
        assert_eq!(format_significant(3.14, 8), "3.14");
        assert_eq!(format_significant(3.0, 8), "3");
        assert_eq!(format_significant(-2.5, 8), "-2.5");
    }

    #[test]
    fn rounding_carries_into_next_decade() {
        assert_eq!(format_significant(9.999999999, 8), "10");
        assert_eq!(format_significant(99_999_999.9, 8), "1e+08");
    }

    #[test]
    fn scientific_outside_fixed_range() {
        assert_eq!(format_significant(1e9, 8), "1e+09");
        assert_eq!(format_significant(1.5e-5, 8), "1.5e-05");
        assert_eq!(format_significant(0.000123456, 3), "0.000123");
        assert_eq!(format_significant(123456.0, 3), "1.23e+05");
    }

    #[test]
    fn special_values() {
        assert_eq!(format_significant(f64::NAN, 8), "nan");
        assert_eq!(format_significant(f64::INFINITY, 8), "inf");
        assert_eq!(format_significant(0.0, 8), "0");
    }

    #[test]
    fn report_writes_one_line() {
        let mut out = Vec::new();
        report(&mut out, &PiEstimate::new(785_398_163, 1_000_000_000), 8).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "3.1415927\n");
    }

    #[test]
    fn report_degenerate_estimate() {
        let mut out = Vec::new();
        report(&mut out, &PiEstimate::new(0, 0), 8).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "nan\n");
    }
}
