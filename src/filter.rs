//! Butterworth band-pass filter, applied with zero phase
use itertools::Itertools;
use log::debug;
use nalgebra::{Complex, DMatrix, DVector};

use std::f64::consts::PI;

/// Digital IIR filter, as (b, a) transfer function coefficients.
/// `a[0]` is always 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Butterworth {
    /// Numerator coefficients
    pub b: Vec<f64>,
    /// Denominator coefficients
    pub a: Vec<f64>,
}

/// Expands the polynomial of given roots, highest degree first.
fn poly(roots: &[Complex<f64>]) -> Vec<Complex<f64>> {
    let mut coeffs = vec![Complex::new(1.0, 0.0)];
    for root in roots {
        let mut next = coeffs.clone();
        next.push(Complex::new(0.0, 0.0));
        for (i, c) in coeffs.iter().enumerate() {
            next[i + 1] -= c * root;
        }
        coeffs = next;
    }
    coeffs
}

impl Butterworth {
    /// Designs a band-pass filter of given order (order of the analog
    /// lowpass prototype, the resulting filter is of order 2N),
    /// passing [low_hz, high_hz] at sampling rate fs_hz.
    pub fn bandpass(order: usize, low_hz: f64, high_hz: f64, fs_hz: f64) -> Self {
        let fs2 = 2.0 * fs_hz;

        // pre-warped analog band edges
        let w_low = fs2 * (PI * low_hz / fs_hz).tan();
        let w_high = fs2 * (PI * high_hz / fs_hz).tan();
        let bw = w_high - w_low;
        let w0 = (w_low * w_high).sqrt();

        // analog lowpass prototype: poles on the left half unit circle
        let prototype = (0..order).map(|k| {
            let m = 2.0 * k as f64 - order as f64 + 1.0;
            -Complex::from_polar(1.0, PI * m / (2.0 * order as f64))
        });

        // lowpass to bandpass: each pole splits in two, zeros at origin
        let mut analog_poles = Vec::with_capacity(2 * order);
        let mut mirrored = Vec::with_capacity(order);
        for p in prototype {
            let p_lp = p * bw / 2.0;
            let delta = (p_lp * p_lp - w0 * w0).sqrt();
            analog_poles.push(p_lp + delta);
            mirrored.push(p_lp - delta);
        }
        analog_poles.extend(mirrored);
        let gain = bw.powi(order as i32);

        // bilinear transform: origin zeros map to 1,
        // zeros at infinity map to -1
        let poles = analog_poles
            .iter()
            .map(|p| (fs2 + *p) / (fs2 - *p))
            .collect::<Vec<_>>();

        let mut zeros = vec![Complex::new(1.0, 0.0); order];
        zeros.extend(vec![Complex::new(-1.0, 0.0); order]);

        let num = Complex::new(fs2, 0.0).powi(order as i32);
        let den = analog_poles
            .iter()
            .fold(Complex::new(1.0, 0.0), |acc, p| acc * (fs2 - *p));
        let k = gain * (num / den).re;

        let b = poly(&zeros).iter().map(|c| k * c.re).collect();
        let a = poly(&poles).iter().map(|c| c.re).collect();
        Self { b, a }
    }

    /// Filter order (number of delay elements)
    pub fn order(&self) -> usize {
        self.a.len().max(self.b.len()) - 1
    }

    /// Complex frequency response at this frequency (in Hz)
    pub fn response(&self, f_hz: f64, fs_hz: f64) -> Complex<f64> {
        let z = Complex::from_polar(1.0, -2.0 * PI * f_hz / fs_hz);
        let eval = |coeffs: &[f64]| {
            coeffs
                .iter()
                .enumerate()
                .fold(Complex::new(0.0, 0.0), |acc, (i, c)| acc + z.powi(i as i32) * *c)
        };
        eval(&self.b) / eval(&self.a)
    }

    /// Initial state of the filter, for a unit step steady state response.
    pub fn steady_state(&self) -> Option<Vec<f64>> {
        let n = self.order();
        let mut companion = DMatrix::<f64>::zeros(n, n);
        for j in 0..n {
            companion[(0, j)] = -self.a[j + 1] / self.a[0];
        }
        for i in 1..n {
            companion[(i, i - 1)] = 1.0;
        }
        let i_minus_a = DMatrix::<f64>::identity(n, n) - companion.transpose();
        let rhs = DVector::from_iterator(
            n,
            (1..=n).map(|i| self.b[i] - self.a[i] * self.b[0]),
        );
        let zi = i_minus_a.lu().solve(&rhs)?;
        Some(zi.iter().copied().collect())
    }

    /// Direct form II transposed filtering, starting from `state`.
    pub fn lfilter(&self, x: &[f64], state: &[f64]) -> Vec<f64> {
        let n = self.order();
        let mut z = state.to_vec();
        x.iter()
            .map(|x_k| {
                let y_k = self.b[0] * x_k + z[0];
                for i in 0..n - 1 {
                    z[i] = self.b[i + 1] * x_k + z[i + 1] - self.a[i + 1] * y_k;
                }
                z[n - 1] = self.b[n] * x_k - self.a[n] * y_k;
                y_k
            })
            .collect()
    }

    /// Edge padding used by [Self::filtfilt]
    pub fn padlen(&self) -> usize {
        3 * self.a.len().max(self.b.len())
    }

    /// Zero phase filtering: forward and backward pass, over an odd extension
    /// of the signal. None when the signal is not longer than [Self::padlen].
    pub fn filtfilt(&self, x: &[f64]) -> Option<Vec<f64>> {
        let padlen = self.padlen();
        if x.len() <= padlen {
            return None;
        }
        let last = x.len() - 1;

        let mut ext = Vec::with_capacity(x.len() + 2 * padlen);
        ext.extend((1..=padlen).rev().map(|i| 2.0 * x[0] - x[i]));
        ext.extend_from_slice(x);
        ext.extend((1..=padlen).map(|i| 2.0 * x[last] - x[last - i]));

        let zi = self.steady_state()?;

        let x0 = ext[0];
        let forward = self.lfilter(&ext, &zi.iter().map(|z| z * x0).collect::<Vec<_>>());

        let reversed = forward.into_iter().rev().collect::<Vec<_>>();
        let y0 = reversed[0];
        let backward = self.lfilter(&reversed, &zi.iter().map(|z| z * y0).collect::<Vec<_>>());

        Some(
            backward
                .into_iter()
                .rev()
                .skip(padlen)
                .take(x.len())
                .collect(),
        )
    }
}

/// Band-pass filters this VTEC series: 2nd order Butterworth design,
/// applied with zero phase. None when the series is too short to be filtered.
pub fn bpfilter(x: &[f64], low_hz: f64, high_hz: f64, fs_hz: f64) -> Option<Vec<f64>> {
    let filter = Butterworth::bandpass(2, low_hz, high_hz, fs_hz);
    debug!("bandpass b={:?} a={:?}", filter.b, filter.a);
    filter.filtfilt(x)
}

/// Replaces non finite samples by linear interpolation between their known
/// neighbours. Leading and trailing gaps hold the nearest known value.
/// None when not a single sample is known.
pub fn fill_gaps(x: &[f64]) -> Option<Vec<f64>> {
    let known = x
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, value)| value.is_finite())
        .collect::<Vec<_>>();

    let (first, last) = (*known.first()?, *known.last()?);
    let mut filled = x.to_vec();

    filled[..first.0].fill(first.1);
    filled[last.0 + 1..].fill(last.1);

    for (&(i0, v0), &(i1, v1)) in known.iter().tuple_windows() {
        for (i, value) in filled.iter_mut().enumerate().take(i1).skip(i0 + 1) {
            *value = v0 + (v1 - v0) * (i - i0) as f64 / (i1 - i0) as f64;
        }
    }
    Some(filled)
}
