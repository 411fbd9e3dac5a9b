//! Angle curves digitized against humerothoracic elevation.
//!
//! Each degree of freedom comes from its own file, so the three channels of a
//! record do not necessarily share abscissae. `AngleSeries::align` brings them
//! onto one grid.

use log::debug;

/// One digitized channel: humerothoracic angle → joint angle, both in degrees.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub humerothoracic: Vec<f64>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(humerothoracic: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(humerothoracic.len(), values.len());
        Self {
            humerothoracic,
            values,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.humerothoracic.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.humerothoracic.is_empty()
    }

    fn range(&self) -> (f64, f64) {
        self.humerothoracic
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            })
    }

    /// Linear interpolation at `x`, clamped to the end values outside the data range.
    pub fn interpolate(&self, x: f64) -> f64 {
        let mut points: Vec<(f64, f64)> = self
            .humerothoracic
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        interpolate_sorted(&points, x)
    }
}

fn interpolate_sorted(points: &[(f64, f64)], x: f64) -> f64 {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return f64::NAN;
    };
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    let upper = points.partition_point(|p| p.0 < x);
    let (x0, y0) = points[upper - 1];
    let (x1, y1) = points[upper];
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

/// Three Euler channels sampled on a common humerothoracic grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AngleSeries {
    pub humerothoracic: Vec<f64>,
    /// Channel values in degrees; a channel the study did not report is all NaN.
    pub channels: [Vec<f64>; 3],
}

impl AngleSeries {
    #[inline]
    pub fn len(&self) -> usize {
        self.humerothoracic.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.humerothoracic.is_empty()
    }

    /// Angles of sample `i`, one per channel.
    pub fn sample(&self, i: usize) -> [f64; 3] {
        [self.channels[0][i], self.channels[1][i], self.channels[2][i]]
    }

    /// Puts the three channels on one grid.
    ///
    /// Channels with identical abscissae are kept as they are. Otherwise each
    /// reported channel is resampled over the range every channel covers, with
    /// as many points as the shortest one.
    pub fn align(channels: [Series; 3]) -> Self {
        let present: Vec<&Series> = channels.iter().filter(|s| !s.is_empty()).collect();
        let Some(reference) = present.first() else {
            return Self::default();
        };

        if present
            .iter()
            .all(|s| s.humerothoracic == reference.humerothoracic)
        {
            let n = reference.len();
            let grid = reference.humerothoracic.clone();
            return Self {
                humerothoracic: grid,
                channels: channels.map(|s| {
                    if s.is_empty() {
                        vec![f64::NAN; n]
                    } else {
                        s.values
                    }
                }),
            };
        }

        let (lo, hi) = present.iter().map(|s| s.range()).fold(
            (f64::NEG_INFINITY, f64::INFINITY),
            |(lo, hi), (min, max)| (lo.max(min), hi.min(max)),
        );
        let n = present.iter().map(|s| s.len()).min().unwrap_or(0);
        debug!(
            "channels sampled differently, interpolating {} points over [{:.2}, {:.2}]",
            n, lo, hi
        );
        if lo > hi || n == 0 {
            return Self::default();
        }

        let grid = linspace(lo, hi, n);
        let channels = channels.map(|s| {
            if s.is_empty() {
                vec![f64::NAN; n]
            } else {
                grid.iter().map(|&x| s.interpolate(x)).collect()
            }
        });
        Self {
            humerothoracic: grid,
            channels,
        }
    }
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n).map(|i| lo + step * i as f64).collect()
        }
    }
}
