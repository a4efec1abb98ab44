// Temporal module - Time-domain feature extraction
//
// Hjorth parameters describe the signal through the variance of its
// successive differences; skewness and kurtosis describe the amplitude
// distribution. Outputs are bounded so that pathological channels cannot
// dominate the averaged feature vector.
//
// References:
// - Hjorth, B. (1970). EEG analysis based on time domain properties

/// Epsilon added to standard deviations in Hjorth denominators
const HJORTH_EPSILON: f64 = 1e-10;

/// Variance below which moment-based statistics are undefined
const MOMENT_EPSILON: f64 = 1e-20;

/// Hjorth activity, mobility and complexity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hjorth {
    /// log1p(variance): log-compressed to bound outliers
    pub activity: f64,
    /// std(dx) / std(x), clipped to [0, 10]
    pub mobility: f64,
    /// mobility(dx) / mobility(x), clipped to [0, 10]
    pub complexity: f64,
}

/// Population variance (divides by N)
pub fn variance(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    samples.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
}

fn std_dev(samples: &[f64]) -> f64 {
    variance(samples).sqrt()
}

fn diff(samples: &[f64]) -> Vec<f64> {
    samples.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Compute the three Hjorth parameters
pub fn hjorth(samples: &[f64]) -> Hjorth {
    let first = diff(samples);
    let second = diff(&first);

    let std_x = std_dev(samples);
    let std_d1 = std_dev(&first);
    let std_d2 = std_dev(&second);

    let mobility = std_d1 / (std_x + HJORTH_EPSILON);
    let mobility_d1 = std_d2 / (std_d1 + HJORTH_EPSILON);
    let complexity = mobility_d1 / (mobility + HJORTH_EPSILON);

    Hjorth {
        activity: variance(samples).ln_1p(),
        mobility: mobility.clamp(0.0, 10.0),
        complexity: complexity.clamp(0.0, 10.0),
    }
}

/// Central moments m2, m3, m4 (population, divide by N)
fn central_moments(samples: &[f64]) -> (f64, f64, f64) {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &v in samples {
        let d = v - mean;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Sample skewness m3 / m2^1.5, clipped to [-5, 5]
///
/// Zero for empty or zero-variance input.
pub fn skewness(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let (m2, m3, _) = central_moments(samples);
    if m2 < MOMENT_EPSILON {
        return 0.0;
    }
    (m3 / m2.powf(1.5)).clamp(-5.0, 5.0)
}

/// Excess kurtosis m4 / m2^2 - 3, clipped to [-5, 10]
///
/// Zero for empty or zero-variance input.
pub fn excess_kurtosis(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let (m2, _, m4) = central_moments(samples);
    if m2 < MOMENT_EPSILON {
        return 0.0;
    }
    (m4 / (m2 * m2) - 3.0).clamp(-5.0, 10.0)
}
