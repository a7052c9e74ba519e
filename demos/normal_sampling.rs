//! Sampling an unnormalized Gaussian log-density with adaptive rejection
//! sampling.
//!
//! \( \exp(-x^2) \) is \( \mathcal{N}(0, 1/2) \) up to a constant, so the
//! sample mean should land near 0 and the sample variance near 0.5.

use ars::adaptive_rejection_sampling_with_rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let n_samples = 10_000;
    let samples = adaptive_rejection_sampling_with_rng(
        |x| -x * x,
        -2.0,
        2.0,
        (f64::NEG_INFINITY, f64::INFINITY),
        n_samples,
        &mut rng,
    )?;

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;

    println!("drew {n_samples} samples from exp(-x^2)");
    println!("  mean     = {mean:.4}  (expected 0.0)");
    println!("  variance = {var:.4}  (expected 0.5)");

    Ok(())
}
