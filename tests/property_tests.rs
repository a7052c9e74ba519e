use ars::{adaptive_rejection_sampling_with_rng, compute_hulls, evaluate_hulls};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Strictly increasing abscissae with at least 4 points and gaps bounded
/// away from zero, so no secant slope degenerates.
fn mesh_strategy() -> impl Strategy<Value = Vec<f64>> {
    (-20.0f64..20.0, prop::collection::vec(0.05f64..5.0, 3..10)).prop_map(|(start, steps)| {
        let mut s = Vec::with_capacity(steps.len() + 1);
        let mut x = start;
        s.push(x);
        for step in steps {
            x += step;
            s.push(x);
        }
        s
    })
}

proptest! {
    #[test]
    fn prop_hull_partition_and_weights(
        s in mesh_strategy(),
        c in 0.1f64..5.0,
        mu in -10.0f64..10.0,
    ) {
        let fs: Vec<f64> = s.iter().map(|&x| -c * (x - mu) * (x - mu)).collect();
        let domain = (f64::NEG_INFINITY, f64::INFINITY);

        // a quadratic log-density is concave everywhere, so the build must succeed
        let (lower, upper) = compute_hulls(&s, &fs, domain).unwrap();

        prop_assert_eq!(lower.len(), s.len() - 1);
        prop_assert_eq!(upper.len(), 2 * (s.len() - 2) + 2);

        // contiguous partitions with no gaps or overlaps
        for w in lower.windows(2) {
            prop_assert_eq!(w[0].right, w[1].left);
        }
        for w in upper.windows(2) {
            prop_assert_eq!(w[0].right, w[1].left);
        }

        let total: f64 = upper.iter().map(|seg| seg.pr).sum();
        prop_assert!((total - 1.0).abs() < 1e-9);
        prop_assert!(upper.iter().all(|seg| seg.pr >= 0.0));
    }

    #[test]
    fn prop_hulls_bracket_concave_density(
        s in mesh_strategy(),
        c in 0.1f64..5.0,
        mu in -10.0f64..10.0,
    ) {
        let f = |x: f64| -c * (x - mu) * (x - mu);
        let fs: Vec<f64> = s.iter().map(|&x| f(x)).collect();
        let domain = (f64::NEG_INFINITY, f64::INFINITY);

        let (lower, upper) = compute_hulls(&s, &fs, domain).unwrap();

        let (first, last) = (s[0], s[s.len() - 1]);
        for k in 0..=100 {
            let x = first + (last - first) * k as f64 / 100.0;
            let (lh, uh) = evaluate_hulls(x, &lower, &upper);
            prop_assert!(lh <= f(x) + 1e-7, "lower hull above log-density at {}", x);
            prop_assert!(uh >= f(x) - 1e-7, "upper hull below log-density at {}", x);
        }
    }

    #[test]
    fn prop_samples_stay_inside_seed_interval(
        seed in any::<u64>(),
        c in 0.2f64..3.0,
        mu in -5.0f64..5.0,
        n in 1usize..40,
    ) {
        // bounded domain: the proposal never leaves [a, b]
        let (a, b) = (mu - 4.0, mu + 4.0);
        let domain = (mu - 5.0, mu + 5.0);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let samples = adaptive_rejection_sampling_with_rng(
            |x| -c * (x - mu) * (x - mu),
            a,
            b,
            domain,
            n,
            &mut rng,
        )
        .unwrap();

        prop_assert_eq!(samples.len(), n);
        prop_assert!(samples.iter().all(|&x| x >= a && x <= b));
        prop_assert!(samples.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn prop_seeded_runs_are_bit_identical(seed in any::<u64>(), n in 1usize..30) {
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            adaptive_rejection_sampling_with_rng(
                |x| -x * x,
                -2.0,
                2.0,
                (f64::NEG_INFINITY, f64::INFINITY),
                n,
                &mut rng,
            )
            .unwrap()
        };
        prop_assert_eq!(run(), run());
    }
}
