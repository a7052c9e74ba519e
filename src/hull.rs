//! Piecewise-linear envelopes (hulls) over a log-density.
//!
//! Given abscissae \( S \) with log-density values \( fS \), this module builds
//! two piecewise-linear functions:
//!
//! - a **lower hull**: the chords between consecutive points, minorizing the
//!   log-density inside \( [S_0, S_{n-1}] \) (and \( -\infty \) outside: no
//!   extrapolation);
//! - an **upper hull**: secant lines through consecutive point pairs,
//!   intersected so that they majorize the log-density over the whole sampling
//!   domain. Each upper segment carries the normalized probability mass it
//!   contributes to the piecewise-exponential proposal density.
//!
//! Both constructions are only valid when the log-density is concave; the
//! intersection step detects violations and reports them as errors.
//!
//! ## References
//!
//! - Gilks & Wild (1992): *Adaptive Rejection Sampling for Gibbs Sampling*.
//!
//! Notes:
//! - Hulls are immutable snapshots: the sampler rebuilds both from scratch
//!   whenever the abscissa set changes. A rebuild is cheap next to a density
//!   evaluation, so nothing is patched incrementally.
//! - `sample_upper_hull_with_rng` exists for deterministic testing/benchmarking;
//!   `sample_upper_hull` is a convenience wrapper over the thread RNG.

use rand::prelude::*;

/// One linear piece `y = m*x + b` of a hull, valid on `[left, right]`.
///
/// `left`/`right` are `-inf`/`+inf` only for the outermost upper-hull
/// segments of an unbounded domain. `pr` is the normalized probability mass
/// the segment contributes to the proposal density; it is meaningful only for
/// upper-hull segments and stays `0.0` on lower-hull segments.
#[derive(Debug, Clone, PartialEq)]
pub struct HullSegment {
    pub m: f64,
    pub b: f64,
    pub left: f64,
    pub right: f64,
    pub pr: f64,
}

/// Errors from hull construction and proposal sampling.
///
/// All of these are terminal for the sampling call: they signal that the
/// caller's log-density is not concave, returned a non-finite value, or drove
/// the closed-form sampling formulas into a numerical corner.
#[derive(Debug, Clone, PartialEq)]
pub enum HullError {
    /// Two adjacent secants both have infinite slope: the log-density is not
    /// concave, or it returned infinities at neighboring abscissae.
    InfiniteSlopes { x: f64 },
    /// Adjacent secants intersect at a non-finite coordinate.
    NonFiniteIntersection { left: f64, right: f64 },
    /// Adjacent secants intersect outside the interval bracketing them; for a
    /// concave log-density the intersection always falls inside it.
    IntersectionOutOfBounds { ix: f64, left: f64, right: f64 },
    /// A proposal draw came out infinite or NaN.
    NonFiniteSample { x: f64 },
    /// A proposal draw fell outside its segment's bounds.
    SampleOutOfBounds { x: f64, left: f64, right: f64 },
}

impl std::fmt::Display for HullError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InfiniteSlopes { x } => {
                write!(f, "both secant slopes at x = {x} are infinite; log-density is not concave")
            }
            Self::NonFiniteIntersection { left, right } => {
                write!(f, "secants over [{left}, {right}] have a non-finite intersection")
            }
            Self::IntersectionOutOfBounds { ix, left, right } => write!(
                f,
                "secant intersection {ix} falls outside [{left}, {right}]; log-density is not concave"
            ),
            Self::NonFiniteSample { x } => {
                write!(f, "sampled a non-finite proposal value ({x})")
            }
            Self::SampleOutOfBounds { x, left, right } => {
                write!(f, "sampled proposal {x} outside its segment [{left}, {right}]")
            }
        }
    }
}

impl std::error::Error for HullError {}

/// Distance from `|x|` to the next representable `f64` above it.
fn ulp(x: f64) -> f64 {
    let a = x.abs();
    f64::from_bits(a.to_bits() + 1) - a
}

/// Build the lower and upper hull for abscissae `s` with log-density values
/// `fs` over `domain`.
///
/// The lower hull has one chord per consecutive pair of abscissae. The upper
/// hull covers the whole domain: an unbounded end extends the outermost
/// secant to infinity, and between each interior pair of abscissae the two
/// bracketing secants are intersected. Upper-segment weights are
/// exp-normalized so they sum to 1.
///
/// When two adjacent secants are (numerically) coincident, the collapsed
/// segment is still emitted as a zero-width piece with zero weight, so the
/// segment count is always `2*(n-2)` plus one per unbounded end and the
/// partition has no gaps.
///
/// # Panics
///
/// Panics if `s` and `fs` differ in length or hold fewer than 4 points.
pub fn compute_hulls(
    s: &[f64],
    fs: &[f64],
    domain: (f64, f64),
) -> Result<(Vec<HullSegment>, Vec<HullSegment>), HullError> {
    assert_eq!(s.len(), fs.len(), "compute_hulls: S and fS lengths differ");
    assert!(s.len() >= 4, "compute_hulls: need at least 4 abscissae");

    let n = s.len();

    let mut lower_hull = Vec::with_capacity(n - 1);
    for i in 0..n - 1 {
        let m = (fs[i + 1] - fs[i]) / (s[i + 1] - s[i]);
        let b = fs[i] - m * s[i];
        lower_hull.push(HullSegment { m, b, left: s[i], right: s[i + 1], pr: 0.0 });
    }

    let n_upper = 2 * (n - 2)
        + usize::from(domain.0 == f64::NEG_INFINITY)
        + usize::from(domain.1 == f64::INFINITY);
    let mut upper_hull = Vec::with_capacity(n_upper);
    // raw log-probabilities; exp-normalized once every segment exists
    let mut log_prs = Vec::with_capacity(n_upper);

    if domain.0 == f64::NEG_INFINITY {
        // first line, from -infinity
        let m = (fs[1] - fs[0]) / (s[1] - s[0]);
        let b = fs[0] - m * s[0];
        log_prs.push(segment_log_prob(f64::NEG_INFINITY, s[0], m, b));
        upper_hull.push(HullSegment { m, b, left: f64::NEG_INFINITY, right: s[0], pr: 0.0 });
    }

    // second line
    let m = (fs[2] - fs[1]) / (s[2] - s[1]);
    let b = fs[1] - m * s[1];
    log_prs.push(segment_log_prob(s[0], s[1], m, b));
    upper_hull.push(HullSegment { m, b, left: s[0], right: s[1], pr: 0.0 });

    // interior: two lines between each pair of abscissae
    for i in 1..n - 2 {
        let m1 = (fs[i] - fs[i - 1]) / (s[i] - s[i - 1]);
        let b1 = fs[i] - m1 * s[i];
        let m2 = (fs[i + 2] - fs[i + 1]) / (s[i + 2] - s[i + 1]);
        let b2 = fs[i + 1] - m2 * s[i + 1];

        if m1.is_infinite() && m2.is_infinite() {
            return Err(HullError::InfiniteSlopes { x: s[i] });
        }

        let dx1 = s[i] - s[i - 1];
        let df1 = fs[i] - fs[i - 1];
        let dx2 = s[i + 2] - s[i + 1];
        let df2 = fs[i + 2] - fs[i + 1];
        let (x1, f1) = (s[i], fs[i]);
        let (x2, f2) = (s[i + 1], fs[i + 1]);

        // cross-difference form of the intersection; stable against
        // cancellation when the slopes are close
        let mut ix = ((f1 * dx1 - df1 * x1) * dx2 - (f2 * dx2 - df2 * x2) * dx1)
            / (df2 * dx1 - df1 * dx2);

        let (pr1, pr2);
        if m1.is_infinite() || (m1 - m2).abs() < 1e8 * ulp(m1) {
            // coincident secants (or a vertical left one): the left piece
            // collapses to zero width and zero mass
            ix = s[i];
            pr1 = f64::NEG_INFINITY;
            pr2 = segment_log_prob(ix, s[i + 1], m2, b2);
        } else if m2.is_infinite() {
            ix = s[i + 1];
            pr1 = segment_log_prob(s[i], ix, m1, b1);
            pr2 = f64::NEG_INFINITY;
        } else {
            if !ix.is_finite() {
                return Err(HullError::NonFiniteIntersection { left: s[i], right: s[i + 1] });
            }

            if (ix - s[i]).abs() < 1e12 * ulp(s[i]) {
                ix = s[i];
            } else if (ix - s[i + 1]).abs() < 1e12 * ulp(s[i + 1]) {
                ix = s[i + 1];
            }

            if ix < s[i] || ix > s[i + 1] {
                return Err(HullError::IntersectionOutOfBounds { ix, left: s[i], right: s[i + 1] });
            }

            pr1 = segment_log_prob(s[i], ix, m1, b1);
            pr2 = segment_log_prob(ix, s[i + 1], m2, b2);
        }

        log_prs.push(pr1);
        upper_hull.push(HullSegment { m: m1, b: b1, left: s[i], right: ix, pr: 0.0 });
        log_prs.push(pr2);
        upper_hull.push(HullSegment { m: m2, b: b2, left: ix, right: s[i + 1], pr: 0.0 });
    }

    // second-to-last line
    let m = (fs[n - 2] - fs[n - 3]) / (s[n - 2] - s[n - 3]);
    let b = fs[n - 2] - m * s[n - 2];
    log_prs.push(segment_log_prob(s[n - 2], s[n - 1], m, b));
    upper_hull.push(HullSegment { m, b, left: s[n - 2], right: s[n - 1], pr: 0.0 });

    if domain.1 == f64::INFINITY {
        // last line, to infinity
        let m = (fs[n - 1] - fs[n - 2]) / (s[n - 1] - s[n - 2]);
        let b = fs[n - 1] - m * s[n - 1];
        log_prs.push(segment_log_prob(s[n - 1], f64::INFINITY, m, b));
        upper_hull.push(HullSegment { m, b, left: s[n - 1], right: f64::INFINITY, pr: 0.0 });
    }

    debug_assert_eq!(upper_hull.len(), n_upper);

    // exp-normalize: subtract the max before exponentiating so the weights
    // stay in range even when raw log-probabilities span hundreds of decades
    let max_lp = log_prs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for lp in &mut log_prs {
        *lp = (*lp - max_lp).exp();
        total += *lp;
    }
    for (seg, &p) in upper_hull.iter_mut().zip(&log_prs) {
        seg.pr = p / total;
    }

    Ok((lower_hull, upper_hull))
}

/// Log of \( \int_l^r \exp(m t + b) \, dt \).
///
/// Half-infinite intervals require the slope sign that makes the integral
/// converge: `m > 0` for `l = -inf`, `m < 0` for `r = +inf`. The finite form
/// subtracts the larger endpoint exponent first so steep segments neither
/// overflow nor underflow.
pub fn segment_log_prob(l: f64, r: f64, m: f64, b: f64) -> f64 {
    if l == f64::NEG_INFINITY {
        return -m.ln() + m * r + b;
    }
    if r == f64::INFINITY {
        return -(-m).ln() + m * l + b;
    }

    let big = (m * r + b).max(m * l + b);
    -m.abs().ln() + ((m * r + b - big).exp() - (m * l + b - big).exp()).abs().ln() + big
}

/// Evaluate both hulls at `x`, returning `(lower, upper)` log values.
///
/// The lower hull evaluates to `-inf` outside its covered range, never
/// extrapolating. That is deliberate: it forces the sampler to consult the
/// true log-density near the unexplored edges of the domain.
///
/// # Panics
///
/// Panics if `x` lies outside the upper hull's covered range. The upper hull
/// partitions the sampling domain, so any value drawn from it is in range.
pub fn evaluate_hulls(x: f64, lower_hull: &[HullSegment], upper_hull: &[HullSegment]) -> (f64, f64) {
    let mut lh = f64::NEG_INFINITY;
    if x >= lower_hull[0].left && x <= lower_hull[lower_hull.len() - 1].right {
        if let Some(seg) = lower_hull.iter().find(|seg| seg.left <= x && x <= seg.right) {
            lh = seg.m * x + seg.b;
        }
    }

    let uh = upper_hull
        .iter()
        .find(|seg| seg.left <= x && x <= seg.right)
        .map(|seg| seg.m * x + seg.b)
        .unwrap_or_else(|| panic!("evaluate_hulls: x = {x} outside the upper hull"));

    (lh, uh)
}

/// Draw one value from the piecewise-exponential density induced by
/// `upper_hull`, using a caller-supplied RNG.
///
/// Two-stage inverse transform: pick a segment by walking the cumulative
/// `pr` weights (the last segment absorbs any floating-point shortfall in the
/// cumulative sum), then invert the segment's exponential CDF in closed form,
/// stabilized by the same max-subtraction as [`segment_log_prob`].
///
/// # Panics
///
/// Panics if `upper_hull` is empty.
pub fn sample_upper_hull_with_rng<R: Rng + ?Sized>(
    upper_hull: &[HullSegment],
    rng: &mut R,
) -> Result<f64, HullError> {
    assert!(!upper_hull.is_empty(), "sample_upper_hull: empty upper hull");

    let u: f64 = rng.random();
    let mut node = &upper_hull[upper_hull.len() - 1];
    let mut cdf = 0.0;
    for seg in upper_hull {
        cdf += seg.pr;
        if u < cdf {
            node = seg;
            break;
        }
    }

    let u: f64 = rng.random();
    let (m, left, right) = (node.m, node.left, node.right);

    let big = (m * right).max(m * left);
    let x = ((u * ((m * right - big).exp() - (m * left - big).exp()) + (m * left - big).exp())
        .ln()
        + big)
        / m;

    if !x.is_finite() {
        return Err(HullError::NonFiniteSample { x });
    }
    if x < left || x > right {
        return Err(HullError::SampleOutOfBounds { x, left, right });
    }

    Ok(x)
}

/// Draw one value from the proposal density induced by `upper_hull`.
///
/// Convenience wrapper over [`sample_upper_hull_with_rng`] using the thread
/// RNG; not deterministic across processes by design.
pub fn sample_upper_hull(upper_hull: &[HullSegment]) -> Result<f64, HullError> {
    let mut rng = rand::rng();
    sample_upper_hull_with_rng(upper_hull, &mut rng)
}
