//! Two-proportion significance testing.
//!
//! Compares the conversion of a control group against a main (treatment)
//! group with a pooled two-proportion z-test, and reports a confidence
//! interval for each group's conversion rate.
//!
//! # Algorithm
//!
//! For success counts s₁, s₂ out of n₁, n₂ (1 = control, 2 = main):
//!
//! ```text
//! p  = (s₁ + s₂) / (n₁ + n₂)
//! SE = √(p(1-p)(1/n₁ + 1/n₂))
//! z  = (s₁/n₁ - s₂/n₂) / SE
//! ```
//!
//! The statistic is control minus main, so a main group that converts better
//! yields a negative z.
//!
//! # References
//!
//! - Agresti, A. (2013). *Categorical Data Analysis*, 3rd ed., Section 3.1.
//! - Wilson, E.B. (1927). "Probable inference, the law of succession, and
//!   statistical inference". *JASA* 22(158), pp. 209-212.
//!
//! # Examples
//!
//! ```
//! use u_abtest::significance::test_proportion_difference;
//! use u_abtest::table::{Column, ObservationTable};
//!
//! let table = ObservationTable::new()
//!     .with_column(
//!         "group",
//!         Column::text(["control", "control", "control", "control",
//!                       "main", "main", "main", "main", "main"]),
//!     )?
//!     .with_column(
//!         "converted",
//!         Column::Numeric(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]),
//!     )?;
//!
//! let r = test_proportion_difference(&table, "group", "converted")?;
//! assert!(r.z < 0.0);       // main converts better
//! assert!(r.p_value < 0.2);
//! println!("{r}");
//! # Ok::<(), u_abtest::AbTestError>(())
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use u_numflow::special;

use crate::error::{AbTestError, Result};
use crate::table::ObservationTable;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Direction of the alternative hypothesis, stated for control relative to main.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    /// H₁: the rates differ.
    #[default]
    TwoSided,
    /// H₁: control rate < main rate.
    Smaller,
    /// H₁: control rate > main rate.
    Larger,
}

/// Method for a single-proportion confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalMethod {
    /// Normal approximation p̂ ± z·√(p̂(1-p̂)/n). May leave [0, 1].
    #[default]
    Wald,
    /// Wilson score interval. Always inside [0, 1] (bounds are clamped).
    Wilson,
}

/// Settings for [`test_proportion_difference_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZTestConfig {
    /// Label of the control group.
    pub control_label: String,
    /// Label of the main (treatment) group.
    pub main_label: String,
    /// Significance level; intervals are built at confidence 1 - alpha.
    pub alpha: f64,
    /// Alternative hypothesis for the p-value.
    pub alternative: Alternative,
    /// Interval construction.
    pub interval_method: IntervalMethod,
    /// Clip interval bounds to [0, 1].
    pub clip_intervals: bool,
}

impl Default for ZTestConfig {
    fn default() -> Self {
        Self {
            control_label: "control".to_string(),
            main_label: "main".to_string(),
            alpha: 0.05,
            alternative: Alternative::TwoSided,
            interval_method: IntervalMethod::Wald,
            clip_intervals: false,
        }
    }
}

impl ZTestConfig {
    /// Sets the group labels.
    pub fn with_labels(mut self, control: impl Into<String>, main: impl Into<String>) -> Self {
        self.control_label = control.into();
        self.main_label = main.into();
        self
    }

    /// Sets the significance level.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the alternative hypothesis.
    pub fn with_alternative(mut self, alternative: Alternative) -> Self {
        self.alternative = alternative;
        self
    }

    /// Sets the interval method.
    pub fn with_interval_method(mut self, method: IntervalMethod) -> Self {
        self.interval_method = method;
        self
    }

    /// Enables or disables clipping of interval bounds to [0, 1].
    pub fn with_clipped_intervals(mut self, clip: bool) -> Self {
        self.clip_intervals = clip;
        self
    }

    /// Checks the settings.
    ///
    /// # Errors
    ///
    /// [`AbTestError::InvalidConfig`] if alpha is not in (0, 1) or both
    /// labels are equal.
    pub fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)?;
        if self.control_label == self.main_label {
            return Err(AbTestError::InvalidConfig(format!(
                "control and main labels are both '{}'",
                self.control_label
            )));
        }
        Ok(())
    }
}

fn check_alpha(alpha: f64) -> Result<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(AbTestError::InvalidConfig(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Success count of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionSample {
    /// Group label.
    pub group: String,
    /// Number of successes.
    pub successes: u64,
    /// Number of trials.
    pub n: u64,
    /// successes / n.
    pub rate: f64,
}

impl ProportionSample {
    /// Creates a sample.
    ///
    /// # Errors
    ///
    /// - [`AbTestError::InsufficientData`] if `n == 0`
    /// - [`AbTestError::InvalidConfig`] if `successes > n`
    pub fn new(group: impl Into<String>, successes: u64, n: u64) -> Result<Self> {
        let group = group.into();
        if n == 0 {
            return Err(AbTestError::InsufficientData { group });
        }
        if successes > n {
            return Err(AbTestError::InvalidConfig(format!(
                "group '{group}' has {successes} successes out of {n} trials"
            )));
        }
        Ok(Self {
            group,
            successes,
            n,
            rate: successes as f64 / n as f64,
        })
    }
}

/// Interval around a proportion estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl ConfidenceInterval {
    /// The interval with both bounds clipped to [0, 1].
    pub fn clipped(self) -> Self {
        Self {
            lower: self.lower.clamp(0.0, 1.0),
            upper: self.upper.clamp(0.0, 1.0),
        }
    }

    /// Returns `true` if `p` lies within the bounds.
    pub fn contains(&self, p: f64) -> bool {
        self.lower <= p && p <= self.upper
    }

    /// upper - lower.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Statistic and p-value of a two-proportion z-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZTestOutcome {
    /// z = (rate_control - rate_main) / SE.
    pub z: f64,
    /// p-value under the chosen alternative.
    pub p_value: f64,
    /// Pooled proportion of both groups.
    pub pooled: f64,
}

/// Pooled two-proportion z-test.
///
/// # Errors
///
/// [`AbTestError::DegenerateInput`] if the pooled proportion is 0 or 1, in
/// which case the standard error vanishes.
///
/// # Examples
///
/// ```
/// use u_abtest::significance::{proportions_z_test, Alternative, ProportionSample};
///
/// let control = ProportionSample::new("control", 120, 1000)?;
/// let main = ProportionSample::new("main", 150, 1000)?;
/// let r = proportions_z_test(&control, &main, Alternative::TwoSided)?;
/// assert!(r.z < 0.0);
/// assert!(r.p_value < 0.06);
/// # Ok::<(), u_abtest::AbTestError>(())
/// ```
pub fn proportions_z_test(
    control: &ProportionSample,
    main: &ProportionSample,
    alternative: Alternative,
) -> Result<ZTestOutcome> {
    let n1 = control.n as f64;
    let n2 = main.n as f64;
    let pooled = (control.successes as f64 + main.successes as f64) / (n1 + n2);

    let var = pooled * (1.0 - pooled);
    if var <= 0.0 {
        return Err(AbTestError::DegenerateInput { pooled });
    }
    let se = (var * (1.0 / n1 + 1.0 / n2)).sqrt();

    let z = (control.rate - main.rate) / se;
    let p_value = match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - special::standard_normal_cdf(z.abs())),
        Alternative::Smaller => special::standard_normal_cdf(z),
        Alternative::Larger => 1.0 - special::standard_normal_cdf(z),
    }
    .clamp(0.0, 1.0);

    Ok(ZTestOutcome { z, p_value, pooled })
}

/// Confidence interval for one group's proportion at confidence 1 - alpha.
///
/// # Errors
///
/// [`AbTestError::InvalidConfig`] if alpha is not in (0, 1).
///
/// # Examples
///
/// ```
/// use u_abtest::significance::{proportion_confint, IntervalMethod, ProportionSample};
///
/// let s = ProportionSample::new("control", 1, 4)?;
/// let ci = proportion_confint(&s, 0.05, IntervalMethod::Wald)?;
/// assert!((ci.lower + 0.174345).abs() < 1e-6);
/// assert!((ci.upper - 0.674345).abs() < 1e-6);
/// # Ok::<(), u_abtest::AbTestError>(())
/// ```
pub fn proportion_confint(
    sample: &ProportionSample,
    alpha: f64,
    method: IntervalMethod,
) -> Result<ConfidenceInterval> {
    check_alpha(alpha)?;
    let z = normal_quantile(1.0 - alpha / 2.0);
    let p = sample.rate;
    let n = sample.n as f64;

    let interval = match method {
        IntervalMethod::Wald => {
            let margin = z * (p * (1.0 - p) / n).sqrt();
            ConfidenceInterval {
                lower: p - margin,
                upper: p + margin,
            }
        }
        IntervalMethod::Wilson => {
            let z2 = z * z;
            let denom = 1.0 + z2 / n;
            let center = (p + z2 / (2.0 * n)) / denom;
            let half = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
            // rounding can push a bound just past 0 or 1 when p̂ is 0 or 1
            ConfidenceInterval {
                lower: center - half,
                upper: center + half,
            }
            .clipped()
        }
    };
    Ok(interval)
}

/// Standard normal quantile Φ⁻¹(p).
///
/// Starts from `special::inverse_normal_cdf` and polishes it with Newton
/// steps on `special::standard_normal_cdf`; the starting estimate alone is
/// only good to about 4e-4 (1.960395 instead of 1.959964 at p = 0.975).
fn normal_quantile(p: f64) -> f64 {
    const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;
    let mut x = special::inverse_normal_cdf(p);
    for _ in 0..3 {
        let density = INV_SQRT_2PI * (-0.5 * x * x).exp();
        if !x.is_finite() || density <= 0.0 {
            break;
        }
        x -= (special::standard_normal_cdf(x) - p) / density;
    }
    x
}

// ---------------------------------------------------------------------------
// Table-level test
// ---------------------------------------------------------------------------

/// Outcome of [`test_proportion_difference`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceResult {
    /// z-statistic, control minus main.
    pub z: f64,
    /// p-value in [0, 1].
    pub p_value: f64,
    /// Interval for the control conversion rate.
    pub control_interval: ConfidenceInterval,
    /// Interval for the main conversion rate.
    pub main_interval: ConfidenceInterval,
    /// Control counts.
    pub control: ProportionSample,
    /// Main counts.
    pub main: ProportionSample,
    /// Pooled proportion.
    pub pooled: f64,
    /// Significance level the intervals were built with.
    pub alpha: f64,
    /// Alternative the p-value refers to.
    pub alternative: Alternative,
}

impl SignificanceResult {
    /// Returns `true` if `p_value < alpha`.
    pub fn is_significant(&self) -> bool {
        self.p_value < self.alpha
    }
}

impl fmt::Display for SignificanceResult {
    /// Four lines: z statistic, p-value, control interval, main interval.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = ((1.0 - self.alpha) * 100.0 * 1e6).round() / 1e6;
        writeln!(f, "z statistic: {:.4}", self.z)?;
        writeln!(f, "p-value: {:.4}", self.p_value)?;
        writeln!(
            f,
            "conf-interval {pct}% for {} group: [{:.4}, {:.4}]",
            self.control.group, self.control_interval.lower, self.control_interval.upper
        )?;
        writeln!(
            f,
            "conf-interval {pct}% for {} group: [{:.4}, {:.4}]",
            self.main.group, self.main_interval.lower, self.main_interval.upper
        )
    }
}

/// Tests control vs main conversion with the default [`ZTestConfig`].
///
/// # Errors
///
/// See [`test_proportion_difference_with`].
pub fn test_proportion_difference(
    table: &ObservationTable,
    group_column: &str,
    target_column: &str,
) -> Result<SignificanceResult> {
    test_proportion_difference_with(table, group_column, target_column, &ZTestConfig::default())
}

/// Tests control vs main conversion.
///
/// Rows whose group label is neither the control nor the main label are
/// ignored.
///
/// # Errors
///
/// - [`AbTestError::InvalidConfig`] if `config` is invalid
/// - [`AbTestError::ColumnNotFound`] / [`AbTestError::ColumnTypeMismatch`]
///   for bad column references
/// - [`AbTestError::InsufficientData`] if either group has no rows
/// - [`AbTestError::NonFiniteValue`] / [`AbTestError::NonBinaryTarget`] if a
///   selected target is not 0 or 1
/// - [`AbTestError::DegenerateInput`] if every selected target is 0 or every
///   one is 1
pub fn test_proportion_difference_with(
    table: &ObservationTable,
    group_column: &str,
    target_column: &str,
    config: &ZTestConfig,
) -> Result<SignificanceResult> {
    config.validate()?;
    let targets = table.numeric(target_column)?;

    let control_rows = table.rows_where(group_column, &config.control_label)?;
    let main_rows = table.rows_where(group_column, &config.main_label)?;
    tracing::debug!(
        control = control_rows.len(),
        main = main_rows.len(),
        ignored = table.row_count() - control_rows.len() - main_rows.len(),
        "selected z-test rows"
    );

    let control = binary_sample(&config.control_label, &control_rows, targets, target_column)?;
    let main = binary_sample(&config.main_label, &main_rows, targets, target_column)?;

    let outcome = proportions_z_test(&control, &main, config.alternative)?;
    let mut control_interval = proportion_confint(&control, config.alpha, config.interval_method)?;
    let mut main_interval = proportion_confint(&main, config.alpha, config.interval_method)?;
    if config.clip_intervals {
        control_interval = control_interval.clipped();
        main_interval = main_interval.clipped();
    }

    tracing::debug!(
        z = outcome.z,
        p_value = outcome.p_value,
        pooled = outcome.pooled,
        "two-proportion z-test"
    );

    Ok(SignificanceResult {
        z: outcome.z,
        p_value: outcome.p_value,
        control_interval,
        main_interval,
        control,
        main,
        pooled: outcome.pooled,
        alpha: config.alpha,
        alternative: config.alternative,
    })
}

/// Counts successes over `rows`, requiring every target to be 0 or 1.
fn binary_sample(
    group: &str,
    rows: &[usize],
    targets: &[f64],
    column: &str,
) -> Result<ProportionSample> {
    let mut successes = 0u64;
    for &row in rows {
        let v = targets[row];
        if !v.is_finite() {
            return Err(AbTestError::NonFiniteValue {
                column: column.to_string(),
                row,
            });
        }
        if v == 1.0 {
            successes += 1;
        } else if v != 0.0 {
            return Err(AbTestError::NonBinaryTarget {
                column: column.to_string(),
                row,
                value: v,
            });
        }
    }
    ProportionSample::new(group, successes, rows.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    fn table(control: &[f64], main: &[f64]) -> ObservationTable {
        let groups = std::iter::repeat("control")
            .take(control.len())
            .chain(std::iter::repeat("main").take(main.len()));
        let targets: Vec<f64> = control.iter().chain(main.iter()).copied().collect();
        ObservationTable::new()
            .with_column("group", Column::text(groups))
            .expect("should build")
            .with_column("converted", Column::Numeric(targets))
            .expect("should build")
    }

    fn scenario() -> ObservationTable {
        table(&[0.0, 0.0, 1.0, 0.0], &[1.0, 1.0, 0.0, 1.0, 1.0])
    }

    // -----------------------------------------------------------------------
    // z-test
    // -----------------------------------------------------------------------

    #[test]
    fn main_better_gives_negative_z() {
        let r = test_proportion_difference(&scenario(), "group", "converted")
            .expect("should compute");
        assert_eq!(r.control.rate, 0.25);
        assert!((r.main.rate - 0.8).abs() < 1e-12);
        // SE = √(5/9 · 4/9 · (1/4 + 1/5)) = 1/3
        assert!((r.z + 1.65).abs() < 1e-9, "z = {}", r.z);
        assert!((r.p_value - 0.0989).abs() < 1e-3, "p = {}", r.p_value);
        assert!(r.p_value < 0.2);
        assert!(!r.is_significant());
    }

    #[test]
    fn wald_intervals_unclipped_by_default() {
        let r = test_proportion_difference(&scenario(), "group", "converted")
            .expect("should compute");
        assert!((r.control_interval.lower + 0.174345).abs() < 1e-6, "{:?}", r.control_interval);
        assert!((r.control_interval.upper - 0.674345).abs() < 1e-6, "{:?}", r.control_interval);
        assert!((r.main_interval.lower - 0.449391).abs() < 1e-6, "{:?}", r.main_interval);
        assert!((r.main_interval.upper - 1.150609).abs() < 1e-6, "{:?}", r.main_interval);
    }

    #[test]
    fn clipped_intervals() {
        let cfg = ZTestConfig::default().with_clipped_intervals(true);
        let r = test_proportion_difference_with(&scenario(), "group", "converted", &cfg)
            .expect("should compute");
        assert_eq!(r.control_interval.lower, 0.0);
        assert!((r.control_interval.upper - 0.674345).abs() < 1e-6);
        assert!((r.main_interval.lower - 0.449391).abs() < 1e-6);
        assert_eq!(r.main_interval.upper, 1.0);
    }

    #[test]
    fn equal_rates() {
        let t = table(&[1.0, 0.0, 1.0, 0.0], &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
        let r = test_proportion_difference(&t, "group", "converted").expect("should compute");
        assert!(r.z.abs() < 1e-12, "z = {}", r.z);
        assert!((r.p_value - 1.0).abs() < 1e-6, "p = {}", r.p_value);
    }

    #[test]
    fn one_sided_alternatives() {
        let base = ZTestConfig::default();
        let t = scenario();
        let smaller = test_proportion_difference_with(
            &t,
            "group",
            "converted",
            &base.clone().with_alternative(Alternative::Smaller),
        )
        .expect("should compute");
        let larger = test_proportion_difference_with(
            &t,
            "group",
            "converted",
            &base.with_alternative(Alternative::Larger),
        )
        .expect("should compute");
        assert!((smaller.p_value - 0.0495).abs() < 1e-3, "p = {}", smaller.p_value);
        assert!((smaller.p_value + larger.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn large_samples_significant() {
        let control = ProportionSample::new("control", 100, 1000).expect("valid");
        let main = ProportionSample::new("main", 200, 1000).expect("valid");
        let r = proportions_z_test(&control, &main, Alternative::TwoSided).expect("should compute");
        assert!(r.z < -5.0, "z = {}", r.z);
        assert!(r.p_value < 1e-6, "p = {}", r.p_value);
    }

    // -----------------------------------------------------------------------
    // Failure modes
    // -----------------------------------------------------------------------

    #[test]
    fn missing_group_is_insufficient_data() {
        let t = table(&[0.0, 1.0, 0.0], &[]);
        assert_eq!(
            test_proportion_difference(&t, "group", "converted").unwrap_err(),
            AbTestError::InsufficientData {
                group: "main".into()
            }
        );
    }

    #[test]
    fn all_converted_is_degenerate() {
        let t = table(&[1.0, 1.0], &[1.0, 1.0, 1.0]);
        assert_eq!(
            test_proportion_difference(&t, "group", "converted").unwrap_err(),
            AbTestError::DegenerateInput { pooled: 1.0 }
        );
    }

    #[test]
    fn none_converted_is_degenerate() {
        let t = table(&[0.0, 0.0], &[0.0]);
        assert!(matches!(
            test_proportion_difference(&t, "group", "converted"),
            Err(AbTestError::DegenerateInput { .. })
        ));
    }

    #[test]
    fn non_binary_rejected() {
        let t = table(&[0.0, 2.5], &[1.0, 0.0]);
        assert_eq!(
            test_proportion_difference(&t, "group", "converted").unwrap_err(),
            AbTestError::NonBinaryTarget {
                column: "converted".into(),
                row: 1,
                value: 2.5
            }
        );
    }

    #[test]
    fn nan_rejected() {
        let t = table(&[0.0, 1.0], &[f64::NAN, 0.0]);
        assert!(matches!(
            test_proportion_difference(&t, "group", "converted"),
            Err(AbTestError::NonFiniteValue { row: 2, .. })
        ));
    }

    #[test]
    fn other_groups_ignored() {
        let t = ObservationTable::new()
            .with_column("group", Column::text(["control", "holdout", "main", "control", "main"]))
            .expect("should build")
            .with_column("converted", Column::Numeric(vec![0.0, 7.0, 1.0, 1.0, 0.0]))
            .expect("should build");
        let r = test_proportion_difference(&t, "group", "converted").expect("should compute");
        assert_eq!(r.control.n, 2);
        assert_eq!(r.main.n, 2);
    }

    #[test]
    fn missing_column() {
        assert!(matches!(
            test_proportion_difference(&scenario(), "variant", "converted"),
            Err(AbTestError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            test_proportion_difference(&scenario(), "group", "clicked"),
            Err(AbTestError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn invalid_config() {
        let bad_alpha = ZTestConfig::default().with_alpha(1.5);
        assert!(matches!(
            test_proportion_difference_with(&scenario(), "group", "converted", &bad_alpha),
            Err(AbTestError::InvalidConfig(_))
        ));
        let same_labels = ZTestConfig::default().with_labels("main", "main");
        assert!(same_labels.validate().is_err());
    }

    #[test]
    fn custom_labels() {
        let t = ObservationTable::new()
            .with_column("arm", Column::text(["A", "B", "A", "B"]))
            .expect("should build")
            .with_column("y", Column::Numeric(vec![0.0, 1.0, 1.0, 1.0]))
            .expect("should build");
        let cfg = ZTestConfig::default().with_labels("A", "B");
        let r = test_proportion_difference_with(&t, "arm", "y", &cfg).expect("should compute");
        assert_eq!(r.control.group, "A");
        assert_eq!(r.control.rate, 0.5);
        assert_eq!(r.main.rate, 1.0);
    }

    #[test]
    fn sample_validation() {
        assert!(matches!(
            ProportionSample::new("g", 0, 0),
            Err(AbTestError::InsufficientData { .. })
        ));
        assert!(ProportionSample::new("g", 5, 4).is_err());
    }

    // -----------------------------------------------------------------------
    // Intervals
    // -----------------------------------------------------------------------

    #[test]
    fn wilson_interval_known_value() {
        let s = ProportionSample::new("main", 4, 5).expect("valid");
        let ci = proportion_confint(&s, 0.05, IntervalMethod::Wilson).expect("should compute");
        assert!((ci.lower - 0.375535).abs() < 1e-6, "{ci:?}");
        assert!((ci.upper - 0.963776).abs() < 1e-6, "{ci:?}");
    }

    #[test]
    fn critical_value_matches_normal_quantile() {
        assert!((normal_quantile(0.975) - 1.959964).abs() < 1e-5, "z = {}", normal_quantile(0.975));
        assert!((normal_quantile(0.995) - 2.575829).abs() < 1e-5, "z = {}", normal_quantile(0.995));
        assert!(normal_quantile(0.5).abs() < 1e-9);
    }

    #[test]
    fn wilson_stays_in_unit_interval_at_extremes() {
        for n in [1u64, 7, 19, 250, 1999] {
            for s in [0, n] {
                let sample = ProportionSample::new("g", s, n).expect("valid");
                let ci = proportion_confint(&sample, 0.05, IntervalMethod::Wilson)
                    .expect("should compute");
                assert!(ci.lower >= 0.0 && ci.upper <= 1.0, "s = {s}, n = {n}: {ci:?}");
            }
        }
    }

    #[test]
    fn huge_success_counts_do_not_overflow() {
        let control = ProportionSample::new("control", u64::MAX, u64::MAX).expect("valid");
        let main = ProportionSample::new("main", 1, 2).expect("valid");
        let r = proportions_z_test(&control, &main, Alternative::TwoSided);
        assert!(matches!(r, Ok(_) | Err(AbTestError::DegenerateInput { .. })), "{r:?}");
    }

    #[test]
    fn wider_at_higher_confidence() {
        let s = ProportionSample::new("g", 30, 100).expect("valid");
        let ci95 = proportion_confint(&s, 0.05, IntervalMethod::Wald).expect("should compute");
        let ci99 = proportion_confint(&s, 0.01, IntervalMethod::Wald).expect("should compute");
        assert!(ci99.width() > ci95.width());
        assert!(ci95.contains(0.3));
    }

    #[test]
    fn confint_rejects_bad_alpha() {
        let s = ProportionSample::new("g", 1, 2).expect("valid");
        assert!(proportion_confint(&s, 0.0, IntervalMethod::Wald).is_err());
        assert!(proportion_confint(&s, f64::NAN, IntervalMethod::Wilson).is_err());
    }

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------

    #[test]
    fn report_four_lines() {
        let r = test_proportion_difference(&scenario(), "group", "converted")
            .expect("should compute");
        let text = r.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "z statistic: -1.6500");
        assert_eq!(lines[1], "p-value: 0.0989");
        assert_eq!(
            lines[2],
            "conf-interval 95% for control group: [-0.1743, 0.6743]"
        );
        assert_eq!(lines[3], "conf-interval 95% for main group: [0.4494, 1.1506]");
    }

    #[test]
    fn report_uses_confidence_level() {
        let cfg = ZTestConfig::default().with_alpha(0.1);
        let r = test_proportion_difference_with(&scenario(), "group", "converted", &cfg)
            .expect("should compute");
        assert!(r.to_string().contains("conf-interval 90% for control group"));
    }
}
