//! Numeric bound rules.

use super::sample_value;
use crate::core::{render_sample, Rule, RuleKind, RuleMetadata, Violation, SAMPLE_LIMIT};
use crate::dataset::ColumnRef;
use crate::error::{GuardError, Result};
use tracing::instrument;

/// Values outside `[lo, hi]`: the offending count and a sample of their text.
///
/// Values that do not coerce to a number are left out entirely.
fn out_of_bounds(column: &ColumnRef<'_>, lo: f64, hi: f64) -> Result<(usize, Vec<String>)> {
    let numbers = column.numeric_values()?;
    let texts = column.text_values()?;
    let mut count = 0usize;
    let mut sample = Vec::with_capacity(SAMPLE_LIMIT);

    for (number, text) in numbers.into_iter().zip(texts) {
        let Some(number) = number else { continue };
        if number < lo || number > hi {
            count += 1;
            if sample.len() < SAMPLE_LIMIT {
                let text = text.unwrap_or_else(|| format!("{number:?}"));
                sample.push(sample_value(text.trim()));
            }
        }
    }
    Ok((count, sample))
}

/// Reports numeric values strictly below `lo` or strictly above `hi`.
///
/// Both bounds are inclusive. Text that does not parse as a number is
/// ignored, as are nulls. Boolean columns cannot be evaluated and yield
/// [`GuardError::TypeMismatch`].
///
/// # Examples
///
/// ```rust
/// use ev_guard::rules::NumericRangeRule;
///
/// let latitude = NumericRangeRule::new(-90.0, 90.0).unwrap();
/// assert!(latitude.contains(90.0));
/// assert!(!latitude.contains(90.0001));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRangeRule {
    lo: f64,
    hi: f64,
}

impl NumericRangeRule {
    /// Creates a rule for the inclusive range `[lo, hi]`.
    pub fn new(lo: f64, hi: f64) -> Result<Self> {
        if lo.is_nan() || hi.is_nan() || lo > hi {
            return Err(GuardError::configuration(format!(
                "Invalid numeric range [{lo}, {hi}]"
            )));
        }
        Ok(Self { lo, hi })
    }

    pub fn latitude() -> Self {
        Self { lo: -90.0, hi: 90.0 }
    }

    pub fn longitude() -> Self {
        Self {
            lo: -180.0,
            hi: 180.0,
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }
}

impl Rule for NumericRangeRule {
    #[instrument(skip(self, column), fields(column = %column.name(), lo = self.lo, hi = self.hi))]
    fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>> {
        let (count, sample) = out_of_bounds(column, self.lo, self.hi)?;
        if count == 0 {
            return Ok(None);
        }

        let subject = column.qualified_name();
        let message = format!(
            "{subject}: {count} values out of range [{}, {}]. Sample: {}",
            self.lo,
            self.hi,
            render_sample(&sample)
        );
        Ok(Some(Violation::new(
            RuleKind::NumericRange,
            subject,
            count,
            sample,
            message,
        )))
    }

    fn name(&self) -> &str {
        "numeric_range"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::NumericRange
    }

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new()
            .with_description(format!("Checks values lie within [{}, {}]", self.lo, self.hi))
            .with_parameter("lo", self.lo.to_string())
            .with_parameter("hi", self.hi.to_string())
    }
}

/// Reports negative numeric values; equivalent to the range `[0, +inf]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonNegativeRule;

impl NonNegativeRule {
    pub fn new() -> Self {
        Self
    }
}

impl Rule for NonNegativeRule {
    #[instrument(skip(self, column), fields(column = %column.name()))]
    fn evaluate(&self, column: &ColumnRef<'_>) -> Result<Option<Violation>> {
        let (count, sample) = out_of_bounds(column, 0.0, f64::INFINITY)?;
        if count == 0 {
            return Ok(None);
        }

        let subject = column.qualified_name();
        let message = format!(
            "{subject}: {count} values are negative. Sample: {}",
            render_sample(&sample)
        );
        Ok(Some(Violation::new(
            RuleKind::NonNegative,
            subject,
            count,
            sample,
            message,
        )))
    }

    fn name(&self) -> &str {
        "non_negative"
    }

    fn kind(&self) -> RuleKind {
        RuleKind::NonNegative
    }

    fn metadata(&self) -> RuleMetadata {
        RuleMetadata::new().with_description("Checks values are not negative")
    }
}
