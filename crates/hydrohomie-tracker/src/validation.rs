//! Pure validators for the goal and drink-amount inputs.
//!
//! Both the keystroke pass and the focus-loss pass call [`validate_field`];
//! the only difference between them is [`ValidationPass`], which controls
//! whether "not a number" is reported on its own or folded into "not
//! positive".

use std::fmt;

/// The two editable numeric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Goal,
    DrinkAmount,
}

/// Which call site is validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationPass {
    /// Every keystroke.
    Live,
    /// Focus loss.
    Blur,
}

/// A per-field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Blank after trimming.
    Empty,
    /// Not a finite decimal number.
    NotANumber,
    /// Zero or negative.
    NotPositive,
}

impl FieldError {
    /// Inline message for this failure on `field`.
    pub fn message(self, field: Field) -> &'static str {
        match (self, field) {
            (Self::Empty, Field::Goal) => "Goal cannot be empty",
            (Self::Empty, Field::DrinkAmount) => "Amount cannot be empty",
            (Self::NotANumber, _) => "Please enter a valid number",
            (Self::NotPositive, Field::Goal) => "Please enter a positive number",
            (Self::NotPositive, Field::DrinkAmount) => "Please enter a positive amount",
        }
    }
}

/// Any validation error the UI may need to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    Field { field: Field, error: FieldError },
    GoalLessThanDrinkAmount,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { field, error } => f.write_str(error.message(*field)),
            Self::GoalLessThanDrinkAmount => {
                f.write_str("Daily Goal cannot be less than Drink Amount.")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Parse and validate raw input text into a positive number of milliliters.
///
/// Input is trimmed. Accepted: finite decimals such as `"250"`, `"12.5"`,
/// `"1e3"`. `"inf"` and `"NaN"` are rejected as not-a-number.
pub fn validate_field(text: &str, pass: ValidationPass) -> Result<f64, FieldError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Empty);
    }

    let value = match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            return Err(match pass {
                ValidationPass::Live => FieldError::NotANumber,
                ValidationPass::Blur => FieldError::NotPositive,
            });
        }
    };

    if value <= 0.0 {
        return Err(FieldError::NotPositive);
    }
    Ok(value)
}

/// `Some(GoalLessThanDrinkAmount)` exactly when both values are positive
/// and the goal is the smaller one.
pub fn cross_field_error(goal_ml: f64, drink_amount_ml: f64) -> Option<ValidationError> {
    (goal_ml > 0.0 && drink_amount_ml > 0.0 && goal_ml < drink_amount_ml)
        .then_some(ValidationError::GoalLessThanDrinkAmount)
}
