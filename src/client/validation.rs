//! Client-side form validation.
//!
//! DESIGN
//! ======
//! `FormValidationGuard` sits between the submit event and the form. It
//! asks each field for its own validity (the field decides; `Constraints`
//! is one way to decide) and cancels submission when any field fails. Per
//! field, losing focus re-validates and tags the field; typing re-validates
//! only a field that is already tagged invalid, so feedback clears as soon
//! as the input becomes acceptable without nagging while the user types
//! into a fresh field.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    /// Carries the message the field would show.
    Invalid(String),
}

impl Validity {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(message) => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMark {
    Valid,
    Invalid { feedback: String },
}

pub trait FieldView: Send + Sync {
    fn name(&self) -> &str;
    fn check_validity(&self) -> Validity;
    fn mark(&self, mark: FieldMark);
}

pub trait FormView: Send + Sync {
    /// Whether the form opted in to client-side validation.
    fn requires_validation(&self) -> bool;
    fn fields(&self) -> Vec<Arc<dyn FieldView>>;
    /// Switch on the form-level "validated" styling.
    fn mark_validated(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    Proceed,
    Cancel,
}

// =============================================================================
// GUARD
// =============================================================================

pub struct FormValidationGuard {
    form: Arc<dyn FormView>,
    invalid: HashSet<String>,
}

impl FormValidationGuard {
    #[must_use]
    pub fn new(form: Arc<dyn FormView>) -> Self {
        Self { form, invalid: HashSet::new() }
    }

    /// Decide whether a submit may go ahead.
    pub fn on_submit(&mut self) -> SubmitDecision {
        if !self.form.requires_validation() {
            return SubmitDecision::Proceed;
        }

        let failing: Vec<String> = self
            .form
            .fields()
            .iter()
            .filter(|field| !field.check_validity().is_valid())
            .map(|field| field.name().to_owned())
            .collect();

        if failing.is_empty() {
            return SubmitDecision::Proceed;
        }

        debug!(fields = ?failing, "form submission blocked by validation");
        self.form.mark_validated();
        SubmitDecision::Cancel
    }

    /// Re-validate `field` after it loses focus.
    pub fn on_blur(&mut self, field: &dyn FieldView) -> Validity {
        self.validate(field)
    }

    /// Re-validate `field` after input, but only if it is currently tagged
    /// invalid. Returns `None` when the field was left alone.
    pub fn on_input(&mut self, field: &dyn FieldView) -> Option<Validity> {
        if self.invalid.contains(field.name()) { Some(self.validate(field)) } else { None }
    }

    #[must_use]
    pub fn is_marked_invalid(&self, name: &str) -> bool {
        self.invalid.contains(name)
    }

    fn validate(&mut self, field: &dyn FieldView) -> Validity {
        let validity = field.check_validity();
        match &validity {
            Validity::Valid => {
                self.invalid.remove(field.name());
                field.mark(FieldMark::Valid);
            }
            Validity::Invalid(message) => {
                self.invalid.insert(field.name().to_owned());
                field.mark(FieldMark::Invalid { feedback: message.clone() });
            }
        }
        validity
    }
}

// =============================================================================
// CONSTRAINTS
// =============================================================================

/// Declarative text constraints with browser-style messages. Lengths count
/// characters, not bytes. An empty optional field passes every other check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    pub required: bool,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub email: bool,
}

pub const TICKET_SUBJECT: Constraints = Constraints::required().min_len(5).max_len(200);
pub const TICKET_DESCRIPTION: Constraints = Constraints::required().min_len(10);
pub const USERNAME: Constraints = Constraints::required().min_len(3).max_len(80);
pub const PASSWORD: Constraints = Constraints::required().min_len(6);
pub const EMAIL: Constraints = Constraints::required().email();
pub const PERSON_NAME: Constraints = Constraints::required().min_len(1).max_len(50);
pub const CATEGORY_NAME: Constraints = Constraints::required().min_len(3).max_len(100);
pub const COMMENT: Constraints = Constraints::required();

impl Constraints {
    #[must_use]
    pub const fn optional() -> Self {
        Self { required: false, min_len: None, max_len: None, email: false }
    }

    #[must_use]
    pub const fn required() -> Self {
        Self { required: true, min_len: None, max_len: None, email: false }
    }

    #[must_use]
    pub const fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    #[must_use]
    pub const fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    #[must_use]
    pub const fn email(mut self) -> Self {
        self.email = true;
        self
    }

    #[must_use]
    pub fn check(&self, value: &str) -> Validity {
        if value.trim().is_empty() {
            return if self.required {
                Validity::Invalid("Please fill out this field.".to_owned())
            } else {
                Validity::Valid
            };
        }

        let len = value.chars().count();
        if let Some(min) = self.min_len.filter(|min| len < *min) {
            return Validity::Invalid(format!(
                "Please lengthen this text to {min} characters or more (you are currently using {len} characters)."
            ));
        }
        if let Some(max) = self.max_len.filter(|max| len > *max) {
            return Validity::Invalid(format!(
                "Please shorten this text to {max} characters or less (you are currently using {len} characters)."
            ));
        }
        if self.email && !looks_like_email(value) {
            return Validity::Invalid("Please enter an email address.".to_owned());
        }
        Validity::Valid
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
