#![allow(missing_docs)]

//! Validation contract shared by every entity type.
//!
//! A [`Validator`] inspects one candidate and accumulates human readable
//! violation messages. Entities implement [`Validatable`] to turn a failed
//! validator run into a [`ValidationError`].

mod validators;

pub use validators::{
    BasicRouteValidator, DestinationStationValidator, IntermediateStationValidator,
    JourneyOrigin, JourneyValidator,
};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::models::{BasicRoute, Journey, Price, Station, StationKind};

/// Checks one candidate of type `T`, collecting violation messages.
///
/// Validators are single use. [`Validatable::validate`] takes the validator by
/// value so a run cannot leak messages into the next entity.
pub trait Validator<T> {
    /// Run every check against `candidate`, returning `true` when no
    /// violation was recorded.
    fn validate(&mut self, candidate: &T) -> bool;

    /// Violations recorded so far, in check order.
    fn messages(&self) -> &[String];
}

/// Structured failure raised when an entity breaks one or more invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{title}")]
pub struct ValidationError {
    title: String,
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(title: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            title: title.into(),
            messages,
        }
    }

    /// Short fixed description of the entity that failed.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Ordered violation messages.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Messages rendered as a bulleted list, one ` - message` line each.
    pub fn details(&self) -> String {
        self.messages
            .iter()
            .map(|message| format!(" - {message}\n"))
            .collect()
    }
}

/// Entities that can be checked by a matching [`Validator`].
pub trait Validatable: Sized {
    /// Title carried by the [`ValidationError`] for this entity.
    fn validation_title(&self) -> &'static str;

    fn validate<V>(&self, mut validator: V) -> Result<(), ValidationError>
    where
        V: Validator<Self>,
    {
        if validator.validate(self) {
            Ok(())
        } else {
            Err(ValidationError::new(
                self.validation_title(),
                validator.messages().to_vec(),
            ))
        }
    }
}

impl Validatable for Station {
    fn validation_title(&self) -> &'static str {
        match self.kind {
            StationKind::Destination => {
                "A ValidationException occurred when validating a Destination Station!"
            }
            StationKind::Intermediate => {
                "A ValidationException occurred when validating an Intermediate Station!"
            }
        }
    }
}

impl Validatable for BasicRoute {
    fn validation_title(&self) -> &'static str {
        "A ValidationException occurred when validating a Route!"
    }
}

impl Validatable for Journey {
    fn validation_title(&self) -> &'static str {
        "A ValidationException occurred when validating a Journey!"
    }
}

static STATION_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L} .'-]+$").expect("failed to compile station name regex"));

/// Whether `value` is between `lower` and `upper` characters long, inclusive.
pub fn is_between(value: &str, lower: usize, upper: usize) -> bool {
    let length = value.chars().count();
    length >= lower && length <= upper
}

/// Whether a station name only uses letters, spaces, hyphens, apostrophes and periods.
pub fn is_valid_name(name: &str) -> bool {
    STATION_NAME_RE.is_match(name)
}

/// Whether a price is a chargeable (non-negative) amount.
pub fn is_valid_price(price: Price) -> bool {
    !price.is_negative()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_charset_accepts_letters_and_punctuation() {
        assert!(is_valid_name("King's Lynn"));
        assert!(is_valid_name("St. Pancras"));
        assert!(is_valid_name("Ashby-de-la-Zouch"));
        assert!(is_valid_name("Göteborg"));
        assert!(!is_valid_name("Platform 9"));
        assert!(!is_valid_name("Leeds!"));
        assert!(!is_valid_name(""));
    }

    #[test]
    fn length_is_counted_in_characters() {
        assert!(is_between("Ely", 3, 20));
        assert!(!is_between("Ab", 3, 20));
        assert!(is_between("Åre", 3, 3));
        assert!(!is_between("Llanfairpwllgwyngyll", 3, 19));
    }

    #[test]
    fn error_details_are_bulleted() {
        let error = ValidationError::new(
            "title",
            vec!["first".to_string(), "second".to_string()],
        );
        assert_eq!(error.to_string(), "title");
        assert_eq!(error.details(), " - first\n - second\n");
    }
}
