//! Validator configuration.
//!
//! Settings that were process-wide in older form validators (the image mime
//! allow-list, the special-character class, the fallback message) live here
//! and are handed to each [`Validator`](crate::engine::Validator) instance.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::foundation::{ValidatorError, ValidatorResult};

/// Default mime types accepted by the `image` and `dimension` rules.
pub const DEFAULT_IMAGE_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/bmp",
    "image/webp",
];

/// Matches any character that is not a letter, an ASCII digit, whitespace or `.`.
pub const DEFAULT_SPECIAL_CHARS: &str = r"[^\p{L}0-9\s.]";

/// Message used when neither a custom nor a default message exists.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "An unknown error occurred.";

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Mime types treated as images when a rule gives no list of its own.
    pub image_mime_types: Vec<String>,

    /// Pattern matched by `hasSpecial`, `noSpecial` and `password`.
    pub special_chars: String,

    /// Message for rules without any template.
    pub fallback_message: String,

    /// Allowed distance between actual and expected aspect ratio.
    pub aspect_ratio_tolerance: f64,

    /// Minimum password length when `password` has no argument.
    pub password_min_length: usize,

    /// Pinned clock for date comparisons; `None` reads the local clock.
    pub now: Option<NaiveDateTime>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            image_mime_types: DEFAULT_IMAGE_MIME_TYPES
                .iter()
                .map(|mime| (*mime).to_owned())
                .collect(),
            special_chars: DEFAULT_SPECIAL_CHARS.to_owned(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_owned(),
            aspect_ratio_tolerance: 0.1,
            password_min_length: 8,
            now: None,
        }
    }
}

impl ValidatorConfig {
    /// Parses a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> ValidatorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    /// Rejects settings no rule can work with.
    pub fn check(&self) -> ValidatorResult<()> {
        if !self.aspect_ratio_tolerance.is_finite() || self.aspect_ratio_tolerance < 0.0 {
            return Err(ValidatorError::InvalidConfig {
                reason: format!(
                    "aspect_ratio_tolerance must be a non-negative number, got {}",
                    self.aspect_ratio_tolerance
                ),
            });
        }
        Ok(())
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_image_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_special_chars(mut self, pattern: impl Into<String>) -> Self {
        self.special_chars = pattern.into();
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_aspect_ratio_tolerance(mut self, tolerance: f64) -> Self {
        self.aspect_ratio_tolerance = tolerance;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_password_min_length(mut self, length: usize) -> Self {
        self.password_min_length = length;
        self
    }

    /// Pins the clock used by `tillDate` and `shouldOld`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    /// Current local time, or the pinned one.
    pub fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// Debounce windows for live validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Quiet period before a field is re-validated after input, in milliseconds.
    pub throttle_ms: u64,

    /// Quiet period before a conditional group is re-evaluated, in milliseconds.
    pub conditional_throttle_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            throttle_ms: 300,
            conditional_throttle_ms: 500,
        }
    }
}

impl LiveConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn conditional_throttle(&self) -> Duration {
        Duration::from_millis(self.conditional_throttle_ms)
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle_ms = throttle.as_millis() as u64;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_conditional_throttle(mut self, throttle: Duration) -> Self {
        self.conditional_throttle_ms = throttle.as_millis() as u64;
        self
    }
}
