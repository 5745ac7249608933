//! Image dimension constraints.

use serde_json::{Map, Value};

use super::arg::parse_number;
use crate::foundation::{ValidatorError, ValidatorResult};
use crate::messages::format_number;

const RULE: &str = "dimension";

/// The single check a `dimension` rule performs.
///
/// Chosen from the argument keys in priority order: `height`/`width`,
/// `equal`, `smallest`/`highest`, `square`, `ratio`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DimensionCheck {
    /// Only checks that the file is an accepted image.
    #[default]
    AnyImage,
    Exact {
        width: Option<u32>,
        height: Option<u32>,
    },
    Equal {
        width: u32,
        height: u32,
    },
    Bounds {
        smallest: Option<(u32, u32)>,
        highest: Option<(u32, u32)>,
    },
    /// Same width and height, optionally of a fixed size.
    Square(Option<u32>),
    Ratio {
        ratio: f64,
        label: String,
        tolerance: Option<f64>,
    },
}

/// Parsed `dimension` argument.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionSpec {
    pub check: DimensionCheck,
    /// Overrides the configured image mime types.
    pub mime_types: Option<Vec<String>>,
}

/// Result of checking decoded dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionOutcome {
    Passed,
    Failed {
        /// Message key suffix, e.g. `square` for `dimension_square`.
        subcheck: &'static str,
        detail: Vec<(&'static str, String)>,
    },
}

impl DimensionSpec {
    pub fn parse(raw: &Value) -> ValidatorResult<Self> {
        let Value::Object(object) = raw else {
            return Err(ValidatorError::invalid_argument(RULE, "expects an object"));
        };
        let mime_types = match object.get("mimeTypes") {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect(),
            ),
            Some(_) => {
                return Err(ValidatorError::invalid_argument(RULE, "`mimeTypes` must be an array"));
            }
        };
        Ok(Self {
            check: parse_check(object)?,
            mime_types,
        })
    }

    /// Checks a decoded image against the constraint.
    ///
    /// Only the first failing sub-check is reported: `height` before `width`
    /// and `smallest` before `highest`.
    pub fn evaluate(&self, width: u32, height: u32, default_tolerance: f64) -> DimensionOutcome {
        match &self.check {
            DimensionCheck::AnyImage => DimensionOutcome::Passed,
            DimensionCheck::Exact {
                width: want_width,
                height: want_height,
            } => {
                if let Some(expected) = want_height.filter(|expected| *expected != height) {
                    return failed("height", vec![("height", expected.to_string())]);
                }
                if let Some(expected) = want_width.filter(|expected| *expected != width) {
                    return failed("width", vec![("width", expected.to_string())]);
                }
                DimensionOutcome::Passed
            }
            DimensionCheck::Equal {
                width: want_width,
                height: want_height,
            } => {
                if *want_width != width || *want_height != height {
                    return failed("equal", sizes(width, height, *want_width, *want_height));
                }
                DimensionOutcome::Passed
            }
            DimensionCheck::Bounds { smallest, highest } => {
                if let Some((min_width, min_height)) = *smallest
                    && (width < min_width || height < min_height)
                {
                    return failed("smallest", sizes(width, height, min_width, min_height));
                }
                if let Some((max_width, max_height)) = *highest
                    && (width > max_width || height > max_height)
                {
                    return failed("highest", sizes(width, height, max_width, max_height));
                }
                DimensionOutcome::Passed
            }
            DimensionCheck::Square(None) => {
                if width != height {
                    return failed("square", Vec::new());
                }
                DimensionOutcome::Passed
            }
            DimensionCheck::Square(Some(side)) => {
                if width != *side || height != *side {
                    return failed("square_size", sizes(width, height, *side, *side));
                }
                DimensionOutcome::Passed
            }
            DimensionCheck::Ratio {
                ratio,
                label,
                tolerance,
            } => {
                let actual = f64::from(width) / f64::from(height);
                if (actual - ratio).abs() < tolerance.unwrap_or(default_tolerance) {
                    DimensionOutcome::Passed
                } else {
                    failed("aspectRatio", vec![("aspectRatio", label.clone())])
                }
            }
        }
    }
}

fn failed(subcheck: &'static str, detail: Vec<(&'static str, String)>) -> DimensionOutcome {
    DimensionOutcome::Failed { subcheck, detail }
}

fn sizes(width: u32, height: u32, expected_width: u32, expected_height: u32) -> Vec<(&'static str, String)> {
    vec![
        ("givenWidth", width.to_string()),
        ("givenHeight", height.to_string()),
        ("expectedWidth", expected_width.to_string()),
        ("expectedHeight", expected_height.to_string()),
    ]
}

fn parse_check(object: &Map<String, Value>) -> ValidatorResult<DimensionCheck> {
    if object.contains_key("height") || object.contains_key("width") {
        return Ok(DimensionCheck::Exact {
            width: optional_size(object.get("width"))?,
            height: optional_size(object.get("height"))?,
        });
    }
    if let Some(equal) = object.get("equal") {
        let (width, height) = pair(equal)?;
        return Ok(DimensionCheck::Equal { width, height });
    }
    if object.contains_key("smallest") || object.contains_key("highest") {
        return Ok(DimensionCheck::Bounds {
            smallest: object.get("smallest").filter(|v| !v.is_null()).map(pair).transpose()?,
            highest: object.get("highest").filter(|v| !v.is_null()).map(pair).transpose()?,
        });
    }
    if let Some(square) = object.get("square") {
        return Ok(DimensionCheck::Square(optional_size(Some(square))?));
    }
    if let Some(ratio) = object.get("ratio") {
        let (ratio, label) = parse_ratio(ratio)?;
        let tolerance = match object.get("difference") {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_number(RULE, value)?),
        };
        return Ok(DimensionCheck::Ratio {
            ratio,
            label,
            tolerance,
        });
    }
    Ok(DimensionCheck::AnyImage)
}

fn size(value: &Value) -> ValidatorResult<u32> {
    let number = parse_number(RULE, value)?;
    if number < 0.0 || number.fract() != 0.0 || number > f64::from(u32::MAX) {
        return Err(ValidatorError::invalid_argument(
            RULE,
            format!("sizes must be whole pixel counts, got {number}"),
        ));
    }
    Ok(number as u32)
}

/// A size where `0` or `null` means "not constrained".
fn optional_size(value: Option<&Value>) -> ValidatorResult<Option<u32>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => Ok(Some(size(value)?).filter(|size| *size != 0)),
    }
}

fn pair(value: &Value) -> ValidatorResult<(u32, u32)> {
    match value {
        Value::Array(items) if items.len() == 2 => Ok((size(&items[0])?, size(&items[1])?)),
        _ => Err(ValidatorError::invalid_argument(RULE, "expects a [width, height] pair")),
    }
}

fn parse_ratio(value: &Value) -> ValidatorResult<(f64, String)> {
    let invalid = || ValidatorError::InvalidAspectRatio {
        value: match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        },
    };
    match value {
        Value::Number(number) => {
            let ratio = number.as_f64().filter(|ratio| ratio.is_finite() && *ratio > 0.0);
            ratio.map(|ratio| (ratio, format_number(ratio))).ok_or_else(invalid)
        }
        Value::String(text) => {
            let (numerator, denominator) = text.split_once(':').ok_or_else(invalid)?;
            let numerator: f64 = numerator.trim().parse().map_err(|_| invalid())?;
            let denominator: f64 = denominator.trim().parse().map_err(|_| invalid())?;
            let ratio = numerator / denominator;
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(invalid());
            }
            Ok((ratio, text.clone()))
        }
        _ => Err(invalid()),
    }
}
