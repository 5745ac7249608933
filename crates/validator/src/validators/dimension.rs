//! Image dimension rule: decodes the image header off the async runtime.

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::ImageReader;
use tracing::{debug, warn};

use super::file::{check_image_type, mime_allowed};
use crate::foundation::{Input, Outcome, Rule, RuleContext, ValidatorResult};
use crate::grammar::{ArgKind, DimensionOutcome, RuleArg};

/// Reads width and height from the encoded image header.
///
/// Runs on the blocking pool; the content is never fully decoded.
pub async fn read_dimensions(bytes: Bytes) -> Result<(u32, u32), String> {
    tokio::task::spawn_blocking(move || {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|error| error.to_string())?
            .into_dimensions()
            .map_err(|error| error.to_string())
    })
    .await
    .map_err(|error| error.to_string())?
}

/// Image files whose pixel size meets the argument.
///
/// Files of another type get the `image` check instead. An image that
/// cannot be decoded fails with the `image` message.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dimension;

#[async_trait]
impl Rule for Dimension {
    fn arg_kind(&self) -> ArgKind {
        ArgKind::Dimension
    }

    async fn check(
        &self,
        input: Input<'_>,
        arg: &RuleArg,
        cx: &mut RuleContext<'_>,
    ) -> ValidatorResult<Outcome> {
        let Some(file) = input.file() else {
            return Ok(Outcome::Passed);
        };
        let RuleArg::Dimension(spec) = arg else {
            return Ok(Outcome::Passed);
        };
        let allowed = spec
            .mime_types
            .as_deref()
            .unwrap_or(&cx.config().image_mime_types);
        if !mime_allowed(file.mime(), allowed) {
            return Ok(check_image_type(file, allowed, cx));
        }

        let (width, height) = match read_dimensions(file.bytes().clone()).await {
            Ok(dimensions) => dimensions,
            Err(error) => {
                warn!(field = %cx.field(), file = file.name(), %error, "could not read image dimensions");
                return Ok(cx.report("image", &[("image", &allowed.join(", "))]));
            }
        };
        debug!(field = %cx.field(), width, height, "image dimensions read");

        Ok(
            match spec.evaluate(width, height, cx.config().aspect_ratio_tolerance) {
                DimensionOutcome::Passed => Outcome::Passed,
                DimensionOutcome::Failed { subcheck, detail } => {
                    let subs: Vec<(&str, &str)> = detail
                        .iter()
                        .map(|(key, value)| (*key, value.as_str()))
                        .collect();
                    Outcome::Reported(cx.messages().dimension(cx.field(), subcheck, &subs))
                }
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use serde_json::json;

    use crate::foundation::FileValue;
    use crate::validators::testing::Harness;

    fn png(width: u32, height: u32) -> FileValue {
        let mut encoded = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut encoded, ImageFormat::Png)
            .unwrap();
        FileValue::new("photo.png", "image/png", encoded.into_inner())
    }

    #[tokio::test]
    async fn test_read_dimensions() {
        let file = png(40, 30);
        assert_eq!(read_dimensions(file.bytes().clone()).await, Ok((40, 30)));
        assert!(read_dimensions(Bytes::from_static(b"not an image")).await.is_err());
    }

    #[tokio::test]
    async fn test_width_mismatch_uses_expected_value() {
        let file = png(40, 30);
        let mut harness = Harness::new();
        let outcome = harness
            .file("dimension", Some(json!({"width": 50})), &file)
            .await;
        assert_eq!(
            outcome,
            Outcome::Reported("The expected width for this image is 50px.".into())
        );
        assert!(harness.file("dimension", Some(json!({"width": 40, "height": 30})), &file).await.is_passed());
    }

    #[tokio::test]
    async fn test_custom_dimension_message() {
        let file = png(40, 30);
        let mut harness = Harness::new().with_messages(json!({
            "field": {"dimension": {"square": "Square images only"}}
        }));
        assert_eq!(
            harness.file("dimension", Some(json!({"square": 0})), &file).await,
            Outcome::Reported("Square images only".into())
        );
    }

    #[tokio::test]
    async fn test_undecodable_image_reports_image_message() {
        let broken = FileValue::new("photo.png", "image/png", b"garbage".to_vec());
        let outcome = Harness::new()
            .file("dimension", Some(json!({"width": 10, "mimeTypes": ["image/png"]})), &broken)
            .await;
        assert_eq!(
            outcome,
            Outcome::Reported(
                "The uploaded file is not a valid image. Allowed image types are image/png.".into()
            )
        );
    }

    #[tokio::test]
    async fn test_other_types_fall_back_to_image_check() {
        let pdf = FileValue::new("doc.pdf", "application/pdf", b"%PDF".to_vec());
        let outcome = Harness::new()
            .file("dimension", Some(json!({"width": 10})), &pdf)
            .await;
        assert!(matches!(outcome, Outcome::Reported(message) if message.starts_with("The uploaded file is not a valid image.")));

        let unknown = FileValue::new("blob", crate::foundation::OCTET_STREAM, b"??".to_vec());
        assert!(Harness::new().file("dimension", None, &unknown).await.is_passed());
    }
}
