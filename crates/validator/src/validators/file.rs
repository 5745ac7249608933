//! File metadata rules: size, mime type, extension and image type.
//!
//! Text values pass these rules untouched so a rule set can be shared
//! between a file input and a fallback text input.

use async_trait::async_trait;
use tracing::debug;

use crate::foundation::{FileValue, Input, Outcome, Rule, RuleContext, ValidatorResult};
use crate::grammar::{ArgKind, RuleArg};
use crate::messages::human_file_size;

/// Runs `check` on file input; every other input passes.
macro_rules! file_rule {
    ($(#[$meta:meta])* $name:ident, $kind:ident, |$file:ident, $arg:ident, $cx:ident| $body:block) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        #[async_trait]
        impl Rule for $name {
            fn arg_kind(&self) -> ArgKind {
                ArgKind::$kind
            }

            async fn check(
                &self,
                input: Input<'_>,
                $arg: &RuleArg,
                $cx: &mut RuleContext<'_>,
            ) -> ValidatorResult<Outcome> {
                let Some($file) = input.file() else {
                    return Ok(Outcome::Passed);
                };
                $body
            }
        }
    };
}

/// `true` when `mime` is in `allowed`, ignoring ASCII case.
pub(crate) fn mime_allowed(mime: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|candidate| candidate.eq_ignore_ascii_case(mime))
}

/// The image check shared by `image` and the `dimension` fallback.
pub(crate) fn check_image_type(file: &FileValue, allowed: &[String], cx: &RuleContext<'_>) -> Outcome {
    if !file.has_known_type() || mime_allowed(file.mime(), allowed) {
        return Outcome::Passed;
    }
    debug!(field = %cx.field(), mime = file.mime(), "file is not an allowed image type");
    cx.report("image", &[("image", &allowed.join(", "))])
}

file_rule! {
    /// At most the argument's number of bytes.
    FileSize, Number, |file, arg, cx| {
        let Some(max) = arg.as_number() else {
            return Ok(Outcome::Failed);
        };
        if file.size() as f64 <= max {
            return Ok(Outcome::Passed);
        }
        let allowed = human_file_size(max as u64);
        let actual = human_file_size(file.size());
        Ok(cx.report("fileSize", &[("fileSize", &allowed), ("fileSize2", &actual)]))
    }
}

file_rule! {
    /// Reported mime type in the list; unknown types are not judged.
    FileType, List, |file, arg, cx| {
        let Some(allowed) = arg.as_list() else {
            return Ok(Outcome::Failed);
        };
        if !file.has_known_type() || mime_allowed(file.mime(), allowed) {
            return Ok(Outcome::Passed);
        }
        Ok(cx.report("fileType", &[("fileType", &allowed.join(", "))]))
    }
}

file_rule! {
    /// Name extension in the list; unknown types are not judged.
    FileExt, List, |file, arg, cx| {
        let Some(allowed) = arg.as_list() else {
            return Ok(Outcome::Failed);
        };
        let extension = file.extension();
        let matched = allowed
            .iter()
            .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(extension));
        if !file.has_known_type() || matched {
            return Ok(Outcome::Passed);
        }
        Ok(cx.report("fileExt", &[("fileExt", &allowed.join(", "))]))
    }
}

file_rule! {
    /// An image mime type from the argument list, or the configured list.
    Image, OptionalList, |file, arg, cx| {
        let outcome = match arg.as_list() {
            Some(allowed) => check_image_type(file, allowed, cx),
            None => check_image_type(file, &cx.config().image_mime_types, cx),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use crate::foundation::{FileValue, Input, Outcome};
    use crate::validators::testing::Harness;

    fn file(name: &str, mime: &str, size: u64) -> FileValue {
        FileValue::new(name, mime, Vec::<u8>::new()).with_size(size)
    }

    #[tokio::test]
    async fn test_file_size_reports_both_sizes() {
        let mut harness = Harness::new();
        let small = file("a.png", "image/png", 1024);
        assert!(harness.file("fileSize", Some(json!(1024)), &small).await.is_passed());

        let large = file("a.png", "image/png", 3 * 1024 * 1024 / 2);
        assert_eq!(
            harness.file("fileSize", Some(json!(1_048_576)), &large).await,
            Outcome::Reported(
                "The maximum allowed file size is 1 mb and your file size is 1.50 mb.".into()
            )
        );
    }

    #[rstest]
    #[case("fileType", json!(["image/png", "image/gif"]), "a.png", "IMAGE/PNG", true)]
    #[case("fileType", json!("image/png"), "a.jpg", "image/jpeg", false)]
    #[case("fileType", json!("image/png"), "a.bin", "application/octet-stream", true)]
    #[case("fileExt", json!("png,.JPG"), "photo.jpg", "image/jpeg", true)]
    #[case("fileExt", json!(["png"]), "photo.gif", "image/gif", false)]
    #[case("image", json!(null), "photo.webp", "image/webp", true)]
    #[case("image", json!(null), "doc.pdf", "application/pdf", false)]
    #[case("image", json!(["image/png"]), "photo.webp", "image/webp", false)]
    #[case("image", json!(null), "blob", "application/octet-stream", true)]
    #[tokio::test]
    async fn test_file_metadata_rules(
        #[case] rule: &str,
        #[case] arg: serde_json::Value,
        #[case] name: &str,
        #[case] mime: &str,
        #[case] passes: bool,
    ) {
        let value = file(name, mime, 10);
        let outcome = Harness::new().file(rule, Some(arg), &value).await;
        assert_eq!(outcome.is_passed(), passes, "{rule} on {name} ({mime}): {outcome:?}");
    }

    #[tokio::test]
    async fn test_image_message_lists_allowed_types() {
        let value = file("doc.pdf", "application/pdf", 10);
        let outcome = Harness::new().file("image", Some(json!("image/png,image/gif")), &value).await;
        assert_eq!(
            outcome,
            Outcome::Reported(
                "The uploaded file is not a valid image. Allowed image types are image/png, image/gif."
                    .into()
            )
        );
    }

    #[tokio::test]
    async fn test_text_input_passes_file_rules() {
        let mut harness = Harness::new();
        assert!(harness.run("fileSize", Some(json!(1)), Input::Text("long text")).await.is_passed());
        assert!(harness.run("image", None, Input::Text("x")).await.is_passed());
    }
}
