//! Well-known text formats: email, URL, postal code, JSON, IP addresses.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use regex::Regex;

use crate::foundation::Outcome;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .unwrap()
});

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://[^\s/$.?#].[^\s]*$").unwrap());

static URL_FTP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?|ftp)://[^\s/$.?#].[^\s]*$").unwrap());

static ZIP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}(?:-\d{4})?$").unwrap());

crate::text_rule! {
    pub Email;
    arg: None;
    rule(text, arg) { EMAIL_REGEX.is_match(text) }
}

crate::text_rule! {
    /// HTTP(S) URL; `url:1` also accepts FTP and reports `url_ftp`.
    pub Url;
    arg: Flag;
    check(text, arg, cx) {
        if !arg.flag() {
            return Ok(URL_REGEX.is_match(text).into());
        }
        Ok(if URL_FTP_REGEX.is_match(text) {
            Outcome::Passed
        } else {
            cx.report("url_ftp", &[])
        })
    }
}

crate::text_rule! {
    /// US ZIP or ZIP+4.
    pub ZipCode;
    arg: None;
    rule(text, arg) { ZIP_REGEX.is_match(text) }
}

crate::text_rule! {
    /// Parses as JSON; `json:1` requires an object or array.
    pub Json;
    arg: Flag;
    rule(text, arg) {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => !arg.flag() || value.is_object() || value.is_array(),
            Err(_) => false,
        }
    }
}

crate::text_rule! {
    pub Ipv4;
    arg: None;
    rule(text, arg) { text.parse::<Ipv4Addr>().is_ok() }
}

crate::text_rule! {
    pub Ipv6;
    arg: None;
    rule(text, arg) { text.parse::<Ipv6Addr>().is_ok() }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use crate::foundation::Outcome;
    use crate::validators::testing::Harness;

    #[rstest]
    #[case("email", None, "user@example.com", true)]
    #[case("email", None, "first.last@sub.example.co", true)]
    #[case("email", None, "\"quoted name\"@example.com", true)]
    #[case("email", None, "user@[192.168.0.1]", true)]
    #[case("email", None, "invalid", false)]
    #[case("email", None, "@example.com", false)]
    #[case("email", None, "user@localhost", false)]
    #[case("url", None, "https://example.com/path?q=1", true)]
    #[case("url", None, "HTTP://EXAMPLE.COM", true)]
    #[case("url", None, "ftp://example.com", false)]
    #[case("url", Some(json!(1)), "ftp://example.com", true)]
    #[case("zipCode", None, "12345", true)]
    #[case("zipCode", None, "12345-6789", true)]
    #[case("zipCode", None, "1234", false)]
    #[case("json", None, "42", true)]
    #[case("json", Some(json!(1)), "42", false)]
    #[case("json", Some(json!(1)), "[1, 2]", true)]
    #[case("json", None, "{broken", false)]
    #[case("ipv4", None, "192.168.0.1", true)]
    #[case("ipv4", None, "256.1.1.1", false)]
    #[case("ipv6", None, "2001:0db8:85a3:0000:0000:8a2e:0370:7334", true)]
    #[case("ipv6", None, "::1", true)]
    #[case("ipv6", None, "12345::", false)]
    #[tokio::test]
    async fn test_format_rules(
        #[case] rule: &str,
        #[case] arg: Option<serde_json::Value>,
        #[case] text: &str,
        #[case] passes: bool,
    ) {
        let outcome = Harness::new().text(rule, arg, text).await;
        assert_eq!(outcome.is_passed(), passes, "{rule} on {text:?}: {outcome:?}");
    }

    #[tokio::test]
    async fn test_ftp_flag_reports_its_own_message() {
        let outcome = Harness::new().text("url", Some(json!("1")), "mailto:x").await;
        assert_eq!(
            outcome,
            Outcome::Reported("Please enter a valid HTTP, HTTPS or FTP URL.".into())
        );
        let plain = Harness::new().text("url", None, "mailto:x").await;
        assert_eq!(plain, Outcome::Failed);
    }
}
