//! Macros for declaring rules with minimal boilerplate.
//!
//! # Available Macros
//!
//! - [`text_rule!`]: a unit struct plus its [`Rule`](crate::foundation::Rule)
//!   implementation for rules that only look at text
//!
//! # Examples
//!
//! ```rust,ignore
//! // Boolean predicate: `false` records the rule's templated message.
//! text_rule! {
//!     /// Passes on ASCII digits only.
//!     pub Digits;
//!     arg: None;
//!     rule(text, arg) { text.bytes().all(|b| b.is_ascii_digit()) }
//! }
//!
//! // Full check: the body returns `ValidatorResult<Outcome>` and may report
//! // its own message through the context.
//! text_rule! {
//!     pub Short;
//!     arg: Number;
//!     check(text, arg, cx) {
//!         Ok(if text.len() < 3 { Outcome::Passed } else { cx.report("short", &[]) })
//!     }
//! }
//! ```

// ============================================================================
// TEXT RULE MACRO
// ============================================================================

/// Declares a text-only rule: struct definition and `Rule` implementation.
///
/// `#[derive(Debug, Clone, Copy, Default)]` is always applied. Non-text
/// input (a file) is logged and passed without calling the body.
///
/// # Variants
///
/// **Predicate** (`rule`): the body is a `bool` expression.
///
/// **Check** (`check`): the body evaluates to
/// `ValidatorResult<Outcome>` and has the [`RuleContext`] in scope.
///
/// [`RuleContext`]: crate::foundation::RuleContext
#[macro_export]
macro_rules! text_rule {
    // ── Variant 1: boolean predicate ───────────────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident;
        arg: $kind:ident;
        rule($text:ident, $arg:ident) $body:block
    ) => {
        $crate::text_rule! {
            $(#[$meta])*
            $vis $name;
            arg: $kind;
            check($text, $arg, _cx) {
                Ok($crate::foundation::Outcome::from_bool($body))
            }
        }
    };

    // ── Variant 2: full check with context ─────────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident;
        arg: $kind:ident;
        check($text:ident, $arg:ident, $cx:ident) $body:block
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        #[::async_trait::async_trait]
        impl $crate::foundation::Rule for $name {
            fn arg_kind(&self) -> $crate::grammar::ArgKind {
                $crate::grammar::ArgKind::$kind
            }

            #[allow(unused_variables)]
            async fn check(
                &self,
                input: $crate::foundation::Input<'_>,
                $arg: &$crate::grammar::RuleArg,
                $cx: &mut $crate::foundation::RuleContext<'_>,
            ) -> $crate::foundation::ValidatorResult<$crate::foundation::Outcome> {
                let Some($text) = input.text() else {
                    return Ok($cx.skip_non_text(input));
                };
                $body
            }
        }
    };
}
