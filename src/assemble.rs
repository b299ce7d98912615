//! Page assembly by `{{TOKEN}}` substitution.
//!
//! A template is scanned once, left to right. Each `{{UPPER_SNAKE}}`
//! placeholder is replaced by its value from the token map; the inserted
//! value is never scanned again, so a value can't smuggle in another token
//! and the order tokens are listed in doesn't matter.
//!
//! A placeholder with no entry in the map fails assembly. After
//! substitution the output is checked once more, and any placeholder-shaped
//! text that came in through a value fails too: no page ships with a
//! literal `{{...}}`.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Z][A-Z0-9_]*)\}\}").expect("token pattern"));

/// Token name (without braces) to literal replacement.
pub type TokenMap = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssembleError {
    #[error("unresolved template token {{{{{token}}}}} in {template}")]
    UnresolvedToken { template: String, token: String },
    #[error("required token {{{{{token}}}}} not found in {template}")]
    MissingToken { template: String, token: String },
}

/// Replace every known token in `source`, in a single pass.
///
/// `template` names the source in error messages.
pub fn assemble(source: &str, tokens: &TokenMap, template: &str) -> Result<String, AssembleError> {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    for caps in TOKEN.captures_iter(source) {
        let Some(whole) = caps.get(0) else { continue };
        let name = &caps[1];
        let value = tokens
            .get(name)
            .ok_or_else(|| AssembleError::UnresolvedToken {
                template: template.to_string(),
                token: name.to_string(),
            })?;
        out.push_str(&source[last..whole.start()]);
        out.push_str(value);
        last = whole.end();
    }
    out.push_str(&source[last..]);

    if let Some(leftover) = find_token(&out) {
        return Err(AssembleError::UnresolvedToken {
            template: template.to_string(),
            token: leftover,
        });
    }
    Ok(out)
}

/// Fail unless every name in `required` appears as a placeholder in `source`.
pub fn require_tokens(source: &str, required: &[String], template: &str) -> Result<(), AssembleError> {
    match required
        .iter()
        .find(|name| !source.contains(&format!("{{{{{name}}}}}")))
    {
        Some(name) => Err(AssembleError::MissingToken {
            template: template.to_string(),
            token: name.clone(),
        }),
        None => Ok(()),
    }
}

/// The first placeholder-shaped name in `text`, if any.
pub fn find_token(text: &str) -> Option<String> {
    TOKEN.captures(text).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> TokenMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_every_token() {
        let tokens = map(&[("FOO", "x"), ("BAR", "y")]);
        assert_eq!(
            assemble("<p>{{FOO}}</p>{{BAR}}", &tokens, "t").unwrap(),
            "<p>x</p>y"
        );
    }

    #[test]
    fn replaces_repeated_tokens_globally() {
        let tokens = map(&[("NAV", "<nav></nav>")]);
        assert_eq!(
            assemble("{{NAV}}|{{NAV}}", &tokens, "t").unwrap(),
            "<nav></nav>|<nav></nav>"
        );
    }

    #[test]
    fn unknown_token_fails() {
        let tokens = map(&[("FOO", "x")]);
        let err = assemble("{{FOO}} {{MISSING}}", &tokens, "index.html").unwrap_err();
        assert_eq!(
            err,
            AssembleError::UnresolvedToken {
                template: "index.html".into(),
                token: "MISSING".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "unresolved template token {{MISSING}} in index.html"
        );
    }

    #[test]
    fn values_are_not_rescanned() {
        // BAR's value looks like a token; it must not be expanded to FOO's value.
        let tokens = map(&[("FOO", "x"), ("BAR", "{{FOO}}")]);
        let err = assemble("{{BAR}}", &tokens, "t").unwrap_err();
        assert!(matches!(err, AssembleError::UnresolvedToken { token, .. } if token == "FOO"));
    }

    #[test]
    fn order_of_tokens_does_not_matter() {
        let a = map(&[("A", "1"), ("B", "2")]);
        let b: TokenMap = a.clone().into_iter().rev().collect();
        let source = "{{B}}{{A}}{{B}}";
        assert_eq!(
            assemble(source, &a, "t").unwrap(),
            assemble(source, &b, "t").unwrap()
        );
    }

    #[test]
    fn non_token_braces_pass_through() {
        let tokens = TokenMap::new();
        let source = "{{ lower }} {{lower}} {{1X}} {x}";
        assert_eq!(assemble(source, &tokens, "t").unwrap(), source);
    }

    #[test]
    fn required_tokens_must_be_present() {
        let required = vec!["NAV".to_string(), "FOOTER".to_string()];
        assert!(require_tokens("{{NAV}}{{FOOTER}}", &required, "p").is_ok());
        let err = require_tokens("{{NAV}}", &required, "reading.html").unwrap_err();
        assert_eq!(err.to_string(), "required token {{FOOTER}} not found in reading.html");
    }

    #[test]
    fn find_token_reports_first_placeholder() {
        assert_eq!(find_token("a {{ONE}} {{TWO}}").as_deref(), Some("ONE"));
        assert_eq!(find_token("plain"), None);
    }
}
