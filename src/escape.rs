//! HTML escaping for text and attribute values.
//!
//! maud escapes `&`, `<`, `>` and `"` on its own. Content from the data
//! files goes through [`Text`] instead, which also escapes `'` so that a value
//! is safe in any quoting context it could end up in.

use maud::Render;

/// Escape `& < > " '` into `out`.
pub fn escape_into(out: &mut String, input: &str) {
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    escape_into(&mut out, input);
    out
}

/// A borrowed string rendered with [`escape_into`].
///
/// Works in both positions maud splices values into:
///
/// ```ignore
/// html! { a href=(Text(&url)) { (Text(&label)) } }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Text<'a>(pub &'a str);

impl Render for Text<'_> {
    fn render_to(&self, buffer: &mut String) {
        escape_into(buffer, self.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::html;

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape("Secure Design — 2nd ed."), "Secure Design — 2nd ed.");
    }

    #[test]
    fn text_wrapper_escapes_inside_maud() {
        let title = "<script>alert('x')</script>";
        let html = html! { p title=(Text(title)) { (Text(title)) } }.into_string();
        assert!(!html.contains("<script>"));
        assert!(!html.contains('\''));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }
}
