//! Markdown to HTML for post bodies.

use pulldown_cmark::{html, CowStr, Event, Options, Parser};

fn post_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_MATH);
    options
}

pub fn render_post_body(markdown: &str) -> String {
    let source = dollar_math(markdown);
    let events = Parser::new_ext(&source, post_options()).map(|event| match event {
        Event::InlineMath(tex) => math_event(&tex, false),
        Event::DisplayMath(tex) => math_event(&tex, true),
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

/// Rewrites `\( .. \)` and `\[ .. \]` into the `$` forms pulldown-cmark
/// understands. Unterminated openers are left alone.
fn dollar_math(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('\\') {
        let (before, tail) = rest.split_at(start);
        out.push_str(before);

        let close = match tail.as_bytes().get(1) {
            Some(b'(') => Some(("\\)", false)),
            Some(b'[') => Some(("\\]", true)),
            _ => None,
        };

        match close.and_then(|(close, display)| tail[2..].find(close).map(|end| (end, display))) {
            Some((end, display)) => {
                let tex = &tail[2..2 + end];
                let fence = if display || tex.contains('\n') { "$$" } else { "$" };
                out.push_str(fence);
                out.push_str(tex);
                out.push_str(fence);
                rest = &tail[2 + end + 2..];
            }
            None => {
                out.push('\\');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn math_event(tex: &str, display: bool) -> Event<'static> {
    let rendered = katex::Opts::builder()
        .display_mode(display)
        .build()
        .ok()
        .and_then(|opts| katex::render_with_opts(tex, opts).ok())
        .unwrap_or_else(|| {
            let class = if display { "math math-display" } else { "math math-inline" };
            format!("<span class=\"{class}\">{}</span>", htmlescape::encode_minimal(tex))
        });
    Event::Html(CowStr::Boxed(rendered.into_boxed_str()))
}

#[cfg(test)]
mod tests {
    use super::{dollar_math, render_post_body};

    #[test]
    fn renders_tables_and_strikethrough() {
        let out = render_post_body("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");
        assert!(out.contains("<table>"));
        assert!(out.contains("<del>old</del>"));
    }

    #[test]
    fn rewrites_latex_delimiters() {
        assert_eq!(dollar_math("\\(x^2\\) and \\[y\\]"), "$x^2$ and $$y$$");
        assert_eq!(dollar_math("a \\( b\nc \\) d"), "a $$ b\nc $$ d");
    }

    #[test]
    fn leaves_other_backslashes_alone() {
        assert_eq!(dollar_math("C:\\path \\(open"), "C:\\path \\(open");
    }

    #[test]
    fn renders_math_with_katex() {
        let out = render_post_body("Inline \\(x^2\\) and display \\[y^2\\]");
        assert!(out.contains("katex"));
    }

    #[test]
    fn renders_math_in_sample_post() {
        let post = include_str!("../content/posts/euler.md");
        assert!(render_post_body(post).contains("katex"));
    }
}
