//! Best-effort textual rewrite of GLSL shader sources.
//!
//! Forces a configured color expression into the `main` entry point so the
//! rendered output (and therefore the WebGL pixel fingerprint) becomes a
//! pure function of configuration. This is a single-pass textual transform
//! with known limits: sources with nested braces inside `main`, multiple
//! entry points, or unusual formatting pass through unmodified rather than
//! being half-rewritten.

use regex::Regex;
use std::sync::OnceLock;

fn main_body_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"void\s+main\s*\(\s*(?:void)?\s*\)\s*\{[^}]*\}").expect("main body pattern")
    })
}

/// Rewrite `source`'s `main` body to assign `color` to the output slot the
/// shader already writes (`gl_FragColor` for fragment shaders,
/// `gl_Position` for vertex shaders). Returns `None` when the source is
/// left untouched.
pub fn rewrite_source(source: &str, color: &str) -> Option<String> {
    let target = if source.contains("gl_FragColor") {
        "gl_FragColor"
    } else if source.contains("gl_Position") {
        "gl_Position"
    } else {
        return None;
    };

    let m = main_body_regex().find(source)?;
    // `[^}]*` stops at the first closing brace; a `{` inside the matched
    // body means main has nested blocks and the match is a truncated
    // prefix. Rewriting would corrupt the shader.
    let body = &source[m.start() + m.as_str().find('{')? + 1..m.end() - 1];
    if body.contains('{') {
        return None;
    }

    let replacement = format!("void main(){{{}={};}}", target, color);
    let mut out = String::with_capacity(source.len());
    out.push_str(&source[..m.start()]);
    out.push_str(&replacement);
    out.push_str(&source[m.end()..]);
    Some(out)
}
