use regex::{Captures, Regex};

/// Rewrites the string value of every `const <name> ... = "<value>";` declaration.
///
/// Matches TypeScript (`const NAME = "..."`) and Rust (`const NAME: &str = "..."`) forms and
/// replaces whatever value is currently there. Returns the new content and the number of
/// declarations rewritten.
pub fn rewrite_constant(content: &str, name: &str, value: &str) -> (String, usize) {
    let pattern = format!(r#"(\bconst\s+{}\b[^=\n]*=\s*")[^"\n]*(")"#, regex::escape(name));
    let re = Regex::new(&pattern).expect("escaped constant pattern is valid");

    let count = re.find_iter(content).count();
    let rewritten = re
        .replace_all(content, |caps: &Captures<'_>| {
            format!("{}{}{}", &caps[1], value, &caps[2])
        })
        .into_owned();
    (rewritten, count)
}
