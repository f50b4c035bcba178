use crate::{KilnError, KilnResult};
use fnv::FnvHashSet;

struct Conditional {
    // Whether lines in the current branch are kept
    active: bool,
    // Whether the enclosing block was active when this conditional opened
    parent_active: bool,
    seen_else: bool,
}

fn directive_argument<'a>(
    line_number: usize,
    directive: &str,
    rest: &'a str,
) -> KilnResult<&'a str> {
    let name = rest.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(KilnError::ShaderCompileError(format!(
            "line {}: #{} expects exactly one name",
            line_number, directive
        )));
    }
    Ok(name)
}

/// Resolves `#define`, `#undef`, `#ifdef`, `#ifndef`, `#else` and `#endif` lines. Directive lines
/// and lines in inactive branches become empty so compiler diagnostics keep their line numbers.
pub fn preprocess(
    source: &str,
    defines: &[&str],
) -> KilnResult<String> {
    let mut defined: FnvHashSet<String> = defines.iter().map(|x| x.to_string()).collect();
    let mut stack = Vec::<Conditional>::new();
    let mut output = String::with_capacity(source.len());

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let active = stack.last().map(|x| x.active).unwrap_or(true);
        let trimmed = line.trim_start();

        if let Some(directive_line) = trimmed.strip_prefix('#') {
            let directive_line = directive_line.trim_start();
            let (directive, rest) = directive_line
                .split_once(char::is_whitespace)
                .unwrap_or((directive_line, ""));

            match directive {
                "define" => {
                    if active {
                        let name = directive_argument(line_number, directive, rest)?;
                        defined.insert(name.to_string());
                    }
                }
                "undef" => {
                    if active {
                        let name = directive_argument(line_number, directive, rest)?;
                        defined.remove(name);
                    }
                }
                "ifdef" | "ifndef" => {
                    let name = directive_argument(line_number, directive, rest)?;
                    let is_defined = defined.contains(name);
                    let condition = if directive == "ifdef" {
                        is_defined
                    } else {
                        !is_defined
                    };
                    stack.push(Conditional {
                        active: active && condition,
                        parent_active: active,
                        seen_else: false,
                    });
                }
                "else" => {
                    let conditional = stack.last_mut().ok_or_else(|| {
                        KilnError::ShaderCompileError(format!(
                            "line {}: #else without #ifdef",
                            line_number
                        ))
                    })?;
                    if conditional.seen_else {
                        return Err(KilnError::ShaderCompileError(format!(
                            "line {}: duplicate #else",
                            line_number
                        )));
                    }
                    conditional.seen_else = true;
                    conditional.active = conditional.parent_active && !conditional.active;
                }
                "endif" => {
                    if stack.pop().is_none() {
                        return Err(KilnError::ShaderCompileError(format!(
                            "line {}: #endif without #ifdef",
                            line_number
                        )));
                    }
                }
                _ => {
                    return Err(KilnError::ShaderCompileError(format!(
                        "line {}: unknown directive #{}",
                        line_number, directive
                    )));
                }
            }
        } else if active {
            output.push_str(line);
        }

        output.push('\n');
    }

    if !stack.is_empty() {
        return Err(KilnError::ShaderCompileError(format!(
            "{} unterminated #ifdef block(s)",
            stack.len()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "a\n#ifdef FOO\nfoo\n#else\nnot_foo\n#endif\n#ifndef BAR\nnot_bar\n#endif\nz";

    #[test]
    fn branches_follow_defines() {
        assert_eq!(
            preprocess(SOURCE, &[]).unwrap(),
            "a\n\n\n\nnot_foo\n\n\nnot_bar\n\nz\n"
        );
        assert_eq!(
            preprocess(SOURCE, &["FOO", "BAR"]).unwrap(),
            "a\n\nfoo\n\n\n\n\n\n\nz\n"
        );
    }

    #[test]
    fn line_count_is_preserved() {
        let output = preprocess(SOURCE, &["FOO"]).unwrap();
        assert_eq!(output.lines().count(), SOURCE.lines().count());
    }

    #[test]
    fn nested_and_inline_defines() {
        let source = "#define OUTER\n#ifdef OUTER\n#ifdef INNER\nx\n#else\ny\n#endif\n#endif\n#ifdef MISSING\n#ifdef OUTER\nw\n#else\nv\n#endif\n#endif";
        let output = preprocess(source, &[]).unwrap();
        let kept: Vec<&str> = output.lines().filter(|x| !x.is_empty()).collect();
        assert_eq!(kept, vec!["y"]);

        let undefined = preprocess("#define A\n#undef A\n#ifdef A\na\n#endif", &[]).unwrap();
        assert!(undefined.lines().all(|x| x.is_empty()));
    }

    #[test]
    fn unbalanced_directives_fail() {
        assert!(preprocess("#ifdef A\nx", &[]).is_err());
        assert!(preprocess("#endif", &[]).is_err());
        assert!(preprocess("#else", &[]).is_err());
        assert!(preprocess("#ifdef A\n#else\n#else\n#endif", &[]).is_err());
        assert!(preprocess("#pragma once", &[]).is_err());
        assert!(preprocess("#ifdef\n#endif", &[]).is_err());
    }
}
