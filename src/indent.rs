//! Common-indent detection and stripping.
//!
//! The input is the list of literal segments of a template (the text between
//! placeholders) and a set of indent characters. The output keeps the same
//! number of segments, with the common leading indentation of the template
//! removed and the surrounding blank lines collapsed.

/// Strips the common indentation prefix shared by the template's content
/// lines and trims its leading and trailing blank lines.
///
/// The first line of every segment sits on the same line as a placeholder
/// (or at the very start of the template), so it never participates in
/// indent detection and is never stripped. Indent characters are a literal
/// set: tab and space by default, never interchangeable, and free to contain
/// characters that would be special in a pattern language. An empty set
/// disables column-wise stripping but still collapses blank-line runs.
pub fn normalize<S: AsRef<str>>(segments: &[S], indent_chars: &str) -> Vec<String> {
    if segments.is_empty() {
        return Vec::new();
    }

    let mut segments: Vec<String> =
        segments.iter().map(|s| s.as_ref().to_string()).collect();

    collapse_leading(&mut segments[0], indent_chars);
    let last = segments.len() - 1;
    collapse_trailing(&mut segments[last], indent_chars);

    let prefix = common_prefix(&segments, indent_chars);

    let mut result: Vec<String> = segments
        .iter()
        .map(|segment| {
            let lines: Vec<&str> = segment
                .split('\n')
                .enumerate()
                .map(|(k, line)| {
                    if k == 0 {
                        line
                    } else {
                        line.strip_prefix(prefix.as_str()).unwrap_or(line)
                    }
                })
                .collect();
            lines.join("\n")
        })
        .collect();

    if let Some(rest) = result[0].strip_prefix('\n') {
        result[0] = rest.to_string();
    }
    let last = result.len() - 1;
    if let Some(rest) = result[last].strip_suffix('\n') {
        result[last] = rest.to_string();
    }

    result
}

/// The run of indent characters at the start of `line`.
pub fn leading_indent<'a>(line: &'a str, indent_chars: &str) -> &'a str {
    let end = line
        .char_indices()
        .find(|(_, ch)| !indent_chars.contains(*ch))
        .map(|(idx, _)| idx)
        .unwrap_or(line.len());
    &line[..end]
}

/// Collapses a leading run of indent-only lines to a single newline.
fn collapse_leading(segment: &mut String, indent_chars: &str) {
    let mut end = 0;
    for (idx, ch) in segment.char_indices() {
        if ch == '\n' {
            end = idx + 1;
        } else if !indent_chars.contains(ch) {
            break;
        }
    }
    if end > 0 {
        segment.replace_range(..end, "\n");
    }
}

/// Collapses a trailing run of newline-then-indent groups to a single
/// newline.
fn collapse_trailing(segment: &mut String, indent_chars: &str) {
    let mut start = segment.len();
    for (idx, ch) in segment.char_indices().rev() {
        if ch == '\n' {
            start = idx;
        } else if !indent_chars.contains(ch) {
            break;
        }
    }
    if start < segment.len() {
        segment.replace_range(start.., "\n");
    }
}

/// Finds the longest indent prefix shared by every content line.
///
/// Content lines are the non-empty lines that follow another line of the
/// same segment. The scan advances one column at a time and stops at the
/// first column where any content line carries a different character, a
/// character outside the indent set, or no character at all.
fn common_prefix(segments: &[String], indent_chars: &str) -> String {
    let mut prefix = String::new();
    let mut col = 0;
    loop {
        let mut candidate: Option<char> = None;
        for segment in segments {
            for (k, line) in segment.split('\n').enumerate() {
                if k == 0 || line.is_empty() {
                    continue;
                }
                match line.chars().nth(col) {
                    Some(ch)
                        if indent_chars.contains(ch)
                            && candidate.map_or(true, |c| c == ch) =>
                    {
                        candidate = Some(ch);
                    }
                    _ => return prefix,
                }
            }
        }
        match candidate {
            Some(ch) => {
                prefix.push(ch);
                col += 1;
            }
            None => return prefix,
        }
    }
}
