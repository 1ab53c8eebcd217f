use widestring::U16Str;
use widestring::U16String;

const SPACE: u16 = b' ' as u16;
const TAB: u16 = b'\t' as u16;
const QUOTE: u16 = b'"' as u16;
const BACKSLASH: u16 = b'\\' as u16;

/// Quotes a single argument so that `CommandLineToArgvW` hands it back unchanged.
///
/// Arguments without spaces, tabs or double quotes are passed through as they
/// are and the empty argument becomes `""`. Everything else is wrapped in
/// double quotes with each embedded `"` written as `\"`. Backslashes are copied
/// verbatim, so a backslash directly before an embedded quote or before the
/// closing quote is read back as an escape by the child.
#[must_use]
pub fn quote(arg: &U16Str) -> U16String {
    if arg.is_empty() {
        return U16String::from_vec(vec![QUOTE, QUOTE]);
    }

    if !arg
        .as_slice()
        .iter()
        .any(|unit| matches!(*unit, SPACE | TAB | QUOTE))
    {
        return arg.to_ustring();
    }

    let mut quoted = U16String::with_capacity(arg.len() + 2);
    quoted.push_slice([QUOTE]);
    for &unit in arg.as_slice() {
        if unit == QUOTE {
            quoted.push_slice([BACKSLASH, QUOTE]);
        } else {
            quoted.push_slice([unit]);
        }
    }
    quoted.push_slice([QUOTE]);

    quoted
}

/// Builds the command line for the child: the quoted program path followed by
/// every quoted argument, separated by single spaces.
#[must_use]
pub fn build<I, S>(program: &U16Str, args: I) -> U16String
where
    I: IntoIterator<Item = S>,
    S: AsRef<U16Str>,
{
    let mut command_line = quote(program);
    for arg in args {
        command_line.push_slice([SPACE]);
        command_line.push(quote(arg.as_ref()));
    }

    command_line
}

/// The arguments to hand on to the child, i.e. everything after argument 0.
#[must_use]
pub fn forwarded(argv: &[U16String]) -> &[U16String] {
    argv.get(1..).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(s: &str) -> U16String {
        U16String::from_str(s)
    }

    // Same rules as shell32's CommandLineToArgvW: argument 0 ends at the next
    // quote or whitespace, the rest follow the 2n / 2n+1 backslash rules.
    fn split(command_line: &U16Str) -> Vec<String> {
        let command_line = command_line.to_string_lossy();
        let mut chars = command_line.chars().peekable();
        let mut argv = Vec::new();

        let mut program = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                program.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ' ' || c == '\t' {
                    break;
                }
                program.push(c);
                chars.next();
            }
        }
        argv.push(program);

        while matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        }

        let mut current = chars.peek().map(|_| String::new());
        let mut backslashes = 0;
        let mut quotes = 0;

        while let Some(c) = chars.next() {
            match c {
                ' ' | '\t' if quotes == 0 => {
                    argv.extend(current.take());
                    while matches!(chars.peek(), Some(' ' | '\t')) {
                        chars.next();
                    }
                    current = chars.peek().map(|_| String::new());
                    backslashes = 0;
                }
                '\\' => {
                    current.get_or_insert_with(String::new).push('\\');
                    backslashes += 1;
                }
                '"' => {
                    let arg = current.get_or_insert_with(String::new);
                    if backslashes % 2 == 0 {
                        arg.truncate(arg.len() - backslashes / 2);
                        quotes += 1;
                    } else {
                        arg.truncate(arg.len() - backslashes / 2 - 1);
                        arg.push('"');
                    }
                    backslashes = 0;

                    while chars.peek() == Some(&'"') {
                        chars.next();
                        quotes += 1;
                        if quotes == 3 {
                            arg.push('"');
                            quotes = 0;
                        }
                    }

                    if quotes == 2 {
                        quotes = 0;
                    }
                }
                other => {
                    current.get_or_insert_with(String::new).push(other);
                    backslashes = 0;
                }
            }
        }
        argv.extend(current);

        argv
    }

    fn round_trip(args: &[&str]) -> Vec<String> {
        let args = args.iter().map(|arg| w(arg)).collect::<Vec<_>>();
        let command_line = build(&w(r"C:\install\nortools.exe"), &args);
        split(&command_line).into_iter().skip(1).collect()
    }

    #[test]
    fn empty_argument_is_a_pair_of_quotes() {
        assert_eq!(quote(&w("")), w("\"\""));
    }

    #[test]
    fn plain_arguments_are_not_quoted() {
        for arg in ["dig", "--json", "example.com", r"C:\tools\", "a=b;c", "ÆØÅ"] {
            assert_eq!(quote(&w(arg)), w(arg));
        }
    }

    #[test]
    fn whitespace_and_quotes_are_wrapped() {
        assert_eq!(quote(&w("b c")), w("\"b c\""));
        assert_eq!(quote(&w("tab\there")), w("\"tab\there\""));
        assert_eq!(quote(&w("say \"hi\"")), w(r#""say \"hi\"""#));
        assert_eq!(quote(&w("\"")), w(r#""\"""#));
    }

    #[test]
    fn quoting_round_trips() {
        let args = [
            "",
            "plain",
            "with space",
            "with\ttab",
            "say \"hi\"",
            "\"",
            "\"\"",
            r"C:\Program Files\NorTools\config.json",
            "mx ns.example.no",
            "æøå med mellomrom",
            "  leading and trailing  ",
        ];

        assert_eq!(round_trip(&args), args);
    }

    #[test]
    fn program_path_is_quoted_like_an_argument() {
        assert_eq!(
            build(&w(r"C:\Program Files\NorTools\nortools.exe"), Vec::<U16String>::new()),
            w(r#""C:\Program Files\NorTools\nortools.exe""#)
        );

        let command_line = build(&w(r"C:\Program Files\NorTools\nortools.exe"), [w("dns")]);
        assert_eq!(
            split(&command_line),
            [r"C:\Program Files\NorTools\nortools.exe", "dns"]
        );
    }

    #[test]
    fn arguments_are_joined_with_single_spaces() {
        let command_line = build(&w(r"C:\install\nortools.exe"), [w("a"), w(""), w("b c")]);
        assert_eq!(command_line, w(r#"C:\install\nortools.exe a "" "b c""#));
    }

    #[test]
    fn argument_zero_is_not_forwarded() {
        let argv = split(&w(r#"launcher.exe a "b c" d"#))
            .iter()
            .map(|arg| w(arg))
            .collect::<Vec<_>>();

        let command_line = build(&w(r"C:\install\nortools.exe"), forwarded(&argv));
        assert_eq!(command_line, w(r#"C:\install\nortools.exe a "b c" d"#));
        assert_eq!(split(&command_line)[1..], ["a", "b c", "d"]);
    }

    #[test]
    fn nothing_is_forwarded_without_arguments() {
        assert!(forwarded(&[w("launcher.exe")]).is_empty());
        assert!(forwarded(&[]).is_empty());
    }

    // Backslashes in front of a quote are not doubled, so a quoted argument
    // ending in a backslash swallows its closing quote and runs into the next
    // argument.
    #[test]
    fn trailing_backslash_in_quoted_argument_is_misparsed() {
        let command_line = build(&w(r"C:\install\nortools.exe"), [w(r"C:\my dir\"), w("next")]);
        assert_eq!(command_line, w(r#"C:\install\nortools.exe "C:\my dir\" next"#));
        assert_eq!(split(&command_line)[1..], [r#"C:\my dir" next"#]);
    }

    #[test]
    fn backslash_before_embedded_quote_is_misparsed() {
        assert_eq!(round_trip(&[r#"a\"b c"#]), [r"a\b", "c"]);
    }

    #[test]
    fn unquoted_trailing_backslash_survives() {
        assert_eq!(round_trip(&[r"C:\tools\", "next"]), [r"C:\tools\", "next"]);
    }

    #[test]
    fn lone_surrogates_pass_through_unchanged() {
        let unquoted = U16String::from_vec(vec![u16::from(b'a'), 0xD800, u16::from(b'b')]);
        assert_eq!(quote(&unquoted), unquoted);

        let spaced = U16String::from_vec(vec![0xD800, SPACE, 0xDC00]);
        assert_eq!(
            quote(&spaced).into_vec(),
            [QUOTE, 0xD800, SPACE, 0xDC00, QUOTE]
        );

        let command_line = build(&w("nortools.exe"), [unquoted, spaced]);
        let mut expected = w("nortools.exe a").into_vec();
        expected.extend([0xD800, u16::from(b'b'), SPACE, QUOTE, 0xD800, SPACE, 0xDC00, QUOTE]);
        assert_eq!(command_line.into_vec(), expected);
    }

    #[cfg(windows)]
    #[test]
    fn split_agrees_with_command_line_to_argv() {
        use widestring::U16CString;

        use crate::windows_api::WindowsApi;

        let quoted = |args: &[&str]| {
            build(&w(r"C:\install\nortools.exe"), args.iter().map(|arg| w(arg)))
        };

        let command_lines = [
            w(r#"launcher.exe a "b c" d"#),
            w(r#""C:\Program Files\NorTools\nortools.exe" dns"#),
            quoted(&["", "plain", "with space", "with\ttab", "say \"hi\"", "\"", "\"\""]),
            quoted(&[r"C:\Program Files\NorTools\config.json", "æøå med mellomrom"]),
            quoted(&["  leading and trailing  ", r"C:\tools\", "next"]),
            quoted(&[r"C:\my dir\", "next"]),
            quoted(&[r#"a\"b c"#]),
        ];

        for command_line in command_lines {
            let terminated = U16CString::from_ustr(&command_line).unwrap();
            let native = WindowsApi::split_command_line(&terminated)
                .unwrap()
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>();

            assert_eq!(split(&command_line), native, "{}", command_line.to_string_lossy());
        }
    }
}
