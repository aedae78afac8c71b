//! Splitting an input line into argument tokens.

/// Splits `line` into tokens the way a POSIX shell would, minus expansion.
///
/// Tokens are separated by whitespace. Single quotes keep everything
/// literally; double quotes keep whitespace and honour `\"` and `\\`; a
/// backslash outside quotes escapes the next character. Quoted empty
/// strings (`""`) are kept as empty tokens. An unterminated quote runs to
/// the end of the line.
///
/// # Examples
///
/// ```
/// use cmdkit_core::split_command_line;
///
/// assert_eq!(
///     split_command_line(r#"hello say --name="Harry Potter" 'a b' "" c\ d"#),
///     ["hello", "say", "--name=Harry Potter", "a b", "", "c d"]
/// );
/// ```
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_token = true;
                current.extend(chars.by_ref().take_while(|&c| c != '\''));
            }
            '"' => {
                in_token = true;
                while let Some(c) = chars.next() {
                    match c {
                        '"' => break,
                        '\\' => match chars.next() {
                            Some(next @ ('"' | '\\')) => current.push(next),
                            Some(next) => {
                                current.push('\\');
                                current.push(next);
                            }
                            None => current.push('\\'),
                        },
                        c => current.push(c),
                    }
                }
            }
            '\\' => {
                in_token = true;
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    tokens
}
