//! Splitting a seed script into individually executable statements.

#[derive(Clone, Copy)]
enum Scan {
    Code,
    Quoted(char),
    LineComment,
    BlockComment,
}

/// Splits `script` on `;` terminators. A `;` inside a quoted literal or a
/// comment does not end a statement; a doubled quote stays inside the
/// literal. Comments are dropped, statements are trimmed, and fragments with
/// no code in them are discarded. A final statement without a terminator is
/// kept.
pub fn split_statements(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut state = Scan::Code;
    let mut chars = script.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            Scan::Code => match c {
                ';' => {
                    finish(&mut statements, &mut current, has_code);
                    has_code = false;
                }
                '\'' | '"' | '`' => {
                    current.push(c);
                    has_code = true;
                    state = Scan::Quoted(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = Scan::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::BlockComment;
                }
                _ => {
                    has_code |= !c.is_whitespace();
                    current.push(c);
                }
            },
            Scan::Quoted(quote) => {
                current.push(c);
                if c == quote {
                    if chars.peek() == Some(&quote) {
                        current.push(quote);
                        chars.next();
                    } else {
                        state = Scan::Code;
                    }
                }
            }
            Scan::LineComment => {
                if c == '\n' {
                    current.push('\n');
                    state = Scan::Code;
                }
            }
            Scan::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    current.push(' ');
                    state = Scan::Code;
                }
            }
        }
    }

    finish(&mut statements, &mut current, has_code);
    statements
}

fn finish(statements: &mut Vec<String>, current: &mut String, has_code: bool) {
    if has_code {
        statements.push(current.trim().to_string());
    }
    current.clear();
}

/// `USE <database>`: selects a database on servers that have several. It has
/// no meaning for the target connection and is skipped during replay.
pub fn is_database_selection(statement: &str) -> bool {
    let mut words = statement.split_whitespace();
    matches!(words.next(), Some(word) if word.eq_ignore_ascii_case("use"))
        && words.next().is_some()
        && words.next().is_none()
}

const TRANSACTION_CONTROL: [&str; 6] = ["BEGIN", "COMMIT", "END", "ROLLBACK", "RELEASE", "SAVEPOINT"];

/// `BEGIN`, `COMMIT`, `END`, `ROLLBACK`, `RELEASE` and `SAVEPOINT`. Replay
/// owns the transaction, so these are skipped rather than run inside it.
pub fn is_transaction_control(statement: &str) -> bool {
    statement
        .split_whitespace()
        .next()
        .map_or(false, |word| {
            TRANSACTION_CONTROL
                .iter()
                .any(|keyword| word.eq_ignore_ascii_case(keyword))
        })
}

/// Single-line prefix of a statement for log lines and failure reports.
pub fn preview(statement: &str) -> String {
    const MAX_CHARS: usize = 80;

    let flat = statement.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(MAX_CHARS).collect();
        format!("{}...", cut)
    }
}
