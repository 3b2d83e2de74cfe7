//! Placeholder translation from `?` to an engine's own style.
//!
//! Queries are written once with positional `?` placeholders. PostgreSQL wants
//! numbered placeholders instead, so each `?` is rewritten left to right as
//! `$1`, `$2`, ... with a counter that starts over on every call. The target
//! style comes from [`Dialect::placeholder`].
//!
//! [`to_numbered_placeholders`] does not parse SQL: a `?` inside a string
//! literal is rewritten as well. [`to_numbered_placeholders_skipping_literals`]
//! skips quoted strings, quoted identifiers and comments.

use crate::dialect::{Dialect, PostgresDialect};

/// How `?` placeholders are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderMode {
    /// Every `?` character is a placeholder.
    #[default]
    Naive,
    /// `?` inside quotes or comments is left alone.
    SkipLiterals,
}

impl PlaceholderMode {
    /// Translates `sql` to numbered `$n` placeholders using this mode.
    #[must_use]
    pub fn translate(self, sql: &str) -> String {
        self.rewrite(sql, &PostgresDialect)
    }

    /// Rewrites each `?` as `dialect`'s placeholder for its position.
    #[must_use]
    pub fn rewrite(self, sql: &str, dialect: &dyn Dialect) -> String {
        if !sql.contains('?') {
            return sql.to_string();
        }
        let mut scanner = Scanner::new(sql, self == Self::SkipLiterals, Some(dialect));
        scanner.run();
        scanner.out
    }

    /// Counts the placeholders this mode would rewrite.
    #[must_use]
    pub fn count(self, sql: &str) -> usize {
        if !sql.contains('?') {
            return 0;
        }
        let mut scanner = Scanner::new(sql, self == Self::SkipLiterals, None);
        scanner.run();
        scanner.count
    }
}

/// Rewrites every `?` as `$1`, `$2`, ... in order.
///
/// # Example
///
/// ```
/// use storehub_db::to_numbered_placeholders;
///
/// assert_eq!(
///     to_numbered_placeholders("SELECT * FROM t WHERE a = ? AND b = ?"),
///     "SELECT * FROM t WHERE a = $1 AND b = $2"
/// );
/// ```
#[must_use]
pub fn to_numbered_placeholders(sql: &str) -> String {
    PlaceholderMode::Naive.translate(sql)
}

/// Like [`to_numbered_placeholders`], but leaves `?` untouched inside
/// `'...'`, `"..."`, `-- ...` and `/* ... */`.
#[must_use]
pub fn to_numbered_placeholders_skipping_literals(sql: &str) -> String {
    PlaceholderMode::SkipLiterals.translate(sql)
}

/// Walks the SQL once, copying it to `out` with placeholders rewritten.
///
/// Without a target dialect only `count` is maintained.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    skip_literals: bool,
    target: Option<&'a dyn Dialect>,
    out: String,
    count: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str, skip_literals: bool, target: Option<&'a dyn Dialect>) -> Self {
        let capacity = if target.is_some() { input.len() + 8 } else { 0 };
        Self {
            input,
            pos: 0,
            skip_literals,
            target,
            out: String::with_capacity(capacity),
            count: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Copies the next character to the output.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if self.target.is_some() {
            self.out.push(c);
        }
        Some(c)
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                '?' => {
                    self.pos += 1;
                    self.count += 1;
                    if let Some(dialect) = self.target {
                        self.out.push_str(&dialect.placeholder(self.count));
                    }
                }
                '\'' | '"' if self.skip_literals => self.copy_quoted(c),
                '-' if self.skip_literals && self.peek_next() == Some('-') => {
                    self.copy_line_comment();
                }
                '/' if self.skip_literals && self.peek_next() == Some('*') => {
                    self.copy_block_comment();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Copies a quoted region; a doubled quote is an escaped quote.
    fn copy_quoted(&mut self, quote: char) {
        self.advance();
        loop {
            match self.advance() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            }
        }
    }

    fn copy_line_comment(&mut self) {
        while let Some(c) = self.advance() {
            if c == '\n' {
                break;
            }
        }
    }

    fn copy_block_comment(&mut self) {
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    break;
                }
                None => break,
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_placeholders_is_identity() {
        let sql = "SELECT id, name FROM stores ORDER BY name ASC";
        assert_eq!(to_numbered_placeholders(sql), sql);
        assert_eq!(to_numbered_placeholders(""), "");
    }

    #[test]
    fn test_left_to_right_numbering() {
        assert_eq!(
            to_numbered_placeholders("INSERT INTO t (name, price) VALUES (?, ?)"),
            "INSERT INTO t (name, price) VALUES ($1, $2)"
        );
    }

    #[test]
    fn test_counter_resets_per_call() {
        assert_eq!(to_numbered_placeholders("a = ?"), "a = $1");
        assert_eq!(to_numbered_placeholders("b = ?"), "b = $1");
    }

    #[test]
    fn test_many_placeholders() {
        let sql = vec!["?"; 12].join(", ");
        let translated = to_numbered_placeholders(&sql);
        let expected = (1..=12).map(|i| format!("${i}")).collect::<Vec<_>>().join(", ");
        assert_eq!(translated, expected);
    }

    #[test]
    fn test_fixed_point_only_without_placeholders() {
        let once = to_numbered_placeholders("x = ?");
        assert_ne!(once, "x = ?");
        // `$k` tokens are never rewritten again.
        assert_eq!(to_numbered_placeholders(&once), once);
        assert_eq!(to_numbered_placeholders("x = 1"), "x = 1");
    }

    #[test]
    fn test_naive_rewrites_question_mark_in_literal() {
        assert_eq!(
            to_numbered_placeholders("SELECT 'why?' WHERE id = ?"),
            "SELECT 'why$1' WHERE id = $2"
        );
    }

    #[test]
    fn test_skipping_literals() {
        assert_eq!(
            to_numbered_placeholders_skipping_literals("SELECT 'why?' WHERE id = ?"),
            "SELECT 'why?' WHERE id = $1"
        );
        assert_eq!(
            to_numbered_placeholders_skipping_literals(
                "SELECT 'it''s ?', \"c?\" FROM t WHERE a = ?"
            ),
            "SELECT 'it''s ?', \"c?\" FROM t WHERE a = $1"
        );
    }

    #[test]
    fn test_skipping_comments() {
        assert_eq!(
            to_numbered_placeholders_skipping_literals(
                "SELECT ? -- really?\nFROM t /* ok? */ WHERE b = ?"
            ),
            "SELECT $1 -- really?\nFROM t /* ok? */ WHERE b = $2"
        );
    }

    #[test]
    fn test_skipping_literals_unterminated_quote() {
        assert_eq!(
            to_numbered_placeholders_skipping_literals("SELECT ? WHERE a = 'open?"),
            "SELECT $1 WHERE a = 'open?"
        );
    }

    #[test]
    fn test_mode_dispatch() {
        assert_eq!(PlaceholderMode::Naive.translate("'?' ?"), "'$1' $2");
        assert_eq!(PlaceholderMode::SkipLiterals.translate("'?' ?"), "'?' $1");
    }

    #[test]
    fn test_count() {
        assert_eq!(PlaceholderMode::Naive.count("VALUES (?, ?, ?)"), 3);
        assert_eq!(PlaceholderMode::Naive.count("SELECT 1"), 0);
        assert_eq!(PlaceholderMode::Naive.count("SELECT 'why?' WHERE id = ?"), 2);
        assert_eq!(PlaceholderMode::SkipLiterals.count("SELECT 'why?' WHERE id = ?"), 1);
    }

    #[test]
    fn test_rewrite_uses_dialect_placeholder() {
        use crate::dialect::MySqlDialect;

        let sql = "UPDATE t SET a = ?, b = ? WHERE id = ?";
        assert_eq!(PlaceholderMode::Naive.rewrite(sql, &MySqlDialect), sql);
        assert_eq!(
            PlaceholderMode::Naive.rewrite(sql, &PostgresDialect),
            "UPDATE t SET a = $1, b = $2 WHERE id = $3"
        );
    }
}
