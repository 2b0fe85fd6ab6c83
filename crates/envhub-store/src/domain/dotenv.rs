//! `.env` text format.
//!
//! Blank lines and `#` comments are skipped, each remaining line is split on
//! its first `=`, and key and value are trimmed. Lines without `=` are
//! ignored.

use crate::domain::bundle::{canonical_variable_name, Variables};

/// Parse `.env` text. Keys are kept exactly as written (after trimming).
pub fn parse_dotenv(text: &str) -> Variables {
    let mut variables = Variables::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                variables.insert(key.to_string(), value.trim().to_string());
            }
        }
    }
    variables
}

/// Parse `.env` text and canonicalize every key. Keys that canonicalize to
/// nothing are dropped.
pub fn parse_dotenv_canonical(text: &str) -> Variables {
    parse_dotenv(text)
        .into_iter()
        .filter_map(|(key, value)| {
            let key = canonical_variable_name(&key);
            (!key.is_empty()).then_some((key, value))
        })
        .collect()
}

/// Render variables as `KEY=value` lines, in name order.
pub fn render_dotenv(variables: &Variables) -> String {
    variables
        .iter()
        .map(|(key, value)| format!("{key}={value}\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# database
DATABASE_URL = postgres://u:p@db/app?sslmode=require

API_KEY=abc=def
  # indented comment
not a variable
=orphan
EMPTY=
";

    #[test]
    fn test_parse() {
        let vars = parse_dotenv(SAMPLE);
        assert_eq!(vars.len(), 3);
        assert_eq!(vars["DATABASE_URL"], "postgres://u:p@db/app?sslmode=require");
        assert_eq!(vars["API_KEY"], "abc=def");
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn test_parse_canonical() {
        let vars = parse_dotenv_canonical("db.host=localhost\n--=x\nport=5432\n");
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["DBHOST"], "localhost");
        assert_eq!(vars["PORT"], "5432");
    }

    #[test]
    fn test_render_sorted() {
        let vars = Variables::from([
            ("B".to_string(), "2".to_string()),
            ("A".to_string(), "1".to_string()),
        ]);
        assert_eq!(render_dotenv(&vars), "A=1\nB=2\n");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let vars = parse_dotenv("A=1\nA=2\n");
        assert_eq!(vars["A"], "2");
    }
}
