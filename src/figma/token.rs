//! Access token lookup.
//!
//! The first non-empty value wins: explicit argument, environment variable,
//! then a `KEY=value` line in the project's dotenv file.

use std::{fs, path::Path};

/// Resolve the Figma access token.
///
/// `env_value` is the already-read environment variable, so callers (and
/// tests) control the process environment.
pub fn resolve_token(
    explicit: Option<&str>,
    env_value: Option<String>,
    env_file: &Path,
    key: &str,
) -> Option<String> {
    explicit
        .map(str::to_owned)
        .filter(|token| !token.is_empty())
        .or_else(|| env_value.filter(|token| !token.is_empty()))
        .or_else(|| load_from_env_file(env_file, key))
}

/// Read `key` from a dotenv-style file.
///
/// The first line starting with `KEY=` decides; its value is trimmed and
/// stripped of surrounding quotes. A missing or unreadable file yields `None`.
pub fn load_from_env_file(path: &Path, key: &str) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let prefix = format!("{key}=");

    let line = content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(&prefix))?;

    let value = line[prefix.len()..]
        .trim()
        .trim_matches(|c| c == '\'' || c == '"');
    (!value.is_empty()).then(|| value.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "FIGMA_ACCESS_TOKEN";

    fn env_file(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_explicit_wins() {
        let file = env_file("FIGMA_ACCESS_TOKEN=from-file\n");
        let token = resolve_token(Some("arg"), Some("env".into()), file.path(), KEY);
        assert_eq!(token.as_deref(), Some("arg"));
    }

    #[test]
    fn test_env_before_file() {
        let file = env_file("FIGMA_ACCESS_TOKEN=from-file\n");
        let token = resolve_token(None, Some("env".into()), file.path(), KEY);
        assert_eq!(token.as_deref(), Some("env"));
    }

    #[test]
    fn test_empty_values_fall_through() {
        let file = env_file("FIGMA_ACCESS_TOKEN=from-file\n");
        let token = resolve_token(Some(""), Some(String::new()), file.path(), KEY);
        assert_eq!(token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_env_file_strips_quotes_and_spaces() {
        let file = env_file("# figma\nOTHER=1\n  FIGMA_ACCESS_TOKEN = x\nFIGMA_ACCESS_TOKEN= \"figd_abc\" \n");
        // "FIGMA_ACCESS_TOKEN = x" does not start with "FIGMA_ACCESS_TOKEN="
        assert_eq!(
            load_from_env_file(file.path(), KEY).as_deref(),
            Some("figd_abc")
        );

        let file = env_file("FIGMA_ACCESS_TOKEN='single'\n");
        assert_eq!(load_from_env_file(file.path(), KEY).as_deref(), Some("single"));
    }

    #[test]
    fn test_env_file_first_match_decides() {
        let file = env_file("FIGMA_ACCESS_TOKEN=\"\"\nFIGMA_ACCESS_TOKEN=second\n");
        assert_eq!(load_from_env_file(file.path(), KEY), None);
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let token = resolve_token(None, None, &dir.path().join(".env"), KEY);
        assert_eq!(token, None);
    }
}
