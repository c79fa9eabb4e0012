//! Structured .env editing
//!
//! Same discipline as the ini editor: parse into a line model, mutate
//! keys, serialize. Setting a key leaves exactly one line for it no
//! matter how many the original template carried.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Pair { key: String, value: String },
    Verbatim(String),
}

/// In-memory .env document
#[derive(Debug, Clone, Default)]
pub struct EnvFile {
    lines: Vec<Line>,
}

impl EnvFile {
    pub fn parse(content: &str) -> Self {
        let lines = content
            .lines()
            .map(|raw| {
                let trimmed = raw.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return Line::Verbatim(raw.to_string());
                }
                match trimmed.split_once('=') {
                    Some((key, value)) if is_env_key(key.trim()) => Line::Pair {
                        key: key.trim().to_string(),
                        value: value.to_string(),
                    },
                    _ => Line::Verbatim(raw.to_string()),
                }
            })
            .collect();
        Self { lines }
    }

    /// Set a key, replacing the first occurrence and dropping later
    /// duplicates. Appends when the key is absent.
    pub fn set(&mut self, key: &str, value: &str) {
        let mut found = false;
        self.lines.retain_mut(|line| {
            if let Line::Pair { key: k, value: v } = line {
                if k == key {
                    if found {
                        return false;
                    }
                    found = true;
                    *v = value.to_string();
                }
            }
            true
        });

        if !found {
            self.lines.push(Line::Pair {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|l| match l {
            Line::Pair { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Number of lines assigning `key`; the editor keeps this at one
    pub fn count(&self, key: &str) -> usize {
        self.lines
            .iter()
            .filter(|l| matches!(l, Line::Pair { key: k, .. } if k == key))
            .count()
    }
}

impl fmt::Display for EnvFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Pair { key, value } => writeln!(f, "{}={}", key, value)?,
                Line::Verbatim(raw) => writeln!(f, "{}", raw)?,
            }
        }
        Ok(())
    }
}

fn is_env_key(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const LARAVEL_ENV: &str = "\
APP_NAME=Laravel
APP_ENV=local

# Database
DB_CONNECTION=sqlite
DB_HOST=127.0.0.1

CACHE_DRIVER=file
SESSION_DRIVER=file
";

    #[test]
    fn test_set_replaces_existing_key() {
        let mut env = EnvFile::parse(LARAVEL_ENV);
        env.set("CACHE_DRIVER", "redis");
        assert_eq!(env.get("CACHE_DRIVER"), Some("redis"));
        assert_eq!(env.count("CACHE_DRIVER"), 1);
    }

    #[test]
    fn test_set_appends_missing_key() {
        let mut env = EnvFile::parse(LARAVEL_ENV);
        env.set("REDIS_CLIENT", "predis");
        assert_eq!(env.get("REDIS_CLIENT"), Some("predis"));
        assert!(env.to_string().contains("REDIS_CLIENT=predis"));
    }

    #[test]
    fn test_set_collapses_template_duplicates() {
        let mut env = EnvFile::parse("DB_CONNECTION=sqlite\nDB_CONNECTION=pgsql\n");
        env.set("DB_CONNECTION", "mysql");
        let out = env.to_string();
        assert_eq!(out.matches("DB_CONNECTION=").count(), 1);
        assert!(out.contains("DB_CONNECTION=mysql"));
    }

    #[test]
    fn test_comments_and_blanks_preserved() {
        let mut env = EnvFile::parse(LARAVEL_ENV);
        env.set("DB_CONNECTION", "mysql");
        let out = env.to_string();
        assert!(out.contains("# Database"));
        assert!(out.contains("APP_NAME=Laravel"));
    }

    #[test]
    fn test_values_with_equals_survive() {
        let mut env = EnvFile::parse("APP_KEY=base64:abc=def==\n");
        assert_eq!(env.get("APP_KEY"), Some("base64:abc=def=="));
        env.set("APP_KEY", "base64:xyz==");
        assert_eq!(env.get("APP_KEY"), Some("base64:xyz=="));
    }
}
