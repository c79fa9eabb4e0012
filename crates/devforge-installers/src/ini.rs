//! Structured php.ini editing
//!
//! The interpreter configuration is parsed into a line model, mutated,
//! and serialized back, so directive updates and extension toggles are
//! position-stable and never duplicate lines the way pattern-replacement
//! rewrites can.

use std::fmt;

/// One parsed php.ini line
#[derive(Debug, Clone, PartialEq)]
enum Line {
    /// `key = value`
    Directive { key: String, value: String },
    /// `extension=name`
    ExtensionEnabled(String),
    /// `;extension=name`
    ExtensionDisabled(String),
    /// Sections, comments, blanks - preserved verbatim
    Verbatim(String),
}

/// In-memory php.ini document
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    lines: Vec<Line>,
}

impl IniFile {
    /// Parse an ini document into the line model
    pub fn parse(content: &str) -> Self {
        let lines = content.lines().map(parse_line).collect();
        Self { lines }
    }

    /// Set a directive, replacing the first occurrence and dropping any
    /// later duplicates. Appends when the key is absent.
    pub fn set_directive(&mut self, key: &str, value: &str) {
        let mut found = false;
        self.lines.retain_mut(|line| {
            if let Line::Directive { key: k, value: v } = line {
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
            self.lines.push(Line::Directive {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
    }

    /// Enable an extension: uncomments a disabled line when present,
    /// appends when unknown, and never duplicates an enabled one.
    pub fn enable_extension(&mut self, name: &str) {
        if self
            .lines
            .iter()
            .any(|l| matches!(l, Line::ExtensionEnabled(n) if n == name))
        {
            return;
        }

        for line in &mut self.lines {
            if matches!(line, Line::ExtensionDisabled(n) if n == name) {
                *line = Line::ExtensionEnabled(name.to_string());
                return;
            }
        }

        self.lines.push(Line::ExtensionEnabled(name.to_string()));
    }

    /// Current value of a directive, if present
    pub fn directive(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|l| match l {
            Line::Directive { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Whether an extension is enabled
    pub fn extension_enabled(&self, name: &str) -> bool {
        self.lines
            .iter()
            .any(|l| matches!(l, Line::ExtensionEnabled(n) if n == name))
    }
}

impl fmt::Display for IniFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                Line::Directive { key, value } => writeln!(f, "{} = {}", key, value)?,
                Line::ExtensionEnabled(name) => writeln!(f, "extension={}", name)?,
                Line::ExtensionDisabled(name) => writeln!(f, ";extension={}", name)?,
                Line::Verbatim(raw) => writeln!(f, "{}", raw)?,
            }
        }
        Ok(())
    }
}

fn parse_line(raw: &str) -> Line {
    let trimmed = raw.trim();

    if let Some(name) = trimmed.strip_prefix("extension=") {
        return Line::ExtensionEnabled(name.trim().to_string());
    }

    if let Some(rest) = trimmed.strip_prefix(';') {
        if let Some(name) = rest.trim_start().strip_prefix("extension=") {
            return Line::ExtensionDisabled(name.trim().to_string());
        }
        return Line::Verbatim(raw.to_string());
    }

    if trimmed.starts_with('[') || trimmed.is_empty() {
        return Line::Verbatim(raw.to_string());
    }

    if let Some((key, value)) = trimmed.split_once('=') {
        return Line::Directive {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        };
    }

    Line::Verbatim(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[PHP]
; Resource Limits
memory_limit = 128M
max_execution_time = 30

;extension=curl
;extension=mbstring
extension=openssl
";

    #[test]
    fn test_set_directive_replaces_in_place() {
        let mut ini = IniFile::parse(SAMPLE);
        ini.set_directive("memory_limit", "256M");
        let out = ini.to_string();
        assert!(out.contains("memory_limit = 256M"));
        assert!(!out.contains("128M"));
        // Position preserved: still before max_execution_time
        let mem = out.find("memory_limit").unwrap();
        let met = out.find("max_execution_time").unwrap();
        assert!(mem < met);
    }

    #[test]
    fn test_set_directive_appends_when_missing() {
        let mut ini = IniFile::parse(SAMPLE);
        ini.set_directive("post_max_size", "64M");
        assert_eq!(ini.directive("post_max_size"), Some("64M"));
    }

    #[test]
    fn test_set_directive_collapses_duplicates() {
        let mut ini = IniFile::parse("memory_limit = 64M\nmemory_limit = 96M\n");
        ini.set_directive("memory_limit", "256M");
        let out = ini.to_string();
        assert_eq!(out.matches("memory_limit").count(), 1);
        assert!(out.contains("memory_limit = 256M"));
    }

    #[test]
    fn test_enable_extension_uncomments() {
        let mut ini = IniFile::parse(SAMPLE);
        ini.enable_extension("curl");
        let out = ini.to_string();
        assert!(out.contains("extension=curl"));
        assert!(!out.contains(";extension=curl"));
    }

    #[test]
    fn test_enable_extension_appends_unknown() {
        let mut ini = IniFile::parse(SAMPLE);
        ini.enable_extension("redis");
        assert!(ini.extension_enabled("redis"));
        assert!(ini.to_string().contains("extension=redis"));
    }

    #[test]
    fn test_enable_extension_twice_does_not_duplicate() {
        let mut ini = IniFile::parse(SAMPLE);
        ini.enable_extension("curl");
        ini.enable_extension("curl");
        ini.enable_extension("openssl");
        let out = ini.to_string();
        assert_eq!(out.matches("extension=curl").count(), 1);
        assert_eq!(out.matches("extension=openssl").count(), 1);
    }

    #[test]
    fn test_roundtrip_preserves_comments_and_sections() {
        let ini = IniFile::parse(SAMPLE);
        let out = ini.to_string();
        assert!(out.contains("[PHP]"));
        assert!(out.contains("; Resource Limits"));
    }

    #[test]
    fn test_commented_extension_with_space() {
        let ini = IniFile::parse("; extension=gd\n");
        assert!(!ini.extension_enabled("gd"));
        let mut ini = ini;
        ini.enable_extension("gd");
        assert!(ini.extension_enabled("gd"));
    }
}
