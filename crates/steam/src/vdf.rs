//! Text VDF (KeyValues) parser for appmanifest_*.acf and libraryfolders.vdf.

use std::fs;
use std::path::Path;

use crate::SteamError;

/// A VDF value: either a string or an ordered list of key/value pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum VdfValue {
    String(String),
    Object(Vec<(String, VdfValue)>),
}

impl VdfValue {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VdfValue::String(s) => Some(s),
            VdfValue::Object(_) => None,
        }
    }

    /// Returns the pairs, if this is an object.
    pub fn as_object(&self) -> Option<&[(String, VdfValue)]> {
        match self {
            VdfValue::String(_) => None,
            VdfValue::Object(pairs) => Some(pairs),
        }
    }

    /// Looks up a child by key, ignoring ASCII case. First match wins.
    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Looks up a string child by key, ignoring ASCII case.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }
}

/// Reads and parses a text VDF file.
pub fn load_text_vdf(path: &Path) -> Result<VdfValue, SteamError> {
    let content = fs::read_to_string(path)
        .map_err(|e| SteamError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_text_vdf(&content)
}

/// Parses text VDF content into a root object.
pub fn parse_text_vdf(content: &str) -> Result<VdfValue, SteamError> {
    let mut parser = Parser {
        chars: content.chars().collect(),
        pos: 0,
    };
    let pairs = parser.parse_pairs(false)?;
    Ok(VdfValue::Object(pairs))
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Parses pairs until end of input (root) or a closing brace (nested).
    fn parse_pairs(&mut self, nested: bool) -> Result<Vec<(String, VdfValue)>, SteamError> {
        let mut pairs = Vec::new();

        loop {
            self.skip_whitespace_and_comments();

            match self.peek() {
                None if nested => {
                    return Err(SteamError::Vdf("unexpected end of data in object".into()));
                }
                None => return Ok(pairs),
                Some('}') if nested => {
                    self.pos += 1;
                    return Ok(pairs);
                }
                Some('}') => {
                    return Err(SteamError::Vdf(format!(
                        "unexpected '}}' at pos {}",
                        self.pos
                    )));
                }
                Some(_) => {}
            }

            let key = self.read_token()?;
            self.skip_whitespace_and_comments();

            match self.peek() {
                Some('{') => {
                    self.pos += 1;
                    let value = self.parse_pairs(true)?;
                    pairs.push((key, VdfValue::Object(value)));
                }
                Some('}') | None => {
                    return Err(SteamError::Vdf(format!("missing value for key '{key}'")));
                }
                Some(_) => {
                    let value = self.read_token()?;
                    pairs.push((key, VdfValue::String(value)));
                    self.skip_conditional();
                }
            }
        }
    }

    /// Reads a quoted or bare token.
    fn read_token(&mut self) -> Result<String, SteamError> {
        if self.peek() == Some('"') {
            return self.read_quoted();
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                break;
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Err(SteamError::Vdf(format!("expected token at pos {start}")));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn read_quoted(&mut self) -> Result<String, SteamError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();

        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '"' => return Ok(out),
                '\\' => {
                    let escaped = self.peek().ok_or_else(|| {
                        SteamError::Vdf(format!("unterminated string starting at pos {start}"))
                    })?;
                    self.pos += 1;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                other => out.push(other),
            }
        }

        Err(SteamError::Vdf(format!(
            "unterminated string starting at pos {start}"
        )))
    }

    /// Skips a trailing platform conditional such as `[$WIN32]`.
    fn skip_conditional(&mut self) {
        let save = self.pos;
        while self.peek().is_some_and(|c| c == ' ' || c == '\t') {
            self.pos += 1;
        }
        if self.peek() == Some('[') {
            while let Some(c) = self.peek() {
                self.pos += 1;
                if c == ']' || c == '\n' {
                    return;
                }
            }
        } else {
            self.pos = save;
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.pos += 1;
            }

            if self.peek() == Some('/') && self.chars.get(self.pos + 1) == Some(&'/') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
"AppState"
{
    "appid"         "489830"
    "Universe"      "1"
    "name"          "Skyrim Special Edition"
    "StateFlags"    "4"
    "installdir"    "Skyrim Special Edition"
    "buildid"       "12345"
    "UserConfig"
    {
        "language"  "english"
        "BetaKey"   "beta"
    }
}
"#;

    #[test]
    fn parse_manifest_values() {
        let root = parse_text_vdf(MANIFEST).unwrap();
        let app = root.get("AppState").unwrap();
        assert_eq!(app.get_str("appid"), Some("489830"));
        assert_eq!(app.get_str("name"), Some("Skyrim Special Edition"));
        assert_eq!(
            app.get("UserConfig").unwrap().get_str("betakey"),
            Some("beta")
        );
    }

    #[test]
    fn lookup_ignores_case() {
        let root = parse_text_vdf(MANIFEST).unwrap();
        assert!(root.get("appstate").is_some());
        assert_eq!(
            root.get("APPSTATE").unwrap().get_str("InstallDir"),
            Some("Skyrim Special Edition")
        );
    }

    #[test]
    fn parse_preserves_order() {
        let root = parse_text_vdf(r#""root" { "b" "2" "a" "1" }"#).unwrap();
        let keys: Vec<&str> = root
            .get("root")
            .unwrap()
            .as_object()
            .unwrap()
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn parse_comments_and_escapes() {
        let content = r#"
// leading comment
"root"
{
    "path"   "C:\\Games\\Steam"   // trailing comment
    "quote"  "say \"hi\""
}
"#;
        let root = parse_text_vdf(content).unwrap();
        let obj = root.get("root").unwrap();
        assert_eq!(obj.get_str("path"), Some("C:\\Games\\Steam"));
        assert_eq!(obj.get_str("quote"), Some("say \"hi\""));
    }

    #[test]
    fn parse_bare_tokens_and_conditionals() {
        let content = "root\n{\n  key value [$WIN32]\n  other \"x\"\n}\n";
        let root = parse_text_vdf(content).unwrap();
        let obj = root.get("root").unwrap();
        assert_eq!(obj.get_str("key"), Some("value"));
        assert_eq!(obj.get_str("other"), Some("x"));
    }

    #[test]
    fn parse_empty_content() {
        let root = parse_text_vdf("").unwrap();
        assert_eq!(root, VdfValue::Object(vec![]));
    }

    #[test]
    fn reject_unterminated_object() {
        assert!(parse_text_vdf(r#""root" { "a" "1" "#).is_err());
    }

    #[test]
    fn reject_unterminated_string() {
        assert!(parse_text_vdf(r#""root" "value"#).is_err());
    }

    #[test]
    fn reject_stray_close_brace() {
        assert!(parse_text_vdf(r#""a" "1" }"#).is_err());
    }

    #[test]
    fn reject_key_without_value() {
        assert!(parse_text_vdf(r#""root" { "lonely" }"#).is_err());
    }
}
