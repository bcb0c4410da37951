//! The supported-language set and its static pattern tables.
//!
//! Pattern data drives both language detection and the per-language rule
//! checks. It is pure data: keyword substrings, syntax regexes, and file
//! extensions per language, compiled once at first use and immutable
//! afterwards.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Languages the pipeline understands.
///
/// Registration order matters: it is the tie-break order for detection and
/// the first entry is the default when no signal is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Typescript,
    Java,
    Cpp,
    Csharp,
    Go,
    Rust,
    Php,
    Ruby,
    Swift,
    Kotlin,
    Sql,
    Html,
    Css,
}

/// All supported languages in registration order.
pub const ALL_LANGUAGES: &[Language] = &[
    Language::Python,
    Language::Javascript,
    Language::Typescript,
    Language::Java,
    Language::Cpp,
    Language::Csharp,
    Language::Go,
    Language::Rust,
    Language::Php,
    Language::Ruby,
    Language::Swift,
    Language::Kotlin,
    Language::Sql,
    Language::Html,
    Language::Css,
];

/// The language assumed when detection finds no signal at all.
pub const DEFAULT_LANGUAGE: Language = Language::Python;

/// Display names for supported language tags.
static DISPLAY_NAMES: phf::Map<&'static str, &'static str> = phf::phf_map! {
    "python" => "Python",
    "javascript" => "JavaScript",
    "typescript" => "TypeScript",
    "java" => "Java",
    "cpp" => "C++",
    "csharp" => "C#",
    "go" => "Go",
    "rust" => "Rust",
    "php" => "PHP",
    "ruby" => "Ruby",
    "swift" => "Swift",
    "kotlin" => "Kotlin",
    "sql" => "SQL",
    "html" => "HTML",
    "css" => "CSS",
};

impl Language {
    /// The lowercase tag used on the wire and in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::Csharp => "csharp",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Php => "php",
            Language::Ruby => "ruby",
            Language::Swift => "swift",
            Language::Kotlin => "kotlin",
            Language::Sql => "sql",
            Language::Html => "html",
            Language::Css => "css",
        }
    }

    /// Parse a tag, case-insensitively. Returns `None` for unsupported tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim().to_lowercase();
        ALL_LANGUAGES.iter().copied().find(|l| l.as_str() == tag)
    }

    /// Determine the language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        profiles()
            .iter()
            .find(|p| p.extensions.contains(&ext.as_str()))
            .map(|p| p.language)
    }

    /// Human-readable display name.
    pub fn display_name(&self) -> &'static str {
        // Every supported language has an entry in the table.
        DISPLAY_NAMES.get(self.as_str()).copied().unwrap_or("Unknown")
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display name for any tag, falling back to title case for unknown ones.
pub fn display_name_for_tag(tag: &str) -> String {
    if let Some(name) = DISPLAY_NAMES.get(tag.to_lowercase().as_str()) {
        return (*name).to_string();
    }
    title_case(tag)
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Detection signals for one language.
pub struct LanguageProfile {
    pub language: Language,
    /// Substrings scored case-insensitively, 2 points each.
    pub keywords: &'static [&'static str],
    /// Regexes matched in multiline mode, 1 point each.
    pub syntax: Vec<Regex>,
    /// File extensions, without the leading dot.
    pub extensions: &'static [&'static str],
}

fn profile(
    language: Language,
    keywords: &'static [&'static str],
    syntax: &[&str],
    extensions: &'static [&'static str],
) -> LanguageProfile {
    let syntax = syntax
        .iter()
        .map(|p| {
            Regex::new(&format!("(?m){}", p)).expect("invalid built-in syntax pattern")
        })
        .collect();
    LanguageProfile {
        language,
        keywords,
        syntax,
        extensions,
    }
}

static PROFILES: Lazy<Vec<LanguageProfile>> = Lazy::new(|| {
    vec![
        profile(
            Language::Python,
            &[
                "def ", "import ", "from ", "class ", "if __name__", "print(", "elif ",
                "lambda ", "yield ", "async ", "await ",
            ],
            &[r":\s*$", r"^\s*#", r#"""""#, r"'''"],
            &["py", "pyw"],
        ),
        profile(
            Language::Javascript,
            &[
                "function ", "const ", "let ", "var ", "console.log", "=>", "async ",
                "await ", "export ", "import ",
            ],
            &[r"\{", r"\}", r";$", r"//"],
            &["js", "jsx"],
        ),
        profile(
            Language::Typescript,
            &[
                "interface ", "type ", "enum ", "namespace ", "const ", "let ",
                ": string", ": number", ": boolean",
            ],
            &[r":\s*\w+\s*[=;]", r"<.*>"],
            &["ts", "tsx"],
        ),
        profile(
            Language::Java,
            &[
                "public class", "private ", "protected ", "void ", "static ",
                "extends ", "implements ", "package ", "import java",
            ],
            &[r"\{", r"\}", r";$", r"//"],
            &["java"],
        ),
        profile(
            Language::Cpp,
            &[
                "#include", "using namespace", "std::", "cout", "cin", "int main",
                "class ", "template",
            ],
            &[r"\{", r"\}", r";$", r"//"],
            &["cpp", "cc", "cxx", "hpp", "h"],
        ),
        profile(
            Language::Csharp,
            &[
                "using System", "namespace ", "public class", "private ",
                "protected ", "void ", "static ", "async Task",
            ],
            &[r"\{", r"\}", r";$", r"//"],
            &["cs"],
        ),
        profile(
            Language::Go,
            &[
                "package ", "import ", "func ", "type ", "struct ", "interface ",
                "go ", "defer ", "chan ",
            ],
            &[r"\{", r"\}", r":=", r"//"],
            &["go"],
        ),
        profile(
            Language::Rust,
            &[
                "fn ", "let ", "mut ", "impl ", "trait ", "struct ", "enum ", "use ",
                "pub ", "match ",
            ],
            &[r"\{", r"\}", r";$", r"//"],
            &["rs"],
        ),
        profile(
            Language::Php,
            &[
                "<?php", "function ", "class ", "public ", "private ", "protected ",
                "namespace ", "use ", "$",
            ],
            &[r"\$\w+", r";$", r"//"],
            &["php"],
        ),
        profile(
            Language::Ruby,
            &[
                "def ", "class ", "module ", "end", "require ", "puts ",
                "attr_accessor", "do ", "yield ",
            ],
            &[r"^\s*#", r"end$"],
            &["rb"],
        ),
        profile(
            Language::Swift,
            &[
                "func ", "var ", "let ", "class ", "struct ", "enum ", "protocol ",
                "import ", "extension ",
            ],
            &[r"\{", r"\}", r"//"],
            &["swift"],
        ),
        profile(
            Language::Kotlin,
            &[
                "fun ", "val ", "var ", "class ", "object ", "interface ",
                "package ", "import ", "when ",
            ],
            &[r"\{", r"\}", r"//"],
            &["kt", "kts"],
        ),
        profile(
            Language::Sql,
            &[
                "SELECT ", "FROM ", "WHERE ", "INSERT ", "UPDATE ", "DELETE ",
                "CREATE TABLE", "ALTER TABLE", "JOIN ",
            ],
            &[r";$", r"--"],
            &["sql"],
        ),
        profile(
            Language::Html,
            &[
                "<html", "<head", "<body", "<div", "<span", "<script", "<style",
                "<!DOCTYPE",
            ],
            &[r"<\w+", r"</\w+>", r"<!--"],
            &["html", "htm"],
        ),
        profile(
            Language::Css,
            &["{", "}", ":", ";", "@media", "@import", "px", "rem", "em"],
            &[r"\{", r"\}", r":\s*\w+", r";$"],
            &["css", "scss", "sass"],
        ),
    ]
});

/// All language profiles in registration order.
pub fn profiles() -> &'static [LanguageProfile] {
    &PROFILES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_cover_all_languages() {
        assert_eq!(profiles().len(), ALL_LANGUAGES.len());
        for (profile, language) in profiles().iter().zip(ALL_LANGUAGES) {
            assert_eq!(profile.language, *language);
        }
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(Language::from_tag("python"), Some(Language::Python));
        assert_eq!(Language::from_tag("Python"), Some(Language::Python));
        assert_eq!(Language::from_tag("  CPP "), Some(Language::Cpp));
        assert_eq!(Language::from_tag("cobol"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("py"), Some(Language::Python));
        assert_eq!(Language::from_extension("tsx"), Some(Language::Typescript));
        assert_eq!(Language::from_extension("h"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("zig"), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Language::Cpp.display_name(), "C++");
        assert_eq!(Language::Csharp.display_name(), "C#");
        assert_eq!(display_name_for_tag("javascript"), "JavaScript");
        assert_eq!(display_name_for_tag("brainfuck"), "Brainfuck");
    }
}
