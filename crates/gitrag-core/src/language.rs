//! Canonical languages used as partition keys, and the alias matching that maps a
//! lexer guess onto them.

use std::fmt;

/// Languages the indexer knows how to chunk. Declaration order is match priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Cpp,
    Go,
    Java,
    Kotlin,
    Js,
    Ts,
    Php,
    Proto,
    Python,
    Rst,
    Ruby,
    Rust,
    Scala,
    Swift,
    Markdown,
    Latex,
    Html,
    Sol,
    CSharp,
    Cobol,
    C,
    Lua,
    Perl,
    Haskell,
    Elixir,
    PowerShell,
}

impl Language {
    pub const ALL: [Language; 26] = [
        Language::Cpp,
        Language::Go,
        Language::Java,
        Language::Kotlin,
        Language::Js,
        Language::Ts,
        Language::Php,
        Language::Proto,
        Language::Python,
        Language::Rst,
        Language::Ruby,
        Language::Rust,
        Language::Scala,
        Language::Swift,
        Language::Markdown,
        Language::Latex,
        Language::Html,
        Language::Sol,
        Language::CSharp,
        Language::Cobol,
        Language::C,
        Language::Lua,
        Language::Perl,
        Language::Haskell,
        Language::Elixir,
        Language::PowerShell,
    ];

    /// Uppercase tag used in metadata and as the partition key.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Cpp => "CPP",
            Language::Go => "GO",
            Language::Java => "JAVA",
            Language::Kotlin => "KOTLIN",
            Language::Js => "JS",
            Language::Ts => "TS",
            Language::Php => "PHP",
            Language::Proto => "PROTO",
            Language::Python => "PYTHON",
            Language::Rst => "RST",
            Language::Ruby => "RUBY",
            Language::Rust => "RUST",
            Language::Scala => "SCALA",
            Language::Swift => "SWIFT",
            Language::Markdown => "MARKDOWN",
            Language::Latex => "LATEX",
            Language::Html => "HTML",
            Language::Sol => "SOL",
            Language::CSharp => "CSHARP",
            Language::Cobol => "COBOL",
            Language::C => "C",
            Language::Lua => "LUA",
            Language::Perl => "PERL",
            Language::Haskell => "HASKELL",
            Language::Elixir => "ELIXIR",
            Language::PowerShell => "POWERSHELL",
        }
    }

    /// Lexer aliases (lowercase) recognised as this language.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Language::Cpp => &["cpp", "c++"],
            Language::Go => &["go", "golang"],
            Language::Java => &["java"],
            Language::Kotlin => &["kotlin"],
            Language::Js => &["js", "javascript"],
            Language::Ts => &["ts", "typescript"],
            Language::Php => &["php"],
            Language::Proto => &["proto", "protobuf"],
            Language::Python => &["python", "py"],
            Language::Rst => &["rst", "restructuredtext"],
            Language::Ruby => &["ruby", "rb"],
            Language::Rust => &["rust", "rs"],
            Language::Scala => &["scala"],
            Language::Swift => &["swift"],
            Language::Markdown => &["markdown", "md"],
            Language::Latex => &["latex", "tex"],
            Language::Html => &["html"],
            Language::Sol => &["sol", "solidity"],
            Language::CSharp => &["csharp", "c#", "cs"],
            Language::Cobol => &["cobol"],
            Language::C => &["c"],
            Language::Lua => &["lua"],
            Language::Perl => &["perl", "pl"],
            Language::Haskell => &["haskell", "hs"],
            Language::Elixir => &["elixir", "ex"],
            Language::PowerShell => &["powershell", "ps1"],
        }
    }

    /// First language (in [`Language::ALL`] order) sharing an alias with `lexer_aliases`.
    /// Comparison is case-insensitive.
    pub fn from_aliases<S: AsRef<str>>(lexer_aliases: &[S]) -> Option<Language> {
        Language::ALL.into_iter().find(|lang| {
            lang.aliases().iter().any(|known| {
                lexer_aliases
                    .iter()
                    .any(|alias| alias.as_ref().eq_ignore_ascii_case(known))
            })
        })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Detected language of a file: a canonical language or one of two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LanguageTag {
    Known(Language),
    /// A lexer was found but it maps to no canonical language.
    Unsupported,
    /// No lexer could be found for the file.
    Unknown,
}

impl LanguageTag {
    pub fn as_str(self) -> &'static str {
        match self {
            LanguageTag::Known(lang) => lang.as_str(),
            LanguageTag::Unsupported => "UNSUPPORTED",
            LanguageTag::Unknown => "UNKNOWN",
        }
    }

    pub fn is_sentinel(self) -> bool {
        !matches!(self, LanguageTag::Known(_))
    }

    pub fn language(self) -> Option<Language> {
        match self {
            LanguageTag::Known(lang) => Some(lang),
            _ => None,
        }
    }
}

impl From<Language> for LanguageTag {
    fn from(lang: Language) -> Self {
        LanguageTag::Known(lang)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
