//! Guesses a file's language from its name and a content sample.
//!
//! A [`LexerGuesser`] returns the aliases of whatever lexer it thinks fits; [`classify`]
//! maps those onto [`Language`] or a sentinel tag.

use std::path::Path;

use syntect::parsing::{SyntaxReference, SyntaxSet};
use thiserror::Error;

use crate::language::{Language, LanguageTag};

/// Lowercased alias names of a guessed lexer.
pub type LexerAliases = Vec<String>;

/// Something that can pick a lexer for a file.
pub trait LexerGuesser {
    /// `Ok(None)` means no lexer fits. `Err` is reserved for real failures.
    fn guess(&self, filename: &str, sample: &str) -> Result<Option<LexerAliases>, GuessError>;
}

#[derive(Debug, Error)]
#[error("lexer guess failed: {0}")]
pub struct GuessError(pub String);

/// Classify a file. A missing lexer is [`LanguageTag::Unknown`], not an error.
pub fn classify<G: LexerGuesser + ?Sized>(
    guesser: &G,
    filename: &str,
    sample: &str,
) -> Result<LanguageTag, GuessError> {
    let Some(aliases) = guesser.guess(filename, sample)? else {
        return Ok(LanguageTag::Unknown);
    };
    Ok(match Language::from_aliases(&aliases) {
        Some(lang) => LanguageTag::Known(lang),
        None => LanguageTag::Unsupported,
    })
}

/// Lexer guesser backed by syntect's bundled syntax definitions.
///
/// Lookup order: the extension table in [`lexer_for_extension`], then well-known whole
/// file names (`Makefile`, `Gemfile`), then syntect by extension, then the first line of
/// the sample (shebangs, `<?xml`, modelines).
pub struct SyntectGuesser {
    syntaxes: SyntaxSet,
}

impl SyntectGuesser {
    pub fn new() -> Self {
        Self::with_syntax_set(SyntaxSet::load_defaults_newlines())
    }

    pub fn with_syntax_set(syntaxes: SyntaxSet) -> Self {
        Self { syntaxes }
    }

    fn find(&self, filename: &str, sample: &str) -> Option<&SyntaxReference> {
        let by_name = WELL_KNOWN_NAMES
            .contains(&filename)
            .then(|| self.syntaxes.find_syntax_by_extension(filename))
            .flatten();
        let by_ext = || {
            lowercase_extension(filename)
                .and_then(|ext| self.syntaxes.find_syntax_by_extension(&ext))
        };
        let by_first_line = || {
            sample
                .lines()
                .next()
                .filter(|line| !line.trim().is_empty())
                .and_then(|line| self.syntaxes.find_syntax_by_first_line(line))
        };
        by_name.or_else(by_ext).or_else(by_first_line)
    }
}

impl Default for SyntectGuesser {
    fn default() -> Self {
        Self::new()
    }
}

impl LexerGuesser for SyntectGuesser {
    fn guess(&self, filename: &str, sample: &str) -> Result<Option<LexerAliases>, GuessError> {
        if let Some(aliases) = lowercase_extension(filename)
            .as_deref()
            .and_then(lexer_for_extension)
        {
            return Ok(Some(aliases.iter().map(|a| a.to_string()).collect()));
        }
        Ok(self.find(filename, sample).map(syntax_aliases))
    }
}

/// Names syntect lists among a syntax's extensions. Any other bare name (`c`, `rs`) is
/// left to the first-line lookup.
const WELL_KNOWN_NAMES: &[&str] = &[
    "Makefile",
    "makefile",
    "GNUmakefile",
    "Gemfile",
    "Rakefile",
    "Guardfile",
    "Vagrantfile",
    "Podfile",
];

fn lowercase_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

/// Lexer aliases for extensions the bundled syntaxes lack or give to another language
/// (`.h` is Objective-C there).
fn lexer_for_extension(ext: &str) -> Option<&'static [&'static str]> {
    let aliases: &'static [&'static str] = match ext {
        "h" => &["c", "h"],
        "ts" | "mts" | "cts" => &["typescript", "ts"],
        "tsx" => &["tsx", "typescript"],
        "jsx" => &["jsx", "javascript"],
        "mjs" | "cjs" => &["javascript", "js"],
        "kt" | "kts" => &["kotlin"],
        "swift" => &["swift"],
        "proto" => &["protobuf", "proto"],
        "sol" => &["solidity", "sol"],
        "ex" | "exs" => &["elixir", "ex", "exs"],
        "ps1" | "psm1" | "psd1" => &["powershell", "pwsh", "ps1"],
        "cbl" | "cob" | "cpy" => &["cobol"],
        "rst" | "rest" => &["restructuredtext", "rst"],
        _ => return None,
    };
    Some(aliases)
}

fn syntax_aliases(syntax: &SyntaxReference) -> LexerAliases {
    std::iter::once(syntax.name.to_lowercase())
        .chain(syntax.file_extensions.iter().map(|e| e.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Option<&'static [&'static str]>, &'static str>);

    impl LexerGuesser for Fixed {
        fn guess(&self, _: &str, _: &str) -> Result<Option<LexerAliases>, GuessError> {
            match &self.0 {
                Ok(aliases) => Ok(aliases.map(|a| a.iter().map(|s| s.to_string()).collect())),
                Err(msg) => Err(GuessError(msg.to_string())),
            }
        }
    }

    #[test]
    fn classify_maps_sentinels() {
        assert_eq!(
            classify(&Fixed(Ok(None)), "x", "").unwrap(),
            LanguageTag::Unknown
        );
        assert_eq!(
            classify(&Fixed(Ok(Some(&["yaml", "yml"]))), "x.yml", "").unwrap(),
            LanguageTag::Unsupported
        );
        assert_eq!(
            classify(&Fixed(Ok(Some(&["python", "py"]))), "x.py", "").unwrap(),
            LanguageTag::Known(Language::Python)
        );
        assert!(classify(&Fixed(Err("boom")), "x", "").is_err());
    }

    #[test]
    fn syntect_by_extension() {
        let g = SyntectGuesser::new();
        assert_eq!(
            classify(&g, "main.py", "print('hi')\n").unwrap(),
            LanguageTag::Known(Language::Python)
        );
        assert_eq!(
            classify(&g, "lib.rs", "fn main() {}\n").unwrap(),
            LanguageTag::Known(Language::Rust)
        );
        assert_eq!(
            classify(&g, "README.md", "# Title\n").unwrap(),
            LanguageTag::Known(Language::Markdown)
        );
        assert_eq!(
            classify(&g, "app.JS", "const x = 1;\n").unwrap(),
            LanguageTag::Known(Language::Js)
        );
    }

    #[test]
    fn syntect_plain_text_is_unsupported() {
        let g = SyntectGuesser::new();
        assert_eq!(
            classify(&g, "notes.txt", "just some words\n").unwrap(),
            LanguageTag::Unsupported
        );
    }

    #[test]
    fn syntect_shebang_without_extension() {
        let g = SyntectGuesser::new();
        assert_eq!(
            classify(&g, "run", "#!/usr/bin/env python\nprint(1)\n").unwrap(),
            LanguageTag::Known(Language::Python)
        );
    }

    #[test]
    fn every_language_is_reachable() {
        let g = SyntectGuesser::new();
        let files = [
            "a.cpp", "a.go", "A.java", "a.kt", "a.js", "a.ts", "a.php", "a.proto", "a.py",
            "a.rst", "a.rb", "a.rs", "a.scala", "a.swift", "a.md", "a.tex", "a.html", "a.sol",
            "a.cs", "a.cbl", "a.c", "a.lua", "a.pl", "a.hs", "a.ex", "a.ps1",
        ];
        let found: Vec<LanguageTag> = files
            .iter()
            .map(|f| classify(&g, f, "x\n").unwrap())
            .collect();
        for lang in Language::ALL {
            assert!(found.contains(&LanguageTag::Known(lang)), "{lang} not produced");
        }
    }

    #[test]
    fn extension_table_covers_syntect_gaps() {
        let g = SyntectGuesser::new();
        let cases = [
            ("util.h", Language::C),
            ("App.tsx", Language::Ts),
            ("Button.jsx", Language::Js),
            ("index.mjs", Language::Js),
            ("Build.KTS", Language::Kotlin),
            ("mix.exs", Language::Elixir),
        ];
        for (file, lang) in cases {
            assert_eq!(classify(&g, file, "x\n").unwrap(), LanguageTag::Known(lang), "{file}");
        }
    }

    #[test]
    fn bare_name_is_not_an_extension() {
        let g = SyntectGuesser::new();
        assert_eq!(classify(&g, "c", "x\n").unwrap(), LanguageTag::Unknown);
        assert_eq!(classify(&g, "rs", "x\n").unwrap(), LanguageTag::Unknown);
        assert_eq!(
            classify(&g, "Rakefile", "task :default\n").unwrap(),
            LanguageTag::Known(Language::Ruby)
        );
    }

    #[test]
    fn syntect_unrecognised_is_unknown() {
        let g = SyntectGuesser::new();
        assert_eq!(
            classify(&g, "blob.zzqx", "qq zz qq\n").unwrap(),
            LanguageTag::Unknown
        );
    }
}
