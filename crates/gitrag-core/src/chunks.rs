//! Splits documents into chunks for indexing.
//! Separators depend on the language: top-level definitions first, then blank lines,
//! lines, words, and finally single characters.

use crate::language::{Language, LanguageTag};
use crate::partition::{Collection, FileMetadata};

/// Default maximum characters per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// A slice of one document, with the id and metadata of the document it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub document_id: String,
    /// Index of this chunk within the document (0, 1, 2, …).
    pub index: usize,
    pub text: String,
    pub metadata: FileMetadata,
}

/// Recursive character splitter with no overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    separators: &'static [&'static str],
    chunk_size: usize,
}

impl TextSplitter {
    pub fn for_language(language: LanguageTag, chunk_size: usize) -> Self {
        Self {
            separators: separators_for(language),
            chunk_size,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split `text` into trimmed, non-empty chunks of at most `chunk_size` chars where
    /// the separators allow it.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if self.chunk_size == 0 {
            let t = text.trim();
            return if t.is_empty() { Vec::new() } else { vec![t.to_string()] };
        }
        self.split_with(text, self.separators)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        // Pick the first separator present in the text; "" always matches.
        let (separator, rest) = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .map(|i| (separators[i], &separators[i + 1..]))
            .unwrap_or(("", &[][..]));

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending));
                pending.clear();
            }
            if rest.is_empty() {
                let t = piece.trim();
                if !t.is_empty() {
                    chunks.push(t.to_string());
                }
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending));
        }
        chunks
    }

    /// Greedily join small pieces up to `chunk_size`.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = String::new();
        let mut total = 0;
        for piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !current.is_empty() {
                push_trimmed(&mut out, &current);
                current.clear();
                total = 0;
            }
            current.push_str(piece);
            total += len;
        }
        push_trimmed(&mut out, &current);
        out
    }
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let t = s.trim();
    if !t.is_empty() {
        out.push(t.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split on `separator`, attaching each separator to the start of the piece after it.
/// An empty separator splits into single chars.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

/// Chunk every document in a collection, in collection order.
pub fn chunk_collection(collection: &Collection<'_>, chunk_size: usize) -> Vec<Chunk> {
    let splitter = TextSplitter::for_language(collection.language(), chunk_size);
    collection
        .records()
        .flat_map(|record| {
            let metadata = record.metadata();
            splitter
                .split_text(&record.document)
                .into_iter()
                .enumerate()
                .map(move |(index, text)| Chunk {
                    document_id: record.relative_path.clone(),
                    index,
                    text,
                    metadata: metadata.clone(),
                })
        })
        .collect()
}

const GENERIC: &[&str] = &["\n\n", "\n", " ", ""];

fn separators_for(language: LanguageTag) -> &'static [&'static str] {
    let Some(lang) = language.language() else {
        return GENERIC;
    };
    match lang {
        Language::Python => &["\nclass ", "\ndef ", "\n\tdef ", "\n\n", "\n", " ", ""],
        Language::Rust => &[
            "\nfn ", "\nconst ", "\nlet ", "\nif ", "\nwhile ", "\nfor ", "\nloop ", "\nmatch ",
            "\n\n", "\n", " ", "",
        ],
        Language::Go => &[
            "\nfunc ", "\nvar ", "\nconst ", "\ntype ", "\nif ", "\nfor ", "\nswitch ", "\ncase ",
            "\n\n", "\n", " ", "",
        ],
        Language::Java | Language::Kotlin | Language::Scala | Language::CSharp => &[
            "\nclass ", "\ninterface ", "\nfun ", "\nobject ", "\ndef ", "\npublic ", "\nprotected ",
            "\nprivate ", "\nstatic ", "\nif ", "\nfor ", "\nwhile ", "\nswitch ", "\ncase ",
            "\n\n", "\n", " ", "",
        ],
        Language::Js => &[
            "\nfunction ", "\nconst ", "\nlet ", "\nvar ", "\nclass ", "\nif ", "\nfor ",
            "\nwhile ", "\nswitch ", "\ncase ", "\ndefault ", "\n\n", "\n", " ", "",
        ],
        Language::Ts => &[
            "\nenum ", "\ninterface ", "\nnamespace ", "\ntype ", "\nclass ", "\nfunction ",
            "\nconst ", "\nlet ", "\nvar ", "\nif ", "\nfor ", "\nwhile ", "\nswitch ",
            "\ncase ", "\ndefault ", "\n\n", "\n", " ", "",
        ],
        Language::Cpp | Language::C => &[
            "\nclass ", "\nvoid ", "\nint ", "\nfloat ", "\ndouble ", "\nif ", "\nfor ",
            "\nwhile ", "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
        ],
        Language::Php => &[
            "\nfunction ", "\nclass ", "\nif ", "\nforeach ", "\nwhile ", "\ndo ", "\nswitch ",
            "\ncase ", "\n\n", "\n", " ", "",
        ],
        Language::Ruby => &[
            "\ndef ", "\nclass ", "\nif ", "\nunless ", "\nwhile ", "\nfor ", "\ndo ",
            "\nbegin ", "\nrescue ", "\n\n", "\n", " ", "",
        ],
        Language::Swift => &[
            "\nfunc ", "\nclass ", "\nstruct ", "\nenum ", "\nif ", "\nfor ", "\nwhile ",
            "\ndo ", "\nswitch ", "\ncase ", "\n\n", "\n", " ", "",
        ],
        Language::Proto => &[
            "\nmessage ", "\nservice ", "\nenum ", "\noption ", "\nimport ", "\nsyntax ",
            "\n\n", "\n", " ", "",
        ],
        Language::Markdown => &[
            "\n# ", "\n## ", "\n### ", "\n#### ", "\n##### ", "\n###### ", "```\n", "\n\n",
            "\n", " ", "",
        ],
        Language::Rst => &["\n.. ", "\n\n", "\n", " ", ""],
        Language::Latex => &[
            "\n\\chapter{", "\n\\section{", "\n\\subsection{", "\n\\subsubsection{",
            "\n\\begin{enumerate}", "\n\\begin{itemize}", "\n\\begin{description}",
            "\n\\begin{verbatim}", "\n\n", "\n", " ", "",
        ],
        Language::Html => &[
            "<body", "<div", "<p", "<br", "<li", "<h1", "<h2", "<h3", "<h4", "<h5", "<h6",
            "<span", "<table", "<tr", "<td", "<th", "<ul", "<ol", "<header", "<footer", "<nav",
            "<head", "<style", "<script", "<meta", "<title", "",
        ],
        Language::Sol => &[
            "\npragma ", "\nusing ", "\ncontract ", "\ninterface ", "\nlibrary ",
            "\nconstructor ", "\ntype ", "\nfunction ", "\nevent ", "\nmodifier ", "\nerror ",
            "\nstruct ", "\nenum ", "\n\n", "\n", " ", "",
        ],
        Language::Lua => &[
            "\nlocal ", "\nfunction ", "\nif ", "\nfor ", "\nwhile ", "\nrepeat ", "\n\n", "\n",
            " ", "",
        ],
        Language::Haskell => &[
            "\nmain :: ", "\nmain = ", "\nlet ", "\nin ", "\ndo ", "\nwhere ", "\n:: ", "\n= ",
            "\ndata ", "\nnewtype ", "\ntype ", "\nmodule ", "\nimport ", "\nclass ",
            "\ninstance ", "\n\n", "\n", " ", "",
        ],
        Language::Elixir => &[
            "\ndef ", "\ndefp ", "\ndefmodule ", "\ndefprotocol ", "\ndefmacro ", "\nif ",
            "\nunless ", "\nwhile ", "\ncase ", "\ncond ", "\nwith ", "\nfor ", "\ndo ",
            "\n\n", "\n", " ", "",
        ],
        Language::PowerShell => &[
            "\nfunction ", "\nparam ", "\nif ", "\nforeach ", "\nfor ", "\nwhile ", "\nswitch ",
            "\nclass ", "\ntry ", "\ncatch ", "\nfinally ", "\n\n", "\n", " ", "",
        ],
        Language::Perl => &[
            "\nsub ", "\npackage ", "\nuse ", "\nif ", "\nforeach ", "\nwhile ", "\n\n", "\n",
            " ", "",
        ],
        Language::Cobol => &[
            "\nIDENTIFICATION DIVISION.", "\nENVIRONMENT DIVISION.", "\nDATA DIVISION.",
            "\nPROCEDURE DIVISION.", "\nWORKING-STORAGE SECTION.", "\n\n", "\n", " ", "",
        ],
    }
}
