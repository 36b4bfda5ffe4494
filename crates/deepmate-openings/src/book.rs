use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::seq::IndexedRandom;
use rand::Rng;
use thiserror::Error;

use crate::opening::Opening;

/// Errors raised while loading an opening book from disk or text.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("failed to read opening book: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse opening book JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed opening record on line {line}")]
    Malformed { line: usize },
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<String, Node>,
    /// Name of the first line that reached this node, kept for logging.
    line: Option<String>,
}

/// A trie of opening lines keyed by SAN move tokens.
///
/// Each path from the root spells out the moves of one or more known
/// openings, White and Black plies interleaved. Looking up a game's move
/// history walks the trie and yields every move that theory has an
/// answer for from that point.
#[derive(Debug, Default)]
pub struct OpeningBook {
    root: Node,
    openings: Vec<Opening>,
}

impl OpeningBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small compiled-in book covering the common mainlines, used when
    /// no book file is configured.
    pub fn builtin() -> Self {
        let mut book = Self::new();
        let lines: &[(&str, &str, &[&str])] = &[
            ("C50", "Italian Game", &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]),
            ("C60", "Ruy Lopez", &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6"]),
            ("B20", "Sicilian Defense", &["e4", "c5", "Nf3", "d6", "d4", "cxd4", "Nxd4", "Nf6"]),
            ("C00", "French Defense", &["e4", "e6", "d4", "d5", "Nc3", "Nf6"]),
            ("B10", "Caro-Kann Defense", &["e4", "c6", "d4", "d5", "Nc3", "dxe4", "Nxe4"]),
            ("D30", "Queen's Gambit Declined", &["d4", "d5", "c4", "e6", "Nc3", "Nf6", "Bg5"]),
            ("D20", "Queen's Gambit Accepted", &["d4", "d5", "c4", "dxc4", "Nf3", "Nf6", "e3"]),
            ("E60", "King's Indian Defense", &["d4", "Nf6", "c4", "g6", "Nc3", "Bg7", "e4", "d6"]),
            ("A10", "English Opening", &["c4", "e5", "Nc3", "Nf6", "Nf3", "Nc6"]),
            ("D02", "London System", &["d4", "d5", "Nf3", "Nf6", "Bf4", "e6", "e3"]),
        ];
        for (eco, name, moves) in lines {
            book.add(Opening::new(*eco, *name, moves.iter().copied()));
        }
        book
    }

    /// Parses a book from CSV text with one `eco,name,"1.e4 e5 2.Nf3 ..."`
    /// record per line. Quoted fields may contain commas; move numbers and
    /// game results in the move text are discarded.
    pub fn from_csv_str(text: &str) -> Result<Self, BookError> {
        let mut book = Self::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let fields = split_record(line);
            let [eco, name, movetext] = fields
                .try_into()
                .map_err(|_| BookError::Malformed { line: index + 1 })?;
            let moves = tokenize_moves(&movetext);
            if moves.is_empty() {
                return Err(BookError::Malformed { line: index + 1 });
            }
            book.add(Opening::new(eco, name, moves));
        }
        Ok(book)
    }

    /// Parses a book from a JSON array of opening records.
    pub fn from_json_str(text: &str) -> Result<Self, BookError> {
        let openings: Vec<Opening> = serde_json::from_str(text)?;
        let mut book = Self::new();
        for opening in openings {
            book.add(opening);
        }
        Ok(book)
    }

    /// Loads a book file, accepting either the JSON or the CSV layout.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BookError> {
        let text = fs::read_to_string(path)?;
        if text.trim_start().starts_with('[') {
            Self::from_json_str(&text)
        } else {
            Self::from_csv_str(&text)
        }
    }

    /// Inserts one opening line into the trie.
    pub fn add(&mut self, opening: Opening) {
        let mut node = &mut self.root;
        for san in &opening.moves {
            node = node.children.entry(san.clone()).or_default();
            node.line.get_or_insert_with(|| opening.name.clone());
        }
        self.openings.push(opening);
    }

    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    /// Every move that known theory continues with after `history`.
    /// Returns an empty list when the history has left the book.
    pub fn continuations<S: AsRef<str>>(&self, history: &[S]) -> Vec<&str> {
        let mut node = &self.root;
        for san in history {
            match node.children.get(san.as_ref()) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }
        node.children.keys().map(String::as_str).collect()
    }

    /// Picks a book continuation for `history` uniformly at random.
    pub fn suggest<S: AsRef<str>, R: Rng + ?Sized>(
        &self,
        history: &[S],
        rng: &mut R,
    ) -> Option<String> {
        let choices = self.continuations(history);
        let san = choices.choose(rng)?;
        if let Some(name) = self.line_name(history, san) {
            tracing::debug!("book continuation {san} ({name})");
        }
        Some((*san).to_string())
    }

    fn line_name<S: AsRef<str>>(&self, history: &[S], san: &str) -> Option<&str> {
        let mut node = &self.root;
        for played in history {
            node = node.children.get(played.as_ref())?;
        }
        node.children.get(san)?.line.as_deref()
    }
}

/// Splits one CSV record into fields, honoring double-quoted fields with
/// `""` escapes.
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Extracts SAN tokens from PGN-style move text, dropping move numbers
/// and game results.
fn tokenize_moves(movetext: &str) -> Vec<String> {
    movetext
        .split_whitespace()
        .filter_map(strip_move_number)
        .filter(|san| !matches!(*san, "1-0" | "0-1" | "1/2-1/2" | "*"))
        .map(str::to_string)
        .collect()
}

/// Strips a leading `12.` or `12...` prefix from a token, returning
/// `None` for tokens that are only a move number.
fn strip_move_number(token: &str) -> Option<&str> {
    let digits = token.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || !token[digits..].starts_with('.') {
        return Some(token);
    }
    let san = token[digits..].trim_start_matches('.');
    if san.is_empty() {
        None
    } else {
        Some(san)
    }
}
