//! Game-record loading for `loadsgf`.
//!
//! Only what replay needs is read: the board size and the `B`/`W` moves of the
//! main line (the first variation at every branch). Other properties are
//! parsed and ignored.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::player::{Color, Coord, Move, MAX_BOARD_SIZE};

const DEFAULT_BOARD_SIZE: usize = 19;

/// Error type for game-record loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SgfError {
    /// The file could not be read
    Io(String),
    /// Malformed SGF text at a byte offset
    Syntax { offset: usize, message: &'static str },
    /// A move value that isn't a point on the board
    BadCoordinate(String),
    /// `SZ` missing a usable size
    BadBoardSize(String),
}

impl fmt::Display for SgfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SgfError::Io(e) => write!(f, "cannot read file: {e}"),
            SgfError::Syntax { offset, message } => {
                write!(f, "SGF syntax error at byte {offset}: {message}")
            }
            SgfError::BadCoordinate(value) => write!(f, "bad SGF coordinate '{value}'"),
            SgfError::BadBoardSize(value) => write!(f, "bad SGF board size '{value}'"),
        }
    }
}

impl std::error::Error for SgfError {}

/// Source of game records for replay.
pub trait GameLoader {
    /// Read the record at `path` and return its main-line moves in order.
    fn load(&self, path: &Path) -> Result<Vec<Move>, SgfError>;
}

/// Loads SGF files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct SgfLoader;

impl GameLoader for SgfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Move>, SgfError> {
        let contents = fs::read_to_string(path).map_err(|e| SgfError::Io(e.to_string()))?;
        parse_main_line(&contents)
    }
}

type Property = (String, Vec<String>);
type Node = Vec<Property>;

struct GameTree {
    nodes: Vec<Node>,
    variations: Vec<GameTree>,
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Parser {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, message: &'static str) -> SgfError {
        SgfError::Syntax {
            offset: self.pos,
            message,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8, message: &'static str) -> Result<(), SgfError> {
        if self.peek() != Some(byte) {
            return Err(self.error(message));
        }
        self.pos += 1;
        Ok(())
    }

    fn game_tree(&mut self) -> Result<GameTree, SgfError> {
        self.expect(b'(', "expected '('")?;
        let mut nodes = Vec::new();
        while self.peek() == Some(b';') {
            self.pos += 1;
            nodes.push(self.node()?);
        }
        if nodes.is_empty() {
            return Err(self.error("game tree has no nodes"));
        }
        let mut variations = Vec::new();
        while self.peek() == Some(b'(') {
            variations.push(self.game_tree()?);
        }
        self.expect(b')', "expected ')'")?;
        Ok(GameTree { nodes, variations })
    }

    fn node(&mut self) -> Result<Node, SgfError> {
        let mut properties = Vec::new();
        while matches!(self.peek(), Some(b) if b.is_ascii_uppercase()) {
            let start = self.pos;
            while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_uppercase() {
                self.pos += 1;
            }
            let ident = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
            let mut values = Vec::new();
            while self.peek() == Some(b'[') {
                values.push(self.value()?);
            }
            if values.is_empty() {
                return Err(self.error("property without value"));
            }
            properties.push((ident, values));
        }
        Ok(properties)
    }

    fn value(&mut self) -> Result<String, SgfError> {
        self.pos += 1;
        let mut value = Vec::new();
        while let Some(&b) = self.bytes.get(self.pos) {
            self.pos += 1;
            match b {
                b']' => return Ok(String::from_utf8_lossy(&value).into_owned()),
                b'\\' => {
                    if let Some(&escaped) = self.bytes.get(self.pos) {
                        value.push(escaped);
                        self.pos += 1;
                    }
                }
                _ => value.push(b),
            }
        }
        Err(self.error("unterminated property value"))
    }
}

/// Parse SGF text and return the moves of the first game's main line.
pub fn parse_main_line(text: &str) -> Result<Vec<Move>, SgfError> {
    let mut parser = Parser::new(text);
    let tree = parser.game_tree()?;

    let mut nodes: Vec<&Node> = Vec::new();
    let mut current = &tree;
    loop {
        nodes.extend(current.nodes.iter());
        match current.variations.first() {
            Some(next) => current = next,
            None => break,
        }
    }

    let mut board_size = DEFAULT_BOARD_SIZE;
    if let Some(values) = find_property(nodes[0], "SZ") {
        let raw = &values[0];
        board_size = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&size| (1..=MAX_BOARD_SIZE).contains(&size))
            .ok_or_else(|| SgfError::BadBoardSize(raw.clone()))?;
    }

    let mut moves = Vec::new();
    for node in nodes {
        for (ident, values) in node {
            let color = match ident.as_str() {
                "B" => Color::Black,
                "W" => Color::White,
                _ => continue,
            };
            let coord = parse_point(&values[0], board_size)?;
            moves.push(Move { color, coord });
        }
    }
    Ok(moves)
}

fn find_property<'n>(node: &'n Node, ident: &str) -> Option<&'n Vec<String>> {
    node.iter().find(|(name, _)| name == ident).map(|(_, values)| values)
}

/// SGF point: two letters, column then row, counted from the top-left.
fn parse_point(value: &str, board_size: usize) -> Result<Coord, SgfError> {
    let value = value.trim();
    if value.is_empty() || (value == "tt" && board_size <= 19) {
        return Ok(Coord::Pass);
    }
    let bad = || SgfError::BadCoordinate(value.to_string());
    let bytes = value.as_bytes();
    if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_lowercase) {
        return Err(bad());
    }
    let col = usize::from(bytes[0] - b'a');
    let row = usize::from(bytes[1] - b'a');
    if col >= board_size || row >= board_size {
        return Err(bad());
    }
    Ok(Coord::from_index(row * board_size + col, board_size))
}
