//! Core data types for cells, attributes, goal grids, and errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Label of a grid cell that holds nothing.
pub const EMPTY_LABEL: &str = "SPACE";
/// Label of a plain point cell.
pub const POINT_LABEL: &str = "POLYANET";
/// Second label segment that marks a direction marker.
pub const DIRECTION_SUFFIX: &str = "COMETH";

/// A grid location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub column: usize,
}

impl Position {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// The closed set of cell categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellCategory {
    Empty,
    Point,
    ColorMarker,
    DirectionMarker,
}

impl CellCategory {
    /// API endpoint that creates and deletes cells of this category.
    ///
    /// `None` for [`CellCategory::Empty`], which never produces a request.
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            CellCategory::Empty => None,
            CellCategory::Point => Some("points"),
            CellCategory::ColorMarker => Some("colorMarkers"),
            CellCategory::DirectionMarker => Some("directionMarkers"),
        }
    }

    /// Human-readable name used in log lines.
    pub fn display_name(self) -> &'static str {
        match self {
            CellCategory::Empty => "Empty cell",
            CellCategory::Point => "Point",
            CellCategory::ColorMarker => "Color marker",
            CellCategory::DirectionMarker => "Direction marker",
        }
    }
}

/// Color attribute of a color marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Blue,
    Red,
    Purple,
    White,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Blue, Color::Red, Color::Purple, Color::White];

    /// Wire value sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Purple => "purple",
            Color::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Color {
    type Err = LabelError;

    /// Parses the upper-case label prefix, e.g. `RED`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BLUE" => Ok(Color::Blue),
            "RED" => Ok(Color::Red),
            "PURPLE" => Ok(Color::Purple),
            "WHITE" => Ok(Color::White),
            other => Err(LabelError::UnknownColor(other.to_string())),
        }
    }
}

/// Direction attribute of a direction marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Right,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Right,
        Direction::Left,
    ];

    /// Wire value sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Right => "right",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UP" => Ok(Direction::Up),
            "DOWN" => Ok(Direction::Down),
            "RIGHT" => Ok(Direction::Right),
            "LEFT" => Ok(Direction::Left),
            other => Err(LabelError::UnknownDirection(other.to_string())),
        }
    }
}

/// A decoded goal-grid cell: category plus its attribute, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Point,
    ColorMarker(Color),
    DirectionMarker(Direction),
}

impl Cell {
    pub fn category(self) -> CellCategory {
        match self {
            Cell::Empty => CellCategory::Empty,
            Cell::Point => CellCategory::Point,
            Cell::ColorMarker(_) => CellCategory::ColorMarker,
            Cell::DirectionMarker(_) => CellCategory::DirectionMarker,
        }
    }

    /// Decode a goal-grid label such as `SPACE`, `POLYANET`, `RED_SOLOON`
    /// or `UP_COMETH`.
    ///
    /// Any two-part label whose second segment is not `COMETH` is read as a
    /// color marker. Only the first two `_`-separated segments are inspected.
    pub fn parse_label(label: &str) -> Result<Self, LabelError> {
        match label {
            EMPTY_LABEL => return Ok(Cell::Empty),
            POINT_LABEL => return Ok(Cell::Point),
            _ => {}
        }

        let mut segments = label.split('_');
        let attribute = segments.next().unwrap_or_default();
        let Some(kind) = segments.next() else {
            return Err(LabelError::Unrecognized(label.to_string()));
        };

        if kind == DIRECTION_SUFFIX {
            attribute.parse().map(Cell::DirectionMarker)
        } else {
            attribute.parse().map(Cell::ColorMarker)
        }
    }
}

impl FromStr for Cell {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cell::parse_label(s)
    }
}

/// Goal layout fetched from the API, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalGrid {
    #[serde(rename = "goal")]
    pub rows: Vec<Vec<String>>,
}

impl GoalGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Iterate raw labels in row-major, left-to-right order.
    pub fn labels(&self) -> impl Iterator<Item = (Position, &str)> {
        self.rows.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(move |(j, label)| (Position::new(i, j), label.as_str()))
        })
    }

    /// Lazily decode every label in row-major order.
    ///
    /// Decoding does not stop on the first bad label; the consumer decides
    /// whether to keep going.
    pub fn plan(&self) -> impl Iterator<Item = (Position, Result<Cell, LabelError>)> + '_ {
        self.labels()
            .map(|(position, label)| (position, Cell::parse_label(label)))
    }
}

/// A goal label that does not decode to a known cell.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    #[error("Invalid color marker color: {0}")]
    UnknownColor(String),

    #[error("Invalid direction marker direction: {0}")]
    UnknownDirection(String),

    #[error("Unrecognized cell label: {0}")]
    Unrecognized(String),
}

/// Errors from setting up the client.
#[derive(thiserror::Error, Debug)]
pub enum MegaverseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Convenience result type.
pub type MegaverseResult<T> = Result<T, MegaverseError>;
