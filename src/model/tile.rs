use serde::{Deserialize, Serialize};

/// Names of the pair-image set. Every round draws its faces from this pool.
pub const FACE_NAMES: [&str; 8] = [
    "agility",
    "boat",
    "citizenship",
    "hack",
    "nerd-rage",
    "nuka-cola",
    "robotics",
    "shock",
];

/// One of the fixed face identities; exactly two tiles share a face within
/// a round.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Face(u8);

impl Face {
    pub fn pool() -> Vec<Face> {
        (0..FACE_NAMES.len() as u8).map(Face).collect()
    }

    pub fn name(&self) -> &'static str {
        FACE_NAMES[self.0 as usize]
    }
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum TileState {
    FaceDown,
    FaceUp,
    Matched,
}

#[derive(Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tile {
    pub index: usize,
    pub face: Face,
    pub state: TileState,
}

impl Tile {
    pub fn new(index: usize, face: Face) -> Self {
        Self {
            index,
            face,
            state: TileState::FaceDown,
        }
    }

    pub fn is_face_down(&self) -> bool {
        self.state == TileState::FaceDown
    }

    pub fn is_matched(&self) -> bool {
        self.state == TileState::Matched
    }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let marker = match self.state {
            TileState::FaceDown => "v",
            TileState::FaceUp => "^",
            TileState::Matched => "*",
        };
        write!(f, "{}{}{}", self.index, marker, self.face)
    }
}
