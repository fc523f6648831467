pub mod engine;
pub mod settings;
pub mod stats_manager;
pub mod store;

pub use engine::GameEngine;
pub use stats_manager::StatsManager;

#[cfg(test)]
pub mod tests {
    use std::collections::HashMap;
    use std::sync::Once;

    use test_context::TestContext;

    use crate::model::{Face, Round};

    static INIT_LOGGER: Once = Once::new();

    pub struct UsingLogger {
        _value: String,
    }

    impl TestContext for UsingLogger {
        fn setup() -> UsingLogger {
            INIT_LOGGER.call_once(|| {
                env_logger::init();
            });

            UsingLogger {
                _value: "Hello, World!".to_string(),
            }
        }

        fn teardown(self) {
            // Perform any teardown you wish.
        }
    }

    /// All pair indices of a deck, ordered by first appearance.
    pub fn matching_pairs(round: &Round) -> Vec<(usize, usize)> {
        let mut first_seen: HashMap<Face, usize> = HashMap::new();
        let mut pairs = Vec::new();
        for tile in round.tiles() {
            match first_seen.get(&tile.face) {
                Some(&first) => pairs.push((first, tile.index)),
                None => {
                    first_seen.insert(tile.face, tile.index);
                }
            }
        }
        pairs.sort();
        pairs
    }

    /// Two face-down tiles guaranteed not to match.
    pub fn mismatched_indices(round: &Round) -> (usize, usize) {
        let tiles = round.tiles();
        let first = tiles.iter().find(|t| t.is_face_down()).unwrap();
        let second = tiles
            .iter()
            .find(|t| t.is_face_down() && t.face != first.face)
            .unwrap();
        (first.index, second.index)
    }
}
