//! Bounded in-memory store of generated games.
//!
//! Holds at most `capacity` games; inserting into a full store evicts the
//! oldest insertion so memory stays flat in a long-running server.

use std::collections::{HashMap, VecDeque};

use prompt_arcade::core::pipeline::Generation;
use prompt_arcade::schema::category::CategoryId;
use prompt_arcade::schema::modifier::ModifierTag;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

pub type GameId = Uuid;

/// A generated game as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: GameId,
    pub category: CategoryId,
    pub confidence: f32,
    pub title: String,
    pub document: String,
    pub prompt: String,
    /// Replaying the prompt with this seed reproduces the document (minus
    /// any embellished intro).
    pub seed: u64,
    pub modifiers: Vec<ModifierTag>,
    pub embellished: bool,
}

impl StoredGame {
    pub fn from_generation(prompt: &str, generation: Generation, embellished: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: generation.game.category,
            confidence: generation.classification.confidence,
            title: generation.game.title,
            document: generation.game.document,
            prompt: prompt.to_string(),
            seed: generation.seed,
            modifiers: generation.classification.modifiers,
            embellished,
        }
    }
}

pub struct GameStore {
    inner: RwLock<StoreInner>,
    capacity: usize,
}

#[derive(Default)]
struct StoreInner {
    games: HashMap<GameId, StoredGame>,
    // insertion order, oldest first
    order: VecDeque<GameId>,
}

impl GameStore {
    /// A store holding at most `capacity` games (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(StoreInner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Store a game, evicting the oldest entries if the store is full.
    /// Returns the evicted ids.
    pub async fn insert(&self, game: StoredGame) -> Vec<GameId> {
        let mut inner = self.inner.write().await;
        let id = game.id;

        if inner.games.insert(id, game).is_some() {
            inner.order.retain(|existing| *existing != id);
        }
        inner.order.push_back(id);

        let mut evicted = Vec::new();
        while inner.order.len() > self.capacity {
            if let Some(old) = inner.order.pop_front() {
                inner.games.remove(&old);
                evicted.push(old);
            }
        }
        if !evicted.is_empty() {
            tracing::debug!(count = evicted.len(), "evicted games from store");
        }
        evicted
    }

    pub async fn get(&self, id: &GameId) -> Option<StoredGame> {
        self.inner.read().await.games.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.games.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.games.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prompt_arcade::core::pipeline::GameForge;

    fn make_game(forge: &GameForge, prompt: &str) -> StoredGame {
        let generation = forge.generate(prompt, Some(1)).unwrap();
        StoredGame::from_generation(prompt, generation, false)
    }

    #[tokio::test]
    async fn insert_and_get() {
        let forge = GameForge::builder().build().unwrap();
        let store = GameStore::new(4);
        assert!(store.is_empty().await);

        let game = make_game(&forge, "darts");
        let id = game.id;
        assert!(store.insert(game.clone()).await.is_empty());

        assert_eq!(store.get(&id).await, Some(game));
        assert_eq!(store.len().await, 1);
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let forge = GameForge::builder().build().unwrap();
        let store = GameStore::new(2);

        let first = make_game(&forge, "darts");
        let second = make_game(&forge, "basketball");
        let third = make_game(&forge, "racing");
        let first_id = first.id;

        store.insert(first).await;
        store.insert(second.clone()).await;
        let evicted = store.insert(third.clone()).await;

        assert_eq!(evicted, vec![first_id]);
        assert_eq!(store.len().await, 2);
        assert!(store.get(&first_id).await.is_none());
        assert!(store.get(&second.id).await.is_some());
        assert!(store.get(&third.id).await.is_some());
    }

    #[tokio::test]
    async fn reinsert_same_id_does_not_grow() {
        let forge = GameForge::builder().build().unwrap();
        let store = GameStore::new(2);
        let game = make_game(&forge, "space");

        store.insert(game.clone()).await;
        store.insert(game.clone()).await;
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        assert_eq!(GameStore::new(0).capacity(), 1);
    }

    #[test]
    fn stored_game_keeps_generation_fields() {
        let forge = GameForge::builder().build().unwrap();
        let generation = forge
            .generate("a spooky racing game", Some(12))
            .unwrap();
        let game = StoredGame::from_generation("a spooky racing game", generation.clone(), false);
        assert_eq!(game.category, generation.game.category);
        assert_eq!(game.seed, 12);
        assert_eq!(game.document, generation.game.document);
        assert!(game.modifiers.iter().any(|m| m.tag == "spooky"));
    }
}
