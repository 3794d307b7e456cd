//! Topic-keyed fan-out of game events, one topic per game id.
//!
//! Topics are tokio broadcast channels: publishing never blocks on slow
//! subscribers. A subscriber that falls more than `TOPIC_CAPACITY` events
//! behind loses the oldest events, which its relay loop skips over.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::broadcast;

use crate::ws::messages::GameEvent;

const TOPIC_CAPACITY: usize = 64;

#[derive(Clone, Default)]
pub struct EventBus {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<GameEvent>>>>,
}

impl EventBus {
    /// Subscribe to a game's topic, creating it on first use.
    pub async fn subscribe(&self, game_id: &str) -> broadcast::Receiver<GameEvent> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(game_id.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to every subscriber of a game. Returns how many
    /// subscribers were attached at publish time.
    pub async fn publish(&self, game_id: &str, event: GameEvent) -> usize {
        let sender = {
            let topics = self.topics.lock().await;
            topics.get(game_id).cloned()
        };
        match sender {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop a game's topic. Subscribers drain buffered events and then
    /// observe a closed channel.
    pub async fn retire(&self, game_id: &str) {
        let mut topics = self.topics.lock().await;
        topics.remove(game_id);
    }

    /// Remove a topic nobody listens to anymore (subscriber cleanup).
    pub async fn prune(&self, game_id: &str) {
        let mut topics = self.topics.lock().await;
        if let Some(sender) = topics.get(game_id) {
            if sender.receiver_count() == 0 {
                topics.remove(game_id);
            }
        }
    }
}
