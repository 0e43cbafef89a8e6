//! Player sessions
//!
//! A session owns a running balance and the recent spin history. Each one
//! sits behind its own lock so that two spins against the same session are
//! applied one after the other, while different sessions never contend.
//!
//! The store is bounded: sessions idle for longer than the configured
//! timeout are evicted, and creation fails once the live count reaches the
//! cap.

use crate::errors::SessionError;
use crate::games::settlement::SettlementEngine;
use crate::games::types::{Bet, SpinResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Mutable per-session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: String,
    pub balance: f64,
    pub last_spin: Option<u8>,
    history: VecDeque<u8>,
    history_capacity: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl SessionState {
    pub fn new(id: String, balance: f64, history_capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            id,
            balance,
            last_spin: None,
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            created_at: now,
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    /// Whether the session has seen no activity for at least `timeout`
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        (now - self.last_active)
            .to_std()
            .map(|idle| idle >= timeout)
            .unwrap_or(false)
    }

    /// Apply a settled spin: new balance, last spin, history (newest first)
    pub fn record(&mut self, result: &SpinResult) {
        self.balance = result.new_balance;
        self.last_spin = Some(result.winning_number);
        self.history.push_front(result.winning_number);
        self.history.truncate(self.history_capacity);
    }

    /// Recent winning numbers, newest first
    pub fn history(&self) -> Vec<u8> {
        self.history.iter().copied().collect()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            balance: self.balance,
            last_spin: self.last_spin,
            history: self.history(),
            created_at: self.created_at,
            last_active: self.last_active,
        }
    }
}

/// Read-only view of a session returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub balance: f64,
    pub last_spin: Option<u8>,
    pub history: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Storage for player sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session; `None` uses the configured starting balance.
    /// Fails with `LimitReached` when the store is full of live sessions.
    async fn create(&self, balance: Option<f64>) -> Result<SessionSnapshot, SessionError>;

    async fn get(&self, id: &str) -> Result<SessionSnapshot, SessionError>;

    async fn set_balance(&self, id: &str, balance: f64) -> Result<SessionSnapshot, SessionError>;

    /// Settle `bets` against the session balance and record the outcome.
    /// The session is left untouched when settlement is rejected.
    async fn spin(
        &self,
        id: &str,
        bets: &[Bet],
        engine: &SettlementEngine,
    ) -> Result<(SpinResult, SessionSnapshot), SessionError>;

    async fn remove(&self, id: &str) -> Result<(), SessionError>;

    /// Drop sessions that have been idle past the timeout; returns how many
    async fn purge_idle(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounds on how many sessions a store keeps and for how long
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub max_sessions: usize,
    pub idle_timeout: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            idle_timeout: Duration::from_secs(3600),
        }
    }
}

/// Process-local session store
pub struct InMemorySessionStore {
    sessions: DashMap<String, Arc<Mutex<SessionState>>>,
    starting_balance: f64,
    history_capacity: usize,
    limits: SessionLimits,
}

impl InMemorySessionStore {
    pub fn new(starting_balance: f64, history_capacity: usize) -> Self {
        Self::with_limits(starting_balance, history_capacity, SessionLimits::default())
    }

    pub fn with_limits(starting_balance: f64, history_capacity: usize, limits: SessionLimits) -> Self {
        Self {
            sessions: DashMap::new(),
            starting_balance,
            history_capacity,
            limits,
        }
    }

    /// Evict sessions idle as of `now`. A session whose lock is held is in
    /// use and always kept.
    pub fn purge_idle_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        let timeout = self.limits.idle_timeout;

        self.sessions.retain(|id, session| match session.try_lock() {
            Ok(state) if state.is_idle(now, timeout) => {
                debug!("Evicting idle session {}", id);
                false
            }
            _ => true,
        });

        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            info!("Evicted {} idle session(s)", evicted);
        }
        evicted
    }

    fn lookup(&self, id: &str) -> Result<Arc<Mutex<SessionState>>, SessionError> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }
}

fn check_balance(balance: f64) -> Result<f64, SessionError> {
    if !balance.is_finite() || balance < 0.0 {
        return Err(crate::errors::GameError::InvalidBalance(balance).into());
    }
    Ok(balance)
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, balance: Option<f64>) -> Result<SessionSnapshot, SessionError> {
        let balance = check_balance(balance.unwrap_or(self.starting_balance))?;

        if self.sessions.len() >= self.limits.max_sessions {
            self.purge_idle_at(Utc::now());
            if self.sessions.len() >= self.limits.max_sessions {
                warn!("Refusing new session: {} live sessions", self.sessions.len());
                return Err(SessionError::LimitReached(self.limits.max_sessions));
            }
        }

        let id = Uuid::new_v4().to_string();
        let state = SessionState::new(id.clone(), balance, self.history_capacity);
        let snapshot = state.snapshot();

        self.sessions.insert(id.clone(), Arc::new(Mutex::new(state)));
        info!("Opened session {} with balance {}", id, balance);
        Ok(snapshot)
    }

    async fn get(&self, id: &str) -> Result<SessionSnapshot, SessionError> {
        let session = self.lookup(id)?;
        let mut state = session.lock().await;
        state.touch();
        Ok(state.snapshot())
    }

    async fn set_balance(&self, id: &str, balance: f64) -> Result<SessionSnapshot, SessionError> {
        let balance = check_balance(balance)?;
        let session = self.lookup(id)?;
        let mut state = session.lock().await;
        state.balance = balance;
        state.touch();
        debug!("Session {} balance set to {}", id, balance);
        Ok(state.snapshot())
    }

    async fn spin(
        &self,
        id: &str,
        bets: &[Bet],
        engine: &SettlementEngine,
    ) -> Result<(SpinResult, SessionSnapshot), SessionError> {
        let session = self.lookup(id)?;
        // Held across settle + record so concurrent spins serialize
        let mut state = session.lock().await;
        state.touch();
        let result = engine.settle(bets, state.balance)?;
        state.record(&result);
        Ok((result, state.snapshot()))
    }

    async fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .remove(id)
            .map(|_| info!("Closed session {}", id))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    async fn purge_idle(&self) -> usize {
        self.purge_idle_at(Utc::now())
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GameError;
    use crate::games::rng::FixedSource;
    use crate::games::settlement::SettlementConfig;
    use crate::games::types::BetType;
    use crate::games::types::Color;

    fn fixed_engine(sequence: Vec<u8>) -> SettlementEngine {
        SettlementEngine::with_source(
            SettlementConfig::default(),
            Arc::new(FixedSource::new(sequence)),
        )
    }

    fn result_for(number: u8, new_balance: f64) -> SpinResult {
        SpinResult {
            winning_number: number,
            winning_color: Color::Green,
            payout: 0.0,
            new_balance,
            winning_bets: vec![],
        }
    }

    #[test]
    fn test_history_is_bounded_newest_first() {
        let mut state = SessionState::new("s".to_string(), 100.0, 20);
        for n in 0..25u8 {
            state.record(&result_for(n % 37, 100.0));
        }

        let history = state.history();
        assert_eq!(history.len(), 20);
        assert_eq!(history[0], 24);
        assert_eq!(history[19], 5);
        assert_eq!(state.last_spin, Some(24));
    }

    #[tokio::test]
    async fn test_create_uses_starting_balance() {
        let store = InMemorySessionStore::new(10_000.0, 20);
        let snapshot = store.create(None).await.unwrap();
        assert_eq!(snapshot.balance, 10_000.0);
        assert_eq!(snapshot.last_spin, None);
        assert!(snapshot.history.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_spin_updates_session() {
        let store = InMemorySessionStore::new(100.0, 20);
        let engine = fixed_engine(vec![7]);
        let id = store.create(None).await.unwrap().session_id;

        let bets = vec![Bet::new(BetType::Straight, vec![7], 10.0)];
        let (result, snapshot) = store.spin(&id, &bets, &engine).await.unwrap();

        assert_eq!(result.new_balance, 450.0);
        assert_eq!(snapshot.balance, 450.0);
        assert_eq!(snapshot.last_spin, Some(7));
        assert_eq!(snapshot.history, vec![7]);
    }

    #[tokio::test]
    async fn test_rejected_spin_leaves_session_untouched() {
        let store = InMemorySessionStore::new(100.0, 20);
        let engine = fixed_engine(vec![7]);
        let id = store.create(None).await.unwrap().session_id;

        let bets = vec![Bet::new(BetType::Straight, vec![7], 150.0)];
        let err = store.spin(&id, &bets, &engine).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Game(GameError::InsufficientBalance { .. })
        ));

        let snapshot = store.get(&id).await.unwrap();
        assert_eq!(snapshot.balance, 100.0);
        assert_eq!(snapshot.last_spin, None);
    }

    #[tokio::test]
    async fn test_concurrent_spins_serialize() {
        let store = Arc::new(InMemorySessionStore::new(1_000.0, 20));
        // Always misses the straight-up on 1
        let engine = Arc::new(fixed_engine(vec![0]));
        let id = store.create(None).await.unwrap().session_id;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            let engine = engine.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let bets = vec![Bet::new(BetType::Straight, vec![1], 10.0)];
                store.spin(&id, &bets, &engine).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let snapshot = store.get(&id).await.unwrap();
        assert_eq!(snapshot.balance, 500.0);
        assert_eq!(snapshot.history.len(), 20);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let store = InMemorySessionStore::new(100.0, 20);
        assert_eq!(
            store.get("missing").await,
            Err(SessionError::NotFound("missing".to_string()))
        );
        assert!(store.remove("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_create_refuses_past_limit() {
        let limits = SessionLimits {
            max_sessions: 2,
            idle_timeout: Duration::from_secs(3600),
        };
        let store = InMemorySessionStore::with_limits(100.0, 20, limits);

        let first = store.create(None).await.unwrap().session_id;
        store.create(None).await.unwrap();
        assert_eq!(
            store.create(None).await.unwrap_err(),
            SessionError::LimitReached(2)
        );

        store.remove(&first).await.unwrap();
        assert!(store.create(None).await.is_ok());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_idle_sessions_make_room() {
        let limits = SessionLimits {
            max_sessions: 2,
            idle_timeout: Duration::ZERO,
        };
        let store = InMemorySessionStore::with_limits(100.0, 20, limits);

        for _ in 0..10 {
            store.create(None).await.unwrap();
        }
        assert!(store.len() <= 2);
    }

    #[tokio::test]
    async fn test_purge_idle_keeps_recent_sessions() {
        let store = InMemorySessionStore::new(100.0, 20);
        let id = store.create(None).await.unwrap().session_id;

        assert_eq!(store.purge_idle_at(Utc::now()), 0);
        assert!(store.get(&id).await.is_ok());

        let later = Utc::now() + chrono::Duration::seconds(3601);
        assert_eq!(store.purge_idle_at(later), 1);
        assert_eq!(store.get(&id).await, Err(SessionError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_locked_session_is_never_evicted() {
        let store = InMemorySessionStore::new(100.0, 20);
        let id = store.create(None).await.unwrap().session_id;
        let session = store.lookup(&id).unwrap();
        let _guard = session.lock().await;

        let later = Utc::now() + chrono::Duration::seconds(7200);
        assert_eq!(store.purge_idle_at(later), 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_set_balance_and_remove() {
        let store = InMemorySessionStore::new(100.0, 20);
        let id = store.create(Some(5.0)).await.unwrap().session_id;

        assert_eq!(store.set_balance(&id, 250.0).await.unwrap().balance, 250.0);
        assert!(store.set_balance(&id, -3.0).await.is_err());

        store.remove(&id).await.unwrap();
        assert!(store.is_empty());
    }
}
