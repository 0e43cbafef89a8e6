//! Table metrics with Prometheus text export

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Prometheus-compatible metrics registry
#[derive(Clone, Default)]
pub struct MetricsRegistry {
    pub spins_total: Arc<AtomicU64>,
    pub spins_rejected_total: Arc<AtomicU64>,
    pub bets_settled_total: Arc<AtomicU64>,
    pub winning_bets_total: Arc<AtomicU64>,
    /// Money is tracked in cents so it fits an atomic counter
    pub staked_cents_total: Arc<AtomicU64>,
    pub paid_cents_total: Arc<AtomicU64>,
    pub websocket_connections_active: Arc<AtomicU64>,
}

fn to_cents(amount: f64) -> u64 {
    (amount * 100.0).round().max(0.0) as u64
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_spin(&self, bets: usize, winning_bets: usize, staked: f64, paid: f64) {
        self.spins_total.fetch_add(1, Ordering::Relaxed);
        self.bets_settled_total.fetch_add(bets as u64, Ordering::Relaxed);
        self.winning_bets_total.fetch_add(winning_bets as u64, Ordering::Relaxed);
        self.staked_cents_total.fetch_add(to_cents(staked), Ordering::Relaxed);
        self.paid_cents_total.fetch_add(to_cents(paid), Ordering::Relaxed);
    }

    pub fn record_rejection(&self) {
        self.spins_rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn websocket_connected(&self) {
        self.websocket_connections_active.fetch_add(1, Ordering::Relaxed);
    }

    pub fn websocket_disconnected(&self) {
        self.websocket_connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn to_prometheus_format(&self) -> String {
        let counters = [
            ("roulette_spins_total", "counter", "Settled spins", &self.spins_total),
            (
                "roulette_spins_rejected_total",
                "counter",
                "Spin requests rejected by validation",
                &self.spins_rejected_total,
            ),
            (
                "roulette_bets_settled_total",
                "counter",
                "Individual bets settled",
                &self.bets_settled_total,
            ),
            (
                "roulette_winning_bets_total",
                "counter",
                "Bets that paid out",
                &self.winning_bets_total,
            ),
            (
                "roulette_staked_cents_total",
                "counter",
                "Total amount staked, in cents",
                &self.staked_cents_total,
            ),
            (
                "roulette_paid_cents_total",
                "counter",
                "Total amount paid out, in cents",
                &self.paid_cents_total,
            ),
            (
                "roulette_websocket_connections_active",
                "gauge",
                "Open WebSocket connections",
                &self.websocket_connections_active,
            ),
        ];

        let mut output = String::new();
        for (name, kind, help, value) in counters {
            output.push_str(&format!(
                "# HELP {name} {help}\n# TYPE {name} {kind}\n{name} {}\n\n",
                value.load(Ordering::Relaxed)
            ));
        }
        output
    }
}
