// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First-in-first-out request throttle for the Strava API.
//!
//! Requests are admitted in arrival order. Each fixed window allows
//! `limit - headroom` admissions; once that is used up the next caller waits
//! for the window to reset, and everyone queued behind it waits too.

use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Strava's short-term quota window.
pub const STRAVA_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Calls kept in reserve below the published quota.
pub const DEFAULT_HEADROOM: u32 = 5;

struct Window {
    count: u32,
    resets_at: Instant,
}

/// Quota-per-window limiter with FIFO admission.
pub struct RateLimiter {
    limit: u32,
    headroom: u32,
    window: Duration,
    // tokio's Mutex queues waiters fairly, which gives FIFO admission.
    state: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_headroom(limit, DEFAULT_HEADROOM, window)
    }

    pub fn with_headroom(limit: u32, headroom: u32, window: Duration) -> Self {
        Self {
            limit,
            headroom,
            window,
            state: Mutex::new(Window {
                count: 0,
                resets_at: Instant::now() + window,
            }),
        }
    }

    /// Limiter for Strava's 15-minute quota.
    pub fn strava(limit_per_15_min: u32) -> Self {
        Self::new(limit_per_15_min, STRAVA_WINDOW)
    }

    /// Admissions allowed per window. Always at least one so the queue drains.
    pub fn capacity(&self) -> u32 {
        self.limit.saturating_sub(self.headroom).max(1)
    }

    /// Wait for a slot in the current window.
    pub async fn acquire(&self) {
        let mut window = self.state.lock().await;

        let now = Instant::now();
        if now >= window.resets_at {
            window.count = 0;
            window.resets_at = now + self.window;
        }

        if window.count >= self.capacity() {
            let wait = window.resets_at.saturating_duration_since(now);
            tracing::warn!(
                used = window.count,
                limit = self.limit,
                wait_secs = wait.as_secs(),
                "Rate limit window exhausted, deferring request"
            );
            tokio::time::sleep_until(window.resets_at).await;
            window.count = 0;
            window.resets_at = Instant::now() + self.window;
        }

        window.count += 1;
    }

    /// Run `request` once a slot is available.
    pub async fn execute<F, T>(&self, request: F) -> T
    where
        F: Future<Output = T>,
    {
        self.acquire().await;
        request.await
    }
}
