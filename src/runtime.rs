//! Tokio glue for the debounced marker sync.
//!
//! The controller itself is clock-agnostic: it only compares deadlines
//! against the `now` it is handed. These helpers sleep until the pending
//! deadline and then pump the session, which is what an interactive host
//! does between frames.

use crate::{
    controller::SyncReport,
    prelude::{Duration, Instant},
    session::MapSession,
};

/// Sleeps on the tokio timer
pub async fn async_delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Pumps `session` until no sync is pending. Returns every sync that ran.
pub async fn settle(session: &mut MapSession) -> Vec<SyncReport> {
    let mut reports = Vec::new();
    loop {
        if let Some(report) = session.pump(Instant::now()) {
            reports.push(report);
        }
        match session.controller().deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                log::trace!("waiting {:?} for pending marker sync", wait);
                async_delay(wait).await;
            }
            None => break,
        }
    }
    reports
}

/// Like [`settle`] but gives up after `timeout`
pub async fn settle_within(session: &mut MapSession, timeout: Duration) -> Option<Vec<SyncReport>> {
    match tokio::time::timeout(timeout, settle(session)).await {
        Ok(reports) => Some(reports),
        Err(_) => {
            log::warn!("marker sync did not settle within {:?}", timeout);
            None
        }
    }
}
