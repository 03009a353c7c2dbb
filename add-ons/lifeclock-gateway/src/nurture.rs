//! Nurture worker: background loop that emails users who left an address but
//! never unlocked their report.
//!
//! Each pass is one sequential batch. Recipients are marked before the outcome
//! is known: a failed send is logged and not retried, and the next pass moves on
//! to new addresses. Re-sending after a crash mid-pass is accepted
//! (at-least-once), an endless retry loop is not.

use crate::store::ReportStore;
use lifeclock_mailer::{BatchJob, BatchOutcome, CampaignKind, Mailer, Recipient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy)]
pub struct NurtureConfig {
    /// Time between passes.
    pub pass_interval: Duration,
    /// Fixed delay between consecutive sends within a pass.
    pub inter_send_delay: Duration,
}

/// Runs forever; spawn on the runtime. Pass failures are logged and the loop
/// keeps ticking.
pub async fn run_nurture_worker(
    store: Arc<ReportStore>,
    mailer: Arc<dyn Mailer>,
    config: NurtureConfig,
) {
    info!(
        "nurture worker started (pass every {}s)",
        config.pass_interval.as_secs()
    );
    let mut tick = interval(config.pass_interval);
    loop {
        tick.tick().await;
        match run_nurture_pass(&store, mailer.as_ref(), config.inter_send_delay).await {
            Ok(outcome) if outcome.sent + outcome.failed > 0 => {
                info!(sent = outcome.sent, failed = outcome.failed, "nurture pass finished");
            }
            Ok(_) => {}
            Err(e) => error!("nurture pass failed: {}", e),
        }
    }
}

/// One pass: drain the pending queue into a single batch.
pub async fn run_nurture_pass(
    store: &ReportStore,
    mailer: &dyn Mailer,
    inter_send_delay: Duration,
) -> Result<BatchOutcome, String> {
    let pending = store.pending_nurture().map_err(|e| e.to_string())?;
    if pending.is_empty() {
        return Ok(BatchOutcome::default());
    }

    // Mark first so a crash mid-batch cannot turn into a send loop.
    for email in &pending {
        if let Err(e) = store.mark_nurture_sent(email) {
            warn!("could not mark {} as nurtured: {}", email, e);
        }
    }

    let job = BatchJob {
        kind: CampaignKind::Nurture,
        recipients: pending
            .into_iter()
            .map(|email| Recipient {
                email,
                name: String::new(),
            })
            .collect(),
        inter_send_delay,
    };
    Ok(job.run(mailer).await)
}
