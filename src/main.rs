//! session-scheduler - the lifecycle scheduler loop.
//!
//! Every poll interval it reads the candidate window, runs the batch
//! transition driver, and sweeps expired meeting rooms. All transition
//! decisions live in the library; this binary only wires adapters and
//! keeps time.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use academy_sessions::adapters::{
    LiveKitConfig, LiveKitMeetingProvider, LoggingNotificationDispatcher,
    PostgresAttendanceRepository, PostgresSessionRepository, PostgresSettlementLedger,
    PostgresUsageTracker,
};
use academy_sessions::application::{
    MeetingOrchestrator, SessionTransitionHandler, SettlementHook, StatusTransitionDriver,
};
use academy_sessions::config::AppConfig;
use academy_sessions::domain::foundation::Timestamp;
use academy_sessions::domain::session::TransitionContext;
use academy_sessions::ports::{NotificationDispatcher, SessionRepository, SubscriptionUsageTracker};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,academy_sessions=debug,sqlx=warn")
        }))
        .json()
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await?;

    let sessions: Arc<dyn SessionRepository> =
        Arc::new(PostgresSessionRepository::new(pool.clone()));
    let attendance = Arc::new(PostgresAttendanceRepository::new(pool.clone()));
    let ledger = Arc::new(PostgresSettlementLedger::new(pool.clone()));

    let provider = Arc::new(LiveKitMeetingProvider::new(
        LiveKitConfig::new(
            config.meeting.host.clone(),
            config.meeting.api_key.clone(),
            config.meeting.api_secret.clone(),
        )
        .with_timeout(config.meeting.request_timeout()),
    ));

    let meetings = Arc::new(MeetingOrchestrator::new(provider, sessions.clone()));
    let settlement = Arc::new(SettlementHook::new(ledger));
    let usage: Arc<dyn SubscriptionUsageTracker> = Arc::new(PostgresUsageTracker::new(pool.clone()));
    let notifier: Arc<dyn NotificationDispatcher> = Arc::new(LoggingNotificationDispatcher);

    let handler = Arc::new(SessionTransitionHandler::new(
        sessions.clone(),
        attendance,
        meetings.clone(),
        usage,
        settlement,
        notifier,
        config.timing.clone(),
    ));
    let driver = StatusTransitionDriver::new(handler);

    info!(
        poll_interval_secs = config.scheduler.poll_interval_secs,
        "session scheduler started"
    );

    let mut ticker = tokio::time::interval(config.scheduler.poll_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let now = Timestamp::now();

        let from = now.minus_hours(config.scheduler.lookback_hours as i64);
        let to = now.plus_hours(config.scheduler.lookahead_hours as i64);
        match sessions.find_non_terminal_between(from, to).await {
            Ok(candidates) => {
                driver.process(candidates, now).await;
            }
            Err(e) => error!(error = %e, "failed to read candidate window"),
        }

        let ctx = TransitionContext::new(now, config.timing.clone());
        if let Err(e) = meetings.terminate_expired_meetings(&ctx).await {
            error!(error = %e, "expired meeting sweep failed");
        }
    }
}

