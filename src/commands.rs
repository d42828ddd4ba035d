use crate::error::{ErrorKind, Result};
use docwatch_config::Config;
use docwatch_document::identify;
use docwatch_library::{Context, Envelope, Schedule, Window, run};
use docwatch_memory::{Database, Memory};
use docwatch_report::{Archive, DryRun, Reporter, Sendmail};
use docwatch_repository::DocumentFilter;
use docwatch_repository::source::SvnListing;
use docwatch_storage::BackendHandle;
use docwatch_storage::backend::{DocumentsOnlyBackend, LocalBackend, ReadOnlyBackend};
use exn::ResultExt;
use std::sync::Arc;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

async fn memory(config: &Config, dry_run: bool) -> Result<Memory> {
    let db = Database::connect(&config.memory.database).await.or_raise(|| ErrorKind::Setup("memory"))?;
    Ok(Memory::new(db.pool().clone(), &config.memory.key, dry_run))
}

async fn context(config: &Config, dry_run: bool) -> Result<Context> {
    let repository = &config.repository;
    let mut svn = SvnListing::new(&repository.url, repository.svn.clone()).or_raise(|| ErrorKind::Setup("repository"))?;
    if let Some(username) = &repository.username {
        svn = svn.with_credentials(username, repository.password.clone().unwrap_or_default());
    }

    let local = LocalBackend::new(&config.secondary.name, &config.secondary.root).or_raise(|| ErrorKind::Setup("secondary store"))?;
    let documents = DocumentsOnlyBackend::new(Arc::new(local), &config.documents.extensions);
    let secondary: BackendHandle = Arc::new(ReadOnlyBackend::new(Arc::new(documents)));

    let reporter = Reporter::load(config.notify.template.as_deref()).or_raise(|| ErrorKind::Setup("report template"))?;
    let envelope = Envelope {
        subject: config.notify.subject.clone(),
        sender: config.notify.sender.clone(),
        recipients: config.notify.recipients.clone(),
    };
    let filter = DocumentFilter::new(&config.documents.extensions, &config.documents.exclude);
    let mut ctx = Context::new(Arc::new(svn), secondary, memory(config, dry_run).await?, reporter, envelope)
        .with_filter(filter);

    if dry_run {
        return Ok(ctx.with_notifier(DryRun));
    }
    if config.notify.sendmail {
        let sendmail =
            Sendmail::discover(config.notify.sendmail_binary.as_deref()).or_raise(|| ErrorKind::Setup("sendmail"))?;
        ctx = ctx.with_notifier(sendmail);
    }
    if let Some(archive) = &config.notify.archive {
        let backend = LocalBackend::new("archive", archive).or_raise(|| ErrorKind::Setup("report archive"))?;
        ctx = ctx.with_notifier(Archive::new(Arc::new(backend)));
    }
    Ok(ctx)
}

/// Runs a pass, turning an unreachable source into a warning.
async fn pass(ctx: &Context) -> Result<()> {
    match run(ctx).await {
        Ok(outcome) => {
            tracing::info!(%outcome, "Pass complete");
            Ok(())
        },
        Err(err) if err.is_source_unavailable() => {
            tracing::warn!("{}; skipping this pass", *err);
            Ok(())
        },
        Err(err) => Err(err).or_raise(|| ErrorKind::Pass),
    }
}

pub async fn run_once(config: &Config, dry_run: bool) -> Result<()> {
    let ctx = context(config, dry_run).await?;
    pass(&ctx).await
}

pub async fn watch(config: &Config, dry_run: bool, offset: UtcOffset) -> Result<()> {
    let ctx = context(config, dry_run).await?;
    let window = Window::new(
        config.schedule.start_time().or_raise(|| ErrorKind::Config)?,
        config.schedule.end_time().or_raise(|| ErrorKind::Config)?,
        config.schedule.weekdays_only,
    );
    let schedule = Schedule::every_hours(config.schedule.every_hours, window);
    tracing::info!(
        every_hours = config.schedule.every_hours,
        start = %config.schedule.start,
        end = %config.schedule.end,
        weekdays_only = config.schedule.weekdays_only,
        "Watching"
    );

    let mut interval = interval_at(Instant::now() + schedule.period, schedule.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = local_now(offset);
                if !schedule.window.contains(now) {
                    tracing::debug!(%now, "Outside the schedule window; skipping");
                    continue;
                }
                tracing::info!("Running: {now}");
                pass(&ctx).await?;
            },
            result = &mut shutdown => {
                if let Err(err) = result {
                    tracing::error!(error = %err, "Could not listen for Ctrl-C");
                }
                tracing::info!("Shutting down");
                return Ok(());
            },
        }
    }
}

/// Local wall-clock time. Falls back to the offset found at start-up when
/// the current one cannot be determined safely.
fn local_now(fallback: UtcOffset) -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc().to_offset(fallback));
    PrimitiveDateTime::new(now.date(), now.time())
}

pub async fn clear(config: &Config, dry_run: bool) -> Result<()> {
    let memory = memory(config, dry_run).await?;
    memory.clear().await.or_raise(|| ErrorKind::Memory)?;
    if !memory.is_dry_run() {
        tracing::info!(key = memory.key(), "Memory cleared");
    }
    Ok(())
}

pub fn identify_all(filenames: &[String]) {
    for filename in filenames {
        match identify(filename) {
            Ok(document) => println!(
                "{filename}\n  title:   {}\n  id:      {}\n  version: {}",
                document.title(),
                document.id(),
                document.version()
            ),
            Err(err) => println!("{filename}\n  {}", *err),
        }
    }
}
