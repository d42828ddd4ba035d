use crate::SecondaryIndex;
use crate::error::{ErrorKind, Result};
use derive_more::Display;
use docwatch_memory::Memory;
use docwatch_report::{Message, Notifier, Report, Reporter};
use docwatch_repository::{DocumentFilter, ListingSource, Provenance, Snapshot};
use docwatch_storage::BackendHandle;
use exn::ResultExt;
use std::sync::Arc;
use tracing::instrument;

/// Who a report is addressed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
}
impl Envelope {
    pub fn seal(&self, body: String) -> Message {
        Message::new(&self.subject, &self.sender, &self.recipients, body)
    }
}

/// Everything a pass needs, built once per process.
pub struct Context {
    repository: Arc<dyn ListingSource>,
    secondary: BackendHandle,
    filter: DocumentFilter,
    memory: Memory,
    reporter: Reporter,
    envelope: Envelope,
    notifiers: Vec<Box<dyn Notifier>>,
}
impl Context {
    pub fn new(
        repository: Arc<dyn ListingSource>,
        secondary: BackendHandle,
        memory: Memory,
        reporter: Reporter,
        envelope: Envelope,
    ) -> Self {
        Self {
            repository,
            secondary,
            filter: DocumentFilter::default(),
            memory,
            reporter,
            envelope,
            notifiers: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: DocumentFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifiers.push(Box::new(notifier));
        self
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    async fn fetch_repository(&self) -> Result<Snapshot> {
        match self.repository.snapshot(&self.filter).await {
            Err(err) if err.is_unavailable() => Err(err).or_raise(|| ErrorKind::RepositoryUnavailable),
            result => result.or_raise(|| ErrorKind::Repository),
        }
    }

    async fn fetch_secondary(&self) -> Result<SecondaryIndex> {
        SecondaryIndex::build(&self.secondary).await
    }

    /// Everything between fetching and storing: compare against memory and
    /// report what changed.
    async fn compare(&self, fresh: &Snapshot, secondary: &SecondaryIndex) -> Result<Outcome> {
        let memory = match self.memory.retrieve().await {
            Err(err) if err.is_empty() => {
                tracing::info!("No memory yet.");
                return Ok(Outcome::FirstRun);
            },
            result => result.or_raise(|| ErrorKind::Memory)?,
        };
        memory.log(Provenance::Memory);
        let difference = fresh - &memory;
        difference.log(Provenance::Difference);
        if difference.is_empty() {
            tracing::info!("No new files!");
            return Ok(Outcome::Unchanged);
        }
        let message = self.message(&difference, secondary)?;
        self.notify(&message).await?;
        tracing::info!("Message sent.");
        Ok(Outcome::Notified {
            folders: difference.folder_count(),
            files: difference.file_count(),
        })
    }

    fn message(&self, difference: &Snapshot, secondary: &SecondaryIndex) -> Result<Message> {
        let has_previous = secondary.any_particular(&difference.all_documents());
        let report = Report::new(&self.envelope.subject, secondary.name(), has_previous, difference, |document| {
            secondary.find(document).iter().map(|path| path.display().to_string()).collect()
        })
        .or_raise(|| ErrorKind::Report)?;
        let body = self.reporter.render(&report).or_raise(|| ErrorKind::Report)?;
        Ok(self.envelope.seal(body))
    }

    /// Hands the message to every notifier, even after one of them fails;
    /// the first failure is returned.
    async fn notify(&self, message: &Message) -> Result<()> {
        if self.notifiers.is_empty() {
            tracing::error!("No notifiers configured; the report goes nowhere");
            exn::bail!(ErrorKind::Notify);
        }
        let mut first_failure = None;
        for notifier in &self.notifiers {
            match notifier.notify(message).await {
                Ok(()) => tracing::debug!(notifier = notifier.name(), "Report delivered"),
                Err(err) => {
                    tracing::error!(notifier = notifier.name(), error = %*err, "Report not delivered");
                    if first_failure.is_none() {
                        first_failure = Some(err);
                    }
                },
            }
        }
        match first_failure {
            Some(err) => Err(err).or_raise(|| ErrorKind::Notify),
            None => Ok(()),
        }
    }
}

/// What a completed pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Outcome {
    /// Nothing was remembered yet; the current state is now.
    #[display("first run")]
    FirstRun,
    #[display("no changes")]
    Unchanged,
    #[display("{files} changed files in {folders} folders reported")]
    Notified { folders: usize, files: usize },
}

/// One pass: list the repository and walk the secondary store side by side,
/// compare the listing with the remembered one, report any difference, and
/// remember the listing for next time.
///
/// Nothing is compared, reported or stored when either source cannot be read
/// ([`is_source_unavailable`](ErrorKind::is_source_unavailable)). Once both
/// are read, the listing is stored even when comparing or reporting fails;
/// that failure is returned afterwards.
#[instrument(skip_all, fields(repository = ctx.repository.name(), secondary = ctx.secondary.name()))]
pub async fn run(ctx: &Context) -> Result<Outcome> {
    let (fresh, secondary) = tokio::try_join!(ctx.fetch_repository(), ctx.fetch_secondary())?;
    secondary.log();
    fresh.log(Provenance::Current);
    let outcome = ctx.compare(&fresh, &secondary).await;
    let stored = ctx.memory.store(&fresh).await.or_raise(|| ErrorKind::Memory);
    let outcome = outcome?;
    stored?;
    Ok(outcome)
}
