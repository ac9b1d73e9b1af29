//! Shared wiring for the review commands
//!
//! Settings are reloaded at the start of every cycle, so edits to the
//! config file apply to a running poller without a restart.

use std::path::PathBuf;

use log::{debug, info};

use reviewbot::adapters::wait::{self, TimedWait};
use reviewbot::adapters::{ActionPlatform, GiteaPlatform, HttpClient, LayeredProjectConfig, ObsPlatform};
use reviewbot::config::{Overrides, PlatformKind, Settings};
use reviewbot::core::ports::{Platform, SystemClock, Wait};
use reviewbot::core::services::checks::{NoOpinion, SourceSubmissionCheck};
use reviewbot::core::services::{
    CachedProjectConfig, CachedSources, CheckRegistry, Collaborators, PollingRunner, RequestSelector,
    ReviewEngine, Selection, SessionCache, SourceMatchCheck,
};
use reviewbot::output::{OutputMode, RunSummary};

/// Everything a command needs from the command line
#[derive(Debug)]
pub struct Session {
    /// `--config`
    pub config_path: Option<PathBuf>,
    /// Flags overriding file values
    pub overrides: Overrides,
    /// Human or JSON output
    pub mode: OutputMode,
    /// Log request and response bodies
    pub trace_http: bool,
}

impl Session {
    /// Load settings: file, then environment, then flags
    pub fn settings(&self) -> anyhow::Result<Settings> {
        Ok(Settings::load(self.config_path.as_deref())?
            .with_env()
            .with_overrides(&self.overrides))
    }

    /// Open the configured platform backend
    pub fn connect(&self, settings: &Settings) -> anyhow::Result<Box<dyn Platform>> {
        let platform: Box<dyn Platform> = match settings.platform()? {
            PlatformKind::Obs => Box::new(ObsPlatform::new(self.http(settings)?)),
            PlatformKind::Gitea => Box::new(GiteaPlatform::new(self.http(settings)?)),
            PlatformKind::Action => Box::new(ActionPlatform::from_env()?),
        };
        debug!("connected to {}", platform.name());
        Ok(platform)
    }

    fn http(&self, settings: &Settings) -> anyhow::Result<HttpClient> {
        let url = settings.api_url()?;
        debug!("using API at {url}");
        HttpClient::new(url, settings.auth(), self.trace_http)
    }

    /// Fail on configuration errors before the first cycle
    pub fn validate(&self) -> anyhow::Result<()> {
        let settings = self.settings()?;
        settings.engine_config()?;
        self.connect(&settings)?;
        Ok(())
    }

    /// Review the selected requests, once or every `interval` minutes
    pub fn run_reviews<S>(&self, interval: Option<u64>, select: S) -> anyhow::Result<()>
    where
        S: Fn(&Settings) -> anyhow::Result<Selection>,
    {
        self.validate()?;

        let waiter: Box<dyn Wait> = if interval.is_some_and(|minutes| minutes > 0) {
            wait::for_stdin()
        } else {
            Box::new(TimedWait)
        };
        let runner = PollingRunner::new(interval, waiter.as_ref());
        runner.run(|cache| self.review_cycle(cache, &select))
    }

    /// One cycle: select, evaluate, record, report
    pub fn review_cycle<S>(&self, cache: &SessionCache, select: &S) -> anyhow::Result<()>
    where
        S: Fn(&Settings) -> anyhow::Result<Selection>,
    {
        let settings = self.settings()?;
        let engine_config = settings.engine_config()?;
        let platform = self.connect(&settings)?;

        let selection = select(&settings)?;
        let requests = RequestSelector::new(platform.requests()).select(&selection)?;

        let sources = CachedSources::new(platform.sources(), cache);
        let remote_config = CachedProjectConfig::new(platform.project_config(), cache);
        let local_config = settings.project_values();
        let project_config = LayeredProjectConfig::new(&local_config, &remote_config);

        let submission: Box<dyn SourceSubmissionCheck> = if settings.review.source_match {
            Box::new(SourceMatchCheck::default())
        } else {
            Box::new(NoOpinion)
        };

        let ports = Collaborators {
            requests: platform.requests(),
            comments: platform.comments(),
            sources: &sources,
            project_config: &project_config,
            clock: &SystemClock,
        };
        let engine = ReviewEngine::new(engine_config, ports, CheckRegistry::standard(submission.as_ref()));

        info!(
            "reviewing {} request(s) on {} as {}",
            requests.len(),
            platform.name(),
            engine.config().reviewer
        );
        let reports = engine.check_requests(&requests)?;
        RunSummary::new(platform.name(), settings.dry_run, &reports).render(self.mode);
        Ok(())
    }
}
