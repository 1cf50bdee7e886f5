mod auth;
mod dispatch;
mod info;
mod shows;


use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::catalog::{Catalog, MyShowsClient, ShowId};
use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::notify::{Notifier, TelegramNotifier};
use crate::paths::store_file_path;
use crate::store::ShowsManager;

use self::auth::AuthManager;
use self::dispatch::{SendMode, dispatch_due_episodes};

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::from_file(&cli.config)?;
    let store = ShowsManager::load(&store_file_path(&config.data_dir)?);
    let catalog = MyShowsClient::new();
    let notifier = TelegramNotifier::new(config.telegram.key.clone());

    let session = Session {
        config: &config,
        store: &store,
        catalog: &catalog,
        notifier: &notifier,
    };
    let command = cli.command.unwrap_or(Command::Notify);
    let outcome = session.execute(command, cli.skip);

    // Sent markers and renewed tokens stay valid even when the command failed.
    if let Err(err) = store.save() {
        error!("save of {} failed: {err:#}", store.path().display());
    }
    outcome
}

/// Everything one command needs, borrowed for the duration of the run.
pub(crate) struct Session<'a> {
    pub(crate) config: &'a Config,
    pub(crate) store: &'a ShowsManager,
    pub(crate) catalog: &'a dyn Catalog,
    pub(crate) notifier: &'a dyn Notifier,
}

impl Session<'_> {
    pub(crate) fn execute(&self, command: Command, skip: bool) -> Result<()> {
        let started = Instant::now();
        let name = command_name(&command);

        match command {
            Command::Notify => {
                let mode = if skip {
                    SendMode::Skip
                } else {
                    SendMode::Deliver
                };
                self.notify_users(mode)?;
            }
            Command::Watch { ids, follow } => self.watch(&ids, follow)?,
            Command::Unwatch { ids } => {
                debug!("removing ids from watchlist: {ids:?}");
                self.store.set_watch(&ids, false);
            }
            Command::List => self.list_shows()?,
            Command::Search { query } => self.search(&query)?,
            Command::Top { count } => self.top(count)?,
            Command::Info { id } => self.info(id)?,
        }

        debug!("{name} took {:?}", started.elapsed());
        Ok(())
    }

    fn auth(&self) -> AuthManager<'_> {
        AuthManager::new(self.catalog, self.store, &self.config.myshows)
    }

    pub(crate) fn notify_users(&self, mode: SendMode) -> Result<dispatch::DispatchReport> {
        if mode == SendMode::Deliver {
            self.config.require_telegram()?;
        }
        debug!("starting notification procedure");

        let episodes = self.auth().call("fetching due episodes", |token| {
            self.catalog.fetch_due_episodes(token)
        })?;
        debug!("found {} episodes to proceed", episodes.len());

        let report = dispatch_due_episodes(
            self.store,
            self.notifier,
            &episodes,
            &self.config.telegram.recipients,
            mode,
        )?;
        debug!(
            "{} of {} due episodes marked sent, {} without delivery",
            report.marked_sent.len(),
            report.due,
            report.suppressed_captions.len()
        );
        Ok(report)
    }

    pub(crate) fn watch(&self, ids: &[ShowId], follow: bool) -> Result<()> {
        debug!("adding ids to watchlist: {ids:?}");
        self.store.set_watch(ids, true);
        if !follow {
            return Ok(());
        }

        let auth = self.auth();
        for &id in ids {
            auth.call(&format!("marking show {id} as watching"), |token| {
                self.catalog.set_watching(token, id)
            })?;
        }
        Ok(())
    }

    fn list_shows(&self) -> Result<()> {
        let shows = self.auth().call("fetching show list", |token| {
            self.catalog.fetch_show_list(token)
        })?;
        for line in shows::format_profile_shows(&shows, self.store) {
            println!("{line}");
        }
        Ok(())
    }

    fn search(&self, query: &str) -> Result<()> {
        let shows = self
            .catalog
            .search_shows(query)
            .with_context(|| format!("search for '{query}' failed"))?;
        if shows.is_empty() {
            println!("Nothing found for '{query}'.");
        }
        for line in shows::format_search_results(&shows) {
            println!("{line}");
        }
        Ok(())
    }

    fn top(&self, count: u32) -> Result<()> {
        let shows = self
            .catalog
            .top_shows(count)
            .context("fetching top shows failed")?;
        for line in shows::format_top_shows(&shows) {
            println!("{line}");
        }
        Ok(())
    }

    fn info(&self, id: ShowId) -> Result<()> {
        let show = self
            .catalog
            .show_by_id(id)
            .with_context(|| format!("fetching show {id} failed"))?;
        let storyline = info::fetch_storyline(&show);
        println!("{}", info::format_show_info(&show, &storyline));
        Ok(())
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Notify => "notify",
        Command::Watch { .. } => "watch",
        Command::Unwatch { .. } => "unwatch",
        Command::List => "list",
        Command::Search { .. } => "search",
        Command::Top { .. } => "top",
        Command::Info { .. } => "info",
    }
}
