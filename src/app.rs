use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::fetcher::HttpFetcher;
use crate::loader::{LoaderState, QueryLoader, StartOutcome};
use crate::screen::{IndicatorMode, Screen};
use crate::UrlBuilder;

/// One line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    /// Tear the screen down and build it again from saved state.
    Rotate,
    /// Drop the loader along with the screen.
    Destroy,
    /// Block until the running search finishes.
    Wait,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":rotate" => Command::Rotate,
            ":destroy" => Command::Destroy,
            ":wait" => Command::Wait,
            ":quit" | ":q" => Command::Quit,
            query => Command::Search(query.to_string()),
        }
    }
}

/// Hosts the screen and owns the loader, standing in for the platform
/// lifecycle manager.
pub struct App<F: HttpFetcher> {
    fetcher: Arc<F>,
    builder: UrlBuilder,
    mode: IndicatorMode,
    loader: QueryLoader<F, Screen>,
}

impl<F: HttpFetcher> App<F> {
    pub fn new(fetcher: Arc<F>, builder: UrlBuilder, mode: IndicatorMode) -> Self {
        let mut loader = QueryLoader::new(Arc::clone(&fetcher));
        loader.attach(Screen::create(None, mode));
        App {
            fetcher,
            builder,
            mode,
            loader,
        }
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.loader.observer()
    }

    pub fn loader_state(&self) -> &LoaderState {
        self.loader.state()
    }

    pub fn is_in_flight(&self) -> bool {
        self.loader.is_in_flight()
    }

    pub fn submit(&mut self, query: &str) -> StartOutcome {
        let request = match self.loader.observer_mut() {
            Some(screen) => screen.make_search_query(&self.builder, query),
            None => self.builder.build_request(query),
        };
        let outcome = self.loader.start(request);
        if outcome == StartOutcome::AlreadyInFlight {
            // The screen keeps describing the search that will actually land.
            if let LoaderState::InFlight(running) = self.loader.state() {
                let running = running.clone();
                if let Some(screen) = self.loader.observer_mut() {
                    screen.show_url(running.as_str());
                }
            }
        }
        outcome
    }

    /// Transient teardown: the loader and its cached result survive.
    pub fn recreate_screen(&mut self) {
        let saved = self.loader.detach().map(|screen| screen.save_state());
        debug!("Recreating screen, saved state present: {}", saved.is_some());
        self.loader.attach(Screen::create(saved.as_ref(), self.mode));
    }

    /// Permanent teardown: anything in flight is aborted and the cache is
    /// gone.
    pub fn destroy(&mut self) {
        info!("Destroying screen and loader");
        let mut loader = QueryLoader::new(Arc::clone(&self.fetcher));
        loader.attach(Screen::create(None, self.mode));
        self.loader = loader;
    }

    pub async fn pump(&mut self) {
        self.loader.pump().await;
    }

    pub fn try_pump(&mut self) -> bool {
        self.loader.try_pump()
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.screen() {
            Some(screen) => screen.render(out),
            None => Ok(()),
        }
    }

    /// Read commands from `input` until it ends or a quit command arrives,
    /// rendering to `out` whenever the screen changes.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        if self.is_in_flight() {
                            self.pump().await;
                            self.render(out)?;
                        }
                        return Ok(());
                    };

                    if self.try_pump() {
                        self.render(out)?;
                    }

                    match Command::parse(&line) {
                        Command::Search(query) => {
                            self.submit(&query);
                            self.render(out)?;
                        }
                        Command::Rotate => {
                            self.recreate_screen();
                            self.render(out)?;
                        }
                        Command::Destroy => self.destroy(),
                        Command::Wait => {
                            if self.is_in_flight() {
                                self.pump().await;
                                self.render(out)?;
                            }
                        }
                        Command::Quit => return Ok(()),
                    }
                }
                _ = self.loader.pump() => {
                    self.render(out)?;
                }
            }
        }
    }
}
