//! App — terminal event loop around the curation reducer.
//!
//! - A blocking task polls crossterm and forwards events over a `tokio::mpsc`
//!   channel.
//! - Each key is mapped to a command and fed through [`update`]; the
//!   returned [`Effect`] (export, preview, broadcast) runs here.
//! - While a thread is being posted the loop keeps draining input so `Esc`
//!   can cancel it; every other key is dropped.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use ratatui::crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use hmmm_core::broadcast::{
    broadcast_thread, BroadcastClient, BroadcastError, BroadcastReport, Pacing, ProgressSink,
    ThreadPhase, ThreadTemplate,
};
use hmmm_core::export::write_export;
use hmmm_core::feed::FeedProvider;
use hmmm_core::{update, CurationState, Effect, Item};

use crate::keymap;
use crate::render::{self, Preview, View};

type Term = Terminal<CrosstermBackend<Stdout>>;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub struct App {
    feed: Box<dyn FeedProvider>,
    client: Box<dyn BroadcastClient>,
    template: ThreadTemplate,
    pacing: Pacing,
    export_dir: PathBuf,
    preview: Option<Preview>,
}

impl App {
    pub fn new(
        feed: Box<dyn FeedProvider>,
        client: Box<dyn BroadcastClient>,
        template: ThreadTemplate,
        pacing: Pacing,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            feed,
            client,
            template,
            pacing,
            export_dir,
            preview: None,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    /// Take over the terminal until the user quits. The terminal is restored
    /// whether the loop ends cleanly or not.
    pub async fn run(mut self, state: CurationState) -> anyhow::Result<()> {
        let mut terminal = setup_terminal().context("unable to initialise terminal")?;
        debug!("terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal, state).await;
        restore_terminal(&mut terminal).context("unable to restore terminal")?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Term, mut state: CurationState) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<Event>(256);

        // ── Background task: keyboard events ──────────────────────────────────
        tokio::task::spawn_blocking(move || loop {
            if tx.is_closed() {
                break;
            }
            match event::poll(POLL_INTERVAL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.blocking_send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("terminal read failed: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!("terminal poll failed: {}", e);
                    break;
                }
            }
        });

        loop {
            terminal.draw(|f| {
                let view = self.preview.as_ref().map_or(View::Browse, View::Preview);
                render::draw(f, &mut state, view)
            })?;

            let Some(ev) = rx.recv().await else {
                break;
            };
            let Event::Key(key) = ev else {
                // resize and friends only need a redraw
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            if self.preview.take().is_some() {
                state.interrupt_chord();
                continue;
            }
            let Some(cmd) = keymap::command_for(key) else {
                state.interrupt_chord();
                continue;
            };

            let (next, effect) = update(state, cmd);
            state = next;
            match effect {
                None => {}
                Some(Effect::Quit) => {
                    info!("quit requested");
                    break;
                }
                Some(Effect::Export(items)) => self.export(&mut state, &items),
                Some(Effect::Preview(item)) => {
                    self.show_abstract(terminal, &mut state, item).await?
                }
                Some(Effect::Broadcast(items)) => {
                    self.broadcast(terminal, &mut state, &mut rx, &items).await?
                }
            }
        }
        Ok(())
    }

    fn export(&self, state: &mut CurationState, items: &[Item]) {
        let today = chrono::Local::now().date_naive();
        match write_export(&self.export_dir, today, &state.categories, items) {
            Ok(path) => state.set_status(format!(
                "Exported {} papers to {}",
                items.len(),
                path.display()
            )),
            Err(e) => {
                error!("export failed: {}", e);
                state.set_status(format!("Export failed: {}", e));
            }
        }
    }

    async fn show_abstract(
        &mut self,
        terminal: &mut Term,
        state: &mut CurationState,
        item: Item,
    ) -> anyhow::Result<()> {
        state.set_status(format!("Fetching abstract for [{}]", item.identifier));
        terminal.draw(|f| render::draw(f, state, View::Browse))?;

        match self.feed.full_text(&item).await {
            Ok(text) => {
                state.status = None;
                self.preview = Some(Preview { item, text });
            }
            Err(e) => {
                warn!("abstract for [{}] unavailable: {}", item.identifier, e);
                state.set_status(format!("Unable to fetch abstract: {}", e));
            }
        }
        Ok(())
    }

    async fn broadcast(
        &self,
        terminal: &mut Term,
        state: &mut CurationState,
        rx: &mut mpsc::Receiver<Event>,
        items: &[Item],
    ) -> anyhow::Result<()> {
        info!(items = items.len(), "broadcast started");
        let cancel = CancellationToken::new();
        let mut view = ProgressView {
            terminal,
            state,
            draw_error: None,
        };
        view.redraw();

        let result = {
            let run = broadcast_thread(
                &*self.client,
                items,
                &self.template,
                &self.pacing,
                &mut view,
                &cancel,
            );
            tokio::pin!(run);
            loop {
                tokio::select! {
                    result = &mut run => break result,
                    Some(ev) = rx.recv() => {
                        if let Event::Key(key) = ev {
                            if keymap::is_cancel(key) && !cancel.is_cancelled() {
                                info!("broadcast cancel requested");
                                cancel.cancel();
                            }
                        }
                    }
                }
            }
        };

        if let Some(e) = view.draw_error.take() {
            return Err(e.into());
        }
        view.state.set_status(summary(items.len(), &result));
        Ok(())
    }
}

/// Status line shown once a broadcast has finished.
fn summary(total: usize, result: &Result<BroadcastReport, BroadcastError>) -> String {
    let report = match result {
        Ok(report) => report,
        Err(e) => return format!("Unable to open thread: {}", e),
    };
    let mut line = match report.phase {
        ThreadPhase::Cancelled => format!(
            "Broadcast cancelled after {} of {} papers",
            report.posted.len(),
            total
        ),
        _ => format!("Posted {} of {} papers", report.posted.len(), total),
    };
    if !report.failures.is_empty() {
        line.push_str(&format!(", {} failed", report.failures.len()));
    }
    if report.closing_error.is_some() {
        line.push_str(", closing post failed");
    }
    line
}

/// Redraws the screen as the thread advances.
struct ProgressView<'a> {
    terminal: &'a mut Term,
    state: &'a mut CurationState,
    draw_error: Option<io::Error>,
}

impl ProgressView<'_> {
    fn redraw(&mut self) {
        let Self {
            terminal,
            state,
            draw_error,
        } = self;
        if let Err(e) = terminal.draw(|f| render::draw(f, state, View::Posting)) {
            draw_error.get_or_insert(e);
        }
    }
}

impl ProgressSink for ProgressView<'_> {
    fn posting(&mut self, i: usize, total: usize) {
        self.state.show_progress(i, total);
        self.redraw();
    }

    fn item_failed(&mut self, i: usize, item: &Item, error: &BroadcastError) {
        debug!(index = i, "item failed: {}", error);
        self.state
            .set_status(format!("Unable to post [{}]: {}", item.identifier, error));
        self.redraw();
    }

    fn phase_changed(&mut self, phase: ThreadPhase) {
        debug!(?phase, "broadcast phase");
    }
}

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}
