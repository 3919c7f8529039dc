use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::controller::{RequestController, RequestState, SubmitRejected};
use crate::presenter::{render_grid, MovieCardPresenter};
use crate::ClientError;

pub const BANNER: &str =
    "CineMood: describe how you feel and get movie recommendations (:quit to exit)";
pub const SEARCHING: &str = "searching...";
pub const STILL_SEARCHING: &str = "still searching, please wait";
pub const RESULTS_HEADING: &str = "Here are some recommendations:";
pub const QUIT_COMMAND: &str = ":quit";

/// Terminal front end: prompts in, cards or a message out.
pub struct Session<W: Write> {
    controller: RequestController,
    presenter: MovieCardPresenter,
    columns: usize,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(
        controller: RequestController,
        presenter: MovieCardPresenter,
        columns: usize,
        out: W,
    ) -> Self {
        Self {
            controller,
            presenter,
            columns,
            out,
        }
    }

    pub fn controller(&self) -> &RequestController {
        &self.controller
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Read prompts line by line until EOF or `:quit`. Input is still read
    /// while a request is in flight, but cannot start another one. Quitting
    /// mid-request cancels it; EOF waits for it to finish.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<(), ClientError> {
        let mut lines = input.lines();
        writeln!(self.out, "{}", BANNER)?;

        'prompts: while let Some(line) = lines.next_line().await? {
            if line.trim() == QUIT_COMMAND {
                break;
            }

            let pending = match self.controller.begin(&line) {
                Ok(pending) => pending,
                Err(_) => {
                    self.render_state()?;
                    continue;
                }
            };
            self.render_state()?;

            let send = pending.send();
            tokio::pin!(send);
            let mut input_open = true;

            let completion = loop {
                tokio::select! {
                    biased;
                    completion = &mut send => break completion,
                    next = lines.next_line(), if input_open => match next? {
                        None => input_open = false,
                        Some(l) if l.trim() == QUIT_COMMAND => {
                            self.controller.cancel();
                            break 'prompts;
                        }
                        Some(l) => {
                            if let Err(SubmitRejected::InFlight) = self.controller.begin(&l) {
                                writeln!(self.out, "{}", STILL_SEARCHING)?;
                            }
                        }
                    },
                }
            };

            self.controller.resolve(completion);
            self.render_state()?;

            if !input_open {
                break;
            }
        }

        debug!("Session finished");
        self.controller.cancel();
        self.out.flush()?;
        Ok(())
    }

    fn render_state(&mut self) -> Result<(), ClientError> {
        match self.controller.current_state() {
            RequestState::Idle => {}
            RequestState::Submitting => writeln!(self.out, "{}", SEARCHING)?,
            RequestState::Success(movies) => {
                let cards = self.presenter.present_all(movies);
                writeln!(self.out, "{}", RESULTS_HEADING)?;
                write!(self.out, "{}", render_grid(&cards, self.columns))?;
            }
            RequestState::Failed(failure) => writeln!(self.out, "{}", failure.message)?,
        }
        self.out.flush()?;
        Ok(())
    }

    /// Submit a single prompt and render the outcome, as cards or as JSON.
    /// Returns whether movies were shown.
    pub async fn run_once(&mut self, prompt: &str, json: bool) -> Result<bool, ClientError> {
        let shown = matches!(self.controller.submit(prompt).await, RequestState::Success(_));

        if json {
            if let RequestState::Success(movies) = self.controller.current_state() {
                serde_json::to_writer_pretty(&mut self.out, movies)?;
                writeln!(self.out)?;
                self.out.flush()?;
                return Ok(true);
            }
        }

        self.render_state()?;
        Ok(shown)
    }
}
