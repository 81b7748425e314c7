use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};

use crossterm::style::Stylize;

use crate::config::Config;
use crate::difficulty::Difficulty;
use crate::error::GameError;
use crate::score::Scoreboard;
use crate::session::{parse_guess, SessionState};

/// How a round in the console ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEnd {
    Won,
    Exhausted,
    Abandoned,
    /// Input stream closed
    Closed,
}

/// One answer from the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A trimmed line of text
    Line(String),
    /// Ctrl+C while waiting for input
    Interrupted,
    /// Input stream closed
    Closed,
}

/// Where the console gets the player's answers from
pub trait LineSource {
    /// Block until the next answer is available
    fn next_reply(&mut self) -> io::Result<Reply>;
}

/// Read one line, replacing bytes that are not valid UTF-8.
fn read_reply<R: BufRead>(reader: &mut R) -> io::Result<Reply> {
    let mut buf = Vec::new();
    if reader.read_until(b'\n', &mut buf)? == 0 {
        return Ok(Reply::Closed);
    }
    Ok(Reply::Line(String::from_utf8_lossy(&buf).trim().to_string()))
}

/// Lines from any buffered reader; never interrupted
pub struct ReaderLines<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderLines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderLines<R> {
    fn next_reply(&mut self) -> io::Result<Reply> {
        read_reply(&mut self.reader)
    }
}

/// Answers delivered over a channel.
///
/// [`ChannelLines::stdin`] feeds it from a stdin reader thread and a Ctrl+C
/// handler, so an interrupt arrives as a reply instead of killing the process.
pub struct ChannelLines {
    rx: Receiver<Reply>,
}

impl ChannelLines {
    pub fn new(rx: Receiver<Reply>) -> Self {
        Self { rx }
    }

    /// Read stdin on a background thread and catch Ctrl+C.
    ///
    /// The handler is process-wide, so call this once.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::channel();

        let interrupts: Sender<Reply> = tx.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = interrupts.send(Reply::Interrupted);
        }) {
            tracing::warn!("could not install Ctrl+C handler: {e}");
        }

        std::thread::spawn(move || {
            let mut stdin = io::stdin().lock();
            loop {
                let reply = read_reply(&mut stdin).unwrap_or_else(|e| {
                    tracing::warn!("reading stdin failed: {e}");
                    Reply::Closed
                });
                let closed = reply == Reply::Closed;
                if tx.send(reply).is_err() || closed {
                    break;
                }
            }
        });

        Self::new(rx)
    }
}

impl LineSource for ChannelLines {
    fn next_reply(&mut self) -> io::Result<Reply> {
        Ok(self.rx.recv().unwrap_or(Reply::Closed))
    }
}

/// Line-based front end: menu, read-guess-respond loop, replay prompt.
///
/// Generic over its streams so it can be scripted.
pub struct Console<I: LineSource, W: Write> {
    input: I,
    output: W,
    config: Config,
    scoreboard: Scoreboard,
    color: bool,
    fixed_secret: Option<i64>,
}

impl<I: LineSource, W: Write> Console<I, W> {
    pub fn new(input: I, output: W, config: Config, scoreboard: Scoreboard) -> Self {
        Self {
            input,
            output,
            config,
            scoreboard,
            color: true,
            fixed_secret: None,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Every round uses this secret instead of a random one
    pub fn with_secret(mut self, secret: Option<i64>) -> Self {
        self.fixed_secret = secret;
        self
    }

    /// Settings in effect, including the last difficulty picked
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", text.magenta())
        } else {
            writeln!(self.output, "{text}")
        }
    }

    fn shout(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            writeln!(self.output, "{}", text.magenta().bold())
        } else {
            writeln!(self.output, "{text}")
        }
    }

    /// Print `prompt` and wait for the player's reply.
    fn ask(&mut self, prompt: &str) -> io::Result<Reply> {
        if self.color {
            write!(self.output, "{} ", prompt.magenta())?;
        } else {
            write!(self.output, "{prompt} ")?;
        }
        self.output.flush()?;

        let reply = self.input.next_reply()?;
        if !matches!(reply, Reply::Line(_)) {
            writeln!(self.output)?;
        }
        Ok(reply)
    }

    /// `Some(true)` for yes, `Some(false)` for no, `None` when the player
    /// interrupts or input is closed.
    fn ask_yes_no(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        loop {
            let Reply::Line(answer) = self.ask(prompt)? else {
                return Ok(None);
            };
            match answer.to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.say("Please answer y (yes) or n (no).")?,
            }
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        self.print_title()?;
        if let Some(best) = self.scoreboard.best() {
            let line = format!("Saved best score: {}.", best.summary());
            self.say(&line)?;
        }

        loop {
            let Some(difficulty) = self.choose_difficulty()? else {
                break;
            };
            self.config.difficulty = difficulty;

            match self.play_round(difficulty.attempt_limit())? {
                RoundEnd::Closed => break,
                RoundEnd::Abandoned => self.say("Leaving the round. Back to the menu...")?,
                RoundEnd::Won | RoundEnd::Exhausted => {}
            }

            match self.ask_yes_no("Play again? (y/n):")? {
                Some(true) => writeln!(self.output)?,
                Some(false) => {
                    self.say("Thanks for playing. See you next time!")?;
                    return Ok(());
                }
                None => break,
            }
        }

        self.say("Goodbye!")
    }

    fn print_title(&mut self) -> io::Result<()> {
        let rule = "=".repeat(56);
        let title = format!(
            "   Welcome to Guess the Number ({} - {})",
            self.config.min, self.config.max
        );
        self.shout(&rule)?;
        self.shout(&title)?;
        self.shout(&rule)
    }

    /// `None` when the player interrupts or input is closed
    pub fn choose_difficulty(&mut self) -> io::Result<Option<Difficulty>> {
        writeln!(self.output)?;
        self.say("Choose a difficulty:")?;
        for d in Difficulty::ALL {
            let default = if d == self.config.difficulty {
                " [default]"
            } else {
                ""
            };
            let line = format!("  {}. {}{default}", d.menu_key(), d.label());
            self.say(&line)?;
        }

        loop {
            let Reply::Line(choice) = self.ask("Your choice (1/2/3):")? else {
                return Ok(None);
            };
            if choice.is_empty() {
                return Ok(Some(self.config.difficulty));
            }
            let mut chars = choice.chars();
            if let (Some(key), None) = (chars.next(), chars.next()) {
                if let Some(d) = Difficulty::from_menu_key(key) {
                    return Ok(Some(d));
                }
            }
            self.say("Please enter 1, 2 or 3.")?;
        }
    }

    fn start_round(&self, attempt_limit: Option<u32>) -> Result<SessionState, GameError> {
        let Config { min, max, .. } = self.config;
        match self.fixed_secret {
            Some(secret) => SessionState::with_secret(min, max, attempt_limit, secret),
            None => SessionState::start(min, max, attempt_limit),
        }
    }

    pub fn play_round(&mut self, attempt_limit: Option<u32>) -> io::Result<RoundEnd> {
        let mut round = match self.start_round(attempt_limit) {
            Ok(round) => round,
            Err(e) => {
                self.say(&e.to_string())?;
                return Ok(RoundEnd::Abandoned);
            }
        };
        let (min, max) = (*round.range().start(), *round.range().end());

        writeln!(self.output)?;
        self.say(&format!(
            "I picked a secret number between {min} and {max}. Good luck!"
        ))?;
        match attempt_limit {
            Some(limit) => self.say(&format!("You have at most {limit} attempts."))?,
            None => self.say("You have unlimited attempts.")?,
        }

        loop {
            let text = match self.ask("Guess the secret number:")? {
                Reply::Line(text) => text,
                // same as an empty line: ask before leaving
                Reply::Interrupted => String::new(),
                Reply::Closed => return Ok(RoundEnd::Closed),
            };

            let guess = match parse_guess(&text) {
                Ok(guess) => guess,
                Err(GameError::EmptyInput) => {
                    match self.ask_yes_no("Do you want to leave this round? (y/n):")? {
                        Some(true) => return Ok(RoundEnd::Abandoned),
                        Some(false) => continue,
                        None => return Ok(RoundEnd::Closed),
                    }
                }
                Err(e) => {
                    self.say(&format!("{e}. Type a whole number."))?;
                    continue;
                }
            };

            let outcome = match round.submit_guess(guess) {
                Ok(outcome) => outcome,
                Err(GameError::OutOfRange { .. }) => {
                    self.say(&format!("Please pick a number between {min} and {max}."))?;
                    continue;
                }
                Err(e) => {
                    self.say(&e.to_string())?;
                    return Ok(RoundEnd::Abandoned);
                }
            };

            if outcome.is_won {
                let seconds = round.elapsed().as_secs_f64();
                writeln!(self.output)?;
                self.shout(&format!(
                    "Congratulations! You guessed the secret number: {guess}"
                ))?;
                self.say(&format!(
                    "You got it in {} attempt{} and {seconds:.2} seconds.",
                    outcome.attempts_used,
                    if outcome.attempts_used == 1 { "" } else { "s" },
                ))?;
                if let Some(candidate) = round.winning_record() {
                    let recorded = self.scoreboard.record(candidate);
                    if recorded.did_update {
                        self.shout("New record! Your best score has been saved.")?;
                    } else {
                        self.say(&format!("Current best: {}.", recorded.best.summary()))?;
                    }
                }
                return Ok(RoundEnd::Won);
            }

            self.say(&outcome.hint())?;

            if outcome.is_exhausted {
                self.shout("You are out of attempts. Better luck next time!")?;
                if let Some(secret) = round.reveal() {
                    self.say(&format!("The secret number was: {secret}"))?;
                }
                return Ok(RoundEnd::Exhausted);
            }
            if let Some(remaining) = round.attempts_remaining() {
                self.say(&format!("Attempts left: {remaining}"))?;
            }
        }
    }
}
