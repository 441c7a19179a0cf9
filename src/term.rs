//! Terminal presentation for the recruitment flow.
//!
//! Six screens, one forward action each. Everything here is display and
//! input plumbing; every decision goes through [`Session`] transition
//! methods, so this module holds no flow state of its own. A single reader
//! thread feeds stdin lines through an mpsc channel, which lets the
//! decryption screen tick its countdown with `recv_timeout` while waiting
//! for input.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::cipher;
use crate::core::countdown::{Countdown, Tick};
use crate::core::session::{Completion, Phase, Session, SubmitOutcome};
use crate::core::types::{
    Application, AudioClip, Catalog, Enlistment, Failure, Outcome, Question, QuestionKind,
};
use crate::exit_codes;
use crate::flow::run_initiation;
use crate::io::config::RecruiterConfig;
use crate::io::gateway::Gateway;

/// Typing-effect delay per character on the home screen.
const TYPE_DELAY: Duration = Duration::from_millis(50);

/// How long each analyzing message stays on screen.
const SPINNER_INTERVAL: Duration = Duration::from_millis(1500);

const INTRO_LINES: [&str; 3] = [
    ">>> In the neon shadows of NeoCity, corporations write the laws in blood and credits.",
    ">>> We are the glitch in their system. The ghost in their machine.",
    ">>> We are the Chrome Vipers.",
];

const CREW: [(&str, &str, &str); 3] = [
    (
        "VEX",
        "Leader",
        "The ghost in the machine who pulls the strings. Started the Vipers from nothing but scrap code and raw ambition.",
    ),
    (
        "JAX",
        "Enforcer",
        "Pure chrome and fury. Jax is the Vipers' iron fist, ensuring loyalty on the streets through intimidation and force.",
    ),
    (
        "NYX",
        "Netrunner",
        "A whisper on the net who can crack any corporate fortress. Information is her weapon and currency.",
    ),
];

const LOADING_MESSAGES: [&str; 8] = [
    "// ANALYZING VOCAL SIGNATURE...",
    "// CROSS-REFERENCING NEURAL DATABASE...",
    "// DETECTING SUB-VOCAL TREMORS...",
    "// CALIBRATING MENACE ALGORITHMS...",
    "// DECRYPTING INTENT...",
    "// REROUTING THROUGH BLACK ICE...",
    "// COMPILING PSYCH PROFILE...",
    "// FINAL VERDICT IMMINENT...",
];

/// What a screen asked the driver to do next.
enum Signal {
    Continue,
    Quit,
}

/// Interactive driver for one terminal session.
pub struct Terminal<'a, G: Gateway> {
    config: &'a RecruiterConfig,
    catalog: &'a Catalog,
    gateway: &'a G,
    /// When false, typing and spinner delays are skipped (`--no-fx`).
    fx: bool,
    lines: Receiver<String>,
}

impl<'a, G: Gateway> Terminal<'a, G> {
    pub fn new(
        config: &'a RecruiterConfig,
        catalog: &'a Catalog,
        gateway: &'a G,
        fx: bool,
    ) -> Self {
        Self {
            config,
            catalog,
            gateway,
            fx,
            lines: spawn_line_reader(),
        }
    }

    /// Drive sessions until the applicant disconnects or stdin closes.
    ///
    /// Returns the exit code for the last terminal outcome: `OK` after an
    /// enlistment (or a plain quit), `REFUSED` after a failure.
    pub fn run(self) -> Result<i32> {
        let mut session = Session::new();
        loop {
            let signal = match session.phase() {
                Phase::Home => self.home_screen(&mut session)?,
                Phase::Apply => self.apply_screen(&mut session)?,
                Phase::Decryption => self.decryption_screen(&mut session)?,
                Phase::Challenge => self.challenge_screen(&mut session)?,
                // begin_analysis and complete_analysis happen back to back
                // inside the challenge screen; the phase is never observed
                // here mid-flight.
                Phase::Analyzing => Signal::Quit,
                Phase::Result | Phase::Failed => self.outcome_screen(&mut session)?,
            };
            if let Signal::Quit = signal {
                return Ok(exit_code_for(&session));
            }
        }
    }

    fn home_screen(&self, session: &mut Session) -> Result<Signal> {
        self.banner("CHROME VIPERS")?;
        for line in INTRO_LINES {
            self.type_line(line)?;
        }
        println!();
        println!("// THE CREW //");
        for (name, role, desc) in CREW {
            println!("  {name} :: {role}");
            println!("    {desc}");
        }
        println!();
        println!("[ Prove Your Worth ] press Enter to start, 'q' to disconnect");

        match self.read_line() {
            Some(line) if line.trim() == "q" => Ok(Signal::Quit),
            Some(_) => {
                session.begin_application()?;
                Ok(Signal::Continue)
            }
            None => Ok(Signal::Quit),
        }
    }

    fn apply_screen(&self, session: &mut Session) -> Result<Signal> {
        self.banner("RECRUITMENT PROTOCOL")?;
        loop {
            println!("// ENTER YOUR HANDLE");
            self.prompt()?;
            let Some(handle) = self.read_line() else {
                return Ok(Signal::Quit);
            };

            let mut responses = Vec::with_capacity(self.catalog.questions.len());
            for (index, question) in self.catalog.questions.iter().enumerate() {
                println!();
                println!("// {:02} {}", index + 1, question.text);
                for (n, option) in question.options.iter().enumerate() {
                    println!("  [{}] {option}", n + 1);
                }
                self.prompt()?;
                let Some(line) = self.read_line() else {
                    return Ok(Signal::Quit);
                };
                responses.push(resolve_answer(question, &line));
            }

            match session.submit_profile(&handle, &responses, &self.catalog.questions)? {
                SubmitOutcome::Accepted => return Ok(Signal::Continue),
                SubmitOutcome::Incomplete(reason) => {
                    println!();
                    println!("// INCOMPLETE SUBMISSION: {reason}. From the top. //");
                }
            }
        }
    }

    fn decryption_screen(&self, session: &mut Session) -> Result<Signal> {
        self.banner("COGNITIVE TEST")?;
        println!("// We've received your profile. Now, a simple test. Decrypt the transmission. //");
        println!();
        println!("    {}", cipher::transmission());
        println!();

        let mut countdown = Countdown::new(self.config.countdown_secs);
        let mut schedule = TickSchedule::starting_at(Instant::now(), Duration::from_secs(1));
        self.render_clock(countdown.remaining())?;
        loop {
            let now = Instant::now();
            if schedule.tick_due(now) {
                match countdown.tick() {
                    Tick::Running(remaining) => self.render_clock(remaining)?,
                    Tick::Expired => {
                        session.fail_decryption()?;
                        println!();
                        return Ok(Signal::Continue);
                    }
                    Tick::Spent => {}
                }
                continue;
            }
            match self.lines.recv_timeout(schedule.wait_budget(now)) {
                Ok(line) => {
                    if cipher::check_answer(&line) {
                        // Dropping the countdown here is the teardown; no
                        // stray expiry can fire once the phase moves on.
                        session.pass_decryption()?;
                        println!();
                        println!("// ICE BYPASSED. //");
                        return Ok(Signal::Continue);
                    }
                    // Wrong guesses cost no extra time, but the deadline is
                    // not re-armed either; the clock keeps running.
                    println!();
                    println!("// REJECTED. Try again. //");
                    self.render_clock(countdown.remaining())?;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(Signal::Quit),
            }
        }
    }

    fn challenge_screen(&self, session: &mut Session) -> Result<Signal> {
        let handle = session
            .application()
            .map(|application| application.handle.clone())
            .context("challenge screen without an application")?;

        self.banner("THE INITIATION")?;
        println!("// {handle}, it's time to prove your worth. We need to know you have steel in your voice. //");
        println!("// Deliver a convincing threat. Make us believe you belong in the shadows. //");
        println!();

        let clip = loop {
            println!("// PATH TO YOUR RECORDED THREAT (wav/mp3/ogg/webm/m4a/flac)");
            self.prompt()?;
            let Some(line) = self.read_line() else {
                return Ok(Signal::Quit);
            };
            let path = Path::new(line.trim());
            if path.as_os_str().is_empty() {
                continue;
            }
            let Some(mime) = mime_for(path) else {
                println!("// UNSUPPORTED FORMAT. //");
                continue;
            };
            match fs::read(path) {
                Ok(bytes) if !bytes.is_empty() => break AudioClip::new(bytes, mime),
                Ok(_) => println!("// EMPTY CLIP. We need to hear you. //"),
                Err(err) => println!("// CANNOT READ {}: {err}. //", path.display()),
            }
        };

        let token = session.begin_analysis(&clip)?;
        let application = session
            .application()
            .cloned()
            .context("analysis started without an application")?;
        let outcome = self.analyzing_screen(&application, &clip)?;
        if session.complete_analysis(token, outcome) == Completion::Stale {
            debug!("analysis outcome arrived stale; dropped");
        }
        Ok(Signal::Continue)
    }

    /// Rotate the loading messages while the pipeline runs on this thread.
    fn analyzing_screen(&self, application: &Application, clip: &AudioClip) -> Result<Outcome> {
        self.banner("PROCESSING")?;
        if !self.fx {
            println!("{}", LOADING_MESSAGES[0]);
            return Ok(run_initiation(
                self.gateway,
                self.config,
                application,
                self.catalog,
                clip,
            ));
        }

        let done = Arc::new(AtomicBool::new(false));
        let spinner_done = Arc::clone(&done);
        let spinner = thread::spawn(move || {
            let mut index = 0usize;
            while !spinner_done.load(Ordering::Relaxed) {
                println!("{}", LOADING_MESSAGES[index % LOADING_MESSAGES.len()]);
                index += 1;
                // Sleep in short steps so the spinner stops promptly.
                let mut waited = Duration::ZERO;
                while waited < SPINNER_INTERVAL && !spinner_done.load(Ordering::Relaxed) {
                    thread::sleep(Duration::from_millis(100));
                    waited += Duration::from_millis(100);
                }
            }
        });

        let outcome = run_initiation(self.gateway, self.config, application, self.catalog, clip);
        done.store(true, Ordering::Relaxed);
        if spinner.join().is_err() {
            debug!("spinner thread panicked");
        }
        Ok(outcome)
    }

    fn outcome_screen(&self, session: &mut Session) -> Result<Signal> {
        match (session.enlistment(), session.failure()) {
            (Some(enlistment), _) => {
                let handle = session
                    .application()
                    .map(|application| application.handle.as_str())
                    .unwrap_or("recruit");
                self.render_enlistment(enlistment, handle)?;
            }
            (_, Some(failure)) => self.render_failure(failure)?,
            // Unreachable through Session's transitions; render the generic
            // refusal rather than panicking in a display layer.
            (None, None) => println!("// You ain't got the chrome for this, kid. Scram. //"),
        }

        println!();
        println!("[ Return to Shadows ] press Enter to restart, 'q' to disconnect");
        match self.read_line() {
            Some(line) if line.trim() == "q" => Ok(Signal::Quit),
            Some(_) => {
                session.restart()?;
                Ok(Signal::Continue)
            }
            None => Ok(Signal::Quit),
        }
    }

    fn render_enlistment(&self, enlistment: &Enlistment, handle: &str) -> Result<()> {
        self.banner("ASSIGNMENT COMPLETE")?;
        println!("// Welcome to the Chrome Vipers, {handle}. //");
        println!();
        println!("// ROLE: {} ({})", enlistment.role.name, enlistment.role.position);
        println!("   {}", enlistment.role.description);
        if !enlistment.role.traits.is_empty() {
            println!("   Traits: {}", enlistment.role.traits.join(", "));
        }
        println!();
        println!("// Justification: {}", enlistment.justification);
        println!();
        println!("// FIRST MISSION");
        println!("   {}", enlistment.mission);
        println!();
        println!("// Don't get flatlined. //");
        Ok(())
    }

    fn render_failure(&self, failure: &Failure) -> Result<()> {
        self.banner("CONNECTION TERMINATED")?;
        println!("{}", failure.message);
        Ok(())
    }

    fn banner(&self, title: &str) -> Result<()> {
        println!();
        println!("==[ {title} ]==");
        println!();
        io::stdout().flush().context("flush stdout")?;
        Ok(())
    }

    fn type_line(&self, line: &str) -> Result<()> {
        if !self.fx {
            println!("{line}");
            return Ok(());
        }
        let mut stdout = io::stdout();
        for ch in line.chars() {
            write!(stdout, "{ch}").context("write character")?;
            stdout.flush().context("flush stdout")?;
            thread::sleep(TYPE_DELAY);
        }
        writeln!(stdout).context("end line")?;
        Ok(())
    }

    fn render_clock(&self, remaining: u32) -> Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "\r[{remaining:02}s] >_ ").context("write clock")?;
        stdout.flush().context("flush stdout")?;
        Ok(())
    }

    fn prompt(&self) -> Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, ">_ ").context("write prompt")?;
        stdout.flush().context("flush stdout")?;
        Ok(())
    }

    /// Next stdin line, or `None` once stdin is closed.
    fn read_line(&self) -> Option<String> {
        self.lines.recv().ok()
    }
}

/// Wall-clock schedule for countdown ticks: one tick per interval from the
/// moment the screen opens, independent of input activity. Overruns yield
/// catch-up ticks, never lost ones.
#[derive(Debug)]
struct TickSchedule {
    next: Instant,
    interval: Duration,
}

impl TickSchedule {
    fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            next: start + interval,
            interval,
        }
    }

    /// True when a tick is due at `now`. Each due tick advances the deadline
    /// by exactly one interval, so arriving input never grants time back.
    fn tick_due(&mut self, now: Instant) -> bool {
        if now >= self.next {
            self.next += self.interval;
            true
        } else {
            false
        }
    }

    /// How long the input wait may block before the next tick is due.
    fn wait_budget(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

/// Feed stdin lines through a channel so screens can wait with a timeout.
fn spawn_line_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn exit_code_for(session: &Session) -> i32 {
    match session.outcome() {
        Some(Outcome::Refused(_)) => exit_codes::REFUSED,
        _ => exit_codes::OK,
    }
}

/// Map an mcq selection ("2") to the option text; anything else is taken
/// verbatim and left to profile validation.
fn resolve_answer(question: &Question, line: &str) -> String {
    let trimmed = line.trim();
    if question.kind == QuestionKind::Mcq
        && let Ok(index) = trimmed.parse::<usize>()
        && index >= 1
        && index <= question.options.len()
    {
        return question.options[index - 1].clone();
    }
    trimmed.to_string()
}

/// Declared media type for a clip path, by extension.
fn mime_for(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mpeg"),
        "ogg" => Some("audio/ogg"),
        "webm" => Some("audio/webm"),
        "m4a" => Some("audio/mp4"),
        "flac" => Some("audio/flac"),
        _ => None,
    }
}
