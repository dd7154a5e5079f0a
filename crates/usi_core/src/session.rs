//! USI session: command dispatch and lifecycle.
//!
//! The session is strictly request/response. One line is read, fully handled
//! (including any blocking call into the rules backend or the oracle), its
//! response written and flushed, and only then is the next line read.
//!
//! ```text
//! Created --usi--> Handshaken --isready--> Ready
//!    \                 |                    /
//!     +------- quit / end of input --------+--> Terminated
//! ```

use std::collections::HashMap;
use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::{
    DEFAULT_MAX_NEW_TOKENS, DecisionPolicy, EngineOptions, MATE_PLY_RANGE, MoveOracle,
    OPTION_MATE_PLY, OptionDecl, PolicyConfig, PositionManager, RulesEngine, bestmove_line,
    decision_lines, default_options, parse_position_args, parse_setoption_args, parse_spin,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Handshaken,
    Ready,
    Terminated,
}

/// Identity and tunables announced during the handshake.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub engine_name: String,
    pub engine_author: String,
    pub policy: PolicyConfig,
    /// Declared `option` lines, in handshake order
    pub options: Vec<OptionDecl>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let policy = PolicyConfig::default();
        Self {
            engine_name: "ShogiLLM".to_string(),
            engine_author: "ShogiLLM".to_string(),
            options: default_options(policy.mate_horizon, DEFAULT_MAX_NEW_TOKENS),
            policy,
        }
    }
}

type Handler<R, O> = fn(&mut Session<R, O>, &[&str], &mut dyn Write) -> io::Result<()>;

/// One USI session over a rules backend `R` and a move oracle `O`.
pub struct Session<R: RulesEngine, O: MoveOracle> {
    state: SessionState,
    config: SessionConfig,
    options: EngineOptions,
    positions: PositionManager<R::Board>,
    policy: DecisionPolicy,
    rules: R,
    oracle: O,
    handlers: HashMap<&'static str, Handler<R, O>>,
}

impl<R: RulesEngine, O: MoveOracle> Session<R, O> {
    pub fn new(rules: R, oracle: O, config: SessionConfig) -> Self {
        let mut handlers: HashMap<&'static str, Handler<R, O>> = HashMap::new();
        handlers.insert("usi", Self::on_usi);
        handlers.insert("isready", Self::on_isready);
        handlers.insert("setoption", Self::on_setoption);
        handlers.insert("usinewgame", Self::on_usinewgame);
        handlers.insert("position", Self::on_position);
        handlers.insert("go", Self::on_go);
        handlers.insert("quit", Self::on_quit);

        Self {
            state: SessionState::Created,
            policy: DecisionPolicy::new(config.policy.clone()),
            config,
            options: EngineOptions::new(),
            positions: PositionManager::new(),
            rules,
            oracle,
            handlers,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    pub fn positions(&self) -> &PositionManager<R::Board> {
        &self.positions
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Run the command loop until `quit` or end of input.
    ///
    /// Only a failure to write a response is returned as an error; a read
    /// error on the input is treated like end of input. Lines that are not
    /// valid UTF-8 are decoded lossily, so they end up as unknown commands.
    pub fn run<I: BufRead, W: Write>(&mut self, mut input: I, output: &mut W) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match input.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "Failed to read command, closing session");
                    break;
                }
            }
            let line = String::from_utf8_lossy(&buf);
            self.handle_line(line.trim_end_matches(['\r', '\n']), output)?;
            if self.is_terminated() {
                break;
            }
        }
        if !self.is_terminated() {
            debug!("End of input");
            self.state = SessionState::Terminated;
        }
        info!("Session terminated");
        Ok(())
    }

    /// Handle a single command line. Unknown commands are ignored.
    pub fn handle_line(&mut self, line: &str, output: &mut dyn Write) -> io::Result<()> {
        if self.is_terminated() {
            return Ok(());
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&cmd, args)) = parts.split_first() else {
            return Ok(());
        };

        match self.handlers.get(cmd).copied() {
            Some(handler) => {
                debug!(%cmd, "Handling command");
                handler(self, args, output)
            }
            None => {
                debug!(%cmd, "Ignoring unknown command");
                Ok(())
            }
        }
    }

    fn on_usi(&mut self, _args: &[&str], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "id name {}", self.config.engine_name)?;
        writeln!(out, "id author {}", self.config.engine_author)?;
        for option in &self.config.options {
            writeln!(out, "{option}")?;
        }
        writeln!(out, "usiok")?;
        out.flush()?;
        if self.state == SessionState::Created {
            self.state = SessionState::Handshaken;
        }
        Ok(())
    }

    fn on_isready(&mut self, _args: &[&str], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()?;
        if self.state == SessionState::Handshaken {
            self.state = SessionState::Ready;
            for (name, value) in self.options.iter() {
                debug!(%name, %value, "Option in effect");
            }
        }
        Ok(())
    }

    fn on_setoption(&mut self, args: &[&str], _out: &mut dyn Write) -> io::Result<()> {
        if self.state == SessionState::Created {
            warn!("setoption before usi handshake, ignored");
            return Ok(());
        }
        let Some((name, value)) = parse_setoption_args(args) else {
            warn!(args = ?args, "Malformed setoption");
            return Ok(());
        };

        if name.eq_ignore_ascii_case(OPTION_MATE_PLY) {
            match parse_spin(&value, &MATE_PLY_RANGE) {
                Some(plies) => self.policy.set_mate_horizon(plies),
                None => warn!(%value, "Invalid {OPTION_MATE_PLY}, keeping current horizon"),
            }
        } else if !self.oracle.set_option(&name, &value) {
            debug!(%name, "Option not used by the oracle");
        }

        info!(%name, %value, "Option set");
        self.options.set(&name, &value);
        Ok(())
    }

    fn on_usinewgame(&mut self, _args: &[&str], _out: &mut dyn Write) -> io::Result<()> {
        debug!("New game");
        Ok(())
    }

    fn on_position(&mut self, args: &[&str], out: &mut dyn Write) -> io::Result<()> {
        let result = parse_position_args(args)
            .and_then(|cmd| self.positions.establish(&mut self.rules, &cmd).map(|_| ()));
        if let Err(e) = result {
            warn!(error = %e, "Position command rejected");
            writeln!(out, "info string {e}")?;
            out.flush()?;
        }
        Ok(())
    }

    fn on_go(&mut self, _args: &[&str], out: &mut dyn Write) -> io::Result<()> {
        let position = match self.positions.current() {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "go without a position, resigning");
                writeln!(out, "info string {e}")?;
                writeln!(out, "{}", bestmove_line(None))?;
                return out.flush();
            }
        };

        let decision = self.policy.decide(&mut self.rules, &mut self.oracle, position);
        info!(
            provenance = %decision.provenance,
            best_move = decision.best_move.as_deref().unwrap_or("resign"),
            score = ?decision.score,
            diagnostic = decision.diagnostic.as_deref().unwrap_or(""),
            "Decision"
        );

        for line in decision_lines(&decision) {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }

    fn on_quit(&mut self, _args: &[&str], _out: &mut dyn Write) -> io::Result<()> {
        self.state = SessionState::Terminated;
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
