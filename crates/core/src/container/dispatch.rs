use super::{ContainerState, Dispatch, ModusContainer, MODUS_PREFIX, SYLL_PREFIX};
use crate::{CommandError, CommandResult, ConfigError, Continuation, ErrorKind, Lookup};

pub(crate) const RECOVERY_NOTICE: &str =
    "Resetting modus to recover from a fatal error. Please reload deck.";
pub(crate) const CATASTROPHIC_NOTICE: &str =
    "!!!catastrophic modus error!!!\nPlease select a different modus.";

/// Strips `prefix` from the front of `input`, ignoring ASCII case.
pub fn strip_prefix_ci<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let head = input.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&input[prefix.len()..])
    } else {
        None
    }
}

/// `takeOutCard 2, weapons` -> (`takeOutCard`, [`2`, `weapons`]).
pub fn split_command(line: &str) -> (&str, Vec<String>) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (
            command,
            rest.split(',').map(|arg| arg.trim().to_string()).collect(),
        ),
        None => (line, Vec::new()),
    }
}

fn error_line(err: &CommandError) -> String {
    let message = err.to_string();
    format!("ERROR - {}.", message.trim_end_matches('.'))
}

impl ModusContainer {
    /// Routes one submitted line. A pending continuation always takes the
    /// line first; otherwise `syll.` lines go to the host commands and
    /// `modus.` lines to the active modus.
    pub fn handle_input(&mut self, raw: &str) -> Dispatch {
        let line = raw.trim();
        if let Some(pending) = self.buffer.take_redirector() {
            return self.resume(pending, line);
        }
        if let Some(rest) = strip_prefix_ci(line, SYLL_PREFIX) {
            return self.run_host_command(rest);
        }
        match strip_prefix_ci(line, MODUS_PREFIX) {
            Some(rest) => self.run_modus_command(rest),
            None => Dispatch::Ignored,
        }
    }

    fn resume(&mut self, pending: Continuation, line: &str) -> Dispatch {
        self.buffer.set_modus_input(line);
        let Some(modus) = self.active.as_mut() else {
            return Dispatch::Rejected;
        };
        tracing::debug!(continuation = ?pending, "resuming continuation");
        let (result, syntax) = match pending {
            Continuation::Load => (modus.load(&mut self.buffer), None),
            Continuation::Command { name, mut args } => {
                args.push(line.to_string());
                let result = modus.execute(&name, &args, &mut self.buffer);
                (result, modus.syntax_for(&name))
            }
            Continuation::Step { step, data } => (modus.resume(&step, &data, &mut self.buffer), None),
        };
        if result.is_ok() {
            self.sync();
        }
        self.settle(result, Dispatch::Resumed, syntax)
    }

    fn run_modus_command(&mut self, rest: &str) -> Dispatch {
        if !self.input_enabled {
            self.buffer.writeln("Please select a different modus.");
            return Dispatch::Rejected;
        }
        let Some(modus) = self.active.as_mut() else {
            self.buffer.writeln("ERROR - No modus selected.");
            return Dispatch::Rejected;
        };
        self.buffer.set_modus_input(rest.trim());
        let (command, args) = split_command(rest);
        let result = modus.execute(command, &args, &mut self.buffer);
        let syntax = match &result {
            Err(CommandError::IllegalSyntax(_)) => modus.syntax_for(command),
            _ => None,
        };
        if result.is_ok() {
            self.sync();
        }
        self.settle(result, Dispatch::Executed, syntax)
    }

    fn run_host_command(&mut self, rest: &str) -> Dispatch {
        let (command, args) = split_command(rest);
        let Some(resolved) = self.host_commands.resolve(command) else {
            let err = CommandError::NoSuchCommand(command.to_string());
            return self.settle(Err(err), Dispatch::Executed, None);
        };
        let handler = resolved.entry.handler;
        let syntax = resolved.entry.description.clone();
        let assumed = match resolved.lookup {
            Lookup::Fuzzy => resolved.key.map(str::to_string),
            _ => None,
        };
        if let Some(key) = assumed {
            self.buffer.writeln(&format!("Assuming `{key}`."));
        }
        tracing::info!(command, "running sylladex command");
        let result = handler(self, &args);
        self.settle(result, Dispatch::Executed, Some(syntax))
    }

    /// Copies the modus' storage into the deck and redraws when the command
    /// changed that storage and the modus is not waiting on more input.
    pub(super) fn sync(&mut self) {
        let changed = self.buffer.take_changed();
        if !changed || self.buffer.pending().is_some() {
            return;
        }
        if let Some(modus) = self.active.as_mut() {
            modus.save(&mut self.buffer);
            modus.draw(&mut self.buffer);
        }
    }

    /// Turns a command result into output text and, for fatal failures, a reset.
    pub(super) fn settle(
        &mut self,
        result: CommandResult,
        success: Dispatch,
        syntax: Option<String>,
    ) -> Dispatch {
        let err = match result {
            Ok(()) => return success,
            Err(err) => err,
        };
        self.buffer.take_changed();
        let kind = err.kind();
        tracing::debug!(%kind, error = %err, "command failed");
        match kind {
            ErrorKind::IllegalSyntax => {
                self.buffer.writeln(&error_line(&err));
                if let Some(syntax) = syntax {
                    self.buffer.writeln(&format!("Syntax: {syntax}"));
                }
            }
            ErrorKind::CommandRuntime => {
                self.buffer.writeln(&error_line(&err));
                self.buffer.clear_redirector();
            }
            ErrorKind::FatalModus => return self.recover(&err),
            ErrorKind::NoSuchCommand | ErrorKind::Configuration => {
                self.buffer.writeln(&error_line(&err));
            }
        }
        Dispatch::Failed(kind)
    }

    fn recover(&mut self, err: &CommandError) -> Dispatch {
        tracing::warn!(error = %err, "fatal modus failure; resetting");
        self.state = ContainerState::Recovering;
        self.buffer.writeln(RECOVERY_NOTICE);
        match self.reset_modus() {
            Ok(()) => {
                self.state = ContainerState::Active;
                let _ = self.request_draw();
                Dispatch::Recovered
            }
            Err(reset_err) => self.catastrophic(&reset_err),
        }
    }

    fn catastrophic(&mut self, err: &ConfigError) -> Dispatch {
        tracing::error!(error = %err, "modus reset failed; unloading modus");
        self.active = None;
        self.active_candidate = None;
        self.state = ContainerState::Unloaded;
        self.input_enabled = false;
        self.buffer.clear_redirector();
        self.buffer.take_modus_input();
        self.buffer.clear_display();
        self.buffer.writeln(CATASTROPHIC_NOTICE);
        Dispatch::Catastrophic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! split_case {
        ($name:ident, $line:expr, $command:expr, [$($arg:expr),*]) => {
            #[test]
            fn $name() {
                let (command, args) = split_command($line);
                assert_eq!(command, $command);
                let expected: Vec<String> = vec![$($arg.to_string()),*];
                assert_eq!(args, expected);
            }
        };
    }

    split_case!(split_single_arg, "capture sword", "capture", ["sword"]);
    split_case!(split_two_args, "takeOutCard 2, weapons", "takeOutCard", ["2", "weapons"]);
    split_case!(split_no_args, "save", "save", []);
    split_case!(split_trims_padding, "  capture   iron sword  ", "capture", ["iron sword"]);
    split_case!(split_keeps_empty_args, "takeOutCard 2,", "takeOutCard", ["2", ""]);

    macro_rules! prefix_case {
        ($name:ident, $input:expr, $prefix:expr, $expected:expr) => {
            #[test]
            fn $name() {
                assert_eq!(strip_prefix_ci($input, $prefix), $expected);
            }
        };
    }

    prefix_case!(prefix_exact, "modus.save", MODUS_PREFIX, Some("save"));
    prefix_case!(prefix_upper, "MODUS.save", MODUS_PREFIX, Some("save"));
    prefix_case!(prefix_mixed_syll, "Syll.help", SYLL_PREFIX, Some("help"));
    prefix_case!(prefix_missing, "save", MODUS_PREFIX, None);
    prefix_case!(prefix_too_short, "mod", MODUS_PREFIX, None);
    prefix_case!(prefix_multibyte, "mödus.save", MODUS_PREFIX, None);

    #[test]
    fn error_line_avoids_double_period() {
        let err = CommandError::runtime("command entered not understood.");
        assert_eq!(error_line(&err), "ERROR - command entered not understood.");
        let err = CommandError::arg_count(3);
        assert_eq!(error_line(&err), "ERROR - 3 is an invalid number of arguments.");
    }
}
