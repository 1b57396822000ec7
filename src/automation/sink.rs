//! Command sink: turns resolved commands into key presses

use super::error::InjectionError;
use crate::recognition::CommandResolution;
use std::process::Command as ProcessCommand;

/// External collaborator that simulates a key press.
pub trait KeyInjector: Send + Sync {
    fn press(&self, key: &str) -> Result<(), InjectionError>;
}

/// Dry-run injector that only logs the key it would press.
#[derive(Debug, Default, Clone)]
pub struct LogKeyInjector;

impl KeyInjector for LogKeyInjector {
    fn press(&self, key: &str) -> Result<(), InjectionError> {
        log::info!("⌨️ (dry run) key '{}'", key);
        Ok(())
    }
}

/// Runs an external program with the key identifier appended,
/// e.g. `xdotool key` becomes `xdotool key left`.
#[derive(Debug, Clone)]
pub struct CommandKeyInjector {
    program: String,
    args: Vec<String>,
}

impl CommandKeyInjector {
    /// Split a whitespace separated command line into program and leading arguments.
    pub fn from_command_line(command_line: &str) -> Result<Self, InjectionError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(InjectionError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl KeyInjector for CommandKeyInjector {
    fn press(&self, key: &str) -> Result<(), InjectionError> {
        let status = ProcessCommand::new(&self.program)
            .args(&self.args)
            .arg(key)
            .status()
            .map_err(|source| InjectionError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(InjectionError::CommandFailed {
                program: self.program.clone(),
                status,
            })
        }
    }
}

/// Forwards mapped commands to the injector when key sending is enabled.
///
/// Injection failures are logged and swallowed; they never affect later cycles.
pub struct CommandSink {
    injector: Box<dyn KeyInjector>,
    send_keys: bool,
}

impl CommandSink {
    pub fn new(injector: Box<dyn KeyInjector>, send_keys: bool) -> Self {
        Self {
            injector,
            send_keys,
        }
    }

    pub fn set_send_keys(&mut self, send_keys: bool) {
        self.send_keys = send_keys;
    }

    pub fn send_keys(&self) -> bool {
        self.send_keys
    }

    /// Returns true when a key press was delivered.
    pub fn dispatch(&self, resolution: CommandResolution) -> bool {
        if !self.send_keys {
            return false;
        }
        let Some(command) = resolution.command() else {
            log::debug!("No key mapping for resolved command {}", resolution);
            return false;
        };
        match self.injector.press(command.key()) {
            Ok(()) => {
                log::debug!("⌨️ Sent key '{}' for {}", command.key(), command);
                true
            }
            Err(e) => {
                log::error!("❌ Key injection for {} failed: {}", command, e);
                false
            }
        }
    }
}
