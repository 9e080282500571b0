//! Command descriptor and execution sequence
//!
//! One invocation runs through a fixed sequence: parse arguments (unless
//! parsing is skipped), load the overlay file if enabled and requested,
//! build the execution context, invoke the action. A parse or overlay
//! failure aborts the run before any later stage.

use crate::context::ExecutionContext;
use crate::env::{EnvLookup, ProcessEnv};
use crate::error::Result;
use crate::flag::FlagSpec;
use crate::overlay::{load_overlay, OverlayResolver};
use crate::source::{ArgSource, FlagValueSource};
use clap::error::ErrorKind;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Reserved flag name designating the overlay file path. Registered only
/// when overlay loading is enabled for a command.
pub const LOAD_FLAG: &str = "load";

type Action = Box<dyn Fn(&ExecutionContext)>;

/// Descriptor for one runnable command: name, aliases, help texts, flag
/// descriptors, parsing/overlay policy, and the action to invoke.
pub struct Command {
    name: String,
    aliases: Vec<String>,
    usage: String,
    description: String,
    flags: Vec<FlagSpec>,
    skip_flag_parsing: bool,
    load_overlay: bool,
    action: Option<Action>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            usage: String::new(),
            description: String::new(),
            flags: Vec::new(),
            skip_flag_parsing: false,
            load_overlay: false,
            action: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an alias, builder-style.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Set the one-line usage text.
    pub fn usage(mut self, text: impl Into<String>) -> Self {
        self.usage = text.into();
        self
    }

    /// Set the longer description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Register a flag. Names must be unique within a command; `load` is
    /// reserved when overlay loading is enabled.
    pub fn flag(mut self, spec: FlagSpec) -> Self {
        self.flags.push(spec);
        self
    }

    /// Skip argument parsing entirely: raw tokens pass through as
    /// positionals and unrecognized flag syntax can never fail the run.
    pub fn skip_flag_parsing(mut self, skip: bool) -> Self {
        self.skip_flag_parsing = skip;
        self
    }

    /// Enable the `--load <path>` overlay flag for this command.
    pub fn load_overlay(mut self, enabled: bool) -> Self {
        self.load_overlay = enabled;
        self
    }

    /// Set the action invoked with the built context. Its outcome is the
    /// action's own responsibility; the runner does not inspect it.
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&ExecutionContext) + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Whether `name` matches this command's name or one of its aliases.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Run the command against `args`, reading environment variables from
    /// the process table.
    pub fn run(&self, args: &[String]) -> Result<()> {
        self.run_with_env(args, &ProcessEnv)
    }

    /// Run the command with an injected environment lookup.
    pub fn run_with_env(&self, args: &[String], env: &dyn EnvLookup) -> Result<()> {
        let source = if self.skip_flag_parsing {
            ensure_unique_names(&self.flags)?;
            ArgSource::unparsed(&self.flags, args, env)?
        } else {
            let specs = self.effective_flags()?;
            ArgSource::parse(&self.name, &self.usage, &specs, args, env)?
        };

        let overlay_path = if self.load_overlay { source.string(LOAD_FLAG) } else { String::new() };

        let context = if overlay_path.is_empty() {
            ExecutionContext::new(Box::new(source))
        } else {
            let overlay = load_overlay(Path::new(&overlay_path))?;
            debug!(command = %self.name, path = %overlay_path, "resolving flags through overlay");
            ExecutionContext::new(Box::new(OverlayResolver::new(source, overlay)))
        };

        if let Some(action) = &self.action {
            action(&context);
        }
        Ok(())
    }

    fn effective_flags(&self) -> Result<Vec<FlagSpec>> {
        ensure_unique_names(&self.flags)?;
        let mut specs = self.flags.clone();
        if self.load_overlay {
            if specs.iter().any(|s| s.name == LOAD_FLAG) {
                return Err(registration_error(format!(
                    "flag --{LOAD_FLAG} is reserved when overlay loading is enabled"
                )));
            }
            specs.push(
                FlagSpec::string(LOAD_FLAG).usage("Load flag values from a configuration file"),
            );
        }
        Ok(specs)
    }
}

fn ensure_unique_names(specs: &[FlagSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(registration_error(format!(
                "flag --{} is registered more than once",
                spec.name
            )));
        }
    }
    Ok(())
}

fn registration_error(message: String) -> crate::error::Error {
    clap::Error::raw(ErrorKind::ArgumentConflict, message).into()
}
