//! Direct adapter over the argument parser
//!
//! Builds a `clap` command from the registered flag descriptors, parses the
//! raw tokens, then resolves every flag once into a value plus a provenance
//! fact. Environment variables are applied here (not by the parser) so the
//! lookup stays injectable and the provenance stays exact.

use crate::env::EnvLookup;
use crate::error::{Error, Result};
use crate::flag::{FlagKind, FlagSpec, FlagValue};
use crate::source::FlagValueSource;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction};
use std::collections::HashMap;
use std::time::Duration;

const POSITIONAL_ID: &str = "__args";

/// Which layer produced a flag's resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provenance {
    CommandLine,
    EnvVar,
    Default,
}

#[derive(Debug, Clone)]
struct ResolvedFlag {
    value: FlagValue,
    provenance: Provenance,
}

/// Parse result over one set of raw arguments.
///
/// Each registered flag holds exactly one resolved value: the command-line
/// value if the flag was supplied, else the environment variable's parsed
/// value, else the compiled-in default. A set-but-empty environment variable
/// counts as unset.
#[derive(Debug)]
pub struct ArgSource {
    flags: HashMap<String, ResolvedFlag>,
    positional: Vec<String>,
}

impl ArgSource {
    /// Parse `args` against `specs`.
    ///
    /// Fails on unrecognized or malformed tokens and on environment-variable
    /// values that do not parse as the flag's semantic type.
    pub fn parse(
        command_name: &str,
        about: &str,
        specs: &[FlagSpec],
        args: &[String],
        env: &dyn EnvLookup,
    ) -> Result<Self> {
        let parser = build_parser(command_name, about, specs);
        let matches = parser.try_get_matches_from(args)?;

        let mut flags = HashMap::with_capacity(specs.len());
        for spec in specs {
            let resolved = if matches.value_source(&spec.name) == Some(ValueSource::CommandLine) {
                ResolvedFlag { value: cli_value(&matches, spec), provenance: Provenance::CommandLine }
            } else if let Some(raw) = env_value_for(spec, env) {
                ResolvedFlag { value: parse_env_value(spec, &raw)?, provenance: Provenance::EnvVar }
            } else {
                ResolvedFlag { value: spec.effective_default(), provenance: Provenance::Default }
            };
            flags.insert(spec.name.clone(), resolved);
        }

        let positional = matches
            .get_many::<String>(POSITIONAL_ID)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();

        Ok(Self { flags, positional })
    }

    /// Source for a command whose argument parsing is skipped.
    ///
    /// The raw tokens pass through as positionals untouched, so unrecognized
    /// flag syntax can never fail. Environment variables and defaults still
    /// apply.
    pub fn unparsed(specs: &[FlagSpec], args: &[String], env: &dyn EnvLookup) -> Result<Self> {
        let mut flags = HashMap::with_capacity(specs.len());
        for spec in specs {
            let resolved = if let Some(raw) = env_value_for(spec, env) {
                ResolvedFlag { value: parse_env_value(spec, &raw)?, provenance: Provenance::EnvVar }
            } else {
                ResolvedFlag { value: spec.effective_default(), provenance: Provenance::Default }
            };
            flags.insert(spec.name.clone(), resolved);
        }
        Ok(Self { flags, positional: args.to_vec() })
    }

    fn provenance(&self, name: &str) -> Option<Provenance> {
        self.flags.get(name).map(|f| f.provenance)
    }
}

impl FlagValueSource for ArgSource {
    fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    fn is_set(&self, name: &str) -> bool {
        self.provenance(name) == Some(Provenance::CommandLine)
    }

    fn is_default_value_set(&self, name: &str) -> bool {
        self.provenance(name) == Some(Provenance::Default)
    }

    fn is_env_var_set(&self, name: &str) -> bool {
        self.provenance(name) == Some(Provenance::EnvVar)
    }

    fn num_flags(&self) -> usize {
        self.flags.values().filter(|f| f.provenance == Provenance::CommandLine).count()
    }

    fn positional_args(&self) -> &[String] {
        &self.positional
    }

    fn int(&self, name: &str) -> i64 {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::Int(v)) => *v,
            _ => 0,
        }
    }

    fn duration(&self, name: &str) -> Duration {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::Duration(v)) => *v,
            _ => Duration::ZERO,
        }
    }

    fn float(&self, name: &str) -> f64 {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::Float(v)) => *v,
            _ => 0.0,
        }
    }

    fn string(&self, name: &str) -> String {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::Str(v)) => v.clone(),
            _ => String::new(),
        }
    }

    fn string_list(&self, name: &str) -> Vec<String> {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::StringList(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    fn int_list(&self, name: &str) -> Vec<i64> {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::IntList(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    fn bool(&self, name: &str) -> bool {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::Bool(v)) => *v,
            _ => false,
        }
    }

    fn bool_t(&self, name: &str) -> bool {
        match self.flags.get(name).map(|f| &f.value) {
            Some(FlagValue::Bool(v)) => *v,
            _ => true,
        }
    }

    fn value(&self, name: &str) -> Option<FlagValue> {
        self.flags.get(name).map(|f| f.value.clone())
    }
}

fn build_parser(name: &str, about: &str, specs: &[FlagSpec]) -> clap::Command {
    let mut cmd = clap::Command::new(name.to_string()).no_binary_name(true);
    if !about.is_empty() {
        cmd = cmd.about(about.to_string());
    }

    for spec in specs {
        let mut arg = Arg::new(spec.name.clone()).long(spec.name.clone());
        if !spec.usage.is_empty() {
            arg = arg.help(spec.usage.clone());
        }
        arg = match spec.kind {
            FlagKind::Int => arg.action(ArgAction::Set).value_parser(clap::value_parser!(i64)),
            FlagKind::Duration => arg.action(ArgAction::Set).value_parser(parse_duration_token),
            FlagKind::Float => arg.action(ArgAction::Set).value_parser(clap::value_parser!(f64)),
            FlagKind::String => {
                arg.action(ArgAction::Set).value_parser(clap::value_parser!(String))
            }
            FlagKind::StringList => {
                arg.action(ArgAction::Append).value_parser(clap::value_parser!(String))
            }
            FlagKind::IntList => {
                arg.action(ArgAction::Append).value_parser(clap::value_parser!(i64))
            }
            FlagKind::Bool => arg.action(ArgAction::SetTrue),
            FlagKind::BoolTrue => arg.action(ArgAction::SetFalse),
        };
        cmd = cmd.arg(arg);
    }

    cmd.arg(Arg::new(POSITIONAL_ID).value_name("ARGS").num_args(0..).help("Positional arguments"))
}

fn parse_duration_token(token: &str) -> std::result::Result<Duration, String> {
    humantime::parse_duration(token).map_err(|e| e.to_string())
}

fn env_value_for(spec: &FlagSpec, env: &dyn EnvLookup) -> Option<String> {
    spec.env_var.as_deref().and_then(|var| env.get(var)).filter(|v| !v.is_empty())
}

fn cli_value(matches: &clap::ArgMatches, spec: &FlagSpec) -> FlagValue {
    match spec.kind {
        FlagKind::Int => FlagValue::Int(matches.get_one::<i64>(&spec.name).copied().unwrap_or(0)),
        FlagKind::Duration => FlagValue::Duration(
            matches.get_one::<Duration>(&spec.name).copied().unwrap_or(Duration::ZERO),
        ),
        FlagKind::Float => {
            FlagValue::Float(matches.get_one::<f64>(&spec.name).copied().unwrap_or(0.0))
        }
        FlagKind::String => {
            FlagValue::Str(matches.get_one::<String>(&spec.name).cloned().unwrap_or_default())
        }
        FlagKind::StringList => FlagValue::StringList(
            matches
                .get_many::<String>(&spec.name)
                .map(|v| v.cloned().collect())
                .unwrap_or_default(),
        ),
        FlagKind::IntList => FlagValue::IntList(
            matches.get_many::<i64>(&spec.name).map(|v| v.copied().collect()).unwrap_or_default(),
        ),
        FlagKind::Bool | FlagKind::BoolTrue => FlagValue::Bool(matches.get_flag(&spec.name)),
    }
}

fn parse_env_value(spec: &FlagSpec, raw: &str) -> Result<FlagValue> {
    let fail = |reason: String| Error::EnvVar {
        flag: spec.name.clone(),
        var: spec.env_var.clone().unwrap_or_default(),
        value: raw.to_string(),
        reason,
    };

    match spec.kind {
        FlagKind::Int => {
            raw.trim().parse::<i64>().map(FlagValue::Int).map_err(|e| fail(e.to_string()))
        }
        FlagKind::Duration => humantime::parse_duration(raw.trim())
            .map(FlagValue::Duration)
            .map_err(|e| fail(e.to_string())),
        FlagKind::Float => {
            raw.trim().parse::<f64>().map(FlagValue::Float).map_err(|e| fail(e.to_string()))
        }
        FlagKind::String => Ok(FlagValue::Str(raw.to_string())),
        FlagKind::StringList => Ok(FlagValue::StringList(
            raw.split(',').map(|s| s.trim().to_string()).collect(),
        )),
        FlagKind::IntList => raw
            .split(',')
            .map(|s| s.trim().parse::<i64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(FlagValue::IntList)
            .map_err(|e| fail(e.to_string())),
        FlagKind::Bool | FlagKind::BoolTrue => parse_boolish(raw)
            .map(FlagValue::Bool)
            .ok_or_else(|| fail("expected a boolean value".to_string())),
    }
}

fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_line_provenance() {
        let specs = vec![FlagSpec::int("port").default_value(FlagValue::Int(8080))];
        let source =
            ArgSource::parse("serve", "", &specs, &args(&["--port", "9000"]), &MapEnv::new())
                .expect("parse");

        assert_eq!(source.int("port"), 9000);
        assert!(source.is_set("port"));
        assert!(!source.is_default_value_set("port"));
        assert!(!source.is_env_var_set("port"));
        assert_eq!(source.num_flags(), 1);
    }

    #[test]
    fn test_env_var_provenance() {
        let specs = vec![FlagSpec::int("port").env_var("SERVE_PORT")];
        let env = MapEnv::new().set("SERVE_PORT", "7000");
        let source = ArgSource::parse("serve", "", &specs, &args(&[]), &env).expect("parse");

        assert_eq!(source.int("port"), 7000);
        assert!(!source.is_set("port"));
        assert!(source.is_env_var_set("port"));
        assert_eq!(source.num_flags(), 0);
    }

    #[test]
    fn test_command_line_outranks_env_var() {
        let specs = vec![FlagSpec::int("port").env_var("SERVE_PORT")];
        let env = MapEnv::new().set("SERVE_PORT", "7000");
        let source =
            ArgSource::parse("serve", "", &specs, &args(&["--port", "9000"]), &env).expect("parse");

        assert_eq!(source.int("port"), 9000);
        assert!(source.is_set("port"));
        assert!(!source.is_env_var_set("port"));
    }

    #[test]
    fn test_empty_env_var_counts_as_unset() {
        let specs = vec![FlagSpec::int("port").default_value(FlagValue::Int(8080)).env_var("P")];
        let env = MapEnv::new().set("P", "");
        let source = ArgSource::parse("serve", "", &specs, &args(&[]), &env).expect("parse");

        assert_eq!(source.int("port"), 8080);
        assert!(source.is_default_value_set("port"));
        assert!(!source.is_env_var_set("port"));
    }

    #[test]
    fn test_malformed_env_value_is_an_error() {
        let specs = vec![FlagSpec::int("port").env_var("P")];
        let env = MapEnv::new().set("P", "not-a-number");
        let err = ArgSource::parse("serve", "", &specs, &args(&[]), &env).unwrap_err();
        assert!(matches!(err, Error::EnvVar { .. }));
    }

    #[test]
    fn test_unrecognized_flag_is_an_error() {
        let specs = vec![FlagSpec::int("port")];
        let err =
            ArgSource::parse("serve", "", &specs, &args(&["--break"]), &MapEnv::new()).unwrap_err();
        assert!(matches!(err, Error::ArgumentParse(_)));
    }

    #[test]
    fn test_unparsed_passes_tokens_through() {
        let specs = vec![FlagSpec::int("port").default_value(FlagValue::Int(8080))];
        let source =
            ArgSource::unparsed(&specs, &args(&["blah", "blah", "--break"]), &MapEnv::new())
                .expect("unparsed");

        assert_eq!(source.positional_args(), &args(&["blah", "blah", "--break"])[..]);
        assert_eq!(source.int("port"), 8080);
        assert!(source.is_default_value_set("port"));
    }

    #[test]
    fn test_positional_arguments_are_captured() {
        let specs = vec![FlagSpec::string("mode")];
        let source =
            ArgSource::parse("serve", "", &specs, &args(&["--mode", "fast", "a", "b"]), &MapEnv::new())
                .expect("parse");
        assert_eq!(source.positional_args(), &args(&["a", "b"])[..]);
    }

    #[test]
    fn test_typed_getters_and_unknown_flags() {
        let specs = vec![
            FlagSpec::duration("timeout"),
            FlagSpec::string_list("tag"),
            FlagSpec::int_list("port"),
            FlagSpec::bool("verbose"),
            FlagSpec::bool_true("color"),
        ];
        let tokens = args(&[
            "--timeout", "5s", "--tag", "a", "--tag", "b", "--port", "1", "--port", "2",
            "--verbose",
        ]);
        let source = ArgSource::parse("serve", "", &specs, &tokens, &MapEnv::new()).expect("parse");

        assert_eq!(source.duration("timeout"), Duration::from_secs(5));
        assert_eq!(source.string_list("tag"), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(source.int_list("port"), vec![1, 2]);
        assert!(source.bool("verbose"));
        assert!(source.bool_t("color"));

        // Unknown flags resolve to the type's zero value, never an error.
        assert_eq!(source.int("missing"), 0);
        assert_eq!(source.string("missing"), "");
        assert!(!source.bool("missing"));
        assert!(source.bool_t("missing"));
        assert!(!source.has_flag("missing"));
        assert_eq!(source.value("missing"), None);
    }

    #[test]
    fn test_bool_true_flag_turns_off_when_supplied() {
        let specs = vec![FlagSpec::bool_true("color")];
        let on = ArgSource::parse("serve", "", &specs, &args(&[]), &MapEnv::new()).expect("parse");
        assert!(on.bool_t("color"));

        let off = ArgSource::parse("serve", "", &specs, &args(&["--color"]), &MapEnv::new())
            .expect("parse");
        assert!(!off.bool_t("color"));
        assert!(off.is_set("color"));
    }

    #[test]
    fn test_env_var_list_values_split_on_commas() {
        let specs = vec![
            FlagSpec::string_list("tag").env_var("TAGS"),
            FlagSpec::int_list("port").env_var("PORTS"),
        ];
        let env = MapEnv::new().set("TAGS", "a, b,c").set("PORTS", "1,2, 3");
        let source = ArgSource::parse("serve", "", &specs, &args(&[]), &env).expect("parse");

        assert_eq!(source.string_list("tag"), vec!["a", "b", "c"]);
        assert_eq!(source.int_list("port"), vec![1, 2, 3]);
    }
}
