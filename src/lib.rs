//! flagstack: layered flag-value resolution for command-line programs
//!
//! Resolves the final value of a named flag from up to four sources with a
//! fixed precedence: explicit command-line argument > environment variable >
//! overlay file entry > compiled-in default. The overlay is a flat key/value
//! file (YAML, TOML, or JSON) named via the reserved `--load <path>` flag.
//!
//! Argument tokenizing and parsing are delegated to `clap`; this crate owns
//! the precedence layer on top of the parse result.
//!
//! ```
//! use flagstack::{Command, FlagSpec, FlagValue, MapEnv};
//!
//! let cmd = Command::new("serve")
//!     .usage("start the server")
//!     .flag(FlagSpec::int("port").default_value(FlagValue::Int(8080)).env_var("SERVE_PORT"))
//!     .action(|ctx| {
//!         assert_eq!(ctx.int("port"), 9000);
//!     });
//!
//! let args = vec!["--port".to_string(), "9000".to_string()];
//! cmd.run_with_env(&args, &MapEnv::new())?;
//! # Ok::<(), flagstack::Error>(())
//! ```

pub mod command;
pub mod context;
pub mod env;
pub mod error;
pub mod flag;
pub mod overlay;
pub mod source;

pub use command::{Command, LOAD_FLAG};
pub use context::ExecutionContext;
pub use env::{EnvLookup, MapEnv, ProcessEnv};
pub use error::{Error, Result};
pub use flag::{FlagKind, FlagSpec, FlagValue};
pub use overlay::{load_overlay, OverlayMap, OverlayResolver};
pub use source::{ArgSource, FlagValueSource};
