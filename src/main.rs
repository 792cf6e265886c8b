//! # SourceKit Bridge CLI (`skb`)
//!
//! Inspect and exercise the request/response bridge without a live engine.
//!
//! ## Usage
//!
//! ```bash
//! skb --config ./config/skb.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `skb request <kind> ...` | Print the wire object a request encodes to, as JSON |
//! | `skb replay <fixture> <kind> ...` | Send a request through a session backed by a fixture, print the decoded value |
//! | `skb completions <shell>` | Generate shell completions |
//!
//! ## Examples
//!
//! ```bash
//! # What does a cursor-info request look like on the wire?
//! skb request cursor-info --file main.swift --offset 42 -- -sdk /sdk main.swift
//!
//! # Replay a recorded interruption followed by a restoration
//! skb replay interrupted.json index --file main.swift
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sourcekit_bridge::config::{self, Config};
use sourcekit_bridge::fixture::wire_from_json;
use sourcekit_bridge::logging;
use sourcekit_bridge::replay::ReplayEngine;
use sourcekit_bridge::request::{Request, RequestBuilder, SourceFile};
use sourcekit_bridge::session::Session;

/// SourceKit Bridge CLI: typed requests to the SourceKit analysis engine.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "skb",
    about = "SourceKit Bridge: typed requests to the SourceKit analysis engine",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/skb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the wire object for a request as JSON.
    Request {
        #[command(subcommand)]
        request: RequestCommand,
    },

    /// Send a request to an engine replaying a fixture file.
    ///
    /// Prints the decoded response as JSON. Engine errors are reported on
    /// stderr and exit non-zero.
    Replay {
        /// Fixture file listing the engine's responses in order.
        fixture: PathBuf,

        /// Use the best-effort send, which aborts on any engine error.
        #[arg(long)]
        best_effort: bool,

        #[command(subcommand)]
        request: RequestCommand,
    },

    /// Generate shell completions.
    Completions {
        shell: Shell,
    },
}

/// Request kinds. Arguments after `--` are passed to the compiler.
#[derive(Subcommand)]
enum RequestCommand {
    /// Open a file, by path or by its text.
    Open {
        #[arg(long, conflicts_with = "text", required_unless_present = "text")]
        file: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Symbol information at a byte offset.
    CursorInfo {
        #[arg(long)]
        file: String,
        #[arg(long)]
        offset: i64,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Code completion at a byte offset.
    Complete {
        #[arg(long)]
        file: String,
        #[arg(long)]
        offset: i64,
        /// Buffer contents. Defaults to the file's contents on disk.
        #[arg(long)]
        contents: Option<String>,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Generated interface of an Objective-C header.
    Interface {
        #[arg(long)]
        file: String,
        /// Interface name. Defaults to a fresh UUID.
        #[arg(long)]
        name: Option<String>,
    },
    /// Locate a symbol by USR.
    FindUsr {
        #[arg(long)]
        file: String,
        #[arg(long)]
        usr: String,
    },
    /// Index a source file.
    Index {
        #[arg(long)]
        file: String,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Format one line. Indentation defaults come from `[format]`.
    Format {
        #[arg(long)]
        file: String,
        #[arg(long)]
        line: i64,
        #[arg(long)]
        indent_width: Option<i64>,
        /// Indent with tabs.
        #[arg(long, overrides_with = "no_use_tabs")]
        use_tabs: bool,
        /// Indent with spaces, even if `[format]` says tabs.
        #[arg(long, overrides_with = "use_tabs")]
        no_use_tabs: bool,
    },
    /// Replace a byte range of an open file.
    ReplaceText {
        #[arg(long)]
        file: String,
        #[arg(long)]
        offset: i64,
        #[arg(long)]
        length: i64,
        #[arg(long)]
        text: String,
    },
    /// Generated interface of a module.
    ModuleInfo {
        #[arg(long)]
        module: String,
        /// Interface name. Defaults to a fresh UUID.
        #[arg(long)]
        name: Option<String>,
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// A hand-written request object, read from a JSON file.
    Custom {
        #[arg(long)]
        json: PathBuf,
    },
}

impl RequestCommand {
    fn into_request(self, cfg: &Config) -> Result<Request> {
        let request = match self {
            RequestCommand::Open { file, text } => Request::EditorOpen {
                file: match file {
                    Some(path) => SourceFile::at_path(path, String::new()),
                    None => SourceFile::text(text.unwrap_or_default()),
                },
            },
            RequestCommand::CursorInfo { file, offset, args } => Request::CursorInfo {
                file,
                offset,
                arguments: args,
            },
            RequestCommand::Complete {
                file,
                offset,
                contents,
                args,
            } => {
                let contents = match contents {
                    Some(text) => text,
                    None => std::fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read source file: {}", file))?,
                };
                Request::CodeCompletion {
                    file,
                    contents,
                    offset,
                    arguments: args,
                }
            }
            RequestCommand::Interface { file, name } => Request::Interface {
                file,
                uuid: name.unwrap_or_else(fresh_name),
            },
            RequestCommand::FindUsr { file, usr } => Request::FindUsr { file, usr },
            RequestCommand::Index { file, args } => Request::Index {
                file,
                arguments: args,
            },
            RequestCommand::Format {
                file,
                line,
                indent_width,
                use_tabs,
                no_use_tabs,
            } => {
                let indent_width = indent_width.unwrap_or(cfg.format.indent_width);
                if indent_width < 1 {
                    anyhow::bail!("--indent-width must be >= 1");
                }
                Request::Format {
                    file,
                    line,
                    use_tabs: if use_tabs {
                        true
                    } else if no_use_tabs {
                        false
                    } else {
                        cfg.format.use_tabs
                    },
                    indent_width,
                }
            }
            RequestCommand::ReplaceText {
                file,
                offset,
                length,
                text,
            } => Request::ReplaceText {
                file,
                offset,
                length,
                source_text: text,
            },
            RequestCommand::ModuleInfo { module, name, args } => Request::ModuleInfo {
                module,
                arguments: args,
                session: name.unwrap_or_else(fresh_name),
            },
            RequestCommand::Custom { json } => Request::CustomRequest {
                request: read_custom_request(&json)?,
            },
        };
        Ok(request)
    }
}

fn fresh_name() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn read_custom_request(path: &Path) -> Result<sourcekit_bridge::request::WireObject> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request file: {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse request file: {}", path.display()))?;
    wire_from_json(&json).with_context(|| format!("Invalid request: {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "skb", &mut std::io::stdout());
        return Ok(());
    }

    let cfg = config::load_config_or_default(&cli.config)?;
    logging::init(&cfg.logging.level);

    match cli.command {
        Commands::Request { request } => {
            let request = request.into_request(&cfg)?;
            let builder = RequestBuilder::new(cfg.interface.sdk_path.clone());
            print_json(&builder.build(&request).to_json())?;
        }
        Commands::Replay {
            fixture,
            best_effort,
            request,
        } => {
            let request = request.into_request(&cfg)?;
            let engine = Arc::new(ReplayEngine::from_path(&fixture)?);
            let session = Session::new(engine, &cfg);
            let value = if best_effort {
                session.send(&request)
            } else {
                session
                    .send_failable(&request)
                    .with_context(|| format!("{} failed", request.kind()))?
            };
            print_json(&value.to_json())?;
        }
        Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
