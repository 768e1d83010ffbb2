//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::attributes::Protocol;
use crate::persist::DocumentFormat;

/// peerconf: address-keyed protocol peer configuration
///
/// Resolves SNMP or AMI connection attributes for IPv4 addresses from a
/// peer document, and applies live overrides and reloads to it.
#[derive(Debug, Parser)]
#[command(name = "peerconf")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run (default: serve)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the peer document
    #[arg(long, short, global = true)]
    pub document: Option<PathBuf>,

    /// Protocol the peer document configures
    #[arg(long, value_enum, global = true)]
    pub protocol: Option<ProtocolArg>,

    /// Peer document encoding (default: from the file extension)
    #[arg(long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Normalize the peer document every time it is loaded
    #[arg(long = "optimize-on-load", global = true)]
    pub optimize_on_load: bool,

    /// Document watch interval in seconds (serve only)
    #[arg(long = "poll-interval", global = true)]
    pub poll_interval: Option<u64>,

    /// Do not watch the document file for changes (serve only)
    #[arg(long = "no-watch", global = true)]
    pub no_watch: bool,

    /// Save the document after every reconfigure event (serve only)
    #[arg(long = "save-on-reconfigure", global = true)]
    pub save_on_reconfigure: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for peerconf
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file, and a peer document template
    /// when --document names a file that does not exist yet
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "peerconf.toml")]
        output: PathBuf,
    },

    /// Print the resolved attributes for each address
    Resolve {
        /// Addresses to resolve
        #[arg(required = true, value_name = "ADDRESS")]
        addresses: Vec<Ipv4Addr>,
    },

    /// Print the definitions in priority order
    List,

    /// Apply an override to one address or range and save the document
    Configure {
        /// First (or only) address
        #[arg(long)]
        first: Ipv4Addr,

        /// Last address of an inclusive range
        #[arg(long)]
        last: Option<Ipv4Addr>,

        /// Attribute override as an event parameter, e.g. communityString=lan
        /// (can be specified multiple times)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        assignments: Vec<String>,
    },

    /// Normalize the document and save it
    Optimize,

    /// Apply JSON-lines events from stdin and reload on document changes
    /// until interrupted
    Serve,
}

/// Protocol argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProtocolArg {
    /// SNMP agents
    #[value(name = "snmp")]
    Snmp,
    /// Asterisk Manager Interface
    #[value(name = "ami")]
    Ami,
}

impl From<ProtocolArg> for Protocol {
    fn from(arg: ProtocolArg) -> Self {
        match arg {
            ProtocolArg::Snmp => Self::Snmp,
            ProtocolArg::Ami => Self::Ami,
        }
    }
}

/// Document format argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// TOML document
    #[value(name = "toml")]
    Toml,
    /// JSON document
    #[value(name = "json")]
    Json,
}

impl From<FormatArg> for DocumentFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Toml => Self::Toml,
            FormatArg::Json => Self::Json,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns true if this is the init command.
    #[must_use]
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Some(Command::Init { .. }))
    }

    /// Returns the subcommand, defaulting to [`Command::Serve`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}
