//! Command-line argument definitions using clap derive macros.

use clap::{Parser, Subcommand};

const EXAMPLES: &str = "\
Languages:
  go, java, node, perl, python, raku, ruby, solr

Examples:
  tinyenv versions
  tinyenv python install -l
  tinyenv python install 3.9.19+20240814
  tinyenv python install latest
  tinyenv python global 3.12.5+20240814";

/// tinyenv - a tiny version manager for many languages
#[derive(Parser, Debug)]
#[command(name = "tinyenv")]
#[command(version)]
#[command(about = "A tiny version manager for many languages", long_about = None)]
#[command(after_help = EXAMPLES)]
#[command(override_usage = "tinyenv <COMMAND>\n       tinyenv <LANGUAGE> <COMMAND> [ARGS]...")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the root directory
    Root,

    /// Show the active version of every language
    Version,

    /// List installed versions of every language
    Versions,

    /// Regenerate shims for every language with an active version
    Rehash,

    /// Compare the newest upstream release of every language with what is installed
    Latest,

    /// Show version pointers and cached archives
    Files,

    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },

    /// Per-language commands: tinyenv <LANGUAGE> <COMMAND>
    #[command(external_subcommand)]
    Language(Vec<String>),
}

/// Arguments after `tinyenv <language>`
#[derive(Parser, Debug)]
#[command(name = "tinyenv <LANGUAGE>")]
#[command(no_binary_name = true)]
pub struct LanguageCli {
    #[command(subcommand)]
    pub command: LanguageCommand,
}

#[derive(Subcommand, Debug)]
pub enum LanguageCommand {
    /// List installed versions, marking the active one
    Versions {
        /// One version per line, no marker
        #[arg(long)]
        bare: bool,
    },

    /// Print the active version
    Version,

    /// Activate an installed version
    Global {
        /// Installed version
        version: String,
    },

    /// Regenerate shims for the active version
    Rehash,

    /// Install a version, or list installable versions
    Install {
        /// List recent installable versions
        #[arg(short = 'l', conflicts_with_all = ["list_all", "global", "version"])]
        list: bool,

        /// List every installable version
        #[arg(short = 'L', conflicts_with_all = ["global", "version"])]
        list_all: bool,

        /// Activate the version after installing
        #[arg(short, long)]
        global: bool,

        /// Version to install, or `latest`
        #[arg(required_unless_present_any = ["list", "list_all"])]
        version: Option<String>,
    },

    /// Re-extract an installed version from its cached archive (`-` for the active one)
    Reset {
        /// Installed version or `-`
        #[arg(allow_hyphen_values = true)]
        version: String,
    },

    /// Anything else runs the `tinyenv-<COMMAND>` plugin
    #[command(external_subcommand)]
    Plugin(Vec<String>),
}
