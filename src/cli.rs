use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-dwiqc",
    version,
    about = "Quality-control triage for diffusion-weighted MRI"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Validate(ValidateArgs),
    Protocol(ProtocolArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Recorded session JSON (header and checker measurements)")]
    pub input: PathBuf,

    #[arg(long, help = "Protocol JSON; the built-in default is used when omitted")]
    pub protocol: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false, help = "Skip the second pass over surviving gradients")]
    pub no_left: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Recorded session JSON")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct ProtocolArgs {
    #[command(subcommand)]
    pub command: ProtocolCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProtocolCommand {
    /// Print the built-in default protocol as JSON.
    Show,
}
