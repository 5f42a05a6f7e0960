pub mod accounts;

use clap::{Args, Parser, Subcommand};

pub const DEFAULT_CONFIG_PATH: &str = "chatgate.toml";

#[derive(Parser)]
#[command(name = "chatgate")]
#[command(about = "Account gateway for a hosted chat service", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP gateway (default)
    Serve(ServeArgs),
    /// List local accounts and their verification state
    Accounts {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
        #[arg(long)]
        db_path: Option<String>,
    },
    /// Write a default config file
    InitConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        path: String,
    },
}

#[derive(Args, Default)]
pub struct ServeArgs {
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
    #[arg(long)]
    pub port: Option<u16>,
    #[arg(long)]
    pub db_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["chatgate", "serve", "--port", "9999", "--db-path", "/tmp/db"]);
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.config, DEFAULT_CONFIG_PATH);
                assert_eq!(args.port, Some(9999));
                assert_eq!(args.db_path.as_deref(), Some("/tmp/db"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["chatgate"]);
        assert!(cli.command.is_none());
    }
}
