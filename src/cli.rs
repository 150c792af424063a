use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "clipfetch")]
#[command(about = "Audio extraction service for media URLs", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $CLIPFETCH_CONFIG, then config/clipfetch.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print metadata for a URL as JSON
    Probe(ProbeArgs),
    /// Check that yt-dlp and ffmpeg can be found and started
    CheckTools,
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Address to bind the HTTP server to (overrides server.bind_addr)
    #[arg(long)]
    pub address: Option<SocketAddr>,
}

#[derive(clap::Args, Debug)]
pub struct ProbeArgs {
    /// Media page URL
    pub url: String,

    /// Cookies in header form (`name=value; name2=value2`) for pages behind a login
    #[arg(long)]
    pub cookies: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["clipfetch", "serve", "--address", "127.0.0.1:9000"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.address, Some("127.0.0.1:9000".parse().unwrap()))
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let cli = Cli::parse_from(["clipfetch", "probe", "https://vimeo.com/1", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Probe(ref args) if args.url == "https://vimeo.com/1"));
    }

    #[test]
    fn test_parse_probe_cookies() {
        let cli = Cli::parse_from(["clipfetch", "probe", "https://vimeo.com/1", "--cookies", "sid=1; a=2"]);
        match cli.command {
            Commands::Probe(args) => assert_eq!(args.cookies.as_deref(), Some("sid=1; a=2")),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
