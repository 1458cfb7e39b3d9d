use clap::Parser;

/// Command-line overrides for the server. Anything not given falls back to the
/// environment-derived `AppConfig`.
#[derive(Debug, Parser)]
#[command(name = "snippetbox")]
#[command(about = "Snippetbox - share short text snippets")]
#[command(version)]
pub struct Args {
    #[arg(long, help = "HTTP listen address, e.g. 0.0.0.0:4000")]
    pub addr: Option<String>,

    #[arg(long, help = "PostgreSQL connection string")]
    pub dsn: Option<String>,

    #[arg(long, help = "Include error details in server error responses")]
    pub debug: bool,
}
