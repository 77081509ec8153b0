mod catalog;
mod client;
mod config;
mod format;
mod render;
mod request;
mod session;

use crate::client::{ApiClient, Health, QueryReply};
use crate::config::Scope;
use crate::format::Tone;
use crate::render::Rendered;
use crate::request::{ConnectionContext, DeviceModel, QueryParams};
use crate::session::Session;
use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::io::IsTerminal;

#[derive(Parser)]
#[command(
    name = "oltctl",
    version,
    about = "Dashboard CLI for ZTE OLT monitoring via the snmp-zte query API"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Base URL of the query API (defaults to http://localhost:8080)"
    )]
    api_url: Option<String>,

    #[arg(
        long,
        global = true,
        help = "API username (or set OLTCTL_USERNAME); never stored"
    )]
    username: Option<String>,

    #[arg(
        long,
        global = true,
        help = "API password (or set OLTCTL_PASSWORD); never stored"
    )]
    password: Option<String>,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputFormat::Pretty,
        global = true,
        help = "Output format (propagates to subcommands)"
    )]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available monitoring queries, grouped by category
    Queries,
    /// Execute one monitoring query against an OLT
    Query {
        #[arg(value_name = "QUERY_ID", help = "Query identifier, e.g. onu_list")]
        id: String,
        #[arg(long, value_name = "IP", help = "OLT host address")]
        host: String,
        #[arg(long, help = "SNMP port on the OLT (default 161)")]
        port: Option<u16>,
        #[arg(long, help = "SNMP community string (default public)")]
        community: Option<String>,
        #[arg(long, value_enum, help = "OLT chassis model (default c320)")]
        model: Option<ModelArg>,
        #[arg(long, help = "Board (line card) number, default 1")]
        board: Option<u32>,
        #[arg(long, help = "PON port number, default 1")]
        pon: Option<u32>,
        #[arg(long, help = "ONU id, required by per-ONU queries")]
        onu_id: Option<u32>,
        #[arg(long, help = "Name, required by create/rename queries")]
        name: Option<String>,
        #[arg(
            long,
            value_name = "SECONDS",
            help = "Watch mode: re-run the query every SECONDS"
        )]
        watch: Option<u64>,
    },
    /// Probe the API service liveness endpoint
    Health,
    /// Persist non-secret defaults (API URL, port, community, model)
    Configure {
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        #[arg(long)]
        community: Option<String>,
        #[arg(long, value_enum)]
        model: Option<ModelArg>,
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show the merged configuration
    ConfigShow,
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Pretty,
    Json,
    Raw,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelArg {
    C300,
    C320,
    C600,
}

impl From<ModelArg> for DeviceModel {
    fn from(value: ModelArg) -> Self {
        match value {
            ModelArg::C300 => DeviceModel::C300,
            ModelArg::C320 => DeviceModel::C320,
            ModelArg::C600 => DeviceModel::C600,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("reading current directory")?;

    match cli.command {
        Commands::Queries => {
            for category in catalog::Category::ALL {
                println!("{}", category.title());
                for descriptor in catalog::in_category(category) {
                    let mut needs = Vec::new();
                    if descriptor.requires_onu_id {
                        needs.push("--onu-id");
                    }
                    if descriptor.requires_name {
                        needs.push("--name");
                    }
                    let suffix = if needs.is_empty() {
                        String::new()
                    } else {
                        format!("  (requires {})", needs.join(", "))
                    };
                    println!("  {:<16} {}{}", descriptor.id, descriptor.display_name, suffix);
                }
                println!();
            }
        }
        Commands::Query {
            id,
            host,
            port,
            community,
            model,
            board,
            pon,
            onu_id,
            name,
            watch,
        } => {
            let effective = config::resolve(&cwd, cli.api_url.clone())?;
            let (api_username, api_password) =
                config::resolve_credentials(cli.username.clone(), cli.password.clone())?;

            let model = model
                .map(DeviceModel::from)
                .or_else(|| effective.model.as_deref().and_then(DeviceModel::parse))
                .unwrap_or(DeviceModel::C320);

            let context = ConnectionContext {
                host,
                port: port.unwrap_or(effective.port),
                community: community.unwrap_or(effective.community),
                model,
                username: api_username,
                password: api_password,
            };
            context.validate()?;

            // Parameter requirements are a form-level concern; the builder
            // itself accepts whatever it is handed.
            if let Some(descriptor) = catalog::lookup(&id) {
                if descriptor.requires_onu_id && onu_id.is_none() {
                    bail!("query `{id}` requires --onu-id");
                }
                if descriptor.requires_name && name.as_deref().unwrap_or("").is_empty() {
                    bail!("query `{id}` requires --name");
                }
            }

            let client = ApiClient::new(&effective.api_url, &context.username, &context.password)?;
            let mut session = Session::connect(context);
            let params = QueryParams {
                board,
                pon,
                onu_id,
                name,
            };

            if let Some(interval) = watch {
                loop {
                    execute_once(&client, &mut session, &id, &params, cli.output)?;
                    std::thread::sleep(std::time::Duration::from_secs(interval));
                }
            } else {
                execute_once(&client, &mut session, &id, &params, cli.output)?;
            }
        }
        Commands::Health => {
            let effective = config::resolve(&cwd, cli.api_url.clone())?;
            let client = ApiClient::new(&effective.api_url, "", "")?;
            match client.health() {
                Health::Up => println!("API service at {} is up", effective.api_url),
                Health::Unknown => {
                    println!(
                        "API service at {}: status unknown (health probe failed)",
                        effective.api_url
                    )
                }
            }
        }
        Commands::Configure {
            api_url,
            port,
            community,
            model,
            scope,
        } => {
            let mut existing = config::load_scope(scope.into(), &cwd)?;
            if let Some(url) = api_url {
                existing.api_url = Some(url);
            }
            if let Some(port) = port {
                existing.port = Some(port);
            }
            if let Some(community) = community {
                existing.community = Some(community);
            }
            if let Some(model) = model {
                existing.model = Some(DeviceModel::from(model).as_str().to_string());
            }
            let path = config::save(scope.into(), &existing, &cwd)?;
            println!("Saved configuration to {}", path.display());
        }
        Commands::ConfigShow => {
            let merged = config::load(&cwd)?;
            println!("{}", serde_json::to_string_pretty(&merged)?);
        }
        Commands::Completion { shell } => {
            use clap_complete::{generate, shells};
            let mut cmd = Cli::command();
            let bin = cmd.get_name().to_string();
            match shell {
                CompletionShell::Bash => {
                    generate(shells::Bash, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Zsh => {
                    generate(shells::Zsh, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Fish => {
                    generate(shells::Fish, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::PowerShell => {
                    generate(shells::PowerShell, &mut cmd, bin, &mut std::io::stdout())
                }
            }
        }
    }

    Ok(())
}

/// One attempt: clear the slot, run the round trip, commit through the
/// ticket and display whatever actually landed in the slot.
fn execute_once(
    client: &ApiClient,
    session: &mut Session,
    id: &str,
    params: &QueryParams,
    output: OutputFormat,
) -> Result<()> {
    let ticket = session.begin();
    let request = request::build(session.context(), id, params);
    let reply = client.execute(&request)?;
    if session.commit(ticket, reply) {
        if let Some(reply) = session.result() {
            print_reply(id, reply, output)?;
        }
    }
    Ok(())
}

fn print_reply(query_id: &str, reply: &QueryReply, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Raw => {
            println!("{}", serde_json::to_string(&reply.data)?);
        }
        OutputFormat::Json => {
            let full = json!({
                "query": reply.query,
                "data": reply.data,
                "timestamp": reply.timestamp,
                "duration": reply.duration,
                "summary": reply.summary,
            });
            println!("{}", serde_json::to_string(&full)?);
        }
        OutputFormat::Pretty => {
            let shown_query = if reply.query.is_empty() {
                query_id
            } else {
                &reply.query
            };
            println!(
                "Query: {}  Duration: {}  Timestamp: {}",
                shown_query, reply.duration, reply.timestamp
            );
            if let Some(summary) = &reply.summary {
                println!("Summary: {summary}");
            }
            println!();
            print_rendered(&render::render(query_id, &reply.data));
        }
    }
    Ok(())
}

fn print_rendered(rendered: &Rendered) {
    match rendered {
        Rendered::Table { columns, rows } => {
            let mut widths: Vec<usize> = columns.iter().map(|c| c.len()).collect();
            for row in rows {
                for (idx, cell) in row.iter().enumerate() {
                    if idx < widths.len() {
                        widths[idx] = widths[idx].max(cell.text.chars().count());
                    }
                }
            }

            for (i, col) in columns.iter().enumerate() {
                if i > 0 {
                    print!("  ");
                }
                print!("{:width$}", col, width = widths[i]);
            }
            println!();
            for (i, width) in widths.iter().enumerate() {
                if i > 0 {
                    print!("  ");
                }
                print!("{:-<width$}", "", width = *width);
            }
            println!();
            for row in rows {
                for (i, cell) in row.iter().enumerate() {
                    if i > 0 {
                        print!("  ");
                    }
                    let padded = format!("{:width$}", cell.text, width = widths[i]);
                    print!("{}", paint(&padded, cell.tone));
                }
                println!();
            }
        }
        Rendered::Fields(fields) => {
            let label_width = fields.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
            for (label, cell) in fields {
                println!(
                    "{:label_width$}  {}",
                    label,
                    paint(&cell.text, cell.tone),
                    label_width = label_width
                );
            }
        }
        Rendered::Tags(tags) => {
            let line: Vec<String> = tags.iter().map(|t| format!("[{t}]")).collect();
            println!("{}", line.join(" "));
        }
        Rendered::Gauges(gauges) => {
            let line: Vec<String> = gauges
                .iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect();
            println!("{}", line.join("    "));
        }
        Rendered::Empty { message } => println!("{message}"),
        Rendered::Scalar(cell) => println!("{}", paint(&cell.text, cell.tone)),
    }
}

fn paint(text: &str, tone: Tone) -> String {
    if !std::io::stdout().is_terminal() {
        return text.to_string();
    }
    let code = match tone {
        Tone::Positive => "\x1b[32m",
        Tone::Negative => "\x1b[31m",
        Tone::Caution => "\x1b[33m",
        Tone::Neutral => return text.to_string(),
    };
    format!("{code}{text}\x1b[0m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
