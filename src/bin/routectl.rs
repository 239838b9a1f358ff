use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use verb_router::config::{load_config, ConfigWatcher};
use verb_router::observability::logging::init_logging;
use verb_router::{Lookup, ParamValue, Params, Router, SharedRouter};

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Inspect and exercise a route table", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a verb and path to a route
    Find {
        verb: String,
        path: String,
        /// Continue the scan after this route
        #[arg(long)]
        after: Option<String>,
    },
    /// List every route that accepts the verb and path
    FindAll { verb: String, path: String },
    /// Render a path for a named route from key=value pairs
    Build {
        name: String,
        #[arg(value_parser = parse_pair)]
        values: Vec<(String, String)>,
    },
    /// List registered routes in order
    List,
    /// Verbs accepted at a path
    Verbs { path: String },
    /// Reload the table on change and log each revision
    Watch,
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("verb_router=info,routectl=info");

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let router = Router::from_config(&config)?;

    match cli.command {
        Commands::Find { verb, path, after } => {
            print_json(&lookup_json(router.find(&verb, &path, after.as_deref())))?;
        }
        Commands::FindAll { verb, path } => {
            let matches: Vec<Value> = router
                .find_all(&verb, &path)
                .into_iter()
                .map(|(route, params)| json!({ "route": route.name(), "params": params }))
                .collect();
            print_json(&Value::Array(matches))?;
        }
        Commands::Build { name, values } => {
            let mut params = Params::new();
            for (key, value) in values {
                match params.get_mut(&key) {
                    Some(existing) => existing.push(value),
                    None => {
                        params.insert(key, ParamValue::One(value));
                    }
                }
            }

            match router.build(&name, &params) {
                Some(path) => print_json(&json!({ "path": path }))?,
                None => {
                    eprintln!("Error: no route named `{name}`");
                    std::process::exit(1);
                }
            }
        }
        Commands::List => {
            let routes: Vec<Value> = router
                .routes()
                .map(|route| {
                    json!({
                        "name": route.name(),
                        "allow": route.allow(),
                        "pattern": route.pattern().source(),
                        "params": route.pattern().param_names(),
                        "data": route.data(),
                    })
                })
                .collect();
            print_json(&Value::Array(routes))?;
        }
        Commands::Verbs { path } => {
            print_json(&json!({ "allow": router.allowed_verbs(&path) }))?;
        }
        Commands::Watch => watch(cli.config, SharedRouter::new(router)).await?,
    }

    Ok(())
}

async fn watch(
    path: PathBuf,
    shared: SharedRouter<toml::Table>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _handle = watcher.run()?;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                match Router::from_config(&config) {
                    Ok(router) => {
                        shared.replace(router);
                    }
                    Err(e) => tracing::error!(error = %e, "Rejected route table"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down watcher");
                break;
            }
        }
    }

    Ok(())
}

fn lookup_json(lookup: Lookup<toml::Table>) -> Value {
    match lookup {
        Lookup::Found { route, params } => json!({
            "outcome": "found",
            "route": route.name(),
            "params": params,
            "data": route.data(),
        }),
        Lookup::MethodNotAllowed(allow) => json!({
            "outcome": "method_not_allowed",
            "allow": allow,
        }),
        Lookup::NotFound => json!({ "outcome": "not_found" }),
    }
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
