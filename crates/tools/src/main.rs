use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::Viewport;
use serde::Serialize;
use tools::{ToolError, compose, decode, interactive_layers, parse_bounds, parse_center};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect how project maps bind and react to pointer events")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the composition (render units, viewport, controls) of a project map
    Bind {
        /// Project document (JSON)
        #[arg(long)]
        project: PathBuf,

        /// Id of the map inside the project
        #[arg(long, env = "LASSO_MAP_ID")]
        map: String,

        /// Initial bounds: west,south,east,north
        #[arg(long)]
        bounds: Option<String>,

        /// Initial center: lat,lon (ignored when --bounds is given)
        #[arg(long)]
        center: Option<String>,
    },

    /// Print the interactive layer ids after the renderer signals ready
    Interactive {
        #[arg(long)]
        project: PathBuf,

        #[arg(long, env = "LASSO_MAP_ID")]
        map: String,
    },

    /// Decode a feature property value
    Decode {
        value: String,
    },

    /// Feed a JSON array of map events to a mounted map and print each state
    Replay {
        #[arg(long)]
        project: PathBuf,

        #[arg(long, env = "LASSO_MAP_ID")]
        map: String,

        /// Event script, e.g. [{"event":"ready"},{"event":"click","features":[...]}]
        #[arg(long)]
        events: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), ToolError> {
    match args.command {
        Command::Bind {
            project,
            map,
            bounds,
            center,
        } => {
            let bounds = bounds.as_deref().map(parse_bounds).transpose()?;
            let center = center.as_deref().map(parse_center).transpose()?;
            let project = tools::read_project(&project)?;
            let composition = compose(project, &map, Viewport::from_parts(bounds, center))?;
            info!(
                "map {map}: {} render units, {} layers",
                composition.units.len(),
                composition.layer_ids().count()
            );
            print_json(&composition)
        }
        Command::Interactive { project, map } => {
            let project = tools::read_project(&project)?;
            for id in interactive_layers(project, &map)? {
                println!("{id}");
            }
            Ok(())
        }
        Command::Decode { value } => print_json(&decode(&value)),
        Command::Replay {
            project,
            map,
            events,
        } => {
            let project = tools::read_project(&project)?;
            let events = tools::read_events(&events)?;
            let report = tools::replay(project, &map, events)?;
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ToolError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| ToolError::Output(e.to_string()))?;
    println!("{out}");
    Ok(())
}
