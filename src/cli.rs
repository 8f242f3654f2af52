use crate::config::load_config;
use crate::graph::SchemaGraph;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::schema::parse_schema;
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "erdr", version, about = "Entity-relationship diagram renderer for database schemas")]
pub struct Args {
    /// Input schema JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Comma-separated app labels to include (default: all)
    #[arg(long = "apps", value_delimiter = ',')]
    pub apps: Vec<String>,

    /// Keep Django's built-in apps in the diagram
    #[arg(long = "include-django", default_value_t = false)]
    pub include_django: bool,

    /// Write the computed layout (grid cells, positions, routes) as JSON
    #[arg(long = "dump-layout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let mut schema = parse_schema(&input)?;
    let include = if args.apps.is_empty() {
        None
    } else {
        Some(args.apps.as_slice())
    };
    schema.retain_apps(include, !args.include_django);

    let graph = SchemaGraph::build(&schema);
    let layout = compute_layout(&graph, &config.layout);
    if let Some(path) = &args.dump_layout {
        write_layout_dump(path, &layout, &graph)?;
    }

    let svg = render_svg(&graph, &layout, &config.theme, &config.layout);
    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render, &config.theme)?;
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
