use agrichart::data::{self, InputFormat};
use agrichart::{runtime, vars};
use agrichart::{ChartKind, RenderOptions};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::HashMap;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ChartArg {
    Bar,
    Line,
}

#[derive(Parser, Debug)]
#[command(name = "agrichart")]
#[command(about = "Generate dashboard chart series from tabular records using a card DSL", long_about = None)]
struct Args {
    /// Card DSL string (e.g., 'group(by: state) | sum(production) | top(n: 10, by: production)')
    dsl: String,

    /// Format of the records on stdin
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,

    /// Emit a PNG chart instead of JSON series
    #[arg(long)]
    render: bool,

    /// Chart kind when rendering
    #[arg(long, value_enum, default_value_t = ChartArg::Bar)]
    chart: ChartArg,

    /// Chart width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Card template variables, expanded as $KEY / ${KEY} in the DSL
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = vars::parse_assignment)]
    vars: Vec<(String, String)>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let variables: HashMap<String, String> = args.vars.iter().cloned().collect();
    let dsl = vars::expand_variables(&args.dsl, &variables)
        .context("Failed to expand card template variables")?;

    let spec = match runtime::parse_card(&dsl) {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    };

    let format = match args.format {
        FormatArg::Csv => InputFormat::Csv,
        FormatArg::Json => InputFormat::Json,
    };
    let dataset =
        data::read_dataset(io::stdin(), format).context("Failed to read records from stdin")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.render {
        let options = RenderOptions {
            width: args.width,
            height: args.height,
            kind: match args.chart {
                ChartArg::Bar => ChartKind::Bar,
                ChartArg::Line => ChartKind::Line,
            },
        };
        let png_bytes = runtime::render_chart(&spec, &dataset, &options)
            .context("Failed to render chart")?;
        handle
            .write_all(&png_bytes)
            .context("Failed to write PNG to stdout")?;
    } else {
        let entries = runtime::build_series(&spec, &dataset)?;
        let json = runtime::series_to_json(&entries)?;
        handle
            .write_all(json.as_bytes())
            .context("Failed to write series to stdout")?;
        handle.write_all(b"\n").context("Failed to write series to stdout")?;
    }

    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
