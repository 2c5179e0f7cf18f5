//! # gridquery
//!
//! Places the boxes of a design file into a grid table and answers its region queries.
//!

use clap::Parser;
use std::error::Error;

// Use our own crate, by name
use grid21::utils::{SerdeFile, SerializationFormat};
use grid21::Design;

// => The doc-comment on `ProgramOptions` here is displayed by the `clap`-generated help docs =>

/// Grid-Table Design Query Runner
#[derive(Parser)]
struct ProgramOptions {
    /// Design Input File
    #[arg(short = 'i', long, default_value = "")]
    input: String,
    /// Report Output File. Written to stdout if empty.
    #[arg(short = 'o', long, default_value = "")]
    out: String,
    /// Report Format. One of ("json", "yaml", "toml"). Inferred from the output file if empty.
    #[arg(short = 'f', long, default_value = "")]
    fmt: String,
    /// Verbose Output Mode
    #[arg(short, long)]
    verbose: bool,
}

/// The main entry point.
/// All logic is offloaded to `_main` for sake of testing.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let options = ProgramOptions::parse();
    _main(&options)
}

/// All the real logic, with `ProgramOptions` argument for sake of testing
fn _main(options: &ProgramOptions) -> Result<(), Box<dyn Error>> {
    let design = Design::open_any(&options.input)?;
    let report = design.run()?;

    let fmt = match (options.fmt.as_str(), options.out.as_str()) {
        ("", "") => SerializationFormat::Yaml,
        ("", out) => SerializationFormat::from_path(out).unwrap_or(SerializationFormat::Yaml),
        (fmt, _) => SerializationFormat::parse(fmt)?,
    };
    if options.out.is_empty() {
        println!("{}", fmt.to_string(&report)?);
    } else {
        report.save(fmt, &options.out)?;
    }

    if options.verbose {
        println!(
            "{} wires, {} rejected boxes, {} queries",
            report.wire_cnt,
            report.rejected.len(),
            report.results.len()
        );
        if !options.out.is_empty() {
            println!("wrote {:?}", &options.out);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid21::Report;

    #[test]
    fn sample_design() -> Result<(), Box<dyn Error>> {
        let out = std::env::temp_dir().join("gridquery_sample_report.json");
        let options = ProgramOptions {
            input: resource("sample.yaml"),
            out: out.to_string_lossy().to_string(),
            fmt: String::new(),
            verbose: true,
        };
        _main(&options)?;

        let report = Report::open(&out, SerializationFormat::Json)?;
        assert_eq!(report.wire_cnt, 4);
        assert_eq!(report.net_cnt, 4);
        assert_eq!(report.rejected, vec![4]);
        assert!(report.ordered);
        assert_eq!(report.stats.trimmed, 1);
        assert_eq!(report.stats.tile_replicas, 1);
        assert_eq!(report.stats.power_multi_track, 3);

        let ids: Vec<Vec<u32>> = report.results.iter().map(|r| r.ids.clone()).collect();
        assert_eq!(ids, vec![vec![0, 1], vec![2], vec![3]]);
        let nets: Vec<Vec<String>> = report.results.iter().map(|r| r.nets.clone()).collect();
        assert_eq!(nets, vec![vec!["clk"], vec!["data"], vec!["vdd"]]);
        Ok(())
    }

    /// Grab the full path of resource-file `fname`
    fn resource(rname: &str) -> String {
        format!("{}/resources/{}", env!("CARGO_MANIFEST_DIR"), rname)
    }
}
