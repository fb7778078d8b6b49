use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use rayon::prelude::*;

use font_persona::{analyze, coverage::Script, AnalysisConfig, FontHandle};

const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "ttc", "otc"];

#[derive(clap::Parser, Debug)]
#[command(about = "Infer metrics, personality and use cases for font files")]
struct Args {
    /// Load analysis settings from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Sample the design space of variable fonts
    #[arg(long)]
    variable: bool,
    /// Report coverage for these scripts (names or ISO 15924 codes)
    #[arg(long, value_delimiter = ',', num_args = 0..)]
    scripts: Option<Vec<Script>>,
    /// Number of interior samples per variation axis
    #[arg(long)]
    axis_samples: Option<usize>,
    /// Pretty print the JSON reports
    #[arg(long)]
    pretty: bool,
    /// Print the path for each font file as it is processed
    #[arg(long)]
    print_paths: bool,
    /// Paths to font files or directories (may use glob syntax)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

impl Args {
    fn analysis_config(&self) -> Result<AnalysisConfig, font_persona::Error> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        config.generate_variable_analysis |= self.variable;
        if let Some(scripts) = &self.scripts {
            config.generate_script_analysis = true;
            if !scripts.is_empty() {
                config.script_list = scripts.iter().copied().collect();
            }
        }
        if let Some(count) = self.axis_samples {
            config.axis_sample_count = count;
        }
        Ok(config)
    }
}

#[allow(clippy::explicit_write)]
fn main() {
    env_logger::init();
    use clap::Parser as _;
    let args = Args::parse_from(wild::args());
    let config = match args.analysis_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };
    let mut paths = vec![];
    for path in &args.files {
        collect_font_paths(path, &mut paths);
    }
    let ok = AtomicBool::new(true);
    paths.par_iter().for_each(|font_path| {
        if args.print_paths {
            writeln!(std::io::stderr(), "[{font_path:?}]").unwrap();
        }
        let handles = match FontHandle::load_all(font_path) {
            Ok(handles) => handles,
            Err(e) => {
                log::error!("{e}");
                ok.store(false, Ordering::Release);
                return;
            }
        };
        for handle in handles {
            let handle = match handle {
                Ok(handle) => handle,
                Err(e) => {
                    log::error!("{e}");
                    ok.store(false, Ordering::Release);
                    continue;
                }
            };
            let report = match analyze(&handle, &config) {
                Ok(report) => report,
                Err(e) => {
                    log::error!("{e}");
                    ok.store(false, Ordering::Release);
                    continue;
                }
            };
            let json = if args.pretty {
                report.to_json_pretty()
            } else {
                report.to_json()
            };
            match json {
                Ok(json) => writeln!(std::io::stdout().lock(), "{json}").unwrap(),
                Err(e) => {
                    log::error!("[{}] failed to serialize report: {e}", handle.id());
                    ok.store(false, Ordering::Release);
                }
            }
        }
    });
    if !ok.load(Ordering::Acquire) {
        std::process::exit(1);
    }
}

/// Expands directories to the font files they contain, recursively.
fn collect_font_paths(path: &Path, paths: &mut Vec<PathBuf>) {
    if !path.is_dir() {
        paths.push(path.to_owned());
        return;
    }
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("skipping {path:?}: {e}");
            return;
        }
    };
    let mut children: Vec<_> = entries.filter_map(|entry| Some(entry.ok()?.path())).collect();
    children.sort();
    for child in children {
        let is_font = child
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if child.is_dir() || is_font {
            collect_font_paths(&child, paths);
        }
    }
}
