//! Metric extraction, personality scoring and coverage analysis for
//! OpenType fonts.
//!
//! The pipeline turns a font binary into an [`AnalysisReport`]:
//!
//! 1. [`FontHandle`] validates the container and required tables.
//! 2. [`metrics::extract`] measures a fixed set of normalized metrics on a
//!    [`GlyphSource`], by default the font's default instance.
//! 3. The metrics are labeled ([`classify`]), scored for personality
//!    traits ([`personality`]) and matched against use cases
//!    ([`recommend`]).
//! 4. Optionally, the design space of variable fonts is sampled
//!    ([`variation`]) and script coverage is computed from the character
//!    map ([`coverage`]).
//!
//! ```no_run
//! use font_persona::{analyze_path, AnalysisConfig};
//!
//! let config = AnalysisConfig::default().with_all_analyses();
//! let report = analyze_path("Inter.ttf", &config)?;
//! println!("{}", report.to_json_pretty().unwrap());
//! # Ok::<_, font_persona::Error>(())
//! ```

pub mod classify;
pub mod config;
pub mod coverage;
mod error;
pub mod font;
pub mod instance;
pub mod metrics;
pub mod outline;
pub mod personality;
pub mod recommend;
pub mod report;
pub mod source;
pub mod variation;

#[cfg(test)]
mod testing;

use std::path::Path;

pub use config::AnalysisConfig;
pub use error::Error;
pub use font::{FontHandle, FontTables, SharedFontData};
pub use instance::{FontInstance, InstanceKind};
pub use report::{AnalysisReport, VariableAnalysis};
pub use source::GlyphSource;

use metrics::{Metric, MetricOrigin};

/// Analyzes a loaded font.
///
/// Only malformed input fails; missing optional data degrades individual
/// metrics, which is recorded in the report's metric origins.
pub fn analyze(handle: &FontHandle, config: &AnalysisConfig) -> Result<AnalysisReport, Error> {
    let font = handle.font()?;
    let tables = FontTables::new(font.clone());
    log::debug!("[{}] extracting metrics", handle.id());
    let extraction = metrics::extract(&FontInstance::new(font), &config.calibration);
    for metric in Metric::ALL {
        match extraction.origins.get(metric) {
            MetricOrigin::Default => {
                log::warn!("[{}] no data for {metric}, using neutral value", handle.id())
            }
            MetricOrigin::Estimated => {
                log::debug!("[{}] {metric} estimated from outlines", handle.id())
            }
            _ => {}
        }
    }
    let hints = classify::StyleHints::from_tables(&tables);
    let classification = classify::classify(&extraction, &hints, &config.calibration);
    let traits = personality::score(&extraction.metrics);
    let summary = personality::summarize(&traits);
    let recommendations = recommend::recommend(&extraction.metrics, &traits);

    let variable_analysis = if config.generate_variable_analysis {
        match variation::analyze_variation(handle, config) {
            Ok(analysis) => VariableAnalysis::Analyzed(analysis),
            Err(Error::NotVariableFont { .. }) => {
                log::debug!("[{}] static font, skipping variable analysis", handle.id());
                VariableAnalysis::NotApplicable
            }
            Err(e) => return Err(e),
        }
    } else {
        VariableAnalysis::NotRequested
    };
    let script_analysis = config.generate_script_analysis.then(|| {
        log::debug!("[{}] computing script coverage", handle.id());
        coverage::analyze_coverage(
            &tables.code_points(),
            &config.script_list,
            config.missing_sample_limit,
        )
    });

    Ok(AnalysisReport {
        font: report::FontInfo::new(handle.id(), &tables),
        metrics: extraction.metrics,
        metric_origins: extraction.origins,
        measurements: extraction.measurements,
        classification,
        personality: traits,
        summary,
        recommendations,
        variable_analysis,
        script_analysis,
    })
}

/// Loads the first face of the font at `path` and analyzes it.
pub fn analyze_path(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, Error> {
    analyze(&FontHandle::load(path)?, config)
}
