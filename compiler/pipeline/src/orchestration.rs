//! Pipeline orchestration for the main entry points.
//!
//! This module coordinates loading, analysis, generation and writing into a
//! single run.

use std::path::PathBuf;

use analysis::{CompilerContext, CompilerDiagnostics, CompilerPhase, ReferenceChecker, SnapshotValidator};
use codegen::{clean_generated_source, write_generated, ThriftGenerator};
use config::Config;
use tracing::{info, warn};

use crate::manifest::Manifest;
use crate::{PipelineError, Result};

/// Outcome of a successful [`compile`]
#[derive(Debug, Clone)]
pub struct CompileReport {
    /// Root name the artifacts were generated for
    pub root_name: String,
    /// Directory the artifacts were written to
    pub output_dir: PathBuf,
    /// Written artifact paths, manifest last
    pub files: Vec<PathBuf>,
    /// Digests of the written artifacts
    pub manifest: Manifest,
    /// Analysis findings (warnings only; errors abort the run)
    pub diagnostics: CompilerDiagnostics,
}

/// Run the analysis phases over a loaded context.
///
/// Phases only record findings; recorded warnings are logged here, once each.
/// Returns [`PipelineError::Analysis`] when any phase recorded an error.
pub fn analyze(ctx: &mut CompilerContext, strict_references: bool) -> Result<()> {
    let validator = SnapshotValidator::new();
    let references = if strict_references { ReferenceChecker::strict() } else { ReferenceChecker::new() };
    let phases: [&dyn CompilerPhase; 2] = [&validator, &references];
    ctx.run_phases(&phases)?;

    for warning in &ctx.diagnostics.warnings {
        warn!("{}", warning);
    }
    if ctx.diagnostics.has_errors() {
        return Err(PipelineError::Analysis { errors: ctx.diagnostics.errors.clone() });
    }
    Ok(())
}

/// Load the configured snapshot and analyze it without generating anything
pub fn check(config: &Config) -> Result<CompilerDiagnostics> {
    let codegen = &config.codegen;
    let mut ctx = CompilerContext::from_file(&codegen.input_path, &codegen.root_name)?;
    analyze(&mut ctx, codegen.strict_references)?;
    info!(
        "Checked {} ({} definitions, {} warnings)",
        codegen.input_path.display(),
        ctx.diagnostics.total_definitions,
        ctx.diagnostics.warnings.len()
    );
    Ok(ctx.diagnostics)
}

/// Compile the configured snapshot into artifacts.
///
/// Nothing is written unless analysis and generation both succeed.
pub fn compile(config: &Config) -> Result<CompileReport> {
    let codegen = &config.codegen;
    let mut ctx = CompilerContext::from_file(&codegen.input_path, &codegen.root_name)?;
    analyze(&mut ctx, codegen.strict_references)?;

    let artifacts = ThriftGenerator::new(&ctx.snapshot).with_options(codegen.options()).emit(&ctx.root_name)?;
    let files = artifacts.files(&ctx.root_name)?;

    let mut manifest = Manifest::new(&ctx.root_name);
    for (name, content) in &files {
        manifest.record(name, clean_generated_source(content).as_bytes());
    }

    let mut written = write_generated(&codegen.output_dir, &files)?;
    written.push(manifest.write(&codegen.output_dir)?);

    info!(
        "Wrote {} artifacts for {} into {}",
        files.len(),
        ctx.root_name,
        codegen.output_dir.display()
    );

    Ok(CompileReport {
        root_name: ctx.root_name.clone(),
        output_dir: codegen.output_dir.clone(),
        files: written,
        manifest,
        diagnostics: ctx.diagnostics,
    })
}
