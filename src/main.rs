mod checkpoint;
mod classify;
mod engine;
mod error;
mod oracle;
mod report;
mod segmenter;
mod testid;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use crate::checkpoint::CheckpointGuard;
use crate::classify::TaskKind;
use crate::engine::SearchStats;
use crate::error::MinimizeError;
use crate::oracle::{Expected, PytestOracle, Verifier};
use crate::report::RunReport;
use crate::segmenter::FunctionSite;
use crate::testid::TestIdentifier;

#[derive(Parser)]
#[command(
    name = "pollutrim",
    version,
    about = "Minimize a test-pollution polluter to the smallest statement subset that still pollutes."
)]
struct Cli {
    #[arg(long, help = "Polluter pytest node id (module.py::[Class::]function[para])")]
    polluter: String,

    #[arg(long, help = "Victim pytest node id")]
    victim: String,

    #[arg(long, default_value = ".", help = "Directory pytest runs from")]
    rootdir: PathBuf,

    #[arg(
        long,
        help = "Output directory for the minimized polluter (default: minimized/<sha8> under rootdir)"
    )]
    out_dir: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = 2,
        help = "Stop proposing deletions once the body is this small"
    )]
    min_size: usize,

    #[arg(long, help = "Per-run pytest timeout in seconds (requires pytest-timeout)")]
    pytest_timeout: Option<u64>,

    #[arg(long, help = "Write the run report JSON to this file")]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let polluter = TestIdentifier::parse(&cli.polluter)?;
    let victim = TestIdentifier::parse(&cli.victim)?;

    let mut oracle = PytestOracle::new(cli.rootdir.clone(), cli.pytest_timeout);

    let kind = classify::classify(&mut oracle, &polluter.selector(), &victim.selector())?;
    println!("task kind: {}", kind.label());

    let module_path = cli.rootdir.join(&polluter.module);
    let guard = CheckpointGuard::capture(&module_path)?;
    let site = segmenter::locate(guard.original(), &polluter.module, &polluter.function)?;
    println!(
        "polluter {} has {} top-level statements",
        polluter.function,
        site.statement_count()
    );

    let mut last_candidate: Vec<usize> = Vec::new();
    let outcome = search(
        &mut oracle,
        &site,
        &guard,
        kind,
        &polluter.selector(),
        &victim.selector(),
        cli.min_size,
        &mut last_candidate,
    );

    // restore before anything looks at the result; Drop covers panics,
    // this surfaces restore failures on the normal path
    let restored = guard.restore();

    let (kept, search_stats) = match outcome {
        Ok(v) => v,
        Err(e) => {
            eprintln!(
                "minimization aborted; last attempted candidate kept statement indices {:?}",
                last_candidate
            );
            return Err(Box::new(e));
        }
    };
    restored?;

    let rendered = site.render_function(&kept);
    let out_dir = cli
        .out_dir
        .unwrap_or_else(|| checkpoint::output_dir(&cli.rootdir, &cli.polluter));
    let minimized_path = checkpoint::emit_minimized(&out_dir, &polluter.function, &rendered)?;

    let all: Vec<usize> = (0..site.statement_count()).collect();
    let report = RunReport {
        polluter: polluter.selector(),
        victim: victim.selector(),
        task_kind: kind.label(),
        original_statements: site.statement_count(),
        minimized_statements: kept.len(),
        oracle_calls: oracle.calls,
        search: search_stats,
        minimized_path: minimized_path.display().to_string(),
        function_diff: report::function_diff(&site.render_function(&all), &rendered),
    };
    report.print_summary();

    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }

    Ok(())
}

/// Drive the engine against the on-disk artifact. Each candidate is rendered
/// from the original source, re-parse-checked, written through the guard, and
/// only then judged by the oracle: the reduced polluter must still pass on
/// its own AND reproduce the joint outcome the task kind demands.
#[allow(clippy::too_many_arguments)]
fn search<V: Verifier>(
    oracle: &mut V,
    site: &FunctionSite,
    guard: &CheckpointGuard,
    kind: TaskKind,
    polluter_sel: &str,
    victim_sel: &str,
    min_size: usize,
    last_candidate: &mut Vec<usize>,
) -> Result<(Vec<usize>, SearchStats), MinimizeError> {
    let joint_expected = kind.joint_expected();

    engine::minimize(site.statement_count(), min_size, |candidate| {
        last_candidate.clear();
        last_candidate.extend_from_slice(candidate);

        let text = site.render_file(candidate);
        if !segmenter::reparses(&text) {
            return Err(MinimizeError::Parse {
                path: site.path.clone(),
            });
        }
        guard.write_candidate(&text)?;
        println!("trying candidate with {} statements", candidate.len());

        if !oracle.verify(&[polluter_sel.to_string()], Expected::Passed)? {
            return Ok(false);
        }
        oracle.verify(
            &[polluter_sel.to_string(), victim_sel.to_string()],
            joint_expected,
        )
    })
}
