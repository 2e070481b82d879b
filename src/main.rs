mod assessment;
mod cli;
mod config;
mod core;
mod logging;
mod store;
mod utils;

use anyhow::{Context, Result};
use assessment::{Answers, Assessment, builtin};
use clap::Parser;
use cli::{
    CheckArgs, Cli, Commands, ConfigArgs, ListArgs, RunArgs, ScoreArgs, ShowArgs, TakeArgs,
};
use config::LoadedConfig;
use crate::core::AssessmentResult;
use crate::core::interactive::{self, Outcome};
use crate::core::report::{
    self, CheckEntry, RecordSummary, SaveStatus, ScoreReport, VariantSummary,
};
use crate::core::wizard::Session;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use store::file::FileStore;
use store::{ResultStore, SessionContext, StoredResult, save_with_retry};
use tracing::{debug, warn};
use utils::fs::{has_extension, resolve_path};

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            2
        }
    };

    std::process::exit(exit_code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Score(args) => run_score(args),
        Commands::Take(args) => run_take(args),
        Commands::Check(args) => run_check(args),
        Commands::Variants(args) => run_variants(args),
        Commands::Show(args) => run_show(args),
        Commands::List(args) => run_list(args),
        Commands::Init(args) => {
            if args.config.is_some() {
                eprintln!(
                    "warning: --config is ignored by `coachscore init`; writing ./{}",
                    config::CONFIG_FILE
                );
            }

            let path = std::env::current_dir()?.join(config::CONFIG_FILE);
            config::write_default_config(&path)?;
            println!("created {}", path.display());
            Ok(0)
        }
    }
}

fn load(common: &ConfigArgs) -> Result<(LoadedConfig, PathBuf)> {
    let cwd = std::env::current_dir()?;
    let loaded = config::load_config(common.config.as_deref(), &cwd)?;
    Ok((loaded, cwd))
}

fn output_json(common: &ConfigArgs, loaded: &LoadedConfig) -> bool {
    common.json || loaded.config.general.json
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A path to a `.toml` definition, or the id of a built-in variant.
fn load_assessment(run: &RunArgs, loaded: &LoadedConfig, cwd: &Path) -> Result<Assessment> {
    let name = run
        .assessment
        .as_deref()
        .unwrap_or(&loaded.config.general.default_assessment);

    let path = resolve_path(cwd, Path::new(name));
    if has_extension(&path, "toml") || path.is_file() {
        debug!(path = %path.display(), "loading assessment file");
        return Assessment::load(&path);
    }
    builtin::find(name)
}

fn read_raw_answers(path: &Path) -> Result<BTreeMap<String, String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed reading answers file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed parsing answers file {}", path.display()))
}

fn run_score(args: ScoreArgs) -> Result<i32> {
    let (loaded, cwd) = load(&args.run.common)?;
    let assessment = load_assessment(&args.run, &loaded, &cwd)?;

    let answers_path = resolve_path(&cwd, &args.answers);
    let raw = read_raw_answers(&answers_path)?;
    let answers = assessment
        .resolve_all(&raw)
        .with_context(|| format!("invalid answers in {}", answers_path.display()))?;

    let missing = assessment.answer_key_count().saturating_sub(answers.len());
    if missing > 0 {
        debug!(missing, "scoring partial assessment");
    }

    let result = crate::core::score(&assessment, &answers)?;
    let ctx = SessionContext::resolve(
        &loaded.config,
        args.context.user.as_deref(),
        args.context.business.as_deref(),
    );
    finish(
        &loaded,
        &assessment,
        &ctx,
        answers,
        result,
        args.save,
        output_json(&args.run.common, &loaded),
    )
}

fn run_take(args: TakeArgs) -> Result<i32> {
    let (loaded, cwd) = load(&args.run.common)?;
    let assessment = load_assessment(&args.run, &loaded, &cwd)?;
    let ctx = SessionContext::resolve(
        &loaded.config,
        args.context.user.as_deref(),
        args.context.business.as_deref(),
    );

    let mut session = Session::new(&assessment);
    let mut input = io::stdin().lock();
    // prompts go to stderr so stdout only carries the report
    let mut prompts = io::stderr();
    match interactive::run(&mut session, &mut input, &mut prompts)? {
        Outcome::Quit => {
            eprintln!("quit without scoring");
            Ok(1)
        }
        Outcome::Submitted(result) => finish(
            &loaded,
            &assessment,
            &ctx,
            session.answers().clone(),
            result,
            !args.no_save,
            output_json(&args.run.common, &loaded),
        ),
    }
}

fn finish(
    loaded: &LoadedConfig,
    assessment: &Assessment,
    ctx: &SessionContext,
    answers: Answers,
    result: AssessmentResult,
    save: bool,
    json: bool,
) -> Result<i32> {
    let mut report = ScoreReport::new(
        assessment,
        result.clone(),
        loaded.config.general.weak_section_percent,
    );

    if save && !loaded.config.store.enabled {
        warn!("result store is disabled in config; result not saved");
    } else if save {
        let store = FileStore::new(loaded.store_dir());
        debug!(dir = %store.dir().display(), "saving result");
        let record = StoredResult::new(ctx, assessment, answers, result);
        let status = match save_with_retry(&store, &record, loaded.config.store.save_attempts) {
            Ok(_) => SaveStatus {
                record_id: Some(record.id),
                error: None,
            },
            Err(err) => SaveStatus {
                record_id: None,
                error: Some(if err.is_retryable() {
                    format!("{err} (the score above is unaffected; try again)")
                } else {
                    err.to_string()
                }),
            },
        };
        report = report.with_save(status);
    }

    if json {
        print_json(&report)?;
    } else {
        report::print_human(&report);
    }

    if report.save_failed() { Ok(1) } else { Ok(0) }
}

fn run_check(args: CheckArgs) -> Result<i32> {
    let (loaded, cwd) = load(&args.common)?;

    let mut entries = Vec::new();
    if args.files.is_empty() {
        for id in builtin::ids() {
            let source = builtin::source(id).with_context(|| format!("missing source for {id}"))?;
            entries.push(check_entry(id, source));
        }
    } else {
        for file in &args.files {
            let path = resolve_path(&cwd, file);
            let source = fs::read_to_string(&path)
                .with_context(|| format!("failed reading assessment file {}", path.display()))?;
            entries.push(check_entry(&path.display().to_string(), &source));
        }
    }

    if output_json(&args.common, &loaded) {
        print_json(&entries)?;
    } else {
        report::print_check(&entries);
    }

    if entries.iter().all(|entry| entry.ok) {
        Ok(0)
    } else {
        Ok(1)
    }
}

/// A definition that does not parse is reported as a failure under `name`.
fn check_entry(name: &str, source: &str) -> CheckEntry {
    let assessment = match Assessment::parse(source) {
        Ok(assessment) => assessment,
        Err(err) => {
            debug!(name, "assessment definition does not parse");
            return CheckEntry::unreadable(name, &err);
        }
    };

    match assessment.validate() {
        Ok(()) => CheckEntry::passed(&assessment),
        Err(report) => CheckEntry::failed(&report),
    }
}

fn run_variants(args: ConfigArgs) -> Result<i32> {
    let (loaded, _) = load(&args)?;
    let variants: Vec<VariantSummary> =
        builtin::all()?.iter().map(VariantSummary::from).collect();

    if output_json(&args, &loaded) {
        print_json(&variants)?;
    } else {
        report::print_variants(&variants);
    }
    Ok(0)
}

fn run_show(args: ShowArgs) -> Result<i32> {
    let (loaded, _) = load(&args.common)?;
    let store = FileStore::new(loaded.store_dir());
    let record = store.load(args.id)?;

    if output_json(&args.common, &loaded) {
        print_json(&record)?;
        return Ok(0);
    }

    let title = builtin::find(&record.assessment_id)
        .map(|assessment| assessment.title)
        .unwrap_or_else(|_| record.assessment_id.clone());
    report::print_record_header(&record);
    report::print_human(&ScoreReport::from_record(
        &record,
        &title,
        loaded.config.general.weak_section_percent,
    ));
    Ok(0)
}

fn run_list(args: ListArgs) -> Result<i32> {
    let (loaded, _) = load(&args.common)?;
    let store = FileStore::new(loaded.store_dir());
    let records: Vec<RecordSummary> = store
        .list(args.user.as_deref())?
        .iter()
        .map(RecordSummary::from)
        .collect();

    if output_json(&args.common, &loaded) {
        print_json(&records)?;
    } else {
        report::print_records(&records);
    }
    Ok(0)
}
