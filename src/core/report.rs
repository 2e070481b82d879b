use crate::assessment::{Assessment, SubmitRequires};
use crate::assessment::error::ValidationReport;
use crate::core::AssessmentResult;
use crate::core::score::{self, HealthStatus};
use crate::store::StoredResult;
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

const BAR_WIDTH: usize = 20;

fn colored_status(status: HealthStatus) -> String {
    match status {
        HealthStatus::Thriving | HealthStatus::Strong => status.as_str().green().bold().to_string(),
        HealthStatus::Stable | HealthStatus::Building => {
            status.as_str().yellow().bold().to_string()
        }
        HealthStatus::Struggling | HealthStatus::Urgent => status.as_str().red().bold().to_string(),
    }
}

fn bar(percentage: u32) -> String {
    let filled = (percentage.min(100) as usize * BAR_WIDTH).div_ceil(100);
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled)
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusArea {
    pub section: String,
    pub percentage: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaveStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub assessment_id: String,
    pub assessment_title: String,
    pub assessment_version: u32,
    pub result: AssessmentResult,
    pub weak_section_percent: u32,
    pub focus_areas: Vec<FocusArea>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<SaveStatus>,
}

impl ScoreReport {
    pub fn new(
        assessment: &Assessment,
        result: AssessmentResult,
        weak_section_percent: u32,
    ) -> Self {
        Self::from_parts(
            &assessment.id,
            &assessment.title,
            assessment.version,
            result,
            weak_section_percent,
        )
    }

    pub fn from_record(record: &StoredResult, title: &str, weak_section_percent: u32) -> Self {
        Self::from_parts(
            &record.assessment_id,
            title,
            record.assessment_version,
            record.result.clone(),
            weak_section_percent,
        )
    }

    fn from_parts(
        id: &str,
        title: &str,
        version: u32,
        result: AssessmentResult,
        weak_section_percent: u32,
    ) -> Self {
        let focus_areas = result
            .weak_sections(weak_section_percent)
            .into_iter()
            .map(|section| FocusArea {
                section: section.name.clone(),
                percentage: section.percentage(),
            })
            .collect();

        Self {
            assessment_id: id.to_string(),
            assessment_title: title.to_string(),
            assessment_version: version,
            result,
            weak_section_percent,
            focus_areas,
            save: None,
        }
    }

    pub fn with_save(mut self, save: SaveStatus) -> Self {
        self.save = Some(save);
        self
    }

    pub fn save_failed(&self) -> bool {
        self.save.as_ref().is_some_and(|save| save.error.is_some())
    }
}

pub fn print_human(report: &ScoreReport) {
    let result = &report.result;
    println!(
        "{}: {}% ({})",
        report.assessment_title,
        result.percentage,
        colored_status(result.health_status)
    );
    println!("Score: {}/{}", result.total, result.max_possible_total);

    let width = result
        .sections
        .iter()
        .map(|section| section.name.chars().count())
        .max()
        .unwrap_or(0);

    println!();
    println!("{}", "Sections".bold());
    for section in &result.sections {
        let percentage = section.percentage();
        let status = score::health_for_percentage(percentage);
        let meter = match status {
            HealthStatus::Thriving | HealthStatus::Strong => bar(percentage).green(),
            HealthStatus::Stable | HealthStatus::Building => bar(percentage).yellow(),
            HealthStatus::Struggling | HealthStatus::Urgent => bar(percentage).red(),
        };
        println!(
            "  {:<width$}  {}  {}/{} ({}%)",
            section.name, meter, section.score, section.max, percentage
        );
    }

    if !report.focus_areas.is_empty() {
        println!();
        println!(
            "{} (below {}%)",
            "Focus areas".bold(),
            report.weak_section_percent
        );
        for area in &report.focus_areas {
            println!("  - {} ({}%)", area.section, area.percentage);
        }
    }

    if let Some(save) = &report.save {
        println!();
        match (&save.record_id, &save.error) {
            (_, Some(error)) => println!(
                "{} {}",
                "save failed:".red().bold(),
                error
            ),
            (Some(id), None) => println!("saved: {id}"),
            (None, None) => {}
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub id: String,
    pub title: String,
    pub version: u32,
    pub questions: usize,
    pub answer_keys: usize,
    pub min_total: u32,
    pub max_possible_total: u32,
    pub submit_requires: SubmitRequires,
}

impl From<&Assessment> for VariantSummary {
    fn from(assessment: &Assessment) -> Self {
        Self {
            id: assessment.id.clone(),
            title: assessment.title.clone(),
            version: assessment.version,
            questions: assessment.questions.len(),
            answer_keys: assessment.answer_key_count(),
            min_total: assessment
                .questions
                .iter()
                .map(|question| question.min_points())
                .sum(),
            max_possible_total: assessment.max_possible_total,
            submit_requires: assessment.submit_requires,
        }
    }
}

pub fn print_variants(variants: &[VariantSummary]) {
    for variant in variants {
        println!(
            "{:<18} v{}  {} questions, {}-{} points, submit requires {}  {}",
            variant.id.bold(),
            variant.version,
            variant.questions,
            variant.min_total,
            variant.max_possible_total,
            variant.submit_requires,
            variant.title
        );
    }
}

pub fn print_record_header(record: &StoredResult) {
    println!("result {}", record.id);
    match &record.business_id {
        Some(business) => println!("user {} / business {}", record.user_id, business),
        None => println!("user {}", record.user_id),
    }
    println!("completed {}", record.completed_at.to_rfc3339());
    println!();
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id: Option<String>,
    pub assessment_id: String,
    pub completed_at: String,
    pub percentage: u32,
    pub health_status: HealthStatus,
}

impl From<&StoredResult> for RecordSummary {
    fn from(record: &StoredResult) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id.clone(),
            business_id: record.business_id.clone(),
            assessment_id: record.assessment_id.clone(),
            completed_at: record.completed_at.to_rfc3339(),
            percentage: record.result.percentage,
            health_status: record.result.health_status,
        }
    }
}

pub fn print_records(records: &[RecordSummary]) {
    if records.is_empty() {
        println!("no stored results");
        return;
    }

    for record in records {
        println!(
            "{}  {}  {:<18} {:>3}% {}",
            record.id,
            record.completed_at,
            record.assessment_id,
            record.percentage,
            colored_status(record.health_status)
        );
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub assessment: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl CheckEntry {
    pub fn passed(assessment: &Assessment) -> Self {
        Self {
            assessment: assessment.id.clone(),
            ok: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(report: &ValidationReport) -> Self {
        Self {
            assessment: report.assessment.clone(),
            ok: false,
            errors: report.errors.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn unreadable(name: &str, err: &anyhow::Error) -> Self {
        Self {
            assessment: name.to_string(),
            ok: false,
            errors: vec![format!("{err:#}")],
        }
    }
}

pub fn print_check(entries: &[CheckEntry]) {
    for entry in entries {
        if entry.ok {
            println!("{} {}", "PASS".green().bold(), entry.assessment);
            continue;
        }

        println!(
            "{} {} ({} problem(s))",
            "FAIL".red().bold(),
            entry.assessment,
            entry.errors.len()
        );
        for error in &entry.errors {
            println!("  -> {error}");
        }
    }
}
