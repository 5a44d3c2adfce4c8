//! Command-line interface
//!
//! Answers missing from the flags are asked for interactively. Categorical
//! questions offer the trained vocabulary as a numbered menu.

use std::io::{BufRead, Write};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use shared::{
    Advisory, AdvisorResult, CategoricalField, FarmerReport, Language, Recommendation,
    FERTILIZER_USED_OPTIONS, PREVIOUS_CROP_OPTIONS, SOIL_TEXTURE_FEEL_OPTIONS,
};

use crate::error::{AppError, AppResult};
use crate::prompt::{self, Prompter};
use crate::services::{Consultation, PipelineOrchestrator, PlantingAdvice};

#[derive(Parser, Debug)]
#[command(
    name = "maize-advisor",
    version,
    about = "Fertilizer and planting-timing advice for maize farmers"
)]
pub struct Cli {
    /// Message language: en or sw
    #[arg(long, global = true, default_value = "en", value_parser = parse_language)]
    pub language: Language,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Defaults to `consult`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Recommend a fertilizer from your answers and local soil data
    Recommend(FarmArgs),
    /// Advise whether to plant now from recent and forecast rainfall
    Advise(LocationArgs),
    /// Both recommendation and planting advice
    Consult(FarmArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct LocationArgs {
    /// County and Sub-county, e.g. "Nakuru, Bahati"
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FarmArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Previous maize yield in bags per acre
    #[arg(long)]
    pub previous_yield: Option<f64>,

    /// How the soil feels when wet
    #[arg(long)]
    pub soil_texture_feel: Option<String>,

    #[arg(long)]
    pub previous_crop: Option<String>,

    #[arg(long)]
    pub fertilizer_used: Option<String>,
}

fn parse_language(code: &str) -> Result<Language, String> {
    Language::from_code(code).ok_or_else(|| format!("unsupported language '{}', use en or sw", code))
}

/// Outcome of one command, for the exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// A consultation where exactly one branch failed
    Partial,
    /// A consultation where both branches failed; already reported
    Failed,
}

impl RunOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Success | RunOutcome::Partial => 0,
            RunOutcome::Failed => 1,
        }
    }
}

/// Runs `command` against `orchestrator`, reading missing answers from
/// `input`. Questions go to `prompts` and results to `output`, so with
/// `--json` the output stays a single document.
pub async fn run<R: BufRead, P: Write, W: Write>(
    cli: &Cli,
    orchestrator: &PipelineOrchestrator,
    input: R,
    prompts: P,
    mut output: W,
) -> AppResult<RunOutcome> {
    let command = cli
        .command
        .clone()
        .unwrap_or_else(|| Command::Consult(FarmArgs::default()));
    let mut prompter = Prompter::new(input, prompts, cli.language);
    let renderer = Renderer {
        language: cli.language,
        json: cli.json,
        past_days: orchestrator.advisor().rules().past_days,
        recent_days: orchestrator.advisor().rules().recent_days,
        forecast_days: orchestrator.advisor().rules().forecast_days,
    };

    match command {
        Command::Recommend(args) => {
            let location = ask_location(&mut prompter, &args.location)?;
            let report = ask_report(&mut prompter, &args, orchestrator)?;
            let recommendation = orchestrator.recommend(&report, &location).await?;
            renderer.recommendation(&mut output, &recommendation)?;
            Ok(RunOutcome::Success)
        }
        Command::Advise(args) => {
            let location = ask_location(&mut prompter, &args)?;
            let advice = orchestrator.advise(&location).await?;
            renderer.advice(&mut output, &advice)?;
            Ok(RunOutcome::Success)
        }
        Command::Consult(args) => {
            let location = ask_location(&mut prompter, &args.location)?;
            let report = ask_report(&mut prompter, &args, orchestrator)?;
            let consultation = orchestrator.consult(&report, &location).await?;
            renderer.consultation(&mut output, &consultation)?;
            match (&consultation.recommendation, &consultation.advisory) {
                (Ok(_), Ok(_)) => Ok(RunOutcome::Success),
                (Err(_), Err(_)) => Ok(RunOutcome::Failed),
                _ => Ok(RunOutcome::Partial),
            }
        }
    }
}

fn ask_location<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    args: &LocationArgs,
) -> AppResult<String> {
    match &args.location {
        Some(location) => Ok(location.clone()),
        None => prompter.ask_text("location", prompt::LOCATION),
    }
}

/// Menu entries for `field`, from the loaded vocabulary when there is one
fn menu(orchestrator: &PipelineOrchestrator, field: CategoricalField, fallback: &[&str]) -> Vec<String> {
    orchestrator
        .artifacts()
        .codec()
        .vocabulary(field)
        .map(|v| v.categories().to_vec())
        .unwrap_or_else(|| fallback.iter().map(|s| s.to_string()).collect())
}

fn ask_report<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    args: &FarmArgs,
    orchestrator: &PipelineOrchestrator,
) -> AppResult<FarmerReport> {
    let previous_yield = match args.previous_yield {
        Some(value) => value,
        None => prompter.ask_number("previous_yield", prompt::PREVIOUS_YIELD)?,
    };
    let soil_texture_feel = match &args.soil_texture_feel {
        Some(value) => value.clone(),
        None => prompter.ask_choice(
            "soil_texture_feel",
            prompt::SOIL_TEXTURE_FEEL,
            &menu(orchestrator, CategoricalField::SoilTextureFeel, SOIL_TEXTURE_FEEL_OPTIONS),
        )?,
    };
    let previous_crop = match &args.previous_crop {
        Some(value) => value.clone(),
        None => prompter.ask_choice(
            "previous_crop",
            prompt::PREVIOUS_CROP,
            &menu(orchestrator, CategoricalField::PreviousCrop, PREVIOUS_CROP_OPTIONS),
        )?,
    };
    let fertilizer_used = match &args.fertilizer_used {
        Some(value) => value.clone(),
        None => prompter.ask_choice(
            "fertilizer_used",
            prompt::FERTILIZER_USED,
            &menu(orchestrator, CategoricalField::FertilizerUsed, FERTILIZER_USED_OPTIONS),
        )?,
    };
    Ok(FarmerReport::new(
        previous_yield,
        soil_texture_feel,
        previous_crop,
        fertilizer_used,
    ))
}

struct Renderer {
    language: Language,
    json: bool,
    past_days: usize,
    recent_days: usize,
    forecast_days: usize,
}

impl Renderer {
    fn label(&self, en: &'static str, sw: &'static str) -> &'static str {
        match self.language {
            Language::English => en,
            Language::Swahili => sw,
        }
    }

    fn write_json<W: Write, T: Serialize>(&self, out: &mut W, value: &T) -> AppResult<()> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }

    fn recommendation<W: Write>(&self, out: &mut W, recommendation: &Recommendation) -> AppResult<()> {
        if self.json {
            return self.write_json(out, recommendation);
        }
        self.recommendation_text(out, recommendation)
    }

    fn recommendation_text<W: Write>(&self, out: &mut W, recommendation: &Recommendation) -> AppResult<()> {
        writeln!(
            out,
            "{}: {} ({:.0}%)",
            self.label("Recommended fertilizer", "Mbolea inayopendekezwa"),
            recommendation.fertilizer,
            recommendation.confidence * 100.0
        )?;
        Ok(())
    }

    fn advice<W: Write>(&self, out: &mut W, advice: &PlantingAdvice) -> AppResult<()> {
        if self.json {
            return self.write_json(out, advice);
        }
        self.location_text(out, &advice.location)?;
        self.advisory_text(out, &advice.advisory)
    }

    fn location_text<W: Write>(&self, out: &mut W, location: &shared::Location) -> AppResult<()> {
        writeln!(
            out,
            "{}: {} ({}, {})",
            self.label("Location", "Mahali"),
            location.raw_text,
            location.coordinates.latitude.round_dp(4),
            location.coordinates.longitude.round_dp(4)
        )?;
        Ok(())
    }

    fn advisory_text<W: Write>(&self, out: &mut W, advisory: &Advisory) -> AppResult<()> {
        let metrics = &advisory.metrics;
        let rows = [
            (
                self.label("Past", "Siku"),
                self.past_days,
                self.label("days rainfall", "zilizopita, mvua"),
                metrics.past_rain,
            ),
            (
                self.label("Last", "Siku"),
                self.recent_days,
                self.label("days rainfall", "za karibuni, mvua"),
                metrics.recent_rain,
            ),
            (
                self.label("Next", "Siku"),
                self.forecast_days,
                self.label("days expected", "zijazo, mvua inayotarajiwa"),
                metrics.forecast_rain,
            ),
        ];
        for (prefix, days, suffix, amount) in rows {
            writeln!(out, "{} {} {}: {:.1} mm", prefix, days, suffix, amount)?;
        }
        writeln!(
            out,
            "{}: {} ({} {})",
            self.label("Advice", "Ushauri"),
            advisory.verdict.label(self.language),
            self.label("rule", "kanuni"),
            advisory.rule
        )?;
        writeln!(out, "{}", advisory.message(self.language))?;
        Ok(())
    }

    fn error_text<W: Write>(&self, out: &mut W, error: &shared::AdvisorError) -> AppResult<()> {
        writeln!(out, "{} [{}]", error.message(self.language), error.code())?;
        Ok(())
    }

    fn consultation<W: Write>(&self, out: &mut W, consultation: &Consultation) -> AppResult<()> {
        if self.json {
            let value = json!({
                "location": consultation.location,
                "recommendation": branch_json(&consultation.recommendation)?,
                "advisory": branch_json(&consultation.advisory)?,
            });
            return self.write_json(out, &value);
        }

        self.location_text(out, &consultation.location)?;
        writeln!(out)?;
        match &consultation.recommendation {
            Ok(recommendation) => self.recommendation_text(out, recommendation)?,
            Err(e) => self.error_text(out, e)?,
        }
        writeln!(out)?;
        match &consultation.advisory {
            Ok(advisory) => self.advisory_text(out, advisory)?,
            Err(e) => self.error_text(out, e)?,
        }
        Ok(())
    }
}

fn branch_json<T: Serialize>(result: &AdvisorResult<T>) -> AppResult<serde_json::Value> {
    Ok(match result {
        Ok(value) => serde_json::to_value(value)?,
        Err(e) => serde_json::to_value(AppError::Advisor(e.clone()).response())?,
    })
}
