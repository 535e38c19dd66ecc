//! Command-line surface: booking store commands, single predictions and
//! file-backed pipeline steps.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::bookings::{BookingStore, BookingStoreError};
use crate::config::{ConfigError, PipelineConfig, config_path, load_or_default, save_config};
use crate::error::PipelineError;
use crate::pipeline::{BookingForm, Step, predict_one, run_step};

#[derive(Debug, Parser)]
#[command(name = "hotel-cancel", version, about = "Hotel booking cancellation predictor")]
pub struct Cli {
    /// Write log files here instead of the application logs folder.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the default pipeline config so it can be edited.
    InitConfig {
        /// Target file; defaults to the application config location.
        #[arg(long)]
        path: Option<PathBuf>,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Create the booking store schema.
    CreateDb {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Append one booking to the store without scoring it.
    Ingest {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Score one booking, store it and print the prediction.
    Predict {
        #[arg(long)]
        db: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Model artifact; defaults to `predict.model_path` from the config.
        #[arg(long)]
        model: Option<PathBuf>,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Run one pipeline step.
    Pipeline {
        #[arg(long, value_enum)]
        step: Step,
        #[arg(long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,
        #[arg(long, num_args = 1.., required = true)]
        output: Vec<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Booking form fields.
#[derive(Debug, Clone, Args)]
pub struct FormArgs {
    #[arg(long, default_value = "Resort Hotel")]
    pub hotel: String,
    #[arg(long = "arrival-day-of-month", default_value_t = 1)]
    pub arrival_date_day_of_month: i64,
    #[arg(long = "arrival-week-number", default_value_t = 1)]
    pub arrival_date_week_number: i64,
    #[arg(long, default_value_t = 1)]
    pub reservation_day: i64,
    #[arg(long, default_value_t = 1)]
    pub reservation_month: i64,
    #[arg(long, default_value_t = 1)]
    pub reservation_weekday: i64,
    #[arg(long, default_value_t = 1)]
    pub lead_time: i64,
    #[arg(long, default_value_t = 1)]
    pub stays_in_week_nights: i64,
    #[arg(long, default_value_t = 1)]
    pub stays_in_weekend_nights: i64,
    #[arg(long, default_value_t = 1)]
    pub total_of_special_requests: i64,
    #[arg(long, default_value_t = 1)]
    pub market_segment: i64,
}

impl From<FormArgs> for BookingForm {
    fn from(args: FormArgs) -> Self {
        BookingForm {
            hotel: args.hotel,
            arrival_date_day_of_month: args.arrival_date_day_of_month,
            arrival_date_week_number: args.arrival_date_week_number,
            reservation_day: args.reservation_day,
            reservation_month: args.reservation_month,
            reservation_weekday: args.reservation_weekday,
            lead_time: args.lead_time,
            stays_in_week_nights: args.stays_in_week_nights,
            stays_in_weekend_nights: args.stays_in_weekend_nights,
            total_of_special_requests: args.total_of_special_requests,
            market_segment: args.market_segment,
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Store(#[from] BookingStoreError),
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Execute a parsed command, writing user-facing results to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<(), CliError> {
    match cli.command {
        Command::InitConfig { path, force } => {
            let path = match path {
                Some(path) => path,
                None => config_path()?,
            };
            if path.exists() && !force {
                writeln!(out, "Config already exists at {}", path.display())?;
                return Ok(());
            }
            save_config(&PipelineConfig::default(), &path)?;
            tracing::info!("Wrote default config to {}", path.display());
            writeln!(out, "Wrote default config to {}", path.display())?;
        }
        Command::CreateDb { db, config } => {
            let config = load_or_default(config.as_deref())?;
            let path = db.unwrap_or(config.store.db_path);
            BookingStore::open(&path)?;
            tracing::info!("Booking store ready at {}", path.display());
            writeln!(out, "Created booking store at {}", path.display())?;
        }
        Command::Ingest { db, config, form } => {
            let config = load_or_default(config.as_deref())?;
            let store = BookingStore::open(db.unwrap_or(config.store.db_path))?;
            let form = BookingForm::from(form);
            let id = store.insert(&form.to_new_booking())?;
            writeln!(out, "Added booking {id} from {}", form.hotel)?;
        }
        Command::Predict {
            db,
            config,
            model,
            form,
        } => {
            let config = load_or_default(config.as_deref())?;
            predict_and_store(&config, db, model, form.into(), out)?;
        }
        Command::Pipeline {
            step,
            input,
            output,
            config,
        } => {
            let config = load_or_default(config.as_deref())?;
            run_step(step, &input, &output, &config).inspect_err(|err| {
                tracing::error!("Step {step} failed (inputs {input:?}, outputs {output:?}): {err}");
            })?;
            writeln!(out, "Step {step} finished")?;
        }
    }
    Ok(())
}

fn predict_and_store(
    config: &PipelineConfig,
    db: Option<PathBuf>,
    model: Option<PathBuf>,
    form: BookingForm,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let model_path = model.unwrap_or_else(|| config.predict.model_path.clone());
    let prediction = predict_one(&form.to_record()?, &model_path)?;
    let store = BookingStore::open(db.unwrap_or_else(|| config.store.db_path.clone()))?;
    let id = store.insert(&form.to_new_booking())?;

    writeln!(out, "{}", prediction.message)?;
    writeln!(
        out,
        "Cancellation probability: {:.2}",
        prediction.rounded_cancel_probability()
    )?;
    writeln!(out, "Stored as booking {id}")?;
    for row in store.recent(config.store.max_rows_show)? {
        let b = &row.booking;
        writeln!(
            out,
            "{:>6}  hotel={} lead_time={} arrival={}/wk{} nights={}+{} requests={} segment={}",
            row.id,
            b.hotel,
            b.lead_time,
            b.arrival_date_day_of_month,
            b.arrival_date_week_number,
            b.stays_in_week_nights,
            b.stays_in_weekend_nights,
            b.total_of_special_requests,
            b.market_segment
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingest_defaults_mirror_form_defaults() {
        let cli = Cli::try_parse_from(["hotel-cancel", "ingest"]).unwrap();
        let Command::Ingest { form, .. } = cli.command else {
            panic!("expected ingest");
        };
        let form = BookingForm::from(form);
        assert_eq!(form.hotel, "Resort Hotel");
        assert_eq!(form.hotel_code(), 0);
        assert_eq!(form.lead_time, 1);
        assert_eq!(form.market_segment, 1);
    }

    #[test]
    fn pipeline_accepts_path_lists() {
        let cli = Cli::try_parse_from([
            "hotel-cancel",
            "--log-dir",
            "logs",
            "pipeline",
            "--step",
            "score",
            "--input",
            "x_test.csv",
            "model.json",
            "--output",
            "probs.csv",
            "preds.csv",
        ])
        .unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("logs")));
        let Command::Pipeline {
            step,
            input,
            output,
            ..
        } = cli.command
        else {
            panic!("expected pipeline");
        };
        assert_eq!(step, Step::Score);
        assert_eq!(input.len(), 2);
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn unknown_step_is_rejected() {
        let parsed = Cli::try_parse_from([
            "hotel-cancel",
            "pipeline",
            "--step",
            "upload",
            "--input",
            "a",
            "--output",
            "b",
        ]);
        assert!(parsed.is_err());
    }
}
