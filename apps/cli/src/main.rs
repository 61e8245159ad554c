use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, load_settings_from},
    FormSession, HttpPredictionService, InteractionError, SubmissionState, SubmitReport,
};
use shared::domain::FormField;
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "car_price", about = "Estimate a used car's price from its attributes")]
struct Cli {
    /// Base URL of the prediction service; overrides config file and environment.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Lists the values the service accepts.
    Options {
        /// Only list car names for this company.
        #[arg(long)]
        company: Option<String>,
    },
    Predict {
        #[arg(long)]
        company: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        year: String,
        #[arg(long, allow_hyphen_values = true)]
        kms_driven: String,
        #[arg(long)]
        fuel_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings()?,
    };
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    tracing::info!(api_url = %settings.api_url, "using prediction service");
    let service = HttpPredictionService::from_settings(&settings)
        .context("failed to configure prediction service")?;
    let mut session = FormSession::new(Arc::new(service));

    session.mount().await;
    if let Some(err) = session.controller().catalog_load_error() {
        eprintln!("warning: could not load options: {err}");
    }

    match cli.command {
        Command::Options { company } => {
            if let Some(company) = company {
                apply(&mut session, FormField::Group, company)?;
                print!("{}", render::render_options(session.controller(), &[FormField::Item]));
            } else {
                print!(
                    "{}",
                    render::render_options(
                        session.controller(),
                        &[FormField::Group, FormField::FuelType, FormField::Year],
                    )
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Predict {
            company,
            name,
            year,
            kms_driven,
            fuel_type,
        } => {
            // Company first: it decides which names are offered.
            apply(&mut session, FormField::Group, company)?;
            apply(&mut session, FormField::Item, name)?;
            apply(&mut session, FormField::Year, year)?;
            apply(&mut session, FormField::KmsDriven, kms_driven)?;
            apply(&mut session, FormField::FuelType, fuel_type)?;

            match session.submit().await? {
                SubmitReport::Blocked(validation) => {
                    for line in render::render_errors(&validation) {
                        eprintln!("{line}");
                    }
                    Ok(ExitCode::from(2))
                }
                SubmitReport::Settled(state) => {
                    if let Some(line) = render::render_outcome(&state) {
                        println!("{line}");
                    }
                    Ok(match state {
                        SubmissionState::Succeeded { .. } => ExitCode::SUCCESS,
                        _ => ExitCode::FAILURE,
                    })
                }
            }
        }
    }
}

fn apply(
    session: &mut FormSession<HttpPredictionService>,
    field: FormField,
    value: String,
) -> Result<()> {
    match session.on_field_change(field, value) {
        Ok(()) => Ok(()),
        Err(err @ InteractionError::NotAnOption { .. }) => {
            let options = session.controller().options(field);
            bail!("{}", render::render_rejection(&err, &options))
        }
        Err(err) => Err(err.into()),
    }
}
