//! folio-contact CLI
//!
//! Fills in and submits the portfolio contact form from the command line.

use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use folio_forms::{
    parse_assignment, validate_email, validate_phone_number, validate_url, DeliveryError,
    DiagnosticsSink, FieldKind, FormController, FormState, LoggingSubmitHandler, SubmitOutcome,
    TracingSink,
};

/// Portfolio contact form.
#[derive(Debug, Parser)]
#[command(name = "folio-contact")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, env = "FOLIO_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate and submit a contact message.
    Submit {
        /// Sender name.
        #[arg(long)]
        name: Option<String>,

        /// Sender email address.
        #[arg(long)]
        email: Option<String>,

        /// Message body.
        #[arg(long)]
        message: Option<String>,

        /// Extra field as `key=value`. May be repeated.
        #[arg(short, long = "field", value_name = "KEY=VALUE")]
        fields: Vec<String>,

        /// Simulate a delivery failure.
        #[arg(long)]
        fail: bool,
    },

    /// Check the shape of a single value.
    Check {
        /// One of `email`, `phone` or `url`.
        kind: String,

        /// The value to check.
        value: String,
    },
}

/// Handler used with `--fail`: always rejects.
async fn unreachable_relay(_data: FormState) -> Result<(), DeliveryError> {
    Err(DeliveryError::new("delivery disabled by --fail"))
}

async fn submit(
    sink: Arc<dyn DiagnosticsSink>,
    values: Vec<(String, String)>,
    fail: bool,
) -> anyhow::Result<()> {
    let controller = if fail {
        FormController::contact(unreachable_relay)
    } else {
        FormController::contact(LoggingSubmitHandler::new(Arc::clone(&sink)))
    }
    .with_diagnostics(sink);

    for (field, value) in values {
        controller.handle_change(field, value);
    }

    match controller.handle_submit().await {
        SubmitOutcome::Submitted => {
            println!("Message sent.");
            Ok(())
        }
        SubmitOutcome::Invalid(errors) => {
            print!("{errors}");
            bail!("form has {} invalid field(s)", errors.len())
        }
        SubmitOutcome::Failed | SubmitOutcome::AlreadySubmitting => {
            print!("{}", controller.errors());
            bail!("message was not sent")
        }
    }
}

fn check(kind: &str, value: &str) -> anyhow::Result<bool> {
    let valid = match kind.parse::<FieldKind>()? {
        FieldKind::Email => validate_email(value),
        FieldKind::Phone => validate_phone_number(value),
        FieldKind::Url => validate_url(value),
        other @ (FieldKind::Text | FieldKind::Textarea) => {
            bail!("no shape check for {} fields", other.input_type())
        }
    };
    Ok(valid)
}

async fn run(command: Commands, sink: Arc<dyn DiagnosticsSink>) -> anyhow::Result<()> {
    match command {
        Commands::Submit {
            name,
            email,
            message,
            fields,
            fail,
        } => {
            let mut values: Vec<(String, String)> =
                [("name", name), ("email", email), ("message", message)]
                    .into_iter()
                    .filter_map(|(k, v)| v.map(|v| (k.to_string(), v)))
                    .collect();
            for field in &fields {
                values.push(parse_assignment(field)?);
            }
            submit(sink, values, fail).await
        }

        Commands::Check { kind, value } => check(&kind, &value).map(|valid| {
            info!(kind = %kind, valid, "checked value");
            println!("{}", if valid { "valid" } else { "invalid" });
        }),
    }
}

/// Runs `command` unless logging setup failed, then flushes and closes
/// the sink whatever the outcome.
async fn execute(
    setup: anyhow::Result<()>,
    command: Commands,
    sink: Arc<dyn DiagnosticsSink>,
) -> anyhow::Result<()> {
    let result = match setup {
        Ok(()) => run(command, Arc::clone(&sink)).await,
        Err(e) => Err(e),
    };

    sink.flush();
    sink.close();
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sink: Arc<dyn DiagnosticsSink> = Arc::new(TracingSink::new());

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    let setup = tracing::subscriber::set_global_default(subscriber).map_err(anyhow::Error::from);

    execute(setup, cli.command, sink).await
}
