//! # Respond Subcommand
//!
//! Completes a deferred request out of band. The operator supplies the
//! event saved when the resource returned `Deferred`, and the outcome to
//! report. The envelope is sent through the same responder the handler
//! uses, so the usual delivery rules apply.

use std::path::PathBuf;

use anyhow::bail;
use cfnr_callback::HttpCallback;
use cfnr_core::{Envelope, Event, Failed, Response, Success};
use cfnr_handler::{HandlerConfig, Responder};
use clap::{Args, Subcommand};

use crate::load_event;

/// Arguments for the respond subcommand.
#[derive(Args, Debug)]
pub struct RespondArgs {
    /// Saved event to answer (JSON or YAML).
    #[arg(long)]
    pub event: PathBuf,

    /// Print the envelope instead of sending it.
    #[arg(long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub outcome: Outcome,
}

/// The terminal response to send.
#[derive(Subcommand, Debug)]
pub enum Outcome {
    /// Report success.
    Success {
        /// Physical id. Defaults to the event's existing id.
        #[arg(long)]
        physical_resource_id: Option<String>,

        /// Output attribute, repeatable.
        #[arg(long = "data", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        data: Vec<(String, String)>,
    },
    /// Report failure.
    Failed {
        /// Physical id. Defaults to the event's existing id, or "n/a".
        #[arg(long)]
        physical_resource_id: Option<String>,

        /// Reason shown in the stack events.
        #[arg(long)]
        reason: String,
    },
}

impl Outcome {
    /// Build the response for `event`.
    pub fn response(&self, event: &Event) -> anyhow::Result<Response> {
        match self {
            Self::Success {
                physical_resource_id,
                data,
            } => {
                let id = match (physical_resource_id, &event.physical_resource_id) {
                    (Some(id), _) | (None, Some(id)) => id.clone(),
                    (None, None) => {
                        bail!("--physical-resource-id is required: the event has no existing id")
                    }
                };
                Ok(Success::new(id, data.iter().cloned())?.into())
            }
            Self::Failed {
                physical_resource_id,
                reason,
            } => {
                let id = physical_resource_id
                    .as_deref()
                    .unwrap_or_else(|| event.fallback_physical_resource_id());
                Ok(Failed::new(id, reason.as_str())?.into())
            }
        }
    }
}

/// Parse a `KEY=VALUE` pair. The value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {raw:?}")),
    }
}

/// Execute the respond subcommand.
pub fn run_respond(args: &RespondArgs) -> anyhow::Result<u8> {
    let event = load_event(&args.event)?;
    let response = args.outcome.response(&event)?;

    if args.dry_run {
        if let Some(envelope) = Envelope::for_response(&event, &response) {
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        return Ok(0);
    }

    let config = HandlerConfig::from_env()?;
    let sink = HttpCallback::new(&config.callback)?;
    let mut responder = Responder::new(&event, &sink, config.responder);
    let outcome = responder.respond(&response);
    responder.close(outcome)?;

    println!(
        "{} sent for {} ({})",
        response.status().map(|s| s.as_str()).unwrap_or("nothing"),
        event.logical_resource_id,
        event.request_id
    );
    Ok(0)
}
