use crate::output::print_report;
use crate::station::Station;
use anyhow::Context;
use clap::Subcommand;
use std::path::PathBuf;
use wipflow_core::client::Attachment;
use wipflow_core::reason::{Reason, ReasonSelection};
use wipflow_core::workflows;
use wipflow_core::CoreError;

/// The fixed station operations.
#[derive(Subcommand)]
pub enum Operation {
    /// Tag a device's subtask after a heater board replacement
    HeaterSwap { wip: String },

    /// Tag a device's subtask as cleaned
    Cleaned { wip: String },

    /// Upload a calibration certificate and hand the device off
    Complete {
        /// Certificate file; its name (without extension) is used as the WIP
        cert_file: PathBuf,
        /// WIP code, when the file name is not one
        #[arg(long)]
        wip: Option<String>,
    },

    /// Mark a device dead on the ground, optionally with a reason or order hold
    Dog {
        wip: String,
        /// Reason, e.g. "Bad Sensor" or OTHER
        #[arg(long)]
        reason: Option<String>,
        /// Extra detail appended to the reason comment
        #[arg(long)]
        details: Option<String>,
        /// Place the order on hold (not available for root project orders)
        #[arg(long, value_name = "WHY")]
        order_hold: Option<String>,
    },

    /// Return a device unrepaired (COR)
    Cor {
        wip: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        details: Option<String>,
    },
}

fn selection(reason: &str, details: Option<&str>) -> anyhow::Result<ReasonSelection> {
    let reason: Reason = reason.parse()?;
    Ok(ReasonSelection::new(reason, details))
}

pub fn run(station: &Station, device: Option<&str>, op: Operation, json: bool) -> anyhow::Result<()> {
    // Reasons and files are checked before the session opens.
    let report = match op {
        Operation::HeaterSwap { wip } => {
            let session = station.open(device)?;
            workflows::heater_swap(&session, &wip)
        }
        Operation::Cleaned { wip } => {
            let session = station.open(device)?;
            workflows::cleaned(&session, &wip)
        }
        Operation::Complete { cert_file, wip } => {
            let certificate = Attachment::from_path(&cert_file)
                .with_context(|| format!("cannot read certificate {}", cert_file.display()))?;
            let session = station.open(device)?;
            match workflows::complete(&session, &certificate, wip.as_deref()) {
                Err(e @ CoreError::ManualCodeRequired { .. }) => {
                    return Err(anyhow::Error::new(e).context("rerun with --wip <CODE>"))
                }
                other => other,
            }
        }
        Operation::Dog {
            wip,
            reason,
            details,
            order_hold,
        } => {
            let reason = reason
                .as_deref()
                .map(|r| selection(r, details.as_deref()))
                .transpose()?;
            let session = station.open(device)?;
            workflows::dog(&session, &wip, reason.as_ref(), order_hold.as_deref())
        }
        Operation::Cor {
            wip,
            reason,
            details,
        } => {
            let reason = selection(&reason, details.as_deref())?;
            let session = station.open(device)?;
            workflows::return_unrepaired(&session, &wip, &reason)
        }
    }?;
    print_report(&report, json)
}
