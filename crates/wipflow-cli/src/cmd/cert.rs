use crate::output::{print_json, print_table};
use clap::Subcommand;
use wipflow_core::cert::parse_cal_cert_title;

#[derive(Subcommand)]
pub enum CertSubcommand {
    /// Extract calibration certificate fields from a task title
    Parse { title: String },
}

pub fn run(subcmd: CertSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        CertSubcommand::Parse { title } => parse(&title, json),
    }
}

fn parse(title: &str, json: bool) -> anyhow::Result<()> {
    let cert = parse_cal_cert_title(title);
    if json {
        return print_json(&cert);
    }
    print_table(
        &["FIELD", "VALUE"],
        vec![
            vec!["model".into(), cert.model_number],
            vec!["serial".into(), cert.serial_number],
            vec!["range".into(), cert.range],
            vec!["fitting".into(), cert.fitting],
            vec!["connector".into(), cert.connector],
            vec!["orientation".into(), cert.orientation],
        ],
    );
    Ok(())
}
