use std::path::PathBuf;

use clap::Parser;
use connfilter::{Connection, Filter, OpenMode, Pattern, Rule, Verdict};

#[derive(Debug, Parser)]
pub struct Opt {
    /// Rule file, created with a sample rule set if it doesn't exist
    #[clap(short, long, default_value = "rules.bin")]
    file: PathBuf,
    #[clap(long, default_value = "10.13.13.2")]
    source: String,
    #[clap(long, default_value = "8.8.8.8")]
    destination: String,
    #[clap(short, long, default_value = "443")]
    port: u16,
    #[clap(long, default_value = "HTTPS")]
    master: String,
    #[clap(long, default_value = "Facebook")]
    app: String,
    /// Log every connection, not only the ones allowed with IPS
    #[clap(long)]
    log_all: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let opt = Opt::parse();
    tracing_subscriber::fmt::init();

    let ipv4 = Pattern::new(r"^(\d{1,3})\.(\d{1,3})\.(\d{1,3})\.(\d{1,3})$")?;
    for host in [&opt.source, &opt.destination] {
        if ipv4.extract(host, 0).is_none() {
            tracing::warn!(%host, "not an IPv4 address, only exact or wildcard rules match it");
        }
    }

    let mode = if opt.file.exists() {
        OpenMode::Load
    } else {
        OpenMode::Create
    };
    let mut filter = Filter::open(&opt.file, mode)?;
    if mode == OpenMode::Create {
        filter.set_rule(
            0,
            &Rule::new(Verdict::Deny)
                .with_source("10.13.13.3")
                .with_master_protocol("SSH"),
        )?;
        filter.set_rule(
            1,
            &Rule::new(Verdict::AllowWithLogging)
                .with_destination("8.8.8.8")
                .with_port(443)
                .with_master_protocol("HTTPS")
                .with_application("Facebook"),
        )?;
        filter.set_rule(2, &Rule::new(Verdict::Reject).with_application("Facebook"))?;
        filter.set_rule(3, &Rule::new(Verdict::Allow).with_port(53))?;
        tracing::info!(file = %opt.file.display(), "created sample rule set");
    }
    filter.set_default_verdict(Some(Verdict::Deny));
    if opt.log_all {
        filter.start_logging();
    }

    let verdict = filter.evaluate(&Connection {
        source: &opt.source,
        destination: &opt.destination,
        destination_port: opt.port,
        master_protocol: &opt.master,
        application_protocol: &opt.app,
    });
    match verdict {
        Some(verdict) => tracing::info!(verdict = verdict.name(), "connection evaluated"),
        None => tracing::info!("no verdict for connection"),
    }

    filter.close()?;
    Ok(())
}
