use crate::output::print_json;
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use patrol_core::{
    app::App,
    record::InspectionRecord,
    roster::Roster,
    types::Subject,
};
use std::path::Path;

#[derive(Args)]
pub struct SubmitArgs {
    /// Inspected person: a roster member id, or any free-text name
    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub location: String,

    #[arg(long)]
    pub status: String,

    /// Free-text time of the inspection (e.g. "10:00")
    #[arg(long)]
    pub time: String,

    /// Additional people present; repeatable (roster id or free text)
    #[arg(long = "companion")]
    pub companions: Vec<String>,

    /// Submitter id recorded in the counters
    #[arg(long)]
    pub by: String,
}

/// Resolve a roster id to a member subject, falling back to free text.
fn resolve(roster: &Roster, value: &str) -> Subject {
    match roster.find(value) {
        Some(member) => Subject::Member {
            id: member.id.clone(),
            display_name: member.display_name.clone(),
        },
        None => Subject::Named {
            name: value.to_string(),
        },
    }
}

pub fn run(root: &Path, args: SubmitArgs, json: bool) -> anyhow::Result<()> {
    let app = App::open(root).context("failed to open patrol root")?;
    let roster = Roster::load(root).context("failed to load roster")?;

    let record = InspectionRecord {
        subject: resolve(&roster, &args.subject),
        location: args.location,
        status: args.status,
        time: args.time,
        companions: args.companions.iter().map(|c| resolve(&roster, c)).collect(),
        submitted_by: args.by,
        submitted_at: Utc::now(),
    };

    let result = app.submit_direct(record)?;

    if json {
        print_json(&result)?;
    } else {
        print!("{}", result.confirmation);
    }
    Ok(())
}
