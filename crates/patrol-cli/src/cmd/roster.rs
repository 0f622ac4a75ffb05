use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use patrol_core::roster::{Member, Roster};
use std::path::Path;

#[derive(Subcommand)]
pub enum RosterSubcommand {
    /// List roster members
    List,
    /// Add or replace a member
    Add {
        id: String,
        display_name: String,
        /// Mark the member as an automated account (never offered as subject)
        #[arg(long)]
        bot: bool,
    },
    /// Remove a member by id
    Remove { id: String },
}

pub fn run(root: &Path, subcmd: RosterSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RosterSubcommand::List => list(root, json),
        RosterSubcommand::Add {
            id,
            display_name,
            bot,
        } => add(root, id, display_name, bot),
        RosterSubcommand::Remove { id } => remove(root, &id),
    }
}

fn list(root: &Path, json: bool) -> anyhow::Result<()> {
    let roster = Roster::load(root).context("failed to load roster")?;

    if json {
        print_json(&roster)?;
        return Ok(());
    }

    if roster.members.is_empty() {
        println!("Roster is empty. Add members with: patrol roster add <id> <display-name>");
        return Ok(());
    }

    let rows = roster
        .members
        .iter()
        .map(|m| {
            vec![
                m.id.clone(),
                m.display_name.clone(),
                if m.bot { "yes" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "NAME", "BOT"], rows);
    Ok(())
}

fn add(root: &Path, id: String, display_name: String, bot: bool) -> anyhow::Result<()> {
    let mut roster = Roster::load(root).context("failed to load roster")?;
    roster.upsert(Member {
        id: id.clone(),
        display_name,
        bot,
    });
    roster.save(root).context("failed to save roster")?;
    println!("Added member: {id}");
    Ok(())
}

fn remove(root: &Path, id: &str) -> anyhow::Result<()> {
    let mut roster = Roster::load(root).context("failed to load roster")?;
    if !roster.remove(id) {
        anyhow::bail!("member not found in roster: {id}");
    }
    roster.save(root).context("failed to save roster")?;
    println!("Removed member: {id}");
    Ok(())
}
