//! Artisan and artisan group commands

use super::{preview, Workspace};
use anyhow::{Context, Result};
use clap::Subcommand;
use fabrica_core::types::{ArtisanId, GroupId};

#[derive(Subcommand)]
pub enum ArtisanCommand {
    /// List artisans
    List {
        /// Show full prompts
        #[arg(long)]
        full: bool,
    },

    /// Create an artisan
    Create {
        #[arg(short, long)]
        name: String,

        /// Instructions sent along with the chapter text
        #[arg(short, long)]
        prompt: String,
    },

    /// Edit an artisan's name and prompt
    Edit {
        /// Artisan id (or "multicultural")
        artisan: ArtisanId,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        prompt: Option<String>,
    },

    /// Delete an artisan
    Delete {
        /// Artisan id
        artisan: ArtisanId,
    },
}

#[derive(Subcommand)]
pub enum GroupCommand {
    /// List groups
    List,

    /// Create a group from artisan ids
    Create {
        #[arg(short, long)]
        name: String,

        /// Member artisan ids, comma separated
        #[arg(short, long, value_delimiter = ',')]
        artisans: Vec<ArtisanId>,
    },

    /// Replace a group's name and members
    Edit {
        /// Group id
        group: GroupId,

        #[arg(short, long)]
        name: String,

        #[arg(short, long, value_delimiter = ',')]
        artisans: Vec<ArtisanId>,
    },

    /// Delete a group
    Delete {
        /// Group id
        group: GroupId,
    },
}

pub async fn run(ws: &mut Workspace, cmd: ArtisanCommand) -> Result<()> {
    match cmd {
        ArtisanCommand::List { full } => {
            for artisan in ws.state.artisans() {
                let prompt = if full {
                    artisan.prompt.clone()
                } else {
                    preview(&artisan.prompt, 60)
                };
                println!("{:<15} {}\n    {}", artisan.id, artisan.name, prompt);
            }
        }
        ArtisanCommand::Create { name, prompt } => {
            let id = ws.state.create_artisan(&name, &prompt)?;
            ws.save().await;
            println!("Created artisan {id}");
        }
        ArtisanCommand::Edit {
            artisan,
            name,
            prompt,
        } => {
            let current = ws
                .state
                .artisan(artisan)
                .with_context(|| format!("Artisan {artisan} not found"))?;
            let name = name.unwrap_or_else(|| current.name.clone());
            let prompt = prompt.unwrap_or_else(|| current.prompt.clone());
            ws.state.update_artisan(artisan, &name, &prompt)?;
            ws.save().await;
            println!("Updated artisan {artisan}");
        }
        ArtisanCommand::Delete { artisan } => {
            let removed = ws.state.delete_artisan(artisan)?;
            ws.save().await;
            println!("Deleted artisan \"{}\"", removed.name);
        }
    }
    Ok(())
}

pub async fn run_group(ws: &mut Workspace, cmd: GroupCommand) -> Result<()> {
    match cmd {
        GroupCommand::List => {
            if ws.state.groups().is_empty() {
                println!("No groups");
            }
            for group in ws.state.groups() {
                let members: Vec<&str> = group
                    .artisan_ids
                    .iter()
                    .filter_map(|id| ws.state.artisan(*id))
                    .map(|a| a.name.as_str())
                    .collect();
                println!("{:<15} {}: {}", group.id, group.name, members.join(", "));
            }
        }
        GroupCommand::Create { name, artisans } => {
            check_members(ws, &artisans)?;
            let id = ws.state.create_group(&name, artisans)?;
            ws.save().await;
            println!("Created group {id}");
        }
        GroupCommand::Edit {
            group,
            name,
            artisans,
        } => {
            check_members(ws, &artisans)?;
            ws.state.update_group(group, &name, artisans)?;
            ws.save().await;
            println!("Updated group {group}");
        }
        GroupCommand::Delete { group } => {
            let removed = ws.state.delete_group(group)?;
            ws.save().await;
            println!("Deleted group \"{}\"", removed.name);
        }
    }
    Ok(())
}

fn check_members(ws: &Workspace, ids: &[ArtisanId]) -> Result<()> {
    for id in ids {
        ws.state
            .artisan(*id)
            .with_context(|| format!("Artisan {id} not found"))?;
    }
    Ok(())
}
