//! Collection commands

use super::Workspace;
use anyhow::Result;
use clap::Subcommand;
use fabrica_core::filter::{filter_books, CollectionFilter};
use fabrica_core::types::CollectionId;

#[derive(Subcommand)]
pub enum CollectionCommand {
    /// List collections with their book counts
    List,

    /// Create a collection
    Create {
        /// Collection name
        name: String,
    },

    /// Rename a collection
    Rename {
        /// Collection id
        collection: CollectionId,

        /// New name
        name: String,
    },

    /// Delete a collection (its books are kept)
    Delete {
        /// Collection id
        collection: CollectionId,
    },
}

pub async fn run(ws: &mut Workspace, cmd: CollectionCommand) -> Result<()> {
    match cmd {
        CollectionCommand::List => {
            if ws.state.collections().is_empty() {
                println!("No collections");
            }
            for collection in ws.state.collections() {
                let books =
                    filter_books(&ws.state, CollectionFilter::Collection(collection.id)).len();
                println!("{:<15} {}  ({books} books)", collection.id, collection.name);
            }
        }
        CollectionCommand::Create { name } => {
            let id = ws.state.create_collection(&name)?;
            ws.save().await;
            println!("Created collection {id}");
        }
        CollectionCommand::Rename { collection, name } => {
            ws.state.rename_collection(collection, &name)?;
            ws.save().await;
            println!("Renamed collection {collection}");
        }
        CollectionCommand::Delete { collection } => {
            let removed = ws.state.delete_collection(collection)?;
            ws.save().await;
            println!("Deleted collection \"{}\"", removed.name);
        }
    }
    Ok(())
}
