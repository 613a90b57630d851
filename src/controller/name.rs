use comfy_table::Cell;
use log::info;
use crate::db::Database;
use crate::parser::NameCommand;
use crate::registry::{add_entry, delete_entry, list_entries, update_entry};
use crate::util::new_table;

pub(crate) fn execute_name(db: &mut Database, command: NameCommand) -> anyhow::Result<()> {
    match command {
        NameCommand::Add(entry) => {
            let id = add_entry(db, &entry)?;
            info!("Added '{}' -> '{}' with id {}", entry.person, entry.company, id);
        },
        NameCommand::Update(id, entry) => {
            update_entry(db, id, &entry)?;
            info!("Updated name {}", id);
        },
        NameCommand::Delete(id) => {
            delete_entry(db, id)?;
            info!("Deleted name {}", id);
        },
        NameCommand::List(term) => {
            let entries = list_entries(db, &term)?;
            if entries.is_empty() {
                info!("No names found");
                return Ok(());
            }

            let mut table = new_table();
            table.set_header(vec!["id", "Pessoa Física", "Razão Social", "Status"]);
            for e in entries.iter() {
                table.add_row(vec![
                    Cell::new(e.id.map(|id| id.to_string()).unwrap_or_default()),
                    Cell::new(&e.person),
                    Cell::new(&e.company),
                    Cell::new(e.status),
                ]);
            }
            println!("{table}");
        },
    }
    Ok(())
}
