use anyhow::Result;

use crate::cli::ListArgs;
use crate::core::builtin_registry;

/// Prints the registered metric ids in registration order.
pub fn cmd_list(args: ListArgs) -> Result<()> {
    let registry = builtin_registry()?;
    for (id, name) in registry.list_ids_and_names() {
        if args.names {
            println!("{}\t{}", id, name);
        } else {
            println!("{}", id);
        }
    }
    Ok(())
}
