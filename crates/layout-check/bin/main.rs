//! The `layout-check` CLI: storage-layout diffing for Foundry projects across
//! git revisions.

use layout_check::utils::CommandError;
use yansi::Paint;

fn main() {
    layout_check::handler::install();
    layout_check::utils::subscriber();
    yansi::whenever(yansi::Condition::TTY_AND_COLOR);

    if let Err(err) = layout_check::run() {
        eprintln!("{}: {err:?}", "Error".red().bold());
        // A failed collaborator determines our own exit status.
        let code =
            err.chain().find_map(|e| e.downcast_ref::<CommandError>()).map_or(1, CommandError::code);
        std::process::exit(code);
    }
}
