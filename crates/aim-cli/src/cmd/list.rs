use std::path::Path;

use anyhow::Result;

use crate::Session;
use crate::ui::list::{print_list_footer, print_list_header, print_status_row};

/// List tracked AppImages
pub fn list(home: Option<&Path>) -> Result<()> {
    let session = Session::open(home)?;

    if session.registry.is_empty() {
        println!();
        println!("  No AppImages tracked.");
        println!("  Run 'aim install owner/project' or 'aim search <keywords>' to get started.");
        return Ok(());
    }

    print_list_header(&session.config.install_dir);
    for entry in session.registry.iter() {
        print_status_row(entry);
    }
    print_list_footer(session.registry.len());

    Ok(())
}
