//! Types command handler

use colored::*;
use fleetcheck_tasks::{TaskRegistry, TaskTypeInfo};

/// Print every built-in check type with its parameters
pub fn list_types() {
    let registry = TaskRegistry::with_builtin_tasks();
    let types = registry.describe();

    println!(
        "{}",
        format!("Found {} check type(s):", types.len()).bold()
    );
    println!();
    for info in &types {
        print_type(info);
    }
}

fn print_type(info: &TaskTypeInfo) {
    println!("  {} {}", "▸".cyan(), info.type_tag.bold());
    println!("    {}", info.description.dimmed());
    for param in info.parameters {
        let required = if param.required { "*" } else { "" };
        println!(
            "    - {}{}: {} {}",
            param.name.cyan(),
            required.red(),
            param.kind.name().dimmed(),
            format!("({})", param.description).dimmed()
        );
    }
    println!();
}
