//! `wizard actions`: print the catalog

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;
use wizard_core::ActionCatalog;

pub fn run(path: &Path) -> Result<()> {
    let catalog = ActionCatalog::load(path)
        .with_context(|| format!("Failed to load action catalog from {}", path.display()))?;
    print!("{}", render(&catalog));
    Ok(())
}

fn render(catalog: &ActionCatalog) -> String {
    let mut out = String::new();
    for (idx, screen) in catalog.screens().iter().enumerate() {
        let _ = writeln!(out, "[{idx}] {}", screen.title);
        for action in &screen.actions {
            let marker = if action.has_script() { "" } else { " (no script)" };
            let _ = writeln!(out, "    {:<24} {}{marker}", action.id, action.title);
        }
    }
    let _ = writeln!(out, "{} actions", catalog.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_action() {
        let catalog = ActionCatalog::from_toml_str(
            r#"
[[screens]]
title = "Basics"

[[screens.actions]]
id = "echo"
title = "Say hello"
script = "echo hello"

[[screens.actions]]
id = "info"
title = "Read me"
"#,
        )
        .unwrap();

        let text = render(&catalog);
        assert!(text.starts_with("[0] Basics\n"));
        assert!(text.contains("echo"));
        assert!(text.contains("Read me (no script)"));
        assert!(text.ends_with("2 actions\n"));
    }
}
