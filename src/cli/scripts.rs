//! Shell scripts generated into the root's storage directory
//!
//! `webdash.terminal.init.sh` is sourced by interactive shells to pick up the
//! profile's PATH and environment additions. `initialize-projects.sh` clones
//! every external project listed in the profile and runs its setup task.

use crate::config::CONFIG_FILE_NAME;
use crate::profile::{ExternalProject, Root};
use crate::error::Result;
use std::fs;
use std::path::PathBuf;

pub const TERMINAL_INIT_FILE_NAME: &str = "webdash.terminal.init.sh";
pub const PROJECT_CLONER_FILE_NAME: &str = "initialize-projects.sh";

const GENERATED_FILE_WARNING: &str = "# Warning: This is an automatically generated file by the app-persistent/bin/webdash client. Auto generated. Don't modify.";

/// Reports whether the dashboard server is running when the shell starts
const TERMINAL_INIT_FOOTER: &str = r#"# Footer

if pgrep -x "webdash-server" > /dev/null
then
    echo 'WebDash: Server (<running>)'
else
    echo 'WebDash: Server (<not running>)'
fi

"#;

/// Script exporting PATH and environment additions
pub fn terminal_init_script(path_additions: &[String], env_additions: &[(String, String)]) -> String {
    let mut script = format!("{}\n", GENERATED_FILE_WARNING);

    let mut path = String::from("PATH=$PATH");
    for addition in path_additions {
        path.push(':');
        path.push_str(addition);
    }
    script.push_str(&format!("export {}\n", path));

    for (name, value) in env_additions {
        script.push_str(&format!("export {}={}\n", name, value));
    }

    script.push_str(TERMINAL_INIT_FOOTER);
    script
}

/// Script cloning each external project and running its task
pub fn project_cloner_script(projects: &[ExternalProject]) -> String {
    let mut script = String::new();

    for project in projects {
        script.push_str(&format!(
            "git clone {} {} &> /dev/null\n",
            project.source, project.destination
        ));
        script.push_str(&format!(
            "webdash {}/{}{}\n",
            project.destination, CONFIG_FILE_NAME, project.exec
        ));
        if project.register {
            script.push_str(&format!(
                "webdash register {}/{}\n",
                project.destination, CONFIG_FILE_NAME
            ));
        }
    }

    script
}

/// Write `webdash.terminal.init.sh` and return its path
pub fn write_terminal_init(root: &Root) -> Result<PathBuf> {
    let script = terminal_init_script(&root.path_additions(), &root.environment_additions());
    write_to_storage(root, TERMINAL_INIT_FILE_NAME, &script)
}

/// Write `initialize-projects.sh` and return its path
pub fn write_project_cloner(root: &Root) -> Result<PathBuf> {
    let script = project_cloner_script(&root.external_projects());
    write_to_storage(root, PROJECT_CLONER_FILE_NAME, &script)
}

fn write_to_storage(root: &Root, file_name: &str, content: &str) -> Result<PathBuf> {
    let path = root.storage_dir()?.join(file_name);
    fs::write(&path, content)?;
    log::info!("Wrote {}", path.display());

    Ok(path)
}
