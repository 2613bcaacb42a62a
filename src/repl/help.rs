use std::io::{self, BufRead, Write};

use colored::*;

use crate::ui::Console;

struct Category {
    key: &'static str,
    title: &'static str,
    commands: &'static [(&'static str, &'static str)],
}

const CATEGORIES: &[Category] = &[
    Category {
        key: "journal",
        title: "Logbook",
        commands: &[
            ("loglist", "List all logbook entries"),
            ("logbook <ID>", "Show a logbook entry"),
            ("newlog", "Write a new logbook entry"),
            ("editlog <ID>", "Replace the content of an entry"),
            ("deletelog <ID>", "Delete an entry"),
            ("exportlogs", "Export all entries to a text file"),
        ],
    },
    Category {
        key: "profiles",
        title: "Profiles",
        commands: &[
            ("profileslist", "List all profile IDs"),
            ("profilesview <ID>", "Show a profile"),
            ("profilesadd", "Create a profile"),
            ("profilesedit <ID>", "Edit a profile"),
            ("profilesdelete <ID>", "Delete a profile"),
            ("searchprofile <keyword>", "Search profiles by any field"),
        ],
    },
    Category {
        key: "projects",
        title: "Projects & Tasks",
        commands: &[
            ("projectslist", "List all projects"),
            ("projectview <ID>", "Show a project and its tasks"),
            ("projectadd", "Create a project"),
            ("projectedit <ID>", "Edit a project"),
            ("projectdelete <ID>", "Delete a project and its tasks"),
            ("taskadd <ProjectID>", "Add a task to a project"),
            (
                "taskupdate <ProjectID> <TaskID> <status|assigned> <value>",
                "Update a task",
            ),
            ("taskdelete <ProjectID> <TaskID>", "Delete a task"),
        ],
    },
    Category {
        key: "system",
        title: "System",
        commands: &[
            ("login", "Log in"),
            ("logout", "Log out"),
            ("clear", "Clear the screen"),
            ("whoami", "Show the current user and session"),
            ("history", "Show the 10 most recent session events"),
            ("exportdata", "Export every collection to a JSON file"),
            ("importdata", "Merge a JSON export into the local data"),
            ("help [category]", "Show this help"),
            ("exit", "End the session and quit"),
            ("restart", "End the session and start over"),
        ],
    },
];

/// Lists the categories, or the commands of one category.
pub fn show<R: BufRead, W: Write>(console: &mut Console<R, W>, category: &str) -> io::Result<()> {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return list_categories(console);
    }

    match CATEGORIES.iter().find(|c| c.key == category) {
        Some(found) => {
            console.notice(format!("{} commands:", found.title))?;
            for (usage, summary) in found.commands {
                console.line(format!("  {:<58} {}", usage.cyan(), summary))?;
            }
            Ok(())
        }
        None => {
            console.error(format!("Unknown help category '{category}'."))?;
            list_categories(console)
        }
    }
}

fn list_categories<R: BufRead, W: Write>(console: &mut Console<R, W>) -> io::Result<()> {
    console.notice("Help categories (type 'help <category>'):")?;
    for category in CATEGORIES {
        console.line(format!("  {:<10} {}", category.key.cyan(), category.title))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn render(category: &str) -> String {
        let mut console = Console::new(Cursor::new(""), Vec::new());
        show(&mut console, category).unwrap();
        String::from_utf8_lossy(console.output()).into_owned()
    }

    #[test]
    fn test_categories_listed_without_argument() {
        let out = render("");
        for key in ["journal", "profiles", "projects", "system"] {
            assert!(out.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_category_lists_its_commands() {
        let out = render("Projects");
        assert!(out.contains("taskupdate"));
        assert!(!out.contains("newlog"));
    }

    #[test]
    fn test_unknown_category_falls_back_to_list() {
        let out = render("weather");
        assert!(out.contains("Unknown help category 'weather'"));
        assert!(out.contains("journal"));
    }
}
