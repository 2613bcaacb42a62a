use std::io::{BufRead, Write};

use colored::*;

use crate::{
    models::unset,
    repl::{Repl, ReplError},
    services::{
        Deletion,
        profiles::{self, ProfileParameters},
    },
    ui,
};

impl<R: BufRead, W: Write> Repl<R, W> {
    pub(super) fn profiles_list(&mut self) -> Result<(), ReplError> {
        if self.store.profiles.is_empty() {
            self.console.notice("No profiles found.")?;
            return Ok(());
        }

        let lines: Vec<String> = self
            .store
            .profiles
            .iter()
            .map(|(id, profile)| format!("- {} ({})", id, profile.display_name()))
            .collect();

        self.console
            .line(ui::view_header("Available Profile IDs", lines.len()))?;
        for line in lines {
            self.console.line(format!("  {}", line.cyan()))?;
        }
        Ok(())
    }

    pub(super) fn profiles_view(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: profilesview <ID>")?;
            return Ok(());
        }

        let profile = match profiles::get_profile(&self.store.profiles, args) {
            Ok(profile) => profile.clone(),
            Err(e) => return self.recover(e),
        };

        self.console.notice(format!("Profile {}:", profile.id))?;
        self.console.field("Name", unset::show(&profile.name))?;
        self.console.field("Role", unset::show(&profile.role))?;
        self.console.field("IC", unset::show(&profile.national_id))?;
        self.console.field("PN", unset::show(&profile.phone))?;
        self.console.field("CB", unset::show(&profile.certification))?;
        Ok(())
    }

    pub(super) fn profiles_add(&mut self) -> Result<(), ReplError> {
        self.console.notice("Creating a new profile.")?;
        let raw_id = self.ask("Enter Profile ID (e.g., Z-2): ")?;
        let id = match profiles::check_new_profile_id(&self.store.profiles, &raw_id) {
            Ok(id) => id,
            Err(e) => return self.recover(e),
        };

        let parameters = ProfileParameters {
            name: self.ask("Name: ")?,
            role: self.ask("Role: ")?,
            national_id: self.ask("IC: ")?,
            phone: self.ask("PN: ")?,
            certification: self.ask("CB (number): ")?,
        };

        match profiles::create_profile(
            &mut self.store.profiles,
            &self.storages.profiles,
            &id,
            parameters,
        ) {
            Ok(write) => {
                if write.rejected_certification.is_some() {
                    self.console
                        .error("Invalid input for CB. Please enter a number. Storing as 'N/A'.")?;
                }
                self.console
                    .notice(format!("Profile '{}' added successfully!", write.id))?;
            }
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn profiles_edit(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: profilesedit <ID>")?;
            return Ok(());
        }

        let current = match profiles::get_profile(&self.store.profiles, args) {
            Ok(profile) => profile.clone(),
            Err(e) => return self.recover(e),
        };

        self.console.notice(format!(
            "Editing profile '{}'. Leave a field blank to keep its value.",
            current.id
        ))?;
        let parameters = ProfileParameters {
            name: self.ask_keep("Name", &unset::show(&current.name))?,
            role: self.ask_keep("Role", &unset::show(&current.role))?,
            national_id: self.ask_keep("IC", &unset::show(&current.national_id))?,
            phone: self.ask_keep("PN", &unset::show(&current.phone))?,
            certification: self.ask_keep("CB", &unset::show(&current.certification))?,
        };

        match profiles::update_profile(
            &mut self.store.profiles,
            &self.storages.profiles,
            &current.id,
            parameters,
        ) {
            Ok(write) => {
                if write.rejected_certification.is_some() {
                    self.console
                        .error("Invalid input for CB. Please enter a number. CB not updated.")?;
                }
                self.console
                    .notice(format!("Profile '{}' updated successfully!", write.id))?;
            }
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn profiles_delete(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: profilesdelete <ID>")?;
            return Ok(());
        }

        let pending = match profiles::propose_profile_deletion(&self.store.profiles, args) {
            Ok(pending) => pending,
            Err(e) => return self.recover(e),
        };
        let id = pending.key.clone();
        let answer = self.ask(&format!(
            "Are you sure you want to delete profile '{id}'? (y/n): "
        ))?;

        match profiles::commit_profile_deletion(
            &mut self.store.profiles,
            &self.storages.profiles,
            pending,
            &answer,
        ) {
            Ok(Deletion::Deleted) => self
                .console
                .notice(format!("Profile '{id}' deleted successfully."))?,
            Ok(Deletion::Cancelled) => self.console.notice("Deletion cancelled.")?,
            Err(e) => self.recover(e)?,
        }
        Ok(())
    }

    pub(super) fn search_profile(&mut self, args: &str) -> Result<(), ReplError> {
        if args.is_empty() {
            self.console.error("Usage: searchprofile <keyword>")?;
            return Ok(());
        }

        let matches = profiles::search_profiles(&self.store.profiles, args);
        if matches.is_empty() {
            self.console
                .notice(format!("No profiles found matching '{args}'."))?;
            return Ok(());
        }

        self.console
            .line(ui::view_header(&format!("Profiles matching '{args}'"), matches.len()))?;
        for (id, name) in matches {
            self.console.line(format!("  - {} ({})", id.cyan(), name))?;
        }
        Ok(())
    }

    /// Edit prompt showing the current value. A blank answer keeps it.
    pub(super) fn ask_keep(&mut self, label: &str, current: &str) -> Result<String, ReplError> {
        self.ask(&format!(
            "Enter new {label} (current: '{current}', leave blank to keep): "
        ))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::repl::tests::{output, repl};

    const LOGIN: &str = "login\ndemoplate\n245225\n";

    #[test]
    fn test_add_edit_and_search() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "{LOGIN}\
             profilesadd\nk-7\nKay\nPilot\n880101\n0123\nabc\n\
             profilesedit K-7\n\nChief Pilot\n\n\n12\n\
             searchprofile chief\n\
             profilesadd\nK-7\n"
        );
        let mut repl = repl(&dir, &script);

        repl.run().unwrap();

        let profile = repl.store.profiles.get("K-7").unwrap();
        assert_eq!(profile.name.as_deref(), Some("Kay"));
        assert_eq!(profile.role.as_deref(), Some("Chief Pilot"));
        assert_eq!(profile.phone.as_deref(), Some("0123"));
        assert_eq!(profile.certification, Some(12));

        let out = output(&repl);
        assert!(out.contains("Storing as 'N/A'."));
        assert!(out.contains("K-7"));
        assert!(out.contains("Profile ID 'K-7' already exists."));
    }

    #[test]
    fn test_delete_needs_y() {
        let dir = TempDir::new().unwrap();
        let script = format!(
            "{LOGIN}profilesadd\nA-1\n\n\n\n\n\nprofilesdelete a-1\nn\nprofilesdelete A-1\nY\nprofilesview A-1\n"
        );
        let mut repl = repl(&dir, &script);

        repl.run().unwrap();

        let out = output(&repl);
        assert!(out.contains("Deletion cancelled."));
        assert!(out.contains("Profile 'A-1' deleted successfully."));
        assert!(out.contains("Profile 'A-1' not found."));
        assert!(repl.store.profiles.is_empty());
    }
}
