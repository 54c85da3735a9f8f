//! Interactive menu over the space registry
//!
//! TigerStyle: One bounded request/response cycle per menu action. Registry
//! errors are reported and the menu continues; only terminal I/O failures end
//! the session.

use anyhow::{Context, Result};
use berth_registry::{format_listing, RegistryError, SpaceRegistry};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Top-level menu options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SeeAll,
    Add,
    Update,
    Remove,
    Exit,
}

impl MenuChoice {
    /// Parse a menu selection (`1`-`5`)
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::SeeAll),
            "2" => Some(Self::Add),
            "3" => Some(Self::Update),
            "4" => Some(Self::Remove),
            "5" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Which fields an update changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateChoice {
    Name,
    Occupancy,
    Both,
}

impl UpdateChoice {
    /// Parse `n`, `o` or `b`
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "n" => Some(Self::Name),
            "o" => Some(Self::Occupancy),
            "b" => Some(Self::Both),
            _ => None,
        }
    }

    fn changes_name(self) -> bool {
        matches!(self, Self::Name | Self::Both)
    }

    fn changes_occupancy(self) -> bool {
        matches!(self, Self::Occupancy | Self::Both)
    }
}

/// Parse `e` (empty) or `f` (full) into an occupied flag
pub fn parse_occupancy(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "e" => Some(false),
        "f" => Some(true),
        _ => None,
    }
}

/// Whether a confirmation answer is a yes; anything else declines
pub fn is_confirmed(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// User-facing message for each registry failure
pub fn describe_error(err: &RegistryError) -> String {
    match err {
        RegistryError::InvalidInput { name, reason } => {
            format!("Invalid space name {:?}: {}.", name, reason)
        }
        RegistryError::NotFound { name } => format!("No space found with name: {:?}", name),
        RegistryError::NameConflict { name, .. } => {
            format!("Another space already uses the name {:?}.", name)
        }
        RegistryError::Contention { .. } => {
            "Too many simultaneous changes; please try again.".to_string()
        }
        RegistryError::Timeout { operation, .. } => {
            format!("The {} request timed out; please try again.", operation)
        }
        RegistryError::StorageUnavailable { reason } => {
            format!("Storage is unavailable ({}); please try again later.", reason)
        }
    }
}

/// Interactive menu state
pub struct Menu {
    registry: SpaceRegistry,
    editor: DefaultEditor,
}

impl Menu {
    /// Create a menu over `registry`
    pub fn new(registry: SpaceRegistry) -> Result<Self> {
        let editor = DefaultEditor::new().context("Failed to create line editor")?;
        Ok(Self { registry, editor })
    }

    /// Run the menu loop until the user exits
    pub async fn run(&mut self) -> Result<()> {
        println!();
        println!("{}", "Welcome to the parking spaces tracker!".green().bold());
        print_menu();

        loop {
            let Some(line) = self.read("Please select an option: ")? else {
                println!("{}", "Goodbye!".dimmed());
                return Ok(());
            };

            let outcome = match MenuChoice::parse(&line) {
                Some(MenuChoice::SeeAll) => self.see_all().await,
                Some(MenuChoice::Add) => self.add().await,
                Some(MenuChoice::Update) => self.update().await,
                Some(MenuChoice::Remove) => self.remove().await,
                Some(MenuChoice::Exit) => {
                    println!("{}", "Goodbye!".dimmed());
                    return Ok(());
                }
                None => {
                    println!("{}", "Please choose an option from 1 to 5.".yellow());
                    print_menu();
                    continue;
                }
            };

            match outcome {
                Ok(()) => {}
                Err(e) => match e.downcast_ref::<RegistryError>() {
                    Some(err) => {
                        tracing::debug!(error = %err, "Registry operation failed");
                        println!("{}", describe_error(err).red());
                    }
                    None => return Err(e),
                },
            }
        }
    }

    /// Read one line; `None` if the user pressed Ctrl-C or Ctrl-D
    fn read(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line.trim().to_string()))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e).context("Failed to read input"),
        }
    }

    /// Read a line for a sub-prompt; `None` cancels the action
    fn read_or_cancel(&mut self, prompt: &str) -> Result<Option<String>> {
        let line = self.read(prompt)?;
        if line.is_none() {
            println!("{}", "Cancelled.".dimmed());
        }
        Ok(line)
    }

    fn read_occupancy(&mut self) -> Result<Option<bool>> {
        let Some(answer) = self.read_or_cancel("Is the spot (e)mpty or (f)ull? (e/f): ")? else {
            return Ok(None);
        };
        let occupied = parse_occupancy(&answer);
        if occupied.is_none() {
            println!("{}", "Please enter 'e' or 'f'.".yellow());
        }
        Ok(occupied)
    }

    async fn see_all(&self) -> Result<()> {
        let listing = self.registry.list().await?;
        if listing.is_empty() {
            println!("{}", "No spaces yet.".dimmed());
        } else {
            print!("{}", format_listing(&listing));
        }
        println!();
        Ok(())
    }

    async fn add(&mut self) -> Result<()> {
        let Some(name) = self.read_or_cancel("Parking spot nickname: ")? else {
            return Ok(());
        };
        if name.is_empty() {
            println!("{}", "Please enter a name.".yellow());
            return Ok(());
        }

        // Early feedback only; create re-checks inside its transaction
        if self.registry.get(&name).await?.is_some() {
            println!("{}", "Spot names must be unique.".yellow());
            return Ok(());
        }

        let Some(occupied) = self.read_occupancy()? else {
            return Ok(());
        };

        let id = self.registry.create(&name, occupied).await?;
        println!("{}", "Spot added successfully!".green());
        tracing::debug!(id = %id, "Spot added");
        Ok(())
    }

    async fn update(&mut self) -> Result<()> {
        println!("Here is the list of spaces:");
        self.see_all().await?;

        let Some(current) =
            self.read_or_cancel("Type the name of the space that you want to update: ")?
        else {
            return Ok(());
        };
        if current.is_empty() {
            println!("{}", "Please enter a name.".yellow());
            return Ok(());
        }

        let Some(answer) =
            self.read_or_cancel("Update (n)ame, (o)ccupancy, or (b)oth? [n/o/b]: ")?
        else {
            return Ok(());
        };
        let Some(choice) = UpdateChoice::parse(&answer) else {
            println!("{}", "Please enter 'n', 'o' or 'b'.".yellow());
            return Ok(());
        };

        let mut new_name = None;
        if choice.changes_name() {
            let Some(name) = self.read_or_cancel("New nickname: ")? else {
                return Ok(());
            };
            if name.is_empty() {
                println!("{}", "Please enter a name.".yellow());
                return Ok(());
            }
            new_name = Some(name);
        }

        let mut new_occupancy = None;
        if choice.changes_occupancy() {
            let Some(occupied) = self.read_occupancy()? else {
                return Ok(());
            };
            new_occupancy = Some(occupied);
        }

        self.registry
            .update(&current, new_name.as_deref(), new_occupancy)
            .await?;
        println!("{}", "Updated space!".green());
        Ok(())
    }

    async fn remove(&mut self) -> Result<()> {
        println!("Here is the list of spaces:");
        self.see_all().await?;

        let Some(target) = self.read_or_cancel("Type the name of the space to delete: ")? else {
            return Ok(());
        };
        if target.is_empty() {
            println!("{}", "Please enter a name.".yellow());
            return Ok(());
        }

        let prompt = format!("Are you sure you want to delete '{}'? (y/N): ", target);
        let Some(answer) = self.read_or_cancel(&prompt)? else {
            return Ok(());
        };
        if !is_confirmed(&answer) {
            println!("{}", "Space deletion cancelled.".dimmed());
            return Ok(());
        }

        if self.registry.delete(&target).await? {
            println!("{}", format!("Deleted space '{}'.", target).green());
        } else {
            println!(
                "{}",
                format!("No space found with name: {:?}", target).yellow()
            );
        }
        Ok(())
    }
}

fn print_menu() {
    println!();
    println!("{}", "Menu:".bold());
    println!("  1. See all spaces");
    println!("  2. Add a space");
    println!("  3. Update a space");
    println!("  4. Remove a space");
    println!("  5. Exit");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use berth_core::SpaceId;

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::SeeAll));
        assert_eq!(MenuChoice::parse(" 4 "), Some(MenuChoice::Remove));
        assert_eq!(MenuChoice::parse("5"), Some(MenuChoice::Exit));
        assert_eq!(MenuChoice::parse("6"), None);
        assert_eq!(MenuChoice::parse("one"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }

    #[test]
    fn test_update_choice_parse() {
        let both = UpdateChoice::parse("B").unwrap();
        assert!(both.changes_name());
        assert!(both.changes_occupancy());

        let name = UpdateChoice::parse("n").unwrap();
        assert!(name.changes_name());
        assert!(!name.changes_occupancy());

        assert_eq!(UpdateChoice::parse("o"), Some(UpdateChoice::Occupancy));
        assert_eq!(UpdateChoice::parse("x"), None);
    }

    #[test]
    fn test_parse_occupancy() {
        assert_eq!(parse_occupancy("f"), Some(true));
        assert_eq!(parse_occupancy(" E "), Some(false));
        assert_eq!(parse_occupancy("full"), None);
        assert_eq!(parse_occupancy(""), None);
    }

    #[test]
    fn test_is_confirmed() {
        assert!(is_confirmed("y"));
        assert!(is_confirmed("YES"));
        assert!(!is_confirmed(""));
        assert!(!is_confirmed("n"));
        assert!(!is_confirmed("yeah"));
    }

    #[test]
    fn test_describe_error_distinct_per_kind() {
        let errors = [
            RegistryError::InvalidInput {
                name: " ".into(),
                reason: "empty after trimming".into(),
            },
            RegistryError::not_found("P1"),
            RegistryError::name_conflict("P2", SpaceId::new("id-1")),
            RegistryError::Contention {
                reason: "conflict".into(),
            },
            RegistryError::Timeout {
                operation: "create",
                timeout_ms: 10,
            },
            RegistryError::StorageUnavailable {
                reason: "down".into(),
            },
        ];

        let messages: Vec<String> = errors.iter().map(describe_error).collect();
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[1].contains("P1"));
        assert!(messages[2].contains("P2"));
        assert!(messages[4].contains("create"));
    }
}
