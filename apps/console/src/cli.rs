use clap::{Parser, Subcommand};

/// Role and permission administration console.
#[derive(Debug, Parser)]
#[command(name = "stratum-console", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the system module catalog.
    Modules,

    /// List roles.
    Roles,

    /// Print the permission matrix of a role.
    Show {
        /// Role identifier.
        role_id: String,
    },

    /// Create a role, or update it when --id is given.
    Save {
        /// Existing role identifier; omit to create a new role.
        #[arg(long)]
        id: Option<String>,

        /// Role name; defaults to the current name when editing.
        #[arg(long)]
        name: Option<String>,

        /// Role description; defaults to the current description when editing.
        #[arg(long)]
        description: Option<String>,

        /// Permission in module:level form. Replaces the selection of that module.
        #[arg(long = "grant", value_name = "MODULE:LEVEL")]
        grants: Vec<String>,

        /// Module to switch off, discarding its selection.
        #[arg(long = "clear-module", value_name = "MODULE")]
        cleared_modules: Vec<String>,
    },

    /// Delete a role.
    Delete {
        /// Role identifier.
        role_id: String,
    },
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn save_collects_repeated_grants() {
        let cli = Cli::try_parse_from([
            "stratum-console",
            "save",
            "--name",
            "Support",
            "--grant",
            "users:read",
            "--grant",
            "users:create",
            "--clear-module",
            "billing",
        ])
        .unwrap_or_else(|error| panic!("{error}"));

        match cli.command {
            Command::Save {
                id,
                name,
                grants,
                cleared_modules,
                ..
            } => {
                assert!(id.is_none());
                assert_eq!(name.as_deref(), Some("Support"));
                assert_eq!(grants, vec!["users:read", "users:create"]);
                assert_eq!(cleared_modules, vec!["billing"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_requires_role_id() {
        assert!(Cli::try_parse_from(["stratum-console", "show"]).is_err());
    }
}
