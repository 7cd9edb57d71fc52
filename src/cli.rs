use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "farmhand")]
#[command(version)]
#[command(about = "Manage farms of deployment-target connections", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new farm from registered connections
    Create {
        /// Farm name
        farm: String,

        /// Connections to include in the farm
        connections: Vec<String>,
    },

    /// List farms and their connections
    List,

    /// Remove one or more farms
    Rm {
        /// Farm names to remove
        #[arg(required = true)]
        farms: Vec<String>,
    },

    /// Update an existing farm
    Update(UpdateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
#[command(after_help = "Examples:
  farmhand update --add con1 farm1
  farmhand update --remove con2 farm2
  farmhand update --default farm3")]
pub struct UpdateArgs {
    /// Farm to update
    pub farm: String,

    /// Add connection(s) to the farm
    #[arg(short, long, value_name = "CONNECTION")]
    pub add: Vec<String>,

    /// Remove connection(s) from the farm
    #[arg(short, long, value_name = "CONNECTION")]
    pub remove: Vec<String>,

    /// Set (--default) or clear (--default=false) the default farm
    #[arg(
        short,
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub default: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args.iter().copied()).expect("args should parse")
    }

    fn update_args(cli: Cli) -> UpdateArgs {
        match cli.command {
            Command::Update(args) => args,
            _ => panic!("expected update subcommand"),
        }
    }

    #[test]
    fn test_update_repeatable_flags() {
        let args = update_args(parse(&[
            "farmhand", "update", "-a", "con1", "--add", "con2", "-r", "con3", "farm1",
        ]));

        assert_eq!(args.farm, "farm1");
        assert_eq!(args.add, vec!["con1", "con2"]);
        assert_eq!(args.remove, vec!["con3"]);
        assert_eq!(args.default, None);
    }

    #[test]
    fn test_update_default_flag_tri_state() {
        // Flag absent: unchanged
        let args = update_args(parse(&["farmhand", "update", "-a", "con1", "farm1"]));
        assert_eq!(args.default, None);

        // Bare flag: set
        let args = update_args(parse(&["farmhand", "update", "--default", "farm1"]));
        assert_eq!(args.default, Some(true));

        // Explicit false: clear
        let args = update_args(parse(&["farmhand", "update", "--default=false", "farm1"]));
        assert_eq!(args.default, Some(false));
    }

    #[test]
    fn test_update_requires_farm_argument() {
        assert!(Cli::try_parse_from(["farmhand", "update", "--add", "con1"]).is_err());
    }

    #[test]
    fn test_rm_requires_at_least_one_farm() {
        assert!(Cli::try_parse_from(["farmhand", "rm"]).is_err());
    }
}
