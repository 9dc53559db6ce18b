//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};
use rust_decimal::Decimal;

use crate::domain::amount::parse_amount;
use crate::domain::{BusinessUnitInfo, BusinessUnits, CompanyInfo, Level};

/// Corporate entity hierarchy: companies, divisions, business units and plants
#[derive(Parser, Debug)]
#[command(name = "entitree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Forest store file (overrides config)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Do not merge the built-in sample forest
    #[arg(long, global = true)]
    pub no_samples: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Level given as 1-4 or by name.
pub fn parse_level(raw: &str) -> Result<Level, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "company" => Ok(Level::Company),
        "division" => Ok(Level::Division),
        "unit" | "business-unit" | "bu" => Ok(Level::BusinessUnit),
        "plant" => Ok(Level::Plant),
        other => other
            .parse::<u8>()
            .map_err(|_| format!("unknown level '{other}'"))
            .and_then(|n| Level::try_from(n).map_err(|e| e.to_string())),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show forests as trees
    Tree {
        /// Only this forest (see `list`)
        #[arg(short, long)]
        forest: Option<usize>,
        /// Print the nested tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// List forests with their indices
    List,

    /// Check forests for orphans, duplicates and invalid fields
    Validate {
        /// Also check the detail form fields of every submitted record
        #[arg(long)]
        strict: bool,
    },

    /// Create or edit companies
    Company {
        #[command(subcommand)]
        command: CompanyCommands,
    },

    /// Add an empty pending row to a level
    Add {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        /// Level 2-4 or its name
        #[arg(short, long, value_parser = parse_level)]
        level: Level,
    },

    /// Submit the detail form of a pending row
    Submit {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        #[arg(short, long, value_parser = parse_level)]
        level: Level,
        /// Row index within the level
        #[arg(short, long)]
        index: usize,
        #[command(flatten)]
        details: UnitArgs,
    },

    /// Edit the details of a submitted record (the name stays)
    Edit {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        #[arg(short, long, value_parser = parse_level)]
        level: Level,
        /// Record to edit
        record: String,
        #[command(flatten)]
        details: UnitArgs,
    },

    /// Rename a record and relink its children
    Rename {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        #[arg(short, long, value_parser = parse_level)]
        level: Level,
        old: String,
        new: String,
    },

    /// Delete a record and its subtree
    Delete {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        #[arg(short, long, value_parser = parse_level)]
        level: Level,
        name: String,
    },

    /// Drop a pending row that was never submitted
    Discard {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        #[arg(short, long, value_parser = parse_level)]
        level: Level,
        #[arg(short, long)]
        index: usize,
    },

    /// Show submission state per level
    Status {
        #[arg(short, long)]
        forest: Option<usize>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum CompanyCommands {
    /// Create a new forest from the company form
    Create {
        #[command(flatten)]
        details: CompanyArgs,
    },
    /// Edit the company form of a forest (the name stays)
    Edit {
        #[arg(short, long, default_value_t = 0)]
        forest: usize,
        #[command(flatten)]
        details: CompanyArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

/// Company form fields.
#[derive(Args, Debug, Clone, Default)]
pub struct CompanyArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub contact_number: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub registration_number: String,
    /// PAN or GST number
    #[arg(long, default_value = "")]
    pub pan: String,
    #[arg(long, default_value = "")]
    pub lei: String,
    #[arg(long, default_value = "")]
    pub tin: String,
    #[arg(long, default_value = "")]
    pub default_currency: String,
    /// Comma-separated list
    #[arg(long, default_value = "")]
    pub business_units: String,
    #[arg(long, default_value = "")]
    pub reporting_currency: String,
}

impl From<CompanyArgs> for CompanyInfo {
    fn from(args: CompanyArgs) -> Self {
        CompanyInfo {
            company_name: args.name,
            address: args.address,
            contact_number: args.contact_number,
            contact_email: args.email,
            registration_number: args.registration_number,
            pan_or_gst: args.pan,
            lei: args.lei,
            tin: args.tin,
            default_currency: args.default_currency,
            business_units: BusinessUnits::parse_input(&args.business_units),
            reporting_currency: args.reporting_currency,
            ..CompanyInfo::default()
        }
    }
}

/// Division, business unit and plant form fields.
#[derive(Args, Debug, Clone, Default)]
pub struct UnitArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    /// Record on the level above (divisions default to the company)
    #[arg(long, default_value = "")]
    pub parent: String,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, default_value = "")]
    pub contact_number: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub unique_id: String,
    #[arg(long, default_value = "")]
    pub legal_entity_type: String,
    #[arg(long, default_value = "")]
    pub currency: String,
    #[arg(long, default_value = "")]
    pub fx_authority: String,
    #[arg(long, default_value = "0", value_parser = parse_amount)]
    pub fx_limit: Decimal,
    #[arg(long, default_value = "")]
    pub treasury_contact: String,
}

impl From<UnitArgs> for BusinessUnitInfo {
    fn from(args: UnitArgs) -> Self {
        BusinessUnitInfo {
            entity_name: args.name,
            parent: args.parent,
            address: args.address,
            contact_number: args.contact_number,
            contact_email: args.email,
            unique_identifier: args.unique_id,
            legal_entity_type: args.legal_entity_type,
            reporting_currency: args.currency,
            fx_authority: args.fx_authority,
            fx_limit: args.fx_limit,
            treasury_contact: args.treasury_contact,
            ..BusinessUnitInfo::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Ok(Level::Company))]
    #[case("plant", Ok(Level::Plant))]
    #[case("Unit", Ok(Level::BusinessUnit))]
    #[case("5", Err("invalid level: 5 (expected 1-4)".to_string()))]
    #[case("region", Err("unknown level 'region'".to_string()))]
    fn given_level_argument_when_parsing_then_accepts_number_or_name(
        #[case] raw: &str,
        #[case] expected: Result<Level, String>,
    ) {
        assert_eq!(parse_level(raw), expected);
    }

    #[test]
    fn given_submit_arguments_when_parsing_then_builds_unit_form() {
        let cli = Cli::parse_from([
            "entitree", "submit", "-l", "2", "-i", "0", "--name", "APAC", "--fx-limit", "1,500",
        ]);
        match cli.command {
            Some(Commands::Submit {
                level, details, ..
            }) => {
                assert_eq!(level, Level::Division);
                let unit = BusinessUnitInfo::from(details);
                assert_eq!(unit.entity_name, "APAC");
                assert_eq!(unit.fx_limit, Decimal::from(1500));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
