use clap::{Parser, Subcommand};

/// Imports voter rosters from Excel files, searches them and keeps star ratings.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the README for the keys.
    #[clap(short, long, value_parser, global = true)]
    pub config: Option<String>,

    /// (file path, default roster.json) The JSON file holding the roster. Setting this option overrides
    /// the databasePath key of the configuration.
    #[clap(long, value_parser, global = true)]
    pub db: Option<String>,

    /// (user name) The user running the command. Defaults to the mainUser key of the configuration.
    #[clap(short, long, value_parser, global = true)]
    pub user: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Imports the voters of an Excel file. Voters already present are skipped.
    Import {
        /// (file path or '-') The .xlsx or .xls file. '-' reads the file from the standard input.
        #[clap(value_parser)]
        input: String,

        /// (xlsx or xls, default xlsx) The type of the data read from the standard input.
        /// Only accepted when the input is `-`.
        #[clap(long, value_parser)]
        extension: Option<String>,

        /// (default: first worksheet) The name of the worksheet to read.
        #[clap(long, value_parser)]
        worksheet: Option<String>,

        /// (file path or 'stdout') If specified, the summary of the import is written in JSON format
        /// to the given location instead of the standard output.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference summary in JSON format. If provided, the import summary must match it.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Shows how the columns of an Excel file would be mapped, without importing anything.
    Preview {
        /// (file path or '-') The .xlsx or .xls file.
        #[clap(value_parser)]
        input: String,

        /// Only accepted when the input is `-`.
        #[clap(long, value_parser)]
        extension: Option<String>,

        #[clap(long, value_parser)]
        worksheet: Option<String>,
    },
    /// Searches the roster. All the given terms are OR-ed together.
    Search {
        /// A term matched against the id, name, mobile, yadibhag, serial number and karyakarta.
        #[clap(value_parser)]
        query: Option<String>,
        #[clap(long, value_parser)]
        voter_id: Option<String>,
        #[clap(long, value_parser)]
        name: Option<String>,
        #[clap(long, value_parser)]
        booth: Option<u32>,
        #[clap(long, value_parser)]
        mobile: Option<String>,
        #[clap(long, value_parser)]
        yadibhag_no: Option<String>,
        #[clap(long, value_parser)]
        yadibhag_name: Option<String>,
        #[clap(long, value_parser)]
        srno: Option<String>,
        #[clap(long, value_parser)]
        age: Option<u32>,
        #[clap(long, value_parser)]
        gender: Option<String>,
        #[clap(long, value_parser)]
        card: Option<String>,
        #[clap(long, value_parser)]
        karyakarta: Option<String>,
    },
    /// Shows one voter.
    Show {
        #[clap(value_parser)]
        voter_id: String,
    },
    /// Sets the star rating (1 to 5) of a voter.
    Star {
        #[clap(value_parser)]
        voter_id: String,
        #[clap(value_parser)]
        rating: u8,
    },
    /// Removes the star rating of a voter (main users only).
    Unstar {
        #[clap(value_parser)]
        voter_id: String,
    },
    /// Prints the rating log, optionally for one voter.
    History {
        #[clap(value_parser)]
        voter_id: Option<String>,
    },
    /// Removes every voter (main users only). The rating log is kept.
    Clear {
        /// Required to actually remove the voters.
        #[clap(long, takes_value = false)]
        yes: bool,
    },
    /// Manages the users.
    #[clap(subcommand)]
    Users(UsersCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum UsersCommand {
    List,
    Add {
        #[clap(value_parser)]
        username: String,
        /// Creates a main user instead of a sub user.
        #[clap(long, takes_value = false)]
        main: bool,
    },
    Activate {
        #[clap(value_parser)]
        username: String,
    },
    Deactivate {
        #[clap(value_parser)]
        username: String,
    },
    Remove {
        #[clap(value_parser)]
        username: String,
    },
}
