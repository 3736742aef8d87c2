use log::{debug, info, warn};

use roster_core::mapper::infer_columns;
use roster_core::names::NameFilter;
use roster_core::rating::{rate_voter, unrate_voter};
use roster_core::search::SearchQuery;
use roster_core::store::{MemoryStore, VoterStore};
use roster_core::users::{add_user, authorize, ensure_main_user, remove_user, set_user_active};
use roster_core::*;
use snafu::{prelude::*, Snafu};

use crate::args::{Args, Command, UsersCommand};
use crate::roster::config_reader::*;
use crate::roster::file_store::{load_store, save_store};
use crate::roster::io_excel::read_sheet;
use crate::roster::summary::*;
use crate::roster::upload::Upload;

pub mod config_reader;
pub mod file_store;
pub mod io_common;
pub mod io_excel;
pub mod summary;
pub mod upload;

/// Where the roster is kept when neither --db nor databasePath is given.
pub const DEFAULT_DB_PATH: &str = "roster.json";

#[derive(Debug, Snafu)]
pub enum AppError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("No worksheet named {name} in {path}. Worksheets: {available:?}"))]
    MissingWorksheet {
        path: String,
        name: String,
        available: Vec<String>,
    },
    #[snafu(display("The file {path} contains no data"))]
    EmptyExcel { path: String },
    #[snafu(display("Unsupported file {path}: only .xlsx and .xls files are accepted"))]
    UnsupportedFile { path: String },
    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing to JSON"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error saving the roster to {path}"))]
    PersistingStore {
        source: tempfile::PersistError,
        path: String,
    },
    #[snafu(display("Error staging the uploaded file"))]
    StagingUpload { source: std::io::Error },
    #[snafu(display("The roster refused the operation"))]
    Roster { source: RosterError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type AppResult<T> = Result<T, AppError>;

/// The settings shared by all the commands.
#[derive(Debug, Clone)]
pub struct Session {
    pub config: RosterConfig,
    pub db_path: String,
    pub user: Option<String>,
}

impl Session {
    pub fn from_args(args: &Args) -> AppResult<Session> {
        let config = match &args.config {
            Some(p) => read_config(p)?,
            None => RosterConfig::default(),
        };
        debug!("from_args: config: {:?}", config);
        let db_path = args
            .db
            .clone()
            .or_else(|| config.database_path.clone())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let user = args.user.clone().or_else(|| config.main_user.clone());
        Ok(Session {
            config,
            db_path,
            user,
        })
    }

    fn actor(&self) -> AppResult<&str> {
        match self.user.as_deref() {
            Some(u) if !u.trim().is_empty() => Ok(u),
            _ => whatever!("No user given: pass --user or set mainUser in the configuration"),
        }
    }

    /// Loads the roster. An empty roster gets its main user from the
    /// configuration, or else from the acting user.
    fn open_store(&self) -> AppResult<(MemoryStore, bool)> {
        let mut store = load_store(&self.db_path)?;
        let created = match self
            .config
            .main_user
            .as_deref()
            .or(self.user.as_deref())
        {
            Some(main) if !main.trim().is_empty() => {
                ensure_main_user(&mut store, main.trim()).context(RosterSnafu {})?
            }
            _ => false,
        };
        Ok((store, created))
    }

    fn worksheet<'a>(&'a self, requested: &'a Option<String>) -> Option<&'a str> {
        requested
            .as_deref()
            .or(self.config.excel_worksheet_name.as_deref())
    }
}

pub fn run_command(args: &Args) -> AppResult<()> {
    let session = Session::from_args(args)?;
    match &args.command {
        Command::Import {
            input,
            extension,
            worksheet,
            out,
            reference,
        } => run_import_command(
            &session,
            input,
            extension.as_deref(),
            session.worksheet(worksheet),
            out.as_deref(),
            reference.as_deref(),
        ),
        Command::Preview {
            input,
            extension,
            worksheet,
        } => run_preview(
            &session,
            input,
            extension.as_deref(),
            session.worksheet(worksheet),
        ),
        Command::Search {
            query,
            voter_id,
            name,
            booth,
            mobile,
            yadibhag_no,
            yadibhag_name,
            srno,
            age,
            gender,
            card,
            karyakarta,
        } => {
            let q = SearchQuery {
                query: query.clone(),
                voter_id: voter_id.clone(),
                full_name: name.clone(),
                booth_no: *booth,
                mobile_no: mobile.clone(),
                yadibhag_no: yadibhag_no.clone(),
                yadibhag_name: yadibhag_name.clone(),
                voter_srno: srno.clone(),
                age: *age,
                gender: gender.clone(),
                voting_card_no: card.clone(),
                karyakarta: karyakarta.clone(),
            };
            run_search(&session, &q)
        }
        Command::Show { voter_id } => run_show(&session, voter_id),
        Command::Star { voter_id, rating } => {
            let (mut store, _) = session.open_store()?;
            let change =
                rate_voter(&mut store, voter_id, *rating, session.actor()?).context(RosterSnafu {})?;
            save_store(&session.db_path, &store)?;
            println!("{} {}: {}", change.action, voter_id, change.new_rating.stars());
            Ok(())
        }
        Command::Unstar { voter_id } => {
            let (mut store, _) = session.open_store()?;
            let change =
                unrate_voter(&mut store, voter_id, session.actor()?).context(RosterSnafu {})?;
            save_store(&session.db_path, &store)?;
            println!("{} {}", change.action, voter_id);
            Ok(())
        }
        Command::History { voter_id } => run_history(&session, voter_id.as_deref()),
        Command::Clear { yes } => {
            if !yes {
                whatever!("Refusing to remove all the voters without --yes");
            }
            let (mut store, _) = session.open_store()?;
            authorize(&store, session.actor()?, true).context(RosterSnafu {})?;
            let removed = store.delete_all_voters().context(RosterSnafu {})?;
            save_store(&session.db_path, &store)?;
            warn!("Removed {} voters from {}", removed, session.db_path);
            println!("Removed {} voters", removed);
            Ok(())
        }
        Command::Users(cmd) => run_users(&session, cmd),
    }
}

fn run_import_command(
    session: &Session,
    input: &str,
    extension: Option<&str>,
    worksheet: Option<&str>,
    out: Option<&str>,
    reference: Option<&str>,
) -> AppResult<()> {
    let rules = session.config.rules()?;
    let (mut store, _) = session.open_store()?;
    authorize(&store, session.actor()?, true).context(RosterSnafu {})?;

    let upload = Upload::open(input, extension)?;
    let sheet = read_sheet(upload.path(), worksheet)?;
    info!(
        "Importing {} rows from {}",
        sheet.rows.len(),
        upload.display_name()
    );
    let summary = run_import_numbered(&sheet.headers, &sheet.rows, &rules, &mut store)
        .context(RosterSnafu {})?;
    save_store(&session.db_path, &store)?;

    let summary_js = build_summary_js(&upload.display_name(), &summary);
    let pretty_js_summary = pretty(&summary_js)?;
    write_output(&pretty_js_summary, out)?;

    if let Some(reference_p) = reference {
        check_reference(&pretty_js_summary, reference_p)?;
    }
    Ok(())
}

/// Shows the column mapping and the first rows of a sheet. Like an import,
/// this is reserved to main users. Nothing is saved.
fn run_preview(
    session: &Session,
    input: &str,
    extension: Option<&str>,
    worksheet: Option<&str>,
) -> AppResult<()> {
    let (store, _) = session.open_store()?;
    authorize(&store, session.actor()?, true).context(RosterSnafu {})?;

    let upload = Upload::open(input, extension)?;
    let sheet = read_sheet(upload.path(), worksheet)?;
    let mapping = infer_columns(&sheet.headers);
    if !mapping.has_identifier() {
        warn!(
            "No voter id column in {}: an import would fail",
            upload.display_name()
        );
    }
    let js = build_preview_js(&sheet, &mapping);
    println!("{}", pretty(&js)?);
    Ok(())
}

fn run_search(session: &Session, q: &SearchQuery) -> AppResult<()> {
    let (store, _) = session.open_store()?;
    authorize(&store, session.actor()?, false).context(RosterSnafu {})?;
    let hits = store.search(q).context(RosterSnafu {})?;
    info!("run_search: {} hits", hits.len());
    let names = NameFilter::from_rules(&session.config.rules()?);
    for v in hits.iter() {
        println!(
            "{}\t{}\t{}\t{}",
            v.voter_id,
            names.display_name(v),
            v.booth_no.map(|b| b.to_string()).unwrap_or_default(),
            v.star_rating.stars()
        );
    }
    Ok(())
}

fn run_show(session: &Session, voter_id: &str) -> AppResult<()> {
    let (store, _) = session.open_store()?;
    authorize(&store, session.actor()?, false).context(RosterSnafu {})?;
    match store.find_voter(voter_id).context(RosterSnafu {})? {
        Some(voter) => println!("{}", pretty(&voter)?),
        None => whatever!("Unknown voter {}", voter_id),
    }
    Ok(())
}

fn run_history(session: &Session, voter_id: Option<&str>) -> AppResult<()> {
    let (store, _) = session.open_store()?;
    authorize(&store, session.actor()?, false).context(RosterSnafu {})?;
    for c in store.rating_changes(voter_id).context(RosterSnafu {})? {
        println!(
            "{}\t{}\t{}\t{} -> {}\t{}",
            c.timestamp.to_rfc3339(),
            c.voter_id,
            c.action,
            c.old_rating,
            c.new_rating,
            c.actor
        );
    }
    Ok(())
}

fn run_users(session: &Session, cmd: &UsersCommand) -> AppResult<()> {
    let (mut store, created) = session.open_store()?;
    let actor = session.actor()?;
    match cmd {
        UsersCommand::List => {
            authorize(&store, actor, true).context(RosterSnafu {})?;
            for u in store.users().context(RosterSnafu {})? {
                println!(
                    "{}\t{}\t{}\t{}",
                    u.username,
                    u.role,
                    if u.is_active { "active" } else { "inactive" },
                    u.created_at.to_rfc3339()
                );
            }
            // Nothing to save unless the main user was just created.
            if !created {
                return Ok(());
            }
        }
        UsersCommand::Add { username, main } => {
            let role = if *main { Role::Main } else { Role::Sub };
            let user = add_user(&mut store, actor, username, role).context(RosterSnafu {})?;
            println!("Added {} ({})", user.username, user.role);
        }
        UsersCommand::Activate { username } => {
            set_user_active(&mut store, actor, username, true).context(RosterSnafu {})?;
            println!("Activated {}", username);
        }
        UsersCommand::Deactivate { username } => {
            set_user_active(&mut store, actor, username, false).context(RosterSnafu {})?;
            println!("Deactivated {}", username);
        }
        UsersCommand::Remove { username } => {
            remove_user(&mut store, actor, username).context(RosterSnafu {})?;
            println!("Removed {}", username);
        }
    }
    save_store(&session.db_path, &store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn session(db: &str, user: &str) -> Session {
        Session {
            config: RosterConfig::default(),
            db_path: db.to_string(),
            user: Some(user.to_string()),
        }
    }

    #[test]
    fn empty_roster_bootstraps_the_acting_user() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("roster.json");
        let s = session(db.to_str().unwrap(), "admin");
        let (store, created) = s.open_store().unwrap();
        assert!(created);
        let admin = store.find_user("admin").unwrap().unwrap();
        assert_eq!(admin.role, Role::Main);

        save_store(&s.db_path, &store).unwrap();
        let other = session(db.to_str().unwrap(), "field");
        let (store, created) = other.open_store().unwrap();
        assert!(!created);
        assert!(store.find_user("field").unwrap().is_none());
    }

    #[test]
    fn users_then_ratings_through_the_commands() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("roster.json");
        let admin = session(db.to_str().unwrap(), "admin");
        run_users(
            &admin,
            &UsersCommand::Add {
                username: "field".to_string(),
                main: false,
            },
        )
        .unwrap();

        let mut store = load_store(&admin.db_path).unwrap();
        store.insert_batch(vec![VoterRecord::new("V1")]).unwrap();
        save_store(&admin.db_path, &store).unwrap();

        let field = session(db.to_str().unwrap(), "field");
        let (mut store, _) = field.open_store().unwrap();
        rate_voter(&mut store, "V1", 3, "field").unwrap();
        let res = unrate_voter(&mut store, "V1", "field");
        assert!(matches!(res, Err(RosterError::PermissionDenied { .. })));
    }

    fn test_data(name: &str) -> String {
        format!("{}/src/roster/test_data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn import_then_import_again() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("roster.json");
        let admin = session(db.to_str().unwrap(), "admin");
        let input = test_data("import_basic.xlsx");
        let reference = test_data("import_basic_expected_summary.json");
        let out = dir.path().join("summary.json");

        run_import_command(
            &admin,
            &input,
            None,
            None,
            Some(out.to_str().unwrap()),
            Some(&reference),
        )
        .unwrap();

        let store = load_store(&admin.db_path).unwrap();
        assert_eq!(store.voter_count(), 2);
        let v = store.find_voter("101").unwrap().unwrap();
        assert_eq!(v.full_name.as_deref(), Some("RAM SHARMA KUMAR SHARMA"));
        assert_eq!(v.booth_no, Some(5));
        assert_eq!(v.mobile_no.as_deref(), Some("9876543210"));
        let v = store.find_voter("102").unwrap().unwrap();
        assert_eq!(v.surname.as_deref(), Some("PATIL"));
        assert_eq!(v.booth_no, Some(7));

        // The same sheet a second time only finds duplicates.
        let again = dir.path().join("again.json");
        run_import_command(&admin, &input, None, None, Some(again.to_str().unwrap()), None)
            .unwrap();
        let js = read_summary(again.to_str().unwrap()).unwrap();
        assert_eq!(js["added"], serde_json::json!(0));
        assert_eq!(js["skippedDuplicates"], serde_json::json!(2));
        assert_eq!(js["skippedIds"], serde_json::json!(["101", "102"]));
        assert_eq!(js["rejected"][0]["row"], serde_json::json!(4));
        assert_eq!(load_store(&admin.db_path).unwrap().voter_count(), 2);
    }

    #[test]
    fn preview_is_for_main_users() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("roster.json");
        let admin = session(db.to_str().unwrap(), "admin");
        run_users(
            &admin,
            &UsersCommand::Add {
                username: "field".to_string(),
                main: false,
            },
        )
        .unwrap();
        let input = test_data("import_basic.xlsx");

        run_preview(&admin, &input, None, None).unwrap();

        let field = session(db.to_str().unwrap(), "field");
        let res = run_preview(&field, &input, None, None);
        assert!(matches!(
            res,
            Err(AppError::Roster {
                source: RosterError::PermissionDenied { .. }
            })
        ));
    }

    #[test]
    fn missing_user_is_reported() {
        let s = Session {
            config: RosterConfig::default(),
            db_path: DEFAULT_DB_PATH.to_string(),
            user: None,
        };
        assert!(s.actor().is_err());
    }
}
