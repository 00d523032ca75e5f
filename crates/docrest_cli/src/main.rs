//! Command line front end over the document store.
//!
//! # Responsibility
//! - Wire the SQLite repositories, services and registry for the sample
//!   `author`/`book` documents.
//! - Print one JSON document per line so output can be piped.

use clap::{Args, Parser, Subcommand};
use docrest_core::db::open_shared_db;
use docrest_core::{
    default_log_level, init_logging, ApplicationRegistry, Author, Book, CrudError, CrudService,
    Document, DocumentCrudService, DocumentRepository, LogConfig, SqliteDocumentRepository,
};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "docrest", version, about = "Validated CRUD over a local document store")]
struct Cli {
    /// SQLite file holding the documents.
    #[arg(long, env = "DOCREST_DB", default_value = "docrest.sqlite3")]
    db: PathBuf,

    #[arg(long, env = "DOCREST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for log files; logging is off when unset.
    #[arg(long, env = "DOCREST_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Checks that the core library is linked.
    Ping,
    /// Prints the core library version.
    Version,
    #[command(subcommand)]
    Author(AuthorCommand),
    #[command(subcommand)]
    Book(BookCommand),
    /// Deletes every document of one type.
    Purge { document_type: String },
}

#[derive(Debug, Subcommand)]
enum AuthorCommand {
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: Option<String>,
    },
    List,
    Get(IdArg),
    Delete(IdArg),
}

#[derive(Debug, Subcommand)]
enum BookCommand {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        isbn: String,
        /// Repeat for several authors.
        #[arg(long = "author-id", required = true)]
        author_ids: Vec<String>,
        #[arg(long)]
        published_year: Option<i32>,
    },
    List,
    Get(IdArg),
    Delete(IdArg),
}

#[derive(Debug, Args)]
struct IdArg {
    id: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        if let Err(err) = init_logging(&LogConfig::new(level, log_dir)) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Ping => {
            println!("docrest_core ping={}", docrest_core::ping());
            return Ok(());
        }
        Command::Version => {
            println!("docrest_core version={}", docrest_core::core_version());
            return Ok(());
        }
        _ => {}
    }

    let registry = build_registry(&cli)?;
    match cli.command {
        Command::Ping | Command::Version => Ok(()),
        Command::Author(command) => run_author(&registry, command),
        Command::Book(command) => run_book(&registry, command),
        Command::Purge { document_type } => purge(&registry, document_type.trim()),
    }
}

fn build_registry(cli: &Cli) -> Result<ApplicationRegistry, String> {
    let conn = open_shared_db(&cli.db)
        .map_err(|err| format!("cannot open `{}`: {err}", cli.db.display()))?;
    let mut registry = ApplicationRegistry::new();

    let authors: Arc<dyn DocumentRepository<Author>> =
        Arc::new(SqliteDocumentRepository::<Author>::new(Arc::clone(&conn)));
    let author_service = DocumentCrudService::new(Arc::clone(&authors), Author::validator());
    registry
        .register::<Author>(authors, Arc::new(author_service))
        .map_err(|err| err.to_string())?;

    let books: Arc<dyn DocumentRepository<Book>> =
        Arc::new(SqliteDocumentRepository::<Book>::new(conn));
    let book_service = DocumentCrudService::new(Arc::clone(&books), Book::validator());
    registry
        .register::<Book>(books, Arc::new(book_service))
        .map_err(|err| err.to_string())?;

    Ok(registry)
}

fn run_author(registry: &ApplicationRegistry, command: AuthorCommand) -> Result<(), String> {
    let service = registry
        .crud_service::<Author>()
        .map_err(|err| err.to_string())?;
    match command {
        AuthorCommand::Add {
            first_name,
            last_name,
            email,
        } => {
            let mut author = Author::new(first_name, last_name);
            author.email = email;
            print_json(&service.create(author).map_err(describe)?)
        }
        AuthorCommand::List => list(service.as_ref()),
        AuthorCommand::Get(IdArg { id }) => get(service.as_ref(), &id),
        AuthorCommand::Delete(IdArg { id }) => service.delete(&id).map_err(describe),
    }
}

fn run_book(registry: &ApplicationRegistry, command: BookCommand) -> Result<(), String> {
    let service = registry
        .crud_service::<Book>()
        .map_err(|err| err.to_string())?;
    match command {
        BookCommand::Add {
            title,
            isbn,
            author_ids,
            published_year,
        } => {
            let mut book = Book::new(title, isbn);
            book.author_ids = author_ids;
            book.published_year = published_year;
            print_json(&service.create(book).map_err(describe)?)
        }
        BookCommand::List => list(service.as_ref()),
        BookCommand::Get(IdArg { id }) => get(service.as_ref(), &id),
        BookCommand::Delete(IdArg { id }) => service.delete(&id).map_err(describe),
    }
}

fn purge(registry: &ApplicationRegistry, document_type: &str) -> Result<(), String> {
    if document_type == Author::DOCUMENT_TYPE {
        registry
            .crud_service::<Author>()
            .map_err(|err| err.to_string())?
            .delete_all()
            .map_err(describe)
    } else if document_type == Book::DOCUMENT_TYPE {
        registry
            .crud_service::<Book>()
            .map_err(|err| err.to_string())?
            .delete_all()
            .map_err(describe)
    } else {
        Err(format!(
            "unknown document type `{document_type}`; expected one of {}",
            registry.document_types().join("|")
        ))
    }
}

fn list<D>(service: &dyn CrudService<D>) -> Result<(), String>
where
    D: Document + Serialize,
{
    for document in service.find_all().map_err(describe)? {
        print_json(&document)?;
    }
    Ok(())
}

fn get<D>(service: &dyn CrudService<D>, id: &str) -> Result<(), String>
where
    D: Document + Serialize,
{
    match service.find_one(id).map_err(describe)? {
        Some(document) => print_json(&document),
        None => Err(format!("no document with id `{id}`")),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let line = serde_json::to_string(value).map_err(|err| err.to_string())?;
    println!("{line}");
    Ok(())
}

/// Renders validation failures one violation per line.
fn describe(err: CrudError) -> String {
    match err {
        CrudError::Validation(validation) => validation
            .violations()
            .iter()
            .map(|violation| format!("  {}: {}", violation.path, violation.message))
            .fold("document rejected:".to_string(), |mut out, line| {
                out.push('\n');
                out.push_str(&line);
                out
            }),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe, Cli};
    use clap::CommandFactory;
    use docrest_core::{validate_save, Author, CrudError, SaveKind};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn describe_lists_each_violation() {
        let err = validate_save(&Author::validator(), &Author::new("", ""), SaveKind::Create)
            .unwrap_err();
        let text = describe(CrudError::Validation(err));
        assert_eq!(
            text,
            "document rejected:\n  first_name: may not be empty\n  last_name: may not be empty"
        );
    }
}
