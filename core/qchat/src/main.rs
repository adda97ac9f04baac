mod adapter;
mod cli;
mod console;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io::{self, Write};
use std::process;

use adapter::ConsoleSink;
use cli::{config_to_command, parse_args, print_completion, ParseOutcome};
use common::adapter::StdConfigResolver;
use common::error::Error;
use common::ports::outbound::{ConfigResolver, LogLevel, LogRecord};
use domain::{QchatCommand, Session};
use ports::inbound::UseCaseRunner;
use usecase::{ConversationController, SubmitOutcome};
use wiring::{wire_app, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, cmd: QchatCommand) -> Result<i32, Error> {
        let command_name = cmd.name();
        let log = &self.app.services.log;
        let _ = log.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name),
        );

        let result = match cmd {
            QchatCommand::Help => {
                print_help();
                Ok(0)
            }
            QchatCommand::Console => self.run_console(),
            QchatCommand::ListIds => {
                let ids = self.app.services.catalog.list_identifiers()?;
                for id in &ids {
                    println!("{}", id);
                }
                Ok(0)
            }
            QchatCommand::History { identifier } => {
                let records = self.app.services.history.list_history(&identifier)?;
                let mut out = io::stdout().lock();
                for record in &records {
                    console::print_history_record(&mut out, record)?;
                }
                Ok(0)
            }
            QchatCommand::Ask { identifier, query } => {
                let mut controller = ConversationController::new(
                    self.app.services.clone(),
                    Session::with_identifier(identifier),
                );
                let mut sink = ConsoleSink::new(io::stdout());
                match controller.submit(&query, &mut sink) {
                    SubmitOutcome::Answered(_) => Ok(0),
                    SubmitOutcome::Rejected(notice) | SubmitOutcome::Failed { notice, .. } => {
                        eprintln!("{}", notice);
                        Ok(1)
                    }
                }
            }
        };

        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        let _ = log.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = log.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
        }
        result
    }
}

impl Runner {
    fn run_console(&self) -> Result<i32, Error> {
        for w in &self.app.warnings {
            eprintln!("qchat: warning: {}", w);
        }
        let mut controller =
            ConversationController::new(self.app.services.clone(), Session::new());
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let outcome = console::run_console(&mut controller, stdin.lock(), &mut stdout);
        let session = controller.into_session();
        let _ = self.app.services.log.log(
            &LogRecord::new(LogLevel::Info, "session ended")
                .layer("cli")
                .kind("lifecycle")
                .field("turns", session.transcript.len())
                .field("started_at", session.started_at.to_rfc3339()),
        );
        let _ = stdout.flush();
        outcome
            .map(|_| 0)
            .map_err(|e| Error::io_msg(format!("{:#}", e)))
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("qchat: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    let cmd = config_to_command(&config)?;
    if cmd == QchatCommand::Help {
        print_help();
        return Ok(0);
    }
    // 設定値の形式不正だけは起動時に致命的
    let app_config = StdConfigResolver::with_overrides(config.env_overrides()).resolve()?;
    let app = wire_app(&app_config, config.verbose)?;
    let runner = Runner { app };
    runner.run(cmd)
}

fn print_usage() {
    eprintln!("Usage: qchat [options] [ids | history <ID> | ask --id <ID> <QUERY>...]");
}

fn print_help() {
    println!("Usage: qchat [options] [command]");
    println!();
    println!("Commands:");
    println!("  (none)                     Start the interactive console");
    println!("  ids                        List unique IDs from the vector store");
    println!("  history <ID>               Show query history for a unique ID (newest first)");
    println!("  ask --id <ID> <QUERY>...   Send one query and stream the answer");
    println!();
    println!("Options:");
    println!("  -h, --help                 Show this help message");
    println!("  -v, --verbose              Emit verbose logs to stderr");
    println!("  --endpoint <url>           Inference endpoint URL");
    println!("  --log-store <connection>   Log store: http(s):// URL or JSONL file path");
    println!("  --vector-url <url>         Vector store URL");
    println!("  --page-size <n>            Catalog page size (default 100)");
    println!("  --log-file <path>          Append JSONL logs to this file");
    println!("  --generate <shell>         Generate shell completion script (bash, zsh, fish, ...)");
    println!();
    println!("Environment:");
    println!("  QCHAT_ENDPOINT             Inference endpoint URL");
    println!("  QCHAT_LOG_STORE            Log store connection (http(s):// or file path)");
    println!("  QCHAT_LOG_STORE_API_KEY    API key for the HTTP log store");
    println!("  QCHAT_LOG_STORE_DATABASE   Database name (default qchat)");
    println!("  QCHAT_LOG_STORE_COLLECTION Collection name (default queries)");
    println!("  QCHAT_VECTOR_URL           Vector store URL");
    println!("  QCHAT_VECTOR_API_KEY       Vector store API key");
    println!("  QCHAT_VECTOR_COLLECTION    Vector store collection (default documents)");
    println!("  QCHAT_PAGE_SIZE            Catalog page size (default 100)");
    println!("  QCHAT_TIMEOUT_SECS         Connect timeout for store clients (default 30)");
    println!("  QCHAT_LOG_FILE             JSONL log file");
    println!();
    println!("Missing settings only disable the features that need them.");
    println!();
    println!("Examples:");
    println!("  qchat");
    println!("  qchat ids");
    println!("  qchat history hospital-7");
    println!("  qchat ask --id hospital-7 How many beds are free?");
}
