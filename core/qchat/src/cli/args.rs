use crate::domain::QchatCommand;
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::config::{ENV_ENDPOINT, ENV_LOG_FILE, ENV_LOG_STORE, ENV_PAGE_SIZE, ENV_VECTOR_URL};
use common::domain::{Identifier, Query};
use common::error::Error;
use std::path::PathBuf;

/// サブコマンド（未指定なら対話コンソール）
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Subcommand {
    #[default]
    Console,
    Ids,
    History {
        identifier: Option<String>,
    },
    Ask {
        identifier: Option<String>,
        query_words: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: 不具合調査用のログを stderr に出す
    pub verbose: bool,
    /// --endpoint: QCHAT_ENDPOINT を上書き
    pub endpoint: Option<String>,
    /// --log-store: QCHAT_LOG_STORE を上書き
    pub log_store: Option<String>,
    /// --vector-url: QCHAT_VECTOR_URL を上書き
    pub vector_url: Option<String>,
    pub page_size: Option<String>,
    pub log_file: Option<PathBuf>,
    pub subcommand: Subcommand,
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("qchat")
        .about("Chat with the inference API about a selected unique ID")
        .disable_help_flag(true)
        .disable_help_subcommand(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit verbose logs to stderr (for troubleshooting)")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("endpoint")
                .long("endpoint")
                .value_name("url")
                .help("Inference endpoint URL (overrides QCHAT_ENDPOINT)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("log-store")
                .long("log-store")
                .value_name("connection")
                .help("Log store: http(s):// URL or JSONL file path (overrides QCHAT_LOG_STORE)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("vector-url")
                .long("vector-url")
                .value_name("url")
                .help("Vector store URL (overrides QCHAT_VECTOR_URL)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("page-size")
                .long("page-size")
                .value_name("n")
                .help("Catalog page size (overrides QCHAT_PAGE_SIZE)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("log-file")
                .long("log-file")
                .value_name("path")
                .help("Append JSONL logs to this file (overrides QCHAT_LOG_FILE)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(clap::Command::new("ids")
                .about("List unique IDs from the vector store")
                .disable_help_flag(true))
        .subcommand(
            clap::Command::new("history")
                .about("Show query history for a unique ID (newest first)")
                .disable_help_flag(true)
                .arg(clap::Arg::new("id").value_name("ID").num_args(1)),
        )
        .subcommand(
            clap::Command::new("ask")
                .about("Send one query and stream the answer")
                .disable_help_flag(true)
                .arg(
                    clap::Arg::new("id")
                        .long("id")
                        .value_name("ID")
                        .num_args(1),
                )
                .arg(
                    clap::Arg::new("query")
                        .value_name("QUERY")
                        .num_args(1..)
                        .trailing_var_arg(true),
                ),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let subcommand = match matches.subcommand() {
        Some(("ids", _)) => Subcommand::Ids,
        Some(("history", sub)) => Subcommand::History {
            identifier: sub.get_one::<String>("id").cloned(),
        },
        Some(("ask", sub)) => Subcommand::Ask {
            identifier: sub.get_one::<String>("id").cloned(),
            query_words: sub
                .get_many::<String>("query")
                .map(|i| i.cloned().collect())
                .unwrap_or_default(),
        },
        _ => Subcommand::Console,
    };
    // -h / -v はサブコマンドの後ろにも書ける
    let flag = |name: &str| {
        matches.get_flag(name)
            || matches
                .subcommand()
                .map(|(_, sub)| sub.get_flag(name))
                .unwrap_or(false)
    };

    Config {
        help: flag("help"),
        verbose: flag("verbose"),
        endpoint: matches.get_one::<String>("endpoint").cloned(),
        log_store: matches.get_one::<String>("log-store").cloned(),
        vector_url: matches.get_one::<String>("vector-url").cloned(),
        page_size: matches.get_one::<String>("page-size").cloned(),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        subcommand,
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[cfg(test)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "qchat", &mut std::io::stdout());
}

/// 必須引数の欠落は -h より後で判定する（`qchat history -h` でヘルプを出すため）
fn required<'a>(value: &'a Option<String>, what: &str) -> Result<&'a str, Error> {
    value
        .as_deref()
        .ok_or_else(|| Error::invalid_argument(format!("missing required argument {}", what)))
}

/// Config を QchatCommand に変換する（識別子・クエリの検証を含む）
pub fn config_to_command(config: &Config) -> Result<QchatCommand, Error> {
    if config.help {
        return Ok(QchatCommand::Help);
    }
    match &config.subcommand {
        Subcommand::Console => Ok(QchatCommand::Console),
        Subcommand::Ids => Ok(QchatCommand::ListIds),
        Subcommand::History { identifier } => Ok(QchatCommand::History {
            identifier: Identifier::parse(required(identifier, "<ID>")?)?,
        }),
        Subcommand::Ask {
            identifier,
            query_words,
        } => {
            let identifier = Identifier::parse(required(identifier, "--id <ID>")?)?;
            if query_words.is_empty() {
                return Err(Error::invalid_argument("missing required argument <QUERY>..."));
            }
            Ok(QchatCommand::Ask {
                identifier,
                query: Query::parse(&query_words.join(" "))?,
            })
        }
    }
}

impl Config {
    /// CLI で指定された値を、対応する環境変数名と組にして返す（環境変数より優先する）
    pub fn env_overrides(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(v) = &self.endpoint {
            out.push((ENV_ENDPOINT, v.clone()));
        }
        if let Some(v) = &self.log_store {
            out.push((ENV_LOG_STORE, v.clone()));
        }
        if let Some(v) = &self.vector_url {
            out.push((ENV_VECTOR_URL, v.clone()));
        }
        if let Some(v) = &self.page_size {
            out.push((ENV_PAGE_SIZE, v.clone()));
        }
        if let Some(p) = &self.log_file {
            out.push((ENV_LOG_FILE, p.display().to_string()));
        }
        out
    }
}
