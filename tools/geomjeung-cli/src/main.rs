use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use geomjeung_core::config::{DEFAULT_AI_PAGE_LIMIT, DEFAULT_OBSERVE_MS, DEFAULT_OUT_DIR, SPEC_FILE_NAME};
use geomjeung_core::plan::PLAN_FILE_NAME;
use geomjeung_core::{Level, VerifyConfig};

mod cli;

#[derive(Parser)]
#[command(name = "geomjeung")]
#[command(about = "메뉴구조도 기반 페이지 검증 도구")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 정적 분석, 브라우저 렌더링, AI 시맨틱 검증을 차례로 실행한다.
    Verify {
        #[arg(long, default_value_t = 3)]
        level: u8,
        #[arg(long, default_value = ".")]
        pages: PathBuf,
        #[arg(long)]
        spec: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        screenshots: Option<PathBuf>,
        #[arg(long, default_value = cli::anthropic::DEFAULT_MODEL)]
        model: String,
        #[arg(long = "max-tokens", default_value_t = cli::anthropic::DEFAULT_MAX_TOKENS)]
        max_tokens: u32,
        #[arg(long = "ai-limit", default_value_t = DEFAULT_AI_PAGE_LIMIT)]
        ai_limit: usize,
        #[arg(long = "observe-ms", default_value_t = DEFAULT_OBSERVE_MS)]
        observe_ms: u64,
    },
    /// 외부 브라우저 도구용 검증 계획(JSON)을 만든다.
    Plan {
        #[arg(long, default_value = ".")]
        pages: PathBuf,
        #[arg(long)]
        spec: Option<PathBuf>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Verify {
            level,
            pages,
            spec,
            out,
            screenshots,
            model,
            max_tokens,
            ai_limit,
            observe_ms,
        } => {
            let level = match Level::try_from(level) {
                Ok(level) => level,
                Err(message) => {
                    eprintln!("E_CLI_LEVEL {}", message);
                    std::process::exit(1);
                }
            };
            let mut config = VerifyConfig::for_pages_dir(&pages, level);
            if let Some(spec) = spec {
                config.spec_path = spec;
            }
            if let Some(out) = out {
                config.screenshot_dir = out.join(geomjeung_core::config::SCREENSHOT_DIR);
                config.out_dir = out;
            }
            if let Some(screenshots) = screenshots {
                config.screenshot_dir = screenshots;
            }
            config.ai_page_limit = ai_limit;
            config.observe_window = Duration::from_millis(observe_ms);

            let options = cli::verify::VerifyOptions {
                config,
                model,
                max_tokens,
            };
            match cli::verify::run(options) {
                Ok(code) => std::process::exit(code),
                Err(err) => {
                    eprintln!("{}", err);
                    std::process::exit(1);
                }
            }
        }
        Commands::Plan { pages, spec, out } => {
            let spec = spec.unwrap_or_else(|| pages.join(SPEC_FILE_NAME));
            let out = out.unwrap_or_else(|| pages.join(DEFAULT_OUT_DIR).join(PLAN_FILE_NAME));
            if let Err(err) = cli::plan::run(&pages, &spec, &out) {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verify_defaults() {
        let cli = Cli::try_parse_from(["geomjeung", "verify", "--pages", "site"]).expect("parse");
        let Commands::Verify {
            level,
            pages,
            model,
            max_tokens,
            ai_limit,
            observe_ms,
            ..
        } = cli.command
        else {
            panic!("verify command expected");
        };
        assert_eq!(level, 3);
        assert_eq!(pages, PathBuf::from("site"));
        assert_eq!(model, "claude-sonnet-4-20250514");
        assert_eq!(max_tokens, 500);
        assert_eq!(ai_limit, 10);
        assert_eq!(observe_ms, 1000);
    }
}
