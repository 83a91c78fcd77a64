use argh::FromArgs;
use sigyx::Interpreter;
use sigyx::command::Io;
use sigyx::config::Config;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(FromArgs)]
/// An interactive command shell.
struct Args {
    #[argh(option, short = 'c')]
    /// run a single command line and exit.
    command: Option<String>,

    #[argh(option)]
    /// path to a TOML configuration file.
    config: Option<PathBuf>,

    #[argh(option, default = "String::from(\"warn\")")]
    /// log filter used when RUST_LOG is not set, e.g. "debug".
    log_level: String,
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp(None)
        .init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("sigyx: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = Config::load(args.config.as_deref())?;
    let mut sh = Interpreter::from_config(&config);

    if let Some(line) = args.command {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let (mut out, mut err) = (stdout.lock(), stderr.lock());
        let errors = sh.run_line(&line, &mut Io::new(&mut out, &mut err));
        out.flush()?;
        return Ok(if errors.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    sh.repl(&config)?;
    Ok(ExitCode::SUCCESS)
}
