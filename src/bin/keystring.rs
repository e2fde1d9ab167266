// Keystring CLI
// Compiles escape text into key events and prints them

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use keystring_core::config::default_config_content;
use keystring_core::layout::builtin_layout_ids;
use keystring_core::modifier::modifier_kinds;
use keystring_core::{Config, Keyboard, Lexer};

/// Turn escape text like "\COMMAND+s" into keyboard events
#[derive(Parser, Debug)]
#[command(name = "keystring")]
#[command(version)]
#[command(about = "Compile escape text into key press/release events", long_about = None)]
struct Args {
    /// Text to compile; read from stdin when omitted
    text: Option<String>,

    /// TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Print the token tree instead of events
    #[arg(short, long)]
    tokens: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// List the named keys usable as \NAME and exit
    #[arg(long)]
    list_keys: bool,

    /// Print a starter configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

/// Main application state
struct Application {
    config: Config,
    keyboard: Keyboard,
    args: Args,
}

impl Application {
    fn new(args: Args) -> anyhow::Result<Self> {
        let config = match &args.config {
            Some(path) => Config::from_toml_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::load_default().context("failed to load default config")?,
        };
        let keyboard = config.to_keyboard().context("invalid configuration")?;
        Ok(Self {
            config,
            keyboard,
            args,
        })
    }

    /// Validate configuration
    fn validate(&self, out: &mut impl Write) -> anyhow::Result<()> {
        match self.config.source_path() {
            Some(path) => writeln!(out, "Configuration {} is valid", path.display())?,
            None => writeln!(out, "Default configuration is valid")?,
        }
        writeln!(
            out,
            "  layout: {} ({} characters)",
            self.keyboard.characters().name(),
            self.keyboard.characters().len()
        )?;
        writeln!(out, "  named keys: {}", self.keyboard.named_keys().len())?;
        writeln!(out, "  built-in layouts: {}", builtin_layout_ids().join(", "))?;
        let modifiers: Vec<String> = modifier_kinds().map(|kind| kind.to_string()).collect();
        writeln!(out, "  character modifiers: {}", modifiers.join(", "))?;
        Ok(())
    }

    fn list_keys(&self, out: &mut impl Write) -> anyhow::Result<()> {
        for (name, key) in self.keyboard.named_keys().iter() {
            writeln!(out, "\\{:<14} {:#04x} {}", name, key.code(), key)?;
        }
        Ok(())
    }

    /// Compile `text` and print either tokens or events
    fn run(&self, text: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let lexer = Lexer::new(text);
        if self.args.tokens {
            for token in lexer.lex() {
                writeln!(out, "{}", token)?;
            }
            return Ok(());
        }

        let events = self
            .keyboard
            .generate(lexer.lex())
            .with_context(|| format!("cannot type {:?}", text))?;
        log::debug!("{} events for {} characters", events.len(), text.chars().count());
        for event in &events {
            writeln!(out, "{}", event)?;
        }
        Ok(())
    }
}

fn read_text(args: &Args) -> anyhow::Result<String> {
    if let Some(text) = &args.text {
        return Ok(text.clone());
    }
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .context("failed to read text from stdin")?;
    Ok(text)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.print_default_config {
        print!("{}", default_config_content());
        return Ok(());
    }

    let app = Application::new(args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if app.args.check_config {
        return app.validate(&mut out);
    }
    if app.args.list_keys {
        return app.list_keys(&mut out);
    }

    let text = read_text(&app.args)?;
    app.run(&text, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(args: &[&str]) -> Application {
        Application::new(Args::parse_from(args)).unwrap()
    }

    fn output(app: &Application, text: &str) -> String {
        let mut buf = Vec::new();
        app.run(text, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["keystring", "--config", "/tmp/test.toml", "hi"]);

        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
        assert_eq!(args.text.as_deref(), Some("hi"));
        assert!(!args.tokens);
        assert!(!args.verbose);
        assert!(!args.check_config);
        assert!(!args.list_keys);
    }

    #[test]
    fn test_args_with_options() {
        let args = Args::parse_from(["keystring", "-t", "-v", "--list-keys"]);

        assert!(args.tokens);
        assert!(args.verbose);
        assert!(args.list_keys);
        assert!(args.text.is_none());
    }

    #[test]
    fn test_run_prints_events() {
        let app = app(&["keystring", "--config", "/dev/null"]);
        assert_eq!(
            output(&app, "A"),
            "press   0x38 SHIFT\npress   0x00 A\nrelease 0x00 A\nrelease 0x38 SHIFT\n"
        );
    }

    #[test]
    fn test_run_prints_tokens() {
        let app = app(&["keystring", "--config", "/dev/null", "--tokens"]);
        assert_eq!(output(&app, "\\COMMAND+\\SHIFT+s!"), "COMMAND[SHIFT['s' '!']]\n");
    }

    #[test]
    fn test_run_reports_unmapped_character() {
        let app = app(&["keystring", "--config", "/dev/null"]);
        let mut buf = Vec::new();
        let err = app.run("☃", &mut buf).unwrap_err();
        assert!(format!("{:#}", err).contains("☃"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_list_keys_and_validate() {
        let app = app(&["keystring", "--config", "/dev/null"]);

        let mut buf = Vec::new();
        app.list_keys(&mut buf).unwrap();
        let listing = String::from_utf8(buf).unwrap();
        assert!(listing.starts_with("\\COMMAND"));
        assert!(listing.contains("0x37"));

        let mut buf = Vec::new();
        app.validate(&mut buf).unwrap();
        let report = String::from_utf8(buf).unwrap();
        assert!(report.contains("/dev/null"));
        assert!(report.contains("built-in layouts: us"));
        assert!(report.contains("character modifiers: shift, option"));
    }
}
